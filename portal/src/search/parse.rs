use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, space0, space1},
    combinator::{map, not},
    multi::separated_list1,
    sequence::{delimited, preceded, terminated},
};

use crate::parse::{keyword, string, ParseResult};

use super::{Query, QueryTerm};

fn term_kind(input: &str) -> ParseResult<&str> {
    alt((
        tag("tag"),
        tag("title"),
        tag("t"),
        tag("author"),
        tag("a"),
        tag("description"),
        tag("d"),
    ))(input)
}

fn tagged_term(input: &str) -> ParseResult<QueryTerm> {
    let (i, kind) = terminated(term_kind, char(':'))(input)?;
    let (i, text) = string(i)?;
    let text = text.to_owned();

    let term = match kind {
        "tag" => QueryTerm::Tag(text),
        "t" | "title" => QueryTerm::Title(text),
        "a" | "author" => QueryTerm::Author(text),
        _ => QueryTerm::Description(text),
    };

    Ok((i, term))
}

fn term(input: &str) -> ParseResult<QueryTerm> {
    preceded(
        not(alt((keyword("and"), keyword("or")))),
        alt((
            tagged_term,
            map(string, |text| QueryTerm::Text(text.to_owned())),
        )),
    )(input)
}

fn negation(input: &str) -> ParseResult<&str> {
    alt((terminated(keyword("not"), space0), tag("!"), tag("-")))(input)
}

fn unary(input: &str) -> ParseResult<Query> {
    alt((
        paren_query,
        map(preceded(negation, unary), Query::not),
        map(term, Query::Term),
    ))(input)
}

fn paren_query(input: &str) -> ParseResult<Query> {
    delimited(char('('), query, char(')'))(input)
}

fn and_separator(input: &str) -> ParseResult<&str> {
    alt((
        delimited(space0, alt((tag("&&"), tag("&"))), space0),
        delimited(space1, keyword("and"), space0),
        space1,
    ))(input)
}

fn or_separator(input: &str) -> ParseResult<&str> {
    alt((
        delimited(space0, alt((tag("||"), tag("|"), tag(","))), space0),
        delimited(space1, keyword("or"), space0),
    ))(input)
}

fn and_sequence(input: &str) -> ParseResult<Query> {
    map(separated_list1(and_separator, unary), Query::new_and)(input)
}

fn or_sequence(input: &str) -> ParseResult<Query> {
    map(separated_list1(or_separator, and_sequence), Query::new_or)(input)
}

pub fn query(input: &str) -> ParseResult<Query> {
    delimited(space0, or_sequence, space0)(input)
}

#[cfg(test)]
mod tests {
    use crate::search::{parse::term, Query, QueryTerm};

    use super::{query, term_kind};

    fn text(s: &str) -> Query {
        Query::Term(QueryTerm::Text(s.to_owned()))
    }

    #[test]
    fn test_term_kind() {
        for kind in &["t", "title", "tag", "a", "author", "d", "description"] {
            assert_eq!(term_kind(kind), Ok(("", *kind)));
        }

        assert!(term_kind("").is_err());
        assert!(term_kind("notakind").is_err());
    }

    #[test]
    fn test_term() {
        assert_eq!(
            term("t:graphs"),
            Ok(("", QueryTerm::Title(String::from("graphs"))))
        );
        assert_eq!(
            term(r#"title:"linear algebra""#),
            Ok(("", QueryTerm::Title(String::from("linear algebra"))))
        );
        assert_eq!(
            term("tag:math"),
            Ok(("", QueryTerm::Tag(String::from("math"))))
        );
        assert_eq!(term("thesis"), Ok(("", QueryTerm::Text(String::from("thesis")))));
        assert!(term("or").is_err());
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            query("a b"),
            Ok(("", Query::And(vec![text("a"), text("b")])))
        );
        assert_eq!(
            query("a or b"),
            Ok(("", Query::Or(vec![text("a"), text("b")])))
        );
        assert_eq!(
            query("a, b && c"),
            Ok((
                "",
                Query::Or(vec![text("a"), Query::And(vec![text("b"), text("c")])])
            ))
        );
        assert_eq!(query("-a"), Ok(("", text("a").not())));
        assert_eq!(query("not (a)"), Ok(("", text("a").not())));
        assert_eq!(query("order"), Ok(("", text("order"))));
        assert_eq!(query(" a "), Ok(("", text("a"))));
    }
}
