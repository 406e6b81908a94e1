use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{char, space1},
    combinator::{eof, peek},
    error::VerboseError,
    sequence::{delimited, terminated},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not parse: {0}")]
    Parse(String),
    #[error("parser did not finish: '{0}'")]
    ParserDidNotFinish(String),
}

impl<'s> From<nom::Err<VerboseError<&'s str>>> for ParseError {
    fn from(value: nom::Err<VerboseError<&'s str>>) -> Self {
        Self::Parse(value.to_string())
    }
}

pub type ParseResult<'s, T> = IResult<&'s str, T, VerboseError<&'s str>>;

const RESERVED: &str = "()\"',|&!:";

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !RESERVED.contains(c)
}

/// A run of characters that are neither whitespace nor query syntax.
pub fn word(input: &str) -> ParseResult<&str> {
    take_while1(is_word_char)(input)
}

/// Matches `word` only when it stands on its own, so `or` is a keyword but
/// `order` is not.
pub fn keyword<'s>(word: &'static str) -> impl FnMut(&'s str) -> ParseResult<'s, &'s str> {
    terminated(tag(word), peek(alt((space1, tag("("), eof))))
}

pub fn string(input: &str) -> ParseResult<&str> {
    alt((
        delimited(char('"'), is_not("\""), char('"')),
        delimited(char('\''), is_not("'"), char('\'')),
        word,
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::{keyword, string, word};

    #[test]
    fn test_string() {
        assert_eq!(string(r#""Ace Attorney" rest"#), Ok((" rest", "Ace Attorney")));
        assert_eq!(string("'single quoted'"), Ok(("", "single quoted")));
        assert_eq!(string("e-learning)"), Ok((")", "e-learning")));
        assert_eq!(word("příliš žluťoučký"), Ok((" žluťoučký", "příliš")));
        assert!(string("(").is_err());
    }

    #[test]
    fn test_keyword() {
        assert_eq!(keyword("or")("or b"), Ok((" b", "or")));
        assert_eq!(keyword("or")("or"), Ok(("", "or")));
        assert!(keyword("or")("order").is_err());
    }
}
