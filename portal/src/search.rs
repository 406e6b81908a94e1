use std::{
    fmt::Display,
    io::{self, stdout, Write},
    iter::repeat_n,
    str::FromStr,
};

use crate::{
    filter::{contains_ignore_case, matches_text},
    models::Work,
    parse::ParseError,
};

pub(crate) mod parse;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub enum QueryTerm {
    /// Matches the title, description or author.
    Text(String),
    Tag(String),
    Title(String),
    Author(String),
    Description(String),
}

impl Display for QueryTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTerm::Text(text) => write!(f, r#""{text}""#),
            QueryTerm::Tag(tag) => write!(f, r#"tag:"{tag}""#),
            QueryTerm::Title(text) => write!(f, r#"title:"{text}""#),
            QueryTerm::Author(text) => write!(f, r#"author:"{text}""#),
            QueryTerm::Description(text) => write!(f, r#"description:"{text}""#),
        }
    }
}

impl QueryTerm {
    pub fn matches(&self, work: &Work) -> bool {
        match self {
            QueryTerm::Text(text) => matches_text(work, &text.to_lowercase()),
            QueryTerm::Tag(tag) => work
                .tag_names()
                .any(|name| name.to_lowercase() == tag.to_lowercase()),
            QueryTerm::Title(text) => contains_ignore_case(&work.title, &text.to_lowercase()),
            QueryTerm::Author(text) => contains_ignore_case(work.author(), &text.to_lowercase()),
            QueryTerm::Description(text) => work
                .description
                .as_deref()
                .is_some_and(|description| {
                    contains_ignore_case(description, &text.to_lowercase())
                }),
        }
    }
}

impl From<QueryTerm> for Query {
    fn from(term: QueryTerm) -> Self {
        Self::Term(term)
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub enum Query {
    Term(QueryTerm),
    Not(Box<Query>),
    And(Vec<Query>),
    Or(Vec<Query>),
}

impl FromStr for Query {
    type Err = ParseError;

    fn from_str(query: &str) -> Result<Self, Self::Err> {
        let lower_query = query.to_lowercase();
        let (left, result) = parse::query(&lower_query)?;

        if !left.is_empty() {
            return Err(ParseError::ParserDidNotFinish(left.to_string()));
        }

        Ok(result.into_normalized())
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Term(query_term) => write!(f, "{query_term}"),
            Query::Not(query) => write!(f, "-{query}"),
            Query::And(terms) => write!(
                f,
                "({})",
                terms
                    .iter()
                    .map(|term| term.to_string())
                    .collect::<Vec<String>>()
                    .join(" ")
            ),
            Query::Or(terms) => write!(
                f,
                "({})",
                terms
                    .iter()
                    .map(|term| term.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

impl Query {
    /// Sorts and deduplicates the operands of every `And` and `Or` so that
    /// equivalent queries compare equal.
    pub fn into_normalized(self) -> Self {
        match self {
            Query::And(terms) => Self::new_and(Self::normalize_terms(terms)),
            Query::Or(terms) => Self::new_or(Self::normalize_terms(terms)),
            Query::Not(query) => query.into_normalized().not(),
            query => query,
        }
    }

    fn normalize_terms(terms: Vec<Query>) -> Vec<Query> {
        let mut terms: Vec<Query> = terms.into_iter().map(Self::into_normalized).collect();
        terms.sort();
        terms.dedup();
        terms
    }

    pub fn matches(&self, work: &Work) -> bool {
        match self {
            Query::Term(term) => term.matches(work),
            Query::Not(query) => !query.matches(work),
            Query::And(queries) => queries.iter().all(|query| query.matches(work)),
            Query::Or(queries) => queries.iter().any(|query| query.matches(work)),
        }
    }

    /// Keeps the matching works in their original order.
    pub fn filter(&self, works: Vec<Work>) -> Vec<Work> {
        works.into_iter().filter(|work| self.matches(work)).collect()
    }

    pub fn print_query_tree(&self) -> io::Result<()> {
        self.write_query_tree(&mut stdout())
    }

    pub fn write_query_tree(&self, writer: &mut impl Write) -> io::Result<()> {
        self._write_query_tree(0, 0, writer)
    }

    pub fn not(self) -> Self {
        Query::Not(Box::new(self))
    }

    fn _write_query_tree(
        &self,
        indentation: usize,
        negations: usize,
        writer: &mut impl Write,
    ) -> io::Result<()> {
        let indent: String = repeat_n(" ", indentation).collect();
        let negate: String = repeat_n("-", negations).collect();

        match self {
            Query::Term(query_term) => {
                writeln!(writer, "{indent}{negate}{query_term}")?;
            }
            Query::Not(query) => {
                query._write_query_tree(indentation, negations + 1, writer)?;
            }
            Query::And(queries) => {
                writeln!(writer, "{indent}{negate}AND (")?;
                for query in queries {
                    query._write_query_tree(indentation + 2, 0, writer)?;
                }
                writeln!(writer, "{indent}{negate})")?;
            }
            Query::Or(queries) => {
                writeln!(writer, "{indent}{negate}OR (")?;
                for query in queries {
                    query._write_query_tree(indentation + 2, 0, writer)?;
                }
                writeln!(writer, "{indent}{negate})")?;
            }
        }

        Ok(())
    }

    fn new_or(mut queries: Vec<Self>) -> Self {
        if queries.len() == 1 {
            return queries.remove(0);
        }

        Self::Or(queries)
    }

    fn new_and(mut queries: Vec<Self>) -> Self {
        if queries.len() == 1 {
            return queries.remove(0);
        }

        Self::And(queries)
    }
}
