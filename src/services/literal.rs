//! Parser for the embedded genre lists found in the movie metadata dump.
//!
//! The field holds a Python-style literal such as
//! `[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}]`.
//! Only a list of flat records is accepted; record values may be integers,
//! quoted strings, `None`, `True` or `False`. Anything else is a syntax error.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::separated_list0,
    sequence::{delimited, pair, separated_pair, terminated},
    IResult,
};

/// A scalar value inside an embedded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Str(String),
    Bool(bool),
    None,
}

/// One `{key: value, ...}` record, keys in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralRecord {
    entries: Vec<(String, Literal)>,
}

impl LiteralRecord {
    /// Value for `key`; a repeated key resolves to its last occurrence
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid literal near byte {offset}")]
pub struct LiteralError {
    pub offset: usize,
}

/// Parses a complete list-of-records literal
pub fn parse_record_list(input: &str) -> Result<Vec<LiteralRecord>, LiteralError> {
    match all_consuming(ws(record_list))(input) {
        Ok((_, records)) => Ok(records),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(LiteralError {
            offset: input.len() - e.input.len(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(LiteralError {
            offset: input.len(),
        }),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn record_list(input: &str) -> IResult<&str, Vec<LiteralRecord>> {
    delimited(
        char('['),
        terminated(
            separated_list0(char(','), ws(record)),
            opt(ws(char(','))),
        ),
        ws(char(']')),
    )(input)
}

fn record(input: &str) -> IResult<&str, LiteralRecord> {
    map(
        delimited(
            char('{'),
            terminated(separated_list0(char(','), ws(entry)), opt(ws(char(',')))),
            ws(char('}')),
        ),
        |entries| LiteralRecord { entries },
    )(input)
}

fn entry(input: &str) -> IResult<&str, (String, Literal)> {
    separated_pair(quoted_string, ws(char(':')), scalar)(input)
}

fn scalar(input: &str) -> IResult<&str, Literal> {
    alt((
        map(quoted_string, Literal::Str),
        map(integer, Literal::Int),
        value(Literal::None, tag("None")),
        value(Literal::Bool(true), tag("True")),
        value(Literal::Bool(false), tag("False")),
    ))(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |digits: &str| {
        digits.parse::<i64>()
    })(input)
}

/// Single- or double-quoted string with backslash escapes.
///
/// Unknown escapes keep their backslash, as Python does.
fn quoted_string(input: &str) -> IResult<&str, String> {
    let fail = |kind| nom::Err::Error(Error::new(input, kind));

    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('\'' | '"'))) => q,
        _ => return Err(fail(ErrorKind::Char)),
    };

    let mut out = String::new();
    while let Some((idx, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((&input[idx + c.len_utf8()..], out)),
            '\n' | '\r' => return Err(fail(ErrorKind::Char)),
            '\\' => {
                let (_, escaped) = chars.next().ok_or_else(|| fail(ErrorKind::Escaped))?;
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    '\\' | '\'' | '"' => out.push(escaped),
                    'x' | 'u' => {
                        let width = if escaped == 'x' { 2 } else { 4 };
                        let hex: String = chars.by_ref().take(width).map(|(_, h)| h).collect();
                        let decoded = (hex.len() == width)
                            .then(|| u32::from_str_radix(&hex, 16).ok())
                            .flatten()
                            .and_then(char::from_u32)
                            .ok_or_else(|| fail(ErrorKind::Escaped))?;
                        out.push(decoded);
                    }
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            c => out.push(c),
        }
    }

    Err(fail(ErrorKind::Eof))
}
