use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace1},
    combinator::{cut, map, recognize, value, verify},
    error::ErrorKind,
    multi::{many0, many0_count},
    sequence::{pair, preceded, terminated},
};

use crate::ast::{NumberType, Sexpr, is_atom_char, is_numeric_literal};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind, ensure_sufficient_stack};

/// Reader settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Maximum nesting depth of lists and quotes
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            max_depth: MAX_PARSE_DEPTH,
        }
    }
}

/// Skip a `;` comment up to (not including) the end of the line
fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char(';'), take_while(|c: char| c != '\n'))).parse(input)
}

/// Skip any mix of whitespace and comments
fn skip_ws(input: &str) -> IResult<&str, ()> {
    value((), many0_count(alt((multispace1, comment)))).parse(input)
}

/// Numeric literals become numbers, every other atom a symbol
fn classify_atom(atom: &str) -> Sexpr {
    match atom.parse::<NumberType>() {
        Ok(n) if is_numeric_literal(atom) => Sexpr::Number(n),
        _ => Sexpr::Symbol(atom.to_owned()),
    }
}

/// Parse an atom: a maximal run of atom characters not starting with a quote
fn parse_atom(input: &str) -> IResult<&str, Sexpr> {
    map(
        verify(take_while1(is_atom_char), |atom: &str| !atom.starts_with('\'')),
        classify_atom,
    )
    .parse(input)
}

/// Parse a list; elements may be separated and surrounded by whitespace and comments
fn parse_list(input: &str, depth: usize, max_depth: usize) -> IResult<&str, Sexpr> {
    let (input, _) = char('(').parse(input)?;
    let (input, elements) = many0(|input| parse_sexpr(input, depth + 1, max_depth)).parse(input)?;
    // Once a list is open, only its closing paren may follow the elements
    let (input, _) = cut(preceded(skip_ws, char(')'))).parse(input)?;
    Ok((input, Sexpr::List(elements)))
}

/// Parse quoted expression ('expr -> (quote expr))
fn parse_quote(input: &str, depth: usize, max_depth: usize) -> IResult<&str, Sexpr> {
    let (input, _) = char('\'').parse(input)?;
    let (input, datum) = cut(|input| parse_sexpr(input, depth + 1, max_depth)).parse(input)?;
    Ok((
        input,
        Sexpr::List(vec![Sexpr::Symbol("quote".into()), datum]),
    ))
}

/// Parse an S-expression preceded by optional whitespace and comments
fn parse_sexpr(input: &str, depth: usize, max_depth: usize) -> IResult<&str, Sexpr> {
    if depth >= max_depth {
        // Failure, not Error: enclosing `many0` must not treat this as the end of a list
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::TooLarge,
        )));
    }
    ensure_sufficient_stack(|| {
        preceded(
            skip_ws,
            alt((
                |input| parse_quote(input, depth, max_depth),
                |input| parse_list(input, depth, max_depth),
                parse_atom,
            )),
        )
        .parse(input)
    })
}

/// The token starting at `rest`, for error reports
fn next_token(rest: &str) -> Option<String> {
    let atom: String = rest.chars().take_while(|&c| is_atom_char(c)).collect();
    if atom.is_empty() {
        rest.chars().next().map(String::from)
    } else {
        Some(atom)
    }
}

/// Convert a nom error into a positioned parse error
fn to_parse_error(input: &str, error: &nom::error::Error<&str>, max_depth: usize) -> ParseError {
    let position = input.len().saturating_sub(error.input.len());
    if error.code == ErrorKind::TooLarge {
        ParseError::with_context(
            ParseErrorKind::TooDeeplyNested,
            format!("Expression too deeply nested (max depth: {max_depth})"),
            input,
            position,
        )
    } else if error.input.is_empty() {
        ParseError::with_context(
            ParseErrorKind::Incomplete,
            "Unexpected end of input",
            input,
            position,
        )
    } else {
        ParseError::with_context_and_found(
            ParseErrorKind::InvalidSyntax,
            "Unexpected token",
            input,
            position,
            next_token(error.input),
        )
    }
}

/// Parse exactly one S-expression from source text.
pub fn parse_scheme(input: &str) -> Result<Sexpr, Error> {
    parse_scheme_with_config(input, &ParseConfig::default())
}

/// Parse exactly one S-expression with explicit reader settings.
pub fn parse_scheme_with_config(input: &str, config: &ParseConfig) -> Result<Sexpr, Error> {
    let max_depth = config.max_depth;
    match terminated(|input| parse_sexpr(input, 0, max_depth), skip_ws).parse(input) {
        Ok(("", expr)) => Ok(expr),
        Ok((remaining, _)) => Err(ParseError::with_context_and_found(
            ParseErrorKind::TrailingContent,
            "Unexpected remaining input after expression",
            input,
            input.len() - remaining.len(),
            next_token(remaining),
        )
        .into()),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            Err(to_parse_error(input, &e, max_depth).into())
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::with_context(
            ParseErrorKind::Incomplete,
            "Unexpected end of input",
            input,
            input.len(),
        )
        .into()),
    }
}
