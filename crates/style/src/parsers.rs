//! Low-level nom parser functions for CSS-like style values.
//!
//! Lengths are normalized to source-layout (CSS) pixels. This module also holds the
//! balanced-parenthesis scanning shared by variable resolution and color rewriting.

use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while1, take_while_m_n};
use nom::character::complete::{char, multispace0, space1};
use nom::combinator::{map, map_res, opt, recognize, rest};
use nom::multi::separated_list1;
use nom::sequence::{pair, preceded};
use nom::{IResult, Parser};
use thiserror::Error;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },
}

// --- Helper Parsers ---

fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize(pair(
            opt(alt((char('+'), char('-')))),
            alt((
                recognize(pair(
                    take_while_m_n(1, 10, |c: char| c.is_ascii_digit()),
                    opt(pair(
                        char('.'),
                        take_while_m_n(1, 10, |c: char| c.is_ascii_digit()),
                    )),
                )),
                recognize(pair(
                    char('.'),
                    take_while_m_n(1, 10, |c: char| c.is_ascii_digit()),
                )),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

// --- Unit & Length Parsers ---

fn parse_unit(input: &str) -> IResult<&str, f32> {
    alt((
        map(tag_no_case("px"), |_| 1.0),
        map(tag_no_case("pt"), |_| 96.0 / 72.0),
        map(tag_no_case("in"), |_| 96.0),
        map(tag_no_case("cm"), |_| 96.0 / 2.54),
        map(tag_no_case("mm"), |_| 96.0 / 25.4),
    ))
    .parse(input)
}

/// Parses a length with optional unit (e.g., "24px", "0.5in", "10mm") into CSS pixels.
/// A bare number is taken as pixels.
pub fn parse_length(input: &str) -> IResult<&str, f32> {
    let (input, value) = parse_f32(input)?;
    let (input, unit_multiplier) = opt(parse_unit).parse(input)?;
    Ok((input, value * unit_multiplier.unwrap_or(1.0)))
}

/// Parses 1 to 4 whitespace separated lengths (box shorthand).
pub fn parse_length_list(input: &str) -> IResult<&str, Vec<f32>> {
    separated_list1(space1, parse_length).parse(input)
}

/// Helper to run a nom parser and convert its result to a `Result<T, StyleParseError>`.
pub fn run_parser<'a, T, F>(parser: F, input: &'a str) -> Result<T, StyleParseError>
where
    F: Fn(&'a str) -> IResult<&'a str, T>,
{
    match parser(input.trim()) {
        Ok(("", result)) => Ok(result),
        Ok((rem, _)) => Err(StyleParseError::Parse(format!(
            "Parser did not consume all input. Remainder: '{}'",
            rem
        ))),
        Err(e) => Err(StyleParseError::Parse(e.to_string())),
    }
}

/// Resolves a `padding`/`margin` style box shorthand into `(top, bottom)`.
pub fn parse_vertical_box(value: &str) -> Result<(f32, f32), StyleParseError> {
    let parts = run_parser(parse_length_list, value)?;
    match parts.as_slice() {
        [all] => Ok((*all, *all)),
        [y, _] => Ok((*y, *y)),
        [top, _, bottom] | [top, _, bottom, _] => Ok((*top, *bottom)),
        _ => Err(StyleParseError::InvalidValue {
            property: "padding".to_string(),
            value: value.to_string(),
        }),
    }
}

// --- var() arguments ---

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Parses a custom property name such as `--accent-500`.
pub fn parse_custom_property_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("--"), take_while1(is_ident_char))).parse(input)
}

/// Parses the inside of `var(...)`: a name and an optional raw fallback.
pub fn parse_var_arguments(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    map(
        (
            multispace0,
            parse_custom_property_name,
            multispace0,
            opt(preceded(char(','), rest)),
        ),
        |(_, name, _, fallback): (&str, &str, &str, Option<&str>)| {
            (name, fallback.map(str::trim))
        },
    )
    .parse(input)
}

// --- Scanning ---

/// Given the byte index of an opening `(`, returns the byte index of its matching `)`.
///
/// Quoted strings are skipped. Returns `None` when the parentheses never balance.
pub fn find_closing_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (offset, c) in text.get(open..)?.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// If a call to `name(` starts at byte `at` (case-insensitive, not the tail of a longer
/// identifier), returns the byte index of its `(`.
pub fn function_call_at(text: &str, at: usize, name: &str) -> Option<usize> {
    let candidate = text.get(at..at + name.len())?;
    if !candidate.eq_ignore_ascii_case(name) {
        return None;
    }
    if text[..at].chars().next_back().is_some_and(is_ident_char) {
        return None;
    }
    let open = at + name.len();
    (text.get(open..open + 1)? == "(").then_some(open)
}

/// Case-insensitive check for any `name(` call in the text.
pub fn contains_function(text: &str, name: &str) -> bool {
    text.char_indices()
        .any(|(i, _)| function_call_at(text, i, name).is_some())
}
