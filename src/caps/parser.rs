//! Caps string parser using winnow.
//!
//! Parses textual capability expressions:
//!
//! ```text
//! audio/x-raw-int, rate=(int)44100, channels=(int)[ 1, 2 ], width=(int){ 16, 24 }
//! audio/x-raw-float, width=(int)32; audio/x-raw-int, width=(int)16
//! ```
//!
//! # Syntax
//!
//! - Structures are separated by `;`, fields by `,`
//! - Fields are `name=value` with an optional `(type)` annotation
//! - `[ a, b ]` is an inclusive range, `{ a, b }` a list of alternatives
//! - `< a, b >` is an ordered array (channel positions)
//! - `EMPTY` (or an empty string) denotes caps matching nothing

use super::{AudioCaps, AudioStructure};
use crate::channel::{ChannelLayout, ChannelPosition, LayoutCandidate, LayoutCaps};
use crate::error::{Error, Result};
use crate::format::{CapsValue, Endianness, SampleFamily};
use std::fmt;
use winnow::Parser;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated};
use winnow::error::ContextError;
use winnow::token::{take_till, take_while};

type WResult<T> = std::result::Result<T, ContextError>;

/// A field value as written, before it is interpreted.
#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Int(i64),
    Bool(bool),
    Word(String),
    Range(i64, i64),
    List(Vec<FieldValue>),
    Array(Vec<FieldValue>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[FieldValue]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Word(v) => f.write_str(v),
            FieldValue::Range(a, b) => write!(f, "[ {a}, {b} ]"),
            FieldValue::List(items) => {
                f.write_str("{ ")?;
                join(f, items)?;
                f.write_str(" }")
            }
            FieldValue::Array(items) => {
                f.write_str("< ")?;
                join(f, items)?;
                f.write_str(" >")
            }
        }
    }
}

/// A parsed structure before its fields are interpreted.
struct RawStructure {
    name: String,
    fields: Vec<(String, FieldValue)>,
}

/// Parse a caps string.
///
/// # Example
///
/// ```rust
/// use audioconvert::caps::parse_caps;
///
/// let caps = parse_caps("audio/x-raw-float, width=(int){ 32, 64 }; audio/x-raw-int").unwrap();
/// assert_eq!(caps.len(), 2);
/// ```
pub fn parse_caps(input: &str) -> Result<AudioCaps> {
    let input = input.trim();
    if input.is_empty() || input == "EMPTY" {
        return Ok(AudioCaps::new_empty());
    }

    let raw = caps
        .parse(input)
        .map_err(|e| Error::format(format!("caps parse error: {e}")))?;

    let mut result = AudioCaps::new_empty();
    for structure in raw {
        result.append(build_structure(structure)?);
    }
    Ok(result)
}

/// Parse a complete caps string.
fn caps(input: &mut &str) -> WResult<Vec<RawStructure>> {
    let structures = separated(1.., structure, structure_separator).parse_next(input)?;

    // Allow a trailing separator
    let _ = opt(structure_separator).parse_next(input)?;
    multispace0.parse_next(input)?;
    if !input.is_empty() {
        return Err(ContextError::new());
    }

    Ok(structures)
}

/// Parse the structure separator `;`.
fn structure_separator(input: &mut &str) -> WResult<()> {
    let _ = multispace0.parse_next(input)?;
    let _ = ';'.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    Ok(())
}

/// Parse the value separator `,`.
fn comma(input: &mut &str) -> WResult<()> {
    let _ = multispace0.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    Ok(())
}

/// Parse a structure (media type + fields).
fn structure(input: &mut &str) -> WResult<RawStructure> {
    let _ = multispace0.parse_next(input)?;
    let name: &str =
        take_while(1.., |c: char| c.is_alphanumeric() || "/-_.+".contains(c)).parse_next(input)?;
    let fields: Vec<(String, FieldValue)> = repeat(0.., preceded(comma, field)).parse_next(input)?;

    Ok(RawStructure {
        name: name.to_string(),
        fields,
    })
}

/// Parse a field (name=value).
fn field(input: &mut &str) -> WResult<(String, FieldValue)> {
    let key: &str =
        take_while(1.., |c: char| c.is_alphanumeric() || c == '-' || c == '_').parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let _ = '='.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let value = value.parse_next(input)?;

    Ok((key.to_string(), value))
}

/// Parse a value with an optional type annotation.
fn value(input: &mut &str) -> WResult<FieldValue> {
    let _ = opt(type_annotation).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    alt((
        range,
        list.map(FieldValue::List),
        array.map(FieldValue::Array),
        integer.map(FieldValue::Int),
        quoted_string.map(FieldValue::Word),
        word,
    ))
    .parse_next(input)
}

/// Parse a `(type)` annotation.
fn type_annotation<'a>(input: &mut &'a str) -> WResult<&'a str> {
    delimited(
        '(',
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_'),
        ')',
    )
    .parse_next(input)
}

/// Parse an inclusive integer range `[ min, max ]`.
fn range(input: &mut &str) -> WResult<FieldValue> {
    let _ = '['.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let min = integer.parse_next(input)?;
    comma.parse_next(input)?;
    let max = integer.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let _ = ']'.parse_next(input)?;

    Ok(FieldValue::Range(min, max))
}

/// Parse a list of alternatives `{ a, b }`.
fn list(input: &mut &str) -> WResult<Vec<FieldValue>> {
    let _ = '{'.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let items = separated(1.., value, comma).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let _ = '}'.parse_next(input)?;
    Ok(items)
}

/// Parse an ordered array `< a, b >`.
fn array(input: &mut &str) -> WResult<Vec<FieldValue>> {
    let _ = '<'.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let items = separated(1.., value, comma).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let _ = '>'.parse_next(input)?;
    Ok(items)
}

/// Parse an integer.
fn integer(input: &mut &str) -> WResult<i64> {
    let negative = opt('-').parse_next(input)?;
    let digits: &str = digit1.parse_next(input)?;
    let value: i64 = digits.parse().map_err(|_| ContextError::new())?;

    Ok(if negative.is_some() { -value } else { value })
}

/// Parse a quoted string.
fn quoted_string(input: &mut &str) -> WResult<String> {
    delimited('"', take_till(0.., '"'), '"')
        .map(|s: &str| s.to_string())
        .parse_next(input)
}

/// Parse a bare word; `true` and `false` become booleans.
fn word(input: &mut &str) -> WResult<FieldValue> {
    take_while(1.., |c: char| c.is_alphanumeric() || "-_./:+".contains(c))
        .map(|s: &str| match s {
            "true" | "TRUE" => FieldValue::Bool(true),
            "false" | "FALSE" => FieldValue::Bool(false),
            other => FieldValue::Word(other.to_string()),
        })
        .parse_next(input)
}

// ============================================================================
// Field interpretation
// ============================================================================

fn build_structure(raw: RawStructure) -> Result<AudioStructure> {
    let family = match raw.name.as_str() {
        "audio/x-raw-int" => SampleFamily::Int,
        "audio/x-raw-float" => SampleFamily::Float,
        other => return Err(Error::format(format!("unsupported media type '{other}'"))),
    };

    let mut s = AudioStructure::new(family);
    for (name, value) in raw.fields {
        match name.as_str() {
            "rate" => s.rate = int_caps(&name, &value)?,
            "channels" => s.channels = int_caps(&name, &value)?,
            "width" => s.width = int_caps(&name, &value)?,
            "depth" => s.depth = int_caps(&name, &value)?,
            "signed" => s.signed = bool_caps(&name, &value)?,
            "endianness" => s.endianness = endianness_caps(&name, &value)?,
            "channel-positions" => s.layout = layout_caps(&value)?,
            _ => s.extra.push((name.clone(), value.to_string())),
        }
    }
    Ok(s)
}

fn invalid(name: &str, value: &FieldValue) -> Error {
    Error::format(format!("invalid value '{value}' for field '{name}'"))
}

fn to_u32(name: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| invalid(name, &FieldValue::Int(value)))
}

/// Interpret a list of scalars with `scalar`, collapsing single entries.
fn list_caps<T: Clone + Ord>(
    name: &str,
    value: &FieldValue,
    scalar: impl Fn(&FieldValue) -> Result<T>,
) -> Result<CapsValue<T>> {
    match value {
        FieldValue::List(items) => {
            let values = items.iter().map(&scalar).collect::<Result<Vec<_>>>()?;
            CapsValue::from_values(values).ok_or_else(|| invalid(name, value))
        }
        other => Ok(CapsValue::Fixed(scalar(other)?)),
    }
}

fn int_caps(name: &str, value: &FieldValue) -> Result<CapsValue<u32>> {
    if let FieldValue::Range(min, max) = value {
        return CapsValue::range(to_u32(name, *min)?, to_u32(name, *max)?)
            .ok_or_else(|| invalid(name, value));
    }
    list_caps(name, value, |v| match v {
        FieldValue::Int(i) => to_u32(name, *i),
        other => Err(invalid(name, other)),
    })
}

fn bool_caps(name: &str, value: &FieldValue) -> Result<CapsValue<bool>> {
    list_caps(name, value, |v| match v {
        FieldValue::Bool(b) => Ok(*b),
        other => Err(invalid(name, other)),
    })
}

fn endianness_caps(name: &str, value: &FieldValue) -> Result<CapsValue<Endianness>> {
    list_caps(name, value, |v| match v {
        FieldValue::Int(code) => Endianness::from_code(*code).ok_or_else(|| invalid(name, v)),
        FieldValue::Word(w) => match w.as_str() {
            "little" | "LITTLE_ENDIAN" => Ok(Endianness::Little),
            "big" | "BIG_ENDIAN" => Ok(Endianness::Big),
            "BYTE_ORDER" | "native" => Ok(Endianness::NATIVE),
            _ => Err(invalid(name, v)),
        },
        other => Err(invalid(name, other)),
    })
}

fn layout_caps(value: &FieldValue) -> Result<LayoutCaps> {
    match value {
        FieldValue::Array(_) => Ok(LayoutCaps::Fixed(layout(value)?)),
        FieldValue::List(items) => {
            let candidates = items.iter().map(candidate).collect::<Result<Vec<_>>>()?;
            Ok(LayoutCaps::from_candidates(candidates))
        }
        other => Err(invalid("channel-positions", other)),
    }
}

fn candidate(value: &FieldValue) -> Result<LayoutCandidate> {
    match value {
        FieldValue::Array(_) => Ok(LayoutCandidate::Layout(layout(value)?)),
        FieldValue::List(items) => Ok(LayoutCandidate::Alternatives(
            items.iter().map(candidate).collect::<Result<Vec<_>>>()?,
        )),
        other => Err(invalid("channel-positions", other)),
    }
}

fn layout(value: &FieldValue) -> Result<ChannelLayout> {
    let FieldValue::Array(items) = value else {
        return Err(invalid("channel-positions", value));
    };

    let positions = items
        .iter()
        .map(|item| match item {
            FieldValue::Word(w) => w.parse::<ChannelPosition>(),
            other => Err(invalid("channel-positions", other)),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ChannelLayout::from_positions(positions))
}
