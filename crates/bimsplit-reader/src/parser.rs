//! Parser for the STEP physical-file DATA section.
//!
//! This module scans the `DATA; ... ENDSEC;` section of an IFC/STEP file and
//! produces one [`RawEntity`] per well-formed `#id = ENTITY(args);`
//! statement. Parsing is error-recovering: a malformed statement yields a
//! warning diagnostic and scanning resumes after the next `;`, so one broken
//! line never discards the file. The public entry point is [`parse_data`].

use winnow::{
    Parser as _,
    ascii::{digit1, float, multispace1},
    combinator::{alt, delimited, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_till, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = Result<O, ErrMode<ContextError>>;

/// One attribute value of a STEP entity instance.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StepValue {
    /// `$` — attribute not provided.
    Null,
    /// `*` — attribute derived elsewhere.
    Derived,
    /// `#123` — reference to another instance.
    Ref(u64),
    /// `'...'` — string, with `''` unescaped to `'`.
    Str(String),
    /// `.IDENT.` — enumeration value.
    Enum(String),
    /// `(a, b, ...)` — aggregate.
    List(Vec<StepValue>),
    /// `IFCTYPE(...)` — typed (select) value.
    Typed(String, Vec<StepValue>),
    /// Plain number.
    Number(f64),
}

impl StepValue {
    /// Returns the string content, if this is a string value.
    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            StepValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the referenced instance id, if this is a reference.
    pub(crate) fn as_ref_id(&self) -> Option<u64> {
        match self {
            StepValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the enumeration name, if this is an enum value.
    pub(crate) fn as_enum(&self) -> Option<&str> {
        match self {
            StepValue::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the numeric value, if this is a number.
    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            StepValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// One parsed entity instance statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawEntity {
    pub(crate) id: u64,
    pub(crate) class: String,
    pub(crate) attrs: Vec<StepValue>,
    pub(crate) span: Span,
}

/// Parse whitespace and block comments.
fn ws(input: &mut Input<'_>) -> IResult<()> {
    repeat(
        0..,
        alt((
            multispace1.void(),
            ("/*", take_until(0.., "*/"), "*/").void(),
        )),
    )
    .parse_next(input)
}

/// Parse a STEP keyword (entity or type name).
fn keyword<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic()),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

/// Parse a STEP string literal. A quote inside the string is written `''`.
fn step_string(input: &mut Input<'_>) -> IResult<String> {
    '\''.parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk: &str = take_till(0.., '\'').parse_next(input)?;
        out.push_str(chunk);
        '\''.parse_next(input)?;
        if opt('\'').parse_next(input)?.is_some() {
            out.push('\'');
        } else {
            return Ok(out);
        }
    }
}

/// Parse an `#123` instance reference.
fn entity_ref(input: &mut Input<'_>) -> IResult<u64> {
    preceded('#', digit1.parse_to::<u64>()).parse_next(input)
}

/// Parse a `.VALUE.` enumeration literal.
fn enum_literal(input: &mut Input<'_>) -> IResult<String> {
    delimited(
        '.',
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
        '.',
    )
    .map(|s: &str| s.to_string())
    .parse_next(input)
}

/// Parse a parenthesized, comma-separated argument list.
fn arg_list(input: &mut Input<'_>) -> IResult<Vec<StepValue>> {
    delimited(
        '(',
        separated(0.., delimited(ws, value, ws), ','),
        preceded(ws, ')'),
    )
    .parse_next(input)
}

/// Parse one attribute value.
fn value(input: &mut Input<'_>) -> IResult<StepValue> {
    alt((
        '$'.value(StepValue::Null),
        '*'.value(StepValue::Derived),
        entity_ref.map(StepValue::Ref),
        step_string.map(StepValue::Str),
        enum_literal.map(StepValue::Enum),
        arg_list.map(StepValue::List),
        (keyword, preceded(ws, arg_list))
            .map(|(name, args)| StepValue::Typed(name.to_ascii_uppercase(), args)),
        float.map(StepValue::Number),
    ))
    .parse_next(input)
}

/// Parse one `#id = ENTITY(args);` statement.
fn statement(input: &mut Input<'_>) -> IResult<(u64, String, Vec<StepValue>)> {
    let id = preceded('#', digit1.parse_to::<u64>()).parse_next(input)?;
    delimited(ws, '=', ws).void().parse_next(input)?;
    let class = keyword.parse_next(input)?;
    let attrs = preceded(ws, arg_list).parse_next(input)?;
    (ws, ';').void().parse_next(input)?;
    Ok((id, class.to_ascii_uppercase(), attrs))
}

/// Parse the DATA section of `src` into raw entities.
///
/// File-structure problems (no DATA section, unterminated section) produce
/// error diagnostics; malformed statements produce warnings and are
/// skipped.
pub(crate) fn parse_data(src: &str, collector: &mut DiagnosticCollector) -> Vec<RawEntity> {
    let Some(data_pos) = src.find("DATA;") else {
        collector.push(
            Diagnostic::error("no DATA section found")
                .with_code(ErrorCode::E001)
                .with_help("is this a STEP physical file?"),
        );
        return Vec::new();
    };
    let body_start = data_pos + "DATA;".len();
    let Some(end_rel) = src[body_start..].find("ENDSEC;") else {
        collector.push(
            Diagnostic::error("DATA section is not terminated")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(data_pos..body_start), "section opened here")
                .with_help("expected a matching ENDSEC;"),
        );
        return Vec::new();
    };
    let body = &src[body_start..body_start + end_rel];

    let mut input = LocatingSlice::new(body);
    let mut entities = Vec::new();

    loop {
        let _ = ws.parse_next(&mut input);
        if input.eof_offset() == 0 {
            break;
        }
        let start = input.current_token_start();
        match statement.with_span().parse_next(&mut input) {
            Ok(((id, class, attrs), range)) => {
                entities.push(RawEntity {
                    id,
                    class,
                    attrs,
                    span: Span::new(body_start + range.start..body_start + range.end),
                });
            }
            Err(_) => {
                // Recover at the next statement boundary.
                let _ = (take_till::<_, _, ErrMode<ContextError>>(0.., ';'), opt(';'))
                    .parse_next(&mut input);
                let end = input.current_token_start();
                collector.push(
                    Diagnostic::warning("malformed entity statement skipped")
                        .with_code(ErrorCode::E101)
                        .with_label(
                            Span::new(body_start + start..body_start + end),
                            "could not be parsed",
                        ),
                );
            }
        }
    }

    entities
}
