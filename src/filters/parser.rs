//! Filter query parser for message filtering.
//!
//! # Syntax
//!
//! ```text
//! filter_expr  := field_filter (operator? field_filter)*
//! field_filter := field_name:value | field_name:"quoted value"
//! operator     := AND | OR (case-insensitive)
//! field_name   := sender | since | until | has (case-insensitive)
//! ```
//!
//! Without an explicit operator, two filters on the same field are OR'd and filters on
//! different fields are AND'd, so `sender:alice sender:bob has:media` reads as
//! `(alice OR bob) AND media`. Evaluation is strictly left to right.
//!
//! # Examples
//!
//! ```rust
//! # use chat_export_explorer::filters::parser::parse_filter;
//! let expr = parse_filter("sender:alice").unwrap();
//! let expr = parse_filter("sender:\"Bob Smith\" since:2023-05-01").unwrap();
//! let expr = parse_filter("has:media OR has:ephemeral").unwrap();
//! assert_eq!(expr.filters.len(), 2);
//! ```
//!
//! # Validation
//!
//! - `since` and `until` must be real dates in YYYY-MM-DD form
//! - `has` must be `media`, `text` or `ephemeral`
//! - Empty field names or values are rejected

use std::iter::Peekable;
use std::str::Chars;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;

use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};

/// Accepted `has:` values
pub const HAS_VALUES: [&str; 3] = ["media", "text", "ephemeral"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Filter { field: String, value: String },
    Operator(FilterOperator),
}

fn read_until_whitespace(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            break;
        }
        out.push(ch);
        chars.next();
    }
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut value = String::new();
    for ch in chars.by_ref() {
        if ch == '"' {
            return Ok(value);
        }
        value.push(ch);
    }
    bail!("Unterminated quoted value: \"{}", value)
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut head = String::new();
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() || ch == ':' {
                break;
            }
            head.push(ch);
            chars.next();
        }

        if chars.next_if_eq(&':').is_none() {
            let token = match head.to_uppercase().as_str() {
                "AND" => Token::Operator(FilterOperator::And),
                "OR" => Token::Operator(FilterOperator::Or),
                _ => bail!("Invalid token: '{}' (expected field:value or AND/OR)", head),
            };
            tokens.push(token);
            continue;
        }

        let value = if chars.next_if_eq(&'"').is_some() {
            read_quoted(&mut chars)?
        } else {
            let mut value = String::new();
            read_until_whitespace(&mut chars, &mut value);
            value
        };

        if head.is_empty() || value.trim().is_empty() {
            bail!("Invalid field:value format: '{}:{}'", head, value);
        }
        tokens.push(Token::Filter { field: head, value });
    }

    Ok(tokens)
}

fn parse_field(field: &str) -> Result<FilterField> {
    match field.to_lowercase().as_str() {
        "sender" => Ok(FilterField::Sender),
        "since" => Ok(FilterField::Since),
        "until" => Ok(FilterField::Until),
        "has" => Ok(FilterField::Has),
        _ => Err(anyhow!("Unknown field: '{}' (valid fields: sender, since, until, has)", field)),
    }
}

/// Parse a `YYYY-MM-DD` filter date
pub fn parse_filter_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn validate_value(field: FilterField, value: &str) -> Result<()> {
    match field {
        FilterField::Since | FilterField::Until => {
            if parse_filter_date(value).is_none() {
                bail!("Invalid {} date: '{}' (expected YYYY-MM-DD)", field.name(), value);
            }
        }
        FilterField::Has => {
            if !HAS_VALUES.contains(&value.to_lowercase().as_str()) {
                bail!("Invalid has value: '{}' (must be one of {})", value, HAS_VALUES.join(", "));
            }
        }
        FilterField::Sender => {}
    }
    Ok(())
}

/// Parse a filter query into a [`FilterExpr`]
///
/// An empty or all-whitespace query yields an empty expression, which matches everything.
pub fn parse_filter(input: &str) -> Result<FilterExpr> {
    let tokens = tokenize(input).context("Failed to tokenize filter")?;

    let mut expr = FilterExpr::new();
    let mut pending: Option<FilterOperator> = None;
    let mut last_field: Option<FilterField> = None;

    for token in tokens {
        match token {
            Token::Operator(operator) => {
                if last_field.is_none() || pending.is_some() {
                    bail!("Unexpected {:?} operator (expected field:value)", operator);
                }
                pending = Some(operator);
            }
            Token::Filter { field, value } => {
                let field = parse_field(&field)?;
                validate_value(field, &value)?;

                let operator = pending.take().unwrap_or(match last_field {
                    Some(previous) if previous == field => FilterOperator::Or,
                    _ => FilterOperator::And,
                });
                expr.push(operator, FieldFilter::new(field, &value));
                last_field = Some(field);
            }
        }
    }

    if pending.is_some() {
        bail!("Filter ended with operator (expected field:value)");
    }

    Ok(expr)
}
