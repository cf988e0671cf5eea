// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Restricted JSONPath locator used by `wait_for` conditions.
//!
//! Supports dotted fields, bracketed keys, array indexes (negative counts from
//! the end), wildcards and simple comparison filters such as
//! `$.status.conditions[?(@.type=="Ready")].status`. A path resolves to the
//! first scalar it selects.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{ProviderError, Result};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Field(String),
    Index(i64),
    Wildcard,
    Filter(Filter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
struct Filter {
    path: Vec<Segment>,
    comparison: Option<(CompareOp, Value)>,
}

/// A parsed path into a JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(expr: &str) -> Result<Self> {
        let mut body = expr.trim();
        if let Some(inner) = body.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
            body = inner.trim();
        }

        let segments = parse_segments(body, expr, '$')?;
        if segments.is_empty() {
            return Err(invalid(expr, "path must select a field below the document root"));
        }
        Ok(FieldPath { segments })
    }

    /// Resolve the path and return the first matching scalar as a string.
    pub fn resolve(&self, document: &Value) -> Option<String> {
        evaluate(document, &self.segments)
            .into_iter()
            .find_map(scalar_to_string)
    }
}

impl FromStr for FieldPath {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        write_segments(f, &self.segments)
    }
}

fn write_segments(f: &mut fmt::Formatter<'_>, segments: &[Segment]) -> fmt::Result {
    for segment in segments {
        match segment {
            Segment::Field(name) if is_plain_identifier(name) => write!(f, ".{}", name)?,
            Segment::Field(name) => write!(f, "['{}']", name)?,
            Segment::Index(i) => write!(f, "[{}]", i)?,
            Segment::Wildcard => write!(f, "[*]")?,
            Segment::Filter(filter) => {
                write!(f, "[?(@")?;
                write_segments(f, &filter.path)?;
                if let Some((op, literal)) = &filter.comparison {
                    let op = match op {
                        CompareOp::Eq => "==",
                        CompareOp::Ne => "!=",
                    };
                    write!(f, "{}{}", op, literal)?;
                }
                write!(f, ")]")?;
            }
        }
    }
    Ok(())
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_identifier_char)
}

fn invalid(path: &str, reason: impl Into<String>) -> ProviderError {
    ProviderError::InvalidJsonPath {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn parse_segments(src: &str, full: &str, root: char) -> Result<Vec<Segment>> {
    let normalized;
    let src = match src.chars().next() {
        None => src,
        Some(c) if c == root || c == '.' || c == '[' => src,
        Some(_) => {
            normalized = format!(".{}", src);
            normalized.as_str()
        }
    };

    let chars: Vec<char> = src.chars().collect();
    let mut pos = usize::from(chars.first() == Some(&root));
    let mut segments = Vec::new();

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                match chars.get(pos) {
                    Some('.') => {
                        return Err(invalid(full, "recursive descent '..' is not supported"))
                    }
                    Some('*') => {
                        pos += 1;
                        segments.push(Segment::Wildcard);
                    }
                    Some(&c) => {
                        let start = pos;
                        while pos < chars.len() && is_identifier_char(chars[pos]) {
                            pos += 1;
                        }
                        if pos == start {
                            return Err(invalid(
                                full,
                                format!("unexpected character '{}' in field name", c),
                            ));
                        }
                        let name: String = chars[start..pos].iter().collect();
                        segments.push(Segment::Field(name));
                    }
                    None => return Err(invalid(full, "path ends with '.'")),
                }
            }
            '[' => {
                let end = find_closing_bracket(&chars, pos)
                    .ok_or_else(|| invalid(full, "unterminated '['"))?;
                let inner: String = chars[pos + 1..end].iter().collect();
                segments.push(parse_bracket(inner.trim(), full)?);
                pos = end + 1;
            }
            c => return Err(invalid(full, format!("unexpected character '{}'", c))),
        }
    }

    Ok(segments)
}

/// Index of the `]` matching the `[` at `open`, skipping quoted text and nesting
fn find_closing_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, &c) in chars.iter().enumerate().skip(open) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_bracket(inner: &str, full: &str) -> Result<Segment> {
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    if let Some(key) = unquote(inner) {
        return Ok(Segment::Field(key.to_string()));
    }
    if let Some(expr) = inner.strip_prefix("?(").and_then(|e| e.strip_suffix(')')) {
        return parse_filter(expr.trim(), full).map(Segment::Filter);
    }
    inner
        .parse::<i64>()
        .map(Segment::Index)
        .map_err(|_| invalid(full, format!("unsupported bracket expression '[{}]'", inner)))
}

/// Strip matching quotes; the closing quote must be the only other one
fn unquote(s: &str) -> Option<&str> {
    let quote = s.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    if s.len() < 2 || !s.ends_with(quote) {
        return None;
    }
    let inner = &s[1..s.len() - 1];
    (!inner.contains(quote)).then_some(inner)
}

fn parse_filter(expr: &str, full: &str) -> Result<Filter> {
    let (left, comparison) = match find_operator(expr, full)? {
        Some((idx, op)) => {
            let literal = parse_literal(expr[idx + 2..].trim(), full)?;
            (expr[..idx].trim(), Some((op, literal)))
        }
        None => (expr, None),
    };

    if !left.starts_with('@') {
        return Err(invalid(full, "filter expressions must start with '@'"));
    }

    Ok(Filter {
        path: parse_segments(left, full, '@')?,
        comparison,
    })
}

/// Locate the single `==` or `!=` of a filter, rejecting any other operator
fn find_operator(expr: &str, full: &str) -> Result<Option<(usize, CompareOp)>> {
    let bytes = expr.as_bytes();
    let mut quote: Option<u8> = None;
    let mut found = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match (c, bytes.get(i + 1)) {
                (b'\'' | b'"', _) => quote = Some(c),
                (b'=' | b'!', Some(b'=')) => {
                    if found.is_some() {
                        return Err(invalid(full, "filters support a single comparison"));
                    }
                    let op = if c == b'=' { CompareOp::Eq } else { CompareOp::Ne };
                    found = Some((i, op));
                    i += 1;
                }
                (b'<' | b'>' | b'&' | b'|', _) => {
                    return Err(invalid(
                        full,
                        format!("unsupported operator in filter '{}', use == or !=", expr),
                    ))
                }
                _ => {}
            },
        }
        i += 1;
    }

    if quote.is_some() {
        return Err(invalid(full, "unterminated quote in filter"));
    }
    Ok(found)
}

fn parse_literal(raw: &str, full: &str) -> Result<Value> {
    if let Some(s) = unquote(raw) {
        return Ok(Value::String(s.to_string()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => Ok(v),
        _ => Err(invalid(full, format!("unsupported filter literal '{}'", raw))),
    }
}

fn evaluate<'a>(root: &'a Value, segments: &[Segment]) -> Vec<&'a Value> {
    let mut nodes = vec![root];
    for segment in segments {
        nodes = nodes
            .into_iter()
            .flat_map(|node| select(node, segment))
            .collect();
        if nodes.is_empty() {
            break;
        }
    }
    nodes
}

fn select<'a>(node: &'a Value, segment: &Segment) -> Vec<&'a Value> {
    match segment {
        Segment::Field(name) => node.get(name.as_str()).into_iter().collect(),
        Segment::Index(i) => {
            let Some(items) = node.as_array() else {
                return Vec::new();
            };
            let idx = if *i < 0 { items.len() as i64 + i } else { *i };
            usize::try_from(idx)
                .ok()
                .and_then(|idx| items.get(idx))
                .into_iter()
                .collect()
        }
        Segment::Wildcard => children(node),
        Segment::Filter(filter) => children(node)
            .into_iter()
            .filter(|child| filter.matches(child))
            .collect(),
    }
}

fn children(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

impl Filter {
    fn matches(&self, node: &Value) -> bool {
        let found = evaluate(node, &self.path);
        match &self.comparison {
            None => found.iter().any(|v| !v.is_null()),
            Some((op, literal)) => {
                let equal = found.iter().any(|v| literal_eq(v, literal));
                match op {
                    CompareOp::Eq => equal,
                    CompareOp::Ne => !equal,
                }
            }
        }
    }
}

fn literal_eq(value: &Value, literal: &Value) -> bool {
    match (value, literal) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => value == literal,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
