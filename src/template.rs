//! Parse template text into an ordered, immutable field list.
//!
//! A template is a sequence of `name=value` entries separated by line breaks
//! or commas. The value decides the field kind once, at parse time:
//!
//! - even-length hex digit run (`hdr=cafe01`): fixed-width binary literal
//! - any other non-empty value (`code=OK`): text literal
//! - `len(target)` / `len(target, n)`: computed length field (n bytes,
//!   default 2) holding the encoded size of a later field
//! - empty (`trailer=`): wildcard, matches any content on compare
//!
//! A wildcard gets its decode width from an earlier `len()` field naming it,
//! or from the slack left over once every following field has taken its
//! fixed share. Only one slack field is allowed per template.

use crate::bytes::hex_to_bytes;
use pest::Parser;
use pest_derive::Parser as PestParser;
use std::collections::HashMap;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct TemplateParser;

/// Errors from template parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("template is empty")]
    Empty,
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("duplicate field name: {0}")]
    DuplicateName(String),
    #[error("field {field}: len() target {target} is not defined")]
    UnknownLengthTarget { field: String, target: String },
    #[error("field {field}: len() target {target} must come after the length field")]
    LengthTargetOrder { field: String, target: String },
    #[error("field {field}: {target} already has a length field")]
    DuplicateLengthTarget { field: String, target: String },
    #[error("field {field}: len() width {width} not supported (use 1, 2, 4 or 8)")]
    BadLengthWidth { field: String, width: usize },
    #[error("field {field}: only one field without a declared width is allowed")]
    MultipleUnsized { field: String },
    #[error("field {field}: wildcard after an open-ended field cannot be sized")]
    UnsizedNotLast { field: String },
}

/// How a field's bytes are produced and consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed-width binary literal, decoded from hex digit pairs.
    Hex(Vec<u8>),
    /// Literal text emitted as its UTF-8 bytes.
    Text(String),
    /// Unsigned integer holding the encoded byte length of field `of`.
    Length { of: String, width: usize },
    /// No expected content; consumes its resolved width and always matches.
    Wildcard,
}

/// One named slot in a template. Order is wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// The literal value text as written in the template (empty for wildcards).
    pub raw: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, FieldKind::Wildcard)
    }

    /// Width in bytes when it is knowable from the template alone.
    pub fn static_width(&self) -> Option<usize> {
        match &self.kind {
            FieldKind::Hex(b) => Some(b.len()),
            FieldKind::Text(s) => Some(s.len()),
            FieldKind::Length { width, .. } => Some(*width),
            FieldKind::Wildcard => None,
        }
    }
}

/// Ordered, immutable sequence of fields parsed from template text.
/// Cheap to clone; safe to share read-only across callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    fields: Vec<FieldSpec>,
    by_name: HashMap<String, usize>,
    /// target field index -> index of the len() field that sizes it
    length_source: HashMap<usize, usize>,
    /// len() field index -> target field index
    length_target: HashMap<usize, usize>,
}

impl Template {
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Index of the len() field that sizes field `target`, if any.
    pub fn length_source(&self, target: usize) -> Option<usize> {
        self.length_source.get(&target).copied()
    }

    /// Index of the field sized by the len() field at `len_idx`, if any.
    pub fn length_target(&self, len_idx: usize) -> Option<usize> {
        self.length_target.get(&len_idx).copied()
    }

    fn build(fields: Vec<FieldSpec>) -> Result<Self, ParseError> {
        if fields.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut by_name = HashMap::new();
        for (i, f) in fields.iter().enumerate() {
            if by_name.insert(f.name.clone(), i).is_some() {
                return Err(ParseError::DuplicateName(f.name.clone()));
            }
        }
        let mut length_source = HashMap::new();
        let mut length_target = HashMap::new();
        for (i, f) in fields.iter().enumerate() {
            if let FieldKind::Length { of, width } = &f.kind {
                if ![1, 2, 4, 8].contains(width) {
                    return Err(ParseError::BadLengthWidth {
                        field: f.name.clone(),
                        width: *width,
                    });
                }
                let target = *by_name.get(of).ok_or_else(|| ParseError::UnknownLengthTarget {
                    field: f.name.clone(),
                    target: of.clone(),
                })?;
                if target <= i {
                    return Err(ParseError::LengthTargetOrder {
                        field: f.name.clone(),
                        target: of.clone(),
                    });
                }
                if length_source.insert(target, i).is_some() {
                    return Err(ParseError::DuplicateLengthTarget {
                        field: f.name.clone(),
                        target: of.clone(),
                    });
                }
                length_target.insert(i, target);
            }
        }
        // Wildcards without a length source take the slack; decode can size
        // that only when every later field has a fixed width.
        let mut unsized_at: Option<usize> = None;
        for (i, f) in fields.iter().enumerate() {
            if !f.is_wildcard() {
                continue;
            }
            if unsized_at.is_some() {
                return Err(if length_source.contains_key(&i) {
                    ParseError::UnsizedNotLast {
                        field: f.name.clone(),
                    }
                } else {
                    ParseError::MultipleUnsized {
                        field: f.name.clone(),
                    }
                });
            }
            if !length_source.contains_key(&i) {
                unsized_at = Some(i);
            }
        }
        Ok(Template {
            fields,
            by_name,
            length_source,
            length_target,
        })
    }
}

/// Parse template text into a [`Template`].
pub fn parse(text: &str) -> Result<Template, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let pairs = TemplateParser::parse(Rule::template, text)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;
    let root = pairs.into_iter().next().ok_or(ParseError::Empty)?;
    let mut fields = Vec::new();
    for entry in root.into_inner() {
        if entry.as_rule() != Rule::entry {
            continue;
        }
        fields.push(build_field(entry)?);
    }
    Template::build(fields)
}

fn build_field(pair: pest::iterators::Pair<Rule>) -> Result<FieldSpec, ParseError> {
    let mut name = String::new();
    let mut kind = FieldKind::Wildcard;
    let mut raw = String::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => name = inner.as_str().to_string(),
            Rule::value => {
                raw = inner.as_str().trim().to_string();
                kind = build_value(inner)?;
            }
            _ => {}
        }
    }
    if let FieldKind::Wildcard = kind {
        raw.clear();
    }
    Ok(FieldSpec { name, raw, kind })
}

fn build_value(pair: pest::iterators::Pair<Rule>) -> Result<FieldKind, ParseError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::Syntax("empty value".to_string()))?;
    match inner.as_rule() {
        Rule::length_value => {
            let mut of = String::new();
            let mut width = 2usize;
            for part in inner.into_inner() {
                match part.as_rule() {
                    Rule::name => of = part.as_str().to_string(),
                    Rule::num => {
                        width = part
                            .as_str()
                            .parse()
                            .map_err(|_| ParseError::Syntax("len() width".to_string()))?;
                    }
                    _ => {}
                }
            }
            Ok(FieldKind::Length { of, width })
        }
        Rule::literal_value => Ok(classify_literal(inner.as_str().trim())),
        _ => Err(ParseError::Syntax(format!(
            "unhandled value rule: {:?}",
            inner.as_rule()
        ))),
    }
}

/// Classify a literal value: an even run of hex digits is binary, anything
/// else (including an odd hex run like "1") is text.
pub(crate) fn classify_literal(value: &str) -> FieldKind {
    if value.is_empty() {
        return FieldKind::Wildcard;
    }
    if value.len() % 2 == 0 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        // even + all hex digits: cannot fail
        if let Ok(bytes) = hex_to_bytes(value) {
            return FieldKind::Hex(bytes);
        }
    }
    FieldKind::Text(value.to_string())
}

/// Split a trailing digit run off a field name: `id1` -> ("id", Some(1)).
/// Array-sibling fields share the base and differ only in the suffix.
pub fn array_base(name: &str) -> (&str, Option<u32>) {
    let digits = name.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits == name.len() {
        return (name, None);
    }
    let split = name.len() - digits;
    (&name[..split], name[split..].parse().ok())
}
