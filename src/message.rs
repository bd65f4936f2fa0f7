//! Bind a template to concrete values and encode/decode wire bytes.
//!
//! A [`Message`] is a [`Template`] plus per-field values: seeded from the
//! template's own literals for an outbound or "expected" message, or
//! recovered from a raw payload by [`Codec::decode`]. The decode cursor and
//! the leftover-byte count are private to the message doing the decoding.
//!
//! Encoding runs in two passes: literal fields are emitted and their spans
//! recorded, then `len()` fields are backfilled with the encoded size of
//! their target. The resolved length value is written back into the message
//! so a later comparison sees a concrete value, not a placeholder.

use crate::bytes::{bytes_to_hex, hex_to_bytes, pretty_hex, HexError};
use crate::template::{array_base, classify_literal, FieldKind, Template};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::collections::HashMap;

/// Byte order for computed length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

/// Observer the codec calls on every encode/decode. No default target:
/// traffic dumping happens only when a sink is injected.
pub trait TraceSink {
    fn on_encode(&self, bytes: &[u8]) {
        let _ = bytes;
    }
    fn on_decode(&self, bytes: &[u8], consumed: usize, leftover: usize) {
        let _ = (bytes, consumed, leftover);
    }
}

/// Trace sink that pretty-dumps traffic to stderr.
pub struct HexDumpTrace;

impl TraceSink for HexDumpTrace {
    fn on_encode(&self, bytes: &[u8]) {
        eprintln!("encode: {} byte(s)\n{}", bytes.len(), pretty_hex(bytes));
    }

    fn on_decode(&self, bytes: &[u8], consumed: usize, leftover: usize) {
        eprintln!(
            "decode: {} byte(s), consumed {}, leftover {}\n{}",
            bytes.len(),
            consumed,
            leftover,
            pretty_hex(bytes)
        );
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field {field}: {source}")]
    Hex {
        field: String,
        #[source]
        source: HexError,
    },
    #[error("field {field}: length {len} does not fit in {width} byte(s)")]
    LengthOverflow {
        field: String,
        len: usize,
        width: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no payload bound to message")]
    MissingPayload,
    #[error("field {field}: need {needed} more byte(s), {available} available")]
    BufferExhausted {
        field: String,
        needed: usize,
        available: usize,
    },
}

/// A template bound to field values, plus decode bookkeeping.
#[derive(Debug, Clone)]
pub struct Message {
    template: Template,
    values: Vec<String>,
    raw: Option<Vec<u8>>,
    consumed: usize,
    leftover: usize,
}

impl Message {
    /// Message whose values come from the template's own literals
    /// (the "expected" side, or an outbound message to encode).
    pub fn new(template: Template) -> Self {
        let values = template
            .fields()
            .iter()
            .map(|f| match &f.kind {
                FieldKind::Hex(b) => bytes_to_hex(b),
                FieldKind::Text(s) => s.clone(),
                FieldKind::Length { .. } | FieldKind::Wildcard => String::new(),
            })
            .collect();
        Message {
            template,
            values,
            raw: None,
            consumed: 0,
            leftover: 0,
        }
    }

    /// Message with a raw payload bound for decoding (the "actual" side).
    pub fn with_payload(template: Template, payload: Vec<u8>) -> Self {
        let mut msg = Message::new(template);
        msg.raw = Some(payload);
        msg
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Current textual value of a field (empty until a wildcard or length
    /// field has been resolved by encode/decode).
    pub fn value(&self, name: &str) -> Option<&str> {
        self.template
            .index_of(name)
            .map(|i| self.values[i].as_str())
    }

    /// Field names and values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.template
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(f, v)| (f.name.as_str(), v.as_str()))
    }

    /// Override a field value before encoding.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), EncodeError> {
        let i = self
            .template
            .index_of(name)
            .ok_or_else(|| EncodeError::UnknownField(name.to_string()))?;
        self.values[i] = value.to_string();
        Ok(())
    }

    /// Values of array-sibling fields (`id0`, `id1`, ...) sharing `base`,
    /// in declaration order. A field named exactly `base` also matches.
    pub fn indexed_values(&self, base: &str) -> Vec<&str> {
        self.template
            .fields()
            .iter()
            .zip(&self.values)
            .filter(|(f, _)| array_base(&f.name).0.eq_ignore_ascii_case(base))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Bytes consumed by the last decode.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes the last decode left unaccounted for. Advisory: callers decide
    /// whether a nonzero count is a failure.
    pub fn leftover(&self) -> usize {
        self.leftover
    }

    pub(crate) fn value_at(&self, i: usize) -> &str {
        &self.values[i]
    }
}

/// Encoder/decoder. Stateless apart from configuration; one codec can serve
/// any number of messages.
pub struct Codec {
    pub endianness: Endianness,
    trace: Option<Box<dyn TraceSink>>,
}

impl Default for Codec {
    fn default() -> Self {
        Codec::new(Endianness::Big)
    }
}

impl Codec {
    pub fn new(endianness: Endianness) -> Self {
        Codec {
            endianness,
            trace: None,
        }
    }

    pub fn with_trace(endianness: Endianness, trace: Box<dyn TraceSink>) -> Self {
        Codec {
            endianness,
            trace: Some(trace),
        }
    }

    /// Encode a message to wire bytes. Wildcards without an overriding value
    /// emit nothing; `len()` fields are backfilled after the first pass and
    /// their resolved values stored back into the message.
    pub fn encode(&self, msg: &mut Message) -> Result<Vec<u8>, EncodeError> {
        let template = msg.template.clone();
        let mut out = Vec::new();
        let mut spans: Vec<(usize, usize)> = Vec::with_capacity(template.len());
        let mut backfills: Vec<(usize, usize, usize, usize)> = Vec::new();
        for (i, f) in template.fields().iter().enumerate() {
            let start = out.len();
            match &f.kind {
                FieldKind::Hex(_) => {
                    let bytes = hex_to_bytes(msg.value_at(i)).map_err(|e| EncodeError::Hex {
                        field: f.name.clone(),
                        source: e,
                    })?;
                    out.extend_from_slice(&bytes);
                }
                FieldKind::Text(_) => out.extend_from_slice(msg.value_at(i).as_bytes()),
                FieldKind::Wildcard => {
                    // A wildcard only contributes bytes when a value was
                    // supplied; it is then classified like a template literal.
                    match classify_literal(msg.value_at(i)) {
                        FieldKind::Hex(b) => out.extend_from_slice(&b),
                        FieldKind::Text(s) => out.extend_from_slice(s.as_bytes()),
                        _ => {}
                    }
                }
                FieldKind::Length { width, .. } => {
                    out.extend(std::iter::repeat(0u8).take(*width));
                    if let Some(target) = template.length_target(i) {
                        backfills.push((i, start, *width, target));
                    }
                }
            }
            spans.push((start, out.len() - start));
        }
        for (i, off, width, target) in backfills {
            let len = spans[target].1;
            if width < 8 && (len as u64) >= 1u64 << (8 * width as u32) {
                return Err(EncodeError::LengthOverflow {
                    field: template.fields()[i].name.clone(),
                    len,
                    width,
                });
            }
            self.write_uint(&mut out[off..off + width], len as u64);
            msg.values[i] = bytes_to_hex(&out[off..off + width]);
        }
        if let Some(t) = &self.trace {
            t.on_encode(&out);
        }
        Ok(out)
    }

    /// Decode the message's bound payload against its template, advancing a
    /// cursor field by field. Wildcards consume their resolved width but
    /// never fail; surplus bytes are recorded as leftover, not an error.
    pub fn decode(&self, msg: &mut Message) -> Result<(), DecodeError> {
        let raw = msg.raw.clone().ok_or(DecodeError::MissingPayload)?;
        let template = msg.template.clone();
        let fields = template.fields();
        let mut pos = 0usize;
        // target index -> width taken from an already-decoded len() field
        let mut sized: HashMap<usize, usize> = HashMap::new();
        for (i, f) in fields.iter().enumerate() {
            let available = raw.len() - pos;
            // A len() field's width is declared in the template; a
            // wire-advertised size never resizes it (read_uint only
            // accepts 1..=8 bytes).
            let width = if let FieldKind::Length { width, .. } = &f.kind {
                *width
            } else if let Some(&w) = sized.get(&i) {
                w
            } else if let Some(w) = f.static_width() {
                w
            } else {
                // Slack: whatever the remaining fields will not claim.
                let trailing: usize = fields[i + 1..]
                    .iter()
                    .filter_map(|g| g.static_width())
                    .sum();
                available.saturating_sub(trailing)
            };
            let take = if f.is_wildcard() {
                width.min(available)
            } else {
                if width > available {
                    return Err(DecodeError::BufferExhausted {
                        field: f.name.clone(),
                        needed: width - available,
                        available,
                    });
                }
                width
            };
            let chunk = &raw[pos..pos + take];
            msg.values[i] = match &f.kind {
                FieldKind::Text(_) => String::from_utf8_lossy(chunk).into_owned(),
                FieldKind::Length { .. } => {
                    let v = self.read_uint(chunk);
                    if let Some(target) = template.length_target(i) {
                        sized.insert(target, v as usize);
                    }
                    bytes_to_hex(chunk)
                }
                _ => bytes_to_hex(chunk),
            };
            pos += take;
        }
        msg.consumed = pos;
        msg.leftover = raw.len() - pos;
        if let Some(t) = &self.trace {
            t.on_decode(&raw, msg.consumed, msg.leftover);
        }
        Ok(())
    }

    fn write_uint(&self, buf: &mut [u8], v: u64) {
        let n = buf.len();
        match self.endianness {
            Endianness::Big => BigEndian::write_uint(buf, v, n),
            Endianness::Little => LittleEndian::write_uint(buf, v, n),
        }
    }

    fn read_uint(&self, buf: &[u8]) -> u64 {
        match self.endianness {
            Endianness::Big => BigEndian::read_uint(buf, buf.len()),
            Endianness::Little => LittleEndian::read_uint(buf, buf.len()),
        }
    }
}
