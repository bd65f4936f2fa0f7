//! # wiretpl: Text-Template Codec for Binary Wire Messages
//!
//! Describe a binary message as a `name=value` text template, turn the
//! template into exact bytes to put on the wire, turn received bytes back
//! into the same textual shape, and diff an expected template against an
//! actual decoded message with wildcard semantics.
//!
//! ## Template grammar
//!
//! One `name=value` entry per line (or comma-separated). The value decides
//! the field kind:
//!
//! - `hdr=cafe01` — even hex digit run: fixed-width binary literal
//! - `code=OK` — anything else: text literal
//! - `n=len(body)` / `n=len(body, 4)` — computed length of a later field
//! - `body=` — empty: wildcard (any content; width from `len()` or slack)
//!
//! ## Example
//!
//! ```
//! use wiretpl::{compare, parse, render, Codec, Endianness, Message};
//!
//! let template = parse("hdr=cafe,n=len(body),body=\r\n").unwrap();
//! let codec = Codec::new(Endianness::Big);
//!
//! let mut expected = Message::new(template.clone());
//! codec.encode(&mut expected).unwrap();
//!
//! let mut actual = Message::with_payload(template, vec![0xca, 0xfe, 0x00, 0x02, 0x01, 0x02]);
//! codec.decode(&mut actual).unwrap();
//! assert_eq!(actual.leftover(), 0);
//!
//! let verdict = compare(&expected, &actual);
//! assert!(!verdict.equal); // expected body length was 0, wire says 2
//! println!("{}", render(&actual));
//! ```

pub mod bytes;
pub mod compare;
pub mod lint;
pub mod message;
pub mod render;
pub mod template;

pub use bytes::{bytes_to_hex, find_first, hex_to_bytes, pretty_hex, HexError};
pub use compare::{compare, CompareResult};
pub use message::{Codec, DecodeError, EncodeError, Endianness, HexDumpTrace, Message, TraceSink};
pub use render::{extract_variables, render, NOT_FOUND};
pub use template::{parse, FieldKind, FieldSpec, ParseError, Template};
