//! Decode a hex payload against a template and report a verdict.
//!
//! Usage:
//!   decode_hex [OPTIONS] TEMPLATE.tpl [HEXPAYLOAD]
//!   decode_hex TEMPLATE.tpl - < payload.hex
//!
//! The payload is a hex string (whitespace ignored), from the command line
//! or stdin when `-` is given. The template's own literals form the
//! expected message; the decoded payload is compared against it the way a
//! protocol-test assertion would.
//!
//! Options:
//!   --little       Little-endian len() fields (default big)
//!   --trace        Pretty-dump encode/decode traffic to stderr
//!   --vars=a,b     Extract named values from the decoded dump
//!   --strip-http   Drop an HTTP envelope (through \r\n\r\n) before decoding
//!
//! Exit code 1 when the comparison fails or bytes are left undecoded.

use std::io::Read;
use std::path::PathBuf;
use wiretpl::bytes::strip_http_envelope;
use wiretpl::{
    compare, extract_variables, hex_to_bytes, parse, render, Codec, Endianness, HexDumpTrace,
    Message,
};

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let little = take_flag(&mut args, "--little");
    let trace = take_flag(&mut args, "--trace");
    let strip_http = take_flag(&mut args, "--strip-http");
    let vars: Option<String> = args
        .iter()
        .position(|a| a.starts_with("--vars="))
        .map(|pos| args.remove(pos)["--vars=".len()..].to_string());

    let mut it = args.into_iter();
    let template_path: PathBuf = it
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: decode_hex [OPTIONS] TEMPLATE.tpl [HEXPAYLOAD]"))?;
    let payload_arg = it.next().unwrap_or_else(|| "-".to_string());

    let template_text = std::fs::read_to_string(&template_path)?;
    let template = parse(&template_text)?;

    let hex = if payload_arg == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        s
    } else {
        payload_arg
    };
    let cleaned: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    let mut payload = hex_to_bytes(&cleaned)?;
    if strip_http {
        payload = strip_http_envelope(&payload).to_vec();
    }

    let endianness = if little {
        Endianness::Little
    } else {
        Endianness::Big
    };
    let codec = if trace {
        Codec::with_trace(endianness, Box::new(HexDumpTrace))
    } else {
        Codec::new(endianness)
    };

    // Encoding the expected side resolves its len() fields so the
    // comparison sees concrete values.
    let mut expected = Message::new(template.clone());
    codec.encode(&mut expected)?;

    let mut actual = Message::with_payload(template, payload);
    codec.decode(&mut actual)?;

    print!("{}", render(&actual));

    let mut failed = false;
    if actual.leftover() > 0 {
        eprintln!("{} byte(s) left undecoded", actual.leftover());
        failed = true;
    }
    let verdict = compare(&expected, &actual);
    if verdict.equal {
        eprintln!("match");
    } else {
        eprintln!("MISMATCH: {}", verdict.message);
        eprintln!("================ expected ================");
        eprint!("{}", render(&expected));
        eprintln!("================ actual ==================");
        eprint!("{}", render(&actual));
        failed = true;
    }

    if let Some(names) = vars {
        let dump = render(&actual);
        for (name, value) in extract_variables(&dump, &names) {
            println!("{}\t{}", name, value);
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == flag) {
        args.remove(pos);
        true
    } else {
        false
    }
}
