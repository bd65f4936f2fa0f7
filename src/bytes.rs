//! Hex/byte helpers: hex-string conversion, pretty dumps, subsequence search.

/// Errors from hex-string conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    #[error("hex string has an odd number of digits ({0})")]
    OddLength(usize),
    #[error("invalid hex digit {0:?}")]
    InvalidDigit(char),
}

/// Convert a hex string ("cafe01") to bytes. Whitespace is not accepted;
/// callers strip it first if their input allows it.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, HexError> {
    if hex.len() % 2 != 0 {
        return Err(HexError::OddLength(hex.len()));
    }
    let mut out = Vec::with_capacity(hex.len() / 2);
    let mut chars = hex.chars();
    while let (Some(hi), Some(lo)) = (chars.next(), chars.next()) {
        let hi = hi.to_digit(16).ok_or(HexError::InvalidDigit(hi))? as u8;
        let lo = lo.to_digit(16).ok_or(HexError::InvalidDigit(lo))? as u8;
        out.push(hi << 4 | lo);
    }
    Ok(out)
}

/// Lowercase hex pairs, no separators ("cafe01").
pub fn bytes_to_hex(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for b in data {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

/// 16-column offset/hex/ASCII dump for traffic traces.
pub fn pretty_hex(data: &[u8]) -> String {
    const COLS: usize = 16;
    let mut lines = Vec::with_capacity(data.len() / COLS + 1);
    for (i, chunk) in data.chunks(COLS).enumerate() {
        let hex = chunk
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk
            .iter()
            .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' })
            .collect();
        lines.push(format!("{:08x}  {:<47}  {}", i * COLS, hex, ascii));
    }
    lines.join("\n")
}

/// Index of the first occurrence of `needle` in `haystack`.
/// An empty needle matches at 0.
pub fn find_first(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Bounds-checked slice: `data[start..start + len]`, or None if out of range.
pub fn sub_bytes(data: &[u8], start: usize, len: usize) -> Option<&[u8]> {
    let end = start.checked_add(len)?;
    data.get(start..end)
}

/// Drop an HTTP-style envelope: everything through the first `\r\n\r\n`.
/// Returns the input unchanged when no envelope is present.
pub fn strip_http_envelope(data: &[u8]) -> &[u8] {
    match find_first(data, b"\r\n\r\n") {
        Some(i) => &data[i + 4..],
        None => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let bytes = hex_to_bytes("cafe01").expect("hex");
        assert_eq!(bytes, vec![0xca, 0xfe, 0x01]);
        assert_eq!(bytes_to_hex(&bytes), "cafe01");
    }

    #[test]
    fn hex_uppercase_accepted() {
        assert_eq!(hex_to_bytes("CAFE").expect("hex"), vec![0xca, 0xfe]);
    }

    #[test]
    fn hex_odd_length_fails() {
        assert_eq!(hex_to_bytes("abc"), Err(HexError::OddLength(3)));
    }

    #[test]
    fn hex_bad_digit_fails() {
        assert_eq!(hex_to_bytes("zz"), Err(HexError::InvalidDigit('z')));
    }

    #[test]
    fn hex_empty_is_empty() {
        assert_eq!(hex_to_bytes("").expect("hex"), Vec::<u8>::new());
    }

    #[test]
    fn find_first_basic() {
        assert_eq!(find_first(b"abcdef", b"cd"), Some(2));
        assert_eq!(find_first(b"abcdef", b"xy"), None);
        assert_eq!(find_first(b"ab", b"abcd"), None);
        assert_eq!(find_first(b"abcdef", b""), Some(0));
    }

    #[test]
    fn sub_bytes_bounds() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(sub_bytes(&data, 1, 2), Some(&data[1..3]));
        assert_eq!(sub_bytes(&data, 3, 2), None);
        assert_eq!(sub_bytes(&data, 4, 0), Some(&[][..]));
    }

    #[test]
    fn strip_envelope() {
        let body = strip_http_envelope(b"HTTP/1.1 200 OK\r\nX: y\r\n\r\npayload");
        assert_eq!(body, b"payload");
        assert_eq!(strip_http_envelope(b"raw bytes"), b"raw bytes");
    }

    #[test]
    fn pretty_hex_has_ascii_gutter() {
        let dump = pretty_hex(b"OK\x00\xff");
        assert!(dump.starts_with("00000000"));
        assert!(dump.ends_with("OK.."));
    }
}
