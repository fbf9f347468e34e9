//! Text decoding for displaying stream content.
//!
//! Streams carry no declared encoding, so it is guessed: a byte order mark
//! wins, then valid UTF-8, then UTF-16 detected from the distribution of
//! zero bytes, and finally Latin-1, which accepts any byte sequence.

/// A text encoding recognized by [`detect_encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with or without a byte order mark.
    Utf8,
    /// UTF-16 little-endian.
    Utf16Le,
    /// UTF-16 big-endian.
    Utf16Be,
    /// Single-byte fallback; every byte maps to U+0000..U+00FF.
    Latin1,
}

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];

/// Guesses the encoding of `sample`.
///
/// Returns the encoding and the length of the byte order mark, if any.
/// `complete` tells whether `sample` is the whole input; when it is not, a
/// UTF-8 sequence cut off at the end of the sample is accepted.
pub fn detect_encoding(sample: &[u8], complete: bool) -> (TextEncoding, usize) {
    if sample.starts_with(BOM_UTF8) {
        return (TextEncoding::Utf8, BOM_UTF8.len());
    }
    if sample.starts_with(BOM_UTF16_LE) {
        return (TextEncoding::Utf16Le, BOM_UTF16_LE.len());
    }
    if sample.starts_with(BOM_UTF16_BE) {
        return (TextEncoding::Utf16Be, BOM_UTF16_BE.len());
    }

    if looks_like_utf16(sample, 1) {
        (TextEncoding::Utf16Le, 0)
    } else if looks_like_utf16(sample, 0) {
        (TextEncoding::Utf16Be, 0)
    } else if is_utf8(sample, complete) {
        (TextEncoding::Utf8, 0)
    } else {
        (TextEncoding::Latin1, 0)
    }
}

/// Checks UTF-8 validity; an unfinished trailing sequence passes when the
/// sample is not the whole input.
fn is_utf8(sample: &[u8], complete: bool) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => !complete && e.error_len().is_none(),
    }
}

/// Mostly-ASCII UTF-16 has its zero bytes on one side of each code unit.
/// `high` is the index of the high byte within a unit (1 for little-endian).
fn looks_like_utf16(sample: &[u8], high: usize) -> bool {
    if sample.len() < 2 || sample.len() % 2 != 0 {
        return false;
    }
    let units = sample.len() / 2;
    let (mut zero_high, mut zero_low) = (0usize, 0usize);
    for unit in sample.chunks_exact(2) {
        if unit[high] == 0 {
            zero_high += 1;
        }
        if unit[1 - high] == 0 {
            zero_low += 1;
        }
    }
    zero_high * 2 > units && zero_low * 10 < units
}

/// Decodes `bytes` as text with line breaks normalized to `\n`.
///
/// # Example
///
/// ```
/// use ntfs_streams::text::decode_text;
///
/// assert_eq!(decode_text(b"\xEF\xBB\xBFone\r\ntwo"), "one\ntwo\n");
/// assert_eq!(decode_text(&[b'h', 0, b'i', 0]), "hi\n");
/// ```
pub fn decode_text(bytes: &[u8]) -> String {
    let (encoding, bom) = detect_encoding(bytes, true);
    let body = &bytes[bom..];
    let decoded = match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(body).into_owned(),
        TextEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
        TextEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        TextEncoding::Latin1 => body.iter().map(|&b| char::from(b)).collect(),
    };
    normalize_line_breaks(&decoded)
}

fn decode_utf16(body: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = body.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Splits `text` into lines and ends each with `\n`.
///
/// `\r`, `\n`, `\r\n` and `\n\r` each count as one break, as do U+0085,
/// U+2028 and U+2029. Text without a final break still gets one; empty text
/// stays empty.
pub fn normalize_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut chars = text.chars().peekable();
    let mut open_line = false;
    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                let pair = if c == '\r' { '\n' } else { '\r' };
                if chars.peek() == Some(&pair) {
                    chars.next();
                }
                out.push('\n');
                open_line = false;
            }
            '\u{85}' | '\u{2028}' | '\u{2029}' => {
                out.push('\n');
                open_line = false;
            }
            c => {
                out.push(c);
                open_line = true;
            }
        }
    }
    if open_line {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn utf16be(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    #[test]
    fn test_bom_detection() {
        assert_eq!(detect_encoding(b"\xEF\xBB\xBFx", true), (TextEncoding::Utf8, 3));
        assert_eq!(detect_encoding(b"\xFF\xFEx\0", true), (TextEncoding::Utf16Le, 2));
        assert_eq!(detect_encoding(b"\xFE\xFF\0x", true), (TextEncoding::Utf16Be, 2));
    }

    #[test]
    fn test_utf16_without_bom() {
        let le = utf16le("[ZoneTransfer]\r\nZoneId=3\r\n");
        assert_eq!(detect_encoding(&le, true).0, TextEncoding::Utf16Le);
        let be = utf16be("[ZoneTransfer]\r\nZoneId=3\r\n");
        assert_eq!(detect_encoding(&be, true).0, TextEncoding::Utf16Be);
    }

    #[test]
    fn test_utf8_and_fallback() {
        assert_eq!(detect_encoding("héllo".as_bytes(), true).0, TextEncoding::Utf8);
        assert_eq!(detect_encoding(b"caf\xE9", true).0, TextEncoding::Latin1);
    }

    #[test]
    fn test_truncated_utf8_sample() {
        let text = "naïve".as_bytes();
        let cut = &text[..3];
        assert_eq!(detect_encoding(cut, false).0, TextEncoding::Utf8);
        assert_eq!(detect_encoding(cut, true).0, TextEncoding::Latin1);
    }

    #[test]
    fn test_decode_variants() {
        assert_eq!(decode_text(b"caf\xE9"), "caf\u{e9}\n");
        let mut le = BOM_UTF16_LE.to_vec();
        le.extend(utf16le("a\u{2028}b"));
        assert_eq!(decode_text(&le), "a\nb\n");
        assert_eq!(decode_text(b""), "");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(normalize_line_breaks("a\r\nb\n\rc\rd\ne"), "a\nb\nc\nd\ne\n");
        assert_eq!(normalize_line_breaks("a\n\nb"), "a\n\nb\n");
        assert_eq!(normalize_line_breaks("a\r\n"), "a\n");
        assert_eq!(normalize_line_breaks("x\u{85}"), "x\n");
    }
}
