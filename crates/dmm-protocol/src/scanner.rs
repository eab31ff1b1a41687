//! Reading token scanner
//!
//! Finds the reading inside a frame payload. Two token forms exist:
//!
//! - **Markers**: fixed words the meter prints instead of a number
//!   (`OL`, `.OL`, `-OL`, `OPEN`, `SHORT`, `High`, `Low`, `----`)
//! - **Numbers**: `[+-]? digits [. digits]? [k|m|u|z]?`
//!
//! The scan is leftmost-first. When both forms could start at the same
//! position the marker wins. Matching is ASCII case-insensitive, but the
//! returned text is always the original slice so the reading keeps its
//! exact formatting.

/// Markers, longest first where one is a prefix-variant of another
const MARKERS: &[&[u8]] = &[
    b".OL", b"-OL", b"OL", b"OPEN", b"SHORT", b"HIGH", b"LOW", b"----",
];

/// Magnitude suffixes accepted directly after a number
const SUFFIXES: &[u8] = b"kmuz";

/// Which token form matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One of the fixed markers
    Marker,
    /// A signed decimal number with optional suffix
    Number,
}

/// A reading token located inside a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch<'a> {
    /// Matched text, verbatim
    pub text: &'a str,
    /// Byte offset of the match start
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
    /// Token form
    pub kind: TokenKind,
}

/// Find the leftmost reading token in `payload`
pub fn find_reading(payload: &str) -> Option<TokenMatch<'_>> {
    let bytes = payload.as_bytes();

    for start in 0..bytes.len() {
        let found = match_marker(bytes, start)
            .map(|end| (end, TokenKind::Marker))
            .or_else(|| match_number(bytes, start).map(|end| (end, TokenKind::Number)));

        if let Some((end, kind)) = found {
            // Both forms only start and end on ASCII bytes, so these are
            // always char boundaries.
            return Some(TokenMatch {
                text: &payload[start..end],
                start,
                end,
                kind,
            });
        }
    }

    None
}

/// Try every marker at `start`, returning the end offset of the first hit
fn match_marker(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = &bytes[start..];
    MARKERS
        .iter()
        .find(|marker| {
            rest.len() >= marker.len() && rest[..marker.len()].eq_ignore_ascii_case(marker)
        })
        .map(|marker| start + marker.len())
}

/// Match `[+-]?[0-9]*\.?[0-9]+[kmuz]?` anchored at `start`
fn match_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;

    if matches!(bytes.get(pos), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let int_digits = pos - int_start;

    // A decimal point only counts when at least one digit follows it;
    // otherwise the number ends before the point ("12." reads as "12").
    let has_fraction =
        bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit);

    if has_fraction {
        pos += 1;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
    } else if int_digits == 0 {
        return None;
    }

    if bytes
        .get(pos)
        .is_some_and(|b| SUFFIXES.contains(&b.to_ascii_lowercase()))
    {
        pos += 1;
    }

    Some(pos)
}
