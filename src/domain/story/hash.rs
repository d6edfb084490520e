//! Cheap content fingerprint used to spot near-identical regenerations.
//!
//! Not a cryptographic hash: unrelated texts may collide, which is acceptable
//! for a duplicate heuristic.

/// Lowercase the whole text, then drop every whitespace character
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !is_blank(*c))
        .collect()
}

/// Whitespace as matched by a JavaScript `\s` class, so fingerprints match
/// those computed by JavaScript clients
fn is_blank(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Fingerprint of the normalized text as a lowercase hex string.
///
/// Rolling `h = h * 31 + unit` over UTF-16 code units, wrapped to 32-bit
/// signed, then the absolute value in hex.
pub fn content_hash(text: &str) -> String {
    let hash = normalize(text)
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));

    // i64 so that i32::MIN keeps a positive magnitude
    format!("{:x}", i64::from(hash).abs())
}
