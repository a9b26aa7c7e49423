//! UUID v4 shape validation.

/// Validate the canonical hyphenated UUID v4 form, case-insensitive.
///
/// Version nibble must be `4`; variant nibble must be `8`, `9`, `a` or
/// `b`. The authorization numbers SAT mints are v4, so anything else is
/// rejected even when it is a well-formed UUID of another version.
pub fn is_uuid_v4(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if *b != b'-' {
                    return false;
                }
            }
            14 => {
                if *b != b'4' {
                    return false;
                }
            }
            19 => {
                if !matches!(b.to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b') {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }
    true
}

/// The 32 hex digits of a canonical UUID, lowercased, hyphens removed.
///
/// Returns `None` when the input is not a canonical UUID shape.
pub fn uuid_hex(s: &str) -> Option<String> {
    if s.len() != 36 {
        return None;
    }
    let hex: String = s
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if hex.len() == 32 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex)
    } else {
        None
    }
}
