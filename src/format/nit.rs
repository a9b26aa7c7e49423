//! NIT check-digit validation.

/// Validate a Guatemalan NIT.
///
/// Shape: 1 to 12 digits followed by a check character (digit or `K`).
/// A single hyphen before the check character, as the RTU prints it, is
/// tolerated. The literal `CF` (consumidor final) passes without
/// computation. Returns `false` for anything else; never panics.
pub fn validate_nit(nit: &str) -> bool {
    let trimmed = nit.trim();
    if trimmed.eq_ignore_ascii_case("CF") {
        return true;
    }

    let normalized: String = trimmed.chars().filter(|c| *c != '-').collect();
    if trimmed.matches('-').count() > 1 {
        return false;
    }

    let bytes = normalized.as_bytes();
    // 1..12 digits plus the check character.
    if bytes.len() < 2 || bytes.len() > 13 {
        return false;
    }

    let (prefix, check) = bytes.split_at(bytes.len() - 1);
    if !prefix.iter().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let check = check[0].to_ascii_uppercase();
    if !check.is_ascii_digit() && check != b'K' {
        return false;
    }

    expected_check_digit(prefix) == check
}

/// Check character the mod-11 scheme prescribes for a digit prefix.
///
/// `s = Σ dᵢ × (len + 1 − i)` over the 1-indexed digits, `r = s mod 11`;
/// the check is `0` when `r = 0`, `K` when `r = 1`, else `11 − r`.
fn expected_check_digit(prefix: &[u8]) -> u8 {
    let len = prefix.len() as u32;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(idx, b)| u32::from(b - b'0') * (len - idx as u32))
        .sum();
    match sum % 11 {
        0 => b'0',
        1 => b'K',
        r => b'0' + (11 - r) as u8,
    }
}
