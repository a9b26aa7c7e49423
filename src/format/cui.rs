//! CUI check-digit validation.

/// Multipliers for the first eight digits of a CUI.
const CUI_MULTIPLIERS: [u32; 8] = [2, 3, 4, 5, 6, 7, 8, 9];

/// Validate a Guatemalan CUI (Código Único de Identificación).
///
/// Exactly 13 digits; the 9th digit is the check. The check is computed
/// over the first eight digits: `c = (Σ dᵢ × mᵢ × 10) mod 11`, expected
/// `0` when `c = 10`, else `c`. The trailing four digits encode the
/// issuing department and municipality and are not verified here.
pub fn validate_cui(cui: &str) -> bool {
    let s = cui.trim();
    let bytes = s.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = bytes[..8]
        .iter()
        .zip(CUI_MULTIPLIERS)
        .map(|(b, m)| u32::from(b - b'0') * m)
        .sum();
    let c = (sum * 10) % 11;
    let expected = if c == 10 { 0 } else { c };

    u32::from(bytes[8] - b'0') == expected
}
