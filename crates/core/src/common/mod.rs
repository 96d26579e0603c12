pub mod time;

use num_format::{Locale, ToFormattedString};

/// # Summary
/// Formats a currency amount with thousands separators and no decimals,
/// e.g. `1234567.8` -> `"1,234,568"`.
///
/// # Logic
/// 1. Non-finite values are rendered verbatim.
/// 2. The value is rounded to the nearest integer and the sign kept apart,
///    so negative amounts render as `-1,000`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.abs().round();
    // non-negative and integral at this point; `as` saturates above u128::MAX
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let digits = (rounded as u128).to_formatted_string(&Locale::en);
    if value < 0.0 && rounded > 0.0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// # Summary
/// Installs the process-wide rustls crypto provider (ring).
///
/// # Invariants
/// - `reqwest` and `lettre` are built without a bundled provider, so this must run
///   once before the first TLS connection. Repeated calls are harmless.
pub fn install_crypto_provider() {
    // Err only means a provider is already installed
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(1_000_000.0), "1,000,000");
        assert_eq!(format_amount(999.4), "999");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(-12_500.0), "-12,500");
    }
}
