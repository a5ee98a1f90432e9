//! Rendering helpers for amounts and hex strings.

use alloy_primitives::{U256, utils};

/// Formats a wei amount in ether without trailing zeros, e.g. `1.5` or `0`.
pub fn format_ether(wei: U256) -> String {
    let formatted = utils::format_ether(wei);

    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');

            if fraction.is_empty() {
                whole.to_owned()
            } else {
                format!("{whole}.{fraction}")
            }
        },
        None => formatted,
    }
}

/// Shortens a `0x`-prefixed hex string to its first and last `length` digits.
///
/// Values short enough to be shown whole are returned unchanged.
pub fn shorten_hex(value: &str, length: usize) -> String {
    if value.len() <= length * 2 + 2 || !value.is_ascii() {
        return value.to_owned();
    }

    format!("{}...{}", &value[..length + 2], &value[value.len() - length..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_without_trailing_zeros() {
        assert_eq!(format_ether(U256::ZERO), "0");
        assert_eq!(format_ether(U256::from(10).pow(U256::from(18))), "1");
        assert_eq!(format_ether(U256::from(15) * U256::from(10).pow(U256::from(17))), "1.5");
        assert_eq!(format_ether(U256::from(1)), "0.000000000000000001");
    }

    #[test]
    fn shortens_long_hex() {
        let hash = "0x8f3a0a1d9b1e0c4f6a2b7d5e3c1f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f";

        assert_eq!(shorten_hex(hash, 6), "0x8f3a0a...4d3e2f");
        assert_eq!(shorten_hex("0x12345678901234", 6), "0x12345678901234");
        assert_eq!(shorten_hex("0x", 6), "0x");
    }
}
