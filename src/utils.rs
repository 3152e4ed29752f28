// src/utils.rs
use chrono::DateTime;
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a decimal number")]
    Malformed(String),
    #[error("'{value}' has more than {decimals} decimal places")]
    TooPrecise { value: String, decimals: u8 },
    #[error("'{0}' does not fit in 256 bits")]
    Overflow(String),
}

/// Renders a base-unit integer as a decimal string, trimming trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let width = decimals as usize;
    if width == 0 {
        return digits;
    }
    let padded = format!("{:0>1$}", digits, width + 1);
    let (integer, fraction) = padded.split_at(padded.len() - width);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{}.{}", integer, fraction)
    }
}

pub fn parse_units(text: &str, decimals: u8) -> Result<U256, UnitsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (integer, fraction) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !all_digits(integer) || !all_digits(fraction) {
        return Err(UnitsError::Malformed(text.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            value: text.to_string(),
            decimals,
        });
    }

    let overflow = || UnitsError::Overflow(text.to_string());
    let mut digits = String::with_capacity(integer.len() + decimals as usize);
    digits.push_str(integer);
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    if digits.len() > 78 {
        return Err(overflow());
    }
    U256::from_dec_str(digits).map_err(|_| overflow())
}

/// `MM/DD/YYYY, hh:mm:ss AM` in UTC. Zero means the contract never set it.
pub fn format_timestamp(secs: u64) -> String {
    if secs == 0 {
        return "-".to_string();
    }
    match i64::try_from(secs).ok().and_then(|s| DateTime::from_timestamp(s, 0)) {
        Some(dt) => dt.format("%m/%d/%Y, %I:%M:%S %p").to_string(),
        None => secs.to_string(),
    }
}

pub fn shorten_address(address: Address) -> String {
    let full = to_checksum(&address, None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Saturating `U256` to `u64`, for ids and timestamps that fit in practice.
pub fn low_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_base_units() {
        let one_and_half = U256::from(15u64) * U256::exp10(17);
        assert_eq!(format_units(one_and_half, 18), "1.5");
        assert_eq!(format_units(U256::exp10(18), 18), "1");
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::zero(), 6), "0");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
    }

    #[test]
    fn formats_tokens_with_huge_decimals() {
        let expected = format!("0.{}1", "0".repeat(99));
        assert_eq!(format_units(U256::one(), 100), expected);
        assert_eq!(format_units(U256::MAX, 255).len(), 2 + 255);
        assert_eq!(format_units(U256::zero(), 255), "0");
    }

    #[test]
    fn parses_display_amounts() {
        assert_eq!(parse_units("1.5", 18).unwrap(), U256::from(15u64) * U256::exp10(17));
        assert_eq!(parse_units(" 100 ", 6).unwrap(), U256::from(100_000_000u64));
        assert_eq!(parse_units(".25", 2).unwrap(), U256::from(25u64));
        assert_eq!(parse_units("3.", 2).unwrap(), U256::from(300u64));
        assert_eq!(parse_units("0.000", 3).unwrap(), U256::zero());
    }

    #[test]
    fn parse_and_format_agree() {
        for text in ["0.1", "12.345", "1000000", "0.000001"] {
            let raw = parse_units(text, 18).unwrap();
            assert_eq!(format_units(raw, 18), text);
        }
    }

    #[test]
    fn rejects_bad_amounts() {
        assert_eq!(parse_units("", 18), Err(UnitsError::Empty));
        assert!(matches!(parse_units("-1", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1e18", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1.2.3", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units(".", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("0.123", 2), Err(UnitsError::TooPrecise { .. })));
        assert!(matches!(parse_units("1", 0), Ok(_)));
        let huge = "9".repeat(80);
        assert!(matches!(parse_units(&huge, 0), Err(UnitsError::Overflow(_))));
    }

    #[test]
    fn formats_timestamps_in_utc() {
        assert_eq!(format_timestamp(0), "-");
        assert_eq!(format_timestamp(1_700_000_000), "11/14/2023, 10:13:20 PM");
    }

    #[test]
    fn shortens_addresses() {
        let addr: Address = "0x00000000000000000000000000000000000000ff".parse().unwrap();
        let short = shorten_address(addr);
        assert_eq!(short.to_lowercase(), "0x0000...00ff");
    }
}
