//! Utility functions and helpers

use crate::math::to_display_units;

/// Format a raw amount with its coin decimals, e.g. `1500000` with 6 decimals -> `1.5`
pub fn format_amount(amount: u128, decimals: u8) -> String {
    match to_display_units(amount, decimals) {
        Ok(value) => value.normalize().to_string(),
        Err(_) => amount.to_string(),
    }
}

/// Shorten a long pool address for log lines
pub fn format_pool_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 16 {
        return address.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}
