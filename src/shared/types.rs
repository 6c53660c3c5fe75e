//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a fungible asset type, e.g. `0x1::aptos_coin::AptosCoin`.
///
/// Equality is exact string match. Well-formedness is only checked at the
/// request boundary (see [`CoinId::is_well_formed`]); pools carry whatever
/// their provider reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinId(String);

impl CoinId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<0x-hex address>::<module>::<name>`, no whitespace, no empty segment.
    pub fn is_well_formed(&self) -> bool {
        let segments: Vec<&str> = self.0.split("::").collect();
        if segments.len() != 3 {
            return false;
        }
        if segments.iter().any(|s| s.is_empty() || s.chars().any(char::is_whitespace)) {
            return false;
        }
        match segments[0].strip_prefix("0x") {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => false,
        }
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CoinId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CoinId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Coin descriptor as carried by a pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoinInfo {
    pub coin_type: CoinId,
    pub decimals: u8,
}

impl CoinInfo {
    pub fn new(coin_type: impl Into<CoinId>, decimals: u8) -> Self {
        Self {
            coin_type: coin_type.into(),
            decimals,
        }
    }
}

/// Order-independent key of a coin pair: the lexicographically smaller coin first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: CoinId,
    second: CoinId,
}

impl PairKey {
    pub fn new(a: &CoinId, b: &CoinId) -> Self {
        if a <= b {
            Self { first: a.clone(), second: b.clone() }
        } else {
            Self { first: b.clone(), second: a.clone() }
        }
    }

    pub fn coins(&self) -> (&CoinId, &CoinId) {
        (&self.first, &self.second)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Raw amounts travel as decimal strings so values above 2^53 survive JSON clients.
pub mod amount_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<u128>()
            .map_err(|_| de::Error::custom(format!("Invalid raw amount: {:?}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        let apt = CoinId::from("0x1::aptos_coin::AptosCoin");
        let usdc = CoinId::from("0xdba3::usdc::USDC");

        assert_eq!(PairKey::new(&apt, &usdc), PairKey::new(&usdc, &apt));
        let key = PairKey::new(&apt, &usdc);
        assert_eq!(key.coins().0, &apt);
    }

    #[test]
    fn test_coin_id_well_formed() {
        assert!(CoinId::from("0x1::aptos_coin::AptosCoin").is_well_formed());
        assert!(CoinId::from("0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC").is_well_formed());

        assert!(!CoinId::from("").is_well_formed());
        assert!(!CoinId::from("APT").is_well_formed());
        assert!(!CoinId::from("0x2::aptos").is_well_formed());
        assert!(!CoinId::from("2::aptos::APT").is_well_formed());
        assert!(!CoinId::from("0xZZ::aptos::APT").is_well_formed());
        assert!(!CoinId::from("0x1::aptos_coin:: AptosCoin").is_well_formed());
        assert!(!CoinId::from("0x2::::APT").is_well_formed());
    }

    #[test]
    fn test_amount_string_rejects_garbage() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "amount_string")]
            amount: u128,
        }

        let ok: Wrapper = serde_json::from_str(r#"{"amount":"340282366920938463463374607431768211455"}"#).unwrap();
        assert_eq!(ok.amount, u128::MAX);

        assert!(serde_json::from_str::<Wrapper>(r#"{"amount":"-5"}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"amount":"1.5"}"#).is_err());
    }
}
