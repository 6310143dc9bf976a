//! Amount units and formatting.
//!
//! XP amounts are `u128` counts of the smallest indivisible unit. With the
//! default 18 decimals, one whole XP is `10^18` units. Amounts are written
//! to JSON as decimal strings so that values above `u64::MAX` survive
//! generic JSON tooling.

use crate::error::{LedgerError, Result};

/// Scale a whole-unit amount by `10^decimals`.
pub fn scale_whole(whole: u128, decimals: u8) -> Result<u128> {
    10u128
        .checked_pow(decimals as u32)
        .and_then(|factor| whole.checked_mul(factor))
        .ok_or(LedgerError::SupplyOverflow)
}

/// Parse a decimal string like `"12"` or `"1.5"` into smallest units.
pub fn parse_amount(s: &str, decimals: u8) -> Result<u128> {
    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(LedgerError::InvalidAmount);
    }
    if frac.len() > decimals as usize {
        return Err(LedgerError::InvalidAmount);
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::InvalidAmount);
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| LedgerError::InvalidAmount)?
    };
    let mut units = scale_whole(whole, decimals)?;

    if !frac.is_empty() {
        let padded = format!("{frac:0<width$}", width = decimals as usize);
        let frac_units: u128 = padded.parse().map_err(|_| LedgerError::InvalidAmount)?;
        units = units
            .checked_add(frac_units)
            .ok_or(LedgerError::SupplyOverflow)?;
    }

    Ok(units)
}

/// Render smallest units as a decimal string, trimming trailing zeros.
pub fn format_amount(units: u128, decimals: u8) -> String {
    if decimals == 0 {
        return units.to_string();
    }
    let factor = 10u128.pow(decimals as u32);
    let whole = units / factor;
    let frac = units % factor;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Serde adapter writing `u128` as a decimal string.
pub mod serde_amount {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Serde adapter for maps whose values are `u128` amounts.
pub mod serde_amount_map {
    use std::collections::BTreeMap;

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<K, S>(map: &BTreeMap<K, u128>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize + Ord,
        S: Serializer,
    {
        let as_strings: BTreeMap<&K, String> =
            map.iter().map(|(k, v)| (k, v.to_string())).collect();
        as_strings.serialize(serializer)
    }

    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, u128>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<K, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| v.parse().map(|n| (k, n)).map_err(de::Error::custom))
            .collect()
    }
}
