use std::{cmp::Ordering, fmt, str::FromStr};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

/// The integer `value` of an [Amount], in units of `10^-assetScale`.
///
/// Serialized as a decimal string so that values above `2^53` survive JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountValue(BigUint);

impl AmountValue {
    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }
}

impl From<u64> for AmountValue {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("amount value must be a non-negative decimal integer, got {0:?}")]
pub struct ParseAmountValueError(String);

impl FromStr for AmountValue {
    type Err = ParseAmountValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseAmountValueError(s.to_owned()));
        }
        s.parse()
            .map(Self)
            .map_err(|_| ParseAmountValueError(s.to_owned()))
    }
}

impl fmt::Display for AmountValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for AmountValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AmountValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A monetary amount in a given asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    pub value: AmountValue,
    pub asset_code: String,
    pub asset_scale: u8,
}

impl Amount {
    pub fn new(value: impl Into<AmountValue>, asset_code: impl Into<String>, asset_scale: u8) -> Self {
        Self {
            value: value.into(),
            asset_code: asset_code.into(),
            asset_scale,
        }
    }

    /// Whether both amounts are denominated in the same asset code and scale.
    pub fn same_asset(&self, other: &Amount) -> bool {
        self.asset_code == other.asset_code && self.asset_scale == other.asset_scale
    }

    /// Compare the values of two amounts of the same asset.
    ///
    /// `names` labels `self` and `other` in the [InvariantViolation::AssetMismatch] returned when
    /// the assets differ; values of different assets are never compared.
    pub fn checked_cmp(
        &self,
        other: &Amount,
        names: (&'static str, &'static str),
    ) -> Result<Ordering, InvariantViolation> {
        if !self.same_asset(other) {
            return Err(InvariantViolation::AssetMismatch(names.0, names.1));
        }
        Ok(self.value.cmp(&other.value))
    }
}
