use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Minor units per whole unit (two fractional digits).
pub const MINOR_PER_UNIT: u64 = 100;

/// Largest representable amount in minor units. Every value up to this
/// bound converts to and from `f64` without loss.
pub const MAX_MINOR: u64 = 1 << 53;

/// Fixed-precision face value of a bill.
///
/// Stored as integer minor units (hundredths). The canonical text form is
/// what enters the content hash: whole amounts render without a fractional
/// part (`10`), all others with exactly two digits (`10.50`). The text form
/// never depends on float formatting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount {
    minor: u64,
}

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self { minor: 0 };

    /// Create from minor units (hundredths).
    pub fn from_minor(minor: u64) -> Result<Self, TypeError> {
        if minor > MAX_MINOR {
            return Err(TypeError::OutOfRange);
        }
        Ok(Self { minor })
    }

    /// Create from a whole number of units.
    pub fn from_units(units: u64) -> Result<Self, TypeError> {
        units
            .checked_mul(MINOR_PER_UNIT)
            .ok_or(TypeError::OutOfRange)
            .and_then(Self::from_minor)
    }

    /// Convert a float, rejecting anything that is not an exact hundredth.
    pub fn from_f64(value: f64) -> Result<Self, TypeError> {
        if !value.is_finite() {
            return Err(TypeError::NotFinite);
        }
        if value < 0.0 {
            return Err(TypeError::Negative);
        }

        let scaled = value * MINOR_PER_UNIT as f64;
        let rounded = scaled.round();
        if rounded > MAX_MINOR as f64 {
            return Err(TypeError::OutOfRange);
        }
        if (scaled - rounded).abs() > 1e-6_f64.max(scaled.abs() * 1e-12) {
            return Err(TypeError::TooPrecise);
        }
        // Noise tolerance must never turn a non-zero input into zero.
        if rounded == 0.0 && value != 0.0 {
            return Err(TypeError::TooPrecise);
        }

        Ok(Self {
            minor: rounded as u64,
        })
    }

    /// Amount in minor units.
    pub fn minor_units(&self) -> u64 {
        self.minor
    }

    /// The whole-unit value, if the amount has no fractional part.
    pub fn whole_units(&self) -> Option<u64> {
        (self.minor % MINOR_PER_UNIT == 0).then_some(self.minor / MINOR_PER_UNIT)
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Lossless float view (every representable amount fits in 53 bits).
    pub fn as_f64(&self) -> f64 {
        self.minor as f64 / MINOR_PER_UNIT as f64
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.minor / MINOR_PER_UNIT;
        let cents = self.minor % MINOR_PER_UNIT;
        if cents == 0 {
            write!(f, "{units}")
        } else {
            write!(f, "{units}.{cents:02}")
        }
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(TypeError::Negative);
        }

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
            return Err(TypeError::InvalidAmount(s.to_string()));
        }

        let significant = frac.trim_end_matches('0');
        let cents: u64 = match significant.len() {
            0 => 0,
            1 => u64::from(significant.as_bytes()[0] - b'0') * 10,
            2 => significant.parse().map_err(|_| TypeError::InvalidAmount(s.to_string()))?,
            _ => return Err(TypeError::TooPrecise),
        };

        let units: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| TypeError::OutOfRange)?
        };

        units
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|m| m.checked_add(cents))
            .ok_or(TypeError::OutOfRange)
            .and_then(Self::from_minor)
    }
}

impl TryFrom<f64> for Amount {
    type Error = TypeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.whole_units() {
            Some(units) => serializer.serialize_u64(units),
            None => serializer.serialize_f64(self.as_f64()),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Unsigned(u64),
            Float(f64),
            Text(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Unsigned(units) => Self::from_units(units),
            Raw::Float(value) => Self::from_f64(value),
            Raw::Text(text) => text.parse(),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}
