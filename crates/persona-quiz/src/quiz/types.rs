use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::catalog::Dimension;

/// A four-letter base type such as `INTJ`, one pole per axis in `EI`, `SN`, `TF`, `JP` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeCode([u8; 4]);

impl TypeCode {
    /// Build a code from the four axis decisions; `true` selects the first-listed pole.
    pub fn from_poles(first_poles: [bool; 4]) -> Self {
        let mut letters = [0u8; 4];
        for (slot, dimension) in Dimension::ordered().into_iter().enumerate() {
            let pole = if first_poles[slot] {
                dimension.first_pole()
            } else {
                dimension.second_pole()
            };
            letters[slot] = pole as u8;
        }
        Self(letters)
    }

    /// All sixteen codes, first poles before second poles on each axis.
    pub fn all() -> Vec<Self> {
        (0u8..16)
            .map(|bits| {
                Self::from_poles([
                    bits & 0b1000 == 0,
                    bits & 0b0100 == 0,
                    bits & 0b0010 == 0,
                    bits & 0b0001 == 0,
                ])
            })
            .collect()
    }

    pub fn as_str(&self) -> &str {
        // Letters are only ever written from the ASCII pole table.
        std::str::from_utf8(&self.0).unwrap_or("XXXX")
    }

    /// Letter chosen on the given axis.
    pub fn pole(&self, dimension: Dimension) -> char {
        self.0[dimension.index()] as char
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeCode {
    type Err = TypeCodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let bytes = raw.as_bytes();
        if bytes.len() != 4 {
            return Err(TypeCodeError {
                raw: raw.to_string(),
            });
        }

        let mut first_poles = [false; 4];
        for (slot, dimension) in Dimension::ordered().into_iter().enumerate() {
            let letter = bytes[slot] as char;
            if letter == dimension.first_pole() {
                first_poles[slot] = true;
            } else if letter != dimension.second_pole() {
                return Err(TypeCodeError {
                    raw: raw.to_string(),
                });
            }
        }

        Ok(Self::from_poles(first_poles))
    }
}

impl Serialize for TypeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{raw}' is not a four-letter type code")]
pub struct TypeCodeError {
    pub raw: String,
}

/// Response-consistency suffix appended to the base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    Assertive,
    Turbulent,
}

impl Identity {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Assertive => "-A",
            Self::Turbulent => "-T",
        }
    }

    pub const fn is_turbulent(self) -> bool {
        matches!(self, Self::Turbulent)
    }
}

/// Base type plus identity suffix, e.g. `ENFP-T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FullType {
    pub base: TypeCode,
    pub identity: Identity,
}

impl FullType {
    pub fn new(base: TypeCode, identity: Identity) -> Self {
        Self { base, identity }
    }
}

impl fmt::Display for FullType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.identity.suffix())
    }
}

impl Serialize for FullType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Strip an exact trailing `-T` or `-A`, returning the remainder and the identity it named.
pub fn split_identity(full_type: &str) -> (&str, Option<Identity>) {
    if let Some(base) = full_type.strip_suffix(Identity::Turbulent.suffix()) {
        (base, Some(Identity::Turbulent))
    } else if let Some(base) = full_type.strip_suffix(Identity::Assertive.suffix()) {
        (base, Some(Identity::Assertive))
    } else {
        (full_type, None)
    }
}
