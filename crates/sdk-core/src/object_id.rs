//! Sui object identifiers and account addresses.
//!
//! # Format
//!
//! | Form | Example |
//! |------|---------|
//! | Canonical | `0x0000...0002` (64 hex digits) |
//! | Short | `0x2` (left-padded with zeros on parse) |
//!
//! Parsing accepts an optional `0x` prefix and mixed case. [`Display`]
//! always produces the canonical lowercase form.
//!
//! [`Display`]: std::fmt::Display

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Length in bytes of an object id or address.
pub const ADDRESS_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// ObjectIdError
// ---------------------------------------------------------------------------

/// Errors from parsing an [`ObjectId`] or [`SuiAddress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    /// The input was empty (or only the `0x` prefix).
    Empty,

    /// The input encodes more than 32 bytes.
    TooLong(usize),

    /// The input contains a non-hex character.
    InvalidHex(String),
}

impl fmt::Display for ObjectIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty object id"),
            Self::TooLong(digits) => {
                write!(f, "object id has {digits} hex digits, at most 64 allowed")
            }
            Self::InvalidHex(detail) => write!(f, "invalid hex: {detail}"),
        }
    }
}

impl std::error::Error for ObjectIdError {}

/// Parse `0x`-prefixed (or bare) hex into a left-padded 32-byte array.
fn parse_hex_32(s: &str) -> Result<[u8; ADDRESS_LENGTH], ObjectIdError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return Err(ObjectIdError::Empty);
    }
    if digits.len() > ADDRESS_LENGTH * 2 {
        return Err(ObjectIdError::TooLong(digits.len()));
    }

    // Left-pad to 64 digits so short forms like `0x2` decode.
    let padded = format!("{digits:0>64}");
    let mut out = [0u8; ADDRESS_LENGTH];
    hex::decode_to_slice(&padded, &mut out)
        .map_err(|e| ObjectIdError::InvalidHex(e.to_string()))?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Identifier types
// ---------------------------------------------------------------------------

macro_rules! ledger_identifier {
    ($(#[$meta:meta])* $name:ident, $expecting:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; ADDRESS_LENGTH]);

        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

            /// Wraps raw bytes.
            pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Returns the raw 32 bytes.
            pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
                &self.0
            }

            /// Returns the canonical `0x`-prefixed, 64-digit lowercase form.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Parses a hex string, accepting short forms and an optional `0x`.
            pub fn from_hex(s: &str) -> Result<Self, ObjectIdError> {
                parse_hex_32(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({self})", stringify!($name))
            }
        }

        impl FromStr for $name {
            type Err = ObjectIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; ADDRESS_LENGTH]> for $name {
            fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_hex())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    Self::from_hex(&s).map_err(|e| {
                        de::Error::custom(format_args!("{}: {e}", $expecting))
                    })
                } else {
                    <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Self)
                }
            }
        }
    };
}

ledger_identifier!(
    /// Identifier of a Sui object.
    ///
    /// dWallets, presign sessions, coins, and the shared dWallet coordinator
    /// are all addressed by an `ObjectId`.
    ObjectId,
    "invalid object id"
);

ledger_identifier!(
    /// Account address of a transaction sender or transfer recipient.
    SuiAddress,
    "invalid address"
);

#[cfg(test)]
mod tests {
    use super::*;

    const IKA_COIN: &str = "0x9df87437f4f0fb73bffe6fc6291f568da6e59ad4ad0770743b21cd4e1c030914";

    #[test]
    fn parse_canonical() {
        let id: ObjectId = IKA_COIN.parse().unwrap();
        assert_eq!(id.as_bytes()[0], 0x9d);
        assert_eq!(id.as_bytes()[31], 0x14);
        assert_eq!(id.to_string(), IKA_COIN);
    }

    #[test]
    fn parse_short_form_left_pads() {
        let id = ObjectId::from_hex("0x2").unwrap();
        let mut expected = [0u8; ADDRESS_LENGTH];
        expected[31] = 2;
        assert_eq!(id, ObjectId::new(expected));
        assert_eq!(
            id.to_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn parse_without_prefix_and_uppercase() {
        let upper = IKA_COIN.trim_start_matches("0x").to_uppercase();
        let id = ObjectId::from_hex(&upper).unwrap();
        assert_eq!(id.to_string(), IKA_COIN);
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(ObjectId::from_hex(""), Err(ObjectIdError::Empty));
        assert_eq!(ObjectId::from_hex("0x"), Err(ObjectIdError::Empty));
    }

    #[test]
    fn parse_rejects_too_long() {
        let long = format!("0x{}", "a".repeat(65));
        assert_eq!(ObjectId::from_hex(&long), Err(ObjectIdError::TooLong(65)));
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(matches!(
            ObjectId::from_hex("0xzz"),
            Err(ObjectIdError::InvalidHex(_))
        ));
    }

    #[test]
    fn json_uses_hex_string() {
        let id: ObjectId = IKA_COIN.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{IKA_COIN}\""));

        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn json_rejects_garbage() {
        let err = serde_json::from_str::<SuiAddress>("\"not-an-address\"").unwrap_err();
        assert!(err.to_string().contains("invalid address"));
    }

    #[test]
    fn bcs_is_fixed_32_bytes() {
        let id = ObjectId::from_hex("0x2").unwrap();
        let bytes = bcs::to_bytes(&id).unwrap();
        assert_eq!(bytes.len(), ADDRESS_LENGTH);
        assert_eq!(bytes[31], 2);

        let back: ObjectId = bcs::from_bytes(&bytes).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn debug_names_the_type() {
        let addr = SuiAddress::ZERO;
        assert!(format!("{addr:?}").starts_with("SuiAddress(0x000"));
    }

    #[test]
    fn error_display() {
        assert_eq!(ObjectIdError::Empty.to_string(), "empty object id");
        assert_eq!(
            ObjectIdError::TooLong(70).to_string(),
            "object id has 70 hex digits, at most 64 allowed"
        );
    }
}
