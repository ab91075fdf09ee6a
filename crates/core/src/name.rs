//! Strongly-typed names used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Name of a stocked item (e.g. `"apple"`).
///
/// Case-sensitive: `"Apple"` and `"apple"` are different items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

/// Name of a warehouse (e.g. `"owd"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WarehouseName(String);

macro_rules! impl_name_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build a name, rejecting empty or whitespace-only input.
            ///
            /// The value is stored verbatim (no trimming, no case folding).
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ValueObject for $t {}

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl core::borrow::Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $t {
            type Error = DomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_name_newtype!(ItemName, "item name");
impl_name_newtype!(WarehouseName, "warehouse name");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_and_blank_names_are_rejected() {
        assert_eq!(
            ItemName::new("").unwrap_err(),
            DomainError::validation("item name cannot be empty")
        );
        assert_eq!(
            WarehouseName::new("   ").unwrap_err(),
            DomainError::validation("warehouse name cannot be empty")
        );
    }

    #[test]
    fn names_are_case_sensitive_and_kept_verbatim() {
        let lower = ItemName::new("apple").unwrap();
        let upper = ItemName::new("Apple").unwrap();
        assert_ne!(lower, upper);

        let padded = WarehouseName::new(" owd ").unwrap();
        assert_eq!(padded.as_str(), " owd ");
    }

    #[test]
    fn map_lookup_by_str_works_through_borrow() {
        let mut stock: HashMap<ItemName, u64> = HashMap::new();
        stock.insert(ItemName::new("banana").unwrap(), 3);
        assert_eq!(stock.get("banana"), Some(&3));
        assert_eq!(stock.get("Banana"), None);
    }

    #[test]
    fn serde_round_trips_as_plain_string_and_validates() {
        let name = WarehouseName::new("dm").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"dm\"");

        let back: WarehouseName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);

        let err = serde_json::from_str::<ItemName>("\"\"").unwrap_err();
        assert!(err.to_string().contains("item name cannot be empty"));
    }
}
