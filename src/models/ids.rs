//! Upstream identifiers for leagues and entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classic mini-league identifier as assigned by the upstream API.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueId(u64);

/// Entry (manager team) identifier, unique within the game.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

macro_rules! numeric_id {
    ($name:ident) => {
        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            /// Upstream never hands out zero; treat it as a malformed id.
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }
    };
}

numeric_id!(LeagueId);
numeric_id!(EntryId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", LeagueId::new(314)), "314");
        assert_eq!(format!("{}", EntryId::new(42)), "42");
    }

    #[test]
    fn test_id_debug() {
        let debug_str = format!("{:?}", EntryId::new(7));
        assert_eq!(debug_str, "EntryId(7)");
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("  1234 ".parse::<LeagueId>().unwrap(), LeagueId::new(1234));
        assert!("abc".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_id_zero_is_invalid() {
        assert!(!LeagueId::new(0).is_valid());
        assert!(EntryId::new(1).is_valid());
    }

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&EntryId::new(99)).unwrap();
        assert_eq!(json, "99");

        let parsed: LeagueId = serde_json::from_str("12").unwrap();
        assert_eq!(parsed, LeagueId::new(12));
    }
}
