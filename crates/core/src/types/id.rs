//! Newtype IDs for type-safe entity references.
//!
//! The remote service hands out plain integer ids for users, polls and poll
//! options. Wrapping them keeps a poll id from ever being passed where an
//! option id is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `Display`, `FromStr`, `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use quorum_core::define_id;
/// define_id!(BallotId);
/// define_id!(ChoiceId);
///
/// let ballot = BallotId::new(1);
/// let choice = ChoiceId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: BallotId = choice;
/// # let _ = (ballot, choice);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(PollId);
define_id!(OptionId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&PollId::new(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: OptionId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, OptionId::new(7));
    }

    #[test]
    fn test_from_str_trims() {
        let id: PollId = " 12 ".parse().unwrap();
        assert_eq!(id.as_i32(), 12);
        assert!("abc".parse::<PollId>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId::new(3).to_string(), "3");
    }
}
