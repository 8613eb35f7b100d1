// crates/schematizer-core/src/core/identifiers.rs
// ============================================================================
// Module: Schematizer Identifiers
// Description: Store-assigned numeric identifiers for registry entities.
// Purpose: Provide strongly typed, serializable IDs with stable numeric forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Namespaces, sources, and schemas are identified by monotonic numeric IDs
//! assigned by the persistence layer. IDs are non-zero and serialize as plain
//! integers so they round-trip through JSON and `SQLite` without adapters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Generates a non-zero numeric identifier newtype.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates a new identifier from a non-zero value.
            #[must_use]
            pub const fn new(id: NonZeroU64) -> Self {
                Self(id)
            }

            /// Creates an identifier from a raw value (returns `None` if zero).
            #[must_use]
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Creates an identifier from a signed database value.
            ///
            /// Returns `None` for zero or negative values.
            #[must_use]
            pub fn from_i64(raw: i64) -> Option<Self> {
                u64::try_from(raw).ok().and_then(Self::from_raw)
            }

            /// Returns the raw identifier value (always >= 1).
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0.get()
            }

            /// Returns the identifier as a signed database value.
            ///
            /// Saturates at `i64::MAX`; stores never assign IDs that large.
            #[must_use]
            pub fn to_i64(self) -> i64 {
                i64::try_from(self.0.get()).unwrap_or(i64::MAX)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.get().fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let raw: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid {}: {value}", $label))?;
                Self::from_raw(raw).ok_or_else(|| format!("{} must be non-zero", $label))
            }
        }
    };
}

numeric_id!(
    /// Namespace identifier.
    ///
    /// # Invariants
    /// - Non-zero; assigned once by the store and never reused.
    NamespaceId,
    "namespace id"
);

numeric_id!(
    /// Source identifier, unique across all namespaces.
    SourceId,
    "source id"
);

numeric_id!(
    /// Schema identifier.
    ///
    /// # Invariants
    /// - Monotonic per store: a schema's base always has a smaller ID.
    SchemaId,
    "schema id"
);
