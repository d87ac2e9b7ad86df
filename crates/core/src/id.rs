//! Identifiers for unitrack entities.
//!
//! Identifiers come from uploaded unit content, so they are plain strings
//! rather than generated values.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the identifier is empty or whitespace.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }

            /// True when the identifier can be embedded in a file or key name:
            /// no path separators, no `..`, no NUL.
            pub fn is_path_safe(&self) -> bool {
                !(self.0.contains('/')
                    || self.0.contains('\\')
                    || self.0.contains("..")
                    || self.0.contains('\0'))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Unique identifier for a Unit
    UnitId
);

string_id!(
    /// Identifier for a learning outcome, unique within its unit
    OutcomeId
);

string_id!(
    /// Identifier for a task, unique within its unit
    TaskId
);

string_id!(
    /// Identifier for an acceptance criterion
    CriterionId
);
