//! Identifiers for users, figures, comments, and replies
//!
//! Every identifier doubles as a document path segment, so construction is
//! validated: non-empty, at most 128 bytes, and free of `/`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum identifier length in bytes
const MAX_ID_LEN: usize = 128;

/// Error when parsing an identifier from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier exceeds 128 bytes")]
    TooLong,

    #[error("identifier contains a path separator: {0}")]
    PathSeparator(String),
}

fn check_segment(value: &str) -> Result<(), IdParseError> {
    if value.is_empty() {
        return Err(IdParseError::Empty);
    }
    if value.len() > MAX_ID_LEN {
        return Err(IdParseError::TooLong);
    }
    if value.contains('/') {
        return Err(IdParseError::PathSeparator(value.to_string()));
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier
            pub fn parse(value: impl Into<String>) -> Result<Self, IdParseError> {
                let value = value.into();
                check_segment(&value)?;
                Ok(Self(value))
            }

            /// Borrow the identifier as a path segment
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Take the inner string
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_id!(
    /// Stable user identifier supplied by the identity provider
    UserId
);

string_id!(
    /// Public figure identifier
    FigureId
);

string_id!(
    /// Top-level comment identifier
    CommentId
);

string_id!(
    /// Reply identifier (scoped under a comment)
    ReplyId
);

impl CommentId {
    /// Generate a fresh random comment id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl ReplyId {
    /// Generate a fresh random reply id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}
