//! Client identifiers.
//!
//! A client id names a licensee. It is assigned by the operator and carries
//! no structure: it is not an email, a UUID or anything else we could check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Operator-assigned identifier of a licensee.
///
/// The only normalisation applied is trimming surrounding whitespace when
/// parsing request input. Ordering is lexicographic so enumerations come out
/// sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Parses a client id from caller input, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BlankClientId`] if nothing remains after trimming.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::BlankClientId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns true if the id is empty or whitespace only.
    ///
    /// Ids built with [`ClientId::parse`] never are; ids deserialized from
    /// snapshot files or remote replies can be.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClientId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
