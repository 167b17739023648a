//! Content URI - addresses for the fruit collection and single fruits
//!
//! Format: `content://<authority>/<path>[/<id>]`
//!
//! Examples:
//! - `content://com.example.android.fruitmarket/fruits`
//! - `content://com.example.android.fruitmarket/fruits/3`

use crate::contract::{CONTENT_AUTHORITY, CONTENT_SCHEME, PATH_FRUITS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parsed provider address.
///
/// Empty path segments are dropped, so `.../fruits/` and `.../fruits`
/// are the same address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    /// Scheme, `content` for every provider address
    pub scheme: String,
    /// Provider authority
    pub authority: String,
    /// Non-empty path segments
    pub segments: Vec<String>,
}

/// Classification of an address against the fruit provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// The whole `fruits` collection
    Fruits,
    /// One row of `fruits`
    FruitId(i64),
    /// Anything else
    NoMatch,
}

impl ContentUri {
    /// Create a new ContentUri
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>, segments: Vec<String>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            segments,
        }
    }

    /// Address of the whole fruit collection
    pub fn fruits() -> Self {
        Self::new(CONTENT_SCHEME, CONTENT_AUTHORITY, vec![PATH_FRUITS.to_string()])
    }

    /// Address of a single fruit
    pub fn fruit(id: i64) -> Self {
        Self::fruits().with_appended_id(id)
    }

    /// Parse an address string
    ///
    /// Expected format: `<scheme>://<authority>[/<segment>...]`
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri.split_once("://")
            .ok_or_else(|| Error::UnsupportedAddress(format!("{} (missing scheme)", uri)))?;

        if scheme.is_empty() {
            return Err(Error::UnsupportedAddress(format!("{} (empty scheme)", uri)));
        }

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        if authority.is_empty() {
            return Err(Error::UnsupportedAddress(format!("{} (empty authority)", uri)));
        }

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self::new(scheme, authority, segments))
    }

    /// Append a row id as a new last segment
    pub fn with_appended_id(&self, id: i64) -> Self {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        Self::new(self.scheme.clone(), self.authority.clone(), segments)
    }

    /// Numeric value of the last segment, if it is one
    pub fn parse_id(&self) -> Option<i64> {
        self.segments.last().and_then(|s| parse_row_id(s))
    }

    /// True if both addresses share scheme and authority and one path is a
    /// prefix of the other (equal, ancestor or descendant).
    pub fn is_related_to(&self, other: &ContentUri) -> bool {
        if self.scheme != other.scheme || self.authority != other.authority {
            return false;
        }
        let n = self.segments.len().min(other.segments.len());
        self.segments[..n] == other.segments[..n]
    }

    /// Classify this address against the fruit provider
    pub fn resolve(&self) -> UriMatch {
        if self.scheme != CONTENT_SCHEME || self.authority != CONTENT_AUTHORITY {
            return UriMatch::NoMatch;
        }
        match self.segments.as_slice() {
            [path] if path == PATH_FRUITS => UriMatch::Fruits,
            [path, id] if path == PATH_FRUITS => match parse_row_id(id) {
                Some(id) => UriMatch::FruitId(id),
                None => UriMatch::NoMatch,
            },
            _ => UriMatch::NoMatch,
        }
    }

    /// Convert to URI string
    pub fn to_uri_string(&self) -> String {
        let mut out = format!("{}://{}", self.scheme, self.authority);
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

/// Classify any address string. Total: unparseable input is `NoMatch`.
pub fn match_uri(address: &str) -> UriMatch {
    ContentUri::parse(address)
        .map(|uri| uri.resolve())
        .unwrap_or(UriMatch::NoMatch)
}

// Row ids are positive and written with ASCII digits only.
fn parse_row_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<i64>().ok().filter(|id| *id > 0)
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ContentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ContentUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ContentUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContentUri::parse(&s).map_err(serde::de::Error::custom)
    }
}
