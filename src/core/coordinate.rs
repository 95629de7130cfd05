//! Maven-style dependency coordinates.
//!
//! A coordinate names a library as `group:artifact`, e.g.
//! `org.incendo:cloud-paper`. The version lives on the declaration,
//! not the coordinate, so one coordinate identifies one library
//! across versions.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Segment syntax shared by group ids and artifact ids.
static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("valid regex"));

/// Error parsing a coordinate string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("coordinate `{0}` must have the form `group:artifact`")]
    MissingSeparator(String),

    #[error("coordinate `{coordinate}` has an invalid {part}: `{value}`")]
    InvalidSegment {
        coordinate: String,
        part: &'static str,
        value: String,
    },
}

/// A `group:artifact` library coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    group: String,
    artifact: String,
}

impl Coordinate {
    /// Create a coordinate from already-validated parts.
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Coordinate {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// The group id (reverse-domain namespace owner).
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The artifact id (library name within the group).
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Default archive file name for this coordinate at a given version,
    /// e.g. `cloud-paper-2.0.0-beta.2.jar`.
    pub fn archive_file_name(&self, version: &str, extension: &str) -> String {
        format!("{}-{}.{}", self.artifact, version, extension)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, artifact) = s
            .split_once(':')
            .ok_or_else(|| CoordinateError::MissingSeparator(s.to_string()))?;

        if !SEGMENT_RE.is_match(group) {
            return Err(CoordinateError::InvalidSegment {
                coordinate: s.to_string(),
                part: "group",
                value: group.to_string(),
            });
        }
        if !SEGMENT_RE.is_match(artifact) {
            return Err(CoordinateError::InvalidSegment {
                coordinate: s.to_string(),
                part: "artifact",
                value: artifact.to_string(),
            });
        }

        Ok(Coordinate::new(group, artifact))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}
