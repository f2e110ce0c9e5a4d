// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for OBJ/MTL parsing operations

use std::fmt;
use thiserror::Error;

/// Result type alias for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Position of a line inside a named source (geometry or material file)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Resource identifier the line was read from
    pub source: String,
    /// 1-based line number
    pub line: usize,
}

impl Location {
    /// Create a new location
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// Vertex attribute a face-vertex reference points into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Normal,
    TexCoord,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Position => "position",
            Attribute::Normal => "normal",
            Attribute::TexCoord => "texture coordinate",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while parsing a geometry or material file
///
/// Every variant is fatal to the parse that produced it.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A token that should be a number is not one
    #[error("Malformed number '{token}' at {location}")]
    MalformedNumber { token: String, location: Location },

    /// A directive that is not legal in the current parser state
    #[error("Illegal token '{directive}' in state {state} at {location}")]
    IllegalDirective {
        directive: String,
        state: &'static str,
        location: Location,
    },

    /// `usemtl` named a material no loaded library defines
    #[error("Unresolved material '{name}' at {location}")]
    UnresolvedMaterialReference { name: String, location: Location },

    /// A geometry, material or texture resource could not be opened
    #[error("Unresolved resource '{resource}': {reason}")]
    UnresolvedResource { resource: String, reason: String },

    /// A face-vertex reference beyond the declared attribute pool
    #[error("{attribute} index {index} out of range ({available} declared) at {location}")]
    IndexOutOfRange {
        attribute: Attribute,
        /// Index as written in the file (1-based)
        index: usize,
        available: usize,
        location: Location,
    },

    /// A directive with the wrong number of arguments
    #[error("Directive '{directive}' expects {expected} arguments, got {found} at {location}")]
    WrongArity {
        directive: String,
        expected: String,
        found: usize,
        location: Location,
    },

    /// A line could not be read, e.g. it is not valid UTF-8
    #[error("Unreadable line at {location}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        location: Location,
    },

    /// IO error while reading an already opened stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Create a malformed number error
    pub fn malformed(token: impl Into<String>, location: Location) -> Self {
        ParseError::MalformedNumber {
            token: token.into(),
            location,
        }
    }

    /// Create an illegal directive error
    pub fn illegal(directive: impl Into<String>, state: &'static str, location: Location) -> Self {
        ParseError::IllegalDirective {
            directive: directive.into(),
            state,
            location,
        }
    }

    /// Create an unresolved resource error
    pub fn unresolved(resource: impl fmt::Display, reason: impl Into<String>) -> Self {
        ParseError::UnresolvedResource {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a wrong arity error
    pub fn arity(
        directive: impl Into<String>,
        expected: impl Into<String>,
        found: usize,
        location: Location,
    ) -> Self {
        ParseError::WrongArity {
            directive: directive.into(),
            expected: expected.into(),
            found,
            location,
        }
    }

    /// Create a located read error
    pub fn read(source: std::io::Error, location: Location) -> Self {
        ParseError::Read { source, location }
    }

    /// Source location of the error, when it came from a specific line
    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::MalformedNumber { location, .. }
            | ParseError::IllegalDirective { location, .. }
            | ParseError::UnresolvedMaterialReference { location, .. }
            | ParseError::IndexOutOfRange { location, .. }
            | ParseError::WrongArity { location, .. }
            | ParseError::Read { location, .. } => Some(location),
            ParseError::UnresolvedResource { .. } | ParseError::Io(_) => None,
        }
    }
}
