// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line tokenizer shared by the geometry and material parsers
//!
//! Splits a raw line into whitespace-delimited tokens after dropping blank
//! and comment lines, and classifies geometry directives.

use obj_lite_model::{Location, ParseError, Result};

/// Where a line came from, cheap to copy
///
/// Only turned into an owned [`Location`] when an error is built.
#[derive(Clone, Copy, Debug)]
pub struct SourcePos<'a> {
    pub source: &'a str,
    pub line: usize,
}

impl<'a> SourcePos<'a> {
    pub fn new(source: &'a str, line: usize) -> Self {
        Self { source, line }
    }

    /// Owned location for error reporting
    pub fn location(&self) -> Location {
        Location::new(self.source, self.line)
    }
}

/// One tokenized, non-blank, non-comment line
#[derive(Clone, Debug, PartialEq)]
pub struct TokenLine<'a> {
    /// 1-based line number
    pub number: usize,
    /// First token, selects the directive
    pub keyword: &'a str,
    /// Remaining tokens
    pub args: Vec<&'a str>,
}

impl<'a> TokenLine<'a> {
    /// Split a raw line, returning `None` for lines that carry no directive
    pub fn parse(number: usize, raw: &'a str) -> Option<Self> {
        let mut tokens = tokenize(raw)?.into_iter();
        let keyword = tokens.next()?;
        Some(Self {
            number,
            keyword,
            args: tokens.collect(),
        })
    }

    /// All arguments joined by single spaces (names may contain spaces)
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

/// Split a line on whitespace
///
/// Returns `None` when the line is empty after trimming or starts with `#`.
/// A token starting with `#` ends the line, so trailing comments are
/// dropped. A leading byte-order mark is ignored.
pub fn tokenize(line: &str) -> Option<Vec<&str>> {
    let trimmed = line.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(
        trimmed
            .split_whitespace()
            .take_while(|token| !token.starts_with('#'))
            .collect(),
    )
}

/// Geometry file directive, selected by the first token of a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `o name`
    Object,
    /// `g name`
    Group,
    /// `v x y z`
    Vertex,
    /// `vn x y z`
    Normal,
    /// `vt u v [w]`
    TexCoord,
    /// `f i[/j][/k] ...`
    Face,
    /// `l i ...`
    Line,
    /// `usemtl name`
    UseMaterial,
    /// `mtllib file ...`
    MaterialLibrary,
    /// `s value`
    Smoothing,
    /// Anything else, kept for error reporting
    Other(&'a str),
}

impl<'a> Directive<'a> {
    /// Classify a keyword (case-sensitive, as written by exporters)
    pub fn parse(keyword: &'a str) -> Self {
        match keyword {
            "o" => Directive::Object,
            "g" => Directive::Group,
            "v" => Directive::Vertex,
            "vn" => Directive::Normal,
            "vt" => Directive::TexCoord,
            "f" => Directive::Face,
            "l" => Directive::Line,
            "usemtl" => Directive::UseMaterial,
            "mtllib" => Directive::MaterialLibrary,
            "s" => Directive::Smoothing,
            other => Directive::Other(other),
        }
    }

    /// Keyword as it appears in the file
    pub fn keyword(&self) -> &'a str {
        match self {
            Directive::Object => "o",
            Directive::Group => "g",
            Directive::Vertex => "v",
            Directive::Normal => "vn",
            Directive::TexCoord => "vt",
            Directive::Face => "f",
            Directive::Line => "l",
            Directive::UseMaterial => "usemtl",
            Directive::MaterialLibrary => "mtllib",
            Directive::Smoothing => "s",
            Directive::Other(keyword) => keyword,
        }
    }
}

/// Accepted argument counts for a directive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
        }
    }

    /// Fail with `WrongArity` unless `args` has an accepted length
    pub fn check(&self, directive: &str, args: &[&str], pos: SourcePos<'_>) -> Result<()> {
        if self.accepts(args.len()) {
            Ok(())
        } else {
            Err(ParseError::arity(
                directive,
                self.describe(),
                args.len(),
                pos.location(),
            ))
        }
    }

    fn describe(&self) -> String {
        match *self {
            Arity::Exactly(n) => n.to_string(),
            Arity::AtLeast(n) => format!("at least {n}"),
            Arity::Between(lo, hi) => format!("{lo} to {hi}"),
        }
    }
}

/// Parse one float argument
pub fn parse_f32(token: &str, pos: SourcePos<'_>) -> Result<f32> {
    lexical_core::parse::<f32>(token.as_bytes())
        .map_err(|_| ParseError::malformed(token, pos.location()))
}

/// Parse a 3-component vector from a directive's arguments
///
/// Every argument is validated as a float; components beyond the third are
/// ignored and missing ones (allowed by `arity`) default to 0.0.
pub fn parse_vector(
    directive: &str,
    args: &[&str],
    arity: Arity,
    pos: SourcePos<'_>,
) -> Result<[f32; 3]> {
    arity.check(directive, args, pos)?;
    let mut out = [0.0f32; 3];
    for (i, token) in args.iter().enumerate() {
        let value = parse_f32(token, pos)?;
        if let Some(slot) = out.get_mut(i) {
            *slot = value;
        }
    }
    Ok(out)
}
