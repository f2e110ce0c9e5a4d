// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face/line index resolver using nom combinators
//!
//! Parses the per-vertex tokens of `f` and `l` directives (`v`, `v/t`,
//! `v/t/n`, `v//n`) into [`FaceIndex`] records and maps them into the
//! current object's attribute pools.

use crate::tokenizer::{Arity, SourcePos};
use obj_lite_model::{Attribute, FaceIndex, ParseError, Result};
use nom::{
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::preceded,
    IResult, Parser,
};

// ============================================================================
// Parsing Primitives
// ============================================================================

/// Parse a 1-based index as written in the file
fn index(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| {
        lexical_core::parse::<u32>(digits.as_bytes())
    })
    .parse(input)
}

/// Parse a `/` followed by an optional index
fn slot(input: &str) -> IResult<&str, Option<u32>> {
    preceded(char('/'), opt(index)).parse(input)
}

/// Parse `v`, `v/t`, `v/t/n` or `v//n`
fn reference(input: &str) -> IResult<&str, (u32, Option<Option<u32>>, Option<Option<u32>>)> {
    (index, opt(slot), opt(slot)).parse(input)
}

fn zero_based(value: u32, token: &str, pos: SourcePos<'_>) -> Result<u32> {
    value
        .checked_sub(1)
        .ok_or_else(|| ParseError::malformed(token, pos.location()))
}

// ============================================================================
// Reference Parsing
// ============================================================================

/// Parse one face-vertex token into a 0-based record
///
/// The whole token must match; a texcoord or normal field is kept only when
/// present and non-empty.
pub fn parse_reference(token: &str, pos: SourcePos<'_>) -> Result<FaceIndex> {
    let (_, (position, tex_coord, normal)) = all_consuming(reference)
        .parse(token)
        .map_err(|_| ParseError::malformed(token, pos.location()))?;

    let mut record = FaceIndex::position(zero_based(position, token, pos)?);
    if let Some(Some(t)) = tex_coord {
        record = record.with_tex_coord(zero_based(t, token, pos)?);
    }
    if let Some(Some(n)) = normal {
        record = record.with_normal(zero_based(n, token, pos)?);
    }
    Ok(record)
}

/// Parse the arguments of an `f` directive (at least three references)
pub fn parse_face(args: &[&str], pos: SourcePos<'_>) -> Result<Vec<FaceIndex>> {
    Arity::AtLeast(3).check("f", args, pos)?;
    args.iter().map(|token| parse_reference(token, pos)).collect()
}

/// Parse the arguments of an `l` directive (at least two references)
///
/// Line endpoints carry a position and optionally a texture coordinate;
/// a normal field is dropped.
pub fn parse_line(args: &[&str], pos: SourcePos<'_>) -> Result<Vec<FaceIndex>> {
    Arity::AtLeast(2).check("l", args, pos)?;
    args.iter()
        .map(|token| {
            parse_reference(token, pos).map(|mut record| {
                record.normal = None;
                record
            })
        })
        .collect()
}

// ============================================================================
// Pool Mapping
// ============================================================================

/// Slice of file index space covered by one pool of the current object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexWindow {
    /// Entries declared by earlier objects (0 in per-object mode)
    pub offset: u32,
    /// Entries declared by the current object
    pub len: u32,
}

impl IndexWindow {
    /// Pool-local index for a 0-based file index, if inside the window
    pub fn local(&self, index: u32) -> Option<u32> {
        index.checked_sub(self.offset).filter(|local| *local < self.len)
    }
}

/// Index windows of the position, normal and texcoord pools
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolWindows {
    pub positions: IndexWindow,
    pub normals: IndexWindow,
    pub tex_coords: IndexWindow,
}

impl PoolWindows {
    /// Map a file-space record onto the current pools
    ///
    /// Fails with `IndexOutOfRange` when any index falls outside its pool.
    pub fn localize(&self, record: FaceIndex, pos: SourcePos<'_>) -> Result<FaceIndex> {
        let position = map_index(record.position, self.positions, Attribute::Position, pos)?;
        let tex_coord = record
            .tex_coord
            .map(|t| map_index(t, self.tex_coords, Attribute::TexCoord, pos))
            .transpose()?;
        let normal = record
            .normal
            .map(|n| map_index(n, self.normals, Attribute::Normal, pos))
            .transpose()?;
        Ok(FaceIndex {
            position,
            tex_coord,
            normal,
        })
    }
}

fn map_index(
    index: u32,
    window: IndexWindow,
    attribute: Attribute,
    pos: SourcePos<'_>,
) -> Result<u32> {
    window
        .local(index)
        .ok_or_else(|| ParseError::IndexOutOfRange {
            attribute,
            index: index as usize + 1,
            available: window.len as usize,
            location: pos.location(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POS: SourcePos<'static> = SourcePos {
        source: "face.obj",
        line: 12,
    };

    #[test]
    fn test_bare_index() {
        let record = parse_reference("1", POS).unwrap();
        assert_eq!(record, FaceIndex::position(0));
    }

    #[test]
    fn test_position_texcoord() {
        let record = parse_reference("3/7", POS).unwrap();
        assert_eq!(record, FaceIndex::position(2).with_tex_coord(6));
    }

    #[test]
    fn test_full_reference() {
        let record = parse_reference("3/7/9", POS).unwrap();
        assert_eq!(
            record,
            FaceIndex::position(2).with_tex_coord(6).with_normal(8)
        );
    }

    #[test]
    fn test_skipped_texcoord() {
        let record = parse_reference("5//2", POS).unwrap();
        assert_eq!(record, FaceIndex::position(4).with_normal(1));
        assert!(record.tex_coord.is_none());
    }

    #[test]
    fn test_trailing_empty_fields() {
        assert_eq!(parse_reference("4/", POS).unwrap(), FaceIndex::position(3));
        assert_eq!(parse_reference("4//", POS).unwrap(), FaceIndex::position(3));
    }

    #[test]
    fn test_malformed_references() {
        for token in ["", "x", "/1", "1/a", "1/2/3/4", "-1", "1.5", "0", "2/0", "1//0"] {
            let err = parse_reference(token, POS).unwrap_err();
            assert!(
                matches!(err, ParseError::MalformedNumber { .. }),
                "{token:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_face_requires_three_references() {
        assert_eq!(parse_face(&["1", "2", "3"], POS).unwrap().len(), 3);
        let err = parse_face(&["1", "2"], POS).unwrap_err();
        assert!(matches!(err, ParseError::WrongArity { found: 2, .. }));
    }

    #[test]
    fn test_face_fails_whole_directive() {
        assert!(parse_face(&["1", "2", "x"], POS).is_err());
    }

    #[test]
    fn test_line_drops_normals() {
        let records = parse_line(&["1/2/3", "4"], POS).unwrap();
        assert_eq!(records[0], FaceIndex::position(0).with_tex_coord(1));
        assert_eq!(records[1], FaceIndex::position(3));
        assert!(parse_line(&["1"], POS).is_err());
    }

    #[test]
    fn test_window_local() {
        let window = IndexWindow { offset: 48, len: 120 };
        assert_eq!(window.local(47), None);
        assert_eq!(window.local(48), Some(0));
        assert_eq!(window.local(167), Some(119));
        assert_eq!(window.local(168), None);
    }

    #[test]
    fn test_localize_out_of_range() {
        let windows = PoolWindows {
            positions: IndexWindow { offset: 0, len: 3 },
            normals: IndexWindow { offset: 0, len: 1 },
            tex_coords: IndexWindow::default(),
        };
        let ok = windows
            .localize(FaceIndex::position(2).with_normal(0), POS)
            .unwrap();
        assert_eq!(ok, FaceIndex::position(2).with_normal(0));

        let err = windows.localize(FaceIndex::position(3), POS).unwrap_err();
        match err {
            ParseError::IndexOutOfRange {
                attribute,
                index,
                available,
                ..
            } => {
                assert_eq!(attribute, Attribute::Position);
                assert_eq!(index, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = windows
            .localize(FaceIndex::position(0).with_tex_coord(0), POS)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::IndexOutOfRange {
                attribute: Attribute::TexCoord,
                ..
            }
        ));
    }
}
