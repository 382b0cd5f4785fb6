use smallvec::{smallvec, SmallVec};

use super::{render_segment, RenderContext};
use crate::error::RenderError;
use crate::segment::{Element, Segment, SegmentKind};
use crate::token::{Token, TokenKind};
use crate::writer::Writer;

/// GROUP BY, ORDER BY and SET stay on one line up to this many operands.
pub const LIST_THRESHOLD: usize = 2;

/// WHERE and HAVING stay on one line up to this many predicates.
pub const CONDITION_THRESHOLD: usize = 3;

/// Write one leaf token of `kind`'s segment.
pub fn write_leaf(w: &mut Writer<'_>, kind: SegmentKind, token: &Token) -> Result<(), RenderError> {
    if token.kind == TokenKind::Eof {
        return Err(RenderError::UnexpectedElement {
            kind,
            detail: "end-of-input token".to_string(),
        });
    }
    w.token(token);
    Ok(())
}

/// Write a child segment inline at the current position.
pub fn write_child(
    w: &mut Writer<'_>,
    child: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let child_ctx = ctx.nested(w);
    render_segment(w, child, &child_ctx)
}

/// Default clause policy: line-breaking keywords start a new line at the
/// segment's indent, everything else follows on the same line. The UPDATE
/// of a row-locking clause stays put.
pub fn write_clause(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let mut row_lock = false;
    write_elements(w, segment, ctx, |token, _| {
        let breaks = token.kind.breaks_line() && !(row_lock && token.kind == TokenKind::Update);
        row_lock = token.precedes_row_lock();
        breaks
    })
}

/// Write a segment's elements in order, starting a new line before every
/// leaf token for which `breaks_before(token, index)` holds.
pub fn write_elements<F>(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
    mut breaks_before: F,
) -> Result<(), RenderError>
where
    F: FnMut(&Token, usize) -> bool,
{
    let indent = ctx.indent_of(segment);
    for (idx, element) in segment.elements.iter().enumerate() {
        match element {
            Element::Token(token) => {
                if breaks_before(token, idx) {
                    w.newline(indent);
                }
                write_leaf(w, segment.kind, token)?;
            }
            Element::Segment(child) => write_child(w, child, ctx)?,
        }
    }
    Ok(())
}

/// A projection list split at its boundaries.
#[derive(Debug, PartialEq)]
pub enum Piece<'s> {
    /// Consecutive plain tokens of one column expression.
    Column(SmallVec<[&'s Token; 4]>),
    Keyword(&'s Token),
    Comma(&'s Token),
    Nested(&'s Segment),
}

/// Split elements into column groups, keywords, commas and nested segments.
pub fn separate(elements: &[Element]) -> Vec<Piece<'_>> {
    let mut pieces: Vec<Piece<'_>> = Vec::new();
    for element in elements {
        match element {
            Element::Segment(segment) => pieces.push(Piece::Nested(segment)),
            Element::Token(token) if token.kind == TokenKind::Comma => {
                pieces.push(Piece::Comma(token))
            }
            Element::Token(token)
                if token.kind.is_select_keyword() || token.kind.is_select_modifier() =>
            {
                pieces.push(Piece::Keyword(token))
            }
            Element::Token(token) => match pieces.last_mut() {
                Some(Piece::Column(group)) => group.push(token),
                _ => pieces.push(Piece::Column(smallvec![token])),
            },
        }
    }
    pieces
}

/// Leaf operands plus nested segments.
pub fn operand_count(segment: &Segment) -> usize {
    segment
        .elements
        .iter()
        .filter(|e| match e {
            Element::Token(token) => token.kind.is_operand(),
            Element::Segment(_) => true,
        })
        .count()
}

/// Comma-separated list clauses: the header keywords on one line, then
/// either everything inline or one entry per line one level deeper.
///
/// With a threshold the list breaks once it has more operands than that;
/// without one it breaks as soon as it has a comma.
pub fn write_with_comma(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
    threshold: Option<usize>,
) -> Result<(), RenderError> {
    let indent = ctx.indent_of(segment);
    let multiline = match threshold {
        Some(limit) => operand_count(segment) > limit,
        None => segment
            .elements
            .iter()
            .any(|e| e.is_token(TokenKind::Comma)),
    };

    let mut columns = 0u32;
    let mut in_column = false;
    let mut after_comma = false;
    for (idx, element) in segment.elements.iter().enumerate() {
        match element {
            Element::Token(token) if idx == 0 => {
                w.newline(indent);
                write_leaf(w, segment.kind, token)?;
            }
            Element::Token(token) if columns == 0 && token.kind == TokenKind::By => {
                write_leaf(w, segment.kind, token)?;
            }
            Element::Token(token) if token.kind == TokenKind::Comma => {
                write_leaf(w, segment.kind, token)?;
                in_column = false;
                after_comma = true;
            }
            Element::Token(token) => {
                if !in_column {
                    if multiline {
                        w.newline(indent + 1);
                    }
                    columns += 1;
                    in_column = true;
                    after_comma = false;
                }
                write_leaf(w, segment.kind, token)?;
            }
            Element::Segment(child) => {
                let child_ctx = if multiline {
                    ctx.listed(w, columns, after_comma)
                } else {
                    ctx.nested(w)
                };
                if !in_column {
                    columns += 1;
                    in_column = true;
                    after_comma = false;
                }
                render_segment(w, child, &child_ctx)?;
            }
        }
    }
    Ok(())
}
