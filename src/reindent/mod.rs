pub mod brackets;
pub mod clauses;
pub mod common;

use tracing::debug;

use crate::error::RenderError;
use crate::mode::FormatOptions;
use crate::segment::{Segment, SegmentKind};
use crate::token::TokenKind;
use crate::writer::Writer;

/// Per-child rendering state, passed down from a segment to its children.
///
/// Segment trees are immutable; everything that depends on where a
/// segment sits in its parent lives here.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Levels added on top of the segment's own indent level.
    pub extra_indent: u32,
    /// Kind of the token written just before this segment.
    pub preceding: Option<TokenKind>,
    /// The preceding token keeps an opening bracket on its line.
    pub continues_line: bool,
    /// The segment sits in a list of columns or tuples.
    pub is_column_area: bool,
    /// Columns already started in the enclosing list.
    pub column_count: u32,
    pub has_comma_before: bool,
    /// AND/OR stays on the current line.
    pub same_line: bool,
    /// Inside a function's argument list.
    pub in_function: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            extra_indent: 0,
            preceding: None,
            continues_line: false,
            is_column_area: false,
            column_count: 0,
            has_comma_before: false,
            same_line: true,
            in_function: false,
        }
    }
}

impl RenderContext {
    /// Context for a child segment about to be written at the writer's
    /// current position.
    pub fn nested(&self, w: &Writer<'_>) -> Self {
        let preceding = w.last();
        Self {
            extra_indent: self.extra_indent,
            preceding,
            continues_line: preceding.is_some_and(TokenKind::continues_line),
            in_function: self.in_function,
            ..Self::default()
        }
    }

    /// Same as [`RenderContext::nested`], for a child laid out as one entry
    /// of an indented list.
    pub fn listed(&self, w: &Writer<'_>, column_count: u32, has_comma_before: bool) -> Self {
        Self {
            extra_indent: self.extra_indent + 1,
            is_column_area: true,
            column_count,
            has_comma_before,
            ..self.nested(w)
        }
    }

    pub fn indent_of(&self, segment: &Segment) -> u32 {
        segment.indent_level + self.extra_indent
    }

    /// First entry of a list, or the entry right after a comma.
    pub fn starts_column(&self) -> bool {
        self.is_column_area && (self.column_count == 0 || self.has_comma_before)
    }
}

/// Render top-level segments to text.
///
/// Recurses once per nesting level of the segment tree, with the same
/// stack-depth limitation as [`crate::retriever::parse`].
pub fn render(segments: &[Segment], options: &FormatOptions) -> Result<String, RenderError> {
    let mut w = Writer::new(options);
    for segment in segments {
        let ctx = RenderContext::default().nested(&w);
        render_segment(&mut w, segment, &ctx)?;
    }
    debug!(lines = w.line_count() + 1, "rendered segments");
    Ok(w.finish())
}

/// Dispatch one segment to its clause writer.
pub fn render_segment(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    match segment.kind {
        SegmentKind::Select => clauses::select(w, segment, ctx),
        SegmentKind::Where | SegmentKind::Having => clauses::condition(w, segment, ctx),
        SegmentKind::AndClause | SegmentKind::OrClause => clauses::connective(w, segment, ctx),
        SegmentKind::Join => clauses::join(w, segment, ctx),
        SegmentKind::GroupBy | SegmentKind::OrderBy | SegmentKind::Set => {
            common::write_with_comma(w, segment, ctx, Some(common::LIST_THRESHOLD))
        }
        SegmentKind::Update | SegmentKind::Returning => {
            common::write_with_comma(w, segment, ctx, None)
        }
        SegmentKind::Values => clauses::values(w, segment, ctx),
        SegmentKind::With => clauses::with(w, segment, ctx),
        SegmentKind::Lock => clauses::lock(w, segment, ctx),
        SegmentKind::From
        | SegmentKind::Limit
        | SegmentKind::Tie(_)
        | SegmentKind::Delete
        | SegmentKind::Insert => common::write_clause(w, segment, ctx),
        SegmentKind::Case => brackets::case(w, segment, ctx),
        SegmentKind::Parenthesis => brackets::parenthesis(w, segment, ctx),
        SegmentKind::Subquery => brackets::subquery(w, segment, ctx),
        SegmentKind::Function | SegmentKind::TypeCast => brackets::call(w, segment, ctx),
    }
}
