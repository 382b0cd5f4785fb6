use super::common::write_leaf;
use super::{render_segment, RenderContext};
use crate::error::RenderError;
use crate::segment::{Element, Segment, SegmentKind};
use crate::token::{Token, TokenKind};
use crate::writer::Writer;

/// Split `elements` into opening token, body, and closing token.
fn split_bracket<'s>(
    kind: SegmentKind,
    elements: &'s [Element],
    open: &[TokenKind],
    close: TokenKind,
) -> Result<(&'s Token, &'s [Element], &'s Token), RenderError> {
    let unexpected = |detail: &str| RenderError::UnexpectedElement {
        kind,
        detail: detail.to_string(),
    };
    let (first, rest) = elements
        .split_first()
        .ok_or_else(|| unexpected("empty segment"))?;
    let (last, body) = rest
        .split_last()
        .ok_or_else(|| unexpected("missing closing token"))?;
    let opening = first
        .as_token()
        .filter(|t| open.contains(&t.kind))
        .ok_or_else(|| unexpected("missing opening token"))?;
    let closing = last
        .as_token()
        .filter(|t| t.kind == close)
        .ok_or_else(|| unexpected("missing closing token"))?;
    Ok((opening, body, closing))
}

/// Write bracket contents inline; nested segments lay themselves out.
fn write_body(
    w: &mut Writer<'_>,
    kind: SegmentKind,
    body: &[Element],
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    for element in body {
        match element {
            Element::Token(token) => write_leaf(w, kind, token)?,
            Element::Segment(child) => {
                let child_ctx = ctx.nested(w);
                render_segment(w, child, &child_ctx)?;
            }
        }
    }
    Ok(())
}

/// A call's closer drops to its own line when the body broke lines, unless
/// the body's last line already starts with a closer.
fn closes_on_new_line(w: &Writer<'_>, lines_before: usize) -> bool {
    w.line_count() > lines_before
        && !matches!(
            w.line_head(),
            Some(TokenKind::ParenClose | TokenKind::End)
        )
}

pub fn parenthesis(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let (open, body, close) = split_bracket(
        segment.kind,
        &segment.elements,
        &[TokenKind::ParenOpen],
        TokenKind::ParenClose,
    )?;
    let indent = ctx.indent_of(segment);
    if ctx.starts_column() {
        w.newline(indent);
    }
    w.token(open);
    write_body(w, segment.kind, body, ctx)?;
    if segment.children().next().is_some() {
        w.newline(indent);
    }
    w.token(close);
    Ok(())
}

/// A bracketed query: its body one level deeper than the brackets, the
/// closing `)` always on its own line.
pub fn subquery(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let (open, body, close) = split_bracket(
        segment.kind,
        &segment.elements,
        &[TokenKind::ParenOpen],
        TokenKind::ParenClose,
    )?;
    let outer = ctx.indent_of(segment).saturating_sub(1);
    if !ctx.continues_line {
        w.newline(outer);
    }
    w.token(open);
    let inner = RenderContext {
        in_function: false,
        ..*ctx
    };
    write_body(w, segment.kind, body, &inner)?;
    w.newline(outer);
    w.token(close);
    Ok(())
}

/// Function calls and parameterized type casts: the name glued to its
/// argument list, arguments inline.
pub fn call(w: &mut Writer<'_>, segment: &Segment, ctx: &RenderContext) -> Result<(), RenderError> {
    let (head, rest) = segment
        .elements
        .split_first()
        .ok_or_else(|| RenderError::UnexpectedElement {
            kind: segment.kind,
            detail: "empty segment".to_string(),
        })?;
    let name = head
        .as_token()
        .filter(|t| t.kind.is_callable())
        .ok_or_else(|| RenderError::UnexpectedElement {
            kind: segment.kind,
            detail: "missing function or type name".to_string(),
        })?;
    let (open, body, close) = split_bracket(
        segment.kind,
        rest,
        &[TokenKind::ParenOpen],
        TokenKind::ParenClose,
    )?;

    let indent = ctx.indent_of(segment);
    if ctx.starts_column() && !ctx.in_function {
        w.newline(indent);
    }
    w.token(name);
    w.glued(open);
    let lines_before = w.line_count();
    let inner = RenderContext {
        in_function: true,
        ..*ctx
    };
    write_body(w, segment.kind, body, &inner)?;
    if closes_on_new_line(w, lines_before) {
        w.newline(indent);
    }
    w.token(close);
    Ok(())
}

/// CASE: WHEN and ELSE one level deeper, END back at CASE's level.
pub fn case(w: &mut Writer<'_>, segment: &Segment, ctx: &RenderContext) -> Result<(), RenderError> {
    let (open, body, close) = split_bracket(
        segment.kind,
        &segment.elements,
        &[TokenKind::Case],
        TokenKind::End,
    )?;
    let indent = ctx.indent_of(segment);
    if ctx.starts_column() {
        w.newline(indent);
    }
    w.token(open);
    for element in body {
        match element {
            Element::Token(token) if matches!(token.kind, TokenKind::When | TokenKind::Else) => {
                w.newline(indent + 1);
                write_leaf(w, segment.kind, token)?;
            }
            Element::Token(token) => write_leaf(w, segment.kind, token)?,
            Element::Segment(child) => {
                let child_ctx = ctx.nested(w);
                render_segment(w, child, &child_ctx)?;
            }
        }
    }
    w.newline(indent);
    w.token(close);
    Ok(())
}
