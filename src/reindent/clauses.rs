use super::common::{self, separate, write_elements, write_leaf, Piece, CONDITION_THRESHOLD};
use super::{render_segment, RenderContext};
use crate::error::RenderError;
use crate::segment::{Element, Segment};
use crate::token::TokenKind;
use crate::writer::Writer;

/// SELECT on its own line, then one column per line one level deeper.
pub fn select(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let indent = ctx.indent_of(segment);
    let mut columns = 0u32;
    let mut in_column = false;
    let mut after_comma = false;

    for piece in separate(&segment.elements) {
        match piece {
            Piece::Keyword(token) if token.kind == TokenKind::Select => {
                w.newline(indent);
                write_leaf(w, segment.kind, token)?;
            }
            Piece::Keyword(token) if token.kind.is_select_modifier() && columns == 0 => {
                write_leaf(w, segment.kind, token)?;
            }
            Piece::Comma(token) => {
                write_leaf(w, segment.kind, token)?;
                in_column = false;
                after_comma = true;
            }
            Piece::Keyword(token) => {
                if !in_column {
                    w.newline(indent + 1);
                    columns += 1;
                    in_column = true;
                    after_comma = false;
                }
                write_leaf(w, segment.kind, token)?;
            }
            Piece::Column(tokens) => {
                if !in_column {
                    w.newline(indent + 1);
                    columns += 1;
                    in_column = true;
                    after_comma = false;
                }
                for token in tokens {
                    write_leaf(w, segment.kind, token)?;
                }
            }
            Piece::Nested(child) => {
                let child_ctx = if child.kind.owns_closing() {
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

/// WHERE and HAVING. Up to [`CONDITION_THRESHOLD`] predicates stay on the
/// keyword's line; past that the keyword stands alone and every predicate
/// gets its own line.
pub fn condition(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let indent = ctx.indent_of(segment);
    let predicates = 1 + segment
        .children()
        .filter(|child| child.kind.is_connective())
        .count();
    let multiline = predicates > CONDITION_THRESHOLD;

    let mut first_predicate = true;
    for (idx, element) in segment.elements.iter().enumerate() {
        match element {
            Element::Token(token) if idx == 0 => {
                w.newline(indent);
                write_leaf(w, segment.kind, token)?;
            }
            Element::Token(token) => {
                if multiline && first_predicate {
                    w.newline(indent + 1);
                }
                first_predicate = false;
                write_leaf(w, segment.kind, token)?;
            }
            Element::Segment(child) if multiline && child.kind.is_connective() => {
                let child_ctx = RenderContext {
                    same_line: false,
                    extra_indent: ctx.extra_indent + 1,
                    ..ctx.nested(w)
                };
                first_predicate = false;
                render_segment(w, child, &child_ctx)?;
            }
            Element::Segment(child) if multiline => {
                let column_count = if first_predicate { 0 } else { 1 };
                let child_ctx = ctx.listed(w, column_count, false);
                first_predicate = false;
                render_segment(w, child, &child_ctx)?;
            }
            Element::Segment(child) => {
                first_predicate = false;
                common::write_child(w, child, ctx)?;
            }
        }
    }
    Ok(())
}

/// AND / OR: a new line only when the enclosing condition broke.
pub fn connective(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    write_elements(w, segment, ctx, |_, idx| idx == 0 && !ctx.same_line)
}

/// Join markers open the line; ON and USING follow on it.
pub fn join(w: &mut Writer<'_>, segment: &Segment, ctx: &RenderContext) -> Result<(), RenderError> {
    write_elements(w, segment, ctx, |_, idx| idx == 0)
}

pub fn lock(w: &mut Writer<'_>, segment: &Segment, ctx: &RenderContext) -> Result<(), RenderError> {
    write_elements(w, segment, ctx, |token, idx| {
        idx == 0 || token.kind == TokenKind::In
    })
}

/// Each common table expression starts its own line.
pub fn with(w: &mut Writer<'_>, segment: &Segment, ctx: &RenderContext) -> Result<(), RenderError> {
    let mut after_comma = false;
    write_elements(w, segment, ctx, |token, idx| {
        let breaks = idx == 0 || after_comma;
        after_comma = token.kind == TokenKind::Comma;
        breaks
    })
}

/// VALUES rows one per line; ON and DO (upserts) start lines at the
/// clause's own indent.
pub fn values(
    w: &mut Writer<'_>,
    segment: &Segment,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let indent = ctx.indent_of(segment);
    let mut in_rows = true;
    let mut rows = 0u32;
    let mut in_row = false;
    let mut after_comma = false;

    for (idx, element) in segment.elements.iter().enumerate() {
        match element {
            Element::Token(token) if idx == 0 => {
                w.newline(indent);
                write_leaf(w, segment.kind, token)?;
            }
            Element::Token(token) if matches!(token.kind, TokenKind::On | TokenKind::Do) => {
                in_rows = false;
                w.newline(indent);
                write_leaf(w, segment.kind, token)?;
            }
            Element::Token(token) if in_rows && token.kind == TokenKind::Comma => {
                write_leaf(w, segment.kind, token)?;
                in_row = false;
                after_comma = true;
            }
            Element::Token(token) if in_rows => {
                if !in_row {
                    w.newline(indent + 1);
                    rows += 1;
                    in_row = true;
                    after_comma = false;
                }
                write_leaf(w, segment.kind, token)?;
            }
            Element::Token(token) => write_leaf(w, segment.kind, token)?,
            Element::Segment(child) if in_rows => {
                let child_ctx = ctx.listed(w, rows, after_comma);
                if !in_row {
                    rows += 1;
                    in_row = true;
                    after_comma = false;
                }
                render_segment(w, child, &child_ctx)?;
            }
            Element::Segment(child) => common::write_child(w, child, ctx)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::lexer::tokenize;
    use crate::mode::FormatOptions;
    use crate::reindent::render;
    use crate::retriever::parse;
    use pretty_assertions::assert_eq;

    fn reindent(source: &str) -> String {
        let segments = parse(&tokenize(source).unwrap()).unwrap();
        render(&segments, &FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_select_columns() {
        assert_eq!(
            reindent("select a, b as c, count(*) from t"),
            "SELECT\n  a,\n  b AS c,\n  COUNT(*)\nFROM t"
        );
    }

    #[test]
    fn test_select_distinct_stays_on_keyword_line() {
        assert_eq!(
            reindent("SELECT DISTINCT a, b FROM t"),
            "SELECT DISTINCT\n  a,\n  b\nFROM t"
        );
    }

    #[test]
    fn test_select_expression_with_function_mid_column() {
        assert_eq!(
            reindent("SELECT a + coalesce(b, 0) AS total FROM t"),
            "SELECT\n  a + COALESCE(b, 0) AS total\nFROM t"
        );
    }

    #[test]
    fn test_select_case_column() {
        assert_eq!(
            reindent("SELECT id, CASE WHEN a = 1 THEN 'x' ELSE 'y' END AS kind FROM t"),
            "SELECT\n  id,\n  CASE\n    WHEN a = 1 THEN 'x'\n    ELSE 'y'\n  END AS kind\nFROM t"
        );
    }

    #[test]
    fn test_select_exists_subquery() {
        assert_eq!(
            reindent("SELECT EXISTS (SELECT 1 FROM t)"),
            "SELECT\n  EXISTS (\n    SELECT\n      1\n    FROM t\n  )"
        );
    }

    #[test]
    fn test_short_where_stays_inline() {
        assert_eq!(
            reindent("SELECT a FROM t WHERE x = 1 AND y = 2 OR z IS NULL"),
            "SELECT\n  a\nFROM t\nWHERE x = 1 AND y = 2 OR z IS NULL"
        );
    }

    #[test]
    fn test_condition_threshold_boundary() {
        assert_eq!(
            reindent("WHERE a = 1 AND b = 2 AND c = 3"),
            "WHERE a = 1 AND b = 2 AND c = 3"
        );
        assert_eq!(
            reindent("WHERE a = 1 AND b = 2 AND c = 3 AND d = 4"),
            "WHERE\n  a = 1\n  AND b = 2\n  AND c = 3\n  AND d = 4"
        );
    }

    #[test]
    fn test_having_breaks_like_where() {
        assert_eq!(
            reindent("SELECT a FROM t GROUP BY a HAVING count(*) > 1 OR a = 1 OR a = 2 OR a = 3 OR a = 4"),
            "SELECT\n  a\nFROM t\nGROUP BY a\nHAVING\n  COUNT(*) > 1\n  OR a = 1\n  OR a = 2\n  OR a = 3\n  OR a = 4"
        );
    }

    #[test]
    fn test_long_where_breaks() {
        assert_eq!(
            reindent("DELETE FROM t WHERE a = 1 AND b = 2 AND c = 3 AND d = 4 AND e BETWEEN 1 AND 5"),
            "DELETE\nFROM t\nWHERE\n  a = 1\n  AND b = 2\n  AND c = 3\n  AND d = 4\n  AND e BETWEEN 1 AND 5"
        );
    }

    #[test]
    fn test_long_where_with_subquery_predicate() {
        assert_eq!(
            reindent("WHERE a IN (SELECT b FROM c) AND d AND e AND f AND g"),
            "WHERE\n  a IN (\n    SELECT\n      b\n    FROM c\n  )\n  AND d\n  AND e\n  AND f\n  AND g"
        );
    }

    #[test]
    fn test_where_in_subquery_inline() {
        assert_eq!(
            reindent("SELECT a FROM t WHERE b IN (SELECT c FROM d)"),
            "SELECT\n  a\nFROM t\nWHERE b IN (\n  SELECT\n    c\n  FROM d\n)"
        );
    }

    #[test]
    fn test_joins() {
        assert_eq!(
            reindent("SELECT a FROM t LEFT OUTER JOIN u ON t.id = u.id AND u.ok JOIN v USING (id)"),
            "SELECT\n  a\nFROM t\nLEFT OUTER JOIN u ON t.id = u.id AND u.ok\nJOIN v USING (id)"
        );
    }

    #[test]
    fn test_limit_offset() {
        assert_eq!(
            reindent("SELECT a FROM t ORDER BY a LIMIT 10 OFFSET 20"),
            "SELECT\n  a\nFROM t\nORDER BY a\nLIMIT 10\nOFFSET 20"
        );
    }

    #[test]
    fn test_union_all() {
        assert_eq!(
            reindent("SELECT 1 UNION ALL SELECT 2"),
            "SELECT\n  1\nUNION ALL\nSELECT\n  2"
        );
    }

    #[test]
    fn test_insert_values() {
        assert_eq!(
            reindent("INSERT INTO t (a, b) VALUES (1, 2), (3, 4)"),
            "INSERT INTO t (a, b)\nVALUES\n  (1, 2),\n  (3, 4)"
        );
    }

    #[test]
    fn test_upsert() {
        assert_eq!(
            reindent("INSERT INTO t (a) VALUES ($1) ON CONFLICT (a) DO UPDATE SET a = excluded.a"),
            "INSERT INTO t (a)\nVALUES\n  ($1)\nON CONFLICT (a)\nDO UPDATE SET a = excluded.a"
        );
    }

    #[test]
    fn test_update_set_where() {
        assert_eq!(
            reindent("UPDATE t SET a = 1, b = 2 WHERE id = $1"),
            "UPDATE t\nSET\n  a = 1,\n  b = 2\nWHERE id = $1"
        );
        assert_eq!(
            reindent("UPDATE t SET a = 1 WHERE id = $1"),
            "UPDATE t\nSET a = 1\nWHERE id = $1"
        );
    }

    #[test]
    fn test_with_ctes() {
        assert_eq!(
            reindent("WITH x AS (SELECT 1), y AS (SELECT 2) SELECT * FROM x, y"),
            "WITH x AS (\n  SELECT\n    1\n),\ny AS (\n  SELECT\n    2\n)\nSELECT\n  *\nFROM x, y"
        );
    }

    #[test]
    fn test_lock() {
        assert_eq!(
            reindent("LOCK TABLE t IN ACCESS EXCLUSIVE MODE"),
            "LOCK TABLE t\nIN ACCESS EXCLUSIVE MODE"
        );
    }

    #[test]
    fn test_delete_using() {
        assert_eq!(
            reindent("DELETE FROM t USING u WHERE t.id = u.id"),
            "DELETE\nFROM t\nUSING u\nWHERE t.id = u.id"
        );
    }
}
