use tracing::debug;

use crate::error::ParseError;
use crate::segment::{Element, Segment, SegmentKind};
use crate::token::{Token, TokenKind};

/// Join markers this close to a segment's start belong to the segment's
/// own keyword run (`LEFT OUTER JOIN`) and never open a nested join.
const JOIN_PREFIX_LEN: usize = 3;

/// Group a token stream into top-level clause segments.
///
/// The stream must end with exactly one EOF token, as produced by
/// [`crate::lexer::tokenize`].
///
/// Nested segments are retrieved recursively, so stack depth grows with
/// the SQL's bracket and clause nesting. Pathologically deep input can
/// exhaust the stack; this is an accepted limitation.
pub fn parse(tokens: &[Token]) -> Result<Vec<Segment>, ParseError> {
    validate_stream(tokens)?;

    let mut retriever = Retriever { tokens, pos: 0 };
    let mut segments = Vec::new();
    while let Some(token) = retriever.peek() {
        if token.kind == TokenKind::Eof {
            break;
        }
        let (kind, indent) = retriever.statement_start(token)?;
        segments.push(retriever.retrieve(kind, indent)?);
    }

    debug!(
        tokens = tokens.len(),
        segments = segments.len(),
        "retrieved clause segments"
    );
    Ok(segments)
}

fn validate_stream(tokens: &[Token]) -> Result<(), ParseError> {
    let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
    match tokens.last() {
        Some(last) if last.kind == TokenKind::Eof && eofs == 1 => Ok(()),
        _ => Err(ParseError::MalformedStream),
    }
}

struct Retriever<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Retriever<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, ahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// The segment a top-level statement opens with.
    fn statement_start(&self, token: &Token) -> Result<(SegmentKind, u32), ParseError> {
        let invalid = || ParseError::InvalidStart {
            text: token.text.to_string(),
            position: self.pos,
        };
        match token.kind {
            TokenKind::ParenOpen if self.opens_query() => Ok((SegmentKind::Subquery, 1)),
            TokenKind::Function | TokenKind::Type => Err(invalid()),
            kind => SegmentKind::opened_by(kind)
                .map(|segment| (segment, 0))
                .ok_or_else(invalid),
        }
    }

    /// Consume one segment of `kind`, starting at the current token.
    fn retrieve(&mut self, kind: SegmentKind, indent: u32) -> Result<Segment, ParseError> {
        let start = self.pos;
        let no_terminator = || ParseError::NoTerminator {
            kind,
            position: start,
        };

        let opener = self.bump().ok_or_else(no_terminator)?;
        let mut elements = vec![Element::Token(opener.clone())];
        let mut in_join_prefix = kind == SegmentKind::Join;

        loop {
            let token = self.peek().ok_or_else(no_terminator)?;
            if in_join_prefix && token.kind.is_join_marker() {
                elements.push(Element::Token(token.clone()));
                self.pos += 1;
                continue;
            }
            in_join_prefix = false;

            if token.kind == TokenKind::Update && self.locks_rows() {
                elements.push(Element::Token(token.clone()));
                self.pos += 1;
                continue;
            }
            if is_terminator(kind, token.kind) {
                break;
            }
            match self.nested_start(kind, indent, self.pos - start) {
                Some((child, child_indent)) => {
                    let segment = self.retrieve(child, child_indent)?;
                    elements.push(Element::Segment(segment));
                }
                None => {
                    elements.push(Element::Token(token.clone()));
                    self.pos += 1;
                }
            }
        }

        let closing = if kind.owns_closing() {
            Some(self.bump().ok_or_else(no_terminator)?.clone())
        } else {
            None
        };
        Ok(build_segment(kind, elements, closing, indent))
    }

    /// Whether the current token opens a nested segment inside `parent`.
    fn nested_start(
        &self,
        parent: SegmentKind,
        indent: u32,
        offset: usize,
    ) -> Option<(SegmentKind, u32)> {
        let token = self.peek()?;
        let prev = self.tokens.get(self.pos.checked_sub(1)?)?;
        let base = if parent == SegmentKind::Case {
            indent + 1
        } else {
            indent
        };

        let kind = match token.kind {
            TokenKind::ParenOpen if prev.kind.is_callable() => return None,
            TokenKind::ParenOpen if self.opens_query() => {
                return Some((SegmentKind::Subquery, base + 1))
            }
            TokenKind::Type if self.peek_kind(1) != Some(TokenKind::ParenOpen) => return None,
            TokenKind::Order
                if matches!(parent, SegmentKind::Function | SegmentKind::Parenthesis) =>
            {
                return None
            }
            TokenKind::From | TokenKind::Where if parent == SegmentKind::Function => return None,
            TokenKind::Group if prev.text.eq_ignore_ascii_case("WITHIN") => return None,
            TokenKind::With if !self.opens_cte() => return None,
            k if k.is_join_marker() => {
                return (offset >= JOIN_PREFIX_LEN && parent != SegmentKind::Join)
                    .then_some((SegmentKind::Join, base));
            }
            k if k.is_group_maker() => SegmentKind::opened_by(k)?,
            _ => return None,
        };
        Some((kind, base))
    }

    /// The current UPDATE completes `FOR UPDATE` or `FOR NO KEY UPDATE`.
    fn locks_rows(&self) -> bool {
        self.pos
            .checked_sub(1)
            .and_then(|prev| self.tokens.get(prev))
            .is_some_and(Token::precedes_row_lock)
    }

    /// `(` followed by SELECT, possibly behind further `(`.
    fn opens_query(&self) -> bool {
        self.tokens
            .get(self.pos + 1..)
            .and_then(|rest| rest.iter().find(|t| t.kind != TokenKind::ParenOpen))
            .is_some_and(|t| t.kind == TokenKind::Select)
    }

    /// `WITH name AS (`, `WITH name (cols) AS (` or `WITH RECURSIVE`, as
    /// opposed to `WITH TIME ZONE` or `WITH ORDINALITY`.
    fn opens_cte(&self) -> bool {
        let Some(name) = self.tokens.get(self.pos + 1) else {
            return false;
        };
        match name.kind {
            TokenKind::Recursive => true,
            TokenKind::Identifier if !name.text.eq_ignore_ascii_case("ORDINALITY") => matches!(
                self.peek_kind(2),
                Some(TokenKind::As | TokenKind::ParenOpen)
            ),
            _ => false,
        }
    }
}

/// Terminators are checked before anything else and are never consumed,
/// so the enclosing segment sees them next.
fn is_terminator(segment: SegmentKind, kind: TokenKind) -> bool {
    use TokenKind as T;

    let closes = matches!(kind, T::ParenClose | T::Eof);
    let starts_statement = matches!(
        kind,
        T::Select | T::Insert | T::Update | T::Delete | T::Lock
    );
    let set_operator = matches!(kind, T::Union | T::Intersect | T::Except);
    let paging = matches!(kind, T::Limit | T::Offset | T::Fetch);
    let join = kind.is_join_marker();
    let shared = closes || set_operator || paging || starts_statement;

    match segment {
        SegmentKind::Select => closes || set_operator || starts_statement || kind == T::From,
        SegmentKind::From => {
            shared
                || join
                || matches!(
                    kind,
                    T::Where | T::Group | T::Order | T::Having | T::Returning | T::Set
                )
        }
        SegmentKind::Join => {
            shared
                || join
                || matches!(
                    kind,
                    T::Where | T::Group | T::Order | T::Having | T::Returning | T::Set
                )
        }
        SegmentKind::Where | SegmentKind::Having => {
            shared || matches!(kind, T::Group | T::Order | T::Having | T::Returning | T::Do)
        }
        SegmentKind::AndClause | SegmentKind::OrClause => {
            shared
                || join
                || matches!(
                    kind,
                    T::AndGroup
                        | T::OrGroup
                        | T::Where
                        | T::Group
                        | T::Order
                        | T::Having
                        | T::Returning
                        | T::Set
                        | T::Then
                        | T::When
                        | T::Else
                        | T::End
                        | T::Do
                        | T::Values
                        | T::Comma
                )
        }
        SegmentKind::GroupBy => shared || matches!(kind, T::Having | T::Order | T::Returning),
        SegmentKind::OrderBy | SegmentKind::Limit => shared || kind == T::Returning,
        SegmentKind::Tie(_) => closes || matches!(kind, T::Select | T::ParenOpen | T::With),
        SegmentKind::Update => {
            closes || join || matches!(kind, T::Set | T::From | T::Where | T::Returning)
        }
        SegmentKind::Set => {
            closes || starts_statement || matches!(kind, T::From | T::Where | T::Returning)
        }
        SegmentKind::Returning | SegmentKind::Lock => closes || starts_statement,
        SegmentKind::Delete => {
            closes || starts_statement || matches!(kind, T::From | T::Where | T::Returning)
        }
        SegmentKind::Insert => {
            closes || matches!(kind, T::Values | T::Select | T::With | T::Delete | T::Lock)
        }
        SegmentKind::Values => {
            closes
                || set_operator
                || matches!(kind, T::Select | T::Insert | T::Delete | T::Lock | T::Returning)
        }
        SegmentKind::With => {
            closes || matches!(kind, T::Select | T::Insert | T::Update | T::Delete)
        }
        SegmentKind::Case => kind == T::End,
        SegmentKind::Parenthesis
        | SegmentKind::Subquery
        | SegmentKind::Function
        | SegmentKind::TypeCast => kind == T::ParenClose,
    }
}

/// Attach the closing token and settle the final kind of a bracketed
/// segment: a `(` that looked like a query start but does not wrap a
/// query is a plain parenthesis at its parent's indentation, and so is
/// everything inside it.
fn build_segment(
    kind: SegmentKind,
    mut elements: Vec<Element>,
    closing: Option<Token>,
    indent: u32,
) -> Segment {
    if let Some(token) = closing {
        elements.push(Element::Token(token));
    }
    if kind == SegmentKind::Subquery && !wraps_query(&elements) {
        dedent(&mut elements);
        return Segment::new(SegmentKind::Parenthesis, elements, indent.saturating_sub(1));
    }
    Segment::new(kind, elements, indent)
}

/// The body is a SELECT, or nothing but bracketed queries and set
/// operators (`((SELECT 1) UNION (SELECT 2))`). A tuple such as
/// `((SELECT 1), 2)` is not.
fn wraps_query(elements: &[Element]) -> bool {
    let body = elements
        .get(1..elements.len().saturating_sub(1))
        .unwrap_or_default();
    match body.first() {
        Some(Element::Segment(inner)) if inner.kind == SegmentKind::Select => true,
        Some(Element::Segment(inner)) if inner.kind == SegmentKind::Subquery => body
            .iter()
            .all(|element| matches!(element, Element::Segment(_))),
        _ => false,
    }
}

fn dedent(elements: &mut [Element]) {
    for element in elements {
        if let Element::Segment(segment) = element {
            segment.indent_level = segment.indent_level.saturating_sub(1);
            dedent(&mut segment.elements);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::segment::TieKind;
    use pretty_assertions::assert_eq;

    fn retrieve(source: &str) -> Vec<Segment> {
        parse(&tokenize(source).unwrap()).unwrap()
    }

    /// Compact tree rendering: `Kind@indent[child child ...]`.
    fn shape(segment: &Segment) -> String {
        let parts: Vec<String> = segment
            .elements
            .iter()
            .map(|e| match e {
                Element::Token(t) => t.text.to_string(),
                Element::Segment(s) => shape(s),
            })
            .collect();
        format!("{:?}@{}[{}]", segment.kind, segment.indent_level, parts.join(" "))
    }

    fn shapes(source: &str) -> Vec<String> {
        retrieve(source).iter().map(shape).collect()
    }

    #[test]
    fn test_top_level_clauses() {
        assert_eq!(
            shapes("select a, b from t where x = 1"),
            vec![
                "Select@0[SELECT a , b]",
                "From@0[FROM t]",
                "Where@0[WHERE x = 1]",
            ]
        );
    }

    #[test]
    fn test_empty_stream() {
        assert!(retrieve("").is_empty());
    }

    #[test]
    fn test_function_consumes_closing_paren() {
        assert_eq!(
            shapes("SELECT date_trunc('DAY', to_timestamp(x))"),
            vec!["Select@0[SELECT Function@0[DATE_TRUNC ( 'DAY' , Function@0[TO_TIMESTAMP ( x )] )]]"]
        );
    }

    #[test]
    fn test_subquery_indent() {
        assert_eq!(
            shapes("SELECT a FROM (SELECT b FROM t) s"),
            vec![
                "Select@0[SELECT a]",
                "From@0[FROM Subquery@1[( Select@1[SELECT b] From@1[FROM t] )] s]",
            ]
        );
    }

    #[test]
    fn test_top_level_subquery() {
        assert_eq!(
            shapes("(SELECT 1)"),
            vec!["Subquery@1[( Select@1[SELECT 1] )]"]
        );
    }

    #[test]
    fn test_double_paren_without_query_is_parenthesis() {
        assert_eq!(
            shapes("SELECT ((a))"),
            vec!["Select@0[SELECT Parenthesis@0[( Parenthesis@0[( a )] )]]"]
        );
    }

    #[test]
    fn test_tuple_holding_subquery_is_parenthesis() {
        assert_eq!(
            shapes("SELECT a FROM t WHERE x IN ((SELECT 1), 2)"),
            vec![
                "Select@0[SELECT a]",
                "From@0[FROM t]",
                "Where@0[WHERE x IN Parenthesis@0[( Subquery@1[( Select@1[SELECT 1] )] , 2 )]]",
            ]
        );
        assert_eq!(
            shapes("((SELECT 1) UNION (SELECT 2))"),
            vec![
                "Subquery@1[( Subquery@2[( Select@2[SELECT 1] )] Tie(Union)@1[UNION] Subquery@2[( Select@2[SELECT 2] )] )]"
            ]
        );
    }

    #[test]
    fn test_and_or_nest_inside_where() {
        assert_eq!(
            shapes("WHERE a = 1 AND b BETWEEN 1 AND 2 OR c"),
            vec!["Where@0[WHERE a = 1 AndClause@0[AND b BETWEEN 1 AND 2] OrClause@0[OR c]]"]
        );
    }

    #[test]
    fn test_compound_join_prefix() {
        assert_eq!(
            shapes("FROM a LEFT OUTER JOIN b ON a.id = b.id JOIN c USING (id)"),
            vec![
                "From@0[FROM a]",
                "Join@0[LEFT OUTER JOIN b ON a.id = b.id]",
                "Join@0[JOIN c USING Parenthesis@0[( id )]]",
            ]
        );
    }

    #[test]
    fn test_join_inside_subquery_nests() {
        let segments = retrieve("SELECT * FROM (SELECT a FROM b JOIN c ON x) d");
        let from = &segments[1];
        let subquery = from.children().next().unwrap();
        assert_eq!(subquery.kind, SegmentKind::Subquery);
        let kinds: Vec<SegmentKind> = subquery.children().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SegmentKind::Select, SegmentKind::From, SegmentKind::Join]
        );
    }

    #[test]
    fn test_case_children_are_deeper() {
        assert_eq!(
            shapes("SELECT CASE WHEN a THEN (SELECT 1) END"),
            vec!["Select@0[SELECT Case@0[CASE WHEN a THEN Subquery@2[( Select@2[SELECT 1] )] END]]"]
        );
    }

    #[test]
    fn test_function_suppresses_clause_keywords() {
        assert_eq!(
            shapes("SELECT extract(year FROM d), count(*) FILTER (WHERE x)"),
            vec![
                "Select@0[SELECT Function@0[EXTRACT ( year FROM d )] , Function@0[COUNT ( * )] Function@0[FILTER ( WHERE x )]]"
            ]
        );
    }

    #[test]
    fn test_order_inside_window() {
        assert_eq!(
            shapes("SELECT row_number() OVER (PARTITION BY a ORDER BY b)"),
            vec![
                "Select@0[SELECT Function@0[ROW_NUMBER ( )] Function@0[OVER ( PARTITION BY a ORDER BY b )]]"
            ]
        );
    }

    #[test]
    fn test_within_group() {
        assert_eq!(
            shapes("SELECT percentile_cont(0.5) WITHIN GROUP (ORDER BY x)"),
            vec!["Select@0[SELECT percentile_cont Parenthesis@0[( 0.5 )] WITHIN GROUP Parenthesis@0[( ORDER BY x )]]"]
        );
    }

    #[test]
    fn test_type_cast_needs_paren() {
        assert_eq!(
            shapes("SELECT a::varchar(10), b::int"),
            vec!["Select@0[SELECT a :: TypeCast@0[VARCHAR ( 10 )] , b :: INT]"]
        );
    }

    #[test]
    fn test_with_time_zone_is_not_cte() {
        assert_eq!(
            shapes("SELECT a::timestamp WITH TIME ZONE"),
            vec!["Select@0[SELECT a :: TIMESTAMP WITH TIME ZONE]"]
        );
    }

    #[test]
    fn test_cte() {
        assert_eq!(
            shapes("WITH x AS (SELECT 1) SELECT * FROM x"),
            vec![
                "With@0[WITH x AS Subquery@1[( Select@1[SELECT 1] )]]",
                "Select@0[SELECT *]",
                "From@0[FROM x]",
            ]
        );
    }

    #[test]
    fn test_set_operation() {
        let segments = retrieve("SELECT 1 UNION ALL SELECT 2");
        assert_eq!(segments[1].kind, SegmentKind::Tie(TieKind::Union));
        assert_eq!(shape(&segments[1]), "Tie(Union)@0[UNION ALL]");
    }

    #[test]
    fn test_insert_values_upsert() {
        assert_eq!(
            shapes("INSERT INTO t (a) VALUES (1) ON CONFLICT (a) DO UPDATE SET a = 2"),
            vec![
                "Insert@0[INSERT INTO t Parenthesis@0[( a )]]",
                "Values@0[VALUES Parenthesis@0[( 1 )] ON CONFLICT Parenthesis@0[( a )] DO UPDATE SET a = 2]",
            ]
        );
    }

    #[test]
    fn test_update_statement() {
        assert_eq!(
            shapes("UPDATE t SET a = 1, b = 2 WHERE id = 3 RETURNING id"),
            vec![
                "Update@0[UPDATE t]",
                "Set@0[SET a = 1 , b = 2]",
                "Where@0[WHERE id = 3]",
                "Returning@0[RETURNING id]",
            ]
        );
    }

    #[test]
    fn test_invalid_start() {
        let tokens = tokenize("foo bar").unwrap();
        assert_eq!(
            parse(&tokens),
            Err(ParseError::InvalidStart {
                text: "foo".to_string(),
                position: 0,
            })
        );
        let tokens = tokenize("SELECT 1) x").unwrap();
        assert!(matches!(
            parse(&tokens),
            Err(ParseError::InvalidStart { position: 2, .. })
        ));
    }

    #[test]
    fn test_no_terminator() {
        let tokens = tokenize("SELECT (a").unwrap();
        assert_eq!(
            parse(&tokens),
            Err(ParseError::NoTerminator {
                kind: SegmentKind::Parenthesis,
                position: 1,
            })
        );
        let tokens = tokenize("SELECT CASE WHEN a THEN b").unwrap();
        assert!(matches!(
            parse(&tokens),
            Err(ParseError::NoTerminator {
                kind: SegmentKind::Case,
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_stream() {
        assert_eq!(parse(&[]), Err(ParseError::MalformedStream));
        let tokens = vec![Token::new(TokenKind::Select, "SELECT")];
        assert_eq!(parse(&tokens), Err(ParseError::MalformedStream));
        let tokens = vec![Token::eof(), Token::eof()];
        assert_eq!(parse(&tokens), Err(ParseError::MalformedStream));
    }
}
