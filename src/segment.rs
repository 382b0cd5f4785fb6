use std::fmt;

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TieKind {
    Union,
    Intersect,
    Except,
}

/// The clause or bracketed construct a segment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Select,
    From,
    Where,
    GroupBy,
    OrderBy,
    Having,
    Limit,
    Join,
    AndClause,
    OrClause,
    Tie(TieKind),
    Update,
    Set,
    Returning,
    Delete,
    Insert,
    Values,
    Lock,
    With,
    Case,
    Parenthesis,
    Subquery,
    Function,
    TypeCast,
}

impl SegmentKind {
    /// The segment a leading token opens, if any.
    ///
    /// `(` maps to `Parenthesis`; whether it is really a subquery is
    /// decided once its contents are known.
    pub fn opened_by(kind: TokenKind) -> Option<Self> {
        let segment = match kind {
            TokenKind::Select => Self::Select,
            TokenKind::From => Self::From,
            TokenKind::Where => Self::Where,
            TokenKind::Group => Self::GroupBy,
            TokenKind::Order => Self::OrderBy,
            TokenKind::Having => Self::Having,
            TokenKind::Limit | TokenKind::Offset | TokenKind::Fetch => Self::Limit,
            TokenKind::AndGroup => Self::AndClause,
            TokenKind::OrGroup => Self::OrClause,
            TokenKind::Union => Self::Tie(TieKind::Union),
            TokenKind::Intersect => Self::Tie(TieKind::Intersect),
            TokenKind::Except => Self::Tie(TieKind::Except),
            TokenKind::Update => Self::Update,
            TokenKind::Set => Self::Set,
            TokenKind::Returning => Self::Returning,
            TokenKind::Delete => Self::Delete,
            TokenKind::Insert => Self::Insert,
            TokenKind::Values => Self::Values,
            TokenKind::Lock => Self::Lock,
            TokenKind::With => Self::With,
            TokenKind::Case => Self::Case,
            TokenKind::ParenOpen => Self::Parenthesis,
            TokenKind::Function => Self::Function,
            TokenKind::Type => Self::TypeCast,
            k if k.is_join_marker() => Self::Join,
            _ => return None,
        };
        Some(segment)
    }

    /// Segments that consume their own closing token (`END` or `)`).
    pub fn owns_closing(self) -> bool {
        matches!(
            self,
            Self::Case | Self::Parenthesis | Self::Subquery | Self::Function | Self::TypeCast
        )
    }

    pub fn is_connective(self) -> bool {
        matches!(self, Self::AndClause | Self::OrClause)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::GroupBy => "GROUP BY",
            Self::OrderBy => "ORDER BY",
            Self::Having => "HAVING",
            Self::Limit => "LIMIT",
            Self::Join => "JOIN",
            Self::AndClause => "AND",
            Self::OrClause => "OR",
            Self::Tie(TieKind::Union) => "UNION",
            Self::Tie(TieKind::Intersect) => "INTERSECT",
            Self::Tie(TieKind::Except) => "EXCEPT",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Returning => "RETURNING",
            Self::Delete => "DELETE",
            Self::Insert => "INSERT",
            Self::Values => "VALUES",
            Self::Lock => "LOCK",
            Self::With => "WITH",
            Self::Case => "CASE",
            Self::Parenthesis => "parenthesis",
            Self::Subquery => "subquery",
            Self::Function => "function",
            Self::TypeCast => "type cast",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One child of a segment: a leaf token or a nested segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Token(Token),
    Segment(Segment),
}

impl Element {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            Self::Segment(_) => None,
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Self::Token(_) => None,
            Self::Segment(segment) => Some(segment),
        }
    }

    pub fn is_token(&self, kind: TokenKind) -> bool {
        self.as_token().is_some_and(|t| t.kind == kind)
    }
}

/// A clause or bracketed construct: the token that opened it, everything
/// up to its terminator, and (for bracketed kinds) its closing token.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub elements: Vec<Element>,
    pub indent_level: u32,
}

impl Segment {
    pub fn new(kind: SegmentKind, elements: Vec<Element>, indent_level: u32) -> Self {
        Self {
            kind,
            elements,
            indent_level,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &Segment> {
        self.elements.iter().filter_map(Element::as_segment)
    }
}
