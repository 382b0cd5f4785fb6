use compact_str::CompactString;

/// All token kinds recognized by the lexer.
///
/// Keywords are grouped by the role they play in clause retrieval: clause
/// openers, join markers, logical connectives, and the catch-all `Function`
/// and `Type` kinds whose members live in the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural punctuation
    ParenOpen,
    ParenClose,
    BracketClose,
    BraceClose,
    Comma,
    Colon,
    DoubleColon,

    // Literals and opaque runs
    QuotedString,
    Identifier,
    Comparator,
    Surrounding,
    Eof,

    // Clause openers
    Select,
    From,
    Where,
    Group,
    Order,
    Having,
    Limit,
    Offset,
    Fetch,
    Union,
    Intersect,
    Except,
    Update,
    Set,
    Returning,
    Delete,
    Insert,
    Values,
    Lock,
    With,
    Case,

    // Clause modifiers
    By,
    Into,
    All,
    Distinct,
    DistinctRow,
    As,
    Asc,
    Desc,
    Recursive,
    Conflict,
    Do,

    // CASE body
    When,
    Then,
    Else,
    End,

    // Join markers
    Join,
    Inner,
    Outer,
    Left,
    Right,
    Full,
    Natural,
    Cross,
    On,
    Using,

    // Logical connectives and predicates
    And,
    AndGroup,
    OrGroup,
    Not,
    Between,
    In,
    Is,
    Like,
    ILike,
    Exists,
    Any,
    Array,
    Null,

    // Table-driven classes
    Function,
    Type,
}

impl TokenKind {
    pub fn is_join_marker(self) -> bool {
        matches!(
            self,
            Self::Join
                | Self::Inner
                | Self::Outer
                | Self::Left
                | Self::Right
                | Self::Full
                | Self::Natural
                | Self::Cross
        )
    }

    /// Tokens whose appearance mid-scan opens a nested segment.
    /// Join markers are handled separately since they depend on position.
    pub fn is_group_maker(self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::Case
                | Self::From
                | Self::Where
                | Self::Order
                | Self::Group
                | Self::Limit
                | Self::Offset
                | Self::Fetch
                | Self::AndGroup
                | Self::OrGroup
                | Self::Having
                | Self::Union
                | Self::Except
                | Self::Intersect
                | Self::Function
                | Self::ParenOpen
                | Self::Type
                | Self::With
        )
    }

    /// Keywords that get a line of their own under the default write policy.
    pub fn breaks_line(self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::Update
                | Self::Insert
                | Self::Delete
                | Self::From
                | Self::Group
                | Self::Order
                | Self::Having
                | Self::Limit
                | Self::Offset
                | Self::Fetch
                | Self::Returning
                | Self::Set
                | Self::Union
                | Self::Intersect
                | Self::Except
                | Self::Values
                | Self::Where
                | Self::On
                | Self::Using
                | Self::AndGroup
                | Self::OrGroup
        )
    }

    /// Boundaries used when splitting a projection list into column expressions.
    pub fn is_select_keyword(self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::Exists
                | Self::Distinct
                | Self::DistinctRow
                | Self::Into
                | Self::As
                | Self::Group
                | Self::Order
                | Self::By
                | Self::On
                | Self::Returning
                | Self::Set
                | Self::Update
                | Self::Any
        )
    }

    /// Keywords that belong to the SELECT line itself rather than to a column.
    pub fn is_select_modifier(self) -> bool {
        matches!(self, Self::Distinct | Self::DistinctRow | Self::All)
    }

    /// After one of these, an opening bracket stays on the current line.
    pub fn continues_line(self) -> bool {
        self.is_join_marker()
            || matches!(
                self,
                Self::Comparator
                    | Self::From
                    | Self::Where
                    | Self::Exists
                    | Self::As
                    | Self::In
                    | Self::On
                    | Self::Any
                    | Self::Array
                    | Self::Then
                    | Self::Else
                    | Self::ParenOpen
            )
    }

    /// Tokens that count toward a clause's per-line threshold.
    pub fn is_operand(self) -> bool {
        matches!(
            self,
            Self::Identifier | Self::QuotedString | Self::Surrounding
        )
    }

    /// Tokens that never have whitespace before them.
    pub fn is_never_preceded_by_space(self) -> bool {
        matches!(
            self,
            Self::Comma | Self::ParenClose | Self::BracketClose | Self::BraceClose | Self::DoubleColon
        )
    }

    /// Tokens that never have whitespace after them.
    pub fn is_never_followed_by_space(self) -> bool {
        matches!(self, Self::ParenOpen | Self::DoubleColon | Self::Colon)
    }

    /// Tokens an opaque `[...]` region attaches to as a subscript.
    pub fn takes_subscript(self) -> bool {
        matches!(
            self,
            Self::Identifier | Self::Array | Self::ParenClose | Self::Surrounding
        )
    }

    /// Kinds that open a segment with an implicit closing token.
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Type)
    }
}

/// An immutable token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: CompactString,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: CompactString::from(text),
        }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    /// FOR in `FOR UPDATE`, or KEY in `FOR NO KEY UPDATE`: an UPDATE right
    /// after it belongs to a row-locking clause, not a new statement.
    pub fn precedes_row_lock(&self) -> bool {
        self.kind == TokenKind::Identifier
            && (self.text.eq_ignore_ascii_case("FOR") || self.text.eq_ignore_ascii_case("KEY"))
    }
}
