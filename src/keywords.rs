use phf::phf_map;

use crate::token::TokenKind;

/// Reserved words, function names, and type names, keyed by their
/// ASCII-uppercased spelling.
///
/// `Function` entries only become function tokens when a `(` follows;
/// otherwise they are plain identifiers (`SELECT count FROM t`).
/// `AND` is stored as a plain `And`; the lexer decides between a range
/// conjunction and a logical group.
static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    // Clause openers
    "SELECT" => TokenKind::Select,
    "FROM" => TokenKind::From,
    "WHERE" => TokenKind::Where,
    "GROUP" => TokenKind::Group,
    "ORDER" => TokenKind::Order,
    "HAVING" => TokenKind::Having,
    "LIMIT" => TokenKind::Limit,
    "OFFSET" => TokenKind::Offset,
    "FETCH" => TokenKind::Fetch,
    "UNION" => TokenKind::Union,
    "INTERSECT" => TokenKind::Intersect,
    "EXCEPT" => TokenKind::Except,
    "UPDATE" => TokenKind::Update,
    "SET" => TokenKind::Set,
    "RETURNING" => TokenKind::Returning,
    "DELETE" => TokenKind::Delete,
    "INSERT" => TokenKind::Insert,
    "VALUES" => TokenKind::Values,
    "LOCK" => TokenKind::Lock,
    "WITH" => TokenKind::With,
    "CASE" => TokenKind::Case,

    // Clause modifiers
    "BY" => TokenKind::By,
    "INTO" => TokenKind::Into,
    "ALL" => TokenKind::All,
    "DISTINCT" => TokenKind::Distinct,
    "DISTINCTROW" => TokenKind::DistinctRow,
    "AS" => TokenKind::As,
    "ASC" => TokenKind::Asc,
    "DESC" => TokenKind::Desc,
    "RECURSIVE" => TokenKind::Recursive,
    "CONFLICT" => TokenKind::Conflict,
    "DO" => TokenKind::Do,

    "WHEN" => TokenKind::When,
    "THEN" => TokenKind::Then,
    "ELSE" => TokenKind::Else,
    "END" => TokenKind::End,

    "JOIN" => TokenKind::Join,
    "INNER" => TokenKind::Inner,
    "OUTER" => TokenKind::Outer,
    "LEFT" => TokenKind::Left,
    "RIGHT" => TokenKind::Right,
    "FULL" => TokenKind::Full,
    "NATURAL" => TokenKind::Natural,
    "CROSS" => TokenKind::Cross,
    "ON" => TokenKind::On,
    "USING" => TokenKind::Using,

    "AND" => TokenKind::And,
    "OR" => TokenKind::OrGroup,
    "NOT" => TokenKind::Not,
    "BETWEEN" => TokenKind::Between,
    "IN" => TokenKind::In,
    "IS" => TokenKind::Is,
    "LIKE" => TokenKind::Like,
    "ILIKE" => TokenKind::ILike,
    "EXISTS" => TokenKind::Exists,
    "ANY" => TokenKind::Any,
    "SOME" => TokenKind::Any,
    "ARRAY" => TokenKind::Array,
    "NULL" => TokenKind::Null,

    // Functions
    "SUM" => TokenKind::Function,
    "COUNT" => TokenKind::Function,
    "AVG" => TokenKind::Function,
    "MIN" => TokenKind::Function,
    "MAX" => TokenKind::Function,
    "COALESCE" => TokenKind::Function,
    "NULLIF" => TokenKind::Function,
    "GREATEST" => TokenKind::Function,
    "LEAST" => TokenKind::Function,
    "CAST" => TokenKind::Function,
    "CONVERT" => TokenKind::Function,
    "EXTRACT" => TokenKind::Function,
    "DATE_TRUNC" => TokenKind::Function,
    "DATE_PART" => TokenKind::Function,
    "TO_TIMESTAMP" => TokenKind::Function,
    "TO_CHAR" => TokenKind::Function,
    "TO_DATE" => TokenKind::Function,
    "NOW" => TokenKind::Function,
    "CONCAT" => TokenKind::Function,
    "SUBSTRING" => TokenKind::Function,
    "SUBSTR" => TokenKind::Function,
    "TRIM" => TokenKind::Function,
    "LOWER" => TokenKind::Function,
    "UPPER" => TokenKind::Function,
    "LENGTH" => TokenKind::Function,
    "REPLACE" => TokenKind::Function,
    "POSITION" => TokenKind::Function,
    "ROUND" => TokenKind::Function,
    "ABS" => TokenKind::Function,
    "FLOOR" => TokenKind::Function,
    "CEIL" => TokenKind::Function,
    "ROW_NUMBER" => TokenKind::Function,
    "RANK" => TokenKind::Function,
    "DENSE_RANK" => TokenKind::Function,
    "LAG" => TokenKind::Function,
    "LEAD" => TokenKind::Function,
    "FIRST_VALUE" => TokenKind::Function,
    "LAST_VALUE" => TokenKind::Function,
    "ARRAY_AGG" => TokenKind::Function,
    "STRING_AGG" => TokenKind::Function,
    "GROUP_CONCAT" => TokenKind::Function,
    "JSON_AGG" => TokenKind::Function,
    "JSONB_AGG" => TokenKind::Function,
    "JSON_BUILD_OBJECT" => TokenKind::Function,
    "JSONB_BUILD_OBJECT" => TokenKind::Function,
    "UNNEST" => TokenKind::Function,
    "IFNULL" => TokenKind::Function,
    "IF" => TokenKind::Function,
    "GENERATE_SERIES" => TokenKind::Function,
    "FILTER" => TokenKind::Function,
    "OVER" => TokenKind::Function,
    "WITHIN" => TokenKind::Function,

    // Types
    "INT" => TokenKind::Type,
    "INTEGER" => TokenKind::Type,
    "BIGINT" => TokenKind::Type,
    "SMALLINT" => TokenKind::Type,
    "NUMERIC" => TokenKind::Type,
    "DECIMAL" => TokenKind::Type,
    "REAL" => TokenKind::Type,
    "FLOAT" => TokenKind::Type,
    "BOOLEAN" => TokenKind::Type,
    "CHAR" => TokenKind::Type,
    "VARCHAR" => TokenKind::Type,
    "TEXT" => TokenKind::Type,
    "DATE" => TokenKind::Type,
    "TIMESTAMP" => TokenKind::Type,
    "TIMESTAMPTZ" => TokenKind::Type,
    "INTERVAL" => TokenKind::Type,
    "UUID" => TokenKind::Type,
    "JSON" => TokenKind::Type,
    "JSONB" => TokenKind::Type,
    "BYTEA" => TokenKind::Type,
};

/// Comparison operators recognized as whole runs.
pub const COMPARATORS: &[&str] = &["=", "<", ">", "<=", ">=", "<>", "!="];

/// Look up an ASCII-uppercased word.
pub fn lookup(upper: &str) -> Option<TokenKind> {
    KEYWORDS.get(upper).copied()
}

pub fn is_comparator(word: &str) -> bool {
    COMPARATORS.contains(&word)
}
