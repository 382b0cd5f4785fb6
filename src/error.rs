use thiserror::Error;

use crate::segment::SegmentKind;

/// Errors raised while splitting SQL text into tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {position}")]
    UnterminatedString { position: usize },

    #[error("unterminated quoted identifier starting at byte {position}")]
    UnterminatedQuotedIdentifier { position: usize },

    #[error("unexpected punctuation {character:?} at byte {position}")]
    UnexpectedPunctuation { character: char, position: usize },

    #[error("unbalanced bracket region starting at byte {position}")]
    UnbalancedSurrounding { position: usize },

    #[error("comments are not supported (byte {position})")]
    UnsupportedComment { position: usize },
}

/// Errors raised while grouping tokens into clause segments.
/// Positions are token indices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("statement cannot start with {text:?} (token {position})")]
    InvalidStart { text: String, position: usize },

    #[error("{kind} segment opened at token {position} has no terminator")]
    NoTerminator { kind: SegmentKind, position: usize },

    #[error("token stream must end with exactly one EOF token")]
    MalformedStream,
}

/// Errors raised while writing segments back out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unexpected element in {kind} segment: {detail}")]
    UnexpectedElement { kind: SegmentKind, detail: String },
}

/// Failure of the whole reindent pipeline for one SQL string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("formatted output is not equivalent to the input; input left unchanged")]
    RoundtripMismatch { original: String },
}

impl FormatError {
    /// The untouched input, when the failure happened after rendering.
    pub fn original(&self) -> Option<&str> {
        match self {
            Self::RoundtripMismatch { original } => Some(original),
            _ => None,
        }
    }
}

/// User-facing errors.
#[derive(Error, Debug)]
pub enum SqlreindentError {
    #[error("sqlreindent config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type Result<T> = std::result::Result<T, SqlreindentError>;
