use memchr::memchr;

use crate::error::LexError;
use crate::keywords;
use crate::token::{Token, TokenKind};

/// Characters that end a run and are emitted on their own (or open an
/// opaque bracket region).
const PUNCTUATION: &[u8] = b"()[]{},:";

/// Prefixes that attach to an immediately following string literal
/// (`E'..'`, `N'..'`, `B'..'`, `X'..'`, `U&'..'`).
const STRING_PREFIXES: &[&str] = &["E", "N", "B", "X", "U&"];

/// Split SQL text into tokens. The result always ends with a single EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    /// Set after BETWEEN until the matching AND is seen.
    in_range: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            in_range: false,
        }
    }

    fn run(&mut self) -> Result<(), LexError> {
        while self.pos < self.bytes.len() {
            let Some(c) = self.source[self.pos..].chars().next() else {
                break;
            };
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }
            match c {
                '\'' => self.lex_string()?,
                '[' | '{' => self.lex_surrounding()?,
                c if c.is_ascii() && PUNCTUATION.contains(&(c as u8)) => self.lex_punctuation(c)?,
                _ => self.lex_run()?,
            }
        }
        self.tokens.push(Token::eof());
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token::new(kind, &self.source[start..end]));
        self.pos = end;
    }

    fn lex_string(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let len = scan_string(&self.bytes[start..])
            .ok_or(LexError::UnterminatedString { position: start })?;
        self.push(TokenKind::QuotedString, start, start + len);
        Ok(())
    }

    fn lex_surrounding(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let len = scan_surrounding(&self.bytes[start..]).map_err(|err| match err {
            // A string inside the region that never closes is reported at its own offset.
            LexError::UnterminatedString { position } => LexError::UnterminatedString {
                position: start + position,
            },
            _ => LexError::UnbalancedSurrounding { position: start },
        })?;
        self.push(TokenKind::Surrounding, start, start + len);
        Ok(())
    }

    fn lex_punctuation(&mut self, c: char) -> Result<(), LexError> {
        let start = self.pos;
        let kind = match c {
            '(' => TokenKind::ParenOpen,
            ')' => TokenKind::ParenClose,
            ']' => TokenKind::BracketClose,
            '}' => TokenKind::BraceClose,
            ',' => TokenKind::Comma,
            ':' if self.bytes.get(start + 1) == Some(&b':') => {
                self.push(TokenKind::DoubleColon, start, start + 2);
                return Ok(());
            }
            ':' => TokenKind::Colon,
            other => {
                return Err(LexError::UnexpectedPunctuation {
                    character: other,
                    position: start,
                })
            }
        };
        self.push(kind, start, start + 1);
        Ok(())
    }

    /// A maximal run of non-whitespace, non-delimiter characters.
    fn lex_run(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let end = self.scan_run(start)?;
        let word = &self.source[start..end];

        if self.bytes.get(end) == Some(&b'\'')
            && STRING_PREFIXES.iter().any(|p| word.eq_ignore_ascii_case(p))
        {
            let len = scan_string(&self.bytes[end..])
                .ok_or(LexError::UnterminatedString { position: end })?;
            self.push(TokenKind::QuotedString, start, end + len);
            return Ok(());
        }

        let (kind, keep_text) = self.classify(word, end);
        if keep_text {
            self.push(kind, start, end);
        } else {
            self.tokens.push(Token::new(kind, &word.to_ascii_uppercase()));
            self.pos = end;
        }
        Ok(())
    }

    fn scan_run(&self, start: usize) -> Result<usize, LexError> {
        let mut end = start;
        while end < self.bytes.len() {
            let Some(c) = self.source[end..].chars().next() else {
                break;
            };
            if c.is_whitespace() || c == '\'' || (c.is_ascii() && PUNCTUATION.contains(&(c as u8))) {
                break;
            }
            match (c, self.bytes.get(end + 1)) {
                ('-', Some(&b'-')) | ('/', Some(&b'*')) => {
                    return Err(LexError::UnsupportedComment { position: end });
                }
                ('"' | '`', _) => {
                    let close = memchr(c as u8, &self.bytes[end + 1..])
                        .ok_or(LexError::UnterminatedQuotedIdentifier { position: end })?;
                    end += close + 2;
                }
                _ => end += c.len_utf8(),
            }
        }
        Ok(end)
    }

    /// Decide the token kind for a run and whether its original text is kept.
    fn classify(&mut self, word: &str, end: usize) -> (TokenKind, bool) {
        if keywords::is_comparator(word) {
            return (TokenKind::Comparator, true);
        }

        // Qualified names resolve on their last component, and only as
        // functions or types: `t.order` stays a column reference.
        let (lookup_part, qualified) = match word.rfind('.') {
            Some(dot) => (&word[dot + 1..], true),
            None => (word, false),
        };
        if lookup_part.contains(['"', '`']) {
            return (TokenKind::Identifier, true);
        }

        let upper = lookup_part.to_ascii_uppercase();
        let has_paren = has_trailing_paren(&self.bytes[end..]);
        let kind = match keywords::lookup(&upper) {
            None => return (TokenKind::Identifier, true),
            Some(TokenKind::Function) if has_paren => TokenKind::Function,
            Some(TokenKind::Function) => return (TokenKind::Identifier, true),
            Some(TokenKind::Left | TokenKind::Right) if has_paren => TokenKind::Function,
            Some(TokenKind::Type) => TokenKind::Type,
            Some(_) if qualified => return (TokenKind::Identifier, true),
            Some(TokenKind::Between) => {
                self.in_range = true;
                TokenKind::Between
            }
            Some(TokenKind::And) if self.in_range => {
                self.in_range = false;
                TokenKind::And
            }
            Some(TokenKind::And) => TokenKind::AndGroup,
            Some(kind) => kind,
        };
        (kind, qualified)
    }
}

/// Scan a single-quoted string literal. `''` inside the literal is an
/// escaped quote. Returns the byte length including delimiters.
fn scan_string(bytes: &[u8]) -> Option<usize> {
    let mut i = 1;
    loop {
        let pos = i + memchr(b'\'', &bytes[i..])?;
        if bytes.get(pos + 1) == Some(&b'\'') {
            i = pos + 2;
            continue;
        }
        return Some(pos + 1);
    }
}

/// Scan an opaque region opened by `[` or `{` up to its balancing closer.
/// Nested brackets of any shape count toward the balance and quoted
/// strings are skipped whole.
fn scan_surrounding(bytes: &[u8]) -> Result<usize, LexError> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'{' | b'(' => depth += 1,
            b']' | b'}' | b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            b'\'' => {
                let len = scan_string(&bytes[i..])
                    .ok_or(LexError::UnterminatedString { position: i })?;
                i += len;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    Err(LexError::UnbalancedSurrounding { position: 0 })
}

/// Check if there's a `(` after optional whitespace.
#[inline]
fn has_trailing_paren(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i < bytes.len() && bytes[i] == b'('
}
