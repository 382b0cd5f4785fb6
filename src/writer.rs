use crate::mode::FormatOptions;
use crate::token::{Token, TokenKind};

/// Append-only output buffer with line and spacing bookkeeping.
///
/// Line breaks are deferred: [`Writer::newline`] only records the indent of
/// the next line, so breaking twice in a row never leaves an empty line and
/// output never carries trailing whitespace.
pub struct Writer<'o> {
    options: &'o FormatOptions,
    out: String,
    last: Option<TokenKind>,
    /// Indent of a line that has been requested but not yet started.
    pending: Option<u32>,
    /// Kind of the first token on the current line.
    line_head: Option<TokenKind>,
    lines: usize,
}

impl<'o> Writer<'o> {
    pub fn new(options: &'o FormatOptions) -> Self {
        Self {
            options,
            out: String::new(),
            last: None,
            pending: Some(0),
            line_head: None,
            lines: 0,
        }
    }

    /// Start a new line at `indent` levels.
    pub fn newline(&mut self, indent: u32) {
        self.pending = Some(indent);
    }

    /// Write a token, separated from the previous one unless spacing rules
    /// glue them.
    pub fn token(&mut self, token: &Token) {
        let spaced = self.pending.is_none() && self.needs_space(token);
        let fresh = self.start_line();
        if spaced {
            self.out.push_str(&self.options.whitespace);
        }
        self.push(token, fresh);
    }

    /// Write a token directly after the previous one.
    pub fn glued(&mut self, token: &Token) {
        let fresh = self.start_line();
        self.push(token, fresh);
    }

    pub fn last(&self) -> Option<TokenKind> {
        self.last
    }

    pub fn line_head(&self) -> Option<TokenKind> {
        self.line_head
    }

    /// Number of line breaks written so far.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn push(&mut self, token: &Token, fresh: bool) {
        self.out.push_str(&token.text);
        self.last = Some(token.kind);
        if fresh {
            self.line_head = Some(token.kind);
        }
    }

    /// Emit a requested line break and indentation. Returns whether a new
    /// line was started.
    fn start_line(&mut self) -> bool {
        let Some(indent) = self.pending.take() else {
            return false;
        };
        if self.last.is_some() {
            self.out.push_str(&self.options.newline);
            self.lines += 1;
        }
        self.out.push_str(&self.options.padding);
        for _ in 0..indent {
            self.out.push_str(&self.options.indent);
        }
        true
    }

    fn needs_space(&self, token: &Token) -> bool {
        let Some(last) = self.last else {
            return false;
        };
        if token.kind.is_never_preceded_by_space() || last.is_never_followed_by_space() {
            return false;
        }
        let subscript = token.kind == TokenKind::Surrounding
            && token.text.starts_with('[')
            && last.takes_subscript();
        !subscript
    }
}
