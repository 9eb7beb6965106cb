//! Token matching over the pattern text.
//!
//! The lexer owns the cursor and the stack of open frames. A frame is pushed by
//! a token that opens a balanced region (it names the closer that must end it)
//! or that opens an escaping span; productions only declare intent and the
//! lexer pairs the frames up positionally.

use std::sync::OnceLock;

use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};

use crate::tree::{Token, TokenKind};

/// The parsing context that decides which characters are special.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Span {
    /// Top level of a pattern, between the `/` delimiters
    Pattern,
    /// Inside a bracket expression
    CharacterClass,
    /// Between a `\` and the end of its escape code
    Escape,
}

impl Span {
    /// Name used when printing token metadata.
    pub fn name(self) -> &'static str {
        match self {
            Span::Pattern => "Pattern",
            Span::CharacterClass => "CharacterClass",
            Span::Escape => "Escape",
        }
    }
}

/// Something which can be matched at the cursor to produce a terminal.
pub(crate) trait Terminal {
    /// Length in bytes of the match starting at `ix`, if there is one.
    fn match_len(&self, text: &str, ix: usize) -> Option<usize>;
}

impl Terminal for char {
    fn match_len(&self, text: &str, ix: usize) -> Option<usize> {
        text[ix..].starts_with(*self).then(|| self.len_utf8())
    }
}

impl Terminal for &str {
    fn match_len(&self, text: &str, ix: usize) -> Option<usize> {
        (!self.is_empty() && text[ix..].starts_with(*self)).then(|| self.len())
    }
}

/// Any one of the listed characters.
impl Terminal for &[char] {
    fn match_len(&self, text: &str, ix: usize) -> Option<usize> {
        text[ix..]
            .chars()
            .next()
            .filter(|c| self.contains(c))
            .map(char::len_utf8)
    }
}

/// A regex matched anchored at the cursor, taking the longest leftmost-first match.
#[derive(Debug)]
pub(crate) struct TokenRegex(Regex);

impl TokenRegex {
    fn new(pattern: &str) -> TokenRegex {
        TokenRegex(Regex::new(pattern).expect("token patterns are valid regexes"))
    }
}

impl Terminal for &TokenRegex {
    fn match_len(&self, text: &str, ix: usize) -> Option<usize> {
        let input = Input::new(text).range(ix..).anchored(Anchored::Yes);
        self.0
            .find(input)
            .map(|m| m.end() - ix)
            .filter(|&len| len > 0)
    }
}

/// Token regexes shared by every parser.
#[derive(Debug)]
pub(crate) struct TokenRegexes {
    pub(crate) flags: TokenRegex,
    pub(crate) digit: TokenRegex,
    pub(crate) hex: TokenRegex,
    pub(crate) hex2: TokenRegex,
    pub(crate) hex4: TokenRegex,
    pub(crate) plain: TokenRegex,
}

pub(crate) fn token_regexes() -> &'static TokenRegexes {
    static TOKENS: OnceLock<TokenRegexes> = OnceLock::new();
    TOKENS.get_or_init(|| TokenRegexes {
        flags: TokenRegex::new(r"[gimsuy]+"),
        digit: TokenRegex::new(r"[0-9]"),
        hex: TokenRegex::new(r"[0-9A-Fa-f]+"),
        hex2: TokenRegex::new(r"[0-9A-Fa-f]{2}"),
        hex4: TokenRegex::new(r"[0-9A-Fa-f]{4}"),
        plain: TokenRegex::new(r"[^\r\n\t]"),
    })
}

#[derive(Debug)]
struct Frame {
    closer: Option<char>,
    span: Option<Span>,
}

#[derive(Debug)]
pub(crate) struct Lexer<'a> {
    text: &'a str,
    ix: usize,
    frames: Vec<Frame>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(text: &'a str) -> Lexer<'a> {
        Lexer {
            text,
            ix: 0,
            frames: Vec::new(),
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.ix
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.ix == self.text.len()
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.ix..]
    }

    pub(crate) fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Whether `terminal` matches at the cursor, without consuming it.
    pub(crate) fn peek<T: Terminal>(&self, terminal: T) -> bool {
        terminal.match_len(self.text, self.ix).is_some()
    }

    /// The text `terminal` would consume at the cursor.
    pub(crate) fn matched<T: Terminal>(&self, terminal: T) -> Option<&'a str> {
        let len = terminal.match_len(self.text, self.ix)?;
        Some(&self.text[self.ix..self.ix + len])
    }

    /// Consumes `terminal` if it matches at the cursor.
    pub(crate) fn eat<T: Terminal>(&mut self, kind: TokenKind, terminal: T) -> Option<Token> {
        let len = terminal.match_len(self.text, self.ix)?;
        let start = self.ix;
        self.ix += len;
        Some(Token::new(kind, &self.text[start..self.ix], start..self.ix))
    }

    /// Consumes a token opening a balanced region which `closer` must end.
    /// A `span` switches the active span until the region is closed.
    pub(crate) fn eat_open<T: Terminal>(
        &mut self,
        kind: TokenKind,
        terminal: T,
        closer: char,
        span: Option<Span>,
    ) -> Option<Token> {
        let mut token = self.eat(kind, terminal)?;
        token.balanced = Some(closer);
        token.balanced_span = span;
        self.frames.push(Frame {
            closer: Some(closer),
            span,
        });
        Some(token)
    }

    /// Consumes `closer` if it balances the innermost open region.
    pub(crate) fn eat_close(&mut self, kind: TokenKind, closer: char) -> Option<Token> {
        match self.frames.last() {
            Some(frame) if frame.closer == Some(closer) => {}
            _ => return None,
        }
        let mut token = self.eat(kind, closer)?;
        token.balancer = true;
        self.frames.pop();
        Some(token)
    }

    /// Consumes a token which opens `span` without any closer.
    pub(crate) fn eat_open_span<T: Terminal>(
        &mut self,
        kind: TokenKind,
        terminal: T,
        span: Span,
    ) -> Option<Token> {
        let mut token = self.eat(kind, terminal)?;
        token.open_span = Some(span);
        self.frames.push(Frame {
            closer: None,
            span: Some(span),
        });
        Some(token)
    }

    /// Consumes a token which ends the innermost `span`.
    pub(crate) fn eat_close_span<T: Terminal>(
        &mut self,
        kind: TokenKind,
        terminal: T,
        span: Span,
    ) -> Option<Token> {
        let mut token = self.eat(kind, terminal)?;
        token.close_span = Some(span);
        self.close_span(span);
        Some(token)
    }

    /// Ends the innermost `span` without consuming input.
    pub(crate) fn close_span(&mut self, span: Span) {
        if let Some(frame) = self.frames.last() {
            if frame.closer.is_none() && frame.span == Some(span) {
                self.frames.pop();
            }
        }
    }

    /// The innermost span declared by an open region; the pattern span when
    /// none is open.
    pub(crate) fn span(&self) -> Span {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.span)
            .unwrap_or(Span::Pattern)
    }

    /// Whether `c` closes some region that is still open.
    pub(crate) fn is_pending_closer(&self, c: char) -> bool {
        self.frames.iter().any(|frame| frame.closer == Some(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eat_advances_only_on_match() {
        let mut lexer = Lexer::new("(?:a");
        assert!(lexer.eat(TokenKind::Punctuator, '(').is_some());
        assert_eq!(lexer.position(), 1);
        assert!(lexer.eat(TokenKind::Punctuator, "?;").is_none());
        assert_eq!(lexer.position(), 1);
        let token = lexer.eat(TokenKind::Punctuator, "?:").unwrap();
        assert_eq!(token.text, "?:");
        assert_eq!(token.span, 1..3);
        assert_eq!(lexer.rest(), "a");
    }

    #[test]
    fn peek_does_not_consume() {
        let lexer = Lexer::new("*a");
        let sigils: &[char] = &['*', '+', '?'];
        assert!(lexer.peek(sigils));
        assert!(!lexer.peek('a'));
        assert_eq!(lexer.position(), 0);
    }

    #[test]
    fn matched_does_not_consume() {
        let lexer = Lexer::new("12a");
        assert_eq!(lexer.matched(&token_regexes().digit), Some("1"));
        assert_eq!(lexer.matched('a'), None);
        assert_eq!(lexer.position(), 0);
    }

    #[test]
    fn regex_terminals_are_anchored_and_maximal() {
        let tokens = token_regexes();
        let mut lexer = Lexer::new("x gim");
        assert!(!lexer.peek(&tokens.flags));
        lexer.eat(TokenKind::Literal, "x ").unwrap();
        let flags = lexer.eat(TokenKind::Keyword, &tokens.flags).unwrap();
        assert_eq!(flags.text, "gim");
        assert!(lexer.is_at_end());
    }

    #[test]
    fn plain_matches_a_whole_codepoint() {
        let tokens = token_regexes();
        let mut lexer = Lexer::new("\u{e5}\n");
        let token = lexer.eat(TokenKind::Literal, &tokens.plain).unwrap();
        assert_eq!(token.text, "\u{e5}");
        assert!(lexer.eat(TokenKind::Literal, &tokens.plain).is_none());
    }

    #[test]
    fn balanced_regions_nest() {
        let mut lexer = Lexer::new("/[)]/");
        let open = lexer
            .eat_open(TokenKind::Punctuator, '/', '/', Some(Span::Pattern))
            .unwrap();
        assert_eq!(open.balanced, Some('/'));
        assert_eq!(lexer.span(), Span::Pattern);
        lexer
            .eat_open(TokenKind::Punctuator, '[', ']', Some(Span::CharacterClass))
            .unwrap();
        assert_eq!(lexer.span(), Span::CharacterClass);
        assert!(lexer.is_pending_closer('/'));
        assert!(!lexer.is_pending_closer(')'));
        lexer.eat(TokenKind::Literal, ')').unwrap();
        // `/` does not close the class
        assert!(lexer.eat_close(TokenKind::Punctuator, '/').is_none());
        let close = lexer.eat_close(TokenKind::Punctuator, ']').unwrap();
        assert!(close.balancer);
        assert_eq!(lexer.span(), Span::Pattern);
        assert!(!lexer.is_pending_closer(']'));
    }

    #[test]
    fn escape_span_is_closed_by_code() {
        let mut lexer = Lexer::new("\\n");
        assert_eq!(lexer.span(), Span::Pattern);
        let escape = lexer
            .eat_open_span(TokenKind::Punctuator, '\\', Span::Escape)
            .unwrap();
        assert_eq!(escape.open_span, Some(Span::Escape));
        assert_eq!(lexer.span(), Span::Escape);
        let code = lexer
            .eat_close_span(TokenKind::Keyword, 'n', Span::Escape)
            .unwrap();
        assert_eq!(code.close_span, Some(Span::Escape));
        assert_eq!(lexer.span(), Span::Pattern);
    }
}
