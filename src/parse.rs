// Copyright 2016 The Fancy Regex Authors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! A regex pattern parser yielding a concrete syntax tree.

use bit_set::BitSet;

use crate::escape::{self, CODE_TYPES, MAX_BRACED_HEX_DIGITS};
use crate::flags::{flag_index, FLAGS};
use crate::lexer::{token_regexes, Lexer, Span, Terminal, TokenRegex};
use crate::tree::{Attribute, Node, NodeBuilder, NodeType, Token, TokenKind};
use crate::{Error, ParseError, Result, MAX_RECURSION};

const QUANTIFIER_SIGILS: &[char] = &['*', '+', '?'];
const QUANTIFIER_STARTS: &[char] = &['*', '+', '?', '{'];
const ASSERTION_SIGILS: &[char] = &['^', '$'];
const WORD_BOUNDARY_LETTERS: &[char] = &['b', 'B'];
const GAP_LETTERS: &[char] = &['g'];
const SET_LETTERS: &[char] = &['d', 'D', 's', 'S', 'w', 'W'];
const DIGIT_LETTERS: &[char] = &['d', 'D'];
const SPACE_LETTERS: &[char] = &['s', 'S'];
const WORD_LETTERS: &[char] = &['w', 'W'];

#[derive(Debug)]
pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    depth: usize, // group nesting
}

impl<'a> Parser<'a> {
    pub(crate) fn parse(re: &str) -> Result<Node> {
        let mut p = Parser::new(re);
        let pattern = p.parse_pattern()?;
        p.check_for_end()?;
        Ok(pattern)
    }

    pub(crate) fn parse_flags_only(flags: &str) -> Result<Node> {
        let mut p = Parser::new(flags);
        let node = p.parse_flags()?;
        p.check_for_end()?;
        Ok(node)
    }

    fn new(re: &str) -> Parser<'_> {
        Parser {
            lexer: Lexer::new(re),
            depth: 0,
        }
    }

    fn error(&self, kind: ParseError) -> Error {
        Error::ParseError(self.lexer.position(), kind)
    }

    fn check_for_end(&self) -> Result<()> {
        if !self.lexer.is_at_end() {
            return Err(self.error(ParseError::GeneralParseError(
                "end of pattern not reached".to_string(),
            )));
        }
        Ok(())
    }

    /// Consumes a terminal the caller has already dispatched on.
    fn expect<T: Terminal>(&mut self, kind: TokenKind, terminal: T, what: &str) -> Result<Token> {
        match self.lexer.eat(kind, terminal) {
            Some(token) => Ok(token),
            None => Err(self.error(ParseError::GeneralParseError(format!(
                "expected {}",
                what
            )))),
        }
    }

    fn expect_close(&mut self, closer: char) -> Result<Token> {
        match self.lexer.eat_close(TokenKind::Punctuator, closer) {
            Some(token) => Ok(token),
            None => Err(self.error(ParseError::UnbalancedDelimiter(closer))),
        }
    }

    /// Whether the cursor is at `\` followed by one of `letters`.
    fn at_escape(&self, letters: &[char]) -> bool {
        let mut chars = self.lexer.rest().chars();
        chars.next() == Some('\\') && chars.next().map_or(false, |c| letters.contains(&c))
    }

    fn parse_pattern(&mut self) -> Result<Node> {
        let mut node = NodeBuilder::new(NodeType::Pattern, self.lexer.position());
        let Some(open) = self
            .lexer
            .eat_open(TokenKind::Punctuator, '/', '/', Some(Span::Pattern))
        else {
            return Err(self.error(ParseError::GeneralParseError(
                "expected '/'".to_string(),
            )));
        };
        node.token("openToken", open);
        self.parse_alternatives(&mut node)?;
        let close = self.expect_close('/')?;
        node.token("closeToken", close);
        let flags = self.parse_flags()?;
        node.node("flags", flags);
        Ok(node.finish(self.lexer.position()))
    }

    fn parse_flags(&mut self) -> Result<Node> {
        let start = self.lexer.position();
        let mut node = NodeBuilder::new(NodeType::Flags, start);
        let flags = self.lexer.matched(&token_regexes().flags).unwrap_or("");
        let mut seen = BitSet::with_capacity(FLAGS.len());
        for (offset, c) in flags.char_indices() {
            if let Some(ix) = flag_index(c) {
                if !seen.insert(ix) {
                    return Err(Error::ParseError(
                        start + offset,
                        ParseError::DuplicateFlag(c),
                    ));
                }
            }
        }
        for (ix, &(name, _)) in FLAGS.iter().enumerate() {
            node.bind(name, Attribute::Bool(seen.contains(ix)));
        }
        for c in flags.chars() {
            let token = self.expect(TokenKind::Keyword, c, "flag")?;
            node.token("tokens", token);
        }
        Ok(node.finish(self.lexer.position()))
    }

    /// Alternatives separated by `|`, recorded on the enclosing pattern or group.
    fn parse_alternatives(&mut self, node: &mut NodeBuilder) -> Result<()> {
        loop {
            let alternative = self.parse_alternative()?;
            node.node("alternatives", alternative);
            match self.lexer.eat(TokenKind::Punctuator, '|') {
                Some(separator) => node.token("separatorTokens", separator),
                None => return Ok(()),
            }
        }
    }

    fn parse_alternative(&mut self) -> Result<Node> {
        let mut node = NodeBuilder::new(NodeType::Alternative, self.lexer.position());
        while !self.at_alternative_end() {
            let element = self.parse_element()?;
            node.node("elements", element);
        }
        Ok(node.finish(self.lexer.position()))
    }

    fn at_alternative_end(&self) -> bool {
        match self.lexer.peek_char() {
            None | Some('|') | Some(')') => true,
            Some(c) => self.lexer.is_pending_closer(c),
        }
    }

    fn parse_element(&mut self) -> Result<Node> {
        if self.lexer.peek(QUANTIFIER_SIGILS) {
            return Err(self.error(ParseError::MalformedQuantifier));
        }
        let element = self.parse_atom()?;
        if !self.lexer.peek(QUANTIFIER_STARTS) {
            return Ok(element);
        }
        let quantifier = self.parse_quantifier(element)?;
        // a sigil here is caught as the start of the next element
        if self.at_repeat() {
            return Err(self.error(ParseError::MalformedQuantifier));
        }
        Ok(quantifier)
    }

    /// Whether the cursor is at `{` opening a repeat body, i.e. before a digit.
    fn at_repeat(&self) -> bool {
        let mut chars = self.lexer.rest().chars();
        chars.next() == Some('{') && chars.next().map_or(false, |c| c.is_ascii_digit())
    }

    fn parse_atom(&mut self) -> Result<Node> {
        if self.lexer.peek('[') {
            self.parse_class()
        } else if self.lexer.peek("(?:") {
            self.parse_group(NodeType::Group, "(?:")
        } else if self.lexer.peek('(') {
            self.parse_group(NodeType::CapturingGroup, "(")
        } else if self.lexer.peek('^')
            || self.lexer.peek('$')
            || self.at_escape(WORD_BOUNDARY_LETTERS)
        {
            self.parse_assertion()
        } else if self.at_escape(GAP_LETTERS) {
            self.parse_escaped_keyword(NodeType::Gap, GAP_LETTERS)
        } else if self.lexer.peek('.') || self.at_escape(SET_LETTERS) {
            self.parse_character_set()
        } else {
            self.parse_character()
        }
    }

    // The element was parsed before the quantifier was seen; it becomes the
    // quantifier's first child.
    fn parse_quantifier(&mut self, element: Node) -> Result<Node> {
        let mut node = NodeBuilder::new(NodeType::Quantifier, element.span().start);
        node.node("element", element);
        let (min, max) = match self.lexer.eat(TokenKind::Keyword, QUANTIFIER_SIGILS) {
            Some(sigil) => {
                let bounds = match sigil.text.as_str() {
                    "*" => (0, None),
                    "+" => (1, None),
                    _ => (0, Some(1)),
                };
                node.token("sigilToken", sigil);
                bounds
            }
            None => self.parse_repeat(&mut node)?,
        };
        node.bind("min", bound(min));
        node.bind("max", max.map_or(Attribute::Absent, bound));
        Ok(node.finish(self.lexer.position()))
    }

    // `{min}`, `{min,}` or `{min,max}`; returns (min, max), max None when unbounded
    fn parse_repeat(&mut self, node: &mut NodeBuilder) -> Result<(usize, Option<usize>)> {
        let Some(open) = self
            .lexer
            .eat_open(TokenKind::Punctuator, '{', '}', None)
        else {
            return Err(self.error(ParseError::MalformedQuantifier));
        };
        node.token("openToken", open);
        let Some((min_node, min)) = self.parse_unsigned_integer()? else {
            return Err(self.error(ParseError::MalformedQuantifier));
        };
        node.node("min", min_node);
        let max = match self.lexer.eat(TokenKind::Punctuator, ',') {
            Some(separator) => {
                node.token("separator", separator);
                match self.parse_unsigned_integer()? {
                    Some((max_node, max)) => {
                        node.node("max", max_node);
                        Some(max)
                    }
                    None => {
                        node.null("max");
                        None
                    }
                }
            }
            None => {
                node.null("separator");
                node.null("max");
                Some(min)
            }
        };
        if max.map_or(false, |max| max < min) {
            return Err(self.error(ParseError::MalformedQuantifier));
        }
        match self.lexer.eat_close(TokenKind::Punctuator, '}') {
            Some(close) => node.token("closeToken", close),
            None => return Err(self.error(ParseError::MalformedQuantifier)),
        }
        Ok((min, max))
    }

    fn parse_unsigned_integer(&mut self) -> Result<Option<(Node, usize)>> {
        let start = self.lexer.position();
        let mut node = NodeBuilder::new(NodeType::UnsignedInteger, start);
        let mut empty = true;
        while let Some(digit) = self.parse_digit() {
            node.node("digits", digit);
            empty = false;
        }
        if empty {
            return Ok(None);
        }
        let node = node.finish(self.lexer.position());
        match escape::decode_decimal(&node.source_text()) {
            Some(value) => Ok(Some((node, value))),
            None => Err(Error::ParseError(start, ParseError::MalformedQuantifier)),
        }
    }

    fn parse_digit(&mut self) -> Option<Node> {
        let start = self.lexer.position();
        let value = self.lexer.eat(TokenKind::Literal, &token_regexes().digit)?;
        let mut node = NodeBuilder::new(NodeType::Digit, start);
        node.token("value", value);
        Some(node.finish(self.lexer.position()))
    }

    fn parse_group(&mut self, ty: NodeType, opener: &str) -> Result<Node> {
        if self.depth >= MAX_RECURSION {
            return Err(self.error(ParseError::RecursionExceeded));
        }
        let mut node = NodeBuilder::new(ty, self.lexer.position());
        let Some(open) = self
            .lexer
            .eat_open(TokenKind::Punctuator, opener, ')', None)
        else {
            return Err(self.error(ParseError::GeneralParseError(format!(
                "expected '{}'",
                opener
            ))));
        };
        node.token("openToken", open);
        self.depth += 1;
        self.parse_alternatives(&mut node)?;
        self.depth -= 1;
        let close = self.expect_close(')')?;
        node.token("closeToken", close);
        Ok(node.finish(self.lexer.position()))
    }

    fn parse_assertion(&mut self) -> Result<Node> {
        let ty = if self.lexer.peek('^') {
            NodeType::StartOfInputAssertion
        } else if self.lexer.peek('$') {
            NodeType::EndOfInputAssertion
        } else {
            return self
                .parse_escaped_keyword(NodeType::WordBoundaryAssertion, WORD_BOUNDARY_LETTERS);
        };
        let mut node = NodeBuilder::new(ty, self.lexer.position());
        let sigil = self.expect(TokenKind::Keyword, ASSERTION_SIGILS, "'^' or '$'")?;
        node.token("sigilToken", sigil);
        Ok(node.finish(self.lexer.position()))
    }

    /// `\` followed by a letter naming the node, e.g. `\B` or `\g`. Where the
    /// node type has a `negate` attribute it is set by an uppercase letter.
    fn parse_escaped_keyword(&mut self, ty: NodeType, letters: &[char]) -> Result<Node> {
        let mut node = NodeBuilder::new(ty, self.lexer.position());
        let escape = self.expect(TokenKind::Punctuator, '\\', "'\\'")?;
        node.token("escapeToken", escape);
        let value = self.expect(TokenKind::Keyword, letters, "escape letter")?;
        if ty.attribute_names().contains(&"negate") {
            let negate = value.text.chars().all(|c| c.is_ascii_uppercase());
            node.bind("negate", Attribute::Bool(negate));
        }
        node.token("value", value);
        Ok(node.finish(self.lexer.position()))
    }

    fn parse_character_set(&mut self) -> Result<Node> {
        let start = self.lexer.position();
        if let Some(sigil) = self.lexer.eat(TokenKind::Keyword, '.') {
            let mut node = NodeBuilder::new(NodeType::AnyCharacterSet, start);
            node.token("sigilToken", sigil);
            return Ok(node.finish(self.lexer.position()));
        }
        if self.at_escape(DIGIT_LETTERS) {
            self.parse_escaped_keyword(NodeType::DigitCharacterSet, DIGIT_LETTERS)
        } else if self.at_escape(SPACE_LETTERS) {
            self.parse_escaped_keyword(NodeType::SpaceCharacterSet, SPACE_LETTERS)
        } else {
            self.parse_escaped_keyword(NodeType::WordCharacterSet, WORD_LETTERS)
        }
    }

    fn parse_character(&mut self) -> Result<Node> {
        let mut node = NodeBuilder::new(NodeType::Character, self.lexer.position());
        if self.lexer.peek('\\') {
            let escape = self.parse_escape_sequence()?;
            node.node("escape", escape);
        } else if let Some(value) = self.lexer.eat(TokenKind::Literal, &token_regexes().plain) {
            node.token("value", value);
        } else {
            let message = match self.lexer.peek_char() {
                Some(c) => format!("unexpected character {:?}", c),
                None => "unexpected end of pattern".to_string(),
            };
            return Err(self.error(ParseError::GeneralParseError(message)));
        }
        Ok(node.finish(self.lexer.position()))
    }

    fn parse_class(&mut self) -> Result<Node> {
        let mut node = NodeBuilder::new(NodeType::CharacterClass, self.lexer.position());
        let Some(open) = self.lexer.eat_open(
            TokenKind::Punctuator,
            '[',
            ']',
            Some(Span::CharacterClass),
        ) else {
            return Err(self.error(ParseError::GeneralParseError(
                "expected '['".to_string(),
            )));
        };
        node.token("openToken", open);
        let negate = self.lexer.eat(TokenKind::Keyword, '^');
        node.bind("negate", Attribute::Bool(negate.is_some()));
        match negate {
            Some(negate) => node.token("negateToken", negate),
            None => node.null("negateToken"),
        }
        while !self.lexer.is_at_end() && !self.lexer.peek(']') {
            let element = self.parse_class_element()?;
            node.node("elements", element);
        }
        let close = self.expect_close(']')?;
        node.token("closeToken", close);
        Ok(node.finish(self.lexer.position()))
    }

    fn parse_class_element(&mut self) -> Result<Node> {
        let element = if self.at_escape(SET_LETTERS) {
            self.parse_character_set()?
        } else if self.at_escape(GAP_LETTERS) {
            self.parse_escaped_keyword(NodeType::Gap, GAP_LETTERS)?
        } else {
            self.parse_character()?
        };
        if element.ty() == NodeType::Character && self.at_range_operator() {
            return self.parse_class_range(element);
        }
        Ok(element)
    }

    /// Whether a `-` follows which has a character after it to end a range.
    fn at_range_operator(&self) -> bool {
        let Some(rest) = self.lexer.rest().strip_prefix('-') else {
            return false;
        };
        let mut chars = rest.chars();
        match chars.next() {
            None | Some(']') => false,
            Some('\\') => !chars
                .next()
                .map_or(false, |c| SET_LETTERS.contains(&c) || GAP_LETTERS.contains(&c)),
            Some(_) => true,
        }
    }

    fn parse_class_range(&mut self, min: Node) -> Result<Node> {
        let mut node = NodeBuilder::new(NodeType::CharacterClassRange, min.span().start);
        node.node("min", min);
        let sigil = self.expect(TokenKind::Punctuator, '-', "'-'")?;
        node.token("sigilToken", sigil);
        let max = self.parse_character()?;
        node.node("max", max);
        Ok(node.finish(self.lexer.position()))
    }

    fn parse_escape_sequence(&mut self) -> Result<Node> {
        let start = self.lexer.position();
        // the span around the escape decides which characters it may name
        let span = self.lexer.span();
        let mut node = NodeBuilder::new(NodeType::EscapeSequence, start);
        let Some(escape) = self
            .lexer
            .eat_open_span(TokenKind::Punctuator, '\\', Span::Escape)
        else {
            return Err(self.error(ParseError::GeneralParseError(
                "expected '\\'".to_string(),
            )));
        };
        node.token("escape", escape);

        let next = self.lexer.peek_char();
        let unrecognized = || {
            let s = match next {
                Some(c) => format!("\\{}", c),
                None => "\\".to_string(),
            };
            Error::ParseError(start, ParseError::UnrecognizedEscape(s))
        };
        let cooked = if let Some((c, cooked)) =
            next.and_then(|c| escape::cook_fixed(c).map(|cooked| (c, cooked)))
        {
            let code = self
                .lexer
                .eat_close_span(TokenKind::Keyword, c, Span::Escape)
                .ok_or_else(unrecognized)?;
            node.token("code", code);
            cooked.to_string()
        } else {
            let specials = match span.specials() {
                Some(specials) => specials,
                None => return Err(self.error(ParseError::UnknownSpan(span))),
            };
            match next {
                Some(c) if specials.contains(&c) => {
                    let code = self
                        .lexer
                        .eat_close_span(TokenKind::Keyword, c, Span::Escape)
                        .ok_or_else(unrecognized)?;
                    node.token("code", code);
                    c.to_string()
                }
                Some(c) if CODE_TYPES.contains(&c) => {
                    let (code, value) = self.parse_escape_code()?;
                    self.lexer.close_span(Span::Escape);
                    node.node("code", code);
                    value.to_string()
                }
                _ => return Err(unrecognized()),
            }
        };
        node.bind("cooked", Attribute::String(cooked));
        Ok(node.finish(self.lexer.position()))
    }

    /// `\u{H...}`, `\uHHHH` or `\xHH` after the `\`; returns the code as well.
    fn parse_escape_code(&mut self) -> Result<(Node, u32)> {
        let tokens = token_regexes();
        let start = self.lexer.position();
        let mut node = NodeBuilder::new(NodeType::EscapeCode, start);
        let ty = self.expect(TokenKind::Keyword, CODE_TYPES, "'u' or 'x'")?;
        let unicode = ty.text == "u";
        node.token("type", ty);
        let value = if unicode {
            if let Some(open) = self.lexer.eat(TokenKind::Punctuator, '{') {
                node.token("openToken", open);
                let value = match self.lexer.eat(TokenKind::Literal, &tokens.hex) {
                    Some(value) if value.text.len() <= MAX_BRACED_HEX_DIGITS => value,
                    _ => return Err(self.error(ParseError::InvalidHex)),
                };
                let Some(close) = self.lexer.eat(TokenKind::Punctuator, '}') else {
                    return Err(self.error(ParseError::InvalidHex));
                };
                let text = value.text.clone();
                node.token("value", value);
                node.token("closeToken", close);
                text
            } else {
                self.fixed_width_hex(&mut node, &tokens.hex4)?
            }
        } else {
            self.fixed_width_hex(&mut node, &tokens.hex2)?
        };
        let Some(code) = escape::decode_hex(&value) else {
            return Err(Error::ParseError(start, ParseError::InvalidCodepointValue));
        };
        node.bind("cooked", Attribute::String(code.to_string()));
        Ok((node.finish(self.lexer.position()), code))
    }

    fn fixed_width_hex(&mut self, node: &mut NodeBuilder, digits: &TokenRegex) -> Result<String> {
        let Some(value) = self.lexer.eat(TokenKind::Literal, digits) else {
            return Err(self.error(ParseError::InvalidHex));
        };
        let text = value.text.clone();
        node.null("openToken");
        node.token("value", value);
        node.null("closeToken");
        Ok(text)
    }
}

fn bound(n: usize) -> Attribute {
    if n == 0 {
        Attribute::Absent
    } else {
        Attribute::Integer(n)
    }
}
