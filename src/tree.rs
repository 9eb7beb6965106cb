//! The concrete syntax tree.
//!
//! Every character of the source ends up in exactly one [`Token`]. A [`Node`]
//! records its children as named properties in source order, next to the
//! attributes derived from them, so concatenating the tokens of a tree gives
//! back the parsed text.

use std::fmt;
use std::ops::Range;

use crate::lexer::Span;

/// The type tag of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Pattern,
    Flags,
    Alternative,
    Group,
    CapturingGroup,
    StartOfInputAssertion,
    EndOfInputAssertion,
    WordBoundaryAssertion,
    Gap,
    Character,
    CharacterClass,
    CharacterClassRange,
    AnyCharacterSet,
    DigitCharacterSet,
    SpaceCharacterSet,
    WordCharacterSet,
    Quantifier,
    EscapeSequence,
    EscapeCode,
    UnsignedInteger,
    Digit,
}

/// How many children a slot holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplicity {
    /// Exactly one child
    One,
    /// Zero or one child; absence may be recorded as [`Child::Null`]
    Optional,
    /// Any number of children
    Many,
}

/// A named child position of a node type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub multiplicity: Multiplicity,
}

const fn one(name: &'static str) -> Slot {
    Slot {
        name,
        multiplicity: Multiplicity::One,
    }
}

const fn optional(name: &'static str) -> Slot {
    Slot {
        name,
        multiplicity: Multiplicity::Optional,
    }
}

const fn many(name: &'static str) -> Slot {
    Slot {
        name,
        multiplicity: Multiplicity::Many,
    }
}

const ALTERNATION_SLOTS: &[Slot] = &[
    one("openToken"),
    many("alternatives"),
    many("separatorTokens"),
    one("closeToken"),
];
const PATTERN_SLOTS: &[Slot] = &[
    one("openToken"),
    many("alternatives"),
    many("separatorTokens"),
    one("closeToken"),
    one("flags"),
];
const FLAGS_SLOTS: &[Slot] = &[many("tokens")];
const ALTERNATIVE_SLOTS: &[Slot] = &[many("elements")];
const SIGIL_SLOTS: &[Slot] = &[one("sigilToken")];
const ESCAPED_KEYWORD_SLOTS: &[Slot] = &[one("escapeToken"), one("value")];
const CHARACTER_SLOTS: &[Slot] = &[optional("value"), optional("escape")];
const CLASS_SLOTS: &[Slot] = &[
    one("openToken"),
    optional("negateToken"),
    many("elements"),
    one("closeToken"),
];
const RANGE_SLOTS: &[Slot] = &[one("min"), one("sigilToken"), one("max")];
const QUANTIFIER_SLOTS: &[Slot] = &[
    one("element"),
    optional("sigilToken"),
    optional("openToken"),
    optional("min"),
    optional("separator"),
    optional("max"),
    optional("closeToken"),
];
const ESCAPE_SEQUENCE_SLOTS: &[Slot] = &[one("escape"), one("code")];
const ESCAPE_CODE_SLOTS: &[Slot] = &[
    one("type"),
    optional("openToken"),
    one("value"),
    optional("closeToken"),
];
const UNSIGNED_INTEGER_SLOTS: &[Slot] = &[many("digits")];
const DIGIT_SLOTS: &[Slot] = &[one("value")];
const NEGATE: &[&str] = &["negate"];

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Pattern => "Pattern",
            NodeType::Flags => "Flags",
            NodeType::Alternative => "Alternative",
            NodeType::Group => "Group",
            NodeType::CapturingGroup => "CapturingGroup",
            NodeType::StartOfInputAssertion => "StartOfInputAssertion",
            NodeType::EndOfInputAssertion => "EndOfInputAssertion",
            NodeType::WordBoundaryAssertion => "WordBoundaryAssertion",
            NodeType::Gap => "Gap",
            NodeType::Character => "Character",
            NodeType::CharacterClass => "CharacterClass",
            NodeType::CharacterClassRange => "CharacterClassRange",
            NodeType::AnyCharacterSet => "AnyCharacterSet",
            NodeType::DigitCharacterSet => "DigitCharacterSet",
            NodeType::SpaceCharacterSet => "SpaceCharacterSet",
            NodeType::WordCharacterSet => "WordCharacterSet",
            NodeType::Quantifier => "Quantifier",
            NodeType::EscapeSequence => "EscapeSequence",
            NodeType::EscapeCode => "EscapeCode",
            NodeType::UnsignedInteger => "UnsignedInteger",
            NodeType::Digit => "Digit",
        }
    }

    /// The child slots of this node type, in source order.
    pub fn slots(self) -> &'static [Slot] {
        match self {
            NodeType::Pattern => PATTERN_SLOTS,
            NodeType::Flags => FLAGS_SLOTS,
            NodeType::Alternative => ALTERNATIVE_SLOTS,
            NodeType::Group | NodeType::CapturingGroup => ALTERNATION_SLOTS,
            NodeType::StartOfInputAssertion
            | NodeType::EndOfInputAssertion
            | NodeType::AnyCharacterSet => SIGIL_SLOTS,
            NodeType::WordBoundaryAssertion
            | NodeType::Gap
            | NodeType::DigitCharacterSet
            | NodeType::SpaceCharacterSet
            | NodeType::WordCharacterSet => ESCAPED_KEYWORD_SLOTS,
            NodeType::Character => CHARACTER_SLOTS,
            NodeType::CharacterClass => CLASS_SLOTS,
            NodeType::CharacterClassRange => RANGE_SLOTS,
            NodeType::Quantifier => QUANTIFIER_SLOTS,
            NodeType::EscapeSequence => ESCAPE_SEQUENCE_SLOTS,
            NodeType::EscapeCode => ESCAPE_CODE_SLOTS,
            NodeType::UnsignedInteger => UNSIGNED_INTEGER_SLOTS,
            NodeType::Digit => DIGIT_SLOTS,
        }
    }

    pub fn slot(self, name: &str) -> Option<Slot> {
        self.slots().iter().copied().find(|slot| slot.name == name)
    }

    /// Names of the attributes bound on nodes of this type, in binding order.
    pub fn attribute_names(self) -> &'static [&'static str] {
        match self {
            NodeType::Flags => &[
                "global",
                "ignoreCase",
                "multiline",
                "dotAll",
                "unicode",
                "sticky",
            ],
            NodeType::WordBoundaryAssertion
            | NodeType::CharacterClass
            | NodeType::DigitCharacterSet
            | NodeType::SpaceCharacterSet
            | NodeType::WordCharacterSet => NEGATE,
            NodeType::Quantifier => &["min", "max"],
            NodeType::EscapeSequence | NodeType::EscapeCode => &["cooked"],
            _ => &[],
        }
    }
}

/// A derived fact bound on a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    Bool(bool),
    Integer(usize),
    String(String),
    /// Explicitly not set, e.g. an unbounded quantifier maximum
    Absent,
}

impl Attribute {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Attribute::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<usize> {
        match *self {
            Attribute::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        *self == Attribute::Absent
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Attribute::Bool(b) => write!(f, "{}", b),
            Attribute::Integer(n) => write!(f, "{}", n),
            Attribute::String(s) => write!(f, "'{}'", s.escape_debug()),
            Attribute::Absent => f.write_str("null"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Punctuator,
    Keyword,
    Literal,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Punctuator => "Punctuator",
            TokenKind::Keyword => "Keyword",
            TokenKind::Literal => "Literal",
        }
    }
}

/// A terminal: a run of source text with optional balancing metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the source
    pub span: Range<usize>,
    /// The character expected to close the region this token opens
    pub balanced: Option<char>,
    /// The span active inside the region this token opens
    pub balanced_span: Option<Span>,
    /// Whether this token closes a balanced region
    pub balancer: bool,
    pub open_span: Option<Span>,
    pub close_span: Option<Span>,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, text: &str, span: Range<usize>) -> Token {
        Token {
            kind,
            text: String::from(text),
            span,
            balanced: None,
            balanced_span: None,
            balancer: false,
            open_span: None,
            close_span: None,
        }
    }

    fn write_metadata(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut entries = Vec::new();
        if let Some(c) = self.balanced {
            entries.push(format!("balanced: '{}'", c.escape_debug()));
        }
        if let Some(span) = self.balanced_span {
            entries.push(format!("balancedSpan: '{}'", span.name()));
        }
        if self.balancer {
            entries.push(String::from("balancer: true"));
        }
        if let Some(span) = self.open_span {
            entries.push(format!("openSpan: '{}'", span.name()));
        }
        if let Some(span) = self.close_span {
            entries.push(format!("closeSpan: '{}'", span.name()));
        }
        if !entries.is_empty() {
            write!(f, " {{ {} }}", entries.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<*{} '{}'", self.kind.name(), self.text.escape_debug())?;
        self.write_metadata(f)?;
        f.write_str(" />")
    }
}

/// The value held by a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Child {
    Node(Node),
    Token(Token),
    /// An optional slot that matched nothing
    Null,
}

impl Child {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Child::Token(token) => Some(token),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub name: &'static str,
    pub value: Child,
}

/// A finished syntax tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    ty: NodeType,
    span: Range<usize>,
    properties: Vec<Property>,
    attributes: Vec<(&'static str, Attribute)>,
}

impl Node {
    pub fn ty(&self) -> NodeType {
        self.ty
    }

    /// Byte range of the source covered by this node.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Children in source order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Attributes in binding order.
    pub fn attributes(&self) -> &[(&'static str, Attribute)] {
        &self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value)
    }

    /// The first child recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&Child> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .map(|property| &property.value)
    }

    /// All children recorded under `name`, in source order.
    pub fn get_all<'n>(&'n self, name: &'n str) -> impl Iterator<Item = &'n Child> + 'n {
        self.properties
            .iter()
            .filter(move |property| property.name == name)
            .map(|property| &property.value)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.get(name).and_then(Child::as_node)
    }

    pub fn nodes<'n>(&'n self, name: &'n str) -> impl Iterator<Item = &'n Node> + 'n {
        self.get_all(name).filter_map(Child::as_node)
    }

    pub fn token(&self, name: &str) -> Option<&Token> {
        self.get(name).and_then(Child::as_token)
    }

    /// Every token of the subtree, depth first, which is source order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut tokens = Vec::new();
        self.push_tokens(&mut tokens);
        tokens
    }

    fn push_tokens<'n>(&'n self, tokens: &mut Vec<&'n Token>) {
        for property in &self.properties {
            match &property.value {
                Child::Node(node) => node.push_tokens(tokens),
                Child::Token(token) => tokens.push(token),
                Child::Null => (),
            }
        }
    }

    /// The source text covered by this node, rebuilt from its tokens.
    pub fn source_text(&self) -> String {
        self.tokens().iter().map(|token| token.text.as_str()).collect()
    }

    fn write_cstml(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        write!(f, "<{}", self.ty.name())?;
        if !self.attributes.is_empty() {
            let attributes: Vec<String> = self
                .attributes
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect();
            write!(f, " {{ {} }}", attributes.join(", "))?;
        }
        if self.properties.is_empty() {
            return f.write_str(" />");
        }
        f.write_str(">\n")?;
        let indent = "  ".repeat(depth + 1);
        for property in &self.properties {
            let many = match self.ty.slot(property.name) {
                Some(slot) => slot.multiplicity == Multiplicity::Many,
                None => false,
            };
            write!(
                f,
                "{}{}{}:",
                indent,
                property.name,
                if many { "[]" } else { "" }
            )?;
            match &property.value {
                Child::Node(node) if !node.properties.is_empty() => {
                    write!(f, "\n{}", indent)?;
                    node.write_cstml(f, depth + 1)?;
                }
                Child::Node(node) => {
                    f.write_str(" ")?;
                    node.write_cstml(f, depth + 1)?;
                }
                Child::Token(token) => write!(f, " {}", token)?,
                Child::Null => f.write_str(" null")?,
            }
            f.write_str("\n")?;
        }
        write!(f, "{}</>", "  ".repeat(depth))
    }
}

/// Prints the tree in an indented, CSTML-like notation.
///
/// Every entry of a repeated slot is printed under its own `name[]:` line;
/// an empty repeated slot prints nothing.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_cstml(f, 0)
    }
}

/// Collects the children and attributes of a node while its production runs.
#[derive(Debug)]
pub(crate) struct NodeBuilder {
    ty: NodeType,
    start: usize,
    properties: Vec<Property>,
    attributes: Vec<(&'static str, Attribute)>,
}

impl NodeBuilder {
    pub(crate) fn new(ty: NodeType, start: usize) -> NodeBuilder {
        NodeBuilder {
            ty,
            start,
            properties: Vec::new(),
            attributes: Vec::new(),
        }
    }

    fn push(&mut self, name: &'static str, value: Child) {
        debug_assert!(
            match self.ty.slot(name) {
                Some(slot) => {
                    slot.multiplicity == Multiplicity::Many
                        || self.properties.iter().all(|p| p.name != name)
                }
                None => false,
            },
            "{} has no free slot {}",
            self.ty.name(),
            name
        );
        self.properties.push(Property { name, value });
    }

    pub(crate) fn token(&mut self, name: &'static str, token: Token) {
        self.push(name, Child::Token(token));
    }

    pub(crate) fn node(&mut self, name: &'static str, node: Node) {
        self.push(name, Child::Node(node));
    }

    pub(crate) fn null(&mut self, name: &'static str) {
        self.push(name, Child::Null);
    }

    pub(crate) fn bind(&mut self, name: &'static str, value: Attribute) {
        debug_assert!(self.ty.attribute_names().contains(&name));
        self.attributes.push((name, value));
    }

    pub(crate) fn finish(self, end: usize) -> Node {
        Node {
            ty: self.ty,
            span: self.start..end,
            properties: self.properties,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(c: &str, at: usize) -> Node {
        let mut builder = NodeBuilder::new(NodeType::Character, at);
        builder.token("value", Token::new(TokenKind::Literal, c, at..at + c.len()));
        builder.finish(at + c.len())
    }

    #[test]
    fn source_text_follows_property_order() {
        let mut builder = NodeBuilder::new(NodeType::Alternative, 0);
        builder.node("elements", character("a", 0));
        builder.node("elements", character("b", 1));
        let alternative = builder.finish(2);
        assert_eq!(alternative.source_text(), "ab");
        assert_eq!(alternative.nodes("elements").count(), 2);
        assert_eq!(alternative.span(), 0..2);
    }

    #[test]
    fn attributes_keep_binding_order() {
        let mut builder = NodeBuilder::new(NodeType::Quantifier, 0);
        builder.node("element", character("a", 0));
        builder.token("sigilToken", Token::new(TokenKind::Keyword, "?", 1..2));
        builder.bind("min", Attribute::Absent);
        builder.bind("max", Attribute::Integer(1));
        let quantifier = builder.finish(2);
        let names: Vec<_> = quantifier.attributes().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["min", "max"]);
        assert!(quantifier.attr("min").unwrap().is_absent());
        assert_eq!(quantifier.attr("max").and_then(Attribute::as_integer), Some(1));
        assert_eq!(quantifier.attr("cooked"), None);
    }

    const ALL_TYPES: [NodeType; 21] = [
        NodeType::Pattern,
        NodeType::Flags,
        NodeType::Alternative,
        NodeType::Group,
        NodeType::CapturingGroup,
        NodeType::StartOfInputAssertion,
        NodeType::EndOfInputAssertion,
        NodeType::WordBoundaryAssertion,
        NodeType::Gap,
        NodeType::Character,
        NodeType::CharacterClass,
        NodeType::CharacterClassRange,
        NodeType::AnyCharacterSet,
        NodeType::DigitCharacterSet,
        NodeType::SpaceCharacterSet,
        NodeType::WordCharacterSet,
        NodeType::Quantifier,
        NodeType::EscapeSequence,
        NodeType::EscapeCode,
        NodeType::UnsignedInteger,
        NodeType::Digit,
    ];

    #[test]
    fn slot_tables_are_static() {
        let tables: Vec<&'static [Slot]> = ALL_TYPES.iter().map(|ty| ty.slots()).collect();
        for (ty, slots) in ALL_TYPES.iter().zip(tables) {
            assert!(!slots.is_empty(), "{:?}", ty);
            for (i, slot) in slots.iter().enumerate() {
                assert_eq!(ty.slot(slot.name), Some(*slot));
                assert!(slots[..i].iter().all(|other| other.name != slot.name));
            }
        }
        assert_eq!(
            NodeType::Quantifier.slot("max").map(|slot| slot.multiplicity),
            Some(Multiplicity::Optional)
        );
        assert_eq!(NodeType::Digit.slot("digits"), None);
    }

    #[test]
    fn lookup_outlives_borrowed_name() {
        let mut builder = NodeBuilder::new(NodeType::Alternative, 0);
        builder.node("elements", character("a", 0));
        let alternative = builder.finish(1);
        let found = {
            let name = String::from("elements");
            alternative.node(&name)
        };
        assert_eq!(found.map(Node::source_text), Some("a".to_string()));
        let value = {
            let name = String::from("value");
            found.and_then(|character| character.token(&name))
        };
        assert_eq!(value.map(|token| token.span.clone()), Some(0..1));
        assert_eq!(alternative.get("missing"), None);
    }

    #[test]
    fn display_nests_nodes() {
        let mut builder = NodeBuilder::new(NodeType::CharacterClassRange, 0);
        builder.node("min", character("a", 0));
        builder.token("sigilToken", Token::new(TokenKind::Punctuator, "-", 1..2));
        builder.node("max", character("z", 2));
        let range = builder.finish(3);
        assert_eq!(
            range.to_string(),
            "<CharacterClassRange>\n\
             \x20 min:\n\
             \x20 <Character>\n\
             \x20   value: <*Literal 'a' />\n\
             \x20 </>\n\
             \x20 sigilToken: <*Punctuator '-' />\n\
             \x20 max:\n\
             \x20 <Character>\n\
             \x20   value: <*Literal 'z' />\n\
             \x20 </>\n\
             </>"
        );
    }

    #[test]
    fn display_token_metadata() {
        let mut token = Token::new(TokenKind::Punctuator, "/", 0..1);
        token.balanced = Some('/');
        token.balanced_span = Some(Span::Pattern);
        assert_eq!(
            token.to_string(),
            "<*Punctuator '/' { balanced: '/', balancedSpan: 'Pattern' } />"
        );
    }
}
