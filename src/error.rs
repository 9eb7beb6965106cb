use std::fmt;

use crate::lexer::Span;

/// Result type for this crate with specific error enum.
pub type Result<T> = ::std::result::Result<T, Error>;

pub type ParseErrorPosition = usize;

/// An error for the result of parsing a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Parsing stopped at the given byte offset
    ParseError(ParseErrorPosition, ParseError),
}

/// The kind of failure encountered while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// General parsing error
    GeneralParseError(String),
    /// A flag letter appears more than once, e.g. `//gg`
    DuplicateFlag(char),
    /// Opening delimiter without its closer, e.g. `/(?:a/`; holds the expected closer
    UnbalancedDelimiter(char),
    /// Quantifier without an element, or a malformed `{m,n}` body
    MalformedQuantifier,
    /// Escape that is neither in the fixed table, a special of the span, nor a code
    UnrecognizedEscape(String),
    /// Escape decoding requested in a span with no special-character set
    UnknownSpan(Span),
    /// Invalid hex escape
    InvalidHex,
    /// Invalid codepoint for hex or unicode escape
    InvalidCodepointValue,
    /// Pattern too deeply nested
    RecursionExceeded,
}

impl Error {
    /// Byte offset into the pattern at which parsing failed.
    pub fn position(&self) -> ParseErrorPosition {
        match self {
            Error::ParseError(position, _) => *position,
        }
    }

    /// The kind of parse failure.
    pub fn kind(&self) -> &ParseError {
        match self {
            Error::ParseError(_, kind) => kind,
        }
    }
}

impl ::std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(position, parse_error) => {
                write!(f, "Parsing error at position {}: {}", position, parse_error)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::GeneralParseError(s) => write!(f, "General parsing error: {}", s),
            ParseError::DuplicateFlag(c) => write!(f, "Duplicate flag: {}", c),
            ParseError::UnbalancedDelimiter(c) => {
                write!(f, "Unbalanced delimiter, expected '{}'", c.escape_debug())
            }
            ParseError::MalformedQuantifier => write!(f, "Malformed quantifier"),
            ParseError::UnrecognizedEscape(s) => write!(f, "Unrecognized escape: {}", s),
            ParseError::UnknownSpan(span) => {
                write!(f, "No special characters defined for span {:?}", span)
            }
            ParseError::InvalidHex => write!(f, "Invalid hex escape"),
            ParseError::InvalidCodepointValue => {
                write!(f, "Invalid codepoint for hex or unicode escape")
            }
            ParseError::RecursionExceeded => write!(f, "Pattern too deeply nested"),
        }
    }
}
