//! Escape tables and code decoding.

use crate::lexer::Span;

/// Characters that must be escaped at the top level of a pattern.
const PATTERN_SPECIALS: &[char] = &[
    '*', '+', '?', '{', '}', '[', ']', '(', ')', '.', '^', '$', '|', '\n', '\\', '<', '>',
];

/// Characters that must be escaped inside a bracket expression. Besides `]`
/// and `\` this admits `\-` and `\^`, so a class can name them anywhere.
const CLASS_SPECIALS: &[char] = &[']', '\\', '-', '^'];

/// Letters introducing an escape code: `\u` or `\x`.
pub(crate) const CODE_TYPES: &[char] = &['u', 'x'];

/// Longest hex run accepted in `\u{...}`.
pub(crate) const MAX_BRACED_HEX_DIGITS: usize = 6;

impl Span {
    /// The characters which may follow `\` to stand for themselves in this span.
    ///
    /// `Escape` has no such set: escapes do not nest.
    pub fn specials(self) -> Option<&'static [char]> {
        match self {
            Span::Pattern => Some(PATTERN_SPECIALS),
            Span::CharacterClass => Some(CLASS_SPECIALS),
            Span::Escape => None,
        }
    }
}

/// Cooked value of a fixed escape code. These are the same in every span.
pub(crate) fn cook_fixed(code: char) -> Option<char> {
    Some(match code {
        '\\' => '\\',
        '/' => '/',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        _ => return None,
    })
}

/// Numeric value of a run of hex digits, if it is a valid codepoint.
/// Surrogates are accepted, the pattern syntax allows them.
pub(crate) fn decode_hex(digits: &str) -> Option<u32> {
    u32::from_str_radix(digits, 16)
        .ok()
        .filter(|&code| code <= char::MAX as u32)
}

/// Value of a run of decimal digits, `None` on overflow.
pub(crate) fn decode_decimal(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok()
}
