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

/*!
A parser for regex pattern literals, `/pattern/flags`, producing a concrete
syntax tree.

Unlike an abstract syntax tree the result keeps every character of the input:
delimiters, escape backslashes, quantifier braces and flag letters all end up
in a [`Token`], and the tokens of a tree concatenate back to the source text.
Each [`Node`] also carries attributes derived while parsing, such as the
bounds of a quantifier or the cooked value of an escape.

# Example

```rust
use regex_cst::{Attribute, NodeType};

let pattern = regex_cst::parse(r"/a{2,}|\x41/i").unwrap();
assert_eq!(pattern.source_text(), r"/a{2,}|\x41/i");

let flags = pattern.node("flags").unwrap();
assert_eq!(flags.attr("ignoreCase"), Some(&Attribute::Bool(true)));

let first = pattern.nodes("alternatives").next().unwrap();
let quantifier = first.node("elements").unwrap();
assert_eq!(quantifier.ty(), NodeType::Quantifier);
assert_eq!(quantifier.attr("min"), Some(&Attribute::Integer(2)));
assert!(quantifier.attr("max").unwrap().is_absent());
```

Parsing stops at the first error, reporting the byte offset where it failed:

```rust
let err = regex_cst::parse("/(?:a/").unwrap_err();
assert_eq!(err.position(), 5);
assert_eq!(
    err.to_string(),
    "Parsing error at position 5: Unbalanced delimiter, expected ')'"
);
```

# Syntax

The supported syntax is a small subset of ECMAScript regular expressions.

<pre class="rust">
<b>Alternation and grouping</b>
x|y          alternation
(?:exp)      group
(exp)        capturing group

<b>Quantifiers</b>
x*  x+  x?   zero or more, one or more, zero or one
x{n}         exactly n
x{n,}        at least n
x{n,m}       at least n and at most m

<b>Assertions</b>
^  $         start and end of input
\b  \B       word boundary and its negation
\g           gap

<b>Character sets</b>
.            any character
\d \s \w     digit, space and word characters; uppercase negates
[...]        character class, [^...] negated, with ranges a-z

<b>Escapes</b>
\\ \/ \n \r \t \0      fixed escapes
\xHH \uHHHH \u{H...}   escape codes
\*  \(  \[  ...        special characters of the surrounding span
</pre>

Which characters may be escaped to stand for themselves depends on the
[`Span`]: `\-` is valid inside a class but not at the top level of a pattern.

Flags are any of `gimsuy`, each at most once.
*/

#![doc(html_root_url = "https://docs.rs/regex-cst/0.1.0")]

mod error;
mod escape;
mod flags;
mod lexer;
mod parse;
mod tree;

pub use crate::error::{Error, ParseError, ParseErrorPosition, Result};
pub use crate::flags::FLAGS;
pub use crate::lexer::Span;
pub use crate::tree::{
    Attribute, Child, Multiplicity, Node, NodeType, Property, Slot, Token, TokenKind,
};

use crate::parse::Parser;

const MAX_RECURSION: usize = 64;

/// Parse a pattern literal of the form `/pattern/flags` into a tree rooted at
/// a [`NodeType::Pattern`] node.
pub fn parse(re: &str) -> Result<Node> {
    Parser::parse(re)
}

/// Parse a bare flags string, e.g. `gi`, into a [`NodeType::Flags`] node.
pub fn parse_flags(flags: &str) -> Result<Node> {
    Parser::parse_flags_only(flags)
}

impl Node {
    /// Parse a pattern literal; same as [`parse`].
    pub fn parse(re: &str) -> Result<Node> {
        parse(re)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_names_match_node_attributes() {
        let names: Vec<&str> = FLAGS.iter().map(|&(name, _)| name).collect();
        assert_eq!(names, NodeType::Flags.attribute_names());
    }

    #[test]
    fn parse_entry_points_agree() {
        let re = r"/[a-z]+\d?/gu";
        assert_eq!(parse(re), Node::parse(re));
        let flags = parse_flags("gu").unwrap();
        assert_eq!(flags.attributes(), parse(re).unwrap().node("flags").unwrap().attributes());
    }

    #[test]
    fn error_accessors() {
        let err = parse("//gg").unwrap_err();
        assert_eq!(err.position(), 3);
        assert_eq!(err.kind(), &ParseError::DuplicateFlag('g'));
    }
}
