use regex_cst::{Attribute, Child, Node, NodeType, ParseError, Span, TokenKind};

#[test]
fn every_character_lands_in_a_token() {
    let patterns = [
        r"/^(?:[a-z0-9._%+-]+)@[a-z0-9.-]+\.[a-z]{2,}$/i",
        r"/\u{1F600}|\uD83D|\x7e?/u",
        r"/(a|(b|(c)))*\b\B\g/gimsuy",
        r"/[\]\\\/\-\^\n]{0}/",
    ];
    for pattern in patterns {
        let tree = regex_cst::parse(pattern).unwrap();
        let mut end = 0;
        for token in tree.tokens() {
            assert_eq!(token.span.start, end, "gap before {} in {}", token, pattern);
            assert_eq!(&pattern[token.span.clone()], token.text);
            end = token.span.end;
        }
        assert_eq!(end, pattern.len());
    }
}

#[test]
fn child_spans_nest_inside_parents() {
    fn check(node: &Node) {
        for property in node.properties() {
            let span = match &property.value {
                Child::Node(child) => {
                    check(child);
                    child.span()
                }
                Child::Token(token) => token.span.clone(),
                Child::Null => continue,
            };
            assert!(
                node.span().start <= span.start && span.end <= node.span().end,
                "{} escapes {:?}",
                property.name,
                node.ty()
            );
        }
    }
    check(&regex_cst::parse(r"/x(?:[^a-c\d]+|\u{2603}){2,5}$/m").unwrap());
}

#[test]
fn properties_follow_slot_order() {
    fn check(node: &Node) {
        let slots = node.ty().slots();
        let mut last = 0;
        for property in node.properties() {
            let position = slots
                .iter()
                .position(|slot| slot.name == property.name)
                .unwrap_or_else(|| panic!("{:?} has no slot {}", node.ty(), property.name));
            // alternatives and their separators interleave
            if property.name != "separatorTokens" && property.name != "alternatives" {
                assert!(position >= last, "{} out of order in {:?}", property.name, node.ty());
                last = position;
            }
            if let Child::Node(child) = &property.value {
                check(child);
            }
        }
    }
    check(&regex_cst::parse(r"/(a|b|c)[x-z]{1,2}\x41/g").unwrap());
}

#[test]
fn nested_class_in_group() {
    let tree = regex_cst::parse(r"/([)(]|\))/").unwrap();
    let alternative = tree.node("alternatives").unwrap();
    let group = alternative.node("elements").unwrap();
    assert_eq!(group.ty(), NodeType::CapturingGroup);
    let branches: Vec<_> = group.nodes("alternatives").collect();
    assert_eq!(branches.len(), 2);
    let class = branches[0].node("elements").unwrap();
    assert_eq!(class.source_text(), "[)(]");
    let escaped = branches[1].node("elements").unwrap();
    let sequence = escaped.node("escape").unwrap();
    assert_eq!(sequence.attr("cooked"), Some(&Attribute::String(")".to_string())));
}

#[test]
fn token_kinds() {
    let tree = regex_cst::parse(r"/a*\d[b]/g").unwrap();
    let kinds: Vec<_> = tree
        .tokens()
        .iter()
        .map(|token| (token.text.as_str(), token.kind))
        .collect();
    assert_eq!(
        kinds,
        [
            ("/", TokenKind::Punctuator),
            ("a", TokenKind::Literal),
            ("*", TokenKind::Keyword),
            ("\\", TokenKind::Punctuator),
            ("d", TokenKind::Keyword),
            ("[", TokenKind::Punctuator),
            ("b", TokenKind::Literal),
            ("]", TokenKind::Punctuator),
            ("/", TokenKind::Punctuator),
            ("g", TokenKind::Keyword),
        ]
    );
}

#[test]
fn escape_span_metadata() {
    let tree = regex_cst::parse(r"/[\x41]/").unwrap();
    let tokens = tree.tokens();
    let backslash = tokens.iter().find(|token| token.text == "\\").unwrap();
    assert_eq!(backslash.open_span, Some(Span::Escape));
    assert_eq!(backslash.close_span, None);
    let class_open = tokens.iter().find(|token| token.text == "[").unwrap();
    assert_eq!(class_open.balanced_span, Some(Span::CharacterClass));
}

#[test]
fn display_of_class_range() {
    let tree = regex_cst::parse("/[a-b]/").unwrap();
    let class = tree
        .node("alternatives")
        .and_then(|alternative| alternative.node("elements"))
        .unwrap();
    let expected = "<CharacterClass { negate: false }>\n\
        \x20 openToken: <*Punctuator '[' { balanced: ']', balancedSpan: 'CharacterClass' } />\n\
        \x20 negateToken: null\n\
        \x20 elements[]:\n\
        \x20 <CharacterClassRange>\n\
        \x20   min:\n\
        \x20   <Character>\n\
        \x20     value: <*Literal 'a' />\n\
        \x20   </>\n\
        \x20   sigilToken: <*Punctuator '-' />\n\
        \x20   max:\n\
        \x20   <Character>\n\
        \x20     value: <*Literal 'b' />\n\
        \x20   </>\n\
        \x20 </>\n\
        \x20 closeToken: <*Punctuator ']' { balancer: true } />\n\
        </>";
    assert_eq!(class.to_string(), expected);
}

#[test]
fn error_messages() {
    assert_parse_error(
        "/a(b/",
        "Parsing error at position 4: Unbalanced delimiter, expected ')'",
    );
    assert_parse_error(
        "/[a-z/g",
        "Parsing error at position 7: Unbalanced delimiter, expected ']'",
    );
    assert_parse_error("/a{3,1}/", "Parsing error at position 6: Malformed quantifier");
    assert_parse_error("/+/", "Parsing error at position 1: Malformed quantifier");
    assert_parse_error("/a/ii", "Parsing error at position 4: Duplicate flag: i");
    assert_parse_error(r"/\e/", "Parsing error at position 1: Unrecognized escape: \\e");
    assert_parse_error(r"/\xZZ/", "Parsing error at position 3: Invalid hex escape");
    assert_parse_error(
        r"/\u{FFFFFF}/",
        "Parsing error at position 2: Invalid codepoint for hex or unicode escape",
    );
    assert_parse_error(
        "a",
        "Parsing error at position 0: General parsing error: expected '/'",
    );
}

#[test]
fn errors_are_values() {
    let err = regex_cst::parse("/(/").unwrap_err();
    assert_eq!(err.kind(), &ParseError::UnbalancedDelimiter(')'));
    let boxed: Box<dyn std::error::Error> = Box::new(err.clone());
    assert_eq!(boxed.to_string(), err.to_string());
}

#[cfg_attr(feature = "track_caller", track_caller)]
fn assert_parse_error(pattern: &str, expected_message: &str) {
    let result = regex_cst::parse(pattern);
    assert!(
        result.is_err(),
        "Expected pattern '{}' to fail parsing",
        pattern
    );
    let error_message = result.unwrap_err().to_string();
    assert_eq!(
        error_message, expected_message,
        "Expected error message '{}', but got: '{}'",
        expected_message, error_message
    );
}
