//! Template parser unit tests: syntax (parse success/failure) and
//! semantics (field kinds, length references, slack validation).

use wiretpl::template::array_base;
use wiretpl::{parse, FieldKind, ParseError};

// ==================== Syntax: valid templates ====================

#[test]
fn parse_single_hex_field() {
    let t = parse("hdr=cafe01").expect("parse");
    assert_eq!(t.len(), 1);
    assert_eq!(t.fields()[0].name, "hdr");
    assert_eq!(
        t.fields()[0].kind,
        FieldKind::Hex(vec![0xca, 0xfe, 0x01])
    );
}

#[test]
fn parse_comma_separated_entries() {
    let t = parse("a=01,b=02").expect("parse");
    assert_eq!(t.len(), 2);
    assert_eq!(t.fields()[0].name, "a");
    assert_eq!(t.fields()[1].name, "b");
}

#[test]
fn parse_crlf_lines() {
    let t = parse("a=01\r\nb=02\r\n").expect("parse");
    assert_eq!(t.len(), 2);
}

#[test]
fn parse_bare_lf_lines() {
    let t = parse("a=01\nb=02\n").expect("parse");
    assert_eq!(t.len(), 2);
}

#[test]
fn parse_blank_lines_skipped() {
    let t = parse("\r\na=01\r\n\r\nb=02\r\n\r\n").expect("parse");
    assert_eq!(t.len(), 2);
}

#[test]
fn parse_text_field() {
    let t = parse("code=OK").expect("parse");
    assert_eq!(t.fields()[0].kind, FieldKind::Text("OK".to_string()));
    assert_eq!(t.fields()[0].static_width(), Some(2));
}

#[test]
fn parse_odd_hex_run_is_text() {
    // "1" is a hex digit but an odd run; it is the text "1", one byte wide.
    let t = parse("id0=1").expect("parse");
    assert_eq!(t.fields()[0].kind, FieldKind::Text("1".to_string()));
}

#[test]
fn parse_mixed_case_hex_literal() {
    let t = parse("a=CAfe").expect("parse");
    assert_eq!(t.fields()[0].kind, FieldKind::Hex(vec![0xca, 0xfe]));
}

#[test]
fn parse_wildcard_field() {
    let t = parse("a=01,w=,b=02").expect("parse");
    assert!(t.fields()[1].is_wildcard());
    assert_eq!(t.fields()[1].raw, "");
    assert_eq!(t.fields()[1].static_width(), None);
}

#[test]
fn parse_length_default_width() {
    let t = parse("n=len(body),body=0102").expect("parse");
    assert_eq!(
        t.fields()[0].kind,
        FieldKind::Length {
            of: "body".to_string(),
            width: 2
        }
    );
    assert_eq!(t.length_target(0), Some(1));
    assert_eq!(t.length_source(1), Some(0));
}

#[test]
fn parse_length_explicit_width() {
    let t = parse("n=len(body, 4),body=").expect("parse");
    assert_eq!(
        t.fields()[0].kind,
        FieldKind::Length {
            of: "body".to_string(),
            width: 4
        }
    );
}

#[test]
fn parse_spaces_around_equals_tolerated() {
    let t = parse("a = 01").expect("parse");
    assert_eq!(t.fields()[0].name, "a");
    assert_eq!(t.fields()[0].kind, FieldKind::Hex(vec![0x01]));
}

#[test]
fn parse_array_sibling_names_stay_distinct() {
    let t = parse("id0=1,id1=2").expect("parse");
    assert_eq!(t.len(), 2);
    assert_eq!(t.index_of("id0"), Some(0));
    assert_eq!(t.index_of("id1"), Some(1));
    assert_eq!(t.index_of("id"), None);
}

#[test]
fn parse_punctuation_value_is_text() {
    let t = parse("v=a-b_c").expect("parse");
    assert_eq!(t.fields()[0].kind, FieldKind::Text("a-b_c".to_string()));
}

// ==================== Syntax: invalid templates ====================

#[test]
fn parse_empty_fails() {
    assert_eq!(parse(""), Err(ParseError::Empty));
}

#[test]
fn parse_whitespace_only_fails() {
    assert_eq!(parse("  \r\n\t\n"), Err(ParseError::Empty));
}

#[test]
fn parse_missing_equals_fails() {
    let r = parse("just-a-name\r\n");
    assert!(matches!(r, Err(ParseError::Syntax(_))), "{:?}", r);
}

#[test]
fn parse_missing_name_fails() {
    let r = parse("=01\r\n");
    assert!(matches!(r, Err(ParseError::Syntax(_))), "{:?}", r);
}

#[test]
fn parse_junk_after_length_value_fails() {
    let r = parse("n=len(body)xx,body=01");
    assert!(matches!(r, Err(ParseError::Syntax(_))), "{:?}", r);
}

// ==================== Semantics: validation ====================

#[test]
fn duplicate_name_fails() {
    assert_eq!(
        parse("a=01,a=02"),
        Err(ParseError::DuplicateName("a".to_string()))
    );
}

#[test]
fn length_unknown_target_fails() {
    assert_eq!(
        parse("n=len(missing),body=01"),
        Err(ParseError::UnknownLengthTarget {
            field: "n".to_string(),
            target: "missing".to_string()
        })
    );
}

#[test]
fn length_target_before_length_field_fails() {
    assert_eq!(
        parse("body=01,n=len(body)"),
        Err(ParseError::LengthTargetOrder {
            field: "n".to_string(),
            target: "body".to_string()
        })
    );
}

#[test]
fn length_self_reference_fails() {
    assert_eq!(
        parse("n=len(n)"),
        Err(ParseError::LengthTargetOrder {
            field: "n".to_string(),
            target: "n".to_string()
        })
    );
}

#[test]
fn duplicate_length_target_fails() {
    assert_eq!(
        parse("m=len(x),n=len(x),x="),
        Err(ParseError::DuplicateLengthTarget {
            field: "n".to_string(),
            target: "x".to_string()
        })
    );
}

#[test]
fn length_bad_width_fails() {
    assert_eq!(
        parse("n=len(body,3),body="),
        Err(ParseError::BadLengthWidth {
            field: "n".to_string(),
            width: 3
        })
    );
}

#[test]
fn two_slack_wildcards_fail() {
    assert_eq!(
        parse("a=,b="),
        Err(ParseError::MultipleUnsized {
            field: "b".to_string()
        })
    );
}

#[test]
fn sized_wildcard_after_slack_fails() {
    let r = parse("a=,n=len(b),b=");
    assert_eq!(
        r,
        Err(ParseError::UnsizedNotLast {
            field: "b".to_string()
        })
    );
}

#[test]
fn slack_wildcard_with_fixed_tail_is_fine() {
    let t = parse("a=,b=02").expect("parse");
    assert!(t.fields()[0].is_wildcard());
    assert_eq!(t.length_source(0), None);
}

#[test]
fn length_sourced_wildcard_plus_trailing_slack_is_fine() {
    // b is sized by n; tail takes the slack.
    let t = parse("n=len(b),b=,tail=").expect("parse");
    assert_eq!(t.length_source(1), Some(0));
    assert_eq!(t.length_source(2), None);
}

// ==================== Helpers ====================

#[test]
fn array_base_splits_suffix() {
    assert_eq!(array_base("id0"), ("id", Some(0)));
    assert_eq!(array_base("id12"), ("id", Some(12)));
    assert_eq!(array_base("id"), ("id", None));
    // all-digit names have no base to split off
    assert_eq!(array_base("42"), ("42", None));
}
