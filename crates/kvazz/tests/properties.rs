//! Property-style arithmetic/identity checks from the testable-properties
//! section, written as ordinary assertions over representative inputs
//! rather than a full property-testing framework.

use kvazz::{run_source, CollectPrint};

fn run(src: &str) -> Vec<String> {
    let mut out = CollectPrint::new();
    run_source(src, &mut out).unwrap();
    out.lines
}

#[test]
fn int_arithmetic_identities() {
    let src = "function main() { \
        var a = 7; var b = 3; var c = -2; \
        print(a + 0 == a); \
        print(a * 1 == a); \
        print(a - a == 0); \
        print((a + b) + c == a + (b + c)); \
    }";
    assert_eq!(run(src), vec!["true", "true", "true", "true"]);
}

#[test]
fn string_concat_identity() {
    let src = r#"function main() { var s = "abc"; print("" + s == s); print(s + "" == s); }"#;
    assert_eq!(run(src), vec!["true", "true"]);
}

#[test]
fn vector_concat_length_is_additive() {
    let src = "function main() { var u = [1, 2]; var v = [3, 4, 5]; print(lengthof(u + v) == lengthof(u) + lengthof(v)); }";
    assert_eq!(run(src), vec!["true"]);
}

#[test]
fn equality_is_reflexive_and_cross_numeric() {
    let src = "function main() { \
        print(1 == 1); \
        print(1.5 == 1.5); \
        print(true == true); \
        print(\"x\" == \"x\"); \
        print([1, [2, 3]] == [1, [2, 3]]); \
        print(2 == 2.0); \
    }";
    assert_eq!(run(src), vec!["true", "true", "true", "true", "true", "true"]);
}

#[test]
fn boolean_negation() {
    let src = "function main() { print(!true == false); print(!false == true); }";
    assert_eq!(run(src), vec!["true", "true"]);
}

#[test]
fn operator_precedence_and_logical_combination() {
    let src = "function main() { print(1 + 2 * 3 == 7); print((1 + 2) * 3 == 9); print(1 < 2 & 2 < 3 == true); }";
    assert_eq!(run(src), vec!["true", "true", "true"]);
}
