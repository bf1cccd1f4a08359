// Integration tests for content-assist parses

use cactus::ast::{NodeKind, Role};
use cactus::{parse, ParseOptions};
use text_size::TextRange;

#[test]
fn test_identifier_prefix_at_end_of_input() {
    let source = "int foo; void f() { fo";
    let options = ParseOptions::new().with_completion_offset(source.len() as u32);
    let output = parse(source, &options).unwrap();

    let completion = output.completion.expect("no completion node");
    assert_eq!(completion.prefix, "fo");
    assert_eq!(completion.range, TextRange::new(20.into(), 22.into()));
    assert_eq!(completion.names.len(), 1);

    let name = completion.names[0];
    assert_eq!(output.ast.name_text(name), Some("fo"));
    let id_expr = output.ast.parent(name).unwrap();
    assert_eq!(*output.ast.kind(id_expr), NodeKind::IdExpression);
}

#[test]
fn test_member_completion_after_dot() {
    let source = "struct S { int len; } s; void f() { s.";
    let options = ParseOptions::new().with_completion_offset(source.len() as u32);
    let output = parse(source, &options).unwrap();

    let completion = output.completion.expect("no completion node");
    assert_eq!(completion.prefix, "");
    let name = completion.names[0];
    assert_eq!(output.ast.role(name), Role::FieldName);
    let owner = output.ast.parent(name).unwrap();
    assert_eq!(
        *output.ast.kind(owner),
        NodeKind::FieldReference { is_pointer: false }
    );
}

#[test]
fn test_cursor_inside_identifier_truncates_it() {
    let source = "int value; int y = value + 1;";
    let options = ParseOptions::new().with_completion_offset(21u32);
    let output = parse(source, &options).unwrap();

    let completion = output.completion.expect("no completion node");
    assert_eq!(completion.prefix, "va");
    assert_eq!(completion.range, TextRange::new(19.into(), 21.into()));
    assert_eq!(completion.names.len(), 1);

    let unit = output.translation_unit.unwrap();
    assert_eq!(output.ast.children_with(unit, Role::Declaration).count(), 2);
}

#[test]
fn test_plain_parse_has_no_completion() {
    let output = parse("int x;", &ParseOptions::default()).unwrap();
    assert!(output.completion.is_none());
}

#[test]
fn test_cursor_inside_multibyte_character() {
    let source = "void f() { s = \"\u{e9}\"; }";
    let options = ParseOptions::new().with_completion_offset(17u32);
    let output = parse(source, &options).unwrap();

    let completion = output.completion.expect("no completion node");
    assert_eq!(completion.prefix, "");
    assert_eq!(completion.range, TextRange::empty(16.into()));
}
