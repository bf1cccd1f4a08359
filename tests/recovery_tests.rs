// Integration tests for problem nodes and recovery

use cactus::ast::dump::dump;
use cactus::ast::NodeKind;
use cactus::{parse, LexError, ParseOptions};

fn parse_dump(source: &str) -> (String, bool) {
    let output = parse(source, &ParseOptions::default()).expect("lexing failed");
    let unit = output.translation_unit.expect("no translation unit");
    (dump(&output.ast, unit), output.has_error)
}

#[test]
fn test_malformed_statement_keeps_siblings() {
    let (tree, has_error) = parse_dump("void f() { a = 1; x = = 1; b = 2; }");
    expect_test::expect![[r#"
        TranslationUnit 0..35
          Declaration: FunctionDefinition 0..35
            DeclSpecifier: SimpleDeclSpecifier(void) 0..4
            Declarator: FunctionDeclarator 5..8
              Name: Name "f" 5..6
            Body: CompoundStatement 9..35
              Statement: ExpressionStatement 11..17
                Expression: Binary(Assign) 11..16
                  Operand1: IdExpression 11..12
                    Name: Name "a" 11..12
                  Operand2: Literal(Integer) 1 15..16
              Statement: ProblemStatement 18..26
                Problem: Problem(SyntaxError) 18..26
              Statement: ExpressionStatement 27..33
                Expression: Binary(Assign) 27..32
                  Operand1: IdExpression 27..28
                    Name: Name "b" 27..28
                  Operand2: Literal(Integer) 2 31..32
    "#]]
    .assert_eq(&tree);
    assert!(has_error);
}

#[test]
fn test_skip_stops_at_closing_brace_of_block() {
    let (tree, has_error) = parse_dump("void f() { if (x) { y = ; } z(; } int g;");
    assert!(has_error);
    assert!(tree.contains("Statement: ProblemStatement 28..31\n"));
    assert!(tree.contains("Declaration: FunctionDefinition 0..33\n"));
    assert!(tree.contains("Declaration: SimpleDeclaration 34..40\n"));
    assert!(tree.contains("Operand2: ProblemExpression"));
}

#[test]
fn test_skip_over_brace_group_takes_trailing_semicolon() {
    let (tree, has_error) = parse_dump("void f() { x = { 1 }; y; }");
    assert!(has_error);
    assert!(tree.contains("Statement: ProblemStatement 11..21\n"));
    assert!(tree.contains("Statement: ExpressionStatement 22..24\n"));
    assert!(!tree.contains("NullStatement"));
}

#[test]
fn test_stray_closing_brace_at_top_level() {
    let (tree, has_error) = parse_dump("int a; } int b;");
    assert!(has_error);
    assert!(tree.contains("Declaration: ProblemDeclaration 7..8\n"));
    assert_eq!(tree.matches("Declaration: SimpleDeclaration").count(), 2);
}

#[test]
fn test_clean_input_reports_no_error() {
    let (tree, has_error) = parse_dump("int a[3] = { 1, 2, 3 };");
    assert!(!has_error);
    assert!(!tree.contains("Problem"));
}

#[test]
fn test_problem_nodes_cover_skipped_text() {
    let source = "int ok; int (bad; int fine;";
    let output = parse(source, &ParseOptions::default()).unwrap();
    let unit = output.translation_unit.unwrap();

    let problems: Vec<_> = output
        .ast
        .descendants(unit)
        .into_iter()
        .filter(|&id| *output.ast.kind(id) == NodeKind::ProblemDeclaration)
        .collect();
    assert_eq!(problems.len(), 1);
    let range = output.ast.range(problems[0]);
    assert_eq!(&source[range], "int (bad; int fine;");
}

#[test]
fn test_unlexable_input_is_an_error() {
    let result = parse("int x = @;", &ParseOptions::default());
    assert!(matches!(
        result,
        Err(LexError::UnexpectedChar { ch: '@', line: 1, column: 9 })
    ));
}
