//! Node creation, one operation per node variant
//!
//! Every method allocates a fresh node in the arena and returns it unlinked
//! with an empty range. The engine never builds a node any other way, so a
//! front end that wants different node payloads overrides the matching
//! methods and keeps the rest.
//!
//! ```
//! use cactus::ast::{Ast, NodeId, NodeKind};
//! use cactus::factory::NodeFactory;
//!
//! /// Lower-cases every name it builds.
//! struct FoldingFactory;
//!
//! impl NodeFactory for FoldingFactory {
//!     fn new_name(&self, ast: &mut Ast, text: &str) -> NodeId {
//!         ast.alloc(NodeKind::Name { text: text.to_lowercase() })
//!     }
//! }
//! ```

use crate::ast::{
    Ast, BinaryOp, CompositeKey, DeclSpec, ElaboratedKind, LiteralKind, NodeId, NodeKind,
    ProblemId, Qualifiers, UnaryOp,
};

pub trait NodeFactory: Sync {
    fn new_translation_unit(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::TranslationUnit)
    }

    fn new_name(&self, ast: &mut Ast, text: &str) -> NodeId {
        ast.alloc(NodeKind::Name { text: text.to_string() })
    }

    fn new_comment(&self, ast: &mut Ast, text: &str, is_block: bool) -> NodeId {
        ast.alloc(NodeKind::Comment {
            text: text.to_string(),
            is_block,
        })
    }

    fn new_problem(&self, ast: &mut Ast, id: ProblemId) -> NodeId {
        ast.alloc(NodeKind::Problem { id })
    }

    fn new_problem_declaration(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ProblemDeclaration)
    }

    fn new_problem_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ProblemStatement)
    }

    fn new_problem_expression(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ProblemExpression)
    }

    // Expressions

    fn new_literal(&self, ast: &mut Ast, kind: LiteralKind, text: &str) -> NodeId {
        ast.alloc(NodeKind::Literal {
            kind,
            text: text.to_string(),
        })
    }

    fn new_id_expression(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::IdExpression)
    }

    fn new_unary(&self, ast: &mut Ast, op: UnaryOp) -> NodeId {
        ast.alloc(NodeKind::Unary { op })
    }

    fn new_binary(&self, ast: &mut Ast, op: BinaryOp) -> NodeId {
        ast.alloc(NodeKind::Binary { op })
    }

    fn new_conditional(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::Conditional)
    }

    fn new_cast(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::Cast)
    }

    fn new_sizeof_type_id(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::SizeofTypeId)
    }

    fn new_array_subscript(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ArraySubscript)
    }

    fn new_function_call(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::FunctionCall)
    }

    fn new_field_reference(&self, ast: &mut Ast, is_pointer: bool) -> NodeId {
        ast.alloc(NodeKind::FieldReference { is_pointer })
    }

    fn new_expression_list(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ExpressionList)
    }

    fn new_type_id_initializer(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::TypeIdInitializer)
    }

    fn new_ambiguous(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::Ambiguous)
    }

    // Type ids and declarators

    fn new_type_id(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::TypeId)
    }

    fn new_declarator(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::Declarator)
    }

    fn new_array_declarator(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ArrayDeclarator)
    }

    fn new_function_declarator(&self, ast: &mut Ast, var_args: bool) -> NodeId {
        ast.alloc(NodeKind::FunctionDeclarator { var_args })
    }

    fn new_knr_function_declarator(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::KnrFunctionDeclarator)
    }

    fn new_field_declarator(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::FieldDeclarator)
    }

    fn new_pointer(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::Pointer {
            qualifiers: Qualifiers::default(),
        })
    }

    fn new_array_modifier(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ArrayModifier {
            qualifiers: Qualifiers::default(),
            is_static: false,
            is_var_sized: false,
        })
    }

    // Declaration specifiers

    fn new_simple_decl_specifier(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::SimpleDeclSpecifier(DeclSpec::default()))
    }

    fn new_named_type_specifier(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::NamedTypeSpecifier(DeclSpec::default()))
    }

    fn new_composite_type_specifier(&self, ast: &mut Ast, key: CompositeKey) -> NodeId {
        ast.alloc(NodeKind::CompositeTypeSpecifier {
            key,
            spec: DeclSpec::default(),
        })
    }

    fn new_elaborated_type_specifier(&self, ast: &mut Ast, kind: ElaboratedKind) -> NodeId {
        ast.alloc(NodeKind::ElaboratedTypeSpecifier {
            kind,
            spec: DeclSpec::default(),
        })
    }

    fn new_enumeration_specifier(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::EnumerationSpecifier(DeclSpec::default()))
    }

    fn new_enumerator(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::Enumerator)
    }

    // Initializers

    fn new_equals_initializer(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::EqualsInitializer)
    }

    fn new_initializer_list(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::InitializerList)
    }

    fn new_designated_initializer(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::DesignatedInitializer)
    }

    fn new_field_designator(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::FieldDesignator)
    }

    fn new_array_designator(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ArrayDesignator)
    }

    // Declarations

    fn new_simple_declaration(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::SimpleDeclaration)
    }

    fn new_function_definition(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::FunctionDefinition)
    }

    fn new_parameter_declaration(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ParameterDeclaration)
    }

    // Statements

    fn new_compound_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::CompoundStatement)
    }

    fn new_expression_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ExpressionStatement)
    }

    fn new_declaration_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::DeclarationStatement)
    }

    fn new_null_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::NullStatement)
    }

    fn new_if_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::IfStatement)
    }

    fn new_switch_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::SwitchStatement)
    }

    fn new_while_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::WhileStatement)
    }

    fn new_do_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::DoStatement)
    }

    fn new_for_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ForStatement)
    }

    fn new_break_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::BreakStatement)
    }

    fn new_continue_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ContinueStatement)
    }

    fn new_goto_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::GotoStatement)
    }

    fn new_return_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::ReturnStatement)
    }

    fn new_label_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::LabelStatement)
    }

    fn new_case_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::CaseStatement)
    }

    fn new_default_statement(&self, ast: &mut Ast) -> NodeId {
        ast.alloc(NodeKind::DefaultStatement)
    }
}

/// Factory using every default operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeFactory;

impl NodeFactory for DefaultNodeFactory {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_calls_do_not_alias() {
        let factory = DefaultNodeFactory;
        let mut ast = Ast::new();
        let a = factory.new_name(&mut ast, "x");
        let b = factory.new_name(&mut ast, "x");
        assert_ne!(a, b);
        assert_eq!(ast[a], ast[b]);

        ast.set_range(a, text_size::TextRange::new(1.into(), 2.into()));
        assert!(ast.range(b).is_empty());
    }

    #[test]
    fn test_nodes_start_unlinked() {
        let factory = DefaultNodeFactory;
        let mut ast = Ast::new();
        let statement = factory.new_compound_statement(&mut ast);
        assert_eq!(ast.parent(statement), None);
        assert!(ast.children(statement).is_empty());
        assert_eq!(u32::from(ast.range(statement).len()), 0);
    }

    struct Upper;

    impl NodeFactory for Upper {
        fn new_name(&self, ast: &mut Ast, text: &str) -> NodeId {
            ast.alloc(NodeKind::Name {
                text: text.to_uppercase(),
            })
        }
    }

    #[test]
    fn test_override_one_operation() {
        let mut ast = Ast::new();
        let name = Upper.new_name(&mut ast, "abc");
        assert_eq!(ast.name_text(name), Some("ABC"));
        let other = Upper.new_null_statement(&mut ast);
        assert_eq!(ast.kind(other), &NodeKind::NullStatement);
    }
}
