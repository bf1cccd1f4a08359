use crate::ast::{NodeId, NodeKind, Role};

use super::Engine;

impl<'a> Engine<'a> {
    /// Expression initializer `= expression`.
    pub fn consume_initializer(&mut self) {
        let expr = self.pop_expression();
        let initializer = self.factory.new_equals_initializer(&mut self.ast);
        self.ast.attach(initializer, expr, Role::Expression);
        self.set_rule_range(initializer);
        self.push(initializer);
    }

    /// `{ initializer, ... }`
    pub fn consume_initializer_list(&mut self) {
        let items = self.close_scope_nodes();
        let list = self.factory.new_initializer_list(&mut self.ast);
        for item in items {
            let item = self.narrow(item, "initializer", NodeKind::is_initializer);
            self.ast.attach(list, item, Role::Initializer);
        }
        self.set_rule_range(list);
        self.push(list);
    }

    /// `designator-list = initializer`; the designators sit in their own
    /// scope below the initializer.
    pub fn consume_initializer_designated(&mut self) {
        let operand = self.pop_initializer();
        let designators = self.close_scope_nodes();
        let node = self.factory.new_designated_initializer(&mut self.ast);
        for designator in designators {
            let designator = self.narrow(designator, "designator", |kind| {
                matches!(kind, NodeKind::FieldDesignator | NodeKind::ArrayDesignator)
            });
            self.ast.attach(node, designator, Role::Designator);
        }
        self.ast.attach(node, operand, Role::Initializer);
        self.set_rule_range(node);
        self.push(node);
    }

    /// `. identifier`
    pub fn consume_designator_field(&mut self) {
        let name = self.create_name(self.rule_right());
        let designator = self.factory.new_field_designator(&mut self.ast);
        self.ast.attach(designator, name, Role::Name);
        self.set_rule_range(designator);
        self.push(designator);
    }

    /// `[ constant-expression ]`
    pub fn consume_designator_array(&mut self) {
        let subscript = self.pop_expression();
        let designator = self.factory.new_array_designator(&mut self.ast);
        self.ast.attach(designator, subscript, Role::Subscript);
        self.set_rule_range(designator);
        self.push(designator);
    }

    pub fn consume_parameter_declaration(&mut self) {
        let declarator = self.pop_declarator();
        let decl_spec = self.pop_decl_specifier();
        let parameter = self.factory.new_parameter_declaration(&mut self.ast);
        self.ast.attach(parameter, decl_spec, Role::DeclSpecifier);
        self.ast.attach(parameter, declarator, Role::Declarator);
        self.set_rule_range(parameter);
        self.push(parameter);
    }

    pub fn consume_parameter_declaration_without_declarator(&mut self) {
        let decl_spec = self.pop_decl_specifier();
        let parameter = self.factory.new_parameter_declaration(&mut self.ast);
        self.ast.attach(parameter, decl_spec, Role::DeclSpecifier);
        self.set_rule_range(parameter);
        self.push(parameter);
    }

    /// `specifiers init-declarator-list? ;`; the declarators, when present,
    /// close their own scope.
    pub fn consume_declaration_simple(&mut self, has_declarators: bool) {
        let declarators = if has_declarators {
            self.close_scope_nodes()
        } else {
            Vec::new()
        };
        let decl_spec = self.pop_decl_specifier();
        let declaration = self.factory.new_simple_declaration(&mut self.ast);
        self.ast.attach(declaration, decl_spec, Role::DeclSpecifier);
        for declarator in declarators {
            let declarator = self.narrow(declarator, "declarator", NodeKind::is_declarator);
            self.ast.attach(declaration, declarator, Role::Declarator);
        }
        self.set_rule_range(declaration);
        self.push(declaration);
    }

    /// A lone `;` at file scope.
    pub fn consume_declaration_empty(&mut self) {
        let decl_spec = self.factory.new_simple_decl_specifier(&mut self.ast);
        let declaration = self.factory.new_simple_declaration(&mut self.ast);
        self.set_rule_range(decl_spec);
        self.ast.attach(declaration, decl_spec, Role::DeclSpecifier);
        self.set_rule_range(declaration);
        self.push(declaration);
    }

    /// `specifiers? declarator compound-statement`. Without specifiers an
    /// empty simple specifier stands in for the implicit `int`.
    pub fn consume_function_definition(&mut self, has_specifiers: bool) {
        let body = self.pop_statement();
        let declarator = self.pop_declarator();
        let decl_spec = if has_specifiers {
            Some(self.pop_decl_specifier())
        } else {
            None
        };
        self.build_function_definition(decl_spec, declarator, body);
    }

    /// `specifiers? knr-declarator declaration-list compound-statement`.
    ///
    /// The specifiers slot is a node or an empty placeholder; the
    /// declaration list is a scope. Its declarations become children of the
    /// K&R declarator.
    pub fn consume_function_definition_knr(&mut self) {
        let body = self.pop_statement();
        let declarations = self.close_scope_nodes();
        let declarator = self.pop_declarator();
        for declaration in declarations {
            let declaration = self.narrow(declaration, "declaration", NodeKind::is_declaration);
            self.ast
                .attach(declarator, declaration, Role::KnrParameterDeclaration);
        }
        let decl_spec = self.pop_optional();
        let decl_spec =
            decl_spec.map(|id| self.narrow(id, "declaration specifier", NodeKind::is_decl_specifier));
        self.build_function_definition(decl_spec, declarator, body);
    }

    fn build_function_definition(
        &mut self,
        decl_spec: Option<NodeId>,
        declarator: NodeId,
        body: NodeId,
    ) {
        let decl_spec = decl_spec.unwrap_or_else(|| {
            let implicit = self.factory.new_simple_decl_specifier(&mut self.ast);
            let start = self.rule_range.start();
            self.set_span(implicit, start, start);
            implicit
        });
        let definition = self.factory.new_function_definition(&mut self.ast);
        self.ast.attach(definition, decl_spec, Role::DeclSpecifier);
        self.ast.attach(definition, declarator, Role::Declarator);
        self.ast.attach(definition, body, Role::Body);
        self.set_rule_range(definition);
        self.push(definition);
    }
}
