use crate::ast::{BinaryOp, LiteralKind, NodeId, NodeKind, Role, UnaryOp};

use super::Engine;

impl<'a> Engine<'a> {
    /// One literal token, or adjacent string literals joined by a space.
    pub fn consume_expression_literal(&mut self, kind: LiteralKind) {
        let text = match self.rule_tokens {
            [] | [_] => self.rule_right().text.clone(),
            tokens => tokens
                .iter()
                .map(|token| token.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        };
        let literal = self.factory.new_literal(&mut self.ast, kind, &text);
        self.set_rule_range(literal);
        self.push(literal);
    }

    /// Identifier used as a primary expression.
    pub fn consume_expression_id(&mut self) {
        let name = self.create_name(self.rule_right());
        let expr = self.factory.new_id_expression(&mut self.ast);
        self.ast.attach(expr, name, Role::Name);
        self.set_rule_range(expr);
        self.push(expr);
    }

    /// `( expression )`
    pub fn consume_expression_bracketed(&mut self) {
        self.consume_expression_unary(UnaryOp::Bracketed);
    }

    pub fn consume_expression_array_subscript(&mut self) {
        let subscript = self.pop_expression();
        let array = self.pop_expression();
        let expr = self.factory.new_array_subscript(&mut self.ast);
        self.ast.attach(expr, array, Role::Array);
        self.ast.attach(expr, subscript, Role::Subscript);
        self.set_rule_range(expr);
        self.push(expr);
    }

    /// `f()` or `f(args)`; several arguments arrive as one expression list.
    pub fn consume_expression_function_call(&mut self, has_args: bool) {
        let args = has_args.then(|| self.pop_expression());
        let function = self.pop_expression();
        let expr = self.factory.new_function_call(&mut self.ast);
        self.ast.attach(expr, function, Role::FunctionName);
        self.link(expr, args, Role::Argument);
        self.set_rule_range(expr);
        self.push(expr);
    }

    /// `owner.field` or `owner->field`, with the field name as the rightmost token.
    pub fn consume_expression_field_reference(&mut self, is_pointer: bool) {
        let field = self.create_name(self.rule_right());
        let owner = self.pop_expression();
        let expr = self.factory.new_field_reference(&mut self.ast, is_pointer);
        self.ast.attach(expr, owner, Role::FieldOwner);
        self.ast.attach(expr, field, Role::FieldName);
        self.set_rule_range(expr);
        self.push(expr);
    }

    pub fn consume_expression_unary(&mut self, op: UnaryOp) {
        let operand = self.pop_expression();
        let expr = self.factory.new_unary(&mut self.ast, op);
        self.ast.attach(expr, operand, Role::Operand);
        self.set_rule_range(expr);
        self.push(expr);
    }

    pub fn consume_expression_binary(&mut self, op: BinaryOp) {
        let rhs = self.pop_expression();
        let lhs = self.pop_expression();
        let expr = self.factory.new_binary(&mut self.ast, op);
        self.ast.attach(expr, lhs, Role::Operand1);
        self.ast.attach(expr, rhs, Role::Operand2);
        self.set_rule_range(expr);
        self.push(expr);
    }

    /// `condition ? positive : negative`
    pub fn consume_expression_conditional(&mut self) {
        let negative = self.pop_expression();
        let positive = self.pop_expression();
        let condition = self.pop_expression();
        let expr = self.factory.new_conditional(&mut self.ast);
        self.ast.attach(expr, condition, Role::Condition);
        self.ast.attach(expr, positive, Role::Positive);
        self.ast.attach(expr, negative, Role::Negative);
        self.set_rule_range(expr);
        self.push(expr);
    }

    /// Closes a comma-separated scope. A single expression is pushed back
    /// unchanged; more become one expression list.
    pub fn consume_expression_list(&mut self) {
        let items: Vec<NodeId> = self
            .close_scope_nodes()
            .into_iter()
            .map(|item| self.narrow(item, "expression", NodeKind::is_expression))
            .collect();
        if let [single] = items[..] {
            self.push(single);
            return;
        }
        let list = self.factory.new_expression_list(&mut self.ast);
        for item in items {
            self.ast.attach(list, item, Role::Expression);
        }
        self.set_rule_range(list);
        self.push(list);
    }

    /// `sizeof ( type-name )`
    pub fn consume_expression_sizeof_type_id(&mut self) {
        let type_id = self.pop_type_id();
        let expr = self.factory.new_sizeof_type_id(&mut self.ast);
        self.ast.attach(expr, type_id, Role::TypeId);
        self.set_rule_range(expr);

        let expr = self.resolve_sizeof_ambiguity(expr);
        self.push(expr);
    }

    /// `( type-name ) operand`
    pub fn consume_expression_cast(&mut self) {
        let operand = self.pop_expression();
        let type_id = self.pop_type_id();
        let expr = self.factory.new_cast(&mut self.ast);
        self.ast.attach(expr, type_id, Role::TypeId);
        self.ast.attach(expr, operand, Role::Operand);
        self.set_rule_range(expr);

        let expr = self.resolve_cast_ambiguity(expr, type_id, operand);
        self.push(expr);
    }

    /// Compound literal `( type-name ) { initializers }`
    pub fn consume_expression_type_id_initializer_list(&mut self) {
        let initializer = self.pop_initializer();
        let type_id = self.pop_type_id();
        let expr = self.factory.new_type_id_initializer(&mut self.ast);
        self.ast.attach(expr, type_id, Role::TypeId);
        self.ast.attach(expr, initializer, Role::Initializer);
        self.set_rule_range(expr);
        self.push(expr);
    }
}
