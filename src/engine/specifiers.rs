//! Declaration-specifier folding and struct/union/enum type specifiers.
//!
//! Specifier keywords arrive as tokens in one scope. The closing action folds
//! them in order onto a single specifier node; a struct, union or enum type
//! built inside the scope becomes the node that receives the flags.

use crate::ast::{
    BasicType, CompositeKey, DeclSpec, ElaboratedKind, NodeId, NodeKind, Role, StorageClass,
};
use crate::tokens::{Token, TokenKind};

use super::{Engine, Item};

/// Applies one specifier keyword to `spec`. Non-specifier kinds are ignored.
pub(crate) fn fold_specifier(spec: &mut DeclSpec, kind: TokenKind) {
    match kind {
        TokenKind::Typedef => spec.storage = StorageClass::Typedef,
        TokenKind::Extern => spec.storage = StorageClass::Extern,
        TokenKind::Static => spec.storage = StorageClass::Static,
        TokenKind::Auto => spec.storage = StorageClass::Auto,
        TokenKind::Register => spec.storage = StorageClass::Register,

        TokenKind::Inline => spec.is_inline = true,

        TokenKind::Const => spec.qualifiers.is_const = true,
        TokenKind::Volatile => spec.qualifiers.is_volatile = true,
        TokenKind::Restrict => spec.qualifiers.is_restrict = true,

        TokenKind::Void => spec.basic = BasicType::Void,
        TokenKind::Char => spec.basic = BasicType::Char,
        TokenKind::Int => spec.basic = BasicType::Int,
        TokenKind::Float => spec.basic = BasicType::Float,
        TokenKind::Double => spec.basic = BasicType::Double,
        TokenKind::Bool => spec.basic = BasicType::Bool,

        TokenKind::Signed => spec.is_signed = true,
        TokenKind::Unsigned => spec.is_unsigned = true,
        TokenKind::Short => spec.is_short = true,
        TokenKind::Long => {
            if spec.is_long {
                spec.is_long = false;
                spec.is_long_long = true;
            } else {
                spec.is_long = true;
            }
        }
        TokenKind::Complex => spec.is_complex = true,
        TokenKind::Imaginary => spec.is_imaginary = true,
        _ => {}
    }
}

impl<'a> Engine<'a> {
    /// Keyword-only specifiers such as `static const unsigned long`.
    pub fn consume_declaration_specifiers_simple(&mut self) {
        let tokens = self.close_scope_tokens();
        let node = self.factory.new_simple_decl_specifier(&mut self.ast);
        self.fold_tokens(node, &tokens);
        self.set_rule_range(node);
        self.push(node);
    }

    /// Specifiers containing a struct, union or enum type.
    pub fn consume_declaration_specifiers_struct_union_enum(&mut self) {
        let mut base = None;
        let mut tokens = Vec::new();
        for item in self.close_scope() {
            match item {
                Item::Node(id) if base.is_none() => base = Some(id),
                Item::Token(token) => tokens.push(token),
                other => panic!("unexpected {other:?} in struct/union/enum specifiers"),
            }
        }
        let node = base.unwrap_or_else(|| panic!("struct/union/enum specifiers without a type"));
        let node = self.narrow(node, "declaration specifier", NodeKind::is_decl_specifier);
        self.fold_tokens(node, &tokens);
        self.set_rule_range(node);
        self.push(node);
    }

    /// Specifiers naming a typedef: the one identifier token becomes the
    /// specifier's name.
    pub fn consume_declaration_specifiers_typedef_name(&mut self) {
        let tokens = self.close_scope_tokens();
        let node = self.factory.new_named_type_specifier(&mut self.ast);
        let mut keywords = Vec::with_capacity(tokens.len());
        for token in tokens {
            if self.token_kind(token) == TokenKind::Identifier
                && self.ast.child(node, Role::Name).is_none()
            {
                let name = self.create_name(token);
                self.ast.attach(node, name, Role::Name);
            } else {
                keywords.push(token);
            }
        }
        self.fold_tokens(node, &keywords);
        self.set_rule_range(node);
        self.push(node);
    }

    /// `struct|union name? { member-declarations }`; the member scope sits
    /// above the optional name.
    pub fn consume_type_specifier_composite(&mut self, has_name: bool) {
        let members = self.close_scope_nodes();
        let name = has_name.then(|| self.pop_name());
        let key = match self.token_kind(self.rule_token(0)) {
            TokenKind::Union => CompositeKey::Union,
            _ => CompositeKey::Struct,
        };
        let node = self.factory.new_composite_type_specifier(&mut self.ast, key);
        self.link(node, name, Role::Name);
        for member in members {
            let member = self.narrow(member, "member declaration", NodeKind::is_declaration);
            self.ast.attach(node, member, Role::Member);
        }
        self.set_rule_range(node);
        self.push(node);
    }

    /// `struct|union|enum name`
    pub fn consume_type_specifier_elaborated(&mut self, kind: ElaboratedKind) {
        let name = self.pop_name();
        let node = self.factory.new_elaborated_type_specifier(&mut self.ast, kind);
        self.ast.attach(node, name, Role::Name);
        self.set_rule_range(node);
        self.push(node);
    }

    /// `enum name? { enumerators }`
    pub fn consume_type_specifier_enumeration(&mut self, has_name: bool) {
        let enumerators = self.close_scope_nodes();
        let name = has_name.then(|| self.pop_name());
        let node = self.factory.new_enumeration_specifier(&mut self.ast);
        self.link(node, name, Role::Name);
        for enumerator in enumerators {
            let enumerator = self.narrow(enumerator, "enumerator", |kind| {
                *kind == NodeKind::Enumerator
            });
            self.ast.attach(node, enumerator, Role::Enumerator);
        }
        self.set_rule_range(node);
        self.push(node);
    }

    /// `name` or `name = constant-expression`, with the name as the
    /// leftmost token.
    pub fn consume_enumerator(&mut self, has_initializer: bool) {
        let value = has_initializer.then(|| self.pop_expression());
        let name = self.create_name(self.rule_token(0));
        let node = self.factory.new_enumerator(&mut self.ast);
        self.ast.attach(node, name, Role::Name);
        self.link(node, value, Role::Value);
        self.set_rule_range(node);
        self.push(node);
    }

    fn close_scope_tokens(&mut self) -> Vec<&'a Token> {
        self.close_scope()
            .into_iter()
            .map(|item| match item {
                Item::Token(token) => token,
                other => panic!("expected only specifier tokens, found {other:?}"),
            })
            .collect()
    }

    fn fold_tokens(&mut self, node: NodeId, tokens: &[&'a Token]) {
        let kinds: Vec<TokenKind> = tokens.iter().map(|token| self.token_kind(token)).collect();
        if let Some(spec) = self.ast[node].kind.decl_spec_mut() {
            for kind in kinds {
                fold_specifier(spec, kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::token;
    use super::super::Reduction;
    use super::*;
    use crate::factory::DefaultNodeFactory;
    use crate::tokens::KindMap;

    #[test]
    fn test_fold_long_long() {
        let mut spec = DeclSpec::default();
        for kind in [TokenKind::Unsigned, TokenKind::Long, TokenKind::Long, TokenKind::Int] {
            fold_specifier(&mut spec, kind);
        }
        assert!(spec.is_unsigned);
        assert!(spec.is_long_long);
        assert!(!spec.is_long);
        assert_eq!(spec.basic, BasicType::Int);
    }

    #[test]
    fn test_simple_specifiers_from_scope() {
        let kinds = KindMap::identity();
        let tokens = vec![
            token(TokenKind::Static, "static", 0),
            token(TokenKind::Const, "const", 7),
            token(TokenKind::Char, "char", 13),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        for index in 0..tokens.len() {
            engine.begin_rule(Reduction::over(&tokens[index..index + 1]).unwrap());
            engine.consume_token();
        }
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_declaration_specifiers_simple();

        let Some(Item::Node(node)) = engine.stack.pop() else {
            panic!("no specifier");
        };
        let spec = engine.ast().kind(node).decl_spec().copied().unwrap();
        assert_eq!(spec.storage, StorageClass::Static);
        assert!(spec.qualifiers.is_const);
        assert_eq!(spec.basic, BasicType::Char);
        assert_eq!(u32::from(engine.ast().range(node).end()), 17);
    }

    #[test]
    fn test_typedef_name_gets_name_child() {
        let kinds = KindMap::identity();
        let tokens = vec![
            token(TokenKind::Const, "const", 0),
            token(TokenKind::Identifier, "size_t", 6),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        for index in 0..tokens.len() {
            engine.begin_rule(Reduction::over(&tokens[index..index + 1]).unwrap());
            engine.consume_token();
        }
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_declaration_specifiers_typedef_name();

        let Some(Item::Node(node)) = engine.stack.pop() else {
            panic!("no specifier");
        };
        let name = engine.ast().child(node, Role::Name).unwrap();
        assert_eq!(engine.ast().name_text(name), Some("size_t"));
        assert!(engine.ast().kind(node).decl_spec().unwrap().qualifiers.is_const);
    }
}
