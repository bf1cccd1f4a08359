// Node kinds and their scalar payloads. Child nodes are never stored in a
// kind; they hang off the arena node with a `Role`.

use std::fmt;

/// Unary operators, including the bracketed-primary pseudo operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    PrefixIncr,
    PrefixDecr,
    Plus,
    Minus,
    Star,
    Amper,
    Tilde,
    Not,
    Sizeof,
    PostfixIncr,
    PostfixDecr,
    Bracketed,
}

/// Binary operators, assignment forms included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    BinaryAnd,
    BinaryXor,
    BinaryOr,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Assign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    PlusAssign,
    MinusAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    BinaryAndAssign,
    BinaryXorAssign,
    BinaryOrAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKey {
    Struct,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElaboratedKind {
    Struct,
    Union,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemId {
    SyntaxError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageClass {
    #[default]
    Unspecified,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BasicType {
    #[default]
    Unspecified,
    Void,
    Char,
    Int,
    Float,
    Double,
    Bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_restrict: bool,
}

impl Qualifiers {
    pub fn is_empty(&self) -> bool {
        !(self.is_const || self.is_volatile || self.is_restrict)
    }
}

/// Flags shared by every declaration-specifier kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclSpec {
    pub storage: StorageClass,
    pub qualifiers: Qualifiers,
    pub is_inline: bool,
    pub basic: BasicType,
    pub is_signed: bool,
    pub is_unsigned: bool,
    pub is_short: bool,
    pub is_long: bool,
    pub is_long_long: bool,
    pub is_complex: bool,
    pub is_imaginary: bool,
}

impl DeclSpec {
    /// True when nothing beyond the type itself was specified.
    pub fn is_bare(&self) -> bool {
        *self == DeclSpec::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit,
    Name { text: String },
    Comment { text: String, is_block: bool },

    Problem { id: ProblemId },
    ProblemDeclaration,
    ProblemStatement,
    ProblemExpression,

    // Expressions
    Literal { kind: LiteralKind, text: String },
    IdExpression,
    Unary { op: UnaryOp },
    Binary { op: BinaryOp },
    Conditional,
    Cast,
    SizeofTypeId,
    ArraySubscript,
    FunctionCall,
    FieldReference { is_pointer: bool },
    ExpressionList,
    TypeIdInitializer,
    Ambiguous,

    // Type ids and declarators
    TypeId,
    Declarator,
    ArrayDeclarator,
    FunctionDeclarator { var_args: bool },
    KnrFunctionDeclarator,
    FieldDeclarator,
    Pointer { qualifiers: Qualifiers },
    ArrayModifier {
        qualifiers: Qualifiers,
        is_static: bool,
        is_var_sized: bool,
    },

    // Declaration specifiers
    SimpleDeclSpecifier(DeclSpec),
    NamedTypeSpecifier(DeclSpec),
    CompositeTypeSpecifier { key: CompositeKey, spec: DeclSpec },
    ElaboratedTypeSpecifier { kind: ElaboratedKind, spec: DeclSpec },
    EnumerationSpecifier(DeclSpec),
    Enumerator,

    // Initializers
    EqualsInitializer,
    InitializerList,
    DesignatedInitializer,
    FieldDesignator,
    ArrayDesignator,

    // Declarations
    SimpleDeclaration,
    FunctionDefinition,
    ParameterDeclaration,

    // Statements
    CompoundStatement,
    ExpressionStatement,
    DeclarationStatement,
    NullStatement,
    IfStatement,
    SwitchStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    BreakStatement,
    ContinueStatement,
    GotoStatement,
    ReturnStatement,
    LabelStatement,
    CaseStatement,
    DefaultStatement,
}

impl NodeKind {
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            NodeKind::Problem { .. }
                | NodeKind::ProblemDeclaration
                | NodeKind::ProblemStatement
                | NodeKind::ProblemExpression
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Literal { .. }
                | NodeKind::IdExpression
                | NodeKind::Unary { .. }
                | NodeKind::Binary { .. }
                | NodeKind::Conditional
                | NodeKind::Cast
                | NodeKind::SizeofTypeId
                | NodeKind::ArraySubscript
                | NodeKind::FunctionCall
                | NodeKind::FieldReference { .. }
                | NodeKind::ExpressionList
                | NodeKind::TypeIdInitializer
                | NodeKind::Ambiguous
                | NodeKind::ProblemExpression
        )
    }

    pub fn is_declarator(&self) -> bool {
        matches!(
            self,
            NodeKind::Declarator
                | NodeKind::ArrayDeclarator
                | NodeKind::FunctionDeclarator { .. }
                | NodeKind::KnrFunctionDeclarator
                | NodeKind::FieldDeclarator
        )
    }

    pub fn is_function_declarator(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclarator { .. } | NodeKind::KnrFunctionDeclarator
        )
    }

    pub fn is_decl_specifier(&self) -> bool {
        self.decl_spec().is_some()
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::CompoundStatement
                | NodeKind::ExpressionStatement
                | NodeKind::DeclarationStatement
                | NodeKind::NullStatement
                | NodeKind::IfStatement
                | NodeKind::SwitchStatement
                | NodeKind::WhileStatement
                | NodeKind::DoStatement
                | NodeKind::ForStatement
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
                | NodeKind::GotoStatement
                | NodeKind::ReturnStatement
                | NodeKind::LabelStatement
                | NodeKind::CaseStatement
                | NodeKind::DefaultStatement
                | NodeKind::ProblemStatement
        )
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::SimpleDeclaration
                | NodeKind::FunctionDefinition
                | NodeKind::ProblemDeclaration
        )
    }

    pub fn is_initializer(&self) -> bool {
        matches!(
            self,
            NodeKind::EqualsInitializer
                | NodeKind::InitializerList
                | NodeKind::DesignatedInitializer
        )
    }

    pub fn decl_spec(&self) -> Option<&DeclSpec> {
        match self {
            NodeKind::SimpleDeclSpecifier(spec)
            | NodeKind::NamedTypeSpecifier(spec)
            | NodeKind::CompositeTypeSpecifier { spec, .. }
            | NodeKind::ElaboratedTypeSpecifier { spec, .. }
            | NodeKind::EnumerationSpecifier(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn decl_spec_mut(&mut self) -> Option<&mut DeclSpec> {
        match self {
            NodeKind::SimpleDeclSpecifier(spec)
            | NodeKind::NamedTypeSpecifier(spec)
            | NodeKind::CompositeTypeSpecifier { spec, .. }
            | NodeKind::ElaboratedTypeSpecifier { spec, .. }
            | NodeKind::EnumerationSpecifier(spec) => Some(spec),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Name { text } => write!(f, "Name {text:?}"),
            NodeKind::Comment { text, .. } => write!(f, "Comment {text:?}"),
            NodeKind::Problem { id } => write!(f, "Problem({id:?})"),
            NodeKind::Literal { kind, text } => write!(f, "Literal({kind:?}) {text}"),
            NodeKind::Unary { op } => write!(f, "Unary({op:?})"),
            NodeKind::Binary { op } => write!(f, "Binary({op:?})"),
            NodeKind::FieldReference { is_pointer } => {
                write!(f, "FieldReference{}", if *is_pointer { "(->)" } else { "(.)" })
            }
            NodeKind::FunctionDeclarator { var_args } => {
                write!(f, "FunctionDeclarator{}", if *var_args { "(...)" } else { "" })
            }
            NodeKind::Pointer { qualifiers } => write!(f, "Pointer{}", QualifierList(qualifiers)),
            NodeKind::ArrayModifier {
                qualifiers,
                is_static,
                is_var_sized,
            } => {
                write!(f, "ArrayModifier{}", QualifierList(qualifiers))?;
                if *is_static {
                    write!(f, " static")?;
                }
                if *is_var_sized {
                    write!(f, " *")?;
                }
                Ok(())
            }
            NodeKind::SimpleDeclSpecifier(spec) => write!(f, "SimpleDeclSpecifier{}", SpecList(spec)),
            NodeKind::NamedTypeSpecifier(spec) => write!(f, "NamedTypeSpecifier{}", SpecList(spec)),
            NodeKind::CompositeTypeSpecifier { key, spec } => {
                write!(f, "CompositeTypeSpecifier({key:?}){}", SpecList(spec))
            }
            NodeKind::ElaboratedTypeSpecifier { kind, spec } => {
                write!(f, "ElaboratedTypeSpecifier({kind:?}){}", SpecList(spec))
            }
            NodeKind::EnumerationSpecifier(spec) => write!(f, "EnumerationSpecifier{}", SpecList(spec)),
            other => write!(f, "{other:?}"),
        }
    }
}

struct QualifierList<'a>(&'a Qualifiers);

impl fmt::Display for QualifierList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.0;
        for (set, word) in [(q.is_const, "const"), (q.is_volatile, "volatile"), (q.is_restrict, "restrict")] {
            if set {
                write!(f, " {word}")?;
            }
        }
        Ok(())
    }
}

struct SpecList<'a>(&'a DeclSpec);

impl fmt::Display for SpecList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.0;
        let mut words: Vec<&str> = Vec::new();
        match spec.storage {
            StorageClass::Unspecified => {}
            StorageClass::Typedef => words.push("typedef"),
            StorageClass::Extern => words.push("extern"),
            StorageClass::Static => words.push("static"),
            StorageClass::Auto => words.push("auto"),
            StorageClass::Register => words.push("register"),
        }
        if spec.is_inline {
            words.push("inline");
        }
        if spec.qualifiers.is_const {
            words.push("const");
        }
        if spec.qualifiers.is_volatile {
            words.push("volatile");
        }
        if spec.qualifiers.is_restrict {
            words.push("restrict");
        }
        if spec.is_signed {
            words.push("signed");
        }
        if spec.is_unsigned {
            words.push("unsigned");
        }
        if spec.is_short {
            words.push("short");
        }
        if spec.is_long_long {
            words.push("long long");
        } else if spec.is_long {
            words.push("long");
        }
        if spec.is_complex {
            words.push("_Complex");
        }
        if spec.is_imaginary {
            words.push("_Imaginary");
        }
        match spec.basic {
            BasicType::Unspecified => {}
            BasicType::Void => words.push("void"),
            BasicType::Char => words.push("char"),
            BasicType::Int => words.push("int"),
            BasicType::Float => words.push("float"),
            BasicType::Double => words.push("double"),
            BasicType::Bool => words.push("_Bool"),
        }
        if words.is_empty() {
            Ok(())
        } else {
            write!(f, "({})", words.join(" "))
        }
    }
}
