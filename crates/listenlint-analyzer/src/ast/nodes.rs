use listenlint_common::Span;

// ============================================================================
// Program (top-level)
// ============================================================================

/// A complete JavaScript script or module.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

/// A statement node.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// All statement variants.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `var a = 1, b;` / `let` / `const`
    Var(VarDecl),
    /// `function name() {}`
    Function(Function),
    /// `class Name {}`
    Class(Class),
    /// An expression followed by `;` (or an inserted one).
    Expr(Expr),
    Block(Block),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    /// `for (init; test; update) body`
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `for (left in right)`, `for (left of right)`, `for await (left of right)`
    ForEach {
        kind: ForEachKind,
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
        is_await: bool,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Return(Option<Expr>),
    Break(Option<String>),
    Continue(Option<String>),
    Throw(Expr),
    Try {
        block: Block,
        handler: Option<CatchClause>,
        finalizer: Option<Block>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    With {
        object: Expr,
        body: Box<Stmt>,
    },
    Import(ImportDecl),
    Export(ExportDecl),
    Empty,
    Debugger,
}

/// A braced statement list.
#[derive(Debug, Clone)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<VarDeclarator>,
}

/// `target = init`; the target is an identifier or a destructuring pattern.
#[derive(Debug, Clone)]
pub struct VarDeclarator {
    pub target: Expr,
    pub init: Option<Expr>,
    pub span: Span,
}

/// The head of a `for` loop before the first `;`, `in` or `of`.
#[derive(Debug, Clone)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForEachKind {
    In,
    Of,
}

/// `catch (param) { body }`; the binding is optional.
#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

/// `case test: body` or `default: body` (when `test` is `None`).
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

// ============================================================================
// Modules
// ============================================================================

/// `import a, { b as c } from "mod";` / `import * as ns from "mod";` / `import "mod";`
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    Default(String),
    Namespace(String),
    Named { imported: String, local: String },
}

#[derive(Debug, Clone)]
pub enum ExportDecl {
    /// `export const x = 1;`, `export function f() {}`, `export class C {}`
    Declaration(Box<Stmt>),
    /// `export default <expr>;` (also default function and class declarations)
    Default(Expr),
    /// `export { a, b as c } from "mod";`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    /// `export * from "mod";` / `export * as ns from "mod";`
    All {
        exported: Option<String>,
        source: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

// ============================================================================
// Functions and classes
// ============================================================================

/// A function declaration, function expression, or method body.
///
/// Parameters are kept as expressions: identifiers, destructuring patterns,
/// `x = default` assignments and `...rest` spreads.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Expr>,
    pub body: Block,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

/// `(a, b) => body` / `async x => body`
#[derive(Debug, Clone)]
pub struct ArrowFunction {
    pub params: Vec<Expr>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ArrowBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: Option<String>,
    pub super_class: Option<Box<Expr>>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ClassMember {
    Method {
        key: PropertyKey,
        kind: MethodKind,
        is_static: bool,
        function: Function,
        span: Span,
    },
    Field {
        key: PropertyKey,
        value: Option<Expr>,
        is_static: bool,
        span: Span,
    },
    /// `static { ... }`
    StaticBlock(Block),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
    Constructor,
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Look through any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Grouping(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }
}

/// All expression variants.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// `"text"`, `42`, `10n`, `true`, `null`
    Literal(Literal),

    /// `/pattern/flags`
    Regex { pattern: String, flags: String },

    /// A variable reference: `x`, `document`, `undefined`
    Identifier(String),

    This,
    Super,

    /// `#x`, only as the left operand of `#x in obj`
    PrivateName(String),

    /// `` `a${b}c` ``
    Template(Template),

    /// ``tag`a${b}c` ``
    TaggedTemplate { tag: Box<Expr>, quasi: Template },

    /// `[a, , ...b]`; holes are `None`.
    Array(Vec<Option<Expr>>),

    /// `{ a: 1, b, [c]: 2, m() {}, ...d }`
    Object(Vec<ObjectMember>),

    Function(Box<Function>),
    Arrow(Box<ArrowFunction>),
    Class(Box<Class>),

    /// `a.b`, `a.#b`, `a[b]`, `a?.b`
    Member {
        object: Box<Expr>,
        property: MemberProperty,
        optional: bool,
    },

    /// `f(a, b)`, `a.b(c)`, `a?.(b)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
    },

    /// `new C(args)`; `new C` has no arguments.
    New { callee: Box<Expr>, args: Vec<Expr> },

    /// `new.target`, `import.meta`
    MetaProperty { meta: String, property: String },

    Unary { op: UnaryOp, operand: Box<Expr> },

    /// `++x`, `x--`
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: Box<Expr>,
    },

    /// Arithmetic, comparison, bitwise and logical operators.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },

    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    /// `a, b, c`
    Sequence(Vec<Expr>),

    /// `...expr` in arguments, arrays and patterns.
    Spread(Box<Expr>),

    Await(Box<Expr>),

    Yield {
        argument: Option<Box<Expr>>,
        delegate: bool,
    },

    /// Parenthesized expression.
    Grouping(Box<Expr>),
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    /// Digits as written, without the `n` suffix.
    BigInt(String),
    Bool(bool),
    Null,
}

/// Template parts: `quasis.len() == expressions.len() + 1`.
#[derive(Debug, Clone)]
pub struct Template {
    /// Cooked text of each literal part.
    pub quasis: Vec<String>,
    pub expressions: Vec<Expr>,
    pub span: Span,
}

/// The part after the `.` or inside the `[]` of a member access.
#[derive(Debug, Clone)]
pub enum MemberProperty {
    Named(String),
    Private(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone)]
pub enum ObjectMember {
    /// `key: value`, or shorthand `key` (where `value` is the identifier, or
    /// `key = default` inside a destructuring pattern).
    Property {
        key: PropertyKey,
        value: Expr,
        shorthand: bool,
        span: Span,
    },
    /// `m() {}`, `get x() {}`, `set x(v) {}`, `async *g() {}`
    Method {
        key: PropertyKey,
        kind: MethodKind,
        function: Function,
        span: Span,
    },
    /// `...expr`
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum PropertyKey {
    Identifier(String),
    String(String),
    Number(f64),
    Computed(Box<Expr>),
    Private(String),
}

impl PropertyKey {
    /// The key's name when it is written as an identifier or a string literal.
    pub fn static_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Identifier(name) | PropertyKey::String(name) => Some(name),
            PropertyKey::Number(_) | PropertyKey::Computed(_) | PropertyKey::Private(_) => None,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,    // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

/// Binary operators, including the short-circuiting logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    // Comparison
    Eq,
    Neq,
    StrictEq,
    StrictNeq,
    Lt,
    Gt,
    Lte,
    Gte,
    In,
    Instanceof,
    // Bitwise
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    // Logical
    And,
    Or,
    Nullish,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,        // =
    AddAssign,     // +=
    SubAssign,     // -=
    MulAssign,     // *=
    DivAssign,     // /=
    ModAssign,     // %=
    ExpAssign,     // **=
    ShlAssign,     // <<=
    ShrAssign,     // >>=
    UShrAssign,    // >>>=
    BitAndAssign,  // &=
    BitOrAssign,   // |=
    BitXorAssign,  // ^=
    AndAssign,     // &&=
    OrAssign,      // ||=
    NullishAssign, // ??=
}
