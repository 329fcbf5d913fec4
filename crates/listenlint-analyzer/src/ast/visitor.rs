use super::nodes::*;

/// Visitor trait for walking the AST.
///
/// Default implementations delegate to the matching `walk_*` function, which
/// visits children in source order. An override that does its own work and
/// then calls the `walk_*` function sees nodes in pre-order.
pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function);
    }

    fn visit_arrow(&mut self, arrow: &ArrowFunction) {
        walk_arrow(self, arrow);
    }

    fn visit_class(&mut self, class: &Class) {
        walk_class(self, class);
    }

    fn visit_property_key(&mut self, key: &PropertyKey) {
        if let PropertyKey::Computed(expr) = key {
            self.visit_expr(expr);
        }
    }
}

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    for stmt in &program.body {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    for stmt in &block.body {
        visitor.visit_stmt(stmt);
    }
}

fn walk_var_decl<V: Visitor + ?Sized>(visitor: &mut V, decl: &VarDecl) {
    for declarator in &decl.declarators {
        visitor.visit_expr(&declarator.target);
        if let Some(init) = &declarator.init {
            visitor.visit_expr(init);
        }
    }
}

fn walk_for_init<V: Visitor + ?Sized>(visitor: &mut V, init: &ForInit) {
    match init {
        ForInit::Var(decl) => walk_var_decl(visitor, decl),
        ForInit::Expr(expr) => visitor.visit_expr(expr),
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Var(decl) => walk_var_decl(visitor, decl),
        StmtKind::Function(function) => visitor.visit_function(function),
        StmtKind::Class(class) => visitor.visit_class(class),
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
        StmtKind::Block(block) => visitor.visit_block(block),
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                visitor.visit_stmt(alternate);
            }
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            if let Some(init) = init {
                walk_for_init(visitor, init);
            }
            if let Some(test) = test {
                visitor.visit_expr(test);
            }
            if let Some(update) = update {
                visitor.visit_expr(update);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::ForEach {
            left, right, body, ..
        } => {
            walk_for_init(visitor, left);
            visitor.visit_expr(right);
            visitor.visit_stmt(body);
        }
        StmtKind::While { test, body } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(body);
        }
        StmtKind::DoWhile { body, test } => {
            visitor.visit_stmt(body);
            visitor.visit_expr(test);
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        StmtKind::Throw(value) => visitor.visit_expr(value),
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            visitor.visit_block(block);
            if let Some(handler) = handler {
                if let Some(param) = &handler.param {
                    visitor.visit_expr(param);
                }
                visitor.visit_block(&handler.body);
            }
            if let Some(finalizer) = finalizer {
                visitor.visit_block(finalizer);
            }
        }
        StmtKind::Switch {
            discriminant,
            cases,
        } => {
            visitor.visit_expr(discriminant);
            for case in cases {
                if let Some(test) = &case.test {
                    visitor.visit_expr(test);
                }
                for stmt in &case.body {
                    visitor.visit_stmt(stmt);
                }
            }
        }
        StmtKind::Labeled { body, .. } => visitor.visit_stmt(body),
        StmtKind::With { object, body } => {
            visitor.visit_expr(object);
            visitor.visit_stmt(body);
        }
        StmtKind::Export(export) => match export {
            ExportDecl::Declaration(decl) => visitor.visit_stmt(decl),
            ExportDecl::Default(expr) => visitor.visit_expr(expr),
            ExportDecl::Named { .. } | ExportDecl::All { .. } => {}
        },
        StmtKind::Import(_)
        | StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Empty
        | StmtKind::Debugger => {}
    }
}

pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, function: &Function) {
    for param in &function.params {
        visitor.visit_expr(param);
    }
    visitor.visit_block(&function.body);
}

pub fn walk_arrow<V: Visitor + ?Sized>(visitor: &mut V, arrow: &ArrowFunction) {
    for param in &arrow.params {
        visitor.visit_expr(param);
    }
    match &arrow.body {
        ArrowBody::Block(block) => visitor.visit_block(block),
        ArrowBody::Expr(expr) => visitor.visit_expr(expr),
    }
}

pub fn walk_class<V: Visitor + ?Sized>(visitor: &mut V, class: &Class) {
    if let Some(super_class) = &class.super_class {
        visitor.visit_expr(super_class);
    }
    for member in &class.members {
        match member {
            ClassMember::Method { key, function, .. } => {
                visitor.visit_property_key(key);
                visitor.visit_function(function);
            }
            ClassMember::Field { key, value, .. } => {
                visitor.visit_property_key(key);
                if let Some(value) = value {
                    visitor.visit_expr(value);
                }
            }
            ClassMember::StaticBlock(block) => visitor.visit_block(block),
        }
    }
}

fn walk_template<V: Visitor + ?Sized>(visitor: &mut V, template: &Template) {
    for expr in &template.expressions {
        visitor.visit_expr(expr);
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Literal(_)
        | ExprKind::Regex { .. }
        | ExprKind::Identifier(_)
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::PrivateName(_)
        | ExprKind::MetaProperty { .. } => {}
        ExprKind::Template(template) => walk_template(visitor, template),
        ExprKind::TaggedTemplate { tag, quasi } => {
            visitor.visit_expr(tag);
            walk_template(visitor, quasi);
        }
        ExprKind::Array(elements) => {
            for element in elements.iter().flatten() {
                visitor.visit_expr(element);
            }
        }
        ExprKind::Object(members) => {
            for member in members {
                match member {
                    ObjectMember::Property { key, value, .. } => {
                        visitor.visit_property_key(key);
                        visitor.visit_expr(value);
                    }
                    ObjectMember::Method { key, function, .. } => {
                        visitor.visit_property_key(key);
                        visitor.visit_function(function);
                    }
                    ObjectMember::Spread(inner) => visitor.visit_expr(inner),
                }
            }
        }
        ExprKind::Function(function) => visitor.visit_function(function),
        ExprKind::Arrow(arrow) => visitor.visit_arrow(arrow),
        ExprKind::Class(class) => visitor.visit_class(class),
        ExprKind::Member {
            object, property, ..
        } => {
            visitor.visit_expr(object);
            if let MemberProperty::Computed(property) = property {
                visitor.visit_expr(property);
            }
        }
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Unary { operand, .. } | ExprKind::Update { operand, .. } => {
            visitor.visit_expr(operand);
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Assign { target, value, .. } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_expr(test);
            visitor.visit_expr(consequent);
            visitor.visit_expr(alternate);
        }
        ExprKind::Sequence(exprs) => {
            for expr in exprs {
                visitor.visit_expr(expr);
            }
        }
        ExprKind::Spread(inner) | ExprKind::Await(inner) | ExprKind::Grouping(inner) => {
            visitor.visit_expr(inner);
        }
        ExprKind::Yield { argument, .. } => {
            if let Some(argument) = argument {
                visitor.visit_expr(argument);
            }
        }
    }
}
