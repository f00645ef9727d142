//! C-AST emitter (spec.md §4.12): a minimal expression/statement/declaration IR with
//! deterministic printing. Node kinds are a tagged union (spec.md §9: "replace
//! inheritance-style polymorphism in the C-AST IR with a tagged union"), so printing is
//! a plain pattern match rather than virtual dispatch.

use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub enum CExpr {
    Ident { name: String, is_pointer: bool },
    IntLit(i128),
    StrLit(String),
    Unary { op: &'static str, postfix: bool, operand: Box<CExpr> },
    Binary { op: &'static str, lhs: Box<CExpr>, rhs: Box<CExpr> },
    Conditional { cond: Box<CExpr>, then: Box<CExpr>, or_else: Box<CExpr> },
    /// `base.field` or `base->field`, decided by `arrow`.
    Member { base: Box<CExpr>, field: String, arrow: bool },
    Cast { to: String, expr: Box<CExpr> },
    /// `&expr`.
    AddrOf(Box<CExpr>),
    /// `*expr`.
    Deref(Box<CExpr>),
    Call { callee: String, args: Vec<CExpr> },
    Assign { op: &'static str, lhs: Box<CExpr>, rhs: Box<CExpr> },
    /// `base[index]`, used by the map generator's bounded tracked-key storage.
    Index { base: Box<CExpr>, index: Box<CExpr> },
}

impl CExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident { name: name.into(), is_pointer: false }
    }

    pub fn ptr_ident(name: impl Into<String>) -> Self {
        Self::Ident { name: name.into(), is_pointer: true }
    }

    pub fn member(self, field: impl Into<String>, arrow: bool) -> Self {
        Self::Member { base: Box::new(self), field: field.into(), arrow }
    }

    pub fn call(callee: impl Into<String>, args: Vec<CExpr>) -> Self {
        Self::Call { callee: callee.into(), args }
    }

    pub fn addr_of(self) -> Self {
        Self::AddrOf(Box::new(self))
    }

    pub fn binary(op: &'static str, lhs: CExpr, rhs: CExpr) -> Self {
        Self::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    /// `base[index]`, used by the map generator's tracked-key-slot arrays.
    pub fn index(self, index: CExpr) -> Self {
        Self::Index { base: Box::new(self), index: Box::new(index) }
    }

    fn needs_parens_as_operand(&self) -> bool {
        matches!(self, Self::Binary { .. } | Self::Conditional { .. } | Self::Assign { .. })
    }

    pub fn print(&self, out: &mut String) {
        match self {
            Self::Ident { name, .. } => out.push_str(name),
            Self::IntLit(v) => {
                let _ = write!(out, "{v}");
            }
            Self::StrLit(s) => {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            Self::Unary { op, postfix, operand } => {
                if *postfix {
                    print_paren_if_needed(operand, out);
                    out.push_str(op);
                } else {
                    out.push_str(op);
                    print_paren_if_needed(operand, out);
                }
            }
            Self::Binary { op, lhs, rhs } => {
                out.push('(');
                lhs.print(out);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                rhs.print(out);
                out.push(')');
            }
            Self::Conditional { cond, then, or_else } => {
                out.push('(');
                cond.print(out);
                out.push_str(" ? ");
                then.print(out);
                out.push_str(" : ");
                or_else.print(out);
                out.push(')');
            }
            Self::Member { base, field, arrow } => {
                out.push('(');
                base.print(out);
                out.push(')');
                out.push_str(if *arrow { "->" } else { "." });
                out.push_str(field);
            }
            Self::Cast { to, expr } => {
                out.push('(');
                out.push('(');
                out.push_str(to);
                out.push_str(")(");
                expr.print(out);
                out.push_str("))");
            }
            Self::AddrOf(e) => {
                out.push('&');
                print_paren_if_needed(e, out);
            }
            Self::Deref(e) => {
                out.push('*');
                print_paren_if_needed(e, out);
            }
            Self::Call { callee, args } => {
                out.push_str(callee);
                out.push('(');
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    a.print(out);
                }
                out.push(')');
            }
            Self::Assign { op, lhs, rhs } => {
                lhs.print(out);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                rhs.print(out);
            }
            Self::Index { base, index } => {
                print_paren_if_needed(base, out);
                out.push('[');
                index.print(out);
                out.push(']');
            }
        }
    }

    pub fn render(&self) -> String {
        let mut s = String::new();
        self.print(&mut s);
        s
    }
}

fn print_paren_if_needed(e: &CExpr, out: &mut String) {
    if e.needs_parens_as_operand() {
        out.push('(');
        e.print(out);
        out.push(')');
    } else {
        e.print(out);
    }
}

#[derive(Debug, Clone)]
pub struct CVarDecl {
    pub ty: String,
    pub name: String,
    pub is_pointer: bool,
    pub init: Option<CExpr>,
}

impl CVarDecl {
    pub fn print(&self, out: &mut String, indent: usize) {
        push_indent(out, indent);
        out.push_str(&self.ty);
        out.push(' ');
        if self.is_pointer {
            out.push('*');
        }
        out.push_str(&self.name);
        if let Some(init) = &self.init {
            out.push_str(" = ");
            init.print(out);
        }
        out.push(';');
    }
}

#[derive(Debug, Clone)]
pub enum CStmt {
    VarDecl(CVarDecl),
    Expr(CExpr),
    If { cond: CExpr, then: Box<CStmt>, or_else: Option<Box<CStmt>> },
    While { cond: CExpr, body: Box<CStmt> },
    DoWhile { body: Box<CStmt>, cond: CExpr },
    For { init: Option<Box<CStmt>>, cond: Option<CExpr>, update: Option<CExpr>, body: Box<CStmt> },
    Break,
    Continue,
    Return(Option<CExpr>),
    Block(Vec<CStmt>),
    /// A modifier-body placeholder (`_;`) not yet rewritten to the next specialization
    /// call. The method converter always substitutes these before a function's body
    /// is handed to [`CFunction`]; surviving to `print` is a converter bug.
    Placeholder,
}

impl CStmt {
    pub fn print(&self, out: &mut String, indent: usize) {
        match self {
            Self::VarDecl(d) => d.print(out, indent),
            Self::Expr(e) => {
                push_indent(out, indent);
                e.print(out);
                out.push(';');
            }
            Self::If { cond, then, or_else } => {
                push_indent(out, indent);
                out.push_str("if (");
                cond.print(out);
                out.push_str(") {\n");
                then.print(out, indent + 1);
                out.push('\n');
                push_indent(out, indent);
                out.push('}');
                if let Some(or_else) = or_else {
                    out.push_str(" else {\n");
                    or_else.print(out, indent + 1);
                    out.push('\n');
                    push_indent(out, indent);
                    out.push('}');
                }
            }
            Self::While { cond, body } => {
                push_indent(out, indent);
                out.push_str("while (");
                cond.print(out);
                out.push_str(") {\n");
                body.print(out, indent + 1);
                out.push('\n');
                push_indent(out, indent);
                out.push('}');
            }
            Self::DoWhile { body, cond } => {
                push_indent(out, indent);
                out.push_str("do {\n");
                body.print(out, indent + 1);
                out.push('\n');
                push_indent(out, indent);
                out.push_str("} while (");
                cond.print(out);
                out.push_str(");");
            }
            Self::For { init, cond, update, body } => {
                push_indent(out, indent);
                out.push_str("for (");
                if let Some(init) = init {
                    let mut tmp = String::new();
                    init.print(&mut tmp, 0);
                    out.push_str(tmp.trim_end_matches(';'));
                }
                out.push_str("; ");
                if let Some(cond) = cond {
                    cond.print(out);
                }
                out.push_str("; ");
                if let Some(update) = update {
                    update.print(out);
                }
                out.push_str(") {\n");
                body.print(out, indent + 1);
                out.push('\n');
                push_indent(out, indent);
                out.push('}');
            }
            Self::Break => {
                push_indent(out, indent);
                out.push_str("break;");
            }
            Self::Continue => {
                push_indent(out, indent);
                out.push_str("continue;");
            }
            Self::Return(e) => {
                push_indent(out, indent);
                out.push_str("return");
                if let Some(e) = e {
                    out.push(' ');
                    e.print(out);
                }
                out.push(';');
            }
            Self::Block(stmts) => {
                for (i, s) in stmts.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    s.print(out, indent);
                }
            }
            Self::Placeholder => unreachable!("modifier placeholder left unsubstituted by the method converter"),
        }
    }

    /// Recursively substitutes every [`CStmt::Placeholder`] in this tree for a fresh
    /// copy of `replacement`, and every bare `return;` for `return <rv_name>;` when
    /// `rv_name` is set (spec.md §4.11 point 2: a modifier's `return;` must still
    /// surface the wrapped function's return value once one exists). Used to splice a
    /// modifier's lowered body into the specialization chain.
    pub fn substitute_placeholder(&mut self, replacement: &[CStmt], rv_name: Option<&str>) {
        match self {
            Self::Placeholder => {
                let mut clones = replacement.to_vec();
                for c in &mut clones {
                    c.substitute_placeholder(replacement, rv_name);
                }
                *self = CStmt::Block(clones);
            }
            Self::Return(None) => {
                if let Some(rv) = rv_name {
                    *self = CStmt::Return(Some(CExpr::ident(rv)));
                }
            }
            Self::If { then, or_else, .. } => {
                then.substitute_placeholder(replacement, rv_name);
                if let Some(or_else) = or_else {
                    or_else.substitute_placeholder(replacement, rv_name);
                }
            }
            Self::While { body, .. } | Self::DoWhile { body, .. } | Self::For { body, .. } => {
                body.substitute_placeholder(replacement, rv_name);
            }
            Self::Block(stmts) => {
                for s in stmts {
                    s.substitute_placeholder(replacement, rv_name);
                }
            }
            Self::VarDecl(_) | Self::Expr(_) | Self::Break | Self::Continue | Self::Return(Some(_)) => {}
        }
    }
}

/// Substitutes placeholder/return occurrences across a whole statement list in place.
pub fn substitute_block(stmts: &mut [CStmt], replacement: &[CStmt], rv_name: Option<&str>) {
    for s in stmts {
        s.substitute_placeholder(replacement, rv_name);
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

#[derive(Debug, Clone)]
pub struct CParam {
    pub ty: String,
    pub name: String,
    pub is_pointer: bool,
}

impl CParam {
    pub fn new(ty: impl Into<String>, name: impl Into<String>, is_pointer: bool) -> Self {
        Self { ty: ty.into(), name: name.into(), is_pointer }
    }

    fn render(&self) -> String {
        if self.is_pointer {
            format!("{}* {}", self.ty, self.name)
        } else {
            format!("{} {}", self.ty, self.name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CFunction {
    pub ret_ty: String,
    pub ret_is_pointer: bool,
    pub name: String,
    pub params: Vec<CParam>,
    pub body: Option<Vec<CStmt>>,
    /// `static` linkage: this translator emits every definition with external linkage
    /// (each may be forward-referenced from another contract's constructor chain).
    pub inline: bool,
}

impl CFunction {
    fn signature(&self) -> String {
        let params = if self.params.is_empty() {
            "void".to_string()
        } else {
            self.params.iter().map(CParam::render).collect::<Vec<_>>().join(", ")
        };
        let ret = if self.ret_is_pointer { format!("{}*", self.ret_ty) } else { self.ret_ty.clone() };
        let prefix = if self.inline { "static inline " } else { "" };
        format!("{prefix}{ret} {}({params})", self.name)
    }

    /// Forward declaration: signature plus `;`, emitted before any definition so that
    /// mutually-recursive contracts and constructor chains can forward-reference each
    /// other (spec.md §4.11 point 4, §4.13 driver wave 1).
    pub fn print_forward_decl(&self, out: &mut String) {
        out.push_str(&self.signature());
        out.push_str(";\n");
    }

    pub fn print_definition(&self, out: &mut String) {
        out.push_str(&self.signature());
        match &self.body {
            Some(stmts) => {
                out.push_str(" {\n");
                for stmt in stmts {
                    stmt.print(out, 1);
                    out.push('\n');
                }
                out.push_str("}\n");
            }
            None => out.push_str(";\n"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CStructField {
    pub ty: String,
    pub name: String,
    pub is_pointer: bool,
}

#[derive(Debug, Clone)]
pub struct CStructDef {
    pub name: String,
    pub fields: Vec<CStructField>,
}

impl CStructDef {
    pub fn print_forward_decl(&self, out: &mut String) {
        let _ = writeln!(out, "struct {};", self.name);
    }

    pub fn print_definition(&self, out: &mut String) {
        let _ = writeln!(out, "struct {} {{", self.name);
        for f in &self.fields {
            if f.is_pointer {
                let _ = writeln!(out, "    {}* {};", f.ty, f.name);
            } else {
                let _ = writeln!(out, "    {} {};", f.ty, f.name);
            }
        }
        out.push_str("};\n");
    }
}

/// A full translation unit, printed in the two waves spec.md §4.13 describes:
/// forward-declare everything (structs, then interface-view functions, then internal-
/// view functions), then emit definitions (structs, map bodies, method bodies,
/// constructor chains, initializers).
#[derive(Debug, Clone, Default)]
pub struct CTranslationUnit {
    pub structs: Vec<CStructDef>,
    /// Interface-view functions: the public/external entry points, forward-declared
    /// first (spec.md §4.13 wave 1).
    pub interface_fns: Vec<CFunction>,
    /// Internal-view functions: everything else (internals, modifiers specializations,
    /// map helpers, struct helpers, constructors).
    pub internal_fns: Vec<CFunction>,
}

impl CTranslationUnit {
    /// The full file, with a minimal standalone preamble (no `libverify` forward
    /// declarations or address-literal globals — `solace_codegen::render` assembles
    /// those from the analysis stack's outputs). Useful for tests and callers that
    /// only need the shape of the structs/functions themselves.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("/* Generated translation unit. Do not edit by hand. */\n");
        out.push_str("#include \"verify.h\"\n\n");
        out.push_str(&self.render_body());
        out
    }

    /// Just the two waves (spec.md §4.13 steps 7-8): forward declarations, then
    /// definitions. No file preamble.
    pub fn render_body(&self) -> String {
        let mut out = String::new();
        for s in &self.structs {
            s.print_forward_decl(&mut out);
        }
        out.push('\n');
        for f in &self.interface_fns {
            f.print_forward_decl(&mut out);
        }
        for f in &self.internal_fns {
            f.print_forward_decl(&mut out);
        }
        out.push('\n');

        for s in &self.structs {
            s.print_definition(&mut out);
            out.push('\n');
        }
        for f in &self.internal_fns {
            f.print_definition(&mut out);
            out.push('\n');
        }
        for f in &self.interface_fns {
            f.print_definition(&mut out);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_expression_renders_parenthesized() {
        let e = CExpr::binary("+", CExpr::ident("a"), CExpr::ident("b"));
        assert_eq!(e.render(), "(a + b)");
    }

    #[test]
    fn member_access_uses_arrow_for_pointers() {
        let e = CExpr::ident("self").member("model_balance", true);
        assert_eq!(e.render(), "(self)->model_balance");
    }

    #[test]
    fn forward_decl_then_definition_match_signature() {
        let f = CFunction {
            ret_ty: "void".into(),
            ret_is_pointer: false,
            name: "A_Method_f".into(),
            params: vec![CParam::new("struct A", "self", true)],
            body: Some(vec![CStmt::Return(None)]),
            inline: false,
        };
        let mut fwd = String::new();
        f.print_forward_decl(&mut fwd);
        assert_eq!(fwd, "void A_Method_f(struct A* self);\n");

        let mut def = String::new();
        f.print_definition(&mut def);
        assert!(def.starts_with("void A_Method_f(struct A* self) {\n"));
        assert!(def.contains("return;"));
    }
}
