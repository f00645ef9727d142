//! Type analyzer (spec.md §4.7): assigns a C type name and, where applicable, a C
//! symbol name to every AST node that has a type.

use crate::call_graph::CallGraph;
use crate::flat_model::FlatModel;
use crate::map_db::MapDatabase;
use indexmap::IndexMap;
use solace_ast::ty::ElementaryType;
use solace_ast::{Expr, ExprKind, ItemFunction, NodeId, Program, Res, StorageLocation, TypeName, Visit};

/// Replaces `_` with `__` so `_`-joined qualified names stay unambiguous (spec.md §4.7).
pub fn escape(name: &str) -> String {
    name.replace('_', "__")
}

/// The C type assigned to one AST node or declaration, per spec.md §4.7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    /// A wrapped scalar: `sol_bool_t`, `sol_address_t`, `sol_intN_t`, `sol_uintN_t`.
    Wrapped(String),
    /// `struct <symbol>` for a contract or struct type.
    Struct(String),
    /// `struct Map_N`.
    Map(String),
    /// An enum's narrowest unsigned wrapper.
    Enum(String),
}

impl CType {
    pub fn c_name(&self) -> &str {
        match self {
            Self::Wrapped(s) | Self::Struct(s) | Self::Map(s) | Self::Enum(s) => s,
        }
    }

    pub fn is_wrapped_scalar(&self) -> bool {
        matches!(self, Self::Wrapped(_) | Self::Enum(_))
    }
}

/// Fixed elementary-type table (spec.md §4.7): `bool -> sol_bool_t`; `address ->
/// sol_address_t`; `intN -> sol_intN_t`; `uintN -> sol_uintN_t`; `bytesN ->
/// sol_uintN*8_t`; `string -> sol_uint256_t` (hashed).
pub fn elementary_c_type(ty: &ElementaryType) -> CType {
    match ty {
        ElementaryType::Bool => CType::Wrapped("sol_bool_t".into()),
        ElementaryType::Address { .. } => CType::Wrapped("sol_address_t".into()),
        ElementaryType::Int(n) => CType::Wrapped(format!("sol_int{n}_t")),
        ElementaryType::Uint(n) => CType::Wrapped(format!("sol_uint{n}_t")),
        ElementaryType::FixedBytes(n) => CType::Wrapped(format!("sol_uint{}_t", (*n as u32) * 8)),
        ElementaryType::Bytes | ElementaryType::String => CType::Wrapped("sol_uint256_t".into()),
    }
}

/// Narrowest unsigned wrapper type that can index `variant_count` enum members.
pub fn enum_c_type(variant_count: usize) -> CType {
    let width = if variant_count <= 256 {
        8
    } else if variant_count <= 65536 {
        16
    } else {
        32
    };
    CType::Enum(format!("sol_uint{width}_t"))
}

/// A per-node type/symbol/pointer-ness table, built by walking every executable
/// function reached by the call graph (spec.md §3 TypeTable invariant: "every typed
/// expression reachable from executable code has an entry").
#[derive(Debug, Default)]
pub struct TypeTable {
    node_types: IndexMap<NodeId, CType>,
    symbols: IndexMap<NodeId, String>,
    is_pointer: IndexMap<NodeId, bool>,
}

impl TypeTable {
    pub fn node_type(&self, id: NodeId) -> Option<&CType> {
        self.node_types.get(&id)
    }

    pub fn symbol(&self, id: NodeId) -> Option<&str> {
        self.symbols.get(&id).map(String::as_str)
    }

    pub fn is_pointer(&self, id: NodeId) -> bool {
        self.is_pointer.get(&id).copied().unwrap_or(false)
    }
}

pub struct TypeAnalyzer<'a, 'p> {
    program: &'a Program<'p>,
    model: &'a FlatModel<'p>,
    map_db: &'a mut MapDatabase,
}

impl<'a, 'p> TypeAnalyzer<'a, 'p> {
    pub fn new(program: &'a Program<'p>, model: &'a FlatModel<'p>, map_db: &'a mut MapDatabase) -> Self {
        Self { program, model, map_db }
    }

    /// Runs the three passes named in spec.md §4.7: contracts/structs/enums, then
    /// members and function signatures (covered implicitly by resolving every
    /// declaration's `ty` on demand), then expressions (the bulk of this table).
    pub fn analyze(&mut self, call_graph: &CallGraph) -> TypeTable {
        let mut table = TypeTable::default();

        for flat in self.model.view() {
            let symbol = escape(flat.name());
            table.symbols.insert(flat.id, symbol.clone());
            table.node_types.insert(flat.id, CType::Struct(format!("struct {symbol}")));

            for s in flat.structures() {
                let sym = format!("{}_Struct_{}", symbol, escape(s.name.as_str()));
                table.symbols.insert(s.id, sym.clone());
                table.node_types.insert(s.id, CType::Struct(format!("struct {sym}")));
            }
            for e in flat.enums() {
                table.node_types.insert(e.id, enum_c_type(e.variants.len()));
                table.symbols.insert(e.id, escape(e.name.as_str()));
            }
            for (var, mapping_ty) in flat.mappings() {
                let rec = self.map_db.resolve(mapping_ty);
                table.node_types.insert(var.var.id, CType::Map(format!("struct {}", rec.c_name())));
                table.symbols.insert(var.var.id, rec.c_name());
            }
            for var in flat.state_variables() {
                if !var.var.ty.is_mapping() {
                    self.record_decl_type(&mut table, var.var.id, &var.var.ty, false);
                }
            }
        }

        for v in call_graph.vertices() {
            let Some(def) = self.program.registry.function(v.function) else { continue };
            self.analyze_function(&mut table, def);
        }

        // Modifiers are never call-graph vertices themselves (their bodies are walked
        // inline into whichever function applies them), so the function converter
        // needs their params/body typed here explicitly, independent of whether the
        // modifier happens to be applied anywhere in this model set.
        for flat in self.model.view() {
            for m in flat.modifiers() {
                self.analyze_function(&mut table, m);
            }
        }

        table
    }

    fn analyze_function(&self, table: &mut TypeTable, def: &'p ItemFunction) {
        for p in def.header.params.iter().chain(def.header.returns.iter()) {
            let is_storage_ref = matches!(p.storage, Some(StorageLocation::Storage));
            self.record_decl_type(table, p.id, &p.ty, is_storage_ref);
        }
        // The first return parameter's type is the function's C return type
        // (spec.md §4.7); multi-return is otherwise rejected except via tuple-assign
        // lowering, which the block lowerer handles structurally, not here.
        if let Some(first) = def.header.returns.first() {
            table.symbols.entry(def.id).or_insert_with(|| escape(def.name()));
            if let Some(ty) = table.node_types.get(&first.id).cloned() {
                table.node_types.entry(def.id).or_insert(ty);
            }
        }
        if let Some(body) = &def.body {
            let mut visitor = ExprTypeVisitor { program: self.program, table };
            solace_ast::walk_block(&mut visitor, body);
        }
    }

    fn record_decl_type(&self, table: &mut TypeTable, id: NodeId, ty: &TypeName, is_storage_ref: bool) {
        let ctype = self.resolve_type(ty);
        table.node_types.insert(id, ctype);
        table.is_pointer.insert(id, is_storage_ref);
    }

    fn resolve_type(&self, ty: &TypeName) -> CType {
        resolve_type_name(self.program, ty)
    }
}

/// Resolves a bare `TypeName` to its `CType`, independent of any particular table
/// entry. Used both by [`TypeAnalyzer`] itself and by callers (the function
/// converter's struct-helper and map-helper bodies) that need a field's or a map
/// slot's C type without it having its own node in the [`TypeTable`] (struct fields
/// are declarations, not expressions, so `analyze` never visits them individually).
pub fn resolve_type_name(program: &Program<'_>, ty: &TypeName) -> CType {
    match ty {
        TypeName::Elementary(e) => elementary_c_type(e),
        TypeName::UserDefined(id) => {
            if let Some(c) = program.registry.contract(*id) {
                CType::Struct(format!("struct {}", escape(c.name.as_str())))
            } else if let Some(e) = program.registry.enum_(*id) {
                enum_c_type(e.variants.len())
            } else if let Some(s) = program.registry.struct_(*id) {
                // Structs are namespaced under their declaring contract; callers
                // that need the fully-qualified name look it up via the table's
                // own entry (populated in `analyze`) instead of recomputing it
                // without owner context here.
                CType::Struct(format!("struct {}", escape(s.name.as_str())))
            } else {
                CType::Wrapped("sol_uint256_t".into())
            }
        }
        TypeName::Mapping { .. } => CType::Map("Map".into()),
        TypeName::Array { .. } | TypeName::Function => CType::Wrapped("sol_uint256_t".into()),
    }
}

/// Populates expression-level entries of the table. Identifiers and member accesses
/// bind to whatever type their referenced declaration already carries in the table;
/// `IndexAccess` on a mapping binds to the map record's value type, resolved straight
/// from the front-end-provided `Expr::ty` (spec.md §4.7 "Expressions" pass).
struct ExprTypeVisitor<'a, 'p> {
    program: &'a Program<'p>,
    table: &'a mut TypeTable,
}

impl Visit for ExprTypeVisitor<'_, '_> {
    fn visit_expr(&mut self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Ident(id) => {
                if let Res::Decl(decl) = id.res {
                    if let Some(ty) = self.table.node_types.get(&decl).cloned() {
                        self.table.node_types.insert(expr.id, ty);
                    }
                    if self.table.is_pointer(decl) {
                        self.table.is_pointer.insert(expr.id, true);
                    }
                }
            }
            ExprKind::MemberAccess { member, .. } => {
                if let Res::Decl(decl) = member.res {
                    if let Some(ty) = self.table.node_types.get(&decl).cloned() {
                        self.table.node_types.insert(expr.id, ty);
                    }
                }
            }
            ExprKind::IndexAccess { .. } => {
                if let Some(value_ty) = expr.ty.as_ref() {
                    let resolved = match value_ty {
                        TypeName::Elementary(e) => elementary_c_type(e),
                        TypeName::UserDefined(id) if self.program.registry.contract(*id).is_some() => {
                            CType::Struct(format!("struct {}", escape(self.program.registry.contract(*id).unwrap().name.as_str())))
                        }
                        TypeName::UserDefined(id) if self.program.registry.struct_(*id).is_some() => {
                            CType::Struct(format!("struct {}", escape(self.program.registry.struct_(*id).unwrap().name.as_str())))
                        }
                        TypeName::UserDefined(id) if self.program.registry.enum_(*id).is_some() => {
                            enum_c_type(self.program.registry.enum_(*id).unwrap().variants.len())
                        }
                        _ => CType::Wrapped("sol_uint256_t".into()),
                    };
                    self.table.node_types.insert(expr.id, resolved);
                }
            }
            _ => {}
        }
        true
    }
}
