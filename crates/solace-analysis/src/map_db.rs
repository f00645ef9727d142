//! Map database (spec.md §4.5): canonicalizes each distinct map shape (flattened key
//! tuple + value type) to a numbered record `Map_N`.

use indexmap::IndexMap;
use solace_ast::{NodeId, TypeName};

/// One canonicalized map shape. `index` is the `N` in `Map_N`, assigned in
/// first-seen order (monotonically increasing).
#[derive(Debug, Clone)]
pub struct MapRecord {
    pub index: u32,
    pub keys: Vec<TypeName>,
    pub value: TypeName,
}

impl MapRecord {
    pub fn c_name(&self) -> String {
        format!("Map_{}", self.index)
    }
}

/// A structural key used to deduplicate map shapes: two `Mapping` types share a record
/// iff this derived key is equal (spec.md §4.5, and testable property #3, §8).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShapeKey(Vec<TypeKey>, TypeKey);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Elementary(String),
    UserDefined(NodeId),
    Array(Box<TypeKey>, Option<u64>),
    Function,
}

fn type_key(ty: &TypeName) -> TypeKey {
    match ty {
        TypeName::Elementary(e) => TypeKey::Elementary(format!("{e:?}")),
        TypeName::UserDefined(id) => TypeKey::UserDefined(*id),
        TypeName::Array { element, len } => TypeKey::Array(Box::new(type_key(element)), *len),
        TypeName::Function => TypeKey::Function,
        TypeName::Mapping { .. } => unreachable!("mapping types are flattened before keying"),
    }
}

#[derive(Debug, Default)]
pub struct MapDatabase {
    records: Vec<MapRecord>,
    by_shape: IndexMap<ShapeKey, usize>,
}

impl MapDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves (or allocates) the [`MapRecord`] for a declared mapping type, per
    /// spec.md §4.5. Nested mappings are flattened first, so `resolve` and `query`
    /// converge on the same canonical shape regardless of declaration form.
    pub fn resolve(&mut self, mapping_ty: &TypeName) -> &MapRecord {
        let (keys, value) = mapping_ty.flatten_mapping().expect("caller passed a non-mapping type to resolve()");
        let shape = ShapeKey(keys.iter().map(|k| type_key(*k)).collect(), type_key(value));
        let idx = *self.by_shape.entry(shape).or_insert_with(|| {
            let record = MapRecord {
                index: self.records.len() as u32 + 1,
                keys: keys.iter().map(|k| (**k).clone()).collect(),
                value: (*value).clone(),
            };
            self.records.push(record);
            self.records.len() - 1
        });
        &self.records[idx]
    }

    /// Looks up an already-resolved record without allocating a new one; `None` if the
    /// shape has not been seen via `resolve` yet.
    pub fn query(&self, mapping_ty: &TypeName) -> Option<&MapRecord> {
        let (keys, value) = mapping_ty.flatten_mapping()?;
        let shape = ShapeKey(keys.iter().map(|k| type_key(*k)).collect(), type_key(value));
        self.by_shape.get(&shape).map(|&idx| &self.records[idx])
    }

    pub fn records(&self) -> &[MapRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_ast::ty::ElementaryType;

    #[test]
    fn identical_flattened_shapes_share_one_record() {
        let mut db = MapDatabase::new();
        let a = TypeName::Mapping {
            key: Box::new(TypeName::ADDRESS),
            value: Box::new(TypeName::Elementary(ElementaryType::Uint(256))),
        };
        let b = TypeName::Mapping {
            key: Box::new(TypeName::ADDRESS),
            value: Box::new(TypeName::Elementary(ElementaryType::Uint(256))),
        };
        let ra = db.resolve(&a).index;
        let rb = db.resolve(&b).index;
        assert_eq!(ra, rb);
        assert_eq!(db.records().len(), 1);
    }

    #[test]
    fn distinct_shapes_get_distinct_numbers() {
        let mut db = MapDatabase::new();
        let a = TypeName::Mapping {
            key: Box::new(TypeName::ADDRESS),
            value: Box::new(TypeName::Elementary(ElementaryType::Uint(256))),
        };
        let b = TypeName::Mapping {
            key: Box::new(TypeName::Elementary(ElementaryType::Uint(256))),
            value: Box::new(TypeName::Elementary(ElementaryType::Bool)),
        };
        let ra = db.resolve(&a).index;
        let rb = db.resolve(&b).index;
        assert_ne!(ra, rb);
        assert_eq!(db.records().len(), 2);
    }

    #[test]
    fn nested_mapping_flattens_to_key_tuple() {
        let mut db = MapDatabase::new();
        let nested = TypeName::Mapping {
            key: Box::new(TypeName::ADDRESS),
            value: Box::new(TypeName::Mapping {
                key: Box::new(TypeName::Elementary(ElementaryType::Uint(256))),
                value: Box::new(TypeName::Elementary(ElementaryType::Bool)),
            }),
        };
        let rec = db.resolve(&nested);
        assert_eq!(rec.keys.len(), 2);
        assert_eq!(rec.value, TypeName::Elementary(ElementaryType::Bool));
    }
}
