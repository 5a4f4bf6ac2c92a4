//! The builtin `System` type catalog.
//!
//! Every universe starts from the same platform leaf types: the scalar
//! value types, `String`, `Object`, the universal `Array` marker, and the
//! generic container definitions. Providers seed an arena with
//! [`seed`] and then add the service's own types on top.

use crate::reflect::{NativeType, TypeArena, TypeId, TypeKind, TypeOrigin};

pub const SYSTEM: &str = "System";
pub const SYSTEM_COLLECTIONS_GENERIC: &str = "System.Collections.Generic";

/// Scalar value types seeded into every universe.
const VALUE_TYPES: &[&str] = &[
    "Boolean", "Byte", "Char", "Decimal", "Double", "Guid", "Int16", "Int32", "Int64", "Single",
    "DateTime", "DateTimeOffset", "TimeSpan", "UInt16", "UInt32", "UInt64",
];

/// Generic container definitions: (name with arity, parameter names).
const CONTAINER_DEFINITIONS: &[(&str, &[&str])] = &[
    ("List`1", &["T"]),
    ("HashSet`1", &["T"]),
    ("Queue`1", &["T"]),
    ("Stack`1", &["T"]),
    ("IEnumerable`1", &["T"]),
    ("Dictionary`2", &["TKey", "TValue"]),
    ("KeyValuePair`2", &["TKey", "TValue"]),
];

/// Seed `arena` with the builtin catalog.
pub fn seed(arena: &mut TypeArena) {
    let object = arena.alloc(NativeType::new(
        "Object",
        Some(SYSTEM),
        TypeKind::Class,
        TypeOrigin::System,
    ));

    // The universal array marker: the base of every array type.
    arena.alloc(NativeType::new(
        "Array",
        Some(SYSTEM),
        TypeKind::Class,
        TypeOrigin::System,
    ));

    let mut string = NativeType::new("String", Some(SYSTEM), TypeKind::Class, TypeOrigin::System);
    string.base = Some(object);
    arena.alloc(string);

    for name in VALUE_TYPES {
        arena.alloc(NativeType::new(
            *name,
            Some(SYSTEM),
            TypeKind::Struct,
            TypeOrigin::System,
        ));
    }

    let mut nullable = NativeType::new("Nullable`1", Some(SYSTEM), TypeKind::Struct, TypeOrigin::System);
    let param = alloc_parameter(arena, "T");
    nullable.generic_args = vec![param];
    arena.alloc(nullable);

    for (name, params) in CONTAINER_DEFINITIONS {
        let args: Vec<TypeId> = params.iter().map(|p| alloc_parameter(arena, p)).collect();
        let mut def = NativeType::new(
            *name,
            Some(SYSTEM_COLLECTIONS_GENERIC),
            if name.starts_with('I') {
                TypeKind::Interface
            } else if *name == "KeyValuePair`2" {
                TypeKind::Struct
            } else {
                TypeKind::Class
            },
            TypeOrigin::System,
        );
        def.is_enumerable = *name != "KeyValuePair`2";
        def.generic_args = args;
        arena.alloc(def);
    }
}

/// A fresh arena holding only the builtin catalog.
pub fn arena() -> TypeArena {
    let mut arena = TypeArena::new();
    seed(&mut arena);
    arena
}

fn alloc_parameter(arena: &mut TypeArena, name: &str) -> TypeId {
    let mut param = NativeType::new(name, None, TypeKind::Class, TypeOrigin::System);
    param.is_generic_parameter = true;
    arena.alloc(param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;

    #[test]
    fn test_catalog_contains_core_types() {
        let arena = arena();
        assert!(arena.find("Object", Some(SYSTEM)).is_some());
        assert!(arena.find("Array", Some(SYSTEM)).is_some());
        assert!(arena.find("String", Some(SYSTEM)).is_some());
        assert!(arena.find("Int32", Some(SYSTEM)).is_some());
        assert!(arena.find("List`1", Some(SYSTEM_COLLECTIONS_GENERIC)).is_some());
        assert!(arena.find("Nullable`1", Some(SYSTEM)).is_some());
    }

    #[test]
    fn test_container_definitions_are_enumerable() {
        let arena = arena();
        let list = arena.find("List`1", Some(SYSTEM_COLLECTIONS_GENERIC)).unwrap();
        assert!(arena.get(list).is_enumerable);
        assert!(arena.get(list).is_system_collection());

        let kvp = arena.find("KeyValuePair`2", Some(SYSTEM_COLLECTIONS_GENERIC)).unwrap();
        assert!(!arena.get(kvp).is_enumerable);
    }

    #[test]
    fn test_scalars_are_value_types() {
        let arena = arena();
        let int32 = arena.find("Int32", Some(SYSTEM)).unwrap();
        assert!(arena.get(int32).is_value_type());
        let string = arena.find("String", Some(SYSTEM)).unwrap();
        assert!(!arena.get(string).is_value_type());
    }
}
