//! Builtin descriptors for strings, native arrays and primitives
//!
//! | type        | members                                                              |
//! |-------------|----------------------------------------------------------------------|
//! | `string`    | `Length`, `ToUpper()`, `ToLower()`, `Substring(i32, i32)`,           |
//! |             | `Contains(string)`, `ToCharArray()`, `Item[i32]` (read-only)         |
//! | `T[]`, ...  | `Length`, `Rank`, `GetLength(i32)`; elements are accessed natively   |
//! | primitives  | none                                                                 |
//!
//! Descriptors are built once per process and cached by type.

use std::sync::Arc;

use mimic_sdk::{
    arg, ArrayRef, DescriptorBuilder, Invoker, MemberDef, MemberKind, ProxyError, ProxyResult,
    PropertyDef, TypeDesc, TypeKind, TypeRef, Value, Visibility,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

static BUILTIN_TYPES: Lazy<Mutex<FxHashMap<TypeDesc, TypeRef>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

/// Descriptor for a non-object runtime type
pub fn builtin_type(desc: &TypeDesc) -> ProxyResult<TypeRef> {
    let mut types = BUILTIN_TYPES.lock();
    if let Some(ty) = types.get(desc) {
        return Ok(ty.clone());
    }

    let ty = match desc {
        TypeDesc::Str => string_type()?,
        TypeDesc::Array { .. } => array_type(desc)?,
        TypeDesc::Named(name) => {
            return Err(ProxyError::InvalidArguments(format!(
                "{} is not a builtin type",
                name
            )))
        }
        other => DescriptorBuilder::new(other.to_string(), TypeKind::Primitive).build()?,
    };
    types.insert(desc.clone(), ty.clone());
    Ok(ty)
}

fn method<F>(name: &str, params: Vec<TypeDesc>, returns: TypeDesc, f: F) -> MemberDef
where
    F: Fn(&Value, &[Value]) -> ProxyResult<Value> + Send + Sync + 'static,
{
    let invoker: Invoker = Arc::new(f);
    MemberDef::new(MemberKind::Method, name, params, returns).with_invoker(invoker)
}

fn readonly<F>(property: PropertyDef, f: F) -> PropertyDef
where
    F: Fn(&Value, &[Value]) -> ProxyResult<Value> + Send + Sync + 'static,
{
    let invoker: Invoker = Arc::new(f);
    property.with_getter(Some(invoker), Visibility::Public)
}

// ============================================================================
// string
// ============================================================================

fn this_str(this: &Value) -> ProxyResult<&str> {
    this.as_str()
        .ok_or_else(|| ProxyError::type_mismatch("string", this.type_name()))
}

fn char_count(s: &str) -> i32 {
    s.chars().count() as i32
}

fn string_type() -> ProxyResult<TypeRef> {
    DescriptorBuilder::new(TypeDesc::Str.to_string(), TypeKind::Class)
        .property(readonly(
            PropertyDef::new("Length", TypeDesc::I32),
            |this, _| Ok(Value::I32(char_count(this_str(this)?))),
        ))
        .property(readonly(
            PropertyDef::indexer(vec![TypeDesc::I32], TypeDesc::Char),
            |this, args| {
                let s = this_str(this)?;
                let index: i32 = arg(args, 0)?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(Value::Char)
                    .ok_or_else(|| ProxyError::IndexOutOfRange {
                        index: index.to_string(),
                        bounds: char_count(s).to_string(),
                    })
            },
        ))
        .method(method("ToUpper", vec![], TypeDesc::Str, |this, _| {
            Ok(this_str(this)?.to_uppercase().into())
        }))
        .method(method("ToLower", vec![], TypeDesc::Str, |this, _| {
            Ok(this_str(this)?.to_lowercase().into())
        }))
        .method(method(
            "Substring",
            vec![TypeDesc::I32, TypeDesc::I32],
            TypeDesc::Str,
            |this, args| {
                let s = this_str(this)?;
                let start: i32 = arg(args, 0)?;
                let length: i32 = arg(args, 1)?;
                let end = start.checked_add(length);
                if start < 0 || length < 0 || end.map_or(true, |end| end > char_count(s)) {
                    return Err(ProxyError::IndexOutOfRange {
                        index: format!("{}+{}", start, length),
                        bounds: char_count(s).to_string(),
                    });
                }
                let sub: String = s
                    .chars()
                    .skip(start as usize)
                    .take(length as usize)
                    .collect();
                Ok(sub.into())
            },
        ))
        .method(method(
            "Contains",
            vec![TypeDesc::Str],
            TypeDesc::Bool,
            |this, args| {
                let needle: String = arg(args, 0)?;
                Ok(this_str(this)?.contains(needle.as_str()).into())
            },
        ))
        .method(method(
            "ToCharArray",
            vec![],
            TypeDesc::array(TypeDesc::Char),
            |this, _| {
                let chars = this_str(this)?.chars().map(Value::Char).collect();
                Ok(ArrayRef::from_values(TypeDesc::Char, chars).into())
            },
        ))
        .build()
}

// ============================================================================
// Arrays
// ============================================================================

fn this_array(this: &Value) -> ProxyResult<&ArrayRef> {
    this.as_array()
        .ok_or_else(|| ProxyError::type_mismatch("array", this.type_name()))
}

fn array_type(desc: &TypeDesc) -> ProxyResult<TypeRef> {
    DescriptorBuilder::new(desc.to_string(), TypeKind::Array)
        .property(readonly(
            PropertyDef::new("Length", TypeDesc::I32),
            |this, _| Ok(Value::I32(this_array(this)?.len() as i32)),
        ))
        .property(readonly(
            PropertyDef::new("Rank", TypeDesc::I32),
            |this, _| Ok(Value::I32(this_array(this)?.rank() as i32)),
        ))
        .method(method(
            "GetLength",
            vec![TypeDesc::I32],
            TypeDesc::I32,
            |this, args| {
                let lengths = this_array(this)?.lengths();
                let dimension: i32 = arg(args, 0)?;
                usize::try_from(dimension)
                    .ok()
                    .and_then(|d| lengths.get(d))
                    .map(|len| Value::I32(*len as i32))
                    .ok_or_else(|| ProxyError::IndexOutOfRange {
                        index: dimension.to_string(),
                        bounds: lengths.len().to_string(),
                    })
            },
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(ty: &TypeRef, name: &str, this: &Value, args: &[Value]) -> ProxyResult<Value> {
        let member = ty
            .methods()
            .iter()
            .find(|m| m.name == name)
            .unwrap()
            .clone();
        (member.invoker().unwrap())(this, args)
    }

    fn read(ty: &TypeRef, name: &str, this: &Value, args: &[Value]) -> ProxyResult<Value> {
        let property = ty.properties().iter().find(|p| p.name == name).unwrap();
        (property.getter.as_ref().unwrap().invoker().unwrap())(this, args)
    }

    #[test]
    fn test_string_members() {
        let ty = builtin_type(&TypeDesc::Str).unwrap();
        let s = Value::from("SomeText");
        assert_eq!(read(&ty, "Length", &s, &[]).unwrap(), Value::I32(8));
        assert_eq!(call(&ty, "ToUpper", &s, &[]).unwrap(), Value::from("SOMETEXT"));
        assert_eq!(
            call(&ty, "Substring", &s, &[Value::I32(4), Value::I32(4)]).unwrap(),
            Value::from("Text")
        );
        assert_eq!(
            call(&ty, "Contains", &s, &[Value::from("Te")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(read(&ty, "Item", &s, &[Value::I32(1)]).unwrap(), Value::Char('o'));
    }

    #[test]
    fn test_string_bounds() {
        let ty = builtin_type(&TypeDesc::Str).unwrap();
        let s = Value::from("abc");
        assert!(matches!(
            call(&ty, "Substring", &s, &[Value::I32(2), Value::I32(5)]),
            Err(ProxyError::IndexOutOfRange { .. })
        ));
        assert!(read(&ty, "Item", &s, &[Value::I32(-1)]).is_err());
    }

    #[test]
    fn test_substring_end_overflow() {
        let ty = builtin_type(&TypeDesc::Str).unwrap();
        let s = Value::from("abc");
        assert!(matches!(
            call(&ty, "Substring", &s, &[Value::I32(i32::MAX), Value::I32(1)]),
            Err(ProxyError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            call(&ty, "Substring", &s, &[Value::I32(1), Value::I32(i32::MAX)]),
            Err(ProxyError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_string_indexer_is_read_only() {
        let ty = builtin_type(&TypeDesc::Str).unwrap();
        let item = ty.indexers().next().unwrap();
        assert!(item.can_read());
        assert!(!item.can_write());
    }

    #[test]
    fn test_to_char_array() {
        let ty = builtin_type(&TypeDesc::Str).unwrap();
        let chars = call(&ty, "ToCharArray", &Value::from("ab"), &[]).unwrap();
        let array = chars.as_array().unwrap();
        assert_eq!(array.to_vec(), vec![Value::Char('a'), Value::Char('b')]);
    }

    #[test]
    fn test_array_members() {
        let desc = TypeDesc::array_of_rank(TypeDesc::I32, 2);
        let ty = builtin_type(&desc).unwrap();
        let grid = Value::Array(ArrayRef::new(TypeDesc::I32, &[2, 3]));
        assert_eq!(read(&ty, "Length", &grid, &[]).unwrap(), Value::I32(6));
        assert_eq!(read(&ty, "Rank", &grid, &[]).unwrap(), Value::I32(2));
        assert_eq!(
            call(&ty, "GetLength", &grid, &[Value::I32(1)]).unwrap(),
            Value::I32(3)
        );
        assert!(call(&ty, "GetLength", &grid, &[Value::I32(2)]).is_err());
    }

    #[test]
    fn test_primitives_have_no_members() {
        let ty = builtin_type(&TypeDesc::I64).unwrap();
        assert_eq!(ty.name(), "i64");
        assert_eq!(ty.accessors().count(), 0);
    }

    #[test]
    fn test_named_is_not_builtin() {
        assert!(builtin_type(&TypeDesc::named("Dummy")).is_err());
    }
}
