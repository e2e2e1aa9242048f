//! Member resolution by name and parameter-type signature
//!
//! Resolution gathers the candidates of one kind and name visible under the
//! binding flags, then:
//!
//! 1. a candidate whose parameter types equal the argument types wins,
//! 2. otherwise the unique candidate whose parameters all accept the
//!    arguments wins; several are `AmbiguousMember`, none `MemberNotFound`.
//!
//! Contract binding uses `resolve_exact`, which only performs step 1.

use std::sync::Arc;

use mimic_sdk::{
    format_params, EventDef, MemberDef, MemberKind, MemberSignature, PropertyDef, ProxyError,
    ProxyResult, TypeDesc, TypeDescriptor, Value, Visibility,
};
use tracing::trace;

/// Visibility filter for member resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingFlags(u8);

impl BindingFlags {
    /// Public members
    pub const PUBLIC: BindingFlags = BindingFlags(0b01);
    /// Non-public members
    pub const NON_PUBLIC: BindingFlags = BindingFlags(0b10);
    /// Public and non-public members
    pub const ALL: BindingFlags = BindingFlags(0b11);

    /// Check if every flag in `other` is set
    pub fn contains(self, other: BindingFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if a member of the given visibility is visible
    pub fn admits(self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => self.contains(Self::PUBLIC),
            Visibility::NonPublic => self.contains(Self::NON_PUBLIC),
        }
    }
}

impl std::ops::BitOr for BindingFlags {
    type Output = BindingFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        BindingFlags(self.0 | rhs.0)
    }
}

/// Check if an argument may be passed to a parameter.
///
/// Named parameters accept objects whose type is, derives from or declares
/// the named type.
pub fn param_accepts(param: &TypeDesc, arg: &Value) -> bool {
    match (param, arg) {
        (TypeDesc::Named(name), Value::Object(object)) => {
            object.descriptor().is_assignable_to(name)
        }
        (param, arg) => param.accepts(&arg.type_desc()),
    }
}

/// Runtime types of `args`
pub fn arg_types(args: &[Value]) -> Vec<TypeDesc> {
    args.iter().map(Value::type_desc).collect()
}

/// Pick one candidate for `args`: exact parameter match first, then the
/// unique assignable one.
///
/// `type_name` and `name` only feed error messages.
pub fn select<'a, T, F>(
    type_name: &str,
    name: &str,
    candidates: &'a [T],
    params: F,
    args: &[Value],
) -> ProxyResult<&'a T>
where
    F: Fn(&'a T) -> &'a [TypeDesc],
{
    let actual = arg_types(args);
    if let Some(exact) = candidates.iter().find(|c| params(*c) == actual.as_slice()) {
        return Ok(exact);
    }

    let mut assignable = candidates.iter().filter(|c| {
        let declared = params(*c);
        declared.len() == args.len()
            && declared
                .iter()
                .zip(args)
                .all(|(param, arg)| param_accepts(param, arg))
    });
    let rendered = || format!("{}{}", name, format_params(&actual));
    match (assignable.next(), assignable.next()) {
        (Some(only), None) => Ok(only),
        (Some(_), Some(_)) => Err(ProxyError::AmbiguousMember {
            type_name: type_name.to_string(),
            member: rendered(),
        }),
        (None, _) => Err(ProxyError::member_not_found(type_name, rendered())),
    }
}

/// Resolves members on type descriptors
pub struct MemberBinder;

impl MemberBinder {
    /// Resolve a method for the given arguments
    pub fn resolve_method(
        ty: &TypeDescriptor,
        name: &str,
        args: &[Value],
        flags: BindingFlags,
    ) -> ProxyResult<Arc<MemberDef>> {
        let candidates: Vec<Arc<MemberDef>> = ty
            .methods()
            .iter()
            .filter(|m| m.name == name && flags.admits(m.visibility))
            .cloned()
            .collect();
        let member = select(ty.name(), name, &candidates, |m| m.params.as_slice(), args)?;
        trace!(type_name = ty.name(), member = %member.signature(), "resolved method");
        Ok(member.clone())
    }

    /// Resolve a property or indexer by its index arguments (empty for
    /// plain properties)
    pub fn resolve_property(
        ty: &TypeDescriptor,
        name: &str,
        index_args: &[Value],
        flags: BindingFlags,
    ) -> ProxyResult<Arc<PropertyDef>> {
        let candidates: Vec<Arc<PropertyDef>> = ty
            .properties()
            .iter()
            .filter(|p| p.name == name && p.accessors().any(|a| flags.admits(a.visibility)))
            .cloned()
            .collect();
        let property = select(
            ty.name(),
            name,
            &candidates,
            |p| p.index_params.as_slice(),
            index_args,
        )?;
        Ok(property.clone())
    }

    /// Resolve an event by name
    pub fn resolve_event(
        ty: &TypeDescriptor,
        name: &str,
        flags: BindingFlags,
    ) -> ProxyResult<Arc<EventDef>> {
        ty.events()
            .iter()
            .find(|e| e.name == name && flags.admits(e.add.visibility))
            .cloned()
            .ok_or_else(|| ProxyError::member_not_found(ty.name(), name))
    }

    /// Find the accessor with exactly this signature
    pub fn resolve_exact(
        ty: &TypeDescriptor,
        signature: &MemberSignature,
        flags: BindingFlags,
    ) -> Option<Arc<MemberDef>> {
        ty.accessors()
            .find(|a| {
                a.kind == signature.kind
                    && a.name == signature.name
                    && a.params == signature.params
                    && flags.admits(a.visibility)
            })
            .cloned()
    }

    /// Find an accessor of `kind` by name and parameter types, if visible
    pub fn find_accessor(
        ty: &TypeDescriptor,
        kind: MemberKind,
        name: &str,
        params: &[TypeDesc],
        flags: BindingFlags,
    ) -> Option<Arc<MemberDef>> {
        let signature = MemberSignature {
            kind,
            name: name.to_string(),
            params: params.to_vec(),
        };
        Self::resolve_exact(ty, &signature, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_sdk::{ObjectRef, TypeBuilder, TypeRef};

    struct Overloads;

    fn overloads() -> TypeRef {
        TypeBuilder::<Overloads>::class("Overloads")
            .method("Take", [TypeDesc::I32], TypeDesc::Str, |_, _| Ok("i32".into()))
            .method("Take", [TypeDesc::Str], TypeDesc::Str, |_, _| Ok("string".into()))
            .method("Wide", [TypeDesc::I64], TypeDesc::Str, |_, _| Ok("i64".into()))
            .method("Either", [TypeDesc::I64], TypeDesc::Str, |_, _| Ok("i64".into()))
            .method("Either", [TypeDesc::F64], TypeDesc::Str, |_, _| Ok("f64".into()))
            .method("Obj", [TypeDesc::named("Overloads")], TypeDesc::Void, |_, _| {
                Ok(Value::Unit)
            })
            .non_public()
            .method("Hidden", [], TypeDesc::Void, |_, _| Ok(Value::Unit))
            .build()
            .unwrap()
    }

    #[test]
    fn test_exact_overload() {
        let ty = overloads();
        let m = MemberBinder::resolve_method(&ty, "Take", &[Value::from("x")], BindingFlags::PUBLIC)
            .unwrap();
        assert_eq!(m.params, vec![TypeDesc::Str]);
    }

    #[test]
    fn test_assignable_overload() {
        let ty = overloads();
        let m = MemberBinder::resolve_method(&ty, "Wide", &[Value::I32(1)], BindingFlags::PUBLIC)
            .unwrap();
        assert_eq!(m.params, vec![TypeDesc::I64]);
    }

    #[test]
    fn test_ambiguous_overload() {
        let ty = overloads();
        let err =
            MemberBinder::resolve_method(&ty, "Either", &[Value::I32(1)], BindingFlags::PUBLIC)
                .unwrap_err();
        assert_eq!(
            err,
            ProxyError::AmbiguousMember {
                type_name: "Overloads".to_string(),
                member: "Either(i32)".to_string(),
            }
        );
    }

    #[test]
    fn test_not_found_renders_argument_types() {
        let ty = overloads();
        let err =
            MemberBinder::resolve_method(&ty, "Take", &[Value::Bool(true)], BindingFlags::PUBLIC)
                .unwrap_err();
        assert_eq!(err, ProxyError::member_not_found("Overloads", "Take(bool)"));
    }

    #[test]
    fn test_named_parameter_accepts_instance() {
        let ty = overloads();
        let instance = Value::Object(ObjectRef::new(&ty, Overloads).unwrap());
        let flags = BindingFlags::PUBLIC;
        assert!(MemberBinder::resolve_method(&ty, "Obj", &[instance], flags).is_ok());
        assert!(MemberBinder::resolve_method(&ty, "Obj", &[Value::Null], flags).is_ok());
    }

    #[test]
    fn test_visibility_flags() {
        let ty = overloads();
        assert!(MemberBinder::resolve_method(&ty, "Hidden", &[], BindingFlags::PUBLIC).is_err());
        assert!(MemberBinder::resolve_method(&ty, "Hidden", &[], BindingFlags::ALL).is_ok());
        assert_eq!(
            BindingFlags::PUBLIC | BindingFlags::NON_PUBLIC,
            BindingFlags::ALL
        );
    }

    #[test]
    fn test_resolve_exact_skips_assignable() {
        let ty = overloads();
        let flags = BindingFlags::ALL;
        let wide = |param: TypeDesc| {
            MemberBinder::find_accessor(&ty, MemberKind::Method, "Wide", &[param], flags)
        };
        assert!(wide(TypeDesc::I32).is_none());
        assert!(wide(TypeDesc::I64).is_some());
    }
}
