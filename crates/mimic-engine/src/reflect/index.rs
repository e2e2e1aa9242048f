//! Indexer and native array element access
//!
//! Native arrays are addressed positionally in row-major order. For every
//! other receiver the `Item` overload is resolved from the runtime index
//! types of each call, and one `BoundProperty` is cached per distinct index
//! signature.

use std::sync::Arc;

use mimic_sdk::{
    format_params, ArrayRef, MemberDef, MemberKind, PropertyDef, ProxyError, ProxyResult,
    TypeDesc, TypeRef, Value, INDEXER_NAME,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use super::accessor::BoundProperty;
use super::binder::{arg_types, select, BindingFlags, MemberBinder};
use crate::config::OutOfRangePolicy;

/// Where indexer overloads come from
enum IndexSource {
    /// The receiver's own indexers under the given flags
    Target(BindingFlags),
    /// Only the indexers an interface contract declares
    Contract(Vec<Arc<PropertyDef>>),
}

/// Indexer access on one receiver
pub struct IndexAccessor {
    receiver: Value,
    receiver_type: TypeRef,
    source: IndexSource,
    out_of_range: OutOfRangePolicy,
    bindings: RwLock<FxHashMap<Vec<TypeDesc>, Arc<BoundProperty>>>,
}

impl IndexAccessor {
    /// Index the receiver's own indexers visible under `flags`
    pub fn new(
        receiver: Value,
        receiver_type: TypeRef,
        flags: BindingFlags,
        out_of_range: OutOfRangePolicy,
    ) -> Self {
        Self::with_source(receiver, receiver_type, IndexSource::Target(flags), out_of_range)
    }

    /// Index through the given contract indexers only.
    ///
    /// Each contract indexer must exist on the receiver with the same
    /// signature; directions the contract does not declare stay unbound.
    pub fn for_contract(
        receiver: Value,
        receiver_type: TypeRef,
        indexers: Vec<Arc<PropertyDef>>,
    ) -> Self {
        Self::with_source(
            receiver,
            receiver_type,
            IndexSource::Contract(indexers),
            OutOfRangePolicy::ReturnNull,
        )
    }

    fn with_source(
        receiver: Value,
        receiver_type: TypeRef,
        source: IndexSource,
        out_of_range: OutOfRangePolicy,
    ) -> Self {
        Self {
            receiver,
            receiver_type,
            source,
            out_of_range,
            bindings: RwLock::new(FxHashMap::default()),
        }
    }

    /// Read the element or indexer value at `indexes`
    pub fn get(&self, indexes: &[Value]) -> ProxyResult<Value> {
        if let (Value::Array(array), IndexSource::Target(_)) = (&self.receiver, &self.source) {
            return self.array_get(array, indexes);
        }
        self.binding(indexes)?.get(indexes)
    }

    /// Write the element or indexer value at `indexes`
    pub fn set(&self, indexes: &[Value], value: Value) -> ProxyResult<()> {
        if let (Value::Array(array), IndexSource::Target(_)) = (&self.receiver, &self.source) {
            return self.array_set(array, indexes, value);
        }
        self.binding(indexes)?.set(indexes, value)
    }

    /// Number of distinct index signatures bound so far
    pub fn cached_signatures(&self) -> usize {
        self.bindings.read().len()
    }

    fn binding(&self, indexes: &[Value]) -> ProxyResult<Arc<BoundProperty>> {
        let signature = arg_types(indexes);
        if let Some(bound) = self.bindings.read().get(&signature) {
            return Ok(bound.clone());
        }

        let bound = Arc::new(self.resolve(indexes)?);
        trace!(
            type_name = self.receiver_type.name(),
            signature = %format_params(&signature),
            "bound indexer"
        );
        Ok(self
            .bindings
            .write()
            .entry(signature)
            .or_insert(bound)
            .clone())
    }

    fn resolve(&self, indexes: &[Value]) -> ProxyResult<BoundProperty> {
        match &self.source {
            IndexSource::Target(flags) => {
                let property = MemberBinder::resolve_property(
                    &self.receiver_type,
                    INDEXER_NAME,
                    indexes,
                    *flags,
                )?;
                BoundProperty::bind(&property, &self.receiver, *flags)
            }
            IndexSource::Contract(indexers) => {
                let declared = select(
                    self.receiver_type.name(),
                    INDEXER_NAME,
                    indexers,
                    |p| p.index_params.as_slice(),
                    indexes,
                )?;
                let accessor = |kind: MemberKind, declared: Option<&Arc<MemberDef>>| {
                    declared.and_then(|d| {
                        MemberBinder::find_accessor(
                            &self.receiver_type,
                            kind,
                            INDEXER_NAME,
                            &d.params,
                            BindingFlags::ALL,
                        )
                    })
                };
                BoundProperty::from_accessors(
                    INDEXER_NAME,
                    accessor(MemberKind::IndexerGet, declared.getter.as_ref()),
                    accessor(MemberKind::IndexerSet, declared.setter.as_ref()),
                    &self.receiver,
                )
            }
        }
    }

    fn array_get(&self, array: &ArrayRef, indexes: &[Value]) -> ProxyResult<Value> {
        let found = positions(array, indexes)?.and_then(|p| array.get(&p));
        match (found, self.out_of_range) {
            (Some(value), _) => Ok(value),
            (None, OutOfRangePolicy::ReturnNull) => Ok(Value::Null),
            (None, OutOfRangePolicy::Error) => Err(out_of_range(array, indexes)),
        }
    }

    fn array_set(&self, array: &ArrayRef, indexes: &[Value], value: Value) -> ProxyResult<()> {
        match positions(array, indexes)? {
            Some(p) => array.set(&p, value),
            None => Err(out_of_range(array, indexes)),
        }
    }
}

/// Array positions for `indexes`; `None` if any index is negative
fn positions(array: &ArrayRef, indexes: &[Value]) -> ProxyResult<Option<Vec<usize>>> {
    if indexes.len() != array.rank() {
        return Err(ProxyError::InvalidArguments(format!(
            "array of rank {} indexed with {} index(es)",
            array.rank(),
            indexes.len()
        )));
    }
    let mut positions = Vec::with_capacity(indexes.len());
    for index in indexes {
        let index = index.as_i64().ok_or_else(|| {
            ProxyError::InvalidArguments(format!(
                "array index must be an integer, got {}",
                index.type_name()
            ))
        })?;
        match usize::try_from(index) {
            Ok(position) => positions.push(position),
            Err(_) => return Ok(None),
        }
    }
    Ok(Some(positions))
}

fn out_of_range(array: &ArrayRef, indexes: &[Value]) -> ProxyError {
    let rendered: Vec<String> = indexes.iter().map(|i| i.to_string()).collect();
    ProxyError::IndexOutOfRange {
        index: format!("[{}]", rendered.join(", ")),
        bounds: format!("{:?}", array.lengths()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::introspector::type_of;
    use mimic_sdk::{arg, ObjectRef, TypeBuilder};
    use parking_lot::Mutex;

    fn array_accessor(array: ArrayRef, policy: OutOfRangePolicy) -> IndexAccessor {
        let value = Value::Array(array);
        let ty = type_of(&value).unwrap();
        IndexAccessor::new(value, ty, BindingFlags::PUBLIC, policy)
    }

    #[test]
    fn test_one_dimensional_array() {
        let array = ArrayRef::from_values(TypeDesc::Str, vec!["One".into(), "Two".into()]);
        let index = array_accessor(array, OutOfRangePolicy::ReturnNull);
        assert_eq!(index.get(&[Value::I32(1)]).unwrap(), Value::from("Two"));
        index.set(&[Value::I32(0)], Value::from("Uno")).unwrap();
        assert_eq!(index.get(&[Value::I32(0)]).unwrap(), Value::from("Uno"));
    }

    #[test]
    fn test_two_dimensional_array() {
        let index = array_accessor(
            ArrayRef::new(TypeDesc::Str, &[2, 2]),
            OutOfRangePolicy::ReturnNull,
        );
        index
            .set(&[Value::I32(0), Value::I32(1)], Value::from("x"))
            .unwrap();
        assert_eq!(
            index.get(&[Value::I32(0), Value::I32(1)]).unwrap(),
            Value::from("x")
        );
        assert_eq!(index.get(&[Value::I32(1), Value::I32(1)]).unwrap(), Value::Null);
    }

    #[test]
    fn test_out_of_range_policies() {
        let lenient = array_accessor(
            ArrayRef::new(TypeDesc::I32, &[2]),
            OutOfRangePolicy::ReturnNull,
        );
        assert_eq!(lenient.get(&[Value::I32(5)]).unwrap(), Value::Null);
        assert_eq!(lenient.get(&[Value::I32(-1)]).unwrap(), Value::Null);
        assert!(matches!(
            lenient.set(&[Value::I32(5)], Value::I32(1)),
            Err(ProxyError::IndexOutOfRange { .. })
        ));

        let strict = array_accessor(ArrayRef::new(TypeDesc::I32, &[2]), OutOfRangePolicy::Error);
        assert!(matches!(
            strict.get(&[Value::I32(5)]),
            Err(ProxyError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_array_index_validation() {
        let index = array_accessor(
            ArrayRef::new(TypeDesc::I32, &[2, 2]),
            OutOfRangePolicy::ReturnNull,
        );
        assert!(matches!(
            index.get(&[Value::I32(0)]),
            Err(ProxyError::InvalidArguments(_))
        ));
        assert!(matches!(
            index.get(&[Value::from("a"), Value::I32(0)]),
            Err(ProxyError::InvalidArguments(_))
        ));
    }

    struct Table {
        cells: Mutex<FxHashMap<String, Value>>,
    }

    #[test]
    fn test_indexer_signature_cache() {
        let ty = TypeBuilder::<Table>::class("Table")
            .indexer(
                [TypeDesc::I32],
                TypeDesc::Any,
                |t, args| Ok(t.cells.lock().get(&arg::<i32>(args, 0)?.to_string()).cloned().into()),
                |t, args, v| {
                    t.cells.lock().insert(arg::<i32>(args, 0)?.to_string(), v);
                    Ok(())
                },
            )
            .indexer(
                [TypeDesc::Str],
                TypeDesc::Any,
                |t, args| Ok(t.cells.lock().get(&arg::<String>(args, 0)?).cloned().into()),
                |t, args, v| {
                    t.cells.lock().insert(arg::<String>(args, 0)?, v);
                    Ok(())
                },
            )
            .build()
            .unwrap();
        let table = Table {
            cells: Mutex::new(FxHashMap::default()),
        };
        let value = Value::Object(ObjectRef::new(&ty, table).unwrap());
        let index =
            IndexAccessor::new(value, ty, BindingFlags::PUBLIC, OutOfRangePolicy::ReturnNull);

        index.set(&[Value::I32(1)], Value::from("int")).unwrap();
        index.set(&[Value::from("k")], Value::from("str")).unwrap();
        assert_eq!(index.get(&[Value::I32(1)]).unwrap(), Value::from("int"));
        assert_eq!(index.get(&[Value::from("k")]).unwrap(), Value::from("str"));
        assert_eq!(index.cached_signatures(), 2);

        assert!(matches!(
            index.get(&[Value::Bool(true)]),
            Err(ProxyError::MemberNotFound { .. })
        ));
    }
}
