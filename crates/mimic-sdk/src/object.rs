//! Reference types: described objects, native arrays and event handlers
//!
//! All three are cheap to clone and compare by identity.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptor::TypeRef;
use crate::error::{ProxyError, ProxyResult};
use crate::types::TypeDesc;
use crate::value::Value;

// ============================================================================
// ObjectRef
// ============================================================================

/// Shared reference to an instance of a described type.
///
/// The payload is the host Rust value; the descriptor carries the member
/// table used to reach it dynamically.
#[derive(Clone)]
pub struct ObjectRef {
    descriptor: TypeRef,
    payload: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    /// Create an instance of `descriptor` owning `payload`.
    ///
    /// Fails with `TypeMismatch` if the descriptor was built for a different
    /// payload type, and with `InvalidArguments` for interface descriptors.
    pub fn new<T: Any + Send + Sync>(descriptor: &TypeRef, payload: T) -> ProxyResult<Self> {
        Self::from_arc(descriptor, Arc::new(payload))
    }

    /// Create an instance sharing an existing payload
    pub fn from_arc(
        descriptor: &TypeRef,
        payload: Arc<dyn Any + Send + Sync>,
    ) -> ProxyResult<Self> {
        if descriptor.is_interface() {
            return Err(ProxyError::InvalidArguments(format!(
                "cannot instantiate interface {}",
                descriptor.name()
            )));
        }
        if let Some(expected) = descriptor.payload_type() {
            if (*payload).type_id() != expected {
                return Err(ProxyError::type_mismatch(
                    descriptor.name(),
                    "foreign payload",
                ));
            }
        }
        Ok(Self {
            descriptor: descriptor.clone(),
            payload,
        })
    }

    /// Type descriptor of this instance
    pub fn descriptor(&self) -> &TypeRef {
        &self.descriptor
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Check whether both references point at the same instance
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.payload) as *const (),
            Arc::as_ptr(&other.payload) as *const (),
        )
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{:p}",
            self.descriptor.name(),
            Arc::as_ptr(&self.payload) as *const ()
        )
    }
}

// ============================================================================
// ArrayRef
// ============================================================================

/// Storage behind an `ArrayRef`
struct ArrayData {
    element: TypeDesc,
    lengths: Vec<usize>,
    items: Vec<Value>,
}

impl ArrayData {
    /// Row-major offset of `indices`, or `None` if out of bounds
    fn offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.lengths.len() {
            return None;
        }
        let mut offset = 0;
        for (index, length) in indices.iter().zip(&self.lengths) {
            if index >= length {
                return None;
            }
            offset = offset * length + index;
        }
        Some(offset)
    }
}

/// Shared, fixed-size, possibly multi-dimensional native array.
///
/// Elements start at the element type's default value.
#[derive(Clone)]
pub struct ArrayRef(Arc<RwLock<ArrayData>>);

impl ArrayRef {
    /// Create a default-initialized array with the given dimension lengths
    pub fn new(element: TypeDesc, lengths: &[usize]) -> Self {
        let lengths = if lengths.is_empty() {
            vec![0]
        } else {
            lengths.to_vec()
        };
        let total = lengths.iter().product();
        let items = vec![element.default_value(); total];
        ArrayRef(Arc::new(RwLock::new(ArrayData {
            element,
            lengths,
            items,
        })))
    }

    /// Create a one-dimensional array holding `values`
    pub fn from_values(element: TypeDesc, values: Vec<Value>) -> Self {
        ArrayRef(Arc::new(RwLock::new(ArrayData {
            element,
            lengths: vec![values.len()],
            items: values,
        })))
    }

    /// Element type
    pub fn element_type(&self) -> TypeDesc {
        self.0.read().element.clone()
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.0.read().lengths.len()
    }

    /// Length of every dimension
    pub fn lengths(&self) -> Vec<usize> {
        self.0.read().lengths.clone()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.0.read().items.len()
    }

    /// Check if the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Array type (`T[]`, `T[,]`, ...)
    pub fn type_desc(&self) -> TypeDesc {
        let data = self.0.read();
        TypeDesc::array_of_rank(data.element.clone(), data.lengths.len())
    }

    /// Read the element at `indices`, or `None` if out of bounds
    pub fn get(&self, indices: &[usize]) -> Option<Value> {
        let data = self.0.read();
        data.offset(indices).map(|offset| data.items[offset].clone())
    }

    /// Write the element at `indices`, coercing to the element type
    pub fn set(&self, indices: &[usize], value: Value) -> ProxyResult<()> {
        let mut data = self.0.write();
        let value = data.element.coerce(value)?;
        match data.offset(indices) {
            Some(offset) => {
                data.items[offset] = value;
                Ok(())
            }
            None => Err(ProxyError::IndexOutOfRange {
                index: format!("{:?}", indices),
                bounds: format!("{:?}", data.lengths),
            }),
        }
    }

    /// Copy all elements in row-major order
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().items.clone()
    }

    /// Check whether both references point at the same array
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        f.debug_struct("ArrayRef")
            .field("element", &data.element)
            .field("lengths", &data.lengths)
            .finish()
    }
}

// ============================================================================
// HandlerRef
// ============================================================================

/// Event handler callable
pub type HandlerFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// Event handler (delegate). Equality is identity, so the same handler can
/// be removed after being added.
#[derive(Clone)]
pub struct HandlerRef(Arc<HandlerFn>);

impl HandlerRef {
    /// Wrap a closure as a handler
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        HandlerRef(Arc::new(f))
    }

    /// Invoke the handler
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Check whether both references are the same handler
    pub fn ptr_eq(&self, other: &HandlerRef) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerRef({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}
