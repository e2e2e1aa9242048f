//! Error types shared by the SDK and the engine

/// Result type for every binding, forwarding and conversion operation
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Errors surfaced by member resolution, dispatch and adaptation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
    /// No member matches the requested name and signature
    #[error("Member not found: {type_name}.{member}")]
    MemberNotFound {
        /// Type that was searched
        type_name: String,
        /// Requested member, rendered with its argument types
        member: String,
    },

    /// More than one overload accepts the given argument types
    #[error("Ambiguous member: {type_name}.{member}")]
    AmbiguousMember {
        /// Type that was searched
        type_name: String,
        /// Requested member, rendered with its argument types
        member: String,
    },

    /// Candidate type does not structurally satisfy an interface
    #[error("Type {type_name} does not satisfy {interface}: missing {}", .missing.join(", "))]
    StructuralMismatch {
        /// Candidate type name
        type_name: String,
        /// Interface name
        interface: String,
        /// Every required signature the candidate lacks
        missing: Vec<String>,
    },

    /// The member has no getter
    #[error("The property \"{member}\" is not readable.")]
    NotReadable {
        /// Property name
        member: String,
    },

    /// The member has no setter
    #[error("The property \"{member}\" is not writable.")]
    NotWritable {
        /// Property name
        member: String,
    },

    /// Binding was constructed over a missing or unimplemented member
    #[error("Invalid binding: {0}")]
    InvalidBinding(String),

    /// Conversion target is neither an ancestor nor a satisfied interface
    #[error("Cannot convert type {from} to {to}.")]
    IncompatibleConversion {
        /// Source type name
        from: String,
        /// Target type name
        to: String,
    },

    /// Missing or malformed argument at construction or call time
    #[error("Argument error: {0}")]
    InvalidArguments(String),

    /// A value does not fit the declared type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Runtime type of the value
        got: String,
    },

    /// Wrong number of arguments for a bound member
    #[error("{member} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Member signature
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Array write outside the declared bounds
    #[error("Index {index} is out of range for bounds {bounds}")]
    IndexOutOfRange {
        /// Requested position
        index: String,
        /// Array dimension lengths
        bounds: String,
    },

    /// Named type is absent from a loaded module
    #[error("The type {type_name} could not be loaded from {module}.")]
    TypeNotFound {
        /// Requested type name
        type_name: String,
        /// Module name or path
        module: String,
    },

    /// External module could not be loaded
    #[error("Load error: {0}")]
    Load(String),

    /// Adapter manifest could not be written or read
    #[error("Artifact error: {0}")]
    Artifact(String),
}

impl ProxyError {
    /// Build a `MemberNotFound` error
    pub fn member_not_found(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        ProxyError::MemberNotFound {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Build a `TypeMismatch` error
    pub fn type_mismatch(expected: impl ToString, got: impl ToString) -> Self {
        ProxyError::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
