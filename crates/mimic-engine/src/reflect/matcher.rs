//! Structural satisfaction of interface contracts
//!
//! A candidate type satisfies an interface when, independently for methods,
//! properties (indexers included) and events, every signature the interface
//! requires is present on the candidate. Candidate members of any visibility
//! count; declared inheritance plays no part.

use std::sync::Arc;

use mimic_sdk::{
    EventDef, MemberDef, MemberSignature, PropertyDef, ProxyError, ProxyResult, TypeDescriptor,
    TypeRef,
};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Members an interface requires, in declaration order
#[derive(Debug, Clone)]
pub struct InterfaceContract {
    interface: TypeRef,
    methods: Vec<Arc<MemberDef>>,
    properties: Vec<Arc<PropertyDef>>,
    indexers: Vec<Arc<PropertyDef>>,
    events: Vec<Arc<EventDef>>,
}

impl InterfaceContract {
    /// Introspect `interface`; non-interface types are `InvalidArguments`
    pub fn of(interface: &TypeRef) -> ProxyResult<Self> {
        if !interface.is_interface() {
            return Err(ProxyError::InvalidArguments(format!(
                "{} is not an interface",
                interface.name()
            )));
        }
        let (indexers, properties): (Vec<_>, Vec<_>) = interface
            .properties()
            .iter()
            .cloned()
            .partition(|p| p.is_indexer());
        Ok(Self {
            interface: interface.clone(),
            methods: interface.methods().to_vec(),
            properties,
            indexers,
            events: interface.events().to_vec(),
        })
    }

    /// Interface this contract was built from
    pub fn interface(&self) -> &TypeRef {
        &self.interface
    }

    /// Required methods
    pub fn methods(&self) -> &[Arc<MemberDef>] {
        &self.methods
    }

    /// Required plain properties
    pub fn properties(&self) -> &[Arc<PropertyDef>] {
        &self.properties
    }

    /// Required indexers
    pub fn indexers(&self) -> &[Arc<PropertyDef>] {
        &self.indexers
    }

    /// Required events
    pub fn events(&self) -> &[Arc<EventDef>] {
        &self.events
    }

    /// Required method signatures
    pub fn method_signatures(&self) -> Vec<MemberSignature> {
        self.methods.iter().map(|m| m.signature()).collect()
    }

    /// Required property and indexer accessor signatures
    pub fn property_signatures(&self) -> Vec<MemberSignature> {
        self.properties
            .iter()
            .chain(&self.indexers)
            .flat_map(|p| p.accessors())
            .map(|a| a.signature())
            .collect()
    }

    /// Required event accessor signatures
    pub fn event_signatures(&self) -> Vec<MemberSignature> {
        self.events
            .iter()
            .flat_map(|e| [e.add.signature(), e.remove.signature()])
            .collect()
    }
}

/// Structural interface check
pub struct StructuralMatcher;

impl StructuralMatcher {
    /// Every contract signature missing from `candidate`, grouped as
    /// methods, properties, events
    pub fn missing(
        candidate: &TypeDescriptor,
        contract: &InterfaceContract,
    ) -> Vec<MemberSignature> {
        let available: FxHashSet<MemberSignature> =
            candidate.accessors().map(|a| a.signature()).collect();
        let groups = [
            contract.method_signatures(),
            contract.property_signatures(),
            contract.event_signatures(),
        ];
        groups
            .into_iter()
            .flatten()
            .filter(|s| !available.contains(s))
            .collect()
    }

    /// Check if `candidate` satisfies every group of `contract`
    pub fn satisfies(candidate: &TypeDescriptor, contract: &InterfaceContract) -> bool {
        Self::missing(candidate, contract).is_empty()
    }

    /// Check if `candidate` satisfies `target`; non-interfaces never do
    pub fn satisfies_type(candidate: &TypeDescriptor, target: &TypeRef) -> bool {
        match InterfaceContract::of(target) {
            Ok(contract) => Self::satisfies(candidate, &contract),
            Err(_) => false,
        }
    }

    /// Like `satisfies`, failing with `StructuralMismatch` that lists every
    /// missing signature
    pub fn check(candidate: &TypeDescriptor, contract: &InterfaceContract) -> ProxyResult<()> {
        let missing = Self::missing(candidate, contract);
        if missing.is_empty() {
            return Ok(());
        }
        debug!(
            type_name = candidate.name(),
            interface = contract.interface().name(),
            missing = missing.len(),
            "structural mismatch"
        );
        Err(ProxyError::StructuralMismatch {
            type_name: candidate.name().to_string(),
            interface: contract.interface().name().to_string(),
            missing: missing.iter().map(|s| s.to_string()).collect(),
        })
    }
}
