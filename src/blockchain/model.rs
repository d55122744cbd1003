//! Local cache entries for on-chain objects used as transaction inputs.
//!
//! A fully known object can be passed to a transaction builder as a complete
//! reference, saving the builder a round trip to the fullnode.

use crate::blockchain::types::{ObjectRef, TransactionEffects};
use crate::core::address::ObjectId;
use crate::core::errors::KitError;
use serde::{Deserialize, Serialize};

/// Transaction input form of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// Bare id; the builder resolves version and digest itself.
    ObjectId(ObjectId),
    ImmOrOwnedObject(ObjectRef),
    SharedObject { object_id: ObjectId, initial_shared_version: u64, mutable: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiOwnedObject {
    pub object_id: ObjectId,
    pub version: Option<u64>,
    pub digest: Option<String>,
}

impl SuiOwnedObject {
    pub fn new(object_id: ObjectId) -> Self {
        Self { object_id, version: None, digest: None }
    }

    pub fn is_full_object(&self) -> bool {
        self.version.is_some() && self.digest.is_some()
    }

    pub fn as_call_arg(&self) -> CallArg {
        match (self.version, &self.digest) {
            (Some(version), Some(digest)) => CallArg::ImmOrOwnedObject(ObjectRef {
                object_id: self.object_id,
                version,
                digest: digest.clone(),
            }),
            _ => CallArg::ObjectId(self.object_id),
        }
    }

    /// Take the post-transaction version and digest from `effects`.
    pub fn update_from_effects(
        &mut self,
        effects: Option<&TransactionEffects>,
    ) -> Result<(), KitError> {
        let effects =
            effects.ok_or_else(|| KitError::Object("transaction response has no effects".into()))?;
        let reference = effects.changed_object(&self.object_id).ok_or_else(|| {
            KitError::Object(format!("object {} not found in transaction effects", self.object_id))
        })?;
        self.version = Some(reference.version);
        self.digest = Some(reference.digest.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiSharedObject {
    pub object_id: ObjectId,
    pub initial_shared_version: Option<u64>,
}

impl SuiSharedObject {
    pub fn new(object_id: ObjectId) -> Self {
        Self { object_id, initial_shared_version: None }
    }

    pub fn as_call_arg(&self, mutable: bool) -> CallArg {
        match self.initial_shared_version {
            Some(initial_shared_version) => {
                CallArg::SharedObject { object_id: self.object_id, initial_shared_version, mutable }
            }
            None => CallArg::ObjectId(self.object_id),
        }
    }
}

/// Either kind of cached object, as refreshed by `EndpointPool::update_objects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiObject {
    Owned(SuiOwnedObject),
    Shared(SuiSharedObject),
}

impl SuiObject {
    pub fn object_id(&self) -> ObjectId {
        match self {
            SuiObject::Owned(o) => o.object_id,
            SuiObject::Shared(s) => s.object_id,
        }
    }
}

impl From<SuiOwnedObject> for SuiObject {
    fn from(o: SuiOwnedObject) -> Self {
        SuiObject::Owned(o)
    }
}

impl From<SuiSharedObject> for SuiObject {
    fn from(s: SuiSharedObject) -> Self {
        SuiObject::Shared(s)
    }
}

/// Argument of a Move call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCallArg {
    Object(CallArg),
    /// BCS-encoded pure value.
    Pure(Vec<u8>),
}

impl MoveCallArg {
    pub fn pure<T: Serialize>(value: &T) -> Result<Self, KitError> {
        bcs::to_bytes(value)
            .map(MoveCallArg::Pure)
            .map_err(|e| KitError::InvalidInput(format!("cannot encode pure argument: {}", e)))
    }
}

impl From<CallArg> for MoveCallArg {
    fn from(arg: CallArg) -> Self {
        MoveCallArg::Object(arg)
    }
}

/// A `package::module::function` call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub arguments: Vec<MoveCallArg>,
    pub type_arguments: Vec<String>,
}

impl MoveCall {
    /// Parse a target such as `0x2::coin::join`.
    pub fn new(target: &str) -> Result<Self, KitError> {
        let invalid = |reason: &str| {
            KitError::InvalidInput(format!("invalid move call target '{}': {}", target, reason))
        };
        let parts: Vec<&str> = target.trim().split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(invalid("expected package::module::function"));
        };
        if module.is_empty() || function.is_empty() {
            return Err(invalid("empty module or function name"));
        }
        let package = ObjectId::from_hex(package).map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            package,
            module: module.to_string(),
            function: function.to_string(),
            arguments: Vec::new(),
            type_arguments: Vec::new(),
        })
    }

    pub fn with_arguments(mut self, arguments: Vec<MoveCallArg>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_type_arguments(mut self, type_arguments: Vec<String>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}
