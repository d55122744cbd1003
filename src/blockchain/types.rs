//! Sui JSON-RPC payloads consumed by the toolkit.
//!
//! Only the fields the toolkit reads are modelled; the node may send more.

use crate::core::address::{ObjectId, SuiAddress};
use crate::tools::serdes::{opt_u64_string, u128_string, u64_string};
use serde::{Deserialize, Serialize};

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Who owns an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(SuiAddress),
    ObjectOwner(SuiAddress),
    Shared {
        #[serde(with = "u64_string")]
        initial_shared_version: u64,
    },
    Immutable,
}

/// `(id, version, digest)` of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    #[serde(with = "u64_string")]
    pub version: u64,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRecord {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    #[serde(with = "u64_string")]
    pub version: u64,
    pub digest: String,
    #[serde(with = "u64_string")]
    pub balance: u64,
    #[serde(default)]
    pub previous_transaction: Option<String>,
}

impl CoinRecord {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            object_id: self.coin_object_id,
            version: self.version,
            digest: self.digest.clone(),
        }
    }
}

/// One page of `suix_getCoins`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<CoinRecord>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// `suix_getBalance` result: one coin type summed over all of an owner's
/// coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub coin_type: String,
    #[serde(default)]
    pub coin_object_count: u64,
    #[serde(with = "u128_string")]
    pub total_balance: u128,
}

/// What `sui_multiGetObjects` should include per object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDataOptions {
    pub show_type: bool,
    pub show_owner: bool,
    pub show_previous_transaction: bool,
    pub show_display: bool,
    pub show_content: bool,
    pub show_bcs: bool,
    pub show_storage_rebate: bool,
}

impl ObjectDataOptions {
    /// Type, owner and content; what `get_objects` asks for by default.
    pub fn full_content() -> Self {
        Self { show_type: true, show_owner: true, show_content: true, ..Self::default() }
    }

    /// Just what a version refresh needs.
    pub fn owner_only() -> Self {
        Self { show_owner: true, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: ObjectId,
    #[serde(with = "u64_string")]
    pub version: u64,
    pub digest: String,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub previous_transaction: Option<String>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

/// One entry of a `sui_multiGetObjects` result; `data` is absent when the
/// node reports an error for that id (deleted, not found, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ObjectRecord {
    pub fn object_id(&self) -> Option<ObjectId> {
        self.data.as_ref().map(|d| d.object_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedObjectRef {
    pub owner: Owner,
    pub reference: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(with = "u64_string")]
    pub computation_cost: u64,
    #[serde(with = "u64_string")]
    pub storage_cost: u64,
    #[serde(with = "u64_string")]
    pub storage_rebate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub mutated: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub unwrapped: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub gas_used: Option<GasCostSummary>,
    #[serde(default)]
    pub transaction_digest: Option<String>,
}

impl TransactionEffects {
    /// Output reference of `object_id` if the transaction created, mutated
    /// or unwrapped it.
    pub fn changed_object(&self, object_id: &ObjectId) -> Option<&ObjectRef> {
        self.mutated
            .iter()
            .chain(self.created.iter())
            .chain(self.unwrapped.iter())
            .map(|o| &o.reference)
            .find(|r| &r.object_id == object_id)
    }
}

/// `sui_executeTransactionBlock` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub digest: String,
    #[serde(default)]
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub confirmed_local_execution: Option<bool>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub object_changes: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub balance_changes: Option<Vec<serde_json::Value>>,
    #[serde(default, with = "opt_u64_string")]
    pub checkpoint: Option<u64>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.effects.as_ref().map(|e| e.status.is_success()).unwrap_or(false)
    }
}

/// `sui_dryRunTransactionBlock` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResult {
    pub effects: TransactionEffects,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    #[serde(default)]
    pub object_changes: Vec<serde_json::Value>,
    #[serde(default)]
    pub balance_changes: Vec<serde_json::Value>,
}
