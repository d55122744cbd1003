// tests/util.rs
// Shared test doubles for the endpoint pool, coin selection and SuiKit tests
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sui_kit::blockchain::types::{
    CoinBalance, CoinPage, CoinRecord, DryRunResult, ExecutionStatus, ObjectData, ObjectDataOptions,
    ObjectRecord, Owner, TransactionEffects, TransactionReceipt,
};
use sui_kit::blockchain::{GasParams, MoveCall, ObjectRef, SuiRpc, TransactionBuilder};
use sui_kit::core::{KitError, ObjectId, RpcError, SuiAddress};
use sui_kit::crypto::SerializedSignature;

pub const MNEMONIC: &str =
    "elite balcony laundry unique quit flee farm dry buddy outside airport service";

/// How a scripted call ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Succeed,
    Retryable,
    Rejected,
    UnknownOutcome,
}

/// Scripted `SuiRpc`. Each call pops the next mode from the script and falls
/// back to the default mode once the script is empty.
pub struct MockRpc {
    url: String,
    default_mode: Mode,
    script: Mutex<VecDeque<Mode>>,
    calls: AtomicUsize,
    pub object_batches: Mutex<Vec<usize>>,
    pub objects: Mutex<HashMap<ObjectId, ObjectData>>,
    pub coin_pages: Mutex<VecDeque<CoinPage>>,
    pub balances: Mutex<HashMap<String, u128>>,
    pub balance_queries: Mutex<Vec<(SuiAddress, String)>>,
    pub submitted: Mutex<Vec<(Vec<u8>, Vec<SerializedSignature>)>>,
}

impl MockRpc {
    pub fn new(url: &str, default_mode: Mode) -> Self {
        Self {
            url: url.to_string(),
            default_mode,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            object_batches: Mutex::new(Vec::new()),
            objects: Mutex::new(HashMap::new()),
            coin_pages: Mutex::new(VecDeque::new()),
            balances: Mutex::new(HashMap::new()),
            balance_queries: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(self, modes: &[Mode]) -> Self {
        self.script.lock().extend(modes.iter().copied());
        self
    }

    pub fn with_coin_pages(self, pages: Vec<CoinPage>) -> Self {
        self.coin_pages.lock().extend(pages);
        self
    }

    pub fn with_balance(self, coin_type: &str, total: u128) -> Self {
        self.balances.lock().insert(coin_type.to_string(), total);
        self
    }

    pub fn with_object(self, data: ObjectData) -> Self {
        self.objects.lock().insert(data.object_id, data);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<(), RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mode = self.script.lock().pop_front().unwrap_or(self.default_mode);
        match mode {
            Mode::Succeed => Ok(()),
            Mode::Retryable => Err(RpcError::retryable(&self.url, "connection refused")),
            Mode::Rejected => Err(RpcError::rejected(&self.url, "invalid params")),
            Mode::UnknownOutcome => Err(RpcError::unknown_outcome(&self.url, "timed out")),
        }
    }
}

#[async_trait]
impl SuiRpc for MockRpc {
    fn url(&self) -> &str {
        &self.url
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[SerializedSignature],
    ) -> Result<TransactionReceipt, RpcError> {
        self.next()?;
        self.submitted.lock().push((tx_bytes.to_vec(), signatures.to_vec()));
        Ok(receipt("Digest1"))
    }

    async fn dry_run_transaction(&self, _tx_bytes: &[u8]) -> Result<DryRunResult, RpcError> {
        self.next()?;
        Ok(DryRunResult {
            effects: success_effects(),
            events: vec![],
            object_changes: vec![],
            balance_changes: vec![],
        })
    }

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        _options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectRecord>, RpcError> {
        self.next()?;
        self.object_batches.lock().push(ids.len());
        let objects = self.objects.lock();
        Ok(ids
            .iter()
            .map(|id| ObjectRecord {
                data: Some(objects.get(id).cloned().unwrap_or_else(|| object_data(*id, 1, None))),
                error: None,
            })
            .collect())
    }

    async fn get_coins(
        &self,
        _owner: &SuiAddress,
        _coin_type: &str,
        _cursor: Option<&str>,
    ) -> Result<CoinPage, RpcError> {
        self.next()?;
        Ok(self.coin_pages.lock().pop_front().unwrap_or_default())
    }

    async fn get_balance(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<CoinBalance, RpcError> {
        self.next()?;
        self.balance_queries.lock().push((*owner, coin_type.to_string()));
        let total_balance = self.balances.lock().get(coin_type).copied().unwrap_or(0);
        Ok(CoinBalance {
            coin_type: coin_type.to_string(),
            coin_object_count: u64::from(total_balance > 0),
            total_balance,
        })
    }
}

pub fn pool_of(mocks: &[Arc<MockRpc>]) -> Vec<Arc<dyn SuiRpc>> {
    mocks.iter().map(|m| Arc::clone(m) as Arc<dyn SuiRpc>).collect()
}

pub fn id(n: u8) -> ObjectId {
    ObjectId::new([n; 32])
}

pub fn success_effects() -> TransactionEffects {
    TransactionEffects {
        status: ExecutionStatus { status: "success".into(), error: None },
        created: vec![],
        mutated: vec![],
        unwrapped: vec![],
        gas_used: None,
        transaction_digest: None,
    }
}

pub fn receipt(digest: &str) -> TransactionReceipt {
    TransactionReceipt {
        digest: digest.to_string(),
        effects: Some(success_effects()),
        confirmed_local_execution: Some(true),
        errors: vec![],
        object_changes: None,
        balance_changes: None,
        checkpoint: None,
    }
}

pub fn object_data(object_id: ObjectId, version: u64, owner: Option<Owner>) -> ObjectData {
    ObjectData {
        object_id,
        version,
        digest: format!("digest-{}", version),
        object_type: None,
        owner,
        previous_transaction: None,
        content: None,
    }
}

pub fn coin(n: u8, balance: u64) -> CoinRecord {
    CoinRecord {
        coin_type: "0x2::sui::SUI".into(),
        coin_object_id: id(n),
        version: u64::from(n),
        digest: format!("coin-{}", n),
        balance,
        previous_transaction: None,
    }
}

pub fn page(coins: Vec<CoinRecord>, next_cursor: Option<&str>) -> CoinPage {
    CoinPage {
        data: coins,
        next_cursor: next_cursor.map(str::to_string),
        has_next_page: next_cursor.is_some(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuilderCall {
    TransferSui {
        sender: SuiAddress,
        recipients: Vec<SuiAddress>,
        amounts: Vec<u64>,
        gas: GasParams,
    },
    TransferCoin {
        sender: SuiAddress,
        coin_type: String,
        coins: Vec<ObjectId>,
        amounts: Vec<u64>,
    },
    Stake {
        sender: SuiAddress,
        amount: u64,
        validator: SuiAddress,
    },
    TransferObjects {
        sender: SuiAddress,
        objects: Vec<ObjectId>,
        recipient: SuiAddress,
    },
    MoveCall {
        sender: SuiAddress,
        call: MoveCall,
    },
}

/// Records builder calls and returns a fixed byte string per kind.
#[derive(Default)]
pub struct MockBuilder {
    pub calls: Mutex<Vec<BuilderCall>>,
}

#[async_trait]
impl TransactionBuilder for MockBuilder {
    async fn transfer_sui(
        &self,
        sender: &SuiAddress,
        recipients: &[SuiAddress],
        amounts: &[u64],
        gas: GasParams,
    ) -> Result<Vec<u8>, KitError> {
        self.calls.lock().push(BuilderCall::TransferSui {
            sender: *sender,
            recipients: recipients.to_vec(),
            amounts: amounts.to_vec(),
            gas,
        });
        Ok(b"transfer_sui".to_vec())
    }

    async fn transfer_coin(
        &self,
        sender: &SuiAddress,
        coin_type: &str,
        coins: &[ObjectRef],
        _recipients: &[SuiAddress],
        amounts: &[u64],
        _gas: GasParams,
    ) -> Result<Vec<u8>, KitError> {
        self.calls.lock().push(BuilderCall::TransferCoin {
            sender: *sender,
            coin_type: coin_type.to_string(),
            coins: coins.iter().map(|c| c.object_id).collect(),
            amounts: amounts.to_vec(),
        });
        Ok(b"transfer_coin".to_vec())
    }

    async fn stake_sui(
        &self,
        sender: &SuiAddress,
        amount: u64,
        validator: &SuiAddress,
        _gas: GasParams,
    ) -> Result<Vec<u8>, KitError> {
        self.calls.lock().push(BuilderCall::Stake {
            sender: *sender,
            amount,
            validator: *validator,
        });
        Ok(b"stake".to_vec())
    }

    async fn transfer_objects(
        &self,
        sender: &SuiAddress,
        objects: &[ObjectId],
        recipient: &SuiAddress,
        _gas: GasParams,
    ) -> Result<Vec<u8>, KitError> {
        self.calls.lock().push(BuilderCall::TransferObjects {
            sender: *sender,
            objects: objects.to_vec(),
            recipient: *recipient,
        });
        Ok(b"transfer_objects".to_vec())
    }

    async fn move_call(
        &self,
        sender: &SuiAddress,
        call: &MoveCall,
        _gas: GasParams,
    ) -> Result<Vec<u8>, KitError> {
        self.calls.lock().push(BuilderCall::MoveCall { sender: *sender, call: call.clone() });
        Ok(b"move_call".to_vec())
    }
}
