use async_trait::async_trait;

use crate::blockchain::model::MoveCall;
use crate::blockchain::types::{
    CoinBalance, CoinPage, DryRunResult, ObjectDataOptions, ObjectRecord, ObjectRef,
    TransactionReceipt,
};
use crate::core::address::{ObjectId, SuiAddress};
use crate::core::errors::{KitError, RpcError};
use crate::crypto::signature_utils::SerializedSignature;

/// A single Sui fullnode.
///
/// Errors are pre-classified so callers can decide between trying another
/// endpoint and giving up; see [`RpcError`].
#[async_trait]
pub trait SuiRpc: Send + Sync {
    /// Identifies the endpoint in logs and errors.
    fn url(&self) -> &str;

    /// Submit signed transaction bytes. State changing.
    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[SerializedSignature],
    ) -> Result<TransactionReceipt, RpcError>;

    async fn dry_run_transaction(&self, tx_bytes: &[u8]) -> Result<DryRunResult, RpcError>;

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectRecord>, RpcError>;

    /// One page of `owner`'s coins of `coin_type`, starting after `cursor`.
    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<CoinPage, RpcError>;

    /// Total balance of `owner`'s coins of `coin_type`.
    async fn get_balance(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<CoinBalance, RpcError>;
}

/// Gas settings handed to the transaction builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasParams {
    pub budget: u64,
    pub price: u64,
}

/// Builds unsigned transaction bytes. The transaction wire format lives
/// outside this crate; implementations typically wrap a Sui SDK.
#[async_trait]
pub trait TransactionBuilder: Send + Sync {
    /// Send `amounts[i]` MIST of gas coin to `recipients[i]`.
    async fn transfer_sui(
        &self,
        sender: &SuiAddress,
        recipients: &[SuiAddress],
        amounts: &[u64],
        gas: GasParams,
    ) -> Result<Vec<u8>, KitError>;

    /// Merge `coins` and send `amounts[i]` to `recipients[i]`.
    async fn transfer_coin(
        &self,
        sender: &SuiAddress,
        coin_type: &str,
        coins: &[ObjectRef],
        recipients: &[SuiAddress],
        amounts: &[u64],
        gas: GasParams,
    ) -> Result<Vec<u8>, KitError>;

    /// Stake `amount` MIST with `validator`.
    async fn stake_sui(
        &self,
        sender: &SuiAddress,
        amount: u64,
        validator: &SuiAddress,
        gas: GasParams,
    ) -> Result<Vec<u8>, KitError>;

    /// Transfer whole objects to `recipient`.
    async fn transfer_objects(
        &self,
        sender: &SuiAddress,
        objects: &[ObjectId],
        recipient: &SuiAddress,
        gas: GasParams,
    ) -> Result<Vec<u8>, KitError>;

    async fn move_call(
        &self,
        sender: &SuiAddress,
        call: &MoveCall,
        gas: GasParams,
    ) -> Result<Vec<u8>, KitError>;
}
