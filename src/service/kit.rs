//! 交易客户端
//!
//! `SuiKit` ties the account manager, the endpoint pool, an optional
//! multisig policy and an external transaction builder together.

use crate::account::{AccountManager, DerivePathParams};
use crate::blockchain::coin_selection::{CoinSelection, CoinSelector};
use crate::blockchain::model::{MoveCall, SuiObject};
use crate::blockchain::traits::{GasParams, TransactionBuilder};
use crate::blockchain::types::{
    CoinBalance, DryRunResult, ObjectDataOptions, ObjectRecord, TransactionReceipt, SUI_COIN_TYPE,
};
use crate::core::address::{ObjectId, SuiAddress};
use crate::core::config::KitConfig;
use crate::core::errors::KitError;
use crate::crypto::keypair::KeyMaterial;
use crate::crypto::multisig::MultiSigPolicy;
use crate::crypto::signature_utils::SerializedSignature;
use crate::network::endpoint_pool::EndpointPool;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SuiKit {
    accounts: RwLock<AccountManager>,
    pool: EndpointPool,
    builder: Arc<dyn TransactionBuilder>,
    multisig: Option<MultiSigPolicy>,
    gas: GasParams,
}

impl SuiKit {
    pub fn new(
        accounts: AccountManager,
        pool: EndpointPool,
        builder: Arc<dyn TransactionBuilder>,
        gas: GasParams,
    ) -> Self {
        Self { accounts: RwLock::new(accounts), pool, builder, multisig: None, gas }
    }

    /// Pool and gas defaults from `config`.
    pub fn from_config(
        config: &KitConfig,
        accounts: AccountManager,
        builder: Arc<dyn TransactionBuilder>,
    ) -> Result<Self, KitError> {
        let pool = EndpointPool::from_config(config)?;
        let gas = GasParams { budget: config.default_gas_budget, price: config.default_gas_price };
        Ok(Self::new(accounts, pool, builder, gas))
    }

    pub fn with_multisig(mut self, policy: MultiSigPolicy) -> Self {
        info!("multisig policy attached: {}", policy.address());
        self.multisig = Some(policy);
        self
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn gas(&self) -> GasParams {
        self.gas
    }

    pub fn current_address(&self) -> SuiAddress {
        self.accounts.read().current_address()
    }

    pub fn get_address(&self, params: Option<&DerivePathParams>) -> Result<SuiAddress, KitError> {
        Ok(self.accounts.read().get_address(params)?)
    }

    pub fn switch_account(&self, params: &DerivePathParams) -> Result<(), KitError> {
        Ok(self.accounts.write().switch_account(params)?)
    }

    pub fn multisig_address(&self) -> Option<SuiAddress> {
        self.multisig.as_ref().map(MultiSigPolicy::address)
    }

    /// Sign with the account at `params`, or the current one.
    pub fn sign_transaction(
        &self,
        tx_bytes: &[u8],
        params: Option<&DerivePathParams>,
    ) -> Result<SerializedSignature, KitError> {
        let key_pair = self.accounts.read().get_key_pair(params)?;
        Ok(key_pair.sign_transaction(tx_bytes)?)
    }

    pub async fn sign_and_send(
        &self,
        tx_bytes: &[u8],
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        let signature = self.sign_transaction(tx_bytes, params)?;
        self.submit(tx_bytes, &[signature]).await
    }

    pub async fn dry_run(&self, tx_bytes: &[u8]) -> Result<DryRunResult, KitError> {
        Ok(self.pool.dry_run_transaction(tx_bytes).await?)
    }

    pub async fn transfer_sui(
        &self,
        recipient: SuiAddress,
        amount: u64,
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        self.transfer_sui_to_many(&[recipient], &[amount], params).await
    }

    pub async fn transfer_sui_to_many(
        &self,
        recipients: &[SuiAddress],
        amounts: &[u64],
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        check_recipients(recipients, amounts)?;
        let sender = self.get_address(params)?;
        let tx_bytes = self.builder.transfer_sui(&sender, recipients, amounts, self.gas).await?;
        self.sign_and_send(&tx_bytes, params).await
    }

    pub async fn transfer_coin(
        &self,
        recipient: SuiAddress,
        amount: u64,
        coin_type: &str,
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        self.transfer_coin_to_many(&[recipient], &[amount], coin_type, params).await
    }

    /// Select coins covering the summed amount, then split them across the
    /// recipients.
    pub async fn transfer_coin_to_many(
        &self,
        recipients: &[SuiAddress],
        amounts: &[u64],
        coin_type: &str,
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        check_recipients(recipients, amounts)?;
        let total = amounts
            .iter()
            .try_fold(0u64, |acc, a| acc.checked_add(*a))
            .ok_or_else(|| KitError::InvalidInput("transfer amounts overflow u64".into()))?;

        let sender = self.get_address(params)?;
        let selection = self.select_coins_with_amount(total, coin_type, Some(sender)).await?;
        let coins = selection.object_refs();
        let tx_bytes = self
            .builder
            .transfer_coin(&sender, coin_type, &coins, recipients, amounts, self.gas)
            .await?;
        self.sign_and_send(&tx_bytes, params).await
    }

    pub async fn stake_sui(
        &self,
        amount: u64,
        validator: SuiAddress,
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        let sender = self.get_address(params)?;
        let tx_bytes = self.builder.stake_sui(&sender, amount, &validator, self.gas).await?;
        self.sign_and_send(&tx_bytes, params).await
    }

    /// Send whole objects, e.g. NFTs or unsplit coins, to `recipient`.
    pub async fn transfer_objects(
        &self,
        objects: &[ObjectId],
        recipient: SuiAddress,
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        if objects.is_empty() {
            return Err(KitError::InvalidInput("no objects to transfer".into()));
        }
        let sender = self.get_address(params)?;
        let tx_bytes =
            self.builder.transfer_objects(&sender, objects, &recipient, self.gas).await?;
        self.sign_and_send(&tx_bytes, params).await
    }

    pub async fn move_call(
        &self,
        call: &MoveCall,
        params: Option<&DerivePathParams>,
    ) -> Result<TransactionReceipt, KitError> {
        let sender = self.get_address(params)?;
        debug!("move call {} from {}", call.target(), sender);
        let tx_bytes = self.builder.move_call(&sender, call, self.gas).await?;
        self.sign_and_send(&tx_bytes, params).await
    }

    /// Balance of `coin_type` (SUI when empty) for the account at `params`.
    pub async fn get_balance(
        &self,
        coin_type: &str,
        params: Option<&DerivePathParams>,
    ) -> Result<CoinBalance, KitError> {
        let coin_type = if coin_type.trim().is_empty() { SUI_COIN_TYPE } else { coin_type };
        let owner = self.get_address(params)?;
        Ok(self.pool.get_balance(&owner, coin_type).await?)
    }

    /// Coins of `coin_type` (SUI when empty) owned by `owner` (current
    /// account when `None`) covering `amount`.
    pub async fn select_coins_with_amount(
        &self,
        amount: u64,
        coin_type: &str,
        owner: Option<SuiAddress>,
    ) -> Result<CoinSelection, KitError> {
        let coin_type = if coin_type.trim().is_empty() { SUI_COIN_TYPE } else { coin_type };
        let owner = owner.unwrap_or_else(|| self.current_address());
        Ok(CoinSelector::select_coins(&self.pool, &owner, amount, coin_type).await?)
    }

    pub async fn get_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectRecord>, KitError> {
        Ok(self.pool.get_objects(ids, &ObjectDataOptions::full_content()).await?)
    }

    pub async fn update_objects(&self, objects: &mut [SuiObject]) -> Result<(), KitError> {
        Ok(self.pool.update_objects(objects).await?)
    }

    /// Combine already collected partial signatures under the attached
    /// policy and submit.
    pub async fn send_multisig<S: AsRef<[u8]>>(
        &self,
        tx_bytes: &[u8],
        partials: &[S],
    ) -> Result<TransactionReceipt, KitError> {
        let policy = self
            .multisig
            .as_ref()
            .ok_or_else(|| KitError::InvalidInput("no multisig policy attached".into()))?;
        let combined = policy.combine(partials)?;
        debug!("submitting multisig transaction from {}", policy.address());
        self.submit(tx_bytes, &[combined]).await
    }

    async fn submit(
        &self,
        tx_bytes: &[u8],
        signatures: &[SerializedSignature],
    ) -> Result<TransactionReceipt, KitError> {
        let receipt = self.pool.submit_transaction(tx_bytes, signatures).await?;
        if receipt.is_success() {
            info!("transaction {} executed", receipt.digest);
        } else {
            warn!("transaction {} did not succeed: {:?}", receipt.digest, receipt.errors);
        }
        Ok(receipt)
    }
}

fn check_recipients(recipients: &[SuiAddress], amounts: &[u64]) -> Result<(), KitError> {
    if recipients.is_empty() {
        return Err(KitError::InvalidInput("at least one recipient is required".into()));
    }
    if recipients.len() != amounts.len() {
        return Err(KitError::InvalidInput(format!(
            "{} recipients but {} amounts",
            recipients.len(),
            amounts.len()
        )));
    }
    Ok(())
}

impl std::fmt::Debug for SuiKit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiKit")
            .field("address", &self.current_address())
            .field("pool", &self.pool)
            .field("multisig", &self.multisig_address())
            .field("gas", &self.gas)
            .finish()
    }
}
