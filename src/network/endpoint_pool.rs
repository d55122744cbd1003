// src/network/endpoint_pool.rs
//! 多节点故障转移
//!
//! Every call walks the endpoints starting at the current one, waiting the
//! retry policy's delay between attempts. A success makes that endpoint the
//! current one for later calls.

use crate::blockchain::coin_selection::CoinPageFetcher;
use crate::blockchain::model::SuiObject;
use crate::blockchain::traits::SuiRpc;
use crate::blockchain::types::{
    CoinBalance, CoinPage, DryRunResult, ObjectDataOptions, ObjectRecord, Owner,
    TransactionReceipt,
};
use crate::core::address::{ObjectId, SuiAddress};
use crate::core::config::KitConfig;
use crate::core::errors::{EndpointPoolError, RpcError};
use crate::crypto::signature_utils::SerializedSignature;
use crate::network::json_rpc::JsonRpcEndpoint;
use crate::tools::async_support::{batch, RetryPolicy};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_OBJECT_BATCH_SIZE: usize = 50;

pub struct EndpointPool {
    endpoints: Vec<Arc<dyn SuiRpc>>,
    /// Best-effort hint; concurrent calls may race on it harmlessly.
    current: AtomicUsize,
    retry: RetryPolicy,
    batch_size: usize,
}

impl EndpointPool {
    pub fn new(
        endpoints: Vec<Arc<dyn SuiRpc>>,
        retry: RetryPolicy,
    ) -> Result<Self, EndpointPoolError> {
        if endpoints.is_empty() {
            return Err(EndpointPoolError::NoEndpoints);
        }
        Ok(Self {
            endpoints,
            current: AtomicUsize::new(0),
            retry,
            batch_size: DEFAULT_OBJECT_BATCH_SIZE,
        })
    }

    /// Max ids per `multi_get_objects` call. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// One `JsonRpcEndpoint` per configured fullnode url.
    pub fn from_config(config: &KitConfig) -> Result<Self, EndpointPoolError> {
        let mut endpoints: Vec<Arc<dyn SuiRpc>> = Vec::new();
        for url in config.resolved_fullnode_urls() {
            let endpoint = JsonRpcEndpoint::with_timeout(url, config.request_timeout())
                .map_err(|source| EndpointPoolError::Rejected {
                    operation: "create endpoint".to_string(),
                    source,
                })?
                .with_coin_page_limit(config.coin_page_limit);
            endpoints.push(Arc::new(endpoint));
        }
        info!("endpoint pool: {} fullnodes on {}", endpoints.len(), config.network.as_str());
        let pool = Self::new(endpoints, config.retry.to_policy())?;
        Ok(pool.with_batch_size(config.object_batch_size))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire) % self.endpoints.len()
    }

    pub fn current_endpoint(&self) -> Arc<dyn SuiRpc> {
        Arc::clone(&self.endpoints[self.current_index()])
    }

    /// Make `index` the first endpoint tried; wraps around the pool size.
    pub fn switch_endpoint(&self, index: usize) {
        let index = index % self.endpoints.len();
        self.current.store(index, Ordering::Release);
        info!("切换到节点 {}: {}", index, self.endpoints[index].url());
    }

    pub fn switch_to_next(&self) {
        self.switch_endpoint(self.current_index() + 1);
    }

    /// Run `op` against each endpoint in turn until one succeeds.
    ///
    /// `Retryable` failures move on to the next endpoint after a backoff
    /// delay. `Rejected` and `UnknownOutcome` abort immediately; the latter
    /// may have changed chain state and is never resubmitted.
    pub async fn execute<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, EndpointPoolError>
    where
        F: Fn(Arc<dyn SuiRpc>) -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let total = self.endpoints.len();
        let start = self.current_index();
        let mut last: Option<RpcError> = None;

        for attempt in 0..total {
            if attempt > 0 {
                let delay = self.retry.delay_after(attempt as u32);
                if !delay.is_zero() {
                    debug!("{}: waiting {:?} before next endpoint", operation, delay);
                    tokio::time::sleep(delay).await;
                }
            }

            let index = (start + attempt) % total;
            let endpoint = Arc::clone(&self.endpoints[index]);
            match op(endpoint).await {
                Ok(value) => {
                    if index != start {
                        self.current.store(index, Ordering::Release);
                        info!(
                            "{} succeeded on fallback endpoint {}",
                            operation,
                            self.endpoints[index].url()
                        );
                    }
                    return Ok(value);
                }
                Err(err @ RpcError::Retryable { .. }) => {
                    warn!("{} failed with fullnode {}: {}", operation, err.endpoint(), err);
                    last = Some(err);
                }
                Err(err @ RpcError::Rejected { .. }) => {
                    return Err(EndpointPoolError::Rejected {
                        operation: operation.to_string(),
                        source: err,
                    });
                }
                Err(err @ RpcError::UnknownOutcome { .. }) => {
                    warn!("{}: outcome unknown at {}, not retrying", operation, err.endpoint());
                    return Err(EndpointPoolError::UnknownOutcome {
                        operation: operation.to_string(),
                        source: err,
                    });
                }
            }
        }

        match last {
            Some(last) => Err(EndpointPoolError::AllEndpointsFailed {
                operation: operation.to_string(),
                attempts: total,
                last,
            }),
            None => Err(EndpointPoolError::NoEndpoints),
        }
    }

    pub async fn submit_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[SerializedSignature],
    ) -> Result<TransactionReceipt, EndpointPoolError> {
        self.execute("submit_transaction", |ep| async move {
            ep.execute_transaction(tx_bytes, signatures).await
        })
        .await
    }

    pub async fn dry_run_transaction(
        &self,
        tx_bytes: &[u8],
    ) -> Result<DryRunResult, EndpointPoolError> {
        self.execute("dry_run_transaction", |ep| async move {
            ep.dry_run_transaction(tx_bytes).await
        })
        .await
    }

    pub async fn get_balance(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<CoinBalance, EndpointPoolError> {
        self.execute("get_balance", |ep| async move { ep.get_balance(owner, coin_type).await })
            .await
    }

    /// Fetch objects in chunks of `batch_size`. Each chunk gets the full
    /// failover treatment; any chunk failing fails the whole call.
    pub async fn get_objects(
        &self,
        ids: &[ObjectId],
        options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectRecord>, EndpointPoolError> {
        let mut records = Vec::with_capacity(ids.len());
        for chunk in batch(ids, self.batch_size) {
            let chunk = &chunk;
            let mut page = self
                .execute("get_objects", |ep| async move {
                    ep.multi_get_objects(chunk, options).await
                })
                .await?;
            records.append(&mut page);
        }
        Ok(records)
    }

    pub async fn get_object(
        &self,
        id: &ObjectId,
        options: &ObjectDataOptions,
    ) -> Result<Option<ObjectRecord>, EndpointPoolError> {
        let mut records = self.get_objects(std::slice::from_ref(id), options).await?;
        Ok(if records.is_empty() { None } else { Some(records.swap_remove(0)) })
    }

    /// Refresh cached objects from the node.
    ///
    /// Owned objects take the current version and digest; shared objects
    /// take their initial shared version, or lose it when the node no longer
    /// reports them as shared. Ids the node cannot find are left untouched.
    pub async fn update_objects(&self, objects: &mut [SuiObject]) -> Result<(), EndpointPoolError> {
        if objects.is_empty() {
            return Ok(());
        }
        let ids: Vec<ObjectId> = objects.iter().map(SuiObject::object_id).collect();
        let records = self.get_objects(&ids, &ObjectDataOptions::owner_only()).await?;

        let mut fetched = HashMap::new();
        for record in records {
            if let Some(data) = record.data {
                fetched.insert(data.object_id, data);
            }
        }

        for object in objects.iter_mut() {
            let Some(data) = fetched.get(&object.object_id()) else {
                warn!(
                    "object {} not returned by the node, keeping cached state",
                    object.object_id()
                );
                continue;
            };
            match object {
                SuiObject::Owned(owned) => {
                    owned.version = Some(data.version);
                    owned.digest = Some(data.digest.clone());
                }
                SuiObject::Shared(shared) => {
                    shared.initial_shared_version = match data.owner {
                        Some(Owner::Shared { initial_shared_version }) => {
                            Some(initial_shared_version)
                        }
                        _ => None,
                    };
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CoinPageFetcher for EndpointPool {
    async fn fetch_coin_page(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<CoinPage, EndpointPoolError> {
        self.execute("get_coins", |ep| async move { ep.get_coins(owner, coin_type, cursor).await })
            .await
    }
}

impl std::fmt::Debug for EndpointPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let urls: Vec<&str> = self.endpoints.iter().map(|e| e.url()).collect();
        f.debug_struct("EndpointPool")
            .field("endpoints", &urls)
            .field("current", &self.current_index())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
