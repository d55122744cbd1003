//! Coin 选择
//!
//! 逐页拉取 coin，每页按余额从大到小排序，累加直到覆盖目标金额。
//! Greedy largest-first per page; not an optimal knapsack.

use crate::blockchain::types::{CoinPage, CoinRecord, ObjectRef};
use crate::core::address::SuiAddress;
use crate::core::errors::{CoinSelectionError, EndpointPoolError, FundsShortfall};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Supplies coin pages, e.g. an endpoint pool or a test double.
#[async_trait]
pub trait CoinPageFetcher: Send + Sync {
    async fn fetch_coin_page(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<CoinPage, EndpointPoolError>;
}

/// Selected coins, largest first within each page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    pub coins: Vec<CoinRecord>,
    pub total_balance: u128,
}

impl CoinSelection {
    pub fn object_refs(&self) -> Vec<ObjectRef> {
        self.coins.iter().map(CoinRecord::object_ref).collect()
    }
}

pub struct CoinSelector;

impl CoinSelector {
    /// Select coins of `coin_type` owned by `owner` whose balances add up to
    /// at least `amount`.
    ///
    /// Pages are fetched one at a time and only while the running sum is
    /// still short. Zero-balance coins are skipped.
    pub async fn select_coins<F>(
        fetcher: &F,
        owner: &SuiAddress,
        amount: u64,
        coin_type: &str,
    ) -> Result<CoinSelection, CoinSelectionError>
    where
        F: CoinPageFetcher + ?Sized,
    {
        info!("选择 coin: owner={}, 目标金额={}, 类型={}", owner, amount, coin_type);

        let target = u128::from(amount);
        let mut selected: Vec<CoinRecord> = Vec::new();
        // u128 so a large number of u64 balances cannot overflow
        let mut total: u128 = 0;
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = fetcher.fetch_coin_page(owner, coin_type, cursor.as_deref()).await?;
            pages += 1;
            debug!(
                "coin page {}: {} coins, has_next_page={}",
                pages,
                page.data.len(),
                page.has_next_page
            );

            let mut coins = page.data;
            coins.retain(|c| c.balance > 0);
            coins.sort_by(|a, b| b.balance.cmp(&a.balance));

            for coin in coins {
                total += u128::from(coin.balance);
                selected.push(coin);
                if total >= target {
                    debug!(
                        "selected {} coins totalling {} over {} pages",
                        selected.len(),
                        total,
                        pages
                    );
                    return Ok(CoinSelection { coins: selected, total_balance: total });
                }
            }

            match (page.has_next_page, page.next_cursor) {
                (true, Some(next)) => {
                    if cursor.as_deref() == Some(next.as_str()) {
                        warn!(
                            "coin pagination for {} returned the same cursor twice, stopping",
                            owner
                        );
                        break;
                    }
                    cursor = Some(next);
                }
                (true, None) => {
                    warn!("coin page claims more data but has no cursor, stopping");
                    break;
                }
                (false, _) => break,
            }
        }

        let shortfall = if selected.is_empty() {
            FundsShortfall::NoSpendableCoins
        } else {
            FundsShortfall::BelowTarget { available: total, required: amount }
        };
        Err(CoinSelectionError::InsufficientFunds {
            owner: owner.to_string(),
            coin_type: coin_type.to_string(),
            shortfall,
        })
    }
}
