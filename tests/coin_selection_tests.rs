// tests/coin_selection_tests.rs
mod util;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use sui_kit::blockchain::CoinSelector;
use sui_kit::core::{CoinSelectionError, EndpointPoolError, FundsShortfall, SuiAddress};
use sui_kit::network::EndpointPool;
use sui_kit::tools::RetryPolicy;
use util::{coin, page, pool_of, Mode, MockRpc};

const SUI: &str = "0x2::sui::SUI";

fn pool_with_pages(pages: Vec<sui_kit::blockchain::CoinPage>) -> (Arc<MockRpc>, EndpointPool) {
    let mock = Arc::new(MockRpc::new("http://node", Mode::Succeed).with_coin_pages(pages));
    let pool = EndpointPool::new(pool_of(&[mock.clone()]), RetryPolicy::immediate()).unwrap();
    (mock, pool)
}

fn balances(selection: &sui_kit::blockchain::CoinSelection) -> Vec<u64> {
    selection.coins.iter().map(|c| c.balance).collect()
}

#[tokio::test]
async fn test_exact_total_returns_everything() {
    let (_, pool) = pool_with_pages(vec![
        page(vec![coin(1, 30), coin(2, 10)], Some("c1")),
        page(vec![coin(3, 60)], None),
    ]);
    let selection = CoinSelector::select_coins(&pool, &SuiAddress::ZERO, 100, SUI).await.unwrap();
    assert_eq!(balances(&selection), vec![30, 10, 60]);
    assert_eq!(selection.total_balance, 100);
}

#[tokio::test]
async fn test_stops_as_soon_as_target_reached() {
    let (mock, pool) = pool_with_pages(vec![
        page(vec![coin(1, 5), coin(2, 40), coin(3, 20)], Some("c1")),
        page(vec![coin(4, 1_000)], None),
    ]);
    let selection = CoinSelector::select_coins(&pool, &SuiAddress::ZERO, 50, SUI).await.unwrap();
    assert_eq!(balances(&selection), vec![40, 20]);
    // second page never requested
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_no_coins_is_insufficient() {
    let (_, pool) = pool_with_pages(vec![page(vec![], None)]);
    let err = CoinSelector::select_coins(&pool, &SuiAddress::ZERO, 1, SUI).await.unwrap_err();
    assert!(matches!(
        err,
        CoinSelectionError::InsufficientFunds { shortfall: FundsShortfall::NoSpendableCoins, .. }
    ));
}

#[tokio::test]
async fn test_zero_balances_are_not_spendable() {
    let (_, pool) = pool_with_pages(vec![page(vec![coin(1, 0), coin(2, 0)], None)]);
    let err = CoinSelector::select_coins(&pool, &SuiAddress::ZERO, 1, SUI).await.unwrap_err();
    assert!(matches!(
        err,
        CoinSelectionError::InsufficientFunds { shortfall: FundsShortfall::NoSpendableCoins, .. }
    ));
}

#[tokio::test]
async fn test_below_target_reports_shortfall() {
    let (_, pool) = pool_with_pages(vec![page(vec![coin(1, 7), coin(2, 3)], None)]);
    let err = CoinSelector::select_coins(&pool, &SuiAddress::ZERO, 11, SUI).await.unwrap_err();
    match err {
        CoinSelectionError::InsufficientFunds { coin_type, shortfall, .. } => {
            assert_eq!(coin_type, SUI);
            assert_eq!(shortfall, FundsShortfall::BelowTarget { available: 10, required: 11 });
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_page_fetch_fails_over() {
    let down = Arc::new(MockRpc::new("http://down", Mode::Retryable));
    let up = Arc::new(
        MockRpc::new("http://up", Mode::Succeed)
            .with_coin_pages(vec![page(vec![coin(1, 9)], None)]),
    );
    let pool = EndpointPool::new(pool_of(&[down.clone(), up.clone()]), RetryPolicy::immediate())
        .unwrap();
    let selection = CoinSelector::select_coins(&pool, &SuiAddress::ZERO, 9, SUI).await.unwrap();
    assert_eq!(selection.total_balance, 9);
    assert_eq!(down.calls(), 1);
}

#[tokio::test]
async fn test_fetch_error_is_surfaced() {
    let mock = Arc::new(MockRpc::new("http://node", Mode::Rejected));
    let pool = EndpointPool::new(pool_of(&[mock]), RetryPolicy::immediate()).unwrap();
    let err = CoinSelector::select_coins(&pool, &SuiAddress::ZERO, 9, SUI).await.unwrap_err();
    assert!(matches!(err, CoinSelectionError::Fetch(EndpointPoolError::Rejected { .. })));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_selection_is_sufficient_and_tight(
        pages in proptest::collection::vec(proptest::collection::vec(0u64..1_000, 0..6), 1..5),
        target in 0u64..5_000,
    ) {
        let page_count = pages.len();
        let mut n = 0u8;
        let coin_pages: Vec<_> = pages
            .iter()
            .enumerate()
            .map(|(i, balances)| {
                let coins = balances.iter().map(|b| { n += 1; coin(n, *b) }).collect();
                let cursor = format!("c{}", i);
                page(coins, if i + 1 < page_count { Some(cursor.as_str()) } else { None })
            })
            .collect();
        let total: u64 = pages.iter().flatten().sum();

        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let (_, pool) = pool_with_pages(coin_pages);
        let result = rt.block_on(CoinSelector::select_coins(&pool, &SuiAddress::ZERO, target, SUI));

        match result {
            Ok(selection) => {
                let sum: u64 = selection.coins.iter().map(|c| c.balance).sum();
                prop_assert!(sum >= target);
                prop_assert_eq!(u128::from(sum), selection.total_balance);
                let last = selection.coins.last().map(|c| c.balance).unwrap_or(0);
                prop_assert!(sum - last < target || selection.coins.len() == 1);
                prop_assert!(selection.coins.iter().all(|c| c.balance > 0));
            }
            Err(CoinSelectionError::InsufficientFunds { .. }) => {
                prop_assert!(total < target || total == 0)
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
