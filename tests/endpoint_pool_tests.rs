// tests/endpoint_pool_tests.rs
mod util;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use sui_kit::blockchain::types::{ObjectDataOptions, Owner};
use sui_kit::blockchain::{SuiObject, SuiOwnedObject, SuiSharedObject};
use sui_kit::core::{EndpointPoolError, ObjectId, RpcError};
use sui_kit::crypto::SerializedSignature;
use sui_kit::network::EndpointPool;
use sui_kit::tools::RetryPolicy;
use test_case::test_case;
use tokio::time::Instant;
use util::{id, object_data, pool_of, Mode, MockRpc};

fn three(modes: [Mode; 3]) -> Vec<Arc<MockRpc>> {
    modes
        .iter()
        .enumerate()
        .map(|(i, m)| Arc::new(MockRpc::new(&format!("http://node-{}", i), *m)))
        .collect()
}

fn sig() -> SerializedSignature {
    SerializedSignature::new(vec![0u8; 97])
}

#[tokio::test(start_paused = true)]
async fn test_fails_over_to_third_endpoint() {
    let mocks = three([Mode::Retryable, Mode::Retryable, Mode::Succeed]);
    let pool =
        EndpointPool::new(pool_of(&mocks), RetryPolicy::fixed(Duration::from_secs(2))).unwrap();

    let start = Instant::now();
    let receipt = pool.submit_transaction(b"tx", &[sig()]).await.unwrap();

    assert_eq!(receipt.digest, "Digest1");
    assert_eq!(mocks.iter().map(|m| m.calls()).collect::<Vec<_>>(), vec![1, 1, 1]);
    // two backoff delays, none after the successful attempt
    assert_eq!(start.elapsed(), Duration::from_secs(4));
    assert_eq!(pool.current_index(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_endpoints_failing() {
    let mocks = three([Mode::Retryable, Mode::Retryable, Mode::Retryable]);
    let pool =
        EndpointPool::new(pool_of(&mocks), RetryPolicy::fixed(Duration::from_secs(2))).unwrap();

    let start = Instant::now();
    let err = pool.dry_run_transaction(b"tx").await.unwrap_err();

    match err {
        EndpointPoolError::AllEndpointsFailed { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.endpoint(), "http://node-2");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(mocks.iter().map(|m| m.calls()).sum::<usize>(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(4));
    assert_eq!(pool.current_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_schedule() {
    let mocks = three([Mode::Retryable, Mode::Retryable, Mode::Succeed]);
    let retry = RetryPolicy::exponential(Duration::from_secs(1), Duration::from_secs(30));
    let pool = EndpointPool::new(pool_of(&mocks), retry).unwrap();

    let start = Instant::now();
    pool.dry_run_transaction(b"tx").await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[test_case(Mode::Rejected ; "rejected")]
#[test_case(Mode::UnknownOutcome ; "unknown outcome")]
#[tokio::test]
async fn test_fatal_errors_abort_without_failover(mode: Mode) {
    let mocks = three([mode, Mode::Succeed, Mode::Succeed]);
    let pool = EndpointPool::new(pool_of(&mocks), RetryPolicy::immediate()).unwrap();

    let err = pool.submit_transaction(b"tx", &[sig()]).await.unwrap_err();
    match (mode, &err) {
        (Mode::Rejected, EndpointPoolError::Rejected { .. }) => {}
        (Mode::UnknownOutcome, EndpointPoolError::UnknownOutcome { source, .. }) => {
            assert!(matches!(source, RpcError::UnknownOutcome { .. }));
        }
        _ => panic!("unexpected error {:?} for {:?}", err, mode),
    }
    assert_eq!(mocks[1].calls(), 0);
    assert_eq!(mocks[2].calls(), 0);
    assert!(mocks[1].submitted.lock().is_empty());
}

#[tokio::test]
async fn test_successful_endpoint_becomes_sticky() {
    let mocks = three([Mode::Retryable, Mode::Succeed, Mode::Succeed]);
    let pool = EndpointPool::new(pool_of(&mocks), RetryPolicy::immediate()).unwrap();

    pool.dry_run_transaction(b"tx").await.unwrap();
    pool.dry_run_transaction(b"tx").await.unwrap();
    assert_eq!(mocks[0].calls(), 1);
    assert_eq!(mocks[1].calls(), 2);
    assert_eq!(pool.current_endpoint().url(), "http://node-1");

    pool.switch_endpoint(2);
    pool.dry_run_transaction(b"tx").await.unwrap();
    assert_eq!(mocks[2].calls(), 1);
}

#[tokio::test]
async fn test_failover_wraps_around_from_current() {
    let mocks = three([Mode::Succeed, Mode::Succeed, Mode::Retryable]);
    let pool = EndpointPool::new(pool_of(&mocks), RetryPolicy::immediate()).unwrap();
    pool.switch_endpoint(2);

    pool.dry_run_transaction(b"tx").await.unwrap();
    assert_eq!(mocks.iter().map(|m| m.calls()).collect::<Vec<_>>(), vec![1, 0, 1]);
    assert_eq!(pool.current_index(), 0);
}

#[tokio::test]
async fn test_object_fetch_is_chunked() {
    let mock = Arc::new(MockRpc::new("http://node", Mode::Succeed));
    let pool = EndpointPool::new(pool_of(&[mock.clone()]), RetryPolicy::immediate()).unwrap();
    let ids: Vec<ObjectId> = (0..120u32).map(|i| ObjectId::new([(i % 251) as u8; 32])).collect();

    let records = pool.get_objects(&ids, &ObjectDataOptions::full_content()).await.unwrap();
    assert_eq!(records.len(), 120);
    assert_eq!(*mock.object_batches.lock(), vec![50, 50, 20]);
}

#[tokio::test]
async fn test_each_chunk_fails_over_independently() {
    let a = Arc::new(
        MockRpc::new("http://a", Mode::Succeed).with_script(&[Mode::Succeed, Mode::Retryable]),
    );
    let b = Arc::new(MockRpc::new("http://b", Mode::Succeed));
    let pool = EndpointPool::new(pool_of(&[a.clone(), b.clone()]), RetryPolicy::immediate())
        .unwrap()
        .with_batch_size(2);
    let ids: Vec<ObjectId> = (1..=5).map(id).collect();

    let records = pool.get_objects(&ids, &ObjectDataOptions::owner_only()).await.unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(*a.object_batches.lock(), vec![2]);
    assert_eq!(*b.object_batches.lock(), vec![2, 1]);
}

#[tokio::test]
async fn test_failed_chunk_fails_whole_fetch() {
    let mock = Arc::new(
        MockRpc::new("http://node", Mode::Succeed).with_script(&[Mode::Succeed, Mode::Rejected]),
    );
    let pool = EndpointPool::new(pool_of(&[mock.clone()]), RetryPolicy::immediate())
        .unwrap()
        .with_batch_size(50);
    let ids: Vec<ObjectId> = (0..120u32).map(|i| ObjectId::new([(i % 251) as u8; 32])).collect();

    let err = pool.get_objects(&ids, &ObjectDataOptions::owner_only()).await.unwrap_err();
    assert!(matches!(err, EndpointPoolError::Rejected { .. }));
    assert_eq!(*mock.object_batches.lock(), vec![50]);
}

#[tokio::test]
async fn test_update_objects() {
    let mock = Arc::new(
        MockRpc::new("http://node", Mode::Succeed)
            .with_object(object_data(id(1), 7, Some(Owner::AddressOwner(id(9)))))
            .with_object(object_data(id(2), 11, Some(Owner::Shared { initial_shared_version: 3 })))
            .with_object(object_data(id(3), 4, Some(Owner::AddressOwner(id(9))))),
    );
    let pool = EndpointPool::new(pool_of(&[mock]), RetryPolicy::immediate()).unwrap();

    let mut stale_shared = SuiSharedObject::new(id(3));
    stale_shared.initial_shared_version = Some(1);
    let mut objects = vec![
        SuiObject::from(SuiOwnedObject::new(id(1))),
        SuiObject::from(SuiSharedObject::new(id(2))),
        SuiObject::from(stale_shared),
    ];
    pool.update_objects(&mut objects).await.unwrap();

    match &objects[0] {
        SuiObject::Owned(o) => {
            assert_eq!(o.version, Some(7));
            assert_eq!(o.digest.as_deref(), Some("digest-7"));
            assert!(o.is_full_object());
        }
        other => panic!("unexpected {:?}", other),
    }
    match &objects[1] {
        SuiObject::Shared(s) => assert_eq!(s.initial_shared_version, Some(3)),
        other => panic!("unexpected {:?}", other),
    }
    match &objects[2] {
        SuiObject::Shared(s) => assert_eq!(s.initial_shared_version, None),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_get_object_single() {
    let mock = Arc::new(MockRpc::new("http://node", Mode::Succeed));
    let pool = EndpointPool::new(pool_of(&[mock.clone()]), RetryPolicy::immediate()).unwrap();
    let record = pool.get_object(&id(4), &ObjectDataOptions::owner_only()).await.unwrap();
    assert_eq!(record.and_then(|r| r.object_id()), Some(id(4)));
    assert_eq!(*mock.object_batches.lock(), vec![1]);
}
