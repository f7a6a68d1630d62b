use std::future::Future;
use std::sync::Arc;

use super::{ensure, make_state, TestResult, NS_A};
use crate::StateStore;

pub(super) async fn run_overwrite_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "overwrite",
            "second_set_replaces_state",
            second_set_replaces_state(factory).await,
        ),
        TestResult::from_result(
            "overwrite",
            "version_code_roundtrips",
            version_code_roundtrips(factory).await,
        ),
        TestResult::from_result(
            "overwrite",
            "concurrent_writers_to_distinct_keys",
            concurrent_writers_to_distinct_keys(factory).await,
        ),
    ]
}

async fn second_set_replaces_state<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "k", make_state("WAITING_FOR_REVIEW", None))
        .await
        .map_err(|e| e.to_string())?;
    store
        .set(NS_A, "k", make_state("IN_REVIEW", None))
        .await
        .map_err(|e| e.to_string())?;
    let got = store
        .get(NS_A, "k")
        .await
        .map_err(|e| e.to_string())?
        .ok_or("record missing")?;
    ensure(
        got.state.status == "IN_REVIEW",
        format!("status was {}", got.state.status),
    )?;
    let keys = store.keys(None).await.map_err(|e| e.to_string())?;
    ensure(keys.len() == 1, format!("overwrite duplicated key: {keys:?}"))
}

async fn version_code_roundtrips<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "k", make_state("inProgress", Some(u64::from(u32::MAX) + 5)))
        .await
        .map_err(|e| e.to_string())?;
    let got = store
        .get(NS_A, "k")
        .await
        .map_err(|e| e.to_string())?
        .ok_or("record missing")?;
    ensure(
        got.state.version_code == Some(u64::from(u32::MAX) + 5),
        format!("version_code was {:?}", got.state.version_code),
    )
}

async fn concurrent_writers_to_distinct_keys<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .set(NS_A, &format!("k{i}"), make_state("READY", Some(i)))
                .await
        }));
    }
    for h in handles {
        h.await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| e.to_string())?;
    }
    let keys = store.keys(Some(NS_A)).await.map_err(|e| e.to_string())?;
    ensure(keys.len() == 16, format!("expected 16 keys, got {}", keys.len()))
}
