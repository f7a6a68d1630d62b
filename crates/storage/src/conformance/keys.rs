use std::future::Future;

use super::{ensure, make_state, TestResult, NS_A, NS_B};
use crate::StateStore;

pub(super) async fn run_keys_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result("keys", "empty_store_has_no_keys", empty_store_has_no_keys(factory).await),
        TestResult::from_result(
            "keys",
            "keys_filtered_by_namespace",
            keys_filtered_by_namespace(factory).await,
        ),
        TestResult::from_result(
            "keys",
            "keys_without_filter_returns_all",
            keys_without_filter_returns_all(factory).await,
        ),
        TestResult::from_result(
            "keys",
            "keys_is_restartable",
            keys_is_restartable(factory).await,
        ),
        TestResult::from_result(
            "keys",
            "deleted_key_not_enumerated",
            deleted_key_not_enumerated(factory).await,
        ),
    ]
}

async fn seed<S: StateStore>(store: &S) -> Result<(), String> {
    for key in ["a1", "a2"] {
        store
            .set(NS_A, key, make_state("READY", None))
            .await
            .map_err(|e| e.to_string())?;
    }
    store
        .set(NS_B, "b1", make_state("completed", Some(1)))
        .await
        .map_err(|e| e.to_string())
}

async fn empty_store_has_no_keys<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let keys = store.keys(None).await.map_err(|e| e.to_string())?;
    ensure(keys.is_empty(), format!("expected no keys, got {keys:?}"))
}

async fn keys_filtered_by_namespace<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    seed(&store).await?;
    let mut a = store.keys(Some(NS_A)).await.map_err(|e| e.to_string())?;
    a.sort();
    ensure(a == ["a1", "a2"], format!("namespace A keys were {a:?}"))?;
    let b = store.keys(Some(NS_B)).await.map_err(|e| e.to_string())?;
    ensure(b == ["b1"], format!("namespace B keys were {b:?}"))
}

async fn keys_without_filter_returns_all<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    seed(&store).await?;
    let all = store.keys(None).await.map_err(|e| e.to_string())?;
    ensure(all.len() == 3, format!("expected 3 keys, got {all:?}"))
}

async fn keys_is_restartable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    seed(&store).await?;
    let first = store.keys(None).await.map_err(|e| e.to_string())?;
    let second = store.keys(None).await.map_err(|e| e.to_string())?;
    ensure(first == second, format!("{first:?} != {second:?}"))
}

async fn deleted_key_not_enumerated<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    seed(&store).await?;
    store.delete(NS_A, "a1").await.map_err(|e| e.to_string())?;
    let a = store.keys(Some(NS_A)).await.map_err(|e| e.to_string())?;
    ensure(a == ["a2"], format!("namespace A keys were {a:?}"))
}
