use std::future::Future;

use super::{ensure, make_state, TestResult, NS_A};
use crate::StateStore;

pub(super) async fn run_basic_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "basic",
            "get_missing_returns_none",
            get_missing_returns_none(factory).await,
        ),
        TestResult::from_result(
            "basic",
            "set_then_get_returns_state",
            set_then_get_returns_state(factory).await,
        ),
        TestResult::from_result(
            "basic",
            "record_carries_key_and_namespace",
            record_carries_key_and_namespace(factory).await,
        ),
        TestResult::from_result("basic", "has_reflects_set", has_reflects_set(factory).await),
        TestResult::from_result(
            "basic",
            "delete_removes_entry",
            delete_removes_entry(factory).await,
        ),
        TestResult::from_result(
            "basic",
            "delete_missing_is_noop",
            delete_missing_is_noop(factory).await,
        ),
        TestResult::from_result("basic", "store_is_ready", store_is_ready(factory).await),
    ]
}

async fn get_missing_returns_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let got = store.get(NS_A, "missing").await.map_err(|e| e.to_string())?;
    ensure(got.is_none(), format!("expected None, got {got:?}"))
}

async fn set_then_get_returns_state<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let state = make_state("READY_FOR_SALE", Some(12));
    store
        .set(NS_A, "com.example|1.0.0|app", state.clone())
        .await
        .map_err(|e| e.to_string())?;
    let got = store
        .get(NS_A, "com.example|1.0.0|app")
        .await
        .map_err(|e| e.to_string())?
        .ok_or("record missing after set")?;
    ensure(
        got.state == state,
        format!("state mismatch: {:?} != {:?}", got.state, state),
    )
}

async fn record_carries_key_and_namespace<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "k1", make_state("PROCESSING", None))
        .await
        .map_err(|e| e.to_string())?;
    let got = store
        .get(NS_A, "k1")
        .await
        .map_err(|e| e.to_string())?
        .ok_or("record missing after set")?;
    ensure(got.key == "k1", format!("key was {}", got.key))?;
    ensure(got.namespace == NS_A, format!("namespace was {}", got.namespace))?;
    ensure(!got.written_at.is_empty(), "written_at is empty")
}

async fn has_reflects_set<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let before = store.has(NS_A, "k1").await.map_err(|e| e.to_string())?;
    ensure(!before, "has() true before set")?;
    store
        .set(NS_A, "k1", make_state("VALID", None))
        .await
        .map_err(|e| e.to_string())?;
    let after = store.has(NS_A, "k1").await.map_err(|e| e.to_string())?;
    ensure(after, "has() false after set")
}

async fn delete_removes_entry<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "k1", make_state("VALID", None))
        .await
        .map_err(|e| e.to_string())?;
    store.delete(NS_A, "k1").await.map_err(|e| e.to_string())?;
    let got = store.get(NS_A, "k1").await.map_err(|e| e.to_string())?;
    ensure(got.is_none(), "record still present after delete")
}

async fn delete_missing_is_noop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .delete(NS_A, "never-written")
        .await
        .map_err(|e| format!("delete of missing key failed: {e}"))
}

async fn store_is_ready<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    ensure(store.is_ready(), "fresh store reports not ready")
}
