use std::future::Future;

use super::{ensure, make_state, TestResult, NS_A, NS_B};
use crate::StateStore;

pub(super) async fn run_namespace_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "namespace",
            "get_under_other_namespace_is_absent",
            get_under_other_namespace_is_absent(factory).await,
        ),
        TestResult::from_result(
            "namespace",
            "has_under_other_namespace_is_false",
            has_under_other_namespace_is_false(factory).await,
        ),
        TestResult::from_result(
            "namespace",
            "delete_under_other_namespace_is_noop",
            delete_under_other_namespace_is_noop(factory).await,
        ),
        TestResult::from_result(
            "namespace",
            "set_under_other_namespace_takes_ownership",
            set_under_other_namespace_takes_ownership(factory).await,
        ),
    ]
}

async fn get_under_other_namespace_is_absent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "shared", make_state("READY", None))
        .await
        .map_err(|e| e.to_string())?;
    let got = store.get(NS_B, "shared").await.map_err(|e| e.to_string())?;
    ensure(got.is_none(), "record visible under a foreign namespace")
}

async fn has_under_other_namespace_is_false<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "shared", make_state("READY", None))
        .await
        .map_err(|e| e.to_string())?;
    let has = store.has(NS_B, "shared").await.map_err(|e| e.to_string())?;
    ensure(!has, "has() true under a foreign namespace")
}

async fn delete_under_other_namespace_is_noop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "shared", make_state("READY", None))
        .await
        .map_err(|e| e.to_string())?;
    store.delete(NS_B, "shared").await.map_err(|e| e.to_string())?;
    let still = store.has(NS_A, "shared").await.map_err(|e| e.to_string())?;
    ensure(still, "foreign-namespace delete removed the record")
}

async fn set_under_other_namespace_takes_ownership<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .set(NS_A, "shared", make_state("READY", None))
        .await
        .map_err(|e| e.to_string())?;
    store
        .set(NS_B, "shared", make_state("completed", Some(3)))
        .await
        .map_err(|e| e.to_string())?;
    let a = store.has(NS_A, "shared").await.map_err(|e| e.to_string())?;
    let b = store
        .get(NS_B, "shared")
        .await
        .map_err(|e| e.to_string())?
        .ok_or("record missing under new owner")?;
    ensure(!a, "previous owner still sees the key")?;
    ensure(b.state.status == "completed", format!("status was {}", b.state.status))
}
