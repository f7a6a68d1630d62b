//! Conformance test suite for `StateStore` implementations.
//!
//! A backend-agnostic suite any `StateStore` implementation can run to verify
//! it honours the store contract. The suite covers:
//!
//! - **Basic**: get/set/has/delete on a single namespace
//! - **Namespace**: tag checks over the shared flat key space
//! - **Keys**: enumeration, filtering, restartability
//! - **Overwrite**: last-write-wins and concurrent writers
//!
//! # Usage
//!
//! ```ignore
//! use storewatch_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn my_backend_conformance() {
//!     let report = run_conformance_suite(|| async { MyStore::new() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod basic;
mod keys;
mod namespace;
mod overwrite;

use std::fmt;
use std::future::Future;

use storewatch_core::ObservedState;

use crate::StateStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "basic", "namespace").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a state store backend.
///
/// `factory` is called once per test and must return a fresh, empty store.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: StateStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(basic::run_basic_tests(&factory).await);
    results.extend(namespace::run_namespace_tests(&factory).await);
    results.extend(keys::run_keys_tests(&factory).await);
    results.extend(overwrite::run_overwrite_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

const NS_A: &str = "app-store";
const NS_B: &str = "play-store";

fn make_state(status: &str, version_code: Option<u64>) -> ObservedState {
    ObservedState {
        status: status.to_string(),
        version_label: "1.0.0".to_string(),
        version_code,
        last_checked_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

fn ensure(cond: bool, msg: impl Into<String>) -> Result<(), String> {
    if cond {
        Ok(())
    } else {
        Err(msg.into())
    }
}
