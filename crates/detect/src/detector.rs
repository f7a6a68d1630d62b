use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use storewatch_core::timestamp::{parse_rfc3339, rfc3339};
use storewatch_core::{
    meta, ChangeEvent, EntityKey, NotificationPayload, ObservedState, PlatformSnapshot,
    TrackedEntity,
};
use storewatch_storage::{StateStore, StorageError};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{app_store, payload, play_store};

/// Builds inspected per App Store app when not configured otherwise.
pub const DEFAULT_NUMBER_OF_BUILDS: usize = 2;

#[derive(Debug, Clone)]
pub struct DetectorOptions {
    /// Newest builds inspected per App Store app.
    pub number_of_builds: usize,
    /// Display name used for every Play Store app instead of its title.
    pub app_name_override: Option<String>,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            number_of_builds: DEFAULT_NUMBER_OF_BUILDS,
            app_name_override: None,
        }
    }
}

/// One record selected for inspection, before a timestamp is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub entity: TrackedEntity,
    pub status: String,
    pub version_label: String,
    /// Set for version-sequence entities (Play Store tracks).
    pub version_code: Option<u64>,
}

impl Candidate {
    fn observed_at(&self, at: OffsetDateTime) -> ObservedState {
        ObservedState {
            status: self.status.clone(),
            version_label: self.version_label.clone(),
            version_code: self.version_code,
            last_checked_at: rfc3339(at),
        }
    }

    fn rank(&self) -> (Option<u64>, Option<OffsetDateTime>) {
        let uploaded_at = self
            .entity
            .metadata
            .get(meta::UPLOADED_AT)
            .and_then(Value::as_str)
            .and_then(parse_rfc3339);
        (self.version_code, uploaded_at)
    }
}

/// Diffs snapshots against the state store. Cheap to clone.
#[derive(Clone)]
pub struct ChangeDetector {
    store: Arc<dyn StateStore>,
    options: DetectorOptions,
}

impl ChangeDetector {
    pub fn new(store: Arc<dyn StateStore>, options: DetectorOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Select the records of `snapshot` that will be inspected, at most one
    /// per entity key.
    pub fn candidates(&self, snapshot: &PlatformSnapshot) -> Vec<Candidate> {
        let selected = match snapshot {
            PlatformSnapshot::AppStore { apps } => {
                app_store::candidates(apps, self.options.number_of_builds)
            }
            PlatformSnapshot::PlayStore { apps } => {
                play_store::candidates(apps, self.options.app_name_override.as_deref())
            }
        };
        collapse_by_key(selected)
    }

    /// Compare one observation with its stored record and overwrite the record.
    ///
    /// The store is written only after the comparison succeeds, and always
    /// then, so `last_checked_at` advances even when nothing changed.
    pub async fn inspect(
        &self,
        entity: &TrackedEntity,
        current: ObservedState,
    ) -> Result<ChangeEvent, StorageError> {
        let namespace = entity.platform.tag();
        let key = entity.key.encode();
        let stored = self.store.get(namespace, &key).await?;

        let previous = stored.as_ref().map(|r| &r.state);
        let previous_status = previous.map(|s| s.status.clone());
        let previous_version_code = previous.and_then(|s| s.version_code);
        let status_changed = previous.is_some_and(|s| s.status != current.status);
        let version_changed = match (previous_version_code, current.version_code) {
            (Some(prev), Some(cur)) => prev != cur,
            _ => false,
        };

        self.store.set(namespace, &key, current.clone()).await?;

        Ok(ChangeEvent {
            entity: entity.clone(),
            current,
            is_new: stored.is_none(),
            status_changed,
            previous_status,
            version_changed,
            previous_version_code,
        })
    }

    /// Inspect every candidate in `snapshot`; report the events that
    /// require a notification, in snapshot order.
    ///
    /// A storage failure on one entity does not stop the pass. That entity's
    /// record is left as it was, so the change is seen again next cycle, and
    /// the failure is reported next to the events of the other entities.
    pub async fn detect(
        &self,
        snapshot: &PlatformSnapshot,
        observed_at: OffsetDateTime,
    ) -> Detection {
        let platform = snapshot.platform();
        let candidates = self.candidates(snapshot);
        let inspected = candidates.len();
        let mut detection = Detection::default();

        for candidate in candidates {
            let current = candidate.observed_at(observed_at);
            let outcome = self.inspect(&candidate.entity, current).await;
            let event = match outcome {
                Ok(event) => event,
                Err(error) => {
                    warn!(
                        platform = %platform,
                        key = %candidate.entity.key,
                        error = %error,
                        "inspection failed, record left unchanged"
                    );
                    detection.failures.push(InspectionFailure {
                        key: candidate.entity.key,
                        error,
                    });
                    continue;
                }
            };

            if event.version_regressed() {
                warn!(
                    platform = %platform,
                    key = %event.entity.key,
                    previous = ?event.previous_version_code,
                    current = ?event.current.version_code,
                    "version code went backwards"
                );
            }
            if event.requires_notification() {
                debug!(
                    platform = %platform,
                    key = %event.entity.key,
                    status = %event.current.status,
                    previous_status = ?event.previous_status,
                    "change detected"
                );
                detection.events.push(event);
            }
        }

        debug!(
            platform = %platform,
            inspected,
            changes = detection.events.len(),
            failures = detection.failures.len(),
            "detection finished"
        );
        detection
    }

    /// [`detect`](Self::detect) followed by payload rendering.
    pub async fn process(
        &self,
        snapshot: &PlatformSnapshot,
        observed_at: OffsetDateTime,
    ) -> Processed {
        let Detection { events, failures } = self.detect(snapshot, observed_at).await;
        Processed {
            payloads: events
                .iter()
                .map(|e| payload::build_payload(e, observed_at))
                .collect(),
            failures,
        }
    }
}

/// One entity whose stored record could not be read or written.
#[derive(Debug)]
pub struct InspectionFailure {
    pub key: EntityKey,
    pub error: StorageError,
}

/// Outcome of one detection pass.
#[derive(Debug, Default)]
pub struct Detection {
    /// Notification-worthy events, in snapshot order.
    pub events: Vec<ChangeEvent>,
    pub failures: Vec<InspectionFailure>,
}

/// Outcome of [`ChangeDetector::process`].
#[derive(Debug, Default)]
pub struct Processed {
    pub payloads: Vec<NotificationPayload>,
    pub failures: Vec<InspectionFailure>,
}

/// Keep one candidate per key, in order of first appearance. The survivor has
/// the highest version code, then the newest upload; ties keep the earlier one.
fn collapse_by_key(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut slots: HashMap<EntityKey, usize> = HashMap::with_capacity(candidates.len());
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match slots.get(&candidate.entity.key) {
            Some(&slot) => {
                if candidate.rank() > out[slot].rank() {
                    out[slot] = candidate;
                }
            }
            None => {
                slots.insert(candidate.entity.key.clone(), out.len());
                out.push(candidate);
            }
        }
    }
    out
}

impl std::fmt::Debug for ChangeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
