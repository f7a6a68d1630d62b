use storewatch_core::{EntityKind, Platform};

/// A payload could not be rendered by its template.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("cannot compose a batch of zero notifications")]
    EmptyBatch,

    #[error("{platform} {kind:?} notification is missing metadata field {field:?}")]
    MissingField {
        platform: Platform,
        kind: EntityKind,
        field: &'static str,
    },

    #[error("{platform} has no template for {kind:?} notifications")]
    UnsupportedKind { platform: Platform, kind: EntityKind },
}

/// The sink rejected a message or could not be reached.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid webhook URL: {0}")]
    InvalidWebhook(String),

    #[error("webhook returned HTTP {0}")]
    Status(u16),

    #[error("webhook request failed: {0}")]
    Transport(String),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
