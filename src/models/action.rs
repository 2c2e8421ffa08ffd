// Action commands sent to the service (POST /collect, /train, /detect, /clear)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Identity of an action; also the key of its busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Collect,
    Train,
    Detect,
    Clear,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Collect,
        ActionKind::Train,
        ActionKind::Detect,
        ActionKind::Clear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Collect => "collect",
            ActionKind::Train => "train",
            ActionKind::Detect => "detect",
            ActionKind::Clear => "clear",
        }
    }

    /// Service endpoint path, e.g. "/detect".
    pub fn path(self) -> &'static str {
        match self {
            ActionKind::Collect => "/collect",
            ActionKind::Train => "/train",
            ActionKind::Detect => "/detect",
            ActionKind::Clear => "/clear",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// One command, built per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRequest {
    Collect { num_collections: NonZeroU32 },
    Train,
    Detect,
    Clear,
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Collect { .. } => ActionKind::Collect,
            ActionRequest::Train => ActionKind::Train,
            ActionRequest::Detect => ActionKind::Detect,
            ActionRequest::Clear => ActionKind::Clear,
        }
    }

    /// JSON body for the POST, if the action takes one.
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            ActionRequest::Collect { num_collections } => Some(serde_json::json!({
                "num_collections": num_collections.get(),
            })),
            _ => None,
        }
    }

    /// Builds the request for `kind`; collect uses `num_collections`.
    pub fn for_kind(kind: ActionKind, num_collections: NonZeroU32) -> Self {
        match kind {
            ActionKind::Collect => ActionRequest::Collect { num_collections },
            ActionKind::Train => ActionRequest::Train,
            ActionKind::Detect => ActionRequest::Detect,
            ActionKind::Clear => ActionRequest::Clear,
        }
    }
}

/// Payload of a successful action envelope. Fields the action does not report stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub anomalies_found: Option<u64>,
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub records_used: Option<u64>,
}
