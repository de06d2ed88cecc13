//! Change-notification bus
//!
//! Catalog views subscribe to live changes through a broadcast channel;
//! each subscription is a receiver that is torn down by dropping it
//! (the SSE layer drops it when the client disconnects).

use serde::Serialize;
use tokio::sync::broadcast;

use crate::data::{Category, Material};

/// What happened to a material record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialChange {
    /// New submission entered the pending queue
    Submitted,
    /// Record became catalog-visible
    Published,
    /// Record and backing file removed (reject or delete)
    Removed,
}

impl MaterialChange {
    /// Wire name, used as the SSE event type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Published => "published",
            Self::Removed => "removed",
        }
    }
}

/// A lifecycle transition, published on every successful action
#[derive(Debug, Clone, Serialize)]
pub struct MaterialEvent {
    pub change: MaterialChange,
    pub material_id: String,
    pub category: Category,
    /// Present for Submitted/Published; Removed carries no snapshot
    pub material: Option<Material>,
}

impl MaterialEvent {
    pub fn submitted(material: &Material) -> Self {
        Self {
            change: MaterialChange::Submitted,
            material_id: material.id.clone(),
            category: material.category,
            material: Some(material.clone()),
        }
    }

    pub fn published(material: &Material) -> Self {
        Self {
            change: MaterialChange::Published,
            material_id: material.id.clone(),
            category: material.category,
            material: Some(material.clone()),
        }
    }

    pub fn removed(material_id: &str, category: Category) -> Self {
        Self {
            change: MaterialChange::Removed,
            material_id: material_id.to_string(),
            category,
            material: None,
        }
    }
}

/// Broadcast-based bus for material lifecycle events.
///
/// If a subscriber falls behind it receives `RecvError::Lagged` and
/// should refetch the listing instead of replaying.
pub struct EventBus {
    tx: broadcast::Sender<MaterialEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. With no subscribers the event is dropped silently.
    pub fn publish(&self, event: MaterialEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MaterialEvent> {
        self.tx.subscribe()
    }
}
