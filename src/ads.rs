//! Consent-gated ad slots.
//!
//! The rest of the crate never talks to an ad network directly; it goes
//! through the [`AdNetwork`] adapter.

use crate::consent::ConsentState;
use std::sync::{Arc, Mutex};

pub const DEFAULT_PUBLISHER_ID: &str = "ca-pub-1048222071695232";
pub const TOP_SLOT_ID: &str = "4124950988";
pub const SIDE_SLOT_ID: &str = "5661393931";

/// One fill request for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdRequest {
    pub publisher_id: String,
    pub slot_id: String,
}

pub trait AdNetwork: Send + Sync {
    fn push(&self, request: AdRequest) -> anyhow::Result<()>;
}

/// In-process request queue, the counterpart of the ad tag's global
/// command queue. Requests are recorded and logged.
#[derive(Debug, Default, Clone)]
pub struct AdQueue {
    pushed: Arc<Mutex<Vec<AdRequest>>>,
}

impl AdQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushed(&self) -> Vec<AdRequest> {
        self.pushed.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl AdNetwork for AdQueue {
    fn push(&self, request: AdRequest) -> anyhow::Result<()> {
        tracing::debug!(slot = %request.slot_id, publisher = %request.publisher_id, "Ad slot fill requested");
        self.pushed
            .lock()
            .map_err(|_| anyhow::anyhow!("ad queue lock poisoned"))?
            .push(request);
        Ok(())
    }
}

/// What a mounted slot renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdPlacement {
    pub publisher_id: String,
    pub slot_id: String,
}

impl AdPlacement {
    pub fn label(&self) -> String {
        format!("Advertisement · slot {}", self.slot_id)
    }
}

#[derive(Debug, Clone)]
pub struct AdSlot {
    publisher_id: String,
    slot_id: String,
    mounted: bool,
}

impl AdSlot {
    pub fn new(publisher_id: impl Into<String>, slot_id: impl Into<String>) -> Self {
        Self {
            publisher_id: publisher_id.into(),
            slot_id: slot_id.into(),
            mounted: false,
        }
    }

    pub fn slot_id(&self) -> &str {
        &self.slot_id
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Bring the slot in line with `consent`. Mounting under `Accepted`
    /// pushes exactly one fill request; push failures are logged and
    /// otherwise ignored. Any other consent unmounts the slot.
    pub fn sync(&mut self, consent: ConsentState, network: &dyn AdNetwork) -> Option<AdPlacement> {
        if consent != ConsentState::Accepted {
            self.mounted = false;
            return None;
        }
        if !self.mounted {
            self.mounted = true;
            let request = AdRequest {
                publisher_id: self.publisher_id.clone(),
                slot_id: self.slot_id.clone(),
            };
            if let Err(e) = network.push(request) {
                tracing::warn!(error = %e, slot = %self.slot_id, "Ad network push failed");
            }
        }
        Some(AdPlacement {
            publisher_id: self.publisher_id.clone(),
            slot_id: self.slot_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingNetwork;

    impl AdNetwork for FailingNetwork {
        fn push(&self, _request: AdRequest) -> anyhow::Result<()> {
            anyhow::bail!("ad blocker")
        }
    }

    #[test]
    fn test_unset_consent_renders_nothing_and_pushes_nothing() {
        let queue = AdQueue::new();
        let mut slot = AdSlot::new(DEFAULT_PUBLISHER_ID, TOP_SLOT_ID);
        assert_eq!(slot.sync(ConsentState::Unset, &queue), None);
        assert_eq!(slot.sync(ConsentState::Necessary, &queue), None);
        assert!(queue.pushed().is_empty());
    }

    #[test]
    fn test_accepting_pushes_exactly_once() {
        let queue = AdQueue::new();
        let mut slot = AdSlot::new(DEFAULT_PUBLISHER_ID, TOP_SLOT_ID);
        slot.sync(ConsentState::Unset, &queue);

        let placement = slot.sync(ConsentState::Accepted, &queue).unwrap();
        assert_eq!(placement.slot_id, TOP_SLOT_ID);
        slot.sync(ConsentState::Accepted, &queue);
        slot.sync(ConsentState::Accepted, &queue);

        assert_eq!(
            queue.pushed(),
            vec![AdRequest {
                publisher_id: DEFAULT_PUBLISHER_ID.to_string(),
                slot_id: TOP_SLOT_ID.to_string(),
            }]
        );
    }

    #[test]
    fn test_each_slot_pushes_its_own_request() {
        let queue = AdQueue::new();
        let mut top = AdSlot::new(DEFAULT_PUBLISHER_ID, TOP_SLOT_ID);
        let mut side = AdSlot::new(DEFAULT_PUBLISHER_ID, SIDE_SLOT_ID);
        top.sync(ConsentState::Accepted, &queue);
        side.sync(ConsentState::Accepted, &queue);
        let slots: Vec<_> = queue.pushed().into_iter().map(|r| r.slot_id).collect();
        assert_eq!(slots, vec![TOP_SLOT_ID, SIDE_SLOT_ID]);
    }

    #[test]
    fn test_push_failure_still_renders_slot() {
        let mut slot = AdSlot::new(DEFAULT_PUBLISHER_ID, SIDE_SLOT_ID);
        assert!(slot.sync(ConsentState::Accepted, &FailingNetwork).is_some());
        assert!(slot.is_mounted());
    }
}
