//! Per-connection state: who is signed in, the unsaved draft, and whether a
//! save is running.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard, watch};

use crate::auth::{AuthSession, Identity};
use crate::story::{GeneratedStory, StoryRequest};

#[derive(Debug, Clone)]
pub struct Draft {
    pub request: StoryRequest,
    pub story: GeneratedStory,
}

#[derive(Debug)]
struct DraftSlot {
    /// Bumped by every new draft.
    generation: u64,
    draft: Option<Draft>,
    identity: watch::Receiver<Option<Identity>>,
}

#[derive(Debug)]
pub struct StorySession {
    pub auth: AuthSession,
    slot: Mutex<DraftSlot>,
    saving: AtomicBool,
}

impl StorySession {
    pub fn new(identity: Option<Identity>) -> Self {
        let auth = AuthSession::new(identity);
        let identity = auth.subscribe();
        Self {
            auth,
            slot: Mutex::new(DraftSlot {
                generation: 0,
                draft: None,
                identity,
            }),
            saving: AtomicBool::new(false),
        }
    }

    /// A draft belongs to whoever was signed in when it was generated, so
    /// any identity change since the last access drops it.
    async fn slot(&self) -> MutexGuard<'_, DraftSlot> {
        let mut slot = self.slot.lock().await;
        if slot.identity.has_changed().unwrap_or(false) {
            slot.identity.borrow_and_update();
            slot.draft = None;
        }
        slot
    }

    /// Replaces any previous draft.
    pub async fn set_draft(&self, draft: Draft) {
        let mut slot = self.slot().await;
        slot.generation += 1;
        slot.draft = Some(draft);
    }

    pub async fn draft(&self) -> Option<Draft> {
        self.slot().await.draft.clone()
    }

    /// The current draft with its generation, for [`StorySession::clear_draft_if`].
    pub async fn checkout_draft(&self) -> Option<(u64, Draft)> {
        let slot = self.slot().await;
        slot.draft.clone().map(|draft| (slot.generation, draft))
    }

    pub async fn take_draft(&self) -> Option<Draft> {
        self.slot().await.draft.take()
    }

    /// Drops the draft only if no newer one replaced it since checkout.
    pub async fn clear_draft_if(&self, generation: u64) -> bool {
        let mut slot = self.slot().await;
        slot.generation == generation && slot.draft.take().is_some()
    }

    /// `None` while another save holds the guard.
    pub fn begin_save(&self) -> Option<SaveGuard<'_>> {
        self.saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SaveGuard { flag: &self.saving })
    }
}

impl Default for StorySession {
    fn default() -> Self {
        Self::new(None)
    }
}

pub struct SaveGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
