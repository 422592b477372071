//! Suspended synthesis sessions awaiting clarification answers.
//!
//! Contexts live only in process memory; a restart drops every outstanding
//! clarification round. Expiry is off unless a maximum age is configured.

use crate::domain::synthesis::{ContextHandle, SynthesisContext};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

pub trait ContextStore: Send + Sync {
    /// Stores the context under a freshly minted handle.
    fn create(&self, context: SynthesisContext) -> ContextHandle;

    /// First live context (oldest first) accepted by `predicate`.
    fn find(
        &self,
        predicate: &dyn Fn(&SynthesisContext) -> bool,
    ) -> Option<(ContextHandle, SynthesisContext)>;

    fn get(&self, handle: &ContextHandle) -> Option<SynthesisContext>;

    /// Removes and returns a live context.
    fn take(&self, handle: &ContextHandle) -> Option<SynthesisContext>;

    /// Puts a previously taken context back under its original handle.
    fn restore(&self, handle: ContextHandle, context: SynthesisContext);

    fn delete(&self, handle: &ContextHandle) -> bool;

    /// Drops expired contexts and returns how many were removed.
    fn sweep_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStoreConfig {
    pub max_age: Option<Duration>,
}

pub struct InMemoryContextStore {
    entries: Mutex<HashMap<ContextHandle, SynthesisContext>>,
    config: ContextStoreConfig,
}

impl InMemoryContextStore {
    pub fn new(config: ContextStoreConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ContextHandle, SynthesisContext>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_live(&self, context: &SynthesisContext) -> bool {
        match self.config.max_age {
            Some(max_age) => context.created_at.elapsed() <= max_age,
            None => true,
        }
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new(ContextStoreConfig::default())
    }
}

impl ContextStore for InMemoryContextStore {
    fn create(&self, context: SynthesisContext) -> ContextHandle {
        let mut entries = self.lock();
        let mut handle = ContextHandle::generate();
        while entries.contains_key(&handle) {
            handle = ContextHandle::generate();
        }
        entries.insert(handle.clone(), context);
        handle
    }

    fn find(
        &self,
        predicate: &dyn Fn(&SynthesisContext) -> bool,
    ) -> Option<(ContextHandle, SynthesisContext)> {
        let entries = self.lock();
        entries
            .iter()
            .filter(|(_, context)| self.is_live(context) && predicate(context))
            .min_by(|(left_handle, left), (right_handle, right)| {
                left.created_at
                    .cmp(&right.created_at)
                    .then_with(|| left_handle.as_str().cmp(right_handle.as_str()))
            })
            .map(|(handle, context)| (handle.clone(), context.clone()))
    }

    fn get(&self, handle: &ContextHandle) -> Option<SynthesisContext> {
        let entries = self.lock();
        entries
            .get(handle)
            .filter(|context| self.is_live(context))
            .cloned()
    }

    fn take(&self, handle: &ContextHandle) -> Option<SynthesisContext> {
        let mut entries = self.lock();
        let context = entries.remove(handle)?;
        if self.is_live(&context) {
            Some(context)
        } else {
            debug!(context_id = %handle, "Dropping expired context on take");
            None
        }
    }

    fn restore(&self, handle: ContextHandle, context: SynthesisContext) {
        let mut entries = self.lock();
        entries.insert(handle, context);
    }

    fn delete(&self, handle: &ContextHandle) -> bool {
        self.lock().remove(handle).is_some()
    }

    fn sweep_expired(&self) -> usize {
        if self.config.max_age.is_none() {
            return 0;
        }
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, context| self.is_live(context));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
