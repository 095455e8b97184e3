//! Lifecycle hooks keeping the index in step with a host data layer.
//!
//! A host that persists records tells its listeners about saves and deletes.
//! Hosts with their own dispatcher implement [`HookRegistry`]; others can use
//! [`ModelSignals`]. A [`Client`](crate::Client) connects itself with
//! [`Client::register_hooks`](crate::Client::register_hooks).

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::serializer::Indexable;

/// A record type owned by a host data layer.
pub trait Model: Indexable + Send + Sync + 'static {
    /// Application the model belongs to; the default index name.
    fn app_label() -> String;

    /// Model name; the default document type.
    fn model_name() -> String;

    /// Primary key, if the record has one.
    fn pk(&self) -> Option<String>;
}

/// Listener for record lifecycle events.
#[async_trait]
pub trait LifecycleHook<M: Model>: Send + Sync {
    async fn post_save(&self, instance: &M) -> Result<()>;

    async fn post_delete(&self, instance: &M) -> Result<()>;
}

/// Somewhere lifecycle hooks can be connected.
pub trait HookRegistry<M: Model> {
    fn connect(&self, hook: Arc<dyn LifecycleHook<M>>);
}

/// A minimal in-process signal dispatcher.
pub struct ModelSignals<M: Model> {
    hooks: RwLock<Vec<Arc<dyn LifecycleHook<M>>>>,
}

impl<M: Model> Default for ModelSignals<M> {
    fn default() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }
}

impl<M: Model> ModelSignals<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify every hook that `instance` was saved. Stops at the first
    /// error.
    pub async fn fire_save(&self, instance: &M) -> Result<()> {
        for hook in self.snapshot() {
            hook.post_save(instance).await?;
        }
        Ok(())
    }

    /// Notify every hook that `instance` was deleted. Stops at the first
    /// error.
    pub async fn fire_delete(&self, instance: &M) -> Result<()> {
        for hook in self.snapshot() {
            hook.post_delete(instance).await?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<dyn LifecycleHook<M>>> {
        self.hooks.read().clone()
    }
}

impl<M: Model> HookRegistry<M> for ModelSignals<M> {
    fn connect(&self, hook: Arc<dyn LifecycleHook<M>>) {
        debug!(model = %M::model_name(), "lifecycle hook connected");
        self.hooks.write().push(hook);
    }
}

impl<M: Model> fmt::Debug for ModelSignals<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSignals")
            .field("hooks", &self.len())
            .finish()
    }
}
