//! In-process change notification with isolated callbacks.
//!
//! Every refresh of the attribute store fires each registered callback once,
//! synchronously, with the new attribute map. A callback that panics is
//! logged and skipped; the remaining callbacks still run.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use sixthsense_domain::attribute::AttributeMap;

type Callback = Arc<dyn Fn(&AttributeMap) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    callbacks: Mutex<BTreeMap<u64, Callback>>,
}

impl Registry {
    fn remove(&self, id: u64) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Multi-subscriber callback registry.
#[derive(Default)]
pub struct NotificationHub {
    registry: Arc<Registry>,
}

impl NotificationHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every subsequent notification.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped or cancelled, or for the hub's lifetime once detached.
    pub fn register<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AttributeMap) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
            detached: false,
        }
    }

    /// Invoke every registered callback with `attrs`.
    pub fn notify(&self, attrs: &AttributeMap) {
        // Callbacks may (un)register; never call them under the lock.
        let callbacks: Vec<(u64, Callback)> = self
            .registry
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        for (id, callback) in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(attrs))) {
                tracing::error!(
                    subscription = id,
                    reason = panic_message(payload.as_ref()),
                    "change callback panicked"
                );
            }
        }
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message;
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message;
    }
    "non-string panic payload"
}

/// Handle to a registered callback; dropping it unregisters the callback.
#[must_use = "dropping a subscription unregisters its callback"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
    detached: bool,
}

impl Subscription {
    /// Unregister now.
    pub fn cancel(self) {}

    /// Keep the callback registered for as long as the hub lives.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&AttributeMap) + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        (hits, move |_: &AttributeMap| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn should_invoke_every_registered_callback() {
        let hub = NotificationHub::new();
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        let _s1 = hub.register(cb1);
        let _s2 = hub.register(cb2);

        hub.notify(&AttributeMap::new());

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_pass_current_attributes_to_callbacks() {
        let hub = NotificationHub::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let _sub = hub.register(move |attrs| {
            *sink.lock().unwrap() = attrs.get("Sys_OperationSetControlLock").map(str::to_string);
        });

        hub.notify(&[("Sys_OperationSetControlLock", "1")].into_iter().collect());

        assert_eq!(seen.lock().unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn should_keep_notifying_others_when_one_callback_panics() {
        let hub = NotificationHub::new();
        let _bad = hub.register(|_| panic!("boom"));
        let (hits, cb) = counter();
        let _good = hub.register(cb);

        hub.notify(&AttributeMap::new());
        hub.notify(&AttributeMap::new());

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_unregister_when_subscription_dropped() {
        let hub = NotificationHub::new();
        let (hits, cb) = counter();
        let sub = hub.register(cb);
        assert_eq!(hub.len(), 1);

        drop(sub);
        hub.notify(&AttributeMap::new());

        assert!(hub.is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_unregister_when_subscription_cancelled() {
        let hub = NotificationHub::new();
        let (_, cb) = counter();
        hub.register(cb).cancel();
        assert!(hub.is_empty());
    }

    #[test]
    fn should_keep_detached_callback_registered() {
        let hub = NotificationHub::new();
        let (hits, cb) = counter();
        hub.register(cb).detach();

        hub.notify(&AttributeMap::new());

        assert_eq!(hub.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_tolerate_subscription_outliving_hub() {
        let hub = NotificationHub::new();
        let (_, cb) = counter();
        let sub = hub.register(cb);
        drop(hub);
        drop(sub);
    }
}
