//! Last-known attribute state for one appliance.
//!
//! Readers always see a complete snapshot: refreshes swap the whole map in
//! one step and notify subscribers only afterwards. Typed getters never
//! fail; decode problems are logged and read as absent.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

use sixthsense_domain::attribute::AttributeMap;
use sixthsense_domain::code::WireCode;
use sixthsense_domain::error::DecodeError;

use crate::notify::{NotificationHub, Subscription};
use crate::ports::AttributeFeed;

/// Attribute map plus change notification.
pub struct AttributeStore {
    attrs: RwLock<Arc<AttributeMap>>,
    hub: NotificationHub,
    generation: watch::Sender<u64>,
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new(AttributeMap::new())
    }
}

impl AttributeStore {
    /// Create a store seeded with `attrs`. No notification is sent.
    #[must_use]
    pub fn new(attrs: AttributeMap) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            attrs: RwLock::new(Arc::new(attrs)),
            hub: NotificationHub::new(),
            generation,
        }
    }

    /// The current attribute map.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AttributeMap> {
        self.attrs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.snapshot().get(key).map(str::to_string)
    }

    /// Boolean attribute; `None` when absent or not a boolean token.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.snapshot().get_bool(key)
    }

    /// Integer attribute; malformed values are logged and read as absent.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.snapshot().get_int(key).unwrap_or_else(|err| {
            log_decode_error(&err);
            None
        })
    }

    /// Temperature in °C; `None` when absent, malformed or reported as `0`.
    #[must_use]
    pub fn get_tenths(&self, key: &str) -> Option<f64> {
        self.snapshot().get_tenths(key).unwrap_or_else(|err| {
            log_decode_error(&err);
            None
        })
    }

    /// Enumeration attribute; missing or unknown codes are logged and read
    /// as `None`, never substituted.
    #[must_use]
    pub fn get_coded<C: WireCode>(&self, key: &str) -> Option<C> {
        self.snapshot().get_coded(key).map_or_else(
            |err| {
                log_decode_error(&err);
                None
            },
            Some,
        )
    }

    /// Register a change callback. See [`NotificationHub::register`].
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AttributeMap) + Send + Sync + 'static,
    {
        self.hub.register(callback)
    }

    /// Number of refreshes applied so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Receiver that observes every refresh; used to await acknowledgement
    /// of a write.
    #[must_use]
    pub fn refreshed(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Swap in the map built by `update` from the current one. The write
    /// lock is held across `update` so concurrent merges never drop keys;
    /// subscribers run after it is released.
    fn swap(&self, update: impl FnOnce(&AttributeMap) -> AttributeMap) {
        let attrs = {
            let mut current = self.attrs.write().unwrap_or_else(PoisonError::into_inner);
            let next = Arc::new(update(&current));
            *current = Arc::clone(&next);
            next
        };
        self.generation.send_modify(|generation| *generation += 1);
        tracing::trace!(
            attributes = attrs.len(),
            generation = self.generation(),
            "attribute store refreshed"
        );
        self.hub.notify(&attrs);
    }
}

impl AttributeFeed for AttributeStore {
    fn refresh(&self, attrs: AttributeMap) {
        self.swap(move |_| attrs);
    }

    fn merge(&self, attrs: AttributeMap) {
        self.swap(move |current| {
            let mut merged = current.clone();
            merged.merge(attrs);
            merged
        });
    }
}

fn log_decode_error(err: &DecodeError) {
    tracing::error!(error = %err, "failed to decode attribute");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixthsense_domain::cavity::CavityState;
    use std::sync::Mutex;

    fn store() -> AttributeStore {
        AttributeStore::new(
            [
                ("OvenUpperCavity_OpStatusState", "1"),
                ("OvenUpperCavity_CycleSetTargetTemp", "2000"),
                ("OvenUpperCavity_TimeSetCookTimeSet", "abc"),
                ("OvenLowerCavity_OpStatusState", "7"),
                ("Sys_OperationSetControlLock", "0"),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn should_read_typed_values() {
        let store = store();
        assert_eq!(store.get("OvenUpperCavity_OpStatusState").as_deref(), Some("1"));
        assert_eq!(store.get_bool("Sys_OperationSetControlLock"), Some(false));
        assert_eq!(store.get_tenths("OvenUpperCavity_CycleSetTargetTemp"), Some(200.0));
        assert_eq!(
            store.get_coded::<CavityState>("OvenUpperCavity_OpStatusState"),
            Some(CavityState::Preheating)
        );
    }

    #[test]
    fn should_read_malformed_integer_as_absent() {
        assert_eq!(store().get_int("OvenUpperCavity_TimeSetCookTimeSet"), None);
    }

    #[test]
    fn should_read_unknown_code_as_absent() {
        let store = store();
        assert_eq!(store.get_coded::<CavityState>("OvenLowerCavity_OpStatusState"), None);
        assert_eq!(store.get_coded::<CavityState>("Missing_Key"), None);
    }

    #[test]
    fn should_replace_whole_map_on_refresh() {
        let store = store();
        store.refresh([("OvenUpperCavity_OpStatusState", "0")].into_iter().collect());

        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.get("Sys_OperationSetControlLock"), None);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn should_keep_untouched_keys_on_merge() {
        let store = store();
        store.merge([("OvenUpperCavity_OpStatusState", "2")].into_iter().collect());

        assert_eq!(
            store.get_coded::<CavityState>("OvenUpperCavity_OpStatusState"),
            Some(CavityState::Cooking)
        );
        assert_eq!(store.get_bool("Sys_OperationSetControlLock"), Some(false));
    }

    #[test]
    fn should_notify_after_map_is_updated() {
        let store = Arc::new(store());
        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let reader = Arc::clone(&store);
        let _sub = store.subscribe(move |attrs| {
            // The store already holds the new map when callbacks run.
            sink.lock().unwrap().push((
                attrs.get("Sys_OperationSetControlLock").map(str::to_string),
                reader.get("Sys_OperationSetControlLock"),
            ));
        });

        store.merge([("Sys_OperationSetControlLock", "1")].into_iter().collect());

        let observed = observed.lock().unwrap();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].0.as_deref(), Some("1"));
        assert_eq!(observed[0].1.as_deref(), Some("1"));
    }

    #[test]
    fn should_keep_every_key_under_concurrent_merges() {
        let store = Arc::new(AttributeStore::default());
        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        let key = format!("Test_Writer{writer}Key{n}");
                        store.merge([(key.as_str(), "1")].into_iter().collect());
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(store.snapshot().len(), 400);
        assert_eq!(store.generation(), 400);
    }

    #[tokio::test]
    async fn should_signal_refresh_watchers() {
        let store = store();
        let mut rx = store.refreshed();
        store.refresh(AttributeMap::new());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }
}
