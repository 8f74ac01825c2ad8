//! Feed port: inbound attribute snapshots.

use sixthsense_domain::attribute::AttributeMap;

/// Receives attribute state from a transport.
///
/// Both entry points replace the visible state atomically and notify
/// subscribers once the new state is in place.
pub trait AttributeFeed {
    /// Replace the whole attribute map with a fresh snapshot.
    fn refresh(&self, attrs: AttributeMap);

    /// Overlay a pushed partial update on the current map.
    fn merge(&self, attrs: AttributeMap);
}

impl<T: AttributeFeed + ?Sized> AttributeFeed for std::sync::Arc<T> {
    fn refresh(&self, attrs: AttributeMap) {
        (**self).refresh(attrs);
    }

    fn merge(&self, attrs: AttributeMap) {
        (**self).merge(attrs);
    }
}
