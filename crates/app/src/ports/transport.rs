//! Transport port: outbound attribute writes.

use std::future::Future;

use sixthsense_domain::attribute::AttributeMap;
use sixthsense_domain::error::SixthSenseError;

/// Delivers attribute diffs to the appliance.
///
/// Implementations own connection and session handling. The core never
/// retries: a failed write is returned to the operation that issued it.
pub trait ApplianceTransport {
    /// Write `attrs` to the appliance.
    fn write_attributes(
        &self,
        attrs: AttributeMap,
    ) -> impl Future<Output = Result<(), SixthSenseError>> + Send;
}

impl<T: ApplianceTransport + Send + Sync> ApplianceTransport for std::sync::Arc<T> {
    fn write_attributes(
        &self,
        attrs: AttributeMap,
    ) -> impl Future<Output = Result<(), SixthSenseError>> + Send {
        (**self).write_attributes(attrs)
    }
}
