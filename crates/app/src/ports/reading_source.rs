//! Reading source port — where the poller fetches the current reading from.

use std::future::Future;

use roomsense_domain::error::SenseError;
use roomsense_domain::reading::SensorPayload;

/// Provides the latest sensor payload and accepts enable/disable commands.
pub trait ReadingSource {
    /// Fetch the current payload.
    fn fetch(&self) -> impl Future<Output = Result<SensorPayload, SenseError>> + Send;

    /// Switch the upstream sensor on or off, returning the resulting state.
    fn set_sensor_enabled(
        &self,
        enabled: bool,
    ) -> impl Future<Output = Result<bool, SenseError>> + Send;
}

impl<T: ReadingSource + Send + Sync> ReadingSource for std::sync::Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<SensorPayload, SenseError>> + Send {
        (**self).fetch()
    }

    fn set_sensor_enabled(
        &self,
        enabled: bool,
    ) -> impl Future<Output = Result<bool, SenseError>> + Send {
        (**self).set_sensor_enabled(enabled)
    }
}
