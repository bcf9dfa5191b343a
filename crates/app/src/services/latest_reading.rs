//! Latest-reading store — a single slot overwritten by every device push.

use std::future::Future;

use tokio::sync::RwLock;

use roomsense_domain::error::SenseError;
use roomsense_domain::reading::SensorPayload;

use crate::ports::ReadingSource;

#[derive(Debug)]
struct Slot {
    payload: SensorPayload,
    sensor_enabled: bool,
}

/// Holds the most recent payload pushed by the sensor device.
///
/// Nothing is validated and nothing is kept besides the last push: the
/// newest write wins. Temperature and humidity start out `null`.
#[derive(Debug)]
pub struct LatestReadingStore {
    slot: RwLock<Slot>,
}

impl Default for LatestReadingStore {
    fn default() -> Self {
        Self {
            slot: RwLock::new(Slot {
                payload: SensorPayload::default(),
                sensor_enabled: true,
            }),
        }
    }
}

impl LatestReadingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with `payload`.
    ///
    /// An explicit `sensorEnabled` in the payload also updates the enabled flag.
    pub async fn push(&self, payload: SensorPayload) {
        let mut slot = self.slot.write().await;
        if let Some(enabled) = payload.sensor_enabled {
            slot.sensor_enabled = enabled;
        }
        slot.payload = payload;
    }

    /// The last pushed payload, carrying the current enabled flag.
    pub async fn latest(&self) -> SensorPayload {
        let slot = self.slot.read().await;
        SensorPayload {
            sensor_enabled: Some(slot.sensor_enabled),
            ..slot.payload.clone()
        }
    }

    /// Record whether the sensor is switched on.
    pub async fn set_sensor_enabled(&self, enabled: bool) {
        self.slot.write().await.sensor_enabled = enabled;
    }

    /// Whether the sensor is currently switched on.
    pub async fn sensor_enabled(&self) -> bool {
        self.slot.read().await.sensor_enabled
    }
}

impl ReadingSource for LatestReadingStore {
    fn fetch(&self) -> impl Future<Output = Result<SensorPayload, SenseError>> + Send {
        async move { Ok(self.latest().await) }
    }

    fn set_sensor_enabled(
        &self,
        enabled: bool,
    ) -> impl Future<Output = Result<bool, SenseError>> + Send {
        async move {
            LatestReadingStore::set_sensor_enabled(self, enabled).await;
            Ok(enabled)
        }
    }
}
