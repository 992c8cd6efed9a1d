//! Dispatcher — binds one callback per telemetry topic and routes each
//! delivered payload through the decoder to the matching writer.
//!
//! Every message is handled independently: nothing is queued, batched,
//! deduplicated or reordered here, and no error escapes a callback.

use std::sync::Arc;

use velobridge_domain::error::TelemetryError;

use crate::decoder;
use crate::ports::{HandlerFuture, ReadingStore, Subscriber, TopicHandler};
use crate::services::battery_writer::BatteryWriter;
use crate::services::location_writer::LocationWriter;

/// Names of the topics the dispatcher subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// Topic carrying battery-status payloads.
    pub battery: String,
    /// Topic carrying GPS-coordinates payloads.
    pub location: String,
}

/// Routes payloads from the battery and location topics to their writers.
pub struct Dispatcher<S> {
    battery: BatteryWriter<S>,
    location: LocationWriter<S>,
}

impl<S> Dispatcher<S>
where
    S: ReadingStore + 'static,
{
    /// Create a dispatcher writing through the given services.
    pub fn new(battery: BatteryWriter<S>, location: LocationWriter<S>) -> Self {
        Self { battery, location }
    }

    /// Register one callback per topic on `subscriber`.
    ///
    /// # Errors
    ///
    /// Returns the broker error if either subscription is refused.
    pub async fn bind<B: Subscriber>(
        self: &Arc<Self>,
        subscriber: &mut B,
        topics: &Topics,
    ) -> Result<(), TelemetryError> {
        subscriber
            .subscribe(&topics.battery, self.battery_handler())
            .await?;
        tracing::info!(topic = %topics.battery, "subscribed to battery topic");

        subscriber
            .subscribe(&topics.location, self.location_handler())
            .await?;
        tracing::info!(topic = %topics.location, "subscribed to location topic");

        Ok(())
    }

    /// Decode and persist one battery-status payload.
    ///
    /// Undecodable payloads and failed writes are logged and dropped.
    pub async fn handle_battery(&self, payload: &[u8]) {
        let reading = match decoder::decode_battery(payload) {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(error = ?err, "dropping undecodable battery payload");
                return;
            }
        };

        if let Ok(battery_id) = self.battery.write(&reading).await {
            tracing::info!(
                %battery_id,
                cells = reading.cell_voltages.len(),
                temps = reading.bat_temps.len(),
                "battery reading stored"
            );
        }
    }

    /// Decode and persist one GPS-coordinates payload.
    ///
    /// Undecodable payloads and failed writes are logged and dropped.
    pub async fn handle_location(&self, payload: &[u8]) {
        let reading = match decoder::decode_location(payload) {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(error = ?err, "dropping undecodable location payload");
                return;
            }
        };

        if self.location.write(&reading).await.is_ok() {
            tracing::info!(
                latitude = reading.latitude,
                longitude = reading.longitude,
                "location reading stored"
            );
        }
    }

    fn battery_handler(self: &Arc<Self>) -> TopicHandler {
        let this = Arc::clone(self);
        Arc::new(move |payload: Vec<u8>| -> HandlerFuture {
            let this = Arc::clone(&this);
            Box::pin(async move { this.handle_battery(&payload).await })
        })
    }

    fn location_handler(self: &Arc<Self>) -> TopicHandler {
        let this = Arc::clone(self);
        Arc::new(move |payload: Vec<u8>| -> HandlerFuture {
            let this = Arc::clone(&this);
            Box::pin(async move { this.handle_location(&payload).await })
        })
    }
}
