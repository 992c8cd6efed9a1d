//! MQTT adapter error types.

use velobridge_domain::error::TelemetryError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The broker URL could not be split into host and port.
    #[error("invalid broker URL: {0}")]
    InvalidBrokerUrl(String),

    /// The configured quality of service is not 0, 1 or 2.
    #[error("invalid MQTT QoS level {0}")]
    InvalidQos(u8),

    /// The rumqttc client could not queue a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The connection to the broker failed.
    #[error("MQTT connection error")]
    Connection(#[source] rumqttc::ConnectionError),

    /// The broker refused a subscription.
    #[error("broker rejected subscription")]
    SubscriptionRejected,
}

impl From<MqttError> for TelemetryError {
    fn from(err: MqttError) -> Self {
        TelemetryError::Broker(Box::new(err))
    }
}
