//! # velobridge-adapter-mqtt
//!
//! MQTT adapter — connects to a broker with `rumqttc` and implements the
//! [`Subscriber`](velobridge_app::ports::Subscriber) port.
//!
//! ## Responsibilities
//! - Parse the broker URL and build client options from [`MqttConfig`]
//! - Subscribe to topics and confirm the broker accepted them
//! - Poll the event loop, spawning one task per delivered publish with a
//!   bounded number in flight
//! - Disconnect cleanly when shutdown is signalled
//!
//! ## Dependency rule
//! Same as other adapters: depends on `velobridge-app` and `velobridge-domain`.

mod config;
mod error;
mod subscriber;

pub use config::MqttConfig;
pub use error::MqttError;
pub use subscriber::{MqttSubscriber, parse_broker_url};
