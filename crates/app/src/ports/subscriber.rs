//! Subscriber port — topic subscriptions on a publish/subscribe broker.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use velobridge_domain::error::TelemetryError;

/// Future returned by a [`TopicHandler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback invoked with the raw payload of every message delivered on a
/// subscribed topic.
///
/// Handlers may be invoked concurrently, both across topics and for repeated
/// deliveries on the same topic.
pub type TopicHandler = Arc<dyn Fn(Vec<u8>) -> HandlerFuture + Send + Sync>;

/// A broker connection able to deliver messages to per-topic callbacks.
pub trait Subscriber {
    /// Subscribe to `topic` and route every delivered payload to `handler`.
    fn subscribe(
        &mut self,
        topic: &str,
        handler: TopicHandler,
    ) -> impl Future<Output = Result<(), TelemetryError>> + Send;
}
