//! Broker subscription and event loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, Publish, QoS, SubAck,
    SubscribeReasonCode,
};
use tokio::sync::{Semaphore, watch};

use velobridge_app::ports::{Subscriber, TopicHandler};
use velobridge_domain::error::TelemetryError;

use crate::config::MqttConfig;
use crate::error::MqttError;

const DEFAULT_PORT: u16 = 1883;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Split a broker URL of the form `[tcp://|mqtt://]host[:port]` into host and
/// port. The port defaults to 1883.
///
/// # Errors
///
/// Returns [`MqttError::InvalidBrokerUrl`] if the host is empty, the port is
/// not a number, or the URL has more than one `:` after the scheme.
pub fn parse_broker_url(url: &str) -> Result<(&str, u16), MqttError> {
    let address = url
        .strip_prefix("tcp://")
        .or_else(|| url.strip_prefix("mqtt://"))
        .unwrap_or(url);

    let parts: Vec<&str> = address.split(':').collect();
    let (host, port) = match parts.as_slice() {
        [host] => (*host, DEFAULT_PORT),
        [host, port] => {
            let port = port
                .parse::<u16>()
                .map_err(|_| MqttError::InvalidBrokerUrl(url.to_string()))?;
            (*host, port)
        }
        _ => return Err(MqttError::InvalidBrokerUrl(url.to_string())),
    };

    if host.is_empty() {
        return Err(MqttError::InvalidBrokerUrl(url.to_string()));
    }
    Ok((host, port))
}

/// MQTT implementation of the [`Subscriber`] port.
///
/// Subscriptions are queued with [`Subscriber::subscribe`], confirmed with
/// [`establish`](Self::establish), then served by [`run`](Self::run) until
/// shutdown.
///
/// Each delivery runs on its own task, at most `max_in_flight` at a time.
/// When every slot is taken the event loop stops polling until one frees up,
/// so a slow handler throttles intake from the broker.
pub struct MqttSubscriber {
    client: AsyncClient,
    eventloop: EventLoop,
    qos: QoS,
    handlers: HashMap<String, TopicHandler>,
    pending_acks: usize,
    in_flight: Arc<Semaphore>,
}

impl MqttSubscriber {
    /// Create a client for the configured broker. No connection is made until
    /// the event loop is polled.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError`] if the broker URL or QoS level is invalid.
    pub fn new(config: &MqttConfig) -> Result<Self, MqttError> {
        let (host, port) = parse_broker_url(&config.broker_url)?;
        let qos = config.subscription_qos()?;

        let mut options = MqttOptions::new(&config.client_id, host, port);
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        options.set_clean_session(true);

        let (client, eventloop) = AsyncClient::new(options, config.channel_capacity);

        let max_in_flight = config.handler_limit();

        tracing::debug!(
            host,
            port,
            client_id = %config.client_id,
            max_in_flight,
            "MQTT client created"
        );

        Ok(Self {
            client,
            eventloop,
            qos,
            handlers: HashMap::new(),
            pending_acks: 0,
            in_flight: Arc::new(Semaphore::new(max_in_flight)),
        })
    }

    /// Connect and wait until the broker has acknowledged every queued
    /// subscription. Publishes arriving meanwhile are dispatched normally.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Connection`] if the broker cannot be reached and
    /// [`MqttError::SubscriptionRejected`] if it refuses a subscription.
    pub async fn establish(&mut self) -> Result<(), MqttError> {
        while self.pending_acks > 0 {
            let event = self.eventloop.poll().await.map_err(MqttError::Connection)?;
            self.on_event(event).await?;
        }
        tracing::info!(topics = self.handlers.len(), "MQTT subscriptions confirmed");
        Ok(())
    }

    /// Serve deliveries until `shutdown` changes or its sender is dropped,
    /// then disconnect from the broker.
    ///
    /// Connection errors are logged and polling resumes after a short delay;
    /// subscriptions are renewed when the broker starts a fresh session.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut reconnecting = false;

        loop {
            let event = tokio::select! {
                _ = shutdown.changed() => break,
                event = self.eventloop.poll() => event,
            };

            match event {
                Ok(event) => {
                    if let Event::Incoming(Packet::ConnAck(ack)) = &event {
                        if reconnecting && !ack.session_present {
                            self.resubscribe();
                        }
                        reconnecting = false;
                    }
                    if let Err(err) = self.on_event(event).await {
                        tracing::error!(error = %err, "MQTT subscription failed");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "MQTT event loop error");
                    reconnecting = true;
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        () = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        self.disconnect().await;
    }

    async fn on_event(&mut self, event: Event) -> Result<(), MqttError> {
        match event {
            Event::Incoming(Packet::Publish(publish)) => {
                dispatch(&self.handlers, &self.in_flight, &publish).await;
            }
            Event::Incoming(Packet::SubAck(ack)) => return self.on_suback(&ack),
            Event::Incoming(Packet::ConnAck(_)) => {
                tracing::info!("connected to MQTT broker");
            }
            _ => {}
        }
        Ok(())
    }

    fn on_suback(&mut self, ack: &SubAck) -> Result<(), MqttError> {
        self.pending_acks = self.pending_acks.saturating_sub(1);
        if ack
            .return_codes
            .iter()
            .any(|code| matches!(code, SubscribeReasonCode::Failure))
        {
            return Err(MqttError::SubscriptionRejected);
        }
        tracing::debug!(pkid = ack.pkid, "subscription acknowledged");
        Ok(())
    }

    fn resubscribe(&mut self) {
        for topic in self.handlers.keys() {
            match self.client.try_subscribe(topic.as_str(), self.qos) {
                Ok(()) => {
                    self.pending_acks += 1;
                    tracing::info!(%topic, "renewing subscription");
                }
                Err(err) => tracing::error!(%topic, error = %err, "failed to renew subscription"),
            }
        }
    }

    async fn disconnect(mut self) {
        if let Err(err) = self.client.try_disconnect() {
            tracing::warn!(error = %err, "failed to queue MQTT disconnect");
            return;
        }

        let flushed = tokio::time::timeout(DISCONNECT_TIMEOUT, async {
            loop {
                match self.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;

        if flushed.is_err() {
            tracing::warn!("timed out disconnecting from MQTT broker");
        } else {
            tracing::info!("disconnected from MQTT broker");
        }
    }
}

/// Hand a publish to its topic handler on a new task once a slot is free.
async fn dispatch(
    handlers: &HashMap<String, TopicHandler>,
    in_flight: &Arc<Semaphore>,
    publish: &Publish,
) {
    let Some(handler) = handlers.get(publish.topic.as_str()) else {
        tracing::debug!(topic = %publish.topic, "ignoring publish on unsubscribed topic");
        return;
    };

    let Ok(permit) = Arc::clone(in_flight).acquire_owned().await else {
        tracing::error!(topic = %publish.topic, "handler slots closed, dropping message");
        return;
    };

    tracing::debug!(
        topic = %publish.topic,
        bytes = publish.payload.len(),
        available = in_flight.available_permits(),
        "message received"
    );

    let delivery = handler(publish.payload.to_vec());
    tokio::spawn(async move {
        delivery.await;
        drop(permit);
    });
}

impl Subscriber for MqttSubscriber {
    async fn subscribe(&mut self, topic: &str, handler: TopicHandler) -> Result<(), TelemetryError> {
        self.client
            .try_subscribe(topic, self.qos)
            .map_err(MqttError::Client)?;
        self.pending_acks += 1;
        self.handlers.insert(topic.to_string(), handler);
        Ok(())
    }
}
