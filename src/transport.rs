//! MQTT transport: connection bootstrap and the blocking publish primitive.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::MqttOpts;

pub use rumqttc::QoS;

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Errors raised by the MQTT transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid broker URL '{0}': expected tcp://host:port")]
    InvalidBrokerUrl(String),

    #[error("invalid QoS level {0}: expected 0, 1 or 2")]
    InvalidQos(u8),

    #[error("MQTT connection failed: {0}")]
    Connect(#[from] rumqttc::ConnectionError),

    #[error("broker rejected the connection: {0:?}")]
    ConnectionRefused(ConnectReturnCode),

    #[error("publish request failed: {0}")]
    Request(#[from] rumqttc::ClientError),

    #[error("connection error while waiting for acknowledgment: {0}")]
    ConnectionLost(rumqttc::ConnectionError),

    #[error("acknowledgment not received within {0:?}")]
    AckTimeout(Duration),

    #[error("connection driver stopped")]
    DriverStopped,
}

/// Blocking publish seam between the pacers and the broker.
///
/// One call publishes one message and returns only once the broker (or the
/// wire, for QoS 0) has acknowledged it, so callers never have more than one
/// publish in flight.
#[async_trait]
pub trait Publisher: Send {
    /// Publish one message and wait for its acknowledgment.
    async fn publish(&mut self, topic: &str, qos: QoS, payload: &str)
        -> Result<(), TransportError>;

    /// Release transport resources. Defaults to a no-op.
    async fn close(&mut self) {}
}

/// Acknowledgment-relevant events forwarded by the connection driver.
#[derive(Debug)]
enum AckEvent {
    /// Publish packet handed to the wire; completes a QoS 0 publish
    Dispatched,
    /// Broker acknowledgment completing a QoS 1 publish
    PubAck,
    /// Broker acknowledgment completing a QoS 2 publish
    PubComp,
    /// Event loop failure observed while polling
    ConnectionLost(rumqttc::ConnectionError),
}

/// Publisher backed by a rumqttc [`AsyncClient`].
///
/// The event loop is polled by a background driver task so the connection
/// stays serviced (keep-alives, reconnects) while a pacer sleeps between
/// batches. The driver forwards acknowledgment events over a channel;
/// because at most one publish is in flight, the next matching event always
/// belongs to the outstanding call.
pub struct MqttPublisher {
    client: AsyncClient,
    events: mpsc::Receiver<AckEvent>,
    ack_timeout: Duration,
    cancel: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl MqttPublisher {
    /// Connect to the broker and wait until it accepts the session.
    pub async fn connect(opts: &MqttOpts) -> Result<Self, TransportError> {
        let (host, port) = parse_broker_url(&opts.broker_url)?;
        let mut options = MqttOptions::new(opts.client_id_prefix.clone(), host, port);
        options.set_keep_alive(KEEP_ALIVE);
        if !opts.mqtt_username.is_empty() {
            options.set_credentials(opts.mqtt_username.clone(), opts.mqtt_password.clone());
        }

        let (client, mut event_loop) = AsyncClient::new(options, 10);

        // Drive the event loop by hand until the session is accepted.
        loop {
            match event_loop.poll().await? {
                Event::Incoming(Packet::ConnAck(ack)) => {
                    if ack.code == ConnectReturnCode::Success {
                        break;
                    }
                    return Err(TransportError::ConnectionRefused(ack.code));
                }
                _ => continue,
            }
        }

        let (ack_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let driver = tokio::spawn(drive_connection(event_loop, ack_tx, cancel.clone()));

        Ok(Self {
            client,
            events,
            ack_timeout: Duration::from_secs(opts.publish_timeout_sec),
            cancel,
            driver: Some(driver),
        })
    }

    async fn wait_for_completion(&mut self, qos: QoS) -> Result<(), TransportError> {
        loop {
            let event = self
                .events
                .recv()
                .await
                .ok_or(TransportError::DriverStopped)?;

            match event {
                AckEvent::ConnectionLost(e) => return Err(TransportError::ConnectionLost(e)),
                AckEvent::Dispatched if qos == QoS::AtMostOnce => return Ok(()),
                AckEvent::PubAck if qos == QoS::AtLeastOnce => return Ok(()),
                AckEvent::PubComp if qos == QoS::ExactlyOnce => return Ok(()),
                // Intermediate event for a higher QoS level; keep waiting
                AckEvent::Dispatched | AckEvent::PubAck | AckEvent::PubComp => continue,
            }
        }
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(
        &mut self,
        topic: &str,
        qos: QoS,
        payload: &str,
    ) -> Result<(), TransportError> {
        // Anything still queued belongs to an earlier call: a late ack after
        // a timeout, or reconnect noise from a pacer sleep.
        while self.events.try_recv().is_ok() {}

        self.client
            .publish(topic, qos, false, payload.as_bytes())
            .await?;

        match tokio::time::timeout(self.ack_timeout, self.wait_for_completion(qos)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::AckTimeout(self.ack_timeout)),
        }
    }

    async fn close(&mut self) {
        let _ = self.client.disconnect().await;
        self.cancel.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

/// Poll the event loop until cancelled, forwarding acknowledgment events.
async fn drive_connection(
    mut event_loop: EventLoop,
    events: mpsc::Sender<AckEvent>,
    cancel: CancellationToken,
) {
    loop {
        let polled = tokio::select! {
            _ = cancel.cancelled() => break,
            polled = event_loop.poll() => polled,
        };

        let (event, failed) = match polled {
            Ok(Event::Outgoing(Outgoing::Publish(_))) => (Some(AckEvent::Dispatched), false),
            Ok(Event::Incoming(Packet::PubAck(_))) => (Some(AckEvent::PubAck), false),
            Ok(Event::Incoming(Packet::PubComp(_))) => (Some(AckEvent::PubComp), false),
            Ok(_) => (None, false),
            Err(e) => {
                warn!("MQTT connection error: {}", e);
                (Some(AckEvent::ConnectionLost(e)), true)
            }
        };

        if let Some(event) = event {
            // A full queue only holds stale events; the next publish drains
            // them anyway.
            if let Err(TrySendError::Closed(_)) = events.try_send(event) {
                break;
            }
        }

        if failed {
            // rumqttc retries the connection on the next poll; don't spin.
            tokio::time::sleep(RECONNECT_BACKOFF).await;
        }
    }
}

/// Parse a broker URL of the form `tcp://host:port` (scheme optional).
pub fn parse_broker_url(url: &str) -> Result<(String, u16), TransportError> {
    let rest = match url.split_once("://") {
        Some(("tcp", rest)) => rest,
        Some(_) => return Err(TransportError::InvalidBrokerUrl(url.to_string())),
        None => url,
    };

    let (host, port) = rest
        .rsplit_once(':')
        .ok_or_else(|| TransportError::InvalidBrokerUrl(url.to_string()))?;
    if host.is_empty() {
        return Err(TransportError::InvalidBrokerUrl(url.to_string()));
    }

    let port: u16 = port
        .parse()
        .map_err(|_| TransportError::InvalidBrokerUrl(url.to_string()))?;

    Ok((host.to_string(), port))
}

/// Map the numeric CLI level onto the client's QoS type.
pub fn qos_from_level(level: u8) -> Result<QoS, TransportError> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(TransportError::InvalidQos(other)),
    }
}
