//! Telemetry listener — subscribes to the device feed and drives the
//! ingestion pipeline.
//!
//! The listener owns its broker session. When the connection drops it
//! rebuilds the client after a fixed delay and resubscribes; frames
//! published while disconnected are simply missed (the cache only ever
//! needs the latest value anyway). Each frame is handled on its own
//! task so slow sink writes never stall the poll loop or keepalives.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, Incoming, MqttOptions, Publish, QoS};
use tokio::sync::watch;
use tokio::time::sleep;

use farmhub_app::pipeline::ReadingPipeline;
use farmhub_app::ports::{ReadingCache, TimeSeriesStore};

use crate::config::MqttConfig;
use crate::topic;

/// Cloneable health flag reporting whether the listener currently
/// holds a broker connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    connected: Arc<AtomicBool>,
}

impl ConnectionStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the listener is connected and subscribed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn set(&self, up: bool) {
        self.connected.store(up, Ordering::Relaxed);
    }
}

/// What the listener should do with one polled broker event.
#[derive(Debug)]
enum Step {
    Connected,
    Ingest(Publish),
    Skip,
    Reconnect,
}

fn classify(event: Result<Event, ConnectionError>) -> Step {
    match event {
        Ok(Event::Incoming(Incoming::ConnAck(_))) => Step::Connected,
        Ok(Event::Incoming(Incoming::Publish(publish))) => {
            if topic::device_id(&publish.topic).is_some() {
                Step::Ingest(publish)
            } else {
                Step::Skip
            }
        }
        Ok(_) => Step::Skip,
        Err(_) => Step::Reconnect,
    }
}

/// Run the listener until `stop` becomes `true`.
///
/// Never returns an error: connection failures are logged and retried
/// after `reconnect_delay_secs`.
pub async fn run_listener<C, T>(
    config: MqttConfig,
    pipeline: ReadingPipeline<C, T>,
    status: ConnectionStatus,
    mut stop: watch::Receiver<bool>,
) where
    C: ReadingCache + Send + Sync + 'static,
    T: TimeSeriesStore + Send + Sync + 'static,
{
    let reconnect_delay = Duration::from_secs(u64::from(config.reconnect_delay_secs));
    let pipeline = Arc::new(pipeline);

    loop {
        if *stop.borrow() {
            break;
        }

        let mut options = MqttOptions::new(
            format!("{}-listener", config.client_id),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        if let Some(username) = &config.username {
            options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
        }

        let (client, mut eventloop) = AsyncClient::new(options, 32);

        if let Err(error) = client.subscribe(topic::TELEMETRY_FILTER, QoS::AtLeastOnce).await {
            tracing::warn!(%error, "failed to subscribe to telemetry feed; retrying");
            if wait(reconnect_delay, &mut stop).await {
                break;
            }
            continue;
        }

        loop {
            tokio::select! {
                event = eventloop.poll() => {
                    if let Err(error) = &event {
                        tracing::warn!(%error, "telemetry connection dropped; reconnecting");
                    }
                    match classify(event) {
                        Step::Connected => {
                            status.set(true);
                            tracing::info!(topic = topic::TELEMETRY_FILTER, "connected to broker, listening");
                        }
                        Step::Ingest(publish) => {
                            let pipeline = Arc::clone(&pipeline);
                            tokio::spawn(async move {
                                pipeline.handle_frame(&publish.topic, &publish.payload).await;
                            });
                        }
                        Step::Skip => {}
                        Step::Reconnect => {
                            status.set(false);
                            break;
                        }
                    }
                }
                _ = stop.changed() => {
                    status.set(false);
                    tracing::info!("telemetry listener stopped");
                    return;
                }
            }
        }

        if wait(reconnect_delay, &mut stop).await {
            break;
        }
    }

    status.set(false);
    tracing::info!("telemetry listener stopped");
}

/// Stop-aware sleep; returns whether the loop should stop.
async fn wait(duration: Duration, stop: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = sleep(duration) => *stop.borrow(),
        _ = stop.changed() => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, Outgoing};

    fn publish_event(topic: &str) -> Result<Event, ConnectionError> {
        Ok(Event::Incoming(Incoming::Publish(Publish::new(
            topic,
            QoS::AtLeastOnce,
            "{}",
        ))))
    }

    #[test]
    fn should_connect_on_conn_ack() {
        let ack = ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        };
        let step = classify(Ok(Event::Incoming(Incoming::ConnAck(ack))));
        assert!(matches!(step, Step::Connected));
    }

    #[test]
    fn should_ingest_frames_from_telemetry_topics() {
        match classify(publish_event("device/greenhouse-1/data")) {
            Step::Ingest(publish) => assert_eq!(publish.topic, "device/greenhouse-1/data"),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn should_skip_frames_on_foreign_topics() {
        assert!(matches!(
            classify(publish_event("actuator/pump-1/command")),
            Step::Skip
        ));
        assert!(matches!(
            classify(publish_event("device/x/status")),
            Step::Skip
        ));
    }

    #[test]
    fn should_skip_other_broker_events() {
        let step = classify(Ok(Event::Outgoing(Outgoing::PingReq)));
        assert!(matches!(step, Step::Skip));
    }

    #[test]
    fn should_reconnect_on_connection_error() {
        let step = classify(Err(ConnectionError::RequestsDone));
        assert!(matches!(step, Step::Reconnect));
    }

    #[test]
    fn should_report_connection_transitions() {
        let status = ConnectionStatus::new();
        assert!(!status.is_connected());

        status.set(true);
        assert!(status.is_connected());
        assert!(status.clone().is_connected());

        status.set(false);
        assert!(!status.is_connected());
    }
}
