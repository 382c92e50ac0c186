//! Command publisher — bounded queue in front of the broker.
//!
//! `CommandPublisher` is the cheap, cloneable handle the dispatcher
//! enqueues into; `run_publisher` is the worker that owns the broker
//! session and drains the queue. While the broker is unreachable,
//! commands wait in the queue up to its capacity; beyond that `enqueue`
//! reports the queue full instead of blocking the engine.

use std::time::Duration;

use rumqttc::{AsyncClient, MqttOptions, QoS};
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

use farmhub_app::ports::{Command, CommandSink};
use farmhub_domain::error::FarmHubError;

use crate::config::MqttConfig;
use crate::error::MqttError;

/// Sending side of the command queue. Implements [`CommandSink`].
#[derive(Debug, Clone)]
pub struct CommandPublisher {
    tx: mpsc::Sender<Command>,
}

/// Create the queue pair: the sink handle and the receiver the worker
/// drains.
#[must_use]
pub fn command_queue(capacity: usize) -> (CommandPublisher, mpsc::Receiver<Command>) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommandPublisher { tx }, rx)
}

impl CommandSink for CommandPublisher {
    fn enqueue(&self, command: Command) -> Result<(), FarmHubError> {
        self.tx.try_send(command).map_err(|err| {
            let err = match err {
                mpsc::error::TrySendError::Full(_) => MqttError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => MqttError::PublisherStopped,
            };
            err.into()
        })
    }
}

/// Run the publishing worker until `stop` becomes `true`.
///
/// The worker keeps its own broker session, separate from the listener,
/// and rebuilds it with the same fixed delay on failure.
pub async fn run_publisher(
    config: MqttConfig,
    mut queue: mpsc::Receiver<Command>,
    mut stop: watch::Receiver<bool>,
) {
    let reconnect_delay = Duration::from_secs(u64::from(config.reconnect_delay_secs));
    let qos = qos_level(config.command_qos);

    loop {
        if *stop.borrow() {
            break;
        }

        let mut options = MqttOptions::new(
            format!("{}-publisher", config.client_id),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        if let Some(username) = &config.username {
            options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
        }

        let (client, mut eventloop) = AsyncClient::new(options, 32);

        loop {
            tokio::select! {
                event = eventloop.poll() => {
                    if let Err(error) = event {
                        tracing::warn!(%error, "command connection dropped; reconnecting");
                        break;
                    }
                }
                command = queue.recv() => {
                    let Some(command) = command else {
                        tracing::info!("command queue closed, publisher stopping");
                        return;
                    };
                    tracing::debug!(topic = %command.topic, "publishing command");
                    if let Err(error) = client
                        .publish(command.topic.clone(), qos, false, command.payload.clone())
                        .await
                    {
                        tracing::warn!(topic = %command.topic, %error, "command publish failed");
                    }
                }
                _ = stop.changed() => {
                    tracing::info!("command publisher stopped");
                    return;
                }
            }
        }

        tokio::select! {
            () = sleep(reconnect_delay) => {}
            _ = stop.changed() => break,
        }
    }

    tracing::info!("command publisher stopped");
}

fn qos_level(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_enqueue_until_capacity() {
        let (publisher, _rx) = command_queue(2);
        assert!(publisher.enqueue(Command::for_actuator("pump-1", "on")).is_ok());
        assert!(publisher.enqueue(Command::for_actuator("pump-1", "off")).is_ok());

        let err = publisher
            .enqueue(Command::for_actuator("pump-1", "on"))
            .unwrap_err();
        assert!(matches!(err, FarmHubError::Transport(_)));
    }

    #[test]
    fn should_fail_enqueue_after_worker_stops() {
        let (publisher, rx) = command_queue(2);
        drop(rx);
        let err = publisher
            .enqueue(Command::for_actuator("pump-1", "on"))
            .unwrap_err();
        assert!(matches!(err, FarmHubError::Transport(_)));
    }

    #[tokio::test]
    async fn should_deliver_commands_in_order_to_worker() {
        let (publisher, mut rx) = command_queue(8);
        publisher.enqueue(Command::for_actuator("a", "1")).unwrap();
        publisher.enqueue(Command::for_actuator("b", "2")).unwrap();

        assert_eq!(rx.recv().await.unwrap().topic, "actuator/a/command");
        assert_eq!(rx.recv().await.unwrap().topic, "actuator/b/command");
    }

    #[test]
    fn should_map_qos_levels() {
        assert_eq!(qos_level(0), QoS::AtMostOnce);
        assert_eq!(qos_level(1), QoS::AtLeastOnce);
        assert_eq!(qos_level(2), QoS::ExactlyOnce);
        assert_eq!(qos_level(7), QoS::AtLeastOnce);
    }
}
