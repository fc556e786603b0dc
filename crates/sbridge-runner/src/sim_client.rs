//! Simulated messaging client.
//!
//! An in-memory stand-in for the real MQTT/shadow client: it tracks
//! connection state, records publishes and subscriptions, and can be armed to
//! fail its next call with any error from the collaborator taxonomy. Used by
//! the bridge server when no real broker is wired up, and by tests to drive
//! every failure class over the wire.

use std::collections::HashMap;

use sbridge_runtime::{
    ConnectError, DisconnectError, MessagingClient, PublishError, SubscribeError, UnsubscribeError,
};
use tracing::debug;

/// One recorded publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    /// Topic the message went to.
    pub topic: String,
    /// Message payload.
    pub payload: String,
    /// QoS level.
    pub qos: u8,
}

/// A failure armed for the next call of one operation.
#[derive(Debug, Clone)]
pub enum ArmedFailure {
    /// Fail the next connect.
    Connect(ConnectError),
    /// Fail the next disconnect.
    Disconnect(DisconnectError),
    /// Fail the next publish.
    Publish(PublishError),
    /// Fail the next subscribe.
    Subscribe(SubscribeError),
    /// Fail the next unsubscribe.
    Unsubscribe(UnsubscribeError),
}

/// The simulated messaging client.
#[derive(Debug, Default)]
pub struct SimClient {
    connected: bool,
    keep_alive_secs: u16,
    publishes: Vec<PublishRecord>,
    subscriptions: HashMap<String, u8>,
    armed: Vec<ArmedFailure>,
}

impl SimClient {
    /// Create a healthy disconnected client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a failure for the next call of the matching operation.
    pub fn arm_failure(&mut self, failure: ArmedFailure) {
        self.armed.push(failure);
    }

    /// Whether connect has succeeded since the last disconnect.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The keep-alive interval from the last successful connect.
    pub fn keep_alive_secs(&self) -> u16 {
        self.keep_alive_secs
    }

    /// Publishes recorded so far, in order.
    pub fn publishes(&self) -> &[PublishRecord] {
        &self.publishes
    }

    /// Current subscriptions (topic → QoS).
    pub fn subscriptions(&self) -> &HashMap<String, u8> {
        &self.subscriptions
    }

    fn take_armed<T>(&mut self, pick: impl Fn(&ArmedFailure) -> Option<T>) -> Option<T> {
        let idx = self.armed.iter().position(|f| pick(f).is_some())?;
        let failure = self.armed.remove(idx);
        pick(&failure)
    }
}

impl MessagingClient for SimClient {
    fn connect(&mut self, keep_alive_secs: u16) -> Result<(), ConnectError> {
        if let Some(e) = self.take_armed(|f| match f {
            ArmedFailure::Connect(e) => Some(e.clone()),
            _ => None,
        }) {
            return Err(e);
        }
        self.connected = true;
        self.keep_alive_secs = keep_alive_secs;
        debug!(keep_alive_secs, "sim client connected");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DisconnectError> {
        if let Some(e) = self.take_armed(|f| match f {
            ArmedFailure::Disconnect(e) => Some(e.clone()),
            _ => None,
        }) {
            return Err(e);
        }
        self.connected = false;
        debug!("sim client disconnected");
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str, qos: u8) -> Result<(), PublishError> {
        if let Some(e) = self.take_armed(|f| match f {
            ArmedFailure::Publish(e) => Some(e.clone()),
            _ => None,
        }) {
            return Err(e);
        }
        if !self.connected {
            return Err(PublishError::Failed("not connected".to_string()));
        }
        self.publishes.push(PublishRecord {
            topic: topic.to_string(),
            payload: payload.to_string(),
            qos,
        });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str, qos: u8) -> Result<(), SubscribeError> {
        if let Some(e) = self.take_armed(|f| match f {
            ArmedFailure::Subscribe(e) => Some(e.clone()),
            _ => None,
        }) {
            return Err(e);
        }
        if !self.connected {
            return Err(SubscribeError::Failed("not connected".to_string()));
        }
        self.subscriptions.insert(topic.to_string(), qos);
        Ok(())
    }

    fn unsubscribe(&mut self, topic: &str) -> Result<(), UnsubscribeError> {
        if let Some(e) = self.take_armed(|f| match f {
            ArmedFailure::Unsubscribe(e) => Some(e.clone()),
            _ => None,
        }) {
            return Err(e);
        }
        if self.subscriptions.remove(topic).is_none() {
            return Err(UnsubscribeError::Failed(format!(
                "not subscribed: {}",
                topic
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_disconnect_cycle() {
        let mut client = SimClient::new();
        assert!(!client.is_connected());
        client.connect(30).unwrap();
        assert!(client.is_connected());
        assert_eq!(client.keep_alive_secs(), 30);
        client.disconnect().unwrap();
        assert!(!client.is_connected());
    }

    #[test]
    fn test_publish_requires_connection() {
        let mut client = SimClient::new();
        assert!(matches!(
            client.publish("t", "m", 0),
            Err(PublishError::Failed(_))
        ));
        client.connect(30).unwrap();
        client.publish("t", "m", 1).unwrap();
        assert_eq!(
            client.publishes(),
            &[PublishRecord {
                topic: "t".to_string(),
                payload: "m".to_string(),
                qos: 1
            }]
        );
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let mut client = SimClient::new();
        client.connect(30).unwrap();
        client.subscribe("home/+", 1).unwrap();
        assert_eq!(client.subscriptions().get("home/+"), Some(&1));
        client.unsubscribe("home/+").unwrap();
        assert!(matches!(
            client.unsubscribe("home/+"),
            Err(UnsubscribeError::Failed(_))
        ));
    }

    #[test]
    fn test_armed_failure_fires_once() {
        let mut client = SimClient::new();
        client.arm_failure(ArmedFailure::Connect(ConnectError::TlsHandshake));
        assert_eq!(client.connect(30), Err(ConnectError::TlsHandshake));
        // Second attempt is healthy again
        client.connect(30).unwrap();
        assert!(client.is_connected());
    }

    #[test]
    fn test_armed_failure_matches_operation() {
        let mut client = SimClient::new();
        client.arm_failure(ArmedFailure::Publish(PublishError::QueueFull(
            "queue full".to_string(),
        )));
        // Connect is unaffected by the armed publish failure
        client.connect(30).unwrap();
        assert!(matches!(
            client.publish("t", "m", 0),
            Err(PublishError::QueueFull(_))
        ));
    }
}
