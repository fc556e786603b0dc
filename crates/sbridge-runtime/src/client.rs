//! Messaging client collaborator interface.
//!
//! The bridge drives an underlying MQTT-style client through this trait.
//! Each operation carries its own error taxonomy; the error variants map
//! one-to-one onto the wire failure classes the handlers emit, so the
//! `Display` text of a variant is the detail the peer sees. Calls are
//! blocking; timeout enforcement is the client's responsibility and surfaces
//! here as the `Timeout` variants.

use thiserror::Error;

/// Failures of the connect operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The mutual-auth TLS handshake failed.
    #[error("Mutual Auth issues.")]
    TlsHandshake,

    /// Certificate/private-key files could not be found.
    #[error("Credentials not found.")]
    CredentialsNotFound,

    /// The signing key or key ID is not present in the environment.
    #[error("Key/KeyID not in $ENV.")]
    IdentityNotInEnv,

    /// Any other connect failure.
    #[error("{0}")]
    Other(String),
}

/// Failures of the disconnect operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisconnectError {
    /// The disconnect was rejected or the link tore down uncleanly.
    #[error("{0}")]
    Failed(String),

    /// The disconnect did not complete within the client's timeout.
    #[error("{0}")]
    Timeout(String),

    /// Any other disconnect failure.
    #[error("{0}")]
    Other(String),
}

/// Failures of the publish operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The publish was rejected by the client or broker.
    #[error("{0}")]
    Failed(String),

    /// The publish did not complete within the client's timeout.
    #[error("{0}")]
    Timeout(String),

    /// The client's offline outbound queue is full.
    #[error("{0}")]
    QueueFull(String),

    /// The client's offline outbound queue is disabled.
    #[error("{0}")]
    QueueDisabled(String),

    /// Any other publish failure.
    #[error("{0}")]
    Other(String),
}

/// Failures of the subscribe operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// The subscribe was rejected by the client or broker.
    #[error("{0}")]
    Failed(String),

    /// The subscribe did not complete within the client's timeout.
    #[error("{0}")]
    Timeout(String),

    /// Any other subscribe failure.
    #[error("{0}")]
    Other(String),
}

/// Failures of the unsubscribe operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnsubscribeError {
    /// The unsubscribe was rejected by the client or broker.
    #[error("{0}")]
    Failed(String),

    /// The unsubscribe did not complete within the client's timeout.
    #[error("{0}")]
    Timeout(String),

    /// Any other unsubscribe failure.
    #[error("{0}")]
    Other(String),
}

/// The messaging collaborator the verb handlers drive.
///
/// Implementations wrap a real MQTT/shadow client (or a simulated one). All
/// calls are synchronous and must return within the client's own timeouts.
pub trait MessagingClient {
    /// Open the connection with the given keep-alive interval in seconds.
    fn connect(&mut self, keep_alive_secs: u16) -> Result<(), ConnectError>;

    /// Close the connection.
    fn disconnect(&mut self) -> Result<(), DisconnectError>;

    /// Publish a payload to a topic at the given QoS level.
    fn publish(&mut self, topic: &str, payload: &str, qos: u8) -> Result<(), PublishError>;

    /// Subscribe to a topic at the given QoS level.
    fn subscribe(&mut self, topic: &str, qos: u8) -> Result<(), SubscribeError>;

    /// Unsubscribe from a topic.
    fn unsubscribe(&mut self, topic: &str) -> Result<(), UnsubscribeError>;
}
