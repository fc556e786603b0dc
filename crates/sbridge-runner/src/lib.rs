//! Serial Bridge Server
//!
//! Exposes the command runtime over a TCP port that stands in for the serial
//! link: the peer (or a development harness) connects, sends one command line
//! at a time, and receives the corresponding status or chunked JSON response.
//! Strictly one peer session and one in-flight command at a time.
//!
//! The messaging side is served by [`SimClient`], an in-memory stand-in for
//! the real MQTT/shadow client, so the wire behavior can be exercised without
//! credentials or a broker.

pub mod config;
pub mod server;
pub mod sim_client;

pub use config::BridgeConfig;
pub use server::{BridgeServer, SessionWriter};
pub use sim_client::SimClient;
