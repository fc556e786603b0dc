//! Serial Bridge Command Runtime
//!
//! This crate is the command-dispatch core of the bridge: it takes tokenized
//! command lines from the serial transport, validates each against its verb's
//! arity/precondition contract, drives the messaging client or shadow store
//! collaborator, and converts every outcome into exactly one status write.
//!
//! The collaborators (MQTT client, shadow document source, serial transport)
//! live outside this crate and are reached through the [`MessagingClient`],
//! [`ShadowStore`] and [`TransportWriter`] traits. Their lifetimes exceed any
//! single command; the dispatcher holds them for the whole session.
//!
//! # Example
//!
//! ```rust,ignore
//! use sbridge_runtime::{Dispatcher, MemoryWriter};
//!
//! let mut dispatcher = Dispatcher::new(MemoryWriter::new(128));
//! dispatcher.set_client(Box::new(my_client));
//! dispatcher.dispatch_line("c 30")?; // writes "C T" on success
//! ```

mod client;
mod dispatch;
mod shadow;

pub use client::*;
pub use dispatch::*;
pub use shadow::*;
