//! Serial Bridge Wire Protocol
//!
//! This crate provides the wire-level pieces of the serial-to-device-shadow
//! bridge: the line codec used on the serial transport, the command grammar,
//! the status-code model, and the chunking codec used to fragment large JSON
//! shadow values.
//!
//! # Protocol Overview
//!
//! The protocol is a simple line-based text interface:
//!
//! - **Commands** (peer → bridge): a single-character command code followed by
//!   space-delimited parameters, terminated with `\n` (or `\r\n`)
//! - **Status** (bridge → peer): `"<VERB> T"` on success, or
//!   `"<VERB><CLASS>: <detail>"` on failure, where CLASS is a two-character
//!   tag ending in `F` (`1F`..`7F`, `FF`)
//! - **JSON responses**: large shadow values are split into back-to-back
//!   chunks, each prefixed with `"J "`, sized to the transport's chunk size
//!
//! # Example
//!
//! ```rust,ignore
//! use sbridge_protocol::{RawCommand, Status, LineCodec};
//!
//! // Tokenize an incoming command line
//! let cmd = RawCommand::parse("p home/temp 72.5 1 0")?;
//!
//! // Parse a status line on the peer side
//! let status = Status::parse("P T")?;
//! assert!(status.is_success());
//! ```

mod chunk;
mod codec;
mod error;
mod grammar;
mod status;

pub use chunk::*;
pub use codec::*;
pub use error::*;
pub use grammar::*;
pub use status::*;
