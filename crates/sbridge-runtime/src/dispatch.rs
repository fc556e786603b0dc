//! Command dispatcher and per-verb handlers.
//!
//! The dispatcher maps a tokenized command line onto its verb handler, runs
//! the shared precondition check (target collaborator wired up, parameter
//! count as declared), executes the handler, and converts the outcome into
//! exactly one status write. The two precondition failures are deliberately
//! indistinguishable on the wire: the peer sees `"<CODE>1F: No setup."`
//! whether the collaborator is missing or the argument count is wrong.
//!
//! Commands run strictly one at a time to completion, including the transport
//! write; the protocol has no request identifiers, so overlapping commands
//! would make responses unattributable.

use std::io;

use sbridge_protocol::{
    format_into_chunks, FailureClass, ProtocolError, ProtocolResult, RawCommand, Status,
};
use tracing::{debug, trace, warn};

use crate::client::{
    ConnectError, DisconnectError, MessagingClient, PublishError, SubscribeError, UnsubscribeError,
};
use crate::shadow::{ShadowStore, UpdateError};

/// Detail for a GET/update against an identifier with no cached document.
pub const NO_SUCH_IDENTIFIER_DETAIL: &str = "No such JSON identifier.";

/// Detail for a GET against a key absent from the cached document.
pub const NO_SUCH_KEY_DETAIL: &str = "No such key.";

// ============================================================================
// Verbs
// ============================================================================

/// Which collaborator a verb drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Messaging,
    Shadow,
}

/// The command verbs the dispatcher registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// `c <keepAliveInterval>`: open the messaging connection.
    Connect,
    /// `d`: close the messaging connection.
    Disconnect,
    /// `p <topic> <payload> <qos> <retain>`: publish a message.
    Publish,
    /// `s <topic> <qos>`: subscribe to a topic.
    Subscribe,
    /// `u <topic>`: unsubscribe from a topic.
    Unsubscribe,
    /// `j <identifier> <key> <isFirstLoad>`: read a shadow document value.
    ShadowGet,
    /// `k <identifier> <key> <value>`: write a shadow document value.
    ShadowUpdate,
}

impl Verb {
    /// All registered verbs.
    pub const ALL: [Verb; 7] = [
        Verb::Connect,
        Verb::Disconnect,
        Verb::Publish,
        Verb::Subscribe,
        Verb::Unsubscribe,
        Verb::ShadowGet,
        Verb::ShadowUpdate,
    ];

    /// The one-character wire code for this verb.
    pub fn code(&self) -> char {
        match self {
            Verb::Connect => 'c',
            Verb::Disconnect => 'd',
            Verb::Publish => 'p',
            Verb::Subscribe => 's',
            Verb::Unsubscribe => 'u',
            Verb::ShadowGet => 'j',
            Verb::ShadowUpdate => 'k',
        }
    }

    /// Resolve a wire code to its verb.
    pub fn from_code(code: char) -> Option<Verb> {
        match code {
            'c' => Some(Verb::Connect),
            'd' => Some(Verb::Disconnect),
            'p' => Some(Verb::Publish),
            's' => Some(Verb::Subscribe),
            'u' => Some(Verb::Unsubscribe),
            'j' => Some(Verb::ShadowGet),
            'k' => Some(Verb::ShadowUpdate),
            _ => None,
        }
    }

    /// The declared parameter count for this verb.
    ///
    /// The received count must equal this before any parameter is decoded or
    /// any collaborator call is attempted.
    pub fn expected_params(&self) -> usize {
        match self {
            Verb::Connect => 1,
            Verb::Disconnect => 0,
            Verb::Publish => 4,
            Verb::Subscribe => 2,
            Verb::Unsubscribe => 1,
            Verb::ShadowGet => 3,
            Verb::ShadowUpdate => 3,
        }
    }

    fn target(&self) -> Target {
        match self {
            Verb::Connect
            | Verb::Disconnect
            | Verb::Publish
            | Verb::Subscribe
            | Verb::Unsubscribe => Target::Messaging,
            Verb::ShadowGet | Verb::ShadowUpdate => Target::Shadow,
        }
    }
}

// ============================================================================
// Transport writer
// ============================================================================

/// The serial transport as seen from the dispatch core.
///
/// Status lines and chunked JSON buffers go out through separate calls so the
/// transport can frame them differently (the chunk buffer must reach the peer
/// verbatim for its chunk-size windows to stay intact).
pub trait TransportWriter {
    /// The configured chunk size for fragmented JSON responses.
    fn chunk_size(&self) -> usize;

    /// Write one status line to the peer.
    fn write_status(&mut self, line: &str) -> io::Result<()>;

    /// Write a chunked JSON buffer (or a JSON-flow status line) to the peer.
    ///
    /// The payload is raw bytes: chunk windows are sized in bytes and may
    /// split a multi-byte character, so the buffer as a whole need not be
    /// valid UTF-8 at chunk boundaries.
    fn write_json(&mut self, payload: &[u8]) -> io::Result<()>;
}

/// An in-memory transport writer.
///
/// Records everything the dispatcher emits; used in tests and by host-side
/// embeddings that drain responses themselves.
#[derive(Debug)]
pub struct MemoryWriter {
    chunk_size: usize,
    /// Status lines in emission order.
    pub statuses: Vec<String>,
    /// JSON-flow writes in emission order.
    pub json_writes: Vec<Vec<u8>>,
}

impl MemoryWriter {
    /// Create a writer with the given chunk size.
    pub fn new(chunk_size: usize) -> Self {
        MemoryWriter {
            chunk_size,
            statuses: Vec::new(),
            json_writes: Vec::new(),
        }
    }

    /// Total number of writes of either kind.
    pub fn write_count(&self) -> usize {
        self.statuses.len() + self.json_writes.len()
    }
}

impl TransportWriter for MemoryWriter {
    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn write_status(&mut self, line: &str) -> io::Result<()> {
        self.statuses.push(line.to_string());
        Ok(())
    }

    fn write_json(&mut self, payload: &[u8]) -> io::Result<()> {
        self.json_writes.push(payload.to_vec());
        Ok(())
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// The command dispatcher.
///
/// Owns the transport writer for the session (a missing transport is
/// unrepresentable by construction) and holds the messaging and shadow
/// collaborators as options; an unset option is the "not wired up" state
/// that collapses to the shared `1F` status.
pub struct Dispatcher<W: TransportWriter> {
    writer: W,
    client: Option<Box<dyn MessagingClient + Send>>,
    shadow: Option<Box<dyn ShadowStore + Send>>,
}

impl<W: TransportWriter> Dispatcher<W> {
    /// Create a dispatcher with no collaborators wired up.
    pub fn new(writer: W) -> Self {
        Dispatcher {
            writer,
            client: None,
            shadow: None,
        }
    }

    /// Wire up the messaging client collaborator.
    pub fn set_client(&mut self, client: Box<dyn MessagingClient + Send>) {
        self.client = Some(client);
    }

    /// Wire up the shadow store collaborator.
    pub fn set_shadow(&mut self, shadow: Box<dyn ShadowStore + Send>) {
        self.shadow = Some(shadow);
    }

    /// Access the transport writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Mutable access to the transport writer (for transports that queue
    /// their writes and drain them after each dispatch).
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the dispatcher, returning the transport writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Parse and dispatch one command line.
    ///
    /// An empty line or unregistered command code returns an error and writes
    /// nothing; what the transport layer does with an unknown command is its
    /// own convention. Everything else produces exactly one status write
    /// (zero for GET continuations).
    pub fn dispatch_line(&mut self, line: &str) -> ProtocolResult<()> {
        let command = RawCommand::parse(line)?;
        let verb = Verb::from_code(command.code)
            .ok_or(ProtocolError::UnknownCommand(command.code))?;
        trace!(code = %command.code, params = command.params.len(), "dispatching");
        self.dispatch(verb, &command.params);
        Ok(())
    }

    /// Dispatch a resolved verb with its raw parameters.
    pub fn dispatch(&mut self, verb: Verb, params: &[String]) {
        let code = verb.code();
        match verb {
            Verb::Connect => {
                let status = match checked_target(&mut self.client, verb, params) {
                    Some(client) => run_connect(client, params),
                    None => Status::no_setup(code),
                };
                emit_status(&mut self.writer, &status);
            }
            Verb::Disconnect => {
                let status = match checked_target(&mut self.client, verb, params) {
                    Some(client) => run_disconnect(client),
                    None => Status::no_setup(code),
                };
                emit_status(&mut self.writer, &status);
            }
            Verb::Publish => {
                let status = match checked_target(&mut self.client, verb, params) {
                    Some(client) => run_publish(client, params),
                    None => Status::no_setup(code),
                };
                emit_status(&mut self.writer, &status);
            }
            Verb::Subscribe => {
                let status = match checked_target(&mut self.client, verb, params) {
                    Some(client) => run_subscribe(client, params),
                    None => Status::no_setup(code),
                };
                emit_status(&mut self.writer, &status);
            }
            Verb::Unsubscribe => {
                let status = match checked_target(&mut self.client, verb, params) {
                    Some(client) => run_unsubscribe(client, params),
                    None => Status::no_setup(code),
                };
                emit_status(&mut self.writer, &status);
            }
            Verb::ShadowGet => self.dispatch_shadow_get(params),
            Verb::ShadowUpdate => {
                let status = match checked_target(&mut self.shadow, verb, params) {
                    Some(shadow) => run_shadow_update(shadow, params),
                    None => Status::no_setup(code),
                };
                emit_status(&mut self.writer, &status);
            }
        }
    }

    /// The JSON GET flow. All of its output, status lines included, goes out
    /// through the JSON write path; continuation sub-commands produce no
    /// output at all.
    fn dispatch_shadow_get(&mut self, params: &[String]) {
        let Some(shadow) = checked_target(&mut self.shadow, Verb::ShadowGet, params) else {
            // Setup failure is reported regardless of the first-load flag.
            emit_json(&mut self.writer, Status::no_setup('j').render().as_bytes());
            return;
        };

        if params[2] != "1" {
            // Continuation marker: the peer is draining chunks emitted by the
            // first-load call. No lookup, no write.
            trace!(identifier = %params[0], "shadow GET continuation");
            return;
        }

        let identifier = &params[0];
        let key = &params[1];
        let value = match shadow.document_by_identifier(identifier) {
            None => {
                emit_json(
                    &mut self.writer,
                    Status::failure('j', FailureClass::Class2, NO_SUCH_IDENTIFIER_DETAIL)
                        .render()
                        .as_bytes(),
                );
                return;
            }
            Some(document) => match shadow.value_by_key(&document, key) {
                None => {
                    emit_json(
                        &mut self.writer,
                        Status::failure('j', FailureClass::Class3, NO_SUCH_KEY_DETAIL)
                            .render()
                            .as_bytes(),
                    );
                    return;
                }
                Some(value) => value,
            },
        };

        match format_into_chunks(&value, self.writer.chunk_size()) {
            Ok(buffer) => {
                debug!(identifier = %identifier, key = %key, bytes = buffer.len(), "shadow GET");
                emit_json(&mut self.writer, &buffer);
            }
            Err(e) => {
                // A chunk size that cannot carry payload is a configuration
                // error; the peer still gets a classified status.
                warn!(error = %e, "chunking failed");
                emit_json(&mut self.writer, Status::unknown_error('j').render().as_bytes());
            }
        }
    }
}

/// The shared precondition check, factored once for every verb: the verb's
/// target collaborator must be wired up and the received parameter count must
/// equal the declared count. Returns the collaborator on success.
fn checked_target<'a, T: ?Sized>(
    target: &'a mut Option<Box<T>>,
    verb: Verb,
    params: &[String],
) -> Option<&'a mut T> {
    match target {
        Some(t) if params.len() == verb.expected_params() => Some(t.as_mut()),
        _ => None,
    }
}

fn emit_status<W: TransportWriter>(writer: &mut W, status: &Status) {
    let line = status.render();
    trace!(line = %line, "status");
    if let Err(e) = writer.write_status(&line) {
        warn!(error = %e, "status write failed");
    }
}

fn emit_json<W: TransportWriter>(writer: &mut W, payload: &[u8]) {
    if let Err(e) = writer.write_json(payload) {
        warn!(error = %e, "json write failed");
    }
}

// ============================================================================
// Verb handlers
// ============================================================================
//
// Each handler attempts exactly one collaborator call and maps each distinct
// failure onto its stable class, catch-all last. Failure classes are fixed
// wire constants; see the protocol crate's status model.

fn run_connect(client: &mut dyn MessagingClient, params: &[String]) -> Status {
    let keep_alive: u16 = match params[0].parse() {
        Ok(v) => v,
        Err(_) => {
            return Status::failure(
                'c',
                FailureClass::Class2,
                format!("invalid keepAliveInterval {:?}", params[0]),
            )
        }
    };
    match client.connect(keep_alive) {
        Ok(()) => Status::success('c'),
        Err(e @ ConnectError::TlsHandshake) => Status::failure('c', FailureClass::Class3, e.to_string()),
        Err(e @ ConnectError::CredentialsNotFound) => {
            Status::failure('c', FailureClass::Class6, e.to_string())
        }
        Err(e @ ConnectError::IdentityNotInEnv) => {
            Status::failure('c', FailureClass::Class7, e.to_string())
        }
        Err(ConnectError::Other(_)) => Status::unknown_error('c'),
    }
}

fn run_disconnect(client: &mut dyn MessagingClient) -> Status {
    match client.disconnect() {
        Ok(()) => Status::success('d'),
        Err(DisconnectError::Failed(msg)) => Status::failure('d', FailureClass::Class2, msg),
        Err(DisconnectError::Timeout(msg)) => Status::failure('d', FailureClass::Class3, msg),
        Err(DisconnectError::Other(_)) => Status::unknown_error('d'),
    }
}

fn run_publish(client: &mut dyn MessagingClient, params: &[String]) -> Status {
    let qos: u8 = match params[2].parse() {
        Ok(v) => v,
        Err(_) => {
            return Status::failure(
                'p',
                FailureClass::Class2,
                format!("invalid qos {:?}", params[2]),
            )
        }
    };
    // params[3] is the retain flag: accepted for protocol symmetry, never
    // forwarded to the client.
    match client.publish(&params[0], &params[1], qos) {
        Ok(()) => Status::success('p'),
        Err(PublishError::Failed(msg)) => Status::failure('p', FailureClass::Class3, msg),
        Err(PublishError::Timeout(msg)) => Status::failure('p', FailureClass::Class4, msg),
        Err(PublishError::QueueFull(msg)) => Status::failure('p', FailureClass::Class5, msg),
        Err(PublishError::QueueDisabled(msg)) => Status::failure('p', FailureClass::Class6, msg),
        Err(PublishError::Other(_)) => Status::unknown_error('p'),
    }
}

fn run_subscribe(client: &mut dyn MessagingClient, params: &[String]) -> Status {
    let qos: u8 = match params[1].parse() {
        Ok(v) => v,
        Err(_) => {
            return Status::failure(
                's',
                FailureClass::Class2,
                format!("invalid qos {:?}", params[1]),
            )
        }
    };
    match client.subscribe(&params[0], qos) {
        Ok(()) => Status::success('s'),
        Err(SubscribeError::Failed(msg)) => Status::failure('s', FailureClass::Class3, msg),
        Err(SubscribeError::Timeout(msg)) => Status::failure('s', FailureClass::Class4, msg),
        Err(SubscribeError::Other(_)) => Status::unknown_error('s'),
    }
}

fn run_unsubscribe(client: &mut dyn MessagingClient, params: &[String]) -> Status {
    match client.unsubscribe(&params[0]) {
        Ok(()) => Status::success('u'),
        Err(UnsubscribeError::Failed(msg)) => Status::failure('u', FailureClass::Class2, msg),
        Err(UnsubscribeError::Timeout(msg)) => Status::failure('u', FailureClass::Class3, msg),
        Err(UnsubscribeError::Other(_)) => Status::unknown_error('u'),
    }
}

fn run_shadow_update(shadow: &mut dyn ShadowStore, params: &[String]) -> Status {
    match shadow.update_value(&params[0], &params[1], &params[2]) {
        Ok(()) => Status::success('k'),
        Err(UpdateError::NoSuchIdentifier) => {
            Status::failure('k', FailureClass::Class2, NO_SUCH_IDENTIFIER_DETAIL)
        }
        Err(UpdateError::NotAnObject) | Err(UpdateError::Other(_)) => Status::unknown_error('k'),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::JsonDocumentCache;
    use sbridge_protocol::reassemble_chunks;
    use serde_json::json;

    /// A scripted messaging client: records calls, fails on demand.
    #[derive(Default)]
    struct ScriptedClient {
        connect_result: Option<ConnectError>,
        disconnect_result: Option<DisconnectError>,
        publish_result: Option<PublishError>,
        subscribe_result: Option<SubscribeError>,
        unsubscribe_result: Option<UnsubscribeError>,
        publishes: std::sync::Arc<std::sync::Mutex<Vec<(String, String, u8)>>>,
    }

    impl MessagingClient for ScriptedClient {
        fn connect(&mut self, _keep_alive_secs: u16) -> Result<(), ConnectError> {
            self.connect_result.clone().map_or(Ok(()), Err)
        }
        fn disconnect(&mut self) -> Result<(), DisconnectError> {
            self.disconnect_result.clone().map_or(Ok(()), Err)
        }
        fn publish(&mut self, topic: &str, payload: &str, qos: u8) -> Result<(), PublishError> {
            self.publishes
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_string(), qos));
            self.publish_result.clone().map_or(Ok(()), Err)
        }
        fn subscribe(&mut self, _topic: &str, _qos: u8) -> Result<(), SubscribeError> {
            self.subscribe_result.clone().map_or(Ok(()), Err)
        }
        fn unsubscribe(&mut self, _topic: &str) -> Result<(), UnsubscribeError> {
            self.unsubscribe_result.clone().map_or(Ok(()), Err)
        }
    }

    fn dispatcher_with(client: ScriptedClient) -> Dispatcher<MemoryWriter> {
        let mut d = Dispatcher::new(MemoryWriter::new(32));
        d.set_client(Box::new(client));
        d
    }

    fn shadow_dispatcher() -> Dispatcher<MemoryWriter> {
        let mut cache = JsonDocumentCache::new();
        cache.insert("thing1", json!({"state": "on", "temp": 72.5}));
        let mut d = Dispatcher::new(MemoryWriter::new(8));
        d.set_shadow(Box::new(cache));
        d
    }

    #[test]
    fn test_connect_success() {
        let mut d = dispatcher_with(ScriptedClient::default());
        d.dispatch_line("c 30").unwrap();
        assert_eq!(d.writer().statuses, vec!["C T"]);
        assert_eq!(d.writer().write_count(), 1);
    }

    #[test]
    fn test_connect_decode_error() {
        let mut d = dispatcher_with(ScriptedClient::default());
        d.dispatch_line("c abc").unwrap();
        assert!(d.writer().statuses[0].starts_with("C2F: "));
    }

    #[test]
    fn test_connect_failure_classes() {
        let cases = [
            (ConnectError::TlsHandshake, "C3F: Mutual Auth issues."),
            (ConnectError::CredentialsNotFound, "C6F: Credentials not found."),
            (ConnectError::IdentityNotInEnv, "C7F: Key/KeyID not in $ENV."),
            (ConnectError::Other("boom".into()), "CFF: Unknown error."),
        ];
        for (err, expected) in cases {
            let mut d = dispatcher_with(ScriptedClient {
                connect_result: Some(err),
                ..Default::default()
            });
            d.dispatch_line("c 30").unwrap();
            assert_eq!(d.writer().statuses, vec![expected]);
        }
    }

    #[test]
    fn test_no_setup_when_client_missing() {
        let mut d: Dispatcher<MemoryWriter> = Dispatcher::new(MemoryWriter::new(32));
        d.dispatch_line("c 5").unwrap();
        assert_eq!(d.writer().statuses, vec!["C1F: No setup."]);
    }

    #[test]
    fn test_no_setup_on_arity_mismatch() {
        // Wrong argument count is indistinguishable from a missing
        // collaborator on the wire.
        let mut d = dispatcher_with(ScriptedClient::default());
        d.dispatch_line("c").unwrap();
        d.dispatch_line("c 30 extra").unwrap();
        d.dispatch_line("d 1").unwrap();
        d.dispatch_line("p topic payload 1").unwrap();
        assert_eq!(
            d.writer().statuses,
            vec![
                "C1F: No setup.",
                "C1F: No setup.",
                "D1F: No setup.",
                "P1F: No setup."
            ]
        );
    }

    #[test]
    fn test_disconnect_success_and_failures() {
        let mut d = dispatcher_with(ScriptedClient::default());
        d.dispatch_line("d").unwrap();
        assert_eq!(d.writer().statuses, vec!["D T"]);

        let mut d = dispatcher_with(ScriptedClient {
            disconnect_result: Some(DisconnectError::Timeout("disconnect timed out".into())),
            ..Default::default()
        });
        d.dispatch_line("d").unwrap();
        assert_eq!(d.writer().statuses, vec!["D3F: disconnect timed out"]);
    }

    #[test]
    fn test_publish_success_retain_not_forwarded() {
        let client = ScriptedClient::default();
        let publishes = client.publishes.clone();
        let mut d = dispatcher_with(client);
        d.dispatch_line("p home/temp 72.5 1 0").unwrap();
        assert_eq!(d.writer().statuses, vec!["P T"]);
        // Only topic, payload, qos reach the collaborator; retain is dropped.
        assert_eq!(
            publishes.lock().unwrap().as_slice(),
            &[("home/temp".to_string(), "72.5".to_string(), 1u8)]
        );
    }

    #[test]
    fn test_publish_failure_classes() {
        let cases = [
            (PublishError::Failed("publish refused".into()), "P3F: publish refused"),
            (PublishError::Timeout("publish timed out".into()), "P4F: publish timed out"),
            (PublishError::QueueFull("queue full".into()), "P5F: queue full"),
            (PublishError::QueueDisabled("queue disabled".into()), "P6F: queue disabled"),
            (PublishError::Other("boom".into()), "PFF: Unknown error."),
        ];
        for (err, expected) in cases {
            let mut d = dispatcher_with(ScriptedClient {
                publish_result: Some(err),
                ..Default::default()
            });
            d.dispatch_line("p t m 0 0").unwrap();
            assert_eq!(d.writer().statuses, vec![expected]);
        }
    }

    #[test]
    fn test_publish_empty_payload_param() {
        // Consecutive delimiters carry an empty parameter; the count still
        // matches, so the message publishes with an empty payload instead of
        // collapsing into an arity failure.
        let client = ScriptedClient::default();
        let publishes = client.publishes.clone();
        let mut d = dispatcher_with(client);
        d.dispatch_line("p home/temp  1 0").unwrap();
        assert_eq!(d.writer().statuses, vec!["P T"]);
        assert_eq!(
            publishes.lock().unwrap().as_slice(),
            &[("home/temp".to_string(), String::new(), 1u8)]
        );
    }

    #[test]
    fn test_publish_qos_decode_error() {
        let mut d = dispatcher_with(ScriptedClient::default());
        d.dispatch_line("p t m x 0").unwrap();
        assert!(d.writer().statuses[0].starts_with("P2F: "));
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut d = dispatcher_with(ScriptedClient::default());
        d.dispatch_line("s home/+ 1").unwrap();
        d.dispatch_line("u home/+").unwrap();
        assert_eq!(d.writer().statuses, vec!["S T", "U T"]);

        let mut d = dispatcher_with(ScriptedClient {
            subscribe_result: Some(SubscribeError::Timeout("subscribe timed out".into())),
            unsubscribe_result: Some(UnsubscribeError::Failed("not subscribed".into())),
            ..Default::default()
        });
        d.dispatch_line("s a 0").unwrap();
        d.dispatch_line("u a").unwrap();
        assert_eq!(
            d.writer().statuses,
            vec!["S4F: subscribe timed out", "U2F: not subscribed"]
        );
    }

    #[test]
    fn test_shadow_get_first_load_chunked() {
        let mut d = shadow_dispatcher();
        d.dispatch_line("j thing1 temp 1").unwrap();
        let writer = d.writer();
        assert!(writer.statuses.is_empty());
        assert_eq!(writer.json_writes.len(), 1);
        assert_eq!(reassemble_chunks(&writer.json_writes[0], 8).unwrap(), "72.5");
    }

    #[test]
    fn test_shadow_get_continuation_is_silent() {
        let mut d = shadow_dispatcher();
        // Even an invalid identifier produces no lookup and no output.
        d.dispatch_line("j no-such-thing state 0").unwrap();
        assert_eq!(d.writer().write_count(), 0);
    }

    #[test]
    fn test_shadow_get_unknown_identifier() {
        let mut d = shadow_dispatcher();
        d.dispatch_line("j nope state 1").unwrap();
        assert_eq!(
            d.writer().json_writes,
            vec![b"J2F: No such JSON identifier.".to_vec()]
        );
    }

    #[test]
    fn test_shadow_get_unknown_key() {
        let mut d = shadow_dispatcher();
        d.dispatch_line("j thing1 nope 1").unwrap();
        assert_eq!(d.writer().json_writes, vec![b"J3F: No such key.".to_vec()]);
    }

    #[test]
    fn test_shadow_get_no_setup_regardless_of_first_load() {
        let mut d: Dispatcher<MemoryWriter> = Dispatcher::new(MemoryWriter::new(8));
        d.dispatch_line("j thing1 state 0").unwrap();
        d.dispatch_line("j thing1 state 1").unwrap();
        assert_eq!(
            d.writer().json_writes,
            vec![b"J1F: No setup.".to_vec(), b"J1F: No setup.".to_vec()]
        );
    }

    #[test]
    fn test_shadow_update() {
        let mut d = shadow_dispatcher();
        d.dispatch_line("k thing1 state off").unwrap();
        assert_eq!(d.writer().statuses, vec!["K T"]);

        let mut d2 = shadow_dispatcher();
        d2.dispatch_line("k nope state off").unwrap();
        assert_eq!(d2.writer().statuses, vec!["K2F: No such JSON identifier."]);
    }

    #[test]
    fn test_update_then_get_round_trip() {
        let mut d = shadow_dispatcher();
        d.dispatch_line("k thing1 state off").unwrap();
        d.dispatch_line("j thing1 state 1").unwrap();
        let writer = d.writer();
        assert_eq!(reassemble_chunks(&writer.json_writes[0], 8).unwrap(), "off");
    }

    #[test]
    fn test_unknown_command_writes_nothing() {
        let mut d = dispatcher_with(ScriptedClient::default());
        assert_eq!(
            d.dispatch_line("x 1 2"),
            Err(ProtocolError::UnknownCommand('x'))
        );
        assert_eq!(d.dispatch_line(""), Err(ProtocolError::EmptyLine));
        assert_eq!(d.writer().write_count(), 0);
    }

    #[test]
    fn test_verb_codes_round_trip() {
        for verb in Verb::ALL {
            assert_eq!(Verb::from_code(verb.code()), Some(verb));
        }
        assert_eq!(Verb::from_code('x'), None);
    }
}
