/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Message log sinks.
//!
//! A [`MessageLog`] receives every message a session sends or receives.
//! [`PrettyLog`] renders each message against the dictionary and forwards
//! the report to a parent sink, so it can be stacked on top of
//! [`TracingLog`] or any other implementation.

use crate::config::RenderConfig;
use crate::renderer::Renderer;
use fixscope_dictionary::Dictionary;
use std::sync::Arc;
use tracing::{info, warn};

/// Session name used for logs not tied to a session.
pub const GLOBAL_LOG: &str = "GLOBAL";

/// Sink for session traffic and events.
pub trait MessageLog: Send + Sync {
    /// Called with every message received.
    fn on_incoming(&self, message: &[u8]);

    /// Called with every message sent.
    fn on_outgoing(&self, message: &[u8]);

    /// Called with session events.
    fn on_event(&self, text: &str);
}

/// Creates message logs.
pub trait LogFactory {
    /// Log type produced.
    type Log: MessageLog;

    /// Creates the log for events not tied to a session.
    fn create(&self) -> Self::Log;

    /// Creates the log for one session.
    fn create_session_log(&self, session: &str) -> Self::Log;
}

/// Writes traffic to `tracing` at info level.
#[derive(Debug, Clone)]
pub struct TracingLog {
    session: String,
}

impl TracingLog {
    /// Creates a log for the named session.
    #[must_use]
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }

    /// Returns the session name.
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }
}

impl MessageLog for TracingLog {
    fn on_incoming(&self, message: &[u8]) {
        info!("[{}] <- {}", self.session, String::from_utf8_lossy(message));
    }

    fn on_outgoing(&self, message: &[u8]) {
        info!("[{}] -> {}", self.session, String::from_utf8_lossy(message));
    }

    fn on_event(&self, text: &str) {
        info!("[{}] {}", self.session, text);
    }
}

/// Factory for [`TracingLog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogFactory;

impl LogFactory for TracingLogFactory {
    type Log = TracingLog;

    fn create(&self) -> TracingLog {
        TracingLog::new(GLOBAL_LOG)
    }

    fn create_session_log(&self, session: &str) -> TracingLog {
        TracingLog::new(session)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl MessageLog for NullLog {
    fn on_incoming(&self, _message: &[u8]) {}

    fn on_outgoing(&self, _message: &[u8]) {}

    fn on_event(&self, _text: &str) {}
}

impl LogFactory for NullLog {
    type Log = NullLog;

    fn create(&self) -> NullLog {
        NullLog
    }

    fn create_session_log(&self, _session: &str) -> NullLog {
        NullLog
    }
}

/// Renders each message before passing it to a parent log.
#[derive(Debug, Clone)]
pub struct PrettyLog<L> {
    parent: L,
    session: String,
    dictionary: Arc<Dictionary>,
    config: RenderConfig,
}

impl<L: MessageLog> PrettyLog<L> {
    /// Creates a pretty log on top of `parent`.
    #[must_use]
    pub fn new(
        parent: L,
        session: impl Into<String>,
        dictionary: Arc<Dictionary>,
        config: RenderConfig,
    ) -> Self {
        Self {
            parent,
            session: session.into(),
            dictionary,
            config,
        }
    }

    /// Returns the session name.
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Returns the parent log.
    #[must_use]
    pub fn parent(&self) -> &L {
        &self.parent
    }

    /// Renders one message as a report.
    #[must_use]
    pub fn beautify(&self, message: &[u8]) -> String {
        let renderer = Renderer::new(&self.dictionary, self.config.clone());
        renderer.try_render(message).unwrap_or_else(|e| {
            warn!("[{}] cannot render message: {}", self.session, e);
            renderer.error_report(&e, message)
        })
    }
}

impl<L: MessageLog> MessageLog for PrettyLog<L> {
    fn on_incoming(&self, message: &[u8]) {
        self.parent.on_incoming(self.beautify(message).as_bytes());
    }

    fn on_outgoing(&self, message: &[u8]) {
        self.parent.on_outgoing(self.beautify(message).as_bytes());
    }

    fn on_event(&self, text: &str) {
        self.parent.on_event(text);
    }
}

/// Creates [`PrettyLog`]s that share one dictionary.
#[derive(Debug, Clone)]
pub struct PrettyLogFactory<F> {
    parent: F,
    dictionary: Arc<Dictionary>,
    config: RenderConfig,
}

impl<F: LogFactory> PrettyLogFactory<F> {
    /// Creates a factory wrapping the logs of `parent`.
    #[must_use]
    pub fn new(parent: F, dictionary: Arc<Dictionary>, config: RenderConfig) -> Self {
        Self {
            parent,
            dictionary,
            config,
        }
    }
}

impl<F: LogFactory> LogFactory for PrettyLogFactory<F> {
    type Log = PrettyLog<F::Log>;

    fn create(&self) -> Self::Log {
        PrettyLog::new(
            self.parent.create(),
            GLOBAL_LOG,
            Arc::clone(&self.dictionary),
            self.config.clone(),
        )
    }

    fn create_session_log(&self, session: &str) -> Self::Log {
        PrettyLog::new(
            self.parent.create_session_log(session),
            session,
            Arc::clone(&self.dictionary),
            self.config.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixscope_tagvalue::Encoder;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Capture {
        incoming: Mutex<Vec<String>>,
        outgoing: Mutex<Vec<String>>,
        events: Mutex<Vec<String>>,
    }

    impl MessageLog for Arc<Capture> {
        fn on_incoming(&self, message: &[u8]) {
            self.incoming
                .lock()
                .push(String::from_utf8_lossy(message).into_owned());
        }

        fn on_outgoing(&self, message: &[u8]) {
            self.outgoing
                .lock()
                .push(String::from_utf8_lossy(message).into_owned());
        }

        fn on_event(&self, text: &str) {
            self.events.lock().push(text.to_string());
        }
    }

    struct CaptureFactory(Arc<Capture>);

    impl LogFactory for CaptureFactory {
        type Log = Arc<Capture>;

        fn create(&self) -> Self::Log {
            Arc::clone(&self.0)
        }

        fn create_session_log(&self, _session: &str) -> Self::Log {
            Arc::clone(&self.0)
        }
    }

    fn dictionary() -> Arc<Dictionary> {
        let source = r#"{
            "fields": [
                {"number": 8, "name": "BeginString", "type": "STRING"},
                {"number": 9, "name": "BodyLength", "type": "LENGTH"},
                {"number": 10, "name": "CheckSum", "type": "STRING"},
                {"number": 35, "name": "MsgType", "type": "STRING"},
                {"number": 58, "name": "Text", "type": "STRING"}
            ],
            "header": [
                {"kind": "field", "name": "BeginString"},
                {"kind": "field", "name": "BodyLength"},
                {"kind": "field", "name": "MsgType"}
            ],
            "trailer": [{"kind": "field", "name": "CheckSum"}],
            "messages": [
                {"name": "Logout", "msgtype": "5", "msgcat": "admin",
                 "parts": [{"kind": "field", "name": "Text"}]}
            ]
        }"#;
        Arc::new(Dictionary::from_json_str(source).unwrap())
    }

    #[test]
    fn test_pretty_log_forwards_reports() {
        let capture = Arc::new(Capture::default());
        let factory = PrettyLogFactory::new(
            CaptureFactory(Arc::clone(&capture)),
            dictionary(),
            RenderConfig::default(),
        );
        let log = factory.create_session_log("FIX.4.4:CLIENT->SERVER");
        assert_eq!(log.session(), "FIX.4.4:CLIENT->SERVER");

        let mut encoder = Encoder::default();
        encoder.put_fields([(35, "5"), (58, "bye")]);
        let wire = encoder.finish();
        log.on_incoming(&wire);
        log.on_outgoing(b"garbage");
        log.on_event("session closed");

        let incoming = capture.incoming.lock();
        assert_eq!(incoming.len(), 1);
        assert!(incoming[0].starts_with("\nORIG:\n8=FIX.4.4|"));
        assert!(incoming[0].contains("Text: bye"));

        let outgoing = capture.outgoing.lock();
        assert!(outgoing[0].starts_with("Error: "));
        assert!(outgoing[0].ends_with("\ngarbage"));

        assert_eq!(capture.events.lock().as_slice(), ["session closed"]);
    }

    #[test]
    fn test_factories_share_dictionary() {
        let dictionary = dictionary();
        let factory =
            PrettyLogFactory::new(NullLog, Arc::clone(&dictionary), RenderConfig::default());
        let global = factory.create();
        let session = factory.create_session_log("S1");

        assert_eq!(global.session(), GLOBAL_LOG);
        assert_eq!(Arc::strong_count(&dictionary), 4);
        drop((global, session));
        assert_eq!(Arc::strong_count(&dictionary), 2);
    }

    #[test]
    fn test_tracing_log_factory() {
        let log = TracingLogFactory.create_session_log("S2");
        assert_eq!(log.session(), "S2");
        log.on_event("logon");
        assert_eq!(TracingLogFactory.create().session(), GLOBAL_LOG);
    }
}
