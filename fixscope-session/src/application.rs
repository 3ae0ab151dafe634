/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Application callback interface.
//!
//! The session engine drives an [`Application`] with lifecycle and message
//! callbacks. [`LogonWatcher`] wraps one and reports Logon and Logout admin
//! messages to a [`LogonRendezvous`].

use crate::rendezvous::{LogonRendezvous, LogonState};
use async_trait::async_trait;
use fixscope_core::message::{MsgType, RawMessage};
use std::sync::Arc;
use tracing::info;

/// Session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    /// BeginString (protocol version).
    pub begin_string: String,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
}

impl SessionId {
    /// Creates a new session ID.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
        }
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )
    }
}

/// Reason for rejecting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectReason {
    /// Rejection reason code.
    pub code: u32,
    /// Human-readable rejection text.
    pub text: String,
    /// Reference tag that caused the rejection.
    pub ref_tag: Option<u32>,
}

impl RejectReason {
    /// Creates a new rejection reason.
    #[must_use]
    pub fn new(code: u32, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            ref_tag: None,
        }
    }

    /// Sets the reference tag.
    #[must_use]
    pub const fn with_ref_tag(mut self, tag: u32) -> Self {
        self.ref_tag = Some(tag);
        self
    }
}

/// Callbacks from the session engine.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called when a session is created.
    async fn on_create(&self, session_id: &SessionId);

    /// Called on successful logon.
    async fn on_logon(&self, session_id: &SessionId);

    /// Called on logout.
    async fn on_logout(&self, session_id: &SessionId);

    /// Called when an admin message is received.
    ///
    /// # Returns
    /// `Ok(())` to accept, `Err(RejectReason)` to reject.
    #[allow(clippy::wrong_self_convention)]
    async fn from_admin(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason>;

    /// Called when an application message is received.
    ///
    /// # Returns
    /// `Ok(())` to accept, `Err(RejectReason)` to reject.
    #[allow(clippy::wrong_self_convention)]
    async fn from_app(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason>;
}

/// Application that accepts everything and does nothing.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_create(&self, _session_id: &SessionId) {}

    async fn on_logon(&self, _session_id: &SessionId) {}

    async fn on_logout(&self, _session_id: &SessionId) {}

    async fn from_admin(
        &self,
        _message: &RawMessage<'_>,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        Ok(())
    }

    async fn from_app(
        &self,
        _message: &RawMessage<'_>,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        Ok(())
    }
}

/// Signals a rendezvous when Logon (35=A) or Logout (35=5) arrives.
#[derive(Debug)]
pub struct LogonWatcher<A> {
    inner: A,
    rendezvous: Arc<LogonRendezvous>,
}

impl<A: Application> LogonWatcher<A> {
    /// Wraps `inner`, signalling `rendezvous`.
    #[must_use]
    pub fn new(inner: A, rendezvous: Arc<LogonRendezvous>) -> Self {
        Self { inner, rendezvous }
    }

    /// Returns the rendezvous being signalled.
    #[must_use]
    pub fn rendezvous(&self) -> &Arc<LogonRendezvous> {
        &self.rendezvous
    }

    /// Returns the wrapped application.
    #[must_use]
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: Application> Application for LogonWatcher<A> {
    async fn on_create(&self, session_id: &SessionId) {
        self.inner.on_create(session_id).await;
    }

    async fn on_logon(&self, session_id: &SessionId) {
        self.inner.on_logon(session_id).await;
    }

    async fn on_logout(&self, session_id: &SessionId) {
        self.inner.on_logout(session_id).await;
    }

    async fn from_admin(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        match message.msg_type() {
            MsgType::Logon => {
                info!("Session {} logged on", session_id);
                self.rendezvous.signal(LogonState::Connected);
            }
            MsgType::Logout => {
                info!("Session {} logged out", session_id);
                self.rendezvous.signal(LogonState::Disconnected);
            }
            _ => {}
        }
        self.inner.from_admin(message, session_id).await
    }

    async fn from_app(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        self.inner.from_app(message, session_id).await
    }
}
