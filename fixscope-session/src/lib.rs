/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # fixscope Session
//!
//! Session-side helpers for fixscope.
//!
//! This crate provides:
//! - **Application callbacks**: The async [`Application`] trait and a
//!   [`LogonWatcher`] that reports logon outcomes
//! - **Logon rendezvous**: Block a caller until the counterparty logs on or out
//! - **Tokens**: Strictly increasing 56-bit request identifiers

pub mod application;
pub mod rendezvous;
pub mod token;

pub use application::{Application, LogonWatcher, NoOpApplication, RejectReason, SessionId};
pub use rendezvous::{LogonRendezvous, LogonState};
pub use token::{Token, TokenGenerator, TOKEN_MASK};
