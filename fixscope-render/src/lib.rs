/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # fixscope Render
//!
//! Human-readable rendering of tag=value messages.
//!
//! This crate provides:
//! - **Renderer**: Dictionary-ordered reports with nested repeating groups
//! - **Configuration**: Column widths, banner and visible delimiter
//! - **Message logs**: Sinks that render traffic before forwarding it

pub mod config;
pub mod log;
pub mod renderer;

pub use config::RenderConfig;
pub use log::{
    GLOBAL_LOG, LogFactory, MessageLog, NullLog, PrettyLog, PrettyLogFactory, TracingLog,
    TracingLogFactory,
};
pub use renderer::Renderer;
