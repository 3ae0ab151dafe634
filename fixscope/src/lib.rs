/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # fixscope
//!
//! Renders FIX tag=value messages as readable reports, using a protocol
//! dictionary to name fields, describe enumerated values and lay out
//! nested repeating groups.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixscope::prelude::*;
//!
//! let context = Context::load("dictionaries/FIX44-PT.xml", RenderConfig::default())?;
//! println!("{}", context.renderer().render_line("8=FIX.4.4|9=5|35=0|10=163|"));
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Field, message and error types
//! - [`dictionary`]: Dictionary model, loaders and group templates
//! - [`tagvalue`]: Tag=value framing and segmenting parser
//! - [`render`]: Report rendering and pretty message logs
//! - [`session`]: Application callbacks, logon rendezvous and tokens

pub mod context;

pub use context::Context;

pub mod core {
    //! Field, message and error types.
    pub use fixscope_core::*;
}

pub mod dictionary {
    //! Dictionary model, loaders and group templates.
    pub use fixscope_dictionary::*;
}

pub mod tagvalue {
    //! Tag=value framing and segmenting parser.
    pub use fixscope_tagvalue::*;
}

pub mod render {
    //! Report rendering and pretty message logs.
    pub use fixscope_render::*;
}

pub mod session {
    //! Application callbacks, logon rendezvous and tokens.
    pub use fixscope_session::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::context::Context;

    // Core types
    pub use fixscope_core::{
        DecodeError, DictionaryError, FieldMap, FieldRef, FieldTag, FixError, Group, GroupError,
        Message, MsgType, RawMessage, Result,
    };

    // Dictionary
    pub use fixscope_dictionary::{Dictionary, DictionaryFormat, FieldDef, FieldType, MessageDef};

    // Tag-value
    pub use fixscope_tagvalue::{Decoder, Encoder, MessageParser, calculate_checksum};

    // Rendering
    pub use fixscope_render::{
        LogFactory, MessageLog, PrettyLog, PrettyLogFactory, RenderConfig, Renderer,
        TracingLogFactory,
    };

    // Session
    pub use fixscope_session::{
        Application, LogonRendezvous, LogonState, LogonWatcher, SessionId, Token, TokenGenerator,
    };
}
