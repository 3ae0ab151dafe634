/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Process-wide state held in one place.
//!
//! A [`Context`] owns the loaded dictionary, the render configuration and the
//! token generator, and hands out renderers and message logs that borrow or
//! share them.

use fixscope_core::error::{DictionaryError, GroupError};
use fixscope_dictionary::Dictionary;
use fixscope_render::{LogFactory, PrettyLogFactory, RenderConfig, Renderer};
use bytes::BytesMut;
use fixscope_session::{Token, TokenGenerator};
use fixscope_tagvalue::Encoder;
use std::path::Path;
use std::sync::Arc;

const CL_ORD_ID: u32 = 11;

/// Dictionary, render settings and token source for one process.
#[derive(Debug)]
pub struct Context {
    dictionary: Arc<Dictionary>,
    config: RenderConfig,
    tokens: TokenGenerator,
}

impl Context {
    /// Creates a context around an already built dictionary.
    #[must_use]
    pub fn new(dictionary: Dictionary, config: RenderConfig) -> Self {
        Self {
            dictionary: Arc::new(dictionary),
            config,
            tokens: TokenGenerator::new(),
        }
    }

    /// Loads the dictionary at `path` and creates a context around it.
    ///
    /// # Errors
    /// Returns the [`DictionaryError`] raised while reading or validating
    /// the dictionary.
    pub fn load(path: impl AsRef<Path>, config: RenderConfig) -> Result<Self, DictionaryError> {
        Ok(Self::new(Dictionary::load(path)?, config))
    }

    /// Replaces the token generator, e.g. with a fixed seed.
    #[must_use]
    pub fn with_tokens(mut self, tokens: TokenGenerator) -> Self {
        self.tokens = tokens;
        self
    }

    /// Returns the shared dictionary.
    #[must_use]
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Returns the render configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Returns a renderer borrowing this context's dictionary.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.dictionary, self.config.clone())
    }

    /// Returns the next request token.
    pub fn next_token(&self) -> Token {
        self.tokens.next()
    }

    /// Builds an outgoing message of type `msg_type` whose ClOrdID (11) is a
    /// fresh token, followed by `fields` in order.
    ///
    /// The BeginString is the one the dictionary describes.
    pub fn outgoing<'v>(
        &self,
        msg_type: &str,
        fields: impl IntoIterator<Item = (u32, &'v str)>,
    ) -> (Token, BytesMut) {
        let token = self.next_token();
        let mut encoder = Encoder::new(self.dictionary.begin_string());
        encoder.put_str(35, msg_type);
        encoder.put_uint(CL_ORD_ID, token.value());
        encoder.put_fields(fields);
        (token, encoder.finish())
    }

    /// Wraps `parent` so every log it creates renders traffic first.
    #[must_use]
    pub fn log_factory<F: LogFactory>(&self, parent: F) -> PrettyLogFactory<F> {
        PrettyLogFactory::new(parent, Arc::clone(&self.dictionary), self.config.clone())
    }

    /// Resolves the template of group `tag` in message `msg_type`.
    ///
    /// # Errors
    /// Returns the [`GroupError`] of the resolver.
    pub fn group_template(&self, msg_type: &str, tag: u32) -> Result<Vec<u32>, GroupError> {
        self.dictionary.group_template(msg_type, tag)
    }
}
