/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Dictionary loading from strings and files.

use crate::json::parse_json;
use crate::schema::Dictionary;
use crate::xml::parse_xml;
use fixscope_core::error::DictionaryError;
use std::path::Path;
use tracing::info;

/// Source encoding of a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryFormat {
    /// QuickFIX XML data dictionary.
    Xml,
    /// JSON document.
    Json,
}

impl DictionaryFormat {
    /// Picks the format from a file extension (`xml` or `json`, any case).
    ///
    /// # Errors
    /// Returns `DictionaryError::UnsupportedFormat` for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, DictionaryError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xml") => Ok(Self::Xml),
            Some("json") => Ok(Self::Json),
            _ => Err(DictionaryError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

impl Dictionary {
    /// Builds a dictionary from a QuickFIX XML source.
    ///
    /// # Errors
    /// Returns a [`DictionaryError`] if the source is malformed or inconsistent.
    pub fn from_xml_str(source: &str) -> Result<Self, DictionaryError> {
        parse_xml(source)?.build()
    }

    /// Builds a dictionary from a JSON source.
    ///
    /// # Errors
    /// Returns a [`DictionaryError`] if the source is malformed or inconsistent.
    pub fn from_json_str(source: &str) -> Result<Self, DictionaryError> {
        parse_json(source)?.build()
    }

    /// Builds a dictionary from a source in the given format.
    ///
    /// # Errors
    /// Returns a [`DictionaryError`] if the source is malformed or inconsistent.
    pub fn from_str_with_format(
        source: &str,
        format: DictionaryFormat,
    ) -> Result<Self, DictionaryError> {
        match format {
            DictionaryFormat::Xml => Self::from_xml_str(source),
            DictionaryFormat::Json => Self::from_json_str(source),
        }
    }

    /// Loads a dictionary file, choosing the format by extension.
    ///
    /// # Errors
    /// Returns `DictionaryError::Io` if the file cannot be read, and any
    /// parse or validation error otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let format = DictionaryFormat::from_path(path)?;
        let source = std::fs::read_to_string(path).map_err(|e| DictionaryError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let dict = Self::from_str_with_format(&source, format)?;
        info!(
            path = %path.display(),
            begin_string = dict.begin_string(),
            fields = dict.fields().count(),
            components = dict.components().count(),
            messages = dict.messages().count(),
            "dictionary loaded"
        );
        Ok(dict)
    }
}
