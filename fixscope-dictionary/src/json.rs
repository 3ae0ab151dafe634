/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! JSON dictionary reader.

use crate::document::DictionaryDocument;
use fixscope_core::error::DictionaryError;

/// Parses a JSON dictionary document.
///
/// # Errors
/// Returns `DictionaryError::Json` if the source is not a valid document.
pub fn parse_json(source: &str) -> Result<DictionaryDocument, DictionaryError> {
    serde_json::from_str(source).map_err(|e| DictionaryError::Json(e.to_string()))
}
