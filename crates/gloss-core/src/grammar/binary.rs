//! Binary serialization for grammars using postcard.

use super::error::LoadError;
use super::types::Grammar;

impl Grammar {
    /// Decode a grammar from its binary form.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, LoadError> {
        postcard::from_bytes(bytes).map_err(LoadError::Binary)
    }

    /// Encode the grammar into its binary form.
    pub fn to_binary(&self) -> Result<Vec<u8>, LoadError> {
        postcard::to_allocvec(self).map_err(LoadError::Binary)
    }
}
