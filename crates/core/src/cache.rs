//! Consolidation cache keyed by file content.
//!
//! Re-rendering a view with new filters must not reload the workbook. Tables
//! are cached by the SHA-256 of the uploaded bytes, never by filter values.

use crate::config::AnalysisConfig;
use crate::consolidate::{consolidate, ConsolidatedTable};
use crate::error::Result;
use crate::loader::load_bytes;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Hex SHA-256 of a byte buffer.
pub fn content_key(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Memoized consolidation results for one session.
#[derive(Debug, Default)]
pub struct ConsolidationCache {
    config: AnalysisConfig,
    tables: HashMap<String, Arc<ConsolidatedTable>>,
}

impl ConsolidationCache {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            tables: HashMap::new(),
        }
    }

    /// Table for the given file content, consolidating it on first use.
    pub fn get_or_load(&mut self, bytes: &[u8]) -> Result<Arc<ConsolidatedTable>> {
        let key = content_key(bytes);
        if let Some(table) = self.tables.get(&key) {
            debug!(key = %key, "Consolidation cache hit");
            return Ok(Arc::clone(table));
        }

        debug!(key = %key, "Consolidation cache miss");
        let loaded = load_bytes(bytes.to_vec(), &self.config)?;
        let table = Arc::new(consolidate(&loaded, &self.config)?);
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.tables.contains_key(&content_key(bytes))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_sha256_hex() {
        assert_eq!(
            content_key(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_invalid_bytes_are_not_cached() {
        let mut cache = ConsolidationCache::default();
        assert!(cache.get_or_load(b"not a workbook").is_err());
        assert!(cache.is_empty());
    }
}
