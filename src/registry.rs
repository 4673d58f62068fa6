// In-memory table of candidate source blobs, keyed by CRC-32.
//
// A BPS patch declares the checksum of the source it was made against.
// The registry computes each blob's checksum once at insertion and uses
// the header's declared value to pick the blob a patch actually targets,
// so callers never pair a patch with a same-sized but wrong source.

use std::collections::HashMap;

use log::{debug, warn};
use thiserror::Error;

use crate::bps::{self, BpsError, PatchHeader};
use crate::crc32::crc32;

/// A registered source blob.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Caller-supplied label, used in logs and results.
    pub name: String,
    /// The blob itself.
    pub data: Vec<u8>,
    /// CRC-32 of `data`, the registry key.
    pub crc: u32,
}

/// Result of a successful registry apply.
#[derive(Debug, Clone)]
pub struct AppliedPatch {
    /// The reconstructed output.
    pub output: Vec<u8>,
    /// Name of the source blob the patch matched.
    pub source_name: String,
    /// Checksum of the matched source blob.
    pub source_crc: u32,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    /// No registered blob has the checksum the patch declares. Distinct
    /// from a codec error: the patch may be fine, the source is absent.
    #[error("no registered source matches checksum {declared:#010x}")]
    NoMatchingSource { declared: u32 },

    /// The patch failed to parse or apply.
    #[error(transparent)]
    Bps(#[from] BpsError),
}

/// Registry of source blobs addressable by checksum.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<u32, SourceEntry>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob under its computed checksum and return that
    /// checksum. A later blob with the same checksum replaces the
    /// earlier one.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) -> u32 {
        let crc = crc32(&data);
        let name = name.into();
        debug!("registered source {name:?} ({} bytes, crc32 {crc:08x})", data.len());
        self.sources.insert(crc, SourceEntry { name, data, crc });
        crc
    }

    /// Look up a blob by checksum.
    pub fn get(&self, crc: u32) -> Option<&SourceEntry> {
        self.sources.get(&crc)
    }

    /// The blob a parsed patch header targets, if registered.
    pub fn find_source(&self, header: &PatchHeader) -> Option<&SourceEntry> {
        self.sources.get(&header.source_crc)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Parse `patch`, match its declared source checksum against the
    /// registered blobs and apply it to the match.
    pub fn apply(&self, patch: &[u8]) -> Result<AppliedPatch, RegistryError> {
        let header = bps::parse_header(patch)?;
        let Some(entry) = self.sources.get(&header.source_crc) else {
            warn!(
                "no source with crc32 {:08x} among {} registered",
                header.source_crc,
                self.sources.len()
            );
            return Err(RegistryError::NoMatchingSource {
                declared: header.source_crc,
            });
        };
        debug!(
            "applying {}-byte patch against {:?} ({} bytes)",
            patch.len(),
            entry.name,
            entry.data.len()
        );
        let output = bps::apply(patch, &entry.data)?;
        Ok(AppliedPatch {
            output,
            source_name: entry.name.clone(),
            source_crc: entry.crc,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
