// BPS patch preamble parsing.
//
// The header is parsed without touching the instruction stream, so a
// caller can cheaply inspect which source a patch targets (by checksum)
// before deciding to apply it.

use super::cursor::ReadCursor;
use super::error::BpsError;

/// Fixed four-byte tag opening every BPS patch.
pub const BPS_MAGIC: [u8; 4] = *b"BPS1";

/// Magic, three one-byte minimum varints, three trailing checksums.
pub const MIN_PATCH_LEN: usize = 4 + 3 + 12;

/// Parsed BPS patch preamble.
///
/// Computed once per call from the patch bytes and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchHeader {
    /// Declared size of the source blob the patch applies to.
    pub source_size: u64,
    /// Declared size of the reconstructed output.
    pub target_size: u64,
    /// Offset of the metadata block.
    pub metadata_start: u64,
    /// Offset of the instruction stream (metadata start plus the
    /// declared metadata size; not validated here, an oversized value
    /// surfaces as a bounds error when the instruction region is read).
    pub data_start: u64,
    /// Checksum the source blob must have.
    pub source_crc: u32,
    /// Checksum the completed output must have.
    pub target_crc: u32,
    /// Checksum of the patch itself, covering every byte before this
    /// field's own four bytes.
    pub patch_crc: u32,
}

impl PatchHeader {
    /// The raw metadata block, if its declared bounds fit inside the
    /// patch. The codec never interprets it.
    pub fn metadata<'a>(&self, patch: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.metadata_start).ok()?;
        let end = usize::try_from(self.data_start).ok()?;
        if end > patch.len().saturating_sub(12) {
            return None;
        }
        patch.get(start..end)
    }
}

/// Parse the preamble of `patch`.
///
/// Checks the length precondition and the magic tag, decodes the three
/// size varints and reads the three trailing little-endian checksums.
/// Never mutates or copies the patch.
pub fn parse_header(patch: &[u8]) -> Result<PatchHeader, BpsError> {
    if patch.len() < MIN_PATCH_LEN {
        return Err(BpsError::PatchTooShort { len: patch.len() });
    }

    let mut cursor = ReadCursor::new(patch);

    let magic = cursor.read(4)?;
    if magic != BPS_MAGIC.as_slice() {
        return Err(BpsError::BadMagic {
            found: [magic[0], magic[1], magic[2], magic[3]],
        });
    }

    // Any failure in the size varints is reported uniformly; the caller
    // cannot act on the distinction inside a header this malformed.
    let source_size = cursor.read_varint().map_err(|_| BpsError::InvalidSizeField)?;
    let target_size = cursor.read_varint().map_err(|_| BpsError::InvalidSizeField)?;
    let metadata_size = cursor.read_varint().map_err(|_| BpsError::InvalidSizeField)?;

    let metadata_start = cursor.position() as u64;
    let data_start = metadata_start.saturating_add(metadata_size);

    cursor.seek(patch.len() - 12);
    let source_crc = cursor.read_u32_le()?;
    let target_crc = cursor.read_u32_le()?;
    let patch_crc = cursor.read_u32_le()?;

    Ok(PatchHeader {
        source_size,
        target_size,
        metadata_start,
        data_start,
        source_crc,
        target_crc,
        patch_crc,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
