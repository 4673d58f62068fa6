// Failure taxonomy for the BPS codec.
//
// Every failure is fatal to the current call: no partial output, no
// retry. Instruction-level failures carry enough position context to be
// diagnosed without re-running.

use std::fmt;

use thiserror::Error;

use super::apply::Action;
use super::cursor::CursorError;
use super::header::MIN_PATCH_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BpsError {
    /// The patch is shorter than the smallest structurally valid file.
    #[error("incomplete patch: {len} bytes, minimum is {min}", min = MIN_PATCH_LEN)]
    PatchTooShort { len: usize },

    /// The patch does not start with the `BPS1` tag.
    #[error("bad magic: expected \"BPS1\", found {found:02X?}")]
    BadMagic { found: [u8; 4] },

    /// One of the three header size varints could not be decoded.
    #[error("invalid size field in patch header")]
    InvalidSizeField,

    /// The declared metadata block extends past the instruction region.
    #[error("metadata (ending at {data_start}) overruns the patch ({patch_len} bytes)")]
    MetadataOverrun { data_start: u64, patch_len: u64 },

    /// The patch's self-checksum does not cover its own contents.
    #[error("patch corrupted: self-checksum {computed:#010x}, patch declares {declared:#010x}")]
    PatchChecksumMismatch { declared: u32, computed: u32 },

    /// The source blob is not the size the patch was made against.
    #[error("source size mismatch: patch targets {declared} bytes, source has {actual}")]
    SourceSizeMismatch { declared: u64, actual: u64 },

    /// The source blob is not the one the patch was made against.
    #[error("wrong source: checksum {computed:#010x}, patch declares {declared:#010x}")]
    SourceChecksumMismatch { declared: u32, computed: u32 },

    /// The instruction stream produced the wrong number of bytes.
    #[error("output size mismatch: produced {actual} bytes, patch declares {declared}")]
    OutputSizeMismatch { declared: u64, actual: u64 },

    /// The completed output does not match the declared checksum. The
    /// source was correct, so the patch/output pairing is at fault.
    #[error("output content mismatch: checksum {computed:#010x}, patch declares {declared:#010x}")]
    OutputChecksumMismatch { declared: u32, computed: u32 },

    /// The instruction word itself could not be decoded.
    #[error("instruction {index}: unreadable opcode at patch offset {patch_pos}: {cause}")]
    Opcode {
        index: u64,
        patch_pos: u64,
        #[source]
        cause: CursorError,
    },

    /// An instruction failed while executing.
    #[error("instruction {index} ({action}, length {length}) failed: {cause} ({context})")]
    Instruction {
        index: u64,
        action: Action,
        length: u64,
        context: InstructionContext,
        #[source]
        cause: CursorError,
    },

    /// A cursor failure outside the instruction loop.
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Positions captured when an instruction fails. `offset` is the decoded
/// relative offset, present only for the copy actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionContext {
    pub patch_pos: u64,
    pub source_pos: u64,
    pub target_len: u64,
    pub offset: Option<i64>,
}

impl fmt::Display for InstructionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patch.pos={}, source.pos={}, target.len={}",
            self.patch_pos, self.source_pos, self.target_len
        )?;
        if let Some(offset) = self.offset {
            write!(f, ", offset={offset}")?;
        }
        Ok(())
    }
}
