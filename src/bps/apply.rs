// BPS instruction engine.
//
// Verification order matters: header, patch self-checksum, source size
// and source checksum all run before the first instruction executes, so
// a corrupted patch or a wrong source never produces partial garbage.
// After the loop, output size and output checksum close the other end.

use std::fmt;

use crate::crc32::crc32;

use super::cursor::{CursorError, ReadCursor, TargetBuffer};
use super::error::{BpsError, InstructionContext};
use super::header::parse_header;
use super::varint;

/// Upper bound on the output pre-allocation taken from a patch header.
const PREALLOC_CAP: u64 = 1 << 26; // 64 MiB

/// The four instruction kinds, selected by the low two bits of each
/// instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Output bytes unchanged from the same position in the source.
    SourceRead,
    /// Literal bytes embedded in the patch.
    TargetRead,
    /// Bytes from a possibly distant region of the source.
    SourceCopy,
    /// Bytes from earlier in the output itself.
    TargetCopy,
}

impl Action {
    #[inline]
    fn from_opcode(instr: u64) -> Self {
        match instr & 3 {
            0 => Action::SourceRead,
            1 => Action::TargetRead,
            2 => Action::SourceCopy,
            _ => Action::TargetCopy,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::SourceRead => "SourceRead",
            Action::TargetRead => "TargetRead",
            Action::SourceCopy => "SourceCopy",
            Action::TargetCopy => "TargetCopy",
        };
        f.write_str(name)
    }
}

/// Apply a BPS `patch` to `source`, returning the reconstructed output.
///
/// The whole patch and source are verified before the instruction stream
/// runs; the output is verified after. Any failure aborts the call and
/// no partial output is returned.
pub fn apply(patch: &[u8], source: &[u8]) -> Result<Vec<u8>, BpsError> {
    let header = parse_header(patch)?;

    // The self-checksum covers every byte before its own four, including
    // the source and target checksum fields.
    let patch_crc = crc32(&patch[..patch.len() - 4]);
    if patch_crc != header.patch_crc {
        return Err(BpsError::PatchChecksumMismatch {
            declared: header.patch_crc,
            computed: patch_crc,
        });
    }

    if source.len() as u64 != header.source_size {
        return Err(BpsError::SourceSizeMismatch {
            declared: header.source_size,
            actual: source.len() as u64,
        });
    }

    let source_crc = crc32(source);
    if source_crc != header.source_crc {
        return Err(BpsError::SourceChecksumMismatch {
            declared: header.source_crc,
            computed: source_crc,
        });
    }

    // Instructions stop decoding 12 bytes from the end, but TargetRead
    // may consume the source/target checksum fields as literal data;
    // only the self-checksum is off limits.
    let inst_end = patch.len() - 12;
    if header.data_start > inst_end as u64 {
        return Err(BpsError::MetadataOverrun {
            data_start: header.data_start,
            patch_len: patch.len() as u64,
        });
    }
    let data_start = header.data_start as usize;
    let mut patch_cursor = ReadCursor::new(&patch[data_start..patch.len() - 4]);
    let inst_len = inst_end - data_start;

    let mut source_cursor = ReadCursor::new(source);
    // Pre-size from the declared output size, capped: the header is
    // unverified input and must not drive the allocation on its own.
    // The buffer still grows on demand past the cap.
    let mut target = TargetBuffer::with_capacity(header.target_size.min(PREALLOC_CAP) as usize);

    let mut index: u64 = 0;
    while patch_cursor.position() < inst_len {
        let instr = patch_cursor.read_varint().map_err(|cause| BpsError::Opcode {
            index,
            patch_pos: (data_start + patch_cursor.position()) as u64,
            cause,
        })?;
        let action = Action::from_opcode(instr);
        let length = ((instr >> 2) + 1) as usize;

        let mut offset: Option<i64> = None;
        let step = match action {
            Action::SourceRead => source_read(&source_cursor, &mut target, length),
            Action::TargetRead => target_read(&mut patch_cursor, &mut target, length),
            Action::SourceCopy => {
                source_copy(&mut patch_cursor, &mut source_cursor, &mut target, length, &mut offset)
            }
            Action::TargetCopy => target_copy(&mut patch_cursor, &mut target, length, &mut offset),
        };

        step.map_err(|cause| BpsError::Instruction {
            index,
            action,
            length: length as u64,
            context: InstructionContext {
                patch_pos: (data_start + patch_cursor.position()) as u64,
                source_pos: source_cursor.position() as u64,
                target_len: target.len() as u64,
                offset,
            },
            cause,
        })?;

        index += 1;
    }

    if target.len() as u64 != header.target_size {
        return Err(BpsError::OutputSizeMismatch {
            declared: header.target_size,
            actual: target.len() as u64,
        });
    }

    let output = target.into_vec();
    let output_crc = crc32(&output);
    if output_crc != header.target_crc {
        return Err(BpsError::OutputChecksumMismatch {
            declared: header.target_crc,
            computed: output_crc,
        });
    }

    Ok(output)
}

// ---------------------------------------------------------------------------
// Instruction execution
// ---------------------------------------------------------------------------

fn source_read(
    source: &ReadCursor<'_>,
    target: &mut TargetBuffer,
    length: usize,
) -> Result<(), CursorError> {
    // Reads the source at the position mirroring the current output
    // length, not at the independent source cursor.
    let chunk = source.peek_slice(target.len(), length)?;
    target.write(chunk);
    Ok(())
}

fn target_read(
    patch: &mut ReadCursor<'_>,
    target: &mut TargetBuffer,
    length: usize,
) -> Result<(), CursorError> {
    let chunk = patch.read(length)?;
    target.write(chunk);
    Ok(())
}

fn source_copy(
    patch: &mut ReadCursor<'_>,
    source: &mut ReadCursor<'_>,
    target: &mut TargetBuffer,
    length: usize,
    offset: &mut Option<i64>,
) -> Result<(), CursorError> {
    let (magnitude, negative) = varint::split_signed(patch.read_varint()?);
    *offset = Some(signed_offset(magnitude, negative));
    if negative {
        source.rewind(magnitude as usize)?;
    } else {
        source.advance(magnitude as usize);
    }
    let chunk = source.read(length)?;
    target.write(chunk);
    Ok(())
}

fn target_copy(
    patch: &mut ReadCursor<'_>,
    target: &mut TargetBuffer,
    length: usize,
    offset: &mut Option<i64>,
) -> Result<(), CursorError> {
    let (magnitude, negative) = varint::split_signed(patch.read_varint()?);
    *offset = Some(signed_offset(magnitude, negative));
    if negative {
        target.rewind(magnitude as usize)?;
    } else {
        target.advance(magnitude as usize);
    }
    // The copied region may overlap the bytes being appended; each byte
    // must land before the next is read.
    for _ in 0..length {
        let byte = target.read_u8()?;
        target.write_u8(byte);
    }
    Ok(())
}

#[inline]
fn signed_offset(magnitude: u64, negative: bool) -> i64 {
    // magnitude fits in i64 after the sign bit is shifted out.
    let value = magnitude as i64;
    if negative { -value } else { value }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
