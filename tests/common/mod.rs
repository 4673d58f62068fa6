// Reference patch builder for tests.
//
// The crate only applies patches, so tests assemble their own: each
// helper appends one encoded instruction, `build` wraps the stream in a
// header and the three trailing checksums. The caller supplies the
// expected target; the builder never simulates the instruction stream.

use oxibps::bps::varint;
use oxibps::bps::BPS_MAGIC;
use oxibps::crc32::crc32;

#[derive(Default)]
pub struct PatchBuilder {
    metadata: Vec<u8>,
    instructions: Vec<u8>,
}

#[allow(dead_code)] // not every integration test uses every action
impl PatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(mut self, bytes: &[u8]) -> Self {
        self.metadata = bytes.to_vec();
        self
    }

    pub fn source_read(mut self, length: u64) -> Self {
        self.op(0, length);
        self
    }

    pub fn target_read(mut self, literal: &[u8]) -> Self {
        self.op(1, literal.len() as u64);
        self.instructions.extend_from_slice(literal);
        self
    }

    pub fn source_copy(mut self, offset: i64, length: u64) -> Self {
        self.op(2, length);
        varint::encode_signed(offset, &mut self.instructions);
        self
    }

    pub fn target_copy(mut self, offset: i64, length: u64) -> Self {
        self.op(3, length);
        varint::encode_signed(offset, &mut self.instructions);
        self
    }

    /// Assemble the patch, deriving all sizes and checksums from
    /// `source` and the expected `target`.
    pub fn build(self, source: &[u8], target: &[u8]) -> Vec<u8> {
        let mut patch = Vec::from(&BPS_MAGIC[..]);
        varint::encode_u64(source.len() as u64, &mut patch);
        varint::encode_u64(target.len() as u64, &mut patch);
        varint::encode_u64(self.metadata.len() as u64, &mut patch);
        patch.extend_from_slice(&self.metadata);
        patch.extend_from_slice(&self.instructions);
        patch.extend_from_slice(&crc32(source).to_le_bytes());
        patch.extend_from_slice(&crc32(target).to_le_bytes());
        patch.extend_from_slice(&crc32(&patch).to_le_bytes());
        patch
    }

    fn op(&mut self, action: u64, length: u64) {
        assert!(length >= 1, "zero-length operations cannot be encoded");
        varint::encode_u64(((length - 1) << 2) | action, &mut self.instructions);
    }
}

/// Identity patch: one SourceRead covering the whole (non-empty) source.
#[allow(dead_code)]
pub fn identity_patch(source: &[u8]) -> Vec<u8> {
    PatchBuilder::new()
        .source_read(source.len() as u64)
        .build(source, source)
}
