//! Oxibps: BPS binary patch application in Rust.
//!
//! The crate provides:
//! - A pure-Rust BPS patch applier (`bps`)
//! - The CRC-32 checksum used for patch and source verification (`crc32`)
//! - An in-memory registry matching patches to source blobs by checksum
//!   (`registry`)
//!
//! Only *applying* patches is supported; the crate does not create them.
//!
//! # Quick Start
//!
//! ```
//! use oxibps::apply;
//! use oxibps::bps::varint;
//! use oxibps::crc32::crc32;
//!
//! // A minimal patch: one SourceRead spanning the whole source.
//! let source = b"hello old world";
//! let mut patch = Vec::from(&b"BPS1"[..]);
//! varint::encode_u64(source.len() as u64, &mut patch); // source size
//! varint::encode_u64(source.len() as u64, &mut patch); // target size
//! varint::encode_u64(0, &mut patch); // no metadata
//! varint::encode_u64((source.len() as u64 - 1) << 2, &mut patch); // SourceRead
//! patch.extend_from_slice(&crc32(source).to_le_bytes());
//! patch.extend_from_slice(&crc32(source).to_le_bytes());
//! patch.extend_from_slice(&crc32(&patch).to_le_bytes());
//!
//! let output = apply(&patch, source).unwrap();
//! assert_eq!(output, source);
//! ```

pub mod bps;
pub mod crc32;
pub mod registry;

// Re-export the codec boundary for convenience.
pub use bps::{Action, BpsError, PatchHeader, apply, parse_header};
pub use registry::{AppliedPatch, RegistryError, SourceRegistry};
