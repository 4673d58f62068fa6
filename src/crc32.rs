// CRC-32 checksums (reflected, polynomial 0xEDB88320).
//
// This is the checksum embedded in BPS patches: it identifies the source
// blob a patch targets and verifies the patch and the reconstructed
// output. Values must match third-party patch files bit for bit, so the
// standard invert-before/invert-after convention is mandatory.

/// Checksum of `data` with the conventional zero seed.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32_seeded(data, 0)
}

/// Checksum of `data` continuing from `seed`.
///
/// Chaining `crc32_seeded(b, crc32(a))` equals `crc32` of `a` followed by
/// `b`, which is how callers accumulate over split buffers.
pub fn crc32_seeded(data: &[u8], seed: u32) -> u32 {
    #[cfg(feature = "fast-crc32")]
    {
        let mut hasher = crc32fast::Hasher::new_with_initial(seed);
        hasher.update(data);
        hasher.finalize()
    }
    #[cfg(not(feature = "fast-crc32"))]
    {
        let table = fallback::table();
        let mut crc = !seed;
        for &byte in data {
            crc = table[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
        }
        !crc
    }
}

#[cfg(not(feature = "fast-crc32"))]
mod fallback {
    use std::sync::OnceLock;

    const POLYNOMIAL: u32 = 0xEDB8_8320;

    static TABLE: OnceLock<[u32; 256]> = OnceLock::new();

    /// 256-entry lookup table, built once per process.
    pub(super) fn table() -> &'static [u32; 256] {
        TABLE.get_or_init(|| {
            let mut table = [0u32; 256];
            for (idx, entry) in table.iter_mut().enumerate() {
                let mut c = idx as u32;
                for _ in 0..8 {
                    c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
                }
                *entry = c;
            }
            table
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
