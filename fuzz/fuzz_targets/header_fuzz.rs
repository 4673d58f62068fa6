#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Header parsing never reads the instruction stream and never
    // panics; a second pass must return identical fields.
    if let Ok(header) = oxibps::parse_header(data) {
        let again = oxibps::parse_header(data).expect("header parse is deterministic");
        assert_eq!(header, again);
        let _ = header.metadata(data);
    }
});
