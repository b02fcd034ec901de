#![no_main]

use cbor_load::{Flags, load};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for flags in [Flags::default(), Flags::lenient().with_max_depth(16)] {
        let result = load(data, &flags);
        assert!(result.read <= data.len());
        match (&result.item, &result.error) {
            (Some(item), None) => _ = format!("{item:?}"),
            (None, Some(_)) => {}
            _ => panic!("Inconsistent load result"),
        }
    }
});
