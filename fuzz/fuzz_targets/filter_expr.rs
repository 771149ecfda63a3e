#![no_main]

use libfuzzer_sys::fuzz_target;
use wlanalyze::filter::MessageFilter;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Attempt to parse the filter expression
        // This should not panic regardless of input
        let _ = MessageFilter::from_expr(input);
    }
});
