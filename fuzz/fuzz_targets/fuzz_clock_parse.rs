//! Fuzz target: `extract_cclk` + `ClockState::parse`
//!
//! Feeds arbitrary modem replies through the network-time path and checks
//! that anything accepted is a real calendar instant that survives a
//! format/parse cycle.
//!
//! cargo fuzz run fuzz_clock_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use vapor::clock::{ClockState, extract_cclk};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let raw = extract_cclk(text).unwrap_or(text);
    if let Ok(state) = ClockState::parse(raw) {
        let again = format!(
            "{:02}/{:02}/{:02},{:02}:{:02}:{:02}",
            state.year() - 2000,
            state.month(),
            state.day(),
            state.hour(),
            state.minute(),
            state.second()
        );
        assert_eq!(ClockState::parse(&again), Ok(state));

        let mut later = state;
        later.add_seconds(u64::from(data.len() as u32) * 86_399);
        assert!(later >= state, "clock ran backwards");
    }
});
