//! Fuzz target: `take_cmt` + `AppCommand::from_sms`
//!
//! Arbitrary serial noise must never panic the unsolicited-SMS scanner,
//! every extraction must shrink the buffer, and no body swallows the
//! modem's frame terminator.
//!
//! cargo fuzz run fuzz_sms_inbox

#![no_main]

use libfuzzer_sys::fuzz_target;
use vapor::adapters::modem::take_cmt;
use vapor::app::commands::AppCommand;

fuzz_target!(|data: &[u8]| {
    let mut buffer = String::from_utf8_lossy(data).into_owned();
    loop {
        let before = buffer.len();
        let Some(body) = take_cmt(&mut buffer) else {
            break;
        };
        assert!(buffer.len() < before, "extraction must consume input");
        assert!(!body.contains("\r\n"));
        let _ = AppCommand::from_sms(&body);
    }
});
