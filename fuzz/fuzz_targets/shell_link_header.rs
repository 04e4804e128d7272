#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 76 {
        return;
    }
    let _ = lnkcore::header::ShellLinkHeader::read(data);
});
