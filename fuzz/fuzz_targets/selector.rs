#![no_main]

use isotest::CaseSelector;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Selectors arrive through an environment variable, so only UTF-8 input is interesting
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(selector) = s.parse::<CaseSelector>() {
            // Anything accepted must survive a trip through its text form
            let reparsed: CaseSelector = selector.to_string().parse().expect("displayed selector must parse");
            assert_eq!(selector, reparsed);
        }
    }
});
