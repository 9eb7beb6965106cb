#![no_main]

#[macro_use]
extern crate libfuzzer_sys;
extern crate regex_cst;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(tree) = regex_cst::parse(s) {
            assert_eq!(tree.source_text(), s);
        }
    }
});
