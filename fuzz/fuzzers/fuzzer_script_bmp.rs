#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate bmp24;

use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let _ = bmp24::decode(Cursor::new(data));
});
