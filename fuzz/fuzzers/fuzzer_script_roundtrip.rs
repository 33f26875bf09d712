#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate bmp24;

use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if let Ok(img) = bmp24::decode(Cursor::new(data)) {
        let mut encoded = Vec::new();
        bmp24::encode(&img, &mut encoded).expect("encoding to memory failed");
        let decoded = bmp24::decode(Cursor::new(&encoded)).expect("re-decoding failed");
        assert_eq!(decoded, img);
    }
});
