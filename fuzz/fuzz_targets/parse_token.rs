#![no_main]
use libfuzzer_sys::fuzz_target;
use msgseal::serialize::{decode_payload, deserialize_record, split_token};
use msgseal::types::Record;

fuzz_target!(|data: &[u8]| {
    // Must never panic, regardless of input.
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(signed) = split_token(token) {
        if let Ok(bytes) = decode_payload(signed.payload) {
            let _: Result<Record<serde_json::Value>, _> = deserialize_record(&bytes);
        }
    }
});
