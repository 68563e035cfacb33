#![no_main]
use libfuzzer_sys::fuzz_target;
use msgseal::{Verifier, VerifierOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    for options in [VerifierOptions::default(), VerifierOptions::strict()] {
        let verifier = Verifier::with_options("fuzz-secret", options);
        verifier.rotate("fuzz-rotated");
        let _ = verifier.verify::<serde_json::Value>(token, None);
        let _ = verifier.verify::<serde_json::Value>(token, Some("purpose"));
    }
});
