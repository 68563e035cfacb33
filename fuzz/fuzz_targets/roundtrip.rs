#![no_main]
use libfuzzer_sys::fuzz_target;
use msgseal::Verifier;

fuzz_target!(|data: &[u8]| {
    // Any string must verify back unchanged, whatever characters it holds.
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };
    let verifier = Verifier::new("fuzz-secret");
    let token = verifier
        .generate(value, None, Some("fuzz"))
        .expect("strings always serialize");
    let back: String = verifier
        .verify(&token, Some("fuzz"))
        .expect("freshly generated token must verify");
    assert_eq!(value, back, "value changed across generate/verify");
});
