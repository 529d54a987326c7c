#![no_main]

use apex_signing::{sign, FixedClock, SignatureError, SignatureVerifier};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const NOW: u64 = 1_700_000_000;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let mut fields = raw.splitn(3, '\n');
    let timestamp = fields.next().unwrap_or_default();
    let signature = fields.next().unwrap_or_default();
    let body = fields.next().unwrap_or_default().as_bytes();

    let verifier = SignatureVerifier::new("fuzz-secret")
        .expect("verifier")
        .with_clock(Arc::new(FixedClock(NOW)));

    match verifier.verify(Some(timestamp), Some(signature), body) {
        Ok(()) => {
            let expected = sign("fuzz-secret", timestamp.trim(), body).expect("sign");
            assert_eq!(expected, signature.trim());
        }
        Err(SignatureError::EmptySecret) | Err(SignatureError::InvalidKey(_)) => {
            panic!("verifier secret is fixed and valid");
        }
        Err(error) => assert!(!error.to_string().is_empty()),
    }

    let genuine = sign("fuzz-secret", &NOW.to_string(), body).expect("sign");
    verifier
        .verify(Some(&NOW.to_string()), Some(&genuine), body)
        .expect("freshly signed body verifies");
});
