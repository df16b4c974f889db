//! Property-based tests for scan value normalization.
//!
//! These tests generate arbitrary decoder payloads and verify that the
//! normalization contract holds for every shape the decoder can produce.

use gatepass_core::{Credential, Error, RawScanPayload, normalize};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

/// Strategy for text with arbitrary surrounding whitespace.
fn padded_text() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[ \t\r\n]{0,4}").expect("whitespace regex"),
        prop::string::string_regex("[A-Za-z0-9_\\- ]{0,24}").expect("token regex"),
        prop::string::string_regex("[ \t\r\n]{0,4}").expect("whitespace regex"),
    )
        .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
}

/// Strategy for JSON leaves used inside structured payloads.
fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        padded_text().prop_map(Value::String),
    ]
}

/// Strategy for decoder result objects, with or without text fields.
fn structured_payload() -> impl Strategy<Value = RawScanPayload> {
    (
        prop::option::of(json_leaf()),
        prop::option::of(json_leaf()),
        prop::collection::btree_map("[a-z]{1,8}", json_leaf(), 0..3),
    )
        .prop_map(|(decoded, text, extra)| {
            let mut map = Map::new();
            for (key, value) in extra {
                map.insert(key, value);
            }
            if let Some(decoded) = decoded {
                map.insert("decodedText".to_string(), decoded);
            }
            if let Some(text) = text {
                map.insert("text".to_string(), text);
            }
            RawScanPayload::Structured(map)
        })
}

/// Strategy covering every payload shape.
fn any_payload() -> impl Strategy<Value = RawScanPayload> {
    prop_oneof![
        padded_text().prop_map(RawScanPayload::Text),
        structured_payload(),
        Just(RawScanPayload::Empty),
        any::<i64>().prop_map(|n| RawScanPayload::Other(json!(n))),
        any::<bool>().prop_map(|b| RawScanPayload::Other(json!(b))),
    ]
}

proptest! {
    /// Property: normalizing an already-normalized value changes nothing.
    #[test]
    fn prop_normalize_is_idempotent(payload in any_payload()) {
        let once = normalize(&payload);
        let twice = normalize(&RawScanPayload::Text(once.clone()));
        prop_assert_eq!(once, twice);
    }

    /// Property: output never has surrounding whitespace.
    #[test]
    fn prop_normalize_output_is_trimmed(payload in any_payload()) {
        let normalized = normalize(&payload);
        prop_assert_eq!(normalized.trim(), normalized.as_str());
    }

    /// Property: a string and an object carrying the same text agree.
    #[test]
    fn prop_string_and_object_agree(text in padded_text()) {
        prop_assume!(!text.is_empty());

        let plain = RawScanPayload::from(text.as_str());
        let decoded = RawScanPayload::from(json!({ "decodedText": text }));
        let fallback = RawScanPayload::from(json!({ "text": text }));

        prop_assert_eq!(normalize(&plain), normalize(&decoded));
        prop_assert_eq!(normalize(&plain), normalize(&fallback));
    }

    /// Property: credentials exist exactly when normalization is non-empty.
    #[test]
    fn prop_credential_matches_normalization(payload in any_payload()) {
        let normalized = normalize(&payload);
        match Credential::from_payload(&payload) {
            Ok(credential) => prop_assert_eq!(credential.as_str(), normalized.as_str()),
            Err(error) => {
                prop_assert_eq!(error, Error::EmptyCredential);
                prop_assert!(normalized.is_empty());
            }
        }
    }
}

#[test]
fn whitespace_only_payloads_normalize_to_empty() {
    let payloads = [
        RawScanPayload::from("   "),
        RawScanPayload::from(json!({ "decodedText": " \n " })),
        RawScanPayload::Empty,
    ];

    for payload in payloads {
        assert_eq!(normalize(&payload), "");
        assert_eq!(
            Credential::from_payload(&payload),
            Err(Error::EmptyCredential)
        );
    }
}
