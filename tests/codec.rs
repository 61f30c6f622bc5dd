mod common;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use common::{
    codec_with, in_seconds, keys, other_keys, signing_codec, signing_config, verifying_config,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use keystamp::{
    AccessToken, Codec, Config, InvalidTokenKind, SerializationError, SigningAlgorithm, TokenError,
};
use serde_json::{Value, json};

fn sample_token() -> AccessToken {
    AccessToken::new("user-1", in_seconds(3600))
        .with_id("abc-123")
        .with_issuer("accounts")
        .with_scope("manage")
}

fn forge(header: &Header, claims: &Value, key: &EncodingKey) -> String {
    encode(header, claims, key).expect("Failed to sign test token")
}

#[test]
fn test_round_trip() {
    let codec = signing_codec();
    let token = sample_token();

    let decoded = codec.decode_and_verify(&codec.serialize(&token).unwrap()).unwrap();

    assert_eq!(decoded.id(), Some("abc-123"));
    assert_eq!(decoded.issuer(), Some("accounts"));
    assert_eq!(decoded.subject(), Some("user-1"));
    assert_eq!(decoded.scope(), Some("manage"));
    assert_eq!(decoded.expires_at(), token.expires_at());
    assert!(decoded.actor().is_none());
    assert!(decoded.attributes().is_empty());
}

#[test]
fn test_round_trip_with_nested_actors() {
    let codec = signing_codec();
    let token = sample_token()
        .with_actor(
            AccessToken::default()
                .with_subject("support-agent")
                .with_actor(AccessToken::default().with_subject("admin"))
                .with_attribute("team", "tier-2")
                .unwrap(),
        )
        .with_attribute("org", "acme")
        .unwrap();

    let decoded = codec.decode_and_verify(&codec.serialize(&token).unwrap()).unwrap();

    let actor = decoded.actor().expect("actor survives");
    assert_eq!(actor.subject(), Some("support-agent"));
    assert_eq!(actor.attribute("team").unwrap(), json!("tier-2"));
    assert_eq!(actor.actor().and_then(AccessToken::subject), Some("admin"));
    assert!(actor.raw().is_none());

    assert_eq!(decoded.attribute("org").unwrap(), json!("acme"));
    assert_eq!(decoded.attributes().keys().collect::<Vec<_>>(), ["org"]);
}

#[test]
fn test_wire_claim_names() {
    let codec = signing_codec();
    let token = sample_token().with_actor(AccessToken::default().with_subject("admin"));
    let raw = codec.serialize(&token).unwrap();

    let payload = raw.split('.').nth(1).unwrap();
    let claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

    assert_eq!(claims["id"], "abc-123");
    assert_eq!(claims["iss"], "accounts");
    assert_eq!(claims["sub"], "user-1");
    assert_eq!(claims["scope"], "manage");
    assert_eq!(claims["exp"], json!(token.expires_at().unwrap().timestamp()));
    assert_eq!(claims["act"], json!({"sub": "admin"}));
    assert!(claims.get("subject").is_none());
}

#[test]
fn test_serialize_is_idempotent() {
    let codec = signing_codec();
    let token = sample_token();

    let first = codec.serialize(&token).unwrap();
    assert_eq!(first, codec.serialize(&token).unwrap());

    let decoded = AccessToken::decode(&first, &codec).unwrap();
    assert_eq!(decoded.raw(), Some(first.as_str()));
    assert_eq!(decoded.serialize(&codec).unwrap(), first);
    assert_eq!(decoded.serialize(&codec).unwrap(), first);
}

#[test]
fn test_mutation_invalidates_cached_string() {
    let codec = signing_codec();
    let raw = codec.serialize(&sample_token()).unwrap();

    let mut decoded = codec.decode_and_verify(&raw).unwrap();
    decoded.set_scope(Some("read".to_string()));
    assert!(decoded.raw().is_none());

    let reissued = codec.serialize(&decoded).unwrap();
    assert_ne!(reissued, raw);
    assert_eq!(
        codec.decode_and_verify(&reissued).unwrap().scope(),
        Some("read")
    );
}

#[test]
fn test_tampered_claims_are_rejected() {
    let codec = signing_codec();
    let raw = codec.serialize(&sample_token()).unwrap();
    let parts: Vec<&str> = raw.split('.').collect();

    for position in 0..parts[1].len() {
        let mut payload = parts[1].as_bytes().to_vec();
        payload[position] = if payload[position] == b'A' { b'B' } else { b'A' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            String::from_utf8(payload).unwrap(),
            parts[2]
        );

        let result = codec.decode_and_verify(&tampered);
        assert!(
            matches!(result, Err(TokenError::InvalidToken(_))),
            "byte {position} tampered: {result:?}"
        );
    }
}

#[test]
fn test_token_signed_with_other_key_is_rejected() {
    let forger = Codec::new(&Config::default().with_private_key(other_keys().private_pem.clone()));
    let raw = forger.serialize(&sample_token()).unwrap();

    assert!(matches!(
        signing_codec().decode_and_verify(&raw),
        Err(TokenError::InvalidToken(InvalidTokenKind::Signature))
    ));
}

#[test]
fn test_alg_none_is_rejected() {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = json!({"sub": "user-1", "exp": in_seconds(3600).timestamp()});
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

    for raw in [format!("{header}.{payload}."), format!("{header}.{payload}")] {
        assert!(matches!(
            signing_codec().decode_and_verify(&raw),
            Err(TokenError::InvalidToken(_))
        ));
    }
}

#[test]
fn test_other_rsa_algorithm_is_rejected() {
    let rs256 = codec_with(SigningAlgorithm::RS256);
    let rs512 = codec_with(SigningAlgorithm::RS512);
    let raw = rs256.serialize(&sample_token()).unwrap();

    assert!(rs256.decode_and_verify(&raw).is_ok());
    assert!(matches!(
        rs512.decode_and_verify(&raw),
        Err(TokenError::InvalidToken(InvalidTokenKind::Algorithm))
    ));
}

#[test]
fn test_hmac_with_public_key_as_secret_is_rejected() {
    // Classic confusion: HS256 keyed with the verifier's public key
    let claims = json!({"sub": "user-1", "exp": in_seconds(3600).timestamp()});
    let raw = forge(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(keys().public_pem.as_bytes()),
    );

    assert!(matches!(
        signing_codec().decode_and_verify(&raw),
        Err(TokenError::InvalidToken(InvalidTokenKind::Algorithm))
    ));
}

#[test]
fn test_expired_token() {
    let codec = signing_codec();
    let token = AccessToken::new("user-1", in_seconds(-60));
    let raw = codec.serialize(&token).unwrap();

    let err = codec.decode_and_verify(&raw).unwrap_err();
    assert!(matches!(err, TokenError::ExpiredToken));
    assert!(err.is_expired());
}

#[test]
fn test_leeway_accepts_recently_expired_token() {
    let mut config = signing_config();
    config.leeway_seconds = 300;
    let codec = Codec::new(&config);

    let raw = codec.serialize(&AccessToken::new("user-1", in_seconds(-60))).unwrap();
    let decoded = codec.decode_and_verify(&raw).unwrap();
    // Leeway only affects decoding; the token itself still reads as expired
    assert!(decoded.is_expired());
}

#[test]
fn test_missing_expiry_fails_at_build_time() {
    let token = AccessToken::default().with_subject("user-1");
    assert!(matches!(
        signing_codec().serialize(&token),
        Err(TokenError::Serialization(SerializationError::MissingAttribute("expires_at")))
    ));
}

#[test]
fn test_pre_epoch_expiry_is_refused_before_signing() {
    let token = AccessToken::new("s1", chrono::DateTime::from_timestamp(-10, 0).unwrap());
    assert!(matches!(
        signing_codec().serialize(&token),
        Err(TokenError::Serialization(SerializationError::PreEpochExpiry))
    ));
}

#[test]
fn test_missing_subject() {
    let token = AccessToken::default().with_expires_at(in_seconds(3600));
    let err = signing_codec().serialize(&token).unwrap_err();

    assert!(matches!(
        err,
        TokenError::Serialization(SerializationError::MissingAttribute("subject"))
    ));
    assert!(err.to_string().contains("subject"));
}

#[test]
fn test_rs512_example() {
    let codec = Codec::new(&signing_config().with_algorithm(SigningAlgorithm::RS512));
    let expected_exp = chrono::Utc::now().timestamp() + 3600;
    let token = AccessToken::new("s1", chrono::Utc::now() + chrono::Duration::seconds(3600));

    let raw = codec.serialize(&token).unwrap();
    let header = jsonwebtoken::decode_header(&raw).unwrap();
    assert_eq!(header.alg, Algorithm::RS512);

    let verifier = Codec::new(&verifying_config());
    let decoded = verifier.decode_and_verify(&raw).unwrap();
    assert_eq!(decoded.subject(), Some("s1"));
    let exp = decoded.expires_at().unwrap().timestamp();
    assert!((exp - expected_exp).abs() <= 1, "exp {exp} vs {expected_exp}");
}

#[test]
fn test_public_key_only_cannot_sign() {
    let verifier = Codec::new(&verifying_config());
    assert!(verifier.can_verify());
    assert!(!verifier.can_sign());
    assert!(matches!(
        verifier.serialize(&sample_token()),
        Err(TokenError::Serialization(SerializationError::NoSigningKey))
    ));
}

#[test]
fn test_pkcs1_public_key_verifies() {
    let raw = signing_codec().serialize(&sample_token()).unwrap();
    let verifier = Codec::new(&Config::default().with_public_key(keys().public_pkcs1_pem.clone()));
    assert!(verifier.decode_and_verify(&raw).is_ok());
}

#[test]
fn test_private_key_wins_over_mismatched_public_key() {
    let config = signing_config().with_public_key(other_keys().public_pem.clone());
    let codec = Codec::new(&config);

    let raw = codec.serialize(&sample_token()).unwrap();
    assert!(codec.decode_and_verify(&raw).is_ok());
}

#[test]
fn test_non_string_subject_is_malformed() {
    let claims = json!({"sub": 42, "exp": in_seconds(3600).timestamp()});
    let raw = forge(
        &Header::new(Algorithm::RS512),
        &claims,
        &common::encoding_key(),
    );

    assert!(matches!(
        signing_codec().decode_and_verify(&raw),
        Err(TokenError::InvalidToken(InvalidTokenKind::Malformed(_)))
    ));
}

#[test]
fn test_string_exp_on_the_wire_is_rejected() {
    let claims = json!({"sub": "user-1", "exp": "2030-01-01T00:00:00Z"});
    let raw = forge(&Header::new(Algorithm::RS512), &claims, &common::encoding_key());

    assert!(matches!(
        signing_codec().decode_and_verify(&raw),
        Err(TokenError::InvalidToken(_))
    ));
}

#[test]
fn test_null_extras_are_dropped() {
    let claims = json!({
        "sub": "user-1",
        "exp": in_seconds(3600).timestamp(),
        "org": "acme",
        "unit": null,
    });
    let raw = forge(
        &Header::new(Algorithm::RS512),
        &claims,
        &common::encoding_key(),
    );

    let decoded = signing_codec().decode_and_verify(&raw).unwrap();
    assert_eq!(decoded.attribute("org").unwrap(), json!("acme"));
    assert!(matches!(
        decoded.attribute("unit"),
        Err(TokenError::UnknownAttribute(_))
    ));
}

#[test]
fn test_deeply_nested_actors_are_rejected() {
    let mut claims = json!({"sub": "bottom"});
    for depth in 0..40 {
        claims = json!({"sub": format!("actor-{depth}"), "act": claims});
    }
    claims["exp"] = json!(in_seconds(3600).timestamp());

    let raw = forge(
        &Header::new(Algorithm::RS512),
        &claims,
        &common::encoding_key(),
    );

    assert!(matches!(
        signing_codec().decode_and_verify(&raw),
        Err(TokenError::InvalidToken(InvalidTokenKind::ActorDepth))
    ));
}
