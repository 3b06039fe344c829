use super::*;

#[test]
fn rejects_empty_owner_id() {
    let err = RegistryConfig::new("", "txt.", "", "", "", Duration::from_secs(0), false).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyOwnerId));
}

#[test]
fn rejects_prefix_and_suffix_both_set() {
    let err = RegistryConfig::new("owner", "txt.", "-txt", "", "", Duration::from_secs(0), false)
        .unwrap_err();
    assert!(matches!(err, ConfigError::PrefixAndSuffixSet));
}

#[test]
fn accepts_empty_aes_key() {
    let cfg =
        RegistryConfig::new("owner", "txt.", "", "", "", Duration::from_secs(0), false).unwrap();
    assert!(cfg.aes_key().is_none());
}

#[test]
fn accepts_raw_32_byte_key() {
    let key = "x".repeat(32);
    let cfg =
        RegistryConfig::new("owner", "txt.", "", "", &key, Duration::from_secs(0), false).unwrap();
    assert_eq!(cfg.aes_key().unwrap().len(), 32);
}

#[test]
fn accepts_base64_32_byte_key() {
    let raw = [9u8; 32];
    let encoded = STANDARD.encode(raw);
    let cfg = RegistryConfig::new(
        "owner",
        "txt.",
        "",
        "",
        &encoded,
        Duration::from_secs(0),
        false,
    )
    .unwrap();
    assert_eq!(cfg.aes_key().unwrap(), raw);
}

#[test]
fn legacy_compat_flag_is_threaded_through() {
    let cfg = RegistryConfig::new("owner", "txt.", "", "", "", Duration::from_secs(0), true).unwrap();
    assert!(cfg.legacy_compat);
}

#[test]
fn rejects_wrong_length_key() {
    let err = normalize_aes_key("too-short").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidAesKeyLength(_)));
}
