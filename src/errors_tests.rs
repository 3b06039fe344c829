use super::*;

#[test]
fn store_error_remote_transient_is_transient() {
    let err = StoreError::RemoteTransient("throttled".into());
    assert!(err.is_transient());
    assert_eq!(err.status_reason(), "RemoteTransient");
}

#[test]
fn store_error_remote_fatal_is_not_transient() {
    let err = StoreError::RemoteFatal("schema violation".into());
    assert!(!err.is_transient());
    assert_eq!(err.status_reason(), "RemoteFatal");
}

#[test]
fn registry_error_wraps_store_transience() {
    let err: RegistryError = StoreError::DuplicateClaim("foo#A#".into()).into();
    assert!(!err.is_transient());
    assert_eq!(err.status_reason(), "DuplicateClaim");

    let transient: RegistryError = StoreError::RemoteTransient("timeout".into()).into();
    assert!(transient.is_transient());
}

#[test]
fn config_error_messages_are_descriptive() {
    let err = ConfigError::InvalidAesKeyLength(10);
    assert!(err.to_string().contains("32 bytes"));
}
