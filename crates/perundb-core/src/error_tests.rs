//! Tests for `error` module.

use super::error::Error;

#[test]
fn test_error_codes_are_stable() {
    let err = Error::DimensionMismatch {
        expected: 128,
        actual: 64,
    };
    assert_eq!(err.code(), "PERUN-001");
    assert_eq!(Error::PointNotFound(7).code(), "PERUN-003");
    assert_eq!(Error::Corrupted("bad meta".into()).code(), "PERUN-006");
}

#[test]
fn test_error_messages_include_code() {
    let err = Error::KeyNotFound("doc-42".to_string());
    let msg = err.to_string();
    assert!(msg.contains("PERUN-004"));
    assert!(msg.contains("doc-42"));
}

#[test]
fn test_recoverable_classification() {
    assert!(Error::PointNotFound(1).is_recoverable());
    assert!(Error::InvalidArgument("topk must be positive".into()).is_recoverable());
    assert!(!Error::Corrupted("size mismatch".into()).is_recoverable());
    let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
    assert!(!io.is_recoverable());
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert_eq!(err.code(), "PERUN-007");
}
