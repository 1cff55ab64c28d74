//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug,
//! Clone, std::error::Error) plus the engine_err!/engine_bail! macros.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("device creation failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("device creation failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("texture not built".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("texture not built"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("no device".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("no device"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    assert!(format!("{:?}", Error::BackendError("x".to_string())).contains("BackendError"));
    assert!(format!("{:?}", Error::OutOfMemory).contains("OutOfMemory"));
    assert!(format!("{:?}", Error::InvalidResource("x".to_string())).contains("InvalidResource"));
    assert!(
        format!("{:?}", Error::InitializationFailed("x".to_string()))
            .contains("InitializationFailed")
    );
}

#[test]
fn test_error_clone() {
    let err1 = Error::InvalidResource("clip length mismatch".to_string());
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));
}

// ============================================================================
// RESULT TYPE AND PROPAGATION TESTS
// ============================================================================

#[test]
fn test_result_type_ok() {
    fn returns_ok() -> Result<i32> {
        Ok(42)
    }
    assert_eq!(returns_ok().unwrap(), 42);
}

#[test]
fn test_error_propagation_with_question_mark() {
    fn inner() -> Result<i32> {
        Err(Error::OutOfMemory)
    }

    fn outer() -> Result<i32> {
        inner()?;
        Ok(42)
    }

    assert!(outer().is_err());
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
fn test_engine_err_builds_backend_error() {
    let err = crate::engine_err!("ember::test", "lock failed on handle {}", 7);
    match err {
        Error::BackendError(msg) => assert!(msg.contains("lock failed on handle 7")),
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_engine_bail_returns_early() {
    fn bails() -> Result<()> {
        crate::engine_bail!("ember::test", "forced failure");
    }
    assert!(bails().is_err());
}
