use crate::RedactedSecret;

/// **VALUE**: Verifies the connection secret never appears in Debug or Display output.
///
/// **WHY THIS MATTERS**: The connection string grants full access to the messaging
/// account. Launch errors and debug logs format the credentials struct; a leak
/// there ends up in log files.
///
/// **BUG THIS CATCHES**: Would catch if someone replaces the manual Debug impl
/// with `#[derive(Debug)]`.
#[test]
fn given_secret_when_formatted_then_value_is_redacted() {
    // GIVEN: A secret connection string
    let secret = RedactedSecret::new("endpoint=https://x;accesskey=SUPERSECRET");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{secret:?}");
    let display = format!("{secret}");

    // THEN: Neither contains the value
    assert!(!debug.contains("SUPERSECRET"));
    assert!(!display.contains("SUPERSECRET"));
    assert!(debug.contains("REDACTED"));
}

/// **VALUE**: Verifies serialization is refused instead of writing the secret.
///
/// **BUG THIS CATCHES**: Would catch if the custom Serialize impl is replaced by a derive.
#[test]
fn given_secret_when_serialized_then_returns_error() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("accesskey=abc");

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&secret);

    // THEN: Should fail with a message pointing at expose()
    let err = result.expect_err("serialization must fail");
    assert!(err.to_string().contains("cannot be serialized"));
}

#[test]
fn given_secret_when_exposed_then_returns_original_value() {
    let secret = RedactedSecret::new("accesskey=abc");

    assert_eq!(secret.expose(), "accesskey=abc");
    assert_eq!(secret.len(), 13);
    assert!(!secret.is_empty());
}

#[test]
fn given_whitespace_secret_when_checked_then_is_empty() {
    assert!(RedactedSecret::new("   ").is_empty());
}
