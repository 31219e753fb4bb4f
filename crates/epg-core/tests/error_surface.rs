use epg_core::errors::{EpgError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("pool", 1)
        .with_context("reason", "example")
}

#[test]
fn dimension_error_surface() {
    let err = EpgError::Dimension(sample_info("dimension-mismatch", "expected a time"));
    assert_eq!(err.info().code, "dimension-mismatch");
    assert!(err.info().context.contains_key("pool"));
}

#[test]
fn pool_error_surface() {
    let err = EpgError::pool("pool-kind", "exchange pulse on a single pool");
    assert_eq!(err.info().code, "pool-kind");
    assert!(err.to_string().starts_with("pool error:"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = EpgError::Gradient(
        sample_info("non-commensurate", "gradient is not a multiple of the unit")
            .with_hint("use a discrete model"),
    );
    let text = err.to_string();
    assert!(text.contains("code: non-commensurate"));
    assert!(text.contains("pool=1"));
    assert!(text.contains("hint: use a discrete model"));
}

#[test]
fn errors_round_trip_json() {
    let err = EpgError::State(sample_info("missing-order", "order not stored"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"State\""));
    let decoded: EpgError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
