//! Tests for domain error construction and trace capture.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("no token"), ErrorCode::Unauthorized)]
#[case(Error::not_found("User not found"), ErrorCode::NotFound)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] err: Error, #[case] expected: ErrorCode) {
    assert_eq!(err.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move {
        Error::try_new(ErrorCode::InternalError, "boom")
            .expect("validation accepts non-empty message")
    })
    .await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
#[tokio::test]
async fn try_from_error_dto_clears_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let dto = ErrorDto {
        code: ErrorCode::InvalidRequest,
        message: "bad".to_owned(),
        trace_id: None,
        details: None,
    };

    let error = TraceId::scope(trace_id, async move {
        Error::try_from(dto).expect("conversion succeeds for valid payload without trace")
    })
    .await;

    assert!(error.trace_id().is_none());
}

#[rstest]
fn serialises_code_in_snake_case(expected_trace_id: String) {
    let err = Error::not_found("User not found")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "userId": "u1" }));

    let value = serde_json::to_value(&err).expect("serialise error");

    assert_eq!(
        value,
        json!({
            "code": "not_found",
            "message": "User not found",
            "traceId": expected_trace_id,
            "details": { "userId": "u1" },
        })
    );
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let payload = json!({ "code": "internal_error", "message": "  " });
    let result: Result<Error, _> = serde_json::from_value(payload);
    assert!(result.is_err());
}

#[rstest]
#[case(ErrorCode::InvalidRequest, "invalid_request")]
#[case(ErrorCode::Unauthorized, "unauthorized")]
#[case(ErrorCode::NotFound, "not_found")]
#[case(ErrorCode::InternalError, "internal_error")]
fn as_str_matches_wire_name(#[case] code: ErrorCode, #[case] expected: &str) {
    assert_eq!(code.as_str(), expected);
    assert_eq!(
        serde_json::to_value(code).expect("serialise code"),
        json!(expected)
    );
}
