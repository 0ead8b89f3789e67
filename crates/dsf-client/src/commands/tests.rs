use dsf_types::{
    AccessLevel, Code, CodeChannel, CodeType, HttpEndpointType, LogLevel, MessageType, SessionType,
};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::error::TASK_CANCELED_EXCEPTION;

fn response(value: Value) -> Response<Value> {
    serde_json::from_value(value).expect("response decodes")
}

#[test]
fn envelope_puts_command_first() {
    let request = SimpleCode::new("G28", CodeChannel::Http);
    let message = envelope(&request).expect("envelope");
    let keys: Vec<&str> = message
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(keys, ["command", "code", "channel"]);
    assert_eq!(
        message,
        json!({ "command": "SimpleCode", "code": "G28", "channel": "HTTP" })
    );
}

#[rstest]
#[case::unit(envelope(&SyncObjectModel), json!({ "command": "SyncObjectModel" }))]
#[case::acknowledge(envelope(&Acknowledge), json!({ "command": "Acknowledge" }))]
#[case::resolve(
    envelope(&Resolve::new(MessageType::Warning, "skipped")),
    json!({ "command": "Resolve", "type": 1, "content": "skipped" })
)]
#[case::endpoint(
    envelope(&AddHttpEndpoint {
        endpoint_type: HttpEndpointType::Post,
        namespace: "demo".to_owned(),
        path: "upload".to_owned(),
        is_upload_request: true,
    }),
    json!({
        "command": "AddHttpEndpoint",
        "endpointType": "POST",
        "namespace": "demo",
        "path": "upload",
        "isUploadRequest": true,
    })
)]
#[case::generic(
    envelope(&GetObjectModel::<Value>::default()),
    json!({ "command": "GetObjectModel" })
)]
#[case::file_info(
    envelope(&GetFileInfo::<Value>::new("0:/gcodes/part.gcode")),
    json!({ "command": "GetFileInfo", "fileName": "0:/gcodes/part.gcode" })
)]
fn requests_use_server_field_names(
    #[case] message: Result<Value, crate::error::ConnectionError>,
    #[case] expected: Value,
) {
    assert_eq!(message.expect("envelope"), expected);
}

#[test]
fn write_message_omits_missing_log_level() {
    let quiet = envelope(&WriteMessage::new(MessageType::Success, "hi", None)).expect("envelope");
    assert_eq!(quiet.get("logLevel"), None);
    assert_eq!(quiet["logMessage"], false);

    let warning = WriteMessage::new(MessageType::Error, "hot", Some(LogLevel::Warn));
    let logged = envelope(&warning).expect("envelope");
    assert_eq!(logged["logLevel"], "warn");
    assert_eq!(logged["logMessage"], true);
}

#[test]
fn user_session_origin_defaults_to_process_id() {
    let request = AddUserSession::new(AccessLevel::ReadOnly, SessionType::Http, "10.0.0.2", -1);
    assert_eq!(request.origin_id, i64::from(std::process::id()));
    let kept = AddUserSession::new(AccessLevel::ReadWrite, SessionType::Telnet, "x", 23);
    assert_eq!(kept.origin_id, 23);
}

#[test]
fn code_requests_carry_parsed_fields() {
    let code = Code::with_number(CodeType::GCode, 28);
    let message = envelope(&code).expect("envelope");
    assert_eq!(message["command"], "Code");
    assert_eq!(message["type"], "G");
    assert_eq!(message["majorNumber"], 28);
}

#[test]
fn successful_response_decodes_result() {
    let output = response(json!({ "success": true, "result": "ok\n" }))
        .into_output::<SimpleCode>()
        .expect("output");
    assert_eq!(output, "ok\n");
}

#[test]
fn missing_result_is_accepted_for_optional_outputs() {
    let flushed = response(json!({ "success": true }))
        .into_output::<Flush>()
        .expect("flush output");
    assert_eq!(flushed, None);
    let code = response(json!({ "success": true, "result": null }))
        .into_output::<Code>()
        .expect("code output");
    assert_eq!(code, None);
}

#[test]
fn failed_response_keeps_partial_result() {
    let error = response(json!({
        "success": false,
        "result": "partial",
        "errorType": TASK_CANCELED_EXCEPTION,
        "errorMessage": "m",
    }))
    .into_output::<SimpleCode>()
    .expect_err("failure");
    let command = error.as_command_error().expect("command error");
    assert!(command.is_cancelled());
    assert_eq!(command.command(), "SimpleCode");
    assert_eq!(command.response().result, Some(json!("partial")));
    assert_eq!(command.error_message(), "m");
}

#[test]
fn mistyped_result_is_a_decode_error() {
    let error = response(json!({ "success": true, "result": 5 }))
        .into_output::<ResolvePath>()
        .expect_err("mistyped");
    assert!(matches!(
        error,
        crate::error::ConnectionError::Decode { .. }
    ));
}
