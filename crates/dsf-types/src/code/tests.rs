use insta::assert_snapshot;
use rstest::{fixture, rstest};

use super::*;
use crate::message::{Message, MessageType};
use crate::parameter::ParameterValue;

fn parameter(token: &str) -> Parameter {
    Parameter::from_token(token).expect("token parses")
}

#[fixture]
fn move_code() -> Code {
    Code {
        parameters: vec![parameter("X10"), parameter("Y-2.5"), parameter("F3000")],
        ..Code::with_number(CodeType::GCode, 1)
    }
}

#[test]
fn new_code_is_a_comment_on_the_default_channel() {
    let code = Code::new();
    assert_eq!(code.code_type, CodeType::Comment);
    assert_eq!(code.channel, CodeChannel::Sbc);
    assert!(code.flags.is_empty());
    assert_eq!(code.to_string(), ";");
}

#[rstest]
fn renders_type_number_and_parameters(move_code: Code) {
    assert_snapshot!(move_code.to_string(), @"G1 X10 Y-2.5 F3000");
}

#[rstest]
fn renders_minor_number_and_absolute_prefix(mut move_code: Code) {
    move_code.minor_number = Some(3);
    move_code.flags.insert(CodeFlags::ENFORCE_ABSOLUTE_POSITION);
    assert_eq!(move_code.short_string(), "G53 G1.3");
    assert_snapshot!(move_code.to_string(), @"G53 G1.3 X10 Y-2.5 F3000");
}

#[rstest]
fn renders_comment_and_trimmed_result(mut move_code: Code) {
    move_code.comment = Some("travel".into());
    move_code.result = Some(CodeResult::from(vec![
        Message::new(MessageType::Warning, "slow"),
        Message::new(MessageType::Success, "done"),
    ]));
    assert_eq!(
        move_code.to_string(),
        "G1 X10 Y-2.5 F3000 ;travel => Warning: slow\ndone"
    );
}

#[test]
fn renders_quoted_string_parameters() {
    let code = Code {
        parameters: vec![Parameter::string('P', "a \"b\"")],
        ..Code::with_number(CodeType::MCode, 118)
    };
    assert_snapshot!(code.to_string(), @r#"M118 P"a ""b""""#);
}

#[test]
fn renders_whole_line_comments() {
    let code = Code {
        comment: Some(" heat up".into()),
        ..Code::new()
    };
    assert_eq!(code.to_string(), "; heat up");
    assert_eq!(code.short_string(), "(comment)");
}

#[rstest]
#[case(KeywordType::If, Some("move.axes[0].homed"), "if move.axes[0].homed")]
#[case(KeywordType::ElseIf, Some("true"), "elif true")]
#[case(KeywordType::Else, None, "else")]
#[case(KeywordType::Global, Some("count = 1"), "global count = 1")]
fn renders_keyword_lines(
    #[case] keyword: KeywordType,
    #[case] argument: Option<&str>,
    #[case] expected: &str,
) {
    let code = Code {
        keyword,
        keyword_argument: argument.map(str::to_owned),
        ..Code::new()
    };
    assert_eq!(code.to_string(), expected);
    assert_eq!(code.short_string(), keyword.as_str());
}

#[rstest]
fn parameter_lookup_is_case_insensitive_first_match(mut move_code: Code) {
    move_code.parameters.push(parameter("X99"));
    let found = move_code.parameter('x').expect("x present");
    assert_eq!(found.value(), &ParameterValue::Int(10));
    assert!(move_code.has_parameter('f'));
    assert!(!move_code.has_parameter('Z'));
}

#[rstest]
fn parameter_or_falls_back_to_default(move_code: Code) {
    let fallback = Parameter::integer('S', 5);
    assert_eq!(move_code.parameter_or('S', fallback.clone()), fallback);
    assert_eq!(
        move_code.parameter_or('F', fallback).as_i64().expect("int"),
        3000
    );
}

#[rstest]
fn replace_parameter_touches_first_match_only(mut move_code: Code) {
    move_code.parameters.push(parameter("X99"));
    assert!(move_code.replace_parameter('X', Parameter::integer('X', 5)));
    assert_eq!(move_code.to_string(), "G1 X5 Y-2.5 F3000 X99");
    assert!(!move_code.replace_parameter('Z', Parameter::integer('Z', 1)));
}

#[rstest]
fn remove_parameter_drops_all_matches(mut move_code: Code) {
    move_code.parameters.push(parameter("x99"));
    let removed = move_code.remove_parameter('X').expect("removed");
    assert_eq!(removed.as_str(), "10");
    assert_eq!(move_code.to_string(), "G1 Y-2.5 F3000");
    assert!(move_code.remove_parameter('X').is_none());
}

#[rstest]
fn clones_are_independent(move_code: Code) {
    let mut copy = move_code.clone();
    copy.replace_parameter('X', Parameter::integer('X', 0));
    copy.parameters.push(parameter("E1"));
    assert_eq!(move_code.to_string(), "G1 X10 Y-2.5 F3000");
    assert_eq!(copy.to_string(), "G1 X0 Y-2.5 F3000 E1");
}

#[test]
fn unprecedented_string_skips_sentinel_letter() {
    let code = Code {
        parameters: vec![
            Parameter::parse(UNPRECEDENTED_LETTER, "Hello", true, false).expect("string"),
            parameter("S2"),
        ],
        ..Code::with_number(CodeType::MCode, 117)
    };
    assert_eq!(code.unprecedented_string(false), "Hello S2");
    assert_eq!(code.unprecedented_string(true), "\"Hello\" S2");
}

#[test]
fn flag_queries_match_any_bit() {
    let code = Code {
        flags: CodeFlags::IS_FROM_MACRO | CodeFlags::ASYNCHRONOUS,
        ..Code::new()
    };
    assert!(code.has_flag(CodeFlags::IS_FROM_MACRO));
    assert!(!code.has_flag(CodeFlags::IS_PRIORITIZED));
    assert!(Code::with_number(CodeType::TCode, 2).is_major_number(2));
}

#[test]
fn deserialises_server_code_json() {
    let json = r#"{
        "command": "Code",
        "sourceConnection": 4,
        "result": null,
        "type": "M",
        "channel": "HTTP",
        "lineNumber": null,
        "indent": 0,
        "keyword": 0,
        "keywordArgument": null,
        "majorNumber": 1234,
        "minorNumber": null,
        "flags": 2048,
        "comment": null,
        "filePosition": null,
        "length": 6,
        "parameters": [
            {"letter": "P", "value": "1.5", "isString": false, "isDriverId": false}
        ]
    }"#;
    let code: Code = serde_json::from_str(json).expect("code json");
    assert_eq!(code.code_type, CodeType::MCode);
    assert_eq!(code.channel, CodeChannel::Http);
    assert!(code.is_major_number(1234));
    assert!(code.has_flag(CodeFlags::IS_LAST_CODE));
    assert_eq!(code.source_connection, 4);
    assert_eq!(code.to_string(), "M1234 P1.5");
}

#[test]
fn serialises_keyword_numerically() {
    let code = Code {
        keyword: KeywordType::While,
        keyword_argument: Some("iterations < 3".into()),
        ..Code::new()
    };
    let json = serde_json::to_value(&code).expect("serialise");
    assert_eq!(json["keyword"], 4);
    assert_eq!(json["type"], "Q");
    assert_eq!(json["channel"], "SBC");
}

#[test]
fn rejects_unknown_keyword_numbers() {
    assert!(KeywordType::try_from(13).is_err());
    assert_eq!(KeywordType::try_from(12).ok(), Some(KeywordType::Global));
}
