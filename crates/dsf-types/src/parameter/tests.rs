use rstest::rstest;

use super::*;

fn parse(text: &str) -> Parameter {
    Parameter::parse('X', text, false, false).expect("non driver-id text always parses")
}

#[rstest]
#[case("-1", ParameterValue::Int(-1))]
#[case("42", ParameterValue::Int(42))]
#[case(" 7 ", ParameterValue::Int(7))]
#[case("", ParameterValue::Int(0))]
#[case("18446744073709551615", ParameterValue::UInt(u64::MAX))]
#[case("1.0", ParameterValue::Float(1.0))]
#[case("-0.25", ParameterValue::Float(-0.25))]
#[case("abc", ParameterValue::Text("abc".into()))]
#[case("1:2:3", ParameterValue::IntList(vec![1, 2, 3]))]
#[case("-1:2", ParameterValue::IntList(vec![-1, 2]))]
#[case("1.0:2.0", ParameterValue::FloatList(vec![1.0, 2.0]))]
#[case("18446744073709551615:1", ParameterValue::UIntList(vec![u64::MAX, 1]))]
#[case("a:b", ParameterValue::Text("a:b".into()))]
#[case("1::2", ParameterValue::Text("1::2".into()))]
#[case("1: 2", ParameterValue::Text("1: 2".into()))]
#[case("0.5 :1.5", ParameterValue::Text("0.5 :1.5".into()))]
fn infers_values_in_fallback_order(#[case] text: &str, #[case] expected: ParameterValue) {
    assert_eq!(parse(text).value(), &expected);
}

#[test]
fn any_fraction_in_a_list_selects_floats_for_every_element() {
    let parameter = parse("1:2.5");
    assert_eq!(parameter.value(), &ParameterValue::FloatList(vec![1.0, 2.5]));
    assert!(parameter.as_i64_list().is_err());
}

#[test]
fn mixed_sign_list_beyond_int64_stays_textual() {
    let parameter = parse("-1:18446744073709551615");
    assert_eq!(parameter.value().kind(), ValueKind::Text);
}

#[rstest]
#[case("-1")]
#[case("1.0")]
#[case("18446744073709551615")]
#[case("1:2:3")]
#[case("0.5:1.5")]
#[case("abc")]
#[case("  12")]
fn serialisation_reproduces_letter_and_text(#[case] text: &str) {
    let parameter = parse(text);
    assert_eq!(parameter.to_string(), format!("X{text}"));
    let reparsed = parse(parameter.as_str());
    assert_eq!(reparsed, parameter);
}

#[test]
fn strings_are_quoted_with_embedded_quotes_doubled() {
    let parameter =
        Parameter::parse('L', r#"He said "hi""#, true, false).expect("string parses");
    let rendered = parameter.to_string();
    assert_eq!(rendered, r#"L"He said ""hi""""#);

    let reparsed = Parameter::from_token(&rendered).expect("token parses");
    assert_eq!(reparsed.as_str(), r#"He said "hi""#);
    assert!(reparsed.is_string());
    assert_eq!(reparsed, parameter);
}

#[test]
fn strings_keep_surrounding_whitespace() {
    let parameter = Parameter::parse('P', " padded ", true, false).expect("string parses");
    assert_eq!(parameter.value(), &ParameterValue::Text(" padded ".into()));
}

#[rstest]
#[case(false)]
#[case(true)]
fn brace_text_is_an_unevaluated_expression(#[case] is_string: bool) {
    let parameter =
        Parameter::parse('S', "{move.axes[0].max}", is_string, false).expect("expression");
    assert!(parameter.is_expression());
    assert_eq!(parameter.as_str(), "{move.axes[0].max}");
    assert_eq!(parameter.to_string(), "S{move.axes[0].max}");
}

#[test]
fn driver_id_with_board_packs_into_unsigned() {
    let parameter = Parameter::parse('P', "2.5", false, true).expect("driver id");
    assert_eq!(parameter.as_driver_id().expect("driver id"), DriverId::new(2, 5));
    assert_eq!(parameter.as_u64().expect("packed"), 131_077);
    assert_eq!(parameter.as_u64().expect("packed"), (2 << 16) | 5);
}

#[test]
fn driver_id_without_board_defaults_to_main_board() {
    let parameter = Parameter::parse('P', "5", false, true).expect("driver id");
    assert_eq!(parameter.as_driver_id().expect("driver id"), DriverId::new(0, 5));
}

#[test]
fn driver_id_lists_split_on_colon() {
    let parameter = Parameter::parse('E', "0.1:1.2", false, true).expect("driver ids");
    assert_eq!(
        parameter.as_driver_id_list().expect("list"),
        vec![DriverId::new(0, 1), DriverId::new(1, 2)]
    );
    assert!(parameter.as_driver_id().is_err());
}

#[test]
fn invalid_driver_id_names_the_letter() {
    let error = Parameter::parse('E', "0.x", false, true).expect_err("should fail");
    assert!(matches!(error, ParameterError::InvalidDriverId { letter: 'E', .. }));
    assert!(error.to_string().contains("parameter E"));
}

#[test]
fn conversion_error_names_letter_text_and_kind() {
    let error = parse("1.5").as_i64().expect_err("float is not an integer");
    assert_eq!(
        error,
        ParameterError::Conversion {
            letter: 'X',
            value: "1.5".into(),
            kind: ValueKind::Float,
            target: "int64",
        }
    );
    assert_eq!(
        error.to_string(),
        "cannot convert parameter X to int64 (value '1.5' of type float64)"
    );
}

#[rstest]
#[case("-1", false)]
#[case("7", true)]
fn unsigned_reads_only_non_negative_integers(#[case] text: &str, #[case] succeeds: bool) {
    assert_eq!(parse(text).as_u64().is_ok(), succeeds);
}

#[test]
fn oversized_unsigned_does_not_narrow_to_signed() {
    assert!(parse("18446744073709551615").as_i64().is_err());
}

#[test]
fn integers_widen_to_float() {
    assert_eq!(parse("3").as_f64().expect("widens"), 3.0);
    assert_eq!(parse("1:2").as_f64_list().expect("widens"), vec![1.0, 2.0]);
    assert!(parse("18446744073709551615").as_f64().is_err());
}

#[test]
fn scalars_read_as_single_element_lists() {
    assert_eq!(parse("4").as_i64_list().expect("scalar"), vec![4]);
    assert_eq!(parse("4").as_u64_list().expect("scalar"), vec![4]);
    assert!(parse("-4:2").as_u64_list().is_err());
}

#[rstest]
#[case("1", true)]
#[case("true", true)]
#[case("T", true)]
#[case("0", false)]
#[case("False", false)]
fn booleans_follow_the_accepted_spellings(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(parse(text).as_bool().expect("boolean"), expected);
}

#[test]
fn unrecognised_boolean_text_fails() {
    assert!(parse("yes").as_bool().is_err());
}

#[test]
fn as_str_never_fails_and_returns_raw_text() {
    assert_eq!(parse("  12").as_str(), "  12");
    assert_eq!(parse("abc").as_str(), "abc");
}

#[test]
fn letterless_values_render_without_a_letter() {
    let parameter =
        Parameter::parse(UNPRECEDENTED_LETTER, "hello", true, false).expect("string parses");
    assert_eq!(parameter.to_string(), "\"hello\"");
    let bare = Parameter::from_token("15").expect("bare token");
    assert_eq!(bare.letter(), UNPRECEDENTED_LETTER);
    assert_eq!(bare.value(), &ParameterValue::Int(15));
}

#[test]
fn typed_constructors_render_reparseable_text() {
    assert_eq!(Parameter::float('F', 1.0).to_string(), "F1.0");
    assert_eq!(parse("1.0").value(), Parameter::float('X', 1.0).value());
    assert_eq!(Parameter::integer('S', -3).to_string(), "S-3");
    assert_eq!(Parameter::string('P', "a\"b").to_string(), "P\"a\"\"b\"");
    assert_eq!(
        Parameter::driver_id('D', DriverId::new(1, 4)).to_string(),
        "D1.4"
    );
}

#[rstest]
#[case::small_signed(Parameter::integer('S', -3))]
#[case::small_unsigned(Parameter::unsigned('P', 5))]
#[case::large_unsigned(Parameter::unsigned('P', u64::MAX))]
#[case::whole_float(Parameter::float('F', 1.0))]
#[case::exponent_float(Parameter::float('F', 1e300))]
#[case::string(Parameter::string('L', "a\"b"))]
#[case::brace_string(Parameter::string('L', "{move.axes[0]}"))]
#[case::driver(Parameter::driver_id('D', DriverId::new(1, 4)))]
fn typed_constructors_agree_with_parsing_and_the_wire(#[case] built: Parameter) {
    let reparsed = Parameter::parse(
        built.letter(),
        built.as_str(),
        built.is_string(),
        built.is_driver_id(),
    )
    .expect("constructed text parses");
    assert_eq!(reparsed, built);

    let json = serde_json::to_string(&built).expect("serialise");
    let decoded: Parameter = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(decoded, built);
}

#[test]
fn unsigned_constructor_keeps_large_values_unsigned() {
    assert_eq!(Parameter::unsigned('P', 5).value(), &ParameterValue::Int(5));
    assert_eq!(
        Parameter::unsigned('P', u64::MAX).value(),
        &ParameterValue::UInt(u64::MAX)
    );
}

#[test]
fn letter_lookup_ignores_case() {
    assert!(parse("1").has_letter('x'));
    assert!(!parse("1").has_letter('y'));
}

#[test]
fn deserialises_numeric_flags_and_text_values() {
    let parameter: Parameter = serde_json::from_str(
        r#"{"letter":"P","value":"2.5","isString":0,"isDriverId":1}"#,
    )
    .expect("parameter json");
    assert!(parameter.is_driver_id());
    assert_eq!(parameter.as_driver_id().expect("driver id"), DriverId::new(2, 5));
}

#[test]
fn serialises_raw_text_and_boolean_flags() {
    let parameter = Parameter::string('S', "abc");
    let json = serde_json::to_value(&parameter).expect("serialise");
    assert_eq!(
        json,
        serde_json::json!({
            "letter": "S",
            "value": "abc",
            "isString": true,
            "isDriverId": false,
        })
    );
}

#[test]
fn tolerates_typed_json_values() {
    let parameter: Parameter =
        serde_json::from_str(r#"{"letter":"X","value":[1,2,3]}"#).expect("parameter json");
    assert_eq!(parameter.value(), &ParameterValue::IntList(vec![1, 2, 3]));
}
