//! Step definitions for `tests/features/parameter_parsing.feature`.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{Parameter, ParameterError};

#[derive(Default)]
struct TestWorld {
    letter: Option<char>,
    raw: String,
    is_string: bool,
    is_driver_id: bool,
    outcome: Option<Result<Parameter, ParameterError>>,
}

impl TestWorld {
    fn prepare(&mut self, letter: char, raw: &str, is_string: bool, is_driver_id: bool) {
        self.letter = Some(letter);
        self.raw = unquote(raw).to_owned();
        self.is_string = is_string;
        self.is_driver_id = is_driver_id;
    }

    fn parameter(&self) -> &Parameter {
        match self.outcome.as_ref().expect("parameter parsed") {
            Ok(parameter) => parameter,
            Err(error) => panic!("parse failed: {error}"),
        }
    }
}

/// Strips one pair of surrounding quotes, leaving embedded ones intact.
fn unquote(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(trimmed)
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

#[given("parameter {letter} with raw text {raw}")]
fn given_parameter(world: &RefCell<TestWorld>, letter: char, raw: String) {
    world.borrow_mut().prepare(letter, &raw, false, false);
}

#[given("driver parameter {letter} with raw text {raw}")]
fn given_driver_parameter(world: &RefCell<TestWorld>, letter: char, raw: String) {
    world.borrow_mut().prepare(letter, &raw, false, true);
}

#[given("string parameter {letter} with raw text {raw}")]
fn given_string_parameter(world: &RefCell<TestWorld>, letter: char, raw: String) {
    world.borrow_mut().prepare(letter, &raw, true, false);
}

#[when("the parameter is parsed")]
fn when_parsed(world: &RefCell<TestWorld>) {
    let mut world = world.borrow_mut();
    let letter = world.letter.expect("letter configured");
    let outcome = Parameter::parse(letter, world.raw.clone(), world.is_string, world.is_driver_id);
    world.outcome = Some(outcome);
}

#[then("the stored kind is {kind}")]
fn then_kind(world: &RefCell<TestWorld>, kind: String) {
    let world = world.borrow();
    assert_eq!(world.parameter().value().kind().to_string(), unquote(&kind));
}

#[then("the parameter renders as {text}")]
fn then_renders(world: &RefCell<TestWorld>, text: String) {
    assert_eq!(world.borrow().parameter().to_string(), unquote(&text));
}

#[then("reading it as int64 fails naming {letter}")]
fn then_int_fails(world: &RefCell<TestWorld>, letter: String) {
    let world = world.borrow();
    let error = world.parameter().as_i64().expect_err("int64 conversion fails");
    assert!(matches!(
        error,
        ParameterError::Conversion { letter: found, .. } if found.to_string() == unquote(&letter)
    ));
}

#[then("the unsigned value is {value}")]
fn then_unsigned(world: &RefCell<TestWorld>, value: u64) {
    assert_eq!(world.borrow().parameter().as_u64().expect("uint64"), value);
}

#[then("parsing fails naming {letter}")]
fn then_parse_fails(world: &RefCell<TestWorld>, letter: String) {
    let world = world.borrow();
    let Some(Err(error)) = world.outcome.as_ref() else {
        panic!("expected a parse failure");
    };
    assert!(matches!(
        error,
        ParameterError::InvalidDriverId { letter: found, .. }
            if found.to_string() == unquote(&letter)
    ));
}

#[then("reparsing the rendered text yields the same raw text")]
fn then_reparses(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    let rendered = world.parameter().to_string();
    let reparsed = Parameter::from_token(&rendered).expect("rendered token parses");
    assert_eq!(reparsed.as_str(), world.raw);
    assert!(reparsed.is_string());
}

#[scenario(path = "tests/features/parameter_parsing.feature")]
fn parameter_parsing_behaviour(world: RefCell<TestWorld>) {
    drop(world);
}
