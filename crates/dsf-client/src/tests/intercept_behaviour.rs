//! Step definitions for `tests/features/interception.feature`.

use std::cell::RefCell;

use dsf_types::{Code, CodeType, MessageType};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

use crate::testing::{FakeServer, Step, accepting_handshake};
use crate::{ConnectionError, InterceptConnection, InterceptOptions};

#[derive(Default)]
struct InterceptWorld {
    server: Option<FakeServer>,
    connection: Option<InterceptConnection>,
    refusal: Option<ConnectionError>,
    pending: Option<String>,
    received: Option<Result<Vec<Value>, String>>,
}

impl InterceptWorld {
    fn intercept(&mut self, major_number: i64) {
        let code = Code::with_number(CodeType::MCode, major_number);
        let mut script = accepting_handshake(11, 9);
        script.push(Step::Send(serde_json::to_value(&code).expect("serialise code")));
        script.push(Step::Receive);
        let server = FakeServer::start(script).expect("start fake server");
        let mut connection =
            InterceptConnection::connect(server.socket_path(), InterceptOptions::default())
                .expect("connect interceptor");
        connection
            .receive_code()
            .expect("receive code")
            .expect("code present");
        self.server = Some(server);
        self.connection = Some(connection);
    }

    fn act(
        &mut self,
        action: impl FnOnce(&mut InterceptConnection) -> Result<(), ConnectionError>,
    ) {
        let connection = self.connection.as_mut().expect("interceptor connected");
        if let Err(error) = action(connection) {
            self.refusal = Some(error);
        }
        self.pending = connection.pending_code().map(str::to_owned);
    }

    fn server_messages(&mut self) -> &Result<Vec<Value>, String> {
        if self.received.is_none() {
            drop(self.connection.take());
            let server = self.server.take().expect("server started");
            self.received = Some(server.finish().map_err(|error| error.to_string()));
        }
        self.received.as_ref().expect("server finished")
    }

    fn reply(&mut self) -> Value {
        let messages = self
            .server_messages()
            .as_ref()
            .expect("server script completed");
        messages.get(1).cloned().expect("a reply after the init message")
    }
}

fn unquote(text: &str) -> &str {
    text.trim().trim_start_matches('"').trim_end_matches('"')
}

#[fixture]
fn world() -> RefCell<InterceptWorld> {
    RefCell::new(InterceptWorld::default())
}

#[given("an interceptor that received M{number}")]
fn given_intercepted(world: &RefCell<InterceptWorld>, number: i64) {
    world.borrow_mut().intercept(number);
}

#[when("the interceptor reads another code")]
fn when_reads_again(world: &RefCell<InterceptWorld>) {
    world
        .borrow_mut()
        .act(|connection| connection.receive_code().map(drop));
}

#[when("the interceptor ignores the code")]
fn when_ignores(world: &RefCell<InterceptWorld>) {
    world.borrow_mut().act(InterceptConnection::ignore_code);
}

#[when("the interceptor cancels the code")]
fn when_cancels(world: &RefCell<InterceptWorld>) {
    world.borrow_mut().act(InterceptConnection::cancel_code);
}

#[when("the interceptor resolves the code with {content}")]
fn when_resolves(world: &RefCell<InterceptWorld>, content: String) {
    let text = unquote(&content).to_owned();
    world
        .borrow_mut()
        .act(|connection| connection.resolve_code(MessageType::Success, &text));
}

#[then("the read is refused while {code} is pending")]
fn then_refused(world: &RefCell<InterceptWorld>, code: String) {
    let world = world.borrow();
    assert!(matches!(
        world.refusal.as_ref(),
        Some(ConnectionError::ResolutionPending { code: pending }) if pending == unquote(&code)
    ));
    assert_eq!(world.pending.as_deref(), Some(unquote(&code)));
}

#[then("the server receives no reply")]
fn then_no_reply(world: &RefCell<InterceptWorld>) {
    assert!(
        world.borrow_mut().server_messages().is_err(),
        "the server should still be waiting for a reply when the client hangs up"
    );
}

#[then("the server receives an {command} reply")]
fn then_reply_an(world: &RefCell<InterceptWorld>, command: String) {
    assert_reply(world, &command);
}

#[then("the server receives a {command} reply")]
fn then_reply_a(world: &RefCell<InterceptWorld>, command: String) {
    assert_reply(world, &command);
}

fn assert_reply(world: &RefCell<InterceptWorld>, command: &str) {
    let reply = world.borrow_mut().reply();
    assert_eq!(reply["command"], unquote(command));
}

#[then("the reply content is {content}")]
fn then_reply_content(world: &RefCell<InterceptWorld>, content: String) {
    let reply = world.borrow_mut().reply();
    assert_eq!(reply["content"], unquote(&content));
    assert_eq!(reply["type"], 0);
}

#[then("no code is pending")]
fn then_nothing_pending(world: &RefCell<InterceptWorld>) {
    let world = world.borrow();
    assert!(world.refusal.is_none(), "reply failed: {:?}", world.refusal);
    assert_eq!(world.pending, None);
}

#[scenario(path = "tests/features/interception.feature")]
fn intercepted_code_replies(#[from(world)] world: RefCell<InterceptWorld>) {
    drop(world);
}
