//! Step definitions for `tests/features/handshake.feature`.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use crate::testing::{FakeServer, Step, accepting_handshake, handshake};
use crate::{CommandConnection, ConnectionError, PROTOCOL_VERSION};

const CONNECTION_ID: i64 = 5;

#[derive(Default)]
struct HandshakeWorld {
    server: Option<FakeServer>,
    outcome: Option<Result<CommandConnection, ConnectionError>>,
}

impl HandshakeWorld {
    fn received(&mut self) -> Vec<Value> {
        drop(self.outcome.take());
        self.server
            .take()
            .expect("server started")
            .finish()
            .expect("server script completed")
    }
}

#[fixture]
fn world() -> RefCell<HandshakeWorld> {
    RefCell::new(HandshakeWorld::default())
}

#[given("a control server speaking protocol version {version}")]
fn given_server(world: &RefCell<HandshakeWorld>, version: i64) {
    let script = if version < PROTOCOL_VERSION {
        vec![Step::Send(handshake(version, CONNECTION_ID))]
    } else {
        accepting_handshake(version, CONNECTION_ID)
    };
    world.borrow_mut().server = Some(FakeServer::start(script).expect("start fake server"));
}

#[when("a command connection is opened")]
fn when_opened(world: &RefCell<HandshakeWorld>) {
    let mut world = world.borrow_mut();
    let outcome = {
        let server = world.server.as_ref().expect("server started");
        CommandConnection::connect(server.socket_path())
    };
    world.outcome = Some(outcome);
}

#[then("opening fails with an incompatible version error")]
fn then_incompatible(world: &RefCell<HandshakeWorld>) {
    let world = world.borrow();
    let Some(Err(error)) = world.outcome.as_ref() else {
        panic!("expected the handshake to fail");
    };
    assert!(error.is_incompatible_version());
    assert!(error.is_protocol());
}

#[then("the server receives nothing")]
fn then_nothing_sent(world: &RefCell<HandshakeWorld>) {
    assert!(world.borrow_mut().received().is_empty());
}

#[then("the connection is ready with id {id}")]
fn then_ready(world: &RefCell<HandshakeWorld>, id: i64) {
    let world = world.borrow();
    let Some(Ok(connection)) = world.outcome.as_ref() else {
        panic!("expected the handshake to succeed");
    };
    assert_eq!(connection.inner().id(), id);
}

#[then("the server receives the command init message")]
fn then_init_sent(world: &RefCell<HandshakeWorld>) {
    assert_eq!(
        world.borrow_mut().received(),
        [json!({ "mode": "Command", "version": PROTOCOL_VERSION })]
    );
}

#[scenario(path = "tests/features/handshake.feature")]
fn connection_handshake(#[from(world)] world: RefCell<HandshakeWorld>) {
    drop(world);
}
