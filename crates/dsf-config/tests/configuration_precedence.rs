//! Behaviour tests for the order in which configuration layers apply.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig as _;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use dsf_config::{
    Config, SocketEndpoint, default_log_filter, default_log_format, default_socket_endpoint,
};

const SOCKET_VARIABLE: &str = "DSF_SOCKET";

static ENVIRONMENT_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Arguments and environment handed to the loader, plus its cached result.
struct LayerWorld {
    scratch: TempDir,
    argv: RefCell<Vec<OsString>>,
    saved_socket: Option<OsString>,
    resolved: RefCell<Option<Result<Config, String>>>,
    _lock: MutexGuard<'static, ()>,
}

impl LayerWorld {
    fn new() -> Self {
        let lock = ENVIRONMENT_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let saved_socket = std::env::var_os(SOCKET_VARIABLE);
        // SAFETY: the lock keeps scenarios from touching the environment concurrently.
        unsafe { std::env::remove_var(SOCKET_VARIABLE) };
        Self {
            scratch: TempDir::new().expect("scratch directory"),
            argv: RefCell::new(vec![OsString::from("dsfctl")]),
            saved_socket,
            resolved: RefCell::new(None),
            _lock: lock,
        }
    }

    fn add_file_layer(&self, socket: &str) {
        let path = self.scratch.path().join("dsf.toml");
        fs::write(&path, format!("socket = \"{socket}\"\n")).expect("write dsf.toml");
        self.add_flag("--config-path", path.into_os_string());
    }

    fn add_environment_layer(&self, socket: &str) {
        // SAFETY: guarded by the environment lock held for the world's lifetime.
        unsafe { std::env::set_var(SOCKET_VARIABLE, socket) };
    }

    fn add_flag(&self, flag: &str, value: impl Into<OsString>) {
        let mut argv = self.argv.borrow_mut();
        argv.push(OsString::from(flag));
        argv.push(value.into());
    }

    fn resolve(&self) -> Config {
        let cached = self.resolved.borrow().clone();
        let outcome = cached.unwrap_or_else(|| {
            let argv = self.argv.borrow().clone();
            let loaded = Config::load_from_iter(argv).map_err(|error| error.to_string());
            *self.resolved.borrow_mut() = Some(loaded.clone());
            loaded
        });
        outcome.unwrap_or_else(|error| panic!("configuration did not load: {error}"))
    }
}

impl Drop for LayerWorld {
    fn drop(&mut self) {
        // SAFETY: the environment lock is still held; it is released after this body.
        match self.saved_socket.take() {
            Some(value) => unsafe { std::env::set_var(SOCKET_VARIABLE, value) },
            None => unsafe { std::env::remove_var(SOCKET_VARIABLE) },
        }
    }
}

#[fixture]
fn world() -> LayerWorld {
    LayerWorld::new()
}

#[given("a configuration file setting the socket to \"{socket}\"")]
fn file_sets_socket(world: &LayerWorld, socket: String) {
    world.add_file_layer(&socket);
}

#[given("the environment overrides the socket to \"{socket}\"")]
fn environment_sets_socket(world: &LayerWorld, socket: String) {
    world.add_environment_layer(&socket);
}

#[when("the CLI sets the socket to \"{socket}\"")]
fn flag_sets_socket(world: &LayerWorld, socket: String) {
    world.add_flag("--socket", socket);
}

#[when("the configuration loads without overrides")]
fn nothing_overridden(world: &LayerWorld) {
    drop(world.resolve());
}

#[then("loading the configuration resolves the socket to \"{socket}\"")]
fn socket_resolves_to(world: &LayerWorld, socket: String) {
    let expected: SocketEndpoint = socket.parse().expect("socket in feature file parses");
    assert_eq!(world.resolve().socket(), &expected);
}

#[then("loading the configuration applies the built-in defaults")]
fn defaults_apply(world: &LayerWorld) {
    let config = world.resolve();
    assert_eq!(config.socket(), &default_socket_endpoint());
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
}

#[scenario(path = "tests/features/configuration_precedence.feature")]
fn configuration_precedence(#[from(world)] world: LayerWorld) {
    drop(world);
}
