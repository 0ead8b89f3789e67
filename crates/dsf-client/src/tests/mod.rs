//! Behaviour suites for the client connections.

mod handshake_behaviour;
mod intercept_behaviour;
