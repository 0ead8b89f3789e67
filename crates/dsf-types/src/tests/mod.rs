//! Crate-level behavioural tests.

mod behaviour;
