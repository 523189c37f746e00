//! External-facing binary crate for the `paxoslog` protocol core: CLI
//! argument parsing, an HTTP transport (server and client), and the
//! structured logging setup used by `main`.
//!
//! Everything here is process/transport glue. No protocol logic lives in
//! this crate — it all comes from `paxoslog`.

pub mod client;
pub mod config;
pub mod http;
pub mod logging;
