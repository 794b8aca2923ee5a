//! graphline — multi-client TCP server over a shared directed weighted graph.
//!
//! Clients speak a newline-delimited text protocol: a greeting, an optional
//! `HI, I AM <name>` introduction, graph mutation and query commands, and a
//! goodbye (explicit `BYE MATE!` or idle timeout). All sessions mutate and
//! query one process-wide [`graph::SharedGraph`].
//!
//! The `graphline-server` binary wires a [`server::Server`] to a port; the
//! library exposes every layer (grammar, dispatcher, store, session) for
//! direct use in tests.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use error::{GraphError, Result};
pub use graph::{DirectedGraph, SharedGraph, UNREACHABLE};
pub use server::Server;
