//! Command dispatcher: one request line in, one response line out.
//!
//! Glues the grammar, the session state machine, and the graph store
//! together. Every client-facing string is one of the fixed responses below;
//! store errors never leak raw internal state onto the wire.

use crate::command::{self, Command};
use crate::error::{GraphError, Result};
use crate::graph::SharedGraph;
use crate::session::Session;

pub const UNSUPPORTED: &str = "SORRY, I DID NOT UNDERSTAND THAT";
pub const NODE_ADDED: &str = "NODE ADDED";
pub const NODE_REMOVED: &str = "NODE REMOVED";
pub const EDGE_ADDED: &str = "EDGE ADDED";
pub const EDGE_REMOVED: &str = "EDGE REMOVED";
pub const NODE_NOT_FOUND: &str = "ERROR: NODE NOT FOUND";
pub const NODE_ALREADY_EXISTS: &str = "ERROR: NODE ALREADY EXISTS";

/// What the connection loop should do with the dispatch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Write the line; the session stays open.
    Line(String),
    /// Write the goodbye line, then tear the connection down.
    Closing(String),
    /// Blank input line: no response, session stays alive.
    None,
}

/// Greeting written as soon as a connection is accepted.
pub fn welcome(session: &Session) -> String {
    format!("HI, I AM {}", session.id())
}

/// Goodbye used when the idle timeout fires.
///
/// Deliberately reports the configured window rather than measured elapsed
/// time: the connection observed no traffic for the whole window, so the
/// window itself is the conversation length we can vouch for. Fails with
/// `ClientNameNotRegistered` when no name was ever recorded — the caller
/// closes the connection without a wire message in that case.
pub fn timeout_farewell(session: &mut Session, window_ms: u64) -> Result<String> {
    let name = session.client_name()?.to_string();
    session.close();
    Ok(format!("BYE {}, WE SPOKE FOR {} MS", name, window_ms))
}

/// Process one request line against the session and the shared graph.
///
/// Only the protocol-sequencing error (goodbye before any name was
/// registered) surfaces as `Err`; everything else, including malformed
/// input and graph-level failures, maps to a fixed response line.
pub fn dispatch(graph: &SharedGraph, session: &mut Session, line: &str) -> Result<Reply> {
    if line.trim().is_empty() {
        return Ok(Reply::None);
    }

    let command = match command::parse(line) {
        Ok(command) => command,
        Err(GraphError::UnsupportedCommand(_)) => {
            return Ok(Reply::Line(UNSUPPORTED.to_string()));
        }
        Err(e) => return Err(e),
    };

    let reply = match command {
        Command::Greet { name } => {
            session.register_name(&name);
            Reply::Line(format!("HI {}", name))
        }

        Command::Goodbye => {
            let name = session.client_name()?.to_string();
            let elapsed = session.elapsed_ms();
            session.close();
            Reply::Closing(format!("BYE {}, WE SPOKE FOR {} MS", name, elapsed))
        }

        Command::AddNode { name } => {
            if graph.add_node(&name) {
                Reply::Line(NODE_ADDED.to_string())
            } else {
                Reply::Line(NODE_ALREADY_EXISTS.to_string())
            }
        }

        Command::RemoveNode { name } => {
            if graph.remove_node(&name) {
                Reply::Line(NODE_REMOVED.to_string())
            } else {
                Reply::Line(NODE_NOT_FOUND.to_string())
            }
        }

        Command::AddEdge {
            source,
            target,
            weight,
        } => {
            // The grammar admits 0; the graph stores positive weights only.
            if weight == 0 {
                Reply::Line(UNSUPPORTED.to_string())
            } else {
                match graph.add_edge(&source, &target, weight) {
                    Ok(()) => Reply::Line(EDGE_ADDED.to_string()),
                    Err(GraphError::NodeNotFound(_)) => Reply::Line(NODE_NOT_FOUND.to_string()),
                    Err(e) => return Err(e),
                }
            }
        }

        Command::RemoveEdge { source, target } => {
            if graph.remove_edge(&source, &target) {
                Reply::Line(EDGE_REMOVED.to_string())
            } else {
                Reply::Line(NODE_NOT_FOUND.to_string())
            }
        }

        Command::ShortestPath { source, target } => match graph.shortest_path(&source, &target) {
            Ok(distance) => Reply::Line(distance.to_string()),
            Err(GraphError::NodeNotFound(_)) => Reply::Line(NODE_NOT_FOUND.to_string()),
            Err(e) => return Err(e),
        },

        Command::CloserThan { threshold, name } => match graph.closer_than(&name, threshold) {
            Ok(names) => Reply::Line(names.join(",")),
            Err(GraphError::NodeNotFound(_)) => Reply::Line(NODE_NOT_FOUND.to_string()),
            Err(e) => return Err(e),
        },
    };

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UNREACHABLE;

    fn line(graph: &SharedGraph, session: &mut Session, input: &str) -> String {
        match dispatch(graph, session, input).unwrap() {
            Reply::Line(text) => text,
            other => panic!("expected Reply::Line, got {:?}", other),
        }
    }

    #[test]
    fn welcome_carries_session_id() {
        let session = Session::new();
        assert_eq!(welcome(&session), format!("HI, I AM {}", session.id()));
    }

    #[test]
    fn greeting_registers_name() {
        let graph = SharedGraph::new();
        let mut session = Session::new();

        assert_eq!(line(&graph, &mut session, "HI, I AM John"), "HI John");
        assert_eq!(session.client_name().unwrap(), "John");

        // A later greeting overwrites the name.
        assert_eq!(line(&graph, &mut session, "HI, I AM Jane"), "HI Jane");
        assert_eq!(session.client_name().unwrap(), "Jane");
    }

    #[test]
    fn goodbye_reports_elapsed_and_closes() {
        let graph = SharedGraph::new();
        let mut session = Session::new();
        line(&graph, &mut session, "HI, I AM John");

        let reply = dispatch(&graph, &mut session, "BYE MATE!").unwrap();
        match reply {
            Reply::Closing(text) => {
                assert!(text.starts_with("BYE John, WE SPOKE FOR "));
                assert!(text.ends_with(" MS"));
            }
            other => panic!("expected Reply::Closing, got {:?}", other),
        }
        assert!(session.is_closed());
    }

    #[test]
    fn goodbye_without_name_is_fatal() {
        let graph = SharedGraph::new();
        let mut session = Session::new();

        assert!(matches!(
            dispatch(&graph, &mut session, "BYE MATE!"),
            Err(GraphError::ClientNameNotRegistered)
        ));
    }

    #[test]
    fn timeout_farewell_uses_configured_window() {
        let mut session = Session::new();
        session.register_name("John");

        let text = timeout_farewell(&mut session, 30_000).unwrap();
        assert_eq!(text, "BYE John, WE SPOKE FOR 30000 MS");
        assert!(session.is_closed());
    }

    #[test]
    fn timeout_farewell_without_name_is_fatal() {
        let mut session = Session::new();
        assert!(matches!(
            timeout_farewell(&mut session, 30_000),
            Err(GraphError::ClientNameNotRegistered)
        ));
    }

    #[test]
    fn node_lifecycle_responses() {
        let graph = SharedGraph::new();
        let mut session = Session::new();

        assert_eq!(line(&graph, &mut session, "ADD NODE a"), NODE_ADDED);
        assert_eq!(line(&graph, &mut session, "ADD NODE a"), NODE_ALREADY_EXISTS);
        assert_eq!(line(&graph, &mut session, "REMOVE NODE a"), NODE_REMOVED);
        assert_eq!(line(&graph, &mut session, "REMOVE NODE a"), NODE_NOT_FOUND);
    }

    #[test]
    fn edge_lifecycle_responses() {
        let graph = SharedGraph::new();
        let mut session = Session::new();
        line(&graph, &mut session, "ADD NODE a");
        line(&graph, &mut session, "ADD NODE b");

        assert_eq!(line(&graph, &mut session, "ADD EDGE a b 5"), EDGE_ADDED);
        assert_eq!(line(&graph, &mut session, "ADD EDGE a ghost 5"), NODE_NOT_FOUND);
        assert_eq!(line(&graph, &mut session, "REMOVE EDGE a b"), EDGE_REMOVED);
        assert_eq!(line(&graph, &mut session, "REMOVE EDGE a b"), NODE_NOT_FOUND);
    }

    #[test]
    fn zero_weight_edge_is_unsupported() {
        let graph = SharedGraph::new();
        let mut session = Session::new();
        line(&graph, &mut session, "ADD NODE a");
        line(&graph, &mut session, "ADD NODE b");

        assert_eq!(line(&graph, &mut session, "ADD EDGE a b 0"), UNSUPPORTED);
        assert_eq!(line(&graph, &mut session, "REMOVE EDGE a b"), NODE_NOT_FOUND);
    }

    #[test]
    fn shortest_path_scenario() {
        let graph = SharedGraph::new();
        let mut session = Session::new();
        for cmd in [
            "ADD NODE A",
            "ADD NODE B",
            "ADD NODE C",
            "ADD EDGE A B 12",
            "ADD EDGE B C 4",
        ] {
            line(&graph, &mut session, cmd);
        }

        assert_eq!(line(&graph, &mut session, "SHORTEST PATH A C"), "16");
        assert_eq!(
            line(&graph, &mut session, "SHORTEST PATH C A"),
            UNREACHABLE.to_string()
        );
        assert_eq!(
            line(&graph, &mut session, "SHORTEST PATH A ghost"),
            NODE_NOT_FOUND
        );
    }

    #[test]
    fn closer_than_scenario() {
        let graph = SharedGraph::new();
        let mut session = Session::new();
        for cmd in [
            "ADD NODE A",
            "ADD NODE B",
            "ADD NODE C",
            "ADD NODE D",
            "ADD EDGE A C 10",
            "ADD EDGE A B 12",
            "ADD EDGE B D 15",
        ] {
            line(&graph, &mut session, cmd);
        }

        assert_eq!(line(&graph, &mut session, "CLOSER THAN 11 A"), "C");
        assert_eq!(line(&graph, &mut session, "CLOSER THAN 13 A"), "B,C");
        assert_eq!(line(&graph, &mut session, "CLOSER THAN 0 A"), "");
        assert_eq!(
            line(&graph, &mut session, "CLOSER THAN 5 ghost"),
            NODE_NOT_FOUND
        );
    }

    #[test]
    fn unknown_input_gets_sorry() {
        let graph = SharedGraph::new();
        let mut session = Session::new();

        assert_eq!(line(&graph, &mut session, "WHATEVER"), UNSUPPORTED);
        assert!(!session.is_closed());
    }

    #[test]
    fn blank_line_is_ignored() {
        let graph = SharedGraph::new();
        let mut session = Session::new();

        assert_eq!(dispatch(&graph, &mut session, "   ").unwrap(), Reply::None);
        assert_eq!(dispatch(&graph, &mut session, "").unwrap(), Reply::None);
        assert!(!session.is_closed());
    }
}
