//! Command grammar for the line protocol.
//!
//! One request per line. A line is split on whitespace and matched against a
//! fixed table of literal-prefix patterns with positional argument slots —
//! an explicit tokenizer rather than regexes, so every rejection path is
//! enumerable in tests. Anything that does not match a pattern's literal
//! tokens and arity is an unsupported command.

use crate::error::{GraphError, Result};

/// A parsed client command.
///
/// Weight arguments are non-negative integers at the grammar level; the
/// dispatcher rejects a zero edge weight, mirroring how the wire grammar
/// accepts `\d+` while the graph only stores positive weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HI, I AM <name>` — register (or overwrite) the client's name.
    Greet { name: String },
    /// `BYE MATE!` — end the session.
    Goodbye,
    /// `ADD NODE <name>`
    AddNode { name: String },
    /// `ADD EDGE <source> <target> <weight>`
    AddEdge {
        source: String,
        target: String,
        weight: u64,
    },
    /// `REMOVE NODE <name>`
    RemoveNode { name: String },
    /// `REMOVE EDGE <source> <target>`
    RemoveEdge { source: String, target: String },
    /// `SHORTEST PATH <source> <target>`
    ShortestPath { source: String, target: String },
    /// `CLOSER THAN <weight> <name>`
    CloserThan { threshold: u64, name: String },
}

impl Command {
    /// Stable name for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Greet { .. } => "Greet",
            Command::Goodbye => "Goodbye",
            Command::AddNode { .. } => "AddNode",
            Command::AddEdge { .. } => "AddEdge",
            Command::RemoveNode { .. } => "RemoveNode",
            Command::RemoveEdge { .. } => "RemoveEdge",
            Command::ShortestPath { .. } => "ShortestPath",
            Command::CloserThan { .. } => "CloserThan",
        }
    }
}

/// Parse one request line into a [`Command`].
///
/// Fails with [`GraphError::UnsupportedCommand`] carrying the offending line.
/// Node names may be any whitespace-free token; `split_whitespace` guarantees
/// they are non-empty.
pub fn parse(line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let command = match tokens.as_slice() {
        ["HI,", "I", "AM", name] => Command::Greet {
            name: (*name).to_string(),
        },
        ["BYE", "MATE!"] => Command::Goodbye,
        ["ADD", "NODE", name] => Command::AddNode {
            name: (*name).to_string(),
        },
        ["ADD", "EDGE", source, target, weight] => Command::AddEdge {
            source: (*source).to_string(),
            target: (*target).to_string(),
            weight: parse_weight(line, weight)?,
        },
        ["REMOVE", "NODE", name] => Command::RemoveNode {
            name: (*name).to_string(),
        },
        ["REMOVE", "EDGE", source, target] => Command::RemoveEdge {
            source: (*source).to_string(),
            target: (*target).to_string(),
        },
        ["SHORTEST", "PATH", source, target] => Command::ShortestPath {
            source: (*source).to_string(),
            target: (*target).to_string(),
        },
        ["CLOSER", "THAN", weight, name] => Command::CloserThan {
            threshold: parse_weight(line, weight)?,
            name: (*name).to_string(),
        },
        _ => return Err(GraphError::UnsupportedCommand(line.to_string())),
    };

    Ok(command)
}

/// Weight slots accept decimal digits only — a sign makes the whole line
/// unsupported, matching the `\d+` slot of the wire grammar.
fn parse_weight(line: &str, token: &str) -> Result<u64> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GraphError::UnsupportedCommand(line.to_string()));
    }
    token
        .parse::<u64>()
        .map_err(|_| GraphError::UnsupportedCommand(line.to_string()))
}
