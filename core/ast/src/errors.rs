//! Error types for the AST crate.
//!
//! Builder diagnostics are recorded per node and never abort a build. Only a root
//! node of the wrong kind is returned as an error from the builder entry point.

use thiserror::Error;

#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// A parse-tree shape with no matching builder rule.
    #[error("{path}:{line}:{column}: unrecognized {context} construct `{kind}`")]
    UnrecognizedConstruct {
        path: String,
        line: u32,
        column: u32,
        context: &'static str,
        kind: String,
    },

    /// A tree-sitter ERROR or MISSING node.
    #[error("{path}:{line}:{column}: syntax error near `{snippet}`")]
    SyntaxError {
        path: String,
        line: u32,
        column: u32,
        snippet: String,
    },

    /// A numeric or string literal that cannot be decoded.
    #[error("{path}:{line}:{column}: malformed literal `{literal}`: {reason}")]
    MalformedLiteral {
        path: String,
        line: u32,
        column: u32,
        literal: String,
        reason: String,
    },

    /// A structurally required child is absent, or the input root has the wrong kind.
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// A typed-struct envelope whose URL does not name a known node kind.
    #[error("unknown type url `{type_url}`")]
    UnknownTypeUrl { type_url: String },

    /// A typed-struct envelope whose URL disagrees with the payload it carries.
    #[error("type url names `{expected}` but the payload is `{found}`")]
    TypeUrlMismatch { expected: String, found: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
