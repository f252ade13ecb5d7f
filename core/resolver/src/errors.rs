use std::fmt::{self, Display, Formatter};

use solgraph_ast::nodes::NodeId;
use thiserror::Error;

/// What kind of reference could not be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Identifier,
    Member,
    TypeName,
    IdentifierPath,
    YulIdentifier,
    Import,
}

impl Display for ReferenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Identifier => write!(f, "identifier"),
            ReferenceKind::Member => write!(f, "member"),
            ReferenceKind::TypeName => write!(f, "type name"),
            ReferenceKind::IdentifierPath => write!(f, "identifier path"),
            ReferenceKind::YulIdentifier => write!(f, "assembly identifier"),
            ReferenceKind::Import => write!(f, "import"),
        }
    }
}

/// A name with no matching declaration in scope.
///
/// Unresolved references are collected and returned by the resolver; they never
/// stop resolution of the rest of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}:{line}:{column}: unresolved {kind} `{name}`")]
pub struct UnresolvedReference {
    /// The node carrying the name.
    pub id: NodeId,
    pub name: String,
    pub kind: ReferenceKind,
    pub path: String,
    pub line: u32,
    pub column: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_location_and_kind() {
        let error = UnresolvedReference {
            id: 12,
            name: "missing".to_string(),
            kind: ReferenceKind::Identifier,
            path: "/contracts/C.sol".to_string(),
            line: 4,
            column: 8,
        };
        assert_eq!(
            error.to_string(),
            "/contracts/C.sol:4:8: unresolved identifier `missing`"
        );
    }
}
