use serde::{Deserialize, Serialize};

use crate::errors::AstError;
use crate::nodes::{AstNode, NodeType};

const TYPE_URL_PREFIX: &str = "type.solgraph.dev/solgraph.ast.";

/// A single node wrapped with a URL naming its kind.
///
/// `value` is the JSON encoding of the node and is treated as opaque bytes by
/// anything that only routes envelopes.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TypedStruct {
    pub type_url: String,
    pub value: Vec<u8>,
}

/// `type.solgraph.dev/solgraph.ast.<Kind>` for a node kind.
#[must_use]
pub fn type_url(node_type: NodeType) -> String {
    format!("{TYPE_URL_PREFIX}{}", node_type.message_name())
}

impl AstNode {
    /// # Errors
    ///
    /// Returns [`AstError::Serialization`] if the node cannot be encoded.
    pub fn to_typed_struct(&self) -> Result<TypedStruct, AstError> {
        Ok(TypedStruct {
            type_url: type_url(self.node_type()),
            value: serde_json::to_vec(self)?,
        })
    }
}

impl TypedStruct {
    /// The node kind named by the URL, if it names one.
    #[must_use]
    pub fn node_type(&self) -> Option<NodeType> {
        self.type_url
            .strip_prefix(TYPE_URL_PREFIX)
            .and_then(NodeType::from_message_name)
    }

    /// Decodes the payload and checks it against the URL.
    ///
    /// # Errors
    ///
    /// - [`AstError::UnknownTypeUrl`] if the URL does not name a node kind
    /// - [`AstError::Serialization`] if the payload is not a valid node
    /// - [`AstError::TypeUrlMismatch`] if the payload is a different kind
    pub fn into_node(self) -> Result<AstNode, AstError> {
        let Some(expected) = self.node_type() else {
            return Err(AstError::UnknownTypeUrl {
                type_url: self.type_url,
            });
        };
        let node: AstNode = serde_json::from_slice(&self.value)?;
        if node.node_type() != expected {
            return Err(AstError::TypeUrlMismatch {
                expected: expected.message_name().to_string(),
                found: node.node_type().message_name().to_string(),
            });
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Break, Src};

    fn src() -> Src {
        Src::new(3, 4, 40, 48, Some(2))
    }

    #[test]
    fn url_names_the_payload_kind() {
        let node = AstNode::Break(Break { id: 7, src: src() });
        let envelope = node.to_typed_struct().unwrap();
        assert_eq!(envelope.type_url, "type.solgraph.dev/solgraph.ast.Break");
        assert_eq!(envelope.into_node().unwrap(), node);
    }

    #[test]
    fn mismatched_url_is_rejected() {
        let mut envelope = AstNode::Break(Break { id: 7, src: src() })
            .to_typed_struct()
            .unwrap();
        envelope.type_url = type_url(NodeType::Continue);
        assert!(matches!(
            envelope.clone().into_node(),
            Err(AstError::TypeUrlMismatch { .. })
        ));

        envelope.type_url = "type.solgraph.dev/solgraph.ast.Nope".to_string();
        assert!(matches!(
            envelope.into_node(),
            Err(AstError::UnknownTypeUrl { .. })
        ));
    }
}
