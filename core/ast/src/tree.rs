use crate::nodes::{
    AstNode, ContractDefinition, FunctionDefinition, NodeId, NodeType, SourceUnit,
    TypeDescription,
};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Owner of every node produced by one build session.
///
/// Nodes refer to each other by [`NodeId`]; parent links live in each node's
/// [`Src`](crate::nodes::Src) and child links in its payload.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Tree {
    pub(crate) nodes: FxHashMap<NodeId, AstNode>,
    pub(crate) source_units: Vec<NodeId>,
    pub(crate) global_nodes: Vec<NodeId>,
}

/// Borrowed view of the tree's top level.
#[derive(Debug)]
pub struct Root<'a> {
    pub source_units: Vec<&'a SourceUnit>,
    pub global_nodes: Vec<&'a AstNode>,
}

impl Tree {
    /// Adds a node built by the builder or decoded from JSON.
    pub(crate) fn add_node(&mut self, node: AstNode) {
        debug_assert!(
            !self.nodes.contains_key(&node.id()),
            "Node with ID {} already exists in the tree",
            node.id()
        );
        if let AstNode::SourceUnit(unit) = &node {
            self.source_units.push(unit.id);
        }
        self.nodes.insert(node.id(), node);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get_by_id(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(&id)
    }

    /// Mutable access for resolution. Callers must not change structural fields.
    pub fn get_by_id_mut(&mut self, id: NodeId) -> Option<&mut AstNode> {
        self.nodes.get_mut(&id)
    }

    /// All node ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn root(&self) -> Root<'_> {
        Root {
            source_units: self.source_units(),
            global_nodes: self.global_nodes(),
        }
    }

    #[must_use]
    pub fn source_unit_ids(&self) -> &[NodeId] {
        &self.source_units
    }

    #[must_use]
    pub fn source_units(&self) -> Vec<&SourceUnit> {
        self.source_units
            .iter()
            .filter_map(|id| match self.nodes.get(id) {
                Some(AstNode::SourceUnit(unit)) => Some(unit),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn source_unit_by_path(&self, absolute_path: &str) -> Option<&SourceUnit> {
        self.source_units()
            .into_iter()
            .find(|unit| unit.absolute_path == absolute_path)
    }

    /// File-scope declarations: everything at the top of a source unit that is not
    /// a pragma, an import or a contract.
    #[must_use]
    pub fn global_nodes(&self) -> Vec<&AstNode> {
        self.global_nodes
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    #[must_use]
    pub fn contracts(&self) -> Vec<&ContractDefinition> {
        self.filter_nodes(|node| matches!(node, AstNode::ContractDefinition(_)))
            .into_iter()
            .filter_map(|node| match node {
                AstNode::ContractDefinition(contract) => Some(contract),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn functions(&self) -> Vec<&FunctionDefinition> {
        self.filter_nodes(|node| matches!(node, AstNode::FunctionDefinition(_)))
            .into_iter()
            .filter_map(|node| match node {
                AstNode::FunctionDefinition(function) => Some(function),
                _ => None,
            })
            .collect()
    }

    /// Nodes satisfying `predicate`, ordered by id.
    pub fn filter_nodes<T: Fn(&AstNode) -> bool>(&self, predicate: T) -> Vec<&AstNode> {
        let mut nodes: Vec<&AstNode> = self.nodes.values().filter(|node| predicate(node)).collect();
        nodes.sort_unstable_by_key(|node| node.id());
        nodes
    }

    #[must_use]
    pub fn find_parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.src().parent_id)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<&AstNode> {
        self.nodes
            .get(&id)
            .map(|node| {
                node.children()
                    .into_iter()
                    .filter_map(|child| self.nodes.get(&child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parent chain of `id`, nearest first, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &AstNode> + '_ {
        let mut current = self.find_parent_node(id);
        std::iter::from_fn(move || {
            let node = self.nodes.get(&current?)?;
            current = node.src().parent_id;
            Some(node)
        })
    }

    /// Nearest ancestor of the given kind.
    #[must_use]
    pub fn enclosing(&self, id: NodeId, node_type: NodeType) -> Option<&AstNode> {
        self.ancestors(id).find(|node| node.node_type() == node_type)
    }

    #[must_use]
    pub fn enclosing_source_unit(&self, id: NodeId) -> Option<&SourceUnit> {
        if let Some(AstNode::SourceUnit(unit)) = self.nodes.get(&id) {
            return Some(unit);
        }
        match self.enclosing(id, NodeType::SourceUnit) {
            Some(AstNode::SourceUnit(unit)) => Some(unit),
            _ => None,
        }
    }

    #[must_use]
    pub fn enclosing_contract(&self, id: NodeId) -> Option<&ContractDefinition> {
        match self.enclosing(id, NodeType::ContractDefinition) {
            Some(AstNode::ContractDefinition(contract)) => Some(contract),
            _ => None,
        }
    }

    #[must_use]
    pub fn type_of(&self, id: NodeId) -> Option<&TypeDescription> {
        self.nodes.get(&id).and_then(AstNode::type_description)
    }

    /// Sets a node's type unless it already has one.
    pub fn set_type_if_absent(&mut self, id: NodeId, type_description: TypeDescription) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if node.type_description().is_none() => {
                node.set_type_description(type_description)
            }
            _ => false,
        }
    }

    /// Binds `node_id` to `declaration` and propagates the binding upward.
    ///
    /// The node applies the binding through its own acceptance rule. Each ancestor
    /// that has no type yet is then offered the binding, carrying the type of the
    /// node below it, until one already has a type or declines. Returns whether
    /// the node itself accepted the binding.
    pub fn update_node_reference_by_id(
        &mut self,
        node_id: NodeId,
        declaration: NodeId,
        type_description: Option<&TypeDescription>,
    ) -> bool {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return false;
        };
        if !node.accept_reference(node_id, declaration, type_description) {
            return false;
        }
        let mut carried = node.type_description().cloned();
        let mut current = node_id;
        while let Some(parent_id) = self.find_parent_node(current) {
            let Some(parent) = self.nodes.get_mut(&parent_id) else {
                break;
            };
            if parent.type_description().is_some()
                || !parent.accept_reference(current, declaration, carried.as_ref())
            {
                break;
            }
            trace!(node = parent_id, from = current, "propagated binding");
            carried = parent.type_description().cloned();
            current = parent_id;
        }
        true
    }
}
