use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use super::{DialogueNode, NodeId};
use crate::error::GraphError;

/// Collects nodes and validates them into a [`DialogueGraph`].
pub struct GraphBuilder {
    start: NodeId,
    nodes: Vec<DialogueNode>,
}

impl GraphBuilder {
    pub fn new(start: NodeId) -> Self {
        Self {
            start,
            nodes: Vec::new(),
        }
    }

    pub fn node(mut self, node: DialogueNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Reject duplicate ids, an unregistered start node, choice nodes
    /// without a choice source, invalid validators and routes that can reach
    /// an unregistered node.
    pub fn build(self) -> Result<DialogueGraph, GraphError> {
        let mut nodes: HashMap<NodeId, DialogueNode> = HashMap::with_capacity(self.nodes.len());
        let mut validators = HashMap::new();

        for node in self.nodes {
            if node.kind.has_choices() && node.choices.is_none() {
                return Err(GraphError::MissingChoices(node.id));
            }
            if let Some(pattern) = node.validator {
                let regex = Regex::new(pattern).map_err(|e| GraphError::InvalidValidator {
                    node: node.id,
                    message: e.to_string(),
                })?;
                validators.insert(node.id, regex);
            }
            if nodes.contains_key(node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            nodes.insert(node.id, node);
        }

        if !nodes.contains_key(self.start) {
            return Err(GraphError::MissingStart(self.start));
        }

        let mut ids: Vec<NodeId> = nodes.keys().copied().collect();
        ids.sort_unstable();
        for id in &ids {
            for target in nodes[id].route.targets() {
                if !nodes.contains_key(target) {
                    return Err(GraphError::OrphanTarget { from: *id, to: target });
                }
            }
        }

        Ok(DialogueGraph {
            start: self.start,
            nodes,
            validators,
        })
    }
}

/// Immutable, validated dialogue graph.
#[derive(Debug)]
pub struct DialogueGraph {
    start: NodeId,
    nodes: HashMap<NodeId, DialogueNode>,
    validators: HashMap<NodeId, Regex>,
}

impl DialogueGraph {
    pub fn start(&self) -> &DialogueNode {
        &self.nodes[self.start]
    }

    pub fn get(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in sorted order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Whether free-text `input` passes the node's validator. Nodes without
    /// one accept anything.
    pub fn accepts(&self, node: &str, input: &str) -> bool {
        self.validators
            .get(node)
            .is_none_or(|regex| regex.is_match(input))
    }

    /// Every node reachable from `from` by following declared targets.
    pub fn reachable_from(&self, from: NodeId) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![from];
        while let Some(id) = pending.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            pending.extend(node.route.targets());
        }
        seen
    }
}
