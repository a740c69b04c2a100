//! Read-only views over a setup's nodes and spaces, in insertion order.

use crate::error::SetupError;
use crate::node::{Node, Space};
use crate::reference::EntityRef;
use crate::setup::Setup;

/// Node view of a [`Setup`].
#[derive(Debug, Clone, Copy)]
pub struct Nodes<'a> {
    setup: &'a Setup,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(setup: &'a Setup) -> Self {
        Nodes { setup }
    }

    /// `(name, node)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Node)> + 'a {
        let setup = self.setup;
        setup
            .node_indices
            .iter()
            .filter_map(move |(name, idx)| setup.graph.node_weight(*idx).map(|n| (name.as_str(), n)))
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + 'a {
        let setup = self.setup;
        setup.node_indices.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&'a Node, SetupError> {
        let setup = self.setup;
        setup
            .node_indices
            .get(name)
            .and_then(|idx| setup.graph.node_weight(*idx))
            .ok_or_else(|| SetupError::UnresolvedReference {
                reference: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.setup.node_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setup.node_indices.is_empty()
    }
}

/// Space view of a [`Setup`].
#[derive(Debug, Clone, Copy)]
pub struct Edges<'a> {
    setup: &'a Setup,
}

impl<'a> Edges<'a> {
    pub(crate) fn new(setup: &'a Setup) -> Self {
        Edges { setup }
    }

    /// `(source, target, space)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str, &'a Space)> + 'a {
        let setup = self.setup;
        setup.edge_indices.iter().filter_map(move |((source, target), idx)| {
            setup
                .graph
                .edge_weight(*idx)
                .map(|space| (source.as_str(), target.as_str(), space))
        })
    }

    /// `(source, target)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let setup = self.setup;
        setup
            .edge_indices
            .keys()
            .map(|(source, target)| (source.as_str(), target.as_str()))
    }

    /// Looks up a space by compound name `"source_target"`.
    pub fn get(&self, name: &str) -> Result<&'a Space, SetupError> {
        let missing = || SetupError::UnresolvedReference {
            reference: name.to_string(),
        };
        match name.parse::<EntityRef>().map_err(|_| missing())? {
            EntityRef::Edge { source, target } => self.between(&source, &target).ok_or_else(missing),
            EntityRef::Node(_) => Err(missing()),
        }
    }

    /// Looks up the space from `source` to `target`.
    pub fn between(&self, source: &str, target: &str) -> Option<&'a Space> {
        let setup = self.setup;
        setup
            .edge_indices
            .get(&(source.to_string(), target.to_string()))
            .and_then(|idx| setup.graph.edge_weight(*idx))
    }

    pub fn len(&self) -> usize {
        self.setup.edge_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setup.edge_indices.is_empty()
    }
}
