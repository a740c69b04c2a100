//! Setup: the optical-system graph and its construction engine.
//!
//! [`Setup`] owns a `StableGraph` whose nodes are components and whose edges
//! are spaces, plus insertion-ordered name indices for both. The store is
//! append-only: [`add`](Setup::add) and [`space`](Setup::space) validate the
//! whole request against the graph as it is at the moment of the call and
//! only then commit, so a failed call leaves the setup untouched and every
//! reference can only point backwards in construction order.
//!
//! Each committed, optimizable node or space appends its property names to
//! the ordered parameter list returned by [`parameters`](Setup::parameters).

use indexmap::IndexMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::Directed;

use crate::def::{NodeDef, SpaceDef, Statement};
use crate::error::SetupError;
use crate::node::{Direction, Node, Port, Space};
use crate::parameter::Parameter;
use crate::reference::{EntityRef, Reference};
use crate::schema::{ComponentKind, Properties, SpaceProperties};
use crate::value::{PropertyRef, PropertyValue, Scalar};
use crate::views::{Edges, Nodes};
use crate::SEPARATOR;

/// The optical-system description graph.
#[derive(Debug, Clone, Default)]
pub struct Setup {
    pub(crate) graph: StableGraph<Node, Space, Directed, u32>,
    pub(crate) node_indices: IndexMap<String, NodeIndex<u32>>,
    pub(crate) edge_indices: IndexMap<(String, String), EdgeIndex<u32>>,
    parameters: Vec<Parameter>,
}

impl Setup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a setup by applying `statements` in order.
    pub fn from_statements<I>(statements: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = Statement>,
    {
        let mut setup = Setup::new();
        for statement in statements {
            setup.apply(statement)?;
        }
        Ok(setup)
    }

    pub fn apply(&mut self, statement: Statement) -> Result<(), SetupError> {
        match statement {
            Statement::Add(def) => self.add(def),
            Statement::Space(def) => self.space(def),
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Adds a component node.
    ///
    /// Fails without modifying the setup if the name contains the separator
    /// or is taken, if both reflectivity and transmissivity are given for a
    /// mirror or beamsplitter, if a property is outside the kind's schema, if
    /// any reference does not resolve yet, or if the kind, port, direction or
    /// auxiliary flag is not a member of its enumeration.
    pub fn add(&mut self, def: NodeDef) -> Result<(), SetupError> {
        let NodeDef {
            component,
            name,
            optimizable,
            target,
            port,
            direction,
            auxiliary,
            detector1,
            detector2,
            properties: mut overrides,
        } = def;

        if name.contains(SEPARATOR) {
            return Err(SetupError::Naming { name });
        }
        let kind: ComponentKind = component.parse()?;
        if !kind.is_node_kind() {
            return Err(SetupError::UnknownComponent {
                kind: kind.to_string(),
            });
        }
        if self.node_indices.contains_key(&name) {
            return Err(SetupError::DuplicateNode { name });
        }

        if kind.is_lossy_reflector() {
            self.fold_loss_into_reflectivity(kind, &name, &mut overrides)?;
        }

        let properties = Properties::merge(kind, &overrides)?;
        for (_, value) in properties.iter() {
            self.check_derived(value)?;
        }

        let target = match target {
            Some(t) => Some(self.resolve(&t)?),
            None => None,
        };
        let port = port.map(|p| p.parse::<Port>()).transpose()?;
        let direction = direction.map(|d| d.parse::<Direction>()).transpose()?;
        let auxiliary = auxiliary
            .map(|flag| flag.to_bool("auxiliary"))
            .transpose()?;
        for detector in [&detector1, &detector2].into_iter().flatten() {
            if !self.contains_node(detector) {
                return Err(SetupError::UnresolvedReference {
                    reference: detector.clone(),
                });
            }
        }

        if optimizable && !kind.is_never_optimized() {
            self.parameters.extend(
                properties
                    .names()
                    .iter()
                    .map(|property| Parameter::new(EntityRef::node(name.as_str()), *property)),
            );
        }

        tracing::debug!(kind = %kind, name = %name, "adding node");
        let node = Node {
            name: name.clone(),
            properties,
            target,
            port,
            direction,
            auxiliary,
            detector1,
            detector2,
        };
        let idx = self.graph.add_node(node);
        self.node_indices.insert(name, idx);
        Ok(())
    }

    /// Connects two existing nodes with a space.
    pub fn space(&mut self, def: SpaceDef) -> Result<(), SetupError> {
        let SpaceDef {
            source,
            target,
            optimizable,
            source_port,
            target_port,
            properties: overrides,
        } = def;

        let source_idx = self.node_index(&source)?;
        let target_idx = self.node_index(&target)?;
        let key = (source, target);
        if self.edge_indices.contains_key(&key) {
            let (source_name, target_name) = key;
            return Err(SetupError::DuplicateEdge {
                source_name,
                target_name,
            });
        }

        let properties = SpaceProperties::from_overrides(&overrides)?;
        for (_, value) in properties.iter() {
            self.check_derived(value)?;
        }
        let source_port: Port = source_port.parse()?;
        let target_port: Port = target_port.parse()?;

        let (source, target) = key;
        if optimizable {
            let entity = EntityRef::edge(source.as_str(), target.as_str());
            self.parameters.extend(
                SpaceProperties::NAMES
                    .iter()
                    .map(|property| Parameter::new(entity.clone(), *property)),
            );
        }

        tracing::debug!(source = %source, target = %target, "adding space");
        let space = Space {
            source: source.clone(),
            target: target.clone(),
            properties,
            source_port,
            target_port,
        };
        let idx = self.graph.add_edge(source_idx, target_idx, space);
        self.edge_indices.insert((source, target), idx);
        Ok(())
    }

    /// Stores reflectivity relative to the lossless sub-system.
    ///
    /// A given transmissivity `t` becomes `(1 - t - loss) / (1 - loss)`; a
    /// given reflectivity `r` becomes `r / (1 - loss)`.
    fn fold_loss_into_reflectivity(
        &self,
        kind: ComponentKind,
        name: &str,
        overrides: &mut IndexMap<String, PropertyValue>,
    ) -> Result<(), SetupError> {
        let has_r = overrides.contains_key("reflectivity");
        let has_t = overrides.contains_key("transmissivity");
        if has_r && has_t {
            return Err(SetupError::Conflict {
                name: name.to_string(),
            });
        }
        if !has_r && !has_t {
            return Ok(());
        }

        let loss = match overrides.get("loss") {
            Some(value) => self.evaluate(value)?,
            None => match Properties::defaults(kind).get("loss") {
                Some(value) => self.evaluate(value)?,
                None => 0.0,
            },
        };

        let reflectivity = match overrides.shift_remove("transmissivity") {
            Some(t) => (1.0 - self.evaluate(&t)? - loss) / (1.0 - loss),
            None => match overrides.get("reflectivity") {
                Some(r) => self.evaluate(r)? / (1.0 - loss),
                None => return Ok(()),
            },
        };
        overrides.insert(
            "reflectivity".to_string(),
            PropertyValue::Literal(Scalar::Float(reflectivity)),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reference resolution
    // -----------------------------------------------------------------------

    /// Parses `reference` and checks that its referent already exists.
    pub fn resolve(&self, reference: &str) -> Result<Reference, SetupError> {
        let parsed = Reference::parse(reference);
        let exists = match &parsed {
            Reference::Node(name) => self.contains_node(name),
            Reference::PseudoProperty { node, .. } => {
                if !self.contains_node(node) {
                    return Err(SetupError::UnresolvedReference {
                        reference: node.clone(),
                    });
                }
                true
            }
            Reference::Edge { source, target } => self.contains_edge(source, target),
        };
        if exists {
            Ok(parsed)
        } else {
            Err(SetupError::UnresolvedReference {
                reference: reference.to_string(),
            })
        }
    }

    fn check_derived(&self, value: &PropertyValue) -> Result<(), SetupError> {
        if let PropertyValue::Derived(derived) = value {
            self.property_ref(&derived.source)?;
        }
        Ok(())
    }

    fn property_ref(&self, source: &PropertyRef) -> Result<&PropertyValue, SetupError> {
        self.nodes()
            .get(&source.node)
            .ok()
            .and_then(|node| node.properties.get(&source.property))
            .ok_or_else(|| SetupError::UnresolvedReference {
                reference: source.to_string(),
            })
    }

    /// Resolves a value to a number, following derived values through the
    /// graph.
    pub fn evaluate(&self, value: &PropertyValue) -> Result<f64, SetupError> {
        match value {
            PropertyValue::Literal(scalar) => Ok(scalar.as_f64()),
            PropertyValue::Derived(derived) => {
                let source = self.property_ref(&derived.source)?;
                Ok(derived.transform.apply(self.evaluate(source)?))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    pub fn edges(&self) -> Edges<'_> {
        Edges::new(self)
    }

    /// Looks up a node by name.
    pub fn node(&self, name: &str) -> Result<&Node, SetupError> {
        self.nodes().get(name)
    }

    /// Looks up a space by its compound name `"source_target"`.
    pub fn edge(&self, name: &str) -> Result<&Space, SetupError> {
        self.edges().get(name)
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edge_indices
            .contains_key(&(source.to_string(), target.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.node_indices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_indices.len()
    }

    /// The ordered parameter list accumulated during construction.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns a read-only reference to the underlying graph.
    pub fn graph(&self) -> &StableGraph<Node, Space, Directed, u32> {
        &self.graph
    }

    /// Names of the nodes connected to `name` by a space, in either direction.
    pub fn neighbors(&self, name: &str) -> Result<Vec<&str>, SetupError> {
        let idx = self.node_index(name)?;
        Ok(self
            .graph
            .neighbors_undirected(idx)
            .filter_map(|n| self.graph.node_weight(n))
            .map(|node| node.name.as_str())
            .collect())
    }

    fn node_index(&self, name: &str) -> Result<NodeIndex<u32>, SetupError> {
        self.node_indices
            .get(name)
            .copied()
            .ok_or_else(|| SetupError::UnresolvedReference {
                reference: name.to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Value updates (key sets never change)
    // -----------------------------------------------------------------------

    /// Reads the value of `property` on `entity`.
    pub fn value(&self, entity: &EntityRef, property: &str) -> Result<&PropertyValue, SetupError> {
        let missing = || SetupError::UnresolvedReference {
            reference: format!("{}{}{}", entity, SEPARATOR, property),
        };
        match entity {
            EntityRef::Node(name) => self.node(name)?.properties.get(property).ok_or_else(missing),
            EntityRef::Edge { source, target } => self
                .edge_indices
                .get(&(source.clone(), target.clone()))
                .and_then(|idx| self.graph.edge_weight(*idx))
                .and_then(|space| space.properties.get(property))
                .ok_or_else(missing),
        }
    }

    /// Overwrites the value of `property` on `entity` in place.
    pub fn set_value(
        &mut self,
        entity: &EntityRef,
        property: &str,
        value: f64,
    ) -> Result<(), SetupError> {
        let slot = match entity {
            EntityRef::Node(name) => self
                .node_indices
                .get(name)
                .copied()
                .and_then(|idx| self.graph.node_weight_mut(idx))
                .and_then(|node| node.properties.get_mut(property)),
            EntityRef::Edge { source, target } => self
                .edge_indices
                .get(&(source.clone(), target.clone()))
                .copied()
                .and_then(|idx| self.graph.edge_weight_mut(idx))
                .and_then(|space| space.properties.get_mut(property)),
        };
        match slot {
            Some(slot) => {
                tracing::trace!(entity = %entity, property, value, "setting value");
                *slot = PropertyValue::Literal(Scalar::Float(value));
                Ok(())
            }
            None => Err(SetupError::UnresolvedReference {
                reference: format!("{}{}{}", entity, SEPARATOR, property),
            }),
        }
    }

    /// Writes `values` onto `parameters`, pairing them by position.
    ///
    /// Both slices must have the same length; nothing is written otherwise.
    pub fn set_values(&mut self, parameters: &[Parameter], values: &[f64]) -> Result<(), SetupError> {
        if parameters.len() != values.len() {
            return Err(SetupError::ValueCount {
                expected: parameters.len(),
                received: values.len(),
            });
        }
        for (parameter, value) in parameters.iter().zip(values) {
            self.set_value(&parameter.entity, &parameter.property, *value)?;
        }
        Ok(())
    }
}
