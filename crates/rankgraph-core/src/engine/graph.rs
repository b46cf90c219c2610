//! # Entity Graph
//!
//! Undirected attributed graph connecting subjects (a candidate, a role) to
//! the entities named in their profiles.
//!
//! ## Key Components
//!
//! - **Subject nodes**: one per profile, typed `candidate` or `role`, carrying
//!   the full profile as attributes
//!
//! - **Entity nodes**: one per distinct `(category, value, subject type)`,
//!   keyed `"{category}_{value}_{subject_type}"`, carrying `name` and
//!   `parent_type`
//!
//! - **EntityGraph**: node/edge storage with O(1) lookups by key and by
//!   unordered endpoint pair
//!
//! ## Design
//!
//! Node and edge ids are dense `u32` handles assigned in insertion order, so
//! iteration is deterministic. The graph is simple: re-adding an existing
//! node key merges into that node, re-adding an existing edge updates its
//! weight. Candidate-side and role-side entity nodes for the same value are
//! distinct because the subject type is part of the key.
//!
//! ## Example
//!
//! ```rust
//! use rankgraph_core::engine::graph::{EntityGraph, SubjectType};
//! use rankgraph_profile::{Category, Profile};
//!
//! let mut graph = EntityGraph::default();
//! let c = graph.add_subject(SubjectType::Candidate, &Profile::new("c1"));
//! let e = graph.add_entity(Category::Skills, "Rust", SubjectType::Candidate);
//! graph.add_edge(c, e, 1.0);
//! assert_eq!(graph.node_count(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use rankgraph_profile::{Category, Profile};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Weight used for every structural edge.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Subject id used when a candidate profile has no id.
pub const DEFAULT_CANDIDATE_ID: &str = "candidate";

/// Subject id used when a role profile has no id.
pub const DEFAULT_ROLE_ID: &str = "role";

/// A unique identifier for a node in the entity graph.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

/// A unique identifier for an edge in the entity graph.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub u32);

/// Which side of a match a subject is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SubjectType {
    Candidate,
    Role,
}

impl SubjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectType::Candidate => "candidate",
            SubjectType::Role => "role",
        }
    }

    /// Subject id used when the profile carries none.
    pub fn default_id(self) -> &'static str {
        match self {
            SubjectType::Candidate => DEFAULT_CANDIDATE_ID,
            SubjectType::Role => DEFAULT_ROLE_ID,
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a node represents.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A candidate or role, with its full profile
    Subject {
        subject: SubjectType,
        profile: Profile,
    },
    /// A skill, experience, or education value
    Entity {
        category: Category,
        name: Arc<str>,
        parent_type: SubjectType,
    },
}

/// A node in the entity graph.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// The unique node identifier
    pub id: NodeId,
    /// Identity key (subject id or `"{category}_{value}_{subject_type}"`)
    pub key: Arc<str>,
    pub kind: NodeKind,
}

impl NodeData {
    /// The `type` attribute: `candidate`, `role`, or the entity category.
    pub fn node_type(&self) -> &'static str {
        match &self.kind {
            NodeKind::Subject { subject, .. } => subject.as_str(),
            NodeKind::Entity { category, .. } => category.as_str(),
        }
    }

    pub fn is_subject(&self) -> bool {
        matches!(self.kind, NodeKind::Subject { .. })
    }

    /// Entity name, if this is an entity node.
    pub fn entity_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Entity { name, .. } => Some(name.as_ref()),
            NodeKind::Subject { .. } => None,
        }
    }

    /// Attribute map as it would be exposed to a graph store.
    ///
    /// Subject nodes carry the full profile plus `type`; entity nodes carry
    /// `type`, `name`, and `parent_type`.
    pub fn attributes(&self) -> Map<String, Value> {
        match &self.kind {
            NodeKind::Subject { subject, profile } => {
                let mut map = match profile.to_value() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                map.insert("type".into(), Value::String(subject.as_str().into()));
                map
            }
            NodeKind::Entity {
                category,
                name,
                parent_type,
            } => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String(category.as_str().into()));
                map.insert("name".into(), Value::String(name.to_string()));
                map.insert(
                    "parent_type".into(),
                    Value::String(parent_type.as_str().into()),
                );
                map
            }
        }
    }
}

/// An undirected weighted edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeData {
    /// The unique edge identifier
    pub id: EdgeId,
    pub src: NodeId,
    pub dst: NodeId,
    pub weight: f64,
}

impl EdgeData {
    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }

    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.src == node {
            Some(self.dst)
        } else if self.dst == node {
            Some(self.src)
        } else {
            None
        }
    }
}

/// Entity key for a `(category, value, subject type)` triple.
pub fn entity_key(category: Category, value: &str, parent_type: SubjectType) -> String {
    format!("{}_{}_{}", category.as_str(), value, parent_type.as_str())
}

/// Undirected attributed graph of subjects and entities.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    nodes: Vec<NodeData>,
    edges: Vec<EdgeData>,
    /// Subject and entity keys live in separate namespaces
    subject_index: FxHashMap<Arc<str>, NodeId>,
    entity_index: FxHashMap<Arc<str>, NodeId>,
    /// Incident edges per node, indexed by `NodeId.0`
    adjacency: Vec<SmallVec<[EdgeId; 4]>>,
    /// Edge lookup by normalized `(min, max)` endpoints
    edge_index: FxHashMap<(NodeId, NodeId), EdgeId>,
}

impl EntityGraph {
    /// Adds (or merges into) the subject node for a profile.
    ///
    /// The node key is the profile id, falling back to the subject type's
    /// default id. If the key already exists the node's kind and attributes
    /// are replaced and the existing id is returned.
    pub fn add_subject(&mut self, subject: SubjectType, profile: &Profile) -> NodeId {
        let key = profile.id().unwrap_or(subject.default_id()).to_string();
        let kind = NodeKind::Subject {
            subject,
            profile: profile.clone(),
        };
        if let Some(&id) = self.subject_index.get(key.as_str()) {
            self.nodes[id.0 as usize].kind = kind;
            return id;
        }
        let (id, key) = self.push_node(key, kind);
        self.subject_index.insert(key, id);
        id
    }

    /// Adds the entity node for `(category, value, parent_type)`, returning
    /// the existing node when the triple was already added.
    pub fn add_entity(&mut self, category: Category, value: &str, parent_type: SubjectType) -> NodeId {
        let key = entity_key(category, value, parent_type);
        if let Some(&id) = self.entity_index.get(key.as_str()) {
            return id;
        }
        let kind = NodeKind::Entity {
            category,
            name: Arc::from(value),
            parent_type,
        };
        let (id, key) = self.push_node(key, kind);
        self.entity_index.insert(key, id);
        id
    }

    fn push_node(&mut self, key: String, kind: NodeKind) -> (NodeId, Arc<str>) {
        let id = NodeId(self.nodes.len() as u32);
        let key: Arc<str> = Arc::from(key);
        self.nodes.push(NodeData {
            id,
            key: key.clone(),
            kind,
        });
        self.adjacency.push(SmallVec::new());
        (id, key)
    }

    /// Adds an undirected edge, or updates the weight of the existing edge
    /// between the same endpoints. Self-loops are allowed.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is not a node of this graph.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: f64) -> EdgeId {
        assert!(
            (a.0 as usize) < self.nodes.len() && (b.0 as usize) < self.nodes.len(),
            "edge endpoint out of bounds"
        );
        let pair = normalize_pair(a, b);
        if let Some(&id) = self.edge_index.get(&pair) {
            self.edges[id.0 as usize].weight = weight;
            return id;
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(EdgeData {
            id,
            src: pair.0,
            dst: pair.1,
            weight,
        });
        self.edge_index.insert(pair, id);
        self.adjacency[pair.0 .0 as usize].push(id);
        if pair.0 != pair.1 {
            self.adjacency[pair.1 .0 as usize].push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeData> {
        self.edges.get(id.0 as usize)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[NodeData] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[EdgeData] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Looks up a node by its identity key, subjects first.
    pub fn node_by_key(&self, key: &str) -> Option<&NodeData> {
        self.subject_node(key).or_else(|| self.entity_node(key))
    }

    pub fn subject_node(&self, key: &str) -> Option<&NodeData> {
        self.subject_index.get(key).and_then(|id| self.node(*id))
    }

    pub fn entity_node(&self, key: &str) -> Option<&NodeData> {
        self.entity_index.get(key).and_then(|id| self.node(*id))
    }

    /// Edge between two nodes, in either direction.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&EdgeData> {
        self.edge_index
            .get(&normalize_pair(a, b))
            .and_then(|id| self.edge(*id))
    }

    /// Subject nodes in insertion order.
    pub fn subjects(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.iter().filter(|n| n.is_subject())
    }

    /// Subject node of the given type, if present.
    pub fn subject(&self, subject_type: SubjectType) -> Option<&NodeData> {
        self.subjects().find(|n| {
            matches!(&n.kind, NodeKind::Subject { subject, .. } if *subject == subject_type)
        })
    }

    /// Entity nodes of one category, in insertion order.
    pub fn entities(&self, category: Category) -> impl Iterator<Item = &NodeData> {
        self.nodes.iter().filter(move |n| {
            matches!(&n.kind, NodeKind::Entity { category: c, .. } if *c == category)
        })
    }

    /// Names of the entity nodes of one category, in insertion order.
    pub fn entity_names(&self, category: Category) -> Vec<&str> {
        self.entities(category)
            .filter_map(NodeData::entity_name)
            .collect()
    }

    /// Incident edge ids of a node.
    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        self.adjacency
            .get(node.0 as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Sorted unique neighbors. A node with a self-loop is its own neighbor.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .incident_edges(node)
            .iter()
            .filter_map(|e| self.edge(*e).and_then(|edge| edge.other(node)))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Degree with self-loops counted twice.
    pub fn degree(&self, node: NodeId) -> usize {
        self.incident_edges(node)
            .iter()
            .filter_map(|e| self.edge(*e))
            .map(|edge| if edge.is_self_loop() { 2 } else { 1 })
            .sum()
    }
}

fn normalize_pair(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
