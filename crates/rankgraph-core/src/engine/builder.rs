//! Entity graph construction from a candidate and a role profile.
//!
//! Construction is pure and infallible: profiles have already been
//! normalized at the boundary, so missing categories are simply empty.

use rankgraph_profile::{Category, Profile};

use crate::engine::graph::{EntityGraph, NodeId, SubjectType, DEFAULT_EDGE_WEIGHT};

/// Builds the entity graph for one candidate and one role.
///
/// The graph holds one subject node per profile, one entity node per
/// distinct category value on each side, a subject→entity edge for each
/// entity, a candidate↔role edge, and a self-loop on each subject. All
/// edges have weight 1.0.
///
/// Either profile may be a placeholder (e.g. `Profile::placeholder("dummy")`)
/// to build a one-sided graph.
///
/// # Example
///
/// ```rust
/// use rankgraph_core::build_entity_graph;
/// use rankgraph_profile::Profile;
///
/// let candidate = Profile::new("c1").with_skills(["Python", "CUDA"]);
/// let role = Profile::new("r1").with_skills(["Python"]);
/// let graph = build_entity_graph(&candidate, &role);
/// // 2 subjects + 3 entity nodes
/// assert_eq!(graph.node_count(), 5);
/// ```
pub fn build_entity_graph(candidate: &Profile, role: &Profile) -> EntityGraph {
    let mut graph = EntityGraph::default();

    let candidate_node = add_side(&mut graph, SubjectType::Candidate, candidate);
    let role_node = add_side(&mut graph, SubjectType::Role, role);

    graph.add_edge(candidate_node, role_node, DEFAULT_EDGE_WEIGHT);
    graph.add_edge(candidate_node, candidate_node, DEFAULT_EDGE_WEIGHT);
    graph.add_edge(role_node, role_node, DEFAULT_EDGE_WEIGHT);

    graph
}

/// Graph for a candidate alone, paired with a placeholder role.
pub fn build_candidate_graph(candidate: &Profile) -> EntityGraph {
    build_entity_graph(candidate, &Profile::placeholder(PLACEHOLDER_ROLE_ID))
}

/// Graph for a role alone, paired with a placeholder candidate.
pub fn build_role_graph(role: &Profile) -> EntityGraph {
    build_entity_graph(&Profile::placeholder(PLACEHOLDER_CANDIDATE_ID), role)
}

/// Id of the placeholder candidate used for one-sided role graphs.
pub const PLACEHOLDER_CANDIDATE_ID: &str = "dummy";

/// Id of the placeholder role used for one-sided candidate graphs.
pub const PLACEHOLDER_ROLE_ID: &str = "dummy";

fn add_side(graph: &mut EntityGraph, subject: SubjectType, profile: &Profile) -> NodeId {
    let subject_node = graph.add_subject(subject, profile);
    for category in Category::ALL {
        for value in profile.category(category) {
            let entity = graph.add_entity(category, value, subject);
            graph.add_edge(subject_node, entity, DEFAULT_EDGE_WEIGHT);
        }
    }
    subject_node
}
