use std::collections::{HashMap, HashSet};
use std::ops::Index;

use tracing::warn;
use vista_resources::schema::gmod::GmodDto;
use vista_types::{TraversalControl, VisVersion};

use crate::error::VisError;
use crate::gmod_node::{is_product_selection_assignment, GmodNode};

/// Index of a node within its owning [`Gmod`] arena.
pub type NodeId = usize;

/// Options for [`Gmod::traverse`].
#[derive(Debug, Clone, Copy)]
pub struct TraversalOptions {
    /// How many times one node may occur on the current parent chain before
    /// its subtree is pruned. Bounds recursion through multiply-linked
    /// sub-DAGs.
    pub max_occurrence: usize,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self { max_occurrence: 1 }
    }
}

/// The Generic Product Model of one VIS version.
///
/// Owns all nodes in an arena; adjacency is non-owning [`NodeId`] lists per
/// node, making the multi-parent DAG safe to represent without reference
/// cycles. Lookup by code is O(1).
#[derive(Debug)]
pub struct Gmod {
    version: VisVersion,
    nodes: Vec<GmodNode>,
    index: HashMap<String, NodeId>,
    root: NodeId,
}

impl Gmod {
    /// Builds the tree in two phases: allocate all nodes, then link the
    /// relations. Relations naming unknown endpoints are skipped with a
    /// warning rather than failing the load.
    pub(crate) fn new(version: VisVersion, dto: &GmodDto) -> Result<Self, VisError> {
        let mut nodes: Vec<GmodNode> = Vec::with_capacity(dto.items.len());
        let mut index: HashMap<String, NodeId> = HashMap::with_capacity(dto.items.len());

        for item in &dto.items {
            index.insert(item.code.clone(), nodes.len());
            nodes.push(GmodNode::new(item));
        }

        for relation in &dto.relations {
            if relation.len() < 2 {
                warn!(?relation, "gmod relation with insufficient size, skipped");
                continue;
            }
            let (parent_code, child_code) = (&relation[0], &relation[1]);
            let Some(&parent) = index.get(parent_code) else {
                warn!(parent = %parent_code, "gmod relation parent not found, skipped");
                continue;
            };
            let Some(&child) = index.get(child_code) else {
                warn!(child = %child_code, "gmod relation child not found, skipped");
                continue;
            };
            nodes[parent].add_child(child);
            nodes[child].add_parent(parent);
        }

        for id in 0..nodes.len() {
            let child_codes: HashSet<String> = nodes[id]
                .children()
                .iter()
                .map(|&c| nodes[c].code().to_string())
                .collect();
            nodes[id].trim(child_codes);
        }

        let root = *index.get("VE").ok_or_else(|| {
            VisError::InvalidData(format!("gmod payload for {version} has no root node 'VE'"))
        })?;

        Ok(Self {
            version,
            nodes,
            index,
            root,
        })
    }

    /// The VIS version this model belongs to.
    pub fn version(&self) -> VisVersion {
        self.version
    }

    /// Id of the root node ("VE").
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root node ("VE").
    pub fn root_node(&self) -> &GmodNode {
        &self.nodes[self.root]
    }

    /// O(1) code lookup.
    pub fn node_id(&self, code: &str) -> Option<NodeId> {
        self.index.get(code).copied()
    }

    /// O(1) code lookup returning the node itself.
    pub fn node(&self, code: &str) -> Option<&GmodNode> {
        self.node_id(code).map(|id| &self.nodes[id])
    }

    /// Number of nodes in the model.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &GmodNode> {
        self.nodes.iter()
    }

    /// The product type assigned to a function node: its single PRODUCT
    /// TYPE child, if that is the node's only child.
    pub fn product_type(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        if node.children().len() != 1 || !node.metadata().category().contains("FUNCTION") {
            return None;
        }
        let child = node.children()[0];
        if self.nodes[child].metadata().is_product_type() {
            Some(child)
        } else {
            None
        }
    }

    /// The product selection assigned to a function node, analogous to
    /// [`Gmod::product_type`].
    pub fn product_selection(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        if node.children().len() != 1 || !node.metadata().category().contains("FUNCTION") {
            return None;
        }
        let child = node.children()[0];
        let meta = self.nodes[child].metadata();
        if meta.category().contains("PRODUCT") && meta.node_type() == "SELECTION" {
            Some(child)
        } else {
            None
        }
    }

    /// Depth-first traversal from `start`.
    ///
    /// The handler sees the current parent chain (as arena ids) and the
    /// visited node, and steers the walk through its [`TraversalControl`]
    /// return. Returns `true` when the walk ran to completion, `false` when
    /// a handler returned `Stop`.
    pub fn traverse<S, F>(
        &self,
        state: &mut S,
        start: NodeId,
        handler: &mut F,
        options: &TraversalOptions,
    ) -> bool
    where
        F: FnMut(&mut S, &[NodeId], NodeId) -> TraversalControl,
    {
        let mut parents: Vec<NodeId> = Vec::with_capacity(16);
        self.traverse_node(state, &mut parents, start, handler, options)
            != TraversalControl::Stop
    }

    fn traverse_node<S, F>(
        &self,
        state: &mut S,
        parents: &mut Vec<NodeId>,
        current: NodeId,
        handler: &mut F,
        options: &TraversalOptions,
    ) -> TraversalControl
    where
        F: FnMut(&mut S, &[NodeId], NodeId) -> TraversalControl,
    {
        let node = &self.nodes[current];
        if node.metadata().install_substructure() == Some(false) {
            return TraversalControl::Continue;
        }

        let result = handler(state, parents, current);
        if result != TraversalControl::Continue {
            return result;
        }

        // product selection assignments may legitimately revisit a node
        let skip_occurrence_check = parents.last().is_some_and(|&p| {
            is_product_selection_assignment(self.nodes[p].metadata(), node.metadata())
        });
        if !skip_occurrence_check {
            let occurrences = parents.iter().filter(|&&p| p == current).count();
            if occurrences >= options.max_occurrence {
                return TraversalControl::SkipSubtree;
            }
        }

        parents.push(current);
        for i in 0..self.nodes[current].children().len() {
            let child = self.nodes[current].children()[i];
            let result = self.traverse_node(state, parents, child, handler, options);
            if result == TraversalControl::Stop {
                return TraversalControl::Stop;
            }
        }
        parents.pop();
        TraversalControl::Continue
    }

    /// Searches for a parent chain connecting `from_path` to `to`.
    ///
    /// Walks depth-first from the last asset-function node of `from_path`
    /// (or the root); a candidate hit has its parent chain completed up to
    /// the root through single-parent hops and must extend `from_path`.
    /// Returns the intermediate nodes between the chain and `to`, in order.
    pub fn path_exists_between(&self, from_path: &[NodeId], to: NodeId) -> Option<Vec<NodeId>> {
        let start = from_path
            .iter()
            .rev()
            .find(|&&id| self.nodes[id].metadata().is_asset_function())
            .copied()
            .unwrap_or(self.root);

        let to_code = self.nodes[to].code();
        let mut remaining: Option<Vec<NodeId>> = None;

        let mut handler = |state: &mut Option<Vec<NodeId>>,
                           parents: &[NodeId],
                           current: NodeId|
         -> TraversalControl {
            if self.nodes[current].code() != to_code {
                return TraversalControl::Continue;
            }

            let mut actual: Vec<NodeId> = parents.to_vec();
            while let Some(&first) = actual.first() {
                if self.nodes[first].is_root() {
                    break;
                }
                let first_parents = self.nodes[first].parents();
                if first_parents.len() != 1 {
                    return TraversalControl::Continue;
                }
                actual.insert(0, first_parents[0]);
            }

            if actual.len() < from_path.len() {
                return TraversalControl::Continue;
            }
            for (i, &expected) in from_path.iter().enumerate() {
                if self.nodes[actual[i]].code() != self.nodes[expected].code() {
                    return TraversalControl::Continue;
                }
            }

            let from_codes: HashSet<&str> = from_path
                .iter()
                .map(|&id| self.nodes[id].code())
                .collect();
            *state = Some(
                actual
                    .into_iter()
                    .filter(|&id| !from_codes.contains(self.nodes[id].code()))
                    .collect(),
            );
            TraversalControl::Stop
        };

        let completed = self.traverse(
            &mut remaining,
            start,
            &mut handler,
            &TraversalOptions::default(),
        );
        if completed {
            None
        } else {
            remaining
        }
    }
}

impl Index<NodeId> for Gmod {
    type Output = GmodNode;

    fn index(&self, id: NodeId) -> &GmodNode {
        &self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gmod() -> Gmod {
        let dto = vista_resources::gmod_dto(VisVersion::V3_4a).unwrap();
        Gmod::new(VisVersion::V3_4a, &dto).unwrap()
    }

    #[test]
    fn test_root_and_lookup() {
        let gmod = gmod();
        assert_eq!(gmod.root_node().code(), "VE");
        assert!(gmod.node("411.1").is_some());
        assert!(gmod.node("nope").is_none());
        let id = gmod.node_id("C101").unwrap();
        assert_eq!(gmod[id].code(), "C101");
    }

    #[test]
    fn test_adjacency_links() {
        let gmod = gmod();
        let ve = gmod.root_node();
        assert!(ve.is_child("400a"));
        assert!(!ve.is_child("411"));

        let c101 = gmod.node("C101").unwrap();
        assert_eq!(c101.children().len(), 3);
        assert!(c101.is_child("C101.3"));
        assert!(c101.is_child("C101.6"));
        assert!(c101.is_child("C101.7"));

        let c101_31 = gmod.node("C101.31").unwrap();
        assert_eq!(c101_31.parents().len(), 1);
        assert_eq!(gmod[c101_31.parents()[0]].code(), "C101.3");
    }

    #[test]
    fn test_unknown_relation_endpoints_are_skipped() {
        let mut dto = vista_resources::gmod_dto(VisVersion::V3_4a).unwrap();
        dto.relations.push(vec!["VE".to_string(), "GHOST".to_string()]);
        dto.relations.push(vec!["GHOST".to_string(), "VE".to_string()]);
        let gmod = Gmod::new(VisVersion::V3_4a, &dto).unwrap();
        assert!(!gmod.root_node().is_child("GHOST"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let mut dto = vista_resources::gmod_dto(VisVersion::V3_4a).unwrap();
        dto.items.retain(|n| n.code != "VE");
        dto.relations.retain(|r| r[0] != "VE" && r[1] != "VE");
        assert!(Gmod::new(VisVersion::V3_4a, &dto).is_err());
    }

    #[test]
    fn test_product_type_and_selection() {
        let gmod = gmod();
        let c101_63 = gmod.node_id("C101.63").unwrap();
        let pt = gmod.product_type(c101_63).unwrap();
        assert_eq!(gmod[pt].code(), "S206");

        let n411_1 = gmod.node_id("411.1").unwrap();
        assert!(gmod.product_type(n411_1).is_none());
        let ps = gmod.product_selection(n411_1).unwrap();
        assert_eq!(gmod[ps].code(), "CS1");

        let c101 = gmod.node_id("C101").unwrap();
        assert!(gmod.product_type(c101).is_none());
    }

    #[test]
    fn test_traverse_visits_whole_tree() {
        let gmod = gmod();
        let mut visited: Vec<String> = Vec::new();
        let completed = gmod.traverse(
            &mut visited,
            gmod.root(),
            &mut |visited, _parents, node| {
                visited.push(gmod[node].code().to_string());
                TraversalControl::Continue
            },
            &TraversalOptions::default(),
        );
        assert!(completed);
        assert_eq!(visited.len(), gmod.len());
        assert_eq!(visited[0], "VE");
    }

    #[test]
    fn test_traverse_skip_subtree() {
        let gmod = gmod();
        let mut visited: Vec<String> = Vec::new();
        gmod.traverse(
            &mut visited,
            gmod.root(),
            &mut |visited, _parents, node| {
                let code = gmod[node].code().to_string();
                visited.push(code.clone());
                if code == "400a" {
                    TraversalControl::SkipSubtree
                } else {
                    TraversalControl::Continue
                }
            },
            &TraversalOptions::default(),
        );
        assert!(visited.contains(&"400a".to_string()));
        assert!(!visited.contains(&"411.1".to_string()));
        assert!(visited.contains(&"511".to_string()));
    }

    #[test]
    fn test_traverse_stop_aborts() {
        let gmod = gmod();
        let mut count = 0usize;
        let completed = gmod.traverse(
            &mut count,
            gmod.root(),
            &mut |count, _parents, _node| {
                *count += 1;
                if *count == 3 {
                    TraversalControl::Stop
                } else {
                    TraversalControl::Continue
                }
            },
            &TraversalOptions::default(),
        );
        assert!(!completed);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_traverse_reports_parent_chain() {
        let gmod = gmod();
        let mut chain: Vec<String> = Vec::new();
        gmod.traverse(
            &mut chain,
            gmod.root(),
            &mut |chain, parents, node| {
                if gmod[node].code() == "C101.31" {
                    *chain = parents.iter().map(|&p| gmod[p].code().to_string()).collect();
                    return TraversalControl::Stop;
                }
                TraversalControl::Continue
            },
            &TraversalOptions::default(),
        );
        assert_eq!(
            chain,
            vec!["VE", "400a", "410", "411", "411i", "411.1", "CS1", "C101", "C101.3"]
        );
    }

    #[test]
    fn test_path_exists_between() {
        let gmod = gmod();
        let from: Vec<NodeId> = ["VE", "400a", "410", "411", "411i", "411.1", "CS1"]
            .iter()
            .map(|c| gmod.node_id(c).unwrap())
            .collect();
        let to = gmod.node_id("C101.31").unwrap();
        let remaining = gmod.path_exists_between(&from, to).unwrap();
        let codes: Vec<&str> = remaining.iter().map(|&id| gmod[id].code()).collect();
        assert_eq!(codes, vec!["C101", "C101.3"]);
    }

    #[test]
    fn test_path_exists_between_unreachable() {
        let gmod = gmod();
        let from: Vec<NodeId> = ["VE", "500a", "510", "511", "511i", "511.331", "CS2"]
            .iter()
            .map(|c| gmod.node_id(c).unwrap())
            .collect();
        let to = gmod.node_id("C101.31").unwrap();
        assert!(gmod.path_exists_between(&from, to).is_none());
    }
}
