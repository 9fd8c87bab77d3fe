use std::fmt;
use std::sync::Arc;

use vista_types::{ParsingErrors, VisVersion};

use crate::error::GmodPathError;
use crate::gmod::{Gmod, NodeId};
use crate::gmod_node::GmodNode;
use crate::locations::{Location, Locations};
use crate::path_parse;

/// One occurrence of a GMOD node on a path, together with its optional
/// location. Node identity on a path is the pair (code, location).
#[derive(Debug, Clone)]
pub struct PathNode {
    pub(crate) id: NodeId,
    pub(crate) location: Option<Location>,
}

impl PathNode {
    pub(crate) fn new(id: NodeId, location: Option<Location>) -> Self {
        Self { id, location }
    }

    /// The location carried by this occurrence, if any.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// A complete rooted path through the GMOD tree.
///
/// Holds the ordered parent list (root … target's parent) and the target,
/// each with an optional location, plus a shared handle on the owning
/// [`Gmod`]. Paths are immutable; all mutating operations produce new
/// values.
#[derive(Debug, Clone)]
pub struct GmodPath {
    gmod: Arc<Gmod>,
    parents: Vec<PathNode>,
    target: PathNode,
}

impl GmodPath {
    /// Builds and verifies a path.
    ///
    /// The parent list must either be empty with the target being the root,
    /// or start at the root with every adjacent pair satisfying the child
    /// relation; locations must form consistent individualizable sets.
    pub fn new(
        gmod: Arc<Gmod>,
        parents: Vec<PathNode>,
        target: PathNode,
    ) -> Result<Self, GmodPathError> {
        if parents.is_empty() {
            if !gmod[target.id].is_root() {
                return Err(GmodPathError::MissingParents(
                    gmod[target.id].code().to_string(),
                ));
            }
            return Ok(Self {
                gmod,
                parents,
                target,
            });
        }

        if !gmod[parents[0].id].is_root() {
            return Err(GmodPathError::FirstParentNotRoot(
                gmod[parents[0].id].code().to_string(),
            ));
        }

        for i in 0..parents.len() {
            let parent = &gmod[parents[i].id];
            let child = if i + 1 < parents.len() {
                &gmod[parents[i + 1].id]
            } else {
                &gmod[target.id]
            };
            if !parent.is_child(child.code()) {
                return Err(GmodPathError::NotChild {
                    parent: parent.code().to_string(),
                    child: child.code().to_string(),
                });
            }
        }

        let mut visitor = LocationSetsVisitor::new();
        for i in 0..=parents.len() {
            visitor.visit(i, &parents, &target, &gmod)?;
        }

        Ok(Self {
            gmod,
            parents,
            target,
        })
    }

    /// Builds a path without verification; callers must guarantee the
    /// invariants themselves.
    pub(crate) fn new_unchecked(
        gmod: Arc<Gmod>,
        parents: Vec<PathNode>,
        target: PathNode,
    ) -> Self {
        Self {
            gmod,
            parents,
            target,
        }
    }

    /// Structural validity of a candidate (parents, target) sequence:
    /// root-first and child relations, without the location rules.
    pub fn is_valid(gmod: &Gmod, parents: &[PathNode], target: &PathNode) -> bool {
        if parents.is_empty() {
            return gmod[target.id].is_root();
        }
        if !gmod[parents[0].id].is_root() {
            return false;
        }
        for i in 0..parents.len() {
            let child_id = if i + 1 < parents.len() {
                parents[i + 1].id
            } else {
                target.id
            };
            if !gmod[parents[i].id].is_child(gmod[child_id].code()) {
                return false;
            }
        }
        true
    }

    /// Parses a short path string (leaf and target codes only) against one
    /// version's Gmod and Locations.
    pub fn from_string(
        item: &str,
        gmod: &Arc<Gmod>,
        locations: &Locations,
    ) -> Result<GmodPath, GmodPathError> {
        path_parse::parse_short_path(item, gmod, locations)
    }

    /// Parses a full path string (`VE/…/target`).
    pub fn from_full_path_string(
        item: &str,
        gmod: &Arc<Gmod>,
        locations: &Locations,
    ) -> Result<GmodPath, GmodPathError> {
        path_parse::parse_full_path(item, gmod, locations)
    }

    /// Parse variant recording the failure into an error accumulator under
    /// the `GmodPath.Parse` state tag.
    pub fn from_string_with_errors(
        item: &str,
        gmod: &Arc<Gmod>,
        locations: &Locations,
        errors: &mut ParsingErrors,
    ) -> Option<GmodPath> {
        match Self::from_string(item, gmod, locations) {
            Ok(path) => Some(path),
            Err(err) => {
                errors.push("GmodPath.Parse", err.to_string());
                None
            }
        }
    }

    /// The owning Gmod.
    pub fn gmod(&self) -> &Arc<Gmod> {
        &self.gmod
    }

    /// The VIS version of the owning Gmod.
    pub fn version(&self) -> VisVersion {
        self.gmod.version()
    }

    /// Number of nodes on the path, target included.
    pub fn len(&self) -> usize {
        self.parents.len() + 1
    }

    /// A path always has at least its target.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The parent occurrences, root first.
    pub fn parents(&self) -> &[PathNode] {
        &self.parents
    }

    /// The target occurrence.
    pub fn target(&self) -> &PathNode {
        &self.target
    }

    /// The target's GMOD node.
    pub fn target_node(&self) -> &GmodNode {
        &self.gmod[self.target.id]
    }

    /// The path occurrence at `depth` (0 = root, `len() - 1` = target).
    pub fn path_node(&self, depth: usize) -> &PathNode {
        if depth < self.parents.len() {
            &self.parents[depth]
        } else {
            &self.target
        }
    }

    /// The GMOD node at `depth`.
    pub fn gmod_node(&self, depth: usize) -> &GmodNode {
        &self.gmod[self.path_node(depth).id]
    }

    /// Iterates `(depth, occurrence)` over the whole path.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PathNode)> {
        self.parents
            .iter()
            .chain(std::iter::once(&self.target))
            .enumerate()
    }

    /// A copy of this path with every location cleared.
    pub fn without_locations(&self) -> GmodPath {
        let parents = self
            .parents
            .iter()
            .map(|p| PathNode::new(p.id, None))
            .collect();
        GmodPath::new_unchecked(
            self.gmod.clone(),
            parents,
            PathNode::new(self.target.id, None),
        )
    }

    /// Whether any node of the path may carry a location.
    pub fn is_individualizable(&self) -> bool {
        let mut visitor = LocationSetsVisitor::new();
        for i in 0..self.len() {
            if let Ok(Some(_)) = visitor.visit(i, &self.parents, &self.target, &self.gmod) {
                return true;
            }
        }
        false
    }

    /// The individualizable sets of this path, in path order.
    pub fn individualizable_sets(&self) -> Result<Vec<GmodIndividualizableSet>, GmodPathError> {
        let mut result = Vec::new();
        let mut visitor = LocationSetsVisitor::new();
        for i in 0..self.len() {
            let Some((start, end, _)) = visitor.visit(i, &self.parents, &self.target, &self.gmod)?
            else {
                continue;
            };
            result.push(GmodIndividualizableSet::new(
                (start..=end).collect(),
                self.clone(),
            )?);
        }
        Ok(result)
    }

    /// The normal-assignment display name for the node at `depth`: the
    /// first of its assignment names keyed by any node further down the
    /// path.
    pub fn normal_assignment_name(&self, depth: usize) -> Option<&str> {
        if depth >= self.len() {
            return None;
        }
        let names = self.gmod_node(depth).metadata().normal_assignment_names();
        if names.is_empty() {
            return None;
        }
        for i in (0..self.len()).rev() {
            if let Some(name) = names.get(self.gmod_node(i).code()) {
                return Some(name);
            }
        }
        None
    }

    /// Display names for the function nodes of the short form, as
    /// `(depth, name)` pairs.
    ///
    /// Preference order per node: an ancestor-or-self normal-assignment
    /// override keyed by a node below it on the path, the common name, the
    /// technical name.
    pub fn common_names(&self) -> Vec<(usize, String)> {
        let mut result = Vec::new();

        for depth in 0..self.len() {
            let node = self.gmod_node(depth);
            let is_target = depth == self.parents.len();
            if !(node.metadata().is_leaf() || is_target) || !node.metadata().is_function() {
                continue;
            }

            let mut name = match node.metadata().common_name() {
                Some(common) if !common.is_empty() => common.to_string(),
                _ => node.metadata().name().to_string(),
            };

            let assignments = node.metadata().normal_assignment_names();
            if !assignments.is_empty() {
                if let Some(n) = assignments.get(self.target_node().code()) {
                    name = n.clone();
                }
                if !self.parents.is_empty() && depth < self.parents.len() {
                    for i in (depth..self.parents.len()).rev() {
                        if let Some(n) = assignments.get(self.gmod_node(i).code()) {
                            name = n.clone();
                            break;
                        }
                    }
                }
            }

            result.push((depth, name));
        }

        result
    }

    /// The full form: every node from root to target.
    pub fn to_full_path_string(&self) -> String {
        let mut out = String::new();
        for (depth, _) in self.iter() {
            if depth > 0 {
                out.push('/');
            }
            self.append_node(&mut out, depth);
        }
        out
    }

    fn append_node(&self, out: &mut String, depth: usize) {
        let path_node = self.path_node(depth);
        out.push_str(self.gmod[path_node.id].code());
        if let Some(location) = &path_node.location {
            out.push('-');
            out.push_str(location.as_str());
        }
    }
}

impl fmt::Display for GmodPath {
    /// The short form: leaf parents and the target only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (depth, node) in self.parents.iter().enumerate() {
            if !self.gmod[node.id].metadata().is_leaf() {
                continue;
            }
            self.append_node(&mut out, depth);
            out.push('/');
        }
        self.append_node(&mut out, self.parents.len());
        f.write_str(&out)
    }
}

impl PartialEq for GmodPath {
    /// Element-wise equality on codes and locations.
    fn eq(&self, other: &Self) -> bool {
        if self.version() != other.version() || self.parents.len() != other.parents.len() {
            return false;
        }
        self.iter().zip(other.iter()).all(|((_, a), (_, b))| {
            self.gmod[a.id].code() == other.gmod[b.id].code() && a.location == b.location
        })
    }
}

impl Eq for GmodPath {}

/// A contiguous run of path nodes that must share one location.
///
/// Derived from a path through the set visitor; `build` returns the path
/// with any location change applied to every member.
#[derive(Debug, Clone)]
pub struct GmodIndividualizableSet {
    indices: Vec<usize>,
    path: GmodPath,
}

impl GmodIndividualizableSet {
    pub(crate) fn new(indices: Vec<usize>, path: GmodPath) -> Result<Self, GmodPathError> {
        if indices.is_empty() {
            return Err(GmodPathError::EmptySet);
        }

        for &i in &indices {
            let node = path.gmod_node(i);
            let is_target = i == path.len() - 1;
            if !node.is_individualizable(is_target, indices.len() > 1) {
                return Err(GmodPathError::UnexpectedIndividualization);
            }
        }

        let first_location = path.path_node(indices[0]).location.clone();
        for &i in &indices[1..] {
            if path.path_node(i).location != first_location {
                return Err(GmodPathError::DifferentLocationsInSet);
            }
        }

        let has_short_path_node = indices.iter().any(|&i| {
            path.gmod_node(i).metadata().is_leaf() || i == path.len() - 1
        });
        if !has_short_path_node {
            return Err(GmodPathError::SetWithoutLeaf);
        }

        Ok(Self { indices, path })
    }

    /// The path depths covered by this set.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The set's shared location, if any.
    pub fn location(&self) -> Option<&Location> {
        self.path.path_node(self.indices[0]).location()
    }

    /// The GMOD nodes covered by this set.
    pub fn nodes(&self) -> impl Iterator<Item = &GmodNode> {
        self.indices.iter().map(|&i| self.path.gmod_node(i))
    }

    /// Applies one location to every member of the set.
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        for &i in &self.indices {
            if i < self.path.parents.len() {
                self.path.parents[i].location = location.clone();
            } else {
                self.path.target.location = location.clone();
            }
        }
        self
    }

    /// Consumes the set, yielding the (possibly re-individualized) path.
    pub fn build(self) -> GmodPath {
        self.path
    }
}

impl fmt::Display for GmodIndividualizableSet {
    /// Short-form rendering of the member nodes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (pos, &i) in self.indices.iter().enumerate() {
            let node = self.path.gmod_node(i);
            if node.metadata().is_leaf() || pos == self.indices.len() - 1 {
                if !first {
                    f.write_str("/")?;
                }
                f.write_str(node.code())?;
                if let Some(location) = self.path.path_node(i).location() {
                    write!(f, "-{location}")?;
                }
                first = false;
            }
        }
        Ok(())
    }
}

fn node_at<'a>(j: usize, parents: &'a [PathNode], target: &'a PathNode) -> &'a PathNode {
    if j < parents.len() {
        &parents[j]
    } else {
        target
    }
}

/// Walks a node sequence and emits, for each maximal run of nodes that can
/// and do carry the same location, the `(start, end, location)` triple.
///
/// Used by path construction, both parsers and the version converter.
pub(crate) struct LocationSetsVisitor {
    current_parent_start: Option<usize>,
}

#[allow(clippy::type_complexity)]
impl LocationSetsVisitor {
    pub(crate) fn new() -> Self {
        Self {
            current_parent_start: None,
        }
    }

    pub(crate) fn visit(
        &mut self,
        i: usize,
        parents: &[PathNode],
        target: &PathNode,
        gmod: &Gmod,
    ) -> Result<Option<(usize, usize, Option<Location>)>, GmodPathError> {
        let node = node_at(i, parents, target);
        let gmod_node = &gmod[node.id];
        let is_parent = gmod_node.metadata().is_potential_parent();
        let is_target = i == parents.len();

        let Some(start) = self.current_parent_start else {
            if is_parent {
                self.current_parent_start = Some(i);
            }
            if gmod_node.is_individualizable(is_target, false) {
                return Ok(Some((i, i, node.location.clone())));
            }
            return Ok(None);
        };

        if is_parent || is_target {
            let mut run: Option<(usize, usize, Option<Location>)> = None;

            if start + 1 == i {
                if gmod_node.is_individualizable(is_target, false) {
                    run = Some((i, i, node.location.clone()));
                }
            } else {
                let mut skipped_one: Option<usize> = None;
                let mut has_composition = false;

                for j in (start + 1)..=i {
                    let set_node = node_at(j, parents, target);
                    let set_gmod_node = &gmod[set_node.id];

                    if !set_gmod_node.is_individualizable(j == parents.len(), true) {
                        if run.is_some() {
                            skipped_one = Some(j);
                        }
                        continue;
                    }

                    if let Some((_, _, Some(run_location))) = &run {
                        if let Some(node_location) = &set_node.location {
                            if node_location != run_location {
                                return Err(GmodPathError::DifferentLocationsInSet);
                            }
                        }
                    }
                    if skipped_one.is_some() {
                        return Err(GmodPathError::SkippedInSet);
                    }

                    if set_gmod_node.metadata().is_function_composition() {
                        has_composition = true;
                    }

                    let location = match &run {
                        Some((_, _, Some(loc))) => Some(loc.clone()),
                        _ => set_node.location.clone(),
                    };
                    let run_start = run.map_or(j, |(s, _, _)| s);
                    run = Some((run_start, j, location));
                }

                // a lone composition is not a set on its own
                let lone_composition =
                    matches!(&run, Some((s, e, _)) if s == e) && has_composition;
                if lone_composition {
                    run = None;
                }
            }

            self.current_parent_start = Some(i);

            let keep = match &run {
                Some((s, e, _)) => (*s..=*e)
                    .any(|j| {
                        gmod[node_at(j, parents, target).id].metadata().is_leaf()
                            || j == parents.len()
                    }),
                None => false,
            };
            if keep {
                return Ok(run);
            }
        }

        if is_target && gmod_node.is_individualizable(true, false) {
            return Ok(Some((i, i, node.location.clone())));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_resources::gmod_dto;

    fn gmod() -> Arc<Gmod> {
        let dto = gmod_dto(VisVersion::V3_4a).unwrap();
        Arc::new(Gmod::new(VisVersion::V3_4a, &dto).unwrap())
    }

    fn locations() -> Locations {
        let dto = vista_resources::locations_dto(VisVersion::V3_4a).unwrap();
        Locations::new(VisVersion::V3_4a, &dto).unwrap()
    }

    fn chain(gmod: &Arc<Gmod>, codes: &[&str]) -> Vec<PathNode> {
        codes
            .iter()
            .map(|c| PathNode::new(gmod.node_id(c).unwrap(), None))
            .collect()
    }

    const FULL_411_1_CHAIN: &[&str] = &["VE", "400a", "410", "411", "411i", "411.1", "CS1"];

    #[test]
    fn test_new_validates_root_first() {
        let gmod = gmod();
        let parents = chain(&gmod, &["400a", "410"]);
        let target = PathNode::new(gmod.node_id("411").unwrap(), None);
        let err = GmodPath::new(gmod.clone(), parents, target).unwrap_err();
        assert!(matches!(err, GmodPathError::FirstParentNotRoot(_)));
    }

    #[test]
    fn test_new_validates_child_relation() {
        let gmod = gmod();
        let parents = chain(&gmod, &["VE", "400a"]);
        let target = PathNode::new(gmod.node_id("C101").unwrap(), None);
        let err = GmodPath::new(gmod.clone(), parents, target).unwrap_err();
        assert!(matches!(err, GmodPathError::NotChild { .. }));
    }

    #[test]
    fn test_root_only_path() {
        let gmod = gmod();
        let target = PathNode::new(gmod.root(), None);
        let path = GmodPath::new(gmod.clone(), Vec::new(), target).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.to_string(), "VE");
        assert_eq!(path.to_full_path_string(), "VE");

        let target = PathNode::new(gmod.node_id("411").unwrap(), None);
        assert!(matches!(
            GmodPath::new(gmod.clone(), Vec::new(), target),
            Err(GmodPathError::MissingParents(_))
        ));
    }

    #[test]
    fn test_short_and_full_forms() {
        let gmod = gmod();
        let mut parents = chain(&gmod, FULL_411_1_CHAIN);
        parents.extend(chain(&gmod, &["C101", "C101.6"]));
        let target = PathNode::new(gmod.node_id("C101.63").unwrap(), None);
        let path = GmodPath::new(gmod.clone(), parents, target).unwrap();

        assert_eq!(path.to_string(), "411.1/C101.63");
        assert_eq!(
            path.to_full_path_string(),
            "VE/400a/410/411/411i/411.1/CS1/C101/C101.6/C101.63"
        );
        assert_eq!(path.len(), 10);
    }

    #[test]
    fn test_locations_must_be_consistent_within_set() {
        let gmod = gmod();
        let locations = locations();
        let loc_1 = locations.parse("1").unwrap();
        let loc_2 = locations.parse("2").unwrap();

        // C101.3 and C101.31 form one set; differing locations must fail
        let mut parents = chain(&gmod, FULL_411_1_CHAIN);
        parents.push(PathNode::new(gmod.node_id("C101").unwrap(), None));
        parents.push(PathNode::new(
            gmod.node_id("C101.3").unwrap(),
            Some(loc_1.clone()),
        ));
        let target = PathNode::new(gmod.node_id("C101.31").unwrap(), Some(loc_2));
        let err = GmodPath::new(gmod.clone(), parents, target).unwrap_err();
        assert_eq!(err, GmodPathError::DifferentLocationsInSet);

        // the same location on both members is fine
        let mut parents = chain(&gmod, FULL_411_1_CHAIN);
        parents.push(PathNode::new(gmod.node_id("C101").unwrap(), None));
        parents.push(PathNode::new(
            gmod.node_id("C101.3").unwrap(),
            Some(loc_1.clone()),
        ));
        let target = PathNode::new(gmod.node_id("C101.31").unwrap(), Some(loc_1));
        let path = GmodPath::new(gmod.clone(), parents, target).unwrap();
        assert_eq!(path.to_string(), "411.1/C101.31-1");
        assert_eq!(
            path.to_full_path_string(),
            "VE/400a/410/411/411i/411.1/CS1/C101/C101.3-1/C101.31-1"
        );
    }

    #[test]
    fn test_individualizable_sets() {
        let gmod = gmod();
        let locations = locations();
        let loc = locations.parse("2").unwrap();

        let mut parents = chain(&gmod, FULL_411_1_CHAIN);
        parents.push(PathNode::new(gmod.node_id("C101").unwrap(), None));
        parents.push(PathNode::new(gmod.node_id("C101.3").unwrap(), Some(loc.clone())));
        let target = PathNode::new(gmod.node_id("C101.31").unwrap(), Some(loc.clone()));
        let path = GmodPath::new(gmod.clone(), parents, target).unwrap();

        let sets = path.individualizable_sets().unwrap();
        assert_eq!(sets.len(), 2);
        // 411i + 411.1 form the first set, C101.3 + C101.31 the second
        assert_eq!(sets[0].indices(), &[4, 5]);
        assert!(sets[0].location().is_none());
        assert_eq!(sets[1].indices(), &[8, 9]);
        assert_eq!(sets[1].location(), Some(&loc));
        assert_eq!(sets[1].to_string(), "C101.31-2");
        assert!(path.is_individualizable());
    }

    #[test]
    fn test_set_relocation_through_build() {
        let gmod = gmod();
        let locations = locations();
        let loc = locations.parse("P").unwrap();

        let mut parents = chain(&gmod, FULL_411_1_CHAIN);
        parents.push(PathNode::new(gmod.node_id("C101").unwrap(), None));
        parents.push(PathNode::new(gmod.node_id("C101.3").unwrap(), None));
        let target = PathNode::new(gmod.node_id("C101.31").unwrap(), None);
        let path = GmodPath::new(gmod.clone(), parents, target).unwrap();

        let sets = path.individualizable_sets().unwrap();
        let rebuilt = sets
            .into_iter()
            .next_back()
            .map(|set| set.with_location(Some(loc)).build());
        assert_eq!(rebuilt.map(|p| p.to_string()).as_deref(), Some("411.1/C101.31-P"));
    }

    #[test]
    fn test_without_locations() {
        let gmod = gmod();
        let locations = locations();
        let loc = locations.parse("2").unwrap();

        let mut parents = chain(&gmod, FULL_411_1_CHAIN);
        parents.push(PathNode::new(gmod.node_id("C101").unwrap(), None));
        parents.push(PathNode::new(gmod.node_id("C101.3").unwrap(), Some(loc.clone())));
        let target = PathNode::new(gmod.node_id("C101.31").unwrap(), Some(loc));
        let path = GmodPath::new(gmod.clone(), parents, target).unwrap();

        let stripped = path.without_locations();
        assert_eq!(stripped.to_string(), "411.1/C101.31");
        assert_ne!(path, stripped);
        assert_eq!(stripped, stripped.clone());
    }

    #[test]
    fn test_normal_assignment_name() {
        let gmod = gmod();
        let parents = chain(&gmod, FULL_411_1_CHAIN);
        let target = PathNode::new(gmod.node_id("C101").unwrap(), None);
        let path = GmodPath::new(gmod.clone(), parents, target).unwrap();

        // 411.1 names its assigned C101 "Propulsion engine"
        assert_eq!(path.normal_assignment_name(5), Some("Propulsion engine"));
        assert_eq!(path.normal_assignment_name(0), None);
        assert_eq!(path.normal_assignment_name(42), None);
    }

    #[test]
    fn test_common_names_prefers_overrides() {
        let gmod = gmod();
        let mut parents = chain(&gmod, FULL_411_1_CHAIN);
        parents.extend(chain(&gmod, &["C101", "C101.6", "C101.63"]));
        let target = PathNode::new(gmod.node_id("S206").unwrap(), None);
        let path = GmodPath::new(gmod.clone(), parents.clone(), target).unwrap();

        let names = path.common_names();
        // S206 is a PRODUCT node: no function name for the target itself
        assert_eq!(
            names,
            vec![
                (5, "Propulsion engine".to_string()),
                (9, "Cooling system".to_string()),
            ]
        );
    }
}
