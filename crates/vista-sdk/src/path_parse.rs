use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use vista_types::TraversalControl;

use crate::error::GmodPathError;
use crate::gmod::{Gmod, NodeId, TraversalOptions};
use crate::gmod_path::{GmodPath, LocationSetsVisitor, PathNode};
use crate::locations::{Location, Locations};

/// One token of a path string: a code plus its optional location suffix.
#[derive(Debug, Clone)]
struct PathToken {
    code: String,
    location: Option<Location>,
}

fn tokenize(
    item: &str,
    gmod: &Gmod,
    locations: &Locations,
) -> Result<VecDeque<PathToken>, GmodPathError> {
    let mut tokens = VecDeque::new();

    for part in item.split('/') {
        if part.is_empty() {
            continue;
        }

        let (code, location_str) = match part.find('-') {
            Some(dash) => (&part[..dash], Some(&part[dash + 1..])),
            None => (part, None),
        };

        if gmod.node_id(code).is_none() {
            return Err(GmodPathError::NodeNotFound(part.to_string()));
        }
        let location = match location_str {
            Some(s) => Some(
                locations
                    .parse(s)
                    .map_err(|_| GmodPathError::InvalidLocation(s.to_string()))?,
            ),
            None => None,
        };
        tokens.push_back(PathToken {
            code: code.to_string(),
            location,
        });
    }

    Ok(tokens)
}

/// State threaded through the short-path traversal search.
struct ParseContext {
    parts: VecDeque<PathToken>,
    to_find: PathToken,
    locations: HashMap<String, Location>,
    path: Option<GmodPath>,
}

/// Parses a sparse short-form path by searching the GMOD tree for its
/// unique rooted completion.
pub(crate) fn parse_short_path(
    item: &str,
    gmod: &Arc<Gmod>,
    locations: &Locations,
) -> Result<GmodPath, GmodPathError> {
    if gmod.version() != locations.version() {
        return Err(GmodPathError::VersionMismatch);
    }

    let item = item.trim();
    if item.is_empty() {
        return Err(GmodPathError::Empty);
    }
    let item = item.strip_prefix('/').unwrap_or(item);

    let mut parts = tokenize(item, gmod, locations)?;
    let Some(to_find) = parts.pop_front() else {
        return Err(GmodPathError::NoParts);
    };

    let base = gmod
        .node_id(&to_find.code)
        .ok_or_else(|| GmodPathError::NodeNotFound(to_find.code.clone()))?;

    if gmod[base].is_root() && parts.is_empty() && to_find.location.is_none() {
        return Ok(GmodPath::new(
            gmod.clone(),
            Vec::new(),
            PathNode::new(base, None),
        )?);
    }

    let mut context = ParseContext {
        parts,
        to_find,
        locations: HashMap::new(),
        path: None,
    };

    let mut handler = |context: &mut ParseContext,
                       parents: &[NodeId],
                       current: NodeId|
     -> TraversalControl {
        let found = gmod[current].code() == context.to_find.code;
        if !found && gmod[current].metadata().is_leaf() {
            return TraversalControl::SkipSubtree;
        }
        if !found {
            return TraversalControl::Continue;
        }

        if let Some(location) = &context.to_find.location {
            context
                .locations
                .insert(context.to_find.code.clone(), location.clone());
        }

        if let Some(next) = context.parts.pop_front() {
            context.to_find = next;
            return TraversalControl::Continue;
        }

        // last token matched: assemble the rooted path
        let mut path_parents: Vec<PathNode> = parents
            .iter()
            .map(|&p| {
                PathNode::new(p, context.locations.get(gmod[p].code()).cloned())
            })
            .collect();
        let end = PathNode::new(current, context.to_find.location.clone());

        // walk the unique-parent prefix up to the root
        let start = match path_parents.first() {
            Some(first) if gmod[first.id].parents().len() == 1 => {
                Some(gmod[first.id].parents()[0])
            }
            Some(_) => None,
            None if gmod[end.id].parents().len() == 1 => Some(gmod[end.id].parents()[0]),
            None => None,
        };
        let Some(mut start) = start else {
            return TraversalControl::Stop;
        };
        if gmod[start].parents().len() > 1 {
            return TraversalControl::Stop;
        }

        while gmod[start].parents().len() == 1 {
            if !path_parents.iter().any(|p| p.id == start) {
                path_parents.insert(0, PathNode::new(start, None));
            }
            start = gmod[start].parents()[0];
            if gmod[start].parents().len() > 1 {
                return TraversalControl::Stop;
            }
        }
        if !path_parents.iter().any(|p| gmod[p.id].is_root()) {
            path_parents.insert(0, PathNode::new(gmod.root(), None));
        }

        // propagate each set's location across its members
        let mut end = end;
        let mut visitor = LocationSetsVisitor::new();
        for i in 0..=path_parents.len() {
            let set = match visitor.visit(i, &path_parents, &end, gmod) {
                Ok(set) => set,
                Err(_) => return TraversalControl::Stop,
            };
            let Some((set_start, set_end, location)) = set else {
                let node = if i < path_parents.len() {
                    &path_parents[i]
                } else {
                    &end
                };
                if node.location().is_some() {
                    return TraversalControl::Stop;
                }
                continue;
            };
            if set_start == set_end {
                continue;
            }
            let Some(location) = location else {
                continue;
            };
            for j in set_start..=set_end {
                if j < path_parents.len() {
                    path_parents[j].location = Some(location.clone());
                } else {
                    end.location = Some(location.clone());
                }
            }
        }

        match GmodPath::new(gmod.clone(), path_parents, end) {
            Ok(path) => {
                context.path = Some(path);
                TraversalControl::Stop
            }
            Err(_) => TraversalControl::Stop,
        }
    };

    gmod.traverse(
        &mut context,
        base,
        &mut handler,
        &TraversalOptions::default(),
    );

    context.path.ok_or(GmodPathError::NotFound)
}

/// Parses a full-form path (`VE/…/target`) by direct linear validation.
pub(crate) fn parse_full_path(
    item: &str,
    gmod: &Arc<Gmod>,
    locations: &Locations,
) -> Result<GmodPath, GmodPathError> {
    if item.is_empty() {
        return Err(GmodPathError::Empty);
    }
    if !item.starts_with(gmod.root_node().code()) {
        return Err(GmodPathError::MissingRoot(
            gmod.root_node().code().to_string(),
        ));
    }

    let tokens = tokenize(item, gmod, locations)?;
    let mut nodes: Vec<PathNode> = tokens
        .into_iter()
        .map(|t| {
            let id = gmod
                .node_id(&t.code)
                .ok_or_else(|| GmodPathError::NodeNotFound(t.code.clone()))?;
            Ok(PathNode::new(id, t.location))
        })
        .collect::<Result<_, GmodPathError>>()?;

    let Some(end) = nodes.pop() else {
        return Err(GmodPathError::NoParts);
    };

    if nodes.is_empty() {
        return GmodPath::new(gmod.clone(), Vec::new(), end);
    }
    if !gmod[nodes[0].id].is_root() || !GmodPath::is_valid(gmod, &nodes, &end) {
        return Err(GmodPathError::InvalidSequence);
    }

    let has_locations =
        end.location().is_some() || nodes.iter().any(|n| n.location().is_some());
    if !has_locations {
        return GmodPath::new(gmod.clone(), nodes, end);
    }

    // first pass: propagate set locations, remembering the set ranges and
    // rejecting stray locations between sets
    let mut end = end;
    let mut visitor = LocationSetsVisitor::new();
    let mut prev_non_null_location: Option<usize> = None;
    let mut sets: Vec<(usize, usize)> = Vec::new();

    for i in 0..=nodes.len() {
        let set = visitor.visit(i, &nodes, &end, gmod)?;
        let Some((set_start, set_end, location)) = set else {
            let node = if i < nodes.len() { &nodes[i] } else { &end };
            if prev_non_null_location.is_none() && node.location().is_some() {
                prev_non_null_location = Some(i);
            }
            continue;
        };

        if let Some(prev) = prev_non_null_location {
            for j in prev..set_start {
                let node = if j < nodes.len() { &nodes[j] } else { &end };
                if node.location().is_some() {
                    return Err(GmodPathError::UnexpectedIndividualization);
                }
            }
        }
        prev_non_null_location = None;
        sets.push((set_start, set_end));

        if set_start == set_end {
            continue;
        }
        let Some(location) = location else {
            continue;
        };
        for j in set_start..=set_end {
            if j < nodes.len() {
                nodes[j].location = Some(location.clone());
            } else {
                end.location = Some(location.clone());
            }
        }
    }

    // second pass: every node inside a set carries the set's location,
    // every node outside carries none
    let mut current_set: Option<(usize, usize)> = None;
    let mut set_index = 0usize;

    for i in 0..=nodes.len() {
        while set_index < sets.len() && current_set.map_or(true, |(_, e)| e < i) {
            current_set = Some(sets[set_index]);
            set_index += 1;
        }

        let inside = current_set.is_some_and(|(s, e)| i >= s && i <= e);
        let node = if i < nodes.len() { &nodes[i] } else { &end };

        if inside {
            let (_, set_end) = current_set.unwrap_or((i, i));
            let expected = if set_end < nodes.len() {
                nodes[set_end].location()
            } else {
                end.location()
            };
            if node.location() != expected {
                return Err(GmodPathError::InconsistentSetLocations);
            }
        } else if node.location().is_some() {
            return Err(GmodPathError::UnexpectedIndividualization);
        }
    }

    GmodPath::new(gmod.clone(), nodes, end)
}
