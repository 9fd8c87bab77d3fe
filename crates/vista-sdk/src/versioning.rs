use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use vista_resources::schema::versioning::GmodVersioningMapDto;
use vista_types::VisVersion;

use crate::error::{ConversionError, VisError};
use crate::gmod::{Gmod, NodeId};
use crate::gmod_path::{GmodPath, PathNode};
use crate::local_id::{LocalId, LocalIdBuilder};
use crate::locations::Location;
use crate::vis::Vis;

/// Operation tags of the per-step conversion tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionType {
    ChangeCode,
    Merge,
    Move,
    AssignmentChange,
    AssignmentDelete,
}

impl ConversionType {
    fn parse(value: &str) -> Option<ConversionType> {
        match value {
            "changeCode" => Some(ConversionType::ChangeCode),
            "merge" => Some(ConversionType::Merge),
            "move" => Some(ConversionType::Move),
            "assignmentChange" => Some(ConversionType::AssignmentChange),
            "assignmentDelete" => Some(ConversionType::AssignmentDelete),
            _ => None,
        }
    }
}

/// One node's conversion rule within a version step.
#[derive(Debug, Clone)]
pub struct GmodNodeConversion {
    source: String,
    target: Option<String>,
    operations: HashSet<ConversionType>,
    old_assignment: Option<String>,
    new_assignment: Option<String>,
    delete_assignment: bool,
}

impl GmodNodeConversion {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn operations(&self) -> &HashSet<ConversionType> {
        &self.operations
    }

    pub fn old_assignment(&self) -> Option<&str> {
        self.old_assignment.as_deref()
    }

    pub fn new_assignment(&self) -> Option<&str> {
        self.new_assignment.as_deref()
    }

    pub fn delete_assignment(&self) -> bool {
        self.delete_assignment
    }
}

/// The cross-version conversion tables: one map of per-code rules for each
/// adjacent version step, keyed by the step's target version.
#[derive(Debug)]
pub struct GmodVersioning {
    map: HashMap<VisVersion, HashMap<String, GmodNodeConversion>>,
}

impl GmodVersioning {
    pub(crate) fn new(dto: &GmodVersioningMapDto) -> Result<Self, VisError> {
        let mut map = HashMap::with_capacity(dto.len());

        for (version_str, step) in dto {
            let version = VisVersion::from_str(version_str).map_err(|_| {
                VisError::InvalidData(format!(
                    "unknown VIS version '{version_str}' in versioning payload"
                ))
            })?;

            let mut changes = HashMap::with_capacity(step.items.len());
            for (code, item) in &step.items {
                let mut operations = HashSet::new();
                for op in &item.operations {
                    let parsed = ConversionType::parse(op).ok_or_else(|| {
                        VisError::InvalidData(format!(
                            "unknown conversion operation '{op}' for {code} -> {version}"
                        ))
                    })?;
                    operations.insert(parsed);
                }
                changes.insert(
                    code.clone(),
                    GmodNodeConversion {
                        source: item.source.clone(),
                        target: item.target.clone(),
                        operations,
                        old_assignment: item.old_assignment.clone(),
                        new_assignment: item.new_assignment.clone(),
                        delete_assignment: item.delete_assignment,
                    },
                );
            }
            map.insert(version, changes);
        }

        Ok(Self { map })
    }

    /// The conversion rule for `code` in the step targeting `version`.
    pub fn code_changes(&self, version: VisVersion, code: &str) -> Option<&GmodNodeConversion> {
        self.map.get(&version)?.get(code)
    }

    /// Converts a single node step-by-step from `source_version` to
    /// `target_version`.
    ///
    /// Every step prefers its table rule and falls back to a direct lookup
    /// in the step's Gmod; the location carries over whenever the target
    /// node can be individualized.
    pub fn convert_node(
        &self,
        vis: &Vis,
        source_version: VisVersion,
        code: &str,
        location: Option<&Location>,
        target_version: VisVersion,
    ) -> Result<(String, Option<Location>), ConversionError> {
        if source_version > target_version {
            return Err(ConversionError::InvalidVersionPair {
                source_version,
                target: target_version,
            });
        }

        let mut code = code.to_string();
        let mut location = location.cloned();
        let mut version = source_version;

        while version < target_version {
            let Some(next) = version.successor() else {
                break;
            };
            let gmod = vis.gmod(next)?;

            let step_code = self
                .code_changes(next, &code)
                .and_then(|change| change.target())
                .unwrap_or(&code);
            let Some(id) = gmod.node_id(step_code) else {
                return Err(ConversionError::NodeNotConvertible {
                    code: code.clone(),
                    version: next,
                });
            };

            code = gmod[id].code().to_string();
            location = match location {
                Some(loc) if gmod[id].is_individualizable(false, true) => Some(loc),
                _ => None,
            };
            version = next;
        }

        Ok((code, location))
    }

    /// Converts a whole path, rebuilding intermediate chains where the
    /// target version's tree changed shape.
    pub fn convert_path(
        &self,
        vis: &Vis,
        path: &GmodPath,
        target_version: VisVersion,
    ) -> Result<GmodPath, ConversionError> {
        let source_version = path.version();
        if source_version == target_version {
            return Ok(path.clone());
        }
        if source_version > target_version {
            return Err(ConversionError::InvalidVersionPair {
                source_version,
                target: target_version,
            });
        }

        let target_gmod = vis.gmod(target_version)?;

        let (end_code, end_location) = self.convert_node(
            vis,
            source_version,
            path.target_node().code(),
            path.target().location(),
            target_version,
        )?;
        let end_id =
            target_gmod
                .node_id(&end_code)
                .ok_or_else(|| ConversionError::NodeNotConvertible {
                    code: end_code.clone(),
                    version: target_version,
                })?;

        if target_gmod[end_id].is_root() {
            return GmodPath::new(
                target_gmod.clone(),
                Vec::new(),
                PathNode::new(end_id, None),
            )
            .map_err(|_| ConversionError::InvalidTargetPath);
        }

        // qualify every source node independently
        struct Qualifying {
            source_code: String,
            source_assignment: Option<String>,
            target_id: NodeId,
            target_location: Option<Location>,
            target_assignment: Option<String>,
        }

        let source_gmod = path.gmod();
        let mut qualifying: Vec<Qualifying> = Vec::with_capacity(path.len());
        for (depth, path_node) in path.iter() {
            let source_node = path.gmod_node(depth);
            let (code, location) = self.convert_node(
                vis,
                source_version,
                source_node.code(),
                path_node.location(),
                target_version,
            )?;
            let target_id =
                target_gmod
                    .node_id(&code)
                    .ok_or_else(|| ConversionError::NodeNotConvertible {
                        code: code.clone(),
                        version: target_version,
                    })?;
            qualifying.push(Qualifying {
                source_code: source_node.code().to_string(),
                source_assignment: source_gmod
                    .product_type(path_node.id)
                    .map(|id| source_gmod[id].code().to_string()),
                target_id,
                target_location: location,
                target_assignment: target_gmod
                    .product_type(target_id)
                    .map(|id| target_gmod[id].code().to_string()),
            });
        }

        // the raw qualifying sequence is often already valid
        let potential_parents: Vec<PathNode> = qualifying
            .iter()
            .take(qualifying.len() - 1)
            .map(|q| PathNode::new(q.target_id, q.target_location.clone()))
            .collect();
        let end_node = PathNode::new(end_id, end_location.clone());
        if GmodPath::is_valid(&target_gmod, &potential_parents, &end_node) {
            return GmodPath::new(target_gmod.clone(), potential_parents, end_node)
                .map_err(|_| ConversionError::InvalidTargetPath);
        }

        // otherwise rebuild incrementally
        let mut acc: Vec<PathNode> = Vec::with_capacity(qualifying.len());
        let mut i = 0usize;
        while i < qualifying.len() {
            let q = &qualifying[i];
            let target_code = target_gmod[q.target_id].code();
            if i > 0 && target_code == target_gmod[qualifying[i - 1].target_id].code() {
                i += 1;
                continue;
            }

            let code_changed = q.source_code != target_code;
            let assignment_changed = q.source_assignment != q.target_assignment;

            if code_changed || assignment_changed {
                add_to_path(
                    &target_gmod,
                    &mut acc,
                    PathNode::new(q.target_id, q.target_location.clone()),
                )?;
            }

            if !code_changed && assignment_changed {
                let was_deleted = q.source_assignment.is_some() && q.target_assignment.is_none();
                if was_deleted {
                    if target_code == end_code
                        && i + 1 < qualifying.len()
                        && target_gmod[qualifying[i + 1].target_id].code() != target_code
                    {
                        return Err(ConversionError::AssignmentEndNodeDeleted);
                    }
                    i += 1;
                    continue;
                }
                if target_code != end_code {
                    if let Some(assignment_code) = &q.target_assignment {
                        let assignment_id = target_gmod.node_id(assignment_code).ok_or_else(
                            || ConversionError::NodeNotConvertible {
                                code: assignment_code.clone(),
                                version: target_version,
                            },
                        )?;
                        let location = q.target_location.clone().filter(|_| {
                            target_gmod[assignment_id].is_individualizable(false, true)
                        });
                        add_to_path(
                            &target_gmod,
                            &mut acc,
                            PathNode::new(assignment_id, location),
                        )?;
                        // the next qualifying node was the old assignment
                        i += 1;
                    }
                }
            }

            if !code_changed && !assignment_changed {
                add_to_path(
                    &target_gmod,
                    &mut acc,
                    PathNode::new(q.target_id, q.target_location.clone()),
                )?;
            }

            if let Some(last) = acc.last() {
                if target_gmod[last.id].code() == end_code {
                    break;
                }
            }
            i += 1;
        }

        let Some(end_node) = acc.pop() else {
            return Err(ConversionError::EmptyPath);
        };
        GmodPath::new(target_gmod.clone(), acc, end_node)
            .map_err(|_| ConversionError::InvalidTargetPath)
    }

    /// Converts a LocalId builder: both item paths are converted, metadata
    /// tags and the verbose flag carry over verbatim.
    pub fn convert_local_id_builder(
        &self,
        vis: &Vis,
        source: &LocalIdBuilder,
        target_version: VisVersion,
    ) -> Result<LocalIdBuilder, ConversionError> {
        if source.vis_version().is_none() {
            return Err(ConversionError::MissingVisVersion);
        }

        let mut target = LocalIdBuilder::create(target_version);
        if let Some(primary) = source.primary_item() {
            target = target.with_primary_item(self.convert_path(vis, primary, target_version)?);
        }
        if let Some(secondary) = source.secondary_item() {
            target =
                target.with_secondary_item(self.convert_path(vis, secondary, target_version)?);
        }

        Ok(target
            .with_verbose_mode(source.is_verbose_mode())
            .try_with_metadata_tag(source.quantity())
            .try_with_metadata_tag(source.content())
            .try_with_metadata_tag(source.calculation())
            .try_with_metadata_tag(source.state())
            .try_with_metadata_tag(source.command())
            .try_with_metadata_tag(source.kind())
            .try_with_metadata_tag(source.position())
            .try_with_metadata_tag(source.detail()))
    }

    /// Converts a complete LocalId.
    pub fn convert_local_id(
        &self,
        vis: &Vis,
        source: &LocalId,
        target_version: VisVersion,
    ) -> Result<LocalId, ConversionError> {
        let builder = self.convert_local_id_builder(vis, source.builder(), target_version)?;
        Ok(builder.build()?)
    }
}

/// Appends `node` onto the accumulated chain, searching the target Gmod for
/// an intermediate chain when the current tail is not a direct parent.
/// Unreachable tail nodes are dropped, except the last asset-function node.
fn add_to_path(
    gmod: &Gmod,
    acc: &mut Vec<PathNode>,
    node: PathNode,
) -> Result<(), ConversionError> {
    let Some(prev) = acc.last() else {
        acc.push(node);
        return Ok(());
    };
    if gmod[prev.id].is_child(gmod[node.id].code()) {
        acc.push(node);
        return Ok(());
    }

    let mut j = acc.len() as isize - 1;
    while j >= 0 {
        let prefix: Vec<NodeId> = acc[..=(j as usize)].iter().map(|p| p.id).collect();
        match gmod.path_exists_between(&prefix, node.id) {
            None => {
                let parent_code = gmod[acc[j as usize].id].code().to_string();
                let has_other_asset_function = prefix.iter().any(|&id| {
                    gmod[id].metadata().is_asset_function() && gmod[id].code() != parent_code
                });
                if !has_other_asset_function {
                    return Err(ConversionError::RemovedLastAssetFunction);
                }
                acc.remove(j as usize);
                j -= 1;
            }
            Some(remaining) => {
                for intermediate in remaining {
                    let location = node
                        .location()
                        .filter(|_| gmod[intermediate].is_individualizable(false, true))
                        .cloned();
                    acc.push(PathNode::new(intermediate, location));
                }
                break;
            }
        }
    }

    acc.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_type_parse() {
        assert_eq!(
            ConversionType::parse("changeCode"),
            Some(ConversionType::ChangeCode)
        );
        assert_eq!(
            ConversionType::parse("assignmentChange"),
            Some(ConversionType::AssignmentChange)
        );
        assert_eq!(ConversionType::parse("rename"), None);
    }

    #[test]
    fn test_tables_decode() {
        let dto = vista_resources::versioning_dto().unwrap();
        let versioning = GmodVersioning::new(&dto).unwrap();

        let change = versioning
            .code_changes(VisVersion::V3_5a, "C101.64i")
            .unwrap();
        assert_eq!(change.source(), "C101.64i");
        assert_eq!(change.target(), Some("C101.64"));
        assert!(change.operations().contains(&ConversionType::ChangeCode));
        assert!(!change.delete_assignment());

        let change = versioning
            .code_changes(VisVersion::V3_7a, "C101.63")
            .unwrap();
        assert_eq!(change.target(), None);
        assert_eq!(change.old_assignment(), Some("S206"));
        assert_eq!(change.new_assignment(), Some("S207"));

        // steps without structural code changes have no table at all
        assert!(versioning.code_changes(VisVersion::V3_6a, "C221").is_none());
    }

    #[test]
    fn test_unknown_operation_is_fatal() {
        let mut dto = vista_resources::versioning_dto().unwrap();
        if let Some(step) = dto.get_mut("3-5a") {
            if let Some(item) = step.items.get_mut("C101.64i") {
                item.operations = vec!["teleport".to_string()];
            }
        }
        assert!(GmodVersioning::new(&dto).is_err());
    }
}
