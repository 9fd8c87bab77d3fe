use std::collections::{HashMap, HashSet};

use vista_resources::schema::gmod::GmodNodeDto;

use crate::gmod::NodeId;

/// Descriptive metadata of a GMOD node.
///
/// The four node-classification predicates of the GMOD rule set are pure
/// functions of the category/type strings and live here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmodNodeMetadata {
    category: String,
    node_type: String,
    name: String,
    common_name: Option<String>,
    definition: Option<String>,
    common_definition: Option<String>,
    install_substructure: Option<bool>,
    normal_assignment_names: HashMap<String, String>,
    full_type: String,
}

impl GmodNodeMetadata {
    fn new(dto: &GmodNodeDto) -> Self {
        let full_type = format!("{} {}", dto.category, dto.node_type);
        Self {
            category: dto.category.clone(),
            node_type: dto.node_type.clone(),
            name: dto.name.clone(),
            common_name: dto.common_name.clone(),
            definition: dto.definition.clone(),
            common_definition: dto.common_definition.clone(),
            install_substructure: dto.install_substructure,
            normal_assignment_names: dto.normal_assignment_names.clone(),
            full_type,
        }
    }

    /// Node category (e.g. "ASSET FUNCTION", "PRODUCT").
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Node type (e.g. "GROUP", "SELECTION", "LEAF", "COMPOSITION", "TYPE").
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Computed "category type" string.
    pub fn full_type(&self) -> &str {
        &self.full_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    pub fn common_definition(&self) -> Option<&str> {
        self.common_definition.as_deref()
    }

    pub fn install_substructure(&self) -> Option<bool> {
        self.install_substructure
    }

    /// Display-name overrides keyed by assigned child code.
    pub fn normal_assignment_names(&self) -> &HashMap<String, String> {
        &self.normal_assignment_names
    }

    /// Whether nodes of this type open a new individualizable run:
    /// SELECTION, GROUP and LEAF types do.
    pub fn is_potential_parent(&self) -> bool {
        matches!(self.node_type.as_str(), "SELECTION" | "GROUP" | "LEAF")
    }

    /// ASSET FUNCTION LEAF or PRODUCT FUNCTION LEAF.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.full_type.as_str(),
            "ASSET FUNCTION LEAF" | "PRODUCT FUNCTION LEAF"
        )
    }

    /// Any function node: neither a plain PRODUCT nor a plain ASSET.
    pub fn is_function(&self) -> bool {
        self.category != "PRODUCT" && self.category != "ASSET"
    }

    pub fn is_asset_function(&self) -> bool {
        self.category == "ASSET FUNCTION"
    }

    pub fn is_product_type(&self) -> bool {
        self.category == "PRODUCT" && self.node_type == "TYPE"
    }

    pub fn is_product_selection(&self) -> bool {
        self.category == "PRODUCT" && self.node_type == "SELECTION"
    }

    pub fn is_function_composition(&self) -> bool {
        self.category.contains("FUNCTION") && self.node_type == "COMPOSITION"
    }
}

/// Whether a (parent, child) pair is a product type assignment: a function
/// node with a PRODUCT TYPE child.
pub fn is_product_type_assignment(
    parent: &GmodNodeMetadata,
    child: &GmodNodeMetadata,
) -> bool {
    parent.category().contains("FUNCTION") && child.is_product_type()
}

/// Whether a (parent, child) pair is a product selection assignment: a
/// function node with a PRODUCT SELECTION child.
pub fn is_product_selection_assignment(
    parent: &GmodNodeMetadata,
    child: &GmodNodeMetadata,
) -> bool {
    parent.category().contains("FUNCTION")
        && child.category().contains("PRODUCT")
        && child.node_type() == "SELECTION"
}

/// One node of the GMOD arena.
///
/// Adjacency is expressed as [`NodeId`] indices into the owning
/// [`Gmod`](crate::Gmod); the node itself carries no location — locations
/// belong to path occurrences, not to the shared tree.
#[derive(Debug, Clone)]
pub struct GmodNode {
    code: String,
    metadata: GmodNodeMetadata,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
    child_codes: HashSet<String>,
}

impl GmodNode {
    pub(crate) fn new(dto: &GmodNodeDto) -> Self {
        Self {
            code: dto.code.clone(),
            metadata: GmodNodeMetadata::new(dto),
            children: Vec::new(),
            parents: Vec::new(),
            child_codes: HashSet::new(),
        }
    }

    /// The stable node code (e.g. "VE", "411.1").
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn metadata(&self) -> &GmodNodeMetadata {
        &self.metadata
    }

    /// Child node ids, in relation-declaration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent node ids, in relation-declaration order.
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// O(1) test whether a code names one of this node's children.
    pub fn is_child(&self, code: &str) -> bool {
        self.child_codes.contains(code)
    }

    /// `true` for the tree root ("VE").
    pub fn is_root(&self) -> bool {
        self.code == "VE"
    }

    /// Whether this node may carry a location.
    ///
    /// Group, selection, product-type and plain asset nodes never do;
    /// function compositions only when their code carries the `i` suffix or
    /// they sit inside a multi-node set or at the path target.
    pub fn is_individualizable(&self, is_target: bool, is_in_set: bool) -> bool {
        let m = &self.metadata;
        if m.node_type() == "GROUP" || m.node_type() == "SELECTION" {
            return false;
        }
        if m.is_product_type() {
            return false;
        }
        if m.category() == "ASSET" && m.node_type() == "TYPE" {
            return false;
        }
        if m.is_function_composition() {
            return self.code.ends_with('i') || is_in_set || is_target;
        }
        true
    }

    pub(crate) fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn add_parent(&mut self, parent: NodeId) {
        self.parents.push(parent);
    }

    pub(crate) fn trim(&mut self, child_codes: HashSet<String>) {
        self.children.shrink_to_fit();
        self.parents.shrink_to_fit();
        self.child_codes = child_codes;
    }
}
