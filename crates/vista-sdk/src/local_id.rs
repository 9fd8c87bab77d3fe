use std::fmt;

use vista_types::{CodebookName, MetadataTag, ParsingErrors, VisVersion};

use crate::error::LocalIdError;
use crate::gmod_path::GmodPath;
use crate::local_id_parse;

/// The naming rule every LocalId string starts with.
pub const NAMING_RULE: &str = "dnv-v2";

/// Immutable fluent builder for [`LocalId`] values.
///
/// Every `with_*`/`without_*` call consumes the builder and returns a new
/// one. A builder is buildable once it has a VIS version, a primary item
/// and at least one metadata tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalIdBuilder {
    vis_version: Option<VisVersion>,
    verbose_mode: bool,
    primary_item: Option<GmodPath>,
    secondary_item: Option<GmodPath>,
    quantity: Option<MetadataTag>,
    content: Option<MetadataTag>,
    calculation: Option<MetadataTag>,
    state: Option<MetadataTag>,
    command: Option<MetadataTag>,
    kind: Option<MetadataTag>,
    position: Option<MetadataTag>,
    detail: Option<MetadataTag>,
}

impl LocalIdBuilder {
    /// Starts a builder for one VIS version.
    pub fn create(vis_version: VisVersion) -> Self {
        Self {
            vis_version: Some(vis_version),
            ..Self::default()
        }
    }

    pub fn vis_version(&self) -> Option<VisVersion> {
        self.vis_version
    }

    pub fn is_verbose_mode(&self) -> bool {
        self.verbose_mode
    }

    pub fn primary_item(&self) -> Option<&GmodPath> {
        self.primary_item.as_ref()
    }

    pub fn secondary_item(&self) -> Option<&GmodPath> {
        self.secondary_item.as_ref()
    }

    pub fn quantity(&self) -> Option<&MetadataTag> {
        self.quantity.as_ref()
    }

    pub fn content(&self) -> Option<&MetadataTag> {
        self.content.as_ref()
    }

    pub fn calculation(&self) -> Option<&MetadataTag> {
        self.calculation.as_ref()
    }

    pub fn state(&self) -> Option<&MetadataTag> {
        self.state.as_ref()
    }

    pub fn command(&self) -> Option<&MetadataTag> {
        self.command.as_ref()
    }

    pub fn kind(&self) -> Option<&MetadataTag> {
        self.kind.as_ref()
    }

    pub fn position(&self) -> Option<&MetadataTag> {
        self.position.as_ref()
    }

    pub fn detail(&self) -> Option<&MetadataTag> {
        self.detail.as_ref()
    }

    /// All set tags, in canonical print order.
    pub fn metadata_tags(&self) -> impl Iterator<Item = &MetadataTag> {
        [
            &self.quantity,
            &self.content,
            &self.calculation,
            &self.state,
            &self.command,
            &self.kind,
            &self.position,
            &self.detail,
        ]
        .into_iter()
        .flatten()
    }

    pub fn with_vis_version(mut self, vis_version: VisVersion) -> Self {
        self.vis_version = Some(vis_version);
        self
    }

    pub fn without_vis_version(mut self) -> Self {
        self.vis_version = None;
        self
    }

    pub fn with_primary_item(mut self, path: GmodPath) -> Self {
        self.primary_item = Some(path);
        self
    }

    pub fn without_primary_item(mut self) -> Self {
        self.primary_item = None;
        self
    }

    pub fn with_secondary_item(mut self, path: GmodPath) -> Self {
        self.secondary_item = Some(path);
        self
    }

    pub fn without_secondary_item(mut self) -> Self {
        self.secondary_item = None;
        self
    }

    pub fn with_verbose_mode(mut self, verbose: bool) -> Self {
        self.verbose_mode = verbose;
        self
    }

    /// Stores a tag in its codebook's slot, replacing any earlier tag for
    /// that codebook. Only the eight content-group codebooks are allowed.
    pub fn with_metadata_tag(mut self, tag: MetadataTag) -> Result<Self, LocalIdError> {
        let slot = match tag.name() {
            CodebookName::Quantity => &mut self.quantity,
            CodebookName::Content => &mut self.content,
            CodebookName::Calculation => &mut self.calculation,
            CodebookName::State => &mut self.state,
            CodebookName::Command => &mut self.command,
            CodebookName::Type => &mut self.kind,
            CodebookName::Position => &mut self.position,
            CodebookName::Detail => &mut self.detail,
            unsupported => return Err(LocalIdError::UnsupportedCodebook(unsupported)),
        };
        *slot = Some(tag);
        Ok(self)
    }

    /// Like [`LocalIdBuilder::with_metadata_tag`] but silently ignores
    /// absent or unsupported tags.
    pub fn try_with_metadata_tag(self, tag: Option<&MetadataTag>) -> Self {
        match tag {
            Some(tag) => {
                let fallback = self.clone();
                self.with_metadata_tag(tag.clone()).unwrap_or(fallback)
            }
            None => self,
        }
    }

    pub fn without_metadata_tag(mut self, name: CodebookName) -> Self {
        match name {
            CodebookName::Quantity => self.quantity = None,
            CodebookName::Content => self.content = None,
            CodebookName::Calculation => self.calculation = None,
            CodebookName::State => self.state = None,
            CodebookName::Command => self.command = None,
            CodebookName::Type => self.kind = None,
            CodebookName::Position => self.position = None,
            CodebookName::Detail => self.detail = None,
            _ => {}
        }
        self
    }

    /// Whether [`LocalIdBuilder::build`] would succeed.
    pub fn is_valid(&self) -> bool {
        self.vis_version.is_some()
            && self.primary_item.is_some()
            && self.metadata_tags().next().is_some()
    }

    /// Whether nothing has been set besides the version.
    pub fn is_empty(&self) -> bool {
        self.primary_item.is_none()
            && self.secondary_item.is_none()
            && self.metadata_tags().next().is_none()
    }

    pub fn build(self) -> Result<LocalId, LocalIdError> {
        if !self.is_valid() {
            return Err(LocalIdError::Incomplete);
        }
        Ok(LocalId { builder: self })
    }
}

impl fmt::Display for LocalIdBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(64);

        out.push('/');
        out.push_str(NAMING_RULE);

        if let Some(version) = self.vis_version {
            out.push_str("/vis-");
            out.push_str(version.as_str());
        }

        if let Some(primary) = &self.primary_item {
            out.push('/');
            out.push_str(&primary.to_string());
            out.push('/');
        }

        if let Some(secondary) = &self.secondary_item {
            out.push_str("sec/");
            out.push_str(&secondary.to_string());
            out.push('/');
        }

        if self.verbose_mode {
            if let Some(primary) = &self.primary_item {
                append_verbose_names(&mut out, primary, "~");
            }
            if let Some(secondary) = &self.secondary_item {
                append_verbose_names(&mut out, secondary, "~for.");
            }
        }

        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str("meta/");
        for tag in self.metadata_tags() {
            out.push_str(&tag.to_string());
            out.push('/');
        }

        if out.ends_with('/') {
            out.pop();
        }
        f.write_str(&out)
    }
}

/// Appends one `~name[.location]/` segment per function node of the path's
/// short form. The prefix applies to the first segment only; subsequent
/// segments fall back to `~`.
fn append_verbose_names(out: &mut String, path: &GmodPath, first_prefix: &str) {
    let mut prefix = first_prefix;
    for (depth, name) in path.common_names() {
        out.push_str(prefix);
        prefix = "~";
        append_normalized_common_name(out, &name);
        if let Some(location) = path.path_node(depth).location() {
            out.push('.');
            out.push_str(location.as_str());
        }
        out.push('/');
    }
}

/// Normalizes a common name for the verbose segments: lowercased,
/// whitespace runs become single dots, the characters `/()&,` are removed,
/// consecutive dots collapse.
fn append_normalized_common_name(out: &mut String, name: &str) {
    let mut prev = '\0';
    let mut pending_space = false;

    for ch in name.trim().chars() {
        if matches!(ch, '/' | '(' | ')' | ',' | '&') {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            pending_space = false;
            if prev != '.' {
                out.push('.');
                prev = '.';
            }
        }
        let current = if ch == '.' { '.' } else { ch.to_ascii_lowercase() };
        if current == '.' && prev == '.' {
            continue;
        }
        out.push(current);
        prev = current;
    }
}

/// A complete VIS Local ID: the identifier of one data channel on one
/// vessel, without the vessel scope.
///
/// Always valid by construction; obtained from [`LocalIdBuilder::build`]
/// or the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalId {
    builder: LocalIdBuilder,
}

impl LocalId {
    /// Parses the canonical string form.
    pub fn parse(input: &str) -> Result<LocalId, LocalIdError> {
        let mut errors = ParsingErrors::new();
        local_id_parse::parse_with_errors(input, &mut errors)
            .ok_or(LocalIdError::Parse(errors))
    }

    /// Parse variant that records every problem found into `errors`.
    pub fn parse_with_errors(input: &str, errors: &mut ParsingErrors) -> Option<LocalId> {
        local_id_parse::parse_with_errors(input, errors)
    }

    /// The underlying builder, for further derivation.
    pub fn builder(&self) -> &LocalIdBuilder {
        &self.builder
    }

    /// Consumes the id, yielding its builder.
    pub fn into_builder(self) -> LocalIdBuilder {
        self.builder
    }

    pub fn vis_version(&self) -> VisVersion {
        self.builder
            .vis_version
            .expect("a built LocalId always has a VIS version")
    }

    pub fn is_verbose_mode(&self) -> bool {
        self.builder.verbose_mode
    }

    /// The primary item path.
    pub fn primary_item(&self) -> &GmodPath {
        self.builder
            .primary_item
            .as_ref()
            .expect("a built LocalId always has a primary item")
    }

    pub fn secondary_item(&self) -> Option<&GmodPath> {
        self.builder.secondary_item.as_ref()
    }

    pub fn metadata_tags(&self) -> impl Iterator<Item = &MetadataTag> {
        self.builder.metadata_tags()
    }

    pub fn quantity(&self) -> Option<&MetadataTag> {
        self.builder.quantity()
    }

    pub fn content(&self) -> Option<&MetadataTag> {
        self.builder.content()
    }

    pub fn calculation(&self) -> Option<&MetadataTag> {
        self.builder.calculation()
    }

    pub fn state(&self) -> Option<&MetadataTag> {
        self.builder.state()
    }

    pub fn command(&self) -> Option<&MetadataTag> {
        self.builder.command()
    }

    pub fn kind(&self) -> Option<&MetadataTag> {
        self.builder.kind()
    }

    pub fn position(&self) -> Option<&MetadataTag> {
        self.builder.position()
    }

    pub fn detail(&self) -> Option<&MetadataTag> {
        self.builder.detail()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.builder.fmt(f)
    }
}
