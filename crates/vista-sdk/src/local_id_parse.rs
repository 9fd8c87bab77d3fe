use std::fmt;
use std::str::FromStr;

use vista_types::{CodebookName, MetadataTag, ParsingErrors, VisVersion};

use crate::codebooks::Codebooks;
use crate::gmod_path::GmodPath;
use crate::local_id::{LocalId, LocalIdBuilder, NAMING_RULE};
use crate::vis::Vis;

/// Parser state for LocalId/UniversalId strings; doubles as the state tag
/// attached to accumulated errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalIdParsingState {
    NamingRule,
    VisVersion,
    PrimaryItem,
    SecondaryItem,
    ItemDescription,
    MetaQuantity,
    MetaContent,
    MetaCalculation,
    MetaState,
    MetaCommand,
    MetaType,
    MetaPosition,
    MetaDetail,
    EmptyState,
    Formatting,
    Completeness,
    NamingEntity,
    ImoNumber,
}

impl LocalIdParsingState {
    /// The state tag as printed in error reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalIdParsingState::NamingRule => "NamingRule",
            LocalIdParsingState::VisVersion => "VisVersion",
            LocalIdParsingState::PrimaryItem => "PrimaryItem",
            LocalIdParsingState::SecondaryItem => "SecondaryItem",
            LocalIdParsingState::ItemDescription => "ItemDescription",
            LocalIdParsingState::MetaQuantity => "MetaQuantity",
            LocalIdParsingState::MetaContent => "MetaContent",
            LocalIdParsingState::MetaCalculation => "MetaCalculation",
            LocalIdParsingState::MetaState => "MetaState",
            LocalIdParsingState::MetaCommand => "MetaCommand",
            LocalIdParsingState::MetaType => "MetaType",
            LocalIdParsingState::MetaPosition => "MetaPosition",
            LocalIdParsingState::MetaDetail => "MetaDetail",
            LocalIdParsingState::EmptyState => "EmptyState",
            LocalIdParsingState::Formatting => "Formatting",
            LocalIdParsingState::Completeness => "Completeness",
            LocalIdParsingState::NamingEntity => "NamingEntity",
            LocalIdParsingState::ImoNumber => "IMONumber",
        }
    }
}

impl fmt::Display for LocalIdParsingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulates `(state, message)` pairs during a parse.
#[derive(Debug, Default)]
pub(crate) struct LocalIdParsingErrorBuilder {
    errors: Vec<(LocalIdParsingState, String)>,
}

impl LocalIdParsingErrorBuilder {
    pub(crate) fn add(&mut self, state: LocalIdParsingState, message: impl Into<String>) {
        self.errors.push((state, message.into()));
    }

    pub(crate) fn drain_into(self, errors: &mut ParsingErrors) {
        for (state, message) in self.errors {
            errors.push(state.as_str(), message);
        }
    }
}

fn find_next(s: &str, pos: usize, ch: char) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    s[pos..].find(ch).map_or(s.len(), |i| pos + i)
}

fn extract_segment<'a>(s: &'a str, pos: &mut usize) -> &'a str {
    if *pos >= s.len() {
        return "";
    }
    let start = *pos;
    let end = find_next(s, start, '/');
    *pos = end;
    &s[start..end]
}

fn skip_slash(pos: &mut usize) {
    *pos += 1;
}

fn parse_naming_rule(
    s: &str,
    pos: &mut usize,
    errors: &mut LocalIdParsingErrorBuilder,
) -> bool {
    let segment = extract_segment(s, pos);
    if segment.is_empty() {
        errors.add(LocalIdParsingState::NamingRule, "Missing naming rule");
        return false;
    }
    if segment != NAMING_RULE {
        errors.add(
            LocalIdParsingState::NamingRule,
            format!("Invalid naming rule, expected '{NAMING_RULE}', got '{segment}'"),
        );
        return false;
    }
    skip_slash(pos);
    true
}

fn parse_vis_version(
    s: &str,
    pos: &mut usize,
    errors: &mut LocalIdParsingErrorBuilder,
) -> Option<VisVersion> {
    let segment = extract_segment(s, pos);
    if segment.is_empty() {
        errors.add(LocalIdParsingState::VisVersion, "Missing VIS version");
        return None;
    }
    let Some(version_str) = segment.strip_prefix("vis-") else {
        errors.add(
            LocalIdParsingState::VisVersion,
            format!("Invalid VIS version format, expected 'vis-X-Ya', got '{segment}'"),
        );
        return None;
    };
    let Ok(version) = VisVersion::from_str(version_str) else {
        errors.add(
            LocalIdParsingState::VisVersion,
            format!("Unknown VIS version: '{version_str}'"),
        );
        return None;
    };
    skip_slash(pos);
    Some(version)
}

/// Finds the end of a path section: the slash preceding `sec`, `meta` or a
/// `~` verbose segment, or the end of input.
fn scan_path_end(s: &str, start: usize, stop_at_sec: bool) -> usize {
    let mut path_end = start;
    loop {
        let next_slash = find_next(s, path_end, '/');
        if next_slash >= s.len() {
            return s.len();
        }
        let peek = next_slash + 1;
        if peek < s.len() {
            let remaining = &s[peek..];
            if stop_at_sec && remaining.starts_with("sec") {
                return next_slash;
            }
            if remaining.starts_with("meta") {
                return next_slash;
            }
            if remaining.starts_with('~') {
                return next_slash;
            }
        }
        path_end = next_slash + 1;
    }
}

fn parse_item(
    s: &str,
    pos: &mut usize,
    vis: &Vis,
    version: VisVersion,
    state: LocalIdParsingState,
    stop_at_sec: bool,
    errors: &mut LocalIdParsingErrorBuilder,
) -> Option<GmodPath> {
    let start = (*pos).min(s.len());
    let path_end = scan_path_end(s, start, stop_at_sec);

    if path_end <= start {
        let what = match state {
            LocalIdParsingState::PrimaryItem => "Missing primary item",
            _ => "Missing secondary item after /sec/",
        };
        errors.add(state, what);
        return None;
    }

    let path_str = &s[start..path_end];
    *pos = path_end;
    if *pos < s.len() && s[*pos..].starts_with('/') {
        skip_slash(pos);
    }

    let (gmod, locations) = match (vis.gmod(version), vis.locations(version)) {
        (Ok(gmod), Ok(locations)) => (gmod, locations),
        _ => {
            errors.add(
                state,
                format!("Failed to load reference data for VIS version {version}"),
            );
            return None;
        }
    };

    match GmodPath::from_string(path_str, &gmod, &locations) {
        Ok(path) => Some(path),
        Err(err) => {
            let what = match state {
                LocalIdParsingState::PrimaryItem => "primary item",
                _ => "secondary item",
            };
            errors.add(state, format!("Invalid GMOD path in {what}: '{path_str}'"));
            errors.add(state, err.to_string());
            None
        }
    }
}

fn meta_state_for_prefix(prefix: &str) -> Option<LocalIdParsingState> {
    match prefix {
        "qty" => Some(LocalIdParsingState::MetaQuantity),
        "cnt" => Some(LocalIdParsingState::MetaContent),
        "calc" => Some(LocalIdParsingState::MetaCalculation),
        "state" => Some(LocalIdParsingState::MetaState),
        "cmd" => Some(LocalIdParsingState::MetaCommand),
        "type" => Some(LocalIdParsingState::MetaType),
        "pos" => Some(LocalIdParsingState::MetaPosition),
        "detail" => Some(LocalIdParsingState::MetaDetail),
        _ => None,
    }
}

fn parse_metadata_tag(
    segment: &str,
    codebooks: &Codebooks,
    state: LocalIdParsingState,
    errors: &mut LocalIdParsingErrorBuilder,
) -> Option<MetadataTag> {
    let sep = segment.find(['-', '~'])?;
    let prefix = &segment[..sep];
    let value = &segment[sep + 1..];

    let Ok(name) = CodebookName::from_prefix(prefix) else {
        errors.add(state, format!("Unknown metadata tag prefix: '{prefix}'"));
        return None;
    };

    let tag = codebooks[name].create_tag(value);
    if tag.is_none() {
        errors.add(
            state,
            format!("Invalid metadata tag value for {prefix}: '{value}'"),
        );
    }
    tag
}

pub(crate) fn parse_internal(
    input: &str,
    errors: &mut LocalIdParsingErrorBuilder,
) -> Option<LocalId> {
    if input.is_empty() {
        errors.add(LocalIdParsingState::EmptyState, "LocalId string is empty");
        return None;
    }
    if !input.starts_with('/') {
        errors.add(LocalIdParsingState::Formatting, "LocalId must start with '/'");
        return None;
    }

    let mut pos = 1usize;

    if !parse_naming_rule(input, &mut pos, errors) {
        return None;
    }

    let version = parse_vis_version(input, &mut pos, errors)?;

    let vis = Vis::instance();
    let primary_item = parse_item(
        input,
        &mut pos,
        vis,
        version,
        LocalIdParsingState::PrimaryItem,
        true,
        errors,
    )?;

    // optional secondary item
    let mut secondary_item: Option<GmodPath> = None;
    if pos < input.len() {
        let saved = pos;
        let segment = extract_segment(input, &mut pos);
        if segment == "sec" {
            skip_slash(&mut pos);
            secondary_item = parse_item(
                input,
                &mut pos,
                vis,
                version,
                LocalIdParsingState::SecondaryItem,
                false,
                errors,
            );
            secondary_item.as_ref()?;
        } else {
            pos = saved;
        }
    }

    // verbose common-name segments are regenerated by the printer; only
    // their presence matters
    let mut verbose = false;
    while pos < input.len() {
        let saved = pos;
        let segment = extract_segment(input, &mut pos);
        if segment.is_empty() || !segment.starts_with('~') {
            pos = saved;
            break;
        }
        verbose = true;
        skip_slash(&mut pos);
    }

    if pos >= input.len() {
        errors.add(LocalIdParsingState::Completeness, "Missing '/meta' section");
        return None;
    }
    let meta_keyword = extract_segment(input, &mut pos);
    if meta_keyword != "meta" {
        errors.add(
            LocalIdParsingState::Completeness,
            format!("Expected '/meta', got '/{meta_keyword}'"),
        );
        return None;
    }
    skip_slash(&mut pos);

    let codebooks = match vis.codebooks(version) {
        Ok(codebooks) => codebooks,
        Err(_) => {
            errors.add(
                LocalIdParsingState::Completeness,
                format!("Failed to load codebooks for VIS version {version}"),
            );
            return None;
        }
    };

    let mut tags: Vec<MetadataTag> = Vec::new();
    while pos < input.len() {
        let segment = extract_segment(input, &mut pos);
        if segment.is_empty() {
            if pos < input.len() {
                skip_slash(&mut pos);
            }
            continue;
        }

        let Some(sep) = segment.find(['-', '~']) else {
            errors.add(
                LocalIdParsingState::Formatting,
                format!("Invalid metadata tag: '{segment}'"),
            );
            if pos < input.len() {
                skip_slash(&mut pos);
            }
            continue;
        };

        let prefix = &segment[..sep];
        let Some(state) = meta_state_for_prefix(prefix) else {
            errors.add(
                LocalIdParsingState::Formatting,
                format!("Unknown metadata tag prefix: '{prefix}'"),
            );
            if pos < input.len() {
                skip_slash(&mut pos);
            }
            continue;
        };

        if let Some(tag) = parse_metadata_tag(segment, &codebooks, state, errors) {
            tags.push(tag);
        }
        if pos < input.len() {
            skip_slash(&mut pos);
        }
    }

    if tags.is_empty() {
        errors.add(
            LocalIdParsingState::Completeness,
            "At least one metadata tag is required",
        );
        return None;
    }

    let mut builder = LocalIdBuilder::create(version)
        .with_primary_item(primary_item)
        .with_verbose_mode(verbose);
    if let Some(secondary) = secondary_item {
        builder = builder.with_secondary_item(secondary);
    }
    for tag in tags {
        // later duplicates overwrite earlier tags for the same codebook
        builder = match builder.with_metadata_tag(tag) {
            Ok(builder) => builder,
            Err(err) => {
                errors.add(LocalIdParsingState::Completeness, err.to_string());
                return None;
            }
        };
    }

    match builder.build() {
        Ok(local_id) => Some(local_id),
        Err(err) => {
            errors.add(LocalIdParsingState::Completeness, err.to_string());
            None
        }
    }
}

pub(crate) fn parse_with_errors(
    input: &str,
    errors: &mut ParsingErrors,
) -> Option<LocalId> {
    let mut builder = LocalIdParsingErrorBuilder::default();
    let result = parse_internal(input, &mut builder);
    builder.drain_into(errors);
    result
}
