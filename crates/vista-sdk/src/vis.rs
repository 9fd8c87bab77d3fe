use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use vista_types::VisVersion;

use crate::codebooks::Codebooks;
use crate::error::{ConversionError, VisError};
use crate::gmod::Gmod;
use crate::gmod_path::GmodPath;
use crate::local_id::{LocalId, LocalIdBuilder};
use crate::locations::{Location, Locations};
use crate::versioning::GmodVersioning;

/// Whether a string consists solely of RFC 3986 unreserved characters —
/// the alphabet metadata tag values are restricted to.
pub fn is_iso_string(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}

/// The registry owning all loaded reference-data snapshots.
///
/// Initialized lazily on first access and shared for the process lifetime.
/// Each VIS version's Gmod, Codebooks and Locations are loaded once, cached
/// behind a lock, and handed out as `Arc`s; everything handed out is
/// immutable and safe to share across threads.
#[derive(Debug, Default)]
pub struct Vis {
    gmods: RwLock<HashMap<VisVersion, Arc<Gmod>>>,
    codebooks: RwLock<HashMap<VisVersion, Arc<Codebooks>>>,
    locations: RwLock<HashMap<VisVersion, Arc<Locations>>>,
    versioning: RwLock<Option<Arc<GmodVersioning>>>,
}

impl Vis {
    /// The process-wide registry.
    pub fn instance() -> &'static Vis {
        static INSTANCE: OnceLock<Vis> = OnceLock::new();
        INSTANCE.get_or_init(Vis::default)
    }

    /// All supported VIS versions, ascending.
    pub fn versions(&self) -> &'static [VisVersion] {
        &VisVersion::ALL
    }

    /// The most recent supported version.
    pub fn latest(&self) -> VisVersion {
        VisVersion::latest()
    }

    /// The GMOD for one version, loading it on first access.
    pub fn gmod(&self, version: VisVersion) -> Result<Arc<Gmod>, VisError> {
        if let Some(gmod) = self.read_cache(&self.gmods, version) {
            return Ok(gmod);
        }
        let dto = vista_resources::gmod_dto(version)?;
        let gmod = Arc::new(Gmod::new(version, &dto)?);
        Ok(self.write_cache(&self.gmods, version, gmod))
    }

    /// The codebooks for one version, loading them on first access.
    pub fn codebooks(&self, version: VisVersion) -> Result<Arc<Codebooks>, VisError> {
        if let Some(codebooks) = self.read_cache(&self.codebooks, version) {
            return Ok(codebooks);
        }
        let dto = vista_resources::codebooks_dto(version)?;
        let codebooks = Arc::new(Codebooks::new(version, &dto)?);
        Ok(self.write_cache(&self.codebooks, version, codebooks))
    }

    /// The locations for one version, loading them on first access.
    pub fn locations(&self, version: VisVersion) -> Result<Arc<Locations>, VisError> {
        if let Some(locations) = self.read_cache(&self.locations, version) {
            return Ok(locations);
        }
        let dto = vista_resources::locations_dto(version)?;
        let locations = Arc::new(Locations::new(version, &dto)?);
        Ok(self.write_cache(&self.locations, version, locations))
    }

    /// The cross-version conversion tables, loading them on first access.
    pub fn gmod_versioning(&self) -> Result<Arc<GmodVersioning>, VisError> {
        if let Ok(cache) = self.versioning.read() {
            if let Some(versioning) = cache.as_ref() {
                return Ok(versioning.clone());
            }
        }
        let dto = vista_resources::versioning_dto()?;
        let versioning = Arc::new(GmodVersioning::new(&dto)?);
        if let Ok(mut cache) = self.versioning.write() {
            if let Some(existing) = cache.as_ref() {
                return Ok(existing.clone());
            }
            *cache = Some(versioning.clone());
        }
        Ok(versioning)
    }

    /// Converts a node (code plus optional location) between versions.
    pub fn convert_node(
        &self,
        source_version: VisVersion,
        code: &str,
        location: Option<&Location>,
        target_version: VisVersion,
    ) -> Result<(String, Option<Location>), ConversionError> {
        self.gmod_versioning()?
            .convert_node(self, source_version, code, location, target_version)
    }

    /// Converts a path to another version, reconstructing intermediate
    /// chains where the target tree changed shape.
    pub fn convert_path(
        &self,
        path: &GmodPath,
        target_version: VisVersion,
    ) -> Result<GmodPath, ConversionError> {
        self.gmod_versioning()?
            .convert_path(self, path, target_version)
    }

    /// Converts a LocalId builder to another version.
    pub fn convert_local_id_builder(
        &self,
        builder: &LocalIdBuilder,
        target_version: VisVersion,
    ) -> Result<LocalIdBuilder, ConversionError> {
        self.gmod_versioning()?
            .convert_local_id_builder(self, builder, target_version)
    }

    /// Converts a LocalId to another version.
    pub fn convert_local_id(
        &self,
        local_id: &LocalId,
        target_version: VisVersion,
    ) -> Result<LocalId, ConversionError> {
        self.gmod_versioning()?
            .convert_local_id(self, local_id, target_version)
    }

    fn read_cache<T>(
        &self,
        cache: &RwLock<HashMap<VisVersion, Arc<T>>>,
        version: VisVersion,
    ) -> Option<Arc<T>> {
        cache.read().ok()?.get(&version).cloned()
    }

    fn write_cache<T>(
        &self,
        cache: &RwLock<HashMap<VisVersion, Arc<T>>>,
        version: VisVersion,
        value: Arc<T>,
    ) -> Arc<T> {
        match cache.write() {
            Ok(mut cache) => cache.entry(version).or_insert(value).clone(),
            // a poisoned lock only means another loader panicked; serve the
            // freshly built value
            Err(_) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_instance_is_shared() {
        let a = Vis::instance() as *const Vis;
        let b = Vis::instance() as *const Vis;
        assert_eq!(a, b);
    }

    #[test]
    fn test_caches_hand_out_same_snapshot() {
        let vis = Vis::instance();
        let first = vis.gmod(VisVersion::V3_4a).unwrap();
        let second = vis.gmod(VisVersion::V3_4a).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_all_versions_load() {
        let vis = Vis::instance();
        for version in vis.versions().iter().copied() {
            assert_eq!(vis.gmod(version).unwrap().version(), version);
            assert_eq!(vis.codebooks(version).unwrap().version(), version);
            assert_eq!(vis.locations(version).unwrap().version(), version);
        }
        assert_eq!(vis.latest(), VisVersion::V3_9a);
    }

    #[test]
    fn test_snapshots_are_shareable_across_threads() {
        let vis = Vis::instance();
        let gmod = vis.gmod(VisVersion::V3_4a).unwrap();
        let handle = std::thread::spawn(move || gmod.root_node().code().to_string());
        assert_eq!(handle.join().unwrap(), "VE");
    }

    #[test_case("abc123", true)]
    #[test_case("a-b.c_d~e", true)]
    #[test_case("", true; "empty has no offending char")]
    #[test_case("with space", false)]
    #[test_case("sla/sh", false)]
    #[test_case("percent%", false)]
    fn test_is_iso_string(input: &str, expected: bool) {
        assert_eq!(is_iso_string(input), expected);
    }
}
