//! Feature metadata and the registry the builder resolves selections against.

use crate::core::error::{Error, Result};
use std::collections::HashMap;
use std::sync::LazyLock;

mod contributed;
mod core;

const NO_DEPS: &[Dependency] = &[];

/// A 3rd party library a feature depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// Library name as used in the generated include line.
    pub library: &'static str,

    /// Where to obtain the library, when it is not bundled with the IDE.
    pub url: Option<&'static str>,

    /// Known-good library version.
    pub version: Option<&'static str>,
}

/// Metadata for one selectable firmware capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDescriptor {
    /// Stable identifier used in build requests.
    pub id: &'static str,

    /// Class symbol in the generated sketch.
    pub class_name: &'static str,

    /// Symbol for the single instance of that class.
    pub instance_name: &'static str,

    /// Human-readable description (shown by selection UIs).
    pub description: &'static str,

    /// Whether the feature emits periodic output in the main loop.
    pub reporting: bool,

    /// Whether the feature needs an update call on every loop iteration.
    pub update: bool,

    /// 3rd party libraries to include before the feature's own header.
    pub dependencies: &'static [Dependency],

    /// Repository or documentation for contributed features.
    pub url: Option<&'static str>,

    /// Version of a contributed feature.
    pub version: Option<&'static str>,
}

static BUILTIN: LazyLock<FeatureRegistry> = LazyLock::new(|| {
    FeatureRegistry::from_tables(&[core::CORE_FEATURES, contributed::CONTRIBUTED_FEATURES])
});

/// Lookup table from feature id to its descriptor.
///
/// The built-in registry merges the core and contributed tables once at first
/// use and is immutable afterwards; a later table wins when two tables carry
/// the same id.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    features: HashMap<&'static str, FeatureDescriptor>,
}

impl FeatureRegistry {
    /// The merged core + contributed registry.
    pub fn builtin() -> &'static FeatureRegistry {
        &BUILTIN
    }

    /// Build a registry from explicit tables; later tables override earlier
    /// ones per id.
    pub fn from_tables(tables: &[&[FeatureDescriptor]]) -> Self {
        let mut features = HashMap::new();
        for table in tables {
            for feature in *table {
                features.insert(feature.id, *feature);
            }
        }
        Self { features }
    }

    /// Resolve a feature id selected by the caller.
    pub fn lookup(&self, id: &str) -> Result<&FeatureDescriptor> {
        self.features
            .get(id)
            .ok_or_else(|| Error::unknown_feature(id))
    }

    /// Whether the registry knows the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// All known feature ids, sorted for stable display.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.features.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
