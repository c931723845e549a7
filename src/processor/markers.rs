//! Marker annotations recognised by simple name.
//!
//! Matching ignores the annotation package so equivalently named markers from
//! several annotation namespaces (`javax.ejb.Remote`, `jakarta.ejb.Remote`, ...) are
//! all accepted.

use ahash::AHashMap;

use crate::ast::Annotation;
use crate::config::MarkerConfig;
use rmistub_utils::suggest::find_best_match;

pub const DEFAULT_REMOTE_MARKERS: &[&str] = &["Remote", "Service"];
pub const DEFAULT_LOCAL_MARKERS: &[&str] = &["Local"];

/// Real annotations that sit a typo away from a marker name.
const WELL_KNOWN_ANNOTATIONS: &[&str] = &["Remove", "Resource", "Resources", "LocalBean"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Remote,
    Local,
}

impl Marker {
    const fn bit(self) -> u8 {
        match self {
            Marker::Remote => 0b01,
            Marker::Local => 0b10,
        }
    }
}

/// Markers carried by one declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerSet(u8);

impl MarkerSet {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub fn with(self, marker: Marker) -> Self {
        Self(self.0 | marker.bit())
    }

    pub fn contains(self, marker: Marker) -> bool {
        self.0 & marker.bit() != 0
    }

    pub fn is_remote(self) -> bool {
        self.contains(Marker::Remote)
    }

    pub fn is_local(self) -> bool {
        self.contains(Marker::Local)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone)]
pub struct MarkerTable {
    names: AHashMap<String, Marker>,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_REMOTE_MARKERS.iter().copied(),
            DEFAULT_LOCAL_MARKERS.iter().copied(),
        )
    }
}

impl MarkerTable {
    /// A name listed as both remote and local resolves to local.
    pub fn new<'a>(
        remote: impl IntoIterator<Item = &'a str>,
        local: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut names = AHashMap::new();
        for name in remote {
            names.insert(name.to_string(), Marker::Remote);
        }
        for name in local {
            names.insert(name.to_string(), Marker::Local);
        }
        Self { names }
    }

    /// Built-in markers plus the extra names from configuration.
    pub fn from_config(config: &MarkerConfig) -> Self {
        Self::new(
            DEFAULT_REMOTE_MARKERS
                .iter()
                .copied()
                .chain(config.remote.iter().map(String::as_str)),
            DEFAULT_LOCAL_MARKERS
                .iter()
                .copied()
                .chain(config.local.iter().map(String::as_str)),
        )
    }

    pub fn lookup(&self, simple_name: &str) -> Option<Marker> {
        self.names.get(simple_name).copied()
    }

    pub fn resolve(&self, annotations: &[Annotation]) -> MarkerSet {
        annotations
            .iter()
            .filter_map(|annotation| self.lookup(annotation.simple_name()))
            .fold(MarkerSet::EMPTY, MarkerSet::with)
    }

    /// Marker name an unrecognised annotation was probably meant to be.
    pub fn near_miss(&self, simple_name: &str) -> Option<&str> {
        if self.names.contains_key(simple_name) || WELL_KNOWN_ANNOTATIONS.contains(&simple_name) {
            return None;
        }
        find_best_match(simple_name, self.names.keys().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;

    fn annotations(names: &[&str]) -> Vec<Annotation> {
        names
            .iter()
            .map(|name| Annotation::new(*name, Span::default()))
            .collect()
    }

    #[test]
    fn matches_markers_by_simple_name() {
        let table = MarkerTable::default();
        let set = table.resolve(&annotations(&["jakarta.ejb.Remote"]));
        assert!(set.is_remote());
        assert!(!set.is_local());

        let set = table.resolve(&annotations(&["javax.ejb.Remote", "Local"]));
        assert!(set.is_remote());
        assert!(set.is_local());

        assert!(table.resolve(&annotations(&["Service"])).is_remote());
    }

    #[test]
    fn unknown_annotations_resolve_to_nothing() {
        let table = MarkerTable::default();
        let set = table.resolve(&annotations(&["Override", "Deprecated", "RemoteLike"]));
        assert!(set.is_empty());
    }

    #[test]
    fn configured_names_extend_the_defaults() {
        let config = MarkerConfig {
            remote: vec!["Endpoint".to_string()],
            local: vec!["Internal".to_string()],
        };
        let table = MarkerTable::from_config(&config);
        assert_eq!(table.lookup("Endpoint"), Some(Marker::Remote));
        assert_eq!(table.lookup("Internal"), Some(Marker::Local));
        assert_eq!(table.lookup("Remote"), Some(Marker::Remote));
    }

    #[test]
    fn near_miss_points_at_the_intended_marker() {
        let table = MarkerTable::default();
        assert_eq!(table.near_miss("Remot"), Some("Remote"));
        assert_eq!(table.near_miss("Remote"), None);
        assert_eq!(table.near_miss("Transactional"), None);
    }

    #[test]
    fn well_known_annotations_are_not_typos() {
        let table = MarkerTable::default();
        assert_eq!(table.near_miss("Remove"), None);
        assert_eq!(table.near_miss("Remota"), Some("Remote"));
    }
}
