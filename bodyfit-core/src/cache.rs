/// Decoded mesh cache keyed by normalized asset path
use std::collections::HashMap;

use crate::geometry::TriangleBuffer;
use crate::suitspec::normalize_path;

/// Holds one pristine copy of every decoded mesh.
///
/// Readers always get a clone, so relief on one part never leaks into
/// another part that loaded the same asset.
#[derive(Debug, Clone, Default)]
pub struct GeometryCache {
    entries: HashMap<String, TriangleBuffer>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<TriangleBuffer> {
        self.entries.get(&normalize_path(path)).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_path(path))
    }

    pub fn insert(&mut self, path: &str, geometry: TriangleBuffer) {
        self.entries.insert(normalize_path(path), geometry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Shape;
    use crate::primitives::primitive;

    #[test]
    fn test_keys_are_normalized() {
        let mut cache = GeometryCache::new();
        cache.insert("./meshes/a.mesh.json", primitive(Shape::Box));
        assert!(cache.contains("/meshes/a.mesh.json"));
        assert!(cache.contains("meshes\\a.mesh.json"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reads_are_independent_copies() {
        let mut cache = GeometryCache::new();
        cache.insert("a.mesh.json", primitive(Shape::Box));

        let mut first = cache.get("a.mesh.json").unwrap();
        first.positions[0] += 10.0;

        let second = cache.get("a.mesh.json").unwrap();
        assert_eq!(second, primitive(Shape::Box));
    }
}
