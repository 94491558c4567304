use super::*;
use crate::css::{Rule, RuleSet};

fn index(class: &str) -> Arc<ClassIndex> {
    Arc::new(ClassIndex::build(RuleSet::new(vec![Rule::new([format!(".{class}")], Vec::new())])))
}

#[test]
fn content_hash_tracks_text() {
    assert_eq!(content_hash(".a {}"), content_hash(".a {}"));
    assert_ne!(content_hash(".a {}"), content_hash(".b {}"));
}

#[test]
fn hit_requires_same_hash() {
    let cache = ExtractionCache::default();
    let path = PathBuf::from("/p/a.css");
    cache.insert(path.clone(), 1, index("a"));

    assert!(cache.get(&path, 1).is_some());
    assert!(cache.get(&path, 2).is_none());
    assert!(cache.get(Path::new("/p/b.css"), 1).is_none());
}

#[test]
fn new_hash_replaces_entry_for_path() {
    let cache = ExtractionCache::default();
    let path = PathBuf::from("/p/a.css");
    cache.insert(path.clone(), 1, index("a"));
    cache.insert(path.clone(), 2, index("b"));

    assert_eq!(cache.len(), 1);
    assert!(cache.get(&path, 1).is_none());
    let hit = cache.get(&path, 2).expect("updated entry");
    assert_eq!(hit.rules_for("b").count(), 1);
}

#[test]
fn evicts_least_recently_used_path() {
    let cache = ExtractionCache::new(2);
    let a = PathBuf::from("/p/a.css");
    let b = PathBuf::from("/p/b.css");
    let c = PathBuf::from("/p/c.css");
    cache.insert(a.clone(), 1, index("a"));
    cache.insert(b.clone(), 1, index("b"));
    assert!(cache.get(&a, 1).is_some());

    cache.insert(c.clone(), 1, index("c"));

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&a, 1).is_some());
    assert!(cache.get(&b, 1).is_none());
    assert!(cache.get(&c, 1).is_some());
}

#[test]
fn shrinking_capacity_evicts() {
    let cache = ExtractionCache::new(4);
    for name in ["a", "b", "c"] {
        cache.insert(PathBuf::from(format!("/p/{name}.css")), 1, index(name));
    }
    cache.set_max_entries(1);

    assert_eq!(cache.max_entries(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(Path::new("/p/c.css"), 1).is_some());
}

#[test]
fn zero_capacity_is_clamped() {
    let cache = ExtractionCache::new(0);
    assert_eq!(cache.max_entries(), 1);
    cache.insert(PathBuf::from("/p/a.css"), 1, index("a"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn invalidate_and_clear() {
    let cache = ExtractionCache::default();
    cache.insert(PathBuf::from("/p/a.css"), 1, index("a"));
    cache.insert(PathBuf::from("/p/b.css"), 1, index("b"));

    cache.invalidate(Path::new("/p/a.css"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
