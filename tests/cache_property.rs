use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;

use assetpipe::cache::StepCache;
use assetpipe::fanout::OutputFile;

fn remembered(cache: &mut StepCache, rel: &Path, contents: &[u8]) {
    let output = OutputFile {
        rel_path: rel.to_path_buf(),
        contents: Arc::new(contents.to_vec()),
    };
    cache.remember(rel, contents, output);
}

proptest! {
    /// A never-seen file is always processed.
    #[test]
    fn fresh_cache_always_processes(contents in proptest::collection::vec(any::<u8>(), 0..256)) {
        let cache = StepCache::new("prop:step");
        prop_assert!(cache.should_process(Path::new("a.js"), &contents));
    }

    /// After remembering, identical content is a hit and the remembered
    /// output round-trips.
    #[test]
    fn remembered_content_is_a_hit(contents in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut cache = StepCache::new("prop:step");
        let rel = Path::new("a.js");

        remembered(&mut cache, rel, &contents);

        prop_assert!(!cache.should_process(rel, &contents));
        let out = cache.cached_output(rel).expect("remembered output present");
        prop_assert_eq!(out.contents.as_slice(), contents.as_slice());
    }

    /// Different content always invalidates the hit.
    #[test]
    fn changed_content_is_processed(
        a in proptest::collection::vec(any::<u8>(), 0..256),
        b in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assume!(a != b);

        let mut cache = StepCache::new("prop:step");
        let rel = Path::new("a.js");

        remembered(&mut cache, rel, &a);
        prop_assert!(cache.should_process(rel, &b));
    }

    /// Entries are independent per path.
    #[test]
    fn paths_do_not_interfere(contents in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut cache = StepCache::new("prop:step");

        remembered(&mut cache, Path::new("a.js"), &contents);
        prop_assert!(cache.should_process(Path::new("b.js"), &contents));
    }
}

#[test]
fn clear_forgets_everything() {
    let mut cache = StepCache::new("prop:step");
    remembered(&mut cache, Path::new("a.js"), b"x");
    assert!(!cache.is_empty());

    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.should_process(Path::new("a.js"), b"x"));
}
