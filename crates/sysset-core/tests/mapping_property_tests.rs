//! Property tests for virtual-to-real mapping

use proptest::prelude::*;
use sysset_core::{PathMapper, Platform};
use sysset_fs::NormalizedPath;

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_.-]{1,12}".prop_filter("no dot segments", |s| s != "." && s != "..")
}

fn rel_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..5)
}

fn platform() -> impl Strategy<Value = Platform> {
    prop_oneof![Just(Platform::Darwin), Just(Platform::Linux)]
}

proptest! {
    #[test]
    fn mapped_paths_stay_under_prefix(rest in rel_path(), platform in platform()) {
        let mapper = PathMapper::new("/repo", "/target", "alice", platform);
        let virtual_path = NormalizedPath::new(format!("/repo/etc/{}", rest.join("/")));

        let real = mapper.map(&virtual_path).unwrap();
        prop_assert!(real.strip_prefix(&NormalizedPath::new("/target")).is_some());
        prop_assert!(real.as_str().ends_with(&rest.join("/")));
    }

    #[test]
    fn home_maps_into_user_home(rest in rel_path(), platform in platform()) {
        let mapper = PathMapper::new("/repo", "/", "alice", platform);
        let virtual_path = NormalizedPath::new(format!("/repo/home/{}", rest.join("/")));

        let real = mapper.map(&virtual_path).unwrap();
        let expected = format!("/{}/alice/{}", platform.home_base(), rest.join("/"));
        prop_assert_eq!(real.as_str(), expected.as_str());
    }

    #[test]
    fn darwin_overlay_is_transparent(rest in rel_path()) {
        let mapper = PathMapper::new("/repo", "/", "alice", Platform::Darwin);
        let plain = NormalizedPath::new(format!("/repo/{}", rest.join("/")));
        let overlay = NormalizedPath::new(format!("/repo/@darwin/{}", rest.join("/")));

        prop_assert_eq!(mapper.map(&plain), mapper.map(&overlay));
    }
}
