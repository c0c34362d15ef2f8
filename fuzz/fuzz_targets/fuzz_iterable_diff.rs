#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use seqdiff_core::Value;
use seqdiff_engine::IterableDiffer;

/// One bound value per pass. Small item domain so duplicates are common.
#[derive(Debug, Arbitrary)]
enum Pass {
    Null,
    Items(Vec<u8>),
    Scalar(u8),
}

fuzz_target!(|passes: Vec<Pass>| {
    let mut differ = IterableDiffer::for_values();
    let mut current: Vec<u8> = Vec::new();

    for pass in passes.iter().take(64) {
        let (value, expected) = match pass {
            Pass::Null => (Value::Null, Vec::new()),
            Pass::Items(items) => {
                let items: Vec<u8> = items.iter().take(256).map(|b| b % 8).collect();
                let value = Value::list(items.iter().map(|&b| u32::from(b)));
                (value, items)
            }
            Pass::Scalar(b) => {
                // Rejected before any state changes.
                let before = differ.change_set();
                assert!(differ.check(&Value::from(u32::from(*b))).is_err());
                assert_eq!(differ.change_set(), before, "failed pass mutated state");
                continue;
            }
        };

        let dirty = differ.check(&value).expect("lists and null are diffable");

        // The collection reproduces the input.
        let items: Vec<String> = differ.items().map(|r| r.item.to_string()).collect();
        let want: Vec<String> = expected.iter().map(|b| b.to_string()).collect();
        assert_eq!(items, want, "collection diverged from input");

        // Counts balance.
        let added = differ.additions().count();
        let removed = differ.removals().count();
        assert_eq!(current.len() + added, expected.len() + removed);
        assert_eq!(dirty, added + removed + differ.moves().count() > 0);

        // Reordered records are a subset of moves.
        let moves: Vec<_> = differ.moves().map(|r| r.id).collect();
        assert!(differ.reordered().iter().all(|r| moves.contains(&r.id)));

        current = expected;
    }
});
