use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;

use photodupe::analysis::{
    analyze_overlap, complete_duplicates, rollup_directories, DuplicateIndex, OverlapConfig,
};
use photodupe::model::{FileRecord, Hash, RecordId, RootDirectory, RootId, RootSet};

fn hash_of(byte: u8) -> Hash {
    let mut h = [0u8; 32];
    h[0] = byte;
    h
}

fn roots() -> RootSet {
    let mut set = RootSet::new();
    set.insert(RootDirectory::new(RootId(1), "/photos", "Photos"));
    set
}

/// (directory index, hash byte, size) triples describe one record each.
fn records_from(layout: &[(u8, u8, u64)]) -> Vec<FileRecord> {
    layout.iter()
        .enumerate()
        .map(|(i, &(dir, hash, size))| {
            FileRecord::new(
                RecordId(i as u64),
                RootId(1),
                format!("d{dir}/img_{i}.jpg"),
                hash_of(hash),
                size,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn groups_cover_exactly_multi_occurrence_hashes(
        layout in prop::collection::vec((0u8..6, 0u8..10, 1u64..500), 0..60)
    ) {
        let records = records_from(&layout);
        let index = DuplicateIndex::build(&records, &roots());

        let mut occurrences: HashMap<Hash, usize> = HashMap::new();
        for record in &records {
            *occurrences.entry(record.hash).or_insert(0) += 1;
        }

        for group in index.groups() {
            // Every group has 2+ members and matches the input count.
            prop_assert!(group.len() >= 2);
            prop_assert_eq!(group.len(), occurrences[&group.hash]);
            for member in &group.members {
                prop_assert_eq!(member.record.hash, group.hash);
            }
        }

        // Union of groups equals records whose hash occurs 2+ times.
        let grouped: usize = index.groups().iter().map(|g| g.len()).sum();
        let expected: usize = occurrences.values().filter(|&&n| n >= 2).sum();
        prop_assert_eq!(grouped, expected);
    }

    #[test]
    fn wasted_bytes_formula_for_equal_sizes(
        members in 2usize..8,
        size in 1u64..10_000
    ) {
        let layout: Vec<(u8, u8, u64)> = (0..members).map(|i| (i as u8 % 6, 1, size)).collect();
        let records = records_from(&layout);
        let index = DuplicateIndex::build(&records, &roots());

        prop_assert_eq!(index.groups().len(), 1);
        prop_assert_eq!(index.groups()[0].wasted_bytes(), size * (members as u64 - 1));
    }

    #[test]
    fn rollup_counts_bounded_by_file_counts(
        layout in prop::collection::vec((0u8..6, 0u8..10, 1u64..500), 0..60)
    ) {
        let records = records_from(&layout);
        let index = DuplicateIndex::build(&records, &roots());
        let rollup = rollup_directories(&index);

        for info in &rollup {
            prop_assert!(info.duplicate_file_count <= info.file_count);
            prop_assert!(info.duplicate_percentage <= 100.0);
        }

        // Attributions for one group never exceed its member count.
        let attributed: usize = rollup.iter().map(|i| i.duplicate_file_count).sum();
        let grouped: usize = index.groups().iter().map(|g| g.len()).sum();
        prop_assert_eq!(attributed, grouped);
    }

    #[test]
    fn hash_set_equality_is_one_cluster(
        layout in prop::collection::vec((0u8..6, 0u8..5, 1u64..100), 0..60)
    ) {
        let records = records_from(&layout);
        let index = DuplicateIndex::build(&records, &roots());
        let clusters = complete_duplicates(&index);

        // Recompute eligible hash sets independently and check that every
        // equivalence class lands in exactly one cluster.
        let mut sets: HashMap<&str, BTreeSet<Hash>> = HashMap::new();
        for (dir, members) in index.directories() {
            if members.len() >= 2 {
                sets.insert(dir.as_str(), members.iter().map(|m| m.record.hash).collect());
            }
        }
        for (&dir_a, set_a) in &sets {
            for (&dir_b, set_b) in &sets {
                if dir_a < dir_b && set_a == set_b && set_a.len() >= 2 {
                    let joint = clusters
                        .iter()
                        .filter(|c| c.contains(dir_a) && c.contains(dir_b))
                        .count();
                    prop_assert_eq!(joint, 1);
                }
            }
        }

        // No directory appears in two clusters.
        let mut seen = BTreeSet::new();
        for cluster in &clusters {
            for dir in cluster.all_directories() {
                prop_assert!(seen.insert(dir.to_string()));
            }
        }
    }

    #[test]
    fn overlap_is_deterministic(
        layout in prop::collection::vec((0u8..6, 0u8..6, 1u64..100), 0..50)
    ) {
        let records = records_from(&layout);
        let index = DuplicateIndex::build(&records, &roots());
        let clusters = complete_duplicates(&index);

        let first = analyze_overlap(&index, &clusters, &OverlapConfig::default()).unwrap();
        let second = analyze_overlap(&index, &clusters, &OverlapConfig::default()).unwrap();
        prop_assert_eq!(first.pairs, second.pairs);
    }
}
