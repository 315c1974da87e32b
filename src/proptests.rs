use super::*;

use crate::node::{NodeId, Symbol};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// Linear-scan reference: candidates whose folded form contains the folded
/// query, sorted and capped.
fn oracle(candidates: &[String], query: &str, limit: usize, folding: CaseFolding) -> Vec<String> {
    let q = folding.normalize(query);
    let distinct: BTreeSet<&String> = candidates.iter().collect();
    distinct
        .into_iter()
        .filter(|c| folding.normalize(c).contains(&q))
        .take(limit)
        .cloned()
        .collect()
}

/// Check the structural invariants of a built tree against its own key
/// buffer.
fn validate_tree(index: &Index) {
    let tree = index.tree();
    let arena = tree.arena();
    let symbols = tree.symbols();

    let mut suffix_seen = vec![false; symbols.len()];
    let mut visited = 0usize;
    let mut stack: Vec<(NodeId, Vec<Symbol>)> = vec![(NodeId::ROOT, Vec::new())];
    while let Some((id, mut path)) = stack.pop() {
        visited += 1;
        let node = arena.get(id);
        let label = node.label();
        assert!(label.end <= symbols.len(), "label {label:?} past buffer end");
        assert_eq!(label.is_empty(), id == NodeId::ROOT, "only the root has an empty label");
        path.extend_from_slice(&symbols[label]);

        let mut keys = HashSet::new();
        for &(key, child) in node.edges() {
            assert!(keys.insert(key), "duplicate transition {key}");
            assert_eq!(symbols[arena.get(child).label_start()], key, "edge key mismatch");
        }

        if id != NodeId::ROOT && node.is_leaf() {
            // A leaf spells exactly one suffix of the buffer.
            let start = symbols.len() - path.len();
            assert_eq!(&symbols[start..], &path[..]);
            assert!(!suffix_seen[start], "suffix {start} reached twice");
            suffix_seen[start] = true;
            assert_eq!(node.payload(), Some(tree.owner(start)), "leaf for suffix {start}");
        } else {
            assert_eq!(node.payload(), None, "internal node carries a payload");
            if id != NodeId::ROOT {
                assert!(node.edges().len() >= 2, "unary internal node at {path:?}");
            }
        }

        for &(_, child) in node.edges() {
            stack.push((child, path.clone()));
        }
    }

    assert!(suffix_seen.iter().all(|&s| s), "some suffix has no leaf");
    assert_eq!(visited, arena.len(), "unreachable or shared nodes");
    assert_eq!(arena.edge_count() + 1, arena.len());
    assert_eq!(arena.payload_count(), symbols.len());
    assert!(arena.len() <= 2 * symbols.len() + 1);
}

fn name_strategy() -> impl Strategy<Value = String> {
    // A small alphabet with mixed case keeps shared substrings frequent.
    prop::string::string_regex("[abAB_x]{0,8}").unwrap()
}

fn query_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[abAB_xz]{0,4}").unwrap()
}

fn unicode_name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just('a'),
            Just('A'),
            Just('σ'),
            Just('Σ'),
            Just('ß'),
            Just('İ'),
            Just('é'),
            Just('É'),
        ],
        0..6,
    )
    .prop_map(|cs| cs.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_scan(
        names in prop::collection::vec(name_strategy(), 0..40),
        queries in prop::collection::vec(query_strategy(), 1..20),
        limit in 0usize..12,
    ) {
        let index = build(names.clone());
        validate_tree(&index);
        for q in &queries {
            let got: Vec<String> = autocomplete(&index, q, limit as i64).unwrap();
            prop_assert_eq!(got, oracle(&names, q, limit, CaseFolding::Unicode));
        }
    }

    #[test]
    fn prop_equivalence_unicode(
        names in prop::collection::vec(unicode_name_strategy(), 0..20),
        queries in prop::collection::vec(unicode_name_strategy(), 1..10),
        ascii in any::<bool>(),
    ) {
        let folding = if ascii { CaseFolding::Ascii } else { CaseFolding::Unicode };
        let index = Index::build_with(names.clone(), Config::default().with_folding(folding));
        validate_tree(&index);
        for q in &queries {
            let got: Vec<String> = index
                .autocomplete(q, usize::MAX)
                .into_iter()
                .map(str::to_owned)
                .collect();
            prop_assert_eq!(got, oracle(&names, q, usize::MAX, folding));
        }
    }

    #[test]
    fn prop_round_trip_containment(names in prop::collection::vec(name_strategy(), 1..30)) {
        let index = build(names.clone());
        let all = index.len();
        for name in &names {
            let got = index.autocomplete(name, all);
            prop_assert!(got.contains(&name.as_str()), "{:?} missing from {:?}", name, got);
        }
    }

    #[test]
    fn prop_substring_completeness(names in prop::collection::vec(name_strategy(), 1..12)) {
        let index = build(names.clone());
        let all = index.len();
        for name in &names {
            let chars: Vec<char> = name.chars().collect();
            for i in 0..chars.len() {
                for j in i + 1..=chars.len() {
                    let sub: String = chars[i..j].iter().collect();
                    let got = index.autocomplete(&sub, all);
                    prop_assert!(got.contains(&name.as_str()), "{:?} not found by {:?}", name, sub);
                }
            }
        }
    }

    #[test]
    fn prop_case_insensitive(
        names in prop::collection::vec(name_strategy(), 0..30),
        query in query_strategy(),
    ) {
        let index = build(names);
        prop_assert_eq!(
            index.autocomplete(&query.to_uppercase(), 50),
            index.autocomplete(&query.to_lowercase(), 50)
        );
    }

    #[test]
    fn prop_empty_query_is_prefix_of_sorted(
        names in prop::collection::vec(name_strategy(), 0..30),
        limit in 0usize..40,
    ) {
        let index = build(names.clone());
        let mut expected: Vec<String> = names;
        expected.sort();
        expected.dedup();
        expected.truncate(limit);
        prop_assert_eq!(autocomplete(&index, "", limit as i64).unwrap(), expected);
    }

    #[test]
    fn prop_results_sorted_unique_and_capped(
        names in prop::collection::vec(name_strategy(), 0..30),
        query in query_strategy(),
        limit in 0usize..8,
    ) {
        let index = build(names);
        let got = index.autocomplete(&query, limit);
        prop_assert!(got.len() <= limit);
        prop_assert!(got.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(index.contains_match(&query), !index.autocomplete(&query, 1).is_empty());
    }

    #[test]
    fn prop_size_linear_in_characters(names in prop::collection::vec(name_strategy(), 0..30)) {
        let index = build(names.clone());
        let distinct: BTreeSet<&String> = names.iter().collect();
        let characters: usize = distinct.iter().map(|n| CaseFolding::Unicode.fold(n).len()).sum();
        let stats = index.stats();
        prop_assert_eq!(stats.symbols, characters + distinct.len());
        prop_assert!(stats.nodes <= 2 * stats.symbols + 1);
    }

    #[test]
    fn prop_negative_limit_rejected(query in query_strategy(), limit in i64::MIN..0) {
        let index = build(["alice", "bob"]);
        let rejected = matches!(
            autocomplete(&index, &query, limit),
            Err(Error::InvalidArgument { .. })
        );
        prop_assert!(rejected);
    }
}

/// Every ordering of `items`, generated by Heap's algorithm.
fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    let mut current = items.to_vec();
    let mut swaps = vec![0usize; items.len()];
    let mut out = vec![current.clone()];
    let mut level = 1;
    while level < current.len() {
        if swaps[level] < level {
            let other = if level % 2 == 0 { 0 } else { swaps[level] };
            current.swap(other, level);
            out.push(current.clone());
            swaps[level] += 1;
            level = 1;
        } else {
            swaps[level] = 0;
            level += 1;
        }
    }
    out
}

#[test]
fn permutations_cover_every_order_once() {
    let perms = permutations(&[1, 2, 3, 4]);
    assert_eq!(perms.len(), 24);
    let distinct: HashSet<Vec<i32>> = perms.into_iter().collect();
    assert_eq!(distinct.len(), 24);
    assert!(permutations::<u8>(&[]).iter().all(Vec::is_empty));
}

#[test]
fn exhaustive_insert_order_small_set() {
    let names = ["Kings", "Kingfisher", "alice", "bob", "kings", "Kings"];
    let reference = build(names);
    let queries = ["", "k", "ing", "KINGS", "li", "o", "s", "z"];

    for perm in permutations(&names) {
        let index = build(perm);
        validate_tree(&index);
        assert_eq!(index.stats(), reference.stats());
        for q in queries {
            assert_eq!(index.autocomplete(q, 10), reference.autocomplete(q, 10), "query {q:?}");
        }
    }
}

#[test]
fn randomized_against_scan() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const ALPHABET: &[char] = &['a', 'b', 'c', 'A', 'B', 'C', '0', '.'];

    let mut rng = StdRng::seed_from_u64(1);
    let names: Vec<String> = (0..2000)
        .map(|_| {
            let len = rng.gen_range(0..16);
            (0..len)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
                .collect()
        })
        .collect();
    let index = build(names.clone());

    for _ in 0..500 {
        let len = rng.gen_range(0..5);
        let query: String = (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect();
        let limit = rng.gen_range(0..30);
        let got: Vec<String> = autocomplete(&index, &query, limit as i64).unwrap();
        assert_eq!(got, oracle(&names, &query, limit, CaseFolding::Unicode), "query {query:?}");
    }
}
