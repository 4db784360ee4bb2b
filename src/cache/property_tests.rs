//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation and the in-process store.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::{keys, MemoryStore};
use crate::models::ProductFilters;

// == Strategies ==
/// Raw query pairs for a valid filter set, one entry per parameter.
fn filter_pairs_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    (
        prop::option::of("[A-Za-z &=%]{1,12}"),
        prop::option::of(0u32..100_000),
        prop::option::of(0u32..100_000),
        prop::option::of(any::<bool>()),
        prop::option::of(1u32..50),
        prop::option::of(1u32..=100),
    )
        .prop_map(|(category, min_cents, max_cents, available, page, page_size)| {
            let mut pairs = Vec::new();
            if let Some(category) = category {
                pairs.push(("category".to_string(), category));
            }
            if let Some(cents) = min_cents {
                pairs.push(("price_min".to_string(), format!("{}", cents as f64 / 100.0)));
            }
            if let Some(cents) = max_cents {
                pairs.push(("price_max".to_string(), format!("{}", cents as f64 / 100.0)));
            }
            if let Some(available) = available {
                pairs.push(("available".to_string(), available.to_string()));
            }
            if let Some(page) = page {
                pairs.push(("page".to_string(), page.to_string()));
            }
            if let Some(size) = page_size {
                pairs.push(("page_size".to_string(), size.to_string()));
            }
            pairs
        })
}

fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_:]{1,32}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Any reordering of the same query parameters maps to the same list key.
    #[test]
    fn prop_list_key_ignores_parameter_order(
        (pairs, shuffled) in filter_pairs_strategy()
            .prop_flat_map(|pairs| (Just(pairs.clone()), Just(pairs).prop_shuffle()))
    ) {
        let a = ProductFilters::from_pairs(pairs).unwrap();
        let b = ProductFilters::from_pairs(shuffled).unwrap();
        prop_assert_eq!(keys::list_key(&a), keys::list_key(&b));
    }

    // Filter sets that select different products never share a key.
    #[test]
    fn prop_distinct_categories_get_distinct_keys(
        a in "[a-z&=%]{1,10}",
        b in "[a-z&=%]{1,10}",
    ) {
        prop_assume!(a != b);
        let fa = ProductFilters { category: Some(a), ..Default::default() };
        let fb = ProductFilters { category: Some(b), ..Default::default() };
        prop_assert_ne!(keys::list_key(&fa), keys::list_key(&fb));
    }

    // Distinct price bounds never share a key, however close they are.
    #[test]
    fn prop_distinct_price_bounds_get_distinct_keys(
        a in 0.0f64..1_000_000.0,
        b in 0.0f64..1_000_000.0,
        upper in any::<bool>(),
    ) {
        prop_assume!(a != b);
        let (fa, fb) = if upper {
            (
                ProductFilters { price_max: Some(a), ..Default::default() },
                ProductFilters { price_max: Some(b), ..Default::default() },
            )
        } else {
            (
                ProductFilters { price_min: Some(a), ..Default::default() },
                ProductFilters { price_min: Some(b), ..Default::default() },
            )
        };
        prop_assert_ne!(keys::list_key(&fa), keys::list_key(&fb));
    }

    // A bound survives the trip through its query-string spelling.
    #[test]
    fn prop_price_bound_key_round_trips(value in 0.0f64..1_000_000.0) {
        let typed = ProductFilters { price_min: Some(value), ..Default::default() };
        let parsed = ProductFilters::from_pairs([("price_min", value.to_string())]).unwrap();
        prop_assert_eq!(parsed.price_min, Some(value));
        prop_assert_eq!(keys::list_key(&typed), keys::list_key(&parsed));
    }

    // Detail keys are stable across calls and unique per id.
    #[test]
    fn prop_detail_key_stable_and_unique(ids in prop::collection::vec(any::<i64>(), 1..50)) {
        let unique_ids: HashSet<i64> = ids.iter().copied().collect();
        let derived: HashSet<String> =
            unique_ids.iter().map(|id| keys::detail_key(*id)).collect();
        prop_assert_eq!(derived.len(), unique_ids.len());

        for id in &ids {
            prop_assert_eq!(keys::detail_key(*id), keys::detail_key(*id));
            prop_assert!(!keys::detail_key(*id).starts_with(&keys::list_prefix()));
        }
    }

    // The in-process store never holds more than its capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(valid_key_strategy(), 1..200)
    ) {
        let max_entries = 25;
        let mut store = MemoryStore::new(max_entries);

        for key in entries {
            store.set(&key, "{}".to_string(), None);
            prop_assert!(store.len() <= max_entries);
        }
    }

    // A prefix purge removes exactly the keys under that prefix.
    #[test]
    fn prop_remove_prefix_is_exact(
        ids in prop::collection::hash_set(0i64..1_000, 0..30),
        pages in prop::collection::hash_set(1u32..100, 0..30),
    ) {
        let mut store = MemoryStore::new(1_000);
        for id in &ids {
            store.set(&keys::detail_key(*id), "{}".to_string(), None);
        }
        for page in &pages {
            let filters = ProductFilters { page: Some(*page), ..Default::default() };
            store.set(&keys::list_key(&filters), "[]".to_string(), None);
        }

        prop_assert_eq!(store.remove_prefix(&keys::list_prefix()), pages.len());
        prop_assert_eq!(store.len(), ids.len());
    }
}
