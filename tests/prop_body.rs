//! Property-based tests for the body genotype engine.
//!
//! These tests verify the size, validity and bound-preservation laws of
//! generation, mutation and crossover under arbitrary seeds.
//! Run with: cargo test --release prop_body

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use bodytree::{
    BodyConfig, IdAllocator, breadth_first, crossover, duplicate, generate, mutate, subtree_size,
    validate,
};

/// A config where exactly one mutation stage is guaranteed to run.
fn single_stage(
    min_parts: usize,
    max_parts: usize,
    delete: bool,
    dup: bool,
    swap: bool,
    oscillator: bool,
) -> BodyConfig {
    let mut config = BodyConfig {
        min_parts,
        max_parts,
        ..Default::default()
    };
    config.mutation.p_delete_subtree = f64::from(u8::from(delete));
    config.mutation.p_duplicate_subtree = f64::from(u8::from(dup));
    config.mutation.p_swap_subtree = f64::from(u8::from(swap));
    config.mutation.p_mutate_oscillator = f64::from(u8::from(oscillator));
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Generated trees stay within the part budget and never
    /// self-intersect.
    #[test]
    fn prop_generated_trees_valid(
        seed in any::<u64>(),
        max_parts in 1usize..25,
        mu in 1.0f64..25.0,
        sigma in 0.0f64..6.0
    ) {
        let config = BodyConfig {
            min_parts: 1,
            max_parts,
            initial_size_mu: mu,
            initial_size_sigma: sigma,
            ..Default::default()
        };
        config.validate().unwrap();

        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let tree = generate(&config, &mut ids, &mut rng);

        let size = subtree_size(&tree);
        prop_assert!((1..=max_parts).contains(&size));
        prop_assert!(validate(&tree).is_ok());
    }

    /// Delete never shrinks a tree below `min_parts` and never grows it.
    #[test]
    fn prop_delete_bounds(seed in any::<u64>(), min_parts in 1usize..10) {
        let gen_config = BodyConfig { min_parts: 1, ..Default::default() };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let input = generate(&gen_config, &mut ids, &mut rng);
        let input_size = subtree_size(&input);

        let config = single_stage(min_parts, 100, true, false, false, false);
        let result = mutate(&input, &config, &mut ids, &mut rng);
        let size = subtree_size(&result);

        prop_assert!(size <= input_size);
        prop_assert!(size >= min_parts || size == input_size);
    }

    /// Duplicate never grows a tree above `max_parts` and never shrinks it.
    #[test]
    fn prop_duplicate_bounds(seed in any::<u64>(), max_parts in 1usize..40) {
        let gen_config = BodyConfig { min_parts: 1, ..Default::default() };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let input = generate(&gen_config, &mut ids, &mut rng);
        let input_size = subtree_size(&input);

        let config = single_stage(1, max_parts, false, true, false, false);
        let result = mutate(&input, &config, &mut ids, &mut rng);
        let size = subtree_size(&result);

        prop_assert!(size >= input_size);
        prop_assert!(size <= max_parts || size == input_size);
    }

    /// Swap preserves size exactly and keeps the tree connected.
    #[test]
    fn prop_swap_preserves_size(seed in any::<u64>()) {
        let gen_config = BodyConfig { min_parts: 1, ..Default::default() };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let input = generate(&gen_config, &mut ids, &mut rng);
        let input_size = subtree_size(&input);

        let config = single_stage(1, 100, false, false, true, false);
        let result = mutate(&input, &config, &mut ids, &mut rng);

        prop_assert_eq!(subtree_size(&result), input_size);
        // Connectivity: every non-root node reached by traversal has a
        // parent edge, and traversal reaches the full size.
        let reached = breadth_first(&result).filter(|(parent, _)| parent.is_some()).count();
        prop_assert_eq!(reached + 1, input_size);
    }

    /// Oscillator values stay inside their ranges whatever the noise
    /// magnitude.
    #[test]
    fn prop_oscillator_ranges(seed in any::<u64>(), sigma in 0.0f64..500.0) {
        let gen_config = BodyConfig { min_parts: 1, ..Default::default() };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let input = generate(&gen_config, &mut ids, &mut rng);

        let mut config = single_stage(1, 100, false, false, false, true);
        config.mutation.period_sigma = sigma;
        config.mutation.phase_sigma = sigma;
        config.mutation.amplitude_sigma = sigma;
        let result = mutate(&input, &config, &mut ids, &mut rng);

        for (_, node) in breadth_first(&result) {
            if let Some(osc) = node.oscillator {
                prop_assert!((0.0..=1.0).contains(&osc.amplitude));
                prop_assert!((0.0..config.max_oscillation).contains(&osc.period));
                prop_assert!((0.0..config.max_oscillation).contains(&osc.phase));
            }
        }
    }

    /// Crossover never panics for valid inputs; on success the size is
    /// within bounds, on exhaustion it equals the first parent's size.
    #[test]
    fn prop_crossover_total(seed in any::<u64>(), min_parts in 1usize..6, span in 0usize..15) {
        let gen_config = BodyConfig { min_parts: 1, ..Default::default() };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let parent1 = generate(&gen_config, &mut ids, &mut rng);
        let parent2 = generate(&gen_config, &mut ids, &mut rng);

        let config = BodyConfig {
            min_parts,
            max_parts: min_parts + span,
            ..Default::default()
        };
        let result = crossover(&parent1, &parent2, &config, &mut ids, &mut rng);
        let size = subtree_size(&result);

        let in_bounds = (config.min_parts..=config.max_parts).contains(&size);
        prop_assert!(in_bounds || size == subtree_size(&parent1));
    }

    /// A duplicated tree matches its source in shape and oscillator
    /// values, and mutating the copy never affects the source.
    #[test]
    fn prop_duplicate_independent(seed in any::<u64>()) {
        let gen_config = BodyConfig { min_parts: 1, ..Default::default() };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let source = generate(&gen_config, &mut ids, &mut rng);
        let snapshot = source.clone();

        let mut copy = duplicate(&source, &mut ids);
        prop_assert_eq!(subtree_size(&copy), subtree_size(&source));
        let source_fields: Vec<_> = breadth_first(&source)
            .map(|(_, n)| (n.kind, n.orientation, n.oscillator))
            .collect();
        let copy_fields: Vec<_> = breadth_first(&copy)
            .map(|(_, n)| (n.kind, n.orientation, n.oscillator))
            .collect();
        prop_assert_eq!(source_fields, copy_fields);

        let config = BodyConfig { min_parts: 1, ..Default::default() };
        bodytree::mutate_in_place(&mut copy, &config, &mut ids, &mut rng);
        prop_assert_eq!(&source, &snapshot);
    }
}
