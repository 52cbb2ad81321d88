mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::{ShuffledSplits, fine_grained_engine};
use parastream::ops::matching;
use parastream::{
    Engine, EngineConfig, Execution, MatchKind, MatchOp, PipelineHelper, RangeCursor, Source, StageExt, StreamFlags,
    TerminalOp,
};
use proptest::prelude::*;
use rstest::{fixture, rstest};

#[fixture]
fn engine() -> Engine {
    fine_grained_engine(4)
}

fn is_even(x: &i32) -> bool {
    x % 2 == 0
}

fn run(kind: MatchKind, data: &[i32], predicate: fn(&i32) -> bool, execution: Execution<'_>, seed: u64) -> bool {
    let stages = Source::<i32>::new();
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, execution);
    MatchOp::new(kind, predicate).evaluate(&helper, ShuffledSplits::new(data.to_vec(), seed)).unwrap()
}

#[rstest]
#[case(MatchKind::Any, vec![1, 3, 5, 7, 4, 9], is_even, true)]
#[case(MatchKind::Any, vec![1, 3, 5], is_even, false)]
#[case(MatchKind::Any, vec![], is_even, false)]
#[case(MatchKind::All, vec![2, 4, 6, 8], is_even, true)]
#[case(MatchKind::All, vec![2, 4, 5, 8], is_even, false)]
#[case(MatchKind::All, vec![], is_even, true)]
#[case(MatchKind::None, vec![1, 2, 3], |x: &i32| *x > 10, true)]
#[case(MatchKind::None, vec![1, 20, 3], |x: &i32| *x > 10, false)]
#[case(MatchKind::None, vec![], is_even, true)]
fn matches_agree_in_both_modes(
    engine: Engine,
    #[case] kind: MatchKind,
    #[case] data: Vec<i32>,
    #[case] predicate: fn(&i32) -> bool,
    #[case] expected: bool,
) {
    assert_eq!(run(kind, &data, predicate, Execution::Sequential, 1), expected);
    for seed in 1..20 {
        assert_eq!(run(kind, &data, predicate, Execution::Parallel(&engine), seed), expected, "seed {seed}");
    }
}

#[rstest]
fn free_functions_use_the_helper_mode(engine: Engine) {
    let stages = Source::<i64>::new().map(|x| x * 3);
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
    assert!(matching::any(&helper, RangeCursor::new(0, 1_000), |x| *x == 2_997).unwrap());
    assert!(matching::all(&helper, RangeCursor::new(0, 1_000), |x| x % 3 == 0).unwrap());
    assert!(matching::none(&helper, RangeCursor::new(0, 1_000), |x| x % 3 == 1).unwrap());
}

#[rstest]
fn deciding_leaves_stop_early() {
    let engine = Engine::new(EngineConfig::default().with_parallelism(4).with_leaf_size(1_000)).unwrap();
    let visited = AtomicUsize::new(0);
    let stages = Source::<i64>::new().inspect(|_| {
        visited.fetch_add(1, Ordering::Relaxed);
    });

    // every leaf is decided by its first element
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
    assert!(!matching::all(&helper, RangeCursor::new(0, 1_000_000), |x| *x < 0).unwrap());
    assert!(visited.load(Ordering::Relaxed) <= 2_048);

    visited.store(0, Ordering::Relaxed);
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Sequential);
    assert!(matching::any(&helper, RangeCursor::new(0, 1_000_000), |x| *x == 9).unwrap());
    assert_eq!(visited.load(Ordering::Relaxed), 10);
}

#[rstest]
fn pending_tasks_are_abandoned_once_decided() {
    let engine = Engine::new(EngineConfig::default().with_parallelism(1).with_leaf_size(1)).unwrap();
    let visited = AtomicUsize::new(0);
    let stages = Source::<i64>::new().inspect(|_| {
        visited.fetch_add(1, Ordering::Relaxed);
    });
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));

    // the first leaf decides; the other 4095 single-element tasks must not pull anything
    assert!(matching::any(&helper, RangeCursor::new(0, 4_096), |x| *x >= 0).unwrap());
    assert_eq!(visited.load(Ordering::Relaxed), 1);

    visited.store(0, Ordering::Relaxed);
    assert!(!matching::none(&helper, RangeCursor::new(0, 4_096), |x| *x >= 0).unwrap());
    assert_eq!(visited.load(Ordering::Relaxed), 1);
}

#[rstest]
fn stateful_chain_matches_on_sorted_output(engine: Engine) {
    let stages = Source::<i32>::new().sorted().take_while(|x| *x < 5);
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
    let data = vec![9, 4, 1, 7, 3];
    assert!(matching::all(&helper, ShuffledSplits::new(data.clone(), 3), |x| *x < 5).unwrap());
    assert!(matching::any(&helper, ShuffledSplits::new(data, 3), |x| *x == 4).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn parallel_match_equals_iterator_semantics(
        data in prop::collection::vec(-50i32..50, 0..200),
        threshold in -60i32..60,
        seed in any::<u64>(),
    ) {
        let engine = fine_grained_engine(3);
        let stages = Source::<i32>::new();
        let above = move |x: &i32| *x > threshold;
        let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));

        let expected_any = data.iter().any(above);
        let expected_all = data.iter().all(above);
        prop_assert_eq!(matching::any(&helper, ShuffledSplits::new(data.clone(), seed), above).unwrap(), expected_any);
        prop_assert_eq!(matching::all(&helper, ShuffledSplits::new(data.clone(), seed), above).unwrap(), expected_all);
        prop_assert_eq!(matching::none(&helper, ShuffledSplits::new(data, seed), above).unwrap(), !expected_any);
    }
}
