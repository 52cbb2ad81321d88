mod common;

use common::{ShuffledSplits, engine as default_engine, fine_grained_engine};
use parastream::ops::find::{find_any, find_first};
use parastream::{Engine, Execution, PipelineHelper, RangeCursor, Source, StageExt, StreamFlags};
use proptest::prelude::*;
use rstest::{fixture, rstest};

#[fixture]
fn engine() -> Engine {
    fine_grained_engine(4)
}

#[rstest]
#[case(vec![7, 2, 9, 4, 6], Some(2))]
#[case(vec![1, 3, 5], None)]
#[case(vec![], None)]
fn first_even_under_every_split(engine: Engine, #[case] data: Vec<i32>, #[case] expected: Option<i32>) {
    let stages = Source::<i32>::new().filter(|x| x % 2 == 0);
    let sequential = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Sequential);
    assert_eq!(find_first(&sequential, ShuffledSplits::new(data.clone(), 1)).unwrap(), expected);

    let parallel = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
    for seed in 1..50 {
        assert_eq!(find_first(&parallel, ShuffledSplits::new(data.clone(), seed)).unwrap(), expected, "seed {seed}");
    }
}

#[rstest]
fn find_any_returns_some_match(engine: Engine) {
    let stages = Source::<i64>::new().filter(|x| x % 1_000 == 999);
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
    let found = find_any(&helper, RangeCursor::new(0, 100_000)).unwrap();
    assert!(found.is_some_and(|x| x % 1_000 == 999));

    assert_eq!(find_any(&helper, RangeCursor::new(0, 999)).unwrap(), None);
}

#[rstest]
fn find_first_on_a_large_range(engine: Engine) {
    let stages = Source::<i64>::new().filter(|x| *x >= 12_345);
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
    assert_eq!(find_first(&helper, RangeCursor::new(0, 50_000)).unwrap(), Some(12_345));
}

#[rstest]
fn find_first_over_the_full_i64_range() {
    let engine = default_engine(4);
    let stages = Source::<i64>::new();
    let cursor = RangeCursor::new(i64::MIN, i64::MAX);
    let sequential = PipelineHelper::for_cursor(&stages, &cursor, Execution::Sequential);
    let parallel = PipelineHelper::for_cursor(&stages, &cursor, Execution::Parallel(&engine));
    assert_eq!(find_first(&sequential, cursor).unwrap(), Some(i64::MIN));
    assert_eq!(find_first(&parallel, cursor).unwrap(), Some(i64::MIN));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn parallel_find_first_is_the_earliest_match(
        data in prop::collection::vec(0u8..40, 0..200),
        wanted in 0u8..40,
        seed in 1u64..u64::MAX,
    ) {
        let engine = fine_grained_engine(3);
        let stages = Source::<(usize, u8)>::new().filter(move |(_, value)| *value == wanted);
        let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
        let indexed: Vec<(usize, u8)> = data.iter().copied().enumerate().collect();
        let expected = indexed.iter().copied().find(|(_, value)| *value == wanted);
        prop_assert_eq!(find_first(&helper, ShuffledSplits::new(indexed, seed)).unwrap(), expected);
    }
}
