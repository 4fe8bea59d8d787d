// Property-Based Testing for chart series alignment
// Tests that aligned batches share one time axis and that alignment is idempotent

use proptest::prelude::*;
use std::collections::BTreeMap;
use testboard::chart::{align_datasets, merge_pair, ChartPoint, Dataset, PointValue};
use testboard::results::{timestamp, Timestamp};

fn day(offset: u32) -> Timestamp {
    timestamp::parse(&format!("2016-01-{:02} 00:00:00", offset + 1)).unwrap()
}

/// A sorted series on a small set of days, so overlaps are common
fn series_strategy(label: &'static str) -> impl Strategy<Value = Dataset> {
    (
        prop::collection::btree_set(0u32..20, 0..10),
        "[a-z]{3,6}",
        0.0f64..200.0,
    )
        .prop_map(move |(days, server, base)| Dataset {
            label: label.to_string(),
            server_name: server,
            points: days
                .into_iter()
                .map(|d| ChartPoint::new(day(d), PointValue::Number(base + d as f64)))
                .collect(),
        })
}

fn batch_strategy() -> impl Strategy<Value = Vec<Dataset>> {
    prop::collection::vec(series_strategy("avg_fps"), 1..6)
}

fn numbers(dataset: &Dataset) -> BTreeMap<Timestamp, f64> {
    dataset
        .points
        .iter()
        .filter_map(|p| p.value.as_f64().map(|v| (p.time, v)))
        .collect()
}

proptest! {
    #[test]
    fn prop_aligned_datasets_share_one_sorted_domain(mut datasets in batch_strategy()) {
        align_datasets(&mut datasets);

        let domain = datasets[0].timestamps();
        prop_assert!(domain.windows(2).all(|w| w[0] < w[1]));
        for dataset in &datasets {
            prop_assert_eq!(dataset.timestamps(), domain.clone());
        }
    }

    #[test]
    fn prop_domain_is_union_of_inputs(datasets in batch_strategy()) {
        let mut expected: Vec<Timestamp> = datasets
            .iter()
            .flat_map(|d| d.timestamps())
            .collect();
        expected.sort();
        expected.dedup();

        let mut aligned = datasets.clone();
        align_datasets(&mut aligned);
        prop_assert_eq!(aligned[0].timestamps(), expected);
    }

    #[test]
    fn prop_alignment_keeps_every_sample(datasets in batch_strategy()) {
        let mut aligned = datasets.clone();
        align_datasets(&mut aligned);

        for (before, after) in datasets.iter().zip(&aligned) {
            prop_assert_eq!(numbers(before), numbers(after));
            let gaps = after.points.iter().filter(|p| p.value.is_gap()).count();
            prop_assert_eq!(gaps, after.points.len() - before.points.len());
        }
    }

    #[test]
    fn prop_alignment_is_idempotent(mut datasets in batch_strategy()) {
        align_datasets(&mut datasets);
        let aligned = datasets.clone();

        prop_assert_eq!(align_datasets(&mut datasets), 0);
        prop_assert_eq!(datasets, aligned);
    }

    #[test]
    fn prop_merge_pair_is_symmetric_in_domain(
        a in series_strategy("avg_fps"),
        b in series_strategy("max_fps"),
    ) {
        let (mut a1, mut b1) = (a.clone(), b.clone());
        let (mut b2, mut a2) = (b, a);
        merge_pair(&mut a1, &mut b1);
        merge_pair(&mut b2, &mut a2);

        prop_assert_eq!(a1.timestamps(), a2.timestamps());
        prop_assert_eq!(b1.timestamps(), b2.timestamps());
        prop_assert_eq!(a1, a2);
        prop_assert_eq!(b1, b2);
    }

    #[test]
    fn prop_descriptive_series_never_gaps(
        metric in series_strategy("avg_fps"),
        days in prop::collection::btree_set(0u32..20, 1..10),
    ) {
        let mut datasets = vec![
            metric,
            Dataset {
                label: "server_name".to_string(),
                server_name: "linux".to_string(),
                points: days
                    .into_iter()
                    .map(|d| ChartPoint::new(day(d), PointValue::Text("linux".to_string())))
                    .collect(),
            },
        ];
        align_datasets(&mut datasets);

        prop_assert!(datasets[1]
            .points
            .iter()
            .all(|p| p.value == PointValue::Text("linux".to_string())));
    }
}
