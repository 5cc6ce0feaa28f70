//! Property-based tests for the balance invariants

use carbon_balance::balance::composition::{normalize, CompositionColumns};
use carbon_balance::prelude::*;
use proptest::prelude::*;

fn reading() -> impl Strategy<Value = f64> {
    0.0f64..100.0
}

fn nonzero_rows() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    prop::collection::vec((reading(), reading(), reading(), reading()), 1..50)
        .prop_filter("nonzero sum", |rows| rows.iter().all(|(a, b, c, d)| a + b + c + d > 1e-6))
}

fn split(rows: &[(f64, f64, f64, f64)]) -> [Vec<f64>; 4] {
    [
        rows.iter().map(|r| r.0).collect(),
        rows.iter().map(|r| r.1).collect(),
        rows.iter().map(|r| r.2).collect(),
        rows.iter().map(|r| r.3).collect(),
    ]
}

proptest! {
    /// Corrected readings always sum to 100 %
    #[test]
    fn test_normalized_sum_is_100(rows in nonzero_rows()) {
        let [ch4, co2, o2, n2] = split(&rows);
        let out = normalize(CompositionColumns { ch4: &ch4, co2: &co2, o2: &o2, n2: &n2 });

        for sum in &out.sum_corrected {
            prop_assert!((sum - 100.0).abs() < 1e-9);
        }
    }

    /// Normalising twice changes nothing
    #[test]
    fn test_normalize_is_idempotent(rows in nonzero_rows()) {
        let [ch4, co2, o2, n2] = split(&rows);
        let once = normalize(CompositionColumns { ch4: &ch4, co2: &co2, o2: &o2, n2: &n2 });
        let twice = normalize(once.corrected.columns());

        for (a, b) in once.corrected.co2.iter().zip(&twice.corrected.co2) {
            prop_assert!((a - b).abs() < 1e-9);
        }
        for (a, b) in once.corrected.o2.iter().zip(&twice.corrected.o2) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    /// Flushed rows are undefined and normal rows build on the last normal row
    #[test]
    fn test_flush_aware_fold(
        steps in prop::collection::vec((-50.0f64..50.0, any::<bool>()), 1..80),
        seed in -10.0f64..10.0,
    ) {
        let increments: Vec<f64> = steps.iter().map(|s| s.0).collect();
        let mask = FlushMask::from_flags(steps.iter().map(|s| s.1).collect());
        let cumulative = FlushAwareAccumulator::new(seed).accumulate(&increments, &mask);

        prop_assert_eq!(cumulative.len(), increments.len());
        prop_assert_eq!(cumulative[0], seed);

        let mut last_valid = 0;
        for i in 1..cumulative.len() {
            if mask.is_flushed(i) {
                prop_assert!(cumulative[i].is_nan());
            } else {
                prop_assert_eq!(cumulative[i], cumulative[last_valid] + increments[i]);
                last_valid = i;
            }
        }
    }

    /// Row 0 of every seeded output is the configured first-row value
    #[test]
    fn test_first_row_value_seeds_outputs(
        seed in -5.0f64..5.0,
        flushes in prop::collection::vec(any::<bool>(), 2..12),
    ) {
        let rows: Vec<SampleRow> = flushes
            .iter()
            .enumerate()
            .map(|(i, &flushed)| {
                let k = i as f64;
                let row = SampleRow::new(0.01 * k, 0.03 + 0.5 * k, 21.9 - 0.6 * k, 78.07, 1010.0 - k, 1002.0 - k);
                if flushed { row.flushed() } else { row }
            })
            .collect();

        let options = PipelineOptions { first_row_value: seed, ..PipelineOptions::default() };
        let pipeline = Pipeline::new(ConstantsRecord::default(), options).unwrap();
        let (table, _) = pipeline.run_series(&SampleSeries::new(rows)).unwrap();

        for name in [
            columns::O2_CONSUMED,
            columns::CO2_PRODUCED,
            columns::CO2_PRODUCED_CUM,
            columns::CARBON_GAS_DRY_MASS_CUM,
            columns::TOTAL_CARBON_DRY_MATTER,
            columns::RATIO_O2_CO2,
        ] {
            prop_assert_eq!(table.float(name).unwrap()[0], seed);
        }

        for (i, &flushed) in flushes.iter().enumerate().skip(1) {
            if flushed {
                prop_assert!(table.float(columns::TOTAL_CARBON_DRY_MATTER).unwrap()[i].is_nan());
                prop_assert!(table.float(columns::RATIO_O2_CO2).unwrap()[i].is_nan());
            }
        }
    }
}
