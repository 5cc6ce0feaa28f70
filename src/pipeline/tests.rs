use super::*;
use crate::balance::FlushAnomaly;
use crate::table::SampleRow;

/// Molar factor 1 (moles equal hPa), dry-mass factor 1000, dissolved moles
/// equal the concentration.
fn unit_constants() -> ConstantsRecord {
    ConstantsRecord {
        gas_constant: 1.0,
        temperature: 100.0,
        headspace_volume: 1.0,
        water_volume: 1000.0,
        dry_mass_sample: 12.0,
        molar_mass_carbon: 12.0,
        henry_constant_co2: 0.01,
    }
}

fn sample_series() -> SampleSeries {
    SampleSeries::new(vec![
        SampleRow::new(0.0, 0.0, 20.0, 80.0, 100.0, 90.0),
        SampleRow::new(0.0, 10.0, 10.0, 80.0, 100.0, 90.0),
        SampleRow::new(0.0, 5.0, 15.0, 80.0, 100.0, 90.0).flushed(),
        SampleRow::new(0.0, 20.0, 0.0, 80.0, 100.0, 90.0),
    ])
}

fn assert_column(table: &ColumnTable, name: &str, expected: &[f64]) {
    let actual = table.float(name).unwrap();
    assert_eq!(actual.len(), expected.len(), "column '{}'", name);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if e.is_nan() {
            assert!(a.is_nan(), "'{}' row {}: expected NaN, got {}", name, i, a);
        } else {
            assert!((a - e).abs() < 1e-9, "'{}' row {}: expected {}, got {}", name, i, e, a);
        }
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(unit_constants(), PipelineOptions::default()).unwrap()
}

#[test]
fn test_full_run_known_values() {
    let (table, report) = pipeline().run_series(&sample_series()).unwrap();
    let nan = f64::NAN;

    assert_column(&table, columns::SUM_CORR, &[100.0; 4]);
    assert_column(&table, columns::MOL_CO2_BEFORE, &[0.0, 10.0, 5.0, 20.0]);
    assert_column(&table, columns::MOL_O2_AFTER, &[18.0, 9.0, 13.5, 0.0]);

    assert_column(&table, columns::CO2_PRODUCED, &[0.0, 10.0, nan, 15.5]);
    assert_column(&table, columns::O2_CONSUMED, &[0.0, 8.0, nan, 13.5]);
    assert_column(&table, columns::CO2_PRODUCED_CUM, &[0.0, 10.0, nan, 25.5]);
    assert_column(&table, columns::O2_CONSUMED_CUM, &[0.0, 8.0, nan, 21.5]);
    assert_column(&table, columns::CARBON_GAS_DRY_MASS_CUM, &[0.0, 10_000.0, nan, 25_500.0]);

    assert_column(&table, columns::PP_CO2_BEFORE, &[0.0, 1000.0, 500.0, 2000.0]);
    assert_column(&table, columns::CO2_AQ_AFTER, &[0.0, 9.0, 4.5, 18.0]);
    assert_column(&table, columns::CO2_DISSOLVED_STEP, &[0.0, 10.0, -4.0, 15.5]);
    assert_column(&table, columns::CO2_AQ_CUM, &[0.0, 10.0, nan, 25.5]);
    assert_column(&table, columns::DIC_CUM, &[0.0, 10_000.0, nan, 25_500.0]);

    assert_column(&table, columns::TOTAL_CARBON_DRY_MATTER, &[0.0, 20_000.0, nan, 51_000.0]);
    assert_column(&table, columns::RATIO_O2_CO2, &[0.0, 0.4, nan, 13.5 / 31.0]);

    assert_eq!(report.rows, 4);
    assert!(report.flush_anomalies.is_empty());
    assert_eq!(report.indeterminate_count(columns::CO2_PRODUCED_CUM), 1);
    assert_eq!(report.indeterminate_count(columns::SUM), 0);
    assert!(report.stages[0].skipped, "no date column, elapsed time skipped");
    assert_eq!(report.stages.len(), 7);
}

#[test]
fn test_missing_input_column_is_fatal() {
    let mut table = sample_series().to_table().unwrap();
    let mut without_ch4 = ColumnTable::new();
    for column in table.columns() {
        if column.name != columns::CH4 {
            without_ch4.push_column(column.name.clone(), column.data.clone()).unwrap();
        }
    }
    table = without_ch4;

    let err = pipeline().run(&mut table).unwrap_err();
    match err {
        PipelineError::MissingColumn { stage, column } => {
            assert_eq!(stage, "composition");
            assert_eq!(column, columns::CH4);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_flush_fails_first_flush_stage() {
    let source = sample_series().to_table().unwrap();
    let mut table = ColumnTable::new();
    for column in source.columns().iter().filter(|c| c.name != columns::FLUSH) {
        table.push_column(column.name.clone(), column.data.clone()).unwrap();
    }

    let err = pipeline().run(&mut table).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn { stage: "gas-steps", .. }));
    // Earlier stages already wrote their columns
    assert!(table.contains(columns::MOL_GAS_BEFORE));
}

#[test]
fn test_flush_anomaly_reported_and_treated_as_flushed() {
    let mut series = sample_series();
    series.rows[2].flush = 2.0;

    let (table, report) = pipeline().run_series(&series).unwrap();
    assert_eq!(report.flush_anomalies, vec![FlushAnomaly { row: 2, value: Some(2.0) }]);
    assert!(table.float(columns::CO2_PRODUCED_CUM).unwrap()[2].is_nan());
}

#[test]
fn test_reject_policy_aborts() {
    let mut series = sample_series();
    series.rows[1].flush = 0.5;

    let options = PipelineOptions {
        flush_policy: FlushPolicy::Reject,
        ..Default::default()
    };
    let pipeline = Pipeline::new(unit_constants(), options).unwrap();

    let err = pipeline.run_series(&series).unwrap_err();
    assert!(matches!(err, PipelineError::FlushIntegrity(_)));
}

#[test]
fn test_invalid_constants_rejected_up_front() {
    let constants = ConstantsRecord {
        dry_mass_sample: 0.0,
        ..unit_constants()
    };
    let err = Pipeline::new(constants, PipelineOptions::default()).err().unwrap();
    assert!(matches!(err, PipelineError::InvalidConstant(_)));

    let raw = RawConstants::default();
    assert!(Pipeline::from_raw(&raw, PipelineOptions::default()).is_err());
}

#[test]
fn test_seed_applies_to_gas_and_results_columns() {
    let options = PipelineOptions {
        first_row_value: 7.0,
        ..Default::default()
    };
    let pipeline = Pipeline::new(unit_constants(), options).unwrap();
    let (table, _) = pipeline.run_series(&sample_series()).unwrap();

    for name in [
        columns::CO2_PRODUCED,
        columns::CO2_PRODUCED_CUM,
        columns::CARBON_GAS_DRY_MASS_CUM,
        columns::TOTAL_CARBON_DRY_MATTER,
        columns::RATIO_O2_CO2,
    ] {
        assert_eq!(table.float(name).unwrap()[0], 7.0, "column '{}'", name);
    }
    // Row 1 builds on the seed
    assert_eq!(table.float(columns::CO2_PRODUCED_CUM).unwrap()[1], 17.0);
    // Aqueous columns keep their computed row 0
    assert_eq!(table.float(columns::CO2_AQ_CUM).unwrap()[0], 0.0);
}

#[test]
fn test_running_sum_strategy_ignores_flush() {
    let options = PipelineOptions {
        aqueous_strategy: AqueousStrategy::RunningSum,
        ..Default::default()
    };
    let pipeline = Pipeline::new(unit_constants(), options).unwrap();
    let (table, _) = pipeline.run_series(&sample_series()).unwrap();

    // The flushed row's dissolved step is defined, so the plain sum carries it
    assert_column(&table, columns::CO2_AQ_CUM, &[0.0, 10.0, 6.0, 21.5]);
    assert_column(&table, columns::DIC_CUM, &[0.0, 10_000.0, 6_000.0, 21_500.0]);
}

#[test]
fn test_elapsed_time_from_dates() {
    let mut series = sample_series();
    series.rows[0] = series.rows[0].clone().at("2023-05-01", "12:00:00");
    series.rows[1] = series.rows[1].clone().at("2023-05-02", "12:00:00");
    series.rows[2] = series.rows[2].clone().at("2023-05-02", "18:00:00");
    series.rows[3] = series.rows[3].clone().at("2023-05-04", "");

    let (table, report) = pipeline().run_series(&series).unwrap();
    assert_column(&table, columns::DAY, &[0.0, 1.0, 1.25, 2.5]);
    assert!(!report.stages[0].skipped);
}

#[test]
fn test_existing_day_column_kept() {
    let mut series = sample_series();
    for (i, row) in series.rows.iter_mut().enumerate() {
        row.date = "2023-05-01".to_string();
        row.day = Some(i as f64 * 3.0);
    }

    let (table, report) = pipeline().run_series(&series).unwrap();
    assert_column(&table, columns::DAY, &[0.0, 3.0, 6.0, 9.0]);
    assert!(report.stages[0].columns.is_empty());
}

#[test]
fn test_text_inputs_are_coerced() {
    let source = sample_series().to_table().unwrap();
    let mut table = ColumnTable::new();
    for column in source.columns() {
        let data = if column.name == columns::PRESSURE_BEFORE {
            ColumnData::Text(vec!["100".into(), "100,0".into(), "n/a".into(), "100".into()])
        } else {
            column.data.clone()
        };
        table.push_column(column.name.clone(), data).unwrap();
    }

    let report = pipeline().run(&mut table).unwrap();
    assert_eq!(report.unparsable_inputs.get(columns::PRESSURE_BEFORE), Some(&vec![2]));
    assert!(table.float(columns::MOL_GAS_BEFORE).unwrap()[2].is_nan());
    assert_eq!(table.float(columns::MOL_GAS_BEFORE).unwrap()[1], 100.0);
}

#[test]
fn test_baseline_override_rewrites_raw_row_zero() {
    let options = PipelineOptions {
        baseline_composition: Some(GasFractions::ATMOSPHERE),
        ..Default::default()
    };
    let pipeline = Pipeline::new(unit_constants(), options).unwrap();
    let (table, _) = pipeline.run_series(&sample_series()).unwrap();

    assert_eq!(table.float(columns::CO2).unwrap()[0], 0.03);
    assert_eq!(table.float(columns::O2).unwrap()[0], 21.90);
    assert_eq!(table.float(columns::CO2).unwrap()[1], 10.0);
    assert!((table.float(columns::O2_CORR).unwrap()[0] - 21.90).abs() < 1e-9);
}

#[test]
fn test_rerun_replaces_output_columns() {
    let pipeline = pipeline();
    let (mut table, _) = pipeline.run_series(&sample_series()).unwrap();
    let first = table.clone();

    pipeline.run(&mut table).unwrap();
    assert_eq!(table.column_count(), first.column_count());
    assert_column(
        &table,
        columns::TOTAL_CARBON_DRY_MATTER,
        first.float(columns::TOTAL_CARBON_DRY_MATTER).unwrap(),
    );
}

#[test]
fn test_custom_stage_list() {
    let pipeline = pipeline().with_stages(vec![Box::new(stage::CompositionStage)]);
    assert_eq!(pipeline.stage_names(), vec!["composition"]);

    let (table, report) = pipeline.run_series(&sample_series()).unwrap();
    assert!(table.contains(columns::SUM));
    assert!(!table.contains(columns::MOL_GAS_BEFORE));
    assert_eq!(report.written_columns().count(), 6);
}

#[test]
fn test_report_serializes() {
    let (_, report) = pipeline().run_series(&sample_series()).unwrap();
    let json = report.to_json().unwrap();
    let back: RunReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert!(report.to_string().contains("Processed 4 rows"));
}

#[test]
fn test_report_with_empty_flush_cell_round_trips() {
    let series = SampleSeries::new(vec![
        SampleRow::new(0.0, 0.0, 20.0, 80.0, 100.0, 90.0),
        SampleRow {
            flush: f64::NAN,
            ..SampleRow::new(0.0, 10.0, 10.0, 80.0, 100.0, 90.0)
        },
    ]);
    let (_, report) = pipeline().run_series(&series).unwrap();
    assert_eq!(report.flush_anomalies, vec![FlushAnomaly { row: 1, value: None }]);

    let json = report.to_json().unwrap();
    let back: RunReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
