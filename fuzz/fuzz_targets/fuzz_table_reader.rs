#![no_main]

use libfuzzer_sys::fuzz_target;

use carbon_balance::constants::ConstantsRecord;
use carbon_balance::pipeline::{Pipeline, PipelineOptions};
use carbon_balance::table::{read_table, TableRegion};

fuzz_target!(|data: &[u8]| {
    // Reading arbitrary bytes must fail gracefully, never panic
    let Ok(mut table) = read_table(data, &TableRegion::new(0, 0)) else {
        return;
    };

    // Whatever loaded must survive the balance, missing columns included
    if let Ok(pipeline) = Pipeline::new(ConstantsRecord::default(), PipelineOptions::default()) {
        let _ = pipeline.run(&mut table);
    }
});
