//! This module is an integration test that checks runtime trace data taking
//! precedence over the static gas schedule during analysis.
#![cfg(test)]

use gas_attribution_analyzer::analyzer::{hotspot::Severity, Config, GasAnalyzer};

mod common;

#[test]
fn trace_costs_supersede_static_estimates() -> anyhow::Result<()> {
    let artifact = common::counter_artifact()?;
    let analyzer = GasAnalyzer::from_artifact(&artifact, Config::default());
    let trace = common::counter_write_trace("0x1")?;

    let refined = analyzer.analyze_with_trace(&trace)?;

    let write = &refined.hotspots[0];
    assert_eq!(write.source_range.start, 81);
    assert_eq!(write.gas_used, 3 + 3 + 20_000);

    let reads = &refined.hotspots[1];
    // The trace records the second SLOAD as warm (100 gas), replacing its
    // flat 2100 estimate.
    assert_eq!(reads.gas_used, 3 + 2_100 + 3 + 100);
    assert_eq!(reads.severity, Severity::Warning);

    Ok(())
}

#[test]
fn traces_with_broken_entries_still_refine() -> anyhow::Result<()> {
    let document = serde_json::json!({
        "structLogs": [
            { "pc": 0, "op": "PUSH1", "stack": [], "depth": 1, "gas": 1_000 },
            "garbage",
            { "pc": 2, "op": "SLOAD", "stack": ["0x0"], "depth": 1, "gas": 997 },
            { "pc": 3, "op": "STOP", "stack": [], "depth": 1, "gas": 897 },
        ],
    });
    let trace = gas_attribution_analyzer::ExecutionTrace::from_json(&document)?;
    assert_eq!(trace.malformed_entry_count, 1);

    let artifact = common::counter_artifact()?;
    let analyzer = GasAnalyzer::from_artifact(&artifact, Config::default());
    let report = analyzer.analyze_with_trace(&trace)?;

    // The surviving entries still override: pc 0 cost 3, pc 2 cost 100.
    let reads = &report.hotspots[1];
    assert_eq!(reads.gas_used, 3 + 100 + 3 + 2_100);

    Ok(())
}
