//! This module is an integration test that runs the static gas analysis on
//! the compiled artifact of a small, hand-constructed counter contract.
#![cfg(test)]

use gas_attribution_analyzer::analyzer::{
    hotspot::Severity,
    pattern::Pattern,
    Config,
    GasAnalyzer,
};

mod common;

#[test]
fn ranks_hotspots_by_accumulated_gas() -> anyhow::Result<()> {
    let artifact = common::counter_artifact()?;
    let analyzer = GasAnalyzer::from_artifact(&artifact, Config::default());

    let report = analyzer.analyze()?;

    // The two source ranges of the contract, most expensive first.
    assert_eq!(report.hotspots.len(), 2);
    let write = &report.hotspots[0];
    let reads = &report.hotspots[1];

    // The storage write dominates: two pushes plus the flat SSTORE figure.
    assert_eq!(write.source_range.start, 81);
    assert_eq!(write.source_range.end, 99);
    assert_eq!(write.gas_used, 3 + 3 + 20_000);
    assert_eq!(write.severity, Severity::Critical);
    assert_eq!(write.pattern, Pattern::None);
    assert!(write.recommendation.contains("Storage writes"));

    // The double read groups into one hotspot with a detected pattern.
    assert_eq!(reads.source_range.start, 89);
    assert_eq!(reads.source_range.end, 94);
    assert_eq!(reads.gas_used, 2 * (3 + 2_100));
    assert_eq!(reads.severity, Severity::Warning);
    assert_eq!(reads.pattern, Pattern::RepeatedSload);
    assert!(reads.suggested_fix.is_some());

    assert!(report.diagnostics.is_clean());

    Ok(())
}

#[test]
fn analysis_is_reproducible() -> anyhow::Result<()> {
    let artifact = common::counter_artifact()?;
    let analyzer = GasAnalyzer::from_artifact(&artifact, Config::default());

    assert_eq!(analyzer.analyze()?, analyzer.analyze()?);

    Ok(())
}

#[test]
fn abstract_contracts_analyze_to_nothing() -> anyhow::Result<()> {
    let artifact = common::abstract_artifact()?;
    assert!(artifact.is_abstract());

    let analyzer = GasAnalyzer::from_artifact(&artifact, Config::default());
    let report = analyzer.analyze()?;

    assert!(report.hotspots.is_empty());
    assert!(report.diagnostics.is_clean());

    Ok(())
}

#[test]
fn short_source_maps_degrade_to_partial_results() -> anyhow::Result<()> {
    let artifact = common::counter_artifact()?;
    // Keep only the first four map entries of seven.
    let analyzer = GasAnalyzer::new(artifact.bytecode(), "89:5:0:-;;;", Config::default());

    let report = analyzer.analyze()?;

    assert_eq!(report.hotspots.len(), 1);
    assert_eq!(report.hotspots[0].source_range.start, 89);
    assert_eq!(report.diagnostics.unmapped_instructions, 3);

    Ok(())
}
