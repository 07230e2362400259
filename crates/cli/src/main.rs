//! `replenish <dataset.json> [--concurrent]`
//!
//! Loads one tenant's planning inputs from a JSON dataset, runs the standard
//! report pipeline with environment-driven config, and prints the report as
//! JSON on stdout. A rejected configuration still prints a report, with every
//! analyzer marked failed.

use anyhow::{Context, bail};

use replenish_core::TenantId;
use replenish_infra::{
    ConfigError, JsonFilePlanningDataSource, PipelineReport, ReportPipeline,
    planning_config_from_env,
};
use replenish_planning::{PlanningConfig, TenantScope};

fn main() -> anyhow::Result<()> {
    replenish_observability::init();

    let mut path = None;
    let mut concurrent = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--concurrent" => concurrent = true,
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ if path.is_some() => bail!("only one dataset path is accepted"),
            _ => path = Some(arg),
        }
    }
    let Some(path) = path else {
        bail!("usage: replenish <dataset.json> [--concurrent]");
    };

    let source = JsonFilePlanningDataSource::new(&path);
    let tenant_id = source
        .tenant_id()
        .with_context(|| format!("failed to read dataset {path}"))?;

    let report = plan(tenant_id, planning_config_from_env(), &source, concurrent);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.failed_count() > 0 {
        bail!("{} analyzer(s) failed", report.failed_count());
    }
    Ok(())
}

fn plan(
    tenant_id: TenantId,
    config: Result<PlanningConfig, ConfigError>,
    source: &JsonFilePlanningDataSource,
    concurrent: bool,
) -> PipelineReport {
    let pipeline = ReportPipeline::standard().with_scope(TenantScope::Only(tenant_id));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(tenant = %tenant_id, error = %e, "planning configuration rejected");
            return pipeline.fail_all(tenant_id, e.into());
        }
    };

    tracing::info!(
        tenant = %tenant_id,
        start = %config.report_start_date,
        end = %config.report_end_date,
        concurrent,
        "planning run starting"
    );

    if concurrent {
        pipeline.run_from_source_concurrent(tenant_id, &config, source)
    } else {
        pipeline.run_from_source(tenant_id, &config, source)
    }
}
