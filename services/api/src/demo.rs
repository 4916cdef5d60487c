use crate::infra::{parse_date, InMemoryRecordSource, SAMPLE_REFERENCE_ID};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Args;
use record_screen::config::AppConfig;
use record_screen::error::AppError;
use record_screen::screening::{
    start_of_day, CheckRequest, RiskLevel, RuleSet, ScreeningEngine, ScreeningError,
    ScreeningReport,
};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Rule file to use instead of the configured one.
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Record document (provider JSON response) to score
    #[arg(long)]
    pub(crate) document: PathBuf,
    /// Rule file to use instead of the configured one
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        document,
        rules,
        as_of,
    } = args;

    let engine = ScreeningEngine::new(load_rules(rules)?);
    let raw = fs::read_to_string(&document)?;
    let document: Value = serde_json::from_str(&raw).map_err(ScreeningError::MalformedDocument)?;

    let assessment = engine.assess_at(&document, resolve_as_of(as_of))?;
    let rendered = serde_json::to_string_pretty(&assessment).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine = ScreeningEngine::new(load_rules(args.rules)?);
    let as_of = resolve_as_of(args.as_of);

    println!("=== Background Screening Demo ===");
    println!("Evaluated as of {}", as_of.format("%Y-%m-%d %H:%M"));

    let report = demo_report(&engine, as_of)?;
    render_report(&report);
    Ok(())
}

pub(crate) fn demo_report(
    engine: &ScreeningEngine,
    as_of: NaiveDateTime,
) -> Result<ScreeningReport, AppError> {
    let source = InMemoryRecordSource::seeded()?;
    let report = engine.run_background_check_at(&source, demo_person(), as_of)?;
    Ok(report)
}

fn demo_person() -> CheckRequest {
    CheckRequest {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        middle_name: Some("Michael".to_string()),
        dob: Some("1985-06-15".to_string()),
        email: Some("john.doe@example.com".to_string()),
        reference_id: Some(SAMPLE_REFERENCE_ID.to_string()),
        ..CheckRequest::default()
    }
}

fn load_rules(rules_override: Option<PathBuf>) -> Result<RuleSet, AppError> {
    let config = AppConfig::load()?;
    let rules_path = rules_override.unwrap_or(config.screening.rules_path);
    RuleSet::load(rules_path, config.screening.tier_table_path.as_deref()).map_err(AppError::from)
}

fn resolve_as_of(as_of: Option<NaiveDate>) -> NaiveDateTime {
    as_of
        .map(start_of_day)
        .unwrap_or_else(|| Local::now().naive_local())
}

fn render_report(report: &ScreeningReport) {
    let person = &report.person_info;
    println!(
        "\nPerson: {} {} (dob {}, reference {})",
        person.first_name, person.last_name, person.dob, person.reference_id
    );
    println!("Check ID: {}", report.checkr_check_id);
    println!("Overall risk: {}", report.overall_risk_level);
    println!("Recommendation: {}", report.recommendation);

    println!("\nRisk distribution ({} entries):", report.summary.total_cases);
    for (level, count) in &report.summary.risk_distribution {
        println!("  {:<8} {}", level.label(), count);
    }
    println!("Highest risk score: {:.2}", report.summary.highest_risk_score);

    for (level, cases) in report.processed_cases.iter() {
        if cases.is_empty() {
            continue;
        }
        println!("\n{} cases:", level);
        for case in cases {
            let description = if case.charge_description.is_empty() {
                "(no description)"
            } else {
                case.charge_description.as_str()
            };
            println!("  - [{}] {}", case.case_number, description);
            println!(
                "    date {} | type {} | disposition {} | {} / {}",
                case.offense_date, case.charge_type, case.disposition, case.category, case.subcategory
            );
            if level == RiskLevel::Ignored || level == RiskLevel::Clean {
                println!("    {}", case.reason);
            } else {
                println!("    score {:.2}", case.risk_score);
            }
        }
    }

    if !report.summary.recommendations.is_empty() {
        println!("\nNotes:");
        for note in &report.summary.recommendations {
            println!("  - {note}");
        }
    }
    println!(
        "\nCompleted in {:.3} seconds",
        report.execution_time_seconds
    );
}
