use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod chart;
mod load;
mod models;
mod quality;
mod report;
mod summary;

#[derive(Parser)]
#[command(name = "activity-insights")]
#[command(about = "Team activity analysis: industry ranking, country team sizes, daily trend", long_about = None)]
struct Cli {
    /// Headerless daily activity log
    #[arg(long, default_value = "team_activity.csv")]
    activity: PathBuf,
    /// Industry reference map
    #[arg(long, default_value = "industry_map.csv")]
    industry: PathBuf,
    /// How many countries to keep in the team-size ranking
    #[arg(long, default_value_t = 5)]
    top_countries: usize,
    /// Directory the six chart PNGs are written to
    #[arg(long, default_value = "charts")]
    charts_dir: PathBuf,
    /// Compute summaries and the report without rendering charts
    #[arg(long)]
    skip_charts: bool,
    /// Also write the markdown report to this path
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let joined = load::load_dataset(&cli.activity, &cli.industry)?;

    // clean up teams with no active users for the entire period
    let inactive_teams = quality::check_no_active_users(&joined);
    if !inactive_teams.is_empty() {
        tracing::info!(count = inactive_teams.len(), "dropping teams with no active users");
    }
    let joined = quality::drop_teams(joined, &inactive_teams);

    // clean up teams not present in the cohort for the entire period
    let partial_teams = quality::check_consistent_cohort(&joined);
    if !partial_teams.is_empty() {
        tracing::info!(count = partial_teams.len(), "dropping teams with partial presence");
    }
    let joined = quality::drop_teams(joined, &partial_teams);

    // diagnostic only, never filtered on
    let missing_dates = quality::check_missing_dates(&joined);
    for date in &missing_dates {
        tracing::warn!(%date, "missing date in observed range");
    }

    let industries = summary::active_users_by_industry(&joined);
    let countries = summary::avg_team_size_top_countries(&joined, cli.top_countries);
    let daily = summary::daily_summary_figures(&joined);

    let findings = report::QualityFindings {
        inactive_teams,
        partial_teams,
        missing_dates,
    };
    let report = report::build_report(&findings, &industries, &countries, &daily);
    print!("{report}");
    if let Some(out) = &cli.out {
        std::fs::write(out, &report)
            .with_context(|| format!("failed to write report to {}", out.display()))?;
        tracing::info!(path = %out.display(), "report written");
    }

    if cli.skip_charts {
        return Ok(());
    }

    std::fs::create_dir_all(&cli.charts_dir).with_context(|| {
        format!("failed to create charts directory {}", cli.charts_dir.display())
    })?;
    let style = chart::ChartStyle::default();

    chart::chart_top_industries(&industries, &style, &cli.charts_dir.join("top_industries.png"))?;
    chart::chart_top_country_team_size(
        &countries,
        &style,
        &cli.charts_dir.join("top_country_team_size.png"),
    )?;
    chart::chart_daily_team_count(&daily, &style, &cli.charts_dir.join("daily_team_count.png"))?;
    chart::chart_daily_active_users(
        &daily,
        &style,
        &cli.charts_dir.join("daily_active_users.png"),
    )?;
    chart::chart_msgs_sent(&daily, &style, &cli.charts_dir.join("msgs_sent.png"))?;
    chart::chart_avg_team_size(&daily, &style, &cli.charts_dir.join("avg_team_size.png"))?;
    tracing::info!(dir = %cli.charts_dir.display(), "charts rendered");

    Ok(())
}
