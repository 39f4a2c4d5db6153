use std::path::Path;

use chrono::NaiveDate;
use plotters::prelude::*;

use crate::models::{CountryTeamSize, DailySummary, IndustryUsers};

/// Explicit drawing configuration passed into every render call, instead of
/// a process-wide ambient style.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub title_font: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            width: 800,
            height: 500,
            title_font: 28,
        }
    }
}

/// Format an axis value with thousands separators; small fractional values
/// keep one decimal so the messages-in-millions axis stays readable.
pub fn axis_label(value: f64) -> String {
    if value.abs() >= 1000.0 {
        group_thousands(value.round() as i64)
    } else if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn draw_bar_chart(
    path: &Path,
    style: &ChartStyle,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    if labels.is_empty() {
        root.present()?;
        return Ok(());
    }

    let y_max = values.iter().copied().fold(0.0f64, f64::max).max(1.0) * 1.05;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", style.title_font as i32))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0..labels.len() as i32, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| labels.get(*x as usize).cloned().unwrap_or_default())
        .y_desc(y_desc)
        .y_label_formatter(&|v| axis_label(*v))
        .draw()?;

    for (i, value) in values.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(i as i32, 0.0), (i as i32 + 1, *value)],
            BLUE.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn draw_line_chart(
    path: &Path,
    style: &ChartStyle,
    title: &str,
    y_desc: &str,
    dates: &[NaiveDate],
    values: &[f64],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    if dates.is_empty() {
        root.present()?;
        return Ok(());
    }

    let x_max = (dates.len() as i32 - 1).max(1);
    let y_max = values.iter().copied().fold(0.0f64, f64::max).max(1.0) * 1.05;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", style.title_font as i32))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(dates.len().min(8))
        .x_label_formatter(&|x| {
            dates
                .get(*x as usize)
                .map(|d| d.format("%m-%d").to_string())
                .unwrap_or_default()
        })
        .y_desc(y_desc)
        .y_label_formatter(&|v| axis_label(*v))
        .draw()?;

    chart.draw_series(LineSeries::new(
        values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

pub fn chart_top_industries(
    rows: &[IndustryUsers],
    style: &ChartStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let labels: Vec<String> = rows.iter().map(|r| r.industry.clone()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.avg_daily_users).collect();
    draw_bar_chart(
        path,
        style,
        "Daily Active Users by Industry (Last 7 Days Avg.)",
        "Avg. Daily Active Users",
        &labels,
        &values,
    )
}

pub fn chart_top_country_team_size(
    rows: &[CountryTeamSize],
    style: &ChartStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let labels: Vec<String> = rows.iter().map(|r| r.country.clone()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.avg_team_sz).collect();
    draw_bar_chart(
        path,
        style,
        "Avg. Team Size - Top Countries by Teams (Last Month)",
        "Avg. Team Size (Month)",
        &labels,
        &values,
    )
}

pub fn chart_daily_team_count(
    rows: &[DailySummary],
    style: &ChartStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.ds).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.countd_teams as f64).collect();
    draw_line_chart(path, style, "Count of Distinct Teams", "Distinct Teams", &dates, &values)
}

pub fn chart_daily_active_users(
    rows: &[DailySummary],
    style: &ChartStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.ds).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.total_active_users as f64).collect();
    draw_line_chart(path, style, "Daily Active Users", "Active Users", &dates, &values)
}

pub fn chart_msgs_sent(
    rows: &[DailySummary],
    style: &ChartStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.ds).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.total_msgs_mm).collect();
    draw_line_chart(
        path,
        style,
        "Messages Sent Last 7 Days (mm)",
        "Messages (mm)",
        &dates,
        &values,
    )
}

pub fn chart_avg_team_size(
    rows: &[DailySummary],
    style: &ChartStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.ds).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.avg_team_users).collect();
    draw_line_chart(
        path,
        style,
        "Avg. Team Size - Active Users",
        "Avg. Active Users",
        &dates,
        &values,
    )
}
