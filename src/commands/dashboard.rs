use anyhow::Result;
use colored::{Color, Colorize};

use super::choose_exam;
use crate::config::Config;
use crate::library::Library;
use crate::render::{self, Palette, bar};
use crate::stats::{Dashboard, Tally};
use crate::storage;

const BAR_WIDTH: usize = 30;

pub async fn run(library: &Library, exam: Option<String>) -> Result<()> {
    let Some(exam) = choose_exam(library, exam, "Show progress for:")? else {
        return Ok(());
    };

    let records = storage::load_results(library, &exam)?;
    let today = chrono::Local::now().date_naive();
    let dashboard = Dashboard::from_records(&records, today);

    render::print_box(&format!("📊 MY PROGRESS: {}", exam), "", Color::Blue);

    if dashboard.is_empty() {
        println!(
            "  {}",
            "No results found for this exam yet. Take a quiz to see your progress!".dimmed()
        );
        return Ok(());
    }

    let palette = Config::load().map(|c| c.theme.palette()).unwrap_or_else(|e| {
        tracing::warn!("Using default theme: {:#}", e);
        crate::render::Theme::default().palette()
    });

    print_summary(&dashboard);
    print_tallies("Performance by file/topic", &dashboard.by_source, palette);
    print_tallies("Performance by chapter", &dashboard.by_chapter, palette);
    print_percentages(
        "Daily progress (% correct)",
        dashboard
            .daily_percent
            .iter()
            .map(|(d, p)| (d.format("%Y-%m-%d").to_string(), *p)),
        palette,
    );
    print_percentages(
        "Average score by hour of day",
        dashboard
            .hourly_percent
            .iter()
            .map(|(h, p)| (format!("{:02}h", h), *p)),
        palette,
    );

    Ok(())
}

fn print_summary(dashboard: &Dashboard) {
    println!(
        "  {} {}",
        "Quizzes taken:".dimmed(),
        dashboard.quizzes.to_string().cyan()
    );
    println!(
        "  {} {}",
        "Overall score:".dimmed(),
        format!("{:.1}%", dashboard.overall_percent).bold()
    );
    println!(
        "  {} {}",
        "Score today:  ".dimmed(),
        format!("{:.1}%", dashboard.today_percent).bold()
    );
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0).min(40)
}

fn fit(label: &str, width: usize) -> String {
    let count = label.chars().count();
    if count <= width {
        format!("{}{}", label, " ".repeat(width - count))
    } else {
        let cut: String = label.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Stacked correct/wrong bars, one row per label
fn print_tallies(title: &str, rows: &[(String, Tally)], palette: Palette) {
    println!("\n  {}", title.bold().underline());
    println!(
        "  {} {}",
        palette.correct("█ correct"),
        palette.wrong("█ wrong")
    );

    let width = label_width(rows.iter().map(|(l, _)| l.as_str()));
    let max = rows
        .iter()
        .map(|(_, t)| t.correct + t.wrong)
        .max()
        .unwrap_or(0) as f64;

    for (label, tally) in rows {
        println!(
            "  {} {}{} {}/{}",
            fit(label, width),
            palette.correct(&bar(tally.correct as f64, max, BAR_WIDTH)),
            palette.wrong(&bar(tally.wrong as f64, max, BAR_WIDTH)),
            tally.correct,
            tally.correct + tally.wrong
        );
    }
}

/// Bars on a 0-100 scale
fn print_percentages(title: &str, rows: impl Iterator<Item = (String, f64)>, palette: Palette) {
    println!("\n  {}", title.bold().underline());
    let rows: Vec<(String, f64)> = rows.collect();
    let width = label_width(rows.iter().map(|(l, _)| l.as_str()));

    for (label, percent) in &rows {
        println!(
            "  {} {} {:.1}%",
            fit(label, width),
            palette.accent(&format!("{:<w$}", bar(*percent, 100.0, BAR_WIDTH), w = BAR_WIDTH)),
            percent
        );
    }
}
