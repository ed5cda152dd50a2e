use anyhow::Result;
use chrono::{Datelike, Local};
use mastery_common::DailyProgress;
use mastery_db::KvBackend;
use mastery_tracker::progress::{
    average_completion_rate, best_day, category_chart, days_meeting_threshold, start_of_week,
    streak,
};
use mastery_tracker::{CellStatus, Tracker};

use super::day_or_today;

const NAME_WIDTH: usize = 28;

fn truncate(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        name.to_string()
    } else {
        let short: String = name.chars().take(NAME_WIDTH - 1).collect();
        format!("{}…", short)
    }
}

fn cell(status: &CellStatus) -> String {
    match status {
        CellStatus::NotRecorded => "·".to_string(),
        CellStatus::Completed => "✔".to_string(),
        CellStatus::Missed => "✘".to_string(),
        CellStatus::Logged(value) => value.clone(),
    }
}

/// One block per ten percent.
fn bar(percent: f64) -> String {
    "█".repeat((percent / 10.0).round().clamp(0.0, 10.0) as usize)
}

fn print_summary(series: &[DailyProgress], threshold: f64) {
    let best = best_day(series);

    println!("\n📈 Average completion: {:.1}%", average_completion_rate(series));
    println!("🏆 Best day: {} ({:.1}%)", best.day, best.rate);
    println!("🔥 Longest streak: {} days at {:.0}%+", streak(series, threshold), threshold * 100.0);
    println!(
        "🎯 Days at {:.0}%+: {}/{}",
        threshold * 100.0,
        days_meeting_threshold(series, threshold),
        series.len()
    );
}

pub async fn day<B: KvBackend>(tracker: &Tracker<B>, date: Option<&str>) -> Result<()> {
    let date = day_or_today(date)?;
    let progress = tracker.progress().daily_progress(date).await?;
    let categories = tracker.progress().category_completion(date).await?;

    println!("\n📊 Progress for {} ({})", date, date.format("%A"));
    println!("═══════════════════════════════════════════════\n");
    println!(
        "✅ Completed: {}/{} ({:.1}%)",
        progress.completed_tasks,
        progress.total_tasks,
        progress.percent()
    );
    if let Some(screen_time) = &progress.screen_time {
        println!("⏱️  Screen Time: {}", screen_time);
    }

    println!("\n📁 By category:");
    println!("─────────────────────────────────────────────");
    for point in category_chart(&categories) {
        println!("  {:<18} {:>5.1}% {}", point.name, point.value, bar(point.value));
    }

    let tasks = tracker.store().list_tasks().await?;
    let entries = tracker.store().list_entries_for_date(date).await?;

    println!("\n📋 Tasks:");
    println!("─────────────────────────────────────────────");
    for task in &tasks {
        let entry = entries.iter().find(|entry| entry.task_id == task.id);
        let mark = if entry.is_some_and(|e| e.is_logged(task.value_kind)) { "✅" } else { "⬜" };
        match entry.and_then(|e| e.value.as_deref()).filter(|v| !v.is_empty()) {
            Some(value) => println!("  {} {:<10} {} [{}]", mark, task.id, task.name, value),
            None => println!("  {} {:<10} {}", mark, task.id, task.name),
        }
    }

    Ok(())
}

pub async fn week<B: KvBackend>(tracker: &Tracker<B>, date: Option<&str>) -> Result<()> {
    let week_start = start_of_week(day_or_today(date)?);
    let grid = tracker.progress().weekly_grid(week_start).await?;
    let series = tracker.progress().weekly_progress(week_start).await?;

    println!("\n🗓️  Week of {}", week_start);
    println!("═══════════════════════════════════════════════\n");

    let header: String = grid.dates.iter().map(|d| format!("{:>7}", d.format("%a"))).collect();
    println!("{:<width$}{}", "", header, width = NAME_WIDTH);

    for row in &grid.rows {
        let cells: String = row.cells.iter().map(|c| format!("{:>7}", cell(c))).collect();
        println!("{:<width$}{}", truncate(&row.task.name), cells, width = NAME_WIDTH);
    }

    let rates: String = grid.day_rates.iter().map(|r| format!("{:>6.0}%", r)).collect();
    println!("{:<width$}{}", "Logged", rates, width = NAME_WIDTH);

    print_summary(&series, tracker.progress_config().streak_threshold);
    Ok(())
}

pub async fn month<B: KvBackend>(
    tracker: &Tracker<B>,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());

    let series = tracker.progress().monthly_progress(year, month).await?;

    println!("\n📅 Month {}-{:02}", year, month);
    println!("═══════════════════════════════════════════════\n");

    for day in &series {
        println!(
            "  {} {}  {:>2}/{:<2} {:>5.1}% {}",
            day.date,
            day.date.format("%a"),
            day.completed_tasks,
            day.total_tasks,
            day.percent(),
            bar(day.percent())
        );
    }

    print_summary(&series, tracker.progress_config().streak_threshold);
    Ok(())
}
