//! Progress statistics over the rows of `results.csv`.

use chrono::{NaiveDate, Timelike};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::storage::ResultRecord;

pub const NO_CHAPTER: &str = "N/A";

static CHAPTER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:chapter|capítulo)\s+(\d+)").expect("valid regex"));
static NUMBERED_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.").expect("valid regex"));

/// Chapter number named in a result's source label: the whole-chapter label
/// first, then a numbered file name like `3. Storage.md`
pub fn chapter_of(source: &str) -> String {
    CHAPTER_LABEL
        .captures(source)
        .or_else(|| NUMBERED_FILE.captures(source))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NO_CHAPTER.to_string())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub wrong: u32,
}

impl Tally {
    fn add(&mut self, record: &ResultRecord) {
        self.correct += record.correct;
        self.wrong += record.wrong;
    }
}

#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Everything the progress dashboard shows
#[derive(Debug, Default)]
pub struct Dashboard {
    pub quizzes: usize,
    pub overall_percent: f64,
    pub today_percent: f64,
    pub by_source: Vec<(String, Tally)>,
    pub by_chapter: Vec<(String, Tally)>,
    pub daily_percent: Vec<(NaiveDate, f64)>,
    pub hourly_percent: Vec<(u32, f64)>,
}

fn ratio(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

fn chapter_key(label: &str) -> (u64, String) {
    (label.parse().unwrap_or(u64::MAX), label.to_string())
}

impl Dashboard {
    pub fn from_records(records: &[ResultRecord], today: NaiveDate) -> Self {
        let total_correct: u32 = records.iter().map(|r| r.correct).sum();
        let total_questions: u32 = records.iter().map(|r| r.total).sum();

        let todays = records.iter().filter(|r| r.date == today);
        let (today_correct, today_total) = todays
            .fold((0, 0), |(c, t), r| (c + r.correct, t + r.total));

        let mut by_source: BTreeMap<String, Tally> = BTreeMap::new();
        let mut by_chapter: BTreeMap<String, Tally> = BTreeMap::new();
        let mut daily: BTreeMap<NaiveDate, Mean> = BTreeMap::new();
        let mut hourly: BTreeMap<u32, Mean> = BTreeMap::new();

        for record in records {
            by_source.entry(record.source.clone()).or_default().add(record);
            by_chapter
                .entry(chapter_of(&record.source))
                .or_default()
                .add(record);

            // Rows without questions have no meaningful percentage
            if record.total > 0 {
                daily.entry(record.date).or_default().add(record.percent());
                hourly
                    .entry(record.time.hour())
                    .or_default()
                    .add(record.percent());
            }
        }

        let mut by_chapter: Vec<(String, Tally)> = by_chapter.into_iter().collect();
        by_chapter.sort_by_key(|(label, _)| chapter_key(label));

        Self {
            quizzes: records.len(),
            overall_percent: ratio(total_correct, total_questions),
            today_percent: ratio(today_correct, today_total),
            by_source: by_source.into_iter().collect(),
            by_chapter,
            daily_percent: daily.into_iter().map(|(d, m)| (d, m.value())).collect(),
            hourly_percent: hourly.into_iter().map(|(h, m)| (h, m.value())).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn record(source: &str, date: &str, time: &str, correct: u32, total: u32) -> ResultRecord {
        ResultRecord {
            source: source.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap(),
            correct,
            wrong: total - correct,
            total,
        }
    }

    #[test]
    fn test_chapter_of() {
        assert_eq!(chapter_of("dp900 • Chapter 3 (Complete)"), "3");
        assert_eq!(chapter_of("dp900 • Capítulo 12 - Dados (Completo)"), "12");
        assert_eq!(chapter_of("4. Analytics.md"), "4");
        assert_eq!(chapter_of("intro.md"), NO_CHAPTER);
    }

    #[test]
    fn test_dashboard_aggregates() {
        let records = vec![
            record("dp900 • Chapter 1 (Complete)", "2024-05-01", "09:10:00", 8, 10),
            record("2. Storage.md", "2024-05-01", "21:00:00", 2, 10),
            record("2. Storage.md", "2024-05-02", "09:45:00", 5, 5),
            record("notes.md", "2024-05-02", "10:00:00", 0, 0),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let dash = Dashboard::from_records(&records, today);

        assert_eq!(dash.quizzes, 4);
        assert!((dash.overall_percent - 60.0).abs() < 1e-9);
        assert!((dash.today_percent - 100.0).abs() < 1e-9);

        assert_eq!(dash.by_source[0].0, "2. Storage.md");
        assert_eq!(dash.by_source[0].1, Tally { correct: 7, wrong: 8 });

        let chapters: Vec<&str> = dash.by_chapter.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(chapters, vec!["1", "2", NO_CHAPTER]);

        assert_eq!(dash.daily_percent.len(), 2);
        assert!((dash.daily_percent[0].1 - 50.0).abs() < 1e-9);
        assert!((dash.daily_percent[1].1 - 100.0).abs() < 1e-9);

        assert_eq!(dash.hourly_percent.len(), 2);
        assert_eq!(dash.hourly_percent[0].0, 9);
        assert!((dash.hourly_percent[0].1 - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_dashboard() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let dash = Dashboard::from_records(&[], today);
        assert!(dash.is_empty());
        assert_eq!(dash.today_percent, 0.0);
    }
}
