use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::quiz::QuizSession;

pub const GLOBAL_LOG: &str = "log_global.txt";

fn list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

/// Block appended to the exam-wide log after every quiz
pub fn global_entry(session: &QuizSession, at: NaiveDateTime) -> String {
    let score = session.score();
    format!(
        "--- TEST TAKEN ON {} ---\nFile: {}\nResult: {} correct, {} wrong of {} questions.\n\n",
        at.format("%Y-%m-%d %H:%M:%S"),
        session.source,
        score.correct,
        score.wrong,
        score.total
    )
}

/// Per-question report of a single quiz
pub fn report(session: &QuizSession, at: NaiveDateTime) -> String {
    let mut out = format!(
        "Test report - {}\nBase file: {}\n",
        at.format("%Y-%m-%d %H:%M:%S"),
        session.source
    );
    for (i, answer) in session.answers().iter().enumerate() {
        let _ = writeln!(
            out,
            "Q{}: {}\n A: {} | K: {} | {}",
            i + 1,
            answer.question,
            list(&answer.selected),
            list(&answer.correct),
            if answer.is_correct { "OK" } else { "X" }
        );
    }
    out
}

pub fn report_file_name(at: NaiveDateTime) -> String {
    format!("test_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

pub fn append_global(logs_dir: &Path, session: &QuizSession, at: NaiveDateTime) -> Result<()> {
    let path = logs_dir.join(GLOBAL_LOG);
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log: {:?}", path))?;
    file.write_all(global_entry(session, at).as_bytes())
        .with_context(|| format!("Failed to write log: {:?}", path))?;
    Ok(())
}

pub fn write_report(logs_dir: &Path, session: &QuizSession, at: NaiveDateTime) -> Result<PathBuf> {
    let path = logs_dir.join(report_file_name(at));
    std::fs::write(&path, report(session, at))
        .with_context(|| format!("Failed to write report: {:?}", path))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Question;

    fn session() -> QuizSession {
        let q = |text: &str, answer: char| Question {
            question: text.to_string(),
            options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            answer: vec![answer],
            explanation_cue: String::new(),
        };
        let mut session = QuizSession::new("1. Intro.md", "", vec![q("First?", 'A'), q("Second?", 'B')]);
        session.submit(&[0]);
        session.advance();
        session.submit(&[2, 3]);
        session
    }

    fn at() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-05-02 07:08:09", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_global_entry() {
        assert_eq!(
            global_entry(&session(), at()),
            "--- TEST TAKEN ON 2024-05-02 07:08:09 ---\nFile: 1. Intro.md\nResult: 1 correct, 1 wrong of 2 questions.\n\n"
        );
    }

    #[test]
    fn test_report_lines() {
        let text = report(&session(), at());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Test report - 2024-05-02 07:08:09");
        assert_eq!(lines[1], "Base file: 1. Intro.md");
        assert_eq!(lines[2], "Q1: First?");
        assert_eq!(lines[3], " A: [w] | K: [w] | OK");
        assert_eq!(lines[5], " A: [y, z] | K: [x] | X");
        assert_eq!(report_file_name(at()), "test_20240502_070809.txt");
    }
}
