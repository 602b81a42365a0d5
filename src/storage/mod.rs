pub mod reports;
pub mod results;

pub use results::{ResultRecord, ResultsLog};

use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::PathBuf;

use crate::library::Library;
use crate::quiz::QuizSession;

/// Persist a finished quiz: the global log, an individual report and a row
/// in `results.csv`. Returns the report path.
pub fn record_session(
    library: &Library,
    exam: &str,
    session: &QuizSession,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    let root = library.ensure_structure(exam)?;
    let logs_dir = root.join(crate::library::LOGS_DIR);

    reports::append_global(&logs_dir, session, at)?;
    let report = reports::write_report(&logs_dir, session, at)?;

    let log = ResultsLog::new(root.join(crate::library::RESULTS_FILE));
    log.append(&ResultRecord::new(&session.source, at, session.score()))?;

    tracing::info!("Saved results of '{}' for {}", session.source, exam);
    Ok(report)
}

/// All recorded results of an exam
pub fn load_results(library: &Library, exam: &str) -> Result<Vec<ResultRecord>> {
    ResultsLog::new(library.results_path(exam)).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Question;

    #[test]
    fn test_record_session_writes_all_logs() {
        let root = std::env::temp_dir().join(format!("simulado_storage_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("conteudo/ai900/1 - Basics")).unwrap();
        let library = Library::new(&root);

        let question = Question {
            question: "What is AI?".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer: vec!['C'],
            explanation_cue: String::new(),
        };
        let mut session = QuizSession::new("ai900 • Chapter 1 - Basics (Complete)", "", vec![question]);
        session.submit(&[2]);

        let at = NaiveDateTime::parse_from_str("2024-06-01 10:20:30", "%Y-%m-%d %H:%M:%S").unwrap();
        let report = record_session(&library, "ai900", &session, at).unwrap();

        // Legacy exams keep their logs next to the chapters
        let exam_root = root.join("conteudo/ai900");
        assert_eq!(report, exam_root.join("logs/test_20240601_102030.txt"));
        assert!(exam_root.join("logs/log_global.txt").exists());

        let results = load_results(&library, "ai900").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].correct, 1);
        assert_eq!(results[0].total, 1);

        let _ = std::fs::remove_dir_all(&root);
    }
}
