pub mod config;
pub mod dashboard;
pub mod exams;
pub mod quiz;

use anyhow::Result;
use colored::Colorize;
use inquire::{InquireError, Select};

use crate::library::Library;

pub const BACK: &str = "←   Back";

/// Esc and Ctrl-C leave the current screen instead of failing
pub fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Turn a cancelled prompt into `None`
pub fn optional<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if is_cancel(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Let the user pick an exam, or use the one given on the command line
pub fn choose_exam(library: &Library, given: Option<String>, prompt: &str) -> Result<Option<String>> {
    if let Some(name) = given {
        return Ok(Some(name));
    }

    let exams = library.list_exams();
    if exams.is_empty() {
        println!(
            "{} No exams found in {}. Create a folder (e.g. dp900) with chapters inside, or run {}.",
            "✗".red(),
            library.root.display().to_string().cyan(),
            "simulado new <name>".cyan()
        );
        return Ok(None);
    }

    let mut options = exams;
    options.push(BACK.to_string());

    match optional(Select::new(prompt, options).with_page_size(15).prompt())? {
        Some(s) if s != BACK => Ok(Some(s)),
        _ => Ok(None),
    }
}
