use anyhow::Result;
use colored::Colorize;
use inquire::{Select, Text};

use super::{BACK, optional};
use crate::library::{Library, looks_like_exam};
use crate::storage;

/// Interactive exam management
pub async fn run(library: &Library) -> Result<()> {
    println!("{}", "Exam Management".bold().cyan());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{} {}",
        "Library:".dimmed(),
        library.root.display().to_string().cyan()
    );

    let options = vec!["📋  List exams", "🆕  Create exam", BACK];

    loop {
        let Some(selection) = optional(Select::new("What would you like to do?", options.clone()).prompt())?
        else {
            break;
        };

        match selection {
            "📋  List exams" => list(library).await?,
            "🆕  Create exam" => create(library, None).await?,
            _ => break,
        }

        println!();
    }

    Ok(())
}

/// List exams with their chapters and how many quizzes were taken
pub async fn list(library: &Library) -> Result<()> {
    let exams = library.list_exams();

    if exams.is_empty() {
        println!("{}", "No exams found.".dimmed());
        println!("Create one with {}", "simulado new <name>".cyan());
        return Ok(());
    }

    println!("\n{} ({})\n", "Exams".bold(), library.root.display());

    for exam in &exams {
        let chapters = library.chapters(exam);
        let files: usize = chapters
            .iter()
            .map(|c| library.markdown_files(exam, c).len())
            .sum();
        let quizzes = storage::load_results(library, exam)
            .map(|r| r.len())
            .unwrap_or(0);

        let legacy = !library.root.join(exam).is_dir();
        let marker = if looks_like_exam(&library.exam_root(exam)) || legacy {
            "•".green()
        } else {
            "○".dimmed()
        };

        println!(
            "  {} {}{}  {} chapters, {} files, {} quizzes",
            marker,
            exam.bold(),
            if legacy { " (legacy layout)".dimmed().to_string() } else { String::new() },
            chapters.len(),
            files,
            quizzes
        );
        for chapter in &chapters {
            println!("      {}", format!("Chapter {}", chapter).dimmed());
        }
    }

    Ok(())
}

/// Create a new exam folder with its logs and results file
pub async fn create(library: &Library, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None => match optional(
            Text::new("Exam name:")
                .with_help_message("e.g., dp900, az104, linear-algebra")
                .prompt(),
        )? {
            Some(n) => n,
            None => return Ok(()),
        },
    };

    if name.trim().is_empty() {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    match library.create_exam(&name) {
        Ok(path) => {
            println!("{} Created exam '{}'", "✓".green(), name.trim());
            println!(
                "  Add chapter folders such as {} with .md notes inside.",
                path.join("1 - Introduction").display().to_string().cyan()
            );
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
        }
    }

    Ok(())
}
