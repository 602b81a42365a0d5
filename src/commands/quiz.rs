use anyhow::Result;
use colored::{Color, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{CustomType, MultiSelect, Select};

use super::{BACK, choose_exam, optional};
use crate::config::Config;
use crate::library::Library;
use crate::llm::ChatClient;
use crate::quiz::{self, LETTERS, MAX_QUESTIONS, MIN_QUESTIONS, QuizSession};
use crate::render::{self, Palette};
use crate::storage;

const WHOLE_CHAPTER: &str = "▶  Whole chapter";

/// What the questions are generated from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Chapter,
    File(String),
}

/// Options given on the command line; anything missing is asked for
#[derive(Debug, Default)]
pub struct QuizArgs {
    pub exam: Option<String>,
    pub chapter: Option<String>,
    pub file: Option<String>,
    pub count: Option<u32>,
}

/// Label stored in the results for a quiz
pub fn source_label(exam: &str, chapter: &str, scope: &Scope) -> String {
    match scope {
        Scope::Chapter => format!("{} • Chapter {} (Complete)", exam, chapter),
        Scope::File(name) => name.clone(),
    }
}

pub async fn run(library: &Library, args: QuizArgs) -> Result<()> {
    let config = Config::load_or_default();
    let api_key = match config.get_api_key() {
        Some(key) => key,
        None => {
            println!(
                "{} No API key configured. Set {} in .env or run {}.",
                "Error:".red().bold(),
                crate::config::API_KEY_ENV.cyan(),
                "simulado config".cyan()
            );
            return Ok(());
        }
    };
    let client = ChatClient::new(
        api_key,
        Some(config.base_url()),
        config.default_model.clone(),
    );
    let palette = config.theme.palette();

    let Some(exam) = choose_exam(library, args.exam, "Choose the exam:")? else {
        return Ok(());
    };
    library.ensure_structure(&exam)?;

    // Fully specified on the command line: a single attempt, no menus
    if let Some(chapter) = args.chapter.clone()
        && (args.file.is_some() || args.count.is_some())
    {
        let scope = args.file.clone().map_or(Scope::Chapter, Scope::File);
        let count = resolve_count(args.count, config.question_count());
        attempt(library, &client, palette, &exam, &chapter, &scope, count).await?;
        return Ok(());
    }

    let mut given_chapter = args.chapter;
    loop {
        let chapter = match given_chapter.take() {
            Some(c) => c,
            None => match choose_chapter(library, &exam)? {
                Some(c) => c,
                None => return Ok(()),
            },
        };

        // File selection; failed attempts come back here
        loop {
            let Some(scope) = choose_scope(library, &exam, &chapter)? else {
                break;
            };
            let count = match args.count {
                Some(n) => resolve_count(Some(n), config.question_count()),
                None => match ask_count(config.question_count())? {
                    Some(n) => n,
                    None => continue,
                },
            };

            if attempt(library, &client, palette, &exam, &chapter, &scope, count).await? {
                return Ok(());
            }
        }
    }
}

/// Count from the command line when given, else the configured default
pub fn resolve_count(given: Option<u32>, configured: u32) -> u32 {
    quiz::clamp_question_count(given.unwrap_or(configured))
}

fn choose_chapter(library: &Library, exam: &str) -> Result<Option<String>> {
    let chapters = library.chapters(exam);
    if chapters.is_empty() {
        println!(
            "{} No chapters found in {}. Chapters are folders whose name starts with a number.",
            "✗".red(),
            library.chapter_base(exam).display()
        );
        return Ok(None);
    }

    println!("\n{} {}", "Exam:".dimmed(), exam.bold().cyan());
    let mut options: Vec<String> = chapters.iter().map(|c| format!("Chapter {}", c)).collect();
    options.push(BACK.to_string());

    let selection = optional(
        Select::new("1. Choose a chapter:", options)
            .with_page_size(15)
            .prompt(),
    )?;

    Ok(selection
        .filter(|s| s != BACK)
        .and_then(|s| s.strip_prefix("Chapter ").map(str::to_string)))
}

fn choose_scope(library: &Library, exam: &str, chapter: &str) -> Result<Option<Scope>> {
    let files = library.markdown_files(exam, chapter);

    println!(
        "\n{} {} • Chapter {}",
        "Selected:".dimmed(),
        exam.bold(),
        chapter.bold()
    );
    if files.is_empty() {
        println!("{}", "No .md files found in this chapter.".red());
    }

    let mut options = vec![WHOLE_CHAPTER.to_string()];
    options.extend(files);
    options.push(BACK.to_string());

    let selection = optional(
        Select::new("2. Generate from the whole chapter or a specific file:", options)
            .with_page_size(15)
            .prompt(),
    )?;

    Ok(match selection.as_deref() {
        None | Some(BACK) => None,
        Some(WHOLE_CHAPTER) => Some(Scope::Chapter),
        Some(file) => Some(Scope::File(file.to_string())),
    })
}

fn ask_count(default: u32) -> Result<Option<u32>> {
    optional(
        CustomType::<u32>::new("How many questions? (1-50)")
            .with_default(default)
            .with_error_message("Please type a number")
            .with_validator(|n: &u32| {
                if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(n) {
                    Ok(inquire::validator::Validation::Valid)
                } else {
                    Ok(inquire::validator::Validation::Invalid(
                        "Choose between 1 and 50 questions".into(),
                    ))
                }
            })
            .prompt(),
    )
}

/// Spinner shown while the model writes the questions
fn create_spinner(message: &str, palette: Palette) -> ProgressBar {
    let color = match palette.accent {
        Color::Yellow => "yellow",
        _ => "blue",
    };
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template(&format!("{{spinner:.{}}} {{msg}} {{elapsed_precise:.dim}}", color))
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Load the content, generate and run one quiz. Returns false when nothing
/// could be run, so the caller can offer the file selection again.
async fn attempt(
    library: &Library,
    client: &ChatClient,
    palette: Palette,
    exam: &str,
    chapter: &str,
    scope: &Scope,
    count: u32,
) -> Result<bool> {
    let label = source_label(exam, chapter, scope);

    let content = match scope {
        Scope::Chapter => library.chapter_content(exam, chapter)?,
        Scope::File(file) => library.read_file(exam, chapter, file)?.unwrap_or_default(),
    };
    if content.trim().is_empty() {
        println!(
            "{} Could not find any content for '{}'.",
            "Error:".red().bold(),
            label
        );
        return Ok(false);
    }

    let spinner = create_spinner("Generating questions... please wait.", palette);
    let result = quiz::generate_questions(client, &content, count).await;
    spinner.finish_and_clear();

    let questions = match result {
        Ok(q) => q,
        Err(e) => {
            tracing::warn!("Question generation failed: {:#}", e);
            println!(
                "{} Could not generate the questions: {}",
                "Error:".red().bold(),
                e
            );
            return Ok(false);
        }
    };

    let mut session = QuizSession::new(label, content, questions);
    if !ask_questions(&mut session, palette)? {
        println!("{}", "Quiz abandoned, nothing was saved.".dimmed());
        return Ok(true);
    }

    show_results(library, exam, &session)?;
    Ok(true)
}

/// Walk the session; false if the user leaves before the end
fn ask_questions(session: &mut QuizSession, palette: Palette) -> Result<bool> {
    let total = session.len();

    while !session.is_finished() {
        let Some(q) = session.current().cloned() else {
            return Ok(true);
        };

        println!(
            "\n{} {}/{}",
            "Question".bold().cyan(),
            session.index() + 1,
            total
        );
        println!("  {}", q.question.bold());
        println!("  {}\n", q.instruction().italic().dimmed());

        let options: Vec<String> = q
            .options
            .iter()
            .zip(LETTERS)
            .map(|(text, letter)| format!("{}) {}", letter, text))
            .collect();

        let picked = optional(
            MultiSelect::new("Your answer:", options)
                .with_help_message("Space to mark, Enter to submit, Esc to leave the quiz")
                .raw_prompt(),
        )?;
        let Some(picked) = picked else {
            return Ok(false);
        };
        let selected: Vec<usize> = picked.iter().map(|o| o.index).collect();

        let Some(record) = session.submit(&selected).cloned() else {
            return Ok(true);
        };

        if record.is_correct {
            println!("  {} {}", "✓".bold(), palette.correct("Correct!").bold());
        } else {
            println!("  {} {}", "✗".bold(), palette.wrong("Incorrect").bold());
        }

        let correct = q.correct_indices();
        for (i, (text, letter)) in q.options.iter().zip(LETTERS).enumerate() {
            let line = format!("{}) {}", letter, text);
            if correct.contains(&i) {
                println!("    {} {}", "✓".bold(), palette.correct(&line));
            } else if selected.contains(&i) {
                println!("    {} {}", "✗".bold(), palette.wrong(&line));
            } else {
                println!("      {}", palette.muted(&line));
            }
        }

        println!("\n  {}", "Explanation:".bold());
        render::render_markdown(&session.explanation_for_current());
        println!("{}", "─".repeat(50).dimmed());

        let next = if session.is_last() {
            "🏁  See final results"
        } else {
            "→   Next question"
        };
        let choice = optional(Select::new("Continue?", vec![next, "🚪  Leave the quiz"]).prompt())?;
        match choice {
            Some(c) if c == next => {
                if !session.advance() {
                    return Ok(true);
                }
            }
            _ => return Ok(false),
        }
    }

    Ok(true)
}

fn show_results(library: &Library, exam: &str, session: &QuizSession) -> Result<()> {
    let score = session.score();

    render::print_box("🎯 FINAL RESULTS 🎯", &session.source, Color::Green);
    println!("  {} {}", "Correct:".bold(), score.correct.to_string().green().bold());
    println!("  {} {}", "Wrong:  ".bold(), score.wrong.to_string().red().bold());
    println!("  {} {}", "Total:  ".bold(), score.total);
    println!("  {} {:.0}%\n", "Score:  ".bold(), score.percent());

    let now = chrono::Local::now().naive_local();
    let report = storage::record_session(library, exam, session, now)?;
    println!(
        "{} Results saved. Report: {}",
        "✓".green(),
        report.display().to_string().dimmed()
    );

    Ok(())
}
