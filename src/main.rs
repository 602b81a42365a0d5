use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod library;
mod llm;
mod quiz;
mod render;
mod stats;
mod storage;

use commands::quiz::QuizArgs;
use library::Library;

/// ASCII art banner for the application
const BANNER: &str = r#"
  ____  _                 _           _       __  __ ____
 / ___|(_)_ __ ___  _   _| | __ _  __| | ___ |  \/  |  _ \
 \___ \| | '_ ` _ \| | | | |/ _` |/ _` |/ _ \| |\/| | | | |
  ___) | | | | | | | |_| | | (_| | (_| | (_) | |  | | |_| |
 |____/|_|_| |_| |_|\__,_|_|\__,_|\__,_|\___/|_|  |_|____/
"#;

/// Print the application banner
fn print_banner() {
    println!("{}", BANNER.cyan().bold());
}

/// Print a styled status line
fn print_status(label: &str, value: &str, icon: &str) {
    println!(
        "  {} {} {}",
        icon,
        format!("{}:", label).dimmed(),
        value.cyan()
    );
}

#[derive(Parser)]
#[command(name = "simulado")]
#[command(about = "Generate practice quizzes from your chapter notes and track your progress")]
#[command(version)]
struct Cli {
    /// Folder containing the exams (overrides config and SIMULADO_LIBRARY)
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and take a quiz
    Quiz {
        /// Exam folder name (skips the exam prompt)
        exam: Option<String>,
        /// Chapter folder name
        #[arg(short, long)]
        chapter: Option<String>,
        /// A single .md file of the chapter instead of the whole chapter
        #[arg(short, long, requires = "chapter")]
        file: Option<String>,
        /// Number of questions (1-50)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=50))]
        count: Option<u32>,
    },
    /// Show progress statistics for an exam
    Dashboard {
        /// Exam folder name
        exam: Option<String>,
    },
    /// List exams and their chapters
    Exams,
    /// Create a new exam folder
    New {
        /// Exam name
        name: Option<String>,
    },
    /// Configure settings (API key, model, library folder)
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("simulado=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env may carry the API key
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let library = Library::new(config::Config::load_or_default().library_root(cli.library)?);
    tracing::debug!("Library root: {:?}", library.root);

    match cli.command {
        Some(Commands::Quiz {
            exam,
            chapter,
            file,
            count,
        }) => {
            let args = QuizArgs {
                exam,
                chapter,
                file,
                count,
            };
            commands::quiz::run(&library, args).await?;
        }
        Some(Commands::Dashboard { exam }) => {
            commands::dashboard::run(&library, exam).await?;
        }
        Some(Commands::Exams) => {
            commands::exams::list(&library).await?;
        }
        Some(Commands::New { name }) => {
            commands::exams::create(&library, name).await?;
        }
        Some(Commands::Config) => {
            commands::config::run().await?;
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
        None => {
            // No subcommand - show interactive menu
            run_interactive(&library).await?;
        }
    }

    Ok(())
}

async fn run_interactive(library: &Library) -> Result<()> {
    use inquire::Select;

    print_banner();

    println!(
        "  {} {}",
        "Version:".dimmed(),
        env!("CARGO_PKG_VERSION").cyan()
    );
    println!(
        "  {} {}\n",
        "Powered by:".dimmed(),
        "DeepSeek chat API".green()
    );

    println!("{}", "─".repeat(50).dimmed());

    let exam_count = library.detected_exams().len();

    print_status("Library", &library.root.display().to_string(), "📚");
    print_status("Exams", &exam_count.to_string(), "📝");

    let has_api_key = config::Config::load()
        .map(|c| c.has_api_key())
        .unwrap_or(false);

    let api_status = if has_api_key {
        "Configured".green().to_string()
    } else {
        "Not set (run 'config')".red().to_string()
    };
    print_status("API Key", &api_status, "🔑");

    println!("{}\n", "─".repeat(50).dimmed());

    let options = vec![
        "🚀  Start a new quiz",
        "📊  View my progress",
        "🗂️   Manage exams",
        "⚙️   Configure settings",
        "🚪  Exit",
    ];

    loop {
        let selection = commands::optional(
            Select::new("What would you like to do?", options.clone())
                .with_help_message("Use arrow keys to navigate, Enter to select")
                .prompt(),
        )?;

        println!();

        let result = match selection {
            Some(s) if s.contains("Start a new quiz") => {
                commands::quiz::run(library, QuizArgs::default()).await
            }
            Some(s) if s.contains("View my progress") => {
                commands::dashboard::run(library, None).await
            }
            Some(s) if s.contains("Manage exams") => commands::exams::run(library).await,
            Some(s) if s.contains("Configure") => commands::config::run().await,
            _ => {
                println!("{}", "👋 Good luck on your exams!".cyan());
                break;
            }
        };

        // Errors of one screen send the user back to the menu
        if let Err(e) = result {
            tracing::debug!("Screen failed: {:?}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }

        println!();
    }

    Ok(())
}
