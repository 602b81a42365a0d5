use anyhow::Result;
use colored::{Color, Colorize};
use inquire::{CustomType, Password, Select, Text};
use std::path::PathBuf;

use super::{BACK, optional};
use crate::config::{API_KEY_ENV, Config, DEFAULT_BASE_URL};
use crate::llm::ChatClient;
use crate::quiz::{MAX_QUESTIONS, MIN_QUESTIONS};
use crate::render;

pub async fn run() -> Result<()> {
    render::print_box(
        "⚙️  SETTINGS ⚙️",
        "Configure SimuladoMD to your liking",
        Color::BrightBlack,
    );

    let mut config = Config::load_or_default();

    let options = vec![
        "🔑  Set API Key        │ Configure chat API access",
        "🤖  Select Model       │ Choose default LLM",
        "🌐  API Base URL       │ Any OpenAI-compatible endpoint",
        "📂  Library Folder     │ Where your exams live",
        "🔢  Question Count     │ Default questions per quiz",
        "🎨  Toggle Theme       │ Light or dark colours",
        "📋  View Settings      │ See current configuration",
        BACK,
    ];

    loop {
        let Some(selection) =
            optional(Select::new("What would you like to configure?", options.clone()).prompt())?
        else {
            break;
        };

        let result = match selection {
            s if s.contains("Set API Key") => set_api_key(&mut config),
            s if s.contains("Select Model") => select_model(&mut config),
            s if s.contains("Base URL") => set_base_url(&mut config),
            s if s.contains("Library Folder") => set_library(&mut config),
            s if s.contains("Question Count") => set_question_count(&mut config),
            s if s.contains("Toggle Theme") => toggle_theme(&mut config),
            s if s.contains("View Settings") => {
                view_config(&config);
                Ok(())
            }
            _ => break,
        };

        if let Err(e) = result {
            eprintln!("{} {}", "Error:".red(), e);
        }

        println!();
    }

    Ok(())
}

fn set_api_key(config: &mut Config) -> Result<()> {
    println!(
        "\n{} Get your API key from {}",
        "Tip:".yellow(),
        "https://platform.deepseek.com/api_keys".cyan()
    );

    let Some(key) = optional(
        Password::new("Enter your API key:")
            .without_confirmation()
            .prompt(),
    )?
    else {
        return Ok(());
    };

    if key.is_empty() {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    config.api_key = Some(key);
    config.save()?;

    println!("{} API key saved!", "✓".green());

    Ok(())
}

fn select_model(config: &mut Config) -> Result<()> {
    let model_options: Vec<String> = ChatClient::MODELS
        .iter()
        .map(|(id, desc)| format!("{} - {}", id, desc))
        .collect();

    let Some(selection) = optional(Select::new("Select default model:", model_options).prompt())?
    else {
        return Ok(());
    };

    let model_id = selection
        .split(" - ")
        .next()
        .unwrap_or(selection.as_str())
        .to_string();

    config.default_model = Some(model_id.clone());
    config.save()?;

    println!("{} Default model set to {}", "✓".green(), model_id.yellow());

    Ok(())
}

fn set_base_url(config: &mut Config) -> Result<()> {
    let current = config.base_url();
    let Some(url) = optional(
        Text::new("API base URL:")
            .with_default(&current)
            .with_help_message("Leave as is for DeepSeek")
            .prompt(),
    )?
    else {
        return Ok(());
    };

    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("The base URL must start with http:// or https://");
    }

    config.base_url = (url != DEFAULT_BASE_URL).then(|| url.to_string());
    config.save()?;
    println!("{} Base URL set to {}", "✓".green(), url.cyan());
    Ok(())
}

fn set_library(config: &mut Config) -> Result<()> {
    let current = config.library_root(None)?;
    let Some(dir) = optional(
        Text::new("Library folder:")
            .with_default(&current.display().to_string())
            .with_help_message("The folder that contains your exam folders")
            .prompt(),
    )?
    else {
        return Ok(());
    };

    let path = PathBuf::from(dir.trim());
    if !path.is_dir() {
        anyhow::bail!("Not a directory: {}", path.display());
    }

    let path = path.canonicalize().unwrap_or(path);
    println!("{} Library set to {}", "✓".green(), path.display().to_string().cyan());
    config.library_dir = Some(path);
    config.save()?;
    Ok(())
}

fn set_question_count(config: &mut Config) -> Result<()> {
    let Some(n) = optional(
        CustomType::<u32>::new("Default number of questions (1-50):")
            .with_default(config.question_count())
            .with_error_message("Please type a number")
            .prompt(),
    )?
    else {
        return Ok(());
    };

    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&n) {
        anyhow::bail!("Choose between {} and {} questions", MIN_QUESTIONS, MAX_QUESTIONS);
    }

    config.default_questions = Some(n);
    config.save()?;
    println!("{} Quizzes will have {} questions by default", "✓".green(), n);
    Ok(())
}

fn toggle_theme(config: &mut Config) -> Result<()> {
    config.theme = config.theme.toggled();
    config.save()?;
    let palette = config.theme.palette();
    println!(
        "{} Theme set to {}: {} {}",
        "✓".green(),
        config.theme.label().bold(),
        palette.correct("correct"),
        palette.wrong("wrong")
    );
    Ok(())
}

fn view_config(config: &Config) {
    println!("\n{}", "Current Configuration:".bold());
    println!("{}", "─".repeat(30).dimmed());

    let api_status = if config.api_key.as_ref().is_some_and(|k| !k.is_empty()) {
        "configured".green().to_string()
    } else if config.has_api_key() {
        format!("set via {} env", API_KEY_ENV).yellow().to_string()
    } else {
        "not set".red().to_string()
    };

    println!("  API Key: {}", api_status);
    println!("  Base URL: {}", config.base_url());
    println!(
        "  Default Model: {}",
        config
            .default_model
            .as_deref()
            .unwrap_or("deepseek-chat (default)")
    );
    println!("  Questions per quiz: {}", config.question_count());
    println!("  Theme: {}", config.theme.label());

    match config.library_root(None) {
        Ok(path) => println!("  Library: {}", path.display().to_string().dimmed()),
        Err(e) => println!("  Library: {}", e.to_string().red()),
    }

    if let Ok(path) = Config::config_path() {
        println!("  Config file: {}", path.display().to_string().dimmed());
    }
}
