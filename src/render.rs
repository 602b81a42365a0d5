use colored::{Color, ColoredString, Colorize};
use serde::{Deserialize, Serialize};

/// Render markdown text to the terminal using termimad
pub fn render_markdown(text: &str) {
    let skin = termimad::MadSkin::default();
    skin.print_text(text);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                accent: Color::Blue,
                correct: Color::Green,
                wrong: Color::Red,
                muted: Color::BrightBlack,
            },
            Theme::Dark => Palette {
                accent: Color::Yellow,
                correct: Color::BrightGreen,
                wrong: Color::BrightRed,
                muted: Color::White,
            },
        }
    }
}

/// Colours used for quiz feedback and charts
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: Color,
    pub correct: Color,
    pub wrong: Color,
    pub muted: Color,
}

impl Palette {
    pub fn accent(&self, text: &str) -> ColoredString {
        text.color(self.accent)
    }

    pub fn correct(&self, text: &str) -> ColoredString {
        text.color(self.correct)
    }

    pub fn wrong(&self, text: &str) -> ColoredString {
        text.color(self.wrong)
    }

    pub fn muted(&self, text: &str) -> ColoredString {
        text.color(self.muted)
    }
}

/// Print a rounded box header, as used at the top of every screen
pub fn print_box(title: &str, subtitle: &str, color: Color) {
    const WIDTH: usize = 54;
    let pad = |text: &str| {
        let len = text.chars().count();
        let left = WIDTH.saturating_sub(len) / 2;
        let right = WIDTH.saturating_sub(len + left);
        (" ".repeat(left), " ".repeat(right))
    };

    println!();
    println!("    {}", format!("╭{}╮", "─".repeat(WIDTH)).color(color));
    let (l, r) = pad(title);
    println!(
        "    {}{}{}{}{}",
        "│".color(color),
        l,
        title.bold().white(),
        r,
        "│".color(color)
    );
    if !subtitle.is_empty() {
        let (l, r) = pad(subtitle);
        println!(
            "    {}{}{}{}{}",
            "│".color(color),
            l,
            subtitle.dimmed(),
            r,
            "│".color(color)
        );
    }
    println!("    {}", format!("╰{}╯", "─".repeat(WIDTH)).color(color));
    println!();
}

/// Horizontal bar of `value` out of `max`, `width` cells wide
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.min(width))
}
