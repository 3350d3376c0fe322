use std::fmt;
use std::sync::RwLock;

use bota_config::ColorMode;
use bota_core::TrafficLight;
use colored::Colorize;
use once_cell::sync::Lazy;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Prompt,
    Section,
    Separator,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    pub plain: bool,
    pub quiet_mode: bool,
}

static PREFERENCES: Lazy<RwLock<OutputPreferences>> =
    Lazy::new(|| RwLock::new(OutputPreferences::default()));

pub fn set_preferences(prefs: OutputPreferences) {
    if let Ok(mut guard) = PREFERENCES.write() {
        *guard = prefs;
    }
}

pub fn current_preferences() -> OutputPreferences {
    PREFERENCES.read().map(|guard| *guard).unwrap_or_default()
}

/// Maps the configured color mode onto the global `colored` override.
pub fn apply_color_mode(mode: ColorMode) {
    let mut prefs = current_preferences();
    match mode {
        ColorMode::Always => {
            colored::control::set_override(true);
            prefs.plain = false;
        }
        ColorMode::Never => {
            colored::control::set_override(false);
            prefs.plain = true;
        }
        ColorMode::Auto => {
            colored::control::unset_override();
            prefs.plain = false;
        }
    }
    set_preferences(prefs);
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[ok]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Prompt => ("PROMPT", ">"),
        MessageKind::Section | MessageKind::Separator => ("INFO", ""),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Separator => String::from("----------------------------------------"),
        MessageKind::Info => text,
        _ => {
            let (label, icon) = build_label(kind);
            format!("{label}: {icon} {text}")
        }
    };

    if prefs.plain {
        return formatted;
    }

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Prompt => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Separator | MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = current_preferences();
    if prefs.quiet_mode && kind == MessageKind::Separator {
        return;
    }
    let formatted = apply_style(kind, message, &prefs);
    match kind {
        MessageKind::Section | MessageKind::Separator => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn prompt(message: impl fmt::Display) {
    print(MessageKind::Prompt, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

pub fn separator() {
    print(MessageKind::Separator, "");
}

/// Traffic light label, colored unless output is plain.
pub fn light(light: TrafficLight) -> String {
    let label = match light {
        TrafficLight::Green => "VERD",
        TrafficLight::Yellow => "GROC",
        TrafficLight::Red => "VERMELL",
    };
    if current_preferences().plain {
        return label.to_string();
    }
    match light {
        TrafficLight::Green => label.bright_green().bold().to_string(),
        TrafficLight::Yellow => label.bright_yellow().bold().to_string(),
        TrafficLight::Red => label.bright_red().bold().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_has_no_escape_codes() {
        let prefs = OutputPreferences {
            plain: true,
            quiet_mode: false,
        };
        let text = apply_style(MessageKind::Warning, "saldo baix", &prefs);
        assert_eq!(text, "WARNING: [!] saldo baix");
        assert_eq!(
            apply_style(MessageKind::Section, " Pot ", &prefs),
            "=== Pot ==="
        );
    }
}
