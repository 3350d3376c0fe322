use std::fmt;

use bota_core::TrafficLight;
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::cli::core::CommandError;
use crate::cli::output;
use crate::cli::shell_context::CliMode;

/// Width of the label column in report rows.
const LABEL_WIDTH: usize = 18;

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

pub fn print_hint(message: impl fmt::Display) {
    output::prompt(message);
}

/// One `label : value` row of a pot, forecast, statistics or config report.
pub fn print_field(label: &str, value: impl fmt::Display) {
    output::info(field_row(label, value));
}

/// Traffic light row; amber and red projections are also raised as warnings.
pub fn print_light(light: TrafficLight, reserve_min: &str) {
    print_field("Status", output::light(light));
    match light {
        TrafficLight::Green => {}
        TrafficLight::Yellow => {
            output::warning(format!("Projection stays above zero but under the {reserve_min} reserve."))
        }
        TrafficLight::Red => output::warning("Projection drops below zero."),
    }
}

/// Snapshot tables that failed to load, so partial figures are never shown silently.
pub fn print_snapshot_warnings(warnings: &[String]) {
    for warning in warnings {
        output::warning(format!("{warning}; figures below treat it as empty."));
    }
}

fn field_row(label: &str, value: impl fmt::Display) -> String {
    format!("  {label:<LABEL_WIDTH$}: {value}")
}

/// Asks before a destructive change. Scripts run unattended and always proceed.
pub fn confirm_action(
    mode: CliMode,
    theme: &ColorfulTheme,
    prompt: &str,
) -> Result<bool, CommandError> {
    if mode == CliMode::Script {
        return Ok(true);
    }
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(CommandError::from)
}
