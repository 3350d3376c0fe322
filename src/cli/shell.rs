use std::{
    borrow::Cow,
    collections::BTreeSet,
    fmt,
    io::{self, BufRead},
    sync::Arc,
};

use bota_core::{LedgerService, RecordStore};
use bota_domain::GigStatus;
use chrono::Datelike;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::core::{short_id, CommandError, LoopControl};
use crate::cli::io as cli_io;
use crate::cli::output::{
    info as output_info, section as output_section, warning as output_warning,
};
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::errors::CliError;
use crate::utils::build_info;

/// Set to read commands from stdin without prompts.
pub const SCRIPT_ENV: &str = "BOTA_CLI_SCRIPT";

const COMPARE_AXES: [&str; 4] = ["year", "town", "type", "payment"];
const FILTER_KEYS: [&str; 7] = [
    "years", "towns", "types", "payment", "status", "minPrice", "maxPrice",
];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    let helper = CommandHelper::new(
        context.registry.list().cloned().collect(),
        context.app.store.clone(),
    );
    editor.set_helper(Some(helper));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    print_banner(context);

    while context.running {
        // Rebuilt every turn: `privacy` and the idle lock both change it.
        let prompt = context.prompt();
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Opening summary: realized pot (masked when private) and any table that failed to load.
fn print_banner(context: &ShellContext) {
    let snapshot = context.snapshot();
    let report = LedgerService::compute_ledger(
        &snapshot.movements,
        &snapshot.gigs,
        &snapshot.advances,
        context.app.pot_policy(),
    );
    output_section(format!("Buidant la Bota {}", build_info::CLI_VERSION));
    cli_io::print_field("Pot real", context.amount(report.pot_real));
    cli_io::print_field("Available", context.amount(report.diners_disposicio));
    cli_io::print_snapshot_warnings(&snapshot.warnings());
    cli_io::print_hint("Type `help` for commands; Tab completes commands, gig ids and filters.");
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    if line.trim_start().starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output_warning(&err.message);
            return Ok(LoopControl::Continue);
        }
    };

    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

/// Completes command names, then each argument from what the command expects:
/// gig and forecast item id prefixes, musician names, statuses, compare axes and
/// filter keys with the values currently in the store.
struct CommandHelper {
    entries: Vec<CommandEntry>,
    store: Arc<dyn RecordStore>,
}

impl CommandHelper {
    fn new(mut entries: Vec<CommandEntry>, store: Arc<dyn RecordStore>) -> Self {
        entries.sort_by_key(|entry| entry.name);
        Self { entries, store }
    }

    fn candidates(&self, kind: ArgKind, word: &str) -> Vec<Pair> {
        let needle = word.to_lowercase();
        let fixed = |values: &mut dyn Iterator<Item = String>| -> Vec<Pair> {
            values
                .filter(|value| value.to_lowercase().starts_with(&needle))
                .map(|value| plain_pair(quote(&value)))
                .collect()
        };
        match kind {
            ArgKind::Command => {
                fixed(&mut self.entries.iter().map(|entry| entry.name.to_string()))
            }
            ArgKind::CompareAxis => fixed(&mut COMPARE_AXES.iter().map(|axis| axis.to_string())),
            ArgKind::Toggle => fixed(&mut ["on", "off"].iter().map(|value| value.to_string())),
            ArgKind::GigStatus => fixed(
                &mut std::iter::once("next".to_string())
                    .chain(GigStatus::ALL.iter().map(|status| status.label().to_lowercase())),
            ),
            ArgKind::Musician => fixed(
                &mut self
                    .store
                    .musicians()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|musician| musician.name),
            ),
            ArgKind::Gig => self
                .store
                .gigs()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|gig| {
                    let id = short_id(gig.id);
                    let matches =
                        id.starts_with(&needle) || gig.town.to_lowercase().starts_with(&needle);
                    let date = gig
                        .date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "sense data".into());
                    matches.then(|| Pair {
                        display: format!("{id}  {date}  {}", gig.town),
                        replacement: id,
                    })
                })
                .collect(),
            ArgKind::ForecastItem => self
                .store
                .forecast_items()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|item| {
                    let id = short_id(item.id);
                    let matches =
                        id.starts_with(&needle) || item.name.to_lowercase().starts_with(&needle);
                    matches.then(|| Pair {
                        display: format!("{id}  {}", item.name),
                        replacement: id,
                    })
                })
                .collect(),
            ArgKind::StatsFilter => match word.split_once('=') {
                None => fixed(&mut FILTER_KEYS.iter().map(|key| format!("{key}="))),
                Some((key, _)) => fixed(
                    &mut self.filter_values(key).into_iter().map(|value| format!("{key}={value}")),
                ),
            },
            ArgKind::Free => Vec::new(),
        }
    }

    fn filter_values(&self, key: &str) -> BTreeSet<String> {
        let gigs = || self.store.gigs().unwrap_or_default();
        match key {
            "towns" | "town" => gigs().into_iter().map(|gig| gig.town).collect(),
            "types" | "type" => gigs().into_iter().filter_map(|gig| gig.gig_type).collect(),
            "years" | "year" => gigs()
                .into_iter()
                .filter_map(|gig| gig.date.map(|date| date.year().to_string()))
                .collect(),
            "payment" | "paymentType" => ["cash", "invoice", "other"].map(String::from).into(),
            "status" => ["confirmed", "pending", "rejected"].map(String::from).into(),
            _ => BTreeSet::new(),
        }
    }
}

fn plain_pair(value: String) -> Pair {
    Pair {
        display: value.clone(),
        replacement: value,
    }
}

fn quote(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let word = &prefix[start..];
        let before: Vec<&str> = prefix[..start].split_whitespace().collect();

        let candidates = match before.split_first() {
            None => self.candidates(ArgKind::Command, word),
            Some((command, args)) => {
                let command = command.to_lowercase();
                match self.entries.iter().find(|entry| entry.name == command) {
                    Some(entry) => self.candidates(entry.arg_kind(args.len()), word),
                    None => Vec::new(),
                }
            }
        };
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
