use std::io::{self, Write};

use bota_config::ConfigManager;
use bota_core::Snapshot;
use bota_domain::{ForecastItem, GigRecord};
use chrono::NaiveDate;
use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};
use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{context::AppContext, errors::CliError, session::SessionState};

use super::commands;
use super::core::{CommandError, LoopControl};
use super::io as cli_io;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub app: AppContext,
    /// `None` when the context was built around an in-memory configuration.
    pub config_manager: Option<ConfigManager>,
    pub session: SessionState,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Loads the configuration from `$BOTA_HOME` and opens the record store it points at.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::from_env()?;
        let config = manager.load()?;
        output::apply_color_mode(config.color);
        let app = AppContext::open(config)?;
        let mut context = Self::with_context(mode, app);
        context.config_manager = Some(manager);
        Ok(context)
    }

    pub fn with_context(mode: CliMode, app: AppContext) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        let session = SessionState::new(app.config.session, app.clock.now());
        Self {
            mode,
            registry,
            app,
            config_manager: None,
            session,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        }
    }

    pub(crate) fn prompt(&self) -> String {
        if self.session.is_masked() {
            "bota [privat]> ".to_string()
        } else {
            "bota> ".to_string()
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        self.touch_session()?;
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    /// Locks the session when it sat idle. Interactive terminals are cleared so earlier
    /// figures leave the screen.
    fn touch_session(&mut self) -> Result<(), CommandError> {
        if !self.session.touch(self.app.clock.now()) {
            return Ok(());
        }
        if self.mode == CliMode::Interactive {
            let mut stdout = io::stdout();
            stdout.execute(terminal::Clear(ClearType::All))?;
            stdout.execute(cursor::MoveTo(0, 0))?;
            stdout.flush()?;
        }
        cli_io::print_warning("Session was idle; amounts are hidden. Use `privacy off` to show them.");
        Ok(())
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{best}`?"));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        cli_io::confirm_action(self.mode, &self.theme, "Exit shell?").map_err(|err| match err {
            CommandError::Dialoguer(err) => CliError::Prompt(err),
            CommandError::Io(err) => CliError::Io(err),
            other => CliError::Io(io::Error::other(other.to_string())),
        })
    }

    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        cli_io::confirm_action(self.mode, &self.theme, prompt)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }

    /// Amount with currency, or the privacy mask.
    pub(crate) fn amount(&self, value: f64) -> String {
        self.session.amount(value, &self.app.config.currency)
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.app.clock.today()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot::load_with_defaults(self.app.store.as_ref(), self.app.default_settings())
    }

    /// Finds a gig by full id or by a unique id prefix.
    pub(crate) fn resolve_gig(&self, key: &str) -> Result<GigRecord, CommandError> {
        let gigs = self.app.store.gigs()?;
        resolve_by_prefix(gigs, key, |gig| gig.id, "gig")
    }

    pub(crate) fn resolve_item(&self, key: &str) -> Result<ForecastItem, CommandError> {
        let items = self.app.store.forecast_items()?;
        resolve_by_prefix(items, key, |item| item.id, "forecast item")
    }
}

pub(crate) fn resolve_by_prefix<T>(
    rows: Vec<T>,
    key: &str,
    id_of: impl Fn(&T) -> Uuid,
    what: &str,
) -> Result<T, CommandError> {
    let needle = key.trim().to_ascii_lowercase().replace('-', "");
    if needle.is_empty() {
        return Err(CommandError::InvalidArguments(format!("missing {what} id")));
    }
    let mut matches: Vec<T> = rows
        .into_iter()
        .filter(|row| id_of(row).simple().to_string().starts_with(&needle))
        .collect();
    match matches.len() {
        0 => Err(CommandError::Message(format!("no {what} matches `{key}`"))),
        1 => Ok(matches.remove(0)),
        n => Err(CommandError::InvalidArguments(format!(
            "`{key}` matches {n} records; use a longer id"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bota_config::Config;
    use bota_core::{FixedClock, InMemoryStore, RecordStore};
    use std::sync::Arc;

    fn context() -> ShellContext {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        ShellContext::with_context(
            CliMode::Script,
            AppContext::with_store(Config::default(), store, clock),
        )
    }

    #[test]
    fn gigs_resolve_by_unique_prefix() {
        let shell = context();
        let gig = GigRecord::new(None, "Berga");
        shell.app.store.save_gig(&gig).unwrap();
        let prefix = &gig.id.simple().to_string()[..6];
        assert_eq!(shell.resolve_gig(prefix).unwrap().id, gig.id);
        assert!(shell.resolve_gig("zzzz").is_err());
    }

    #[test]
    fn unknown_commands_do_not_stop_the_loop() {
        let mut shell = context();
        let control = shell.dispatch("potz", "potz", &[]).unwrap();
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(shell.dispatch("exit", "exit", &[]).unwrap(), LoopControl::Exit);
    }

    #[test]
    fn assigning_musicians_recomputes_gig_cost() {
        let mut shell = context();
        let gig = GigRecord::new(None, "Olot")
            .with_status(bota_domain::GigStatus::Confirmed)
            .with_income(800.0, bota_domain::IncomeType::Invoice);
        shell.app.store.save_gig(&gig).unwrap();
        shell
            .app
            .store
            .save_musician(&bota_domain::Musician::new("Pere", 120.0))
            .unwrap();

        let id = gig.id.to_string();
        shell.dispatch("gig-assign", "gig-assign", &[&id, "pere"]).unwrap();
        shell
            .dispatch("gig-assign", "gig-assign", &[&id, "Pere", "substitute", "90"])
            .unwrap();

        let stored = shell.app.store.gig(gig.id).unwrap();
        assert_eq!(stored.musician_cost_total, 210.0);
        assert_eq!(stored.margin(), 590.0);
    }

    #[test]
    fn stepping_a_gig_to_closed_freezes_its_cost() {
        let mut shell = context();
        let gig = GigRecord::new(None, "Ripoll")
            .with_status(bota_domain::GigStatus::AwaitingCollection)
            .with_income(500.0, bota_domain::IncomeType::Cash);
        shell.app.store.save_gig(&gig).unwrap();
        shell
            .app
            .store
            .save_musician(&bota_domain::Musician::new("Marta", 100.0))
            .unwrap();

        let id = gig.id.to_string();
        shell.dispatch("gig-status", "gig-status", &[&id, "next"]).unwrap();
        shell.dispatch("gig-status", "gig-status", &[&id, "next"]).unwrap();
        let stored = shell.app.store.gig(gig.id).unwrap();
        assert_eq!(stored.status, bota_domain::GigStatus::Closed);
        assert!(stored.is_closed());

        let err = shell
            .dispatch("gig-assign", "gig-assign", &[&id, "Marta"])
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
        let stored = shell.app.store.gig(gig.id).unwrap();
        assert_eq!(stored.musician_cost_total, 0.0);
        assert_eq!(stored.pot_delta, 500.0);
    }

    #[test]
    fn masked_sessions_hide_amounts() {
        let mut shell = context();
        assert_eq!(shell.amount(12.5), "12.50 EUR");
        shell.session.set_masked(true);
        assert_eq!(shell.amount(12.5), crate::session::MASK);
        assert_eq!(shell.prompt(), "bota [privat]> ");
    }
}
