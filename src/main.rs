mod app;
mod calendar;
mod help;
mod jumpto;
mod style;
use crate::app::App;
use crate::calendar::{CalendarView, ViewOptions};
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Instant;
use swipecal::{
    clock::{CalendarClock, SystemTimeSource, DEFAULT_REFRESH},
    day::{DateRange, Day},
    hybrid::CalendarType,
    locale::{Locale, WeekStart},
};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Which calendars the user can see
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum ViewType {
    Week,
    Month,
    /// Month view, switchable to week view
    #[default]
    Hybrid,
}

impl ViewType {
    fn calendar(self) -> (CalendarType, bool) {
        match self {
            ViewType::Week => (CalendarType::Week, false),
            ViewType::Month => (CalendarType::Month, false),
            ViewType::Hybrid => (CalendarType::Month, true),
        }
    }
}

impl FromStr for ViewType {
    type Err = ParseViewTypeError;

    fn from_str(s: &str) -> Result<ViewType, ParseViewTypeError> {
        if s.eq_ignore_ascii_case("hybrid") {
            return Ok(ViewType::Hybrid);
        }
        match s.parse::<CalendarType>() {
            Ok(CalendarType::Week) => Ok(ViewType::Week),
            Ok(CalendarType::Month) => Ok(ViewType::Month),
            Err(_) => Err(ParseViewTypeError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid calendar type {0:?}; expected \"week\", \"month\", or \"hybrid\"")]
struct ParseViewTypeError(String);

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Config {
    view_type: ViewType,
    selected: Option<Day>,
    initial_page: Option<Day>,
    min: Option<Day>,
    max: Option<Day>,
    week_start: Option<WeekStart>,
    log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Config),
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut config = Config::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('t') | Arg::Long("type") => {
                    config.view_type = parser.value()?.parse()?;
                }
                Arg::Long("init") => config.initial_page = Some(parser.value()?.parse()?),
                Arg::Long("min") => config.min = Some(parser.value()?.parse()?),
                Arg::Long("max") => config.max = Some(parser.value()?.parse()?),
                Arg::Short('w') | Arg::Long("week-start") => {
                    config.week_start = Some(parser.value()?.parse()?);
                }
                Arg::Long("log") => config.log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if config.selected.is_none() => {
                    config.selected = Some(value.parse()?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(config))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(config) => {
                if let Some(path) = &config.log_file {
                    init_logging(path)?;
                }
                tracing::info!(?config, "starting");
                let range = DateRange::new(config.min, config.max).context("invalid date range")?;
                let locale = config
                    .week_start
                    .map_or_else(Locale::english, |ws| Locale::english().with_week_start(ws.0));
                let (calendar_type, switchable) = config.view_type.calendar();
                let clock = CalendarClock::new(SystemTimeSource, DEFAULT_REFRESH, Instant::now());
                let view = CalendarView::new(
                    ViewOptions {
                        calendar_type,
                        switchable,
                        range,
                        selected: config.selected,
                        initial_page: config.initial_page,
                        locale,
                    },
                    clock.today(),
                )
                .context("failed to set up calendar")?;
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(view, clock).run(&mut terminal)
                })
            }
            Command::Help => {
                println!("Usage: swipecal [OPTIONS] [YYYY-MM-DD]");
                println!();
                println!("Swipeable week & month calendar for the terminal");
                println!();
                println!("The optional date is selected at startup.");
                println!();
                println!("Options:");
                println!("  -t, --type <TYPE>       Calendar to show: week, month, or hybrid");
                println!("                          (month switchable to week) [default: hybrid]");
                println!("      --init <YYYY-MM-DD> Show the page of this day first");
                println!("      --min <YYYY-MM-DD>  Earliest selectable day");
                println!("      --max <YYYY-MM-DD>  Latest selectable day");
                println!("  -w, --week-start <DAY>  First day of the week [default: sunday]");
                println!("      --log <FILE>        Write log messages to FILE; the level is read");
                println!("                          from RUST_LOG [default: info]");
                println!("  -h, --help              Display this help message and exit");
                println!("  -V, --version           Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

// The terminal belongs to the calendar, so log messages only go to a file
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
