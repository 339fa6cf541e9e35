//! Tracing subscriber: a styled console layer and a plain per-command log file.
//!
//! Meaning travels in the event target and in structured fields, never in
//! escape codes inside messages. Both layers classify an event into a
//! [`Kind`] and render the same body text; only the decoration differs.
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::paths::log_file_path;
use super::types::ProjectStatus;

/// Event targets with a dedicated rendering.
pub(super) mod target {
    /// Major section header.
    pub const STAGE: &str = "gitlab_enforcer::stage";
    /// Action skipped because of `--dry-run`.
    pub const DRY_RUN: &str = "gitlab_enforcer::dry_run";
    /// Start of a sync run; carries `group`, `endpoint` and `dry_run`.
    pub const RUN: &str = "gitlab_enforcer::run";
    /// Per-project summary line; carries `status` and `detail`.
    pub const OUTCOME: &str = "gitlab_enforcer::outcome";
}

/// Message and fields captured from one event.
#[derive(Debug, Default)]
struct Record {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl Record {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut record = Self::default();
        event.record(&mut record);
        record
    }

    fn push(&mut self, name: &'static str, value: String) {
        if name == "message" {
            self.message = value;
        } else {
            self.fields.push((name, value));
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Visit for Record {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field.name(), format!("{value:?}"));
    }
}

/// What an event means for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Run,
    Stage,
    DryRun,
    Outcome(ProjectStatus),
    Error,
    Warn,
    Info,
    Debug,
}

fn classify(level: Level, event_target: &str, record: &Record) -> Kind {
    match (level, event_target) {
        (Level::ERROR, _) => Kind::Error,
        (Level::WARN, _) => Kind::Warn,
        (Level::INFO, target::RUN) => Kind::Run,
        (Level::INFO, target::STAGE) => Kind::Stage,
        (Level::INFO, target::DRY_RUN) => Kind::DryRun,
        (Level::INFO, target::OUTCOME) => record
            .field("status")
            .and_then(ProjectStatus::from_label)
            .map_or(Kind::Info, Kind::Outcome),
        (Level::INFO, _) => Kind::Info,
        _ => Kind::Debug,
    }
}

/// Undecorated text of an event.
fn body(kind: Kind, record: &Record) -> String {
    match kind {
        Kind::Run => {
            let group = record.field("group").unwrap_or("?");
            let endpoint = record.field("endpoint").unwrap_or("?");
            let mode = if record.field("dry_run") == Some("true") {
                " (dry run)"
            } else {
                ""
            };
            format!("{} {group} on {endpoint}{mode}", record.message)
        }
        Kind::Outcome(status) => {
            let icon = match status {
                ProjectStatus::Ok => '✓',
                ProjectStatus::DryRun => '~',
                ProjectStatus::Failed => '✗',
            };
            match record.field("detail").filter(|d| !d.is_empty()) {
                Some(detail) => format!("{icon} {} ({detail})", record.message),
                None => format!("{icon} {}", record.message),
            }
        }
        _ => record
            .fields
            .iter()
            .fold(record.message.clone(), |mut text, (name, value)| {
                let _ = write!(text, " {name}={value}");
                text
            }),
    }
}

fn file_line(timestamp: &str, kind: Kind, body: &str) -> String {
    match kind {
        Kind::Run => format!("[{timestamp}] --- {body}"),
        Kind::Stage => format!("[{timestamp}] ==> {body}"),
        Kind::DryRun => format!("[{timestamp}]     [dry run] {body}"),
        Kind::Error => format!("[{timestamp}]     [error] {body}"),
        Kind::Warn => format!("[{timestamp}]     [warn] {body}"),
        Kind::Debug => format!("[{timestamp}]     [debug] {body}"),
        Kind::Outcome(_) | Kind::Info => format!("[{timestamp}]     {body}"),
    }
}

fn console_line(kind: Kind, body: &str) -> String {
    match kind {
        Kind::Error => format!("\x1b[31mERROR\x1b[0m {body}"),
        Kind::Warn => format!("\x1b[33mWARN\x1b[0m  {body}"),
        Kind::Run | Kind::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{body}\x1b[0m"),
        Kind::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {body}"),
        Kind::Outcome(ProjectStatus::Ok) => format!("  \x1b[32m{body}\x1b[0m"),
        Kind::Outcome(ProjectStatus::DryRun) => format!("  \x1b[37m{body}\x1b[0m"),
        Kind::Outcome(ProjectStatus::Failed) => format!("  \x1b[31m{body}\x1b[0m"),
        Kind::Info => format!("  {body}"),
        Kind::Debug => format!("  \x1b[2m{body}\x1b[0m"),
    }
}

/// Appends every event at `DEBUG` and above to the command's log file,
/// regardless of console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command` and write the version banner.
    ///
    /// Returns `None` if the file cannot be created.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("ENFORCER_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let started = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        fs::write(
            &path,
            format!("# gitlab-enforcer {version}, command '{command}', started {started}\n"),
        )
        .ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let record = Record::of(event);
        let kind = classify(*metadata.level(), metadata.target(), &record);
        let timestamp = chrono::Utc::now().format("%H:%M:%S").to_string();
        let line = file_line(&timestamp, kind, &body(kind, &record));

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console rendering for [`tracing_subscriber::fmt`].
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let record = Record::of(event);
        let kind = classify(*metadata.level(), metadata.target(), &record);
        writeln!(writer, "{}", console_line(kind, &body(kind, &record)))
    }
}

/// Install the global subscriber.
///
/// The console shows `info` and above (`debug` too when `verbose`), warnings
/// and errors on stderr, the rest on stdout; `RUST_LOG` overrides the level.
/// The file layer writes `debug` and above to
/// `$XDG_CACHE_HOME/gitlab-enforcer/<command>.log`. Call once, before any
/// logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(console_level.into())
        .from_env_lossy();

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
