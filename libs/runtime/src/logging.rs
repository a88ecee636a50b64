//! Tracing subscriber setup driven by the `logging` config section.
//!
//! Every key other than `default` names a target prefix (usually a crate such
//! as `event_bookings`). Each section gets its own console level and,
//! optionally, its own rotating JSON log file. The `default` section catches
//! everything no explicit section claims.

use crate::config::{LoggingConfig, Section};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::filter::{FilterFn, Targets};
use tracing_subscriber::fmt;

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 5;

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// True if `target` is `prefix` itself or lives under `prefix::`.
fn matches_target_prefix(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

type CatchAllFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Passes records that no explicit section claims, up to `max_level`.
fn catch_all_filter(claimed: &[String], max_level: Level) -> CatchAllFilter {
    let claimed = claimed.to_vec();
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        if claimed.iter().any(|p| matches_target_prefix(meta.target(), p)) {
            return false;
        }
        meta.level() <= &max_level
    }))
}

// -------- rotating file writers --------

#[derive(Clone)]
struct RotatingFile(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

/// Writer that may have no destination; writes are then discarded.
struct MaybeFile(Option<RotatingFile>);

impl Write for MaybeFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(f) => f.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

/// Routes each record to the file of the section owning its target.
#[derive(Clone, Default)]
struct FileRouter {
    fallback: Option<RotatingFile>,
    by_prefix: HashMap<String, RotatingFile>,
}

impl FileRouter {
    fn route(&self, target: &str) -> Option<RotatingFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_target_prefix(target, prefix))
            .map(|(_, f)| f.clone())
            .or_else(|| self.fallback.clone())
    }

    fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeFile;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeFile(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        MaybeFile(self.route(meta.target()))
    }
}

/// Relative log paths are anchored at `base_dir` (the server home dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating_file(section: &Section, base_dir: &Path) -> std::io::Result<Option<RotatingFile>> {
    if section.file.trim().is_empty() {
        return Ok(None);
    }

    let path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let rot = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(
            section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS),
        )),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(Some(RotatingFile(Arc::new(Mutex::new(rot)))))
}

// -------- plan --------

/// The resolved shape of the subscriber before it is installed.
struct LoggingPlan {
    claimed: Vec<String>,
    console_targets: Targets,
    file_targets: Targets,
    default_console: Option<Level>,
    default_file: Option<Level>,
    files: FileRouter,
}

fn plan(cfg: &LoggingConfig, base_dir: &Path) -> LoggingPlan {
    let mut plan = LoggingPlan {
        claimed: Vec::new(),
        console_targets: Targets::new().with_default(LevelFilter::OFF),
        file_targets: Targets::new().with_default(LevelFilter::OFF),
        default_console: None,
        default_file: None,
        files: FileRouter::default(),
    };

    for (name, section) in cfg.iter().filter(|(k, _)| k.as_str() != "default") {
        plan.claimed.push(name.clone());

        if let Some(level) = parse_tracing_level(&section.console_level) {
            plan.console_targets = plan
                .console_targets
                .clone()
                .with_target(name.clone(), LevelFilter::from_level(level));
        }

        match open_rotating_file(section, base_dir) {
            Ok(Some(file)) => {
                plan.files.by_prefix.insert(name.clone(), file);
                if let Some(level) = parse_tracing_level(&section.file_level) {
                    plan.file_targets = plan
                        .file_targets
                        .clone()
                        .with_target(name.clone(), LevelFilter::from_level(level));
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("Failed to open log file for '{name}': {e}"),
        }
    }

    if let Some(section) = cfg.get("default") {
        plan.default_console = parse_tracing_level(&section.console_level);
        match open_rotating_file(section, base_dir) {
            Ok(Some(file)) => {
                plan.files.fallback = Some(file);
                plan.default_file = parse_tracing_level(&section.file_level);
            }
            Ok(None) => {}
            Err(e) => eprintln!("Failed to open default log file: {e}"),
        }
    }

    plan
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: the `logging` section
/// - `base_dir`: base directory used to resolve relative log file paths (usually server.home_dir)
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    install(plan(cfg, base_dir));
}

fn install(plan: LoggingPlan) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    let ansi = atty::is(atty::Stream::Stdout);

    let console_explicit = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(plan.console_targets);

    let console_default = plan.default_console.map(|level| {
        fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(catch_all_filter(&plan.claimed, level))
    });

    let has_files = !plan.files.is_empty();

    let file_explicit = has_files.then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(plan.files.clone())
            .with_filter(plan.file_targets)
    });

    let file_default = plan
        .default_file
        .filter(|_| plan.files.fallback.is_some())
        .map(|level| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(plan.files.clone())
                .with_filter(catch_all_filter(&plan.claimed, level))
        });

    let _ = Registry::default()
        .with(console_explicit)
        .with(console_default)
        .with(file_explicit)
        .with(file_default)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "info".into(),
            file: file.into(),
            file_level: "debug".into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("warn"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("bogus"), Some(Level::INFO));
    }

    #[test]
    fn test_target_prefix_matching() {
        assert!(matches_target_prefix("event_bookings", "event_bookings"));
        assert!(matches_target_prefix(
            "event_bookings::domain::lifecycle",
            "event_bookings"
        ));
        assert!(!matches_target_prefix("event_bookings_extra", "event_bookings"));
        assert!(!matches_target_prefix("db", "event_bookings"));
    }

    #[test]
    fn test_relative_paths_resolve_under_base_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));
    }

    #[test]
    fn test_open_rotating_file_creates_parent() {
        let tmp = tempdir().unwrap();
        let file = open_rotating_file(&section("nested/dir/app.log"), tmp.path()).unwrap();
        assert!(file.is_some());
        assert!(tmp.path().join("nested/dir").exists());
    }

    #[test]
    fn test_plan_routes_sections_to_files() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("event_bookings".into(), section("logs/bookings.log"));

        let plan = plan(&cfg, tmp.path());
        assert_eq!(plan.claimed, vec!["event_bookings".to_string()]);
        assert_eq!(plan.default_console, Some(Level::INFO));
        assert_eq!(plan.default_file, Some(Level::DEBUG));
        assert!(plan.files.route("event_bookings::domain").is_some());
        assert!(plan.files.route("sqlx::query").is_some(), "falls back to default file");
    }

    #[test]
    fn test_plan_without_files_has_empty_router() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section(""));
        let plan = plan(&cfg, tmp.path());
        assert!(plan.files.is_empty());
        assert_eq!(plan.default_file, None);
    }
}
