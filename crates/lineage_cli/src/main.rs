//! Command-line viewer over a person snapshot.
//!
//! # Responsibility
//! - Lay out a JSON snapshot and print fitted node positions.
//! - Answer one kinship query between two ids.
//!
//! File logging starts when `--log-dir` or `LINEAGE_LOG_DIR` names an
//! absolute directory.

use clap::Parser;
use lineage_core::{
    active_people, default_log_level, flush_logging, init_logging_with, label_by_id, layout,
    parse_snapshot, LayoutConfig, LoggingConfig, LoggingError, PersonId, Viewport,
    ViewportConfig, Vocabulary, LOG_DIR_ENV, LOG_LEVEL_ENV,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "lineage_cli")]
#[command(version)]
#[command(about = "Lay out a family snapshot and name kinship between two members")]
#[command(long_about = None)]
struct Cli {
    /// Snapshot file: a JSON array of person records
    snapshot: PathBuf,

    /// Person whose relation is named
    #[arg(requires = "center")]
    target: Option<String>,

    /// Person the relation is named from
    center: Option<String>,

    /// Print kinship terms in English instead of Chinese
    #[arg(long)]
    english: bool,

    /// Viewport width used for the fit
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height used for the fit
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Absolute directory for rolling log files
    #[arg(long, env = LOG_DIR_ENV)]
    log_dir: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,
}

impl Cli {
    fn vocabulary(&self) -> Vocabulary {
        if self.english {
            Vocabulary::English
        } else {
            Vocabulary::Chinese
        }
    }

    fn pair(&self) -> Option<(PersonId, PersonId)> {
        match (&self.target, &self.center) {
            (Some(target), Some(center)) => {
                Some((PersonId::new(target.clone()), PersonId::new(center.clone())))
            }
            _ => None,
        }
    }

    /// `None` when no log directory was given.
    fn logging_config(&self) -> Option<Result<LoggingConfig, LoggingError>> {
        let dir = self.log_dir.as_ref()?;
        let level = self
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().as_str().to_string());
        Some(LoggingConfig::new(&level, dir))
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let json = std::fs::read_to_string(&cli.snapshot)
        .map_err(|err| format!("failed to read `{}`: {err}", cli.snapshot.display()))?;
    let people = parse_snapshot(&json).map_err(|err| err.to_string())?;
    let active = active_people(&people);

    let nodes = layout(&active, LayoutConfig::default()).map_err(|err| err.to_string())?;
    let mut viewport = Viewport::new(ViewportConfig::default());
    viewport.auto_fit(&nodes, cli.width, cli.height);
    let fitted = viewport.settle();
    info!(
        "event=cli_layout module=cli status=ok people={} nodes={}",
        people.len(),
        nodes.len()
    );

    println!(
        "transform x={:.1} y={:.1} k={:.3}",
        fitted.x, fitted.y, fitted.k
    );
    for node in &nodes {
        println!(
            "{}\tgen={}\tx={:.1}\ty={:.1}\t{}",
            node.id,
            node.generation(),
            node.x,
            node.y,
            node.person.name
        );
    }

    if let Some((target, center)) = cli.pair() {
        let label = label_by_id(&target, &center, &active, cli.vocabulary());
        println!(
            "relation {target} -> {center}: {}",
            label.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(config) = cli.logging_config() {
        if let Err(err) = config.and_then(|config| init_logging_with(&config)) {
            eprintln!("logging disabled: {err}");
        }
    }

    let result = run(&cli);
    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use lineage_core::{PersonId, Vocabulary};
    use log::LevelFilter;

    #[test]
    fn snapshot_alone_has_no_kinship_query() {
        let cli = Cli::try_parse_from(["lineage_cli", "family.json"]).unwrap();
        assert!(cli.pair().is_none());
        assert_eq!(cli.vocabulary(), Vocabulary::Chinese);
        assert_eq!(cli.width, 1280.0);
        assert_eq!(cli.height, 800.0);
    }

    #[test]
    fn target_without_center_is_rejected() {
        assert!(Cli::try_parse_from(["lineage_cli", "family.json", "p-1"]).is_err());
    }

    #[test]
    fn pair_and_english_flag_are_read() {
        let cli =
            Cli::try_parse_from(["lineage_cli", "family.json", "p-1", "p-2", "--english"]).unwrap();
        assert_eq!(
            cli.pair(),
            Some((PersonId::new("p-1"), PersonId::new("p-2")))
        );
        assert_eq!(cli.vocabulary(), Vocabulary::English);
    }

    #[test]
    fn log_flags_build_a_logging_config() {
        let cli = Cli::try_parse_from([
            "lineage_cli",
            "family.json",
            "--log-dir",
            "/tmp/lineage-logs",
            "--log-level",
            "warn",
        ])
        .unwrap();
        let config = cli.logging_config().unwrap().unwrap();
        assert_eq!(config.level, LevelFilter::Warn);

        let relative =
            Cli::try_parse_from(["lineage_cli", "family.json", "--log-dir", "logs"]).unwrap();
        assert!(relative.logging_config().unwrap().is_err());
    }
}
