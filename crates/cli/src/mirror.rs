//! `tmirror run` / `tmirror validate`: config-driven two-table reconciliation.

use std::path::{Path, PathBuf};

use tablemirror::{MirrorConfig, MirrorError, MirrorReport, Side};
use tablemirror_io::export::{write_csv_report_file, write_csv_report_to_dir, write_json_report};
use tablemirror_io::{DataSource, ExportError};

use crate::exit_codes::{mirror_exit_code, EXIT_DIVERGENCES, EXIT_OUTPUT, EXIT_USAGE};
use crate::CliError;

pub struct RunOptions {
    pub csv_dir: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub no_csv: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

fn mirror_err(err: MirrorError) -> CliError {
    let hint = match &err {
        MirrorError::MissingColumn { .. } => {
            Some("check the link column names against the source table".to_string())
        }
        MirrorError::InvalidConfiguration(msg) if msg.contains("normalizer") => {
            Some("run `tmirror validate <config>` to check a config without loading data".to_string())
        }
        _ => None,
    };
    CliError {
        code: mirror_exit_code(&err),
        message: err.to_string(),
        hint,
    }
}

fn output_err(err: ExportError) -> CliError {
    CliError {
        code: EXIT_OUTPUT,
        message: err.to_string(),
        hint: None,
    }
}

fn load_config(config_path: &Path) -> Result<MirrorConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read config {}: {e}", config_path.display()),
        hint: None,
    })?;
    MirrorConfig::from_toml(&config_str).map_err(mirror_err)
}

/// Directory that relative paths inside the config resolve against.
fn config_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

pub fn cmd_run(config_path: PathBuf, opts: RunOptions) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let base_dir = config_dir(&config_path);
    let mirror = config.build_mirror().map_err(mirror_err)?;

    let source_a = DataSource::open(&config.source_a, base_dir)
        .map_err(|e| mirror_err(MirrorError::source_failed(Side::A, e)))?;
    let source_b = DataSource::open(&config.source_b, base_dir)
        .map_err(|e| mirror_err(MirrorError::source_failed(Side::B, e)))?;

    let report = mirror
        .run_diff(&source_a, &config.source_a.table, &source_b, &config.source_b.table)
        .map_err(mirror_err)?;

    if !opts.no_csv {
        let path = write_csv(&report, &config, base_dir, &opts).map_err(output_err)?;
        if !opts.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    let json_path = opts
        .output
        .clone()
        .or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(path) = json_path {
        write_json_report(&report, &path).map_err(output_err)?;
        if !opts.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if opts.json {
        let json_str = report
            .to_json_pretty()
            .map_err(|e| output_err(ExportError::Json(e)))?;
        println!("{json_str}");
    }

    let s = &report.summary;
    if !opts.quiet {
        eprintln!(
            "mirror '{}': {} + {} rows in {} buckets, {} matched, {} divergent \
             ({} missing, {} value, {} type)",
            report.meta.name,
            s.rows_a,
            s.rows_b,
            s.buckets,
            s.matched,
            s.divergent,
            s.missing_matches,
            s.value_mismatches,
            s.type_mismatches,
        );
    }

    if s.has_divergences() {
        return Err(CliError {
            code: EXIT_DIVERGENCES,
            message: format!("{} diagnostic(s) found", report.diagnostics.len()),
            hint: None,
        });
    }
    Ok(())
}

/// CLI flags win over the config; config paths resolve against its directory;
/// with nothing configured the report lands in the working directory.
fn write_csv(
    report: &MirrorReport,
    config: &MirrorConfig,
    base_dir: &Path,
    opts: &RunOptions,
) -> Result<PathBuf, ExportError> {
    let now = chrono::Local::now();
    if let Some(file) = &opts.csv {
        write_csv_report_file(report, file)?;
        return Ok(file.clone());
    }
    if let Some(dir) = &opts.csv_dir {
        return write_csv_report_to_dir(report, dir, &now);
    }
    if let Some(file) = &config.output.csv {
        let path = base_dir.join(file);
        write_csv_report_file(report, &path)?;
        return Ok(path);
    }
    let dir = match &config.output.csv_dir {
        Some(dir) => base_dir.join(dir),
        None => PathBuf::from("."),
    };
    write_csv_report_to_dir(report, &dir, &now)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: mirror '{}' with {} link(s), {} identity ({} {} -> {} {})",
        config.name,
        config.links.len(),
        config.identity_count(),
        config.source_a.kind,
        config.source_a.table,
        config.source_b.kind,
        config.source_b.table,
    );
    Ok(())
}
