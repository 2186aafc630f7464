use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use propyaml::config::Config;
use propyaml::file::loader::read_stdin;
use propyaml::file::workspace::{FsWorkspace, MemoryWorkspace, Workspace};
use propyaml::refactor::report;
use propyaml::refactor::{ConversionOrchestrator, Direction, Options};
use propyaml::status::{ConversionStatus, Severity};

/// propyaml - convert Spring Boot configuration between .properties and YAML
#[derive(Parser)]
#[command(name = "propyaml")]
#[command(version)]
#[command(about = "Convert Spring Boot .properties files to YAML and back", long_about = None)]
struct Cli {
    /// File to convert; `-` reads stdin and implies --dry-run
    file: PathBuf,

    /// Output format, when it can't be inferred from the file extension
    #[arg(long, value_enum)]
    to: Option<OutputFormat>,

    /// Print the converted text and the report without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Create the target file next to the source instead of replacing it
    #[arg(long)]
    keep_source: bool,

    /// Prepend the conversion report to the output as a comment block
    #[arg(long)]
    report_header: bool,

    /// Copy the source to <source>.bak before applying
    #[arg(long)]
    backup: bool,

    /// YAML indentation (at least 1)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    indent: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Apply even when the report contains errors
    #[arg(long)]
    force: bool,

    /// Raise the log level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Properties,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

const EXIT_FATAL: u8 = 1;
const EXIT_ERRORS: u8 = 2;

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "propyaml=warn",
        1 => "propyaml=info",
        _ => "propyaml=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // CLI flags override config values
    let config = Config::load();
    let options = Options {
        indent_size: cli.indent.unwrap_or(config.indent_size),
        yaml_extension: config.yaml_extension.clone(),
        report_header: cli.report_header || config.report_header,
        replace_source: !cli.keep_source && config.replace_source,
    };

    let direction = match cli.to {
        Some(OutputFormat::Yaml) => Direction::PropertiesToYaml,
        Some(OutputFormat::Properties) => Direction::YamlToProperties,
        None => match Direction::infer(&cli.file) {
            Some(direction) => direction,
            None => bail!(
                "Can't tell which way to convert '{}'; use --to yaml or --to properties",
                cli.file.display()
            ),
        },
    };

    if cli.file == Path::new("-") {
        let text = read_stdin().context("Failed to read from stdin")?;
        let workspace = MemoryWorkspace::new().with_file("-", text);
        return run(&cli, &workspace, direction, options, true);
    }

    let workspace = FsWorkspace::new(cli.backup || config.create_backup);
    run(&cli, &workspace, direction, options, cli.dry_run)
}

fn run<W: Workspace>(
    cli: &Cli,
    workspace: &W,
    direction: Direction,
    options: Options,
    dry_run: bool,
) -> Result<ExitCode> {
    let mut conversion = ConversionOrchestrator::new(workspace, &cli.file, direction, options);
    let status = conversion.check_all_conditions()?.clone();

    if status.has_fatal() {
        print_report(cli, &status, conversion.target(), None, false)?;
        return Ok(ExitCode::from(EXIT_FATAL));
    }

    let change = conversion.create_change()?;

    if dry_run {
        print_report(cli, &status, conversion.target(), Some(&change.content), false)?;
        conversion.abort();
        return Ok(ExitCode::SUCCESS);
    }

    if status.severity() == Severity::Error && !cli.force {
        print_report(cli, &status, conversion.target(), None, false)?;
        eprintln!("Nothing written: the conversion has errors (use --force to apply anyway)");
        conversion.abort();
        return Ok(ExitCode::from(EXIT_ERRORS));
    }

    conversion
        .apply(&change)
        .with_context(|| format!("Failed to {}", change.describe()))?;
    print_report(cli, &status, conversion.target(), None, true)?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the report to stdout. In a text dry run the converted text owns
/// stdout and the report goes to stderr.
fn print_report(
    cli: &Cli,
    status: &ConversionStatus,
    target: &Path,
    content: Option<&str>,
    applied: bool,
) -> Result<()> {
    match cli.format {
        ReportFormat::Json => {
            let value = serde_json::json!({
                "source": cli.file.display().to_string(),
                "target": target.display().to_string(),
                "applied": applied,
                "status": status,
                "content": content,
            });
            let json = serde_json::to_string_pretty(&value).context("Failed to render report")?;
            println!("{}", json);
        }
        ReportFormat::Text => match content {
            Some(text) => {
                print!("{}", text);
                eprint!("{}", report::render_text(status));
            }
            None => {
                print!("{}", report::render_text(status));
                if applied {
                    println!("Wrote '{}'", target.display());
                }
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_must_be_positive() {
        assert!(Cli::try_parse_from(["propyaml", "--indent", "0", "app.properties"]).is_err());

        let cli = Cli::try_parse_from(["propyaml", "--indent", "4", "app.properties"]).unwrap();
        assert_eq!(cli.indent, Some(4));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["propyaml", "app.yml"]).unwrap();
        assert!(cli.indent.is_none());
        assert!(cli.format == ReportFormat::Text);
        assert!(!cli.dry_run);
    }
}
