//! Command-line front end for `lnkcore`: dumps one or more `.lnk` files as
//! text, CSV, or TSV to stdout.

mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, ValueHint};
use clio::ClioPath;
use log::error;
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

use output::{Config, OutputFormat};

#[derive(Parser)]
#[clap(name = "lnkdump", author, version, long_about = None)]
struct Cli {
    /// One or more `.lnk` files, or a single directory to recurse into.
    #[clap(value_hint = ValueHint::AnyPath, required = true, num_args = 1..)]
    paths: Vec<ClioPath>,

    /// Short-form output: omits the long-form-only fields.
    #[clap(short('s'), long("short"))]
    short: bool,

    /// Output format.
    #[clap(short('o'), long("output"), value_enum, default_value = "txt")]
    output: OutputFormat,

    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = TermLogger::init(
        cli.verbose.log_level_filter(),
        LogConfig::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let config = Config {
        output: cli.output,
        short_form: cli.short,
    };

    let paths: Vec<PathBuf> = cli.paths.iter().map(|p| p.path().to_path_buf()).collect();
    let files = collect_files(&paths)?;

    if matches!(config.output, OutputFormat::Csv | OutputFormat::Tsv) {
        println!("{}", output::header_row(&config));
    }

    for path in files {
        if let Err(e) = dump_one(&path, &config) {
            error!("{}: {e}", path.display());
        }
    }

    Ok(())
}

/// Expands the CLI's positional arguments into a flat file list. A single
/// directory argument recurses; a list of files is used as-is. This is the
/// filesystem-traversal "thin shell" the core decoder never touches itself.
fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    if paths.len() == 1 && paths[0].is_dir() {
        let mut files = Vec::new();
        walk_dir(&paths[0], &mut files)?;
        files.sort();
        return Ok(files);
    }

    for p in paths {
        if !p.exists() {
            anyhow::bail!("{}: does not exist", p.display());
        }
    }
    Ok(paths.to_vec())
}

fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_dir(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn dump_one(path: &Path, config: &Config) -> anyhow::Result<()> {
    let shell_link = lnkcore::ShellLink::open(path)?;
    let rendered = match config.output {
        OutputFormat::Txt => output::render_txt(path, &shell_link, config),
        OutputFormat::Csv => output::render_row(path, &shell_link, config, b','),
        OutputFormat::Tsv => output::render_row(path, &shell_link, config, b'\t'),
    };
    println!("{rendered}");
    Ok(())
}
