//! nasheets: parse, check and reformat Nashville-number lead sheets.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use nasheets::config::SheetConfig;
use nasheets::sheet::{self, Lexer};

#[derive(Parser)]
#[command(
    name = "nasheets",
    version,
    about = "Parse, check and reformat plain-text lead sheets"
)]
struct Cli {
    /// Config file (default: ~/.nasheets/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print each song as JSON
    Json {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Dump the token stream
    Tokens {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print a readable outline of sections and bars
    Outline {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print songs in canonical form
    Fmt {
        /// Rewrite files in place instead of printing
        #[arg(short, long)]
        write: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse every file and report errors
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = match &cli.config {
        Some(path) => SheetConfig::load_from(path)?,
        None => SheetConfig::load().unwrap_or_default(),
    };

    match &cli.command {
        Command::Json { files } => {
            for path in expand(files, &config)? {
                let song = parse_file(&path, &config)?;
                println!("{}", song.to_json()?);
            }
        }
        Command::Tokens { files } => {
            for path in expand(files, &config)? {
                let source = read(&path)?;
                let lexer = Lexer::new(&source)
                    .with_name(path.display().to_string())
                    .with_context_width(config.error_context);
                for token in lexer {
                    println!("{}", token?);
                }
            }
        }
        Command::Outline { files } => {
            for path in expand(files, &config)? {
                print!("{}", parse_file(&path, &config)?);
            }
        }
        Command::Fmt { write, files } => {
            for path in expand(files, &config)? {
                let text = sheet::print(&parse_file(&path, &config)?);
                if *write {
                    fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    log::info!("formatted {}", path.display());
                } else {
                    print!("{text}");
                }
            }
        }
        Command::Check { files } => check(&expand(files, &config)?, &config)?,
    }

    Ok(())
}

fn check(paths: &[PathBuf], config: &SheetConfig) -> Result<()> {
    let mut failed = 0;
    for path in paths {
        match parse_file(path, config) {
            Ok(song) => {
                log::info!("{}: {} bar(s)", path.display(), song.bars().count());
                println!("ok      {}", path.display());
            }
            Err(e) => {
                failed += 1;
                println!("FAILED  {}", path.display());
                eprintln!("{e:#}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) failed to parse", paths.len());
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_file(path: &Path, config: &SheetConfig) -> Result<sheet::Song> {
    let source = read(path)?;
    let name = path.display().to_string();
    let song = sheet::parse_with_config(Some(&name), &source, config)
        .with_context(|| format!("failed to parse {name}"))?;
    Ok(song)
}

/// Replace directories with the sheets they contain, sorted by path.
fn expand(inputs: &[PathBuf], config: &SheetConfig) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        let entries = fs::read_dir(input)
            .with_context(|| format!("failed to list {}", input.display()))?;
        for entry in entries {
            let path = entry?.path();
            let wanted = path
                .extension()
                .is_some_and(|ext| ext == config.extension.as_str());
            if wanted && path.is_file() {
                found.push(path);
            }
        }
        found.sort();
        log::debug!("{}: {} sheet(s)", input.display(), found.len());
        paths.extend(found);
    }
    Ok(paths)
}
