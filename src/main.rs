use clap::{ArgAction, Parser, Subcommand};
use imgconv::command::Command as SessionCommand;
use imgconv::config::{self, ToolConfig};
use imgconv::output;
use imgconv::session::{Session, SessionOptions};
use imgconv::shell::Shell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgconv")]
#[command(version)]
#[command(about = "Compress, rotate, resize, crop, grayscale and convert images")]
#[command(long_about = "\
Compress, rotate, resize, crop, grayscale and convert images

Load a JPEG or PNG, then apply transforms one after another. Each transform
starts from the result of the previous one (or from the original, after
`use original`) and writes a file to the output directory:

  compress [QUALITY]         → compressed_<stem>.jpg
  rotate [DEGREES]           → rotated_<name>
  resize [WIDTH] [HEIGHT]    → resized_<name>
  crop LEFT TOP RIGHT BOTTOM → cropped_<name>
  grayscale                  → grayscale_<name>
  convert [FORMAT]           → <stem>.<jpeg|png|bmp|gif>

Examples:
  imgconv run photo.jpg -s 'resize 100 100' -s grayscale
  imgconv run photo.jpg --script steps.txt --json
  imgconv shell photo.jpg

Run 'imgconv gen-config' to generate a documented imgconv.toml.")]
struct Cli {
    /// Config file (default: ./imgconv.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (overrides output.dir)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load INPUT and apply steps in order, stopping at the first failure
    Run {
        /// JPEG or PNG image to start from
        input: PathBuf,
        /// One command, e.g. 'resize 100 100' (repeatable)
        #[arg(short = 's', long = "step")]
        steps: Vec<String>,
        /// File with one command per line, run after --step commands
        #[arg(long)]
        script: Option<PathBuf>,
        /// Print the artifact list as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// Read commands from stdin, one per line
    Shell {
        /// Image to load before the first prompt
        input: Option<PathBuf>,
    },
    /// Print a stock imgconv.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Run {
            input,
            steps,
            script,
            json,
        } => {
            let config = resolve_config(cli.config.as_deref(), cli.output)?;
            let mut shell = new_shell(&config);

            let mut all_steps = steps;
            if let Some(path) = script {
                let content = std::fs::read_to_string(&path)?;
                all_steps.extend(content.lines().map(str::to_string));
            }

            let mut out: Box<dyn Write> = if json {
                Box::new(io::sink())
            } else {
                Box::new(io::stdout().lock())
            };
            shell.execute(SessionCommand::Load(input), &mut out)?;
            shell.run_script(&all_steps, &mut out)?;
            drop(out);

            let artifacts = shell.session().artifacts();
            if json {
                println!("{}", serde_json::to_string_pretty(artifacts)?);
            } else {
                println!("==> Artifacts in {}", config.output.dir.display());
                output::print_history(artifacts);
            }
        }
        Command::Shell { input } => {
            let config = resolve_config(cli.config.as_deref(), cli.output)?;
            let mut shell = new_shell(&config);
            let mut out = io::stdout().lock();
            let mut err = io::stderr();

            if let Some(path) = input
                && let Err(e) = shell.execute(SessionCommand::Load(path), &mut out)
            {
                writeln!(err, "Error: {e}")?;
            }
            shell.run_interactive(io::stdin().lock(), &mut out, &mut err)?;
        }
    }

    Ok(())
}

/// Install the stderr diagnostics subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("imgconv={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load `--config` or `./imgconv.toml`, then apply `--output`.
fn resolve_config(
    explicit: Option<&Path>,
    output_dir: Option<PathBuf>,
) -> Result<ToolConfig, config::ConfigError> {
    let mut config = match explicit {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }
    Ok(config)
}

fn new_shell(config: &ToolConfig) -> Shell {
    let session = Session::new(SessionOptions::from_config(config));
    Shell::new(session, config.defaults.clone())
}
