//! Command-line interface for datagen

use anyhow::Context;
use clap::{Parser, Subcommand};
use datagen::{execute, EmitArgs, RunConfig, RunOptions};
use datagen_emitter::interrupt_token;
use datagen_producer::LocalRegistry;
use datagen_random::UNSEEDED;
use datagen_template::{DataDirs, FunctionMap};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datagen")]
#[command(about = "A streaming synthetic data generator with pluggable producers")]
#[command(long_about = None)]
struct Cli {
    /// Seed for reproducible output; -1 runs unseeded
    #[arg(long, global = true, env = "JR_SEED", allow_negative_numbers = true)]
    seed: Option<i64>,

    /// Log filter such as "info" or "datagen_emitter=debug"; defaults to RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every emitter of a YAML config file
    Run {
        /// Config file with an `emitters:` list
        #[arg(long, short = 'c', value_name = "PATH")]
        config: PathBuf,

        /// Start the emitters that are valid even if others fail to start
        #[arg(long)]
        allow_partial: bool,
    },

    /// Run a single emitter described by flags
    Emit {
        #[command(flatten)]
        args: EmitArgs,
    },

    /// Producer commands
    Producer {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Template function commands
    Function {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Named template commands
    Template {
        #[command(subcommand)]
        command: ListCommand,
    },
}

#[derive(Subcommand)]
enum ListCommand {
    /// List what is available
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Records may go to stdout, so logs go to stderr
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{level}'"))?,
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dirs = DataDirs::from_env();

    match cli.command {
        Commands::Run {
            config,
            allow_partial,
        } => {
            let run_config = RunConfig::from_file(&config)?;
            let seed = cli.seed.or(run_config.seed).unwrap_or(UNSEEDED);
            let mut options = RunOptions::new(seeded_global(seed), dirs);
            options.csv = run_config.csv;
            options.allow_partial = allow_partial || run_config.allow_partial;

            let report = execute(run_config.emitters, options, interrupt_token()).await?;
            if report.failed() > 0 {
                tracing::warn!("{} record(s) failed", report.failed());
            }
        }
        Commands::Emit { args } => {
            let seed = cli.seed.unwrap_or(UNSEEDED);
            let mut options = RunOptions::new(seeded_global(seed), dirs);
            options.csv = args.csv.clone();

            execute(vec![args.to_config()], options, interrupt_token()).await?;
        }
        Commands::Producer {
            command: ListCommand::List,
        } => list_producers(&dirs)?,
        Commands::Function {
            command: ListCommand::List,
        } => list_functions(),
        Commands::Template {
            command: ListCommand::List,
        } => {
            for name in dirs.list_templates().context("Failed to list templates")? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn seeded_global(seed: i64) -> datagen_random::RandomSource {
    datagen_random::set_global_seed(seed);
    if seed > UNSEEDED {
        tracing::info!("Using seed {}", seed);
    }
    datagen_random::global()
}

fn list_producers(dirs: &DataDirs) -> anyhow::Result<()> {
    println!("Local producers:");
    for name in LocalRegistry::global().names() {
        println!("  {name}");
    }

    println!("Plugin configurations:");
    for dir in dirs.plugins_dirs() {
        if !dir.is_dir() {
            continue;
        }
        let entries =
            std::fs::read_dir(&dir).with_context(|| format!("Failed to read {dir:?}"))?;
        for entry in entries {
            let path = entry?.path();
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if let Some(plugin) = file_name.strip_suffix(datagen_producer::pool::PLUGIN_CONFIG_SUFFIX) {
                println!("  {plugin} ({})", path.display());
            }
        }
    }
    Ok(())
}

fn list_functions() {
    for def in FunctionMap::builtin().iter() {
        println!("{:<26} args: {:<8} {}", def.name, def.arity.to_string(), def.description);
    }
}
