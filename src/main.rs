use anyhow::{bail, Context};
use std::path::PathBuf;

use annokit::replay::{self, ReplayScript};
use annokit::{init_logging, Config};
use annokit_core::event_bus::init_event_bus;

const USAGE: &str = "usage: annokit [--config PATH] SCRIPT.json";

struct Args {
    config: Option<PathBuf>,
    script: PathBuf,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config = None;
    let mut script = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--version" | "-V" => {
                println!("annokit {} ({})", annokit::VERSION, annokit::BUILD_DATE);
                std::process::exit(0);
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option {}\n{}", other, USAGE),
            other => {
                if script.replace(PathBuf::from(other)).is_some() {
                    bail!("only one script may be given\n{}", USAGE);
                }
            }
        }
    }

    Ok(Args {
        config,
        script: script.context(USAGE)?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    let config = Config::load_or_default(args.config.as_deref()).context("Failed to load settings")?;
    init_logging(&config.logging)?;
    tracing::info!("annokit {} starting", annokit::VERSION);

    if init_event_bus(config.events.bus_config()).is_err() {
        tracing::warn!("Event bus was already initialized");
    }

    let script = ReplayScript::from_file(&args.script)?;
    let annotations = replay::run(&script, &config, annokit::event_bus()).await?;

    let output = serde_json::to_string_pretty(&annotations).context("Failed to encode annotations")?;
    println!("{}", output);
    Ok(())
}
