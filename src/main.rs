//! Console host for the Crier wiring engine.

mod cli;
mod console;

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::rc::Rc;

use anyhow::Context;
use serde_json::json;
use tracing::{error, info};

use cli::Cli;
use console::{ConsoleAdapter, ConsoleOutput, Notebook, SystemCommands};
use crier::adapter::Caller;
use crier::commands::split_line;
use crier::config::Config;
use crier::hub::Hub;
use crier::logging;

fn main() {
    let cli = Cli::parse_args();
    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // CLI arguments override the config file.
    let prefix = cli.prefix.unwrap_or(config.console.prefix);
    let caller = Caller::new(0, cli.user.unwrap_or(config.console.user));

    let adapter = Rc::new(RefCell::new(ConsoleAdapter::new()));
    let output = Rc::new(RefCell::new(ConsoleOutput));
    let mut hub = Hub::new(adapter.clone(), output);

    hub.declare::<SystemCommands>()?;
    hub.declare::<Notebook>()?;

    let help = hub.help_text();
    let system = hub.bind(SystemCommands::new(help))?;
    hub.bind(Notebook::default())?;

    adapter
        .borrow()
        .fire("console:ready", &json!({ "user": caller.name }));

    let reader: Box<dyn BufRead> = match cli.script.as_deref() {
        Some(path) if path != "-" => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open script {path}"))?,
        )),
        _ => Box::new(BufReader::new(io::stdin())),
    };

    for line in reader.lines() {
        let line = line.context("failed to read input line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(&prefix) {
            if let Some((name, args)) = split_line(rest) {
                let known = adapter.borrow_mut().deliver_command(&caller, &name, &args);
                if !known && config.console.unknown_hint {
                    println!("Unknown command: {prefix}{name} (try {prefix}help)");
                }
            }
        } else {
            adapter.borrow().fire("console:line", &json!(line));
        }

        if system.borrow().quit_requested() {
            break;
        }
    }

    info!(
        lines = system.borrow().lines_seen(),
        "session finished"
    );
    Ok(())
}
