//! Surge Sim - surge-staffing stakeholder interview simulator
//!
//! Entry point for the `surge-sim` binary. Serves the HTTP API, runs the
//! terminal interview, and manages configuration and persona files.

mod cli;
mod config;
mod dialogue;
mod error;
mod logging;
mod persona;
mod repl;
mod server;
mod session;
mod version;

use std::io;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonaSubcommand};
use crate::config::SimConfig;
use crate::dialogue::DialogueEngine;
use crate::error::{Error, Result};
use crate::persona::{PersonaCatalog, PersonaId};
use crate::repl::Repl;
use crate::session::SessionStore;

fn main() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Persona { config, subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            let cfg = load_config_or_exit(config.as_deref());
            handle_persona_command(&cfg, subcommand).unwrap_or_else(|e| exit_with(e));
            Ok(())
        }
        Commands::Serve { config, host, port } => {
            let mut cfg = load_config_or_exit(config.as_deref());
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if let Err(e) = cfg.validate() {
                exit_with(e);
            }

            let _log_guards = logging::init_logging(&cfg.logging, cli.verbose, cli.quiet)?;
            run_server(cfg)
        }
        Commands::Play {
            config,
            seed,
            persona,
        } => {
            let cfg = load_config_or_exit(config.as_deref());

            // Keep the conversation readable unless asked for more.
            let mut log_settings = cfg.logging.clone();
            if cli.verbose == 0 {
                log_settings.level = "warn".to_string();
            }
            let _log_guards = logging::init_logging(&log_settings, cli.verbose, cli.quiet)?;

            run_play(&cfg, seed, &persona).unwrap_or_else(|e| exit_with(e));
            Ok(())
        }
    }
}

/// Load configuration, printing a formatted error and exiting on failure
fn load_config_or_exit(path: Option<&str>) -> SimConfig {
    match SimConfig::load(path) {
        Ok(cfg) => cfg,
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: Error) -> ! {
    eprint!("{}", e.format_for_terminal());
    std::process::exit(e.exit_code());
}

/// Build the shared engine from configuration
fn build_engine(config: &SimConfig) -> Result<DialogueEngine> {
    let catalog = Arc::new(PersonaCatalog::new(config.personas.dir()));
    catalog.preload()?;
    let sessions = Arc::new(SessionStore::new(config.session.clone()));
    Ok(DialogueEngine::new(catalog, sessions))
}

/// Run the HTTP API until Ctrl-C
fn run_server(config: SimConfig) -> Result<()> {
    let build = version::build_info();
    info!(
        version = %build.full_version(),
        profile = %build.profile,
        "Starting surge-sim"
    );
    info!(
        time_limit_secs = config.session.time_limit_secs,
        patience_finance = config.session.patience_finance,
        patience_clinical = config.session.patience_clinical,
        patience_operations = config.session.patience_operations,
        persona_dir = ?config.personas.dir,
        "Session defaults configured"
    );

    let engine = build_engine(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("surge-sim")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(server::serve(&config.bind_addr(), engine))
}

/// Run an interview over stdin/stdout
fn run_play(config: &SimConfig, seed: Option<i64>, persona: &str) -> Result<()> {
    let engine = build_engine(config)?;
    let seed = seed.unwrap_or(config.session.default_seed);

    let mut repl = Repl::start(engine, seed, persona)?;
    info!(session_id = %repl.session_id(), seed, "Interview started");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl.run(stdin.lock(), &mut stdout)
}

/// Handle persona subcommands
fn handle_persona_command(config: &SimConfig, subcommand: PersonaSubcommand) -> Result<()> {
    let catalog = PersonaCatalog::new(config.personas.dir());

    match subcommand {
        PersonaSubcommand::List => {
            println!("Personas:");
            println!();
            for (id, persona) in catalog.list()? {
                println!(
                    "  {:<12} {} - {} ({})",
                    id.slug(),
                    persona.identity.name,
                    persona.identity.role,
                    persona.identity.temperament
                );
            }
            println!();
            match catalog.persona_dir() {
                Some(dir) => println!("Overrides: {}", dir.display()),
                None => println!("Using bundled definitions."),
            }
        }
        PersonaSubcommand::Show { persona } => {
            let id: PersonaId = persona
                .parse()
                .map_err(|_| Error::persona_not_found(&persona))?;
            let p = catalog.load(id)?;

            println!("{}", id.display_name());
            println!("  Name:        {}", p.identity.name);
            println!("  Role:        {}", p.identity.role);
            println!("  Temperament: {}", p.identity.temperament);
            if !p.style.is_empty() {
                println!();
                println!("Style:");
                for (key, value) in &p.style {
                    println!("  {}: {}", key, value);
                }
            }
            println!();
            println!("Objectives:");
            for o in &p.objectives {
                println!("  - {} [{}]", o.text, o.citation.as_deref().unwrap_or("-"));
            }
            println!();
            println!("Constraints:");
            for c in &p.constraints {
                println!(
                    "  - ({}) {} [{}]",
                    c.kind,
                    c.text,
                    c.citation.as_deref().unwrap_or("-")
                );
            }
        }
        PersonaSubcommand::Export { dir, force } => {
            let written = catalog.export(&dir, force)?;
            if written.is_empty() {
                println!(
                    "All persona files already exist in {}. Use --force to overwrite.",
                    dir.display()
                );
            }
            for path in written {
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = SimConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => match SimConfig::load(config.as_deref()) {
            Ok(_) => {
                println!("Configuration is valid.");
            }
            Err(e) => exit_with(e),
        },
    }

    Ok(())
}
