//! ce-lib-wizard CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use libwizard::sources::git::set_network_timeouts;
use libwizard::util::diagnostic;
use libwizard::util::{Config, Shell};
use libwizard::WizardError;

/// State shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
    pub config: Config,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("ce_lib_wizard=debug,libwizard=debug")
    } else {
        EnvFilter::new("ce_lib_wizard=info,libwizard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global_opts = GlobalOptions {
        shell: Shell::from_flags(false, cli.verbose, cli.no_color),
        config: Config::from_environment(),
    };

    if let Err(e) = set_network_timeouts(&global_opts.config.net) {
        tracing::warn!("{:#}", e);
    }

    if let Err(e) = run(cli.command, &global_opts) {
        match e.downcast_ref::<WizardError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), global_opts.shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(command: Commands, global_opts: &GlobalOptions) -> Result<()> {
    match command {
        Commands::Add(args) => commands::add::execute(args, global_opts),
        Commands::ResolveVersion(args) => commands::resolve_version::execute(args, global_opts),
        Commands::DetectType(args) => commands::detect_type::execute(args, global_opts),
        Commands::GoModule(args) => commands::go_module::execute(args, global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
