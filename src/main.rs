use clap::Parser;
use miette::Result;
use rbt::cli::commands;
use rbt::cli::{Cli, Commands};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to stderr; `RBT_LOG` overrides the level chosen by `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "rbt=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RBT_LOG").unwrap_or_else(|_| default_level.into());

    // A subscriber may already be installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let global = &cli.global;

    match cli.command {
        Commands::Init(args) => commands::init::run(args, global),
        Commands::List(args) => commands::list::run(args, global),
        Commands::Show(args) => commands::show::run(args, global),
        Commands::Update(args) => commands::update::run(args, global),
        Commands::Import(args) => commands::import::run(args, global),
        Commands::Pull => commands::sync::run_pull(global),
        Commands::Push => commands::sync::run_push(global),
        Commands::Machines(args) => commands::machines::run(args, global),
        Commands::Summary => commands::summary::run(global),
        Commands::Scopes(args) => commands::scopes::run(args, global),
        Commands::Clear(args) => commands::clear::run(args, global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
