use clap::Parser;
use hangar::cli::{Cli, Commands};
use hangar::core::config::Config;
use hangar::core::logging;
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
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
    let global = cli.global;

    // Logging follows the project config when there is one
    let project = hangar::cli::commands::utils::locate_project(&global).ok();
    let config = Config::load(project.as_ref());
    logging::init_tracing(config.log_level.as_deref(), global.verbose, global.quiet);

    match cli.command {
        Commands::Init(args) => hangar::cli::commands::init::run(args, &global),
        Commands::Aircraft(cmd) => hangar::cli::commands::aircraft::run(cmd, &global),
        Commands::Part(cmd) => hangar::cli::commands::part::run(cmd, &global),
        Commands::Stage(cmd) => hangar::cli::commands::stage::run(cmd, &global),
        Commands::Test(cmd) => hangar::cli::commands::test::run(cmd, &global),
        Commands::Report(args) => hangar::cli::commands::report::run(args, &global),
        Commands::Status(args) => hangar::cli::commands::status::run(args, &global),
        Commands::Team(cmd) => cmd.run(&global),
        Commands::Completions(args) => hangar::cli::commands::completions::run(args),
    }
}
