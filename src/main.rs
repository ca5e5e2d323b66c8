use clap::Parser;
use miette::Result;
use rfqi::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
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

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(global.log_level()))
        .format_timestamp(None)
        .init();

    match cli.command {
        None => rfqi::cli::commands::run::run(Default::default(), &global),
        Some(Commands::Extract(args)) => rfqi::cli::commands::extract::run(args, &global),
        Some(Commands::Normalize(args)) => rfqi::cli::commands::normalize::run(args, &global),
        Some(Commands::Run(args)) => rfqi::cli::commands::run::run(args, &global),
        Some(Commands::Completions(args)) => rfqi::cli::commands::completions::run(args),
    }
}
