use clap::Parser;
use login_suite::cli::commands::{cmd_accounts, cmd_list, cmd_run};
use login_suite::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            spec,
            browser,
            format,
            output,
            webdriver_url,
            headless,
        } => {
            let all_passed = cmd_run(
                &config,
                spec.as_deref(),
                &browser,
                format.as_deref(),
                output.as_deref(),
                webdriver_url.as_deref(),
                headless,
            )?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::List { spec } => cmd_list(spec.as_deref())?,
        Commands::Accounts => cmd_accounts(),
    }

    Ok(())
}

/// RUST_LOG wins; otherwise -v raises the level from warn.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
