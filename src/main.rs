use clap::Parser;
use memokit::cli::{Cli, Commands};
use memokit::types::config::Config;
use memokit::MemoResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> MemoResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default_config()
    };

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("memokit={}", log_level)
            .parse()
            .unwrap_or_else(|_| "memokit=info".parse().expect("fallback directive is valid")),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            memokit::cli::commands::init(path)?;
        }
        Commands::Config => {
            memokit::cli::commands::config_cmd(&config, &cli.config)?;
        }
        Commands::Key { args } => {
            memokit::cli::commands::key(&args, &config)?;
        }
        Commands::Fib { n, recursive, trace } => {
            memokit::cli::commands::fib(n, recursive, trace, &config)?;
        }
        Commands::Demo => {
            memokit::cli::commands::demo(&config)?;
        }
        Commands::Version => {
            memokit::cli::commands::version();
        }
    }

    Ok(())
}
