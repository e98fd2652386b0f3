use anyhow::Result;
use implement::cli::{self, Cli, Commands};
use implement::commands;
use implement::config::{self, Config};

fn main() -> Result<()> {
    let cli = cli::parse_args();
    let config = resolve_config(&cli);

    cli::init_logging(cli::log_level(cli.verbosity, config.log_level.as_deref()));
    cli::configure_thread_pool(0);

    match cli.command {
        Commands::Extract {
            file,
            functions,
            all,
        } => {
            let artifacts = if all {
                commands::extract_all(&file)?
            } else {
                commands::extract_functions(&file, &functions)?
            };
            println!("{}", artifacts.join("\n\n\n"));
        }
        Commands::Generate {
            file,
            function,
            clean,
        } => {
            let config = Config {
                clean: config.clean || clean,
                ..config
            };
            let slot = commands::generate_function(&config, &file, &function)?;
            println!("{}", slot.display());
        }
        Commands::Call {
            file,
            function,
            args,
            kwargs,
        } => {
            let result = commands::call_function(&config, &file, &function, &args, &kwargs)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Commands::Clean => {
            let removed = commands::clean_cache(&config)?;
            println!(
                "Removed {} implementation(s) from {}",
                removed,
                config.cache_dir.display()
            );
        }
    }

    Ok(())
}

/// File and environment configuration with command-line flags on top
fn resolve_config(cli: &Cli) -> Config {
    let mut config = config::resolve_config();
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    config
}
