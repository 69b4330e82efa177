//! Main entry point for wishlist.

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env};
use wishlist::cli::Cli;
use wishlist::interactive::InteractiveWishlist;
use wishlist::operations::WishlistOperations;
use wishlist::utils::{self, error_exit};

const ENV_LOG: &str = "WISHLIST_LOG";
const ENV_LOG_STYLE: &str = "WISHLIST_LOG_STYLE";

fn main() {
    // Setup logging from the env variables, with defaults.
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "warn")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let outcome = if cli.command.is_some() {
        cli.execute().context("Command failed")
    } else {
        run_interactive(&cli)
    };

    if let Err(e) = outcome {
        error_exit(&format!("{e:#}"), 1);
    }
}

/// Run the two-screen shell when no subcommand is given.
fn run_interactive(cli: &Cli) -> anyhow::Result<()> {
    if !utils::is_interactive_terminal() {
        anyhow::bail!("Interactive mode needs a terminal. Run 'wishlist --help' for commands.");
    }

    let settings = cli.settings();
    let store_path = settings.store_path.clone();
    let mut shell = InteractiveWishlist::new(WishlistOperations::new(settings))
        .with_context(|| format!("Failed to open {}", store_path.display()))?;
    shell.run().context("Failed to save wishlist")?;
    Ok(())
}
