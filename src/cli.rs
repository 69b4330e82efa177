//! Command-line interface implementation.

use crate::config::Settings;
use crate::detail::DetailController;
use crate::error::{Result, WishlistError};
use crate::image;
use crate::list::ApplyOutcome;
use crate::operations::WishlistOperations;
use crate::utils::{self, format_money, success};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use std::path::PathBuf;

/// Keep track of what you are saving for.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the store file
    #[arg(
        short = 'f',
        long,
        global = true,
        env = "WISHLIST_FILE",
        help = "Path to the store file (default: platform data dir)"
    )]
    pub file: Option<PathBuf>,

    /// Currency prefix
    #[arg(long, global = true, env = "WISHLIST_CURRENCY", help = "Currency prefix for amounts")]
    pub currency: Option<String>,

    /// Output format
    #[arg(
        short = 'o',
        long,
        global = true,
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show all wishes
    List,

    /// Add a new wish
    Add {
        /// What you are saving for
        name: String,

        /// Target price
        price: String,

        /// Picture of the item
        #[arg(short, long)]
        image: Option<String>,
    },

    /// Show one wish
    Show {
        /// Position in the list, starting at 1
        position: String,
    },

    /// Put money toward a wish
    Deposit {
        /// Position in the list, starting at 1
        position: String,

        /// Amount to deposit
        amount: String,
    },

    /// Remove a wish
    Delete {
        /// Position in the list, starting at 1
        position: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the stored snapshot
    Export,

    /// Print the store file location
    Path,
}

impl Cli {
    /// Settings for this invocation.
    pub fn settings(&self) -> Settings {
        Settings::resolve(self.file.clone(), self.currency.clone())
    }

    /// Execute the CLI command. Without a subcommand there is nothing to do here.
    pub fn execute(&self) -> Result<()> {
        let Some(command) = &self.command else {
            return Ok(());
        };
        let operations = WishlistOperations::new(self.settings());

        match command {
            Commands::List => self.list(&operations),
            Commands::Add { name, price, image } => {
                self.add(&operations, name, price, image.as_deref())
            }
            Commands::Show { position } => self.show(&operations, position),
            Commands::Deposit { position, amount } => self.deposit(&operations, position, amount),
            Commands::Delete { position, yes } => self.delete(&operations, position, *yes),
            Commands::Export => self.export(&operations),
            Commands::Path => {
                println!("{}", operations.settings().store_path.display());
                Ok(())
            }
        }
    }

    fn list(&self, operations: &WishlistOperations) -> Result<()> {
        let session = operations.open_session()?;
        operations.report_load_problems(&session);
        operations.print_list(session.list.wishlist(), self.output)
    }

    fn add(
        &self,
        operations: &WishlistOperations,
        name: &str,
        price: &str,
        image: Option<&str>,
    ) -> Result<()> {
        let image_uri = image.map(image::acquire).transpose()?;

        let mut session = operations.open_session()?;
        operations.report_load_problems(&session);
        let id = session.list.add_item(name, price, image_uri)?;

        let position = session.list.wishlist().position(id).unwrap_or(0) + 1;
        match self.output {
            OutputFormat::Text => success(&format!("Wish added at position {position}")),
            OutputFormat::Json => {
                let json = serde_json::json!({ "id": id, "position": position });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Ok(())
    }

    fn show(&self, operations: &WishlistOperations, position: &str) -> Result<()> {
        let index = utils::parse_position(position)?;
        let session = operations.open_session()?;
        operations.report_load_problems(&session);

        let detail = DetailController::open(session.list.open_detail_at(index)?);
        operations.print_detail(&detail, self.output)
    }

    fn deposit(&self, operations: &WishlistOperations, position: &str, amount: &str) -> Result<()> {
        let index = utils::parse_position(position)?;
        let mut session = operations.open_session()?;
        operations.report_load_problems(&session);

        let mut detail = DetailController::open(session.list.open_detail_at(index)?);
        detail.deposit_text(amount)?;

        let outcome = session.list.apply_detail_result(detail.clone().close())?;
        debug_assert_eq!(outcome, ApplyOutcome::Updated);

        match self.output {
            OutputFormat::Text => {
                success(&format!(
                    "Saved {} of {} toward {}",
                    format_money(operations.currency(), detail.saved_amount()),
                    format_money(operations.currency(), detail.price()),
                    detail.name()
                ));
                if detail.is_complete() {
                    success("Completed!");
                }
            }
            OutputFormat::Json => operations.print_detail(&detail, self.output)?,
        }
        Ok(())
    }

    fn delete(&self, operations: &WishlistOperations, position: &str, yes: bool) -> Result<()> {
        let index = utils::parse_position(position)?;
        let mut session = operations.open_session()?;
        operations.report_load_problems(&session);

        let detail = DetailController::open(session.list.open_detail_at(index)?);
        let request = detail.request_delete();

        if !yes {
            if !utils::is_interactive_terminal() {
                return Err(WishlistError::Other(
                    "Refusing to delete without confirmation; pass --yes".to_string(),
                ));
            }
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete '{}'?", detail.name()))
                .default(false)
                .interact()
                .map_err(|e| WishlistError::Other(e.to_string()))?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        let name = detail.name().to_string();
        session.list.apply_detail_result(detail.confirm_delete(request))?;
        success(&format!("Deleted: {name}"));
        Ok(())
    }

    fn export(&self, operations: &WishlistOperations) -> Result<()> {
        let session = operations.open_session()?;
        let snapshot = session.list.stored_snapshot()?.unwrap_or_else(|| "[]".to_string());
        println!("{snapshot}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["wishlist", "list"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List)));

        let cli = Cli::try_parse_from(["wishlist", "add", "Headphones", "1000", "-i", "a.png"])
            .unwrap();
        match cli.command {
            Some(Commands::Add { name, price, image }) => {
                assert_eq!(name, "Headphones");
                assert_eq!(price, "1000");
                assert_eq!(image.as_deref(), Some("a.png"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = Cli::try_parse_from(["wishlist", "-o", "json", "deposit", "2", "400"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["wishlist", "-f", "w.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.file, Some(PathBuf::from("w.json")));
    }
}
