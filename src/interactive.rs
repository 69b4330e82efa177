//! Interactive mode: the list screen and the per-item detail screen.

use crate::cli::OutputFormat;
use crate::detail::{DetailController, DetailResult};
use crate::error::{Result, ValidationError, WishlistError};
use crate::image;
use crate::list::ApplyOutcome;
use crate::operations::{Session, WishlistOperations};
use crate::utils::{self, format_money, success, warning};
use colored::*;
use dialoguer::{Confirm, Input};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::time::{Duration, Instant};

/// Two presses of Ctrl-C within this window leave the shell.
const EXIT_PRESS_WINDOW: Duration = Duration::from_secs(2);

/// What the detail loop asks the list loop to do next.
enum DetailExit {
    Closed(DetailResult),
    Quit(DetailResult),
}

/// Interactive wishlist shell.
pub struct InteractiveWishlist {
    operations: WishlistOperations,
    session: Session,
    editor: DefaultEditor,
    last_interrupt: Option<Instant>,
}

impl InteractiveWishlist {
    /// Open the store and load the list.
    pub fn new(operations: WishlistOperations) -> Result<Self> {
        let session = operations.open_session()?;
        let editor = DefaultEditor::new()
            .map_err(|_| WishlistError::Other("Failed to create editor".to_string()))?;

        Ok(Self {
            operations,
            session,
            editor,
            last_interrupt: None,
        })
    }

    /// Run the list screen until the user exits.
    pub fn run(&mut self) -> Result<()> {
        self.print_welcome();
        self.operations.report_load_problems(&self.session);
        self.show_list()?;

        loop {
            let prompt = format!("{} ", "wishlist>".cyan());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    self.last_interrupt = None;
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    match self.execute_command(line) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("{} {}", "Error:".red(), e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    if self.confirm_exit_press() {
                        break;
                    }
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        self.pause()
    }

    /// Execute a list-screen command. Returns false to leave the shell.
    fn execute_command(&mut self, input: &str) -> Result<bool> {
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts[0] {
            "help" | "?" => self.show_help(),
            "list" | "ls" => self.show_list()?,
            "add" | "new" => self.add_item()?,
            "open" | "show" => match parts.get(1) {
                Some(position) => return self.open_item(position),
                None => eprintln!("Usage: open <position>"),
            },
            "clear" => utils::clear_screen(),
            "exit" | "quit" => return Ok(false),
            other => {
                // A bare number opens that item.
                if other.chars().all(|c| c.is_ascii_digit()) {
                    return self.open_item(other);
                }
                eprintln!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    other
                );
            }
        }
        Ok(true)
    }

    fn show_help(&self) {
        println!("\n{}", "Wishlist:".bold());
        println!("  {}          - Show this help", "help".cyan());
        println!("  {}          - Show all wishes", "list".cyan());
        println!("  {}           - Add a new wish", "add".cyan());
        println!("  {} <n>      - Open wish number n", "open".cyan());
        println!("  {}         - Clear screen", "clear".cyan());
        println!("  {}          - Save and quit", "exit".cyan());
        println!("\n{}", "Inside a wish:".bold());
        println!("  {} [amount] - Put money toward it", "deposit".cyan());
        println!("  {}        - Remove it (asks first)", "delete".cyan());
        println!("  {}          - Back to the list", "back".cyan());
        println!();
    }

    fn show_list(&self) -> Result<()> {
        self.operations
            .print_list(self.session.list.wishlist(), OutputFormat::Text)?;
        println!("  {}", "+ add a wish (type 'add')".dimmed());
        Ok(())
    }

    /// The add dialog.
    fn add_item(&mut self) -> Result<()> {
        let name: String = Input::new()
            .with_prompt("Name")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| WishlistError::Other(e.to_string()))?;
        let price: String = Input::new()
            .with_prompt(format!("Price ({})", self.operations.currency()))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| WishlistError::Other(e.to_string()))?;
        let image_path: String = Input::new()
            .with_prompt("Image path (optional)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| WishlistError::Other(e.to_string()))?;

        if name.trim().is_empty() || price.trim().is_empty() {
            warning("Please fill all info");
            return Ok(());
        }

        let image_uri = if image_path.trim().is_empty() {
            None
        } else {
            match image::acquire(&image_path) {
                Ok(uri) => Some(uri),
                Err(e) => {
                    warning(&format!("{e}; adding without a picture"));
                    None
                }
            }
        };

        self.session.list.add_item(&name, &price, image_uri)?;
        success("Wish Added!");
        self.show_list()
    }

    /// Open the detail screen. Returns false if the user quit from inside it.
    fn open_item(&mut self, position: &str) -> Result<bool> {
        let index = utils::parse_position(position)?;
        let handoff = self.session.list.open_detail_at(index)?;
        let detail = DetailController::open(handoff);

        let (result, keep_going) = match self.run_detail(detail)? {
            DetailExit::Closed(result) => (result, true),
            DetailExit::Quit(result) => (result, false),
        };

        match self.session.list.apply_detail_result(result)? {
            ApplyOutcome::Deleted => success("Item deleted"),
            ApplyOutcome::Updated => success("Progress saved"),
            ApplyOutcome::Stale => warning("That wish is gone; nothing was changed"),
        }

        if keep_going {
            self.show_list()?;
        }
        Ok(keep_going)
    }

    /// The detail screen loop. Always ends with exactly one result.
    fn run_detail(&mut self, mut detail: DetailController) -> Result<DetailExit> {
        self.operations.print_detail(&detail, OutputFormat::Text)?;

        loop {
            let prompt = format!("{} ", format!("wishlist/{}>", detail.name()).as_str().cyan());
            let line = match self.editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("\nUse 'back' to return to the list");
                    continue;
                }
                Err(ReadlineError::Eof) => return Ok(DetailExit::Closed(detail.close())),
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    return Ok(DetailExit::Quit(detail.close()));
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let _ = self.editor.add_history_entry(line);
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts[0] {
                "deposit" | "d" | "water" => {
                    if let Err(e) = self.deposit(&mut detail, parts.get(1).copied()) {
                        eprintln!("{} {}", "Error:".red(), e);
                    }
                }
                "delete" | "rm" => {
                    let request = detail.request_delete();
                    let confirmed = Confirm::new()
                        .with_prompt(format!("Delete '{}'? This cannot be undone", detail.name()))
                        .default(false)
                        .interact()
                        .unwrap_or_else(|e| {
                            eprintln!("{} {}", "Error:".red(), e);
                            false
                        });
                    if confirmed {
                        return Ok(DetailExit::Closed(detail.confirm_delete(request)));
                    }
                    println!("Cancelled");
                }
                "show" | "info" => {
                    if let Err(e) = self.operations.print_detail(&detail, OutputFormat::Text) {
                        eprintln!("{} {}", "Error:".red(), e);
                    }
                }
                "back" | "b" | "close" => return Ok(DetailExit::Closed(detail.close())),
                "exit" | "quit" => return Ok(DetailExit::Quit(detail.close())),
                "help" | "?" => self.show_help(),
                other => eprintln!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    other
                ),
            }
        }
    }

    /// The deposit dialog.
    fn deposit(&self, detail: &mut DetailController, amount: Option<&str>) -> Result<()> {
        if !detail.can_deposit() {
            return Err(ValidationError::AlreadyComplete.into());
        }

        let amount = match amount {
            Some(text) => text.to_string(),
            None => Input::new()
                .with_prompt(format!(
                    "Amount (remaining {})",
                    format_money(self.operations.currency(), detail.remaining())
                ))
                .allow_empty(true)
                .interact_text()
                .map_err(|e| WishlistError::Other(e.to_string()))?,
        };

        let was_complete = detail.is_complete();
        detail.deposit_text(&amount)?;
        self.operations.print_detail(detail, OutputFormat::Text)?;
        if detail.is_complete() && !was_complete {
            success("Completed!");
        }
        Ok(())
    }

    /// First Ctrl-C warns, a second one within the window exits.
    fn confirm_exit_press(&mut self) -> bool {
        let now = Instant::now();
        match self.last_interrupt {
            Some(previous) if now.duration_since(previous) <= EXIT_PRESS_WINDOW => true,
            _ => {
                println!("\nPress again to exit");
                self.last_interrupt = Some(now);
                false
            }
        }
    }

    fn print_welcome(&self) {
        println!("\n{}", "Wishlist".bold().cyan());
        println!("Type 'help' for available commands");
        println!(
            "Store: {}\n",
            self.operations.settings().store_path.display()
        );
    }

    /// Save before leaving.
    fn pause(&mut self) -> Result<()> {
        self.session.list.pause()
    }
}
