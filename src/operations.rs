//! Shared operations between CLI and interactive modes.

use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::detail::DetailController;
use crate::error::{Result, WishlistError};
use crate::image;
use crate::list::{LoadReport, ListController};
use crate::models::{Tier, WishItem, Wishlist};
use crate::store::FileStore;
use crate::utils::{self, format_money};
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

/// Width of the inline bar on list cards.
const CARD_BAR_WIDTH: usize = 10;

/// A loaded list ready for use.
pub struct Session {
    pub list: ListController<FileStore>,
    pub report: LoadReport,
    /// Where an unreadable snapshot was copied before starting empty.
    pub recovered_to: Option<PathBuf>,
}

/// Shared operations for wishlist management.
pub struct WishlistOperations {
    settings: Settings,
}

impl WishlistOperations {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    /// Open the store and load the list.
    ///
    /// A corrupt snapshot is copied aside to a timestamped file and the session starts
    /// empty, so the next save cannot destroy the only copy.
    pub fn open_session(&self) -> Result<Session> {
        let store = FileStore::open(&self.settings.store_path)?;
        let mut list = ListController::new(store);

        match list.load() {
            Ok(report) => Ok(Session {
                list,
                report,
                recovered_to: None,
            }),
            Err(WishlistError::CorruptSnapshot(reason)) => {
                let raw = list.stored_snapshot()?.unwrap_or_default();
                let backup = preserve_corrupt_snapshot(&self.settings.store_path, &raw)?;
                log::warn!(
                    "Stored wishlist unreadable ({reason}); copied to {}",
                    backup.display()
                );
                Ok(Session {
                    list,
                    report: LoadReport::default(),
                    recovered_to: Some(backup),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Tell the user about anything lost while loading.
    ///
    /// Goes to stderr so JSON output on stdout stays parseable.
    pub fn report_load_problems(&self, session: &Session) {
        if let Some(path) = &session.recovered_to {
            eprintln!(
                "{} Saved wishlist could not be read. A copy was kept at {}",
                "Warning:".yellow(),
                path.display()
            );
        }
        for skipped in &session.report.skipped {
            eprintln!(
                "{} Stored item {} could not be restored: {}",
                "Warning:".yellow(),
                skipped.index + 1,
                skipped.reason
            );
        }
    }

    /// Print the list screen.
    pub fn print_list(&self, wishlist: &Wishlist, format: OutputFormat) -> Result<()> {
        let items = wishlist.items();
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&self.list_json(items))?);
            }
            OutputFormat::Text => {
                if items.is_empty() {
                    println!("No wishes yet");
                } else {
                    println!("\n{}", "My Wishlist".bold());
                    for line in self.card_lines(items) {
                        println!("  {line}");
                    }
                    println!(
                        "\n  {} {} / {}",
                        "Saved:".bold(),
                        format_money(self.currency(), wishlist.total_saved()),
                        format_money(self.currency(), wishlist.total_price())
                    );
                }
            }
        }
        Ok(())
    }

    /// One line per item card, in list order with 1-based positions.
    pub fn card_lines(&self, items: &[WishItem]) -> Vec<String> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let progress = item.progress();
                let picture = match item.image_uri.as_deref() {
                    Some(uri) if image::is_available(uri) => "▣",
                    Some(_) => "▨",
                    None => "□",
                };
                format!(
                    "{:>2}. {} {}  {}  {} {:>5.1}%",
                    index + 1,
                    picture,
                    item.name.as_str().bold(),
                    format_money(self.currency(), item.price),
                    tier_color(progress.tier, &utils::progress_bar(progress.percentage, CARD_BAR_WIDTH)),
                    progress.percentage
                )
            })
            .collect()
    }

    /// Print the detail screen for one item.
    pub fn print_detail(&self, detail: &DetailController, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&self.detail_json(detail))?);
            }
            OutputFormat::Text => {
                let tier = detail.tier();
                println!("\n{}", "=".repeat(40));
                println!("{}", detail.name().bold());
                if let Some(uri) = detail.image_uri() {
                    println!("{}: {}", "Image".bold(), uri);
                }
                println!("{}", "=".repeat(40));
                println!("{}{}", "Price: ".bold(), format_money(self.currency(), detail.price()));
                println!(
                    "{}{}",
                    "Saved: ".bold(),
                    format_money(self.currency(), detail.saved_amount())
                );
                println!(
                    "{}{}",
                    "Remaining: ".bold(),
                    format_money(self.currency(), detail.remaining())
                );
                self.show_progress(detail.percentage(), tier);
                println!("{}: {}", "Stage".bold(), tier_color(tier, tier.label()));
                if detail.can_deposit() {
                    println!("{}", "[deposit] available".cyan());
                } else {
                    println!("{}", "[completed]".green().bold());
                }
                println!("{}", "=".repeat(40));
            }
        }
        Ok(())
    }

    /// Draw the progress bar, animated on a terminal and plain otherwise.
    fn show_progress(&self, percentage: f64, tier: Tier) {
        if utils::is_interactive_terminal() {
            let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stdout());
            let style = ProgressStyle::with_template("{bar:30.green/white} {pos:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░");
            bar.set_style(style);
            bar.set_position(percentage.clamp(0.0, 100.0).floor() as u64);
            bar.abandon();
        } else {
            println!(
                "{} {:.1}%",
                tier_color(tier, &utils::progress_bar(percentage, 30)),
                percentage
            );
        }
    }

    pub fn list_json(&self, items: &[WishItem]) -> serde_json::Value {
        let entries: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let progress = item.progress();
                serde_json::json!({
                    "position": index + 1,
                    "id": item.id,
                    "name": item.name,
                    "price": item.price,
                    "savedAmount": item.saved_amount,
                    "remaining": item.remaining(),
                    "percentage": progress.percentage,
                    "tier": progress.tier,
                    "imageUri": item.image_uri,
                })
            })
            .collect();

        serde_json::json!({
            "currency": self.currency(),
            "count": entries.len(),
            "items": entries,
        })
    }

    pub fn detail_json(&self, detail: &DetailController) -> serde_json::Value {
        serde_json::json!({
            "position": detail.position() + 1,
            "id": detail.item_id(),
            "name": detail.name(),
            "currency": self.currency(),
            "price": detail.price(),
            "savedAmount": detail.saved_amount(),
            "remaining": detail.remaining(),
            "percentage": detail.percentage(),
            "tier": detail.tier(),
            "canDeposit": detail.can_deposit(),
            "imageUri": detail.image_uri(),
        })
    }
}

fn tier_color(tier: Tier, text: &str) -> ColoredString {
    match tier {
        Tier::Low => text.yellow(),
        Tier::Mid => text.cyan(),
        Tier::Complete => text.green(),
    }
}

/// Copy unreadable snapshot text next to the store file.
///
/// An earlier copy with the same content is reused instead of writing another one.
pub fn preserve_corrupt_snapshot(store_path: &Path, raw: &str) -> Result<PathBuf> {
    let file_name = store_path
        .file_name()
        .ok_or_else(|| WishlistError::Other("Invalid store file name".to_string()))?
        .to_string_lossy()
        .into_owned();
    let prefix = format!("{file_name}.corrupt-");

    if let Some(existing) = find_corrupt_copy(store_path, &prefix, raw) {
        log::debug!("Corrupt snapshot already kept at {}", existing.display());
        return Ok(existing);
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = store_path.with_file_name(format!("{prefix}{timestamp}"));
    fs::write(&backup_path, raw)?;
    Ok(backup_path)
}

fn find_corrupt_copy(store_path: &Path, prefix: &str, raw: &str) -> Option<PathBuf> {
    let dir = match store_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
        })
        .find(|path| fs::read_to_string(path).map(|c| c == raw).unwrap_or(false))
}
