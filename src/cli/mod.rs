use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::heatmap::layout::Rectf;
use crate::heatmap::render::{plan_frame, RenderOptions};
use crate::services::quotes::{save_snapshot, QuoteClient};
use crate::services::{data_loader, load_market, DataSource};
use crate::tui;
use crate::types::MarketData;

/// Stock market heatmap for the terminal
#[derive(Parser)]
#[command(name = "marketmap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui {
        /// Load a snapshot file instead of the configured endpoint
        #[arg(long)]
        file: Option<PathBuf>,

        /// Use the built-in demo dataset
        #[arg(long)]
        demo: bool,

        /// Start without sector grouping
        #[arg(long)]
        flat: bool,
    },

    /// Compute a layout and print it without entering the TUI
    Layout {
        /// Load a snapshot file instead of the configured endpoint
        #[arg(long)]
        file: Option<PathBuf>,

        /// Layout width in cells
        #[arg(long, default_value_t = 160)]
        width: u32,

        /// Layout height in cells
        #[arg(long, default_value_t = 48)]
        height: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a snapshot from the endpoint and store it in the cache
    Fetch {
        /// Endpoint URL (defaults to MARKETMAP_API_URL)
        #[arg(long)]
        url: Option<String>,
    },
}

/// Row of the `layout` command output.
#[derive(Serialize)]
struct LayoutRow {
    symbol: String,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    change_percent: f64,
}

fn source_from(file: Option<PathBuf>, demo: bool) -> DataSource {
    match (file, demo) {
        (Some(path), _) => DataSource::File(path),
        (None, true) => DataSource::Demo,
        (None, false) => DataSource::Auto,
    }
}

fn layout_rows(data: &MarketData, width: u32, height: u32) -> Vec<LayoutRow> {
    let rect = Rectf::new(0.0, 0.0, width as f64, height as f64);
    let plan = plan_frame(&data.stocks, None, rect, &RenderOptions::default());
    plan.cells
        .iter()
        .map(|cell| LayoutRow {
            symbol: data.stocks[cell.stock].symbol.clone(),
            x: cell.rect.x,
            y: cell.rect.y,
            w: cell.rect.w,
            h: cell.rect.h,
            change_percent: data.stocks[cell.stock].change_percent,
        })
        .collect()
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            None => tui::app::run(DataSource::Auto, true),
            Some(Commands::Tui { file, demo, flat }) => {
                tui::app::run(source_from(file, demo), !flat)
            }
            Some(Commands::Layout {
                file,
                width,
                height,
                json,
            }) => {
                let source = source_from(file, false);
                let data = load_market(&source)?;
                let rows = layout_rows(&data, width, height);
                if json {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                } else {
                    for row in &rows {
                        println!(
                            "{:<8} {:>7.1} {:>6.1} {:>7.1} {:>6.1} {:>+7.2}%",
                            row.symbol, row.x, row.y, row.w, row.h, row.change_percent
                        );
                    }
                }
                Ok(())
            }
            Some(Commands::Fetch { url }) => {
                let client = match url {
                    Some(url) => QuoteClient::new(url, std::env::var("MARKETMAP_API_TOKEN").ok()),
                    None => QuoteClient::from_env()?,
                };
                let quotes = client.fetch_snapshot()?;
                let dir = data_loader::cache_dir()?;
                let path = save_snapshot(&dir, &quotes)?;
                println!("Fetched {} quotes -> {}", quotes.len(), path.display());
                Ok(())
            }
        }
    }
}
