use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use tracing::{debug, info};

use accscope::{dom, inspect, serialize};
use scraper::{Html, Selector};

#[derive(Parser)]
#[command(name = "accscope")]
#[command(about = "Accessible name and role inspector for HTML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a single element of an HTML file or stdin
    Inspect {
        /// HTML file path, or '-' for stdin
        input: String,

        /// CSS selector of the element to inspect (first match wins)
        #[arg(short, long)]
        selector: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Inspect every focusable element of an HTML file or stdin
    Scan {
        /// HTML file path, or '-' for stdin
        input: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            input,
            selector,
            format,
        } => {
            info!(input = %input, selector = %selector, "inspect command");
            run_inspect(&input, &selector, &format)
        }
        Commands::Scan { input, format } => {
            info!(input = %input, "scan command");
            run_scan(&input, &format)
        }
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
    }
}

fn run_inspect(input: &str, selector: &str, format: &str) -> Result<()> {
    let html = read_input(input)?;
    let document = Html::parse_document(&html);
    debug!(html_len = html.len(), "parsed document");

    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(err) => bail!("invalid selector '{selector}': {err}"),
    };
    let Some(element) = document.select(&selector).next() else {
        bail!("no element matches the selector");
    };

    let info = inspect::inspect(&document, &element, &dom::StyleHidden);
    info!(diagnostics = info.diagnostics.len(), "inspection complete");
    let output = match format {
        "json" => serde_json::to_string_pretty(&info)?,
        _ => serialize::to_compact_text(&info),
    };
    println!("{output}");
    Ok(())
}

fn run_scan(input: &str, format: &str) -> Result<()> {
    let html = read_input(input)?;
    let document = Html::parse_document(&html);

    let infos: Vec<_> = inspect::focusable_elements(&document)
        .iter()
        .map(|element| inspect::inspect(&document, element, &dom::StyleHidden))
        .collect();
    info!(elements = infos.len(), "scan complete");

    let output = match format {
        "json" => serde_json::to_string_pretty(&infos)?,
        _ => serialize::scan_to_compact_text(&infos),
    };
    println!("{output}");
    Ok(())
}
