//! optibill CLI - currency display and sales tools for the practice back office
//!
//! ## Example Usage
//!
//! ```bash
//! # Exchange rate between two currencies
//! optibill rate USD INR
//!
//! # Switch the display currency (persisted)
//! optibill currency set EUR
//!
//! # Format an amount in the selected currency
//! optibill format 1234.5 --plus
//!
//! # Best seller per dashboard price band from an exported data file
//! optibill best-seller --data export.json --bands
//!
//! # Same, fetched from the configured API (feature `async`)
//! optibill best-seller --bands
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use optibill::analytics::{best_seller, best_sellers_by_range, revenue_by_status, PriceRange};
use optibill::api::InMemoryApi;
use optibill::config::AppConfig;
use optibill::currency::{Currency, BASE_CURRENCY};
use optibill::format::format_amount;
use optibill::fx::{RateResolver, RateTable};
use optibill::i18n::{Language, Translations};
use optibill::preferences::{PreferenceStore, Preferences};
use optibill::registry::CurrencyRegistry;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// optibill: currency display and sales tools for optical retail billing
#[derive(Parser)]
#[command(name = "optibill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Currency display and sales tools for optical retail billing", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the exchange rate between two currencies
    Rate {
        #[arg(value_name = "FROM")]
        from: String,
        #[arg(value_name = "TO")]
        to: String,
    },

    /// Convert an amount between currencies
    Convert {
        #[arg(value_name = "AMOUNT", allow_negative_numbers = true)]
        amount: f64,

        /// Source currency (default: base currency)
        #[arg(short = 'f', long)]
        from: Option<String>,

        /// Target currency (default: selected currency)
        #[arg(short = 't', long)]
        to: Option<String>,
    },

    /// Format an amount in the selected (or given) currency
    Format {
        /// Amount; anything unparsable formats as zero
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,

        #[arg(long)]
        currency: Option<String>,

        /// Prefix positive amounts with '+'
        #[arg(long)]
        plus: bool,
    },

    /// Show or change the display currency
    Currency {
        #[command(subcommand)]
        action: CurrencyAction,
    },

    /// Show or change the UI language
    Language {
        /// Language code to select (omit to show the current one)
        #[arg(value_name = "CODE")]
        code: Option<String>,
    },

    /// Best-selling product on paid invoices
    BestSeller {
        /// JSON export with `products` and `invoices`; fetched from
        /// `api_base_url` when omitted
        #[arg(short = 'd', long)]
        data: Option<PathBuf>,

        /// Lower price bound (inclusive, base currency)
        #[arg(long)]
        min: Option<f64>,

        /// Upper price bound (exclusive, base currency)
        #[arg(long)]
        max: Option<f64>,

        /// Report each dashboard price band instead
        #[arg(long)]
        bands: bool,
    },

    /// Translate a UI string key
    Translate {
        #[arg(value_name = "KEY")]
        key: String,

        /// Translation bundle, `{"en": {...}, "hi": {...}}`
        #[arg(short = 't', long)]
        table: PathBuf,

        /// Language code (default: selected language)
        #[arg(short = 'l', long)]
        lang: Option<String>,
    },
}

#[derive(Subcommand)]
enum CurrencyAction {
    /// Show the selected currency
    Get,
    /// Select a currency by ISO code
    Set {
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// List supported currencies and their rates
    List,
}

struct App {
    config: AppConfig,
    rates: Arc<RateTable>,
    store: Arc<dyn PreferenceStore>,
    verbose: bool,
}

impl App {
    fn new(config: AppConfig, verbose: bool) -> Result<Self> {
        let rates = config.rate_table().context("Failed to build rate table")?;
        let store: Arc<dyn PreferenceStore> = Arc::new(config.preference_store());
        Ok(Self {
            config,
            rates: Arc::new(rates),
            store,
            verbose,
        })
    }

    fn preferences(&self) -> Preferences {
        Preferences::load_with_defaults(self.store.as_ref(), self.config.default_preferences())
    }

    fn registry(&self) -> CurrencyRegistry {
        CurrencyRegistry::with_default_currency(
            self.rates.clone(),
            self.store.clone(),
            self.config.default_preferences().currency,
        )
    }
}

fn parse_currency(code: &str) -> Result<Currency> {
    Ok(code.parse::<Currency>()?)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref());
    if cli.verbose {
        println!(
            "{} v{}",
            "optibill".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Preferences: {}",
            config.preferences_path.display().to_string().dimmed()
        );
    }

    let result = App::new(config, cli.verbose).and_then(|app| run(&app, cli.command));

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Rate { from, to } => {
            let from = parse_currency(&from)?;
            let to = parse_currency(&to)?;
            println!("1 {} = {:.6} {}", from, app.rates.rate(from, to), to);
            Ok(())
        }

        Commands::Convert { amount, from, to } => {
            let from = match from {
                Some(code) => parse_currency(&code)?,
                None => BASE_CURRENCY,
            };
            let to = match to {
                Some(code) => parse_currency(&code)?,
                None => app.preferences().currency,
            };
            let converted = app.rates.convert(amount, from, to);
            println!(
                "{} = {}",
                format_amount(amount, from, false),
                format_amount(converted, to, false).green().bold()
            );
            Ok(())
        }

        Commands::Format {
            value,
            currency,
            plus,
        } => {
            let amount = value.trim().parse::<f64>().unwrap_or(f64::NAN);
            let line = match currency {
                Some(code) => format_amount(amount, parse_currency(&code)?, plus),
                None => app.registry().format_currency(Some(amount), plus),
            };
            println!("{}", line);
            Ok(())
        }

        Commands::Currency { action } => handle_currency(app, action),

        Commands::Language { code } => {
            match code {
                Some(code) => {
                    let language: Language = code.parse()?;
                    Preferences::save_language(app.store.as_ref(), language)?;
                    println!("{} Language set to {}", "✓".green(), language);
                }
                None => println!("{}", app.preferences().language),
            }
            Ok(())
        }

        Commands::BestSeller {
            data,
            min,
            max,
            bands,
        } => report_best_seller(app, data, min, max, bands),

        Commands::Translate { key, table, lang } => {
            let language = match lang {
                Some(code) => code.parse::<Language>()?,
                None => app.preferences().language,
            };
            let bundle = fs::read_to_string(&table)
                .with_context(|| format!("Failed to read {}", table.display()))?;

            let mut translations = Translations::new(language);
            translations.load_bundle(&bundle)?;
            println!("{}", translations.lookup(&key));
            Ok(())
        }
    }
}

fn handle_currency(app: &App, action: CurrencyAction) -> Result<()> {
    match action {
        CurrencyAction::Get => {
            let registry = app.registry();
            let selected = registry.selected();
            println!("{} ({}, {})", selected, selected.symbol(), selected.locale());
        }
        CurrencyAction::Set { code } => {
            let mut registry = app.registry();
            if !registry.set_currency(&code) {
                bail!(
                    "Unsupported currency '{}'. Supported: {}",
                    code,
                    Currency::all()
                        .iter()
                        .map(|c| c.code())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            println!("{} Display currency set to {}", "✓".green(), registry.selected());
        }
        CurrencyAction::List => {
            let selected = app.registry().selected();
            println!("{}", "Supported currencies".bold());
            for currency in Currency::all() {
                let marker = if *currency == selected { "*" } else { " " };
                let rate = app
                    .rates
                    .get(*currency)
                    .map(|r| format!("{:.4}", r))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{} {:<4} {:<4} {:<6} {:>12}",
                    marker,
                    currency.code(),
                    currency.symbol().trim(),
                    currency.locale(),
                    rate
                );
            }
        }
    }
    Ok(())
}

#[cfg(feature = "async")]
fn fetch_sales(config: &AppConfig) -> Result<InMemoryApi> {
    use optibill::api::DataApi;

    let api = config.http_api()?;
    let scope = config.fetch_scope();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async {
        let products = scope.run("products", api.get_products()).await?;
        let invoices = scope.run("invoices", api.get_invoices()).await?;
        Ok::<_, anyhow::Error>(
            InMemoryApi::default()
                .with_products(products)
                .with_invoices(invoices),
        )
    })
}

#[cfg(not(feature = "async"))]
fn fetch_sales(_config: &AppConfig) -> Result<InMemoryApi> {
    bail!("No --data file given and this build has no API client (enable feature `async`)")
}

fn report_best_seller(
    app: &App,
    data: Option<PathBuf>,
    min: Option<f64>,
    max: Option<f64>,
    bands: bool,
) -> Result<()> {
    let api = match data {
        Some(path) => InMemoryApi::load(&path)
            .with_context(|| format!("Failed to load data from {}", path.display()))?,
        None => fetch_sales(&app.config)?,
    };
    let mut registry = app.registry();

    if app.verbose {
        println!(
            "Loaded {} products, {} invoices",
            api.products.len(),
            api.invoices.len()
        );
    }

    let ranges: Vec<Option<PriceRange>> = if bands {
        PriceRange::dashboard_bands().into_iter().map(Some).collect()
    } else if min.is_some() || max.is_some() {
        vec![Some(PriceRange::new(
            min.unwrap_or(0.0),
            max.unwrap_or(f64::INFINITY),
        ))]
    } else {
        vec![None]
    };

    for range in ranges {
        let label = range
            .map(|r| format!("[{}]", r))
            .unwrap_or_else(|| "[all]".to_string());

        match best_seller(&api.invoices, &api.products, range) {
            Some(best) => {
                let slot = format!("best_price_{}", best.product.id);
                registry.register_value(&slot, best.product.price);
                println!(
                    "{} {} ({}) - {} units at {}",
                    label.cyan(),
                    best.product.name.bold(),
                    best.product.id,
                    best.units_sold,
                    registry.format_entry(&slot, false)
                );
            }
            None => println!("{} {}", label.cyan(), "no paid sales".dimmed()),
        }
    }

    if app.verbose {
        let per_band = best_sellers_by_range(&api.invoices, &api.products, &PriceRange::dashboard_bands());
        let covered = per_band.iter().filter(|(_, best)| best.is_some()).count();
        println!("Bands with sales: {}/{}", covered, per_band.len());

        for (status, amount) in revenue_by_status(&api.invoices, &api.products) {
            registry.register_value(&format!("revenue_{}", status), amount);
            println!(
                "  {:<10} {}",
                status.to_string(),
                registry.format_entry(&format!("revenue_{}", status), false)
            );
        }
    }

    Ok(())
}
