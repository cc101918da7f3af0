// Entry point and high-level CLI flow.
//
// - With a subcommand, one view is rendered, exported and the program exits.
// - Without one, the tab menu runs: pick Services, Products or Total Revenue
//   by Month, answer the filter prompts, then choose whether to go back to
//   the selection menu or exit.
mod aggregate;
mod colors;
mod config;
mod error;
mod filter;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use config::{load_file_config, Overrides, Settings};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use types::{DateWindow, Dataset, Datasets, YearMonth};

#[derive(Parser, Debug)]
#[command(name = "salon_revenue")]
#[command(about = "Revenue dashboard for salon services and retail products")]
struct Args {
    /// Config file (default: dashboard.toml if it exists)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Services CSV (Date, Service, Revenue)
    #[arg(long, global = true)]
    services: Option<PathBuf>,

    /// Products CSV (Date, Product, Quantity_Sold, Revenue)
    #[arg(long, global = true)]
    products: Option<PathBuf>,

    /// Directory for exported CSV/JSON files
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Rows shown per console table
    #[arg(long, global = true)]
    preview_rows: Option<usize>,

    /// Date used for year-to-date figures (default: today)
    #[arg(long, global = true, value_parser = util::parse_user_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct WindowArgs {
    /// First day included (default: earliest date in the data)
    #[arg(long, value_parser = util::parse_user_date)]
    from: Option<NaiveDate>,

    /// Last day included (default: latest date in the data)
    #[arg(long, value_parser = util::parse_user_date)]
    to: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Services overview for a date range
    Services(WindowArgs),
    /// Products overview for a date range
    Products(WindowArgs),
    /// Revenue for one month plus the monthly trend
    Monthly {
        /// Month as YYYY-MM (default: latest month in the data)
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// List the months available for `monthly`
    Months,
    /// Every view with default filters
    All,
}

/// Everything a report needs: the loaded data, settings and the evaluation date.
struct App {
    data: Datasets,
    settings: Settings,
    today: NaiveDate,
}

impl App {
    fn window(&self, dataset: &Dataset, args: &WindowArgs) -> DateWindow {
        let default = reports::default_window(dataset, self.today);
        DateWindow::new(args.from.unwrap_or(default.start), args.to.unwrap_or(default.end))
    }

    fn default_month(&self) -> YearMonth {
        filter::available_months(&self.data)
            .last()
            .copied()
            .unwrap_or_else(|| YearMonth::of(self.today))
    }

    fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.settings.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.settings.output_dir.display()
            )
        })
    }

    fn services(&self, window: DateWindow) -> Result<()> {
        let view = reports::build_services_view(&self.data, window);
        output::print_category_view(&view, self.settings.preview_rows);
        self.ensure_output_dir()?;
        output::export_category_view(&self.settings.output_dir, &view)?;
        println!("(Full tables exported to {})\n", self.settings.output_dir.display());
        Ok(())
    }

    fn products(&self, window: DateWindow) -> Result<()> {
        let view = reports::build_products_view(&self.data, window);
        output::print_category_view(&view, self.settings.preview_rows);
        self.ensure_output_dir()?;
        output::export_category_view(&self.settings.output_dir, &view)?;
        println!("(Full tables exported to {})\n", self.settings.output_dir.display());
        Ok(())
    }

    fn monthly(&self, month: YearMonth) -> Result<()> {
        let view = reports::build_monthly_view(&self.data, month, self.today);
        output::print_monthly_view(&view, self.settings.preview_rows);
        self.ensure_output_dir()?;
        output::export_monthly_view(&self.settings.output_dir, &view)?;
        println!("(Full tables exported to {})\n", self.settings.output_dir.display());
        Ok(())
    }

    fn list_months(&self) {
        let months = filter::available_months(&self.data);
        if months.is_empty() {
            println!("(no months available)");
        }
        for m in months {
            println!("{}", m);
        }
    }

    fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Services(args) => self.services(self.window(&self.data.services, &args)),
            Command::Products(args) => self.products(self.window(&self.data.products, &args)),
            Command::Monthly { month } => self.monthly(month.unwrap_or_else(|| self.default_month())),
            Command::Months => {
                self.list_months();
                Ok(())
            }
            Command::All => {
                self.services(self.window(&self.data.services, &WindowArgs::default()))?;
                self.products(self.window(&self.data.products, &WindowArgs::default()))?;
                self.monthly(self.default_month())
            }
        }
    }

    fn interactive(&self) -> Result<()> {
        loop {
            println!("Select Report:");
            println!("[1] Services");
            println!("[2] Products");
            println!("[3] Total Revenue by Month\n");
            let Some(choice) = read_line("Enter choice: ") else {
                break;
            };
            let shown = match choice.as_str() {
                "1" => self.prompt_window(&self.data.services).map(|w| self.services(w)),
                "2" => self.prompt_window(&self.data.products).map(|w| self.products(w)),
                "3" => self.prompt_month().map(|m| self.monthly(m)),
                _ => {
                    println!("Invalid choice. Please enter 1, 2 or 3.\n");
                    continue;
                }
            };
            match shown {
                Some(result) => result?,
                None => break,
            }
            if !prompt_back_to_menu() {
                break;
            }
        }
        println!("Exiting the program.");
        Ok(())
    }

    /// Ask for From/To dates, offering the dataset span as defaults.
    /// `None` means stdin is closed.
    fn prompt_window(&self, dataset: &Dataset) -> Option<DateWindow> {
        let default = reports::default_window(dataset, self.today);
        let start = prompt_date("From", default.start)?;
        let end = prompt_date("To", default.end)?;
        println!();
        Some(DateWindow::new(start, end))
    }

    fn prompt_month(&self) -> Option<YearMonth> {
        let months = filter::available_months(&self.data);
        let options: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        println!("Available months: {}", options.join(", "));
        let default = self.default_month();
        loop {
            let input = read_line(&format!("Select Month [{}]: ", default))?;
            if input.is_empty() {
                return Some(default);
            }
            match input.parse::<YearMonth>() {
                Ok(m) => {
                    if !months.contains(&m) {
                        warn!(month = %m, "selected month has no transactions");
                    }
                    println!();
                    return Some(m);
                }
                Err(e) => println!("{}", e),
            }
        }
    }
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn prompt_date(label: &str, default: NaiveDate) -> Option<NaiveDate> {
    loop {
        let input = read_line(&format!("{} [{}]: ", label, default))?;
        if input.is_empty() {
            return Some(default);
        }
        match util::parse_user_date(&input) {
            Ok(date) => return Some(date),
            Err(e) => println!("{}", e),
        }
    }
}

/// Ask the user whether to go back to the report selection menu.
///
/// Returns `true` for `Y`, `false` for `N` or closed input.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => {
                println!();
                return true;
            }
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salon_revenue=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let file_config = load_file_config(args.config.as_deref())?;
    let settings = Settings::resolve(
        file_config,
        Overrides {
            services: args.services,
            products: args.products,
            output_dir: args.output_dir,
            preview_rows: args.preview_rows,
        },
    );

    let data = loader::load_datasets(&settings.services_path, &settings.products_path)
        .context("Failed to load input data; no report rendered")?;
    println!(
        "Loaded {} service and {} product transactions.\n",
        util::format_int(data.services.records.len()),
        util::format_int(data.products.records.len())
    );

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    info!(%today, "year-to-date anchored");

    let app = App {
        data,
        settings,
        today,
    };
    match args.command {
        Some(command) => app.run(command),
        None => app.interactive(),
    }
}
