use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use planogram_core::{
    rule_catalog, PlanogramRequest, PlanogramResult, Planner, ShelfZoneMap, VisibilityLevel,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod records;

#[derive(Parser)]
#[command(name = "planogram")]
#[command(about = "Planogram Engine - Place products on store fixtures", long_about = None)]
struct Cli {
    /// Log solver and rule details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a planogram
    Place {
        /// Request file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Product table (CSV) replacing the products of the request
        #[arg(short, long)]
        products: Option<PathBuf>,

        /// Output file for result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the commercial zone of every shelf
    Zones {
        /// Number of shelves
        #[arg(short, long)]
        shelves: u32,

        /// Fixture height in cm
        #[arg(long, default_value_t = 200.0)]
        height: f64,

        /// Use the children's golden zone
        #[arg(long)]
        children: bool,
    },

    /// List the business rules in application order
    Rules,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("planogram_core=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Place {
            input,
            products,
            output,
        } => {
            place_command(input, products, output)?;
        }
        Commands::Zones {
            shelves,
            height,
            children,
        } => {
            zones_command(shelves, height, children)?;
        }
        Commands::Rules => rules_command(),
    }

    Ok(())
}

fn load_request(input: &Path) -> Result<PlanogramRequest> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let extension = input.extension().and_then(|s| s.to_str());
    let request = if matches!(extension, Some("yaml") | Some("yml")) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML request {}", input.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON request {}", input.display()))?
    };
    Ok(request)
}

fn place_command(input: PathBuf, products: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    println!("{}", "🔍 Loading request...".bright_blue());

    let mut request = load_request(&input)?;
    if let Some(path) = products {
        request.products = records::load_products(&path)?;
        println!(
            "  Products loaded from {}",
            path.display().to_string().bright_white()
        );
    }

    println!(
        "  {} products",
        request.products.len().to_string().bright_white().bold()
    );
    println!(
        "  {} shelves x {} columns on a {}",
        request.shelf_count.to_string().bright_white().bold(),
        request.column_count.to_string().bright_white().bold(),
        request.furniture.to_string().bright_white()
    );
    println!();

    println!("{}", "🚀 Placing products...".bright_blue());

    let planner = Planner::new(request)?;
    let result = planner.plan()?;

    println!();
    println!("{}", "✅ Planogram complete!".bright_green().bold());
    println!();

    print_summary(&result, &planner);

    let json = serde_json::to_string_pretty(&result)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!(
            "💾 Saved result to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn print_summary(result: &PlanogramResult, planner: &Planner) {
    println!("{}", "📊 Results:".bright_yellow().bold());
    println!(
        "  Placed: {} products ({} season)",
        result.placements.len().to_string().bright_white().bold(),
        format!("{:?}", planner.season()).to_lowercase()
    );
    println!(
        "  Fixture: {} (type {}) {:.0}x{:.0}x{:.0} cm",
        result.furniture,
        result.furniture.id(),
        result.dimensions.width,
        result.dimensions.height,
        result.dimensions.depth
    );
    println!();

    println!("  Shelves:");
    for shelf in &result.shelves {
        let zone = planner.zones().shelf(shelf.shelf);
        println!(
            "    • {} {:>6.1} cm  {:<14} {} products, avg score {:.3}",
            format!("#{}", shelf.shelf).bright_white(),
            shelf.height,
            colored_zone(zone.visibility, &format!("{:?}", zone.commercial_zone)),
            shelf.product_count,
            shelf.average_score
        );
    }

    if !result.violations.is_empty() {
        println!();
        println!(
            "  {} remaining violations:",
            result.violations.len().to_string().bright_red().bold()
        );
        for violation in &result.violations {
            println!(
                "    • {} {}",
                violation.product_id.bright_white(),
                violation.message
            );
        }
    }
    println!();
}

fn colored_zone(visibility: VisibilityLevel, label: &str) -> ColoredString {
    match visibility {
        VisibilityLevel::EyeLevel => label.bright_green(),
        VisibilityLevel::BelowEye => label.green(),
        VisibilityLevel::AboveEye => label.yellow(),
        VisibilityLevel::LowLevel => label.bright_black(),
    }
}

fn zones_command(shelves: u32, height: f64, children: bool) -> Result<()> {
    let map = ShelfZoneMap::calculate(shelves, height, children)?;

    let audience = if children { "children" } else { "adults" };
    println!(
        "{}",
        format!("📏 {} shelves, {:.0} cm, {}", shelves, height, audience).bright_blue()
    );
    println!();

    for zone in &map.zones {
        println!(
            "  {} {:>6.1}-{:<6.1} cm  mid {:>6.1}  {}",
            format!("#{}", zone.shelf).bright_white().bold(),
            zone.bottom,
            zone.top,
            zone.mid,
            colored_zone(
                zone.visibility,
                &format!("{:?} / {:?}", zone.commercial_zone, zone.visibility)
            )
        );
    }

    Ok(())
}

fn rules_command() {
    println!("{}", "📋 Business rules (in application order):".bright_yellow().bold());
    println!();

    for (i, info) in rule_catalog().iter().enumerate() {
        println!(
            "  {}. {}",
            (i + 1).to_string().bright_white().bold(),
            info.description.bright_white()
        );
        println!("     reads: {}", info.inputs.join(", ").bright_cyan());
        for action in info.actions {
            println!("     • {}", action);
        }
    }
}
