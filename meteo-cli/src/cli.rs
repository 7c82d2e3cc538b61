use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use inquire::Select;

use meteo_core::{
    DataAssembler, ForecastBundle, ForecastCache, ForecastModel, LocationCatalog,
    OpenMeteoClient, Settings, aggregate,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Deux-Sèvres weather board")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Department-wide daily means across the catalog.
    Show {
        /// Forecast model, e.g. "arome" or "gfs"; defaults to the configured one.
        #[arg(long)]
        model: Option<String>,

        /// Focus date (YYYY-MM-DD); also prints the highlights panel.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Mean wind speed per compass sector for one location.
    Windrose {
        /// Location name as it appears in the catalog.
        location: String,

        #[arg(long)]
        model: Option<String>,
    },

    /// Drop the cache and fetch fresh datasets.
    Refresh {
        #[arg(long)]
        model: Option<String>,
    },

    /// Pick the default forecast model interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let settings = Settings::load()?;

        match self.command {
            Command::Show { model, date } => {
                let model = resolve_model(&settings, model.as_deref())?;
                let bundle = build_cache(&settings)?.get(model).await;
                report_bundle(&bundle);
                if bundle.is_empty() {
                    bail!("No data available: every location failed this cycle.");
                }

                print_department_table(&bundle);

                if let Some(date) = date {
                    print_highlights(&bundle, date);
                }
            }

            Command::Windrose { location, model } => {
                let model = resolve_model(&settings, model.as_deref())?;
                let cache = build_cache(&settings)?;
                if !LocationCatalog::deux_sevres().contains(&location) {
                    bail!(
                        "Unknown location '{location}'.\n\
                         Hint: run `meteo show` to list the catalog communes."
                    );
                }

                let bundle = cache.get(model).await;
                report_bundle(&bundle);

                let subset = aggregate::hourly_for_locations(&bundle.hourly, &[location.as_str()]);
                let rose = aggregate::wind_rose(&subset)?;
                if rose.is_empty() {
                    println!("No wind data available for {location}.");
                    return Ok(());
                }

                println!("Wind rose for {location} ({model}):");
                for sector in &rose {
                    println!(
                        "  {:<3} {:>6.1} km/h  ({} hours)",
                        sector.sector.label(),
                        sector.mean_speed,
                        sector.samples
                    );
                }
            }

            Command::Refresh { model } => {
                let model = resolve_model(&settings, model.as_deref())?;
                let cache = build_cache(&settings)?;
                cache.invalidate_all().await;
                let bundle = cache.get(model).await;
                report_bundle(&bundle);
                println!(
                    "Refreshed {model}: {} daily and {} hourly rows.",
                    bundle.daily.len(),
                    bundle.hourly.len()
                );
            }

            Command::Configure => {
                let choice = Select::new(
                    "Default forecast model:",
                    ForecastModel::all().iter().map(|m| m.as_str()).collect(),
                )
                .prompt()
                .context("Model selection aborted")?;

                let mut settings = settings;
                settings.model = ForecastModel::try_from(choice)?;
                settings.save()?;

                println!(
                    "Saved default model '{}' to {}",
                    settings.model,
                    Settings::settings_file_path()?.display()
                );
            }
        }

        Ok(())
    }
}

fn resolve_model(settings: &Settings, flag: Option<&str>) -> Result<ForecastModel> {
    match flag {
        Some(s) => ForecastModel::try_from(s),
        None => Ok(settings.model),
    }
}

fn build_cache(settings: &Settings) -> Result<ForecastCache> {
    let client = OpenMeteoClient::new(settings)?;
    let assembler = DataAssembler::new(
        Arc::new(client),
        LocationCatalog::deux_sevres(),
        settings.inter_request_delay(),
    );
    Ok(ForecastCache::new(assembler, settings.cache_ttl()))
}

fn report_bundle(bundle: &ForecastBundle) {
    for warning in &bundle.warnings {
        eprintln!("warning: skipped {}: {}", warning.location, warning.message);
    }
}

fn print_department_table(bundle: &ForecastBundle) {
    let means = aggregate::department_means(&bundle.daily);
    let cumulative = aggregate::cumulative_precipitation(&means);

    println!(
        "{:<12} {:>7} {:>7} {:>8} {:>8} {:>8} {:>6}",
        "date", "t.max", "t.min", "rain mm", "cum. mm", "gusts", "uv"
    );
    for (day, (_, total)) in means.iter().zip(&cumulative) {
        println!(
            "{:<12} {:>7} {:>7} {:>8} {:>8.1} {:>8} {:>6}",
            day.date.to_string(),
            fmt(day.temperature_max),
            fmt(day.temperature_min),
            fmt(day.precipitation_sum),
            total,
            fmt(day.wind_gusts_max),
            fmt(day.uv_index_max),
        );
    }
}

fn print_highlights(bundle: &ForecastBundle, date: NaiveDate) {
    let rows = aggregate::daily_on(&bundle.daily, date);
    if rows.is_empty() {
        println!("\nNo forecast rows for {date}.");
        return;
    }

    let highlights = aggregate::daily_highlights(&rows);
    println!("\nHighlights for {date}:");
    print_extreme("warmest", &highlights.warmest, "°C");
    print_extreme("coldest", &highlights.coldest, "°C");
    print_extreme("gustiest", &highlights.gustiest, "km/h");
    print_extreme("wettest", &highlights.wettest, "mm");
    print_extreme("highest rain chance", &highlights.highest_precipitation_probability, "%");
    print_extreme("highest UV", &highlights.highest_uv, "");
    match highlights.mean_daylight_hours {
        Some(hours) => println!("  mean daylight: {hours:.1} h"),
        None => println!("  mean daylight: -"),
    }
}

fn print_extreme(label: &str, extreme: &Option<aggregate::Extreme>, unit: &str) {
    match extreme {
        Some(e) => println!("  {label}: {:.1}{unit} at {}", e.value, e.location),
        None => println!("  {label}: -"),
    }
}

fn fmt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "-".to_string(),
    }
}
