//! Fitness Dashboard CLI
//!
//! Command-line interface for the local week store:
//! - Show history, metric series and the weight chart data
//! - Add and edit weeks
//! - Export to JSON/CSV

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use fitness_dashboard::analytics::{
    build_week_history_rows, build_weight_series, build_weight_summary, overview_cards,
    MetricKind,
};
use fitness_dashboard::config::{generate_default_config, init_logging, Config, LoadedConfig};
use fitness_dashboard::editor::{EditorError, WeekDraft};
use fitness_dashboard::export::{format_history_csv, write_week_export};
use fitness_dashboard::weeks::{sample_weeks, Hydration, WeekStore, Weekday};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weekly fitness metrics from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Start from an empty list instead of the sample weeks when nothing is saved
    #[arg(long, global = true)]
    pub empty: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show weekly averages, most recent first
    History,

    /// Show weekly metric series with latest value and change
    Metrics {
        /// Metric to show (calories, protein, steps, sets, volume); default: all
        metric: Option<MetricKind>,
    },

    /// Show the daily weight series
    Weight,

    /// Add a week
    Add {
        /// Any date in the week (default: today)
        #[arg(short, long)]
        week: Option<NaiveDate>,

        #[command(flatten)]
        fields: WeekFields,
    },

    /// Edit a stored week; only the given fields change
    Edit {
        /// Week id
        id: String,

        /// Move the week to the one containing this date
        #[arg(short, long)]
        week: Option<NaiveDate>,

        #[command(flatten)]
        fields: WeekFields,
    },

    /// Export all weeks as JSON (and optionally the history table as CSV)
    Export {
        /// Output directory (default: export.output_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the history table as CSV
        #[arg(long)]
        csv: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Week fields as free text; empty values clear a field
#[derive(Args, Default)]
pub struct WeekFields {
    /// Daily weight, `day=kg` (repeatable), e.g. `--weight mon=80.1`
    #[arg(long = "weight", value_name = "DAY=KG")]
    pub weights: Vec<String>,

    /// Daily calories, `day=kcal` (repeatable)
    #[arg(long = "calories", value_name = "DAY=KCAL")]
    pub calories: Vec<String>,

    /// Daily protein, `day=g` (repeatable)
    #[arg(long = "protein", value_name = "DAY=G")]
    pub protein: Vec<String>,

    /// Average steps per day
    #[arg(long)]
    pub steps: Option<String>,

    /// Total working sets
    #[arg(long)]
    pub sets: Option<String>,

    /// Total training volume (kg)
    #[arg(long)]
    pub volume: Option<String>,

    /// Training sessions description
    #[arg(long)]
    pub training: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl WeekFields {
    fn apply_to(self, draft: &mut WeekDraft) -> Result<()> {
        for entry in &self.weights {
            let (day, value) = parse_day_entry(entry)?;
            draft.day_mut(day).weight_kg = value;
        }
        for entry in &self.calories {
            let (day, value) = parse_day_entry(entry)?;
            draft.day_mut(day).calories = value;
        }
        for entry in &self.protein {
            let (day, value) = parse_day_entry(entry)?;
            draft.day_mut(day).protein_g = value;
        }

        if let Some(steps) = self.steps {
            draft.avg_steps_per_day = steps;
        }
        if let Some(sets) = self.sets {
            draft.total_sets = sets;
        }
        if let Some(volume) = self.volume {
            draft.total_volume_kg = volume;
        }
        if let Some(training) = self.training {
            draft.training_sessions_description = training;
        }
        if let Some(notes) = self.notes {
            draft.notes = notes;
        }
        Ok(())
    }
}

fn parse_day_entry(entry: &str) -> Result<(Weekday, String)> {
    let (day, value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid entry '{}'. Use: mon=80.1", entry))?;
    let day = day.parse::<Weekday>().map_err(|e| anyhow!(e))?;
    Ok((day, value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let config = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &config)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", config),
        }
        return Ok(());
    }

    let loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)?,
            source: Some(path.clone()),
            failures: Vec::new(),
        },
        None => Config::search_default(),
    };
    init_logging(&loaded.config.logging);
    loaded.log_summary();

    let mut config = loaded.config;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    let seed = if cli.empty { Vec::new() } else { sample_weeks() };
    let store = WeekStore::from_config(&config.storage, seed);
    if let Hydration::KeptSeed = store.hydrate().await {
        tracing::info!("No saved weeks found in {:?}", config.storage.data_path());
    }

    let json = cli.format.eq_ignore_ascii_case("json");
    let today = Local::now().date_naive();

    match cli.command {
        Commands::History => {
            let rows = build_week_history_rows(&store.weeks().await);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No weeks logged yet.");
            } else {
                print!("{:<12} {:>8} {:>7} {:>8} {:>8} ", "Week", "Avg kg", "Δ kg", "kcal", "Protein");
                for day in Weekday::ALL {
                    print!(" {:>5}", day.key());
                }
                println!();
                println!("{}", "-".repeat(48 + 7 * 6));

                for row in rows {
                    print!(
                        "{:<12} {:>8} {:>7} {:>8} {:>8} ",
                        row.week_of,
                        fmt_opt(row.avg_weight_kg, 1),
                        fmt_opt(row.avg_weight_delta_kg, 1),
                        fmt_opt(row.avg_calories, 0),
                        fmt_opt(row.avg_protein_g, 0),
                    );
                    for weight in row.daily_weights {
                        print!(" {:>5}", fmt_opt(weight, 1));
                    }
                    println!();
                }
            }
        }

        Commands::Metrics { metric } => {
            let weeks = store.weeks().await;
            let kinds: Vec<MetricKind> = match metric {
                Some(kind) => vec![kind],
                None => MetricKind::all().to_vec(),
            };

            if json {
                let histories: serde_json::Map<String, serde_json::Value> = kinds
                    .iter()
                    .map(|kind| Ok((kind.to_string(), serde_json::to_value(kind.history(&weeks))?)))
                    .collect::<Result<_, serde_json::Error>>()?;
                println!("{}", serde_json::to_string_pretty(&histories)?);
            } else {
                if metric.is_none() {
                    for card in overview_cards(&weeks) {
                        println!("{:<14} {:>12}  {:?} ({})", card.title, card.value, card.trend, card.interval);
                    }
                    println!();
                }

                for kind in kinds {
                    let history = kind.history(&weeks);
                    println!(
                        "{} [{}]: latest {}, change {}",
                        kind.title(),
                        kind.unit(),
                        fmt_opt(history.latest_value, 1),
                        history
                            .change_percent
                            .map(|c| format!("{:+.1}%", c))
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    for (label, value) in history.labels.iter().zip(&history.values) {
                        println!("  {:<12} {:>10}", label, fmt_opt(*value, 1));
                    }
                }
            }
        }

        Commands::Weight => {
            let series = build_weight_series(&store.weeks().await);
            let summary = build_weight_summary(&series.weights);

            if json {
                let body = serde_json::json!({ "series": series, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!(
                    "Latest: {} kg, change {}",
                    fmt_opt(summary.latest_weight, 1),
                    summary
                        .change_percent
                        .map(|c| format!("{:+.1}%", c))
                        .unwrap_or_else(|| "-".to_string()),
                );
                println!(
                    "Axis: {} .. {}",
                    fmt_opt(series.y_axis_min, 1),
                    fmt_opt(series.y_axis_max, 1)
                );
                println!("{}", "-".repeat(30));
                for ((label, weight), avg) in series
                    .labels
                    .iter()
                    .zip(&series.weights)
                    .zip(&series.avg_weights)
                {
                    let marker = avg.map(|a| format!("  avg {:.1}", a)).unwrap_or_default();
                    println!("{:<8} {:>6}{}", label, fmt_opt(*weight, 1), marker);
                }
            }
        }

        Commands::Add { week, fields } => {
            let mut draft = WeekDraft::new(today);
            if let Some(date) = week {
                draft.set_week_start(date);
            }
            fields.apply_to(&mut draft)?;

            let saved = draft.apply(&store).await?;
            println!("Added week {} (id {})", saved.week_of, saved.id);
        }

        Commands::Edit { id, week, fields } => {
            let existing = store
                .get(&id)
                .await
                .ok_or_else(|| EditorError::WeekNotFound(id.clone()))?;

            let mut draft = WeekDraft::from_week(&existing, today);
            if let Some(date) = week {
                draft.set_week_start(date);
            }
            fields.apply_to(&mut draft)?;

            let saved = draft.apply(&store).await?;
            println!("Updated week {} (id {})", saved.week_of, saved.id);
        }

        Commands::Export { output, csv } => {
            let dir = output.unwrap_or_else(|| config.export.output_path());
            let weeks = store.weeks().await;

            let path = write_week_export(&dir, &weeks, &Local::now()).await?;
            println!("Export written to {:?}", path);

            if csv {
                let csv_path = path.with_extension("csv");
                let table = format_history_csv(&build_week_history_rows(&weeks))?;
                tokio::fs::write(&csv_path, table)
                    .await
                    .with_context(|| format!("writing {:?}", csv_path))?;
                println!("History table written to {:?}", csv_path);
            }
        }

        Commands::Config { .. } => bail!("config is handled before the store is opened"),
    }

    store.shutdown().await?;
    Ok(())
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}
