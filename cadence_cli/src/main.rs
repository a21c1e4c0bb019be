use cadence_core::*;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Private menstrual cycle tracker and predictor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log the first day of a period (defaults to today)
    Start {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Log the last day of the active period (defaults to today)
    End {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Log a past period
    Add {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: Option<NaiveDate>,

        /// Flow level (light, normal, heavy)
        #[arg(long, value_parser = parse_flow)]
        flow: Option<Flow>,

        /// Symptom to record (repeatable)
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
    },

    /// Change fields of a logged period
    Update {
        id: Uuid,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long, conflicts_with = "clear_end")]
        end: Option<NaiveDate>,

        /// Reopen the period by removing its end date
        #[arg(long)]
        clear_end: bool,

        #[arg(long, value_parser = parse_flow)]
        flow: Option<Flow>,

        /// Replace recorded symptoms (repeatable)
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
    },

    /// Remove a logged period
    Delete { id: Uuid },

    /// Show logged periods and averages
    List {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forecast the next period (default)
    Predict {
        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,

        /// Also show the fertile window
        #[arg(long)]
        fertility: bool,
    },

    /// Assess cycle regularity over the full history
    Health {
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a date falls in the expected ovulation phase
    Ovulation {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the cycle day and phase for a date (defaults to today)
    Phase {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Export period history to CSV
    Export { path: PathBuf },

    /// Import period history from CSV
    Import { path: PathBuf },
}

fn parse_flow(value: &str) -> std::result::Result<Flow, String> {
    value.parse::<Flow>().map_err(|e| e.to_string())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() -> Result<()> {
    // Initialize logging
    cadence_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let tracker = CycleTracker::new(FileCycleStore::in_dir(&data_dir));

    match cli.command {
        Some(Commands::Start { date }) => cmd_start(&tracker, date.unwrap_or_else(today)),
        Some(Commands::End { date }) => cmd_end(&tracker, date.unwrap_or_else(today)),
        Some(Commands::Add {
            start,
            end,
            flow,
            symptoms,
        }) => cmd_add(&tracker, start, end, flow, symptoms),
        Some(Commands::Update {
            id,
            start,
            end,
            clear_end,
            flow,
            symptoms,
        }) => {
            let update = PeriodUpdate {
                start_date: start,
                end_date: if clear_end { Some(None) } else { end.map(Some) },
                flow: flow.map(Some),
                symptoms: if symptoms.is_empty() {
                    None
                } else {
                    Some(symptoms)
                },
            };
            cmd_update(&tracker, id, update)
        }
        Some(Commands::Delete { id }) => cmd_delete(&tracker, id),
        Some(Commands::List { json }) => cmd_list(&tracker, json),
        Some(Commands::Predict { json, fertility }) => {
            cmd_predict(&tracker, json, fertility || config.display.show_fertility)
        }
        Some(Commands::Health { json }) => cmd_health(&tracker, json),
        Some(Commands::Ovulation { date }) => cmd_ovulation(&tracker, date.unwrap_or_else(today)),
        Some(Commands::Phase { date }) => cmd_phase(&tracker, date.unwrap_or_else(today)),
        Some(Commands::Export { path }) => cmd_export(&tracker, &path),
        Some(Commands::Import { path }) => cmd_import(&tracker, &path),
        None => {
            // Default to "predict" command
            cmd_predict(&tracker, false, config.display.show_fertility)
        }
    }
}

type Tracker = CycleTracker<FileCycleStore>;

fn cmd_start(tracker: &Tracker, date: NaiveDate) -> Result<()> {
    let record = tracker.start_period(date)?;
    println!("✓ Period started on {}", record.start_date);
    println!("  id: {}", record.id);
    Ok(())
}

fn cmd_end(tracker: &Tracker, date: NaiveDate) -> Result<()> {
    let record = tracker.end_period(date)?;
    println!("✓ Period ended on {}", date);
    if let Some(days) = record.duration_days() {
        println!("  Length: {} days", days);
    }
    Ok(())
}

fn cmd_add(
    tracker: &Tracker,
    start: NaiveDate,
    end: Option<NaiveDate>,
    flow: Option<Flow>,
    symptoms: Vec<String>,
) -> Result<()> {
    if let Some(end) = end {
        if end < start {
            return Err(Error::InvalidInput(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
    }

    let mut record = PeriodRecord::new(start);
    record.end_date = end;
    record.flow = flow;
    record.symptoms = symptoms;
    let id = record.id;

    tracker.add_period(record)?;
    println!("✓ Period logged");
    println!("  id: {}", id);
    Ok(())
}

fn cmd_update(tracker: &Tracker, id: Uuid, update: PeriodUpdate) -> Result<()> {
    if update.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    if !tracker.update_period(id, update)? {
        return Err(Error::PeriodNotFound(id));
    }
    println!("✓ Period {} updated", id);
    Ok(())
}

fn cmd_delete(tracker: &Tracker, id: Uuid) -> Result<()> {
    if !tracker.delete_period(id)? {
        return Err(Error::PeriodNotFound(id));
    }
    println!("✓ Period {} deleted", id);
    Ok(())
}

fn cmd_list(tracker: &Tracker, json: bool) -> Result<()> {
    let data = tracker.cycle_snapshot()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let mut periods: Vec<&PeriodRecord> = data.periods.iter().collect();
    periods.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    if periods.is_empty() {
        println!("No periods logged yet.");
    }
    for period in periods {
        match (period.end_date, period.duration_days()) {
            (Some(end), Some(days)) => {
                println!("  {} → {} ({} days)  {}", period.start_date, end, days, period.id)
            }
            (Some(end), None) => {
                println!("  {} → {} (invalid)  {}", period.start_date, end, period.id)
            }
            (None, _) => println!("  {} → ongoing  {}", period.start_date, period.id),
        }
    }

    println!();
    println!("  Average cycle:  {} days", data.average_cycle_length);
    println!("  Average period: {} days", data.average_period_length);

    for issue in data.integrity_issues() {
        eprintln!("warning: {}", issue);
    }
    Ok(())
}

fn cmd_predict(tracker: &Tracker, json: bool, show_fertility: bool) -> Result<()> {
    let prediction = tracker.predict_next_period()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }

    let Some(prediction) = prediction else {
        println!("No prediction yet - log at least one complete period.");
        return Ok(());
    };

    display_prediction(&prediction);

    if let Some(window) = fertility_window(&prediction).filter(|_| show_fertility) {
        println!(
            "  Fertile window: {} → {} (ovulation {})",
            window.fertile_start, window.fertile_end, window.ovulation_date
        );
    }

    for warning in &prediction.warnings {
        println!("  ⚠ {}", warning);
    }
    println!();
    Ok(())
}

fn display_prediction(prediction: &PredictionResult) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  NEXT PERIOD");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Expected: {} → {}",
        prediction.start_date, prediction.end_date
    );
    println!(
        "  Window:   {} → {}",
        prediction.prediction_window.earliest_start, prediction.prediction_window.latest_start
    );
    println!("  Ovulation: {}", prediction.ovulation_date);
    println!(
        "  Confidence: {:?} ({} cycles, ±{} days)",
        prediction.confidence, prediction.cycles_used, prediction.variation
    );
    if prediction.is_irregular {
        println!("  Pattern: irregular");
    }
    println!();
}

fn cmd_health(tracker: &Tracker, json: bool) -> Result<()> {
    let analysis = tracker.analyze_cycle_health()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("\nCycle health: {} ({:?} priority)", analysis.status, analysis.severity);
    println!("  {}", analysis.message);

    if analysis.status != HealthStatus::InsufficientData {
        let details = &analysis.details;
        println!();
        println!("  Average cycle: {} days", details.average_cycle_length);
        println!("  Variation:     ±{} days", details.standard_deviation);
        println!(
            "  Irregular:     {} of {} cycles",
            details.irregularity_count, details.total_cycles
        );
        let lengths: Vec<String> = details.cycle_lengths.iter().map(|l| l.to_string()).collect();
        println!("  Cycle lengths: {}", lengths.join(", "));
    }

    println!();
    for recommendation in &analysis.recommendations {
        println!("  → {}", recommendation);
    }
    println!();
    Ok(())
}

fn cmd_ovulation(tracker: &Tracker, date: NaiveDate) -> Result<()> {
    if tracker.is_ovulation_phase(date)? {
        println!("{} is in the expected ovulation phase.", date);
    } else {
        println!("{} is not in the expected ovulation phase.", date);
    }
    Ok(())
}

fn cmd_phase(tracker: &Tracker, date: NaiveDate) -> Result<()> {
    match tracker.current_phase(date)? {
        Some(info) => println!("{}: cycle day {}, {} phase", date, info.cycle_day, info.phase),
        None => println!("No cycle phase for {} - log a complete period first.", date),
    }
    Ok(())
}

fn cmd_export(tracker: &Tracker, path: &std::path::Path) -> Result<()> {
    let data = tracker.cycle_snapshot()?;
    let count = export_csv(&data.periods, path)?;
    println!("✓ Exported {} periods", count);
    println!("  CSV: {}", path.display());
    Ok(())
}

fn cmd_import(tracker: &Tracker, path: &std::path::Path) -> Result<()> {
    let records = import_csv(path)?;
    let total = records.len();
    let added = tracker.import_periods(records)?;
    tracing::debug!("Import from {:?} added {} of {} periods", path, added, total);
    println!("✓ Imported {} of {} periods", added, total);
    if added < total {
        println!("  {} already logged", total - added);
    }
    Ok(())
}
