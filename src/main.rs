// ==========================================
// Altar Rota - command line entry point
// ==========================================

use std::path::Path;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};

use altar_rota::app::{get_default_db_path, AppState};
use altar_rota::config::config_keys;
use altar_rota::{i18n, logging, GenerationOutcome, PreviewOutcome, RotationRules, StaffingOutcome};

#[derive(Parser)]
#[command(name = "altar-rota")]
#[command(about = "Fair, role-aware altar server rotation", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "ALTAR_ROTA_DB", global = true)]
    db: Option<String>,

    /// Locale for alert messages (en, pt-BR)
    #[arg(long, default_value = "en", global = true)]
    locale: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct RuleArgs {
    /// Period to staff
    #[arg(long)]
    period: i64,
    /// Restrict the run to these event ids (repeatable)
    #[arg(long = "event")]
    events: Vec<i64>,
    #[arg(long)]
    minimum_primary: Option<u32>,
    #[arg(long)]
    daily_limit: Option<u32>,
    /// Fill by workload only after the reserved primaries
    #[arg(long)]
    no_role_priority: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Generate and commit assignments for a period
    Generate(RuleArgs),
    /// Show what a generation would do, without writing
    Preview(RuleArgs),
    /// List the assignments of a period
    Roster {
        #[arg(long)]
        period: i64,
        #[arg(long)]
        include_cancelled: bool,
    },
    /// Move an assignment to another candidate
    Reassign {
        #[arg(long)]
        assignment: i64,
        #[arg(long)]
        candidate: i64,
        #[arg(long)]
        daily_limit: Option<u32>,
    },
    /// Cancel an assignment
    Cancel {
        #[arg(long)]
        assignment: i64,
    },
    /// Reset cumulative assignment counters
    #[command(group(
        ArgGroup::new("target")
            .args(["candidate", "all"])
            .required(true)
            .multiple(false)
    ))]
    ResetCount {
        #[arg(long)]
        candidate: Option<i64>,
        #[arg(long)]
        all: bool,
    },
    /// Services per candidate within a period
    ServiceTotals {
        #[arg(long)]
        period: i64,
    },
    /// Store a rule default (minimum_primary, daily_limit, ...)
    SetConfig { key: String, value: String },
    /// Print the stored configuration as JSON
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }
    i18n::set_locale(&cli.locale);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {}", parent.display()))?;
        }
    }
    tracing::info!(version = altar_rota::VERSION, db_path = %db_path, "altar-rota starting");

    let state = AppState::new(&db_path).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::InitDb => {
            println!("Schema ready at {}.", state.db_path);
        }
        Commands::Generate(args) => {
            let rules = rules_from_args(&state, &args).await?;
            let outcome = state
                .rotation_api
                .generate(args.period, event_filter(&args), rules)
                .await
                .context("generation failed")?;
            print_generation(&outcome);
        }
        Commands::Preview(args) => {
            let rules = rules_from_args(&state, &args).await?;
            let outcome = state
                .rotation_api
                .preview(args.period, event_filter(&args), rules)
                .await
                .context("preview failed")?;
            print_preview(&outcome);
        }
        Commands::Roster { period, include_cancelled } => {
            let roster = state.assignment_api.list_period(period, include_cancelled)?;
            if roster.is_empty() {
                println!("No assignments for period {}.", period);
            }
            for row in roster {
                println!(
                    "#{} {} {} {} - {} [{}]",
                    row.assignment_id,
                    row.date,
                    row.time.format("%H:%M"),
                    row.location,
                    row.candidate_name,
                    row.status.as_str()
                );
            }
        }
        Commands::Reassign { assignment, candidate, daily_limit } => {
            let updated = state
                .assignment_api
                .reassign(assignment, candidate, daily_limit)
                .await
                .context("reassignment rejected")?;
            println!("Assignment {} now held by candidate {}.", updated.assignment_id, updated.candidate_id);
        }
        Commands::Cancel { assignment } => {
            state.assignment_api.cancel(assignment)?;
            println!("Assignment {} cancelled.", assignment);
        }
        Commands::ResetCount { candidate, all } => {
            if all {
                let reset = state.candidate_api.reset_all_counts()?;
                println!("Reset {} candidate counter(s).", reset);
            } else if let Some(candidate_id) = candidate {
                state.candidate_api.reset_count(candidate_id)?;
                println!("Counter of candidate {} reset.", candidate_id);
            }
        }
        Commands::ServiceTotals { period } => {
            for total in state.candidate_api.service_totals(period)? {
                println!("{:>4}  {}", total.services, total.display_name);
            }
        }
        Commands::SetConfig { key, value } => {
            let known = [
                config_keys::MINIMUM_PRIMARY,
                config_keys::DAILY_LIMIT,
                config_keys::PRIORITIZE_ROLES,
                config_keys::WEEKDAY_HEADCOUNT,
                config_keys::WEEKEND_HEADCOUNT,
            ];
            if !known.contains(&key.as_str()) {
                anyhow::bail!("unknown config key {} (expected one of {})", key, known.join(", "));
            }
            state
                .config
                .set_global_config_value(&key, &value)
                .map_err(|e| anyhow::anyhow!("cannot store {}: {}", key, e))?;
            println!("{} = {}", key, value);
        }
        Commands::ShowConfig => {
            let snapshot = state
                .config
                .get_config_snapshot()
                .map_err(|e| anyhow::anyhow!("cannot read config: {}", e))?;
            println!("{}", snapshot);
        }
    }

    Ok(())
}

fn event_filter(args: &RuleArgs) -> Option<Vec<i64>> {
    if args.events.is_empty() {
        None
    } else {
        Some(args.events.clone())
    }
}

/// None keeps the stored defaults; any flag patches them
async fn rules_from_args(state: &AppState, args: &RuleArgs) -> anyhow::Result<Option<RotationRules>> {
    if args.minimum_primary.is_none() && args.daily_limit.is_none() && !args.no_role_priority {
        return Ok(None);
    }
    let mut rules = state
        .config
        .load_rules()
        .await
        .map_err(|e| anyhow::anyhow!("cannot load rules: {}", e))?;
    if let Some(minimum_primary) = args.minimum_primary {
        rules.minimum_primary = minimum_primary;
    }
    if let Some(daily_limit) = args.daily_limit {
        rules.daily_limit = daily_limit;
    }
    if args.no_role_priority {
        rules.prioritize_roles = false;
    }
    Ok(Some(rules))
}

fn print_generation(outcome: &GenerationOutcome) {
    println!(
        "{} (run {})",
        i18n::t_with_args("run.completed", &[("count", &outcome.assignments_count.to_string())]),
        outcome.run_id
    );
    for assignment in &outcome.assignments {
        println!(
            "  {} {} {} - {}",
            assignment.date,
            assignment.time.format("%H:%M"),
            assignment.location,
            assignment.candidate_name
        );
    }
    for alert in &outcome.alerts {
        println!("  [{:?}] {}", alert.severity, alert.message);
    }
    let short = outcome.staffing.iter().filter(|s| !s.outcome.is_fully_staffed()).count();
    if short > 0 {
        println!("{}", i18n::t_with_args("run.short_events", &[("count", &short.to_string())]));
    }
}

fn print_preview(outcome: &PreviewOutcome) {
    for staffing in &outcome.staffing {
        let names: Vec<&str> = staffing.slate.iter().map(|s| s.display_name.as_str()).collect();
        let marker = match staffing.outcome {
            StaffingOutcome::Fulfilled => "ok",
            StaffingOutcome::DegradedFulfilled { .. } => "degraded",
            StaffingOutcome::Unfulfilled { .. } => "short",
        };
        println!(
            "{} {} {} [{}] {}",
            staffing.event.date,
            staffing.event.time.format("%H:%M"),
            staffing.event.location,
            marker,
            names.join(", ")
        );
    }
    for alert in &outcome.alerts {
        println!("  [{:?}] {}", alert.severity, alert.message);
    }
}
