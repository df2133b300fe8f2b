// ==========================================
// Altar Rota - demo database seeding
// ==========================================
// Usage: seed_demo_db [db_path] [start_date YYYY-MM-DD]
// Backs up an existing file, then creates locations, candidates and
// one month-long period with a typical parish schedule.
// ==========================================

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use std::error::Error;
use std::fs;
use std::path::Path;

use altar_rota::app::{get_default_db_path, AppState};
use altar_rota::domain::{Availability, EventDraft, Location, NewCandidate, NewPeriod, Weekday};
use altar_rota::logging;

const MATRIZ: &str = "Matriz";
const CAPELA: &str = "Capela São José";

// (name, primary, secondary, weekdays, locations)
const CANDIDATES: &[(&str, bool, bool, &[&str], &[&str])] = &[
    ("Ana Souza", true, false, &["Domingo", "Sábado"], &[MATRIZ, CAPELA]),
    ("Bruno Lima", true, false, &["Domingo", "Quarta"], &[MATRIZ]),
    ("Carla Dias", false, true, &["Domingo"], &[MATRIZ, CAPELA]),
    ("Daniel Rocha", false, true, &["Sábado", "Domingo"], &[CAPELA]),
    ("Elisa Nunes", false, false, &["Domingo", "Quarta"], &[MATRIZ]),
    ("Felipe Alves", false, false, &["Sábado"], &[MATRIZ, CAPELA]),
    ("Gabriela Reis", true, true, &["Quarta", "Sábado", "Domingo"], &[MATRIZ]),
    ("Heitor Melo", false, false, &["Domingo"], &[MATRIZ, CAPELA]),
    ("Isabel Costa", false, true, &["Quarta"], &[MATRIZ]),
    ("João Pereira", false, false, &["Sábado", "Domingo"], &[MATRIZ, CAPELA]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    let start = match std::env::args().nth(2) {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")?,
        None => first_of_next_month(Local::now().date_naive()),
    };

    backup_and_reset_db(&db_path)?;
    let state = AppState::new(&db_path)?;

    // ==========================================
    // locations + candidates
    // ==========================================
    for name in [MATRIZ, CAPELA] {
        state.candidate_api.add_location(name)?;
    }
    for (name, primary, secondary, weekdays, locations) in CANDIDATES {
        state.candidate_api.register(&NewCandidate {
            display_name: name.to_string(),
            primary_role: *primary,
            secondary_role: *secondary,
            availability: Availability::parse(weekdays, locations)?,
        })?;
    }

    // ==========================================
    // period with a parish schedule
    // ==========================================
    let end = start + Duration::days(27);
    let (period, events) = state
        .rotation_api
        .create_period(&NewPeriod {
            name: format!("Escala {}", start.format("%Y-%m")),
            start_date: start,
            end_date: end,
            events: parish_schedule(start, end)?,
        })
        .await?;

    println!(
        "Seeded {}: {} candidates, period {} ({}..{}) with {} events",
        db_path,
        CANDIDATES.len(),
        period.period_id,
        period.start_date,
        period.end_date,
        events.len()
    );
    Ok(())
}

/// Sunday 08:00 + 10:00 at the parish church, Saturday 19:00 at the
/// chapel, Wednesday 19:30 at the parish church
fn parish_schedule(start: NaiveDate, end: NaiveDate) -> Result<Vec<EventDraft>, Box<dyn Error>> {
    let matriz = Location::new(MATRIZ)?;
    let capela = Location::new(CAPELA)?;
    let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).ok_or("invalid time");

    let mut drafts = Vec::new();
    let mut day = start;
    while day <= end {
        let slots = match Weekday::from_date(day) {
            Weekday::Sunday => vec![(at(8, 0)?, &matriz), (at(10, 0)?, &matriz)],
            Weekday::Saturday => vec![(at(19, 0)?, &capela)],
            Weekday::Wednesday => vec![(at(19, 30)?, &matriz)],
            _ => Vec::new(),
        };
        for (time, location) in slots {
            drafts.push(EventDraft {
                date: day,
                time,
                location: location.clone(),
                required_headcount: None,
            });
        }
        day += Duration::days(1);
    }
    Ok(drafts)
}

fn first_of_next_month(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
