//! Dashboard: today's progress against the configured daily targets,
//! weekly stats and achievements in one view.

use chrono::Utc;
use focusnest_core::{Config, StatsCache, StoreClient};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = StoreClient::open()?;
    let config = Config::load_or_default();
    let user = store.current_user()?;

    let midnight = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or("invalid midnight")?
        .and_utc();
    let today_tasks = store.completed_tasks_since(user, midnight).unwrap_or_default();
    let today_sessions = store.sessions_since(user, midnight).unwrap_or_default();
    let today_focus: u64 = today_sessions.iter().map(|s| s.duration_min as u64).sum();

    println!("Today");
    println!(
        "  tasks completed: {} / {}",
        today_tasks.len(),
        config.targets.daily_tasks
    );
    println!(
        "  focus minutes:   {} / {}",
        today_focus, config.targets.daily_focus_min
    );

    let mut cache = StatsCache::new();
    let weekly = cache.fetch(&store, user)?;
    println!("Last 7 days");
    println!("  tasks completed: {}", weekly.completed_tasks);
    println!("  focus sessions:  {}", weekly.focus_sessions);
    println!("  focus minutes:   {}", weekly.focus_minutes);
    for (day, count) in &weekly.daily_completions {
        println!("    {day}: {count}");
    }

    let achievements = store.list_achievements()?;
    if !achievements.is_empty() {
        println!("Achievements");
        for a in &achievements {
            let mark = if a.completed { "x" } else { " " };
            println!("  [{mark}] {} {} ({}/{})", a.icon, a.name, a.progress, a.target);
        }
    }

    Ok(())
}
