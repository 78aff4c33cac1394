//! Achievement listing (read-only).

use clap::Subcommand;
use focusnest_core::StoreClient;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List achievements with progress
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StoreClient::open()?;

    match action {
        AchievementsAction::List { json } => {
            let achievements = store.list_achievements()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&achievements)?);
            } else if achievements.is_empty() {
                println!("no achievements yet");
            } else {
                for a in &achievements {
                    let mark = if a.completed { "x" } else { " " };
                    println!("[{mark}] {} {} ({}/{})", a.icon, a.name, a.progress, a.target);
                }
            }
        }
    }
    Ok(())
}
