//! Weekly statistics commands.

use clap::Subcommand;
use focusnest_core::{StatsCache, StoreClient};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Stats over the trailing seven days
    Weekly {
        /// Recompute instead of serving a cached value
        #[arg(long)]
        refresh: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StoreClient::open()?;
    let user = store.current_user()?;
    let mut cache = StatsCache::new();

    match action {
        StatsAction::Weekly { refresh } => {
            let stats = if refresh {
                cache.refresh(&store, user)?
            } else {
                cache.fetch(&store, user)?
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
