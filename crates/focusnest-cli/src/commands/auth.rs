//! Sign-in management.
//!
//! Identity is a local profile row; logging in with a new email creates
//! one. Everything in the store is scoped to the signed-in profile.

use clap::Subcommand;
use focusnest_core::{StoreClient, StoreError};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in (creates the profile on first login)
    Login {
        /// Email address
        email: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StoreClient::open()?;

    match action {
        AuthAction::Login { email } => {
            let profile = store.sign_in(&email)?;
            println!("Signed in as {} ({})", profile.email, profile.id);
        }
        AuthAction::Logout => {
            store.sign_out()?;
            println!("Signed out");
        }
        AuthAction::Status => match store.current_profile() {
            Ok(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
            Err(StoreError::NotAuthenticated) => println!("not signed in"),
            Err(e) => return Err(Box::new(e)),
        },
    }
    Ok(())
}
