use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::cli::AuthCommands;
use crate::config::{Config, SessionConfig};
use crate::store::session::user_id_from_token;

pub fn run(command: AuthCommands) -> Result<()> {
    match command {
        AuthCommands::Login { token, user_id } => {
            let path = Config::path()?;
            let config = sign_in(&path, &token, user_id)?;
            if let Some(session) = &config.session {
                println!("{} as {}", "Signed in".green().bold(), session.user_id);
            }
            println!("Session stored in {}", path.display());
        }
        AuthCommands::Logout => {
            if sign_out(&Config::path()?)? {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        AuthCommands::Status => {
            let config = Config::load_or_default();
            match config.session().user_id() {
                Some(id) => println!("Signed in as {}", id.bold()),
                None => println!("{}", "Not signed in".yellow()),
            }
        }
    }
    Ok(())
}

fn sign_in(path: &Path, token: &str, user_id: Option<String>) -> Result<Config> {
    let mut config = Config::load_for_update_from(path)?;
    login(&mut config, token, user_id)?;
    config.save_to(path)?;
    Ok(config)
}

/// Returns false when there was no session to forget.
fn sign_out(path: &Path) -> Result<bool> {
    let mut config = Config::load_for_update_from(path)?;
    if config.session.take().is_none() {
        return Ok(false);
    }
    config.save_to(path)?;
    Ok(true)
}

fn login(config: &mut Config, token: &str, user_id: Option<String>) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Access token must not be empty.");
    }
    let user_id = match user_id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => user_id_from_token(token)?,
    };
    config.session = Some(SessionConfig {
        user_id,
        access_token: token.to_string(),
    });
    Ok(())
}
