use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Mentions per outgoing `/everyone` message.
pub const BATCH_SIZE: usize = 25;

/// Pause between consecutive `/everyone` messages (outbound rate limits).
pub const BATCH_DELAY: Duration = Duration::from_millis(1200);

/// Memberships not seen for this many days are removed by `/prune`.
pub const STALE_DAYS: u32 = 90;

pub const DEFAULT_DB_PATH: &str = "members_normalized.db";

const SIGNUP_TOKEN_VAR: &str = "TG_BOT_TOKEN";
const ROSTER_TOKEN_VAR: &str = "TG_TOKEN";
const ROSTER_DB_VAR: &str = "ROSTER_DB_PATH";

/// Configuration of the sign-up list bot.
#[derive(Clone, Debug)]
pub struct SignupConfig {
    pub telegram_bot_token: String,
}

impl SignupConfig {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        Ok(Self {
            telegram_bot_token: required_token(SIGNUP_TOKEN_VAR, env_str(SIGNUP_TOKEN_VAR))?,
        })
    }
}

/// Configuration of the membership roster bot.
#[derive(Clone, Debug)]
pub struct RosterConfig {
    pub telegram_bot_token: String,
    pub db_path: PathBuf,
}

impl RosterConfig {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = required_token(ROSTER_TOKEN_VAR, env_str(ROSTER_TOKEN_VAR))?;
        let db_path = env_str(ROSTER_DB_VAR)
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        Ok(Self {
            telegram_bot_token,
            db_path,
        })
    }
}

fn required_token(key: &str, value: Option<String>) -> Result<String> {
    value
        .and_then(non_empty)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| Error::Config(format!("{key} environment variable not set")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
