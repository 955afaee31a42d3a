use std::sync::Arc;

use tally_core::config::SignupConfig;

#[tokio::main]
async fn main() -> Result<(), tally_core::Error> {
    let cfg = match SignupConfig::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("Error: {}", e.startup_message());
            std::process::exit(1);
        }
    };

    tally_core::logging::init("tally-signup")?;

    tally_telegram::router::run_signup_bot(cfg)
        .await
        .map_err(|e| tally_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
