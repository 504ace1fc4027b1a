//! Algorithm comparison runner.
//!
//! Reads run settings from the environment (see [`dynamic_matching::config`]) and
//! prints one JSON summary line per algorithm.

use dynamic_matching::{compare, RunConfig};
use log::error;

fn main() {
    let _ = env_logger::try_init();
    let config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    eprintln!(
        "comparing {:?} over {} run(s) of {} step(s)",
        config.algorithms, config.runs, config.steps
    );
    match compare(&config) {
        Ok(summaries) => {
            for summary in &summaries {
                match serde_json::to_string(summary) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("failed to serialize summary: {}", e),
                }
            }
        }
        Err(e) => {
            error!("comparison failed: {}", e);
            std::process::exit(1);
        }
    }
}
