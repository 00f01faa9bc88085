use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Turns verbose output on when either the CLI flag or the
/// CLAIMSBOT_VERBOSE env flag asks for it. Called once from main.
pub fn init(cli_flag: bool) {
    let enabled = cli_flag || env_flag();
    VERBOSE.store(enabled, Ordering::Relaxed);
    if enabled {
        emit("", "verbose logging enabled");
    }
}

pub fn info(message: impl AsRef<str>) {
    emit("", message.as_ref());
}

/// Progress line for a named subcommand step.
pub fn task(name: &str, message: impl AsRef<str>) {
    emit(name, message.as_ref());
}

pub fn verbose(message: impl AsRef<str>) {
    if VERBOSE.load(Ordering::Relaxed) {
        emit("verbose", message.as_ref());
    }
}

fn emit(scope: &str, message: &str) {
    if scope.is_empty() {
        eprintln!("[claimsbot] {message}");
    } else {
        eprintln!("[claimsbot::{scope}] {message}");
    }
}

fn env_flag() -> bool {
    env::var("CLAIMSBOT_VERBOSE")
        .map(|value| flag_set(&value))
        .unwrap_or(false)
}

fn flag_set(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_accepts_common_truthy_spellings() {
        for raw in ["1", "true", "YES", " on "] {
            assert!(flag_set(raw), "{raw}");
        }
        for raw in ["", "0", "false", "off", "maybe"] {
            assert!(!flag_set(raw), "{raw}");
        }
    }
}
