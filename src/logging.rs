use log::{LevelFilter, info};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::rules::RuleMatch;

/// Where decision records land, under the user's home.
const LOG_DIR: &str = "~/.local/share/cc-safegate";

/// Initialize file logging to ~/.local/share/cc-safegate/gate.log.
/// Best-effort: failures are silently ignored (logging must never block the hook).
pub fn init() {
    let dir = shellexpand::tilde(LOG_DIR).into_owned();
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(std::path::Path::new(&dir).join("gate.log"))
    else {
        return;
    };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let _ = WriteLogger::init(LevelFilter::Info, config, file);
}

/// Record one decision.
pub fn log_decision(command: &str, result: &RuleMatch) {
    // Compact single-line reason for the log (replace newlines with "; ")
    let reason = result
        .reason
        .as_deref()
        .unwrap_or("no rule matched")
        .replace('\n', "; ");
    let cmd_truncated: String = command.chars().take(200).collect();
    info!(
        "{decision}\t{cmd_truncated}\t{reason}",
        decision = result.decision.label(),
    );
}
