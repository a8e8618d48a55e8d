//! cc-safegate: a PreToolUse hook for Claude Code that gates destructive Bash commands.
//!
//! This crate classifies shell commands into one of three decisions before
//! the agent runs them: [`rules::Decision::Allow`], [`rules::Decision::Ask`],
//! or [`rules::Decision::Deny`]. Commands are matched against ordered regex
//! rule tiers; anything matching no rule is allowed, because the agent's own
//! permission model already gates unknown commands.
//!
//! # Architecture
//!
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay merge.
//! - **[`normalize`]** — Absolute-path rewriting: `/usr/bin/rm ...` -> `rm ...`.
//! - **[`rules`]** — Decision types and the tiered regex classifier.
//! - **[`gate`]** — The pipeline: normalize, classify, optional deny escalation.
//! - **[`hook`]** — PreToolUse wire protocol: stdin payload, stdout decision JSON.
//! - **[`logging`]** — Decision logging to `~/.local/share/cc-safegate/gate.log`.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Decision pipeline: normalize, classify, escalate.
pub mod gate;
/// Hook payload parsing and decision output rendering.
pub mod hook;
/// File-based decision logging.
pub mod logging;
/// Path-prefix normalization for watched binaries.
pub mod normalize;
/// Rule tiers, compilation, and classification.
pub mod rules;

use rules::RuleMatch;

/// Build the gate from default config and evaluate a command string.
///
/// This is the main entry point for tests and simple usage.
/// For CLI usage with --escalate-deny or user config, build the gate directly.
pub fn evaluate(command: &str) -> RuleMatch {
    let config = config::Config::default_config();
    let gate = gate::Gate::from_config(&config).expect("embedded default rules must compile");
    gate.evaluate(command)
}
