//! cc-safegate: PreToolUse hook for Claude Code.
//!
//! Reads a hook payload as JSON from stdin, evaluates the Bash command in it
//! against the configured rule tiers, and writes a permission decision to
//! stdout. Allow is silent; ask and deny emit the hook JSON.
//!
//! Exit codes:
//!   0 — a decision was made (or the payload was not ours to judge)
//!   1 — stdin could not be read
//!   2 — configuration error (bad overlay TOML, bad rule pattern)

use std::io::Read;
use std::process::ExitCode;

use log::debug;

use cc_safegate::config::Config;
use cc_safegate::gate::Gate;
use cc_safegate::{hook, logging};

struct CliArgs {
    escalate_deny: bool,
    dump_config: bool,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = CliArgs {
        escalate_deny: false,
        dump_config: false,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--escalate-deny" => args.escalate_deny = true,
            "--dump-config" => args.dump_config = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("cc-safegate: {e}");
            eprintln!("usage: cc-safegate [--escalate-deny] [--dump-config]");
            return ExitCode::from(2);
        }
    };

    // Config problems fail loudly before any decision is attempted.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cc-safegate: {e}");
            return ExitCode::from(2);
        }
    };

    if args.dump_config {
        match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("cc-safegate: failed to render config: {e}");
                return ExitCode::from(2);
            }
        }
    }

    let mut gate = match Gate::from_config(&config) {
        Ok(gate) => gate,
        Err(e) => {
            eprintln!("cc-safegate: {e}");
            return ExitCode::from(2);
        }
    };
    if args.escalate_deny {
        gate.set_escalate_deny(true);
    }

    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("cc-safegate: failed to read stdin");
        return ExitCode::from(1);
    }

    let command = match hook::parse_invocation(&input) {
        hook::Invocation::Shell { command } => command,
        hook::Invocation::Ignored { why } => {
            debug!("ignoring payload: {why}");
            return ExitCode::SUCCESS;
        }
    };

    let result = gate.evaluate(&command);
    logging::log_decision(&command, &result);

    if let Some(output) = hook::render(&result, &command) {
        println!("{output}");
    }
    ExitCode::SUCCESS
}
