//! PreToolUse wire protocol: parse the hook payload from stdin, render the
//! decision JSON for stdout.
//!
//! Input handling is fail-open: a payload this hook cannot understand
//! (malformed JSON, a different tool, a missing or non-string command)
//! produces no output, which the agent treats as allow. The gate only
//! speaks up when it has a real command to judge.

use serde::Deserialize;

use crate::rules::{Decision, RuleMatch};

#[derive(Deserialize)]
struct HookInput {
    tool_name: Option<String>,
    tool_input: Option<ToolInput>,
}

#[derive(Deserialize)]
struct ToolInput {
    // Kept as a raw value so a non-string command (agent bug, schema drift)
    // is ignored rather than failing the whole parse.
    command: Option<serde_json::Value>,
}

/// What the payload turned out to be.
pub enum Invocation {
    /// A Bash tool call with a non-empty command to evaluate.
    Shell { command: String },
    /// Anything else; the hook stays silent.
    Ignored { why: &'static str },
}

/// Parse the raw stdin payload into an [`Invocation`].
pub fn parse_invocation(input: &str) -> Invocation {
    let hook_input: HookInput = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => return Invocation::Ignored { why: "malformed JSON payload" },
    };

    if hook_input.tool_name.as_deref() != Some("Bash") {
        return Invocation::Ignored { why: "tool is not Bash" };
    }

    let Some(tool_input) = hook_input.tool_input else {
        return Invocation::Ignored { why: "missing tool_input" };
    };
    let Some(command) = tool_input.command else {
        return Invocation::Ignored { why: "missing command" };
    };
    let Some(command) = command.as_str() else {
        return Invocation::Ignored { why: "command is not a string" };
    };
    if command.is_empty() {
        return Invocation::Ignored { why: "empty command" };
    }

    Invocation::Shell { command: command.to_string() }
}

/// Render the stdout response for a decision, echoing the original
/// (pre-normalization) command text so the user sees exactly what was
/// gated. Allow produces no output at all.
pub fn render(result: &RuleMatch, original_command: &str) -> Option<String> {
    let reason = match result.decision {
        Decision::Allow => return None,
        Decision::Ask => format!(
            "{reason}\n\nCommand: {original_command}",
            reason = result
                .reason
                .as_deref()
                .unwrap_or("This command needs confirmation before it runs."),
        ),
        Decision::Deny => format!(
            "BLOCKED by cc-safegate\n\n\
             Reason: {reason}\n\n\
             Command: {original_command}\n\n\
             If this operation is truly needed, ask the user for explicit \
             permission and have them run the command manually.",
            reason = result
                .reason
                .as_deref()
                .unwrap_or("This command matched a destructive pattern."),
        ),
    };

    let output = serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": "PreToolUse",
            "permissionDecision": result.decision.as_str(),
            "permissionDecisionReason": reason,
        }
    });
    Some(output.to_string())
}
