use fancy_regex::Regex;

use crate::config::{ConfigError, Rules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Decision {
    Allow,
    Ask,
    Deny,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Ask => "ask",
            Decision::Deny => "deny",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Ask => "ASK",
            Decision::Deny => "DENY",
        }
    }
}

/// Outcome of classifying one command. `reason` is the matched rule's text;
/// it is `None` when no rule matched and the command fell through to allow.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub decision: Decision,
    pub reason: Option<String>,
}

struct CompiledRule {
    regex: Regex,
    reason: String,
}

impl CompiledRule {
    /// Whole-string search, so a destructive fragment buried in a chained
    /// command (`touch a && git reset --hard`) still matches.
    ///
    /// Fail-open on engine errors (e.g. backtrack limit): no match.
    fn matches(&self, command: &str) -> bool {
        self.regex.is_match(command).unwrap_or(false)
    }
}

/// The three rule tiers, compiled. Evaluation order is fixed:
/// safe short-circuits to allow, then dangerous, then risky.
pub struct RuleSet {
    safe: Vec<CompiledRule>,
    dangerous: Vec<CompiledRule>,
    risky: Vec<CompiledRule>,
}

fn compile_tier(entries: &[crate::config::RuleEntry]) -> Result<Vec<CompiledRule>, ConfigError> {
    entries
        .iter()
        .map(|entry| {
            let regex = Regex::new(&entry.pattern).map_err(|e| ConfigError::Pattern {
                pattern: entry.pattern.clone(),
                source: Box::new(e),
            })?;
            Ok(CompiledRule {
                regex,
                reason: entry.reason.clone(),
            })
        })
        .collect()
}

impl RuleSet {
    /// Compile all tiers up front. Any bad pattern is a startup error,
    /// never a silently skipped rule.
    pub fn compile(rules: &Rules) -> Result<Self, ConfigError> {
        Ok(Self {
            safe: compile_tier(&rules.safe)?,
            dangerous: compile_tier(&rules.dangerous)?,
            risky: compile_tier(&rules.risky)?,
        })
    }

    /// Classify a (normalized) command string.
    ///
    /// First safe match wins outright. Otherwise the worst remaining tier
    /// that matches decides: dangerous -> deny, risky -> ask. A command
    /// matching nothing is allowed; the permission model already gates
    /// anything the agent has not been granted.
    pub fn classify(&self, command: &str) -> RuleMatch {
        for rule in &self.safe {
            if rule.matches(command) {
                return RuleMatch {
                    decision: Decision::Allow,
                    reason: Some(rule.reason.clone()),
                };
            }
        }
        for rule in &self.dangerous {
            if rule.matches(command) {
                return RuleMatch {
                    decision: Decision::Deny,
                    reason: Some(rule.reason.clone()),
                };
            }
        }
        for rule in &self.risky {
            if rule.matches(command) {
                return RuleMatch {
                    decision: Decision::Ask,
                    reason: Some(rule.reason.clone()),
                };
            }
        }
        RuleMatch {
            decision: Decision::Allow,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn default_rules() -> RuleSet {
        RuleSet::compile(&Config::default_config().rules).unwrap()
    }

    #[test]
    fn decision_ordering() {
        assert!(Decision::Allow < Decision::Ask);
        assert!(Decision::Ask < Decision::Deny);
    }

    #[test]
    fn default_rules_compile() {
        default_rules();
    }

    #[test]
    fn unmatched_command_allows_without_reason() {
        let rules = default_rules();
        let result = rules.classify("cargo build --release");
        assert_eq!(result.decision, Decision::Allow);
        assert!(result.reason.is_none());
    }

    #[test]
    fn safe_match_carries_reason() {
        let rules = default_rules();
        let result = rules.classify("git checkout -b feature/gate");
        assert_eq!(result.decision, Decision::Allow);
        assert!(result.reason.is_some());
    }

    #[test]
    fn safe_beats_dangerous() {
        // Temp-path rm also matches the generic recursive-force rule;
        // the safe tier must win.
        let rules = default_rules();
        let result = rules.classify("rm -rf /tmp/build-cache");
        assert_eq!(result.decision, Decision::Allow);
    }

    #[test]
    fn dangerous_beats_risky() {
        // A root-path rm matches both the dangerous root rule and the
        // generic risky recursive-force rule.
        let rules = default_rules();
        let result = rules.classify("rm -rf /var/lib/data");
        assert_eq!(result.decision, Decision::Deny);
    }

    #[test]
    fn dangerous_match_denies_with_reason() {
        let rules = default_rules();
        let result = rules.classify("git reset --hard");
        assert_eq!(result.decision, Decision::Deny);
        let reason = result.reason.unwrap();
        assert!(reason.contains("uncommitted"), "reason: {reason}");
    }

    #[test]
    fn risky_match_asks_with_question() {
        let rules = default_rules();
        let result = rules.classify("git checkout -- notes.txt");
        assert_eq!(result.decision, Decision::Ask);
        let reason = result.reason.unwrap();
        assert!(reason.ends_with('?'), "reason: {reason}");
    }

    #[test]
    fn chained_command_fragment_matches() {
        let rules = default_rules();
        let result = rules.classify("touch tmp.txt && git reset --hard");
        assert_eq!(result.decision, Decision::Deny);
    }

    #[test]
    fn bad_pattern_is_a_compile_error() {
        let rules = Rules {
            safe: vec![],
            dangerous: vec![crate::config::RuleEntry {
                pattern: "(unclosed".to_string(),
                reason: "broken".to_string(),
            }],
            risky: vec![],
        };
        assert!(matches!(
            RuleSet::compile(&rules),
            Err(ConfigError::Pattern { .. })
        ));
    }
}
