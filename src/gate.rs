use crate::config::{Config, ConfigError};
use crate::normalize::Normalizer;
use crate::rules::{Decision, RuleMatch, RuleSet};

/// The full decision pipeline: normalize, classify, optionally soften.
///
/// Stateless per invocation: the same command and config always produce
/// the same decision.
pub struct Gate {
    normalizer: Normalizer,
    rules: RuleSet,
    escalate_deny: bool,
}

impl Gate {
    /// Build the gate from configuration, compiling all patterns up front.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            normalizer: Normalizer::from_binaries(&config.normalize.binaries)?,
            rules: RuleSet::compile(&config.rules)?,
            escalate_deny: config.settings.escalate_deny,
        })
    }

    /// Override the escalate_deny setting (e.g. from --escalate-deny CLI flag).
    pub fn set_escalate_deny(&mut self, escalate: bool) {
        self.escalate_deny = escalate;
    }

    /// Apply escalate_deny: DENY -> ASK with annotation.
    fn maybe_escalate(&self, mut result: RuleMatch) -> RuleMatch {
        if self.escalate_deny && result.decision == Decision::Deny {
            result.decision = Decision::Ask;
            result.reason = result
                .reason
                .map(|r| format!("{r} (escalated from deny)"));
        }
        result
    }

    /// Evaluate a command string and return the decision with its reason.
    ///
    /// The normalized form is used only for matching; callers keep the
    /// original text for output and logging.
    pub fn evaluate(&self, command: &str) -> RuleMatch {
        let normalized = self.normalizer.normalize(command);
        self.maybe_escalate(self.rules.classify(&normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_gate() -> Gate {
        Gate::from_config(&Config::default_config()).unwrap()
    }

    #[test]
    fn normalizes_before_matching() {
        let gate = default_gate();
        // Safe temp exemption must fire on the path-invoked form too
        let result = gate.evaluate("/bin/rm -rf /tmp/scratch");
        assert_eq!(result.decision, Decision::Allow);
    }

    #[test]
    fn path_argument_does_not_trigger_normalization() {
        let gate = default_gate();
        let result = gate.evaluate("rm /home/user/bin/rm");
        assert_eq!(result.decision, Decision::Allow);
        assert!(result.reason.is_none());
    }

    #[test]
    fn escalate_deny_softens_to_ask() {
        let mut gate = default_gate();
        gate.set_escalate_deny(true);
        let result = gate.evaluate("git reset --hard");
        assert_eq!(result.decision, Decision::Ask);
        assert!(result.reason.unwrap().contains("escalated from deny"));
    }

    #[test]
    fn escalate_deny_leaves_ask_alone() {
        let mut gate = default_gate();
        gate.set_escalate_deny(true);
        let result = gate.evaluate("git stash drop");
        assert_eq!(result.decision, Decision::Ask);
        assert!(!result.reason.unwrap().contains("escalated"));
    }

    #[test]
    fn escalate_deny_leaves_allow_alone() {
        let mut gate = default_gate();
        gate.set_escalate_deny(true);
        let result = gate.evaluate("ls -la");
        assert_eq!(result.decision, Decision::Allow);
    }

    #[test]
    fn deterministic_across_calls() {
        let gate = default_gate();
        let a = gate.evaluate("git push --force origin main");
        let b = gate.evaluate("git push --force origin main");
        assert_eq!(a.decision, b.decision);
        assert_eq!(a.reason, b.reason);
    }
}
