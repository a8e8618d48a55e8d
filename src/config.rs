use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedded default rule tables.
const DEFAULT_RULES: &str = include_str!("../rules.default.toml");

/// Path of the optional user overlay, tilde-expanded at load time.
const USER_RULES_PATH: &str = "~/.config/cc-safegate/rules.toml";

/// Errors that make the gate unusable. Reported at startup with a non-zero
/// exit, never swallowed into a defaults-only or rule-less run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid rule pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: Box<fancy_regex::Error>,
    },
    #[error("invalid binary name {0:?} in [normalize]: letters, digits, '-' and '_' only")]
    BinaryName(String),
}

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub normalize: Normalize,
    #[serde(default)]
    pub rules: Rules,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub escalate_deny: bool,
}

/// Binaries whose absolute system paths are rewritten to the bare name
/// before rule matching (`/usr/bin/rm ...` -> `rm ...`).
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Normalize {
    #[serde(default)]
    pub binaries: Vec<String>,
}

/// The three rule tiers. Order inside each list is the match order.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Rules {
    #[serde(default)]
    pub safe: Vec<RuleEntry>,
    #[serde(default)]
    pub dangerous: Vec<RuleEntry>,
    #[serde(default)]
    pub risky: Vec<RuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleEntry {
    pub pattern: String,
    pub reason: String,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    normalize: NormalizeOverlay,
    #[serde(default)]
    rules: RulesOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    escalate_deny: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct NormalizeOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    binaries: Vec<String>,
    #[serde(default)]
    remove_binaries: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RulesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    safe: Vec<RuleEntry>,
    #[serde(default)]
    dangerous: Vec<RuleEntry>,
    #[serde(default)]
    risky: Vec<RuleEntry>,
    #[serde(default)]
    remove_safe: Vec<String>,
    #[serde(default)]
    remove_dangerous: Vec<String>,
    #[serde(default)]
    remove_risky: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

/// Same merge semantics for rule lists. Removal is keyed on the exact
/// pattern text, so users can drop a default rule without retyping its reason.
fn merge_rules(base: &mut Vec<RuleEntry>, add: Vec<RuleEntry>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|entry| !remove.contains(&entry.pattern));
        for entry in add {
            if !base.iter().any(|e| e.pattern == entry.pattern) {
                base.push(entry);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_RULES).expect("embedded default rules must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/cc-safegate/rules.toml (if exists)
    ///
    /// User config merges with defaults: lists extend, scalars override.
    /// Set `replace = true` in any section to replace its defaults entirely.
    /// Use `remove_<field>` lists to subtract specific items from defaults.
    ///
    /// A missing overlay file is fine; an unreadable or malformed one is an
    /// error, so a typo in user rules never degrades into defaults-only.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay()? {
            config.apply_overlay(overlay);
        }
        Ok(config)
    }

    /// Try to load the user overlay.
    fn load_overlay() -> Result<Option<ConfigOverlay>, ConfigError> {
        let path = shellexpand::tilde(USER_RULES_PATH).into_owned();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Read { path, source: e }),
        };
        let overlay =
            toml::from_str(&content).map_err(|e| ConfigError::Parse { path, source: e })?;
        Ok(Some(overlay))
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        if let Some(v) = overlay.settings.escalate_deny {
            self.settings.escalate_deny = v;
        }

        // Normalize
        let n = overlay.normalize;
        merge_list(
            &mut self.normalize.binaries,
            n.binaries,
            &n.remove_binaries,
            n.replace,
        );

        // Rules
        let r = overlay.rules;
        merge_rules(&mut self.rules.safe, r.safe, &r.remove_safe, r.replace);
        merge_rules(
            &mut self.rules.dangerous,
            r.dangerous,
            &r.remove_dangerous,
            r.replace,
        );
        merge_rules(&mut self.rules.risky, r.risky, &r.remove_risky, r.replace);
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
