use std::borrow::Cow;

use fancy_regex::Regex;

use crate::config::ConfigError;

/// Rewrites an absolute system-path invocation of a watched binary to its
/// bare name, so `/usr/bin/rm -rf /` matches the same rules as `rm -rf /`.
///
/// Only the first token of the command is eligible: the pattern is anchored
/// at the start of the string and requires the binary name to be followed by
/// whitespace or end of input. Argument tokens are never rewritten, so
/// `rm /home/user/bin/rm` keeps its path argument intact.
pub struct Normalizer {
    path_prefix: Regex,
}

impl Normalizer {
    /// Build a normalizer for the given binary names.
    ///
    /// Names are restricted to `[A-Za-z0-9_-]` so they can be spliced into
    /// the alternation verbatim; anything else is a configuration error.
    pub fn from_binaries(binaries: &[String]) -> Result<Self, ConfigError> {
        for name in binaries {
            if name.is_empty()
                || !name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(ConfigError::BinaryName(name.clone()));
            }
        }
        let alternation = binaries.join("|");
        let pattern = format!(r"^/(?:\S*/)*s?bin/({alternation})(?=\s|$)");
        let path_prefix = Regex::new(&pattern).map_err(|e| ConfigError::Pattern {
            pattern,
            source: Box::new(e),
        })?;
        Ok(Self { path_prefix })
    }

    /// Strip the path prefix from the leading binary, if it is one of the
    /// watched names under a `bin/` or `sbin/` directory.
    ///
    /// Fail-open: a regex engine error leaves the command untouched.
    pub fn normalize<'a>(&self, command: &'a str) -> Cow<'a, str> {
        self.path_prefix
            .try_replacen(command, 1, "$1")
            .unwrap_or(Cow::Borrowed(command))
    }
}
