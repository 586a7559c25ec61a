use ns_core::rules::RuleSet;

/// Error type for manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid version directive: {0}")]
    InvalidVersion(String),
}

/// A parsed rule manifest, before dedup and rule-set construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub version: u32,
    pub rules: Vec<String>,
}

impl Manifest {
    /// Finalize into the engine's rule set.
    pub fn into_rule_set(self) -> RuleSet {
        RuleSet::new(self.version, self.rules)
    }
}

/// Parse a rule manifest.
///
/// Only `!` introduces comments: `#` starts a perfectly valid selector.
/// A missing `! Version:` directive leaves the manifest at version 0.
pub fn parse_rule_manifest(text: &str) -> Result<Manifest, ManifestError> {
    let mut version = 0u32;
    let mut rules = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('!') {
            if let Some(value) = comment.trim().strip_prefix("Version:") {
                let value = value.trim();
                version = value
                    .parse::<u32>()
                    .map_err(|_| ManifestError::InvalidVersion(value.to_string()))?;
            }
            continue;
        }

        rules.push(line.to_string());
    }

    Ok(Manifest { version, rules })
}
