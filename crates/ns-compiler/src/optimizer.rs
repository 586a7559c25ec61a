use std::collections::HashSet;

use log::debug;

pub struct OptimizeStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
}

/// Order-preserving dedup of raw selector rules.
///
/// Duplicates are harmless at runtime (set union) but inflate the
/// combined selector, so manifests are deduped before compilation.
pub fn dedup_rules(rules: &mut Vec<String>) -> OptimizeStats {
    let before = rules.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped = 0usize;
    rules.retain(|rule| {
        if seen.contains(rule) {
            deduped += 1;
            false
        } else {
            seen.insert(rule.clone());
            true
        }
    });

    if deduped > 0 {
        debug!("deduped {deduped} rule(s)");
    }

    OptimizeStats {
        before,
        after: rules.len(),
        deduped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_occurrence_in_order() {
        let mut rules: Vec<String> = ["a", "b", "a", "c", "b"]
            .iter()
            .map(|r| r.to_string())
            .collect();

        let stats = dedup_rules(&mut rules);

        assert_eq!(rules, vec!["a", "b", "c"]);
        assert_eq!(stats.before, 5);
        assert_eq!(stats.after, 3);
        assert_eq!(stats.deduped, 2);
    }

    #[test]
    fn unique_rules_pass_through() {
        let mut rules: Vec<String> = ["a", "b"].iter().map(|r| r.to_string()).collect();
        let stats = dedup_rules(&mut rules);
        assert_eq!(stats.deduped, 0);
        assert_eq!(rules.len(), 2);
    }
}
