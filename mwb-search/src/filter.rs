//! Regex post-filters applied to the unified result set.

use regex::Regex;

use crate::errors::{MediaSearchError, PatternKind};
use crate::multi_search::UnifiedResultSet;
use crate::types::ResultItem;

/// Compiled include and exclude patterns.
///
/// An item is kept when no include pattern is given or at least one
/// matches, and no exclude pattern matches. Patterns search anywhere in
/// [`ResultItem::text_surface`] and are case-sensitive unless they carry
/// an inline `(?i)` flag.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl FilterSpec {
    /// Compiles every pattern up front.
    ///
    /// # Errors
    /// - `MediaSearchError::InvalidPattern` - first pattern that fails to compile
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, MediaSearchError> {
        Ok(Self {
            include: compile(include, PatternKind::Include)?,
            exclude: compile(exclude, PatternKind::Exclude)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn matches(&self, item: &ResultItem) -> bool {
        let surface = item.text_surface();
        let included =
            self.include.is_empty() || self.include.iter().any(|re| re.is_match(&surface));
        included && !self.exclude.iter().any(|re| re.is_match(&surface))
    }

    pub fn apply(&self, mut results: UnifiedResultSet) -> UnifiedResultSet {
        if self.is_empty() {
            return results;
        }

        let before = results.len();
        results.retain(|item| self.matches(item));
        tracing::debug!(
            include = self.include.len(),
            exclude = self.exclude.len(),
            before_count = before,
            after_count = results.len(),
            "Results filtered"
        );
        results
    }
}

fn compile<S: AsRef<str>>(
    patterns: &[S],
    kind: PatternKind,
) -> Result<Vec<Regex>, MediaSearchError> {
    patterns
        .iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(pattern).map_err(|e| MediaSearchError::InvalidPattern {
                kind,
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::item;

    fn sample() -> UnifiedResultSet {
        let mut described = item("ZDF", "Terra X", "Die Römer", "c");
        described.description = "Eine Dokumentation über Rom".to_string();

        UnifiedResultSet::unify(vec![vec![
            item("ARD", "Tatort", "Borowski und der Engel", "a"),
            item("ARD", "Tatort", "Borowski (Audiodeskription)", "b"),
            described,
            item("ARD", "Polizeiruf 110", "Kiel", "d"),
        ]])
    }

    fn titles(set: &UnifiedResultSet) -> Vec<&str> {
        set.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_empty_spec_keeps_everything() {
        let spec = FilterSpec::new::<&str>(&[], &[]).unwrap();
        assert!(spec.is_empty());
        assert_eq!(spec.apply(sample()).len(), 4);
    }

    #[test]
    fn test_exclude_removes_matches() {
        let spec = FilterSpec::new(&[], &["Audiodeskription"]).unwrap();
        assert_eq!(
            titles(&spec.apply(sample())),
            vec!["Borowski und der Engel", "Die Römer", "Kiel"]
        );
    }

    #[test]
    fn test_include_any_pattern() {
        let spec = FilterSpec::new(&["Engel", "Dokumentation"], &[]).unwrap();
        assert_eq!(titles(&spec.apply(sample())), vec!["Borowski und der Engel", "Die Römer"]);
    }

    #[test]
    fn test_include_and_exclude_combine() {
        let spec = FilterSpec::new(&["Tatort"], &["Audio"]).unwrap();
        assert_eq!(titles(&spec.apply(sample())), vec!["Borowski und der Engel"]);
    }

    #[test]
    fn test_case_sensitive_unless_flagged() {
        let strict = FilterSpec::new(&["tatort"], &[]).unwrap();
        assert!(strict.apply(sample()).is_empty());

        let relaxed = FilterSpec::new(&["(?i)tatort"], &[]).unwrap();
        assert_eq!(relaxed.apply(sample()).len(), 2);
    }

    #[test]
    fn test_anchors_apply_to_surface() {
        // surface starts with the title
        let spec = FilterSpec::new(&["^Kiel"], &[]).unwrap();
        assert_eq!(titles(&spec.apply(sample())), vec!["Kiel"]);
    }

    #[test]
    fn test_invalid_pattern_fails_fast() {
        let err = FilterSpec::new(&["ok"], &["(unclosed"]).unwrap_err();
        match err {
            MediaSearchError::InvalidPattern { kind, pattern, .. } => {
                assert_eq!(kind, PatternKind::Exclude);
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
