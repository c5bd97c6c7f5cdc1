//! Scenario file discovery.
//!
//! The discovery pattern is a glob with optional `{a,b}` alternations, e.g.
//! `scenarios/**/*.{yaml,yml}`. Alternations are expanded first because the
//! `glob` crate does not support them; each expansion is then globbed relative
//! to the configuration root.

use crate::config::RunConfig;
use crate::result::SkenarioResult;
use crate::scenario::Scenario;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Expand `{a,b}` alternations into every concrete pattern.
///
/// Nested groups are supported; an unbalanced brace is kept literally.
#[must_use]
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = matching_brace(pattern, open) else {
        return vec![pattern.to_string()];
    };
    let prefix = &pattern[..open];
    let body = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    split_top_level(body)
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
        .collect()
}

fn matching_brace(pattern: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in pattern.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Files matching `pattern` under `root`, de-duplicated and sorted
pub fn discover_files(root: &Path, pattern: &str) -> SkenarioResult<Vec<PathBuf>> {
    let mut found = BTreeSet::new();
    for expanded in expand_braces(pattern) {
        let full = if Path::new(&expanded).is_absolute() {
            expanded
        } else {
            root.join(&expanded).to_string_lossy().into_owned()
        };
        for entry in glob::glob(&full)? {
            match entry {
                Ok(path) if path.is_file() => {
                    found.insert(path);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
            }
        }
    }
    tracing::debug!(pattern, count = found.len(), "discovered scenario files");
    Ok(found.into_iter().collect())
}

/// Discover and parse every scenario the configuration points at.
///
/// Scenarios are validated against the configuration's variables. With a
/// `filter`, only cases whose name contains it are kept and scenarios left
/// without cases are dropped.
pub fn load_scenarios(config: &RunConfig, filter: Option<&str>) -> SkenarioResult<Vec<Scenario>> {
    let vars = crate::scenario::Variables::new(config.variables())?;
    let mut scenarios = Vec::new();
    for path in discover_files(config.root(), &config.spec_pattern)? {
        let scenario = Scenario::from_file(&path)?;
        scenario.validate(&vars)?;
        let scenario = match filter {
            Some(f) => scenario.filtered(f),
            None => scenario,
        };
        if !scenario.cases.is_empty() {
            scenarios.push(scenario);
        }
    }
    Ok(scenarios)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SPEC_PATTERN;
    use proptest::prelude::*;

    const MINIMAL: &str = "scenario: s\ncases:\n  - name: opens\n    steps:\n      - type: navigate\n        url: /\n";

    mod brace_tests {
        use super::*;

        #[test]
        fn test_no_braces() {
            assert_eq!(expand_braces("a/*.yaml"), vec!["a/*.yaml"]);
        }

        #[test]
        fn test_default_pattern() {
            assert_eq!(
                expand_braces(DEFAULT_SPEC_PATTERN),
                vec!["scenarios/**/*.yaml", "scenarios/**/*.yml"]
            );
        }

        #[test]
        fn test_multiple_groups() {
            assert_eq!(
                expand_braces("{a,b}/x.{js,ts}"),
                vec!["a/x.js", "a/x.ts", "b/x.js", "b/x.ts"]
            );
        }

        #[test]
        fn test_nested_group() {
            assert_eq!(expand_braces("x.{y{a,b},z}"), vec!["x.ya", "x.yb", "x.z"]);
        }

        #[test]
        fn test_unbalanced_kept_literally() {
            assert_eq!(expand_braces("x.{a,b"), vec!["x.{a,b"]);
        }

        proptest! {
            #[test]
            fn prop_alternatives_all_expanded(
                alts in proptest::collection::vec("[a-z]{1,4}", 1..5)
            ) {
                let pattern = format!("p.{{{}}}", alts.join(","));
                let expanded = expand_braces(&pattern);
                prop_assert_eq!(expanded.len(), alts.len());
                for (out, alt) in expanded.iter().zip(&alts) {
                    prop_assert_eq!(out, &format!("p.{alt}"));
                }
            }
        }
    }

    mod discovery_tests {
        use super::*;

        fn write(root: &Path, rel: &str, content: &str) {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        #[test]
        fn test_discovers_both_extensions_sorted() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "scenarios/b.yml", MINIMAL);
            write(dir.path(), "scenarios/nested/a.yaml", MINIMAL);
            write(dir.path(), "scenarios/notes.txt", "ignored");

            let files = discover_files(dir.path(), DEFAULT_SPEC_PATTERN).unwrap();
            let names: Vec<_> = files
                .iter()
                .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
                .collect();
            assert_eq!(
                names,
                vec![
                    PathBuf::from("scenarios/b.yml"),
                    PathBuf::from("scenarios/nested/a.yaml")
                ]
            );
        }

        #[test]
        fn test_overlapping_alternatives_deduplicated() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "scenarios/a.yaml", MINIMAL);
            let files = discover_files(dir.path(), "scenarios/{*,a}.yaml").unwrap();
            assert_eq!(files.len(), 1);
        }

        #[test]
        fn test_invalid_pattern() {
            let dir = tempfile::tempdir().unwrap();
            assert!(discover_files(dir.path(), "scenarios/[").is_err());
        }

        #[test]
        fn test_load_scenarios_with_filter() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "scenarios/a.yaml", MINIMAL);
            write(
                dir.path(),
                "scenarios/b.yaml",
                &MINIMAL.replace("name: opens", "name: logs in"),
            );
            let config = RunConfig::new("https://app.test/").with_root(dir.path());

            assert_eq!(load_scenarios(&config, None).unwrap().len(), 2);
            let filtered = load_scenarios(&config, Some("logs")).unwrap();
            assert_eq!(filtered.len(), 1);
            assert_eq!(filtered[0].cases[0].name, "logs in");
        }

        #[test]
        fn test_load_scenarios_rejects_unknown_variable() {
            let dir = tempfile::tempdir().unwrap();
            write(dir.path(), "scenarios/a.yaml", &MINIMAL.replace("url: /", "url: ${missing}"));
            let config = RunConfig::new("https://app.test/").with_root(dir.path());
            assert!(load_scenarios(&config, None).is_err());
        }
    }
}
