// ABOUTME: Glob matching of files beneath a staging directory.
// ABOUTME: Patterns use gitignore syntax anchored at the directory root.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

#[derive(Debug, thiserror::Error)]
pub enum GlobError {
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: ignore::Error,
    },

    #[error("failed to search {}: {source}", .root.display())]
    Walk { root: PathBuf, source: ignore::Error },
}

/// Split a newline-delimited pattern list, dropping blank lines.
pub fn split_patterns(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Files under `root` matching any of `patterns`, sorted by path.
///
/// Patterns are relative to `root`: `*.json` matches only top-level files,
/// `**/*.json` matches at any depth, and a leading `!` excludes. No matches is
/// an empty list, not an error.
pub fn glob_files<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Vec<PathBuf>, GlobError> {
    let matcher = build_matcher(root, patterns)?;
    if matcher.is_empty() {
        return Ok(Vec::new());
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut matched = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| GlobError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if matcher.matched(relative, false).is_ignore() {
            matched.push(entry.into_path());
        }
    }

    tracing::debug!(
        "{} file(s) under {} matched {} pattern(s)",
        matched.len(),
        root.display(),
        patterns.len()
    );
    Ok(matched)
}

fn build_matcher<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Gitignore, GlobError> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        let pattern = pattern.as_ref().trim();
        if pattern.is_empty() {
            continue;
        }
        builder
            .add_line(None, &anchor(pattern))
            .map_err(|source| GlobError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
    }
    builder.build().map_err(|source| GlobError::InvalidPattern {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
        source,
    })
}

/// Anchor a pattern at the root so `*.json` does not match nested files.
fn anchor(pattern: &str) -> String {
    let (negated, body) = match pattern.strip_prefix('!') {
        Some(rest) => ("!", rest),
        None => ("", pattern),
    };
    let body = body.strip_prefix("./").unwrap_or(body);
    if body.starts_with('/') || body.starts_with("**") {
        format!("{negated}{body}")
    } else {
        format!("{negated}/{body}")
    }
}
