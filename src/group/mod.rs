//! Documentation Grouping
//!
//! Partitions tracked files into documentation groups. Each file is assigned
//! a group key by the first matching rule in an ordered list; files sharing
//! a key form one group, which maps to one generated document. Group order
//! follows first appearance in the input, so identical inputs always produce
//! identical groupings.

use regex::Regex;

use crate::config::{CategoryRule, Config};
use crate::types::{Category, TrackedFile};

// =============================================================================
// Group Rules
// =============================================================================

/// One ordered (pattern, key template) grouping rule. Templates may splice
/// capture groups with `$1`..`$9`.
#[derive(Debug, Clone)]
pub struct GroupRule {
    pattern: Regex,
    template: String,
}

impl GroupRule {
    pub fn new(pattern: &str, template: &str) -> Self {
        Self {
            // Rule patterns ship with the binary; a bad one is a programmer error
            pattern: Regex::new(pattern).unwrap(),
            template: template.to_string(),
        }
    }

    /// Expand the template against a path, or None when the pattern misses
    fn apply(&self, path: &str) -> Option<String> {
        let captures = self.pattern.captures(path)?;
        let mut key = String::new();
        let mut chars = self.template.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '$'
                && let Some(d) = chars.peek().and_then(|p| p.to_digit(10))
            {
                chars.next();
                if let Some(m) = captures.get(d as usize) {
                    key.push_str(m.as_str());
                }
            } else {
                key.push(c);
            }
        }
        Some(key)
    }
}

/// Built-in grouping rules for a conventional web-project layout
pub fn default_rules() -> Vec<GroupRule> {
    vec![
        GroupRule::new(r"^src/agents/analyzers/", "agents/analyzers"),
        GroupRule::new(r"^src/agents/templates/", "agents/templates"),
        GroupRule::new(r"^src/agents/([^/]+)\.ts$", "agents/$1"),
        GroupRule::new(r"^src/components/([^/]+)/", "components/$1"),
        GroupRule::new(r"^src/components/([^/]+)\.tsx?$", "components/$1"),
        GroupRule::new(r"^src/hooks/queries/", "hooks/queries"),
        GroupRule::new(r"^src/hooks/mutations/", "hooks/mutations"),
        GroupRule::new(r"^src/hooks/([^/]+)\.ts$", "hooks/$1"),
        GroupRule::new(r"^src/pages/([^/]+)\.tsx?$", "pages/$1"),
        GroupRule::new(r"^src/lib/([^/]+)/", "lib/$1"),
        GroupRule::new(r"^src/lib/([^.]+)\.ts$", "lib/$1"),
        GroupRule::new(r"^src/types/", "types"),
        GroupRule::new(r"^supabase/functions/([^/]+)/", "functions/$1"),
        GroupRule::new(r"^supabase/migrations/", "database/migrations"),
        GroupRule::new(r"^tests/(.+)\.test\.ts$", "tests/$1"),
        GroupRule::new(r"^e2e/", "tests/e2e"),
    ]
}

/// Group key for one path: first matching rule wins, otherwise the parent
/// directory, otherwise the bare file name (or "root" for an empty path).
pub fn group_key(path: &str, rules: &[GroupRule]) -> String {
    for rule in rules {
        if let Some(key) = rule.apply(path) {
            return key;
        }
    }

    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() >= 2 {
        parts[..parts.len() - 1].join("/")
    } else if !parts[0].is_empty() {
        parts[0].to_string()
    } else {
        "root".to_string()
    }
}

// =============================================================================
// File Groups
// =============================================================================

/// One documentation unit: a keyed set of files and the file that best
/// represents it
#[derive(Debug, Clone)]
pub struct FileGroup {
    pub key: String,
    pub title: String,
    pub category: Category,
    pub files: Vec<TrackedFile>,
    pub main_file: Option<TrackedFile>,
}

/// Partition tracked files into groups, preserving first-appearance order
pub fn group_by_feature(
    snippets: &[TrackedFile],
    rules: &[GroupRule],
    config: &Config,
) -> Vec<FileGroup> {
    let mut groups: Vec<FileGroup> = Vec::new();

    for snippet in snippets {
        let key = group_key(&snippet.path, rules);
        let idx = match groups.iter().position(|g| g.key == key) {
            Some(idx) => idx,
            None => {
                groups.push(FileGroup {
                    title: group_title(&key),
                    category: category_for(&snippet.path, &config.categories),
                    key,
                    files: Vec::new(),
                    main_file: None,
                });
                groups.len() - 1
            }
        };
        groups[idx].files.push(snippet.clone());
    }

    for group in &mut groups {
        group.main_file = select_main_file(&group.files, &group.key).cloned();
    }

    groups
}

/// Category for a path: first matching prefix rule, defaulting to Features
pub fn category_for(path: &str, rules: &[CategoryRule]) -> Category {
    for rule in rules {
        if path.starts_with(rule.prefix.trim_start_matches('/')) {
            return rule.category;
        }
    }
    Category::default()
}

/// Human-readable title: split on `/`, break camelCase and kebab-case into
/// words, capitalize each segment, join with " - "
pub fn group_title(key: &str) -> String {
    key.split('/')
        .map(humanize_segment)
        .collect::<Vec<_>>()
        .join(" - ")
}

fn humanize_segment(segment: &str) -> String {
    let mut out = String::new();
    for (i, c) in segment.chars().enumerate() {
        if c == '-' || c == '_' {
            out.push(' ');
        } else if c.is_uppercase() && i > 0 {
            out.push(' ');
            out.push(c);
        } else if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// The file that anchors a group, in strict priority order: an `index`
/// file, then a file whose stem matches the trailing key segment or ends
/// with it (case-insensitive), then the largest file, then the first.
/// Largest uses strictly-greater so ties keep the earlier file.
fn select_main_file<'f>(files: &'f [TrackedFile], key: &str) -> Option<&'f TrackedFile> {
    if let Some(index) = files.iter().find(|f| file_stem(&f.path) == "index") {
        return Some(index);
    }

    let group_name = key.rsplit('/').next().unwrap_or(key).to_lowercase();
    if let Some(named) = files.iter().find(|f| {
        let stem = file_stem(&f.path).to_lowercase();
        stem == group_name || stem.ends_with(&group_name)
    }) {
        return Some(named);
    }

    let mut best = files.first()?;
    for file in &files[1..] {
        if file.line_count() > best.line_count() {
            best = file;
        }
    }
    Some(best)
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate view of a grouping, for status output
#[derive(Debug, Clone)]
pub struct GroupingStats {
    pub total_groups: usize,
    pub total_files: usize,
    pub by_category: Vec<(Category, usize)>,
    pub largest_groups: Vec<(String, usize)>,
}

pub fn grouping_stats(groups: &[FileGroup]) -> GroupingStats {
    let mut by_category: Vec<(Category, usize)> = Vec::new();
    for group in groups {
        match by_category.iter_mut().find(|(c, _)| *c == group.category) {
            Some((_, count)) => *count += 1,
            None => by_category.push((group.category, 1)),
        }
    }

    let mut largest: Vec<(String, usize)> = groups
        .iter()
        .map(|g| (g.key.clone(), g.files.len()))
        .collect();
    largest.sort_by(|a, b| b.1.cmp(&a.1));
    largest.truncate(10);

    GroupingStats {
        total_groups: groups.len(),
        total_files: groups.iter().map(|g| g.files.len()).sum(),
        by_category,
        largest_groups: largest,
    }
}

/// File-system-safe document name for a group key: separators become
/// hyphens, anything outside [A-Za-z0-9_-] is dropped, hyphen runs
/// collapse, and leading/trailing hyphens are trimmed
pub fn sanitize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut last_hyphen = false;
    for c in key.chars() {
        let mapped = if c == '/' { '-' } else { c };
        if mapped == '-' {
            if !last_hyphen && !out.is_empty() {
                out.push('-');
                last_hyphen = true;
            }
        } else if mapped.is_ascii_alphanumeric() || mapped == '_' {
            out.push(mapped);
            last_hyphen = false;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
