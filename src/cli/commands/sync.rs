//! Sync Command
//!
//! Renders the pending change-set as an actionable instruction block for an
//! AI assistant (or a human) to work through. `--clear` discards the pending
//! set once the updates are done.

use crate::cli::Output;
use crate::project::ProjectPaths;
use crate::store::PendingStore;
use crate::types::{DriftError, PendingChangeSet, Result};

pub fn run(format: &str, clear: bool) -> Result<()> {
    let output = Output::new();
    let paths = ProjectPaths::discover()?;
    if !paths.is_initialized() {
        return Err(DriftError::NotInitialized);
    }

    let pending_store = PendingStore::new(paths);
    let pending = pending_store.load();

    if pending.is_empty() {
        println!("No pending updates.");
    } else if format == "json" {
        println!("{}", serde_json::to_string_pretty(&pending)?);
    } else {
        println!("{}", render_prompt(&pending));
    }

    if clear && pending_store.clear()? {
        println!();
        output.success("Pending updates cleared.");
    }

    Ok(())
}

fn render_prompt(pending: &PendingChangeSet) -> String {
    let mut lines: Vec<String> = Vec::new();
    let rule = "=".repeat(60);

    lines.push(rule.clone());
    lines.push("Documentation Update Required".to_string());
    lines.push(rule.clone());
    lines.push(String::new());

    lines.push(format!("Changed files ({}):", pending.changed_files.len()));
    for file in &pending.changed_files {
        lines.push(format!("  - {}", file));
    }
    lines.push(String::new());

    if !pending.affected_docs.is_empty() {
        lines.push(format!(
            "Affected documents ({}):",
            pending.affected_docs.len()
        ));
        for doc in &pending.affected_docs {
            lines.push(format!("  - {}", doc));
        }
        lines.push(String::new());
    }

    if !pending.missing_files.is_empty() {
        lines.push(format!("Missing files ({}):", pending.missing_files.len()));
        for file in &pending.missing_files {
            lines.push(format!("  - {}", file));
        }
        lines.push(String::new());
    }

    lines.push("Instructions:".to_string());
    lines.push("1. Read each changed file to understand the modifications".to_string());
    lines.push("2. Update the affected documents to reflect the changes".to_string());
    lines.push("3. Ensure <cite> blocks have correct file references".to_string());
    lines.push("4. Update function/class descriptions if signatures changed".to_string());
    lines.push("5. Run 'docdrift sync --clear' when done".to_string());
    lines.push(String::new());
    lines.push(rule);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_render_prompt_includes_all_sections() {
        let pending = PendingChangeSet {
            timestamp: Some(Utc::now()),
            changed_files: vec!["src/a.ts".into()],
            affected_docs: vec!["docs/features/a.md".into()],
            missing_files: vec!["src/gone.ts".into()],
        };

        let prompt = render_prompt(&pending);
        assert!(prompt.contains("Changed files (1):"));
        assert!(prompt.contains("  - src/a.ts"));
        assert!(prompt.contains("Affected documents (1):"));
        assert!(prompt.contains("Missing files (1):"));
        assert!(prompt.contains("docdrift sync --clear"));
    }

    #[test]
    fn test_render_prompt_omits_empty_sections() {
        let pending = PendingChangeSet {
            timestamp: Some(Utc::now()),
            changed_files: vec!["src/a.ts".into()],
            ..Default::default()
        };

        let prompt = render_prompt(&pending);
        assert!(!prompt.contains("Affected documents"));
        assert!(!prompt.contains("Missing files"));
    }
}
