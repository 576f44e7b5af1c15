//! Prompt Builder
//!
//! Builds the generation prompt for one documentation group. The provider
//! is expected to read the referenced files itself, so the prompt carries
//! paths and format instructions, not file contents.

use crate::group::FileGroup;

/// Instruction line for the configured output language
fn language_instruction(language: &str) -> &'static str {
    match language {
        "ko" => "Write in Korean",
        "ja" => "Write in Japanese",
        "zh" => "Write in Simplified Chinese",
        "es" => "Write in Spanish",
        "fr" => "Write in French",
        "pt-br" => "Write in Portuguese",
        "ru" => "Write in Russian",
        _ => "Write in English",
    }
}

/// Build the generation prompt for one group
pub fn build_prompt(group: &FileGroup, language: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "Write technical documentation for \"{}\".",
        group.title
    ));
    lines.push(String::new());
    lines.push("Reference files:".to_string());
    for file in &group.files {
        lines.push(format!("- {}", file.path));
    }
    lines.push(String::new());
    lines.push("Format (aim for 200-300 lines):".to_string());
    lines.push("- Start with a <cite> block listing the file paths".to_string());
    lines.push("- Overview: purpose and role (2-3 sentences)".to_string());
    lines.push(
        "- 2-3 Mermaid diagrams (architecture, data flow, or dependencies)".to_string(),
    );
    lines.push(
        "- Key functions/classes (name, signature, description) as lists, no tables".to_string(),
    );
    lines.push("- Configuration/usage section with 1-2 real code examples".to_string());
    lines.push("- Troubleshooting guide covering 2-3 common issues".to_string());
    lines.push(String::new());
    lines.push("Important:".to_string());
    lines.push(format!("- {}", language_instruction(language)));
    lines.push("- Output pure markdown only (no ```markdown wrapper)".to_string());
    lines.push("- No explanations or meta text, document content only".to_string());
    lines.push("- The first line must be the <cite> block".to_string());
    lines.push(String::new());
    lines.push("Output only the markdown document, starting with <cite>.".to_string());

    lines.join("\n")
}
