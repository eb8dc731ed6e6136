//! Markdown conversion for a page's rendered HTML body.
//!
//! This module converts the rendered HTML a wiki API serves as a page's
//! `body.view` into GFM Markdown, using proper HTML parsing rather than
//! string substitution.
//!
//! # Architecture
//!
//! The conversion is split into focused modules:
//! - [`html_entities`] - HTML entity encoding/decoding
//! - [`emoji`] - emoji shortcut conversion
//! - [`tables`] - HTML table to Markdown table conversion
//! - [`macros`] - leftover storage-format macro handling (panels, notes,
//!   etc.), kept defensively in case a `view` rendering still embeds one
//! - [`elements`] - basic HTML element converters
//! - [`utils`] - utility functions for XML parsing and manipulation
//!
//! # Example
//!
//! ```no_run
//! use confluence_dl::markdown::{MarkdownOptions, html_to_markdown};
//!
//! let page_html = r#"<h1>Title</h1><p><strong>Bold text</strong></p>"#;
//! let markdown = html_to_markdown(page_html, &MarkdownOptions::default()).unwrap();
//! assert!(markdown.contains("# Title"));
//! assert!(markdown.contains("**Bold text**"));
//! ```

use anyhow::Result;
use roxmltree::Document;
use tracing::debug;

// Module declarations
mod elements;
mod emoji;
mod html_entities;
mod macros;
mod tables;
mod utils;

// Public API - re-export main conversion function
pub use elements::convert_node_to_markdown;

/// Behaviour flags that steer the HTML→Markdown conversion.
///
/// `preserve_anchors` keeps Confluence-style `{anchor}` macros as inline HTML
/// anchors instead of discarding them.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownOptions {
  pub preserve_anchors: bool,
}

/// Convert a page's rendered HTML body to Markdown.
///
/// # Arguments
///
/// * `html_content` - Rendered HTML (Confluence's `body.view` representation,
///   or any other reasonably well-formed HTML/XHTML fragment).
/// * `options` - Conversion behaviour flags, see [`MarkdownOptions`].
///
/// # Returns
///
/// The converted Markdown content, or an error if parsing fails.
///
/// # Examples
///
/// ```
/// use confluence_dl::markdown::{MarkdownOptions, html_to_markdown};
///
/// let input = "<p>Hello <strong>world</strong>!</p>";
/// let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
/// assert_eq!(output.trim(), "Hello **world**!");
/// ```
pub fn html_to_markdown(html_content: &str, options: &MarkdownOptions) -> Result<String> {
  // Pre-process: Replace HTML entities with numeric character references
  // roxmltree only supports XML's 5 predefined entities, not HTML entities
  let preprocessed = html_entities::preprocess_html_entities(html_content);

  // Wrap with synthetic namespace declarations for Confluence namespaces that
  // may still appear verbatim in the rendered view (e.g. leftover ac:/ri:
  // attributes on otherwise plain elements).
  let wrapped = utils::wrap_with_namespaces(&preprocessed);

  let document = Document::parse(&wrapped).map_err(|e| {
    debug!("wrapped document length: {} chars", wrapped.len());
    anyhow::anyhow!("failed to parse page body HTML: {e}")
  })?;

  let markdown = convert_node_to_markdown(document.root_element(), options);
  let cleaned = utils::clean_markdown(&markdown);

  Ok(cleaned)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_convert_headings() {
    let input = "<h1>Title</h1><h2>Subtitle</h2>";
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("# Title"));
    assert!(output.contains("## Subtitle"));
  }

  #[test]
  fn test_convert_formatting() {
    let input = "<p><strong>bold</strong> <em>italic</em> <s>strike</s></p>";
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("**bold**"));
    assert!(output.contains("_italic_"));
    assert!(output.contains("~~strike~~"));
  }

  #[test]
  fn test_convert_note_macro() {
    let input = r#"
      <ac:structured-macro ac:name="note">
        <ac:rich-text-body>
          <p>This is a note block.</p>
        </ac:rich-text-body>
      </ac:structured-macro>
    "#;

    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("> **Note:** This is a note block."));
  }

  #[test]
  fn test_convert_links() {
    let input = r#"<a href="https://example.com">Example</a>"#;
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("[Example](https://example.com)"));
  }

  #[test]
  fn test_convert_task_list() {
    let input = r#"
      <ac:task-list>
        <ac:task>
          <ac:task-status>incomplete</ac:task-status>
          <ac:task-body>Task 1</ac:task-body>
        </ac:task>
        <ac:task>
          <ac:task-status>complete</ac:task-status>
          <ac:task-body>Task 2</ac:task-body>
        </ac:task>
      </ac:task-list>
    "#;
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    insta::assert_snapshot!(output, @r###"
    - [ ] Task 1
    - [x] Task 2
    "###);
  }

  #[test]
  fn test_convert_image() {
    let input = r#"<ac:image ac:alt="test image"><ri:url ri:value="https://example.com/image.png" /></ac:image>"#;
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("![test image](https://example.com/image.png)"));
  }

  #[test]
  fn test_convert_table() {
    let input = r#"
      <table>
        <tr><th>Header 1</th><th>Header 2</th></tr>
        <tr><td>Row 1 Col 1</td><td>Row 1 Col 2</td></tr>
        <tr><td>Row 2 Col 1</td><td>Row 2 Col 2</td></tr>
      </table>
    "#;
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    insta::assert_snapshot!(output, @r###"
    | Header 1    | Header 2    |
    | ----------- | ----------- |
    | Row 1 Col 1 | Row 1 Col 2 |
    | Row 2 Col 1 | Row 2 Col 2 |
    "###);
  }

  #[test]
  fn test_convert_table_empty() {
    let input = "<table></table>";
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    // Empty table should produce minimal output
    assert!(!output.contains("|"));
  }

  #[test]
  fn test_convert_lists() {
    let input = r#"
      <ul>
        <li>Item 1</li>
        <li>Item 2</li>
      </ul>
      <ol>
        <li>First</li>
        <li>Second</li>
      </ol>
    "#;
    let result = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    let output = result.escape_default();
    insta::assert_snapshot!(output, @r"- Item 1\n- Item 2\n\n      \n1. First\n2. Second\n");
  }

  #[test]
  fn test_convert_code_block() {
    let input = "<pre>function test() {\n  return 42;\n}</pre>";
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("```"));
    assert!(output.contains("function test()"));
  }

  #[test]
  fn test_convert_inline_code() {
    let input = "<p>Use <code>git commit</code> to save</p>";
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("`git commit`"));
  }

  #[test]
  fn test_convert_horizontal_rule() {
    let input = "<p>Before</p><hr /><p>After</p>";
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("---"));
  }

  #[test]
  fn test_convert_line_break() {
    let input = "<p>Line 1<br />Line 2</p>";
    let output = html_to_markdown(input, &MarkdownOptions::default()).unwrap();
    assert!(output.contains("Line 1\nLine 2"));
  }
}
