//! Confluence macro conversion to Markdown.
//!
//! Handles structured macros like panels, notes, status badges, and more.

use roxmltree::Node;
use tracing::debug;

use crate::markdown::MarkdownOptions;
use crate::markdown::utils::{find_child_by_tag, get_attribute, get_element_text};

mod admonitions;
mod anchors;
mod basic;
mod code;
mod decisions;
mod emoji_macros;
mod excerpts;
mod expand;
mod jira;

pub(crate) use admonitions::render_admonition_block;
pub use decisions::convert_adf_extension_to_markdown;

/// Signature used by all macro handlers.
type MacroHandler = fn(&str, Node, &dyn Fn(Node) -> String, &MarkdownOptions) -> Option<String>;

struct Handler {
  names: &'static [&'static str],
  func: MacroHandler,
}

const HANDLERS: &[Handler] = &[
  Handler {
    names: &["toc", "panel", "status"],
    func: basic::handle_macro,
  },
  Handler {
    names: &["note", "info", "warning", "tip"],
    func: admonitions::handle_macro,
  },
  Handler {
    names: &["excerpt"],
    func: excerpts::handle_macro,
  },
  Handler {
    names: &["code", "code-block"],
    func: code::handle_macro,
  },
  Handler {
    names: &["expand"],
    func: expand::handle_macro,
  },
  Handler {
    names: &["emoji"],
    func: emoji_macros::handle_macro,
  },
  Handler {
    names: &["anchor"],
    func: anchors::handle_macro,
  },
  Handler {
    names: &["decisionreport", "decision", "decision-list"],
    func: decisions::handle_macro,
  },
  Handler {
    names: &["jira"],
    func: jira::handle_macro,
  },
];

/// Converts Confluence structured macros to Markdown.
///
/// Unknown macros fall back to returning their text content.
///
/// # Arguments
/// * `element` - The `<ac:structured-macro>` node being processed.
/// * `convert_node` - Callback used to render nested content into Markdown.
/// * `options` - Conversion behaviour flags that influence macro rendering.
///
/// # Returns
/// A Markdown fragment representing the macro, or the macro's text content when
/// unhandled.
pub fn convert_macro_to_markdown(
  element: Node,
  convert_node: &dyn Fn(Node) -> String,
  options: &MarkdownOptions,
) -> String {
  let macro_name = get_attribute(element, "ac:name").unwrap_or_default();

  for handler in HANDLERS {
    if handler.names.iter().any(|name| *name == macro_name)
      && let Some(result) = (handler.func)(&macro_name, element, convert_node, options)
    {
      return result;
    }
  }

  // For unknown macros, just extract the text content
  get_element_text(element)
}

/// Converts Confluence task list macros to Markdown checkboxes.
///
/// # Arguments
/// * `element` - The `<ac:task-list>` node to convert.
///
/// # Returns
/// Markdown representing each task as a checkbox list item.
pub fn convert_task_list_to_markdown(element: Node) -> String {
  let mut result = String::new();

  for task in element
    .children()
    .filter(|child| crate::markdown::utils::matches_tag(*child, "ac:task"))
  {
    let status = find_child_by_tag(task, "ac:task-status")
      .map(get_element_text)
      .unwrap_or_else(|| "incomplete".to_string());

    let body = find_child_by_tag(task, "ac:task-body")
      .map(get_element_text)
      .unwrap_or_default();

    let checkbox = if status.trim() == "complete" { "[x]" } else { "[ ]" };
    result.push_str(&format!("- {} {}\n", checkbox, body.trim()));
  }

  result.push('\n');
  result
}

/// Converts Confluence image macros to Markdown image syntax.
///
/// # Arguments
/// * `element` - The `<ac:image>` node to convert.
///
/// # Returns
/// Markdown `![alt](source)` markup using either attachment filenames or URLs.
pub fn convert_image_to_markdown(element: Node) -> String {
  let alt = get_attribute(element, "ac:alt").unwrap_or_else(|| "image".to_string());

  if let Some(url) = find_child_by_tag(element, "ri:url").and_then(|e| get_attribute(e, "ri:value"))
    && !url.is_empty()
  {
    return format!("\n![{alt}]({url})\n\n");
  }

  if let Some(filename) = find_child_by_tag(element, "ri:attachment").and_then(|e| get_attribute(e, "ri:filename"))
    && !filename.is_empty()
  {
    return format!("\n![{alt}]({filename})\n\n");
  }

  format!("\n![{alt}]()\n\n")
}

/// Converts Confluence links to Markdown.
///
/// Handles user mentions (`<ac:link><ri:user .../></ac:link>`) and internal
/// page links.
///
/// # Arguments
/// * `element` - The `<ac:link>` node to convert.
///
/// # Returns
/// Markdown-formatted text representing the link target or mention.
pub fn convert_confluence_link_to_markdown(element: Node) -> String {
  // Check for user mention
  if let Some(user_node) = find_child_by_tag(element, "ri:user") {
    let account_id = get_attribute(user_node, "ri:account-id").unwrap_or_default();

    debug!("User mention: account_id={account_id}");

    // Format as @mention with account ID as fallback
    // In the future, we could look up display names via API
    return format!("@user:{account_id}");
  }

  // Check for page link
  if let Some(page_node) = find_child_by_tag(element, "ri:page") {
    let title = get_attribute(page_node, "ri:content-title").unwrap_or_default();

    debug!("Page link: title={title}");

    // Format as wiki-style link
    return format!("[[{title}]]");
  }

  // Check for attachment link
  if let Some(attachment_node) = find_child_by_tag(element, "ri:attachment") {
    let filename = get_attribute(attachment_node, "ri:filename").unwrap_or_default();

    if !filename.is_empty() {
      let link_text = find_child_by_tag(element, "ac:plain-text-link-body")
        .map(get_element_text)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| filename.clone());

      return format!("[{}]({filename})", link_text.trim());
    }
  }

  // Fall back to regular link handling if it has an href
  let text = get_element_text(element);
  if let Some(href) = get_attribute(element, "href") {
    return format!("[{text}]({href})");
  }

  // If no special handling matched, just return the text content
  text
}
