use roxmltree::Node;

use crate::markdown::MarkdownOptions;
use crate::markdown::utils::{find_child_by_tag, find_child_by_tag_and_attr, get_attribute, get_element_text, matches_tag};

/// Converts Confluence admonition macros (note, info, warning, tip) into
/// Markdown blockquotes.
///
/// # Arguments
/// * `macro_name` - The macro name that determines the default heading label.
/// * `element` - The `<ac:structured-macro>` node describing the admonition.
/// * `convert_node` - Callback used to render the rich text body into Markdown.
/// * `_options` - Conversion flags (currently unused; kept for signature
///   parity).
///
/// # Returns
/// Markdown blockquote for the admonition with an emphasized heading.
pub(super) fn handle_macro(
  macro_name: &str,
  element: Node,
  convert_node: &dyn Fn(Node) -> String,
  _options: &MarkdownOptions,
) -> Option<String> {
  let title = find_child_by_tag_and_attr(element, "ac:parameter", "ac:name", "title")
    .map(get_element_text)
    .unwrap_or_default();

  let body = find_child_by_tag(element, "ac:rich-text-body")
    .map(convert_node)
    .unwrap_or_else(|| get_element_text(element));

  Some(format_admonition_block(macro_name, title.trim(), body.trim()))
}

/// Formats the Markdown blockquote for an admonition macro.
///
/// # Arguments
/// * `macro_name` - Macro name used to pick the default title when none is
///   provided.
/// * `title` - Explicit title supplied by Confluence, already trimmed.
/// * `body` - Markdown body contents, expected to be trimmed and possibly
///   multiline.
///
/// # Returns
/// Markdown blockquote containing the heading and body lines.
fn format_admonition_block(macro_name: &str, title: &str, body: &str) -> String {
  let default_title = match macro_name {
    "info" => "Info",
    "warning" => "Warning",
    "tip" => "Tip",
    _ => "Note",
  };

  let heading = if title.is_empty() { default_title } else { title };
  render_admonition_block(heading, body)
}

/// Converts an Atlassian Document Format `<ac:adf-node type="panel">` into a
/// Markdown blockquote.
///
/// # Arguments
/// * `node` - The `<ac:adf-node type="panel">` element.
///
/// # Returns
/// `Some` rendered blockquote, or `None` if the node isn't a panel.
pub(super) fn convert_adf_panel_to_markdown(node: Node) -> Option<String> {
  if get_attribute(node, "type").as_deref() != Some("panel") {
    return None;
  }

  let mut panel_type = None;
  let mut panel_title = None;
  for attr in node.children().filter(|child| matches_tag(*child, "ac:adf-attribute")) {
    match get_attribute(attr, "key").as_deref() {
      Some("panel-type") => panel_type = Some(get_element_text(attr).trim().to_string()),
      Some("panel-title") => panel_title = Some(get_element_text(attr).trim().to_string()),
      _ => {}
    }
  }

  let default_title = match panel_type.as_deref() {
    Some("info") => "Info",
    Some("warning") => "Warning",
    Some("tip") => "Tip",
    _ => "Note",
  };
  let heading = panel_title.filter(|title| !title.is_empty()).unwrap_or_else(|| default_title.to_string());

  let body = find_child_by_tag(node, "ac:adf-content")
    .map(|content| get_element_text(content).trim().to_string())
    .unwrap_or_default();

  Some(render_admonition_block(&heading, &body))
}

/// Formats a blockquote with an explicit heading, for callers (e.g. excerpt
/// macros) that don't go through [`format_admonition_block`]'s macro-name
/// default-title selection.
pub(crate) fn render_admonition_block(heading: &str, body: &str) -> String {
  if body.is_empty() {
    return format!("\n> **{heading}:**\n\n");
  }

  let mut result = String::new();
  let mut lines = body.lines();

  if let Some(first_line) = lines.next() {
    result.push_str(&format!("\n> **{heading}:** {}", first_line.trim()));
  }

  for line in lines {
    if line.trim().is_empty() {
      result.push_str("\n>");
    } else {
      result.push_str(&format!("\n> {}", line.trim()));
    }
  }

  result.push_str("\n\n");
  result
}
