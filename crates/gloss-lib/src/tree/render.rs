//! S-expression rendering.

use super::Node;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SexpOptions {
    /// Show anonymous nodes such as punctuation.
    pub include_anonymous: bool,
    /// Append each node's byte range.
    pub spans: bool,
}

pub(crate) fn to_sexp(node: &Node<'_>, options: SexpOptions) -> String {
    format_node(node, 0, options)
}

fn format_node(node: &Node<'_>, depth: usize, options: SexpOptions) -> String {
    let indent = "  ".repeat(depth);
    let kind = node.kind();
    let field_prefix = node
        .field_name()
        .filter(|_| depth > 0)
        .map(|f| format!("{}: ", f))
        .unwrap_or_default();
    let span = if options.spans {
        format!(" {}..{}", node.start_byte(), node.end_byte())
    } else {
        String::new()
    };

    let children: Vec<_> = node
        .children()
        .into_iter()
        .filter(|c| options.include_anonymous || c.is_named())
        .collect();

    if children.is_empty() {
        // Interior nodes with only hidden children print bare.
        let text = if node.subtree().is_leaf() || node.is_error() {
            node.text()
        } else {
            ""
        };
        return if text == kind {
            format!("{}{}(\"{}\"{})", indent, field_prefix, escape_string(kind), span)
        } else if text.is_empty() {
            format!("{}{}({}{})", indent, field_prefix, kind, span)
        } else {
            format!(
                "{}{}({}{} \"{}\")",
                indent,
                field_prefix,
                kind,
                span,
                escape_string(text)
            )
        };
    }

    let mut out = format!("{}{}({}{}", indent, field_prefix, kind, span);
    for child in &children {
        out.push('\n');
        out.push_str(&format_node(child, depth + 1, options));
    }
    out.push(')');
    out
}

pub(crate) fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c if c.is_control() => result.push_str(&format!("\\u{{{:04x}}}", c as u32)),
            c => result.push(c),
        }
    }
    result
}
