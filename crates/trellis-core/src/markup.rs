//! Markup conventions shared by the server pipeline and the client swap
//!
//! Every layout's slot is wrapped in a `<trellis-slot data-id="...">`
//! container and the composed chain sits inside `<trellis-root>`. The
//! client finds the swap point by its slot container and replaces the
//! container's contents. Containers are only ever emitted by the pipeline,
//! so matching nested open/close tags is enough to find their extent.

use std::ops::Range;

/// Element wrapping the whole composed chain
pub const ROOT_TAG: &str = "trellis-root";

/// Element wrapping each layout's slot
pub const SLOT_TAG: &str = "trellis-slot";

/// Opening tag of the slot container for a layout
pub fn slot_open(layout_id: &str) -> String {
    format!("<{SLOT_TAG} data-id=\"{}\">", escape_attr(layout_id))
}

/// Closing tag of a slot container
pub fn slot_close() -> String {
    format!("</{SLOT_TAG}>")
}

/// Range of the *contents* of a layout's slot container in a document
pub fn slot_range(document: &str, layout_id: &str) -> Option<Range<usize>> {
    let open = slot_open(layout_id);
    let start = document.find(&open)? + open.len();
    matching_close(document, start, SLOT_TAG)
}

/// Range of the contents of `<trellis-root>`
pub fn root_range(document: &str) -> Option<Range<usize>> {
    let open = format!("<{ROOT_TAG}>");
    let start = document.find(&open)? + open.len();
    matching_close(document, start, ROOT_TAG)
}

/// Identifiers of every slot container in document order
pub fn slot_ids(document: &str) -> Vec<String> {
    let prefix = format!("<{SLOT_TAG} data-id=\"");
    let mut ids = Vec::new();
    let mut rest = document;
    while let Some(at) = rest.find(&prefix) {
        rest = &rest[at + prefix.len()..];
        if let Some(end) = rest.find('"') {
            ids.push(unescape_attr(&rest[..end]));
            rest = &rest[end..];
        }
    }
    ids
}

/// Find the close tag balancing an element whose contents begin at `start`
fn matching_close(document: &str, start: usize, tag: &str) -> Option<Range<usize>> {
    let open_prefix = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut depth = 1usize;
    let mut cursor = start;

    loop {
        let next_close = document[cursor..].find(&close).map(|i| cursor + i)?;
        let next_open = document[cursor..]
            .find(&open_prefix)
            .map(|i| cursor + i)
            .filter(|&i| i < next_close && is_tag_boundary(document, i + open_prefix.len()));

        match next_open {
            Some(open_at) => {
                depth += 1;
                cursor = open_at + open_prefix.len();
            }
            None => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..next_close);
                }
                cursor = next_close + close.len();
            }
        }
    }
}

fn is_tag_boundary(document: &str, at: usize) -> bool {
    matches!(document.as_bytes().get(at), Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n'))
}

/// Escape text for use inside a double-quoted attribute or element body
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Make serialized JSON safe to place inside an inline `<script>` element
///
/// The result is still valid JSON with the same value: only characters
/// that could end the script element or start a comment/entity are
/// replaced with their `\u` escapes.
pub fn escape_inline_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Contents of the first `<script ... id="{id}">` element in a document
pub fn script_contents<'a>(document: &'a str, id: &str) -> Option<&'a str> {
    let marker = format!("id=\"{}\"", escape_attr(id));
    let tag_at = document.find(&marker)?;
    let body_start = document[tag_at..].find('>')? + tag_at + 1;
    let body_end = document[body_start..].find("</script>")? + body_start;
    Some(&document[body_start..body_end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_range_handles_nesting() {
        let doc = format!(
            "<{ROOT_TAG}><nav/>{}<main>{}<p>page</p>{}</main>{}</{ROOT_TAG}>",
            slot_open("Root"),
            slot_open("Admin"),
            slot_close(),
            slot_close()
        );

        let admin = slot_range(&doc, "Admin").unwrap();
        assert_eq!(&doc[admin], "<p>page</p>");

        let root = slot_range(&doc, "Root").unwrap();
        assert!(doc[root.clone()].starts_with("<main>"));
        assert!(doc[root].ends_with("</main>"));

        let all = root_range(&doc).unwrap();
        assert!(doc[all].starts_with("<nav/>"));
    }

    #[test]
    fn slot_ids_in_document_order() {
        let doc = format!(
            "{}{}x{}{}",
            slot_open("Root"),
            slot_open("A&B"),
            slot_close(),
            slot_close()
        );
        assert_eq!(slot_ids(&doc), vec!["Root", "A&B"]);
    }

    #[test]
    fn missing_slot_is_none() {
        assert!(slot_range("<div></div>", "Root").is_none());
    }

    #[test]
    fn inline_json_cannot_close_the_script() {
        let json = serde_json::to_string(&serde_json::json!({
            "bio": "</script><script>alert(1)</script>",
            "amp": "a & b",
        }))
        .unwrap();
        let escaped = escape_inline_json(&json);

        assert!(!escaped.contains("</script>"));
        assert!(!escaped.contains('<'));
        let decoded: serde_json::Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(decoded["bio"], "</script><script>alert(1)</script>");
        assert_eq!(decoded["amp"], "a & b");
    }

    #[test]
    fn script_contents_by_id() {
        let doc = r#"<body><script type="application/json" id="data">{"a":1}</script></body>"#;
        assert_eq!(script_contents(doc, "data"), Some(r#"{"a":1}"#));
        assert_eq!(script_contents(doc, "other"), None);
    }

    #[test]
    fn attributes_are_escaped() {
        assert_eq!(escape_attr(r#"a"<b>&'"#), "a&quot;&lt;b&gt;&amp;&#39;");
    }
}
