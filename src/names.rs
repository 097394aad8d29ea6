//! Name and comment utilities: pure, stateless functions shared by the
//! Lookup engine and every emitter.

/// Convert `snake_case` to `camelCase` or `PascalCase`.
///
/// Splits on `_`, capitalizes each part, joins, then adjusts the first
/// character per `first_upper`. If the input is uniformly upper-case (e.g.
/// `HELLO_WORLD`), each segment's tail is lower-cased before capitalizing so
/// `HELLO_WORLD` becomes `helloWorld`/`HelloWorld` rather than `HELLOWORLD`.
pub fn snake_to_camel(name: &str, first_upper: bool) -> String {
    if name.is_empty() {
        return String::new();
    }

    let shouty = name.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase());

    let mut out = String::with_capacity(name.len());
    for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        let mut chars = part.chars();
        let Some(first) = chars.next() else { continue };
        let rest: String = chars.as_str().to_string();
        let rest = if shouty { rest.to_lowercase() } else { rest };

        if i == 0 && !first_upper {
            out.push(first.to_ascii_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(&rest);
    }
    out
}

/// Convert a name to `UPPER_SNAKE_CASE`.
///
/// Already-shouty input (all uppercase/digits/underscores) passes through.
/// Input containing underscores is simply upper-cased. Otherwise, an
/// underscore is inserted before every internal upper-case letter, and the
/// `_I_D` artifact this produces for identifiers like `fieldID` is collapsed
/// back to `_ID`.
pub fn camel_to_upper_snake(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let is_shouty = name.chars().all(|c| c.is_uppercase() || c.is_ascii_digit() || c == '_');
    if is_shouty {
        return name.to_string();
    }

    if name.contains('_') {
        return name.to_uppercase();
    }

    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_is_lower_or_digit = false;
    for c in name.chars() {
        if c.is_uppercase() && prev_is_lower_or_digit {
            out.push('_');
        }
        out.extend(c.to_uppercase());
        prev_is_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
    }

    out.replace("_I_D", "_ID")
}

/// Pack a field number and wire type into a protobuf tag, per the wire
/// format: `(field_number << 3) | wire_type`.
pub fn pack_tag(wire_type: u32, field_number: u32) -> u32 {
    (field_number << 3) | wire_type
}

/// Unpack a protobuf tag into its `(field_number, wire_type)` pair.
pub fn unpack_tag(tag: u32) -> (u32, u32) {
    (tag >> 3, tag & 0x07)
}

/// Clean a raw comment block into doc text suitable for embedding in a
/// generated artifact: strips comment markers and continuation stars, then
/// applies an HTML-safety pass.
pub fn clean_doc(raw: &str) -> String {
    let stripped = strip_comment_markers(raw);
    html_safety_pass(&stripped)
}

fn strip_comment_markers(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines() {
        let mut line = line.trim_end();
        line = line.trim_start();
        line = line.strip_prefix("/**").unwrap_or(line);
        line = line.strip_prefix("/*").unwrap_or(line);
        line = line.strip_prefix("*/").unwrap_or(line);
        line = line.strip_suffix("*/").unwrap_or(line);
        line = line.strip_prefix("///").unwrap_or(line);
        line = line.strip_prefix("//").unwrap_or(line);
        let line = line.strip_prefix('*').unwrap_or(line);
        lines.push(line.trim_start());
    }
    lines.join("\n").trim().to_string()
}

/// Rewrite `<tt>`/`</tt>` to `<code>`/`</code>`, escape free-floating `<`,
/// `>`, `&` that aren't part of a recognized tag, and close unbalanced `<p>`
/// tags across paragraph boundaries.
fn html_safety_pass(text: &str) -> String {
    let text = text.replace("<tt>", "<code>").replace("</tt>", "</code>");

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => {
                let rest: String = {
                    let mut peek = String::new();
                    let mut iter = chars.clone();
                    for _ in 0..8 {
                        match iter.next() {
                            Some(c) => peek.push(c),
                            None => break,
                        }
                    }
                    peek
                };
                let recognized = rest.starts_with("code>")
                    || rest.starts_with("/code>")
                    || rest.starts_with("p>")
                    || rest.starts_with("/p>");
                if recognized {
                    out.push('<');
                } else {
                    out.push_str("&lt;");
                }
            }
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }

    balance_paragraph_tags(&out)
}

/// Two-pass substitution: temporarily escape already-closed `<p>...</p>`
/// paragraphs, then close any `<p>` left open at a paragraph boundary
/// (a blank line), then restore the escaped ones.
fn balance_paragraph_tags(text: &str) -> String {
    const ESCAPED_OPEN: &str = "\u{0}P_OPEN\u{0}";
    const ESCAPED_CLOSE: &str = "\u{0}P_CLOSE\u{0}";

    let mut closed = text.to_string();
    loop {
        let Some(open_idx) = closed.find("<p>") else { break };
        let Some(close_rel) = closed[open_idx..].find("</p>") else { break };
        let close_idx = open_idx + close_rel;
        closed.replace_range(close_idx..close_idx + 4, ESCAPED_CLOSE);
        closed.replace_range(open_idx..open_idx + 3, ESCAPED_OPEN);
    }

    let mut paragraphs: Vec<String> = Vec::new();
    for para in closed.split("\n\n") {
        let opens = para.matches("<p>").count();
        if opens > 0 {
            paragraphs.push(format!("{}</p>", para));
        } else {
            paragraphs.push(para.to_string());
        }
    }
    let rebalanced = paragraphs.join("\n\n");

    rebalanced.replace(ESCAPED_OPEN, "<p>").replace(ESCAPED_CLOSE, "</p>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_to_camel_lower_first() {
        assert_eq!(snake_to_camel("hello_world", false), "helloWorld");
    }

    #[test]
    fn snake_to_camel_upper_first() {
        assert_eq!(snake_to_camel("hello_world", true), "HelloWorld");
    }

    #[test]
    fn snake_to_camel_shouty_input() {
        assert_eq!(snake_to_camel("HELLO_WORLD", true), "HelloWorld");
        assert_eq!(snake_to_camel("HELLO_WORLD", false), "helloWorld");
    }

    #[test]
    fn snake_to_camel_empty_is_total() {
        assert_eq!(snake_to_camel("", false), "");
    }

    #[test]
    fn camel_to_upper_snake_inserts_underscores() {
        assert_eq!(camel_to_upper_snake("helloWorld"), "HELLO_WORLD");
    }

    #[test]
    fn camel_to_upper_snake_collapses_i_d() {
        assert_eq!(camel_to_upper_snake("helloWorldID"), "HELLO_WORLD_ID");
    }

    #[test]
    fn camel_to_upper_snake_passes_through_shouty() {
        assert_eq!(camel_to_upper_snake("ALREADY_SHOUTY_1"), "ALREADY_SHOUTY_1");
    }

    #[test]
    fn camel_to_upper_snake_uppercases_underscored() {
        assert_eq!(camel_to_upper_snake("mixed_Case"), "MIXED_CASE");
    }

    #[test]
    fn pack_tag_matches_wire_format() {
        assert_eq!(pack_tag(0, 1), 8);
        assert_eq!(pack_tag(2, 5), 42);
    }

    #[test]
    fn pack_unpack_tag_roundtrips() {
        for field_number in [1u32, 2, 15, 16, 536870911] {
            for wire_type in [0u32, 1, 2, 5] {
                let tag = pack_tag(wire_type, field_number);
                assert_eq!(unpack_tag(tag), (field_number, wire_type));
            }
        }
    }

    #[test]
    fn clean_doc_strips_markers_and_stars() {
        let raw = "/**\n * hello\n * world\n */";
        assert_eq!(clean_doc(raw), "hello\nworld");
    }

    #[test]
    fn clean_doc_escapes_free_floating_entities() {
        assert_eq!(clean_doc("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn clean_doc_rewrites_tt_to_code() {
        assert_eq!(clean_doc("a <tt>b</tt> c"), "a <code>b</code> c");
    }

    #[test]
    fn clean_doc_empty_is_total() {
        assert_eq!(clean_doc(""), "");
    }
}
