//! Loader for an HTML-like markup subset → [`Document`].
//!
//! Built on `winnow` 0.7. Handles nested tags, quoted and bare attribute
//! values, text, comments, void and self-closing elements. A few attributes
//! map onto element fields instead of the free attribute table:
//! `id`, `class`, `value`, `hidden` and `bounds="x y w h"` (the layout box
//! used by hit testing).

use crate::dom::{Document, Element, Rect};
use petgraph::graph::NodeIndex;
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_until, take_while};

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

/// Parse markup into a document whose `body` holds the top-level elements.
/// A top-level `<body>` tag, if present, is merged into the root.
#[must_use = "parsing result should be used"]
pub fn parse_markup(input: &str) -> Result<Document, String> {
    let mut doc = Document::new();
    let mut stack: Vec<(NodeIndex, String)> = vec![(doc.root, "body".to_string())];
    let mut rest = input;

    while !rest.is_empty() {
        if rest.starts_with("<!--") {
            let _ = parse_comment
                .parse_next(&mut rest)
                .map_err(|e| format!("Comment parse error: {e}"))?;
        } else if rest.starts_with("<!") {
            // Doctype and similar declarations
            let _ = take_till::<_, _, ContextError>(0.., '>').parse_next(&mut rest);
            rest = rest.strip_prefix('>').unwrap_or(rest);
        } else if rest.starts_with("</") {
            let name = parse_close_tag
                .parse_next(&mut rest)
                .map_err(|e| format!("Closing tag parse error: {e}"))?;
            close_element(&mut stack, &name)?;
        } else if rest.starts_with('<') {
            let tag = parse_open_tag
                .parse_next(&mut rest)
                .map_err(|e| format!("Tag parse error: {e}"))?;
            open_element(&mut doc, &mut stack, tag)?;
        } else {
            let text = take_till::<_, _, ContextError>(1.., '<')
                .parse_next(&mut rest)
                .map_err(|e| format!("Text parse error: {e}"))?;
            if !text.trim().is_empty()
                && let Some(&(parent, _)) = stack.last()
            {
                push_text(&mut doc, parent, &decode_entities(text));
            }
        }
    }

    if stack.len() > 1 {
        let open: Vec<&str> = stack[1..].iter().map(|(_, t)| t.as_str()).collect();
        return Err(format!("Unclosed elements: <{}>", open.join(">, <")));
    }

    Ok(doc)
}

/// An opening tag before it is placed in the tree.
#[derive(Debug)]
struct OpenTag {
    name: String,
    attrs: Vec<(String, Option<String>)>,
    self_closing: bool,
}

fn open_element(
    doc: &mut Document,
    stack: &mut Vec<(NodeIndex, String)>,
    tag: OpenTag,
) -> Result<(), String> {
    let Some(&(parent, _)) = stack.last() else {
        return Err(format!("No parent for <{}>", tag.name));
    };

    // `<body>` at the top maps onto the existing root.
    if tag.name == "body" && stack.len() == 1 {
        if let Some(root) = doc.get_mut(doc.root) {
            for (name, value) in &tag.attrs {
                apply_attribute_in_place(root, name, value.as_deref())?;
            }
        }
        if let Some(id) = doc.get(doc.root).and_then(|e| e.id) {
            doc.id_index.insert(id, doc.root);
        }
        if !tag.self_closing {
            stack.push((doc.root, "body".to_string()));
        }
        return Ok(());
    }

    let mut element = Element::new(&tag.name);
    for (name, value) in &tag.attrs {
        apply_attribute_in_place(&mut element, name, value.as_deref())?;
    }
    let idx = doc.append(parent, element);

    let is_void = VOID_TAGS.contains(&tag.name.as_str());
    if !tag.self_closing && !is_void {
        stack.push((idx, tag.name));
    }
    Ok(())
}

fn close_element(stack: &mut Vec<(NodeIndex, String)>, name: &str) -> Result<(), String> {
    if VOID_TAGS.contains(&name) {
        return Ok(());
    }
    match stack.last() {
        Some((_, open)) if open == name && stack.len() > 1 => {
            stack.pop();
            Ok(())
        }
        // Closing the merged `<body>`.
        Some((_, open)) if open == name && name == "body" => {
            stack.truncate(1);
            Ok(())
        }
        Some((_, open)) => Err(format!("Unexpected </{name}>, expected </{open}>")),
        None => Err(format!("Unexpected </{name}>")),
    }
}

/// Own text goes on the element until it has children; later text becomes
/// a `#text` child so document order is kept.
fn push_text(doc: &mut Document, parent: NodeIndex, text: &str) {
    let has_children = !doc.children(parent).is_empty();
    let Some(element) = doc.get_mut(parent) else {
        return;
    };
    if !has_children {
        let own = element.text.get_or_insert_with(String::new);
        own.push_str(text);
        if element.tag == "textarea" {
            element.value = Some(own.clone());
        }
        return;
    }
    doc.append(parent, Element::new("#text").with_text(text));
}

fn apply_attribute_in_place(
    element: &mut Element,
    name: &str,
    value: Option<&str>,
) -> Result<(), String> {
    let value = value.unwrap_or("");
    match name {
        "id" => *element = std::mem::take(element).with_id(value),
        "class" => *element = std::mem::take(element).with_class(value),
        "value" => element.value = Some(value.to_string()),
        "hidden" => element.hidden = true,
        "bounds" => element.bounds = Some(parse_bounds(value)?),
        _ => {
            element
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }
    Ok(())
}

/// `"x y w h"`, whitespace or comma separated.
fn parse_bounds(value: &str) -> Result<Rect, String> {
    let nums: Vec<f32> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .map_err(|_| format!("Invalid bounds component `{s}` in `{value}`"))
        })
        .collect::<Result<_, _>>()?;
    match nums.as_slice() {
        [x, y, w, h] => Ok(Rect::new(*x, *y, *w, *h)),
        _ => Err(format!("Bounds need 4 numbers, got `{value}`")),
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn parse_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'
    })
    .parse_next(input)
}

fn skip_space(input: &mut &str) {
    *input = input.trim_start();
}

fn parse_comment(input: &mut &str) -> ModalResult<()> {
    let _ = delimited("<!--", take_until(0.., "-->"), "-->").parse_next(input)?;
    Ok(())
}

fn parse_close_tag(input: &mut &str) -> ModalResult<String> {
    let _ = "</".parse_next(input)?;
    skip_space(input);
    let name = parse_name.parse_next(input)?.to_ascii_lowercase();
    skip_space(input);
    let _ = '>'.parse_next(input)?;
    Ok(name)
}

fn parse_attr_value(input: &mut &str) -> ModalResult<String> {
    let raw = alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
        take_till(1.., |c: char| c.is_whitespace() || c == '>'),
    ))
    .parse_next(input)?;
    Ok(decode_entities(raw))
}

fn parse_attribute(input: &mut &str) -> ModalResult<(String, Option<String>)> {
    let name = parse_name.parse_next(input)?.to_ascii_lowercase();
    skip_space(input);
    let value = opt(preceded(('=', winnow::ascii::space0), parse_attr_value)).parse_next(input)?;
    Ok((name, value))
}

fn parse_open_tag(input: &mut &str) -> ModalResult<OpenTag> {
    let _ = '<'.parse_next(input)?;
    let name = parse_name.parse_next(input)?.to_ascii_lowercase();
    let mut attrs = Vec::new();

    loop {
        skip_space(input);
        if input.starts_with("/>") {
            *input = &input[2..];
            return Ok(OpenTag {
                name,
                attrs,
                self_closing: true,
            });
        }
        if input.starts_with('>') {
            *input = &input[1..];
            return Ok(OpenTag {
                name,
                attrs,
                self_closing: false,
            });
        }
        attrs.push(parse_attribute.parse_next(input)?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements_and_attributes() {
        let doc = parse_markup(
            r#"<div id="card" class="card wide" data-x='1'>
                 <input id="name" value="Ada" />
                 <span class=label>Name</span>
               </div>"#,
        )
        .unwrap();

        let card = doc.by_id("card").unwrap();
        let el = doc.get(card).unwrap();
        assert!(el.has_class("card") && el.has_class("wide"));
        assert_eq!(el.attr("data-x"), Some("1"));

        let name = doc.by_id("name").unwrap();
        assert_eq!(doc.get(name).unwrap().value.as_deref(), Some("Ada"));
        assert_eq!(doc.parent(name), Some(card));

        let children = doc.children(card);
        assert_eq!(children.len(), 2);
        assert_eq!(doc.text_content(children[1]), "Name");
    }

    #[test]
    fn void_input_without_slash() {
        let doc = parse_markup(r#"<form><input id="a"><textarea id="b">hi</textarea></form>"#).unwrap();
        let form = doc.children(doc.root)[0];
        assert_eq!(doc.children(form).len(), 2);
        let b = doc.by_id("b").unwrap();
        assert_eq!(doc.get(b).unwrap().value.as_deref(), Some("hi"));
    }

    #[test]
    fn hidden_and_bounds() {
        let doc = parse_markup(r#"<div id="x" hidden bounds="1 2 30 40"></div>"#).unwrap();
        let x = doc.get(doc.by_id("x").unwrap()).unwrap();
        assert!(x.hidden);
        assert_eq!(x.bounds, Some(Rect::new(1.0, 2.0, 30.0, 40.0)));
    }

    #[test]
    fn trailing_text_keeps_document_order() {
        let doc = parse_markup("<p>a <b>b</b> c</p>").unwrap();
        let p = doc.children(doc.root)[0];
        assert_eq!(doc.text_content(p), "a b c");
    }

    #[test]
    fn body_tag_merges_into_root() {
        let doc = parse_markup(r#"<!DOCTYPE html><body class="page"><!-- x --><p>t</p></body>"#).unwrap();
        assert!(doc.has_class(doc.root, "page"));
        assert_eq!(doc.children(doc.root).len(), 1);
    }

    #[test]
    fn errors_on_mismatched_or_unclosed_tags() {
        assert!(parse_markup("<div><span></div>").is_err());
        assert!(parse_markup("<div>").is_err());
        assert!(parse_markup(r#"<div bounds="1 2"></div>"#).is_err());
    }
}
