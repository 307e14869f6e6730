//! Compound CSS selectors: the subset the assistant's candidate lists use.
//!
//! Supported: comma-separated lists of compound selectors made of an
//! optional tag (or `*`), `.class`, `#id` and attribute tests
//! `[attr]`, `[attr=v]`, `[attr*=v]`, `[attr^=v]`, `[attr$=v]`, `[attr~=v]`.
//! Combinators (descendant, child, sibling) are not supported.
//!
//! Built on `winnow` 0.7 like the markup loader.

use crate::dom::Element;
use std::fmt;
use std::str::FromStr;
use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// How an attribute test compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Suffix,
    /// Whitespace-separated word match (`~=`).
    Word,
}

/// A single test inside a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Attr {
        name: String,
        op: AttrOp,
        value: String,
    },
}

/// A parsed selector list. Matches when any compound matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Vec<SimpleSelector>>,
    source: String,
}

impl Selector {
    /// Parse a selector list such as `input, textarea, .list-item`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut rest = input.trim();
        let mut compounds = Vec::new();

        loop {
            let compound = parse_compound
                .parse_next(&mut rest)
                .map_err(|e| format!("Selector parse error in `{input}`: {e}"))?;
            compounds.push(compound);

            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            if let Some(after) = rest.strip_prefix(',') {
                rest = after.trim_start();
            } else {
                return Err(format!(
                    "Selector parse error in `{input}`: unsupported syntax at `{rest}`"
                ));
            }
        }

        Ok(Self {
            compounds,
            source: input.trim().to_string(),
        })
    }

    /// Build a selector matching any of the given classes.
    pub fn any_class<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let compounds: Vec<Vec<SimpleSelector>> = classes
            .into_iter()
            .map(|c| vec![SimpleSelector::Class(c.to_string())])
            .collect();
        let source = compounds
            .iter()
            .filter_map(|c| match c.first() {
                Some(SimpleSelector::Class(name)) => Some(format!(".{name}")),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", ");
        Self { compounds, source }
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.compounds
            .iter()
            .any(|compound| compound.iter().all(|s| simple_matches(s, element)))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn simple_matches(simple: &SimpleSelector, element: &Element) -> bool {
    match simple {
        SimpleSelector::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
        SimpleSelector::Class(class) => element.has_class(class),
        SimpleSelector::Id(id) => element.id.is_some_and(|eid| eid.as_str() == id),
        SimpleSelector::Attr { name, op, value } => {
            let actual: Option<String> = match name.as_str() {
                "class" => Some(element.class_string()).filter(|s| !s.is_empty()),
                "id" => element.id.map(|id| id.as_str().to_string()),
                "value" => element.value.clone(),
                other => element.attr(other).map(str::to_string),
            };
            let Some(actual) = actual else {
                return false;
            };
            match op {
                AttrOp::Exists => true,
                AttrOp::Equals => actual == *value,
                AttrOp::Contains => !value.is_empty() && actual.contains(value.as_str()),
                AttrOp::Prefix => !value.is_empty() && actual.starts_with(value.as_str()),
                AttrOp::Suffix => !value.is_empty() && actual.ends_with(value.as_str()),
                AttrOp::Word => actual.split_whitespace().any(|w| w == value),
            }
        }
    }
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn parse_identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '-' || c == '_').parse_next(input)
}

fn parse_quoted<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('\'', take_till(0.., '\''), '\''),
        delimited('"', take_till(0.., '"'), '"'),
    ))
    .parse_next(input)
}

fn skip_space(input: &mut &str) {
    *input = input.trim_start();
}

fn parse_compound(input: &mut &str) -> ModalResult<Vec<SimpleSelector>> {
    let mut parts = Vec::new();

    let mut universal = false;
    if input.starts_with('*') {
        *input = &input[1..];
        universal = true;
    } else {
        let checkpoint = *input;
        match parse_identifier.parse_next(input) {
            Ok(tag) => parts.push(SimpleSelector::Tag(tag.to_ascii_lowercase())),
            Err(_) => *input = checkpoint,
        }
    }

    loop {
        if input.starts_with('.') {
            *input = &input[1..];
            let class = parse_identifier.parse_next(input)?;
            parts.push(SimpleSelector::Class(class.to_string()));
        } else if input.starts_with('#') {
            *input = &input[1..];
            let id = parse_identifier.parse_next(input)?;
            parts.push(SimpleSelector::Id(id.to_string()));
        } else if input.starts_with('[') {
            parts.push(parse_attribute.parse_next(input)?);
        } else {
            break;
        }
    }

    if parts.is_empty() && !universal {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(parts)
}

fn parse_attr_op(input: &mut &str) -> ModalResult<AttrOp> {
    alt((
        "*=".value(AttrOp::Contains),
        "^=".value(AttrOp::Prefix),
        "$=".value(AttrOp::Suffix),
        "~=".value(AttrOp::Word),
        "=".value(AttrOp::Equals),
    ))
    .parse_next(input)
}

fn parse_attribute(input: &mut &str) -> ModalResult<SimpleSelector> {
    let _ = '['.parse_next(input)?;
    skip_space(input);
    let name = parse_identifier.parse_next(input)?.to_ascii_lowercase();
    skip_space(input);

    let op = parse_attr_op.parse_next(input).ok();

    let value = match op {
        Some(_) => {
            skip_space(input);
            let v = if input.starts_with('\'') || input.starts_with('"') {
                parse_quoted.parse_next(input)?
            } else {
                parse_identifier.parse_next(input)?
            };
            skip_space(input);
            v.to_string()
        }
        None => String::new(),
    };

    let _ = ']'.parse_next(input)?;
    Ok(SimpleSelector::Attr {
        name,
        op: op.unwrap_or(AttrOp::Exists),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lists_of_compounds() {
        let sel = Selector::parse("input, textarea, [contenteditable='true'], .list-item").unwrap();
        assert!(sel.matches(&Element::new("input")));
        assert!(sel.matches(&Element::new("TEXTAREA")));
        assert!(sel.matches(&Element::new("div").with_attr("contenteditable", "true")));
        assert!(!sel.matches(&Element::new("div").with_attr("contenteditable", "false")));
        assert!(sel.matches(&Element::new("li").with_class("list-item")));
        assert!(!sel.matches(&Element::new("div")));
    }

    #[test]
    fn class_substring_matches_joined_class_attribute() {
        let sel = Selector::parse("[class*='VizFrame']").unwrap();
        assert!(sel.matches(&Element::new("div").with_class("app LineVizFrame")));
        assert!(!sel.matches(&Element::new("div").with_class("frame")));
        assert!(!sel.matches(&Element::new("div")));
    }

    #[test]
    fn compound_requires_every_part() {
        let sel = Selector::parse("div.card#main").unwrap();
        assert!(sel.matches(&Element::new("div").with_class("card").with_id("main")));
        assert!(!sel.matches(&Element::new("div").with_class("card")));
        assert!(!sel.matches(&Element::new("span").with_class("card").with_id("main")));
    }

    #[test]
    fn rejects_combinators_and_empty_parts() {
        assert!(Selector::parse("ul li").is_err());
        assert!(Selector::parse("ul > li").is_err());
        assert!(Selector::parse("a, , b").is_err());
    }

    #[test]
    fn any_class_round_trips_to_source() {
        let sel = Selector::any_class(["a", "b"]);
        assert_eq!(sel.as_str(), ".a, .b");
        assert!(sel.matches(&Element::new("p").with_class("b")));
    }
}
