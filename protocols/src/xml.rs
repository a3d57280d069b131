//! Minimal, namespace-agnostic XML lookups.
//!
//! Devices disagree on namespace prefixes (`tds:`, `tt:`, `ns2:`, none at all), so elements are
//! matched by local name only. This is not a validating parser: it finds the first element with
//! a given local name and returns its raw body.

use std::borrow::Cow;

/// An element located in a document: its raw attribute text and raw body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub attrs: &'a str,
    pub body: &'a str,
}

impl<'a> Element<'a> {
    /// Value of the attribute `name`, matched by local name.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        let mut rest: &'a str = self.attrs;
        loop {
            rest = rest.trim_start();
            let eq = rest.find('=')?;
            let key = rest[..eq].trim();
            let after = rest[eq + 1..].trim_start();
            let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
            let value_end = after[1..].find(quote)?;
            let value = &after[1..1 + value_end];
            if local_name(key) == name {
                return Some(value);
            }
            rest = &after[value_end + 2..];
        }
    }

    pub fn text(&self) -> &'a str {
        self.body.trim()
    }
}

struct OpenTag<'a> {
    name: &'a str,
    attrs: &'a str,
    body_start: usize,
    self_closing: bool,
}

fn local_name(qualified: &str) -> &str {
    qualified.split_once(':').map_or(qualified, |(_, local)| local)
}

fn find_open_tag<'a>(xml: &'a str, from: usize, local: &str) -> Option<OpenTag<'a>> {
    let mut cursor: usize = from;
    while let Some(offset) = xml.get(cursor..)?.find('<') {
        let start: usize = cursor + offset;
        let rest: &str = &xml[start + 1..];
        cursor = start + 1;

        if rest.starts_with(['/', '?', '!']) {
            continue;
        }
        let name_end: usize = match rest.find(|c: char| c.is_whitespace() || c == '>' || c == '/') {
            Some(idx) => idx,
            None => return None,
        };
        let tag_end: usize = rest.find('>')?;
        let name: &str = &rest[..name_end];
        if local_name(name) != local {
            continue;
        }

        let inner: &str = &rest[name_end..tag_end];
        let self_closing: bool = inner.ends_with('/');
        return Some(OpenTag {
            name,
            attrs: inner.trim_end_matches('/'),
            body_start: start + 1 + tag_end + 1,
            self_closing,
        });
    }
    None
}

/// Finds the next element named `local` at or after `from`, returning it and the offset just
/// past its end.
fn find_element_from<'a>(xml: &'a str, from: usize, local: &str) -> Option<(Element<'a>, usize)> {
    let tag = find_open_tag(xml, from, local)?;
    if tag.self_closing {
        let element = Element {
            attrs: tag.attrs,
            body: "",
        };
        return Some((element, tag.body_start));
    }

    let close: String = format!("</{}>", tag.name);
    let body_len: usize = xml[tag.body_start..].find(&close)?;
    let element = Element {
        attrs: tag.attrs,
        body: &xml[tag.body_start..tag.body_start + body_len],
    };
    Some((element, tag.body_start + body_len + close.len()))
}

/// First element with the given local name.
pub fn element<'a>(xml: &'a str, local: &str) -> Option<Element<'a>> {
    find_element_from(xml, 0, local).map(|(element, _)| element)
}

/// All non-nested elements with the given local name, in document order.
pub fn elements<'a>(xml: &'a str, local: &str) -> Vec<Element<'a>> {
    let mut found: Vec<Element<'a>> = Vec::new();
    let mut cursor: usize = 0;
    while let Some((element, next)) = find_element_from(xml, cursor, local) {
        found.push(element);
        cursor = next;
    }
    found
}

/// Trimmed text of the first element named `local`, or `None` when absent or empty.
pub fn element_text<'a>(xml: &'a str, local: &str) -> Option<&'a str> {
    element(xml, local)
        .map(|element| element.text())
        .filter(|text| !text.is_empty())
}

pub fn contains_element(xml: &str, local: &str) -> bool {
    find_open_tag(xml, 0, local).is_some()
}

/// Resolves entity and character references. Text with a malformed reference is kept as is.
pub fn unescape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(text).unwrap_or(Cow::Borrowed(text))
}

pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
