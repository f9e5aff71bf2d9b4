//! Minimal HTML element index, enough to locate menu entries by id, class and
//! `data-*` attributes without a full DOM.

use regex::Regex;
use std::sync::OnceLock;

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("tag pattern is valid")
    })
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute pattern is valid")
    })
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"))
}

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"))
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub start: usize,
    pub content_start: usize,
    pub content_end: usize,
    pub end: usize,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn contains(&self, other: &Element) -> bool {
        other.start >= self.content_start && other.end <= self.content_end
    }
}

/// Every element of `html` in document order.
pub fn parse_elements(html: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let comments: Vec<(usize, usize)> = comment_re()
        .find_iter(html)
        .map(|m| (m.start(), m.end()))
        .collect();
    let mut pos = 0;

    while let Some(caps) = tag_re().captures_at(html, pos) {
        let Some(whole) = caps.get(0) else { break };
        if let Some(&(_, comment_end)) = comments
            .iter()
            .find(|(start, end)| *start <= whole.start() && whole.start() < *end)
        {
            pos = comment_end;
            continue;
        }
        pos = whole.end();

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = caps
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let raw_attrs = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

        if closing {
            if let Some(depth) = open.iter().rposition(|&i| elements[i].name == name) {
                for &index in &open[depth..] {
                    elements[index].content_end = whole.start();
                    elements[index].end = whole.start();
                }
                elements[open[depth]].end = whole.end();
                open.truncate(depth);
            }
            continue;
        }

        let self_closing = raw_attrs.trim_end().ends_with('/');
        let mut element = Element {
            attrs: parse_attrs(raw_attrs),
            start: whole.start(),
            content_start: whole.end(),
            content_end: whole.end(),
            end: whole.end(),
            name,
        };

        if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
            elements.push(element);
            continue;
        }

        if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
            let close_tag = format!("</{}", element.name);
            let lowered = html[pos..].to_ascii_lowercase();
            let close_start = lowered.find(&close_tag).map_or(html.len(), |i| pos + i);
            let close_end = html[close_start..]
                .find('>')
                .map_or(html.len(), |i| close_start + i + 1);
            element.content_end = close_start;
            element.end = close_end;
            elements.push(element);
            pos = close_end;
            continue;
        }

        open.push(elements.len());
        elements.push(element);
    }

    for index in open {
        elements[index].content_end = html.len();
        elements[index].end = html.len();
    }

    elements
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    attr_re()
        .captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
                .unwrap_or_default();
            Some((key, value))
        })
        .collect()
}

/// Visible text of a fragment: tags removed, entities decoded, whitespace
/// collapsed.
pub fn text_content(fragment: &str) -> String {
    let without_tags = markup_re().replace_all(fragment, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
