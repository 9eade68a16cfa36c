use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node};

/// Inline styles, in the order their markers nest (outermost first).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Bold,
    Highlight,
    Italic,
    Strike,
    Underline,
}

impl Style {
    const ALL: [Style; 5] = [
        Style::Bold,
        Style::Highlight,
        Style::Italic,
        Style::Strike,
        Style::Underline,
    ];

    fn marker(self) -> &'static str {
        match self {
            Style::Bold => "b",
            Style::Highlight => "mark",
            Style::Italic => "i",
            Style::Strike => "strike",
            Style::Underline => "u",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Style::Bold => "bold",
            Style::Highlight => "highlight",
            Style::Italic => "italic",
            Style::Strike => "line-through",
            Style::Underline => "underline",
        }
    }
}

enum Inline<'a> {
    Plain,
    Styled(Vec<Style>),
    Link(&'a str),
}

/// `style` wins over `href`: an element with both is treated as styled text.
fn classify<'a>(element: ElementRef<'a>) -> Inline<'a> {
    let attrs = element.value();
    if let Some(style) = attrs.attr("style") {
        let style = style.to_ascii_lowercase();
        let styles: Vec<Style> = Style::ALL
            .into_iter()
            .filter(|s| style.contains(s.keyword()))
            .collect();
        if styles.is_empty() {
            Inline::Plain
        } else {
            Inline::Styled(styles)
        }
    } else if let Some(href) = attrs.attr("href") {
        Inline::Link(href)
    } else {
        Inline::Plain
    }
}

fn wrap(out: &mut String, text: &str, styles: &[Style]) {
    for s in styles {
        out.push('<');
        out.push_str(s.marker());
        out.push('>');
    }
    out.push_str(text);
    for s in styles.iter().rev() {
        out.push_str("</");
        out.push_str(s.marker());
        out.push('>');
    }
}

/// Render one inline element as marked-up text.
///
/// Every child run is wrapped on its own, so `<span style="font-weight:bold">a<br>b</span>`
/// becomes `<b>a</b><b>b</b>`; [`normalize`] merges such neighbours afterwards.
pub fn format_element(element: ElementRef<'_>) -> String {
    let kind = classify(element);
    let mut out = String::new();
    for child in element.children() {
        let run = match child.value() {
            Node::Text(text) => (**text).to_owned(),
            Node::Element(_) => match ElementRef::wrap(child) {
                Some(el) => format_element(el),
                None => continue,
            },
            _ => continue,
        };
        if run.is_empty() {
            continue;
        }
        match &kind {
            Inline::Plain => out.push_str(&run),
            Inline::Styled(styles) => wrap(&mut out, &run, styles),
            Inline::Link(href) => {
                out.push('[');
                out.push_str(&run);
                out.push_str("](");
                out.push_str(href);
                out.push(')');
            }
        }
    }
    out
}

/// Concatenate the inline rendering of every child of `element`.
pub fn format_children(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    out.push_str(&format_element(el));
                }
            }
            _ => {}
        }
    }
    out
}

/// Only the text nodes directly under `element`.
pub fn direct_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect()
}

static ADJACENT_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    Style::ALL
        .iter()
        .map(|s| {
            let m = s.marker();
            Regex::new(&format!(r"</{m}>\s*<{m}>")).expect("static marker pattern")
        })
        .collect()
});

fn condense_matching_markers(text: &str) -> String {
    let mut text = text.to_string();
    loop {
        let mut changed = false;
        for re in ADJACENT_MARKERS.iter() {
            if re.is_match(&text) {
                text = re.replace_all(&text, " ").into_owned();
                changed = true;
            }
        }
        if !changed {
            return text;
        }
    }
}

/// Collapse whitespace, trim, and merge adjacent runs of the same style.
pub fn normalize(text: &str) -> String {
    let condensed = condense_matching_markers(text);
    condensed.split_whitespace().collect::<Vec<_>>().join(" ")
}

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z0-9$-_@.&+!*(),]|%[0-9a-fA-F]{2})+").expect("static url pattern")
});

/// Turn every bare URL into `[url](url)`.
pub fn linkify_urls(text: &str) -> String {
    URL.replace_all(text, "[$0]($0)").into_owned()
}
