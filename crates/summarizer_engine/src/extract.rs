use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Title and readable text pulled out of a raw HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub title: Option<String>,
    pub text: String,
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedText;
}

/// Best-effort readability extractor:
/// - boilerplate containers contribute nothing, contents included
/// - the first `<article>` or `<main>` outside those containers wins
/// - otherwise the whole `<body>`
/// - text nodes are concatenated with whitespace runs collapsed to one space.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadableTextExtractor;

const SKIPPED_CONTAINERS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript", "template", "iframe",
];

fn is_skipped(tag: &str) -> bool {
    SKIPPED_CONTAINERS.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

impl TextExtractor for ReadableTextExtractor {
    fn extract(&self, html: &str) -> ExtractedText {
        let doc = Html::parse_document(html);

        let title = Selector::parse("title").ok().and_then(|sel| {
            doc.select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
        });

        let mut builder = TextBuilder::new();
        for child in content_root(&doc).children() {
            visit_node(child, &mut builder);
        }

        ExtractedText {
            title,
            text: builder.into_text(),
        }
    }
}

fn content_root(doc: &Html) -> ElementRef<'_> {
    if let Ok(sel) = Selector::parse("article, main") {
        if let Some(found) = doc.select(&sel).find(|el| !inside_skipped(*el)) {
            return found;
        }
    }
    if let Ok(sel) = Selector::parse("body") {
        if let Some(body) = doc.select(&sel).next() {
            return body;
        }
    }
    doc.root_element()
}

fn inside_skipped(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_skipped(ancestor.value().name()))
}

fn visit_node(node: NodeRef<'_, Node>, out: &mut TextBuilder) {
    match node.value() {
        Node::Text(text) => out.append(text),
        Node::Element(element) => {
            if is_skipped(element.name()) {
                return;
            }
            // Element boundaries separate words, as if the tag were whitespace.
            out.separate();
            for child in node.children() {
                visit_node(child, out);
            }
            out.separate();
        }
        _ => {}
    }
}

struct TextBuilder {
    buf: String,
    pending_space: bool,
}

impl TextBuilder {
    fn new() -> Self {
        Self {
            buf: String::new(),
            pending_space: false,
        }
    }

    fn append(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.pending_space = true;
            } else {
                if self.pending_space && !self.buf.is_empty() {
                    self.buf.push(' ');
                }
                self.pending_space = false;
                self.buf.push(ch);
            }
        }
    }

    fn separate(&mut self) {
        self.pending_space = true;
    }

    fn into_text(self) -> String {
        self.buf
    }
}
