use scraper::{Html, Selector};

/// Decode a timed-text captions document into a single plain-text line.
///
/// All `<text>` element bodies are taken in document order; entities decode
/// via the parser, literal newlines become spaces, empty segments are dropped,
/// and the survivors are joined with single spaces. Stateless: every call
/// parses the document from scratch.
pub fn decode_caption_document(document: &str) -> String {
    let doc = Html::parse_document(document);
    let Ok(sel) = Selector::parse("text") else {
        return String::new();
    };

    doc.select(&sel)
        .filter_map(|el| {
            let segment = el.text().collect::<String>().replace('\n', " ");
            let segment = segment.trim();
            if segment.is_empty() {
                None
            } else {
                Some(segment.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::decode_caption_document;

    #[test]
    fn segments_are_decoded_trimmed_and_joined() {
        let xml = r#"<text start="0">Hello &amp; world</text><text>Bye</text>"#;
        assert_eq!(decode_caption_document(xml), "Hello & world Bye");
    }

    #[test]
    fn newlines_become_spaces_and_empty_segments_drop() {
        let xml = "<transcript><text>line one\nline two</text><text>   </text><text>end</text></transcript>";
        assert_eq!(decode_caption_document(xml), "line one line two end");
    }

    #[test]
    fn decoding_is_restartable() {
        let xml = r#"<text>a</text><text>b</text>"#;
        let first = decode_caption_document(xml);
        let second = decode_caption_document(xml);
        assert_eq!(first, second);
        assert_eq!(first, "a b");
    }

    #[test]
    fn document_without_text_elements_yields_empty() {
        assert_eq!(decode_caption_document("<transcript></transcript>"), "");
    }
}
