use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode response body as {encoding}")]
    Malformed { encoding: String },
}

/// Decode raw response bytes into UTF-8 text.
///
/// Charset resolution order: BOM -> Content-Type header charset -> chardetng
/// guess over the whole body.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<String, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return run_decoder(bytes, encoding);
    }

    if let Some(encoding) = content_type
        .and_then(header_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return run_decoder(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    run_decoder(bytes, detector.guess(None, true))
}

fn header_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches([' ', '"', '\''].as_ref()).to_string())
        } else {
            None
        }
    })
}

fn run_decoder(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::decode_body;

    #[test]
    fn honours_content_type_charset() {
        let bytes = b"caf\xe9"; // iso-8859-1
        let text = decode_body(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn bom_wins_over_header() {
        let bytes = b"\xEF\xBB\xBFhello";
        let text = decode_body(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn charset_key_is_case_insensitive() {
        let bytes = b"caf\xe9";
        let text = decode_body(bytes, Some("text/html; Charset=\"iso-8859-1\"")).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn plain_utf8_decodes_without_hints() {
        let text = decode_body("日本語のテキスト".as_bytes(), None).unwrap();
        assert_eq!(text, "日本語のテキスト");
    }
}
