use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

/// Extracts `href` and `src` attribute values from every element of an XML tree
///
/// Attributes are matched on their local name, so namespaced forms such as
/// `xlink:href` in SVG are included. A parse error stops the walk; the values
/// collected up to that point are returned and the error is logged.
pub fn extract_from_xml(xml: &str, base_url: &Url) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut tokens = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                for attr in element.attributes().flatten() {
                    let key = attr.key.local_name();
                    if !matches!(key.as_ref(), b"href" | b"src") {
                        continue;
                    }
                    match attr.unescape_value() {
                        Ok(value) => tokens.push(value.into_owned()),
                        Err(e) => {
                            tracing::debug!("Skipping undecodable attribute in {}: {}", base_url, e)
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    "Failed to parse XML from {} at position {}: {}",
                    base_url,
                    reader.buffer_position(),
                    e
                );
                break;
            }
        }
    }

    tokens
}
