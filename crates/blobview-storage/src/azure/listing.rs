//! List Blobs response parsing.
//!
//! The response schema is small and fixed, so elements are located by tag
//! instead of going through a full XML parser.

use crate::error::{StorageError, StorageResult};

/// Blob names and continuation marker from one List Blobs response.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BlobListing {
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

/// Parses an `EnumerationResults` document.
pub(crate) fn parse_list_blobs(body: &str) -> StorageResult<BlobListing> {
    if !body.contains("<EnumerationResults") {
        return Err(StorageError::invalid_response(
            "listing response has no EnumerationResults element",
        ));
    }

    let mut names = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("<Blob>") {
        let blob = &rest[start + "<Blob>".len()..];
        let end = blob
            .find("</Blob>")
            .ok_or_else(|| StorageError::invalid_response("unterminated Blob element"))?;
        let blob = &blob[..end];

        let name = element_text(blob, "Name")
            .ok_or_else(|| StorageError::invalid_response("Blob element without a Name"))?;
        names.push(unescape(name)?);

        rest = &rest[start + "<Blob>".len() + end + "</Blob>".len()..];
    }

    let next_marker = match element_text(body, "NextMarker") {
        Some(marker) if !marker.trim().is_empty() => Some(unescape(marker.trim())?),
        _ => None,
    };

    Ok(BlobListing { names, next_marker })
}

/// Returns the service error code from an error response body.
pub(crate) fn error_code(body: &str) -> Option<String> {
    element_text(body, "Code")
        .and_then(|code| unescape(code.trim()).ok())
        .filter(|code| !code.is_empty())
}

/// Returns the raw text between `<tag ...>` and `</tag>`.
///
/// Self-closing elements yield `None`.
fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut offset = 0;
    while let Some(pos) = xml[offset..].find(&open) {
        let after = offset + pos + open.len();
        let rest = &xml[after..];
        match rest.chars().next() {
            Some('>') => {
                let text = &rest[1..];
                return text.find(&close).map(|end| &text[..end]);
            }
            Some(c) if c.is_ascii_whitespace() => {
                let gt = rest.find('>')?;
                if rest[..gt].ends_with('/') {
                    return None;
                }
                let text = &rest[gt + 1..];
                return text.find(&close).map(|end| &text[..end]);
            }
            Some('/') => return None,
            // Longer tag name sharing the prefix, e.g. `<NameSpace>`.
            _ => offset = after,
        }
    }

    None
}

/// Resolves the predefined XML entities and character references.
fn unescape(text: &str) -> StorageResult<String> {
    if !text.contains('&') {
        return Ok(text.to_owned());
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let entity = &rest[amp + 1..];
        let semi = entity
            .find(';')
            .ok_or_else(|| StorageError::invalid_response("unterminated XML entity"))?;

        let decoded = match &entity[..semi] {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            reference => char_reference(reference).ok_or_else(|| {
                StorageError::invalid_response(format!("unknown XML entity '&{reference};'"))
            })?,
        };
        out.push(decoded);
        rest = &entity[semi + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

fn char_reference(reference: &str) -> Option<char> {
    let digits = reference.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://acct.blob.core.windows.net/" ContainerName="photos">
  <MaxResults>3</MaxResults>
  <Blobs>
    <Blob>
      <Name>cats/a.png</Name>
      <Properties><Content-Type>image/png</Content-Type></Properties>
    </Blob>
    <Blob>
      <Name>Tom &amp; Jerry.JPG</Name>
      <Properties />
    </Blob>
    <Blob>
      <Name>notes&#x2F;readme.txt</Name>
    </Blob>
  </Blobs>
  <NextMarker>2!88!MDAwMDE0IWNhdHMvZC5wbmc-</NextMarker>
</EnumerationResults>"#;

    #[test]
    fn parses_names_and_marker() {
        let listing = parse_list_blobs(PAGE).unwrap();

        assert_eq!(
            listing.names,
            vec!["cats/a.png", "Tom & Jerry.JPG", "notes/readme.txt"]
        );
        assert_eq!(
            listing.next_marker.as_deref(),
            Some("2!88!MDAwMDE0IWNhdHMvZC5wbmc-")
        );
    }

    #[test]
    fn empty_marker_ends_listing() {
        let body = r#"<EnumerationResults><Blobs /><NextMarker /></EnumerationResults>"#;
        assert_eq!(parse_list_blobs(body).unwrap(), BlobListing::default());

        let body = "<EnumerationResults><Blobs></Blobs><NextMarker></NextMarker></EnumerationResults>";
        assert_eq!(parse_list_blobs(body).unwrap().next_marker, None);
    }

    #[test]
    fn rejects_unexpected_documents() {
        assert!(parse_list_blobs("<Error><Code>AuthenticationFailed</Code></Error>").is_err());
        assert!(parse_list_blobs("<EnumerationResults><Blob><Name>a.png</Name>").is_err());
    }

    #[test]
    fn extracts_error_code() {
        let body = "<?xml version=\"1.0\"?><Error><Code>ContainerNotFound</Code><Message>gone</Message></Error>";

        assert_eq!(error_code(body).as_deref(), Some("ContainerNotFound"));
        assert_eq!(error_code("service unavailable"), None);
    }

    #[test]
    fn unescapes_references() {
        assert_eq!(unescape("a&lt;b&gt;&quot;c&apos;").unwrap(), "a<b>\"c'");
        assert_eq!(unescape("caf&#233;").unwrap(), "café");
        assert!(unescape("a&bogus;").is_err());
        assert!(unescape("a&amp").is_err());
    }
}
