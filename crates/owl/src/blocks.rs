//! Class block splitting.

/// Marker that opens every class section in the export.
pub const CLASS_MARKER: &str = "# Class: ";

/// Splits `document` into per-class blocks, in source order.
///
/// Text before the first marker is the ontology header and is discarded. A block is the text
/// between one marker and the next (or the end of the document), without the marker itself.
/// Blocks are never filtered: a block without a subject URI is still returned so the caller
/// can report it.
pub fn split_blocks(document: &str) -> Vec<&str> {
    document.split(CLASS_MARKER).skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_header_and_keeps_order() {
        let doc = "Prefix(:=<http://x/>)\nOntology(\n# Class: <a> (A)\nbody a\n# Class: <b> (B)\nbody b\n";
        let blocks = split_blocks(doc);

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("<a> (A)"));
        assert!(blocks[0].contains("body a"));
        assert!(!blocks[0].contains("body b"));
        assert!(blocks[1].starts_with("<b> (B)"));
    }

    #[test]
    fn document_without_marker_has_no_blocks() {
        assert!(split_blocks("Ontology(<http://x>)").is_empty());
        assert!(split_blocks("").is_empty());
    }

    #[test]
    fn keeps_blocks_without_uri() {
        let blocks = split_blocks("header# Class: no uri here\n# Class: <u>\n");

        assert_eq!(blocks, vec!["no uri here\n", "<u>\n"]);
    }

    #[test]
    fn marker_requires_trailing_space() {
        let blocks = split_blocks("# Class:<x>\n# Class: <y>\n");

        assert_eq!(blocks, vec!["<y>\n"]);
    }
}
