//! Annotation extraction for a single class block.
//!
//! All rules are literal text matches on OWL functional syntax, for example:
//!
//! ```text
//! AnnotationAssertion(:RxNorm_Name <http://mor.nlm.nih.gov/RXNORM/996062> "meclizine 25 MG")
//! AnnotationAssertion(oboInOwl:hasDbXref <http://mor.nlm.nih.gov/RXNORM/996062> "SNOMEDCT: 318353009")
//! AnnotationAssertion(Annotation(:endDate "20231201") Annotation(:startDate "20200101") :ndc <http://mor.nlm.nih.gov/RXNORM/996062> "00002-1200-01")
//! ```
//!
//! Single-valued fields take the first occurrence. Values are stored exactly as captured;
//! validating codes or dates is the loader's concern.

use crate::{OwlError, OwlResult};
use regex::Regex;
use rxnorm_types::{CodedItem, EntityRecord, FlagKind, NonEmptyText, ReferenceKind, TextField};

const TALLMAN_SYNONYM_TAG: &str = "Tallman_Synonym";

/// Compiled extraction rules.
///
/// Construction compiles every pattern once; reuse one extractor for a whole document.
#[derive(Debug, Clone)]
pub struct AttributeExtractor {
    subject: Regex,
    text_fields: Vec<(TextField, Regex)>,
    cross_references: Vec<(ReferenceKind, Regex)>,
    flags: Vec<(FlagKind, Regex)>,
    tallman_synonym: Regex,
    coded_item: Regex,
    sub_class_of: Regex,
}

impl Default for AttributeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeExtractor {
    pub fn new() -> Self {
        let text_fields = [
            (TextField::PrimaryName, annotation_pattern(":RxNorm_Name")),
            (TextField::Synonym, annotation_pattern(":RxNorm_Synonym")),
            (
                TextField::PrescribableSynonym,
                annotation_pattern(":Prescribable_Synonym"),
            ),
            (TextField::RdfsLabel, annotation_pattern("rdfs:label")),
        ]
        .into_iter()
        .collect();

        let cross_references = ReferenceKind::ALL
            .iter()
            .map(|kind| {
                let pattern = format!(
                    r#"oboInOwl:hasDbXref <[^>]+> "{}:\s*([^"]*)""#,
                    regex::escape(kind.xref_prefix())
                );
                (*kind, compile(&pattern))
            })
            .collect();

        let flags = FlagKind::ALL
            .iter()
            .map(|kind| (*kind, annotation_pattern(&format!(":{}", kind.tag()))))
            .collect();

        Self {
            subject: compile(r"<([^>]+)>"),
            text_fields,
            cross_references,
            flags,
            tallman_synonym: annotation_pattern(&format!(":{}", TALLMAN_SYNONYM_TAG)),
            coded_item: compile(concat!(
                r#"Annotation\(:endDate "([^"]*)"(?:\^\^xsd:\w+)?\)\s*"#,
                r#"Annotation\(:startDate "([^"]*)"(?:\^\^xsd:\w+)?\)\s*"#,
                r#":ndc <[^>]+> "([^"]*)""#,
            )),
            sub_class_of: compile(r"SubClassOf\(<([^>]+)>\s+<([^>]+)>\)"),
        }
    }

    /// Returns the first `<...>` token of `block`, the class subject.
    pub fn subject_uri(&self, block: &str) -> OwlResult<NonEmptyText> {
        self.subject
            .captures(block)
            .and_then(|caps| caps.get(1))
            .and_then(|m| NonEmptyText::new(m.as_str()).ok())
            .ok_or(OwlError::MissingSubjectUri)
    }

    /// Builds a record from the annotations in `block`.
    ///
    /// The axiom expression is left empty; see [`crate::axiom::extract_axiom`].
    ///
    /// # Errors
    ///
    /// Returns [`OwlError::MissingSubjectUri`] if the block has no subject URI. Every other
    /// missing attribute simply keeps its default.
    pub fn extract(&self, block: &str) -> OwlResult<EntityRecord> {
        let mut record = EntityRecord::new(self.subject_uri(block)?);

        for (field, pattern) in &self.text_fields {
            if let Some(value) = first_capture(pattern, block) {
                record.set_text_once(*field, value);
            }
        }

        for (kind, pattern) in &self.cross_references {
            if let Some(code) = first_capture(pattern, block) {
                record.set_cross_reference_once(*kind, code);
            }
        }

        for (kind, pattern) in &self.flags {
            if let Some(value) = first_capture(pattern, block) {
                record.set_flag_once(*kind, value);
            }
        }

        for caps in self.coded_item.captures_iter(block) {
            // Group 2 is the start date: matched for well-formedness only.
            let end_date = caps.get(1).map_or("", |m| m.as_str());
            let code = caps.get(3).map_or("", |m| m.as_str());
            record.push_coded_item(CodedItem::new(code, end_date));
        }

        for caps in self.tallman_synonym.captures_iter(block) {
            if let Some(m) = caps.get(1) {
                record.push_tallman_synonym(m.as_str());
            }
        }

        let subject = record.source_uri().to_owned();
        for caps in self.sub_class_of.captures_iter(block) {
            if let (Some(child), Some(parent)) = (caps.get(1), caps.get(2)) {
                if child.as_str() == subject {
                    record.push_parent_uri(parent.as_str());
                }
            }
        }

        Ok(record)
    }
}

fn annotation_pattern(tag: &str) -> Regex {
    compile(&format!(r#"{} <[^>]+> "([^"]*)""#, regex::escape(tag)))
}

fn compile(pattern: &str) -> Regex {
    // Patterns are built from fixed literals; a failure here is a programming error.
    Regex::new(pattern).expect("static extraction pattern must compile")
}

fn first_capture<'a>(pattern: &Regex, block: &'a str) -> Option<&'a str> {
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
