//! The per-class attribute record.

use crate::kinds::{ActivityStatus, DocumentMonth, FlagKind, ReferenceKind};
use crate::{NonEmptyText, RXNORM_BASE_URI};
use serde::Serialize;
use std::collections::BTreeMap;

/// A date-scoped secondary code (an NDC) attached to a concept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CodedItem {
    pub code: String,
    /// End of validity as written in the source, conventionally `YYYYMMDD`.
    pub end_date: String,
}

impl CodedItem {
    pub fn new(code: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            end_date: end_date.into(),
        }
    }

    /// The `YYYYMM` month of the end date, if it is well formed.
    pub fn end_month(&self) -> Option<DocumentMonth> {
        DocumentMonth::from_date_prefix(&self.end_date)
    }

    /// Status of this item relative to the document month.
    ///
    /// An end month strictly before `document_month` is inactive; the same month or later is
    /// active. An end date without a readable month has no recorded expiry and is active.
    pub fn status_at(&self, document_month: DocumentMonth) -> ActivityStatus {
        match self.end_month() {
            Some(end) if end < document_month => ActivityStatus::Inactive,
            _ => ActivityStatus::Active,
        }
    }
}

/// Single-valued text attributes of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextField {
    PrimaryName,
    Synonym,
    PrescribableSynonym,
    RdfsLabel,
}

/// Normalised attributes of one ontology class block.
///
/// `external_id` is derived once from `source_uri` at construction. Single-valued fields are
/// write-once (the first value wins); sequences are append-only. Nothing is ever cleared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    source_uri: NonEmptyText,
    external_id: String,
    primary_name: String,
    synonym: String,
    prescribable_synonym: String,
    rdfs_label: String,
    cross_references: BTreeMap<ReferenceKind, String>,
    coded_items: Vec<CodedItem>,
    classification_flags: BTreeMap<FlagKind, String>,
    tallman_synonyms: Vec<String>,
    parent_uris: Vec<String>,
    axiom_expression: String,
}

impl EntityRecord {
    /// Creates an empty record for `source_uri`.
    ///
    /// The external id is the URI with the RxNorm base stripped. Any other URI yields an empty
    /// external id, which marks the record as unusable downstream.
    pub fn new(source_uri: NonEmptyText) -> Self {
        let external_id = source_uri
            .as_str()
            .strip_prefix(RXNORM_BASE_URI)
            .unwrap_or_default()
            .to_owned();

        Self {
            source_uri,
            external_id,
            primary_name: String::new(),
            synonym: String::new(),
            prescribable_synonym: String::new(),
            rdfs_label: String::new(),
            cross_references: BTreeMap::new(),
            coded_items: Vec::new(),
            classification_flags: BTreeMap::new(),
            tallman_synonyms: Vec::new(),
            parent_uris: Vec::new(),
            axiom_expression: String::new(),
        }
    }

    pub fn source_uri(&self) -> &str {
        self.source_uri.as_str()
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn has_external_id(&self) -> bool {
        !self.external_id.is_empty()
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::PrimaryName => &self.primary_name,
            TextField::Synonym => &self.synonym,
            TextField::PrescribableSynonym => &self.prescribable_synonym,
            TextField::RdfsLabel => &self.rdfs_label,
        }
    }

    pub fn primary_name(&self) -> &str {
        &self.primary_name
    }

    pub fn synonym(&self) -> &str {
        &self.synonym
    }

    pub fn prescribable_synonym(&self) -> &str {
        &self.prescribable_synonym
    }

    pub fn rdfs_label(&self) -> &str {
        &self.rdfs_label
    }

    /// Cross-reference code for `kind`, or `""` when absent.
    pub fn cross_reference(&self, kind: ReferenceKind) -> &str {
        self.cross_references
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn cross_references(&self) -> &BTreeMap<ReferenceKind, String> {
        &self.cross_references
    }

    pub fn coded_items(&self) -> &[CodedItem] {
        &self.coded_items
    }

    /// Classification value for `kind`, or `""` when absent.
    pub fn flag(&self, kind: FlagKind) -> &str {
        self.classification_flags
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn classification_flags(&self) -> &BTreeMap<FlagKind, String> {
        &self.classification_flags
    }

    pub fn tallman_synonyms(&self) -> &[String] {
        &self.tallman_synonyms
    }

    pub fn parent_uris(&self) -> &[String] {
        &self.parent_uris
    }

    /// Raw, unrewritten axiom text, or `""` when the block has none.
    pub fn axiom_expression(&self) -> &str {
        &self.axiom_expression
    }

    /// Sets a text field unless it already holds a value. Returns whether the value was stored.
    pub fn set_text_once(&mut self, field: TextField, value: impl Into<String>) -> bool {
        let slot = match field {
            TextField::PrimaryName => &mut self.primary_name,
            TextField::Synonym => &mut self.synonym,
            TextField::PrescribableSynonym => &mut self.prescribable_synonym,
            TextField::RdfsLabel => &mut self.rdfs_label,
        };
        fill_once(slot, value.into())
    }

    /// Stores the code for `kind` unless one is already present.
    pub fn set_cross_reference_once(&mut self, kind: ReferenceKind, code: impl Into<String>) -> bool {
        if self.cross_references.contains_key(&kind) {
            return false;
        }
        self.cross_references.insert(kind, code.into());
        true
    }

    /// Stores the flag value for `kind` unless one is already present.
    pub fn set_flag_once(&mut self, kind: FlagKind, value: impl Into<String>) -> bool {
        if self.classification_flags.contains_key(&kind) {
            return false;
        }
        self.classification_flags.insert(kind, value.into());
        true
    }

    /// Stores the axiom text unless one is already present.
    pub fn set_axiom_expression_once(&mut self, expression: impl Into<String>) -> bool {
        fill_once(&mut self.axiom_expression, expression.into())
    }

    pub fn push_coded_item(&mut self, item: CodedItem) {
        self.coded_items.push(item);
    }

    pub fn push_tallman_synonym(&mut self, synonym: impl Into<String>) {
        self.tallman_synonyms.push(synonym.into());
    }

    pub fn push_parent_uri(&mut self, uri: impl Into<String>) {
        self.parent_uris.push(uri.into());
    }
}

fn fill_once(slot: &mut String, value: String) -> bool {
    if !slot.is_empty() {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uri: &str) -> EntityRecord {
        EntityRecord::new(NonEmptyText::new(uri).unwrap())
    }

    #[test]
    fn external_id_strips_rxnorm_base() {
        let rec = record("http://mor.nlm.nih.gov/RXNORM/996062");
        assert_eq!(rec.external_id(), "996062");
        assert!(rec.has_external_id());
    }

    #[test]
    fn external_id_empty_for_other_vocabularies() {
        let rec = record("http://snomed.info/id/100001");
        assert_eq!(rec.external_id(), "");
        assert!(!rec.has_external_id());
        assert_eq!(rec.source_uri(), "http://snomed.info/id/100001");
    }

    #[test]
    fn text_fields_keep_first_value() {
        let mut rec = record("http://mor.nlm.nih.gov/RXNORM/1");
        assert!(rec.set_text_once(TextField::PrimaryName, "first"));
        assert!(!rec.set_text_once(TextField::PrimaryName, "second"));
        assert_eq!(rec.primary_name(), "first");
        assert_eq!(rec.text(TextField::Synonym), "");
    }

    #[test]
    fn maps_keep_first_value_per_kind() {
        let mut rec = record("http://mor.nlm.nih.gov/RXNORM/1");
        assert!(rec.set_cross_reference_once(ReferenceKind::Snomed, "111"));
        assert!(!rec.set_cross_reference_once(ReferenceKind::Snomed, "222"));
        assert!(rec.set_cross_reference_once(ReferenceKind::Vuid, "333"));
        assert_eq!(rec.cross_reference(ReferenceKind::Snomed), "111");
        assert_eq!(rec.cross_reference(ReferenceKind::RxCui), "");

        assert!(rec.set_flag_once(FlagKind::Schedule, "CII"));
        assert!(!rec.set_flag_once(FlagKind::Schedule, "CIII"));
        assert_eq!(rec.flag(FlagKind::Schedule), "CII");
    }

    #[test]
    fn sequences_preserve_order_and_duplicates() {
        let mut rec = record("http://mor.nlm.nih.gov/RXNORM/1");
        rec.push_tallman_synonym("hydrOXYzine");
        rec.push_tallman_synonym("hydrOXYzine");
        rec.push_coded_item(CodedItem::new("b", "20240101"));
        rec.push_coded_item(CodedItem::new("a", "20230101"));

        assert_eq!(rec.tallman_synonyms(), ["hydrOXYzine", "hydrOXYzine"]);
        let codes: Vec<_> = rec.coded_items().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["b", "a"]);
    }

    #[test]
    fn coded_item_status_boundary() {
        let jan_2024 = DocumentMonth::from_year_month(2024, 1).unwrap();

        assert_eq!(
            CodedItem::new("x", "20231231").status_at(jan_2024),
            ActivityStatus::Inactive
        );
        assert_eq!(
            CodedItem::new("x", "20240101").status_at(jan_2024),
            ActivityStatus::Active
        );
        assert_eq!(
            CodedItem::new("x", "20250601").status_at(jan_2024),
            ActivityStatus::Active
        );
    }

    #[test]
    fn coded_item_without_readable_month_is_active() {
        let jan_2024 = DocumentMonth::from_year_month(2024, 1).unwrap();
        let item = CodedItem::new("x", "unknown");

        assert!(item.end_month().is_none());
        assert_eq!(item.status_at(jan_2024), ActivityStatus::Active);
    }

    #[test]
    fn serializes_kinds_as_snake_case_keys() {
        let mut rec = record("http://mor.nlm.nih.gov/RXNORM/1");
        rec.set_cross_reference_once(ReferenceKind::RxCui, "1");
        let json = serde_json::to_value(&rec).unwrap();

        assert_eq!(json["external_id"], "1");
        assert_eq!(json["cross_references"]["rx_cui"], "1");
    }
}
