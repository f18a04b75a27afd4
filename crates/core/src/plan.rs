//! Loader statement plans.
//!
//! A [`StatementPlan`] lists every identifier a graph loader needs to create or merge the
//! nodes of one concept. Every semantic identifier uses the same key scheme,
//! `{concept}{value}{TAG}` (see [`rxnorm_uuid::CompositeKey`]), where `concept` is
//! `generate(namespace, external_id)`. Changing a tag or the concatenation order re-derives
//! every identity in the datastore.

use crate::constants::{
    flag_pattern, IdentifierSource, TALLMAN_DESCRIPTION, TALLMAN_SYNONYM_PATTERN,
};
use chrono::{DateTime, Utc};
use owl::AxiomRewriter;
use rxnorm_types::{ActivityStatus, DocumentMonth, EntityRecord, FlagKind, ReferenceKind};
use rxnorm_uuid::{CompositeKey, Namespace, PurposeTag, Uuid, UuidResult};
use serde::Serialize;

/// Outcome of planning one field of a record.
///
/// Failures are values so a host can aggregate them without losing batch progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FieldOutcome {
    Planned { field: String },
    /// Planned, but with input the loader should know about.
    Warning { field: String, reason: String },
    /// Not planned; the rest of the record is unaffected.
    Skipped { field: String, reason: String },
}

impl FieldOutcome {
    pub fn field(&self) -> &str {
        match self {
            FieldOutcome::Planned { field }
            | FieldOutcome::Warning { field, .. }
            | FieldOutcome::Skipped { field, .. } => field,
        }
    }

    pub fn is_planned(&self) -> bool {
        matches!(self, FieldOutcome::Planned { .. })
    }
}

/// Author, module and time recorded on every version written for a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Stamp {
    pub author: Uuid,
    pub module: Uuid,
    pub time: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionKind {
    FullyQualifiedName,
    RegularName,
}

/// Language of a text value. The loader maps it to its own language concept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
}

/// Dialect acceptability. The loader maps it to its own acceptability concept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptability {
    Preferred,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DescriptionStatement {
    pub semantic: Uuid,
    pub text: String,
    pub language: Language,
    pub kind: DescriptionKind,
    /// Additional description type, set for tallman synonyms.
    pub description_type: Option<Uuid>,
    pub case_sensitive: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentifierStatement {
    pub semantic: Uuid,
    pub source: IdentifierSource,
    pub source_concept: Uuid,
    pub value: String,
    pub status: ActivityStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AxiomStatement {
    pub semantic: Uuid,
    pub expression: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlagStatement {
    pub semantic: Uuid,
    pub kind: FlagKind,
    pub pattern: Uuid,
    pub value: String,
    /// `generate(namespace, value)` for flags whose value names a concept.
    pub value_concept: Option<Uuid>,
    /// Set for the text-valued patterns that carry a language field.
    pub language: Option<Language>,
}

/// Entry of one tallman synonym in the tallman synonym pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TallmanPatternStatement {
    pub semantic: Uuid,
    pub pattern: Uuid,
    pub text: String,
    pub acceptability: Acceptability,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatementPlan {
    pub concept: Uuid,
    pub stamp: Stamp,
    pub descriptions: Vec<DescriptionStatement>,
    pub identifiers: Vec<IdentifierStatement>,
    pub axiom: Option<AxiomStatement>,
    pub flags: Vec<FlagStatement>,
    pub tallman_patterns: Vec<TallmanPatternStatement>,
    pub parents: Vec<Uuid>,
}

impl StatementPlan {
    /// Number of semantics the plan asks the loader to write.
    pub fn semantic_count(&self) -> usize {
        self.descriptions.len()
            + self.identifiers.len()
            + usize::from(self.axiom.is_some())
            + self.flags.len()
            + self.tallman_patterns.len()
    }
}

/// Builds plans for the records of one document.
pub(crate) struct Planner<'a> {
    pub namespace: &'a Namespace,
    pub rewriter: &'a AxiomRewriter,
    pub stamp: Stamp,
    pub month: DocumentMonth,
}

impl Planner<'_> {
    /// Plans every populated field of `record`.
    ///
    /// `rewritten_axiom` is `None` when the record has no axiom or it could not be rewritten.
    pub fn plan(
        &self,
        record: &EntityRecord,
        concept: Uuid,
        rewritten_axiom: Option<&str>,
    ) -> (StatementPlan, Vec<FieldOutcome>) {
        let mut plan = StatementPlan {
            concept,
            stamp: self.stamp,
            descriptions: Vec::new(),
            identifiers: Vec::new(),
            axiom: None,
            flags: Vec::new(),
            tallman_patterns: Vec::new(),
            parents: Vec::new(),
        };
        let mut outcomes = Vec::new();

        self.plan_descriptions(record, &mut plan, &mut outcomes);
        self.plan_identifiers(record, &mut plan, &mut outcomes);

        if let Some(expression) = rewritten_axiom {
            let field = "axiom".to_string();
            match self.semantic(concept, record.axiom_expression(), PurposeTag::Axiom) {
                Ok(semantic) => {
                    plan.axiom = Some(AxiomStatement {
                        semantic,
                        expression: expression.to_string(),
                    });
                    outcomes.push(FieldOutcome::Planned { field });
                }
                Err(err) => outcomes.push(skipped(field, err)),
            }
        }

        self.plan_flags(record, &mut plan, &mut outcomes);
        self.plan_tallman_patterns(record, &mut plan, &mut outcomes);
        self.plan_parents(record, &mut plan, &mut outcomes);

        (plan, outcomes)
    }

    fn semantic(&self, concept: Uuid, value: &str, tag: PurposeTag) -> UuidResult<Uuid> {
        CompositeKey::new(concept, value, tag).derive(self.namespace)
    }

    fn plan_descriptions(
        &self,
        record: &EntityRecord,
        plan: &mut StatementPlan,
        outcomes: &mut Vec<FieldOutcome>,
    ) {
        let fixed = [
            (
                record.primary_name(),
                PurposeTag::FullyQualifiedName,
                DescriptionKind::FullyQualifiedName,
            ),
            (
                record.synonym(),
                PurposeTag::Synonym,
                DescriptionKind::RegularName,
            ),
            (
                record.prescribable_synonym(),
                PurposeTag::PrescribableSynonym,
                DescriptionKind::RegularName,
            ),
        ];
        let tallman = record.tallman_synonyms().iter().map(|s| {
            (
                s.as_str(),
                PurposeTag::TallmanSynonym,
                DescriptionKind::RegularName,
            )
        });

        for (text, tag, kind) in fixed.into_iter().chain(tallman) {
            if text.is_empty() {
                continue;
            }
            let field = format!("description:{tag}");
            match self.semantic(plan.concept, text, tag) {
                Ok(semantic) => {
                    let tallman = tag == PurposeTag::TallmanSynonym;
                    plan.descriptions.push(DescriptionStatement {
                        semantic,
                        text: text.to_string(),
                        language: Language::English,
                        kind,
                        description_type: tallman.then_some(TALLMAN_DESCRIPTION),
                        case_sensitive: tallman,
                    });
                    outcomes.push(FieldOutcome::Planned { field });
                }
                Err(err) => outcomes.push(skipped(field, err)),
            }
        }
    }

    fn plan_identifiers(
        &self,
        record: &EntityRecord,
        plan: &mut StatementPlan,
        outcomes: &mut Vec<FieldOutcome>,
    ) {
        for kind in ReferenceKind::ALL {
            let code = record.cross_reference(kind);
            if code.is_empty() {
                continue;
            }
            let field = format!("identifier:{kind}");
            let source = IdentifierSource::from(kind);
            match self.semantic(plan.concept, code, source.purpose_tag()) {
                Ok(semantic) => {
                    plan.identifiers.push(IdentifierStatement {
                        semantic,
                        source,
                        source_concept: source.source_concept(),
                        value: code.to_string(),
                        status: ActivityStatus::Active,
                    });
                    outcomes.push(FieldOutcome::Planned { field });
                }
                Err(err) => outcomes.push(skipped(field, err)),
            }
        }

        for item in record.coded_items() {
            let field = format!("identifier:NDC:{}", item.code);
            let tag = IdentifierSource::Ndc.purpose_tag();
            let semantic = match self.semantic(plan.concept, &item.code, tag) {
                Ok(semantic) => semantic,
                Err(err) => {
                    outcomes.push(skipped(field, err));
                    continue;
                }
            };

            plan.identifiers.push(IdentifierStatement {
                semantic,
                source: IdentifierSource::Ndc,
                source_concept: IdentifierSource::Ndc.source_concept(),
                value: item.code.clone(),
                status: item.status_at(self.month),
            });

            if item.end_month().is_none() {
                outcomes.push(FieldOutcome::Warning {
                    field,
                    reason: format!(
                        "end date {:?} is not YYYYMMDD, treated as active",
                        item.end_date
                    ),
                });
            } else {
                outcomes.push(FieldOutcome::Planned { field });
            }
        }
    }

    fn plan_flags(
        &self,
        record: &EntityRecord,
        plan: &mut StatementPlan,
        outcomes: &mut Vec<FieldOutcome>,
    ) {
        for kind in FlagKind::ALL {
            let value = record.flag(kind);
            if value.is_empty() {
                continue;
            }
            let field = format!("flag:{kind}");
            let tag = flag_tag(kind);

            let planned = self.semantic(plan.concept, value, tag).and_then(|semantic| {
                let value_concept = match kind {
                    FlagKind::HumanDrug | FlagKind::VetDrug => {
                        Some(self.namespace.generate(value)?)
                    }
                    _ => None,
                };
                let language = match kind {
                    FlagKind::QualitativeDistinction | FlagKind::Schedule => {
                        Some(Language::English)
                    }
                    _ => None,
                };
                Ok(FlagStatement {
                    semantic,
                    kind,
                    pattern: flag_pattern(kind),
                    value: value.to_string(),
                    value_concept,
                    language,
                })
            });

            match planned {
                Ok(statement) => {
                    plan.flags.push(statement);
                    outcomes.push(FieldOutcome::Planned { field });
                }
                Err(err) => outcomes.push(skipped(field, err)),
            }
        }
    }

    fn plan_tallman_patterns(
        &self,
        record: &EntityRecord,
        plan: &mut StatementPlan,
        outcomes: &mut Vec<FieldOutcome>,
    ) {
        for synonym in record.tallman_synonyms() {
            if synonym.is_empty() {
                continue;
            }
            let field = format!("pattern:{}", PurposeTag::TallmanPattern);
            match self.semantic(plan.concept, synonym, PurposeTag::TallmanPattern) {
                Ok(semantic) => {
                    plan.tallman_patterns.push(TallmanPatternStatement {
                        semantic,
                        pattern: TALLMAN_SYNONYM_PATTERN,
                        text: synonym.clone(),
                        acceptability: Acceptability::Preferred,
                    });
                    outcomes.push(FieldOutcome::Planned { field });
                }
                Err(err) => outcomes.push(skipped(field, err)),
            }
        }
    }

    fn plan_parents(
        &self,
        record: &EntityRecord,
        plan: &mut StatementPlan,
        outcomes: &mut Vec<FieldOutcome>,
    ) {
        for uri in record.parent_uris() {
            let field = format!("parent:{uri}");
            match self.rewriter.identifier_for(uri) {
                Ok(Some(parent)) => {
                    plan.parents.push(parent);
                    outcomes.push(FieldOutcome::Planned { field });
                }
                Ok(None) => outcomes.push(FieldOutcome::Skipped {
                    field,
                    reason: "parent is outside the known vocabularies".into(),
                }),
                Err(err) => outcomes.push(skipped(field, err)),
            }
        }
    }
}

fn flag_tag(kind: FlagKind) -> PurposeTag {
    match kind {
        FlagKind::QualitativeDistinction => PurposeTag::QualitativeDistinction,
        FlagKind::Quantity => PurposeTag::Quantity,
        FlagKind::Schedule => PurposeTag::Schedule,
        FlagKind::HumanDrug => PurposeTag::HumanDrug,
        FlagKind::VetDrug => PurposeTag::VetDrug,
    }
}

fn skipped(field: String, err: impl std::fmt::Display) -> FieldOutcome {
    FieldOutcome::Skipped {
        field,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rxnorm_types::{CodedItem, NonEmptyText, TextField};

    fn ns() -> Namespace {
        Namespace::parse("3094dbd1-60cf-44a6-92e3-0bb32ca4d3de").unwrap()
    }

    fn stamp() -> Stamp {
        Stamp {
            author: Uuid::from_u128(1),
            module: Uuid::from_u128(2),
            time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    fn record() -> EntityRecord {
        EntityRecord::new(NonEmptyText::new("http://mor.nlm.nih.gov/RXNORM/996062").unwrap())
    }

    fn plan(record: &EntityRecord, axiom: Option<&str>) -> (StatementPlan, Vec<FieldOutcome>) {
        let namespace = ns();
        let rewriter = AxiomRewriter::new(namespace);
        let planner = Planner {
            namespace: &namespace,
            rewriter: &rewriter,
            stamp: stamp(),
            month: DocumentMonth::from_year_month(2024, 1).unwrap(),
        };
        let concept = namespace.generate(record.external_id()).unwrap();
        planner.plan(record, concept, axiom)
    }

    fn key(concept: Uuid, value: &str, tag: &str) -> Uuid {
        ns().generate(&format!("{}{}{}", concept.hyphenated(), value, tag))
            .unwrap()
    }

    #[test]
    fn empty_record_plans_nothing() {
        let (plan, outcomes) = plan(&record(), None);

        assert_eq!(plan.semantic_count(), 0);
        assert!(plan.parents.is_empty());
        assert!(outcomes.is_empty());
        assert_eq!(plan.stamp, stamp());
    }

    #[test]
    fn descriptions_use_distinct_tags() {
        let mut r = record();
        r.set_text_once(TextField::PrimaryName, "meclizine 25 MG");
        r.set_text_once(TextField::Synonym, "meclizine 25 MG");
        r.push_tallman_synonym("mecLIZINE");

        let (plan, _) = plan(&r, None);
        let concept = plan.concept;

        assert_eq!(plan.descriptions.len(), 3);
        assert_eq!(
            plan.descriptions[0].semantic,
            key(concept, "meclizine 25 MG", "DESC")
        );
        assert_eq!(
            plan.descriptions[1].semantic,
            key(concept, "meclizine 25 MG", "SYN")
        );
        assert_ne!(plan.descriptions[0].semantic, plan.descriptions[1].semantic);
        assert_eq!(plan.descriptions[0].kind, DescriptionKind::FullyQualifiedName);

        let tallman = &plan.descriptions[2];
        assert!(tallman.case_sensitive);
        assert_eq!(tallman.description_type, Some(TALLMAN_DESCRIPTION));
        assert_eq!(tallman.semantic, key(concept, "mecLIZINE", "TALLMAN"));
    }

    #[test]
    fn coded_item_status_follows_document_month() {
        let mut r = record();
        r.push_coded_item(CodedItem::new("00002-1200-01", "20231231"));
        r.push_coded_item(CodedItem::new("00002-1200-02", "20240131"));

        let (plan, outcomes) = plan(&r, None);

        assert_eq!(plan.identifiers[0].status, ActivityStatus::Inactive);
        assert_eq!(plan.identifiers[1].status, ActivityStatus::Active);
        assert_eq!(plan.identifiers[0].source, IdentifierSource::Ndc);
        assert!(outcomes.iter().all(FieldOutcome::is_planned));
    }

    #[test]
    fn unreadable_end_date_is_active_with_warning() {
        let mut r = record();
        r.push_coded_item(CodedItem::new("00002-1200-01", "n/a"));

        let (plan, outcomes) = plan(&r, None);

        assert_eq!(plan.identifiers[0].status, ActivityStatus::Active);
        assert!(matches!(
            &outcomes[0],
            FieldOutcome::Warning { field, .. } if field == "identifier:NDC:00002-1200-01"
        ));
    }

    #[test]
    fn cross_references_carry_their_source() {
        let mut r = record();
        r.set_cross_reference_once(ReferenceKind::Snomed, "318353009");

        let (plan, _) = plan(&r, None);
        let id = &plan.identifiers[0];

        assert_eq!(id.source, IdentifierSource::Snomed);
        assert_eq!(id.source_concept, crate::constants::SNOMED_IDENTIFIER);
        assert_eq!(id.semantic, key(plan.concept, "318353009", "SNOMED_ID"));
    }

    #[test]
    fn equal_codes_from_different_sources_do_not_collide() {
        let mut r = record();
        r.set_cross_reference_once(ReferenceKind::RxCui, "4004577");
        r.set_cross_reference_once(ReferenceKind::Vuid, "4004577");
        r.push_coded_item(CodedItem::new("4004577", "20240131"));

        let (plan, _) = plan(&r, None);
        let semantics: std::collections::HashSet<_> =
            plan.identifiers.iter().map(|i| i.semantic).collect();

        assert_eq!(plan.identifiers.len(), 3);
        assert_eq!(semantics.len(), 3);
        assert_eq!(
            plan.identifiers[0].semantic,
            key(plan.concept, "4004577", "RXCUI_ID")
        );
        assert_eq!(
            plan.identifiers[2].semantic,
            key(plan.concept, "4004577", "NDC_ID")
        );
    }

    #[test]
    fn each_tallman_synonym_enters_the_tallman_pattern() {
        let mut r = record();
        r.push_tallman_synonym("mecLIZINE");
        r.push_tallman_synonym("hydrOXYzine");

        let (plan, outcomes) = plan(&r, None);

        assert_eq!(plan.tallman_patterns.len(), 2);
        let first = &plan.tallman_patterns[0];
        assert_eq!(first.pattern, TALLMAN_SYNONYM_PATTERN);
        assert_eq!(first.acceptability, Acceptability::Preferred);
        assert_eq!(first.semantic, key(plan.concept, "mecLIZINE", "TALLMAN_PATTERN"));
        assert_ne!(first.semantic, plan.descriptions[0].semantic);
        assert_eq!(plan.semantic_count(), 4);
        assert!(outcomes.iter().all(FieldOutcome::is_planned));
    }

    #[test]
    fn text_patterns_carry_english_language() {
        let mut r = record();
        r.set_flag_once(FlagKind::QualitativeDistinction, "Extended release");
        r.set_flag_once(FlagKind::Schedule, "CIV");
        r.set_flag_once(FlagKind::Quantity, "10 ML");

        let (plan, _) = plan(&r, None);
        let language = |kind: FlagKind| {
            plan.flags
                .iter()
                .find(|f| f.kind == kind)
                .unwrap()
                .language
        };

        assert_eq!(language(FlagKind::QualitativeDistinction), Some(Language::English));
        assert_eq!(language(FlagKind::Schedule), Some(Language::English));
        assert_eq!(language(FlagKind::Quantity), None);
    }

    #[test]
    fn drug_flags_name_a_value_concept() {
        let mut r = record();
        r.set_flag_once(FlagKind::HumanDrug, "US");
        r.set_flag_once(FlagKind::Schedule, "CIV");

        let (plan, _) = plan(&r, None);

        let human = plan.flags.iter().find(|f| f.kind == FlagKind::HumanDrug).unwrap();
        assert_eq!(human.value_concept, Some(ns().generate("US").unwrap()));
        assert_eq!(human.semantic, key(plan.concept, "US", "HUMAN_DRUG"));

        let schedule = plan.flags.iter().find(|f| f.kind == FlagKind::Schedule).unwrap();
        assert_eq!(schedule.value_concept, None);
        assert_eq!(schedule.pattern, crate::constants::SCHEDULE_PATTERN);
    }

    #[test]
    fn axiom_semantic_is_keyed_on_raw_text() {
        let mut r = record();
        r.set_axiom_expression_once("EquivalentClasses(<a> <b>)");

        let (plan, _) = plan(&r, Some("EquivalentClasses(:[x] <b>)"));
        let axiom = plan.axiom.unwrap();

        assert_eq!(
            axiom.semantic,
            key(plan.concept, "EquivalentClasses(<a> <b>)", "AXIOM")
        );
        assert_eq!(axiom.expression, "EquivalentClasses(:[x] <b>)");
    }

    #[test]
    fn unknown_parent_is_skipped() {
        let mut r = record();
        r.push_parent_uri("http://mor.nlm.nih.gov/RXNORM/1");
        r.push_parent_uri("http://example.org/Other");

        let (plan, outcomes) = plan(&r, None);

        assert_eq!(plan.parents, vec![ns().generate("1").unwrap()]);
        assert!(matches!(&outcomes[1], FieldOutcome::Skipped { .. }));
    }
}
