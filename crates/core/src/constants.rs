//! Constants used throughout the RxNorm core crate.
//!
//! Well-known identifiers are constants of the terminology model, not runtime state. They are
//! expressed as a static lookup from the typed kinds in `rxnorm-types` to fixed UUIDs.

use rxnorm_types::{FlagKind, ReferenceKind};
use rxnorm_uuid::{PurposeTag, Uuid};
use serde::{Deserialize, Serialize};

/// Environment variable holding the identifier namespace UUID.
pub const NAMESPACE_ENV: &str = "RXNORM_NAMESPACE";

/// Environment variable holding the path of the OWL export to process.
pub const OWL_FILE_ENV: &str = "RXNORM_OWL_FILE";

/// Environment variable holding additional comma-separated reference prefixes.
pub const EXTRA_PREFIXES_ENV: &str = "RXNORM_EXTRA_PREFIXES";

/// Name hashed with the namespace to derive the stamp author concept.
pub const AUTHOR_NAME: &str = "RxNorm Author";

/// Name hashed with the namespace to derive the stamp module concept.
pub const MODULE_NAME: &str = "RxNorm Module";

pub const SNOMED_IDENTIFIER: Uuid = Uuid::from_u128(0xed73f32d_c068_43f8_9767_ace6dfee44db);
pub const RXCUI_IDENTIFIER: Uuid = Uuid::from_u128(0xe409e4ce_4527_49a0_bdc6_f4fe79c21088);
pub const NDC_IDENTIFIER: Uuid = Uuid::from_u128(0x88f22a11_3715_4d58_8cb4_aa14d49a6b35);
pub const VUID_IDENTIFIER: Uuid = Uuid::from_u128(0x5d06759b_56f7_4c24_be70_5cea09e0e130);

/// Description type of tallman-lettered synonyms.
pub const TALLMAN_DESCRIPTION: Uuid = Uuid::from_u128(0x64943aee_fbad_485f_921d_ca03501faf26);

pub const TALLMAN_SYNONYM_PATTERN: Uuid =
    Uuid::from_u128(0x6b46672e_6a1d_4f6d_b4d8_9ca047f916cc);

// Shares its value with RXCUI_IDENTIFIER in every loaded datastore; do not "fix".
pub const QUALITATIVE_DISTINCTION_PATTERN: Uuid =
    Uuid::from_u128(0xe409e4ce_4527_49a0_bdc6_f4fe79c21088);
pub const QUANTITY_PATTERN: Uuid = Uuid::from_u128(0xbd1fdc59_962c_44e1_8a77_8c91a4faac7e);
pub const SCHEDULE_PATTERN: Uuid = Uuid::from_u128(0x95b64af6_cf7c_4a92_aacd_c7e9fa968aa4);
pub const HUMAN_DRUG_PATTERN: Uuid = Uuid::from_u128(0xd5fd4cff_b3fa_490d_aed8_85459c1edfe1);
pub const VET_DRUG_PATTERN: Uuid = Uuid::from_u128(0x8140c0a7_76b5_4fe7_a6e0_c27246e26a1d);

/// Coding system that issued an identifier semantic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierSource {
    Snomed,
    RxCui,
    Vuid,
    Ndc,
}

impl IdentifierSource {
    /// The concept that names this coding system in the datastore.
    pub fn source_concept(&self) -> Uuid {
        match self {
            IdentifierSource::Snomed => SNOMED_IDENTIFIER,
            IdentifierSource::RxCui => RXCUI_IDENTIFIER,
            IdentifierSource::Vuid => VUID_IDENTIFIER,
            IdentifierSource::Ndc => NDC_IDENTIFIER,
        }
    }

    /// Composite-key tag of identifier semantics issued by this system.
    pub fn purpose_tag(&self) -> PurposeTag {
        match self {
            IdentifierSource::Snomed => PurposeTag::SnomedIdentifier,
            IdentifierSource::RxCui => PurposeTag::RxCuiIdentifier,
            IdentifierSource::Vuid => PurposeTag::VuidIdentifier,
            IdentifierSource::Ndc => PurposeTag::NdcIdentifier,
        }
    }
}

impl From<ReferenceKind> for IdentifierSource {
    fn from(kind: ReferenceKind) -> Self {
        match kind {
            ReferenceKind::Snomed => IdentifierSource::Snomed,
            ReferenceKind::RxCui => IdentifierSource::RxCui,
            ReferenceKind::Vuid => IdentifierSource::Vuid,
        }
    }
}

/// Pattern concept under which a classification flag is stored.
pub fn flag_pattern(kind: FlagKind) -> Uuid {
    match kind {
        FlagKind::QualitativeDistinction => QUALITATIVE_DISTINCTION_PATTERN,
        FlagKind::Quantity => QUANTITY_PATTERN,
        FlagKind::Schedule => SCHEDULE_PATTERN,
        FlagKind::HumanDrug => HUMAN_DRUG_PATTERN,
        FlagKind::VetDrug => VET_DRUG_PATTERN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_render_as_documented() {
        assert_eq!(
            SNOMED_IDENTIFIER.to_string(),
            "ed73f32d-c068-43f8-9767-ace6dfee44db"
        );
        assert_eq!(
            TALLMAN_SYNONYM_PATTERN.to_string(),
            "6b46672e-6a1d-4f6d-b4d8-9ca047f916cc"
        );
        assert_eq!(
            VET_DRUG_PATTERN.to_string(),
            "8140c0a7-76b5-4fe7-a6e0-c27246e26a1d"
        );
    }

    #[test]
    fn every_reference_kind_has_a_source() {
        for kind in ReferenceKind::ALL {
            let source = IdentifierSource::from(kind);
            assert_ne!(source.source_concept(), NDC_IDENTIFIER);
        }
        assert_eq!(IdentifierSource::Ndc.source_concept(), NDC_IDENTIFIER);
    }

    #[test]
    fn identifier_sources_have_distinct_tags() {
        let sources = [
            IdentifierSource::Snomed,
            IdentifierSource::RxCui,
            IdentifierSource::Vuid,
            IdentifierSource::Ndc,
        ];
        let tags: std::collections::HashSet<_> =
            sources.iter().map(|s| s.purpose_tag().as_str()).collect();

        assert_eq!(tags.len(), sources.len());
        assert_eq!(IdentifierSource::Ndc.purpose_tag().as_str(), "NDC_ID");
    }

    #[test]
    fn qualitative_distinction_reuses_rxcui_value() {
        assert_eq!(
            flag_pattern(FlagKind::QualitativeDistinction),
            RXCUI_IDENTIFIER
        );
        assert_eq!(flag_pattern(FlagKind::Schedule), SCHEDULE_PATTERN);
    }
}
