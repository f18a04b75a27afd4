//! Fixed vocabularies recognised in RxNorm class blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// External coding system of a `oboInOwl:hasDbXref` cross-reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Snomed,
    RxCui,
    Vuid,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::Snomed,
        ReferenceKind::RxCui,
        ReferenceKind::Vuid,
    ];

    /// Case-sensitive prefix that precedes the code inside the quoted xref value,
    /// e.g. `"SNOMEDCT: 318353009"`.
    pub fn xref_prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Snomed => "SNOMEDCT",
            ReferenceKind::RxCui => "RxCUI",
            ReferenceKind::Vuid => "VUID",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xref_prefix())
    }
}

/// Single-valued classification annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    QualitativeDistinction,
    Quantity,
    Schedule,
    HumanDrug,
    VetDrug,
}

impl FlagKind {
    pub const ALL: [FlagKind; 5] = [
        FlagKind::QualitativeDistinction,
        FlagKind::Quantity,
        FlagKind::Schedule,
        FlagKind::HumanDrug,
        FlagKind::VetDrug,
    ];

    /// Annotation property name as it appears after the leading `:`.
    pub fn tag(&self) -> &'static str {
        match self {
            FlagKind::QualitativeDistinction => "Qualitative_Distinction",
            FlagKind::Quantity => "Quantity",
            FlagKind::Schedule => "Schedule",
            FlagKind::HumanDrug => "Human_Drug",
            FlagKind::VetDrug => "Vet_Drug",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Whether a coded item is current relative to the document it was loaded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Active,
    Inactive,
}

/// A calendar month encoded as `YYYYMM` (e.g. `202401`).
///
/// Ordering is numeric, which matches chronological order for four-digit years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMonth(u32);

impl DocumentMonth {
    /// Builds a month from its parts. Returns `None` for months outside `1..=12`.
    pub fn from_year_month(year: u32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self(year * 100 + month))
    }

    /// Parses the leading `YYYYMM` of a `YYYYMMDD`-style string.
    ///
    /// Returns `None` unless the first six characters are ASCII digits forming a valid month.
    pub fn from_date_prefix(date: &str) -> Option<Self> {
        let prefix = date.get(0..6)?;
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: u32 = prefix[0..4].parse().ok()?;
        let month: u32 = prefix[4..6].parse().ok()?;
        Self::from_year_month(year, month)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}
