//! Internal implementation of the identifier services.
//!
//! This module contains the namespace wrapper, the version-5 derivation and the composite-key
//! builder used by the RxNorm transformation.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// A caller-supplied namespace for name-based identifiers.
///
/// This wrapper guarantees that the contained UUID is not nil. Every identifier in a batch is
/// derived from the same namespace; switching namespaces yields a disjoint identity space.
///
/// # Construction
/// - [`Namespace::new`] wraps an existing [`Uuid`].
/// - [`Namespace::parse`] validates an externally supplied string (for example from
///   `RXNORM_NAMESPACE`).
///
/// # Display format
/// Hyphenated lowercase, the same form Java's `UUID.toString()` produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Namespace(Uuid);

impl Namespace {
    /// Wraps `uuid` as a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::NilNamespace`] if `uuid` is the nil UUID.
    pub fn new(uuid: Uuid) -> UuidResult<Self> {
        if uuid.is_nil() {
            return Err(UuidError::NilNamespace);
        }
        Ok(Self(uuid))
    }

    /// Parses a namespace from any RFC 4122 textual form (hyphenated, simple, braced or URN).
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not a UUID, or
    /// [`UuidError::NilNamespace`] if it is the nil UUID.
    pub fn parse(input: &str) -> UuidResult<Self> {
        let uuid = Uuid::parse_str(input.trim()).map_err(|e| {
            UuidError::InvalidInput(format!("namespace is not a UUID ('{}'): {}", input, e))
        })?;
        Self::new(uuid)
    }

    /// Returns the inner UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Derives the identifier for `name` within this namespace.
    ///
    /// Equivalent to [`generate`].
    ///
    /// # Arguments
    /// * `name` - Natural-language key, e.g. an RxCUI or a composite key
    ///
    /// # Returns
    /// The version 5 UUID for `(self, name)`.
    pub fn generate(&self, name: &str) -> UuidResult<Uuid> {
        generate(self, name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Namespace {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Namespace {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Namespace::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Derives a stable 128-bit identifier from `namespace` and `name`.
///
/// The derivation is RFC 4122 version 5: SHA-1 over the 16 namespace bytes followed by the
/// UTF-8 bytes of `name`, truncated to 128 bits with the version nibble set to `5` and the
/// variant set to RFC 4122. The output is a pure function of its arguments.
///
/// # Arguments
/// * `namespace` - Namespace partitioning the identifier space
/// * `name` - Key to hash, as UTF-8
///
/// # Returns
/// The derived identifier, bit-identical on every host.
///
/// # Errors
///
/// Returns [`UuidError::EmptyName`] if `name` is empty. An empty name is always a caller
/// bug (for example an external id that failed to extract), so it is surfaced rather than
/// hashed.
pub fn generate(namespace: &Namespace, name: &str) -> UuidResult<Uuid> {
    if name.is_empty() {
        return Err(UuidError::EmptyName);
    }
    Ok(Uuid::new_v5(&namespace.0, name.as_bytes()))
}

/// Literal suffix appended to a composite key.
///
/// The rendered strings are part of the identity contract: changing any of them re-derives
/// every semantic of that kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PurposeTag {
    FullyQualifiedName,
    Synonym,
    PrescribableSynonym,
    TallmanSynonym,
    /// Tallman synonym entry in the tallman synonym pattern.
    TallmanPattern,
    SnomedIdentifier,
    RxCuiIdentifier,
    VuidIdentifier,
    NdcIdentifier,
    Axiom,
    QualitativeDistinction,
    Quantity,
    Schedule,
    HumanDrug,
    VetDrug,
}

impl PurposeTag {
    /// Returns the literal suffix written at the end of a composite key.
    ///
    /// Identifier tags carry their coding system, so equal codes from two systems on one
    /// concept still derive distinct semantics.
    ///
    /// # Returns
    /// The upper-case tag, e.g. `"DESC"` or `"NDC_ID"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PurposeTag::FullyQualifiedName => "DESC",
            PurposeTag::Synonym => "SYN",
            PurposeTag::PrescribableSynonym => "PSN",
            PurposeTag::TallmanSynonym => "TALLMAN",
            PurposeTag::TallmanPattern => "TALLMAN_PATTERN",
            PurposeTag::SnomedIdentifier => "SNOMED_ID",
            PurposeTag::RxCuiIdentifier => "RXCUI_ID",
            PurposeTag::VuidIdentifier => "VUID_ID",
            PurposeTag::NdcIdentifier => "NDC_ID",
            PurposeTag::Axiom => "AXIOM",
            PurposeTag::QualitativeDistinction => "QD",
            PurposeTag::Quantity => "QUANTITY",
            PurposeTag::Schedule => "SCHEDULE",
            PurposeTag::HumanDrug => "HUMAN_DRUG",
            PurposeTag::VetDrug => "VET_DRUG",
        }
    }
}

impl fmt::Display for PurposeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key for a semantic attached to a concept: `{concept}{value}{tag}`.
///
/// `concept` is rendered hyphenated and lowercase. The concatenation has no separators; this
/// matches the keys already present in loaded datastores.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeKey<'a> {
    concept: Uuid,
    value: &'a str,
    tag: PurposeTag,
}

impl<'a> CompositeKey<'a> {
    /// Creates a key for a semantic of `concept`.
    ///
    /// # Arguments
    /// * `concept` - Identifier of the concept the semantic is attached to
    /// * `value` - Field value as extracted, e.g. a name or a code
    /// * `tag` - Purpose of the semantic
    ///
    /// # Returns
    /// A key that renders as `{concept}{value}{tag}` and borrows `value`.
    pub fn new(concept: Uuid, value: &'a str, tag: PurposeTag) -> Self {
        Self {
            concept,
            value,
            tag,
        }
    }

    /// Derives the semantic identifier for this key.
    ///
    /// # Errors
    ///
    /// Never returns [`UuidError::EmptyName`] in practice, since the rendered key always
    /// contains the concept identifier; the `Result` mirrors [`generate`].
    pub fn derive(&self, namespace: &Namespace) -> UuidResult<Uuid> {
        generate(namespace, &self.to_string())
    }
}

impl fmt::Display for CompositeKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.concept.hyphenated(),
            self.value,
            self.tag.as_str()
        )
    }
}
