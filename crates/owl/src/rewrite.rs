//! Reference rewriting for axiom expressions.
//!
//! Pass one replaces every `<uri>` under a known prefix with `:[<uuid>]`, where the UUID is
//! derived from the namespace and the URI's local name. Pass two re-emits every
//! `DataHasValue(...)` in the canonical form `DataHasValue(:[<uuid>] "<literal>"^^xsd:<type>)`.
//! Unknown vocabularies pass through both passes untouched.
//!
//! The output of [`AxiomRewriter::rewrite`] is a fixed point: rewriting it again returns the
//! same text.

use crate::OwlResult;
use regex::{Captures, Regex};
use rxnorm_types::{RXNORM_BASE_URI, SNOMED_BASE_URI};
use rxnorm_uuid::{Namespace, Uuid};
use std::sync::LazyLock;

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>\s]+)>").expect("reference pattern must compile"));

static DATA_HAS_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"DataHasValue\(:\[([^\]]*)\]\s+"([^"]*)"\^\^xsd:([^)]+)\)"#,
        r#"|DataHasValue\(<([^<>\s]+)>\s+"([^"]*)"\^\^xsd:([^)]+)\)"#,
    ))
    .expect("DataHasValue pattern must compile")
});

/// Prefixes rewritten when no explicit list is configured.
pub const DEFAULT_PREFIXES: [&str; 2] = [SNOMED_BASE_URI, RXNORM_BASE_URI];

/// Rewrites axiom references into namespace-derived identifier tokens.
#[derive(Debug, Clone)]
pub struct AxiomRewriter {
    namespace: Namespace,
    prefixes: Vec<String>,
}

impl AxiomRewriter {
    /// Creates a rewriter for the SNOMED CT and RxNorm prefixes.
    pub fn new(namespace: Namespace) -> Self {
        Self::with_prefixes(namespace, DEFAULT_PREFIXES)
    }

    /// Creates a rewriter for an explicit prefix list.
    ///
    /// When prefixes overlap, the longest one wins.
    pub fn with_prefixes<I, S>(namespace: Namespace, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.is_empty())
            .collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        prefixes.dedup();

        Self {
            namespace,
            prefixes,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Rewrites `axiom` in two passes. Empty input yields empty output.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OwlError::Identifier`] if a known-prefix URI has an empty local name
    /// (for example `<http://snomed.info/id/>`).
    pub fn rewrite(&self, axiom: &str) -> OwlResult<String> {
        if axiom.is_empty() {
            return Ok(String::new());
        }
        let references = self.rewrite_references(axiom)?;
        self.normalise_data_values(&references)
    }

    /// Identifier token for `uri`, or `None` when its vocabulary is unknown.
    pub fn token_for(&self, uri: &str) -> OwlResult<Option<String>> {
        Ok(self.identifier_for(uri)?.map(token))
    }

    /// Identifier derived from `uri`'s local name, or `None` when its vocabulary is unknown.
    pub fn identifier_for(&self, uri: &str) -> OwlResult<Option<Uuid>> {
        let Some(local) = self
            .prefixes
            .iter()
            .find_map(|prefix| uri.strip_prefix(prefix.as_str()))
        else {
            return Ok(None);
        };
        Ok(Some(self.namespace.generate(local)?))
    }

    fn rewrite_references(&self, axiom: &str) -> OwlResult<String> {
        replace_all(&REFERENCE_RE, axiom, |caps| {
            let uri = &caps[1];
            Ok(match self.token_for(uri)? {
                Some(token) => token,
                None => caps[0].to_owned(),
            })
        })
    }

    fn normalise_data_values(&self, axiom: &str) -> OwlResult<String> {
        replace_all(&DATA_HAS_VALUE_RE, axiom, |caps| {
            if let Some(id) = caps.get(1) {
                return Ok(data_has_value(
                    &format!(":[{}]", id.as_str()),
                    &caps[2],
                    &caps[3],
                ));
            }

            let uri = &caps[4];
            let reference = match self.token_for(uri)? {
                Some(token) => token,
                None => format!("<{}>", uri),
            };
            Ok(data_has_value(&reference, &caps[5], &caps[6]))
        })
    }
}

fn token(id: Uuid) -> String {
    format!(":[{}]", id.hyphenated())
}

fn data_has_value(reference: &str, literal: &str, datatype: &str) -> String {
    format!("DataHasValue({} \"{}\"^^xsd:{})", reference, literal, datatype)
}

/// Like `Regex::replace_all`, but the replacement may fail.
fn replace_all<F>(re: &Regex, haystack: &str, mut replacement: F) -> OwlResult<String>
where
    F: FnMut(&Captures<'_>) -> OwlResult<String>,
{
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;

    for caps in re.captures_iter(haystack) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&haystack[last..whole.start()]);
        out.push_str(&replacement(&caps)?);
        last = whole.end();
    }
    out.push_str(&haystack[last..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OwlError;
    use rxnorm_uuid::UuidError;

    fn ns() -> Namespace {
        Namespace::parse("3094dbd1-60cf-44a6-92e3-0bb32ca4d3de").unwrap()
    }

    fn id(name: &str) -> String {
        ns().generate(name).unwrap().hyphenated().to_string()
    }

    #[test]
    fn rewrites_nested_scenario() {
        let axiom = "EquivalentClasses(<http://mor.nlm.nih.gov/RXNORM/996062> ObjectIntersectionOf(<http://snomed.info/id/100001> DataHasValue(<http://snomed.info/id/100002> \"5\"^^xsd:integer)))";

        let rewritten = AxiomRewriter::new(ns()).rewrite(axiom).unwrap();

        assert_eq!(
            rewritten,
            format!(
                "EquivalentClasses(:[{}] ObjectIntersectionOf(:[{}] DataHasValue(:[{}] \"5\"^^xsd:integer)))",
                id("996062"),
                id("100001"),
                id("100002")
            )
        );
    }

    #[test]
    fn unknown_prefixes_pass_through() {
        let axiom = "EquivalentClasses(<http://example.org/onto#A> ObjectSomeValuesFrom(<http://snomed.info/id/1> <http://example.org/onto#B>))";

        let rewritten = AxiomRewriter::new(ns()).rewrite(axiom).unwrap();

        assert_eq!(
            rewritten,
            format!(
                "EquivalentClasses(<http://example.org/onto#A> ObjectSomeValuesFrom(:[{}] <http://example.org/onto#B>))",
                id("1")
            )
        );
    }

    #[test]
    fn unknown_data_property_is_preserved() {
        let axiom = "DataHasValue(<http://example.org/p>  \"2\"^^xsd:decimal)";

        let rewritten = AxiomRewriter::new(ns()).rewrite(axiom).unwrap();

        assert_eq!(rewritten, "DataHasValue(<http://example.org/p> \"2\"^^xsd:decimal)");
    }

    #[test]
    fn normalises_whitespace_inside_data_has_value() {
        let axiom = "DataHasValue(<http://snomed.info/id/7>\n   \"0.5\"^^xsd:decimal)";

        let rewritten = AxiomRewriter::new(ns()).rewrite(axiom).unwrap();

        assert_eq!(
            rewritten,
            format!("DataHasValue(:[{}] \"0.5\"^^xsd:decimal)", id("7"))
        );
    }

    #[test]
    fn rewriting_is_idempotent() {
        let rewriter = AxiomRewriter::new(ns());
        let axiom = "EquivalentClasses(<http://mor.nlm.nih.gov/RXNORM/9> ObjectIntersectionOf(<http://snomed.info/id/1> <http://example.org/x> DataHasValue(<http://snomed.info/id/2>  \"5\"^^xsd:integer) DataHasValue(<http://example.org/y> \"a b\"^^xsd:string)))";

        let once = rewriter.rewrite(axiom).unwrap();
        let twice = rewriter.rewrite(&once).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_text_outside_references() {
        let axiom = "EquivalentClasses( <http://snomed.info/id/1>   ObjectUnionOf(\"literal <not a uri>\") )";

        let rewritten = AxiomRewriter::new(ns()).rewrite(axiom).unwrap();

        assert_eq!(
            rewritten,
            format!(
                "EquivalentClasses( :[{}]   ObjectUnionOf(\"literal <not a uri>\") )",
                id("1")
            )
        );
    }

    #[test]
    fn empty_input_is_noop() {
        assert_eq!(AxiomRewriter::new(ns()).rewrite("").unwrap(), "");
    }

    #[test]
    fn empty_local_name_is_an_error() {
        let err = AxiomRewriter::new(ns())
            .rewrite("EquivalentClasses(<http://snomed.info/id/> <x>)")
            .unwrap_err();

        assert!(matches!(err, OwlError::Identifier(UuidError::EmptyName)));
    }

    #[test]
    fn longest_prefix_wins() {
        let rewriter = AxiomRewriter::with_prefixes(
            ns(),
            ["http://example.org/", "http://example.org/drug/"],
        );

        assert_eq!(
            rewriter.token_for("http://example.org/drug/42").unwrap(),
            Some(format!(":[{}]", id("42")))
        );
        assert_eq!(
            rewriter.token_for("http://example.org/other/42").unwrap(),
            Some(format!(":[{}]", id("other/42")))
        );
        assert_eq!(rewriter.token_for("http://elsewhere/42").unwrap(), None);
    }
}
