//! RFC 9457 Problem Details as an open, map-backed value (no HTTP framework
//! dependencies).

use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::mutation::{self, BoxError, Mutation};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details for HTTP APIs.
///
/// A `Problem` is a string-keyed mapping of JSON values. The well-known
/// members (`type`, `title`, `status`, `detail`, `instance`) and any
/// extension members live in the same mapping, so the member set stays open
/// without changes to this type. An optional underlying cause can be
/// attached via [`mutation::wrap`]; it participates in standard error-chain
/// walking but is kept out of the serialized document unless explicitly
/// exposed with [`mutation::wrap_public`].
///
/// The value carries no internal synchronization. Sharing a `Problem`
/// between threads for reading is fine; mutating one that is already shared
/// is the caller's responsibility to serialize.
#[derive(Debug, Default)]
#[must_use]
pub struct Problem {
    fields: Map<String, Value>,
    cause: Option<BoxError>,
}

/// Failure decoding a problem document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input was not valid JSON.
    #[error("malformed problem document: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The input was valid JSON but not an object.
    #[error("problem document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl Problem {
    /// Create a `Problem` by applying `mutations` in order to an empty
    /// field mapping. A later mutation targeting the same member overwrites
    /// an earlier one.
    pub fn new(mutations: impl IntoIterator<Item = Mutation>) -> Self {
        let mut problem = Self::default();
        problem.append(mutations);
        problem
    }

    /// Create a `Problem` carrying `status` and the canonical reason phrase
    /// for it as `title`. Codes without a canonical phrase get an empty
    /// title.
    pub fn from_status(code: StatusCode) -> Self {
        Self::new([
            mutation::status(code),
            mutation::title(code.canonical_reason().unwrap_or_default()),
        ])
    }

    /// Apply further mutations in order, returning the same instance for
    /// chaining.
    pub fn append(&mut self, mutations: impl IntoIterator<Item = Mutation>) -> &mut Self {
        for mutation in mutations {
            mutation.apply(self);
        }
        self
    }

    /// Set a single member. Shorthand for `append([ext(key, value)])`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.append([mutation::ext(key, value)])
    }

    /// Look up a member by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// An independent copy of the field mapping. Mutating the returned map
    /// never affects this instance.
    #[must_use]
    pub fn fields(&self) -> Map<String, Value> {
        self.fields.clone()
    }

    /// The `status` member as an HTTP status code, when it holds an integer
    /// in the valid range. Non-integer or out-of-range values read as
    /// `None`.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        let code = self.fields.get("status")?.as_u64()?;
        u16::try_from(code)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
    }

    /// The wrapped cause, if one was attached.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Walk the cause chain looking for an error equal to `target`.
    #[must_use]
    pub fn is_caused_by<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + 'static,
    {
        let mut current: Option<&(dyn StdError + 'static)> =
            self.cause.as_ref().map(|e| &**e as &(dyn StdError + 'static));
        while let Some(err) = current {
            if err.downcast_ref::<E>().is_some_and(|found| found == target) {
                return true;
            }
            current = err.source();
        }
        false
    }

    /// Serialize the field mapping to JSON bytes.
    ///
    /// Encoding failures are swallowed and degrade to an empty byte
    /// sequence. The mapping only ever holds `serde_json::Value`, so the
    /// failure branch is unreachable in practice; this is a compatibility
    /// trade-off, not a guarantee.
    #[must_use]
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// [`to_json`](Self::to_json) as a `String`.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        String::from_utf8(self.to_json()).unwrap_or_default()
    }

    /// Decode a problem document into a fresh instance.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] for invalid JSON and
    /// [`ParseError::NotAnObject`] for a document that is valid JSON but
    /// not an object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut problem = Self::default();
        problem.replace_from_json(bytes)?;
        Ok(problem)
    }

    /// Clear all existing members, then decode `bytes` into the field
    /// mapping. The attached cause, if any, is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] for invalid JSON and
    /// [`ParseError::NotAnObject`] for a document that is valid JSON but
    /// not an object. On failure the instance is left with an empty field
    /// mapping.
    pub fn replace_from_json(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        self.fields.clear();
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(fields) => {
                self.fields = fields;
                Ok(())
            }
            other => Err(ParseError::NotAnObject(json_kind(&other))),
        }
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub(crate) fn set_cause(&mut self, cause: BoxError) {
        self.cause = Some(cause);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl StdError for Problem {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(|e| &**e as &(dyn StdError + 'static))
    }
}

impl Serialize for Problem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Problem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::deserialize(deserializer)?;
        Ok(Self {
            fields,
            cause: None,
        })
    }
}

/// OpenAPI schema for the problem document: typed well-known members plus
/// free-form extension members.
#[cfg(feature = "utoipa")]
impl utoipa::PartialSchema for Problem {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{AdditionalProperties, ObjectBuilder, SchemaType, Type};

        let string = || ObjectBuilder::new().schema_type(SchemaType::Type(Type::String));
        ObjectBuilder::new()
            .schema_type(SchemaType::Type(Type::Object))
            .description(Some("RFC 9457 Problem Details for HTTP APIs"))
            .property("type", string())
            .property("title", string())
            .property(
                "status",
                ObjectBuilder::new().schema_type(SchemaType::Type(Type::Integer)),
            )
            .property("detail", string())
            .property("instance", string())
            .property("cause", string())
            .additional_properties(Some(AdditionalProperties::FreeForm(true)))
            .into()
    }
}

#[cfg(feature = "utoipa")]
impl utoipa::ToSchema for Problem {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("Problem")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::mutation::{detail, ext, status, title, wrap, wrap_public};

    #[derive(Debug, PartialEq)]
    struct TestError(&'static str);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl StdError for TestError {}

    #[test]
    fn last_mutation_wins() {
        let mut problem = Problem::new([title("a"), title("b")]);
        assert_eq!(problem.get("title"), Some(&Value::from("b")));

        problem.append([title("c")]);
        assert_eq!(problem.get("title"), Some(&Value::from("c")));
    }

    #[test]
    fn from_status_fills_status_and_reason_phrase() {
        let problem = Problem::from_status(StatusCode::NOT_FOUND);
        assert_eq!(problem.get("status"), Some(&Value::from(404)));
        assert_eq!(problem.get("title"), Some(&Value::from("Not Found")));
    }

    #[test]
    fn from_status_without_reason_phrase_has_empty_title() {
        let code = StatusCode::from_u16(599).unwrap();
        let problem = Problem::from_status(code);
        assert_eq!(problem.get("status"), Some(&Value::from(599)));
        assert_eq!(problem.get("title"), Some(&Value::from("")));
    }

    #[test]
    fn fields_returns_an_independent_copy() {
        let problem = Problem::new([title("original")]);
        let mut copy = problem.fields();
        copy.insert("title".to_owned(), Value::from("mutated"));
        copy.insert("extra".to_owned(), Value::from(1));

        assert_eq!(problem.get("title"), Some(&Value::from("original")));
        assert_eq!(problem.get("extra"), None);
    }

    #[test]
    fn set_chains_and_accepts_extension_values() {
        let mut problem = Problem::new([]);
        problem.set("balance", 30).set("accounts", vec!["/a", "/b"]);

        assert_eq!(problem.get("balance"), Some(&Value::from(30)));
        assert_eq!(
            problem.get("accounts"),
            Some(&Value::from(vec!["/a", "/b"]))
        );
    }

    #[test]
    fn empty_problem_serializes_to_empty_object() {
        let problem = Problem::default();
        assert_eq!(problem.to_json_string(), "{}");
        assert!(problem.fields().is_empty());
        assert_eq!(problem.get("anything"), None);
    }

    #[test]
    fn absent_problem_serializes_to_null() {
        let json = serde_json::to_string(&None::<Problem>).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn json_round_trip_reproduces_fields() {
        let original = Problem::new([
            status(StatusCode::FORBIDDEN),
            title("Forbidden"),
            detail("Account balance too low"),
            ext("balance", 30),
        ]);

        let decoded = Problem::from_json(&original.to_json()).unwrap();
        assert_eq!(decoded.fields(), original.fields());
    }

    #[test]
    fn status_code_ignores_non_integer_values() {
        let problem = Problem::new([ext("status", "404")]);
        assert_eq!(problem.status_code(), None);

        let problem = Problem::new([ext("status", 1000)]);
        assert_eq!(problem.status_code(), None);

        let problem = Problem::new([ext("status", 404)]);
        assert_eq!(problem.status_code(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn wrap_keeps_cause_private() {
        let problem = Problem::new([wrap(TestError("db down"))]);

        assert_eq!(problem.get("cause"), None);
        let source = problem.source().unwrap();
        assert_eq!(source.downcast_ref::<TestError>().unwrap().0, "db down");
    }

    #[test]
    fn wrap_public_exposes_cause_text() {
        let problem = Problem::new([wrap_public(TestError("db down"))]);

        assert_eq!(problem.get("cause"), Some(&Value::from("db down")));
        assert!(problem.source().is_some());
    }

    #[test]
    fn is_caused_by_walks_the_chain() {
        let problem = Problem::new([wrap(TestError("root"))]);

        assert!(problem.is_caused_by(&TestError("root")));
        assert!(!problem.is_caused_by(&TestError("other")));
        assert!(!Problem::default().is_caused_by(&TestError("root")));
    }

    #[test]
    fn display_is_the_json_form() {
        let problem = Problem::new([title("Boom")]);
        assert_eq!(problem.to_string(), r#"{"title":"Boom"}"#);
    }

    #[test]
    fn replace_from_json_clears_before_decoding() {
        let mut problem = Problem::new([title("old"), ext("balance", 30)]);
        problem
            .replace_from_json(br#"{"title":"new"}"#)
            .unwrap();

        assert_eq!(problem.get("title"), Some(&Value::from("new")));
        assert_eq!(problem.get("balance"), None);
    }

    #[test]
    fn replace_from_json_failure_leaves_fields_cleared() {
        let mut problem = Problem::new([title("old")]);

        let err = problem.replace_from_json(b"{not json").unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
        assert!(problem.fields().is_empty());

        problem.replace_from_json(br#"{"title":"recovered"}"#).unwrap();
        assert_eq!(problem.get("title"), Some(&Value::from("recovered")));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let err = Problem::from_json(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject("an array")));

        let err = Problem::from_json(b"null").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject("null")));
    }

    #[test]
    fn deserialization_never_populates_the_cause() {
        let problem = Problem::from_json(br#"{"cause":"wire text"}"#).unwrap();
        assert_eq!(problem.get("cause"), Some(&Value::from("wire text")));
        assert!(problem.source().is_none());
    }
}
