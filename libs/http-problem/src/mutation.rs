//! Deferred field mutations, applied in order during [`Problem`]
//! construction or [`Problem::append`].

use http::StatusCode;
use serde_json::Value;

use crate::problem::Problem;

/// Boxed error type accepted as a wrapped cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single deferred change to a [`Problem`].
///
/// Mutations apply left-to-right; a later mutation targeting the same
/// member overwrites an earlier one. [`Mutation::Noop`] applies nothing and
/// can be used where a mutation is required but no change is wanted.
#[derive(Debug)]
#[must_use]
pub enum Mutation {
    /// Set the `type` member to a problem type URI.
    Type(String),
    /// Set the `title` member.
    Title(String),
    /// Set the `status` member.
    Status(StatusCode),
    /// Set the `detail` member.
    Detail(String),
    /// Set the `instance` member.
    Instance(String),
    /// Set an extension (or well-known) member to any JSON value.
    Ext(String, Value),
    /// Attach an underlying cause, kept out of the serialized document.
    Wrap(BoxError),
    /// Attach an underlying cause and expose its text as the `cause`
    /// member. Only for causes whose message is safe to show to clients.
    WrapPublic(BoxError),
    /// Apply no change.
    Noop,
}

impl Mutation {
    pub(crate) fn apply(self, problem: &mut Problem) {
        match self {
            Self::Type(uri) => problem.insert("type", uri),
            Self::Title(text) => problem.insert("title", text),
            Self::Status(code) => problem.insert("status", code.as_u16()),
            Self::Detail(text) => problem.insert("detail", text),
            Self::Instance(uri) => problem.insert("instance", uri),
            Self::Ext(key, value) => problem.insert(key, value),
            Self::Wrap(cause) => problem.set_cause(cause),
            Self::WrapPublic(cause) => {
                problem.insert("cause", cause.to_string());
                problem.set_cause(cause);
            }
            Self::Noop => {}
        }
    }
}

/// Set the `type` member to a problem type URI.
pub fn type_uri(uri: impl Into<String>) -> Mutation {
    Mutation::Type(uri.into())
}

/// Set the `title` member.
pub fn title(text: impl Into<String>) -> Mutation {
    Mutation::Title(text.into())
}

/// Set the `status` member.
pub fn status(code: StatusCode) -> Mutation {
    Mutation::Status(code)
}

/// Set the `detail` member.
pub fn detail(text: impl Into<String>) -> Mutation {
    Mutation::Detail(text.into())
}

/// Set the `instance` member to a URI identifying this occurrence.
pub fn instance(uri: impl Into<String>) -> Mutation {
    Mutation::Instance(uri.into())
}

/// Set an extension (or well-known) member to any JSON-compatible value.
pub fn ext(key: impl Into<String>, value: impl Into<Value>) -> Mutation {
    Mutation::Ext(key.into(), value.into())
}

/// Attach an underlying cause without exposing it in the document.
pub fn wrap(cause: impl Into<BoxError>) -> Mutation {
    Mutation::Wrap(cause.into())
}

/// Attach an underlying cause and expose its text as the `cause` member.
pub fn wrap_public(cause: impl Into<BoxError>) -> Mutation {
    Mutation::WrapPublic(cause.into())
}
