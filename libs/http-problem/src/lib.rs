//! RFC 9457 Problem Details for HTTP APIs
//!
//! A [`Problem`] is an open, string-keyed mapping of JSON values: the
//! well-known members (`type`, `title`, `status`, `detail`, `instance`)
//! and caller-defined extension members live side by side. Values are
//! built from ordered [`Mutation`]s, serialize to
//! `application/problem+json`, write themselves onto an HTTP response, and
//! behave as ordinary Rust errors — including wrapping an underlying cause
//! that stays out of the client-visible document unless explicitly exposed.
//!
//! ```
//! use http::StatusCode;
//! use http_problem::{Problem, detail, ext, status, title};
//!
//! let mut problem = Problem::new([
//!     status(StatusCode::FORBIDDEN),
//!     title("Forbidden"),
//!     detail("Account balance too low"),
//!     ext("balance", 30),
//! ]);
//! problem.set("accounts", vec!["/account/12345", "/account/67890"]);
//!
//! let response = problem.to_response();
//! assert_eq!(response.status(), StatusCode::FORBIDDEN);
//! ```
//!
//! There is no internal locking: share a `Problem` freely for reading, but
//! mutation of an already-shared value needs external synchronization.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod emit;
pub mod mutation;
pub mod problem;

pub use catalog::ProblemDef;
pub use emit::ResponseSink;
pub use mutation::{
    BoxError, Mutation, detail, ext, instance, status, title, type_uri, wrap, wrap_public,
};
pub use problem::{APPLICATION_PROBLEM_JSON, ParseError, Problem};
