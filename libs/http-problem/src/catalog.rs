//! Static definitions for recurring problem types.

use http::StatusCode;

use crate::mutation;
use crate::problem::Problem;

/// Static definition of a recurring problem type.
///
/// Suited to `const` catalogs of an API's documented problems; each
/// occurrence gets its own detail text via [`ProblemDef::to_problem`].
#[derive(Debug, Clone, Copy)]
pub struct ProblemDef {
    pub status: u16,
    pub title: &'static str,
    pub type_uri: &'static str,
}

impl ProblemDef {
    /// Convert this definition into a [`Problem`] with the given detail.
    /// Stored codes outside the valid status range fall back to 500.
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Problem::new([
            mutation::status(status),
            mutation::title(self.title),
            mutation::type_uri(self.type_uri),
            mutation::detail(detail),
        ])
    }
}
