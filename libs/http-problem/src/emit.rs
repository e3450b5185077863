//! Writing problems as HTTP responses.

use std::io;

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Response, StatusCode};

use crate::problem::{APPLICATION_PROBLEM_JSON, Problem};

/// Minimal response surface a [`Problem`] is written to.
///
/// Implemented for [`http::Response<Vec<u8>>`]; adapters for other response
/// writers only need these three operations. Both write paths on
/// [`Problem`] set the status at most once per call; repeated-call behavior
/// is whatever the sink does on a second status write.
pub trait ResponseSink {
    /// Set a response header, replacing any previous value.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Write the status line.
    fn set_status(&mut self, code: StatusCode);

    /// Append body bytes, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    fn write_body(&mut self, body: &[u8]) -> io::Result<usize>;
}

impl ResponseSink for Response<Vec<u8>> {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    fn set_status(&mut self, code: StatusCode) {
        *self.status_mut() = code;
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<usize> {
        self.body_mut().extend_from_slice(body);
        Ok(body.len())
    }
}

impl Problem {
    /// Set the problem content type on `sink`, and the status line when the
    /// `status` member holds a usable code. Writes no body.
    pub fn write_header_to<S: ResponseSink>(&self, sink: &mut S) {
        sink.set_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_PROBLEM_JSON));
        if let Some(code) = self.status_code() {
            sink.set_status(code);
        }
    }

    /// Write the full response: problem content type, status from the
    /// `status` member (500 when absent), and the JSON document as body.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the sink's body write, alongside however
    /// many bytes the sink reported written.
    pub fn write_to<S: ResponseSink>(&self, sink: &mut S) -> io::Result<usize> {
        self.write_with_fallback(sink, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Like [`write_to`](Self::write_to), with a caller-supplied status for
    /// problems whose `status` member is absent or unusable.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the sink's body write.
    pub fn write_with_fallback<S: ResponseSink>(
        &self,
        sink: &mut S,
        fallback: StatusCode,
    ) -> io::Result<usize> {
        sink.set_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_PROBLEM_JSON));
        sink.set_status(self.status_code().unwrap_or(fallback));
        sink.write_body(&self.to_json())
    }

    /// Build a complete [`http::Response`] for this problem.
    #[must_use]
    pub fn to_response(&self) -> Response<Vec<u8>> {
        let mut response = Response::new(Vec::new());
        // a Vec-backed sink cannot fail
        self.write_to(&mut response).unwrap_or_default();
        response
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        let code = self.status_code().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::debug!(status = code.as_u16(), "rendering problem response");

        let mut response = (code, self.to_json()).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        response
    }
}


#[cfg(all(test, feature = "axum"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod axum_tests {
    use axum::response::IntoResponse;

    use super::*;
    use crate::mutation::status;

    #[test]
    fn into_response_carries_status_and_content_type() {
        let response = Problem::new([status(StatusCode::UNPROCESSABLE_ENTITY)]).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some(APPLICATION_PROBLEM_JSON)
        );
    }

    #[test]
    fn into_response_defaults_to_500() {
        let response = Problem::default().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
