use thiserror::Error;

/// Errors from [`crate::RouteProvider::request_route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The request was malformed, e.g. fewer than two points.
    #[error("invalid route request: {message}")]
    InvalidInput {
        /// What was wrong with the request.
        message: String,
    },
    /// The engine did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL, without credentials.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The engine answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Requested URL, without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the engine or the client.
        message: String,
    },
    /// The connection failed before a response arrived.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Requested URL, without credentials.
        url: String,
        /// Transport error detail.
        message: String,
    },
    /// The engine answered but found no path between the points.
    #[error("routing engine returned no paths")]
    NoPaths,
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error detail.
        message: String,
    },
}

impl RouteError {
    /// Whether retrying the same request later might succeed.
    ///
    /// Timeouts, transport failures, rate limiting (429) and server errors
    /// (5xx) are transient.
    ///
    /// # Examples
    /// ```
    /// use waymark_core::RouteError;
    ///
    /// let limited = RouteError::HttpError {
    ///     url: "http://localhost:8989/route".to_owned(),
    ///     status: 429,
    ///     message: "slow down".to_owned(),
    /// };
    /// assert!(limited.is_transient());
    /// assert!(!RouteError::NoPaths.is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkError { .. } => true,
            Self::HttpError { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidInput { .. } | Self::NoPaths | Self::ParseError { .. } => false,
        }
    }

    /// Whether the engine definitively rejected the points.
    ///
    /// True for [`RouteError::NoPaths`] and the 400, 404 and 422 statuses the
    /// engine uses for unroutable points. Other client errors such as 401 or
    /// 403 describe the deployment rather than the points and may clear up.
    #[must_use]
    pub const fn is_permanent_rejection(&self) -> bool {
        match self {
            Self::NoPaths => true,
            Self::HttpError { status, .. } => matches!(*status, 400 | 404 | 422),
            Self::InvalidInput { .. }
            | Self::Timeout { .. }
            | Self::NetworkError { .. }
            | Self::ParseError { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn http(status: u16) -> RouteError {
        RouteError::HttpError {
            url: "http://localhost:8989/route".to_owned(),
            status,
            message: String::new(),
        }
    }

    #[rstest]
    #[case(http(429), true, false)]
    #[case(http(503), true, false)]
    #[case(http(400), false, true)]
    #[case(http(404), false, true)]
    #[case(http(422), false, true)]
    #[case(http(401), false, false)]
    #[case(http(403), false, false)]
    #[case(RouteError::NoPaths, false, true)]
    #[case(RouteError::Timeout { url: String::new(), timeout_secs: 20 }, true, false)]
    #[case(RouteError::ParseError { message: String::new() }, false, false)]
    fn classifies_failures(
        #[case] error: RouteError,
        #[case] transient: bool,
        #[case] permanent: bool,
    ) {
        assert_eq!(error.is_transient(), transient);
        assert_eq!(error.is_permanent_rejection(), permanent);
    }
}
