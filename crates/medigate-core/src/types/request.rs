//! Request metadata inspected by the rate limiter and abuse detector.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Client-side metadata extracted from an inbound request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Client IP address.
    pub ip: IpAddr,
    /// `User-Agent` header value, if present.
    pub user_agent: Option<String>,
    /// Whether the request carried an `Accept` header.
    pub has_accept_header: bool,
}

impl RequestContext {
    /// Creates a context for a well-formed browser-like request.
    pub fn new(ip: IpAddr, user_agent: impl Into<String>) -> Self {
        Self {
            ip,
            user_agent: Some(user_agent.into()),
            has_accept_header: true,
        }
    }
}
