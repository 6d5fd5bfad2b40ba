//! HTTP request and response described as plain data.
//!
//! # Design
//! An `HttpRequest` is fully built, validated and encoded before anything
//! touches the network; the cancellation token is bound only when the request
//! is dispatched through `Requester::send`. Building is therefore the single
//! place a malformed target can surface, and it does so as
//! `RequestError::InvalidUrl`.

use bytes::Bytes;
use reqwest::Method;
use url::{form_urlencoded, Url};

use crate::error::RequestError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A validated outbound request. Immutable once handed to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A body-less request to `target`.
    pub fn new(method: Method, target: &str) -> Result<Self, RequestError> {
        let url = Url::parse(target).map_err(|e| RequestError::InvalidUrl {
            url: target.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RequestError::InvalidUrl {
                url: target.to_string(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        Ok(Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        })
    }

    /// POST `values` to `target` as `application/x-www-form-urlencoded`.
    pub fn form_post<K, V>(target: &str, values: &[(K, V)]) -> Result<Self, RequestError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::new(Method::POST, target)?;
        request
            .headers
            .push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
        request.body = Some(encode_form(values));
        Ok(request)
    }
}

/// Encode key/value pairs the way an HTML form would, in the given order.
pub fn encode_form<K, V>(values: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in values {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}

/// A response read to completion.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}
