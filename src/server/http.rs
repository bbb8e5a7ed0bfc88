// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Request and response values exchanged with the route handlers.
//!
//! `tiny_http` owns the wire protocol; this module turns its requests into
//! plain `Request` values (decoded path, query map, capped body) and turns
//! `Response` values back into `tiny_http` responses with CORS headers.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use serde::Serialize;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Decoded path without the query string
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    /// Split `target` into path and query
    pub fn new(method: &str, target: &str, body: Vec<u8>) -> Self {
        let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method: method.to_ascii_uppercase(),
            path: percent_decode(raw_path),
            query: parse_query(raw_query),
            body,
        }
    }

    /// Read method, target and body from a `tiny_http` request. Bodies over
    /// `MAX_BODY_BYTES` are refused without being read to the end.
    pub fn read_from(raw: &mut tiny_http::Request) -> Result<Self, Response> {
        if raw.body_length().is_some_and(|len| len > MAX_BODY_BYTES) {
            return Err(Response::error(413, "request body too large"));
        }
        let mut body = Vec::new();
        raw.as_reader()
            .take(MAX_BODY_BYTES as u64 + 1)
            .read_to_end(&mut body)
            .map_err(|e| Response::error(400, &format!("failed to read body: {}", e)))?;
        if body.len() > MAX_BODY_BYTES {
            return Err(Response::error(413, "request body too large"));
        }
        Ok(Self::new(&raw.method().to_string(), raw.url(), body))
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `%XX` escapes and `+` as space; invalid escapes are kept verbatim
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi * 16 + lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse `a=1&b=two`; later duplicates win
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (percent_decode(k), percent_decode(v)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

/// A response produced by a route handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    /// JSON body with the given status
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => Self::error(500, &e.to_string()),
        }
    }

    /// `{"success": false, "error": message}`
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "success": false, "error": message }).to_string();
        Self {
            status,
            content_type: "application/json",
            body: body.into_bytes(),
        }
    }

    pub fn bytes(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    /// Empty reply to a CORS preflight
    pub fn preflight() -> Self {
        Self {
            status: 204,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }

    /// Header pairs sent with this response
    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        let mut headers = vec![("Content-Type", self.content_type)];
        headers.extend_from_slice(&CORS_HEADERS);
        headers
    }

    /// Convert for `tiny_http::Request::respond`
    pub fn into_http(self) -> tiny_http::Response<Cursor<Vec<u8>>> {
        let headers = self.headers();
        let mut response = tiny_http::Response::from_data(self.body).with_status_code(self.status);
        for (name, value) in headers {
            if let Ok(header) = tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                response.add_header(header);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("smooth%20jazz"), "smooth jazz");
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
    }

    #[test]
    fn test_parse_query() {
        let q = parse_query("genre=reggaeton&bars=8&neural");
        assert_eq!(q.get("genre").map(String::as_str), Some("reggaeton"));
        assert_eq!(q.get("bars").map(String::as_str), Some("8"));
        assert_eq!(q.get("neural").map(String::as_str), Some(""));
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn test_request_splits_target() {
        let req = Request::new("get", "/api/search?q=smooth%20jazz", Vec::new());
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/api/search");
        assert_eq!(req.query_param("q"), Some("smooth jazz"));
    }

    #[test]
    fn test_error_body_and_headers() {
        let response = Response::error(404, "genre not found: x");
        assert_eq!(response.body, br#"{"success":false,"error":"genre not found: x"}"#);
        let headers = response.headers();
        assert!(headers.contains(&("Access-Control-Allow-Origin", "*")));
        assert!(headers.contains(&("Content-Type", "application/json")));
    }
}
