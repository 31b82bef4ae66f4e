use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

/// Tenant key derived from the request host: lower-cased, port stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteKey(String);

impl SiteKey {
    pub fn from_host(host: &str) -> Self {
        let host = host.trim();
        let name = if let Some(rest) = host.strip_prefix('[') {
            // IPv6 literal, keep the brackets.
            match rest.find(']') {
                Some(end) => &host[..end + 2],
                None => host,
            }
        } else {
            host.split(':').next().unwrap_or(host)
        };
        Self(name.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for SiteKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_host(req.connection_info().host())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_port_and_case() {
        assert_eq!(SiteKey::from_host("Shop.Example:8080").as_str(), "shop.example");
        assert_eq!(SiteKey::from_host("shop.example").as_str(), "shop.example");
    }

    #[test]
    fn keeps_ipv6_literals() {
        assert_eq!(SiteKey::from_host("[::1]:8080").as_str(), "[::1]");
        assert_eq!(SiteKey::from_host("[::1]").as_str(), "[::1]");
    }
}
