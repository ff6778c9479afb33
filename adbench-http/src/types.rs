use super::{Error, Result};

/// A pre-validated request target. Parsed once and reused for every request of a run.
#[derive(Debug, Clone)]
pub struct Target {
    url: String,
    uri: hyper::Uri,
}

impl Target {
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::UnsupportedScheme(url.to_string()));
        }
        if parsed.host_str().is_none() {
            return Err(Error::InvalidUrl(url.to_string()));
        }

        let uri: hyper::Uri = parsed
            .as_str()
            .parse()
            .map_err(|_| Error::InvalidUrl(url.to_string()))?;

        Ok(Self {
            url: parsed.into(),
            uri,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub(crate) fn uri(&self) -> &hyper::Uri {
        &self.uri
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Number of body bytes drained from the connection.
    pub body_len: u64,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_http_target_with_query() {
        let t = Target::parse("http://127.0.0.1:8080/ad?id=ad1").unwrap();
        assert_eq!(t.as_str(), "http://127.0.0.1:8080/ad?id=ad1");
        assert_eq!(t.uri().path(), "/ad");
        assert_eq!(t.uri().query(), Some("id=ad1"));
    }

    #[test]
    fn rejects_non_http_schemes() {
        let err = Target::parse("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Target::parse("not a url").unwrap_err(),
            Error::InvalidUrl(_)
        ));
    }
}
