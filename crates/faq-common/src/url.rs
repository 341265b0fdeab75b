/// Page URL handling for query-parameter state.
///
/// URLs are split with the RFC 3986 appendix B expression. Only absolute URLs
/// (with a scheme) are accepted. Query pairs keep their order; reading a pair
/// percent-decodes it, writing re-encodes every pair.
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::CommonError;

static URL_RE: OnceLock<Regex> = OnceLock::new();

fn url_re() -> &'static Regex {
    URL_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):(//[^/?#]*)?([^?#]*)(?:\?([^#]*))?(#.*)?$")
            .expect("valid regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    scheme: String,
    authority: Option<String>,
    path: String,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl PageUrl {
    pub fn parse(href: &str) -> Result<Self, CommonError> {
        let href = href.trim();
        if href.chars().any(char::is_whitespace) {
            return Err(CommonError::Url(href.to_string()));
        }
        let caps = url_re()
            .captures(href)
            .ok_or_else(|| CommonError::Url(href.to_string()))?;

        Ok(Self {
            scheme: caps[1].to_ascii_lowercase(),
            authority: caps.get(2).map(|m| m.as_str().to_string()),
            path: caps[3].to_string(),
            query: caps.get(4).map(|m| parse_query(m.as_str())).unwrap_or_default(),
            fragment: caps.get(5).map(|m| m.as_str().to_string()),
        })
    }

    /// First value of `name`, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the first `name` pair in place and drops the others; appends when absent.
    pub fn set_query_param(&mut self, name: &str, value: &str) {
        let mut replaced = false;
        self.query.retain_mut(|(k, v)| {
            if k.as_str() != name {
                return true;
            }
            if replaced {
                return false;
            }
            *v = value.to_string();
            replaced = true;
            true
        });
        if !replaced {
            self.query.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_query_param(&mut self, name: &str) {
        self.query.retain(|(k, _)| k.as_str() != name);
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(authority) = &self.authority {
            f.write_str(authority)?;
        }
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            write!(f, "?{}", pairs.join("&"))?;
        }
        if let Some(fragment) = &self.fragment {
            f.write_str(fragment)?;
        }
        Ok(())
    }
}

/// Reads one query parameter from `href`, treating a malformed URL as "absent".
pub fn read_query_param(href: &str, name: &str) -> Option<String> {
    let url = PageUrl::parse(href)
        .inspect_err(|e| debug!(error = %e, "ignoring unparsable page url"))
        .ok()?;
    url.query_param(name).map(str::to_string)
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_decoded_param() {
        let url = PageUrl::parse("https://example.com/faq?device=smart%20tv&x=1#top").unwrap();
        assert_eq!(url.query_param("device"), Some("smart tv"));
        assert_eq!(url.query_param("x"), Some("1"));
        assert_eq!(url.query_param("missing"), None);
    }

    #[test]
    fn plus_decodes_to_space() {
        let url = PageUrl::parse("https://example.com/?device=smart+tv").unwrap();
        assert_eq!(url.query_param("device"), Some("smart tv"));
    }

    #[test]
    fn set_then_remove_restores_bare_url() {
        let mut url = PageUrl::parse("https://example.com/faq#top").unwrap();
        url.set_query_param("device", "laptops");
        assert_eq!(url.to_string(), "https://example.com/faq?device=laptops#top");
        url.remove_query_param("device");
        assert_eq!(url.to_string(), "https://example.com/faq#top");
    }

    #[test]
    fn set_keeps_other_params_in_order() {
        let mut url = PageUrl::parse("https://example.com/?a=1&device=x&b=2&device=y").unwrap();
        url.set_query_param("device", "phones");
        assert_eq!(url.to_string(), "https://example.com/?a=1&device=phones&b=2");
    }

    #[test]
    fn file_urls_parse() {
        let url = PageUrl::parse("file:///faq/index.html?device=tablets").unwrap();
        assert_eq!(url.query_param("device"), Some("tablets"));
        assert_eq!(url.to_string(), "file:///faq/index.html?device=tablets");
    }

    #[test]
    fn malformed_urls_read_as_absent() {
        assert!(PageUrl::parse("not a url").is_err());
        assert!(PageUrl::parse("/relative?device=phones").is_err());
        assert_eq!(read_query_param("::::", "device"), None);
        assert_eq!(
            read_query_param("https://example.com/?device=Phones", "device").as_deref(),
            Some("Phones")
        );
    }

    #[test]
    fn written_values_are_encoded() {
        let mut url = PageUrl::parse("https://example.com/").unwrap();
        url.set_query_param("device", "smart tv & more");
        let written = url.to_string();
        assert_eq!(written, "https://example.com/?device=smart%20tv%20%26%20more");
        let reread = PageUrl::parse(&written).unwrap();
        assert_eq!(reread.query_param("device"), Some("smart tv & more"));
    }
}
