use std::time::Duration;

use serde::Deserialize;

use super::{NetworkError, PAGE_SIZE, ResultItem, SearchPage};

/// Public Pixabay API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://pixabay.com/api/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Anything that can answer a keyword/page query.
pub trait SearchClient {
    /// Fetch one page (1-indexed) of results for `keyword`.
    ///
    /// # Errors
    /// Returns [`NetworkError`] on transport failure, a non-success status,
    /// or a payload that cannot be decoded.
    fn search(&self, keyword: &str, page: u32) -> Result<SearchPage, NetworkError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    total_hits: u32,
    #[serde(default)]
    hits: Vec<ApiHit>,
}

#[derive(Debug, Deserialize)]
struct ApiHit {
    #[serde(rename = "webformatURL")]
    webformat_url: String,
    #[serde(rename = "largeImageURL")]
    large_image_url: String,
    #[serde(default)]
    tags: String,
}

impl From<ApiHit> for ResultItem {
    fn from(hit: ApiHit) -> Self {
        Self {
            image_url: hit.large_image_url,
            thumbnail_url: hit.webformat_url,
            tags: hit.tags,
        }
    }
}

/// Decode a search endpoint response body.
///
/// # Errors
/// Returns [`NetworkError::Malformed`] if the body is not the expected JSON.
pub fn parse_response(body: &str) -> Result<SearchPage, NetworkError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|err| NetworkError::Malformed(err.to_string()))?;
    Ok(SearchPage {
        total_hits: response.total_hits,
        items: response.hits.into_iter().map(ResultItem::from).collect(),
    })
}

/// Blocking client for the Pixabay search API.
#[derive(Debug, Clone)]
pub struct PixabayClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl PixabayClient {
    /// Build a client for `endpoint` authenticated with `api_key`.
    ///
    /// # Errors
    /// Returns [`NetworkError::Transport`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self, NetworkError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pixgrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| NetworkError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn query_params(&self, keyword: &str, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.api_key.clone()),
            ("q", keyword.to_string()),
            ("page", page.to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("image_type", "photo".to_string()),
        ]
    }
}

impl SearchClient for PixabayClient {
    fn search(&self, keyword: &str, page: u32) -> Result<SearchPage, NetworkError> {
        tracing::debug!(keyword, page, endpoint = %self.endpoint, "search request");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.query_params(keyword, page))
            .send()
            .map_err(|err| NetworkError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .map_err(|err| NetworkError::Transport(err.to_string()))?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_maps_hit_fields() {
        let body = r#"{
            "total": 4692,
            "totalHits": 500,
            "hits": [{
                "id": 195893,
                "tags": "blossom, bloom, flower",
                "webformatURL": "https://pixabay.com/get/small.jpg",
                "largeImageURL": "https://pixabay.com/get/large.jpg",
                "likes": 7
            }]
        }"#;
        let page = parse_response(body).unwrap();
        assert_eq!(page.total_hits, 500);
        assert_eq!(
            page.items,
            vec![ResultItem {
                image_url: "https://pixabay.com/get/large.jpg".to_string(),
                thumbnail_url: "https://pixabay.com/get/small.jpg".to_string(),
                tags: "blossom, bloom, flower".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_response_accepts_missing_hits() {
        let page = parse_response(r#"{"totalHits": 0}"#).unwrap();
        assert_eq!(page.total_hits, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        let err = parse_response("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, NetworkError::Malformed(_)));
    }

    #[test]
    fn test_parse_response_rejects_hit_without_urls() {
        let err = parse_response(r#"{"totalHits": 1, "hits": [{"tags": "cat"}]}"#).unwrap_err();
        assert!(matches!(err, NetworkError::Malformed(_)));
    }

    #[test]
    fn test_query_params_request_fixed_page_size() {
        let client = PixabayClient::new("secret", DEFAULT_ENDPOINT).unwrap();
        let params = client.query_params("red fox", 3);
        assert!(params.contains(&("q", "red fox".to_string())));
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("per_page", "12".to_string())));
        assert!(params.contains(&("key", "secret".to_string())));
    }
}
