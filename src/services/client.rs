use crate::config::ConfigError;
use crate::models::credential::Credential;
use crate::models::error::ApiError;
use crate::models::query::QueryParams;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://stream-app-service.streampay.sa/api/v2";

const API_KEY_HEADER: &str = "x-api-key";
const BRANCH_HEADER: &str = "x-branch-id";
const CLIENT_USER_AGENT: &str = concat!("streampay-cli/", env!("CARGO_PKG_VERSION"));

/// Authenticated HTTP transport for the StreamPay API.
///
/// Every call is a single attempt. Any failure comes back as an [`ApiError`].
#[derive(Debug, Clone)]
pub struct StreamClient {
    client: Client,
    api_url: String,
}

impl StreamClient {
    pub fn new(credential: &Credential) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            header_value("API key", &credential.api_key_header())?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(branch) = credential.branch.as_deref().filter(|b| !b.is_empty()) {
            headers.insert(
                HeaderName::from_static(BRANCH_HEADER),
                header_value("branch", branch)?,
            );
        }

        let client = Client::builder().default_headers(headers).build()?;
        let api_url = credential
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Issue one request and return the decoded JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<&QueryParams>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.api_url, path);
        let mut request = self.client.request(method.clone(), &url);

        if let Some(query) = query {
            let pairs = query.pairs();
            if !pairs.is_empty() {
                request = request.query(&pairs);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "sending request");
        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "request failed without a response");
            ApiError::network(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::network)?;
        debug!(%method, path, status = status.as_u16(), "received response");

        if !status.is_success() {
            let err = ApiError::from_response(status, &bytes);
            warn!(
                %method,
                path,
                status = err.status_code,
                code = %err.code,
                "API returned an error"
            );
            return Err(err);
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::invalid_response(status, e))
    }

    pub async fn get(&self, path: &str, query: Option<&QueryParams>) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, query).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body), None).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body), None).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PATCH, path, Some(body), None).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None, None).await
    }
}

fn header_value(field: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidCredential(field))
}

/// Substitute `{...}` placeholders in `template` with `ids`, in order.
pub fn expand_path(template: &str, ids: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut ids = ids.iter();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        match ids.next() {
            Some(id) => out.push_str(id),
            None => out.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::error::{NETWORK_ERROR, VALIDATION_ERROR};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer, credential: Credential) -> StreamClient {
        let credential = Credential {
            base_url: Some(server.uri()),
            ..credential
        };
        StreamClient::new(&credential).unwrap()
    }

    #[test]
    fn expands_templates_in_order() {
        assert_eq!(
            expand_path("/subscriptions/{id}/freeze/{freeze_id}", &["sub_1", "frz_2"]),
            "/subscriptions/sub_1/freeze/frz_2"
        );
        assert_eq!(expand_path("/me", &[]), "/me");
        assert_eq!(expand_path("/consumers/{id}", &[]), "/consumers/{id}");
    }

    #[test]
    fn base_url_defaults_and_trims() {
        let client = StreamClient::new(&Credential::new("k")).unwrap();
        assert_eq!(client.api_url(), DEFAULT_BASE_URL);

        let credential = Credential {
            base_url: Some("http://localhost:8080/api/".to_string()),
            ..Credential::new("k")
        };
        assert_eq!(
            StreamClient::new(&credential).unwrap().api_url(),
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn rejects_credentials_that_are_not_header_safe() {
        let credential = Credential::new("bad\nkey");
        assert!(matches!(
            StreamClient::new(&credential),
            Err(ConfigError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn sends_auth_and_branch_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("x-api-key", "a2V5OnMzY3JldA=="))
            .and(header("x-branch-id", "riyadh"))
            .and(header("content-type", "application/json"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "u1"}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(
            &server,
            Credential {
                api_secret: Some("s3cret".to_string()),
                branch: Some("riyadh".to_string()),
                ..Credential::new("key")
            },
        );
        let me = client.get("/me", None).await.unwrap();
        assert_eq!(me["user"]["id"], "u1");
    }

    #[tokio::test]
    async fn omits_branch_header_when_unset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(|req: &Request| {
                let status = if req.headers.contains_key("x-branch-id") { 400 } else { 200 };
                ResponseTemplate::new(status).set_body_json(json!({}))
            })
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        assert!(client.get("/me", None).await.is_ok());
    }

    #[tokio::test]
    async fn posts_json_body_and_returns_it_unchanged() {
        let server = MockServer::start().await;
        let created = json!({"id": "c1", "name": "Sara", "tags": [1, 2]});
        Mock::given(method("POST"))
            .and(path("/consumers"))
            .and(body_json(json!({"name": "Sara"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        let result = client.post("/consumers", &json!({"name": "Sara"})).await.unwrap();
        assert_eq!(result, created);
    }

    #[tokio::test]
    async fn repeats_list_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments"))
            .respond_with(|req: &Request| {
                let statuses: Vec<String> = req
                    .url
                    .query_pairs()
                    .filter(|(k, _)| k == "statuses")
                    .map(|(_, v)| v.into_owned())
                    .collect();
                let has_page = req.url.query_pairs().any(|(k, _)| k == "page");
                ResponseTemplate::new(200)
                    .set_body_json(json!({"statuses": statuses, "has_page": has_page}))
            })
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        let query = QueryParams::new()
            .with("statuses", vec!["ACTIVE", "PAID"])
            .with("page", None::<u32>);
        let echoed = client.get("/payments", Some(&query)).await.unwrap();
        assert_eq!(echoed["statuses"], json!(["ACTIVE", "PAID"]));
        assert_eq!(echoed["has_page"], json!(false));
    }

    #[tokio::test]
    async fn scalar_query_parameters_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/consumers"))
            .and(query_param("search_term", "sara"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        let query = QueryParams::new().with("search_term", "sara").with("limit", 5u32);
        client.get("/consumers", Some(&query)).await.unwrap();
    }

    #[tokio::test]
    async fn normalizes_validation_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{"loc": ["body", "name"], "msg": "field required", "type": "missing"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        let err = client.post("/consumers", &json!({})).await.unwrap_err();
        assert_eq!(err.status_code, 422);
        assert_eq!(err.code, VALIDATION_ERROR);
        assert_eq!(err.message, "body → name: field required");
    }

    #[tokio::test]
    async fn normalizes_structured_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": {"code": "DUPLICATE_CONSUMER", "message": "already exists"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        let err = client.post("/consumers", &json!({"name": "x"})).await.unwrap_err();
        assert_eq!(err, ApiError::new(409, "DUPLICATE_CONSUMER", "already exists"));
    }

    #[tokio::test]
    async fn normalizes_unstructured_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        let err = client.get("/me", None).await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert_eq!(err.code, "HTTP_500");
        assert_eq!(err.message, "Request failed with status code 500");
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        // Bind an ephemeral port, then release it so nothing is listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let credential = Credential {
            base_url: Some(format!("http://127.0.0.1:{port}")),
            ..Credential::new("key")
        };
        let client = StreamClient::new(&credential).unwrap();
        let err = client.get("/me", None).await.unwrap_err();
        assert_eq!(err.status_code, 0);
        assert_eq!(err.code, NETWORK_ERROR);
        assert!(err.is_network());
        assert!(!err.message.is_empty());
    }

    #[tokio::test]
    async fn empty_success_body_decodes_to_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::new("key"));
        assert_eq!(client.delete("/coupons/c1").await.unwrap(), Value::Null);
    }
}
