use crate::response::{decode_json, ensure_success, response_to_error};
use crate::transport::Transport;
use crate::{ClientError, Result};
use influxdb_core::{ClientConfig, Record, ResolvedConfig, Series, TimePrecision};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request, Response, Url};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;

/// Characters escaped in the `q` parameter: everything except RFC 3986 unreserved.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// InfluxDb REST API Client
///
/// Holds no mutable state; it is as safe to share across tasks as its
/// transport is.
#[derive(Clone)]
pub struct Client {
    config: ResolvedConfig,
    transport: Arc<dyn Transport>,
}

#[derive(Serialize)]
struct CreateDatabaseRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    name: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct UpdatePasswordRequest<'a> {
    password: &'a str,
}

#[derive(Serialize)]
struct UpdateUserRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin: Option<bool>,
}

impl Client {
    /// Create a client using a default `reqwest::Client` as transport
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, reqwest::Client::new())
    }

    /// Create a client that sends every request through `transport`
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        let config = config.resolve();
        tracing::debug!(?config, "InfluxDb client created");
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    // Database names, user names and credentials are concatenated as given.
    // A name containing '/', '?' or '#' produces a different URL; callers
    // depend on this so it is left unescaped. Names the URL parser would
    // rewrite (dot segments, '\', control characters) are refused in
    // `request`.
    fn url(&self, path: &str) -> String {
        self.url_with_credentials(path, self.config.username(), self.config.password())
    }

    fn url_with_credentials(&self, path: &str, username: &str, password: &str) -> String {
        format!(
            "{}{}?u={}&p={}",
            self.config.base_url(),
            path,
            username,
            password
        )
    }

    fn series_url(&self, precision: Option<TimePrecision>) -> String {
        let mut url = self.url(&format!("/db/{}/series", self.config.database()));
        if let Some(precision) = precision {
            url.push_str("&time_precision=");
            url.push_str(precision.as_str());
        }
        url
    }

    /// Parse `url` without letting the parser change which resource it names.
    ///
    /// Control characters are rejected (the parser drops them silently), and
    /// the parsed path must equal the built one up to percent-encoding, so
    /// `..`, `.` and `\` segments are refused instead of resolved.
    fn request(&self, method: Method, url: &str) -> Result<Request> {
        if url.chars().any(|c| c.is_ascii_control()) {
            return Err(ClientError::InvalidUrl(
                "control character in request URL".to_string(),
            ));
        }

        let parsed = Url::parse(url)?;
        let built = url
            .strip_prefix(self.config.base_url().as_str())
            .unwrap_or(url)
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        if decode_path(parsed.path()) != decode_path(built) {
            return Err(ClientError::InvalidUrl(format!(
                "path {:?} would be sent as {:?}",
                built,
                parsed.path()
            )));
        }

        Ok(Request::new(method, parsed))
    }

    fn json_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        payload: &T,
    ) -> Result<Request> {
        let data = serde_json::to_vec(payload)?;
        let mut request = self.request(method, url)?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(data.into());
        Ok(request)
    }

    async fn send(&self, request: Request) -> reqwest::Result<Response> {
        tracing::debug!(method = %request.method(), path = %request.url().path(), "Sending request");
        self.transport.send(request).await
    }

    async fn list(&self, url: &str) -> Result<Vec<Record>> {
        let request = self.request(Method::GET, url)?;
        let response = ensure_success(self.send(request).await).await?;
        decode_json(response).await
    }

    /// Create a database
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn create_database(&self, name: &str) -> Result<()> {
        let url = self.url("/db");
        let request = self.json_request(Method::POST, &url, &CreateDatabaseRequest { name })?;
        response_to_error(self.send(request).await).await
    }

    /// Delete a database
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete_database(&self, name: &str) -> Result<()> {
        let url = self.url(&format!("/db/{}", name));
        let request = self.request(Method::DELETE, &url)?;
        response_to_error(self.send(request).await).await
    }

    /// List databases
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_database_list(&self) -> Result<Vec<Record>> {
        self.list(&self.url("/db")).await
    }

    /// Create a cluster admin
    #[tracing::instrument(level = "debug", skip(self, password))]
    pub async fn create_cluster_admin(&self, name: &str, password: &str) -> Result<()> {
        let url = self.url("/cluster_admins");
        let request =
            self.json_request(Method::POST, &url, &CreateUserRequest { name, password })?;
        response_to_error(self.send(request).await).await
    }

    /// Change a cluster admin's password
    #[tracing::instrument(level = "debug", skip(self, password))]
    pub async fn update_cluster_admin(&self, name: &str, password: &str) -> Result<()> {
        let url = self.url(&format!("/cluster_admins/{}", name));
        let request = self.json_request(Method::POST, &url, &UpdatePasswordRequest { password })?;
        response_to_error(self.send(request).await).await
    }

    /// Delete a cluster admin
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete_cluster_admin(&self, name: &str) -> Result<()> {
        let url = self.url(&format!("/cluster_admins/{}", name));
        let request = self.request(Method::DELETE, &url)?;
        response_to_error(self.send(request).await).await
    }

    /// List cluster admins
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_cluster_admin_list(&self) -> Result<Vec<Record>> {
        self.list(&self.url("/cluster_admins")).await
    }

    /// Create a user scoped to `database`
    #[tracing::instrument(level = "debug", skip(self, password))]
    pub async fn create_database_user(
        &self,
        database: &str,
        name: &str,
        password: &str,
    ) -> Result<()> {
        let url = self.url(&format!("/db/{}/users", database));
        let request =
            self.json_request(Method::POST, &url, &CreateUserRequest { name, password })?;
        response_to_error(self.send(request).await).await
    }

    /// Change a database user's password
    pub async fn update_database_user(
        &self,
        database: &str,
        name: &str,
        password: &str,
    ) -> Result<()> {
        self.update_database_user_with(database, name, Some(password), None)
            .await
    }

    /// Grant or revoke database admin rights for a user
    pub async fn alter_database_privilege(
        &self,
        database: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<()> {
        self.update_database_user_with(database, name, None, Some(is_admin))
            .await
    }

    /// Partially update a database user. Only the supplied fields are sent;
    /// with neither, the payload is `{}`.
    #[tracing::instrument(level = "debug", skip(self, password))]
    pub async fn update_database_user_with(
        &self,
        database: &str,
        name: &str,
        password: Option<&str>,
        admin: Option<bool>,
    ) -> Result<()> {
        let url = self.url(&format!("/db/{}/users/{}", database, name));
        let request = self.json_request(Method::POST, &url, &UpdateUserRequest { password, admin })?;
        response_to_error(self.send(request).await).await
    }

    /// Delete a database user
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete_database_user(&self, database: &str, name: &str) -> Result<()> {
        let url = self.url(&format!("/db/{}/users/{}", database, name));
        let request = self.request(Method::DELETE, &url)?;
        response_to_error(self.send(request).await).await
    }

    /// List the users of `database`
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_database_user_list(&self, database: &str) -> Result<Vec<Record>> {
        self.list(&self.url(&format!("/db/{}/users", database)))
            .await
    }

    /// Write series to the configured database with server-default precision
    pub async fn write_series(&self, series: &[Series]) -> Result<()> {
        self.write_series_common(series, None).await
    }

    /// Write series with timestamps in the given precision
    pub async fn write_series_with_time_precision(
        &self,
        series: &[Series],
        precision: TimePrecision,
    ) -> Result<()> {
        self.write_series_common(series, Some(precision)).await
    }

    #[tracing::instrument(level = "debug", skip(self, series), fields(count = series.len()))]
    async fn write_series_common(
        &self,
        series: &[Series],
        precision: Option<TimePrecision>,
    ) -> Result<()> {
        let url = self.series_url(precision);
        let request = self.json_request(Method::POST, &url, series)?;
        response_to_error(self.send(request).await).await
    }

    /// Run a query against the configured database
    pub async fn query(&self, query: &str) -> Result<Vec<Series>> {
        self.query_common(query, None).await
    }

    /// Run a query, asking for timestamps in the given precision
    pub async fn query_with_time_precision(
        &self,
        query: &str,
        precision: TimePrecision,
    ) -> Result<Vec<Series>> {
        self.query_common(query, Some(precision)).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_common(
        &self,
        query: &str,
        precision: Option<TimePrecision>,
    ) -> Result<Vec<Series>> {
        let mut url = self.series_url(precision);
        url.push_str("&q=");
        url.extend(utf8_percent_encode(query, QUERY_VALUE));

        let request = self.request(Method::GET, &url)?;
        let response = ensure_success(self.send(request).await).await?;
        decode_json(response).await
    }

    /// Health check
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn ping(&self) -> Result<()> {
        let request = self.request(Method::GET, &self.url("/ping"))?;
        response_to_error(self.send(request).await).await
    }

    /// Check credentials of a database user other than the client's own
    #[tracing::instrument(level = "debug", skip(self, password))]
    pub async fn authenticate_database_user(
        &self,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let url = self.url_with_credentials(
            &format!("/db/{}/authenticate", database),
            username,
            password,
        );
        let request = self.request(Method::GET, &url)?;
        response_to_error(self.send(request).await).await
    }
}

fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: ClientConfig) -> Client {
        Client::new(config)
    }

    #[test]
    fn test_url_embeds_credentials() {
        let client = client(ClientConfig::default());
        assert_eq!(
            client.url("/db"),
            "http://localhost:8086/db?u=root&p=root"
        );
    }

    #[test]
    fn test_url_with_explicit_credentials() {
        let client = client(ClientConfig {
            is_secure: true,
            ..Default::default()
        });
        assert_eq!(
            client.url_with_credentials("/db/foo/authenticate", "bob", "pw"),
            "https://localhost:8086/db/foo/authenticate?u=bob&p=pw"
        );
    }

    #[test]
    fn test_series_url_precision() {
        let client = client(ClientConfig {
            database: "foo".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.series_url(None),
            "http://localhost:8086/db/foo/series?u=root&p=root"
        );
        assert_eq!(
            client.series_url(Some(TimePrecision::Microsecond)),
            "http://localhost:8086/db/foo/series?u=root&p=root&time_precision=u"
        );
    }

    #[test]
    fn test_query_value_encoding() {
        let encoded: String = utf8_percent_encode("a b=c", QUERY_VALUE).collect();
        assert_eq!(encoded, "a%20b%3Dc");

        let encoded: String =
            utf8_percent_encode("select * from cpu_load.m-1~", QUERY_VALUE).collect();
        assert_eq!(encoded, "select%20%2A%20from%20cpu_load.m-1~");
    }

    #[test]
    fn test_path_segments_are_not_escaped() {
        let client = client(ClientConfig::default());
        let url = client.url(&format!("/db/{}/users", "a b"));
        assert_eq!(url, "http://localhost:8086/db/a b/users?u=root&p=root");
    }

    #[test]
    fn test_update_payload_omits_absent_fields() {
        let only_password = UpdateUserRequest {
            password: Some("pw"),
            admin: None,
        };
        let only_admin = UpdateUserRequest {
            password: None,
            admin: Some(true),
        };
        let neither = UpdateUserRequest {
            password: None,
            admin: None,
        };

        assert_eq!(serde_json::to_string(&only_password).unwrap(), r#"{"password":"pw"}"#);
        assert_eq!(serde_json::to_string(&only_admin).unwrap(), r#"{"admin":true}"#);
        assert_eq!(serde_json::to_string(&neither).unwrap(), "{}");
    }

    #[test]
    fn test_invalid_host_is_reported_before_sending() {
        let client = client(ClientConfig {
            host: "bad host:port".to_string(),
            ..Default::default()
        });
        let err = client.request(Method::GET, &client.url("/ping")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_request_refuses_rewritten_paths() {
        let client = client(ClientConfig::default());
        for name in ["..", ".", "a\\b", "%2e%2e", "a/../b"] {
            let url = client.url(&format!("/db/{}", name));
            let err = client.request(Method::DELETE, &url).unwrap_err();
            assert!(
                matches!(err, ClientError::InvalidUrl(_)),
                "{:?} should be refused",
                name
            );
        }
    }

    #[test]
    fn test_request_refuses_control_characters() {
        let client = client(ClientConfig {
            password: "pw\t".to_string(),
            ..Default::default()
        });
        let err = client.request(Method::GET, &client.url("/ping")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_request_allows_encoding_differences() {
        let client = client(ClientConfig::default());
        let request = client
            .request(Method::GET, &client.url("/db/a b/users"))
            .unwrap();
        assert_eq!(request.url().path(), "/db/a%20b/users");
    }
}
