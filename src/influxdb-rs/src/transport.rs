use reqwest::{Request, Response};

/// Transport sends one HTTP request and returns the raw response.
///
/// Connection handling, TLS and timeouts belong to the implementation. The
/// client never retries, so whatever the transport returns is final.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> reqwest::Result<Response>;
}

#[async_trait::async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, request: Request) -> reqwest::Result<Response> {
        self.execute(request).await
    }
}
