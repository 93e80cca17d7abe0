use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};
use url::Url;

use super::error::ApiError;
use super::types::{Employee, Envelope};

/// Operations the page controllers need from the backend.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    /// `GET /employees/all`
    async fn list(&self) -> Result<Envelope<Vec<Employee>>, ApiError>;

    /// `GET /employees/get/{id}`
    async fn get(&self, id: i64) -> Result<Envelope<Employee>, ApiError>;

    /// `POST /employees/create`. The success body is not specified, an empty
    /// body decodes to `Value::Null`.
    async fn create(&self, employee: &Employee) -> Result<Envelope<serde_json::Value>, ApiError>;

    /// `DELETE /employees/delete/{id}`
    async fn delete(&self, id: i64) -> Result<Envelope<Employee>, ApiError>;
}

/// HTTP implementation of [`EmployeeApi`].
///
/// Cheap to clone. Sends and accepts JSON and keeps a cookie store so
/// session credentials are forwarded on every call.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    base_url: Url,
    http: Client,
}

impl RestClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        // Url::join replaces the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        debug!("REST client for {base}");
        Ok(Self {
            inner: Arc::new(RestClientInner {
                base_url: base,
                http,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<(u16, String), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!("Response {status}, {} bytes", body.len());
        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), &body));
        }
        Ok((status.as_u16(), body))
    }

    fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<Envelope<T>, ApiError> {
        let data = serde_json::from_str(body)?;
        Ok(Envelope { data, status })
    }
}

#[async_trait]
impl EmployeeApi for RestClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Envelope<Vec<Employee>>, ApiError> {
        let url = self.endpoint("employees/all")?;
        let (status, body) = self.send(self.inner.http.get(url)).await?;
        Self::decode(status, &body)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Envelope<Employee>, ApiError> {
        let url = self.endpoint(&format!("employees/get/{id}"))?;
        let (status, body) = self.send(self.inner.http.get(url)).await?;
        Self::decode(status, &body)
    }

    #[instrument(skip(self, employee), fields(surname = %employee.surname))]
    async fn create(&self, employee: &Employee) -> Result<Envelope<serde_json::Value>, ApiError> {
        let url = self.endpoint("employees/create")?;
        let (status, body) = self.send(self.inner.http.post(url).json(employee)).await?;
        if body.trim().is_empty() {
            return Ok(Envelope {
                data: serde_json::Value::Null,
                status,
            });
        }
        Self::decode(status, &body)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<Envelope<Employee>, ApiError> {
        let url = self.endpoint(&format!("employees/delete/{id}"))?;
        let (status, body) = self.send(self.inner.http.delete(url)).await?;
        Self::decode(status, &body)
    }
}
