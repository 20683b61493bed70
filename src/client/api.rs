//! REST client

use super::tokens::TokenStore;
use super::{API_URL_ENV, ClientError, DEFAULT_API_URL};
use crate::core::{Entity, PaginatedResponse};
use crate::scope::ScopeView;
use crate::stats::{BoqStats, InvoiceSummary};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest `limit` the server honours
pub const MAX_PAGE_SIZE: usize = 100;

/// Query string for list, export and dashboard calls
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// JSON object, already encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl ListQuery {
    pub fn for_user(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn invoice(mut self, invoice_id: Uuid) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    pub fn page(mut self, page: usize, limit: usize) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Exact-match filter keyed by wire field name, e.g. `{"status": "Paid"}`
    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter.to_string());
        self
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

/// Client for the `/api` routes
///
/// Every request carries the current token from [`TokenStore`], when there
/// is one.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|_| ClientError::InvalidUrl(base_url.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            tokens: Arc::new(TokenStore::new()),
        })
    }

    /// Base URL from `SITELEDGER_API_URL`, else `http://localhost:3000`
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(&base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        match self.tokens.current() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let (code, message) = match response.json::<ApiErrorBody>().await {
            Ok(body) => (body.code, body.message),
            Err(_) => (
                "HTTP_ERROR".to_string(),
                status.canonical_reason().unwrap_or("request failed").to_string(),
            ),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn send_json<R: DeserializeOwned>(builder: RequestBuilder) -> Result<R, ClientError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn list<T: Entity>(
        &self,
        query: &ListQuery,
    ) -> Result<PaginatedResponse<T>, ClientError> {
        Self::send_json(self.request(Method::GET, T::resource_name()).query(query)).await
    }

    /// Every page of a list query, `MAX_PAGE_SIZE` records at a time
    pub async fn list_all<T: Entity>(&self, query: ListQuery) -> Result<Vec<T>, ClientError> {
        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let query = query.clone().page(page, MAX_PAGE_SIZE);
            let response = self.list::<T>(&query).await?;
            records.extend(response.data);
            if !response.pagination.has_next {
                return Ok(records);
            }
            page += 1;
        }
    }

    pub async fn get<T: Entity>(&self, id: Uuid) -> Result<T, ClientError> {
        let path = format!("{}/{}", T::resource_name(), id);
        Self::send_json(self.request(Method::GET, &path)).await
    }

    /// Single record with the named references embedded
    pub async fn get_with_includes<T: Entity>(
        &self,
        id: Uuid,
        includes: &[&str],
    ) -> Result<Value, ClientError> {
        let path = format!("{}/{}", T::resource_name(), id);
        let include = includes.join(",");
        Self::send_json(self.request(Method::GET, &path).query(&[("include", include)])).await
    }

    pub async fn create<T: Entity, B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::send_json(self.request(Method::POST, T::resource_name()).json(body)).await
    }

    pub async fn update<T: Entity, B: Serialize + ?Sized>(
        &self,
        id: Uuid,
        body: &B,
    ) -> Result<T, ClientError> {
        let path = format!("{}/{}", T::resource_name(), id);
        Self::send_json(self.request(Method::PUT, &path).json(body)).await
    }

    pub async fn delete<T: Entity>(&self, id: Uuid) -> Result<(), ClientError> {
        let path = format!("{}/{}", T::resource_name(), id);
        Self::check(self.request(Method::DELETE, &path).send().await?).await?;
        Ok(())
    }

    pub async fn export_csv<T: Entity>(&self, query: &ListQuery) -> Result<String, ClientError> {
        let path = format!("{}/export.csv", T::resource_name());
        let response = self.request(Method::GET, &path).query(query).send().await?;
        let response = Self::check(response).await?;
        Ok(response.text().await?)
    }

    pub async fn boq_stats(&self, user_id: Option<Uuid>) -> Result<BoqStats, ClientError> {
        let query = ListQuery::default().for_user(user_id);
        Self::send_json(self.request(Method::GET, "boqs/stats").query(&query)).await
    }

    pub async fn invoice_summary(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<InvoiceSummary, ClientError> {
        let query = ListQuery::default().for_user(user_id);
        Self::send_json(self.request(Method::GET, "invoices/summary").query(&query)).await
    }

    pub async fn scope(&self, user_id: Option<Uuid>) -> Result<ScopeView, ClientError> {
        let query = ListQuery::default().for_user(user_id);
        Self::send_json(self.request(Method::GET, "scope").query(&query)).await
    }
}
