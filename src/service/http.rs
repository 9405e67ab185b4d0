//! REST binding for the floor and table collaborator.
//!
//! Thin `reqwest` wrapper over the POS backend's `/floors` and `/tables`
//! routes. Response decoding lives in pure functions for testability.

use std::time::Duration;

use canvas::doc::{Floor, FloorId, Table, TableId, TableLayoutUpdate};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{FloorService, TableService, TenantId};
use crate::config::ServiceConfig;
use crate::error::ServiceError;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpFloorService {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpFloorService {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::HttpClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ServiceError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), api_token: config.api_token.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(method = method.as_str(), url = url.as_str(), "dispatching request");
        let builder = self.http.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the body of a successful response.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, ServiceError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ServiceError::from_response(status.as_u16(), &text));
        }
        Ok(text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let text = self.send(self.request(Method::GET, path)).await?;
        parse_body(&text)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let text = self.send(self.request(method, path).json(body)).await?;
        parse_body(&text)
    }

    async fn delete(&self, path: &str) -> Result<(), ServiceError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct FloorBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct NewTableBody<'a> {
    name: &'a str,
    floor_id: FloorId,
}

// =============================================================================
// TRAIT IMPLS
// =============================================================================

#[async_trait::async_trait]
impl FloorService for HttpFloorService {
    async fn list_floors(&self, tenant: TenantId) -> Result<Vec<Floor>, ServiceError> {
        self.get(&format!("/floors?tenant_id={tenant}")).await
    }

    async fn create_floor(&self, name: &str) -> Result<Floor, ServiceError> {
        self.send_json(Method::POST, "/floors", &FloorBody { name }).await
    }

    async fn rename_floor(&self, id: FloorId, name: &str) -> Result<Floor, ServiceError> {
        self.send_json(Method::PUT, &format!("/floors/{id}"), &FloorBody { name }).await
    }

    async fn delete_floor(&self, id: FloorId) -> Result<(), ServiceError> {
        self.delete(&format!("/floors/{id}")).await
    }
}

#[async_trait::async_trait]
impl TableService for HttpFloorService {
    async fn list_tables_with_status(&self, tenant: TenantId) -> Result<Vec<Table>, ServiceError> {
        self.get(&format!("/tables/with-status?tenant_id={tenant}")).await
    }

    async fn create_table(&self, name: &str, floor_id: FloorId) -> Result<Table, ServiceError> {
        self.send_json(Method::POST, "/tables", &NewTableBody { name, floor_id }).await
    }

    async fn update_table_layout(&self, id: TableId, update: &TableLayoutUpdate) -> Result<Table, ServiceError> {
        self.send_json(Method::PUT, &format!("/tables/{id}/layout"), update).await
    }

    async fn delete_table(&self, id: TableId) -> Result<(), ServiceError> {
        self.delete(&format!("/tables/{id}")).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_body<T: DeserializeOwned>(json: &str) -> Result<T, ServiceError> {
    serde_json::from_str(json).map_err(|e| ServiceError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
