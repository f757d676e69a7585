use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EntityId, EntityKind},
    error::ApiError,
    protocol::{
        ActionResponse, BulkDeleteResponse, DetailPayload, IdListBody, ImportResponse, ListPayload,
    },
};
use tracing::{info, warn};
use url::Url;

use crate::{
    error::ClientError,
    rows::{decode_rows, ListRow},
    settings::Settings,
};

pub mod controller;
pub mod error;
pub mod notifications;
pub mod resource;
pub mod rows;
pub mod session;
pub mod settings;
pub mod validation;
pub mod view;
pub mod wizard;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The backend's per-entity REST surface.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list(&self, kind: EntityKind) -> Result<Vec<serde_json::Value>, ClientError>;
    async fn detail(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<serde_json::Value, ClientError>;
    async fn create(
        &self,
        kind: EntityKind,
        body: serde_json::Value,
    ) -> Result<ActionResponse, ClientError>;
    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        body: serde_json::Value,
    ) -> Result<ActionResponse, ClientError>;
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<ActionResponse, ClientError>;
    async fn bulk_delete(
        &self,
        kind: EntityKind,
        ids: Vec<EntityId>,
    ) -> Result<BulkDeleteResponse, ClientError>;
    /// Spreadsheet bytes. An empty id list exports everything.
    async fn export(&self, kind: EntityKind, ids: Vec<EntityId>) -> Result<Vec<u8>, ClientError>;
    async fn import(
        &self,
        kind: EntityKind,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<ImportResponse, ClientError>;
}

pub struct HttpAdminApi {
    http: Client,
    base_url: Url,
    import_timeout: Duration,
}

impl HttpAdminApi {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let base_url = settings.api_base()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = settings
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ClientError::Settings("api token contains invalid header characters".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url,
            import_timeout: settings.import_timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, kind: EntityKind, suffix: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            kind.list_path(),
            suffix
        )
    }
}

/// Sends the request and decodes a JSON body. Non-2xx statuses become
/// [`ClientError::Status`] carrying whatever error body the server sent. An
/// empty 2xx body (`204 No Content`) decodes as `{}`.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let bytes = send_bytes(request).await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

async fn send_bytes(request: RequestBuilder) -> Result<Vec<u8>, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let body = serde_json::from_slice::<ApiError>(&bytes).unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(bytes.to_vec())
}

fn accepted(response: ActionResponse) -> Result<ActionResponse, ClientError> {
    if response.success {
        Ok(response)
    } else {
        Err(ClientError::Rejected {
            message: response.message,
        })
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn list(&self, kind: EntityKind) -> Result<Vec<serde_json::Value>, ClientError> {
        let url = self.endpoint(kind, "");
        let payload: ListPayload<serde_json::Value> = send_json(self.http.get(&url))
            .await
            .inspect_err(|err| warn!(%kind, %url, "list request failed: {err}"))?;
        let items = payload.into_items();
        info!(%kind, count = items.len(), "fetched list");
        Ok(items)
    }

    async fn detail(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(kind, &format!("/{id}"));
        let payload: DetailPayload = send_json(self.http.get(&url)).await?;
        Ok(payload.into_value())
    }

    async fn create(
        &self,
        kind: EntityKind,
        body: serde_json::Value,
    ) -> Result<ActionResponse, ClientError> {
        let url = self.endpoint(kind, "");
        let response = accepted(send_json(self.http.post(&url).json(&body)).await?)?;
        info!(%kind, "created record");
        Ok(response)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        body: serde_json::Value,
    ) -> Result<ActionResponse, ClientError> {
        let url = self.endpoint(kind, &format!("/{id}"));
        let response = accepted(send_json(self.http.put(&url).json(&body)).await?)?;
        info!(%kind, %id, "updated record");
        Ok(response)
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<ActionResponse, ClientError> {
        let url = self.endpoint(kind, &format!("/{id}"));
        let response = accepted(send_json(self.http.delete(&url)).await?)?;
        info!(%kind, %id, "deleted record");
        Ok(response)
    }

    async fn bulk_delete(
        &self,
        kind: EntityKind,
        ids: Vec<EntityId>,
    ) -> Result<BulkDeleteResponse, ClientError> {
        let url = self.endpoint(kind, "/bulk-delete");
        let count = ids.len();
        let body = IdListBody::bulk_delete(kind, ids);
        let response: BulkDeleteResponse = send_json(self.http.post(&url).json(&body)).await?;
        if !response.success {
            return Err(ClientError::Rejected {
                message: response.message,
            });
        }
        info!(
            %kind,
            requested = count,
            failed = response.failed_ids.len(),
            "bulk delete acknowledged"
        );
        Ok(response)
    }

    async fn export(&self, kind: EntityKind, ids: Vec<EntityId>) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(kind, "/export");
        let body = IdListBody::export(kind, ids);
        let bytes = send_bytes(self.http.post(&url).json(&body)).await?;
        info!(%kind, bytes = bytes.len(), "export downloaded");
        Ok(bytes)
    }

    async fn import(
        &self,
        kind: EntityKind,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<ImportResponse, ClientError> {
        let url = self.endpoint(kind, "/import");
        let part = Part::bytes(bytes).file_name(file_name).mime_str(XLSX_MIME)?;
        let form = Form::new().part("file", part);
        let response: ImportResponse = send_json(
            self.http
                .post(&url)
                .multipart(form)
                .timeout(self.import_timeout),
        )
        .await?;
        if !response.success {
            return Err(ClientError::Rejected {
                message: response.message,
            });
        }
        info!(
            %kind,
            total = response.summary.total,
            successful = response.summary.successful,
            failed = response.summary.failed,
            duplicates = response.summary.duplicates,
            "import finished"
        );
        Ok(response)
    }
}

/// Fetches one kind's list and normalizes it into display rows.
pub async fn fetch_rows<R: ListRow>(api: &dyn AdminApi) -> Result<Vec<R>, ClientError> {
    let values = api.list(R::KIND).await?;
    decode_rows(values)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
