use super::RemoteStore;
use crate::config::RemoteConfig;
use crate::entity::Entity;
use crate::error::{Result, TurnoverError};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use tracing::debug;

/// Columns requested on select; `id` only drives ordering.
const SELECT_COLUMNS: &str = "id,name,company,mailbox,status,lastAction,active";

/// Consultant table served by a PostgREST endpoint (`<url>/rest/v1/<table>`).
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    table: String,
}

impl RestStore {
    pub fn new(cfg: &RemoteConfig) -> Result<Self> {
        if !cfg.is_configured() {
            return Err(TurnoverError::Config(
                "remote url and anon key are both required".into(),
            ));
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: cfg.url.trim().trim_end_matches('/').to_string(),
            anon_key: cfg.anon_key.trim().to_string(),
            table: cfg.table.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.endpoint())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(TurnoverError::RemoteStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select_all(&self, order_by: &str) -> Result<Vec<Entity>> {
        let order = format!("{order_by}.asc");
        let resp = self
            .request(Method::GET)
            .query(&[("select", SELECT_COLUMNS), ("order", order.as_str())])
            .send()
            .await?;
        let rows: Vec<Entity> = check(resp).await?.json().await?;
        debug!(table = %self.table, rows = rows.len(), "remote select");
        Ok(rows)
    }

    async fn delete_all(&self) -> Result<()> {
        let resp = self
            .request(Method::DELETE)
            .query(&[("id", "neq.-1")])
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn insert_many(&self, rows: &[Entity]) -> Result<()> {
        let resp = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;
        check(resp).await?;
        debug!(table = %self.table, rows = rows.len(), "remote insert");
        Ok(())
    }
}
