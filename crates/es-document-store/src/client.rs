use reqwest::blocking::Client;
use serde_json::Value;
use shared_types::DocumentKind;

use crate::errors::StoreError;

/// One document bound for a `_bulk` request: which kind, optional explicit
/// id, and body.
pub struct BulkItem {
    pub kind: DocumentKind,
    pub id: Option<String>,
    pub body: Value,
}

/// A client for the external Elasticsearch-compatible document store.
///
/// Stateless apart from its URL list and index name, so it is safe to
/// construct once and invoke from a single thread repeatedly — exactly how
/// the ingestion pipeline's consumer thread uses it. No operation retries
/// and no HTTP timeout is applied beyond the connect/read timeouts baked
/// into the underlying client, matching the no-retry, no-dead-letter policy
/// the rest of the pipeline follows.
pub struct DocumentStoreClient {
    http: Client,
    base_urls: Vec<String>,
    index_name: String,
}

impl DocumentStoreClient {
    pub fn new(base_urls: Vec<String>, index_name: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("reqwest blocking client construction");
        Self {
            http,
            base_urls,
            index_name: index_name.into(),
        }
    }

    fn index_path(&self, suffix: &str) -> String {
        format!("/{}{}", self.index_name, suffix)
    }

    /// Tries each configured base URL in order, returning the first
    /// successful response. Returns the last transport error if every URL
    /// fails to connect.
    fn dispatch(&self, build: impl Fn(&Client, &str) -> reqwest::blocking::RequestBuilder) -> Result<reqwest::blocking::Response, StoreError> {
        let mut last_err = None;
        for base in &self.base_urls {
            let request = build(&self.http, base);
            match request.send() {
                Ok(response) => return Ok(response),
                Err(e) => last_err = Some(e),
            }
        }
        Err(StoreError::Connection(
            last_err.map(|e| e.to_string()).unwrap_or_else(|| "no base URLs configured".to_string()),
        ))
    }

    fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(StoreError::ResponseCode {
            status: status.as_u16(),
            body,
        })
    }

    /// `PUT /<index>` with the mapping resource as the body. The mapping is
    /// treated as opaque: this client never inspects its contents.
    pub fn create_index(&self, mappings: &Value) -> Result<(), StoreError> {
        let path = format!("/{}", self.index_name);
        let response = self.dispatch(|client, base| client.put(format!("{base}{path}")).json(mappings))?;
        Self::check_status(response)?;
        Ok(())
    }

    /// `DELETE /<index>`. A 404 is treated as success (absence is the goal).
    pub fn delete_index(&self) -> Result<(), StoreError> {
        let path = format!("/{}", self.index_name);
        let response = self.dispatch(|client, base| client.delete(format!("{base}{path}")))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(response)?;
        Ok(())
    }

    /// `POST /<index>/<kind>[/<id>]`.
    pub fn index(&self, kind: DocumentKind, body: &Value, id: Option<&str>) -> Result<(), StoreError> {
        let path = match id {
            Some(id) => self.index_path(&format!("/{}/{}", kind.as_str(), id)),
            None => self.index_path(&format!("/{}", kind.as_str())),
        };
        let response = self.dispatch(|client, base| client.post(format!("{base}{path}")).json(body))?;
        Self::check_status(response)?;
        Ok(())
    }

    /// `GET /<index>/<kind>/_count`.
    pub fn count(&self, kind: DocumentKind, query: Option<&Value>) -> Result<u64, StoreError> {
        let path = self.index_path(&format!("/{}/_count", kind.as_str()));
        let response = self.dispatch(|client, base| {
            let builder = client.get(format!("{base}{path}"));
            match query {
                Some(q) => builder.json(q),
                None => builder,
            }
        })?;
        let response = Self::check_status(response)?;
        let body: Value = response.json().map_err(|e| StoreError::Decode(e.to_string()))?;
        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| StoreError::Decode("missing 'count' field in response".to_string()))
    }

    /// `POST /<index>/<kind>/_search`.
    pub fn search(&self, kind: DocumentKind, query: &Value) -> Result<Value, StoreError> {
        let path = self.index_path(&format!("/{}/_search", kind.as_str()));
        let response = self.dispatch(|client, base| client.post(format!("{base}{path}")).json(query))?;
        let response = Self::check_status(response)?;
        response.json().map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// `POST /<index>/<kind>/_update_by_query` with a query selecting the
    /// target documents and a script describing the field update (used by
    /// the irreversible-block processor to flip `irreversible`).
    pub fn update_by_query(&self, kind: DocumentKind, query: &Value, script: &Value) -> Result<(), StoreError> {
        let path = self.index_path(&format!("/{}/_update_by_query", kind.as_str()));
        let body = serde_json::json!({ "query": query, "script": script });
        let response = self.dispatch(|client, base| client.post(format!("{base}{path}")).json(&body))?;
        Self::check_status(response)?;
        Ok(())
    }

    /// `POST /_bulk` with newline-delimited JSON action/body pairs. Reports
    /// the count of per-item failures as a [`StoreError::BulkFail`] rather
    /// than silently accepting partial success.
    pub fn bulk(&self, batch: &[BulkItem]) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut payload = String::new();
        for item in batch {
            let action = match &item.id {
                Some(id) => serde_json::json!({"index": {"_index": self.index_name, "_type": item.kind.as_str(), "_id": id}}),
                None => serde_json::json!({"index": {"_index": self.index_name, "_type": item.kind.as_str()}}),
            };
            payload.push_str(&action.to_string());
            payload.push('\n');
            payload.push_str(&item.body.to_string());
            payload.push('\n');
        }

        let response = self.dispatch(|client, base| {
            client
                .post(format!("{base}/_bulk"))
                .header("Content-Type", "application/x-ndjson")
                .body(payload.clone())
        })?;
        let response = Self::check_status(response)?;
        let body: Value = response.json().map_err(|e| StoreError::Decode(e.to_string()))?;

        let failed_items = body
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        item.values()
                            .next()
                            .and_then(|v| v.get("error"))
                            .is_some()
                    })
                    .count()
            })
            .unwrap_or(0);

        if failed_items > 0 {
            return Err(StoreError::BulkFail {
                failed_items,
                total_items: batch.len(),
            });
        }
        Ok(())
    }
}
