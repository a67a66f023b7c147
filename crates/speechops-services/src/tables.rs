//! Table-store client
//!
//! Raw REST client for the storage account's table endpoint, authenticated
//! with a shared-access signature appended to every request URL. Entities
//! are schema-free JSON property bags; the mapper in `entity` decides what
//! of them reaches the wire.
//!
//! Paging is resumable: the store's two continuation headers are folded
//! into a single opaque token handed to the browser client, and unfolded
//! again when the next page is requested.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{UpstreamError, UpstreamResult};

const STORAGE_API_VERSION: &str = "2019-02-02";
const ACCEPT_NO_METADATA: &str = "application/json;odata=nometadata";

/// One page of entities plus the token that resumes the listing, if the
/// store reported more rows.
#[derive(Debug, Clone)]
pub struct EntityPage {
    pub entities: Vec<Map<String, Value>>,
    pub continuation_token: Option<String>,
}

/// The store's paired continuation headers, folded into one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Continuation {
    next_partition_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_row_key: Option<String>,
}

fn encode_continuation(continuation: &Continuation) -> String {
    let bytes = serde_json::to_vec(continuation).expect("continuation serializes");
    URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_continuation(token: &str) -> UpstreamResult<Continuation> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| UpstreamError::InvalidContinuation)?;
    serde_json::from_slice(&bytes).map_err(|_| UpstreamError::InvalidContinuation)
}

/// Doubles single quotes per the store's key grammar, then percent-encodes
/// the result for use inside a URL path.
fn escape_key(key: &str) -> String {
    urlencoding::encode(&key.replace('\'', "''")).into_owned()
}

fn entity_resource(table: &str, partition_key: &str, row_key: &str) -> String {
    format!(
        "{}(PartitionKey='{}',RowKey='{}')",
        table,
        escape_key(partition_key),
        escape_key(row_key)
    )
}

#[derive(Debug, Deserialize)]
struct TableName {
    #[serde(rename = "TableName")]
    table_name: String,
}

#[derive(Debug, Deserialize)]
struct TableList {
    #[serde(default)]
    value: Vec<TableName>,
}

#[derive(Debug, Deserialize)]
struct EntityList {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

/// Client for the storage account's table service.
#[derive(Clone)]
pub struct TableClient {
    http_client: Client,
    account_url: String,
    sas_token: String,
}

impl TableClient {
    pub fn new(http_client: Client, account_url: impl Into<String>, sas_token: impl Into<String>) -> Self {
        Self {
            http_client,
            account_url: account_url.into().trim_end_matches('/').to_string(),
            sas_token: sas_token.into().trim_start_matches('?').to_string(),
        }
    }

    /// Builds the request URL: resource path, then the SAS query, then any
    /// operation-specific parameters (already encoded).
    fn url(&self, resource: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}", self.account_url, resource);
        let mut separator = '?';
        if !self.sas_token.is_empty() {
            url.push(separator);
            url.push_str(&self.sas_token);
            separator = '&';
        }
        for (name, value) in query {
            url.push(separator);
            separator = '&';
            url.push_str(name);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header(header::ACCEPT, ACCEPT_NO_METADATA)
    }

    /// List every table in the account, draining the store's table
    /// continuation internally.
    pub async fn list_tables(&self) -> UpstreamResult<Vec<String>> {
        let mut names = Vec::new();
        let mut next_table: Option<String> = None;
        loop {
            let mut query = Vec::new();
            if let Some(next) = &next_table {
                query.push(("NextTableName", urlencoding::encode(next).into_owned()));
            }
            let response = self
                .request(Method::GET, self.url("Tables", &query))
                .send()
                .await?;
            let response = check_status("list tables", response).await?;
            next_table = header_value(&response, "x-ms-continuation-NextTableName");
            let page: TableList = read_json(response).await?;
            names.extend(page.value.into_iter().map(|table| table.table_name));
            if next_table.is_none() {
                return Ok(names);
            }
        }
    }

    /// Create a table. Creating a table that already exists is a success.
    pub async fn create_table(&self, table: &str) -> UpstreamResult<()> {
        let response = self
            .request(Method::POST, self.url("Tables", &[]))
            .header("Prefer", "return-no-content")
            .json(&json!({ "TableName": table }))
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        check_status("create table", response).await?;
        Ok(())
    }

    /// Delete a table. A missing table is reported as `NotFound`.
    pub async fn delete_table(&self, table: &str) -> UpstreamResult<()> {
        let resource = format!("Tables('{}')", escape_key(table));
        let response = self
            .request(Method::DELETE, self.url(&resource, &[]))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(format!("Table '{}' not found", table)));
        }
        check_status("delete table", response).await?;
        Ok(())
    }

    /// Fetch one page of entities, resuming from `continuation_token` when
    /// supplied. A malformed token fails before any upstream call. An
    /// unknown table is `NotFound`; an empty page is a normal result.
    pub async fn list_entities(
        &self,
        table: &str,
        filter: Option<&str>,
        top: Option<u32>,
        continuation_token: Option<&str>,
    ) -> UpstreamResult<EntityPage> {
        let mut query = Vec::new();
        if let Some(filter) = filter {
            query.push(("$filter", urlencoding::encode(filter).into_owned()));
        }
        if let Some(top) = top {
            query.push(("$top", top.to_string()));
        }
        if let Some(token) = continuation_token {
            let continuation = decode_continuation(token)?;
            query.push((
                "NextPartitionKey",
                urlencoding::encode(&continuation.next_partition_key).into_owned(),
            ));
            if let Some(next_row_key) = &continuation.next_row_key {
                query.push(("NextRowKey", urlencoding::encode(next_row_key).into_owned()));
            }
        }

        let resource = format!("{}()", table);
        let response = self
            .request(Method::GET, self.url(&resource, &query))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(format!("Table '{}' not found", table)));
        }
        let response = check_status("list entities", response).await?;

        let next = header_value(&response, "x-ms-continuation-NextPartitionKey").map(
            |next_partition_key| Continuation {
                next_partition_key,
                next_row_key: header_value(&response, "x-ms-continuation-NextRowKey"),
            },
        );
        let page: EntityList = read_json(response).await?;
        Ok(EntityPage {
            entities: page.value,
            continuation_token: next.as_ref().map(encode_continuation),
        })
    }

    /// Run a query, draining every page. Never returns a continuation
    /// token; the full result set comes back at once. The filter string is
    /// passed through verbatim, no validation or rewriting.
    pub async fn query_entities(
        &self,
        table: &str,
        filter: Option<&str>,
    ) -> UpstreamResult<Vec<Map<String, Value>>> {
        let resource = format!("{}()", table);
        let encoded_filter = filter.map(|f| urlencoding::encode(f).into_owned());
        let mut entities = Vec::new();
        let mut continuation: Option<Continuation> = None;
        loop {
            let mut query = Vec::new();
            if let Some(encoded) = &encoded_filter {
                query.push(("$filter", encoded.clone()));
            }
            if let Some(next) = &continuation {
                query.push((
                    "NextPartitionKey",
                    urlencoding::encode(&next.next_partition_key).into_owned(),
                ));
                if let Some(next_row_key) = &next.next_row_key {
                    query.push(("NextRowKey", urlencoding::encode(next_row_key).into_owned()));
                }
            }
            let response = self
                .request(Method::GET, self.url(&resource, &query))
                .send()
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(UpstreamError::NotFound(format!("Table '{}' not found", table)));
            }
            let response = check_status("query entities", response).await?;
            continuation = header_value(&response, "x-ms-continuation-NextPartitionKey").map(
                |next_partition_key| Continuation {
                    next_partition_key,
                    next_row_key: header_value(&response, "x-ms-continuation-NextRowKey"),
                },
            );
            let page: EntityList = read_json(response).await?;
            entities.extend(page.value);
            if continuation.is_none() {
                return Ok(entities);
            }
        }
    }

    /// Fetch a single entity by its keys. A missing entity is `None`, not
    /// an error.
    pub async fn get_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> UpstreamResult<Option<Map<String, Value>>> {
        let resource = entity_resource(table, partition_key, row_key);
        let response = self
            .request(Method::GET, self.url(&resource, &[]))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status("get entity", response).await?;
        Ok(Some(read_json(response).await?))
    }

    /// Insert-or-replace an entity. The property bag must already carry its
    /// key columns; the addressed keys win on disagreement.
    pub async fn upsert_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
        entity: &Map<String, Value>,
    ) -> UpstreamResult<()> {
        let resource = entity_resource(table, partition_key, row_key);
        let response = self
            .request(Method::PUT, self.url(&resource, &[]))
            .json(entity)
            .send()
            .await?;
        check_status("upsert entity", response).await?;
        Ok(())
    }

    /// Delete an entity unconditionally. A missing entity is `NotFound`.
    pub async fn delete_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> UpstreamResult<()> {
        let resource = entity_resource(table, partition_key, row_key);
        let response = self
            .request(Method::DELETE, self.url(&resource, &[]))
            .header(header::IF_MATCH, "*")
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(format!(
                "Entity '{}'/'{}' not found in table '{}'",
                partition_key, row_key, table
            )));
        }
        check_status("delete entity", response).await?;
        Ok(())
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn check_status(operation: &'static str, response: Response) -> UpstreamResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    tracing::error!(operation, status = status.as_u16(), body = %body, "Table store call failed");
    Err(UpstreamError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> UpstreamResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| UpstreamError::Deserialize(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> TableClient {
        TableClient::new(Client::new(), server.url(), "sv=2019-02-02&sig=secret")
    }

    #[test]
    fn test_continuation_token_round_trip() {
        let continuation = Continuation {
            next_partition_key: "1!8!cGsx".to_string(),
            next_row_key: Some("1!8!cmsx".to_string()),
        };
        let token = encode_continuation(&continuation);
        assert!(!token.contains('='));
        assert_eq!(decode_continuation(&token).expect("decode"), continuation);
    }

    #[test]
    fn test_continuation_token_without_row_key() {
        let continuation = Continuation {
            next_partition_key: "pk".to_string(),
            next_row_key: None,
        };
        let token = encode_continuation(&continuation);
        assert_eq!(decode_continuation(&token).expect("decode"), continuation);
    }

    #[test]
    fn test_malformed_continuation_token_rejected() {
        assert!(matches!(
            decode_continuation("%%%not-base64%%%"),
            Err(UpstreamError::InvalidContinuation)
        ));
        // Valid base64, invalid payload
        let token = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        assert!(matches!(
            decode_continuation(&token),
            Err(UpstreamError::InvalidContinuation)
        ));
    }

    #[test]
    fn test_escape_key_doubles_quotes() {
        assert_eq!(escape_key("plain"), "plain");
        assert_eq!(escape_key("o'brien"), "o%27%27brien");
        assert_eq!(escape_key("a b"), "a%20b");
    }

    #[test]
    fn test_entity_resource_addressing() {
        assert_eq!(
            entity_resource("People", "pk1", "rk1"),
            "People(PartitionKey='pk1',RowKey='rk1')"
        );
    }

    #[tokio::test]
    async fn test_list_tables_drains_continuation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/Tables")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sv".into(), "2019-02-02".into()),
                Matcher::UrlEncoded("sig".into(), "secret".into()),
            ]))
            .match_header("x-ms-version", STORAGE_API_VERSION)
            .match_header("accept", ACCEPT_NO_METADATA)
            .with_header("x-ms-continuation-NextTableName", "beta")
            .with_body(json!({"value": [{"TableName": "alpha"}]}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/Tables")
            .match_query(Matcher::UrlEncoded("NextTableName".into(), "beta".into()))
            .with_body(json!({"value": [{"TableName": "beta"}]}).to_string())
            .create_async()
            .await;

        let tables = client(&server).list_tables().await.expect("list");
        assert_eq!(tables, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[tokio::test]
    async fn test_create_table_conflict_is_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/Tables")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({"TableName": "People"})))
            .with_status(409)
            .with_body("TableAlreadyExists")
            .create_async()
            .await;

        client(&server).create_table("People").await.expect("create");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_table_missing_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/Tables('Missing')")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("TableNotFound")
            .create_async()
            .await;

        let err = client(&server)
            .delete_table("Missing")
            .await
            .expect_err("failure");
        assert!(matches!(err, UpstreamError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_entities_returns_page_and_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/People()")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$top".into(), "2".into()),
                Matcher::UrlEncoded("sig".into(), "secret".into()),
            ]))
            .with_header("x-ms-continuation-NextPartitionKey", "1!8!cGsx")
            .with_header("x-ms-continuation-NextRowKey", "1!8!cmsx")
            .with_body(
                json!({"value": [
                    {"PartitionKey": "pk1", "RowKey": "rk1", "Name": "alpha"},
                    {"PartitionKey": "pk1", "RowKey": "rk2", "Name": "beta"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let page = client(&server)
            .list_entities("People", None, Some(2), None)
            .await
            .expect("page");
        assert_eq!(page.entities.len(), 2);
        let token = page.continuation_token.expect("token");
        let continuation = decode_continuation(&token).expect("decode");
        assert_eq!(continuation.next_partition_key, "1!8!cGsx");
        assert_eq!(continuation.next_row_key.as_deref(), Some("1!8!cmsx"));
    }

    #[tokio::test]
    async fn test_list_entities_resumes_from_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/People()")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("NextPartitionKey".into(), "1!8!cGsx".into()),
                Matcher::UrlEncoded("NextRowKey".into(), "1!8!cmsx".into()),
            ]))
            .with_body(json!({"value": []}).to_string())
            .create_async()
            .await;

        let token = encode_continuation(&Continuation {
            next_partition_key: "1!8!cGsx".to_string(),
            next_row_key: Some("1!8!cmsx".to_string()),
        });
        let page = client(&server)
            .list_entities("People", None, None, Some(&token))
            .await
            .expect("page");
        assert!(page.entities.is_empty());
        assert!(page.continuation_token.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_entities_rejects_bad_token_before_any_call() {
        let server = mockito::Server::new_async().await;
        let err = client(&server)
            .list_entities("People", None, None, Some("!!!"))
            .await
            .expect_err("failure");
        assert!(matches!(err, UpstreamError::InvalidContinuation));
    }

    #[tokio::test]
    async fn test_list_entities_unknown_table_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/Missing()")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("TableNotFound")
            .create_async()
            .await;

        let err = client(&server)
            .list_entities("Missing", None, None, None)
            .await
            .expect_err("failure");
        assert!(matches!(err, UpstreamError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_query_entities_drains_pages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/People()")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$filter".into(), "Name eq 'alpha'".into()),
            ]))
            .with_header("x-ms-continuation-NextPartitionKey", "pk2")
            .with_body(json!({"value": [{"PartitionKey": "pk1", "RowKey": "rk1"}]}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/People()")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$filter".into(), "Name eq 'alpha'".into()),
                Matcher::UrlEncoded("NextPartitionKey".into(), "pk2".into()),
            ]))
            .with_body(json!({"value": [{"PartitionKey": "pk2", "RowKey": "rk1"}]}).to_string())
            .create_async()
            .await;

        let entities = client(&server)
            .query_entities("People", Some("Name eq 'alpha'"))
            .await
            .expect("entities");
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1]["PartitionKey"], json!("pk2"));
    }

    #[tokio::test]
    async fn test_get_entity_missing_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/People(PartitionKey='pk1',RowKey='rk1')")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("ResourceNotFound")
            .create_async()
            .await;

        let entity = client(&server)
            .get_entity("People", "pk1", "rk1")
            .await
            .expect("lookup");
        assert!(entity.is_none());
    }

    #[tokio::test]
    async fn test_upsert_entity_puts_property_bag() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/People(PartitionKey='pk1',RowKey='rk1')")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "PartitionKey": "pk1",
                "RowKey": "rk1",
                "Name": "alpha"
            })))
            .with_status(204)
            .create_async()
            .await;

        let entity = json!({"PartitionKey": "pk1", "RowKey": "rk1", "Name": "alpha"})
            .as_object()
            .expect("object")
            .clone();
        client(&server)
            .upsert_entity("People", "pk1", "rk1", &entity)
            .await
            .expect("upsert");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_entity_sends_unconditional_if_match() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/People(PartitionKey='pk1',RowKey='rk1')")
            .match_query(Matcher::Any)
            .match_header("if-match", "*")
            .with_status(204)
            .create_async()
            .await;

        client(&server)
            .delete_entity("People", "pk1", "rk1")
            .await
            .expect("delete");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_entity_missing_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/People(PartitionKey='pk1',RowKey='rk1')")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("ResourceNotFound")
            .create_async()
            .await;

        let err = client(&server)
            .delete_entity("People", "pk1", "rk1")
            .await
            .expect_err("failure");
        assert!(matches!(err, UpstreamError::NotFound(_)));
    }
}
