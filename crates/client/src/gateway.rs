//! HTTP access to the Opine REST API.
//!
//! One call per operation: no retries, no caching, no pagination beyond the
//! `limit`/`offset` the caller passes.

use std::time::Duration;

use async_trait::async_trait;
use opine_core::config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use opine_core::{Deal, Evaluation, Note, Page, SalesProcess, SalesProcessStage, Ticket};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::params::{
    CreateDealNoteParams, CreateTicketParams, GetDealParams, ListDealsParams,
    ListSalesProcessStagesParams, PageParams, UpdateTicketParams,
};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// The Opine operations this workspace uses.
#[async_trait]
pub trait OpineApi: Send + Sync {
    async fn list_deals(&self, params: &ListDealsParams) -> Result<Page<Deal>, ClientError>;

    async fn get_deal(&self, params: &GetDealParams) -> Result<Deal, ClientError>;

    async fn list_evaluations(&self, params: &PageParams)
        -> Result<Page<Evaluation>, ClientError>;

    async fn list_tickets(&self, params: &PageParams) -> Result<Page<Ticket>, ClientError>;

    async fn list_sales_processes(
        &self,
        params: &PageParams,
    ) -> Result<Page<SalesProcess>, ClientError>;

    async fn list_sales_process_stages(
        &self,
        params: &ListSalesProcessStagesParams,
    ) -> Result<Page<SalesProcessStage>, ClientError>;

    async fn update_ticket(&self, params: &UpdateTicketParams) -> Result<Ticket, ClientError>;

    async fn create_deal_note(&self, params: &CreateDealNoteParams) -> Result<Note, ClientError>;

    async fn create_ticket(&self, params: &CreateTicketParams) -> Result<Ticket, ClientError>;
}

#[derive(Clone, Debug)]
pub struct OpineClient {
    http: Client,
    base_url: Url,
    api_key: SecretString,
}

impl OpineClient {
    pub fn new(api_key: SecretString, base_url: Option<&str>) -> Result<Self, ClientError> {
        Self::with_timeout(api_key, base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        api_key: SecretString,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let raw_base = base_url.unwrap_or(DEFAULT_BASE_URL);
        let base_url =
            Url::parse(raw_base).map_err(|_| ClientError::InvalidBaseUrl(raw_base.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(raw_base.to_string()));
        }

        let http = Client::builder().timeout(timeout).build().map_err(ClientError::HttpClient)?;

        Ok(Self { http, base_url, api_key })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::with_timeout(
            config.api_key.clone(),
            Some(config.base_url.as_str()),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header(CONTENT_TYPE, "application/json")
    }

    async fn get<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let request = self.request(Method::GET, url).query(query);
        self.execute(Method::GET, path, request).await
    }

    async fn send_json<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let request = self.request(method.clone(), url).json(body);
        self.execute(method, path, request).await
    }

    async fn execute<T>(
        &self,
        method: Method,
        path: String,
        request: RequestBuilder,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        debug!(method = %method, path = %path, "sending opine api request");

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport { path: path.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(method = %method, path = %path, status = status.as_u16(), "opine api request failed");
            return Err(ClientError::RemoteApi {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { path: path.clone(), source })?;

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { path, source })
    }
}

#[async_trait]
impl OpineApi for OpineClient {
    async fn list_deals(&self, params: &ListDealsParams) -> Result<Page<Deal>, ClientError> {
        self.get(&["deals"], params).await
    }

    async fn get_deal(&self, params: &GetDealParams) -> Result<Deal, ClientError> {
        self.get(&["deals", params.id.as_str()], params).await
    }

    async fn list_evaluations(
        &self,
        params: &PageParams,
    ) -> Result<Page<Evaluation>, ClientError> {
        self.get(&["evaluations"], params).await
    }

    async fn list_tickets(&self, params: &PageParams) -> Result<Page<Ticket>, ClientError> {
        self.get(&["tickets"], params).await
    }

    async fn list_sales_processes(
        &self,
        params: &PageParams,
    ) -> Result<Page<SalesProcess>, ClientError> {
        self.get(&["sales-processes"], params).await
    }

    async fn list_sales_process_stages(
        &self,
        params: &ListSalesProcessStagesParams,
    ) -> Result<Page<SalesProcessStage>, ClientError> {
        self.get(&["sales-process-stages"], params).await
    }

    async fn update_ticket(&self, params: &UpdateTicketParams) -> Result<Ticket, ClientError> {
        self.send_json(Method::PATCH, &["tickets", params.id.as_str()], params).await
    }

    async fn create_deal_note(&self, params: &CreateDealNoteParams) -> Result<Note, ClientError> {
        self.send_json(Method::POST, &["deals", params.deal_id.as_str(), "notes"], params).await
    }

    async fn create_ticket(&self, params: &CreateTicketParams) -> Result<Ticket, ClientError> {
        self.send_json(Method::POST, &["tickets"], params).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use opine_core::{DealAssociation, DealPriority, RecordRef, TicketState, TicketType};
    use serde_json::json;

    use crate::error::ClientError;
    use crate::gateway::{OpineApi, OpineClient};
    use crate::params::{
        CreateDealNoteParams, CreateTicketParams, GetDealParams, ListDealsParams,
        ListSalesProcessStagesParams, PageParams, UpdateTicketParams,
    };

    fn client_for(server: &Server) -> OpineClient {
        OpineClient::new("opk_test".to_string().into(), Some(&format!("{}/v1", server.url())))
            .expect("client builds")
    }

    #[test]
    fn default_base_url_is_production() {
        let client = OpineClient::new("opk_test".to_string().into(), None).expect("client builds");
        assert_eq!(client.base_url(), "https://api.tryopine.com/v1");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let error = OpineClient::new("opk_test".to_string().into(), Some("not a url"))
            .expect_err("invalid url");
        assert!(matches!(error, ClientError::InvalidBaseUrl(ref url) if url == "not a url"));
    }

    #[tokio::test]
    async fn list_deals_sends_key_and_only_present_params() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/deals")
            .match_header("x-api-key", "opk_test")
            .match_header("content-type", "application/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "5".into()),
                Matcher::UrlEncoded("includeSummary".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "items": [{ "id": "d_1", "name": "Acme", "salesProcessId": 42 }],
                    "limit": 5,
                    "offset": 0,
                    "totalCount": 1
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_deals(&ListDealsParams {
                limit: Some(5),
                include_summary: Some(true),
                ..Default::default()
            })
            .await
            .expect("deals load");

        mock.assert_async().await;
        assert_eq!(page.total_count(), Some(1));
        assert_eq!(page.items[0].id, "d_1");
        assert_eq!(page.items[0].sales_process_key(), Some(42));
    }

    #[tokio::test]
    async fn get_deal_keeps_external_prefix_in_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/v1/deals/eid(:|%3A)00130000003DzUiAAK$".to_string()))
            .match_query(Matcher::UrlEncoded("includeSummary".into(), "false".into()))
            .with_status(200)
            .with_body(json!({ "id": "d_9", "name": "Globex" }).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let deal = client
            .get_deal(&GetDealParams {
                id: "eid:00130000003DzUiAAK".to_string(),
                include_summary: Some(false),
            })
            .await
            .expect("deal loads");

        mock.assert_async().await;
        assert_eq!(deal.extra.get("name"), Some(&json!("Globex")));
    }

    #[tokio::test]
    async fn path_ids_are_percent_encoded() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/deals/a%2Fb")
            .with_status(200)
            .with_body(json!({ "id": "a/b" }).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let deal = client
            .get_deal(&GetDealParams { id: "a/b".to_string(), include_summary: None })
            .await
            .expect("deal loads");

        mock.assert_async().await;
        assert_eq!(deal.id, "a/b");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_remote_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/deals/missing")
            .with_status(404)
            .with_body(json!({ "message": "not found" }).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let error = client
            .get_deal(&GetDealParams { id: "missing".to_string(), include_summary: None })
            .await
            .expect_err("404 should fail");

        mock.assert_async().await;
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.to_string(), "Opine API error: 404 Not Found");
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/tickets")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let error = client.list_tickets(&PageParams::default()).await.expect_err("html body");

        assert!(matches!(error, ClientError::Decode { ref path, .. } if path == "/v1/tickets"));
    }

    #[tokio::test]
    async fn list_endpoints_use_expected_paths() {
        let mut server = Server::new_async().await;
        let empty = json!({ "items": [], "limit": 1000, "offset": 0, "totalCount": 0 }).to_string();
        let processes = server
            .mock("GET", "/v1/sales-processes")
            .match_query(Matcher::UrlEncoded("limit".into(), "1000".into()))
            .with_status(200)
            .with_body(&empty)
            .create_async()
            .await;
        let stages = server
            .mock("GET", "/v1/sales-process-stages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "1000".into()),
                Matcher::UrlEncoded("includeDeleted".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(&empty)
            .create_async()
            .await;
        let evaluations = server
            .mock("GET", "/v1/evaluations")
            .match_query(Matcher::UrlEncoded("offset".into(), "20".into()))
            .with_status(200)
            .with_body(&empty)
            .create_async()
            .await;

        let client = client_for(&server);
        client.list_sales_processes(&PageParams::first(1000)).await.expect("processes load");
        client
            .list_sales_process_stages(&ListSalesProcessStagesParams {
                include_deleted: Some(true),
                ..ListSalesProcessStagesParams::first(1000)
            })
            .await
            .expect("stages load");
        client
            .list_evaluations(&PageParams { limit: None, offset: Some(20) })
            .await
            .expect("evaluations load");

        processes.assert_async().await;
        stages.assert_async().await;
        evaluations.assert_async().await;
    }

    #[tokio::test]
    async fn update_ticket_patches_only_given_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/v1/tickets/17")
            .match_header("x-api-key", "opk_test")
            .match_body(Matcher::Json(json!({
                "state": "IN_PROGRESS",
                "deals": [{ "id": 3, "priority": "BLOCKER", "delete": true }],
                "vendorEntityUrl": null
            })))
            .with_status(200)
            .with_body(json!({ "id": 17, "title": "SSO", "state": "IN_PROGRESS" }).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let ticket = client
            .update_ticket(&UpdateTicketParams {
                id: "17".to_string(),
                state: Some(TicketState::InProgress),
                deals: Some(vec![DealAssociation {
                    id: RecordRef::Numeric(3),
                    priority: DealPriority::Blocker,
                    delete: Some(true),
                }]),
                vendor_entity_url: Some(None),
                ..Default::default()
            })
            .await
            .expect("ticket updates");

        mock.assert_async().await;
        assert_eq!(ticket.extra.get("state"), Some(&json!("IN_PROGRESS")));
    }

    #[tokio::test]
    async fn create_endpoints_post_json_bodies() {
        let mut server = Server::new_async().await;
        let note = server
            .mock("POST", "/v1/deals/d_1/notes")
            .match_body(Matcher::Json(json!({ "title": "Recap", "body": "Met with CFO" })))
            .with_status(201)
            .with_body(json!({ "id": 5, "title": "Recap", "body": "Met with CFO" }).to_string())
            .create_async()
            .await;
        let ticket = server
            .mock("POST", "/v1/tickets")
            .match_body(Matcher::Json(json!({ "title": "Audit log", "type": "FEATURE", "state": "OPEN" })))
            .with_status(201)
            .with_body(json!({ "id": 77, "title": "Audit log", "type": "FEATURE", "state": "OPEN" }).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let created_note = client
            .create_deal_note(&CreateDealNoteParams {
                deal_id: "d_1".to_string(),
                title: "Recap".to_string(),
                body: Some(json!("Met with CFO")),
            })
            .await
            .expect("note created");
        let created_ticket = client
            .create_ticket(&CreateTicketParams {
                title: "Audit log".to_string(),
                ticket_type: TicketType::Feature,
                state: TicketState::Open,
                description: None,
                target_due_date: None,
                deals: None,
                labels: None,
                vendor_entity_url: None,
            })
            .await
            .expect("ticket created");

        note.assert_async().await;
        ticket.assert_async().await;
        assert_eq!(created_note.id, 5);
        assert_eq!(created_ticket.id, 77);
    }

    #[tokio::test]
    async fn list_responses_are_not_reshaped() {
        let mut server = Server::new_async().await;
        let body = json!({
            "items": [{ "id": 4, "title": null, "state": "OPEN", "targetDueDate": null }]
        });
        let _mock = server
            .mock("GET", "/v1/tickets")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let page = client_for(&server)
            .list_tickets(&PageParams::default())
            .await
            .expect("null title decodes");

        assert_eq!(serde_json::to_value(&page).expect("page encodes"), body);
    }
}
