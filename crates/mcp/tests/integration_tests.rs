//! Integration tests for the Opine MCP server
//!
//! Tool calls run through the real HTTP client against a local mock of the
//! Opine API.

use mockito::{Matcher, Server};
use opine_client::OpineClient;
use opine_mcp::{DispatchError, OpineMcpServer, ToolDispatcher, TOTAL_TOOLS};
use rmcp::{model::JsonObject, ServerHandler};
use serde_json::{json, Value};
use std::sync::Arc;

fn dispatcher_for(server: &Server) -> ToolDispatcher<OpineClient> {
    let client =
        OpineClient::new("opk_test".to_string().into(), Some(&format!("{}/v1", server.url())))
            .expect("client builds");
    ToolDispatcher::new(Arc::new(client))
}

fn args(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn test_server_info() {
    let client = OpineClient::new("opk_test".to_string().into(), None).expect("client builds");
    let info = OpineMcpServer::new(client).get_info();

    assert_eq!(info.server_info.name, "opine-mcp");
    assert!(info.capabilities.tools.is_some());
    assert_eq!(opine_mcp::tool_definitions().len(), TOTAL_TOOLS);
}

#[tokio::test]
async fn test_salesforce_deal_lookup() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/v1/deals/eid(:|%3A)001A0000006Vm9rIAC$".to_string()))
        .match_header("x-api-key", "opk_test")
        .with_status(200)
        .with_body(json!({ "id": "d_5", "name": "Initech", "salesProcessId": null }).to_string())
        .create_async()
        .await;

    let text = dispatcher_for(&server)
        .dispatch("get_salesforce_deal", Some(&args(json!({ "id": "001A0000006Vm9r" }))))
        .await
        .expect("lookup succeeds");

    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["name"], "Initech");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_describe_deal_sales_process() {
    let mut server = Server::new_async().await;
    let deal = server
        .mock("GET", "/v1/deals/d_42")
        .match_query(Matcher::UrlEncoded("includeSummary".into(), "false".into()))
        .with_status(200)
        .with_body(
            json!({ "id": "d_42", "salesProcessId": 42, "salesProcessStageId": 7 }).to_string(),
        )
        .create_async()
        .await;
    let processes = server
        .mock("GET", "/v1/sales-processes")
        .match_query(Matcher::UrlEncoded("limit".into(), "1000".into()))
        .with_status(200)
        .with_body(
            json!({
                "items": [{ "id": 41, "name": "SMB" }, { "id": 42, "name": "Enterprise" }],
                "limit": 1000,
                "offset": 0,
                "totalCount": 2
            })
            .to_string(),
        )
        .create_async()
        .await;
    let stages = server
        .mock("GET", "/v1/sales-process-stages")
        .match_query(Matcher::UrlEncoded("limit".into(), "1000".into()))
        .with_status(200)
        .with_body(
            json!({ "items": [{ "id": 8, "title": "Negotiation" }], "totalCount": 1 }).to_string(),
        )
        .create_async()
        .await;

    let text = dispatcher_for(&server)
        .dispatch("describe_deal_sales_process", Some(&args(json!({ "id": "d_42" }))))
        .await
        .expect("describe succeeds");

    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["salesProcess"]["name"], "Enterprise");
    assert!(value["salesProcessStage"].is_null(), "stage 7 is not in the window");
    deal.assert_async().await;
    processes.assert_async().await;
    stages.assert_async().await;
}

#[tokio::test]
async fn test_remote_error_is_wrapped() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/evaluations")
        .with_status(401)
        .with_body(json!({ "message": "bad key" }).to_string())
        .create_async()
        .await;

    let error = dispatcher_for(&server)
        .dispatch("list_evaluations", None)
        .await
        .expect_err("upstream rejects");

    assert_eq!(
        error.to_string(),
        "Error executing list_evaluations: Opine API error: 401 Unauthorized"
    );
    assert!(matches!(error, DispatchError::Execution { .. }));
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_api() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/v1/tickets").expect(0).create_async().await;

    let error = dispatcher_for(&server)
        .dispatch("create_ticket", Some(&args(json!({ "title": "SSO", "state": "OPEN" }))))
        .await
        .expect_err("type is required");

    assert_eq!(
        error.to_string(),
        "Error executing create_ticket: missing required argument `type`"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_update_ticket_sends_clears() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/v1/tickets/31")
        .match_body(Matcher::Json(json!({ "state": "DEFERRED", "targetDueDate": null })))
        .with_status(200)
        .with_body(json!({ "id": 31, "title": "Audit log", "state": "DEFERRED" }).to_string())
        .create_async()
        .await;

    let text = dispatcher_for(&server)
        .dispatch(
            "update_ticket",
            Some(&args(json!({ "id": "31", "state": "DEFERRED", "targetDueDate": null }))),
        )
        .await
        .expect("update succeeds");

    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["state"], "DEFERRED");
    mock.assert_async().await;
}
