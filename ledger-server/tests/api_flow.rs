//! End-to-end requests through the axum router

use axum::Router;
use axum::body::Body;
use chrono::{TimeZone, Utc};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use ledger_server::api;
use ledger_server::core::{Config, ServerState};
use ledger_server::ingest::Schema;
use ledger_server::kv::MemoryKv;
use ledger_server::source::{Cell, MemorySource, Row, TabularSource};
use ledger_server::utils::ManualClock;
use ledger_server::ErrorCode;

fn row(cells: &[&str]) -> Row {
    cells.iter().map(|c| Cell::from(*c)).collect()
}

fn seeded_source() -> MemorySource {
    MemorySource::new()
        .with_sheet(
            "売上",
            vec![
                row(&["日付", "店舗", "担当", "現金", "クレジット"]),
                row(&["2024/5/1", "千葉", "Yui", "1000", "2000"]),
                row(&["2024/5/2", "柏店", "ken", "500", ""]),
            ],
        )
        .with_sheet(
            "問診票_千葉",
            vec![
                row(&["タイムスタンプ", "お名前（フリガナ）", "氏名", "電話番号"]),
                row(&["2024/5/1 10:00:00", "ヤマダ", "山田花子", "090"]),
                row(&["2024/05/03", "サトウ", "佐藤", ""]),
            ],
        )
        .with_sheet("問診票_船橋", vec![row(&["タイムスタンプ", "氏名"])])
        .with_sheet(
            "問診票_柏",
            vec![row(&["日付", "氏名"]), row(&["2024/5/3", "鈴木"])],
        )
}

struct Harness {
    app: Router,
    source: Arc<MemorySource>,
}

fn harness_with(require_write_session: bool) -> Harness {
    let source = Arc::new(seeded_source());
    // 2024-05-03 09:00 in Tokyo
    let clock = Arc::new(ManualClock::at(
        Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap(),
    ));
    let mut config = Config::with_overrides("/tmp/ledger-api-flow", 0);
    config.require_write_session = require_write_session;

    let state = ServerState::from_parts(
        config,
        source.clone(),
        Arc::new(MemoryKv::new()),
        Schema::default(),
        clock,
    );
    Harness {
        app: api::router(state),
        source,
    }
}

fn harness() -> Harness {
    harness_with(false)
}

async fn send(app: &Router, request: Request<Body>) -> Value {
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> Value {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: impl Into<Body>) -> Value {
    let request = Request::post(uri)
        .header("content-type", "text/plain")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let body = get(&h.app, "/health").await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_legacy_sales_listing_is_a_bare_array() {
    let h = harness();
    let body = get(&h.app, "/exec?action=list-sales").await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "1");
    assert_eq!(entries[0]["store"], "chiba");
    assert_eq!(entries[0]["staff"], "yui");
    assert_eq!(entries[0]["sales"]["credit"], 2000);
    assert_eq!(entries[1]["store"], "kashiwa");
    assert_eq!(entries[1]["sales"]["credit"], 0);

    // No action at all means the sales listing
    assert_eq!(get(&h.app, "/exec").await, body);
}

#[tokio::test]
async fn test_customer_listings() {
    let h = harness();

    let chiba = get(&h.app, "/exec?action=list-customers-by-store&store=%E5%8D%83%E8%91%89").await;
    let chiba = chiba.as_array().unwrap();
    assert_eq!(chiba.len(), 2);
    assert_eq!(chiba[0]["id"], "chiba-1");
    assert_eq!(chiba[0]["name"], "山田花子");
    assert_eq!(chiba[0]["kana"], "ヤマダ");
    assert_eq!(chiba[0]["email"], "");

    let today = get(&h.app, "/exec?action=list-customers-for-today").await;
    let names: Vec<&str> = today
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert_eq!(names, vec!["佐藤", "鈴木"]);

    let missing = get(&h.app, "/exec?action=list-customers-by-store&store=").await;
    assert_eq!(missing["status"], "error");
    assert_eq!(missing["code"], ErrorCode::RequiredField.code());
}

#[tokio::test]
async fn test_reads_are_cached_until_a_write_invalidates() {
    let h = harness();
    let before = get(&h.app, "/exec?action=list-sales").await;
    assert_eq!(before.as_array().unwrap().len(), 2);

    // Out-of-band edit is invisible while the cache holds
    h.source
        .append_row("売上", row(&["2024/5/3", "船橋", "aoi", "10"]))
        .unwrap();
    let cached = get(&h.app, "/exec?action=list-sales").await;
    assert_eq!(cached.as_array().unwrap().len(), 2);

    let fresh = get(&h.app, "/exec?action=list-sales&nocache=true").await;
    assert_eq!(fresh.as_array().unwrap().len(), 3);

    // A write through the gateway drops the stale entry
    let added = post(
        &h.app,
        "/exec",
        json!({
            "action": "add-sales-record",
            "record": {"date": "2024/5/4", "store": "千葉", "staff": "yui", "sales": {"cash": 700}}
        })
        .to_string(),
    )
    .await;
    assert_eq!(added["status"], "success");
    assert_eq!(added["id"], "4");

    let after = get(&h.app, "/exec?action=list-sales").await;
    let after = after.as_array().unwrap();
    assert_eq!(after.len(), 4);
    assert_eq!(after[3]["sales"]["cash"], 700);
    assert_eq!(after[3]["date"], "2024/5/4");
}

#[tokio::test]
async fn test_update_sales_rows_reports_missing_ids() {
    let h = harness();
    let body = post(
        &h.app,
        "/exec",
        json!({
            "action": "update-sales-rows",
            "rows": [
                {"id": 2, "sales": {"cash": "1,200"}},
                {"id": 99, "staff": "ghost"}
            ]
        })
        .to_string(),
    )
    .await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["updated"], 1);
    assert_eq!(body["missing"], json!(["99"]));

    let sales = get(&h.app, "/exec?action=list-sales").await;
    assert_eq!(sales[1]["sales"]["cash"], 1200);
}

#[tokio::test]
async fn test_goals_and_settings_round_trip() {
    let h = harness();
    let empty = get(&h.app, "/exec?action=load-goals").await;
    assert_eq!(empty, json!({"status": "success", "goals": {}, "salaries": {}}));

    let saved = post(
        &h.app,
        "/exec",
        json!({"action": "save-goals", "goals": {"chiba": 500000}, "salaries": {"yui": 1}})
            .to_string(),
    )
    .await;
    assert_eq!(saved, json!({"status": "success"}));

    let goals = get(&h.app, "/exec?action=load-goals").await;
    assert_eq!(goals["goals"]["chiba"], 500000);
    assert_eq!(goals["salaries"]["yui"], 1);

    post(
        &h.app,
        "/exec",
        json!({"action": "save-settings", "settings": {"theme": "dark"}, "staff": ["yui"]})
            .to_string(),
    )
    .await;
    let all = get(&h.app, "/exec?action=get-all").await;
    assert_eq!(all["status"], "success");
    assert_eq!(all["sales"].as_array().unwrap().len(), 2);
    assert_eq!(all["goals"]["chiba"], 500000);
    assert_eq!(all["settings"]["theme"], "dark");
    assert_eq!(all["staff"], json!(["yui"]));
}

#[tokio::test]
async fn test_login_then_session_checks() {
    let h = harness();
    post(
        &h.app,
        "/exec",
        json!({
            "action": "save-passwords",
            "passwords": {"admin": "root-pass", "stores": {"chiba": "chiba-pass"}}
        })
        .to_string(),
    )
    .await;

    // Secrets are stored hashed and never served back
    let view = get(&h.app, "/exec?action=load-passwords").await;
    assert_eq!(view["passwords"]["admin"], "********");
    let stored = h.source.read_all("auth").unwrap();
    assert!(stored[1][1].to_text().contains("$argon2"));

    let wrong = get(&h.app, "/exec?action=verify-password&pageType=admin&password=nope").await;
    assert_eq!(wrong["status"], "error");
    assert_eq!(wrong["code"], ErrorCode::InvalidCredentials.code());

    let staff = get(
        &h.app,
        "/exec?action=verify-password&pageType=staff&store=%E5%8D%83%E8%91%89&staff=Yui&password=chiba-pass",
    )
    .await;
    assert_eq!(staff["status"], "success");
    assert_eq!(staff["role"], "staff");
    assert_eq!(staff["store"], "chiba");
    assert_eq!(staff["staff"], "yui");
    let token = staff["token"].as_str().unwrap().to_string();

    let ok = get(
        &h.app,
        &format!("/exec?action=verify-session&pageType=staff&token={token}"),
    )
    .await;
    assert_eq!(ok["valid"], true);

    // Staff sessions do not open admin pages
    let denied = get(
        &h.app,
        &format!("/exec?action=verify-session&pageType=admin&token={token}"),
    )
    .await;
    assert_eq!(denied["status"], "error");

    let logout = post(
        &h.app,
        "/exec",
        json!({"action": "logout", "token": token}).to_string(),
    )
    .await;
    assert_eq!(logout["revoked"], true);

    let gone = get(
        &h.app,
        &format!("/exec?action=verify-session&pageType=staff&token={token}"),
    )
    .await;
    assert_eq!(gone["code"], ErrorCode::SessionInvalid.code());
}

#[tokio::test]
async fn test_unknown_page_type() {
    let h = harness();
    let body = get(&h.app, "/exec?action=verify-password&pageType=owner").await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], ErrorCode::UnknownPageType.code());
}

#[tokio::test]
async fn test_bad_writes_answer_with_error_bodies() {
    let h = harness();

    let unknown = post(&h.app, "/exec", r#"{"action": "drop-tables"}"#).await;
    assert_eq!(unknown["status"], "error");
    assert_eq!(unknown["message"], "Unrecognized action: drop-tables");

    let malformed = post(&h.app, "/exec", "{not json").await;
    assert_eq!(malformed["code"], ErrorCode::InvalidFormat.code());

    let empty = post(&h.app, "/exec", "").await;
    assert_eq!(empty["code"], ErrorCode::InvalidRequest.code());

    let missing_record = post(&h.app, "/exec", r#"{"action": "add-sales-record"}"#).await;
    assert_eq!(missing_record["code"], ErrorCode::RequiredField.code());
}

#[tokio::test]
async fn test_v2_envelope() {
    let h = harness();
    let read = get(&h.app, "/api/v2/read?action=list-sales").await;
    assert_eq!(read["kind"], "ok");
    assert_eq!(read["payload"].as_array().unwrap().len(), 2);

    let write = post(&h.app, "/api/v2/write", r#"{"action": "clear-cache"}"#).await;
    assert_eq!(write["kind"], "ok");
    assert_eq!(write["payload"]["cleared"], 1);

    let err = post(&h.app, "/api/v2/write", r#"{"action": "nope"}"#).await;
    assert_eq!(err["kind"], "err");
    assert_eq!(err["code"], ErrorCode::UnrecognizedAction.code());
}

#[tokio::test]
async fn test_write_session_enforcement() {
    let h = harness_with(true);
    let record = json!({"date": "2024/5/4", "store": "千葉", "staff": "yui"});

    let rejected = post(
        &h.app,
        "/exec",
        json!({"action": "add-sales-record", "record": record}).to_string(),
    )
    .await;
    assert_eq!(rejected["code"], ErrorCode::SessionInvalid.code());

    // Nothing configured: any password opens a session
    let login = get(&h.app, "/exec?action=verify-password&pageType=staff&store=chiba&staff=yui").await;
    let token = login["token"].as_str().unwrap();

    let accepted = post(
        &h.app,
        "/exec",
        json!({"action": "add-sales-record", "record": record, "token": token}).to_string(),
    )
    .await;
    assert_eq!(accepted["status"], "success");

    let admin_only = post(
        &h.app,
        "/exec",
        json!({"action": "save-goals", "goals": {}, "token": token}).to_string(),
    )
    .await;
    assert_eq!(admin_only["status"], "error");
    assert_eq!(admin_only["code"], ErrorCode::PermissionDenied.code());
}

async fn write(app: &Router, body: Value) -> Value {
    let response = post(app, "/exec", body.to_string()).await;
    assert_eq!(response["status"], "success", "{response}");
    response
}

#[tokio::test]
async fn test_update_sales_rows_refreshes_sales_and_all() {
    let h = harness();
    assert_eq!(get(&h.app, "/exec?action=list-sales").await[1]["sales"]["cash"], 500);
    assert_eq!(get(&h.app, "/exec?action=get-all").await["sales"][1]["sales"]["cash"], 500);

    write(
        &h.app,
        json!({"action": "update-sales-rows", "rows": [{"id": 2, "sales": {"cash": 900}}]}),
    )
    .await;

    assert_eq!(get(&h.app, "/exec?action=list-sales").await[1]["sales"]["cash"], 900);
    assert_eq!(get(&h.app, "/exec?action=get-all").await["sales"][1]["sales"]["cash"], 900);
}

#[tokio::test]
async fn test_add_sales_record_refreshes_all() {
    let h = harness();
    assert_eq!(get(&h.app, "/exec?action=get-all").await["sales"].as_array().unwrap().len(), 2);

    write(
        &h.app,
        json!({"action": "add-sales-record", "record": {"date": "2024/5/4", "store": "柏", "staff": "ken"}}),
    )
    .await;

    assert_eq!(get(&h.app, "/exec?action=get-all").await["sales"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_save_goals_refreshes_goals_and_all() {
    let h = harness();
    assert_eq!(get(&h.app, "/exec?action=load-goals").await["goals"], json!({}));
    assert_eq!(get(&h.app, "/exec?action=get-all").await["salaries"], json!({}));

    write(
        &h.app,
        json!({"action": "save-goals", "goals": {"kashiwa": 3}, "salaries": {"ken": 2}}),
    )
    .await;

    assert_eq!(get(&h.app, "/exec?action=load-goals").await["goals"]["kashiwa"], 3);
    let all = get(&h.app, "/exec?action=get-all").await;
    assert_eq!(all["goals"]["kashiwa"], 3);
    assert_eq!(all["salaries"]["ken"], 2);
}

#[tokio::test]
async fn test_save_settings_refreshes_settings_and_all() {
    let h = harness();
    assert_eq!(get(&h.app, "/exec?action=load-settings").await["settings"], json!({}));
    assert_eq!(get(&h.app, "/exec?action=get-all").await["staff"], json!({}));

    write(
        &h.app,
        json!({"action": "save-settings", "settings": {"openHour": 10}, "staff": ["ken"]}),
    )
    .await;

    let settings = get(&h.app, "/exec?action=load-settings").await;
    assert_eq!(settings["settings"]["openHour"], 10);
    assert_eq!(settings["staff"], json!(["ken"]));
    let all = get(&h.app, "/exec?action=get-all").await;
    assert_eq!(all["settings"]["openHour"], 10);
    assert_eq!(all["staff"], json!(["ken"]));
}

#[tokio::test]
async fn test_save_passwords_refreshes_password_view() {
    let h = harness();
    assert_eq!(get(&h.app, "/exec?action=load-passwords").await["passwords"]["admin"], "");

    write(&h.app, json!({"action": "save-passwords", "passwords": {"admin": "root-pass"}})).await;

    assert_eq!(
        get(&h.app, "/exec?action=load-passwords").await["passwords"]["admin"],
        "********"
    );
}

#[tokio::test]
async fn test_clear_cache_drops_every_cached_read() {
    let h = harness();
    get(&h.app, "/exec?action=list-sales").await;
    get(&h.app, "/exec?action=list-customers").await;

    h.source
        .append_row("売上", row(&["2024/5/3", "船橋", "aoi", "10"]))
        .unwrap();
    h.source.append_row("問診票_船橋", row(&["2024/5/3", "高橋"])).unwrap();

    let cleared = write(&h.app, json!({"action": "clear-cache"})).await;
    assert_eq!(cleared["cleared"], 2);

    assert_eq!(get(&h.app, "/exec?action=list-sales").await.as_array().unwrap().len(), 3);
    let customers = get(&h.app, "/exec?action=list-customers").await;
    assert!(customers.as_array().unwrap().iter().any(|c| c["name"] == "高橋"));
}
