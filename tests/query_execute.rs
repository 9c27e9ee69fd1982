use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use warehouse_middleware::prelude::*;
use warehouse_middleware::test_utils::{MockTransport, ScriptedResult};

fn client_over(transport: &Arc<MockTransport>) -> WarehouseClient {
    let config = WarehouseConfig::new(ConnectOptions::parse("account:test,user:loader"));
    WarehouseClient::new(transport.clone(), config).unwrap()
}

#[tokio::test]
async fn query_normalizes_names_and_timestamps() {
    let transport = Arc::new(MockTransport::new());
    transport.push(ScriptedResult::Rows(vec![
        vec![
            ("EVENT_ID".to_string(), WireValue::Int(1)),
            (
                "INS_TS".to_string(),
                WireValue::Timestamp("2021-08-06T16:00:00Z".to_string()),
            ),
        ],
        vec![
            ("EVENT_ID".to_string(), WireValue::Int(2)),
            (
                "INS_TS".to_string(),
                WireValue::Timestamp("2021-08-06 17:30:00".to_string()),
            ),
        ],
    ]));
    let client = client_over(&transport);

    let result = client.query("SELECT * FROM events", &Params::None).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.get_column_names().unwrap(),
        ["event_id".to_string(), "ins_ts".to_string()]
    );
    let expected =
        NaiveDateTime::parse_from_str("2021-08-06 16:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    assert_eq!(
        result.results[0].get("ins_ts"),
        Some(&RowValue::Timestamp(expected))
    );
    assert_eq!(result.results[1].get("event_id"), Some(&RowValue::Int(2)));
}

#[tokio::test]
async fn named_params_are_rewritten_before_submission() {
    let transport = Arc::new(MockTransport::new());
    let client = client_over(&transport);

    client
        .query(
            "SELECT * FROM t WHERE id = :id AND name = :name",
            &Params::named(vec![
                ("id".to_string(), RowValue::Int(7)),
                ("name".to_string(), RowValue::Text("x".into())),
            ]),
        )
        .await
        .unwrap();

    let submitted = transport.statements();
    assert_eq!(submitted[0].sql, "SELECT * FROM t WHERE id = :1 AND name = :2");
    assert_eq!(
        submitted[0].binds,
        vec![RowValue::Int(7), RowValue::Text("x".into())]
    );
}

#[tokio::test]
async fn stream_failure_fails_the_whole_query() {
    let transport = Arc::new(MockTransport::new());
    transport.push(ScriptedResult::RowsThenError(
        vec![vec![("id".to_string(), WireValue::Int(1))]],
        "connection reset".to_string(),
    ));
    let client = client_over(&transport);

    let err = client.query("SELECT * FROM t", &Params::None).await.unwrap_err();
    assert!(matches!(err, WarehouseDbError::StreamError(_)));
}

#[tokio::test]
async fn submission_failure_carries_sql_and_params() {
    let transport = Arc::new(MockTransport::new());
    transport.push(ScriptedResult::SubmitError("syntax error".to_string()));
    let client = client_over(&transport);

    let err = client
        .query(
            "SELECT * FROM nope WHERE id = :1",
            &Params::positional(vec![RowValue::Int(3)]),
        )
        .await
        .unwrap_err();

    let rendered = err.to_string();
    assert!(matches!(err, WarehouseDbError::SubmissionError { .. }));
    assert!(rendered.contains("syntax error"));
    assert!(rendered.contains("QUERY: SELECT * FROM nope WHERE id = :1"));
    assert!(rendered.contains("PARAMS: [Int(3)]"));
}

#[tokio::test(start_paused = true)]
async fn execute_polls_until_status_is_terminal() {
    let transport = Arc::new(MockTransport::new());
    transport.push(ScriptedResult::Statuses(vec![
        StatementStatus::Fetching,
        StatementStatus::Fetching,
        StatementStatus::Complete,
    ]));
    let client = client_over(&transport);

    let started = tokio::time::Instant::now();
    client
        .execute("DELETE FROM events", &Params::None)
        .await
        .unwrap();

    assert_eq!(transport.status_read_count(), 3);
    // Two Fetching reads mean at least two poll-interval sleeps.
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn execute_timeout_turns_a_stuck_poll_into_an_error() {
    let transport = Arc::new(MockTransport::new());
    transport.push(ScriptedResult::Statuses(vec![StatementStatus::Fetching]));
    let config = WarehouseConfig::new(ConnectOptions::parse("account:test"))
        .with_execute_timeout(Some(Duration::from_millis(250)));
    let client = WarehouseClient::new(transport.clone(), config).unwrap();

    let err = client
        .execute("DELETE FROM events", &Params::None)
        .await
        .unwrap_err();
    assert!(matches!(err, WarehouseDbError::ExecutionError(_)));
}

#[tokio::test]
async fn aborted_status_ends_the_poll_loop() {
    let transport = Arc::new(MockTransport::new());
    transport.push(ScriptedResult::Statuses(vec![StatementStatus::Aborted]));
    let client = client_over(&transport);

    client
        .execute("DELETE FROM events", &Params::None)
        .await
        .unwrap();
    assert_eq!(transport.status_read_count(), 1);
}

#[tokio::test]
async fn stage_builds_the_put_command() {
    let transport = Arc::new(MockTransport::new());
    let client = client_over(&transport);

    client.stage("load_stage", "/tmp/data.csv").await.unwrap();

    let submitted = transport.statements();
    assert_eq!(
        submitted[0].sql,
        "PUT file:///tmp/data.csv @load_stage AUTO_COMPRESS=TRUE"
    );
    assert!(submitted[0].binds.is_empty());
}

#[tokio::test]
async fn load_status_rows_decode_through_normalization() {
    let transport = Arc::new(MockTransport::new());
    transport.push(ScriptedResult::Rows(vec![vec![
        ("FILE".to_string(), WireValue::Text("data.csv.gz".into())),
        ("STATUS".to_string(), WireValue::Text("LOADED".into())),
        ("ROWS_PARSED".to_string(), WireValue::Int(100)),
        ("ROWS_LOADED".to_string(), WireValue::Int(99)),
        ("ERROR_LIMIT".to_string(), WireValue::Int(1)),
        ("ERRORS_SEEN".to_string(), WireValue::Int(1)),
        ("COMMAND".to_string(), WireValue::Text("COPY".into())),
    ]]));
    let client = client_over(&transport);

    let result = client
        .query("COPY INTO events FROM @load_stage", &Params::None)
        .await
        .unwrap();
    let load = LoadResult::from_row(&result.results[0]).unwrap();

    assert_eq!(load.file, "data.csv.gz");
    assert_eq!(load.rows_loaded, 99);
    assert_eq!(load.errors_seen, 1);
}
