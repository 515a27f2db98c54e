// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tabula_app::{ColumnName, GatewayError, RowId, TableGateway, TableName};
use tabula_client::Client;
use tiny_http::{Header, Response, Server};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn spawn_server() -> Result<(Server, String)> {
    let server = Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    Ok((server, addr))
}

#[test]
fn unreachable_backend_resolves_to_transport_error() -> Result<()> {
    let mut client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))?;
    let error = client
        .list_tables()
        .expect_err("listing should fail for unreachable endpoint");
    assert!(matches!(error, GatewayError::Transport(_)));
    Ok(())
}

#[test]
fn list_tables_decodes_backend_listing() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/tables");
        request
            .respond(json_response(r#"{"tables":["users","orders"]}"#, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let tables = client.list_tables()?;
    assert_eq!(
        tables,
        vec![TableName::new("users"), TableName::new("orders")]
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fetch_table_renders_rows_in_schema_order() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/table/users");
        let body = r#"{
            "schema": ["id", "name", "age"],
            "rows": [
                {"rowid": 1, "id": 1, "name": "Ann", "age": 34},
                {"rowid": 2, "id": 2, "name": "Bea", "age": null}
            ]
        }"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let snapshot = client.fetch_table(&TableName::new("users"))?;

    let schema: Vec<&str> = snapshot.schema.iter().map(ColumnName::as_str).collect();
    assert_eq!(schema, vec!["id", "name", "age"]);
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[0].rowid, RowId::new(1));
    assert_eq!(snapshot.rows[0].cells, vec!["1", "Ann", "34"]);
    // Nulls display as empty cells.
    assert_eq!(snapshot.rows[1].cells, vec!["2", "Bea", ""]);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fetch_table_without_rowid_is_a_decode_error() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(
                r#"{"schema":["id"],"rows":[{"id":1}]}"#,
                200,
            ))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .fetch_table(&TableName::new("users"))
        .expect_err("missing rowid should fail decoding");
    assert!(matches!(error, GatewayError::Decode(ref message) if message.contains("rowid")));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fetch_table_with_malformed_body_is_a_decode_error() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response("not json at all", 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .fetch_table(&TableName::new("users"))
        .expect_err("malformed body should fail decoding");
    assert!(matches!(error, GatewayError::Decode(_)));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fetch_missing_table_maps_404_to_not_found() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"detail":"Table 'ghost' not found"}"#, 404))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .fetch_table(&TableName::new("ghost"))
        .expect_err("missing table should fail");
    assert!(
        matches!(error, GatewayError::NotFound(ref detail) if detail.contains("ghost")),
        "unexpected error: {error}"
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn delete_row_posts_row_id_payload() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/table/users/delete_row");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("readable body");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(parsed, serde_json::json!({ "row_id": 1 }));

        request
            .respond(json_response(r#"{"status":"success"}"#, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.delete_row(&TableName::new("users"), RowId::new(1))?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_row_posts_row_id_and_updated_values() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/table/users/update_row");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("readable body");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(
            parsed,
            serde_json::json!({
                "row_id": 1,
                "updated_values": { "name": "Annie" },
            })
        );

        request
            .respond(json_response(r#"{"status":"success"}"#, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.update_row(
        &TableName::new("users"),
        RowId::new(1),
        &[(ColumnName::new("name"), "Annie".to_owned())],
    )?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn rename_column_posts_old_and_new_names() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/table/users/update_column");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("readable body");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(
            parsed,
            serde_json::json!({
                "old_column_name": "name",
                "new_column_name": "full_name",
            })
        );

        request
            .respond(json_response(r#"{"status":"success"}"#, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.rename_column(
        &TableName::new("users"),
        &ColumnName::new("name"),
        &ColumnName::new("full_name"),
    )?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn duplicate_column_maps_409_to_conflict() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/table/users/add_column");
        request
            .respond(json_response(
                r#"{"detail":"duplicate column name: email"}"#,
                409,
            ))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .add_column(&TableName::new("users"), &ColumnName::new("email"))
        .expect_err("duplicate column should fail");
    assert!(
        matches!(error, GatewayError::Conflict(ref detail) if detail.contains("email")),
        "unexpected error: {error}"
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn refused_insert_maps_500_to_rejected_with_detail() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/table/users/add_row");
        request
            .respond(json_response(
                r#"{"detail":"table users has no column named color"}"#,
                500,
            ))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .add_row(
            &TableName::new("users"),
            &[(ColumnName::new("color"), "teal".to_owned())],
        )
        .expect_err("refused insert should fail");
    assert!(
        matches!(error, GatewayError::Rejected(ref detail) if detail.contains("color")),
        "unexpected error: {error}"
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn table_names_are_encoded_into_the_path() -> Result<()> {
    let (server, addr) = spawn_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/table/order%20items");
        request
            .respond(json_response(r#"{"schema":[],"rows":[]}"#, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let snapshot = client.fetch_table(&TableName::new("order items"))?;
    assert!(snapshot.schema.is_empty());
    assert!(snapshot.rows.is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}
