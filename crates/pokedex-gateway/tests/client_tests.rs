// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use pokedex_app::TypeKind;
use pokedex_gateway::{Client, INSIGHT_FALLBACK};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

#[test]
fn list_error_contains_actionable_remediation() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .list(30, 0)
        .expect_err("list should fail for unreachable gateway");
    assert!(error.to_string().contains("gateway.base_url"));
}

#[test]
fn list_decodes_bare_and_enveloped_pages() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/pokemon?limit=2&offset=0");
        request
            .respond(json_response(
                r#"[{"name":"bulbasaur","url":"u1"},{"name":"ivysaur","url":"u2"}]"#,
                200,
            ))
            .expect("response should succeed");

        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/pokemon?limit=1&offset=2");
        request
            .respond(json_response(
                r#"{"count":151,"results":[{"name":"venusaur","url":"u3"}]}"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let first = client.list(2, 0)?;
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].name, "bulbasaur");

    let second = client.list(1, 2)?;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].name, "venusaur");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn details_lowercases_the_key_and_normalizes_the_record() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/pokemon/pikachu/details");
        request
            .respond(json_response(
                r#"{
                    "id": 25,
                    "name": "pikachu",
                    "height": 4,
                    "weight": 60,
                    "base_experience": 112,
                    "abilities": [{"ability": {"name": "static"}, "is_hidden": false, "slot": 1}],
                    "stats": [{"base_stat": 35, "stat": {"name": "hp"}}],
                    "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
                    "sprites": {"other": {"official-artwork": {"front_default": "https://img/25.png"}}}
                }"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let pokemon = client.details(" Pikachu ")?;
    assert_eq!(pokemon.id, 25);
    assert_eq!(pokemon.main_type(), Some(TypeKind::Electric));
    assert_eq!(pokemon.stats.hp, 35);
    assert_eq!(pokemon.artwork_url, "https://img/25.png");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn details_surfaces_the_gateway_error_envelope() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"error":"pokemon not found"}"#, 404))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .details("missingno")
        .expect_err("missing record should fail");
    assert!(error.to_string().contains("pokemon not found"));
    assert!(error.to_string().contains("404"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn insight_returns_the_text_field() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/pokemon/pikachu/insight");
        request
            .respond(json_response(
                r#"{"text":"Um Pokémon elétrico muito esperto."}"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    assert_eq!(
        client.insight("Pikachu"),
        "Um Pokémon elétrico muito esperto."
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn insight_degrades_to_the_fallback_line() -> Result<()> {
    // Unreachable gateway.
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))?;
    assert_eq!(client.insight("pikachu"), INSIGHT_FALLBACK);

    // Server error.
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"error":"model overloaded"}"#, 503))
            .expect("response should succeed");
    });
    let client = Client::new(&addr, Duration::from_secs(1))?;
    assert_eq!(client.insight("pikachu"), INSIGHT_FALLBACK);
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn ping_issues_a_single_record_probe() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/pokemon?limit=1&offset=0");
        request
            .respond(json_response(r#"[{"name":"bulbasaur","url":"u1"}]"#, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    client.ping()?;

    handle.join().expect("server thread should join");
    Ok(())
}
