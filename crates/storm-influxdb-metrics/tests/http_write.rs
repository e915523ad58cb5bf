// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP write path against a one-shot local responder.
//!
//! Each test binds an ephemeral port, accepts a single request, records it
//! verbatim and answers with a canned response.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use serde_json::json;
use storm_influxdb_metrics::{
    Batch, BatchWriter, ClientError, Connector, ConsumerError, DataPoint, HttpConnector,
    InfluxConfig, MetricValue, MetricsConsumer, OriginTags, Secret, Settings, TaskInfo,
    TopologyContext,
};

const NO_CONTENT: &str = "HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// `storm:s3cr3t`, base64 encoded.
const BASIC_AUTH: &str = "Basic c3Rvcm06czNjcjN0";

fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("local addr"));
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let request = read_request(&mut stream);
        stream.write_all(response.as_bytes()).expect("respond");
        request
    });
    (url, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).expect("read");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let body_len = header(&text[..end], "content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8(buf).expect("utf-8 request")
}

fn header(request: &str, name: &str) -> Option<String> {
    request.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case(name).then(|| value.trim().to_string())
    })
}

fn body(request: &str) -> &str {
    request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or("")
}

fn no_errors(e: &dyn std::error::Error) {
    panic!("unexpected error reported: {}", e);
}

fn config(url: &str) -> InfluxConfig {
    InfluxConfig {
        url: Some(url.to_string()),
        username: Some("storm".to_string()),
        password: Some(Secret::new("s3cr3t")),
        database: Some("metrics".to_string()),
        ..InfluxConfig::default()
    }
}

fn origin() -> OriginTags {
    OriginTags {
        worker_host: "h1".to_string(),
        worker_port: 9001,
        component_id: "bolt1".to_string(),
        task_id: 7,
        topology: Some("topo".to_string()),
    }
}

#[test]
fn test_write_posts_line_protocol() {
    let (url, server) = serve_once(NO_CONTENT);
    let writer = HttpConnector::new().connect(&config(&url)).expect("connect");

    let mut batch = Batch::new(Some("metrics".to_string()), origin(), Some(1_700_000_000));
    batch.record("latency", &MetricValue::from(json!({"a": 1, "b": {"c": 2.5}})), "");
    writer.write(&batch).expect("write");

    let request = server.join().expect("server thread");
    assert!(
        request.starts_with("POST /write?db=metrics&precision=s HTTP/1.1\r\n"),
        "unexpected request line: {}",
        request.lines().next().unwrap_or("")
    );
    assert_eq!(header(&request, "authorization").as_deref(), Some(BASIC_AUTH));
    assert_eq!(
        header(&request, "content-type").as_deref(),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(
        body(&request),
        "latency.a,componentId=bolt1,taskId=7,topology=topo,worker=h1,workerPort=9001 value=1i 1700000000\n\
         latency.b.c,componentId=bolt1,taskId=7,topology=topo,worker=h1,workerPort=9001 value=2.5 1700000000"
    );
}

#[test]
fn test_write_maps_rejection_to_error() {
    let (url, server) = serve_once(
        "HTTP/1.1 401 Unauthorized\r\nContent-Length: 32\r\nConnection: close\r\n\r\n{\"error\":\"authorization failed\"}",
    );
    let writer = HttpConnector::new().connect(&config(&url)).expect("connect");

    let mut batch = Batch::new(Some("metrics".to_string()), origin(), None);
    batch.record("cpu", &MetricValue::Float(0.42), "");

    match writer.write(&batch) {
        Err(ClientError::Rejected { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "{\"error\":\"authorization failed\"}");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
    server.join().expect("server thread");
}

#[test]
fn test_write_connection_refused_is_http_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };
    let writer = HttpConnector::new()
        .connect(&config(&format!("http://127.0.0.1:{}", port)))
        .expect("connect");

    let mut batch = Batch::new(Some("metrics".to_string()), origin(), None);
    batch.record("cpu", &MetricValue::Integer(1), "");

    assert!(matches!(writer.write(&batch), Err(ClientError::Http(_))));
}

#[test]
fn test_consumer_over_http_end_to_end() {
    let (url, server) = serve_once(NO_CONTENT);
    let conf: Settings = [
        ("topology.name", json!("topo")),
        ("metrics.influxdb.url", json!(url)),
        ("metrics.influxdb.username", json!("storm")),
        ("metrics.influxdb.password", json!("s3cr3t")),
        ("metrics.influxdb.db", json!("metrics")),
    ]
    .into_iter()
    .collect();

    let mut consumer = MetricsConsumer::new();
    consumer
        .prepare(&conf, None, &TopologyContext::default(), &no_errors)
        .expect("prepare");

    let task = TaskInfo {
        src_worker_host: "h1".to_string(),
        src_worker_port: 9001,
        src_component_id: "bolt1".to_string(),
        src_task_id: 7,
        timestamp_secs: 1_700_000_000,
        update_interval_secs: 60,
    };
    let written = consumer
        .handle_data_points(&task, &[DataPoint::new("cpu", 0.42)])
        .expect("deliver");
    assert_eq!(written, 1);

    let request = server.join().expect("server thread");
    assert_eq!(
        body(&request),
        "cpu,componentId=bolt1,taskId=7,topology=topo,worker=h1,workerPort=9001 value=0.42 1700000000"
    );

    consumer.cleanup();
    assert!(matches!(
        consumer.handle_data_points(&task, &[]),
        Err(ConsumerError::Closed)
    ));
}
