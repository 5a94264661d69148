//! End-to-end tests for the logging façade.
//!
//! Each test builds a logger writing into memory and inspects the JSON lines
//! it produced: member order, correlation members, masking of payloads and
//! the compacted stack trace.

mod common;

use std::{collections::BTreeMap, io, sync::Arc};

use common::{capture, keys};
use logmask::{JsonBytes, Logger, Masked, MaskingMode, MetadataCache, MsgType, NO_DATA};
use serde_json::json;

#[derive(Masked)]
struct Credentials {
    #[masked(partial)]
    email: String,
    #[masked(full)]
    password: String,
}

fn credentials() -> Credentials {
    Credentials {
        email: "john.doe@example.com".into(),
        password: "supersecret".into(),
    }
}

#[derive(Masked)]
struct Untagged {
    api_key: String,
    region: String,
}

// =============================================================================
// Record layout
// =============================================================================

#[test]
fn info_record_layout() {
    let (logger, sink) = capture(Logger::builder().service_name("auth"));
    logger.info("trace-1", "login", MsgType::Request, "login attempt", &credentials());

    let record = sink.single();
    assert_eq!(
        keys(&record),
        [
            "level",
            "time",
            "source",
            "msg",
            "application_name",
            "trace_id",
            "module",
            "msg_type",
            "severity",
            "data",
        ]
    );
    assert_eq!(record["level"], "info");
    assert_eq!(record["msg"], "login attempt");
    assert_eq!(record["application_name"], "auth");
    assert_eq!(record["trace_id"], "trace-1");
    assert_eq!(record["module"], "login");
    assert_eq!(record["msg_type"], "REQUEST");
    assert_eq!(record["severity"], "INFO");
}

#[test]
fn time_is_rfc3339_utc_seconds() {
    let (logger, sink) = capture(Logger::builder());
    logger.info("t", "m", MsgType::Event, "tick", NO_DATA);

    let record = sink.single();
    let time = record["time"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok(), "{time}");
    assert!(time.ends_with('Z'));
    assert!(!time.contains('.'));
}

#[test]
fn warning_has_no_msg_type() {
    let (logger, sink) = capture(Logger::builder());
    logger.warning("trace-2", "cache", "cache miss", &json!({ "key": "user:1" }));

    let record = sink.single();
    assert_eq!(
        &keys(&record)[5..],
        ["trace_id", "module", "severity", "data"]
    );
    assert_eq!(record["level"], "warn");
    assert_eq!(record["severity"], "WARNING");
    assert_eq!(record["data"], json!({ "key": "user:1" }));
}

#[test]
fn error_record_carries_error_and_compact_stack_trace() {
    let (logger, sink) = capture(Logger::builder());
    let err = io::Error::new(io::ErrorKind::Other, "connection refused");
    logger.error("trace-3", "db", &err);

    let text = sink.text();
    assert_eq!(text.lines().count(), 1);

    let record = sink.single();
    assert_eq!(
        &keys(&record)[5..],
        ["trace_id", "module", "error", "severity", "stack_trace"]
    );
    assert_eq!(record["msg"], "error occurred");
    assert_eq!(record["error"], "connection refused");
    assert_eq!(record["severity"], "ERROR");

    let trace = record["stack_trace"].as_str().unwrap();
    assert!(trace.starts_with('['), "{trace}");
    assert!(trace.ends_with(']'), "{trace}");
    assert!(!trace.contains('\n'));
}

#[test]
fn stack_trace_level_is_configurable() {
    let (logger, sink) = capture(Logger::builder().stacktrace_level("fatal"));
    logger.error("t", "m", &io::Error::new(io::ErrorKind::Other, "boom"));
    assert!(sink.single().get("stack_trace").is_none());

    let (logger, sink) = capture(Logger::builder().stacktrace_level("warn"));
    logger.warning("t", "m", "slow", NO_DATA);
    assert!(sink.single()["stack_trace"].is_string());
}

#[derive(Masked)]
struct Crash {
    stack_trace: String,
}

#[test]
fn payload_member_named_stack_trace_is_left_alone() {
    let (logger, sink) = capture(Logger::builder().stacktrace_level("info"));
    let crash = Crash {
        stack_trace: "reported\nby client".into(),
    };
    logger.info("t", "m", MsgType::Event, "crash report", &crash);

    let record = sink.single();
    assert_eq!(record["data"]["stack_trace"], "reported\nby client");
    let trace = record["stack_trace"].as_str().unwrap();
    assert!(trace.starts_with('[') && trace.ends_with(']'), "{trace}");
}

#[test]
fn deeply_nested_json_payload_is_withheld() {
    let (logger, sink) = capture(Logger::builder());
    let body = format!(
        "{}{}{}",
        r#"{"x":"#.repeat(130),
        r#"{"password":"hunter22secret"}"#,
        "}".repeat(130)
    );
    logger.info("t", "m", MsgType::Request, "body", &body);

    assert!(!sink.text().contains("hunter22secret"));
    assert_eq!(sink.single()["data"], "****");
}

#[test]
fn source_points_at_the_caller() {
    let (logger, sink) = capture(Logger::builder());
    let line = line!() + 1;
    logger.info("t", "m", MsgType::Event, "here", NO_DATA);

    let record = sink.single();
    let source = record["source"].as_str().unwrap();
    assert!(
        source.ends_with(&format!("integration_logger.rs:{line}")),
        "{source}"
    );
    assert_eq!(source.matches('/').count(), 1, "{source}");
}

#[test]
fn no_data_omits_the_member() {
    let (logger, sink) = capture(Logger::builder());
    logger.info("t", "m", MsgType::Out, "sent", NO_DATA);
    logger.info("t", "m", MsgType::Out, "sent", &None::<String>);

    for record in sink.records() {
        assert!(record.get("data").is_none());
    }
}

// =============================================================================
// Masking
// =============================================================================

#[test]
fn tagged_struct_is_masked() {
    let (logger, sink) = capture(Logger::builder());
    logger.info("t", "auth", MsgType::In, "login", &credentials());

    assert_eq!(
        sink.single()["data"],
        json!({ "email": "jo****om", "password": "****" })
    );
}

#[test]
fn plaintext_never_reaches_the_sink() {
    let (logger, sink) = capture(Logger::builder().masking_mode(MaskingMode::Both));
    logger.info("t", "m", MsgType::In, "struct", &credentials());
    logger.debug("t", "m", MsgType::In, "hidden by level", &credentials());
    logger.warning(
        "t",
        "m",
        "json text",
        &r#"{"password":"supersecret","nested":{"token":"supersecret"}}"#,
    );

    let text = sink.text();
    assert_eq!(text.lines().count(), 2);
    assert!(!text.contains("supersecret"));
}

#[test]
fn json_text_payload_is_masked_by_key() {
    let (logger, sink) = capture(Logger::builder());
    logger.info(
        "t",
        "m",
        MsgType::Request,
        "body",
        &r#"{"username":"johndoe123","password":"secret123"}"#,
    );

    assert_eq!(
        sink.single()["data"],
        r#"{"username":"jo****23","password":"****"}"#
    );
}

#[test]
fn json_bytes_payload_is_masked_by_key() {
    let (logger, sink) = capture(Logger::builder());
    let body = br#"{"token":"abc.def","id":7}"#;
    logger.info("t", "m", MsgType::Response, "body", &JsonBytes(body));

    assert_eq!(sink.single()["data"], r#"{"token":"****","id":7}"#);
}

#[test]
fn malformed_json_text_is_logged_verbatim() {
    let (logger, sink) = capture(Logger::builder());
    logger.info("t", "m", MsgType::Request, "body", &"{invalid");

    assert_eq!(sink.single()["data"], "{invalid");
}

#[test]
fn heuristic_mode_masks_by_name() {
    let (logger, sink) = capture(Logger::builder().masking_mode(MaskingMode::HeuristicDriven));
    let untagged = Untagged {
        api_key: "ak_live_123456".into(),
        region: "eu-west-1".into(),
    };
    logger.info("t", "m", MsgType::Event, "untagged", &untagged);

    let mut params = BTreeMap::new();
    params.insert("password", "hunter22");
    params.insert("page", "3");
    logger.info("t", "m", MsgType::Event, "map", &params);

    let records = sink.records();
    assert_eq!(
        records[0]["data"],
        json!({ "api_key": "ak****56", "region": "eu-west-1" })
    );
    assert_eq!(records[1]["data"], json!({ "page": "3", "password": "****" }));
}

#[test]
fn tag_driven_mode_ignores_names() {
    let (logger, sink) = capture(Logger::builder());
    let untagged = Untagged {
        api_key: "ak_live_123456".into(),
        region: "eu-west-1".into(),
    };
    logger.info("t", "m", MsgType::Event, "untagged", &untagged);

    assert_eq!(sink.single()["data"]["api_key"], "ak_live_123456");
}

#[test]
fn disabled_masking_logs_plaintext() {
    let (logger, sink) = capture(Logger::builder().masking(false));
    logger.info("t", "m", MsgType::In, "struct", &credentials());
    logger.info("t", "m", MsgType::In, "text", &r#"{"password":"x"}"#);

    let records = sink.records();
    assert_eq!(records[0]["data"]["password"], "supersecret");
    assert_eq!(records[1]["data"], r#"{"password":"x"}"#);
}

#[test]
fn email_aware_partial_masking() {
    let (logger, sink) = capture(Logger::builder().email_aware(true));
    logger.info("t", "m", MsgType::In, "login", &credentials());

    assert_eq!(sink.single()["data"]["email"], "jo******@example.com");
}

// =============================================================================
// Levels, clones and caches
// =============================================================================

#[test]
fn records_below_the_level_are_dropped() {
    let (logger, sink) = capture(Logger::builder().level("warn"));
    logger.debug("t", "m", MsgType::Event, "debug", NO_DATA);
    logger.info("t", "m", MsgType::Event, "info", NO_DATA);
    logger.warning("t", "m", "warning", NO_DATA);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["msg"], "warning");
}

#[test]
fn debug_switch_enables_debug_records() {
    let (logger, sink) = capture(Logger::builder().debug(true));
    logger.debug("t", "m", MsgType::Event, "verbose", NO_DATA);

    let record = sink.single();
    assert_eq!(record["level"], "debug");
    assert_eq!(record["severity"], "DEBUG");
}

#[test]
fn invalid_level_is_rejected() {
    let result = Logger::builder().level("loud").output(io::sink()).build();
    assert!(matches!(result, Err(logmask::Error::InvalidLevel(level)) if level == "loud"));
}

#[test]
fn clones_share_the_output() {
    let (logger, sink) = capture(Logger::builder());
    let clone = logger.clone();
    logger.info("t", "m", MsgType::Event, "first", NO_DATA);
    clone.info("t", "m", MsgType::Event, "second", NO_DATA);

    assert_eq!(sink.records().len(), 2);
    assert!(logger.sync().is_ok());
}

#[test]
fn dedicated_metadata_cache_is_used() {
    let cache = Arc::new(MetadataCache::new());
    let (logger, _sink) = capture(Logger::builder().metadata_cache(Arc::clone(&cache)));
    assert!(!cache.contains::<Credentials>());

    logger.info("t", "m", MsgType::In, "login", &credentials());
    assert!(cache.contains::<Credentials>());
    assert_eq!(cache.len(), 1);
}

#[test]
fn plain_slog_records_share_the_drain() {
    let (logger, sink) = capture(Logger::builder().service_name("svc"));
    slog::info!(logger.slog(), "plain record"; "attempt" => 2);

    let record = sink.single();
    assert_eq!(record["msg"], "plain record");
    assert_eq!(record["application_name"], "svc");
    assert_eq!(record["attempt"], 2);
}
