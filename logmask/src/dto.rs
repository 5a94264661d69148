//! Standard payload shapes for common interactions.
//!
//! These are plain containers; they carry no masking tags of their own.
//! Bodies and payloads are walked like any other JSON value, so their keys are
//! classified when the logger runs in a heuristic mode. Header maps are logged
//! as given; pass them through [`mask_headers`](crate::mask_headers) first to
//! obscure credentials.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::Masked;

/// An HTTP request or response.
///
/// ```
/// use logmask::{HttpData, Logger, MsgType};
///
/// let logger = Logger::builder().output(std::io::sink()).build().unwrap();
/// let data = HttpData {
///     method: "POST".into(),
///     url: "https://example.com/api/v1/users".into(),
///     status_code: 201,
///     client_ip: "192.168.1.1".into(),
///     ..HttpData::default()
/// };
/// logger.info("trace-001", "http", MsgType::Request, "request completed", &data);
/// ```
#[derive(Masked, Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct HttpData {
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub headers: HashMap<String, Vec<String>>,
    pub body: Option<JsonValue>,
    /// Human-readable, e.g. `"45ms"`.
    pub duration: String,
    pub client_ip: String,
}

/// A database or cache operation.
#[derive(Masked, Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct DbData {
    pub driver: String,
    pub operation: String,
    pub database: String,
    pub table: String,
    pub statement: String,
    pub duration: String,
    pub payload: Option<JsonValue>,
}

/// A message queue interaction (Kafka, RabbitMQ, NATS and the like).
#[derive(Masked, Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct MqData {
    pub driver: String,
    pub operation: String,
    pub topic: String,
    pub group: String,
    pub message_id: String,
    pub payload: Option<JsonValue>,
}

/// Anything that fits none of the other shapes, e.g. a third-party API call.
#[derive(Masked, Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct GenericData {
    pub service: String,
    pub action: String,
    pub payload: Option<JsonValue>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::{DbData, GenericData, HttpData, MqData};
    use crate::{mask_headers, mask_value, MaskingMode};

    #[test]
    fn http_data_logs_every_member() {
        let data = HttpData {
            method: "GET".into(),
            url: "/health".into(),
            status_code: 200,
            duration: "3ms".into(),
            ..HttpData::default()
        };
        let masked = mask_value(&data, MaskingMode::TagDriven).unwrap();
        assert_eq!(
            masked,
            json!({
                "method": "GET",
                "url": "/health",
                "status_code": 200,
                "headers": {},
                "body": null,
                "duration": "3ms",
                "client_ip": "",
            })
        );
    }

    #[test]
    fn masked_headers_can_be_attached() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_owned(), vec!["Bearer abc.def".to_owned()]);
        let data = HttpData {
            headers: mask_headers(&headers),
            ..HttpData::default()
        };
        let masked = mask_value(&data, MaskingMode::TagDriven).unwrap();
        assert_eq!(masked["headers"]["Authorization"], json!(["****"]));
    }

    #[test]
    fn payload_keys_follow_the_mode() {
        let data = GenericData {
            service: "Stripe".into(),
            action: "Charge".into(),
            payload: Some(json!({ "amount": 100, "card_token": "tok_123456" })),
        };

        let tagged = mask_value(&data, MaskingMode::TagDriven).unwrap();
        assert_eq!(tagged["payload"]["card_token"], "tok_123456");

        let heuristic = mask_value(&data, MaskingMode::HeuristicDriven).unwrap();
        assert_eq!(heuristic["payload"]["card_token"], "****");
        assert_eq!(heuristic["payload"]["amount"], 100);
    }

    #[test]
    fn db_and_mq_data_serialize_like_they_log() {
        let db = DbData {
            driver: "postgres".into(),
            operation: "SELECT".into(),
            statement: "SELECT * FROM users WHERE id = $1".into(),
            ..DbData::default()
        };
        assert_eq!(
            mask_value(&db, MaskingMode::TagDriven).unwrap(),
            serde_json::to_value(&db).unwrap()
        );

        let mq = MqData {
            driver: "kafka".into(),
            topic: "user-events".into(),
            message_id: "msg-123".into(),
            ..MqData::default()
        };
        assert_eq!(
            mask_value(&mq, MaskingMode::TagDriven).unwrap(),
            serde_json::to_value(&mq).unwrap()
        );
    }
}
