use serde::Serialize;
use serde_json::Value;

/// Message pushed by the queue server, keyed by its `msg` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    QueueFull,
    SendHash,
    SendData,
    Estimation {
        rank: Option<f64>,
        queue_size: Option<f64>,
        rank_eta: Option<f64>,
    },
    ProcessStarts,
    ProcessGenerating,
    ProcessCompleted {
        output: Value,
        success: Option<bool>,
    },
    /// Anything without a recognised `msg` tag.
    Other,
}

impl ServerMessage {
    /// Decode one text frame. Only text that is not JSON is an error; an
    /// unknown or missing tag decodes to `Other`, and progress fields of an
    /// unexpected type are dropped.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Value>(text).map(Self::from_value)
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return ServerMessage::Other;
        };
        let kind = match fields.get("msg") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return ServerMessage::Other,
        };
        let number = |key: &str| fields.get(key).and_then(Value::as_f64);
        if kind == "estimation" {
            return ServerMessage::Estimation {
                rank: number("rank"),
                queue_size: number("queue_size"),
                rank_eta: number("rank_eta"),
            };
        }

        match kind.as_str() {
            "queue_full" => ServerMessage::QueueFull,
            "send_hash" => ServerMessage::SendHash,
            "send_data" => ServerMessage::SendData,
            "process_starts" => ServerMessage::ProcessStarts,
            "process_generating" => ServerMessage::ProcessGenerating,
            "process_completed" => ServerMessage::ProcessCompleted {
                success: fields.get("success").and_then(Value::as_bool),
                output: fields.remove("output").unwrap_or(Value::Null),
            },
            _ => ServerMessage::Other,
        }
    }

    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::QueueFull => "queue_full",
            ServerMessage::SendHash => "send_hash",
            ServerMessage::SendData => "send_data",
            ServerMessage::Estimation { .. } => "estimation",
            ServerMessage::ProcessStarts => "process_starts",
            ServerMessage::ProcessGenerating => "process_generating",
            ServerMessage::ProcessCompleted { .. } => "process_completed",
            ServerMessage::Other => "other",
        }
    }
}

/// Message sent by the client, only ever in reply to a server request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ClientMessage<'a> {
    Hash {
        fn_index: u32,
        session_hash: &'a str,
    },
    Data {
        data: &'a [Value],
        fn_index: u32,
        session_hash: &'a str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> ServerMessage {
        ServerMessage::decode(raw).unwrap()
    }

    #[test]
    fn test_parse_handshake_requests() {
        assert_eq!(parse(r#"{"msg":"send_hash"}"#), ServerMessage::SendHash);
        assert_eq!(parse(r#"{"msg":"send_data"}"#), ServerMessage::SendData);
        assert_eq!(parse(r#"{"msg":"queue_full"}"#), ServerMessage::QueueFull);
    }

    #[test]
    fn test_parse_completed_with_output() {
        let msg = parse(r#"{"msg":"process_completed","output":{"data":[1]},"success":true}"#);
        assert_eq!(
            msg,
            ServerMessage::ProcessCompleted {
                output: json!({"data": [1]}),
                success: Some(true),
            }
        );
    }

    #[test]
    fn test_parse_completed_without_output() {
        let msg = parse(r#"{"msg":"process_completed"}"#);
        assert_eq!(
            msg,
            ServerMessage::ProcessCompleted {
                output: Value::Null,
                success: None,
            }
        );
    }

    #[test]
    fn test_parse_estimation_ignores_extra_fields() {
        let msg = parse(r#"{"msg":"estimation","rank":3,"queue_size":7,"rank_eta":null,"avg_event_process_time":1.5}"#);
        assert_eq!(
            msg,
            ServerMessage::Estimation {
                rank: Some(3.0),
                queue_size: Some(7.0),
                rank_eta: None,
            }
        );
    }

    #[test]
    fn test_parse_unknown_kind_is_other() {
        assert_eq!(parse(r#"{"msg":"heartbeat"}"#), ServerMessage::Other);
        assert_eq!(
            parse(r#"{"msg":"process_starts","eta":2.0}"#),
            ServerMessage::ProcessStarts
        );
    }

    #[test]
    fn test_parse_untagged_json_is_other() {
        assert_eq!(parse(r#"{"output":1}"#), ServerMessage::Other);
        assert_eq!(parse(r#"{"msg":7}"#), ServerMessage::Other);
        assert_eq!(parse(r#"[1, 2]"#), ServerMessage::Other);
        assert_eq!(parse("null"), ServerMessage::Other);
    }

    #[test]
    fn test_parse_estimation_with_loose_types() {
        let msg = parse(r#"{"msg":"estimation","rank":1.0,"queue_size":"9","rank_eta":2}"#);
        assert_eq!(
            msg,
            ServerMessage::Estimation {
                rank: Some(1.0),
                queue_size: None,
                rank_eta: Some(2.0),
            }
        );
    }

    #[test]
    fn test_parse_completed_with_odd_success_flag() {
        let msg = parse(r#"{"msg":"process_completed","output":[1],"success":"yes"}"#);
        assert_eq!(
            msg,
            ServerMessage::ProcessCompleted {
                output: json!([1]),
                success: None,
            }
        );
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(ServerMessage::decode("not json").is_err());
    }

    #[test]
    fn test_client_messages_wire_shape() {
        let hash = ClientMessage::Hash {
            fn_index: 1,
            session_hash: "abc",
        };
        assert_eq!(
            serde_json::to_value(&hash).unwrap(),
            json!({"fn_index": 1, "session_hash": "abc"})
        );

        let payload = vec![json!("hi"), json!(0.75)];
        let data = ClientMessage::Data {
            data: &payload,
            fn_index: 1,
            session_hash: "abc",
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"data": ["hi", 0.75], "fn_index": 1, "session_hash": "abc"})
        );
    }
}
