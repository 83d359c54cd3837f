//! Wire Protocol Tests
//!
//! Validates the heartbeat message codec.
//!
//! ## Test Scopes
//! - **Type Codes**: integer code mapping for every message type, rejection of
//!   unknown codes.
//! - **Round-Trips**: decode(encode(m)) preserves every field.
//! - **Rejection**: garbage payloads and out-of-contract fields fail decoding
//!   instead of producing state.

#[cfg(test)]
mod tests {
    use crate::protocol::codec::{MAX_DATAGRAM_BYTES, decode, encode};
    use crate::protocol::types::{
        HeartbeatMessage, MAX_NODE_ID_BYTES, MessageType, SERVER_NODE_ID,
    };
    use std::collections::HashMap;

    fn sample(kind: MessageType) -> HeartbeatMessage {
        let mut metadata = HashMap::new();
        metadata.insert("zone".to_string(), "eu-west".to_string());
        HeartbeatMessage {
            kind,
            node_id: "node-a".to_string(),
            sequence: 42,
            timestamp: 1_700_000_000_000,
            metadata,
        }
    }

    // ============================================================
    // TYPE CODE TESTS
    // ============================================================

    #[test]
    fn test_type_codes_are_stable() {
        assert_eq!(u8::from(MessageType::Ping), 1);
        assert_eq!(u8::from(MessageType::Pong), 2);
        assert_eq!(u8::from(MessageType::Join), 3);
        assert_eq!(u8::from(MessageType::Leave), 4);
        assert_eq!(u8::from(MessageType::Health), 5);
    }

    #[test]
    fn test_type_codes_round_trip() {
        for code in 1u8..=5 {
            let kind = MessageType::try_from(code).expect("valid code");
            assert_eq!(u8::from(kind), code);
        }
    }

    #[test]
    fn test_unknown_type_code_is_rejected() {
        assert!(MessageType::try_from(0).is_err());
        assert!(MessageType::try_from(6).is_err());
        assert!(MessageType::try_from(255).is_err());
    }

    #[test]
    fn test_type_is_an_integer_on_the_wire() {
        let payload = encode(&sample(MessageType::Ping)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();

        assert_eq!(value["type"], serde_json::json!(1));
    }

    // ============================================================
    // ROUND-TRIP TESTS
    // ============================================================

    #[test]
    fn test_round_trip_preserves_fields() {
        for kind in [
            MessageType::Ping,
            MessageType::Pong,
            MessageType::Join,
            MessageType::Leave,
            MessageType::Health,
        ] {
            let msg = sample(kind);
            let payload = encode(&msg).expect("encode");
            let restored = decode(&payload).expect("decode");

            assert_eq!(restored, msg);
        }
    }

    #[test]
    fn test_missing_metadata_defaults_to_empty() {
        let payload = br#"{"type":1,"node_id":"n1","sequence":7,"timestamp":1000}"#;
        let msg = decode(payload).expect("metadata is optional");

        assert!(msg.metadata.is_empty());
        assert_eq!(msg.sequence, 7);
    }

    #[test]
    fn test_pong_echoes_sequence() {
        let pong = HeartbeatMessage::pong(99);

        assert_eq!(pong.kind, MessageType::Pong);
        assert_eq!(pong.node_id, SERVER_NODE_ID);
        assert_eq!(pong.sequence, 99);
        assert!(pong.metadata.is_empty());
    }

    // ============================================================
    // REJECTION TESTS
    // ============================================================

    #[test]
    fn test_garbage_payload_is_rejected() {
        assert!(decode(b"").is_err());
        assert!(decode(b"not json at all").is_err());
        assert!(decode(&[0xff, 0x00, 0x13, 0x37]).is_err());
        assert!(decode(b"{\"type\":true}").is_err());
    }

    #[test]
    fn test_unknown_wire_code_is_rejected() {
        let payload = br#"{"type":9,"node_id":"n1","sequence":1,"timestamp":1}"#;
        assert!(decode(payload).is_err());
    }

    #[test]
    fn test_negative_sequence_is_rejected() {
        let payload = br#"{"type":1,"node_id":"n1","sequence":-4,"timestamp":1}"#;
        assert!(decode(payload).is_err());
    }

    #[test]
    fn test_empty_node_id_is_rejected() {
        let payload = br#"{"type":1,"node_id":"","sequence":1,"timestamp":1}"#;
        assert!(decode(payload).is_err());
    }

    #[test]
    fn test_oversized_node_id_is_rejected() {
        let mut msg = sample(MessageType::Ping);
        msg.node_id = "x".repeat(MAX_NODE_ID_BYTES + 1);

        assert!(encode(&msg).is_err());
    }

    #[test]
    fn test_oversized_message_is_rejected() {
        let mut msg = sample(MessageType::Join);
        for i in 0..40 {
            msg.metadata
                .insert(format!("key-{}", i), "v".repeat(40));
        }

        let result = encode(&msg);
        assert!(result.is_err(), "metadata blob should blow the {} byte budget", MAX_DATAGRAM_BYTES);
    }
}
