use serde_json::{Map, Value};

use crate::fields::{self, Candidates};

/// Fields that have carried the action type across webhook revisions.
pub const ACTION_TYPE_FIELDS: Candidates = &["type", "eventType", "action", "actionType", "event"];

/// Fields that have wrapped the payload. Without one, the body is the payload.
pub const DATA_FIELDS: Candidates = &["data", "payload"];

/// Key holding the raw body when it could not be parsed as JSON.
pub const RAW_BODY_FIELD: &str = "raw";

/// A webhook body split into its discriminator and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub action_type: Option<String>,
    pub data: Value,
}

impl InboundEvent {
    /// Parse a raw request body. BASTA does not always declare a content
    /// type, so the body is taken as bytes and parsed here; bodies that are
    /// not JSON are kept under [`RAW_BODY_FIELD`].
    pub fn from_bytes(body: &[u8]) -> InboundEvent {
        let value = match serde_json::from_slice::<Value>(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, len = body.len(), "webhook body is not json");
                let mut raw = Map::new();
                raw.insert(
                    RAW_BODY_FIELD.to_owned(),
                    Value::String(String::from_utf8_lossy(body).into_owned()),
                );
                Value::Object(raw)
            }
        };

        InboundEvent::from_value(value)
    }

    pub fn from_value(body: Value) -> InboundEvent {
        let action_type = fields::first_str(&body, ACTION_TYPE_FIELDS);

        let wrapped = DATA_FIELDS
            .iter()
            .find(|key| body.get(**key).is_some_and(Value::is_object))
            .copied();

        let data = match (wrapped, body) {
            (Some(key), Value::Object(mut map)) => map.remove(key).unwrap_or(Value::Null),
            (_, body) => body,
        };

        InboundEvent { action_type, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_every_discriminator_variant() {
        for key in ACTION_TYPE_FIELDS {
            let mut body = Map::new();
            body.insert(key.to_string(), json!("BidOnItemV2"));
            body.insert("data".to_owned(), json!({"amount": 1}));

            let inbound = InboundEvent::from_value(Value::Object(body));
            assert_eq!(inbound.action_type.as_deref(), Some("BidOnItemV2"), "{key}");
            assert_eq!(inbound.data, json!({"amount": 1}));
        }
    }

    #[test]
    fn discriminator_order_is_respected() {
        let inbound = InboundEvent::from_value(json!({
            "actionType": "SaleUpdatedV2",
            "type": "BidOnItemV2",
        }));
        assert_eq!(inbound.action_type.as_deref(), Some("BidOnItemV2"));
    }

    #[test]
    fn non_string_discriminators_are_skipped() {
        let inbound = InboundEvent::from_value(json!({
            "event": {"name": "something"},
            "type": 3,
            "actionType": "ItemUpdatedV2",
        }));
        assert_eq!(inbound.action_type.as_deref(), Some("ItemUpdatedV2"));
    }

    #[test]
    fn payload_field_falls_back_to_whole_body() {
        let inbound = InboundEvent::from_value(json!({
            "action": "BidOnItemV2",
            "payload": {"amount": 10},
        }));
        assert_eq!(inbound.data, json!({"amount": 10}));

        let body = json!({"eventType": "BidOnItemV2", "amount": 10});
        let inbound = InboundEvent::from_value(body.clone());
        assert_eq!(inbound.data, body);
    }

    #[test]
    fn non_object_payload_fields_are_ignored() {
        let body = json!({"type": "BidOnItemV2", "data": "nope", "amount": 4});
        let inbound = InboundEvent::from_value(body.clone());
        assert_eq!(inbound.data, body);
    }

    #[test]
    fn unparsable_bodies_keep_the_raw_string() {
        let inbound = InboundEvent::from_bytes(b"type=BidOnItemV2&amount=5");
        assert_eq!(inbound.action_type, None);
        assert_eq!(inbound.data, json!({"raw": "type=BidOnItemV2&amount=5"}));
    }

    #[test]
    fn parses_json_bytes() {
        let inbound = InboundEvent::from_bytes(br#"{"actionType":"ItemUpdatedV2","data":{"itemId":"a"}}"#);
        assert_eq!(inbound.action_type.as_deref(), Some("ItemUpdatedV2"));
        assert_eq!(inbound.data, json!({"itemId": "a"}));
    }

    #[test]
    fn non_object_bodies_have_no_action_type() {
        let inbound = InboundEvent::from_bytes(b"[1, 2]");
        assert_eq!(inbound.action_type, None);
        assert_eq!(inbound.data, json!([1, 2]));
    }
}
