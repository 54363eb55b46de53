use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Discriminator of a normalized event, as written in its `type` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    BidReceived,
    ItemStart,
    GoingOnce,
    ItemClosedSold,
    ItemClosedPassed,
    AuctionStart,
    AuctionEnd,
    SaleUpdated,
    ItemUpdated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BidReceived => "BID_RECEIVED",
            EventKind::ItemStart => "ITEM_START",
            EventKind::GoingOnce => "GOING_ONCE",
            EventKind::ItemClosedSold => "ITEM_CLOSED_SOLD",
            EventKind::ItemClosedPassed => "ITEM_CLOSED_PASSED",
            EventKind::AuctionStart => "AUCTION_START",
            EventKind::AuctionEnd => "AUCTION_END",
            EventKind::SaleUpdated => "SALE_UPDATED",
            EventKind::ItemUpdated => "ITEM_UPDATED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidReceived {
    pub user_name: String,
    pub amount: Number,
    pub bid_count: u64,
    pub bid_velocity: Number,
    pub previous_leader_name: Option<String>,
    pub item_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStart {
    pub title: String,
    pub item_id: Option<String>,
    pub lot_number: Option<String>,
    pub starting_bid: Number,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoingOnce {
    pub title: String,
    pub item_id: Option<String>,
    pub current_bid: Number,
    pub leader_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemClosedSold {
    pub title: String,
    pub item_id: Option<String>,
    pub winner_name: String,
    pub final_price: Number,
    pub bid_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemClosedPassed {
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionStart {
    pub sale_name: String,
    pub sale_id: Option<String>,
    pub item_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionEnd {
    pub sale_name: String,
    pub sale_id: Option<String>,
    pub items_sold: u64,
    pub total_revenue: Number,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleUpdated {
    pub sale_id: Option<String>,
    pub sale_name: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdated {
    pub item_id: Option<String>,
    pub title: String,
    pub current_bid: Number,
    pub bid_count: u64,
    pub status: Option<String>,
}

/// Payload of a normalized event. Serialized with its kind inlined as `type`,
/// so consumers reading only `data` still know what they hold.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventData {
    BidReceived(BidReceived),
    ItemStart(ItemStart),
    GoingOnce(GoingOnce),
    ItemClosedSold(ItemClosedSold),
    ItemClosedPassed(ItemClosedPassed),
    AuctionStart(AuctionStart),
    AuctionEnd(AuctionEnd),
    SaleUpdated(SaleUpdated),
    ItemUpdated(ItemUpdated),
}

impl EventData {
    pub fn kind(&self) -> EventKind {
        match self {
            EventData::BidReceived(_) => EventKind::BidReceived,
            EventData::ItemStart(_) => EventKind::ItemStart,
            EventData::GoingOnce(_) => EventKind::GoingOnce,
            EventData::ItemClosedSold(_) => EventKind::ItemClosedSold,
            EventData::ItemClosedPassed(_) => EventKind::ItemClosedPassed,
            EventData::AuctionStart(_) => EventKind::AuctionStart,
            EventData::AuctionEnd(_) => EventKind::AuctionEnd,
            EventData::SaleUpdated(_) => EventKind::SaleUpdated,
            EventData::ItemUpdated(_) => EventKind::ItemUpdated,
        }
    }
}

/// The event published on the sale channel:
/// `{"type": KIND, "data": {"type": KIND, ...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub struct NormalizedEvent {
    data: EventData,
}

#[derive(Deserialize, Serialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: EventKind,
    data: EventData,
}

impl NormalizedEvent {
    pub fn new(data: EventData) -> Self {
        NormalizedEvent { data }
    }

    pub fn kind(&self) -> EventKind {
        self.data.kind()
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn into_data(self) -> EventData {
        self.data
    }
}

impl From<EventData> for NormalizedEvent {
    fn from(data: EventData) -> Self {
        NormalizedEvent::new(data)
    }
}

impl From<NormalizedEvent> for Envelope {
    fn from(event: NormalizedEvent) -> Self {
        Envelope {
            kind: event.kind(),
            data: event.data,
        }
    }
}

impl TryFrom<Envelope> for NormalizedEvent {
    type Error = String;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let inner = envelope.data.kind();
        if envelope.kind != inner {
            return Err(format!(
                "event type {} does not match data type {}",
                envelope.kind, inner
            ));
        }
        Ok(NormalizedEvent::new(envelope.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_kind_on_both_levels() {
        let event = NormalizedEvent::new(EventData::ItemClosedPassed(ItemClosedPassed {
            title: "Lot 3".to_owned(),
            reason: "No bids received".to_owned(),
        }));

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "ITEM_CLOSED_PASSED",
                "data": {
                    "type": "ITEM_CLOSED_PASSED",
                    "title": "Lot 3",
                    "reason": "No bids received"
                }
            })
        );
    }

    #[test]
    fn absent_options_serialize_as_null() {
        let event = NormalizedEvent::new(EventData::SaleUpdated(SaleUpdated {
            sale_id: None,
            sale_name: "the auction".to_owned(),
            status: None,
        }));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["data"]["saleId"], json!(null));
        assert_eq!(value["data"]["status"], json!(null));
        assert!(value["data"].as_object().unwrap().contains_key("status"));
    }

    #[test]
    fn parses_published_events() {
        let raw = json!({
            "type": "GOING_ONCE",
            "data": {
                "type": "GOING_ONCE",
                "title": "Lot 9",
                "itemId": "i-9",
                "currentBid": 120,
                "leaderName": "ada"
            }
        });

        let event: NormalizedEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.kind(), EventKind::GoingOnce);
        match event.into_data() {
            EventData::GoingOnce(going) => {
                assert_eq!(going.leader_name, "ada");
                assert_eq!(going.current_bid, Number::from(120));
            }
            other => panic!("unexpected event data: {other:?}"),
        }
    }

    #[test]
    fn rejects_mismatched_kinds() {
        let raw = json!({
            "type": "AUCTION_END",
            "data": {"type": "ITEM_CLOSED_PASSED", "title": "Lot 3", "reason": "No bids received"}
        });

        let err = serde_json::from_value::<NormalizedEvent>(raw).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn kind_names_match_serde_names() {
        let kinds = [
            EventKind::BidReceived,
            EventKind::ItemStart,
            EventKind::GoingOnce,
            EventKind::ItemClosedSold,
            EventKind::ItemClosedPassed,
            EventKind::AuctionStart,
            EventKind::AuctionEnd,
            EventKind::SaleUpdated,
            EventKind::ItemUpdated,
        ];

        for kind in kinds {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }
}
