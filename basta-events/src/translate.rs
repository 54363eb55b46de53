use serde_json::{Number, Value};

use crate::action::ActionType;
use crate::event::{
    AuctionEnd, AuctionStart, BidReceived, EventData, GoingOnce, ItemClosedPassed,
    ItemClosedSold, ItemStart, ItemUpdated, NormalizedEvent, SaleUpdated,
};
use crate::fields::{first_bool, first_count, first_id, first_number, first_str, Candidates};
use crate::inbound::InboundEvent;

pub const DEFAULT_USER_NAME: &str = "someone";
pub const DEFAULT_ITEM_TITLE: &str = "Unknown item";
pub const DEFAULT_SALE_NAME: &str = "the auction";
pub const DEFAULT_PASS_REASON: &str = "No bids received";
pub const DEFAULT_BID_COUNT: u64 = 1;

const BIDDER_NAME: Candidates = &["bidderName", "userName", "bidder.name", "user.name"];
const BID_AMOUNT: Candidates = &["amount", "bidAmount", "maxAmount", "bid.amount"];
const BID_COUNT: Candidates = &["bidCount", "bidsCount", "item.bidCount"];
const BID_VELOCITY: Candidates = &["bidVelocity", "velocity"];
const PREVIOUS_LEADER: Candidates = &["previousLeaderName", "previousLeader.name"];

const ITEM_ID: Candidates = &["itemId", "item.id"];
const ITEM_TITLE: Candidates = &["title", "itemTitle", "item.title"];
const LOT_NUMBER: Candidates = &["lotNumber", "lot", "item.lotNumber"];
const STARTING_BID: Candidates = &["startingBid", "openingBid", "item.startingBid"];
const CURRENT_BID: Candidates = &["currentBid", "leaderAmount", "highestBid", "item.currentBid"];
const LEADER_NAME: Candidates = &["leaderName", "leadingBidderName", "leader.name"];
const WINNER_NAME: Candidates = &["winnerName", "leaderName", "winner.name", "leader.name"];
const FINAL_PRICE: Candidates = &["finalPrice", "soldPrice", "currentBid", "leaderAmount"];
const CLOSED_WITH_BIDS: Candidates = &["closedWithBids"];
const PASS_REASON: Candidates = &["reason", "passReason"];

const SALE_ID: Candidates = &["saleId", "sale.id"];
const SALE_NAME: Candidates = &["saleTitle", "saleName", "title", "sale.title"];
const ITEM_COUNT: Candidates = &["itemCount", "itemsCount", "sale.itemCount"];
const ITEMS_SOLD: Candidates = &["itemsSold", "soldCount", "sale.itemsSold"];
const TOTAL_REVENUE: Candidates = &["totalRevenue", "revenue", "sale.totalRevenue"];

const STATUS: Candidates = &["newStatus", "status"];

/// Outcome of translating one webhook.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    /// The webhook maps to a normalized event.
    Event(NormalizedEvent),
    /// Known action type, but nothing to publish for this payload
    /// (e.g. a status transition we do not surface).
    Dropped,
    /// Unknown action type.
    Unmapped,
}

impl Translation {
    pub fn event(self) -> Option<NormalizedEvent> {
        match self {
            Translation::Event(event) => Some(event),
            Translation::Dropped | Translation::Unmapped => None,
        }
    }
}

/// Translate a webhook action type and payload into a normalized event.
pub fn translate(action_type: &str, data: &Value) -> Translation {
    let Ok(action) = action_type.parse::<ActionType>() else {
        return Translation::Unmapped;
    };

    let translated = match action {
        ActionType::BidOnItem => Some(bid_received(data)),
        ActionType::ItemStatusChanged => item_status_changed(data),
        ActionType::SaleStatusChanged => sale_status_changed(data),
        ActionType::SaleUpdated => Some(sale_updated(data)),
        ActionType::ItemUpdated => Some(item_updated(data)),
    };

    match translated {
        Some(data) => Translation::Event(NormalizedEvent::new(data)),
        None => Translation::Dropped,
    }
}

/// Translate an already extracted webhook. Webhooks without an action type
/// are unmapped.
pub fn translate_inbound(inbound: &InboundEvent) -> Translation {
    match inbound.action_type.as_deref() {
        Some(action_type) => translate(action_type, &inbound.data),
        None => Translation::Unmapped,
    }
}

fn zero() -> Number {
    Number::from(0)
}

fn status(data: &Value) -> Option<String> {
    first_str(data, STATUS).map(|s| s.to_ascii_uppercase())
}

fn item_title(data: &Value) -> String {
    first_str(data, ITEM_TITLE).unwrap_or_else(|| DEFAULT_ITEM_TITLE.to_owned())
}

fn sale_name(data: &Value) -> String {
    first_str(data, SALE_NAME).unwrap_or_else(|| DEFAULT_SALE_NAME.to_owned())
}

fn bid_received(data: &Value) -> EventData {
    EventData::BidReceived(BidReceived {
        user_name: first_str(data, BIDDER_NAME).unwrap_or_else(|| DEFAULT_USER_NAME.to_owned()),
        amount: first_number(data, BID_AMOUNT).unwrap_or_else(zero),
        bid_count: first_count(data, BID_COUNT).unwrap_or(DEFAULT_BID_COUNT),
        bid_velocity: first_number(data, BID_VELOCITY).unwrap_or_else(zero),
        previous_leader_name: first_str(data, PREVIOUS_LEADER),
        item_id: first_id(data, ITEM_ID),
    })
}

fn item_status_changed(data: &Value) -> Option<EventData> {
    let status = status(data);

    match status.as_deref() {
        Some("ITEM_OPEN" | "OPEN" | "OPENED" | "LIVE") => Some(item_start(data)),
        Some("ITEM_CLOSING" | "CLOSING" | "GOING") => Some(going_once(data)),
        Some("ITEM_CLOSED" | "CLOSED") => {
            if item_sold(data) {
                Some(item_closed_sold(data))
            } else {
                Some(item_closed_passed(data))
            }
        }
        other => {
            tracing::debug!(status = ?other, "ignoring item status");
            None
        }
    }
}

fn item_sold(data: &Value) -> bool {
    match first_bool(data, CLOSED_WITH_BIDS) {
        Some(closed_with_bids) => closed_with_bids,
        None => {
            first_str(data, WINNER_NAME).is_some()
                || first_count(data, BID_COUNT).is_some_and(|count| count > 0)
        }
    }
}

fn item_start(data: &Value) -> EventData {
    EventData::ItemStart(ItemStart {
        title: item_title(data),
        item_id: first_id(data, ITEM_ID),
        lot_number: first_id(data, LOT_NUMBER),
        starting_bid: first_number(data, STARTING_BID).unwrap_or_else(zero),
    })
}

fn going_once(data: &Value) -> EventData {
    EventData::GoingOnce(GoingOnce {
        title: item_title(data),
        item_id: first_id(data, ITEM_ID),
        current_bid: first_number(data, CURRENT_BID).unwrap_or_else(zero),
        leader_name: first_str(data, LEADER_NAME).unwrap_or_else(|| DEFAULT_USER_NAME.to_owned()),
    })
}

fn item_closed_sold(data: &Value) -> EventData {
    EventData::ItemClosedSold(ItemClosedSold {
        title: item_title(data),
        item_id: first_id(data, ITEM_ID),
        winner_name: first_str(data, WINNER_NAME).unwrap_or_else(|| DEFAULT_USER_NAME.to_owned()),
        final_price: first_number(data, FINAL_PRICE).unwrap_or_else(zero),
        bid_count: first_count(data, BID_COUNT).unwrap_or(0),
    })
}

fn item_closed_passed(data: &Value) -> EventData {
    EventData::ItemClosedPassed(ItemClosedPassed {
        title: item_title(data),
        reason: first_str(data, PASS_REASON).unwrap_or_else(|| DEFAULT_PASS_REASON.to_owned()),
    })
}

fn sale_status_changed(data: &Value) -> Option<EventData> {
    let status = status(data);

    match status.as_deref() {
        Some("SALE_OPEN" | "SALE_OPENED" | "OPEN" | "OPENED" | "LIVE" | "STARTED") => {
            Some(EventData::AuctionStart(AuctionStart {
                sale_name: sale_name(data),
                sale_id: first_id(data, SALE_ID),
                item_count: first_count(data, ITEM_COUNT).unwrap_or(0),
            }))
        }
        Some("SALE_CLOSED" | "CLOSED" | "ENDED" | "COMPLETED") => {
            Some(EventData::AuctionEnd(AuctionEnd {
                sale_name: sale_name(data),
                sale_id: first_id(data, SALE_ID),
                items_sold: first_count(data, ITEMS_SOLD).unwrap_or(0),
                total_revenue: first_number(data, TOTAL_REVENUE).unwrap_or_else(zero),
            }))
        }
        other => {
            tracing::debug!(status = ?other, "ignoring sale status");
            None
        }
    }
}

fn sale_updated(data: &Value) -> EventData {
    EventData::SaleUpdated(SaleUpdated {
        sale_id: first_id(data, SALE_ID),
        sale_name: sale_name(data),
        status: first_str(data, STATUS),
    })
}

fn item_updated(data: &Value) -> EventData {
    EventData::ItemUpdated(ItemUpdated {
        item_id: first_id(data, ITEM_ID),
        title: item_title(data),
        current_bid: first_number(data, CURRENT_BID).unwrap_or_else(zero),
        bid_count: first_count(data, BID_COUNT).unwrap_or(0),
        status: first_str(data, STATUS),
    })
}
