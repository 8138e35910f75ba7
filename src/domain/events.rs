//! Buy/sell event extraction from position transitions.

use chrono::NaiveDate;

use super::signal::SignalRow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeEvent {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeEvents {
    pub buys: Vec<TradeEvent>,
    pub sells: Vec<TradeEvent>,
}

impl TradeEvents {
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }
}

/// Collect buys (signal = +1) and sells (signal = -1) in row order.
pub fn extract_events(rows: &[SignalRow]) -> TradeEvents {
    let mut events = TradeEvents::default();
    for row in rows {
        let event = TradeEvent {
            date: row.date,
            price: row.close,
        };
        if row.is_entry() {
            events.buys.push(event);
        } else if row.is_exit() {
            events.sells.push(event);
        }
    }
    events
}
