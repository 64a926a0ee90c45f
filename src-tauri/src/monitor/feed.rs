use std::collections::VecDeque;
use text_selection::{SelectionEvent, SelectionKind};

/// Most recent selections kept on screen
pub const FEED_CAPACITY: usize = 10;

/// App label for captures that arrive over the hotkey channel
pub const HOTKEY_APP_LABEL: &str = "Unknown (Hotkey)";

/// Newest-first list of recent selections with tail eviction.
/// Ordered by local arrival, never by the events' own timestamps.
#[derive(Debug, Clone)]
pub struct SelectionFeed {
    events: VecDeque<SelectionEvent>,
    capacity: usize,
}

impl Default for SelectionFeed {
    fn default() -> Self {
        Self::with_capacity(FEED_CAPACITY)
    }
}

impl SelectionFeed {
    /// Capacity is clamped to 1..=FEED_CAPACITY
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, FEED_CAPACITY);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: SelectionEvent) {
        self.events.push_front(event);
        self.events.truncate(self.capacity);
    }

    /// Fold a raw hotkey capture into the feed
    pub fn push_hotkey_text(&mut self, text: String, received_at: f64) {
        self.push(hotkey_event(text, received_at));
    }

    /// Change capacity, dropping the oldest events if it shrinks
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.clamp(1, FEED_CAPACITY);
        self.events.truncate(self.capacity);
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &SelectionEvent> {
        self.events.iter()
    }

    pub fn to_vec(&self) -> Vec<SelectionEvent> {
        self.events.iter().cloned().collect()
    }
}

/// The hotkey channel carries only text; the rest is synthesized on receipt
pub fn hotkey_event(text: String, received_at: f64) -> SelectionEvent {
    SelectionEvent {
        text,
        app_name: HOTKEY_APP_LABEL.to_string(),
        timestamp: received_at,
        selection_type: SelectionKind::Selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str, timestamp: f64) -> SelectionEvent {
        SelectionEvent {
            text: text.to_string(),
            app_name: "Editor".to_string(),
            timestamp,
            selection_type: SelectionKind::Selected,
        }
    }

    #[test]
    fn test_eleventh_event_evicts_first() {
        let mut feed = SelectionFeed::default();
        for i in 1..=11 {
            feed.push(event(&format!("e{}", i), i as f64));
        }

        let texts: Vec<String> = feed.iter().map(|e| e.text.clone()).collect();
        let expected: Vec<String> = (2..=11).rev().map(|i| format!("e{}", i)).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_length_is_min_of_cap_and_received() {
        for total in 0..25usize {
            let mut feed = SelectionFeed::default();
            for i in 0..total {
                if i % 3 == 0 {
                    feed.push_hotkey_text(format!("h{}", i), i as f64);
                } else {
                    feed.push(event(&format!("s{}", i), i as f64));
                }
            }
            assert_eq!(feed.len(), total.min(FEED_CAPACITY));
        }
    }

    #[test]
    fn test_order_is_arrival_not_timestamp() {
        let mut feed = SelectionFeed::default();
        feed.push(event("late-capture", 500.0));
        feed.push(event("early-capture", 100.0));
        feed.push_hotkey_text("hotkey".to_string(), 50.0);

        let texts: Vec<&str> = feed.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["hotkey", "early-capture", "late-capture"]);
    }

    #[test]
    fn test_hotkey_event_synthesis() {
        let ev = hotkey_event("copied words".to_string(), 1234.5);
        assert_eq!(ev.text, "copied words");
        assert_eq!(ev.app_name, HOTKEY_APP_LABEL);
        assert_eq!(ev.timestamp, 1234.5);
        assert_eq!(ev.selection_type, SelectionKind::Selected);
    }

    #[test]
    fn test_no_deduplication() {
        let mut feed = SelectionFeed::default();
        feed.push(event("same", 1.0));
        feed.push(event("same", 1.0));
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn test_capacity_is_clamped_and_resizable() {
        assert_eq!(SelectionFeed::with_capacity(0).capacity(), 1);
        assert_eq!(SelectionFeed::with_capacity(50).capacity(), FEED_CAPACITY);

        let mut feed = SelectionFeed::default();
        for i in 0..8 {
            feed.push(event(&i.to_string(), i as f64));
        }
        feed.resize(3);
        let texts: Vec<&str> = feed.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["7", "6", "5"]);
    }
}
