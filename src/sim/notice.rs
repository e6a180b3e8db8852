//! Single-slot transient notice
//!
//! Showing a notice supersedes whatever was showing. Each notice gets a
//! ticket; a dismissal timer only clears the slot if its ticket is still
//! current, so a stale timer can never hide a newer notice.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoticeTicket(u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub ticket: NoticeTicket,
    pub text: String,
    pub duration_ms: u32,
}

#[derive(Debug, Default)]
pub struct NoticeSlot {
    generation: u64,
    current: Option<Notice>,
}

impl NoticeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any visible notice
    pub fn show(&mut self, text: &str, duration_ms: u32) -> &Notice {
        self.generation += 1;
        self.current.insert(Notice {
            ticket: NoticeTicket(self.generation),
            text: text.to_string(),
            duration_ms,
        })
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// Dismiss if `ticket` is still the visible notice
    pub fn expire(&mut self, ticket: NoticeTicket) -> bool {
        match &self.current {
            Some(n) if n.ticket == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notice_supersedes() {
        let mut slot = NoticeSlot::new();
        let first = slot.show("one", 900).ticket;
        let second = slot.show("two", 2000).ticket;
        assert_ne!(first, second);

        // Stale timer fires: nothing happens
        assert!(!slot.expire(first));
        assert_eq!(slot.current().unwrap().text, "two");

        assert!(slot.expire(second));
        assert!(slot.current().is_none());
        assert!(!slot.expire(second));
    }
}
