//! Cursor tracking over a room's message history.
//!
//! The messaging backend returns one page of history, newest first, in the
//! same order on every call. The cursor is the id of the last message that
//! has been handed to the dispatcher; everything after it in arrival order
//! is new.

use super::{Message, RelayError};

/// Result of advancing the cursor over one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Unprocessed messages, oldest first.
    pub new_messages: Vec<Message>,
    /// Cursor for the next poll: the id of the tail of the chronological
    /// snapshot.
    pub next_cursor: String,
    /// The previous cursor was set but no longer appears in the snapshot.
    pub cursor_missing: bool,
}

/// Splits a newest-first snapshot into the messages not yet processed.
///
/// With no cursor every message in the snapshot is new. With a cursor, only
/// messages that arrived strictly after it are new; if the cursor has fallen
/// off the page nothing is returned, since the backend gives no way to tell
/// which of the visible messages were already seen.
pub fn advance(raw: Vec<Message>, cursor: Option<&str>) -> Result<Advance, RelayError> {
    let next_cursor = raw.first().ok_or(RelayError::EmptyRoom)?.id.clone();

    let mut chronological = raw.into_iter().rev();

    let (new_messages, cursor_missing) = match cursor {
        None => (chronological.collect(), false),
        Some(seen) => {
            // `any` consumes up to and including the matching message
            if chronological.by_ref().any(|message| message.id == seen) {
                (chronological.collect(), false)
            } else {
                (Vec::new(), true)
            }
        }
    };

    Ok(Advance {
        new_messages,
        next_cursor,
        cursor_missing,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot(ids: &[&str]) -> Vec<Message> {
        ids.iter()
            .map(|id| Message::new(*id, format!("text {id}")))
            .collect()
    }

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_unset_cursor_returns_everything_oldest_first() {
        let advance = advance(snapshot(&["C", "B", "A"]), None).unwrap();

        assert_eq!(ids(&advance.new_messages), vec!["A", "B", "C"]);
        assert_eq!(advance.next_cursor, "C");
        assert!(!advance.cursor_missing);
    }

    #[test]
    fn test_set_cursor_returns_only_newer_messages() {
        let advance = advance(snapshot(&["D", "C", "B", "A"]), Some("B")).unwrap();

        assert_eq!(ids(&advance.new_messages), vec!["C", "D"]);
        assert_eq!(advance.next_cursor, "D");
    }

    #[test]
    fn test_cursor_at_newest_yields_nothing() {
        let advance = advance(snapshot(&["C", "B", "A"]), Some("C")).unwrap();

        assert!(advance.new_messages.is_empty());
        assert_eq!(advance.next_cursor, "C");
        assert!(!advance.cursor_missing);
    }

    #[test]
    fn test_missing_cursor_yields_nothing() {
        let advance = advance(snapshot(&["Z", "Y"]), Some("B")).unwrap();

        assert!(advance.new_messages.is_empty());
        assert_eq!(advance.next_cursor, "Z");
        assert!(advance.cursor_missing);
    }

    #[test]
    fn test_empty_snapshot_is_an_error() {
        assert!(matches!(advance(Vec::new(), None), Err(RelayError::EmptyRoom)));
        assert!(matches!(
            advance(Vec::new(), Some("A")),
            Err(RelayError::EmptyRoom)
        ));
    }

    #[test]
    fn test_consecutive_polls_do_not_replay() {
        let first = advance(snapshot(&["B", "A"]), None).unwrap();
        assert_eq!(ids(&first.new_messages), vec!["A", "B"]);

        // Same history, nothing new
        let second = advance(snapshot(&["B", "A"]), Some(&first.next_cursor)).unwrap();
        assert!(second.new_messages.is_empty());

        // History grows by two
        let third = advance(snapshot(&["D", "C", "B", "A"]), Some(&second.next_cursor)).unwrap();
        assert_eq!(ids(&third.new_messages), vec!["C", "D"]);
        assert_eq!(third.next_cursor, "D");
    }

    #[test]
    fn test_single_message_snapshot() {
        let advance = advance(snapshot(&["A"]), None).unwrap();

        assert_eq!(ids(&advance.new_messages), vec!["A"]);
        assert_eq!(advance.next_cursor, "A");
    }
}
