// --- File: crates/meetbot_booking/src/replies.rs ---
// User-facing reply texts. Only the numbered list format is load-bearing:
// users answer with the number they see.

use crate::session::SelectionError;

pub const NO_SLOTS: &str =
    "Unfortunately there are no free slots in the coming days. Please try again later.";

pub const BOOKING_FAILED: &str =
    "Something went wrong while creating the meeting. Please try again later.";

const OFFER_HEADER: &str = "Free slots for a meeting:";

const OFFER_FOOTER: &str = "Reply with the slot number to book the meeting. \
You can add your email after the number to receive an invitation.";

/// Renders `(ordinal, label)` pairs as a numbered list, one slot per line.
pub fn offer(listing: &[(usize, String)]) -> String {
    let mut text = String::from(OFFER_HEADER);
    text.push_str("\n\n");
    for (ordinal, label) in listing {
        text.push_str(&format!("{}. {}\n", ordinal, label));
    }
    text.push('\n');
    text.push_str(OFFER_FOOTER);
    text
}

pub fn selection_error(err: &SelectionError) -> String {
    match err {
        SelectionError::NoActiveOffer => {
            "There is no open slot offer for you. Ask for a meeting to get a new list.".to_string()
        }
        SelectionError::OutOfRange { available, .. } => format!(
            "Invalid slot number. Please pick a number from 1 to {}.",
            available
        ),
    }
}

pub fn booked(label: &str, meeting_link: Option<&str>) -> String {
    match meeting_link {
        Some(link) => format!("✅ Meeting booked for {}!\nMeeting link: {}", label, link),
        None => format!(
            "✅ Meeting booked for {}!\nThe meeting link will be sent separately.",
            label
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_is_numbered_one_per_line() {
        let text = offer(&[
            (1, "06.05 at 09:00".to_string()),
            (2, "06.05 at 09:30".to_string()),
        ]);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], OFFER_HEADER);
        assert_eq!(lines[2], "1. 06.05 at 09:00");
        assert_eq!(lines[3], "2. 06.05 at 09:30");
        assert!(text.ends_with(OFFER_FOOTER));
    }

    #[test]
    fn test_booked_with_and_without_link() {
        assert!(booked("06.05 at 09:00", Some("https://meet.google.com/x"))
            .contains("Meeting link: https://meet.google.com/x"));
        assert!(booked("06.05 at 09:00", None).contains("sent separately"));
    }

    #[test]
    fn test_out_of_range_names_the_bounds() {
        let text = selection_error(&SelectionError::OutOfRange {
            ordinal: 7,
            available: 5,
        });
        assert!(text.contains("1 to 5"));
    }
}
