#[cfg(test)]
mod tests {
    use crate::session::{BookingSession, SelectionError};
    use chrono::{Duration, TimeZone, Utc};
    use meetbot_common::CandidateSlot;
    use proptest::prelude::*;

    fn slots(count: usize) -> Vec<CandidateSlot> {
        let base = Utc.with_ymd_and_hms(2025, 5, 6, 6, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let start = base + Duration::minutes(30 * i as i64);
                CandidateSlot {
                    start,
                    end: start + Duration::minutes(30),
                    display_label: format!("{}", i),
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn test_resolve_matches_position(count in 1..20usize, ordinal in 0..40usize) {
            let session = BookingSession::new(None);
            let offered = slots(count);
            let listing = session.offer(7, offered.clone()).unwrap();

            prop_assert_eq!(listing.len(), count);
            match session.resolve(7, ordinal) {
                Ok(slot) => {
                    prop_assert!(ordinal >= 1 && ordinal <= count);
                    prop_assert_eq!(&slot, &offered[ordinal - 1]);
                    prop_assert_eq!(&listing[ordinal - 1].1, &slot.display_label);
                }
                Err(SelectionError::OutOfRange { available, .. }) => {
                    prop_assert!(ordinal == 0 || ordinal > count);
                    prop_assert_eq!(available, count);
                }
                Err(SelectionError::NoActiveOffer) => prop_assert!(false, "offer vanished"),
            }
            // Resolving never consumes the offer.
            prop_assert!(session.has_active_offer(7));
        }
    }
}
