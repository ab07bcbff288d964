//! Publish-slot scheduler: three slots per day (19:00, 20:00, 21:00 local),
//! starting the day after the run.

use chrono::{Local, NaiveDate};

pub const PUBLISH_HOURS: [u32; 3] = [19, 20, 21];

/// Unix timestamps for `count` uploads, spread over `ceil(count/3)` days
/// beginning tomorrow. Deterministic given the wall-clock date.
pub fn publish_timestamps(count: usize) -> Vec<i64> {
    match Local::now().date_naive().succ_opt() {
        Some(tomorrow) => slots_from(tomorrow, count),
        None => Vec::new(),
    }
}

/// Pure core: emits the evening slots of consecutive days starting at
/// `start_day`, truncated to exactly `count` entries.
pub fn slots_from(start_day: NaiveDate, count: usize) -> Vec<i64> {
    let mut slots = Vec::with_capacity(count);
    let mut day = start_day;
    while slots.len() < count {
        for hour in PUBLISH_HOURS {
            if slots.len() == count {
                break;
            }
            if let Some(slot) = day
                .and_hms_opt(hour, 0, 0)
                .and_then(|naive| naive.and_local_timezone(Local).earliest())
            {
                slots.push(slot.timestamp());
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 8).unwrap()
    }

    #[test]
    fn emits_exactly_count_slots() {
        for count in [0, 1, 2, 3, 4, 7, 9] {
            assert_eq!(slots_from(start(), count).len(), count);
        }
    }

    #[test]
    fn slots_are_strictly_increasing() {
        let slots = slots_from(start(), 9);
        for pair in slots.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn slots_land_on_evening_hours() {
        let slots = slots_from(start(), 7);
        for slot in slots {
            let local = Local.timestamp_opt(slot, 0).unwrap();
            assert!(PUBLISH_HOURS.contains(&local.hour()));
            assert_eq!(local.minute(), 0);
            assert_eq!(local.second(), 0);
        }
    }

    #[test]
    fn first_slot_is_start_day_at_nineteen() {
        let expected = start()
            .and_hms_opt(19, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap()
            .timestamp();
        assert_eq!(slots_from(start(), 1), vec![expected]);
    }

    #[test]
    fn fourth_slot_rolls_to_the_next_day() {
        let slots = slots_from(start(), 4);
        let fourth = Local.timestamp_opt(slots[3], 0).unwrap();
        assert_eq!(fourth.date_naive(), start().succ_opt().unwrap());
        assert_eq!(fourth.hour(), 19);
    }

    #[test]
    fn publish_timestamps_start_no_earlier_than_tomorrow_evening() {
        let slots = publish_timestamps(3);
        assert_eq!(slots.len(), 3);
        let tomorrow = Local::now().date_naive().succ_opt().unwrap();
        let first_allowed = tomorrow
            .and_hms_opt(19, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap()
            .timestamp();
        assert!(slots[0] >= first_allowed);
    }
}
