//! 时间段冲突检测

use chrono::NaiveTime;
use sqlx::SqliteConnection;

use crate::db::repository::RepoResult;
use crate::db::repository::reservation::{self, Slot};

/// 半开区间 `[a_start, a_end)` 与 `[b_start, b_end)` 是否重叠
///
/// 首尾相接 (`a_end == b_start`) 不算重叠。
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

/// 同一教室同一天是否已有重叠的 ACTIVE 预约
///
/// `exclude_id` 用于修改预约时排除自身。
pub async fn has_conflict(
    conn: &mut SqliteConnection,
    slot: &Slot,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let booked = reservation::active_slots(&mut *conn, slot.room_id, slot.date, exclude_id).await?;
    Ok(booked
        .iter()
        .any(|(start, end)| overlaps(slot.start_time, slot.end_time, *start, *end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn back_to_back_slots_do_not_overlap() {
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(!overlaps(t(10, 0), t(11, 0), t(9, 0), t(10, 0)));
    }

    #[test]
    fn partial_and_nested_overlap() {
        assert!(overlaps(t(9, 0), t(10, 0), t(9, 30), t(10, 30)));
        assert!(overlaps(t(9, 0), t(12, 0), t(10, 0), t(11, 0)));
        assert!(overlaps(t(10, 0), t(11, 0), t(9, 0), t(12, 0)));
        assert!(overlaps(t(9, 0), t(10, 0), t(9, 0), t(10, 0)));
    }

    #[test]
    fn disjoint_slots() {
        assert!(!overlaps(t(8, 0), t(9, 0), t(14, 0), t(15, 0)));
    }

    /// Compare against a minute-by-minute occupancy check over a small grid
    #[test]
    fn matches_minute_occupancy() {
        let minutes = [0u32, 15, 30, 45, 60, 75, 90];
        let at = |m: u32| t(8 + m / 60, m % 60);

        for &a0 in &minutes {
            for &a1 in minutes.iter().filter(|m| **m > a0) {
                for &b0 in &minutes {
                    for &b1 in minutes.iter().filter(|m| **m > b0) {
                        let shared_minute = (a0..a1).any(|m| (b0..b1).contains(&m));
                        assert_eq!(
                            overlaps(at(a0), at(a1), at(b0), at(b1)),
                            shared_minute,
                            "[{a0},{a1}) vs [{b0},{b1})"
                        );
                        assert_eq!(
                            overlaps(at(a0), at(a1), at(b0), at(b1)),
                            overlaps(at(b0), at(b1), at(a0), at(a1)),
                        );
                    }
                }
            }
        }
    }
}
