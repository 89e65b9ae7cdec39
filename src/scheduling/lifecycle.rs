//! Status transition rules

use crate::models::AppointmentStatus;

/// Whether moving from `prev` to `next` completes the appointment and must
/// produce its revenue and loyalty side effects.
///
/// Only the first entry into `Completed` from an open status counts;
/// re-sending `Completed` or reviving a cancelled appointment straight into
/// `Completed` does not.
pub fn triggers_completion(prev: AppointmentStatus, next: AppointmentStatus) -> bool {
    next == AppointmentStatus::Completed && !prev.is_terminal()
}

/// Whether moving from `prev` to `next` takes a released slot back, so the
/// booking must be checked again for conflicts and quota
pub fn reclaims_slot(prev: AppointmentStatus, next: AppointmentStatus) -> bool {
    !prev.occupies_slot() && next.occupies_slot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn test_open_statuses_complete() {
        for prev in [Pending, Scheduled, Confirmed, InProgress] {
            assert!(triggers_completion(prev, Completed), "{prev:?}");
        }
    }

    #[test]
    fn test_repeat_completion_is_not_an_edge() {
        assert!(!triggers_completion(Completed, Completed));
        assert!(!triggers_completion(Cancelled, Completed));
    }

    #[test]
    fn test_other_targets_never_complete() {
        for prev in AppointmentStatus::all() {
            for next in [Pending, Scheduled, Confirmed, InProgress, Cancelled] {
                assert!(!triggers_completion(prev, next));
            }
        }
    }

    #[test]
    fn test_synonyms_reach_the_same_edge() {
        let prev: AppointmentStatus = "agendado".parse().unwrap();
        let next: AppointmentStatus = "realizado".parse().unwrap();
        assert!(triggers_completion(prev, next));
    }

    #[test]
    fn test_reviving_a_cancelled_appointment_reclaims_its_slot() {
        for next in [Pending, Scheduled, Confirmed, InProgress, Completed] {
            assert!(reclaims_slot(Cancelled, next), "{next:?}");
        }
        assert!(!reclaims_slot(Cancelled, Cancelled));
        for prev in [Pending, Scheduled, Confirmed, InProgress, Completed] {
            for next in AppointmentStatus::all() {
                assert!(!reclaims_slot(prev, next));
            }
        }
    }
}
