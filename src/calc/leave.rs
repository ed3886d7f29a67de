//! Work-year and leave-balance arithmetic.
//!
//! Leave accounting runs on anniversary-based work years, not calendar years:
//! work year 0 spans hire date to first anniversary. Annual leave carries
//! forward between work years under two caps; sick and casual reset.

use chrono::{Datelike, NaiveDate};

/// Individual cap on carried-forward annual days.
pub const ANNUAL_CARRY_CAP: f64 = 20.0;

/// Combined cap: allocation + carry-forward never exceeds this.
pub const ANNUAL_TOTAL_CAP: f64 = 40.0;

/// Default yearly allocations, in days.
pub const ANNUAL_ALLOCATION: f64 = 20.0;
pub const SICK_ALLOCATION: f64 = 10.0;
pub const CASUAL_ALLOCATION: f64 = 10.0;

/// Number of completed hire-date anniversaries on `on`.
///
/// The hire year itself is work year 0; the index increments on each
/// anniversary. Dates before hire clamp to 0.
pub fn work_year(hire: NaiveDate, on: NaiveDate) -> u32 {
    if on < hire {
        return 0;
    }
    let mut years = on.year() - hire.year();
    let anniversary_passed = (on.month(), on.day()) >= (hire.month(), hire.day());
    if !anniversary_passed {
        years -= 1;
    }
    years.max(0) as u32
}

/// Per-type allocation for a work year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub annual: f64,
    pub sick: f64,
    pub casual: f64,
}

/// Annual leave starts after the first completed year; sick and casual are
/// available from day one.
pub fn anniversary_allocation(work_year: u32) -> Allocation {
    Allocation {
        annual: if work_year >= 1 { ANNUAL_ALLOCATION } else { 0.0 },
        sick: SICK_ALLOCATION,
        casual: CASUAL_ALLOCATION,
    }
}

/// Carry-forward into a year with `new_allocation` annual days:
/// min(previous remaining, 20), further capped so allocation + cf <= 40.
pub fn carry_forward(prev_remaining: f64, new_allocation: f64) -> f64 {
    let individual = prev_remaining.max(0.0).min(ANNUAL_CARRY_CAP);
    let total_cap_room = (ANNUAL_TOTAL_CAP - new_allocation).max(0.0);
    individual.min(total_cap_room)
}

/// Remaining/advance derived from one leave type's raw counters.
/// Allocated days are consumed before carried-forward days; use beyond
/// both spills into `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub remaining: f64,
    pub advance: f64,
}

pub fn derive(allocated: f64, carried_forward: f64, used: f64) -> Derived {
    let available = allocated.max(0.0) + carried_forward.max(0.0);
    let used = used.max(0.0);
    if used <= available {
        Derived {
            remaining: available - used,
            advance: 0.0,
        }
    } else {
        Derived {
            remaining: 0.0,
            advance: used - available,
        }
    }
}

/// One work year's annual-leave counters inside a recalculation chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearAnnual {
    pub work_year: u32,
    pub allocated: f64,
    pub used: f64,
    pub carried_forward: f64,
    pub remaining: f64,
}

/// Re-derive carry-forward and remaining across an ordered balance history.
///
/// This is the idempotent reduction the recalculate endpoint exposes: given
/// the allocated/used counters per work year (ascending), carried-forward and
/// remaining are rebuilt from work year 0 regardless of what was stored.
pub fn recalculate_chain(years: &mut [YearAnnual]) {
    let mut prev_remaining = 0.0;
    for year in years.iter_mut() {
        year.carried_forward = if year.work_year == 0 {
            0.0
        } else {
            carry_forward(prev_remaining, year.allocated)
        };
        let derived = derive(year.allocated, year.carried_forward, year.used);
        year.remaining = derived.remaining;
        prev_remaining = year.remaining;
    }
}

/// Inclusive day count of a leave request.
pub fn request_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn work_year_zero_until_first_anniversary() {
        let hire = d(2023, 11, 1);
        assert_eq!(work_year(hire, d(2023, 11, 1)), 0);
        assert_eq!(work_year(hire, d(2024, 10, 31)), 0);
        assert_eq!(work_year(hire, d(2024, 11, 1)), 1);
        assert_eq!(work_year(hire, d(2026, 3, 15)), 2);
    }

    #[test]
    fn work_year_clamps_before_hire() {
        assert_eq!(work_year(d(2024, 5, 1), d(2024, 1, 1)), 0);
    }

    #[test]
    fn annual_leave_starts_in_second_work_year() {
        assert_eq!(anniversary_allocation(0).annual, 0.0);
        assert_eq!(anniversary_allocation(1).annual, 20.0);
        assert_eq!(anniversary_allocation(0).sick, 10.0);
        assert_eq!(anniversary_allocation(0).casual, 10.0);
    }

    #[test]
    fn carry_forward_individual_cap() {
        assert_eq!(carry_forward(25.0, 20.0), 20.0);
        assert_eq!(carry_forward(12.0, 20.0), 12.0);
        assert_eq!(carry_forward(0.0, 20.0), 0.0);
    }

    #[test]
    fn carry_forward_combined_cap() {
        // Allocation already at 40: nothing fits.
        assert_eq!(carry_forward(15.0, 40.0), 0.0);
        // Room for 5 under the 40-day ceiling.
        assert_eq!(carry_forward(15.0, 35.0), 5.0);
    }

    #[test]
    fn derive_consumes_allocation_then_carry() {
        let r = derive(20.0, 10.0, 25.0);
        assert_eq!(r.remaining, 5.0);
        assert_eq!(r.advance, 0.0);
    }

    #[test]
    fn derive_spills_excess_into_advance() {
        let r = derive(20.0, 5.0, 30.0);
        assert_eq!(r.remaining, 0.0);
        assert_eq!(r.advance, 5.0);
    }

    #[test]
    fn chain_recalculation_matches_hand_derivation() {
        let mut years = [
            YearAnnual {
                work_year: 0,
                allocated: 0.0,
                used: 0.0,
                carried_forward: 99.0, // stale, must be rebuilt
                remaining: 99.0,
            },
            YearAnnual {
                work_year: 1,
                allocated: 20.0,
                used: 5.0,
                carried_forward: 0.0,
                remaining: 0.0,
            },
            YearAnnual {
                work_year: 2,
                allocated: 20.0,
                used: 0.0,
                carried_forward: 0.0,
                remaining: 0.0,
            },
        ];
        recalculate_chain(&mut years);
        assert_eq!(years[0].carried_forward, 0.0);
        assert_eq!(years[0].remaining, 0.0);
        assert_eq!(years[1].carried_forward, 0.0);
        assert_eq!(years[1].remaining, 15.0);
        assert_eq!(years[2].carried_forward, 15.0);
        assert_eq!(years[2].remaining, 35.0);
    }

    #[test]
    fn chain_recalculation_is_idempotent() {
        let mut years = [
            YearAnnual {
                work_year: 1,
                allocated: 20.0,
                used: 2.0,
                carried_forward: 0.0,
                remaining: 0.0,
            },
            YearAnnual {
                work_year: 2,
                allocated: 20.0,
                used: 7.0,
                carried_forward: 0.0,
                remaining: 0.0,
            },
        ];
        recalculate_chain(&mut years);
        let first = years;
        recalculate_chain(&mut years);
        assert_eq!(years, first);
    }

    #[test]
    fn request_days_are_inclusive() {
        assert_eq!(request_days(d(2026, 1, 1), d(2026, 1, 1)), 1);
        assert_eq!(request_days(d(2026, 1, 1), d(2026, 1, 3)), 3);
    }

    proptest! {
        #[test]
        fn carry_forward_caps_always_hold(
            prev in 0.0_f64..60.0,
            allocation in 0.0_f64..40.0,
        ) {
            let cf = carry_forward(prev, allocation);
            prop_assert!(cf >= 0.0);
            prop_assert!(cf <= prev.min(ANNUAL_CARRY_CAP));
            prop_assert!(allocation + cf <= ANNUAL_TOTAL_CAP + 1e-9);
        }

        #[test]
        fn derived_counters_never_go_negative(
            allocated in 0.0_f64..40.0,
            carried in 0.0_f64..20.0,
            used in 0.0_f64..80.0,
        ) {
            let r = derive(allocated, carried, used);
            prop_assert!(r.remaining >= 0.0);
            prop_assert!(r.advance >= 0.0);
        }
    }
}
