//! Gross-to-net payroll derivation.
//!
//! The monthly figures are derived in one pass: gross salary is split into
//! its basic/medical/house-rent components, active allowances and variable
//! pay are added into total earnings, and the deduction side (income tax,
//! provident fund, EOBI, loans, attendance) is subtracted to reach net pay.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CalcError, CalcResult, round2, tax};

/// Salary breakdown percentages of gross.
pub const BASIC_SHARE: f64 = 0.6666;
pub const MEDICAL_SHARE: f64 = 0.10;
pub const HOUSE_RENT_SHARE: f64 = 0.2334;

/// Provident fund contribution, percent of basic salary.
pub const PROVIDENT_FUND_RATE: f64 = 8.34;

/// Fixed monthly EOBI deduction in PKR.
pub const EOBI_AMOUNT: f64 = 370.0;

/// Working days used for the daily-rate divisor.
pub const DAILY_RATE_DIVISOR: f64 = 26.0;

/// One allowance slot on the employee record: a flag plus an amount.
/// Inactive allowances keep their configured amount but do not pay out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct AllowanceItem {
    pub is_active: bool,
    pub amount: f64,
}

impl AllowanceItem {
    pub fn payable(&self) -> f64 {
        if self.is_active { self.amount } else { 0.0 }
    }
}

/// The full allowance set carried by an employee and snapshotted per payroll.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct Allowances {
    pub conveyance: AllowanceItem,
    pub food: AllowanceItem,
    pub vehicle_fuel: AllowanceItem,
    pub medical: AllowanceItem,
    pub house_rent: AllowanceItem,
    pub special: AllowanceItem,
    pub other: AllowanceItem,
}

impl Allowances {
    /// Sum of the active allowance amounts.
    pub fn active_total(&self) -> f64 {
        self.conveyance.payable()
            + self.food.payable()
            + self.vehicle_fuel.payable()
            + self.medical.payable()
            + self.house_rent.payable()
            + self.special.payable()
            + self.other.payable()
    }
}

/// Gross split into its standard components, whole rupees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryBreakdown {
    pub basic: f64,
    pub medical: f64,
    pub house_rent: f64,
}

/// 66.66% basic, 10% medical, 23.34% house rent.
pub fn split_gross(gross: f64) -> SalaryBreakdown {
    SalaryBreakdown {
        basic: (gross * BASIC_SHARE).round(),
        medical: (gross * MEDICAL_SHARE).round(),
        house_rent: (gross * HOUSE_RENT_SHARE).round(),
    }
}

/// Attendance counts for the payroll month. `absent_days` may be left out,
/// in which case it derives from the other three counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct AttendanceMonth {
    pub total_working_days: u32,
    pub present_days: u32,
    pub leave_days: u32,
    pub absent_days: Option<u32>,
}

impl AttendanceMonth {
    /// A fully-present month, used when no attendance source is available.
    pub fn full(total_working_days: u32) -> Self {
        Self {
            total_working_days,
            present_days: total_working_days,
            leave_days: 0,
            absent_days: Some(0),
        }
    }
}

/// The resolved proration: absent days, the daily rate and the deduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct AttendanceOutcome {
    pub absent_days: u32,
    pub daily_rate: f64,
    pub deduction: f64,
}

/// Attendance deduction = (gross / 26) x absent days.
///
/// Absent days derive as `total_working - present - leave` when not supplied;
/// supplied counts that do not fit inside the month are rejected.
pub fn prorate_attendance(gross: f64, month: &AttendanceMonth) -> CalcResult<AttendanceOutcome> {
    if gross < 0.0 {
        return Err(CalcError::Negative {
            field: "gross salary",
        });
    }

    let accounted = month.present_days + month.leave_days;
    if accounted > month.total_working_days {
        return Err(CalcError::AttendanceOutOfRange {
            present: month.present_days,
            leave: month.leave_days,
            total_working: month.total_working_days,
        });
    }

    let absent = match month.absent_days {
        Some(days) => {
            if days > month.total_working_days {
                return Err(CalcError::AbsentOutOfRange {
                    absent: days,
                    total_working: month.total_working_days,
                });
            }
            days
        }
        None => month.total_working_days - accounted,
    };

    let daily_rate = gross / DAILY_RATE_DIVISOR;
    Ok(AttendanceOutcome {
        absent_days: absent,
        daily_rate: round2(daily_rate),
        deduction: round2(daily_rate * absent as f64),
    })
}

/// Everything the derivation needs, gathered by the generation handler.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInputs {
    pub gross: f64,
    pub allowances: Allowances,
    pub overtime_amount: f64,
    pub performance_bonus: f64,
    pub other_bonus: f64,
    pub vehicle_loan_deduction: f64,
    pub company_loan_deduction: f64,
    pub other_deductions: f64,
    pub attendance: AttendanceMonth,
}

/// The derived monthly figures stored on the payroll row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollFigures {
    pub basic_salary: f64,
    pub medical_allowance: f64,
    pub house_rent_allowance: f64,
    pub total_earnings: f64,
    pub taxable_income: f64,
    pub income_tax: f64,
    pub provident_fund: f64,
    pub eobi: f64,
    pub attendance: AttendanceOutcome,
    pub total_deductions: f64,
    pub net_salary: f64,
}

/// Derive the full payroll for one employee-month.
pub fn compute(inputs: &PayrollInputs) -> CalcResult<PayrollFigures> {
    for (field, value) in [
        ("gross salary", inputs.gross),
        ("overtime amount", inputs.overtime_amount),
        ("performance bonus", inputs.performance_bonus),
        ("other bonus", inputs.other_bonus),
        ("vehicle loan deduction", inputs.vehicle_loan_deduction),
        ("company loan deduction", inputs.company_loan_deduction),
        ("other deductions", inputs.other_deductions),
    ] {
        if value < 0.0 {
            return Err(CalcError::Negative { field });
        }
    }

    let breakdown = split_gross(inputs.gross);

    let total_earnings = inputs.gross
        + inputs.allowances.active_total()
        + inputs.overtime_amount
        + inputs.performance_bonus
        + inputs.other_bonus;

    // The medical component of gross is tax exempt.
    let medical_exemption = inputs.gross * MEDICAL_SHARE;
    let taxable_income = (total_earnings - medical_exemption).max(0.0);
    let income_tax = tax::monthly_tax(taxable_income);

    let provident_fund = (breakdown.basic * PROVIDENT_FUND_RATE / 100.0).round();
    let attendance = prorate_attendance(inputs.gross, &inputs.attendance)?;

    let total_deductions = income_tax
        + provident_fund
        + EOBI_AMOUNT
        + inputs.vehicle_loan_deduction
        + inputs.company_loan_deduction
        + inputs.other_deductions
        + attendance.deduction;

    Ok(PayrollFigures {
        basic_salary: breakdown.basic,
        medical_allowance: breakdown.medical,
        house_rent_allowance: breakdown.house_rent,
        total_earnings,
        taxable_income: taxable_income.round(),
        income_tax,
        provident_fund,
        eobi: EOBI_AMOUNT,
        attendance,
        total_deductions,
        net_salary: total_earnings - total_deductions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn active(amount: f64) -> AllowanceItem {
        AllowanceItem {
            is_active: true,
            amount,
        }
    }

    fn inputs(gross: f64) -> PayrollInputs {
        PayrollInputs {
            gross,
            allowances: Allowances::default(),
            overtime_amount: 0.0,
            performance_bonus: 0.0,
            other_bonus: 0.0,
            vehicle_loan_deduction: 0.0,
            company_loan_deduction: 0.0,
            other_deductions: 0.0,
            attendance: AttendanceMonth::full(26),
        }
    }

    #[test]
    fn gross_splits_into_standard_shares() {
        let b = split_gross(100_000.0);
        assert_eq!(b.basic, 66_660.0);
        assert_eq!(b.medical, 10_000.0);
        assert_eq!(b.house_rent, 23_340.0);
    }

    #[test]
    fn active_vehicle_allowance_reaches_total_earnings() {
        let mut i = inputs(380_000.0);
        i.allowances.vehicle_fuel = active(35_000.0);
        let figures = compute(&i).unwrap();
        assert_eq!(figures.total_earnings, 415_000.0);
    }

    #[test]
    fn inactive_allowances_do_not_pay_out() {
        let mut i = inputs(380_000.0);
        i.allowances.vehicle_fuel = AllowanceItem {
            is_active: false,
            amount: 35_000.0,
        };
        let figures = compute(&i).unwrap();
        assert_eq!(figures.total_earnings, 380_000.0);
    }

    #[test]
    fn two_absent_days_on_380k_gross() {
        let outcome = prorate_attendance(
            380_000.0,
            &AttendanceMonth {
                total_working_days: 26,
                present_days: 24,
                leave_days: 0,
                absent_days: Some(2),
            },
        )
        .unwrap();
        assert_eq!(outcome.daily_rate, 14_615.38);
        assert_eq!(outcome.deduction, 29_230.77);
    }

    #[test]
    fn absent_days_derive_from_counts() {
        let outcome = prorate_attendance(
            260_000.0,
            &AttendanceMonth {
                total_working_days: 26,
                present_days: 20,
                leave_days: 3,
                absent_days: None,
            },
        )
        .unwrap();
        assert_eq!(outcome.absent_days, 3);
        assert_eq!(outcome.deduction, 30_000.0);
    }

    #[test]
    fn inconsistent_attendance_is_rejected() {
        let err = prorate_attendance(
            100_000.0,
            &AttendanceMonth {
                total_working_days: 20,
                present_days: 18,
                leave_days: 5,
                absent_days: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::AttendanceOutOfRange { .. }));
    }

    #[test]
    fn provident_fund_is_basic_share() {
        let figures = compute(&inputs(100_000.0)).unwrap();
        assert_eq!(figures.provident_fund, (66_660.0_f64 * 0.0834).round());
        assert_eq!(figures.eobi, 370.0);
    }

    #[test]
    fn net_is_earnings_minus_deductions_exactly() {
        let mut i = inputs(380_000.0);
        i.allowances.vehicle_fuel = active(35_000.0);
        i.overtime_amount = 12_500.0;
        i.vehicle_loan_deduction = 8_000.0;
        i.other_deductions = 1_250.0;
        i.attendance = AttendanceMonth {
            total_working_days: 26,
            present_days: 24,
            leave_days: 1,
            absent_days: None,
        };
        let figures = compute(&i).unwrap();
        assert_eq!(
            figures.net_salary,
            figures.total_earnings - figures.total_deductions
        );
        assert!(figures.attendance.absent_days == 1);
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let mut i = inputs(100_000.0);
        i.overtime_amount = -1.0;
        assert_eq!(
            compute(&i).unwrap_err(),
            CalcError::Negative {
                field: "overtime amount"
            }
        );
    }

    proptest! {
        // Deduction grows with absent days and never exceeds a full month.
        #[test]
        fn deduction_monotone_in_absent_days(
            gross in 10_000.0_f64..2_000_000.0,
            absent in 0u32..26,
        ) {
            let at = |a: u32| prorate_attendance(gross, &AttendanceMonth {
                total_working_days: 26,
                present_days: 26 - a,
                leave_days: 0,
                absent_days: Some(a),
            }).unwrap().deduction;

            prop_assert!(at(absent) <= at(absent + 1) + 1e-6);
            prop_assert!(at(absent) >= 0.0);
        }

        #[test]
        fn net_identity_holds_for_any_composition(
            gross in 0.0_f64..3_000_000.0,
            overtime in 0.0_f64..200_000.0,
            loans in 0.0_f64..100_000.0,
            absent in 0u32..26,
        ) {
            let mut i = inputs(gross);
            i.overtime_amount = overtime;
            i.company_loan_deduction = loans;
            i.attendance = AttendanceMonth {
                total_working_days: 26,
                present_days: 26 - absent,
                leave_days: 0,
                absent_days: None,
            };
            let figures = compute(&i).unwrap();
            prop_assert!(
                (figures.net_salary - (figures.total_earnings - figures.total_deductions)).abs()
                    < 1e-9
            );
        }
    }
}
