//! Monthly income tax per the FBR 2025-2026 salaried slabs.
//!
//! Monthly taxable income is annualized, run through the progressive bracket
//! table, and divided back to a monthly figure rounded to whole rupees.

/// Annual taxable income above which the 9% surcharge applies.
pub const SURCHARGE_THRESHOLD: f64 = 10_000_000.0;

/// Surcharge rate on the computed tax for high incomes.
pub const SURCHARGE_RATE: f64 = 0.09;

/// Annual tax on annual taxable income, before monthly division.
///
/// Slabs (FBR 2025-2026, salaried):
/// up to 600k exempt, then 1% / 11% / 23% / 30% / 35% on the marginal bands
/// starting at 600k, 1.2M, 2.2M, 3.2M and 4.1M.
pub fn annual_tax(annual_taxable: f64) -> f64 {
    let income = annual_taxable.max(0.0);

    let base = if income <= 600_000.0 {
        0.0
    } else if income <= 1_200_000.0 {
        (income - 600_000.0) * 0.01
    } else if income <= 2_200_000.0 {
        6_000.0 + (income - 1_200_000.0) * 0.11
    } else if income <= 3_200_000.0 {
        116_000.0 + (income - 2_200_000.0) * 0.23
    } else if income <= 4_100_000.0 {
        346_000.0 + (income - 3_200_000.0) * 0.30
    } else {
        616_000.0 + (income - 4_100_000.0) * 0.35
    };

    if income > SURCHARGE_THRESHOLD {
        base * (1.0 + SURCHARGE_RATE)
    } else {
        base
    }
}

/// Monthly tax for a monthly taxable income, rounded to whole rupees.
pub fn monthly_tax(monthly_taxable: f64) -> f64 {
    (annual_tax(monthly_taxable.max(0.0) * 12.0) / 12.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exemption_boundary_is_tax_free() {
        assert_eq!(annual_tax(600_000.0), 0.0);
        assert_eq!(annual_tax(599_999.0), 0.0);
        assert_eq!(annual_tax(0.0), 0.0);
    }

    #[test]
    fn one_percent_bracket_edge() {
        // 1% of the 600k band above the exemption.
        assert_eq!(annual_tax(1_200_000.0), 6_000.0);
    }

    #[test]
    fn upper_bracket_fixed_amounts_chain() {
        assert_eq!(annual_tax(2_200_000.0), 116_000.0);
        assert_eq!(annual_tax(3_200_000.0), 346_000.0);
        assert_eq!(annual_tax(4_100_000.0), 616_000.0);
    }

    #[test]
    fn top_marginal_rate() {
        assert_eq!(annual_tax(4_200_000.0), 616_000.0 + 100_000.0 * 0.35);
    }

    #[test]
    fn surcharge_applies_above_ten_million() {
        let just_below = annual_tax(10_000_000.0);
        let just_above = annual_tax(10_000_001.0);
        assert!(just_above > just_below * 1.08);

        let expected = (616_000.0 + (12_000_000.0 - 4_100_000.0) * 0.35) * 1.09;
        assert_eq!(annual_tax(12_000_000.0), expected);
    }

    #[test]
    fn monthly_tax_annualizes_and_divides() {
        // 100k/month -> 1.2M/year -> 6,000 annual -> 500 monthly.
        assert_eq!(monthly_tax(100_000.0), 500.0);
        // 50k/month -> 600k/year -> exempt.
        assert_eq!(monthly_tax(50_000.0), 0.0);
    }

    #[test]
    fn negative_input_treated_as_zero() {
        assert_eq!(annual_tax(-1.0), 0.0);
        assert_eq!(monthly_tax(-500.0), 0.0);
    }
}
