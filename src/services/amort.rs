// src/services/amort.rs
//
// Mortgage payment math: closed-form level payments, the B-20 stress rate,
// month-by-month payoff schedules with prepayment and bi-weekly
// acceleration, and the annuity future value used on the savings side of
// comparisons.

use serde::Serialize;

/// Hard cap on projected months. 100 years; anything longer means the
/// payment does not cover interest and the schedule would never close.
pub const MAX_MONTHS: usize = 1200;

/// Minimum qualifying rate floor, percent.
pub const STRESS_FLOOR: f64 = 5.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentFrequency {
    Monthly,
    BiweeklyAccelerated,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthRow {
    pub month: u32,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
    pub cum_interest: f64,
}

/// Standard level-pay monthly payment. A zero rate degenerates to straight
/// principal division.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, amort_years: f64) -> f64 {
    let principal = principal.max(0.0);
    let months = (amort_years.max(1.0 / 12.0) * 12.0).round();
    let i = annual_rate_pct / 100.0 / 12.0;
    if i.abs() < 1e-12 {
        return principal / months;
    }
    principal * i / (1.0 - (1.0 + i).powf(-months))
}

/// Qualifying (stress) rate: the greater of the floor and contract + 2%.
pub fn stress_rate(contract_rate_pct: f64) -> f64 {
    STRESS_FLOOR.max(contract_rate_pct + 2.0)
}

/// Payment at the stressed rate, used for GDS/TDS qualification.
pub fn qualifying_payment(principal: f64, contract_rate_pct: f64, amort_years: f64) -> f64 {
    monthly_payment(principal, stress_rate(contract_rate_pct), amort_years)
}

/// Inverse of `monthly_payment`: the largest principal a given payment
/// services at `annual_rate_pct` over `amort_years`.
pub fn solve_principal_for_payment(payment: f64, annual_rate_pct: f64, amort_years: f64) -> f64 {
    let payment = payment.max(0.0);
    let months = (amort_years.max(1.0 / 12.0) * 12.0).round();
    let i = annual_rate_pct / 100.0 / 12.0;
    if i.abs() < 1e-12 {
        return payment * months;
    }
    payment * (1.0 - (1.0 + i).powf(-months)) / i
}

/// Future value of a level monthly deposit stream at a nominal annual rate.
pub fn future_value_of_annuity(monthly_deposit: f64, annual_rate_pct: f64, months: u32) -> f64 {
    let i = annual_rate_pct / 100.0 / 12.0;
    let n = months as f64;
    if i.abs() < 1e-12 {
        return monthly_deposit * n;
    }
    monthly_deposit * ((1.0 + i).powf(n) - 1.0) / i
}

/// Lazy month-by-month payoff projection. Extra payments shorten the
/// schedule, never lengthen it; the iterator stops once the balance reaches
/// zero or `MAX_MONTHS` elapses.
pub fn schedule_until_paid_off(
    principal: f64,
    annual_rate_pct: f64,
    amort_years: f64,
    extra_monthly: f64,
    frequency: PaymentFrequency,
) -> Schedule {
    let base_payment = monthly_payment(principal, annual_rate_pct, amort_years);
    Schedule {
        balance: principal.max(0.0),
        annual_rate_pct,
        base_payment,
        extra_monthly: extra_monthly.max(0.0),
        frequency,
        month: 0,
        cum_interest: 0.0,
    }
}

pub struct Schedule {
    balance: f64,
    annual_rate_pct: f64,
    base_payment: f64,
    extra_monthly: f64,
    frequency: PaymentFrequency,
    month: u32,
    cum_interest: f64,
}

impl Iterator for Schedule {
    type Item = MonthRow;

    fn next(&mut self) -> Option<MonthRow> {
        if self.balance <= 0.0 || self.month as usize >= MAX_MONTHS {
            return None;
        }
        self.month += 1;

        let (interest, mut principal_paid) = match self.frequency {
            PaymentFrequency::Monthly => {
                let i = self.annual_rate_pct / 100.0 / 12.0;
                let interest = self.balance * i;
                let principal = (self.base_payment - interest).max(0.0);
                (interest, principal)
            }
            PaymentFrequency::BiweeklyAccelerated => {
                // 26 half-payments a year projected as two periods per
                // month, with the two leftover half-payments landing as
                // mid-year and year-end prepayments.
                let period_rate = self.annual_rate_pct / 100.0 / 26.0;
                let half_payment = self.base_payment / 2.0;
                let mut interest = 0.0;
                let mut principal = 0.0;
                let mut bal = self.balance;
                for _ in 0..2 {
                    if bal <= 0.0 {
                        break;
                    }
                    let int = bal * period_rate;
                    let prin = (half_payment - int).max(0.0).min(bal);
                    interest += int;
                    principal += prin;
                    bal -= prin;
                }
                if self.month % 6 == 0 {
                    principal += half_payment;
                }
                (interest, principal)
            }
        };

        principal_paid += self.extra_monthly;
        if principal_paid > self.balance {
            principal_paid = self.balance;
        }

        // Sub-cent residue folds into the final payment instead of
        // spilling into a phantom closing month.
        let mut new_balance = self.balance - principal_paid;
        if new_balance < 0.01 {
            principal_paid += new_balance.max(0.0);
            new_balance = 0.0;
        }
        self.balance = new_balance;
        self.cum_interest += interest;

        Some(MonthRow {
            month: self.month,
            interest,
            principal: principal_paid,
            balance: self.balance,
            cum_interest: self.cum_interest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_straight_division() {
        let pmt = monthly_payment(120_000.0, 0.0, 10.0);
        assert!((pmt - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn stress_rate_floors_at_525() {
        assert_eq!(stress_rate(2.5), 5.25);
        assert_eq!(stress_rate(4.26), 6.26);
    }

    #[test]
    fn payment_solve_round_trips() {
        let pmt = monthly_payment(500_000.0, 5.0, 25.0);
        let principal = solve_principal_for_payment(pmt, 5.0, 25.0);
        assert!((principal - 500_000.0).abs() < 1.0);
    }

    #[test]
    fn schedule_conserves_principal() {
        let rows: Vec<_> =
            schedule_until_paid_off(300_000.0, 5.5, 25.0, 0.0, PaymentFrequency::Monthly).collect();
        let total_principal: f64 = rows.iter().map(|r| r.principal).sum();
        assert!((total_principal - 300_000.0).abs() < 1.0);
        assert_eq!(rows.last().unwrap().balance, 0.0);
        assert!(rows.len() <= 300);
    }

    #[test]
    fn extra_payments_shorten_schedule() {
        let base = schedule_until_paid_off(400_000.0, 4.5, 25.0, 0.0, PaymentFrequency::Monthly)
            .count();
        let accelerated =
            schedule_until_paid_off(400_000.0, 4.5, 25.0, 500.0, PaymentFrequency::Monthly).count();
        assert!(accelerated < base);
    }

    #[test]
    fn biweekly_finishes_strictly_earlier_than_monthly() {
        let monthly = schedule_until_paid_off(500_000.0, 5.0, 25.0, 0.0, PaymentFrequency::Monthly)
            .count();
        let biweekly =
            schedule_until_paid_off(500_000.0, 5.0, 25.0, 0.0, PaymentFrequency::BiweeklyAccelerated)
                .count();
        assert!(biweekly < monthly, "biweekly {} vs monthly {}", biweekly, monthly);
    }

    #[test]
    fn absurd_amortization_bails_at_cap() {
        // A 120-year amortization schedules more months than the guard
        // allows; the iterator stops at the cap with balance outstanding.
        let rows: Vec<_> =
            schedule_until_paid_off(1_000_000.0, 5.0, 120.0, 0.0, PaymentFrequency::Monthly)
                .collect();
        assert_eq!(rows.len(), MAX_MONTHS);
        assert!(rows.last().unwrap().balance > 0.0);
    }

    #[test]
    fn annuity_future_value_zero_rate() {
        assert!((future_value_of_annuity(100.0, 0.0, 120) - 12_000.0).abs() < 1e-9);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(proptest::test_runner::Config::with_cases(32))]

            #[test]
            fn principal_conservation(
                principal in 50_000.0..900_000.0f64,
                rate in 0.5..9.0f64,
                years in 5.0..30.0f64,
                extra in 0.0..1_500.0f64,
            ) {
                let rows: Vec<_> = schedule_until_paid_off(
                    principal, rate, years, extra, PaymentFrequency::Monthly,
                ).collect();
                let paid: f64 = rows.iter().map(|r| r.principal).sum();
                prop_assert!((paid - principal).abs() < 1.0);
                prop_assert!(rows.len() <= (years * 12.0).round() as usize);
            }

            #[test]
            fn more_extra_never_longer(
                principal in 100_000.0..800_000.0f64,
                rate in 1.0..8.0f64,
                extra in 0.0..1_000.0f64,
            ) {
                let base = schedule_until_paid_off(
                    principal, rate, 25.0, extra, PaymentFrequency::Monthly,
                ).count();
                let more = schedule_until_paid_off(
                    principal, rate, 25.0, extra + 250.0, PaymentFrequency::Monthly,
                ).count();
                prop_assert!(more <= base);
            }
        }
    }
}
