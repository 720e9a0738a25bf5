// src/services/pay_vs_invest.rs
//
// The classic prepay-or-invest question on an equal-outlay footing: both
// legs commit payment + extra every month until the baseline mortgage
// would have discharged. The prepay leg kills the loan early and then
// invests the whole freed-up payment; the invest leg keeps the scheduled
// payment and invests the extra from day one.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::amort;
use crate::services::amort::PaymentFrequency;

#[derive(Debug, Clone, Copy)]
pub struct PayVsInvestInputs {
    pub mortgage_balance: f64,
    pub mortgage_rate: f64,
    pub amort_years: f64,
    pub extra_monthly: f64,
    pub invest_return: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayVsInvestResult {
    pub baseline_months: u32,
    pub prepay_months: u32,
    pub months_shaved: u32,
    pub interest_saved: f64,
    pub invest_leg_wealth: f64,
    pub prepay_leg_wealth: f64,
    pub verdict: &'static str,
}

pub fn inputs_from(scenario: &Scenario) -> PayVsInvestInputs {
    PayVsInvestInputs {
        mortgage_balance: scenario.num("pay_vs_invest", "mortgage_balance", 500_000.0),
        mortgage_rate: scenario.num("pay_vs_invest", "mortgage_rate", 5.0),
        amort_years: scenario.num("pay_vs_invest", "amort_years", 25.0).max(1.0),
        extra_monthly: scenario.num("pay_vs_invest", "extra_monthly", 500.0),
        invest_return: scenario.num("pay_vs_invest", "invest_return", 7.0),
    }
}

pub fn compare(inputs: PayVsInvestInputs) -> PayVsInvestResult {
    let payment = amort::monthly_payment(
        inputs.mortgage_balance,
        inputs.mortgage_rate,
        inputs.amort_years,
    );

    let baseline: Vec<_> = amort::schedule_until_paid_off(
        inputs.mortgage_balance,
        inputs.mortgage_rate,
        inputs.amort_years,
        0.0,
        PaymentFrequency::Monthly,
    )
    .collect();
    let prepay: Vec<_> = amort::schedule_until_paid_off(
        inputs.mortgage_balance,
        inputs.mortgage_rate,
        inputs.amort_years,
        inputs.extra_monthly,
        PaymentFrequency::Monthly,
    )
    .collect();

    let baseline_interest = baseline.last().map(|r| r.cum_interest).unwrap_or(0.0);
    let prepay_interest = prepay.last().map(|r| r.cum_interest).unwrap_or(0.0);
    let baseline_months = baseline.len() as u32;
    let prepay_months = prepay.len() as u32;
    let months_shaved = baseline_months.saturating_sub(prepay_months);

    // Invest leg: the extra compounds over the full baseline horizon.
    let invest_leg_wealth = amort::future_value_of_annuity(
        inputs.extra_monthly,
        inputs.invest_return,
        baseline_months,
    );

    // Prepay leg: debt-free at prepay_months, then the entire payment
    // stream goes to the portfolio for the months the baseline still owes.
    let prepay_leg_wealth = amort::future_value_of_annuity(
        payment + inputs.extra_monthly,
        inputs.invest_return,
        months_shaved,
    );

    PayVsInvestResult {
        baseline_months,
        prepay_months,
        months_shaved,
        interest_saved: baseline_interest - prepay_interest,
        invest_leg_wealth,
        prepay_leg_wealth,
        verdict: if invest_leg_wealth > prepay_leg_wealth {
            "invest"
        } else {
            "prepay"
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> PayVsInvestInputs {
        PayVsInvestInputs {
            mortgage_balance: 500_000.0,
            mortgage_rate: 5.0,
            amort_years: 25.0,
            extra_monthly: 500.0,
            invest_return: 7.0,
        }
    }

    #[test]
    fn prepaying_shaves_months_and_interest() {
        let result = compare(base_inputs());
        assert!(result.months_shaved > 0);
        assert!(result.interest_saved > 0.0);
        assert_eq!(result.baseline_months, 300);
        assert!(result.prepay_months < 300);
    }

    #[test]
    fn return_above_mortgage_rate_favours_investing() {
        let mut inputs = base_inputs();
        inputs.invest_return = 10.0;
        assert_eq!(compare(inputs).verdict, "invest");
    }

    #[test]
    fn zero_return_favours_prepaying() {
        // With nothing earned on investments, retiring 5% debt early and
        // banking the freed payment wins.
        let mut inputs = base_inputs();
        inputs.invest_return = 0.0;
        let result = compare(inputs);
        assert_eq!(result.verdict, "prepay");
        assert!(result.prepay_leg_wealth > result.invest_leg_wealth);
    }

    #[test]
    fn no_extra_stream_is_a_neutral_prepay() {
        let mut inputs = base_inputs();
        inputs.extra_monthly = 0.0;
        let result = compare(inputs);
        assert_eq!(result.months_shaved, 0);
        assert!(result.interest_saved.abs() < 0.01);
        assert_eq!(result.invest_leg_wealth, 0.0);
        assert_eq!(result.prepay_leg_wealth, 0.0);
    }
}
