// src/services/budget.rs
//
// Monthly household budget: net pay via the tax tables against the
// itemized spending lines the UI collects, with housing and debt pulled
// from the profile so the numbers agree with the other analyses.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::{amort, tax};

#[derive(Debug, Clone, Serialize)]
pub struct BudgetLine {
    pub label: String,
    pub monthly: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetResult {
    pub monthly_net_income: f64,
    pub lines: Vec<BudgetLine>,
    pub total_spending: f64,
    pub surplus: f64,
    pub savings_rate: f64,
}

fn net_monthly_income(scenario: &Scenario) -> f64 {
    let province = scenario.province();
    let mut net = 0.0;
    for person in ["p1", "p2"] {
        let gross = scenario.num("profile", &format!("{}_t4", person), 0.0)
            + scenario.num("profile", &format!("{}_bonus", person), 0.0)
            + scenario.num("profile", &format!("{}_commission", person), 0.0);
        net += gross - tax::cumulative_tax(gross, province);
    }
    net / 12.0 + scenario.num("profile", "inv_rental_income", 0.0)
}

pub fn analyze(scenario: &Scenario) -> BudgetResult {
    let monthly_net_income = net_monthly_income(scenario);

    let housing = if scenario.text("profile", "housing_status", "Renting") == "Owning" {
        amort::monthly_payment(
            scenario.num("profile", "m_bal", 0.0),
            scenario.num("profile", "m_rate", 5.0),
            scenario.num("profile", "m_amort", 25.0).max(1.0),
        ) + scenario.num("profile", "prop_taxes", 0.0) / 12.0
            + scenario.num("profile", "heat_pmt", 0.0)
    } else {
        scenario.num("profile", "rent_pmt", 0.0)
    };

    let mut lines = vec![BudgetLine { label: "Housing".to_string(), monthly: housing }];
    for (label, key) in [
        ("Car loan", "car_loan"),
        ("Student loan", "student_loan"),
        ("Credit cards", "cc_pmt"),
    ] {
        lines.push(BudgetLine {
            label: label.to_string(),
            monthly: scenario.num("profile", key, 0.0),
        });
    }
    for (label, key) in [
        ("Groceries", "groceries"),
        ("Transport", "transport"),
        ("Insurance", "insurance"),
        ("Childcare", "childcare"),
        ("Subscriptions", "subscriptions"),
        ("Discretionary", "discretionary"),
    ] {
        lines.push(BudgetLine {
            label: label.to_string(),
            monthly: scenario.num("budget", key, 0.0),
        });
    }

    let total_spending: f64 = lines.iter().map(|l| l.monthly).sum();
    let surplus = monthly_net_income - total_spending;
    let savings_rate = if monthly_net_income > 0.0 {
        (surplus / monthly_net_income).max(-1.0)
    } else {
        0.0
    };

    BudgetResult {
        monthly_net_income,
        lines,
        total_spending,
        surplus,
        savings_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn surplus_balances_income_and_spending() {
        let mut s = Scenario::new();
        s.set("profile", "province", json!("ON"));
        s.set("profile", "p1_t4", json!(100_000.0));
        s.set("profile", "rent_pmt", json!(2_000.0));
        s.set("budget", "groceries", json!(800.0));
        s.set("budget", "transport", json!(300.0));
        let result = analyze(&s);
        assert!((result.surplus - (result.monthly_net_income - 3_100.0)).abs() < 0.01);
        assert!(result.monthly_net_income > 0.0);
        assert!(result.savings_rate > 0.0 && result.savings_rate < 1.0);
    }

    #[test]
    fn empty_profile_spends_and_earns_nothing() {
        let result = analyze(&Scenario::new());
        assert_eq!(result.monthly_net_income, 0.0);
        assert_eq!(result.total_spending, 0.0);
        assert_eq!(result.savings_rate, 0.0);
    }
}
