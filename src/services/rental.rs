// src/services/rental.rs
//
// Secondary-property cashflow: what the asset earns after vacancy, opex,
// financing and tax, and whether the household as a whole still runs a
// surplus once the rental is bolted on.

use serde::Serialize;

use crate::models::Scenario;
use crate::services::{amort, tax};

/// Rough net-pay proxy applied to gross employment income at the household
/// level; the asset itself is taxed properly at the marginal rate.
pub const NET_PAY_FACTOR: f64 = 0.75;

#[derive(Debug, Clone, Copy)]
pub struct RentalInputs {
    pub price: f64,
    pub down_payment: f64,
    pub contract_rate: f64,
    pub monthly_rent: f64,
    pub vacancy_months: f64,
    pub annual_prop_tax: f64,
    pub strata_mo: f64,
    pub insurance_mo: f64,
    pub rm_mo: f64,
    pub mgmt_pct: f64,
    pub marginal_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RentalAnalysis {
    pub loan: f64,
    pub monthly_pi: f64,
    pub realized_rent: f64,
    pub operating_expenses: f64,
    pub taxable_asset_income: f64,
    pub asset_tax_monthly: f64,
    pub asset_net_monthly: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HouseholdPicture {
    pub monthly_net_income: f64,
    pub primary_housing_cost: f64,
    pub existing_debt_payments: f64,
    pub overall_surplus: f64,
    pub expense_ratio: f64,
    pub verdict: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RentalResult {
    pub asset: RentalAnalysis,
    pub household: HouseholdPicture,
}

pub fn inputs_from(scenario: &Scenario) -> RentalInputs {
    let province = scenario.province();
    let household_income = scenario.num("profile", "p1_t4", 0.0)
        + scenario.num("profile", "p2_t4", 0.0);
    RentalInputs {
        price: scenario.num("affordability_second", "target_price", 600_000.0),
        down_payment: scenario.num("affordability_second", "down_payment", 120_000.0),
        contract_rate: scenario.num("affordability_second", "contract_rate", 5.5),
        monthly_rent: scenario.num("affordability_second", "manual_rent", 2_500.0),
        vacancy_months: scenario.num("affordability_second", "vacancy_months", 0.5).min(12.0),
        annual_prop_tax: scenario.num("affordability_second", "annual_prop_tax", 3_000.0),
        strata_mo: scenario.num("affordability_second", "strata_mo", 0.0),
        insurance_mo: scenario.num("affordability_second", "insurance_mo", 100.0),
        rm_mo: scenario.num("affordability_second", "rm_mo", 150.0),
        mgmt_pct: scenario.num("affordability_second", "mgmt_pct", 0.0),
        marginal_rate: tax::marginal_rate(household_income.max(1.0) / 2.0, province),
    }
}

pub fn analyze_asset(inputs: RentalInputs) -> RentalAnalysis {
    let loan = (inputs.price - inputs.down_payment).max(0.0);
    let monthly_pi = amort::monthly_payment(loan, inputs.contract_rate, 25.0);

    let realized_rent = inputs.monthly_rent * (12.0 - inputs.vacancy_months) / 12.0;
    let operating_expenses = inputs.strata_mo
        + inputs.insurance_mo
        + inputs.rm_mo
        + inputs.mgmt_pct / 100.0 * realized_rent
        + inputs.annual_prop_tax / 12.0;

    // Taxable income counts the hard costs only; management is a cashflow
    // drag but modelled outside the tax line.
    let taxable_asset_income = realized_rent * 12.0
        - (inputs.annual_prop_tax
            + 12.0 * (inputs.insurance_mo + inputs.strata_mo + inputs.rm_mo));
    let asset_tax_monthly =
        (taxable_asset_income * inputs.marginal_rate / 100.0).max(0.0) / 12.0;

    let asset_net_monthly = realized_rent - operating_expenses - monthly_pi - asset_tax_monthly;

    RentalAnalysis {
        loan,
        monthly_pi,
        realized_rent,
        operating_expenses,
        taxable_asset_income,
        asset_tax_monthly,
        asset_net_monthly,
    }
}

pub fn analyze(scenario: &Scenario) -> RentalResult {
    let inputs = inputs_from(scenario);
    let asset = analyze_asset(inputs);

    let gross_employment = scenario.num("profile", "p1_t4", 0.0)
        + scenario.num("profile", "p1_bonus", 0.0)
        + scenario.num("profile", "p1_commission", 0.0)
        + scenario.num("profile", "p2_t4", 0.0)
        + scenario.num("profile", "p2_bonus", 0.0)
        + scenario.num("profile", "p2_commission", 0.0);
    let monthly_net_income = gross_employment * NET_PAY_FACTOR / 12.0
        + scenario.num("profile", "inv_rental_income", 0.0);

    let primary_housing_cost = if scenario.text("profile", "housing_status", "Renting") == "Owning" {
        let m_pmt = amort::monthly_payment(
            scenario.num("profile", "m_bal", 0.0),
            scenario.num("profile", "m_rate", 5.0),
            scenario.num("profile", "m_amort", 25.0).max(1.0),
        );
        m_pmt
            + scenario.num("profile", "prop_taxes", 0.0) / 12.0
            + scenario.num("profile", "heat_pmt", 0.0)
    } else {
        scenario.num("profile", "rent_pmt", 0.0)
    };

    let existing_debt_payments = scenario.num("profile", "car_loan", 0.0)
        + scenario.num("profile", "student_loan", 0.0)
        + scenario.num("profile", "cc_pmt", 0.0);

    let rental_outlay = asset.operating_expenses + asset.monthly_pi + asset.asset_tax_monthly;
    let total_income = monthly_net_income + asset.realized_rent;
    let total_outlays = primary_housing_cost + existing_debt_payments + rental_outlay;
    let overall_surplus = total_income - total_outlays;

    let expense_ratio = if total_income > 0.0 {
        total_outlays / total_income
    } else {
        f64::INFINITY
    };

    RentalResult {
        asset,
        household: HouseholdPicture {
            monthly_net_income,
            primary_housing_cost,
            existing_debt_payments,
            overall_surplus,
            expense_ratio,
            verdict: if overall_surplus >= 0.0 { "Healthy" } else { "Strained" },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> RentalInputs {
        RentalInputs {
            price: 600_000.0,
            down_payment: 150_000.0,
            contract_rate: 5.0,
            monthly_rent: 2_800.0,
            vacancy_months: 1.0,
            annual_prop_tax: 3_600.0,
            strata_mo: 350.0,
            insurance_mo: 100.0,
            rm_mo: 150.0,
            mgmt_pct: 0.0,
            marginal_rate: 43.41,
        }
    }

    #[test]
    fn vacancy_haircuts_rent() {
        let asset = analyze_asset(base_inputs());
        assert!((asset.realized_rent - 2_800.0 * 11.0 / 12.0).abs() < 0.01);
    }

    #[test]
    fn negative_taxable_income_pays_no_tax() {
        let mut inputs = base_inputs();
        inputs.monthly_rent = 400.0;
        let asset = analyze_asset(inputs);
        assert!(asset.taxable_asset_income < 0.0);
        assert_eq!(asset.asset_tax_monthly, 0.0);
    }

    #[test]
    fn all_cash_purchase_has_no_pi() {
        let mut inputs = base_inputs();
        inputs.down_payment = inputs.price;
        let asset = analyze_asset(inputs);
        assert_eq!(asset.loan, 0.0);
        assert_eq!(asset.monthly_pi, 0.0);
        assert!(asset.asset_net_monthly > 0.0);
    }

    #[test]
    fn household_verdict_follows_surplus() {
        let mut scenario = Scenario::new();
        scenario.set("profile", "province", serde_json::json!("ON"));
        scenario.set("profile", "p1_t4", serde_json::json!(160_000.0));
        scenario.set("profile", "housing_status", serde_json::json!("Renting"));
        scenario.set("profile", "rent_pmt", serde_json::json!(2_200.0));
        scenario.set("affordability_second", "target_price", serde_json::json!(600_000.0));
        scenario.set("affordability_second", "down_payment", serde_json::json!(150_000.0));
        scenario.set("affordability_second", "manual_rent", serde_json::json!(2_800.0));
        let result = analyze(&scenario);
        assert_eq!(result.household.verdict, "Healthy");
        assert!(result.household.expense_ratio < 1.0);

        scenario.set("profile", "p1_t4", serde_json::json!(20_000.0));
        let strained = analyze(&scenario);
        assert_eq!(strained.household.verdict, "Strained");
    }
}
