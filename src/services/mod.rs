// src/services/mod.rs

pub mod affordability;
pub mod amort;
pub mod banklink;
pub mod boc;
pub mod brrrr;
pub mod budget;
pub mod buy_vs_rent;
pub mod fire;
pub mod intel_store;
pub mod land_residual;
pub mod legislative;
pub mod llm;
pub mod market_intel;
pub mod membership;
pub mod net_sheet;
pub mod net_worth;
pub mod pay_vs_invest;
pub mod rental;
pub mod rental_vs_stock;
pub mod renewal;
pub mod scenario_store;
pub mod smith;
pub mod tax;
pub mod tfsa_rrsp;
pub mod vault;
