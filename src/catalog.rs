//! Investment product catalog and reference rates
//!
//! Static reference data; nothing here is fetched live.

use crate::models::InvestmentType;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentOption {
    pub investment_type: InvestmentType,
    pub name: &'static str,
    pub description: &'static str,
    pub min_amount: f64,
    pub expected_return: f64,
    pub risk: &'static str,
    pub liquidity: &'static str,
    pub how_to_start: &'static str,
}

pub fn investment_option(investment_type: InvestmentType) -> InvestmentOption {
    let (name, description, min_amount, risk, liquidity) = match investment_type {
        InvestmentType::EmergencyFund => (
            "Emergency Fund",
            "Money for immediate withdrawal (savings account)",
            500.0,
            "Very Low",
            "Immediate",
        ),
        InvestmentType::Fd => (
            "Fixed Deposit (FD)",
            "Safe bank investment with guaranteed returns",
            1000.0,
            "Very Low",
            "Low",
        ),
        InvestmentType::MutualFundSip => (
            "Mutual Fund SIP",
            "Stock market investment, moderate risk but better returns",
            500.0,
            "Medium",
            "Medium",
        ),
        InvestmentType::Ppf => (
            "PPF (Public Provident Fund)",
            "Tax savings and steady returns with a 15-year lock-in",
            500.0,
            "Very Low",
            "Very Low",
        ),
        InvestmentType::Gold => (
            "Digital Gold",
            "Buy gold to hedge against inflation",
            100.0,
            "Low",
            "High",
        ),
        InvestmentType::RecurringDeposit => (
            "Recurring Deposit (RD)",
            "Deposit a fixed amount every month",
            500.0,
            "Very Low",
            "Medium",
        ),
    };

    InvestmentOption {
        investment_type,
        name,
        description,
        min_amount,
        expected_return: investment_type.expected_return(),
        risk,
        liquidity,
        how_to_start: how_to_start(investment_type),
    }
}

pub fn all_options() -> Vec<InvestmentOption> {
    InvestmentType::ALL.into_iter().map(investment_option).collect()
}

/// Actionable first step for a product
pub fn how_to_start(investment_type: InvestmentType) -> &'static str {
    match investment_type {
        InvestmentType::EmergencyFund => {
            "Keep in a high-yield savings account or liquid mutual fund for immediate access"
        }
        InvestmentType::Fd => "Open a fixed deposit with a reliable bank for guaranteed returns",
        InvestmentType::MutualFundSip => {
            "Start a SIP in diversified equity mutual funds through an investment app"
        }
        InvestmentType::Ppf => {
            "Open a PPF account at a bank or post office for long-term tax-free growth"
        }
        InvestmentType::Gold => {
            "Invest in digital gold or Gold ETFs through a mutual fund platform"
        }
        InvestmentType::RecurringDeposit => "Set up a monthly recurring deposit with your bank",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BankRate {
    pub bank: &'static str,
    pub rate: f64,
}

/// Reference market rates, annual percent
#[derive(Debug, Clone, Serialize)]
pub struct CurrentRates {
    pub inflation: f64,
    pub repo_rate: f64,
    pub savings_rate: f64,
    pub ppf_rate: f64,
    pub fd_rates: Vec<BankRate>,
}

pub fn current_rates() -> CurrentRates {
    CurrentRates {
        inflation: 6.2,
        repo_rate: 6.5,
        savings_rate: 4.0,
        ppf_rate: InvestmentType::Ppf.expected_return(),
        fd_rates: vec![
            BankRate { bank: "SBI", rate: 6.7 },
            BankRate { bank: "HDFC Bank", rate: 7.0 },
            BankRate { bank: "ICICI Bank", rate: 7.0 },
            BankRate { bank: "Post Office", rate: 6.9 },
        ],
    }
}
