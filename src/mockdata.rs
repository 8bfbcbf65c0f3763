//! Seeded records backing the dashboard. No persistence layer exists; these
//! stand in for whatever ledger the insight pipeline would read in a real
//! deployment.

use crate::models::{
    AccountType, Company, FinancialAccount, Transaction, TransactionStatus, TransactionType,
};

pub fn company() -> Company {
    Company {
        id: "c_999".to_string(),
        name: "Global Tech Solutions Inc.".to_string(),
        plan: "pro".to_string(),
    }
}

pub fn accounts() -> Vec<FinancialAccount> {
    vec![
        FinancialAccount {
            id: "acc_1".to_string(),
            company_id: "c_999".to_string(),
            name: "Main Operations".to_string(),
            account_type: AccountType::Checking,
            currency: "USD".to_string(),
            balance: 145000.50,
            is_active: true,
        },
        FinancialAccount {
            id: "acc_2".to_string(),
            company_id: "c_999".to_string(),
            name: "Tax Reserve".to_string(),
            account_type: AccountType::Savings,
            currency: "USD".to_string(),
            balance: 52000.00,
            is_active: true,
        },
        FinancialAccount {
            id: "acc_3".to_string(),
            company_id: "c_999".to_string(),
            name: "Corporate Amex".to_string(),
            account_type: AccountType::CreditCard,
            currency: "USD".to_string(),
            balance: -3200.45,
            is_active: true,
        },
    ]
}

pub fn transactions() -> Vec<Transaction> {
    let tx = |id: &str, account: &str, amount: f64, tx_type, date: &str, desc: &str, status| {
        Transaction {
            id: id.to_string(),
            company_id: "c_999".to_string(),
            account_id: account.to_string(),
            amount,
            tx_type,
            date: date.to_string(),
            description: desc.to_string(),
            status,
        }
    };
    vec![
        tx(
            "tx_1",
            "acc_1",
            15000.0,
            TransactionType::Income,
            "2023-10-25",
            "Client Payment - Project Alpha",
            TransactionStatus::Completed,
        ),
        tx(
            "tx_2",
            "acc_1",
            -4500.0,
            TransactionType::Expense,
            "2023-10-26",
            "AWS Infrastructure Bill",
            TransactionStatus::Completed,
        ),
        tx(
            "tx_3",
            "acc_3",
            -120.0,
            TransactionType::Expense,
            "2023-10-27",
            "Team Lunch",
            TransactionStatus::Pending,
        ),
        tx(
            "tx_4",
            "acc_1",
            -2100.0,
            TransactionType::Expense,
            "2023-10-28",
            "Software Licenses (Adobe, JetBrains)",
            TransactionStatus::Completed,
        ),
        tx(
            "tx_5",
            "acc_1",
            8500.0,
            TransactionType::Income,
            "2023-10-29",
            "Consulting Retainer",
            TransactionStatus::Completed,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_records_belong_to_one_company() {
        let company = company();
        assert!(accounts().iter().all(|a| a.company_id == company.id));
        assert!(transactions().iter().all(|t| t.company_id == company.id));
    }

    #[test]
    fn seed_transaction_ids_are_distinct() {
        let txs = transactions();
        let mut ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), txs.len());
    }
}
