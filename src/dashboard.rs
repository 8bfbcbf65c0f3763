//! Read-only terminal rendering of the mock ledger and the insight card.
//! Pure formatting; no logic beyond picking labels.

use comfy_table::{Cell, Table};

use crate::fmt::money;
use crate::models::{Company, FinancialAccount, Insight, Transaction};

pub fn render_accounts(company: &Company, accounts: &[FinancialAccount]) {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Currency", "Balance"]);
    for acc in accounts {
        table.add_row(vec![
            Cell::new(&acc.id),
            Cell::new(&acc.name),
            Cell::new(acc.account_type.as_str()),
            Cell::new(&acc.currency),
            Cell::new(money(acc.balance)),
        ]);
    }
    println!("Accounts ({})\n{table}", company.name);
}

pub fn render_transactions(transactions: &[Transaction]) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Type", "Status"]);
    for tx in transactions {
        table.add_row(vec![
            Cell::new(&tx.date),
            Cell::new(&tx.description),
            Cell::new(money(tx.amount)),
            Cell::new(tx.tx_type.as_str()),
            Cell::new(tx.status.as_str()),
        ]);
    }
    println!("Recent Transactions\n{table}");
}

/// `None` renders the neutral empty state; failure never reaches the user
/// as an error.
pub fn render_insight(insight: Option<&Insight>) {
    match insight {
        Some(i) => {
            let tag = if i.actionable { " [actionable]" } else { "" };
            println!("AI Insight ({}{}): {}", i.severity.as_str(), tag, i.title);
            println!("  {}", i.content);
            println!("  generated {} [{}]", i.created_at, i.id);
        }
        None => println!("AI Insight: no insight available right now."),
    }
}
