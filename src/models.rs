use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Transfer => "transfer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

/// One ledger entry. Immutable once constructed; no mutation path exists
/// in this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub company_id: String,
    pub account_id: String,
    /// Signed: income positive, expenses negative.
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// ISO date, e.g. "2023-10-25".
    pub date: String,
    pub description: String,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Single-line form embedded in analysis prompts:
    /// `date: description (amount type)`.
    pub fn prompt_line(&self) -> String {
        format!(
            "{}: {} ({} {})",
            self.date,
            self.description,
            self.amount,
            self.tx_type.as_str()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    #[serde(rename = "credit_card")]
    CreditCard,
    Investment,
    Cash,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::CreditCard => "credit_card",
            AccountType::Investment => "investment",
            AccountType::Cash => "cash",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAccount {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub balance: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub plan: String,
}

/// Severity tag attached to generated insights. Unknown wire values decode
/// to `Info` rather than failing the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn parse_or_info(s: &str) -> Self {
        match s {
            "warning" => Severity::Warning,
            "critical" => Severity::Critical,
            _ => Severity::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// An AI-generated observation about recent financial activity. Produced
/// transiently per request and complete once constructed; there is no
/// partial or streaming state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub content: String,
    pub severity: Severity,
    /// RFC 3339 creation time.
    pub created_at: String,
    pub actionable: bool,
}
