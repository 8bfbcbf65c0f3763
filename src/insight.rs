//! The insight request/response pipeline.
//!
//! Builds an analyst prompt from a transaction batch, submits it to the
//! configured text provider in JSON mode, and defensively maps the untrusted
//! payload into an [`Insight`]. Three outcomes, all non-panicking:
//!
//! - credential absent: a deterministic fallback insight, no network call;
//! - provider responded: an insight with per-field defaults for anything
//!   the payload omits;
//! - transport or parse failure: `None`, logged for diagnostics only.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{now_rfc3339, now_ts_ms};
use crate::logging::{log, obj, v_bool, v_num, v_str, Level};
use crate::models::{Insight, Severity, Transaction};
use crate::provider::TextProvider;

const DEFAULT_TITLE: &str = "Financial Insight";
const DEFAULT_CONTENT: &str = "Analysis complete.";
const FALLBACK_TITLE: &str = "Mock Analysis (No API Key)";
const FALLBACK_CONTENT: &str =
    "Please configure the Gemini API key to see real financial insights generated from your transaction data.";
const UNCATEGORIZED: &str = "Uncategorized";

// Per-process counter folded into insight ids so two calls within the same
// millisecond still get distinct display keys.
static INSIGHT_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_insight_id() -> String {
    format!("ai_{}_{}", now_ts_ms(), INSIGHT_SEQ.fetch_add(1, Ordering::SeqCst))
}

pub struct InsightRequester {
    provider: Box<dyn TextProvider + Send + Sync>,
    company_id: String,
}

impl InsightRequester {
    pub fn new(provider: Box<dyn TextProvider + Send + Sync>, company_id: &str) -> Self {
        Self { provider, company_id: company_id.to_string() }
    }

    /// Analyze a batch of transactions for `company_name`.
    ///
    /// `Some(insight)` is either a provider-generated record or, when no
    /// credential is configured, the deterministic fallback. `None` means
    /// the provider call or its payload failed; callers render an empty
    /// state, never an error.
    pub async fn request_insight(
        &self,
        transactions: &[Transaction],
        company_name: &str,
    ) -> Option<Insight> {
        if !self.provider.is_configured() {
            log(
                Level::Warn,
                "insight",
                "fallback_served",
                obj(&[("reason", v_str("missing_credential"))]),
            );
            return Some(self.fallback_insight());
        }

        let prompt = analysis_prompt(transactions, company_name);
        let payload = match self.provider.generate_structured(&prompt, &insight_schema()).await {
            Ok(p) => p,
            Err(e) => {
                log(
                    Level::Error,
                    "insight",
                    "provider_failed",
                    obj(&[("error", v_str(&e.to_string())), ("tx_count", v_num(transactions.len() as f64))]),
                );
                return None;
            }
        };

        let parsed: Value = match serde_json::from_str(&payload) {
            Ok(v) => v,
            Err(e) => {
                log(
                    Level::Error,
                    "insight",
                    "payload_unparseable",
                    obj(&[("error", v_str(&e.to_string())), ("payload_len", v_num(payload.len() as f64))]),
                );
                return None;
            }
        };

        let insight = self.insight_from_payload(&parsed);
        log(
            Level::Info,
            "insight",
            "insight_generated",
            obj(&[
                ("id", v_str(&insight.id)),
                ("severity", v_str(insight.severity.as_str())),
                ("actionable", v_bool(insight.actionable)),
            ]),
        );
        Some(insight)
    }

    /// One-word category for a transaction description, or `"Uncategorized"`
    /// when no credential is configured, the call fails, or the provider
    /// returns only whitespace. No schema constraint on this response.
    pub async fn categorize(&self, description: &str) -> String {
        if !self.provider.is_configured() {
            return UNCATEGORIZED.to_string();
        }
        let prompt = format!(
            "Categorize this financial transaction description into one word \
             (e.g. Travel, Software, Salary, Tax, Meals): \"{}\"",
            description
        );
        match self.provider.generate(&prompt).await {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    UNCATEGORIZED.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                log(
                    Level::Error,
                    "insight",
                    "categorize_failed",
                    obj(&[("error", v_str(&e.to_string()))]),
                );
                UNCATEGORIZED.to_string()
            }
        }
    }

    /// The payload is untrusted text; every field defaults individually
    /// rather than assuming schema conformance.
    fn insight_from_payload(&self, parsed: &Value) -> Insight {
        Insight {
            id: next_insight_id(),
            company_id: self.company_id.clone(),
            title: parsed
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            content: parsed
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_CONTENT)
                .to_string(),
            severity: parsed
                .get("severity")
                .and_then(Value::as_str)
                .map(Severity::parse_or_info)
                .unwrap_or(Severity::Info),
            created_at: now_rfc3339(),
            actionable: parsed.get("actionable").and_then(Value::as_bool).unwrap_or(false),
        }
    }

    fn fallback_insight(&self) -> Insight {
        Insight {
            id: next_insight_id(),
            company_id: self.company_id.clone(),
            title: FALLBACK_TITLE.to_string(),
            content: FALLBACK_CONTENT.to_string(),
            severity: Severity::Info,
            created_at: now_rfc3339(),
            actionable: false,
        }
    }
}

fn analysis_prompt(transactions: &[Transaction], company_name: &str) -> String {
    let summary: Vec<String> = transactions.iter().map(Transaction::prompt_line).collect();
    format!(
        "You are a senior financial analyst AI for a fintech SaaS.\n\
         Analyze the following recent transactions for company \"{}\".\n\n\
         Transactions:\n{}\n\n\
         Identify 1 key financial trend, anomaly, or saving opportunity.\n\
         Keep it professional, concise, and actionable.",
        company_name,
        summary.join("\n")
    )
}

fn insight_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING" },
            "severity": { "type": "STRING", "enum": ["info", "warning", "critical"] },
            "actionable": { "type": "BOOLEAN" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionStatus, TransactionType};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    /// Scripted provider double: canned response or forced failure, with a
    /// call counter so tests can assert the network was (not) touched.
    struct Scripted {
        configured: bool,
        response: Result<String, String>,
        calls: Arc<AtomicU32>,
    }

    impl Scripted {
        fn ok(body: &str) -> Self {
            Self {
                configured: true,
                response: Ok(body.to_string()),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                configured: true,
                response: Err(msg.to_string()),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                response: Err("unreachable".to_string()),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn respond(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(s) => Ok(s.clone()),
                Err(m) => Err(anyhow!(m.clone())),
            }
        }
    }

    #[async_trait]
    impl TextProvider for Scripted {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.respond()
        }

        async fn generate_structured(&self, _prompt: &str, _schema: &Value) -> Result<String> {
            self.respond()
        }
    }

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                id: "tx_1".to_string(),
                company_id: "c_999".to_string(),
                account_id: "acc_1".to_string(),
                amount: 15000.0,
                tx_type: TransactionType::Income,
                date: "2023-10-25".to_string(),
                description: "Client Payment - Project Alpha".to_string(),
                status: TransactionStatus::Completed,
            },
            Transaction {
                id: "tx_2".to_string(),
                company_id: "c_999".to_string(),
                account_id: "acc_1".to_string(),
                amount: -4500.0,
                tx_type: TransactionType::Expense,
                date: "2023-10-26".to_string(),
                description: "AWS Infrastructure Bill".to_string(),
                status: TransactionStatus::Completed,
            },
        ]
    }

    #[tokio::test]
    async fn missing_credential_serves_fallback_without_network() {
        let provider = Scripted::unconfigured();
        let requester = InsightRequester::new(Box::new(provider), "c_999");

        let insight = requester.request_insight(&[], "Acme").await.expect("fallback expected");
        assert_eq!(insight.title, "Mock Analysis (No API Key)");
        assert_eq!(insight.severity, Severity::Info);
        assert!(!insight.actionable);
        assert_eq!(insight.company_id, "c_999");
    }

    #[tokio::test]
    async fn fallback_path_never_calls_provider() {
        let provider = Scripted::unconfigured();
        let calls = provider.calls.clone();
        let requester = InsightRequester::new(Box::new(provider), "c_999");

        let insight = requester.request_insight(&sample_transactions(), "Acme").await;
        assert!(insight.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn full_payload_is_reflected() {
        let body = r#"{"title":"Burn rate rising","content":"Cloud spend doubled.","severity":"warning","actionable":true}"#;
        let provider = Scripted::ok(body);
        let calls = provider.calls.clone();
        let requester = InsightRequester::new(Box::new(provider), "c_999");

        let insight = requester
            .request_insight(&sample_transactions(), "Acme")
            .await
            .expect("insight expected");
        assert_eq!(insight.title, "Burn rate rising");
        assert_eq!(insight.content, "Cloud spend doubled.");
        assert_eq!(insight.severity, Severity::Warning);
        assert!(insight.actionable);
        // At-most-once: exactly one outbound request per invocation.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_fields_take_named_defaults() {
        let requester = InsightRequester::new(Box::new(Scripted::ok(r#"{"title":"X"}"#)), "c_999");

        let insight = requester.request_insight(&[], "Acme").await.expect("insight expected");
        assert_eq!(insight.title, "X");
        assert_eq!(insight.content, "Analysis complete.");
        assert_eq!(insight.severity, Severity::Info);
        assert!(!insight.actionable);
    }

    #[tokio::test]
    async fn wrong_typed_fields_take_defaults_too() {
        let body = r#"{"title":42,"content":null,"severity":"catastrophic","actionable":"yes"}"#;
        let requester = InsightRequester::new(Box::new(Scripted::ok(body)), "c_999");

        let insight = requester.request_insight(&[], "Acme").await.expect("insight expected");
        assert_eq!(insight.title, "Financial Insight");
        assert_eq!(insight.content, "Analysis complete.");
        assert_eq!(insight.severity, Severity::Info);
        assert!(!insight.actionable);
    }

    #[tokio::test]
    async fn transport_failure_yields_none() {
        let requester =
            InsightRequester::new(Box::new(Scripted::failing("connection reset")), "c_999");
        assert!(requester.request_insight(&sample_transactions(), "Acme").await.is_none());
    }

    #[tokio::test]
    async fn non_json_payload_yields_none() {
        let requester =
            InsightRequester::new(Box::new(Scripted::ok("I am not JSON, sorry.")), "c_999");
        assert!(requester.request_insight(&[], "Acme").await.is_none());
    }

    #[tokio::test]
    async fn insight_ids_are_unique_within_process() {
        let requester = InsightRequester::new(Box::new(Scripted::ok("{}")), "c_999");
        let a = requester.request_insight(&[], "Acme").await.unwrap();
        let b = requester.request_insight(&[], "Acme").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn categorize_without_credential() {
        let requester = InsightRequester::new(Box::new(Scripted::unconfigured()), "c_999");
        assert_eq!(requester.categorize("Team Lunch").await, "Uncategorized");
    }

    #[tokio::test]
    async fn categorize_trims_provider_text() {
        let requester = InsightRequester::new(Box::new(Scripted::ok("  Meals\n")), "c_999");
        assert_eq!(requester.categorize("Team Lunch").await, "Meals");
    }

    #[tokio::test]
    async fn categorize_failure_and_blank_both_uncategorized() {
        let failing = InsightRequester::new(Box::new(Scripted::failing("timeout")), "c_999");
        assert_eq!(failing.categorize("Team Lunch").await, "Uncategorized");

        let blank = InsightRequester::new(Box::new(Scripted::ok("   \n")), "c_999");
        assert_eq!(blank.categorize("Team Lunch").await, "Uncategorized");
    }

    #[test]
    fn prompt_carries_company_and_lines_in_order() {
        let prompt = analysis_prompt(&sample_transactions(), "Acme");
        assert!(prompt.contains("company \"Acme\""));
        let first = prompt.find("2023-10-25: Client Payment - Project Alpha (15000 income)").unwrap();
        let second = prompt.find("2023-10-26: AWS Infrastructure Bill (-4500 expense)").unwrap();
        assert!(first < second);
    }

    #[test]
    fn schema_names_all_four_fields() {
        let schema = insight_schema();
        for field in ["title", "content", "severity", "actionable"] {
            assert!(schema["properties"].get(field).is_some(), "missing {}", field);
        }
    }
}
