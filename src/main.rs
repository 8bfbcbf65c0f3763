use anyhow::Result;

use ledgerlens::config::Config;
use ledgerlens::insight::InsightRequester;
use ledgerlens::logging::{log, obj, v_bool, v_str, Level};
use ledgerlens::models::TransactionStatus;
use ledgerlens::provider::ProviderKind;
use ledgerlens::{dashboard, mockdata};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let provider = ProviderKind::from_env().build(&cfg)?;
    log(
        Level::Info,
        "system",
        "startup",
        obj(&[
            ("model", v_str(&cfg.model)),
            ("credential_present", v_bool(provider.is_configured())),
        ]),
    );

    let company = mockdata::company();
    let accounts = mockdata::accounts();
    let transactions = mockdata::transactions();

    dashboard::render_accounts(&company, &accounts);
    dashboard::render_transactions(&transactions);

    let requester = InsightRequester::new(provider, &cfg.company_id);
    let insight = requester.request_insight(&transactions, &cfg.company_name).await;
    dashboard::render_insight(insight.as_ref());

    // Suggest categories for anything still pending review.
    for tx in transactions.iter().filter(|t| t.status == TransactionStatus::Pending) {
        let category = requester.categorize(&tx.description).await;
        println!("Suggested category for \"{}\": {}", tx.description, category);
    }

    Ok(())
}
