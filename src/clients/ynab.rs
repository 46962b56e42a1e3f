//! Budget API client (YNAB)
//!
//! Amounts on the wire are milliunits (thousandths of the currency unit).
//! Budget and account are resolved by name once, at connect time.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{BudgetSettings, Secret};
use crate::error::{BridgeResult, SyncError};
use crate::models::{
    BudgetTransactionDraft, CandidateMarker, CandidateTransaction, FlagColor, Money,
};

use super::http::{build_client, send_json};
use super::BudgetApi;

pub const YNAB_BASE_URL: &str = "https://api.youneedabudget.com/v1";

const PAYEE_MAX_LEN: usize = 200;
const MEMO_MAX_LEN: usize = 500;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct BudgetsData {
    budgets: Vec<NamedEntity>,
}

#[derive(Debug, Deserialize)]
struct AccountsData {
    accounts: Vec<AccountDto>,
}

#[derive(Debug, Deserialize)]
struct NamedEntity {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    id: String,
    name: String,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct TransactionsData {
    transactions: Vec<TransactionDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransactionDto {
    id: String,
    date: Option<String>,
    amount: Option<i64>,
    payee_name: Option<String>,
    memo: Option<String>,
    flag_color: Option<String>,
    account_id: Option<String>,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Serialize)]
struct SaveTransactionRequest<'a> {
    transaction: NewTransaction<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewTransaction<'a> {
    account_id: &'a str,
    date: String,
    amount: i64,
    payee_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
    category_id: Option<&'a str>,
    cleared: &'static str,
    approved: bool,
    import_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SaveTransactionsData {
    #[serde(default)]
    transaction_ids: Vec<String>,
    #[serde(default)]
    duplicate_import_ids: Vec<String>,
}

/// Blocking client bound to one budget and one account
pub struct YnabClient {
    http: Client,
    base_url: String,
    token: Secret,
    budget_id: String,
    account_id: String,
}

impl YnabClient {
    /// Connect and resolve the configured budget and account
    ///
    /// # Errors
    ///
    /// A budget or account that cannot be found is a configuration error.
    pub fn connect(settings: &BudgetSettings) -> BridgeResult<Self> {
        Self::connect_to(YNAB_BASE_URL, settings)
    }

    pub fn connect_to(base_url: &str, settings: &BudgetSettings) -> BridgeResult<Self> {
        let mut client = Self {
            http: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: settings.access_token.clone(),
            budget_id: String::new(),
            account_id: String::new(),
        };

        let budgets: Envelope<BudgetsData> = send_json(client.get("budgets"), "ynab get_budgets")?;
        client.budget_id = budgets
            .data
            .budgets
            .into_iter()
            .find(|b| b.name == settings.budget_name)
            .map(|b| b.id)
            .ok_or_else(|| {
                SyncError::Configuration(format!("budget '{}' not found", settings.budget_name))
            })?;

        let accounts: Envelope<AccountsData> = send_json(
            client.get(&format!("budgets/{}/accounts", client.budget_id)),
            "ynab get_accounts",
        )?;
        client.account_id = find_account(&accounts.data.accounts, &settings.account_name)
            .ok_or_else(|| {
                SyncError::Configuration(format!(
                    "account '{}' not found in budget '{}'",
                    settings.account_name, settings.budget_name
                ))
            })?;

        info!(
            budget = %settings.budget_name,
            account = %settings.account_name,
            "Connected to budget"
        );
        Ok(client)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(format!("{}/{}", self.base_url, path))
            .bearer_auth(self.token.expose())
    }

    fn transactions_url(&self) -> String {
        format!("{}/budgets/{}/transactions", self.base_url, self.budget_id)
    }
}

impl BudgetApi for YnabClient {
    fn fetch_flagged(
        &self,
        flag: FlagColor,
        since: NaiveDate,
    ) -> BridgeResult<Vec<CandidateTransaction>> {
        let request = self
            .get(&format!("budgets/{}/transactions", self.budget_id))
            .query(&[("since_date", since.format("%Y-%m-%d").to_string())]);
        let response: Envelope<TransactionsData> = send_json(request, "ynab get_transactions")?;

        let candidates = flagged_candidates(response.data.transactions, flag, &self.account_id);
        debug!(count = candidates.len(), %flag, "Flagged budget transactions");
        Ok(candidates)
    }

    fn create_transaction(&self, draft: &BudgetTransactionDraft) -> BridgeResult<String> {
        let request = self
            .http
            .post(self.transactions_url())
            .bearer_auth(self.token.expose())
            .json(&SaveTransactionRequest {
                transaction: new_transaction(draft)?,
            });
        let response: Envelope<SaveTransactionsData> =
            send_json(request, "ynab create_transaction")?;

        created_id(response.data, draft)
    }

    fn clear_flag(&self, transaction_id: &str) -> BridgeResult<()> {
        let request = self
            .http
            .put(format!("{}/{}", self.transactions_url(), transaction_id))
            .bearer_auth(self.token.expose())
            .json(&json!({ "transaction": { "flag_color": null } }));
        let _: serde_json::Value = send_json(request, "ynab update_transaction")?;
        debug!(transaction = transaction_id, "Flag cleared");
        Ok(())
    }
}

fn find_account(accounts: &[AccountDto], name: &str) -> Option<String> {
    accounts
        .iter()
        .filter(|a| !a.deleted)
        .find(|a| a.name.trim() == name.trim())
        .map(|a| a.id.clone())
}

/// Keep live transactions carrying `flag`, outside the bridge account
pub(crate) fn flagged_candidates(
    transactions: Vec<TransactionDto>,
    flag: FlagColor,
    bridge_account_id: &str,
) -> Vec<CandidateTransaction> {
    transactions
        .into_iter()
        .filter(|t| !t.deleted)
        .filter(|t| {
            t.flag_color
                .as_deref()
                .and_then(|c| c.parse::<FlagColor>().ok())
                == Some(flag)
        })
        .filter(|t| {
            let own = t.account_id.as_deref() == Some(bridge_account_id);
            if own {
                debug!(transaction = %t.id, "Ignoring flag on bridge account transaction");
            }
            !own
        })
        .map(|t| to_candidate(t, flag))
        .collect()
}

fn to_candidate(dto: TransactionDto, flag: FlagColor) -> CandidateTransaction {
    let amount = dto.amount.and_then(|milli| {
        let money = Money::from_milliunits(milli);
        if money.is_none() {
            warn!(transaction = %dto.id, milliunits = milli, "Amount is not a whole number of minor units");
        }
        money
    });
    let date = dto
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    CandidateTransaction {
        id: dto.id,
        amount,
        date,
        description: dto.payee_name,
        memo: dto.memo,
        marker: CandidateMarker::Flag(flag),
    }
}

pub(crate) fn new_transaction(draft: &BudgetTransactionDraft) -> BridgeResult<NewTransaction<'_>> {
    let amount = draft
        .amount
        .to_milliunits()
        .ok_or_else(|| SyncError::unmappable(&draft.source_id, "amount out of range for milliunits"))?;

    Ok(NewTransaction {
        account_id: &draft.account_id,
        date: draft.date.format("%Y-%m-%d").to_string(),
        amount,
        payee_name: draft.payee_name.chars().take(PAYEE_MAX_LEN).collect(),
        memo: draft
            .memo
            .as_ref()
            .map(|m| m.chars().take(MEMO_MAX_LEN).collect()),
        category_id: draft.category_id.as_deref(),
        cleared: if draft.cleared { "cleared" } else { "uncleared" },
        approved: false,
        import_id: &draft.import_id,
    })
}

/// The budget reports an import id it has seen before instead of creating a
/// second transaction; that is a confirmed write from an earlier attempt.
fn created_id(data: SaveTransactionsData, draft: &BudgetTransactionDraft) -> BridgeResult<String> {
    if let Some(id) = data.transaction_ids.into_iter().next() {
        return Ok(id);
    }
    if data.duplicate_import_ids.iter().any(|i| i == &draft.import_id) {
        info!(candidate = %draft.source_id, import_id = %draft.import_id, "Already imported");
        return Ok(format!("import:{}", draft.import_id));
    }
    Err(SyncError::api(
        "ynab create_transaction",
        "response contained no transaction id",
    ))
}
