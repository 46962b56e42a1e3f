//! Shared-expense API client (Splitwise)
//!
//! The current user's position in an expense is read from its repayments:
//! a repayment *from* the user is money the user owes, one *to* the user is
//! money owed to them. Expenses the user takes no part in are dropped.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::{LedgerSettings, Secret};
use crate::error::{BridgeResult, SyncError};
use crate::models::{CandidateMarker, CandidateTransaction, LedgerExpenseDraft, Money};

use super::http::{build_client, send_json};
use super::LedgerApi;

pub const SPLITWISE_BASE_URL: &str = "https://secure.splitwise.com/api/v3.0";

/// Expenses requested per page
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    user: UserDto,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct GroupsResponse {
    groups: Vec<GroupDto>,
}

#[derive(Debug, Deserialize)]
struct GroupDto {
    id: i64,
    name: String,
    #[serde(default)]
    members: Vec<UserDto>,
}

#[derive(Debug, Deserialize)]
struct ExpensesResponse {
    expenses: Vec<ExpenseDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExpenseDto {
    id: i64,
    description: Option<String>,
    cost: Option<String>,
    date: Option<String>,
    deleted_at: Option<String>,
    details: Option<String>,
    #[serde(default)]
    repayments: Vec<RepaymentDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct RepaymentDto {
    from: i64,
    to: i64,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct CreateExpenseResponse {
    #[serde(default)]
    expenses: Vec<CreatedExpense>,
    #[serde(default)]
    errors: Value,
}

#[derive(Debug, Deserialize)]
struct CreatedExpense {
    id: i64,
}

/// Blocking client bound to one user, one group and one partner
pub struct SplitwiseClient {
    http: Client,
    base_url: String,
    api_key: Secret,
    timezone: Tz,
    user_id: i64,
    group_id: i64,
    partner_id: i64,
}

impl SplitwiseClient {
    /// Connect and resolve the current user, the group and its other member
    ///
    /// # Errors
    ///
    /// A missing group, or a group without a second member, is a
    /// configuration error.
    pub fn connect(settings: &LedgerSettings, timezone: Tz) -> BridgeResult<Self> {
        Self::connect_to(SPLITWISE_BASE_URL, settings, timezone)
    }

    pub fn connect_to(base_url: &str, settings: &LedgerSettings, timezone: Tz) -> BridgeResult<Self> {
        let mut client = Self {
            http: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            timezone,
            user_id: 0,
            group_id: 0,
            partner_id: 0,
        };

        let me: CurrentUserResponse =
            send_json(client.request_get("get_current_user"), "splitwise get_current_user")?;
        client.user_id = me.user.id;

        let groups: GroupsResponse =
            send_json(client.request_get("get_groups"), "splitwise get_groups")?;
        let (group_id, partner_id) =
            resolve_group(&groups.groups, &settings.group_name, client.user_id)?;
        client.group_id = group_id;
        client.partner_id = partner_id;

        info!(group = %settings.group_name, "Connected to ledger");
        Ok(client)
    }

    pub fn group_id(&self) -> String {
        self.group_id.to_string()
    }

    fn request_get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}/{}", self.base_url, path))
            .bearer_auth(self.api_key.expose())
    }
}

impl LedgerApi for SplitwiseClient {
    fn fetch_owed_expenses(
        &self,
        since: NaiveDate,
        until: NaiveDate,
    ) -> BridgeResult<Vec<CandidateTransaction>> {
        // The API bound is exclusive and in UTC; widen it and filter locally
        let dated_after = (since - Duration::days(1)).format("%Y-%m-%d").to_string();
        let dated_before = (until + Duration::days(2)).format("%Y-%m-%d").to_string();

        let mut candidates = Vec::new();
        let mut offset = 0;
        loop {
            let request = self.request_get("get_expenses").query(&[
                ("dated_after", dated_after.clone()),
                ("dated_before", dated_before.clone()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ]);
            let page: ExpensesResponse = send_json(request, "splitwise get_expenses")?;
            let count = page.expenses.len();

            candidates.extend(
                page.expenses
                    .into_iter()
                    .filter_map(|e| owed_candidate(e, self.user_id, self.timezone))
                    .filter(|c| c.date.map_or(true, |d| d >= since && d <= until)),
            );

            if count < PAGE_SIZE {
                break;
            }
            offset += count;
        }

        debug!(count = candidates.len(), "Owed ledger expenses");
        Ok(candidates)
    }

    fn create_expense(&self, draft: &LedgerExpenseDraft) -> BridgeResult<String> {
        let body = expense_payload(draft, self.user_id, self.partner_id, self.timezone);
        let request = self
            .http
            .post(format!("{}/create_expense", self.base_url))
            .bearer_auth(self.api_key.expose())
            .json(&body);
        let response: CreateExpenseResponse = send_json(request, "splitwise create_expense")?;

        created_id(response)
    }
}

fn resolve_group(groups: &[GroupDto], name: &str, user_id: i64) -> BridgeResult<(i64, i64)> {
    let group = groups
        .iter()
        .find(|g| g.name.trim() == name.trim())
        .ok_or_else(|| SyncError::Configuration(format!("group '{}' not found", name)))?;

    let partner = group
        .members
        .iter()
        .find(|m| m.id != user_id)
        .ok_or_else(|| {
            SyncError::Configuration(format!("group '{}' has no other member to split with", name))
        })?;

    Ok((group.id, partner.id))
}

/// Convert an expense into a candidate, or `None` if it is deleted or does
/// not involve the user
pub(crate) fn owed_candidate(
    expense: ExpenseDto,
    user_id: i64,
    timezone: Tz,
) -> Option<CandidateTransaction> {
    if expense.deleted_at.is_some() {
        debug!(expense = expense.id, "Skipping deleted expense");
        return None;
    }

    let mut involved = false;
    let mut owed = Some(Money::zero());
    for repayment in &expense.repayments {
        let sign = if repayment.from == user_id {
            1
        } else if repayment.to == user_id {
            -1
        } else {
            continue;
        };
        involved = true;
        owed = match (owed, Money::parse(&repayment.amount)) {
            (Some(total), Ok(amount)) => {
                let next = if sign > 0 {
                    total.checked_add(amount)
                } else {
                    total.checked_sub(amount)
                };
                if next.is_none() {
                    warn!(expense = expense.id, "Owed share overflows");
                }
                next
            }
            (_, Err(e)) => {
                warn!(expense = expense.id, amount = %repayment.amount, "Unreadable repayment: {}", e);
                None
            }
            (None, _) => None,
        };
    }
    if !involved {
        return None;
    }

    let id = expense.id.to_string();
    Some(CandidateTransaction {
        amount: expense.cost.as_deref().and_then(|c| Money::parse(c).ok()),
        date: expense.date.as_deref().and_then(|d| local_date(d, timezone)),
        description: expense.description,
        memo: expense.details,
        marker: CandidateMarker::OwedShare(owed),
        id,
    })
}

/// Calendar date of an RFC 3339 timestamp in `timezone`
fn local_date(timestamp: &str, timezone: Tz) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.with_timezone(&timezone).date_naive())
}

/// Request body for `create_expense`: the user paid everything, both owe a share
pub(crate) fn expense_payload(
    draft: &LedgerExpenseDraft,
    user_id: i64,
    partner_id: i64,
    timezone: Tz,
) -> Map<String, Value> {
    // Midday local time keeps the date stable whatever zone the service shows it in
    let midday = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    let date = timezone
        .from_local_datetime(&draft.date.and_time(midday))
        .earliest()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| draft.date.format("%Y-%m-%d").to_string());

    let mut body = Map::new();
    body.insert("cost".into(), json!(draft.cost.to_decimal_string()));
    body.insert("description".into(), json!(draft.description));
    body.insert("date".into(), json!(date));
    body.insert(
        "group_id".into(),
        draft
            .group_id
            .parse::<i64>()
            .map_or_else(|_| json!(draft.group_id), |id| json!(id)),
    );
    body.insert("users__0__user_id".into(), json!(user_id));
    body.insert("users__0__paid_share".into(), json!(draft.cost.to_decimal_string()));
    body.insert("users__0__owed_share".into(), json!(draft.payer_share.to_decimal_string()));
    body.insert("users__1__user_id".into(), json!(partner_id));
    body.insert("users__1__paid_share".into(), json!(Money::zero().to_decimal_string()));
    body.insert("users__1__owed_share".into(), json!(draft.partner_share.to_decimal_string()));
    body
}

/// The service reports validation failures in a 200 response body
fn created_id(response: CreateExpenseResponse) -> BridgeResult<String> {
    let has_errors = match &response.errors {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    };
    if has_errors {
        return Err(SyncError::api(
            "splitwise create_expense",
            format!("rejected: {}", response.errors),
        ));
    }

    response
        .expenses
        .first()
        .map(|e| e.id.to_string())
        .ok_or_else(|| SyncError::api("splitwise create_expense", "response contained no expense"))
}
