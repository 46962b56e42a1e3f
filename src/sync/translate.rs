//! Mapping between the ledger and budget transaction models
//!
//! Amounts stay in integer minor units end to end. The two rules that carry
//! meaning:
//!
//! - An owed share becomes a budget amount with the opposite sign: what the
//!   user owes is an outflow, what the user is owed is an inflow.
//! - A budget amount is split into two shares summing exactly to its absolute
//!   value; the odd minor unit goes to the payer.

use crate::error::{BridgeResult, SyncError};
use crate::models::{BudgetTransactionDraft, CandidateTransaction, LedgerExpenseDraft};

/// Prefix of the import id attached to budget transactions
pub const IMPORT_ID_PREFIX: &str = "LB:";

/// The budget API rejects longer import ids
const IMPORT_ID_MAX_LEN: usize = 36;

/// Payee used when a ledger expense has no description
pub const DEFAULT_PAYEE: &str = "Shared expense";

/// Description used when a budget transaction has neither payee nor memo
pub const DEFAULT_DESCRIPTION: &str = "Shared expense";

/// Translates candidates into destination drafts
#[derive(Debug, Clone)]
pub struct TransactionTranslator {
    budget_account_id: String,
    ledger_group_id: String,
}

impl TransactionTranslator {
    pub fn new(budget_account_id: impl Into<String>, ledger_group_id: impl Into<String>) -> Self {
        Self {
            budget_account_id: budget_account_id.into(),
            ledger_group_id: ledger_group_id.into(),
        }
    }

    /// Ledger expense -> budget transaction
    pub fn to_budget(&self, candidate: &CandidateTransaction) -> BridgeResult<BudgetTransactionDraft> {
        let date = candidate
            .date
            .ok_or_else(|| SyncError::unmappable(&candidate.id, "missing date"))?;
        let owed = candidate
            .owed_share()
            .ok_or_else(|| SyncError::unmappable(&candidate.id, "missing owed share"))?;
        if owed.is_zero() {
            return Err(SyncError::unmappable(&candidate.id, "owed share is zero"));
        }
        let amount = owed
            .checked_neg()
            .filter(|a| a.to_milliunits().is_some())
            .ok_or_else(|| SyncError::unmappable(&candidate.id, "owed share out of range"))?;

        Ok(BudgetTransactionDraft {
            source_id: candidate.id.clone(),
            account_id: self.budget_account_id.clone(),
            date,
            amount,
            payee_name: candidate
                .trimmed_description()
                .unwrap_or(DEFAULT_PAYEE)
                .to_string(),
            memo: trimmed(candidate.memo.as_deref()),
            category_id: None,
            cleared: true,
            import_id: import_id_for(&candidate.id),
        })
    }

    /// Flagged budget transaction -> ledger expense split between two people
    pub fn to_ledger(&self, candidate: &CandidateTransaction) -> BridgeResult<LedgerExpenseDraft> {
        let date = candidate
            .date
            .ok_or_else(|| SyncError::unmappable(&candidate.id, "missing date"))?;
        let amount = candidate
            .amount
            .ok_or_else(|| SyncError::unmappable(&candidate.id, "missing amount"))?;
        if amount.is_zero() {
            return Err(SyncError::unmappable(&candidate.id, "amount is zero"));
        }

        let (payer_share, partner_share) = amount.split_halves();
        let description = candidate
            .trimmed_description()
            .map(str::to_string)
            .or_else(|| trimmed(candidate.memo.as_deref()))
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        Ok(LedgerExpenseDraft {
            source_id: candidate.id.clone(),
            group_id: self.ledger_group_id.clone(),
            description,
            date,
            cost: amount.abs(),
            payer_share,
            partner_share,
        })
    }
}

/// Import id for a ledger expense, stable across runs
pub fn import_id_for(source_id: &str) -> String {
    format!("{}{}", IMPORT_ID_PREFIX, source_id)
        .chars()
        .take(IMPORT_ID_MAX_LEN)
        .collect()
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateMarker, FlagColor, Money};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn translator() -> TransactionTranslator {
        TransactionTranslator::new("acct-1", "group-9")
    }

    #[test]
    fn test_owed_share_becomes_outflow() {
        let candidate = CandidateTransaction::owed(
            "5001",
            date(2024, 11, 11),
            Money::from_minor(4000),
            Money::from_minor(2000),
            "  Groceries ",
        );

        let draft = translator().to_budget(&candidate).unwrap();
        assert_eq!(draft.amount, Money::from_minor(-2000));
        assert_eq!(draft.payee_name, "Groceries");
        assert_eq!(draft.account_id, "acct-1");
        assert_eq!(draft.category_id, None);
        assert!(draft.cleared);
        assert_eq!(draft.import_id, "LB:5001");
    }

    #[test]
    fn test_amount_owed_to_user_becomes_inflow() {
        let candidate = CandidateTransaction::owed(
            "5002",
            date(2024, 11, 11),
            Money::from_minor(3000),
            Money::from_minor(-1500),
            "Rent top-up",
        );

        let draft = translator().to_budget(&candidate).unwrap();
        assert_eq!(draft.amount, Money::from_minor(1500));
    }

    #[test]
    fn test_missing_fields_are_unmappable() {
        let mut candidate = CandidateTransaction::owed(
            "5003",
            date(2024, 11, 11),
            Money::from_minor(100),
            Money::from_minor(50),
            "Coffee",
        );
        candidate.date = None;
        let err = translator().to_budget(&candidate).unwrap_err();
        assert!(err.is_unmappable());
        assert!(err.to_string().contains("missing date"));

        candidate.date = Some(date(2024, 11, 11));
        candidate.marker = CandidateMarker::OwedShare(None);
        assert!(translator().to_budget(&candidate).unwrap_err().is_unmappable());

        candidate.marker = CandidateMarker::OwedShare(Some(Money::zero()));
        assert!(translator().to_budget(&candidate).unwrap_err().is_unmappable());
    }

    #[test]
    fn test_share_too_large_for_milliunits_is_unmappable() {
        let candidate = CandidateTransaction::owed(
            "5004",
            date(2024, 11, 11),
            Money::from_minor(i64::MAX / 4),
            Money::from_minor(i64::MAX / 8),
            "Yacht",
        );

        let err = translator().to_budget(&candidate).unwrap_err();
        assert!(err.is_unmappable());
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_split_remainder_goes_to_payer_every_time() {
        let candidate = CandidateTransaction::flagged(
            "ynab-1",
            date(2024, 11, 12),
            Money::from_minor(-1001),
            "Pharmacy",
            FlagColor::Red,
        );

        for _ in 0..3 {
            let draft = translator().to_ledger(&candidate).unwrap();
            assert_eq!(draft.cost, Money::from_minor(1001));
            assert_eq!(draft.payer_share, Money::from_minor(501));
            assert_eq!(draft.partner_share, Money::from_minor(500));
            assert_eq!(draft.payer_share + draft.partner_share, draft.cost);
        }
    }

    #[test]
    fn test_even_split() {
        let candidate = CandidateTransaction::flagged(
            "ynab-2",
            date(2024, 11, 12),
            Money::from_minor(-2000),
            "Internet",
            FlagColor::Red,
        );

        let draft = translator().to_ledger(&candidate).unwrap();
        assert_eq!(draft.payer_share, Money::from_minor(1000));
        assert_eq!(draft.partner_share, Money::from_minor(1000));
        assert_eq!(draft.group_id, "group-9");
        assert_eq!(draft.description, "Internet");
    }

    #[test]
    fn test_description_falls_back_to_memo() {
        let mut candidate = CandidateTransaction::flagged(
            "ynab-3",
            date(2024, 11, 12),
            Money::from_minor(-500),
            "",
            FlagColor::Red,
        );
        candidate.memo = Some(" Parking ".into());
        assert_eq!(translator().to_ledger(&candidate).unwrap().description, "Parking");

        candidate.memo = None;
        assert_eq!(
            translator().to_ledger(&candidate).unwrap().description,
            DEFAULT_DESCRIPTION
        );
    }

    #[test]
    fn test_zero_or_missing_amount_is_unmappable() {
        let mut candidate = CandidateTransaction::flagged(
            "ynab-4",
            date(2024, 11, 12),
            Money::zero(),
            "Nothing",
            FlagColor::Red,
        );
        assert!(translator().to_ledger(&candidate).unwrap_err().is_unmappable());

        candidate.amount = None;
        assert!(translator().to_ledger(&candidate).unwrap_err().is_unmappable());
    }

    #[test]
    fn test_import_id_is_bounded() {
        let long_id = "9".repeat(64);
        assert_eq!(import_id_for(&long_id).len(), 36);
        assert!(import_id_for(&long_id).starts_with(IMPORT_ID_PREFIX));
    }
}
