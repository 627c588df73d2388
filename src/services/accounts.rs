//! Accounts screen: linked-client view and per-account ledger.

use super::{crud, ledger, ServiceContext};
use crate::db::{Filter, Stored};
use crate::error::ConsoleError;
use crate::finance::{self, AccountLedger};
use crate::models::{Account, Earning, Expense};

/// Accounts that reference a client. Accounts without a `clientId` field
/// (or with it explicitly null) are left out.
pub fn with_client(ctx: &ServiceContext<'_>) -> Result<Vec<Stored<Account>>, ConsoleError> {
    crud::list_where(ctx, vec![Filter::not_null("clientId")])
}

/// Expense and earning totals for one account.
pub fn ledger(ctx: &ServiceContext<'_>, account_id: &str) -> Result<AccountLedger, ConsoleError> {
    let account = crud::get::<Account>(ctx, account_id)?.record;
    let expenses: Vec<Expense> = ledger::by_account::<Expense>(ctx, account_id)?
        .into_iter()
        .map(|s| s.record)
        .collect();
    let earnings: Vec<Earning> = ledger::by_account::<Earning>(ctx, account_id)?
        .into_iter()
        .map(|s| s.record)
        .collect();
    Ok(finance::account_ledger(&account, &expenses, &earnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountForm, EarningForm};
    use crate::services::test_support::{admin, store};

    #[test]
    fn test_with_client_skips_unlinked() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        crud::create(
            &ctx,
            &AccountForm {
                name: "Linked".into(),
                client_id: "CL-100".into(),
                ..Default::default()
            },
        )
        .expect("linked");
        crud::create(&ctx, &AccountForm { name: "Loose".into(), ..Default::default() })
            .expect("loose");

        let linked = with_client(&ctx).expect("query");
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].record.name, "Linked");
    }

    #[test]
    fn test_ledger_totals() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let account = crud::create(
            &ctx,
            &AccountForm {
                name: "Ops".into(),
                balance: "100".into(),
                ..Default::default()
            },
        )
        .expect("account");
        let id = account.record.account_id.clone();
        crud::create(
            &ctx,
            &EarningForm {
                account_id: id.clone(),
                source: "Retainer".into(),
                amount: "400".into(),
                date: "2026-02-01".into(),
                ..Default::default()
            },
        )
        .expect("earning");

        let ledger = ledger(&ctx, &id).expect("ledger");
        assert_eq!(ledger.total_earnings, 400.0);
        assert_eq!(ledger.net, 400.0);
        assert_eq!(ledger.balance, 100.0);
    }
}
