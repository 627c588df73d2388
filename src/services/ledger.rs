//! Expense and earning listings by account, project and date range.

use chrono::NaiveDate;

use super::{crud, ServiceContext};
use crate::db::{Filter, Stored};
use crate::entity::Entity;
use crate::error::ConsoleError;
use crate::finance::LedgerEntry;

type Result<T> = std::result::Result<T, ConsoleError>;

pub fn by_account<T: Entity + LedgerEntry>(
    ctx: &ServiceContext<'_>,
    account_id: &str,
) -> Result<Vec<Stored<T>>> {
    crud::list_where(ctx, vec![Filter::eq("accountId", account_id)])
}

pub fn by_project<T: Entity + LedgerEntry>(
    ctx: &ServiceContext<'_>,
    project_id: &str,
) -> Result<Vec<Stored<T>>> {
    crud::list_where(ctx, vec![Filter::eq("projectId", project_id)])
}

/// Entries dated within `from..=to`. Either bound may be open.
pub fn in_range<T: Entity + LedgerEntry>(
    ctx: &ServiceContext<'_>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Stored<T>>> {
    if let (Some(f), Some(t)) = (from, to) {
        if t < f {
            return Err(ConsoleError::validation("to", "must not be before 'from'"));
        }
    }
    let mut filters = vec![Filter::not_null("date")];
    if let Some(f) = from {
        filters.push(Filter::gte("date", f.format("%Y-%m-%d").to_string()));
    }
    if let Some(t) = to {
        filters.push(Filter::lte("date", t.format("%Y-%m-%d").to_string()));
    }
    crud::list_where(ctx, filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Earning, EarningForm, Expense, ExpenseForm};
    use crate::services::test_support::{admin, store};

    fn expense(account: &str, date: &str) -> ExpenseForm {
        ExpenseForm {
            account_id: account.to_string(),
            category: "Ops".to_string(),
            amount: "10".to_string(),
            date: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_filters() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        crud::create(&ctx, &expense("ACC-1000", "2026-01-10")).expect("e1");
        crud::create(&ctx, &expense("ACC-1000", "2026-02-10")).expect("e2");
        crud::create(&ctx, &expense("ACC-2000", "2026-03-10")).expect("e3");
        crud::create(
            &ctx,
            &EarningForm {
                account_id: "ACC-1000".into(),
                source: "Fees".into(),
                amount: "5".into(),
                date: "2026-02-11".into(),
                ..Default::default()
            },
        )
        .expect("earning");

        assert_eq!(by_account::<Expense>(&ctx, "ACC-1000").expect("acc").len(), 2);
        assert_eq!(by_account::<Earning>(&ctx, "ACC-1000").expect("acc").len(), 1);

        let day = |m, d| NaiveDate::from_ymd_opt(2026, m, d);
        let feb = in_range::<Expense>(&ctx, day(2, 1), day(2, 28)).expect("range");
        assert_eq!(feb.len(), 1);
        let from_feb = in_range::<Expense>(&ctx, day(2, 1), None).expect("open");
        assert_eq!(from_feb.len(), 2);

        assert!(in_range::<Expense>(&ctx, day(3, 1), day(2, 1)).is_err());
        assert!(by_project::<Expense>(&ctx, "PRJ-1000").expect("project").is_empty());
    }
}
