//! Financial reductions behind the overview, project, account and sales
//! screens. Everything here is pure and works on already-fetched records.
//!
//! Ratios return 0 (or `None`) instead of NaN when their denominator is zero.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Account, Deal, DealStage, Earning, Expense, Project};
use crate::validation::Labelled;

/// A dated money movement tied to an account and/or project.
pub trait LedgerEntry {
    fn amount(&self) -> f64;
    fn date(&self) -> Option<NaiveDate>;
    fn account_id(&self) -> Option<&str>;
    fn project_id(&self) -> Option<&str>;
}

impl LedgerEntry for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

impl LedgerEntry for Earning {
    fn amount(&self) -> f64 {
        self.amount
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

pub fn total<E: LedgerEntry>(entries: &[E]) -> f64 {
    entries.iter().map(LedgerEntry::amount).sum()
}

// =============================================================================
// Monthly series
// =============================================================================

/// Expenses and earnings per month, aligned on one label axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySeries {
    pub months: Vec<String>,
    pub expenses: Vec<f64>,
    pub earnings: Vec<f64>,
}

impl MonthlySeries {
    /// Build from pre-labelled amounts. Labels keep the order they are first
    /// seen in, expenses before earnings; repeated labels are summed and a
    /// side with no entry for a label gets 0.
    pub fn from_labelled<L: AsRef<str>>(expenses: &[(L, f64)], earnings: &[(L, f64)]) -> Self {
        let mut series = MonthlySeries::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        let mut slot = |series: &mut MonthlySeries, label: &str| -> usize {
            if let Some(&i) = index.get(label) {
                return i;
            }
            series.months.push(label.to_string());
            series.expenses.push(0.0);
            series.earnings.push(0.0);
            let i = series.months.len() - 1;
            index.insert(label.to_string(), i);
            i
        };

        for (label, amount) in expenses {
            let i = slot(&mut series, label.as_ref());
            series.expenses[i] += amount;
        }
        for (label, amount) in earnings {
            let i = slot(&mut series, label.as_ref());
            series.earnings[i] += amount;
        }
        series
    }

    /// Earnings minus expenses per month.
    pub fn net(&self) -> Vec<f64> {
        self.earnings
            .iter()
            .zip(&self.expenses)
            .map(|(earned, spent)| earned - spent)
            .collect()
    }

    pub fn totals(&self) -> (f64, f64) {
        (self.expenses.iter().sum(), self.earnings.iter().sum())
    }
}

/// Group dated entries by calendar month, oldest first. Labels are `"Jan"`
/// style, or `"Jan 2026"` once the data spans more than one year. Undated
/// entries are left out.
pub fn monthly_series<E: LedgerEntry, R: LedgerEntry>(
    expenses: &[E],
    earnings: &[R],
) -> MonthlySeries {
    let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    let mut undated = 0usize;

    for entry in expenses {
        match entry.date() {
            Some(d) => buckets.entry((d.year(), d.month())).or_default().0 += entry.amount(),
            None => undated += 1,
        }
    }
    for entry in earnings {
        match entry.date() {
            Some(d) => buckets.entry((d.year(), d.month())).or_default().1 += entry.amount(),
            None => undated += 1,
        }
    }
    if undated > 0 {
        log::debug!("monthly_series: skipped {} undated entries", undated);
    }

    let multi_year = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(first), Some(last)) => first.0 != last.0,
        _ => false,
    };

    let mut series = MonthlySeries::default();
    for ((year, month), (spent, earned)) in buckets {
        series.months.push(month_label(year, month, multi_year));
        series.expenses.push(spent);
        series.earnings.push(earned);
    }
    series
}

fn month_label(year: i32, month: u32, with_year: bool) -> String {
    let fmt = if with_year { "%b %Y" } else { "%b" };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format(fmt).to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month))
}

// =============================================================================
// Ratios
// =============================================================================

/// `(budget - spent) / budget` as a percentage.
pub fn profit_margin(budget: f64, spent: f64) -> f64 {
    if budget > 0.0 {
        (budget - spent) / budget * 100.0
    } else {
        0.0
    }
}

pub fn roi(revenue: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        (revenue - cost) / cost * 100.0
    } else {
        0.0
    }
}

pub fn conversion_rate(converted: usize, total: usize) -> f64 {
    if total > 0 {
        converted as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

pub fn quota_attainment(won: f64, quota: f64) -> f64 {
    if quota > 0.0 {
        won / quota * 100.0
    } else {
        0.0
    }
}

/// Mean days from creation to close over closed deals that carry both dates.
pub fn average_sales_cycle_days(deals: &[Deal]) -> Option<f64> {
    let cycles: Vec<i64> = deals
        .iter()
        .filter(|d| d.stage.is_closed())
        .filter_map(|d| Some((d.closed_on? - d.created_on?).num_days()))
        .collect();
    if cycles.is_empty() {
        return None;
    }
    Some(cycles.iter().sum::<i64>() as f64 / cycles.len() as f64)
}

/// Closed-won deals as a percentage of all closed deals.
pub fn win_rate(deals: &[Deal]) -> f64 {
    let closed = deals.iter().filter(|d| d.stage.is_closed()).count();
    let won = deals.iter().filter(|d| d.stage == DealStage::ClosedWon).count();
    conversion_rate(won, closed)
}

// =============================================================================
// Breakdowns
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Expense totals per category, largest first.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for e in expenses {
        *totals.entry(e.category.as_str()).or_default() += e.amount;
    }
    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    out.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTotal {
    pub stage: DealStage,
    pub count: usize,
    pub value: f64,
}

/// Deal count and value for every stage, in pipeline order.
pub fn pipeline_by_stage(deals: &[Deal]) -> Vec<StageTotal> {
    DealStage::OPTIONS
        .iter()
        .map(|&stage| {
            let in_stage = deals.iter().filter(|d| d.stage == stage);
            let (count, value) = in_stage.fold((0, 0.0), |(c, v), d| (c + 1, v + d.value));
            StageTotal { stage, count, value }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFinancials {
    pub project_id: String,
    pub name: String,
    pub budget: f64,
    pub spent: f64,
    pub earned: f64,
    pub remaining_budget: f64,
    pub profit_margin: f64,
    /// Spent as a percentage of budget.
    pub budget_utilization: f64,
}

/// Summarise one project's budget against the expenses and earnings that
/// reference it. Entries for other projects are ignored.
pub fn project_financials(
    project: &Project,
    expenses: &[Expense],
    earnings: &[Earning],
) -> ProjectFinancials {
    let id = project.project_id.as_str();
    let spent: f64 = expenses
        .iter()
        .filter(|e| e.project_id() == Some(id))
        .map(LedgerEntry::amount)
        .sum();
    let earned: f64 = earnings
        .iter()
        .filter(|e| e.project_id() == Some(id))
        .map(LedgerEntry::amount)
        .sum();
    ProjectFinancials {
        project_id: project.project_id.clone(),
        name: project.name.clone(),
        budget: project.budget,
        spent,
        earned,
        remaining_budget: project.budget - spent,
        profit_margin: profit_margin(project.budget, spent),
        budget_utilization: quota_attainment(spent, project.budget),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLedger {
    pub account_id: String,
    pub name: String,
    pub balance: f64,
    pub total_expenses: f64,
    pub total_earnings: f64,
    pub net: f64,
    pub entries: usize,
}

/// Totals for one account across its expenses and earnings.
pub fn account_ledger(
    account: &Account,
    expenses: &[Expense],
    earnings: &[Earning],
) -> AccountLedger {
    let id = account.account_id.as_str();
    let spent: Vec<f64> = expenses
        .iter()
        .filter(|e| e.account_id() == Some(id))
        .map(LedgerEntry::amount)
        .collect();
    let earned: Vec<f64> = earnings
        .iter()
        .filter(|e| e.account_id() == Some(id))
        .map(LedgerEntry::amount)
        .collect();
    let total_expenses: f64 = spent.iter().sum();
    let total_earnings: f64 = earned.iter().sum();
    AccountLedger {
        account_id: account.account_id.clone(),
        name: account.name.clone(),
        balance: account.balance,
        total_expenses,
        total_earnings,
        net: total_earnings - total_expenses,
        entries: spent.len() + earned.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, amount: f64, date: &str) -> Expense {
        Expense {
            category: category.to_string(),
            amount,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            ..Default::default()
        }
    }

    fn earning(amount: f64, date: &str) -> Earning {
        Earning {
            source: "Sales".to_string(),
            amount,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            ..Default::default()
        }
    }

    fn deal(stage: DealStage, value: f64, created: &str, closed: Option<&str>) -> Deal {
        Deal {
            title: "d".to_string(),
            value,
            stage,
            created_on: NaiveDate::parse_from_str(created, "%Y-%m-%d").ok(),
            closed_on: closed.and_then(|c| NaiveDate::parse_from_str(c, "%Y-%m-%d").ok()),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_labelled_zero_fills() {
        let series =
            MonthlySeries::from_labelled(&[("Jan", 100.0), ("Feb", 50.0)], &[("Jan", 30.0)]);
        assert_eq!(series.months, vec!["Jan", "Feb"]);
        assert_eq!(series.expenses, vec![100.0, 50.0]);
        assert_eq!(series.earnings, vec![30.0, 0.0]);
        assert_eq!(series.net(), vec![-70.0, -50.0]);
    }

    #[test]
    fn test_monthly_series_chronological() {
        let expenses = vec![
            expense("Travel", 50.0, "2026-02-10"),
            expense("Travel", 100.0, "2026-01-05"),
            expense("Meals", 20.0, "2026-01-20"),
        ];
        let earnings = vec![earning(30.0, "2026-01-31"), earning(5.0, "2026-03-01")];
        let series = monthly_series(&expenses, &earnings);
        assert_eq!(series.months, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(series.expenses, vec![120.0, 50.0, 0.0]);
        assert_eq!(series.earnings, vec![30.0, 0.0, 5.0]);

        let (spent, earned) = series.totals();
        assert_eq!(spent, total(&expenses));
        assert_eq!(earned, total(&earnings));
    }

    #[test]
    fn test_monthly_series_labels_years_when_spanning() {
        let expenses = vec![
            expense("Travel", 1.0, "2025-12-01"),
            expense("Travel", 2.0, "2026-01-01"),
        ];
        let series = monthly_series::<Expense, Earning>(&expenses, &[]);
        assert_eq!(series.months, vec!["Dec 2025", "Jan 2026"]);
    }

    #[test]
    fn test_ratios() {
        assert_eq!(profit_margin(1000.0, 400.0), 60.0);
        assert_eq!(profit_margin(0.0, 400.0), 0.0);
        assert_eq!(roi(1500.0, 1000.0), 50.0);
        assert_eq!(roi(1500.0, 0.0), 0.0);
        assert_eq!(conversion_rate(1, 4), 25.0);
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(quota_attainment(75.0, 100.0), 75.0);
        assert_eq!(quota_attainment(75.0, 0.0), 0.0);
    }

    #[test]
    fn test_sales_cycle_and_win_rate() {
        let deals = vec![
            deal(DealStage::ClosedWon, 100.0, "2026-01-01", Some("2026-01-11")),
            deal(DealStage::ClosedLost, 50.0, "2026-01-01", Some("2026-01-21")),
            deal(DealStage::Proposal, 10.0, "2026-01-01", None),
        ];
        assert_eq!(average_sales_cycle_days(&deals), Some(15.0));
        assert_eq!(win_rate(&deals), 50.0);
        assert_eq!(average_sales_cycle_days(&deals[2..]), None);
        assert_eq!(win_rate(&deals[2..]), 0.0);
    }

    #[test]
    fn test_pipeline_by_stage_in_order() {
        let deals = vec![
            deal(DealStage::Proposal, 10.0, "2026-01-01", None),
            deal(DealStage::Proposal, 15.0, "2026-01-01", None),
            deal(DealStage::Prospecting, 5.0, "2026-01-01", None),
        ];
        let pipeline = pipeline_by_stage(&deals);
        assert_eq!(pipeline.len(), 6);
        assert_eq!(pipeline[0].stage, DealStage::Prospecting);
        assert_eq!(pipeline[0].count, 1);
        assert_eq!(pipeline[2].count, 2);
        assert_eq!(pipeline[2].value, 25.0);
        assert_eq!(pipeline[5].count, 0);
    }

    #[test]
    fn test_category_breakdown_largest_first() {
        let expenses = vec![
            expense("Meals", 20.0, "2026-01-01"),
            expense("Travel", 100.0, "2026-01-01"),
            expense("Meals", 30.0, "2026-01-02"),
        ];
        let breakdown = category_breakdown(&expenses);
        assert_eq!(breakdown[0].category, "Travel");
        assert_eq!(breakdown[1].total, 50.0);
    }

    #[test]
    fn test_project_financials_filters_by_project() {
        let project = Project {
            project_id: "PRJ-1000".to_string(),
            name: "Website".to_string(),
            budget: 1000.0,
            ..Default::default()
        };
        let mut mine = expense("Dev", 400.0, "2026-01-01");
        mine.project_id = Some("PRJ-1000".to_string());
        let mut other = expense("Dev", 999.0, "2026-01-01");
        other.project_id = Some("PRJ-2000".to_string());
        let mut income = earning(250.0, "2026-01-01");
        income.project_id = Some("PRJ-1000".to_string());

        let summary = project_financials(&project, &[mine, other], &[income]);
        assert_eq!(summary.spent, 400.0);
        assert_eq!(summary.earned, 250.0);
        assert_eq!(summary.remaining_budget, 600.0);
        assert_eq!(summary.profit_margin, 60.0);
        assert_eq!(summary.budget_utilization, 40.0);
    }

    #[test]
    fn test_account_ledger_net() {
        let account = Account {
            account_id: "ACC-1000".to_string(),
            name: "Main".to_string(),
            ..Default::default()
        };
        let mut spent = expense("Rent", 300.0, "2026-01-01");
        spent.account_id = Some("ACC-1000".to_string());
        let mut earned = earning(500.0, "2026-01-01");
        earned.account_id = Some("ACC-1000".to_string());
        let stray = earning(1.0, "2026-01-01");

        let ledger = account_ledger(&account, &[spent], &[earned, stray]);
        assert_eq!(ledger.net, 200.0);
        assert_eq!(ledger.entries, 2);
    }
}
