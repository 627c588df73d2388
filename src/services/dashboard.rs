//! Dashboard service: joins collections in memory and reduces them into the
//! financial, marketing and sales views. Nothing is cached; every call
//! refetches.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::ServiceContext;
use crate::db::{decode_lossy, Stored};
use crate::entity::Entity;
use crate::error::ConsoleError;
use crate::finance::{
    self, AccountLedger, CategoryTotal, MonthlySeries, ProjectFinancials, StageTotal,
};
use crate::models::{
    Account, Campaign, Client, Deal, DealStage, Earning, Employee, Expense, Lead, LeadStatus,
    Project, Team,
};
use crate::permissions::{Access, Feature};
use crate::validation::Labelled;

/// Placeholder shown for a reference that does not resolve.
pub const UNRESOLVED: &str = "N/A";

type Result<T> = std::result::Result<T, ConsoleError>;

/// Read a whole collection for a dashboard. The dashboard's own feature
/// gates access, not the per-collection ones.
fn load<T: Entity>(ctx: &ServiceContext<'_>) -> Result<Vec<T>> {
    let docs = ctx.store.list(T::KIND.collection())?;
    Ok(decode_lossy::<T>(&docs).into_iter().map(|s: Stored<T>| s.record).collect())
}

/// Human id to display name, for resolving denormalised references.
fn names<T: Entity>(records: &[T]) -> HashMap<String, String> {
    records
        .iter()
        .map(|r| (r.human_id().to_string(), r.display_name().to_string()))
        .collect()
}

fn resolve(names: &HashMap<String, String>, id: Option<&str>) -> String {
    id.and_then(|id| names.get(id))
        .cloned()
        .unwrap_or_else(|| UNRESOLVED.to_string())
}

// =============================================================================
// Financial overview
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRow {
    pub expense_id: String,
    pub date: Option<String>,
    pub category: String,
    pub amount: f64,
    pub account: String,
    pub project: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialOverview {
    pub total_expenses: f64,
    pub total_earnings: f64,
    pub net: f64,
    pub profit_margin: f64,
    pub monthly: MonthlySeries,
    pub by_category: Vec<CategoryTotal>,
    pub projects: Vec<ProjectFinancials>,
    pub accounts: Vec<AccountLedger>,
    /// Most recent expenses first, references resolved to names.
    pub recent_expenses: Vec<ExpenseRow>,
}

const RECENT_LIMIT: usize = 10;

pub fn financial_overview(ctx: &ServiceContext<'_>) -> Result<FinancialOverview> {
    ctx.session.require(Feature::FinancialOverview, Access::Read)?;
    let expenses: Vec<Expense> = load(ctx)?;
    let earnings: Vec<Earning> = load(ctx)?;
    let accounts: Vec<Account> = load(ctx)?;
    let projects: Vec<Project> = load(ctx)?;

    let total_expenses = finance::total(&expenses);
    let total_earnings = finance::total(&earnings);

    let account_names = names(&accounts);
    let project_names = names(&projects);
    let mut recent: Vec<&Expense> = expenses.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let recent_expenses = recent
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|e| ExpenseRow {
            expense_id: e.expense_id.clone(),
            date: e.date.map(|d| d.format("%Y-%m-%d").to_string()),
            category: e.category.clone(),
            amount: e.amount,
            account: resolve(&account_names, e.account_id.as_deref()),
            project: resolve(&project_names, e.project_id.as_deref()),
        })
        .collect();

    Ok(FinancialOverview {
        total_expenses,
        total_earnings,
        net: total_earnings - total_expenses,
        profit_margin: finance::profit_margin(total_earnings, total_expenses),
        monthly: finance::monthly_series(&expenses, &earnings),
        by_category: finance::category_breakdown(&expenses),
        projects: projects
            .iter()
            .map(|p| finance::project_financials(p, &expenses, &earnings))
            .collect(),
        accounts: accounts
            .iter()
            .map(|a| finance::account_ledger(a, &expenses, &earnings))
            .collect(),
        recent_expenses,
    })
}

// =============================================================================
// Marketing
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformance {
    pub campaign_id: String,
    pub name: String,
    pub budget: f64,
    pub spent: f64,
    pub revenue: f64,
    pub roi: f64,
    pub leads: usize,
    pub converted: usize,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingDashboard {
    pub total_leads: usize,
    pub converted_leads: usize,
    pub conversion_rate: f64,
    pub total_spent: f64,
    pub total_revenue: f64,
    pub roi: f64,
    pub leads_by_status: Vec<(LeadStatus, usize)>,
    pub campaigns: Vec<CampaignPerformance>,
    /// Leads whose campaign reference is missing or does not resolve.
    pub unattributed_leads: usize,
}

pub fn marketing(ctx: &ServiceContext<'_>) -> Result<MarketingDashboard> {
    ctx.session.require(Feature::Marketing, Access::Read)?;
    let campaigns: Vec<Campaign> = load(ctx)?;
    let leads: Vec<Lead> = load(ctx)?;

    let converted_leads = leads.iter().filter(|l| l.is_converted()).count();
    let total_spent: f64 = campaigns.iter().map(|c| c.spent).sum();
    let total_revenue: f64 = campaigns.iter().map(|c| c.revenue).sum();

    let leads_by_status = LeadStatus::OPTIONS
        .iter()
        .map(|&s| (s, leads.iter().filter(|l| l.status == s).count()))
        .collect();

    let campaign_rows: Vec<CampaignPerformance> = campaigns
        .iter()
        .map(|c| {
            let mine: Vec<&Lead> = leads
                .iter()
                .filter(|l| l.campaign_id.as_deref() == Some(c.campaign_id.as_str()))
                .collect();
            let converted = mine.iter().filter(|l| l.is_converted()).count();
            CampaignPerformance {
                campaign_id: c.campaign_id.clone(),
                name: c.name.clone(),
                budget: c.budget,
                spent: c.spent,
                revenue: c.revenue,
                roi: finance::roi(c.revenue, c.spent),
                leads: mine.len(),
                converted,
                conversion_rate: finance::conversion_rate(converted, mine.len()),
            }
        })
        .collect();
    let campaign_ids: HashSet<&str> = campaigns.iter().map(|c| c.campaign_id.as_str()).collect();
    let unattributed_leads = leads
        .iter()
        .filter(|l| !l.campaign_id.as_deref().is_some_and(|id| campaign_ids.contains(id)))
        .count();

    Ok(MarketingDashboard {
        total_leads: leads.len(),
        converted_leads,
        conversion_rate: finance::conversion_rate(converted_leads, leads.len()),
        total_spent,
        total_revenue,
        roi: finance::roi(total_revenue, total_spent),
        leads_by_status,
        campaigns: campaign_rows,
        unattributed_leads,
    })
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaPerformance {
    pub id: String,
    pub name: String,
    pub quota: f64,
    pub won: f64,
    pub attainment: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRow {
    pub deal_id: String,
    pub title: String,
    pub stage: DealStage,
    pub value: f64,
    pub client: String,
    pub owner: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesDashboard {
    pub pipeline: Vec<StageTotal>,
    pub open_value: f64,
    pub won_value: f64,
    pub win_rate: f64,
    pub average_sales_cycle_days: Option<f64>,
    pub reps: Vec<QuotaPerformance>,
    pub teams: Vec<QuotaPerformance>,
    pub deals: Vec<DealRow>,
}

pub fn sales(ctx: &ServiceContext<'_>) -> Result<SalesDashboard> {
    ctx.session.require(Feature::Sales, Access::Read)?;
    let deals: Vec<Deal> = load(ctx)?;
    let employees: Vec<Employee> = load(ctx)?;
    let teams: Vec<Team> = load(ctx)?;
    let clients: Vec<Client> = load(ctx)?;

    let mut won_by_owner: HashMap<&str, f64> = HashMap::new();
    for d in deals.iter().filter(|d| d.stage == DealStage::ClosedWon) {
        if let Some(owner) = d.owner_id.as_deref() {
            *won_by_owner.entry(owner).or_default() += d.value;
        }
    }

    let reps = employees
        .iter()
        .filter(|e| e.sales_quota > 0.0 || won_by_owner.contains_key(e.employee_id.as_str()))
        .map(|e| {
            let won = won_by_owner.get(e.employee_id.as_str()).copied().unwrap_or(0.0);
            QuotaPerformance {
                id: e.employee_id.clone(),
                name: e.name.clone(),
                quota: e.sales_quota,
                won,
                attainment: finance::quota_attainment(won, e.sales_quota),
            }
        })
        .collect();

    let team_rows = teams
        .iter()
        .map(|t| {
            let won: f64 = t
                .member_ids
                .iter()
                .filter_map(|m| won_by_owner.get(m.as_str()))
                .sum();
            QuotaPerformance {
                id: t.team_id.clone(),
                name: t.name.clone(),
                quota: t.sales_quota,
                won,
                attainment: finance::quota_attainment(won, t.sales_quota),
            }
        })
        .collect();

    let client_names = names(&clients);
    let owner_names = names(&employees);
    let deal_rows = deals
        .iter()
        .map(|d| DealRow {
            deal_id: d.deal_id.clone(),
            title: d.title.clone(),
            stage: d.stage,
            value: d.value,
            client: resolve(&client_names, d.client_id.as_deref()),
            owner: resolve(&owner_names, d.owner_id.as_deref()),
        })
        .collect();

    Ok(SalesDashboard {
        pipeline: finance::pipeline_by_stage(&deals),
        open_value: deals.iter().filter(|d| !d.stage.is_closed()).map(|d| d.value).sum(),
        won_value: deals
            .iter()
            .filter(|d| d.stage == DealStage::ClosedWon)
            .map(|d| d.value)
            .sum(),
        win_rate: finance::win_rate(&deals),
        average_sales_cycle_days: finance::average_sales_cycle_days(&deals),
        reps,
        teams: team_rows,
        deals: deal_rows,
    })
}
