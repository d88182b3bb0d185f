//! Dashboard aggregation: raw persisted records in, derived summary out.
//!
//! [`build_summary`] is pure; it combines one user's records into totals, a
//! composite health score, a monthly trend series, a category distribution,
//! goal projections, and budget utilization. Nothing here is persisted; the
//! summary is derived fresh on every request.
use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gamification::{GamificationProfile, LevelTier};
use crate::money::{percent_of, round_money, round_ratio};

/// Trailing window for expense aggregation, in calendar months.
const LOOKBACK_MONTHS: u32 = 6;
/// Score reported when no income is tracked for the user.
const UNKNOWN_INCOME_SCORE: Decimal = dec!(50);

/// A single expense record within the lookback window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}

/// A budget envelope for one category over one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub spent: Decimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// A savings goal with its funding progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub completed: bool,
    pub target_date: NaiveDate,
}

/// Profile fields the aggregator reads.
///
/// `total_savings` is carried for other callers; dashboard math uses the sum
/// of goal balances as the canonical savings figure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub monthly_income: Decimal,
    pub total_savings: Decimal,
    pub total_debt: Decimal,
}

/// The consistent per-user read the storage collaborator returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub profile: UserProfile,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
    pub savings_goals: Vec<SavingsGoal>,
    pub gamification: Option<GamificationProfile>,
    pub unread_notifications: u64,
}

/// One month of the income/expense trend series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    /// Month and year, e.g. `"Aug 2026"`.
    pub label: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

/// One slice of the category spend distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub amount: Decimal,
    /// Share of the window's total spend, 0 when nothing was spent.
    pub percentage: Decimal,
}

/// Projection for a goal that is not completed yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalProjection {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub remaining: Decimal,
    pub progress_percentage: Decimal,
    /// Days until the target date; negative when the goal is overdue.
    pub days_remaining: i64,
}

/// Utilization of one budget envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub utilization: Decimal,
    /// Whether the reference date falls inside the budget period.
    pub active: bool,
}

/// Everything the dashboard screen renders, derived fresh per request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_savings: Decimal,
    pub total_debt: Decimal,
    pub health_score: Decimal,
    pub monthly_series: Vec<MonthlyFlow>,
    pub categories: Vec<CategorySpend>,
    pub active_goals: Vec<GoalProjection>,
    pub budgets: Vec<BudgetStatus>,
    pub points: i64,
    pub level: u32,
    pub tier: LevelTier,
    pub unread_notifications: u64,
}

/// Combines one user's records into a [`DashboardSummary`], anchored at
/// `today`.
pub fn build_summary(snapshot: &FinancialSnapshot, today: NaiveDate) -> DashboardSummary {
    let window_start = lookback_start(today);
    let in_window: Vec<&Expense> = snapshot
        .expenses
        .iter()
        .filter(|expense| expense.date >= window_start)
        .collect();

    let total_income = snapshot.profile.monthly_income;
    let total_expenses = round_money(in_window.iter().map(|e| e.amount).sum());
    let total_savings = round_money(
        snapshot
            .savings_goals
            .iter()
            .map(|goal| goal.current_amount)
            .sum(),
    );
    let total_debt = snapshot.profile.total_debt;

    let (points, level, tier) = match &snapshot.gamification {
        Some(profile) => (profile.points, profile.level, profile.tier),
        None => (0, 1, LevelTier::Beginner),
    };

    tracing::debug!(
        user_id = %snapshot.profile.user_id,
        expenses = in_window.len(),
        goals = snapshot.savings_goals.len(),
        budgets = snapshot.budgets.len(),
        "building dashboard summary"
    );

    DashboardSummary {
        total_income,
        total_expenses,
        total_savings,
        total_debt,
        health_score: health_score(total_income, total_expenses, total_savings, total_debt),
        monthly_series: monthly_series(total_income, &in_window, today),
        categories: category_breakdown(&in_window),
        active_goals: goal_projections(&snapshot.savings_goals, today),
        budgets: budget_statuses(&snapshot.budgets, today),
        points,
        level,
        tier,
        unread_notifications: snapshot.unread_notifications,
    }
}

fn lookback_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(LOOKBACK_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

/// Composite 0..=100 indicator blending savings, expense, and debt ratios
/// relative to income. Without a tracked income the score is a fixed 50.
fn health_score(income: Decimal, expenses: Decimal, savings: Decimal, debt: Decimal) -> Decimal {
    if income <= Decimal::ZERO {
        return UNKNOWN_INCOME_SCORE;
    }

    let savings_part = round_ratio(savings / income).min(Decimal::ONE) * dec!(40);
    let expense_part = (dec!(30) - round_ratio(expenses / income) * dec!(30)).max(Decimal::ZERO);
    let debt_part = (dec!(30) - round_ratio(debt / income) * dec!(30)).max(Decimal::ZERO);

    round_money(savings_part + expense_part + debt_part)
}

/// One entry per calendar month from `today − 6 months` to `today`
/// inclusive, pairing the constant monthly income with that month's spend.
fn monthly_series(income: Decimal, expenses: &[&Expense], today: NaiveDate) -> Vec<MonthlyFlow> {
    (0..=LOOKBACK_MONTHS)
        .rev()
        .filter_map(|back| today.checked_sub_months(Months::new(back)))
        .map(|anchor| {
            let spent = expenses
                .iter()
                .filter(|e| e.date.year() == anchor.year() && e.date.month() == anchor.month())
                .map(|e| e.amount)
                .sum();
            MonthlyFlow {
                label: anchor.format("%b %Y").to_string(),
                income,
                expenses: round_money(spent),
            }
        })
        .collect()
}

/// Groups window expenses by category, descending by amount. Ties break on
/// the category name so the ordering is deterministic.
fn category_breakdown(expenses: &[&Expense]) -> Vec<CategorySpend> {
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    for expense in expenses {
        *by_category.entry(expense.category.as_str()).or_default() += expense.amount;
    }

    let grand_total: Decimal = by_category.values().copied().sum();
    let mut slices: Vec<CategorySpend> = by_category
        .into_iter()
        .map(|(category, amount)| CategorySpend {
            category: category.to_string(),
            amount: round_money(amount),
            percentage: percent_of(amount, grand_total),
        })
        .collect();

    slices.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    slices
}

fn goal_projections(goals: &[SavingsGoal], today: NaiveDate) -> Vec<GoalProjection> {
    goals
        .iter()
        .filter(|goal| !goal.completed)
        .map(|goal| GoalProjection {
            id: goal.id,
            name: goal.name.clone(),
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            remaining: round_money(goal.target_amount - goal.current_amount),
            progress_percentage: percent_of(goal.current_amount, goal.target_amount),
            days_remaining: (goal.target_date - today).num_days(),
        })
        .collect()
}

fn budget_statuses(budgets: &[Budget], today: NaiveDate) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|budget| BudgetStatus {
            id: budget.id,
            category: budget.category.clone(),
            amount: budget.amount,
            spent: budget.spent,
            remaining: round_money(budget.amount - budget.spent),
            utilization: percent_of(budget.spent, budget.amount),
            active: budget.period_start <= today && today <= budget.period_end,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn expense(amount: Decimal, category: &str, on: NaiveDate) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            amount,
            category: category.to_string(),
            date: on,
        }
    }

    fn snapshot_with(expenses: Vec<Expense>) -> FinancialSnapshot {
        FinancialSnapshot {
            profile: UserProfile {
                user_id: Uuid::new_v4(),
                monthly_income: dec!(4_000),
                total_savings: dec!(0),
                total_debt: dec!(0),
            },
            expenses,
            budgets: Vec::new(),
            savings_goals: Vec::new(),
            gamification: None,
            unread_notifications: 0,
        }
    }

    #[test]
    fn score_is_fifty_without_income() {
        assert_eq!(
            health_score(Decimal::ZERO, dec!(100), dec!(100), dec!(100)),
            dec!(50)
        );
    }

    #[test]
    fn score_rewards_savings_and_punishes_spend() {
        // savings = income → full 40; no expenses or debt → both 30s intact.
        assert_eq!(
            health_score(dec!(1_000), Decimal::ZERO, dec!(1_000), Decimal::ZERO),
            dec!(100)
        );
        // spending and owing a full income zeroes both penalties.
        assert_eq!(
            health_score(dec!(1_000), dec!(1_000), Decimal::ZERO, dec!(1_000)),
            dec!(0)
        );
        // half of income spent, quarter saved, no debt.
        assert_eq!(
            health_score(dec!(2_000), dec!(1_000), dec!(500), Decimal::ZERO),
            dec!(55)
        );
    }

    #[test]
    fn score_stays_bounded_for_extreme_inputs() {
        let score = health_score(dec!(1), dec!(1_000_000), dec!(1_000_000), dec!(1_000_000));
        assert!(score >= Decimal::ZERO && score <= dec!(100));
    }

    #[test]
    fn expenses_outside_the_window_are_ignored() {
        let today = date(2026, 8, 8);
        let summary = build_summary(
            &snapshot_with(vec![
                expense(dec!(120), "groceries", date(2026, 7, 14)),
                expense(dec!(80), "groceries", date(2025, 12, 1)),
            ]),
            today,
        );

        assert_eq!(summary.total_expenses, dec!(120.00));
    }

    #[test]
    fn series_covers_seven_labeled_months() {
        let today = date(2026, 8, 8);
        let summary = build_summary(
            &snapshot_with(vec![
                expense(dec!(45.50), "transport", date(2026, 8, 2)),
                expense(dec!(30), "transport", date(2026, 5, 20)),
            ]),
            today,
        );

        let labels: Vec<&str> = summary
            .monthly_series
            .iter()
            .map(|m| m.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Feb 2026", "Mar 2026", "Apr 2026", "May 2026", "Jun 2026", "Jul 2026",
                "Aug 2026"
            ]
        );

        assert_eq!(summary.monthly_series[3].expenses, dec!(30.00));
        assert_eq!(summary.monthly_series[6].expenses, dec!(45.50));
        assert!(summary.monthly_series.iter().all(|m| m.income == dec!(4_000)));
    }

    #[test]
    fn categories_sort_descending_with_percentages() {
        let today = date(2026, 8, 8);
        let summary = build_summary(
            &snapshot_with(vec![
                expense(dec!(300), "rent", date(2026, 8, 1)),
                expense(dec!(100), "groceries", date(2026, 8, 2)),
                expense(dec!(100), "fun", date(2026, 8, 3)),
            ]),
            today,
        );

        let names: Vec<&str> = summary
            .categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["rent", "fun", "groceries"]);
        assert_eq!(summary.categories[0].percentage, dec!(60.00));
        assert_eq!(summary.categories[1].percentage, dec!(20.00));
    }

    #[test]
    fn overdue_goal_surfaces_negative_days() {
        let today = date(2026, 8, 8);
        let mut snapshot = snapshot_with(Vec::new());
        snapshot.savings_goals = vec![
            SavingsGoal {
                id: Uuid::new_v4(),
                name: "vacation".to_string(),
                target_amount: dec!(2_000),
                current_amount: dec!(500),
                completed: false,
                target_date: date(2026, 8, 1),
            },
            SavingsGoal {
                id: Uuid::new_v4(),
                name: "done".to_string(),
                target_amount: dec!(100),
                current_amount: dec!(100),
                completed: true,
                target_date: date(2027, 1, 1),
            },
        ];

        let summary = build_summary(&snapshot, today);
        assert_eq!(summary.active_goals.len(), 1);
        let goal = &summary.active_goals[0];
        assert_eq!(goal.remaining, dec!(1500.00));
        assert_eq!(goal.progress_percentage, dec!(25.00));
        assert_eq!(goal.days_remaining, -7);

        // goal balances are the canonical savings source, completed included
        assert_eq!(summary.total_savings, dec!(600.00));
    }

    #[test]
    fn zero_target_goal_reports_zero_progress() {
        let today = date(2026, 8, 8);
        let mut snapshot = snapshot_with(Vec::new());
        snapshot.savings_goals = vec![SavingsGoal {
            id: Uuid::new_v4(),
            name: "empty".to_string(),
            target_amount: Decimal::ZERO,
            current_amount: Decimal::ZERO,
            completed: false,
            target_date: date(2026, 9, 1),
        }];

        let summary = build_summary(&snapshot, today);
        assert_eq!(summary.active_goals[0].progress_percentage, Decimal::ZERO);
    }

    #[test]
    fn budgets_report_utilization_and_period() {
        let today = date(2026, 8, 8);
        let mut snapshot = snapshot_with(Vec::new());
        snapshot.budgets = vec![
            Budget {
                id: Uuid::new_v4(),
                category: "groceries".to_string(),
                amount: dec!(400),
                spent: dec!(300),
                period_start: date(2026, 8, 1),
                period_end: date(2026, 8, 31),
            },
            Budget {
                id: Uuid::new_v4(),
                category: "travel".to_string(),
                amount: Decimal::ZERO,
                spent: dec!(50),
                period_start: date(2026, 6, 1),
                period_end: date(2026, 6, 30),
            },
        ];

        let summary = build_summary(&snapshot, today);
        assert_eq!(summary.budgets[0].utilization, dec!(75.00));
        assert_eq!(summary.budgets[0].remaining, dec!(100.00));
        assert!(summary.budgets[0].active);
        assert_eq!(summary.budgets[1].utilization, Decimal::ZERO);
        assert!(!summary.budgets[1].active);
    }

    #[test]
    fn missing_gamification_profile_defaults() {
        let summary = build_summary(&snapshot_with(Vec::new()), date(2026, 8, 8));
        assert_eq!(summary.points, 0);
        assert_eq!(summary.level, 1);
        assert_eq!(summary.tier, LevelTier::Beginner);
    }
}
