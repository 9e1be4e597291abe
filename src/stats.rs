//! Financial statistics over the order and expense collections
//!
//! Pure, read-only aggregation for a selected reporting period: a specific
//! year, or all time (`None`). Nothing here is cached; every function
//! recomputes from the collections it is handed, which stays O(n) at
//! single-user scale.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::{Expense, ExpenseCategory, Order, OrderStatus};

/// Revenue collected in one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRevenue {
    /// First day of the month
    pub month: NaiveDate,
    pub revenue: BigDecimal,
}

/// Month-bucketed revenue from completed and delivered orders.
///
/// Revenue recognition is gated on completion status, not payment status:
/// orders outside {completed, delivered} contribute nothing here even when
/// money was collected on them (contrast [`actual_revenue`]). With a year
/// selected the series always has exactly 12 buckets, zero-filled; all time
/// yields one bucket per (year, month) that has data, ascending.
pub fn monthly_revenue(orders: &[Order], year: Option<i32>) -> Vec<MonthlyRevenue> {
    let recognized: Vec<&Order> = orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::Completed | OrderStatus::Delivered))
        .filter(|o| in_period(o.date.year(), year))
        .collect();

    match year {
        Some(year) => (1..=12)
            .map(|month| {
                let revenue = recognized
                    .iter()
                    .filter(|o| o.date.month() == month)
                    .map(|o| o.paid_amount())
                    .sum();
                MonthlyRevenue {
                    month: month_start(year, month),
                    revenue,
                }
            })
            .collect(),
        None => {
            let mut buckets: BTreeMap<NaiveDate, BigDecimal> = BTreeMap::new();
            for order in recognized {
                let key = month_start(order.date.year(), order.date.month());
                *buckets.entry(key).or_insert_with(|| BigDecimal::from(0)) += order.paid_amount();
            }
            buckets
                .into_iter()
                .map(|(month, revenue)| MonthlyRevenue { month, revenue })
                .collect()
        }
    }
}

/// Paid amounts collected across ALL orders in the period.
///
/// Deliberately broader than [`monthly_revenue`]: a paid deposit on a
/// merely planned order counts here but not in the monthly chart. The
/// asymmetry is preserved as observed behavior.
pub fn actual_revenue(orders: &[Order], year: Option<i32>) -> BigDecimal {
    orders
        .iter()
        .filter(|o| in_period(o.date.year(), year))
        .map(|o| o.paid_amount())
        .sum()
}

/// Sum of expense amounts in the period
pub fn total_expenses(expenses: &[Expense], year: Option<i32>) -> BigDecimal {
    expenses
        .iter()
        .filter(|e| in_period(e.date.year(), year))
        .map(|e| e.amount.clone())
        .sum()
}

/// Actual revenue minus total expenses for the period
pub fn net_profit(orders: &[Order], expenses: &[Expense], year: Option<i32>) -> BigDecimal {
    actual_revenue(orders, year) - total_expenses(expenses, year)
}

/// Number of orders dated in the period, regardless of status
pub fn order_count(orders: &[Order], year: Option<i32>) -> usize {
    orders
        .iter()
        .filter(|o| in_period(o.date.year(), year))
        .count()
}

/// Years that have at least one order, newest first
pub fn available_years(orders: &[Order]) -> Vec<i32> {
    let years: BTreeSet<i32> = orders.iter().map(|o| o.date.year()).collect();
    years.into_iter().rev().collect()
}

/// Expense totals per category for the period
pub fn expenses_by_category(
    expenses: &[Expense],
    year: Option<i32>,
) -> HashMap<ExpenseCategory, BigDecimal> {
    let mut totals: HashMap<ExpenseCategory, BigDecimal> = HashMap::new();
    for expense in expenses.iter().filter(|e| in_period(e.date.year(), year)) {
        *totals
            .entry(expense.category)
            .or_insert_with(|| BigDecimal::from(0)) += &expense.amount;
    }
    totals
}

fn in_period(date_year: i32, year: Option<i32>) -> bool {
    year.map_or(true, |y| date_year == y)
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_on(year: i32, month: u32, price: i64, status: OrderStatus) -> Order {
        let date = NaiveDate::from_ymd_opt(year, month, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut order = Order::new("Session".to_string(), date, BigDecimal::from(price));
        order.status = status;
        order.is_final_payment_paid = true; // no deposit, fully paid
        order
    }

    fn expense_on(year: i32, amount: i64, category: ExpenseCategory) -> Expense {
        Expense::new(
            "Expense".to_string(),
            BigDecimal::from(amount),
            category,
            NaiveDate::from_ymd_opt(year, 3, 1).unwrap(),
        )
    }

    #[test]
    fn monthly_revenue_always_emits_twelve_buckets_for_a_year() {
        let orders = vec![order_on(2025, 6, 18000, OrderStatus::Completed)];
        let series = monthly_revenue(&orders, Some(2025));

        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(series[5].revenue, BigDecimal::from(18000));
        assert!(series
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 5)
            .all(|(_, b)| b.revenue == BigDecimal::from(0)));
    }

    #[test]
    fn monthly_revenue_excludes_unrecognized_statuses() {
        let orders = vec![
            order_on(2025, 6, 18000, OrderStatus::Planned),
            order_on(2025, 6, 4000, OrderStatus::InProgress),
            order_on(2025, 6, 9000, OrderStatus::Cancelled),
            order_on(2025, 6, 5000, OrderStatus::Delivered),
        ];
        let series = monthly_revenue(&orders, Some(2025));
        assert_eq!(series[5].revenue, BigDecimal::from(5000));
    }

    #[test]
    fn monthly_revenue_all_time_buckets_only_months_with_data() {
        let orders = vec![
            order_on(2024, 11, 3000, OrderStatus::Completed),
            order_on(2025, 2, 5000, OrderStatus::Delivered),
            order_on(2025, 2, 1000, OrderStatus::Completed),
        ];
        let series = monthly_revenue(&orders, None);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
        assert_eq!(series[1].month, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(series[1].revenue, BigDecimal::from(6000));
    }

    #[test]
    fn actual_revenue_counts_paid_money_regardless_of_status() {
        // A paid deposit on a planned order: in actual revenue, not in the
        // monthly chart
        let date = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut planned = Order::new("Wedding".to_string(), date, BigDecimal::from(18000));
        planned.deposit = BigDecimal::from(2000);
        planned.is_deposit_paid = true;

        let orders = vec![planned, order_on(2025, 7, 5000, OrderStatus::Completed)];

        assert_eq!(actual_revenue(&orders, Some(2025)), BigDecimal::from(7000));
        let chart_total: BigDecimal = monthly_revenue(&orders, Some(2025))
            .into_iter()
            .map(|b| b.revenue)
            .sum();
        assert_eq!(chart_total, BigDecimal::from(5000));
    }

    #[test]
    fn year_scoping_applies_to_every_aggregate() {
        let orders = vec![
            order_on(2024, 5, 3000, OrderStatus::Completed),
            order_on(2025, 5, 7000, OrderStatus::Completed),
        ];
        let expenses = vec![
            expense_on(2024, 500, ExpenseCategory::Travel),
            expense_on(2025, 1200, ExpenseCategory::Equipment),
        ];

        assert_eq!(actual_revenue(&orders, Some(2025)), BigDecimal::from(7000));
        assert_eq!(total_expenses(&expenses, Some(2025)), BigDecimal::from(1200));
        assert_eq!(
            net_profit(&orders, &expenses, Some(2025)),
            BigDecimal::from(5800)
        );
        assert_eq!(order_count(&orders, Some(2025)), 1);

        assert_eq!(actual_revenue(&orders, None), BigDecimal::from(10000));
        assert_eq!(net_profit(&orders, &expenses, None), BigDecimal::from(8300));
        assert_eq!(order_count(&orders, None), 2);
    }

    #[test]
    fn order_count_ignores_status() {
        let orders = vec![
            order_on(2025, 1, 1000, OrderStatus::Cancelled),
            order_on(2025, 2, 1000, OrderStatus::Planned),
        ];
        assert_eq!(order_count(&orders, Some(2025)), 2);
    }

    #[test]
    fn available_years_are_distinct_and_newest_first() {
        let orders = vec![
            order_on(2023, 1, 1000, OrderStatus::Completed),
            order_on(2025, 1, 1000, OrderStatus::Planned),
            order_on(2023, 8, 1000, OrderStatus::Delivered),
        ];
        assert_eq!(available_years(&orders), vec![2025, 2023]);
    }

    #[test]
    fn expenses_group_by_category_within_the_period() {
        let expenses = vec![
            expense_on(2025, 500, ExpenseCategory::Travel),
            expense_on(2025, 700, ExpenseCategory::Travel),
            expense_on(2025, 1200, ExpenseCategory::Equipment),
            expense_on(2024, 999, ExpenseCategory::Travel),
        ];

        let by_category = expenses_by_category(&expenses, Some(2025));
        assert_eq!(
            by_category.get(&ExpenseCategory::Travel),
            Some(&BigDecimal::from(1200))
        );
        assert_eq!(
            by_category.get(&ExpenseCategory::Equipment),
            Some(&BigDecimal::from(1200))
        );
        assert_eq!(by_category.get(&ExpenseCategory::Office), None);
    }
}
