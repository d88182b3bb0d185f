//! The financial calculators.
//!
//! Every calculator is a pure function from a validated request to a
//! [`CalculationResult`] bundle of named decimal outputs plus a prose
//! explanation. The boundary submits a wide [`CalculationInput`] record;
//! converting it to a [`CalculationRequest`] enforces per-kind required
//! fields, so a missing field is rejected up front instead of defaulting.
use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{error::EngineError, money::round_money};

/// Assumed yearly rate (percent) when inverting the amortization formula
/// for borrowing capacity.
const CAPACITY_ANNUAL_RATE: Decimal = dec!(5);
/// Assumed repayment term for borrowing capacity.
const CAPACITY_TERM_MONTHS: u32 = 240;
/// Share of net income considered safe to commit to repayments.
const CAPACITY_PAYMENT_RATIO: Decimal = dec!(0.33);

/// The supported calculators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    Credit,
    Savings,
    Investment,
    BorrowingCapacity,
}

impl CalculatorKind {
    /// Returns the canonical kind string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Savings => "savings",
            Self::Investment => "investment",
            Self::BorrowingCapacity => "borrowing_capacity",
        }
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculatorKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "savings" => Ok(Self::Savings),
            "investment" => Ok(Self::Investment),
            "borrowing_capacity" => Ok(Self::BorrowingCapacity),
            _ => Err(EngineError::UnsupportedKind(s.to_string())),
        }
    }
}

/// The wide record the boundary submits: one kind string, every field
/// optional. Which fields are required depends on the kind; see
/// [`CalculationRequest`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalculationInput {
    pub kind: String,
    pub principal: Option<Decimal>,
    pub annual_rate: Option<Decimal>,
    pub duration_months: Option<u32>,
    pub target_amount: Option<Decimal>,
    pub current_savings: Option<Decimal>,
    pub monthly_contribution: Option<Decimal>,
    pub expected_return: Option<Decimal>,
    pub monthly_income: Option<Decimal>,
    pub monthly_expenses: Option<Decimal>,
    pub other_debts: Option<Decimal>,
}

/// A validated calculation request, one variant per calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationRequest {
    /// Loan amortization with fixed monthly payments.
    Credit {
        principal: Decimal,
        annual_rate: Decimal,
        duration_months: u32,
    },
    /// Months needed to reach a savings target.
    ///
    /// The month count uses a flat-contribution model: `annual_rate` is
    /// carried for display but not compounded into the result.
    Savings {
        target_amount: Decimal,
        current_savings: Decimal,
        monthly_contribution: Decimal,
        annual_rate: Option<Decimal>,
    },
    /// Yearly compounded investment growth.
    Investment {
        principal: Decimal,
        expected_return: Decimal,
        duration_months: u32,
    },
    /// Loan size supportable by the income left after fixed obligations.
    BorrowingCapacity {
        monthly_income: Decimal,
        monthly_expenses: Decimal,
        other_debts: Decimal,
    },
}

impl CalculationRequest {
    pub fn kind(&self) -> CalculatorKind {
        match self {
            Self::Credit { .. } => CalculatorKind::Credit,
            Self::Savings { .. } => CalculatorKind::Savings,
            Self::Investment { .. } => CalculatorKind::Investment,
            Self::BorrowingCapacity { .. } => CalculatorKind::BorrowingCapacity,
        }
    }

    /// Runs the calculator for this request.
    ///
    /// Total over its domain: arithmetic edge cases (zero rate, zero
    /// duration, met targets, exhausted income) produce sentinel outputs
    /// rather than failures, so a result bundle is always renderable.
    pub fn evaluate(&self) -> CalculationResult {
        match self {
            Self::Credit {
                principal,
                annual_rate,
                duration_months,
            } => credit(*principal, *annual_rate, *duration_months),
            Self::Savings {
                target_amount,
                current_savings,
                monthly_contribution,
                ..
            } => savings(*target_amount, *current_savings, *monthly_contribution),
            Self::Investment {
                principal,
                expected_return,
                duration_months,
            } => investment(*principal, *expected_return, *duration_months),
            Self::BorrowingCapacity {
                monthly_income,
                monthly_expenses,
                other_debts,
            } => borrowing_capacity(*monthly_income, *monthly_expenses, *other_debts),
        }
    }
}

impl TryFrom<CalculationInput> for CalculationRequest {
    type Error = EngineError;

    fn try_from(input: CalculationInput) -> Result<Self, Self::Error> {
        let kind: CalculatorKind = input.kind.parse()?;
        match kind {
            CalculatorKind::Credit => Ok(Self::Credit {
                principal: require(input.principal, "principal")?,
                annual_rate: require(input.annual_rate, "annual_rate")?,
                duration_months: require(input.duration_months, "duration_months")?,
            }),
            CalculatorKind::Savings => Ok(Self::Savings {
                target_amount: require(input.target_amount, "target_amount")?,
                current_savings: require(input.current_savings, "current_savings")?,
                monthly_contribution: require(input.monthly_contribution, "monthly_contribution")?,
                annual_rate: input.annual_rate,
            }),
            CalculatorKind::Investment => Ok(Self::Investment {
                principal: require(input.principal, "principal")?,
                expected_return: require(input.expected_return, "expected_return")?,
                duration_months: require(input.duration_months, "duration_months")?,
            }),
            CalculatorKind::BorrowingCapacity => Ok(Self::BorrowingCapacity {
                monthly_income: require(input.monthly_income, "monthly_income")?,
                monthly_expenses: require(input.monthly_expenses, "monthly_expenses")?,
                other_debts: require(input.other_debts, "other_debts")?,
            }),
        }
    }
}

fn require<T>(field: Option<T>, name: &str) -> Result<T, EngineError> {
    field.ok_or_else(|| EngineError::MissingField(name.to_string()))
}

/// One named value in a result bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputValue {
    pub name: String,
    pub value: Decimal,
}

/// The outcome of a calculation: the kind, ordered named outputs, and a
/// prose summary. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub kind: CalculatorKind,
    pub outputs: Vec<OutputValue>,
    pub explanation: String,
}

impl CalculationResult {
    fn new(kind: CalculatorKind, outputs: &[(&str, Decimal)], explanation: String) -> Self {
        Self {
            kind,
            outputs: outputs
                .iter()
                .map(|(name, value)| OutputValue {
                    name: (*name).to_string(),
                    value: *value,
                })
                .collect(),
            explanation,
        }
    }

    /// Looks up an output value by name.
    pub fn output(&self, name: &str) -> Option<Decimal> {
        self.outputs
            .iter()
            .find(|output| output.name == name)
            .map(|output| output.value)
    }
}

/// Validates a wide input record and runs the selected calculator.
pub fn calculate(input: CalculationInput) -> Result<CalculationResult, EngineError> {
    Ok(CalculationRequest::try_from(input)?.evaluate())
}

fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / dec!(100) / dec!(12)
}

/// Per-unit-of-principal monthly payment: `i·(1+i)^n / ((1+i)^n − 1)`.
///
/// A zero (or negative) rate degenerates to linear repayment `1/n`.
/// Callers guarantee `duration_months > 0`.
fn amortization_factor(annual_rate: Decimal, duration_months: u32) -> Decimal {
    let i = monthly_rate(annual_rate);
    if i <= Decimal::ZERO {
        return Decimal::ONE / Decimal::from(duration_months);
    }
    let growth = (Decimal::ONE + i).powu(u64::from(duration_months));
    i * growth / (growth - Decimal::ONE)
}

fn credit(principal: Decimal, annual_rate: Decimal, duration_months: u32) -> CalculationResult {
    if duration_months == 0 || principal <= Decimal::ZERO {
        return CalculationResult::new(
            CalculatorKind::Credit,
            &[
                ("monthly_payment", Decimal::ZERO),
                ("total_amount", Decimal::ZERO),
                ("total_interest", Decimal::ZERO),
            ],
            "There is nothing to repay for this loan.".to_string(),
        );
    }

    let monthly_payment = round_money(principal * amortization_factor(annual_rate, duration_months));
    let total_amount = round_money(monthly_payment * Decimal::from(duration_months));
    let total_interest = round_money(total_amount - principal);

    CalculationResult::new(
        CalculatorKind::Credit,
        &[
            ("monthly_payment", monthly_payment),
            ("total_amount", total_amount),
            ("total_interest", total_interest),
        ],
        format!(
            "Borrowing {principal} over {duration_months} months at {annual_rate}% per year \
             costs {monthly_payment} per month; {total_interest} of the {total_amount} repaid \
             is interest."
        ),
    )
}

fn savings(
    target_amount: Decimal,
    current_savings: Decimal,
    monthly_contribution: Decimal,
) -> CalculationResult {
    use rust_decimal::prelude::ToPrimitive;

    let remaining = (target_amount - current_savings).max(Decimal::ZERO);

    let (months_needed, explanation) = if remaining.is_zero() {
        (
            0,
            format!("The target of {target_amount} is already covered by current savings."),
        )
    } else if monthly_contribution <= Decimal::ZERO {
        (
            0,
            format!("The remaining {remaining} cannot be reached without a monthly contribution."),
        )
    } else {
        let months = (remaining / monthly_contribution)
            .ceil()
            .to_u32()
            .unwrap_or(u32::MAX);
        (
            months,
            format!(
                "Contributing {monthly_contribution} per month closes the remaining {remaining} \
                 toward {target_amount} in {months} months."
            ),
        )
    };

    CalculationResult::new(
        CalculatorKind::Savings,
        &[
            ("remaining_amount", round_money(remaining)),
            ("months_needed", Decimal::from(months_needed)),
        ],
        explanation,
    )
}

fn investment(
    principal: Decimal,
    expected_return: Decimal,
    duration_months: u32,
) -> CalculationResult {
    let years = duration_months / 12;
    let future_value = if years == 0 {
        round_money(principal)
    } else {
        let growth = (Decimal::ONE + expected_return / dec!(100)).powu(u64::from(years));
        round_money(principal * growth)
    };
    let profit = round_money(future_value - principal);

    CalculationResult::new(
        CalculatorKind::Investment,
        &[("future_value", future_value), ("profit", profit)],
        format!(
            "Investing {principal} at {expected_return}% per year grows to {future_value} \
             after {years} full years, a profit of {profit}."
        ),
    )
}

fn borrowing_capacity(
    monthly_income: Decimal,
    monthly_expenses: Decimal,
    other_debts: Decimal,
) -> CalculationResult {
    let net_income = monthly_income - monthly_expenses - other_debts;

    if net_income <= Decimal::ZERO {
        return CalculationResult::new(
            CalculatorKind::BorrowingCapacity,
            &[
                ("net_income", round_money(net_income)),
                ("max_monthly_payment", Decimal::ZERO),
                ("borrowing_capacity", Decimal::ZERO),
            ],
            "Monthly obligations leave no room for loan repayments.".to_string(),
        );
    }

    let max_monthly_payment = round_money(net_income * CAPACITY_PAYMENT_RATIO);
    let factor = amortization_factor(CAPACITY_ANNUAL_RATE, CAPACITY_TERM_MONTHS);
    let borrowing_capacity = round_money(max_monthly_payment / factor);

    CalculationResult::new(
        CalculatorKind::BorrowingCapacity,
        &[
            ("net_income", round_money(net_income)),
            ("max_monthly_payment", max_monthly_payment),
            ("borrowing_capacity", borrowing_capacity),
        ],
        format!(
            "With {net_income} left each month and a third of it reserved for repayments, \
             a {CAPACITY_TERM_MONTHS}-month loan at {CAPACITY_ANNUAL_RATE}% per year supports \
             borrowing about {borrowing_capacity}."
        ),
    )
}

/// One row of a loan repayment schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub remaining_balance: Decimal,
}

/// Month-by-month split of a fixed loan payment into interest and principal.
///
/// Rows are rounded at 2 decimal places individually; the running balance is
/// clamped at zero so the final rows absorb accumulated rounding drift.
pub fn amortization_schedule(
    principal: Decimal,
    annual_rate: Decimal,
    duration_months: u32,
) -> Vec<AmortizationRow> {
    if duration_months == 0 || principal <= Decimal::ZERO {
        return Vec::new();
    }

    let i = monthly_rate(annual_rate).max(Decimal::ZERO);
    let payment = round_money(principal * amortization_factor(annual_rate, duration_months));

    let mut balance = principal;
    let mut rows = Vec::with_capacity(duration_months as usize);
    for month in 1..=duration_months {
        let interest = round_money(balance * i);
        let principal_share = round_money(payment - interest);
        balance = round_money((balance - principal_share).max(Decimal::ZERO));
        rows.push(AmortizationRow {
            month,
            payment,
            interest,
            principal: principal_share,
            remaining_balance: balance,
        });
    }
    rows
}
