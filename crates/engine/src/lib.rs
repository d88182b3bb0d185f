//! Financial computation and aggregation engine.
//!
//! Three independent, stateless-per-call components behind one facade:
//!
//! - the **calculators** (loan amortization, savings time-to-goal,
//!   investment growth, borrowing capacity), pure functions over request
//!   parameters;
//! - the **dashboard aggregator**, which derives totals, a financial-health
//!   score, trend series, and distributions from one user's raw records;
//! - the **gamification engine**, which converts point deltas into level,
//!   tier, and badge transitions.
//!
//! The engine is invoked as a library by an API layer and reads records
//! through the collaborator traits in [`store`]; it owns no persistence and
//! no transport.
//!
//! ```
//! use engine::{CalculationInput, Engine, MemoryStore};
//! use rust_decimal_macros::dec;
//!
//! let engine = Engine::new(MemoryStore::new());
//! let result = engine
//!     .calculate(CalculationInput {
//!         kind: "credit".to_string(),
//!         principal: Some(dec!(100_000)),
//!         annual_rate: Some(dec!(5)),
//!         duration_months: Some(240),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert_eq!(result.output("monthly_payment"), Some(dec!(659.96)));
//! ```
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

pub use calculator::{
    AmortizationRow, CalculationInput, CalculationRequest, CalculationResult, CalculatorKind,
    OutputValue, amortization_schedule, calculate,
};
pub use dashboard::{
    Budget, BudgetStatus, CategorySpend, DashboardSummary, Expense, FinancialSnapshot,
    GoalProjection, MonthlyFlow, SavingsGoal, UserProfile, build_summary,
};
pub use error::EngineError;
pub use gamification::{
    BADGE_BUDGET_EXPERT, BADGE_FIRST_STEP, BADGE_SAVER, BadgeDefinition, GamificationProfile,
    LevelTier,
};
pub use store::{BadgeCatalog, MemoryStore, ProfileStore, RecordsReader};

mod calculator;
mod dashboard;
mod error;
mod gamification;
mod money;
mod store;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Facade over the three components, generic over the storage collaborator.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
}

impl<S> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Shared access to the underlying collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates a wide calculation input and runs the selected calculator.
    pub fn calculate(&self, input: CalculationInput) -> ResultEngine<CalculationResult> {
        calculator::calculate(input)
    }
}

impl<S> Engine<S>
where
    S: RecordsReader,
{
    /// Builds the dashboard summary for a user, anchored at today.
    pub fn dashboard(&self, user_id: Uuid) -> ResultEngine<DashboardSummary> {
        self.dashboard_at(user_id, Utc::now().date_naive())
    }

    /// Builds the dashboard summary anchored at an explicit date.
    pub fn dashboard_at(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<DashboardSummary> {
        let snapshot = self.store.find_user_records(user_id)?;
        Ok(dashboard::build_summary(&snapshot, today))
    }
}

impl<S> Engine<S>
where
    S: ProfileStore + BadgeCatalog,
{
    /// Awards points to a user and persists the resulting profile.
    ///
    /// The profile is created lazily on the first award.
    pub fn add_points(&self, user_id: Uuid, delta: i64) -> ResultEngine<GamificationProfile> {
        gamification::add_points(&self.store, user_id, delta)
    }
}
