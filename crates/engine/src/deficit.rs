//! Deficit carried from the previous closing and the pre-opening checks.
//!
//! Before a shift opens the operator goes through at most two steps:
//!
//! 1. repay the carried deficit (only when there is one): take
//!    [`DeficitPlan::total_to_withdraw`] out of the main till and book it;
//! 2. confirm the fixed fund is physically in the till.
//!
//! Only step 2 mints the [`FundVerified`] token that opening a shift needs.
//! A repair is booked with [`repair_tag`], so a deficit that was already
//! repaid is recognised and step 1 is not offered again.

use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Description of the ledger entries booked by a deficit repair.
pub fn repair_tag(closing_id: Uuid) -> String {
    format!("REPARACION DEFICIT {closing_id}")
}

/// What the last closing left behind and what it takes to fix it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeficitPlan {
    /// Closing that recorded the deficit, if any closing exists.
    pub closing_id: Option<Uuid>,
    pub deficit_carried: Money,
    pub fixed_fund: Money,
    pub last_collected_cash: Money,
    /// `max(0, fixed_fund - last_collected_cash)`.
    pub fund_shortfall: Money,
    /// `deficit_carried + fund_shortfall`.
    pub total_to_withdraw: Money,
}

impl DeficitPlan {
    pub fn new(
        closing_id: Option<Uuid>,
        deficit_carried: Money,
        fixed_fund: Money,
        last_collected_cash: Money,
    ) -> Self {
        let deficit_carried = deficit_carried.at_least_zero();
        let fund_shortfall = (fixed_fund - last_collected_cash).at_least_zero();
        Self {
            closing_id,
            deficit_carried,
            fixed_fund,
            last_collected_cash,
            fund_shortfall,
            total_to_withdraw: deficit_carried + fund_shortfall,
        }
    }

    /// A plan for a store with no previous closing.
    pub fn clean(fixed_fund: Money) -> Self {
        Self::new(None, Money::ZERO, fixed_fund, fixed_fund)
    }

    pub fn needs_repair(&self) -> bool {
        self.deficit_carried.is_positive() && self.closing_id.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeficitStep {
    RepairDeficit,
    VerifyFund,
    Verified,
}

/// Proof that the operator confirmed the fixed fund is in the till.
///
/// Only [`DeficitWizard::confirm_fund`] can build one.
#[derive(Debug)]
pub struct FundVerified {
    _private: (),
}

/// The two-step pre-opening flow.
#[derive(Clone, Debug)]
pub struct DeficitWizard {
    plan: DeficitPlan,
    step: DeficitStep,
    error: Option<String>,
}

impl DeficitWizard {
    pub fn new(plan: DeficitPlan) -> Self {
        let step = if plan.needs_repair() {
            DeficitStep::RepairDeficit
        } else {
            DeficitStep::VerifyFund
        };
        Self {
            plan,
            step,
            error: None,
        }
    }

    /// A wizard for a deficit whose repair is already booked.
    pub fn repaired(plan: DeficitPlan) -> Self {
        Self {
            plan,
            step: DeficitStep::VerifyFund,
            error: None,
        }
    }

    pub fn plan(&self) -> &DeficitPlan {
        &self.plan
    }

    pub fn step(&self) -> DeficitStep {
        self.step
    }

    /// Inline error of the current step, if the last attempt failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records a successful repair and moves on to fund verification.
    pub(crate) fn repair_succeeded(&mut self) {
        self.error = None;
        self.step = DeficitStep::VerifyFund;
    }

    /// Records a failed repair. The wizard stays on step 1.
    pub(crate) fn repair_failed(&mut self, err: &EngineError) {
        self.error = Some(err.to_string());
    }

    /// Step 2. Opening stays blocked until the operator confirms.
    pub fn confirm_fund(&mut self, fund_present: bool) -> ResultEngine<FundVerified> {
        match self.step {
            DeficitStep::RepairDeficit => Err(EngineError::InvalidState(
                "the deficit must be repaid before verifying the fund".to_string(),
            )),
            _ if !fund_present => {
                let message = format!(
                    "confirm that the fixed fund of {} is in the till",
                    self.plan.fixed_fund
                );
                self.error = Some(message.clone());
                Err(EngineError::Validation(message))
            }
            _ => {
                self.error = None;
                self.step = DeficitStep::Verified;
                Ok(FundVerified { _private: () })
            }
        }
    }
}
