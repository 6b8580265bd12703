use api_types::rpc::ClosingCommitted;
use chrono::NaiveDate;

use crate::{
    Backend, ClosingBaseline, ClosingPresence, ClosingStep, ClosingWizard, EngineError,
    ResultEngine, ShiftState,
};

use super::Engine;

fn closing_exists() -> EngineError {
    EngineError::StalePrecondition("A daily closing already exists for this shift".to_string())
}

fn closing_unknown() -> EngineError {
    EngineError::Indeterminate("whether this shift already has a daily closing".to_string())
}

impl<B: Backend> Engine<B> {
    /// Opens the daily closing wizard for today's open shift.
    ///
    /// Refuses when no shift is open, when the shift already has a closing,
    /// and (distinctly) when that could not be checked.
    pub async fn closing_wizard(&self, today: NaiveDate) -> ResultEngine<ClosingWizard> {
        let shift = match self.shift_state(today).await? {
            ShiftState::Open(shift) => shift,
            ShiftState::Unopened => {
                return Err(EngineError::StalePrecondition(
                    "No shift is open today".to_string(),
                ));
            }
            ShiftState::Closed(_) => {
                return Err(EngineError::StalePrecondition(
                    "Today's shift is already closed".to_string(),
                ));
            }
        };

        match self.closing_presence(shift.id).await {
            ClosingPresence::Absent => {}
            ClosingPresence::Present => return Err(closing_exists()),
            ClosingPresence::Unknown => return Err(closing_unknown()),
        }

        let tills = self.till_balances().await?;
        let previous_virtual = self.previous_virtual_balances().await?;
        let config = self.settings().await?;

        Ok(ClosingWizard::new(
            shift.id,
            shift.business_date,
            ClosingBaseline {
                previous_virtual,
                tills,
                daily_transfer: config.daily_transfer,
            },
        ))
    }

    /// Submits the reviewed closing as one atomic remote transaction.
    ///
    /// On success the wizard is clean and in [`ClosingStep::Done`]; leave the
    /// page, then call [`ClosingWizard::reset`]. On failure it is back on the
    /// review step with the error attached and nothing was committed.
    pub async fn submit_closing(&self, wizard: &mut ClosingWizard) -> ResultEngine<ClosingCommitted> {
        if wizard.step() != ClosingStep::Review {
            return Err(EngineError::InvalidState(
                "the closing can only be submitted from the review step".to_string(),
            ));
        }
        let employee = self.employee().await?;
        let blocked = match self.closing_presence(wizard.shift_id()).await {
            ClosingPresence::Absent => None,
            ClosingPresence::Present => Some(closing_exists()),
            ClosingPresence::Unknown => Some(closing_unknown()),
        };
        if let Some(err) = blocked {
            wizard.submit_failed(&err);
            return Err(err);
        }

        let params = wizard.begin_submit(employee.id)?;
        match self.commit("the daily closing", &params).await {
            Ok(committed) => {
                tracing::info!(
                    shift_id = %params.shift_id,
                    closing_id = %committed.closing_id,
                    deficit_minor = committed.deficit_minor,
                    "daily closing committed"
                );
                wizard.submit_succeeded();
                Ok(committed)
            }
            Err(err) => {
                wizard.submit_failed(&err);
                Err(err)
            }
        }
    }
}
