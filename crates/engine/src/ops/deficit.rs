use api_types::{
    operation::{OperationFilter, OperationKind},
    rpc::{DeficitRepaired, RepairShiftDeficit},
    till::TillCode,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    Backend, DeficitPlan, DeficitStep, DeficitWizard, EngineError, Money, ResultEngine,
    deficit::repair_tag, error::read_failed,
};

use super::Engine;

impl<B: Backend> Engine<B> {
    /// Builds the pre-opening wizard from the most recent closing.
    ///
    /// A deficit whose repair is already on the petty cash ledger starts at
    /// fund verification.
    pub async fn deficit_wizard(&self) -> ResultEngine<DeficitWizard> {
        let config = self.settings().await?;
        let last = self
            .backend
            .latest_closing()
            .await
            .map_err(|err| read_failed("the last closing", err))?;
        let plan = match last {
            Some(closing) => DeficitPlan::new(
                Some(closing.id),
                Money::new(closing.deficit_minor),
                config.fixed_fund,
                Money::new(closing.collected_cash_minor),
            ),
            None => DeficitPlan::clean(config.fixed_fund),
        };
        if let Some(closing_id) = plan.closing_id.filter(|_| plan.needs_repair()) {
            if self.repair_booked(closing_id).await? {
                tracing::debug!(%closing_id, "deficit already repaired");
                return Ok(DeficitWizard::repaired(plan));
            }
        }
        Ok(DeficitWizard::new(plan))
    }

    async fn repair_booked(&self, closing_id: Uuid) -> ResultEngine<bool> {
        let entries = self
            .backend
            .operations(&OperationFilter {
                till: Some(TillCode::PettyCash),
                kind: Some(OperationKind::Income),
                description_contains: Some(repair_tag(closing_id)),
                ..OperationFilter::default()
            })
            .await
            .map_err(|err| read_failed("earlier deficit repairs", err))?;
        Ok(!entries.is_empty())
    }

    /// Step 1: books the repayment of the carried deficit.
    ///
    /// On failure the error is kept on the wizard and it stays on step 1; the
    /// operator may retry as often as needed.
    pub async fn repair_deficit(
        &self,
        wizard: &mut DeficitWizard,
        today: NaiveDate,
    ) -> ResultEngine<DeficitRepaired> {
        if wizard.step() != DeficitStep::RepairDeficit {
            return Err(EngineError::InvalidState(
                "there is no deficit to repair".to_string(),
            ));
        }
        let plan = *wizard.plan();
        let closing_id = plan
            .closing_id
            .ok_or_else(|| EngineError::InvalidState("there is no deficit to repair".to_string()))?;

        let result = match self.employee().await {
            Ok(employee) => {
                self.commit(
                    "the deficit repair",
                    &RepairShiftDeficit {
                        closing_id,
                        employee_id: employee.id,
                        deficit_minor: plan.deficit_carried.minor(),
                        business_date: today,
                        description: repair_tag(closing_id),
                    },
                )
                .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(repaired) => {
                tracing::info!(
                    %closing_id,
                    deficit = %plan.deficit_carried,
                    withdrawn = %plan.total_to_withdraw,
                    "deficit repaired"
                );
                wizard.repair_succeeded();
                Ok(repaired)
            }
            Err(err) => {
                wizard.repair_failed(&err);
                Err(err)
            }
        }
    }
}
