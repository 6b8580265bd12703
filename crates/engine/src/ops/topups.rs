use api_types::{
    rpc::{MarkTopUpsPaid, RegisterTopUp, TopUpRegistered, TopUpsPaid},
    service::ServiceKind,
    topup::TopUpFilter,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    Backend, DebtSummary, EngineError, ResultEngine, TopUpPlan, error::read_failed,
};

use super::Engine;

impl<B: Backend> Engine<B> {
    /// Registers a provider credit. BUS credit is paid on the spot by the
    /// procedure; CELULAR credit stays as a payable.
    pub async fn register_topup(
        &self,
        plan: &TopUpPlan,
        business_date: NaiveDate,
    ) -> ResultEngine<TopUpRegistered> {
        let employee = self.employee().await?;
        let registered = self
            .commit(
                "the top-up",
                &RegisterTopUp {
                    service: plan.service,
                    business_date,
                    employee_id: employee.id,
                    virtual_amount_minor: plan.virtual_amount.minor(),
                    owed_minor: plan.owed.minor(),
                    profit_minor: plan.profit.minor(),
                    settle_now: plan.settle_now,
                },
            )
            .await?;
        tracing::info!(
            service = %plan.service,
            amount = %plan.virtual_amount,
            owed = %plan.owed,
            "top-up registered"
        );
        Ok(registered)
    }

    /// Unpaid provider credit of `service`.
    pub async fn pending_debts(&self, service: ServiceKind) -> ResultEngine<DebtSummary> {
        let rows = self
            .backend
            .topups(&TopUpFilter {
                service: Some(service),
                paid: Some(false),
            })
            .await
            .map_err(|err| read_failed("the pending top-up debts", err))?;
        Ok(DebtSummary::from_rows(rows))
    }

    /// Marks the given top-ups as paid on `paid_on`.
    pub async fn mark_topups_paid(&self, ids: &[Uuid], paid_on: NaiveDate) -> ResultEngine<TopUpsPaid> {
        if ids.is_empty() {
            return Err(EngineError::Validation(
                "select at least one top-up to pay".to_string(),
            ));
        }
        let employee = self.employee().await?;
        let paid = self
            .commit(
                "the top-up payment",
                &MarkTopUpsPaid {
                    ids: ids.to_vec(),
                    employee_id: employee.id,
                    paid_on,
                },
            )
            .await?;
        tracing::info!(updated = paid.updated, "top-ups marked paid");
        Ok(paid)
    }
}
