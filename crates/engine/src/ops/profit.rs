use api_types::{
    operation::{OperationFilter, OperationKind},
    rpc::{CreateTransfer, TransferCreated},
    service::ServiceKind,
    till::TillCode,
};
use chrono::{Local, NaiveDate};

use crate::{
    Backend, EngineError, Money, ProfitLeg, ProfitMonth, ProfitPlan, ProfitStatus, ResultEngine,
    error::read_failed, profit, profit::service_till,
};

use super::Engine;

/// Result of one transfer leg.
#[derive(Clone, Debug, PartialEq)]
pub enum LegOutcome {
    Transferred(TransferCreated),
    Failed(EngineError),
}

/// Per-leg report of a profit transfer. The legs are independent calls: one
/// may succeed while the other fails, and only the failed one is retried.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfitTransferReport {
    pub month: ProfitMonth,
    pub legs: Vec<(ProfitLeg, LegOutcome)>,
}

impl ProfitTransferReport {
    pub fn is_complete(&self) -> bool {
        self.legs
            .iter()
            .all(|(_, outcome)| matches!(outcome, LegOutcome::Transferred(_)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&ProfitLeg, &EngineError)> {
        self.legs.iter().filter_map(|(leg, outcome)| match outcome {
            LegOutcome::Failed(err) => Some((leg, err)),
            LegOutcome::Transferred(_) => None,
        })
    }

    pub fn transferred(&self) -> Money {
        self.legs
            .iter()
            .filter(|(_, outcome)| matches!(outcome, LegOutcome::Transferred(_)))
            .map(|(leg, _)| leg.profit)
            .sum()
    }
}

/// Services whose profit for `month` was already transferred, judged from the
/// descriptions of outgoing transfers. A tag naming only the month settles
/// both services.
fn settled_services<'a>(
    month: &ProfitMonth,
    descriptions: impl Iterator<Item = &'a str>,
) -> Vec<ServiceKind> {
    let label = month.label();
    let mut settled = Vec::new();
    for description in descriptions.filter(|text| text.contains(&label)) {
        let named: Vec<ServiceKind> = ServiceKind::ALL
            .into_iter()
            .filter(|service| description.contains(&month.transfer_tag(*service)))
            .collect();
        let covers = if named.is_empty() {
            ServiceKind::ALL.to_vec()
        } else {
            named
        };
        for service in covers {
            if !settled.contains(&service) {
                settled.push(service);
            }
        }
    }
    settled
}

impl<B: Backend> Engine<B> {
    /// Checks the month before `today` and returns what is left to transfer.
    ///
    /// The settled check runs first, so a month already tagged is never
    /// recomputed.
    pub async fn pending_profit(&self, today: NaiveDate) -> ResultEngine<ProfitStatus> {
        let month = ProfitMonth::previous(today);
        let (from, until) = month.bounds(&Local);

        let transfers = self
            .backend
            .operations(&OperationFilter {
                kind: Some(OperationKind::TransferOut),
                description_contains: Some(month.label()),
                ..OperationFilter::default()
            })
            .await
            .map_err(|err| read_failed("earlier profit transfers", err))?;
        let settled = settled_services(
            &month,
            transfers
                .iter()
                .filter_map(|operation| operation.description.as_deref()),
        );
        if ServiceKind::ALL.iter().all(|service| settled.contains(service)) {
            tracing::debug!(month = %month.label(), "profit already transferred");
            return Ok(ProfitStatus::AlreadySettled(month));
        }

        let mut sales = [Money::ZERO; 2];
        for (slot, service) in sales.iter_mut().zip(ServiceKind::ALL) {
            let incomes = self
                .backend
                .operations(&OperationFilter {
                    till: Some(service_till(service)),
                    kind: Some(OperationKind::Income),
                    from: Some(from),
                    until: Some(until),
                    ..OperationFilter::default()
                })
                .await
                .map_err(|err| read_failed("the monthly sales", err))?;
            *slot = incomes
                .iter()
                .map(|operation| Money::new(operation.amount_minor))
                .sum();
        }
        let [sales_cellphone, sales_bus] = sales;
        Ok(profit::evaluate(month, sales_cellphone, sales_bus, &settled))
    }

    /// Issues one transfer per leg of `plan` into petty cash.
    ///
    /// Every leg is attempted; the report says which ones went through.
    pub async fn transfer_profit(&self, plan: &ProfitPlan) -> ResultEngine<ProfitTransferReport> {
        let employee = self.employee().await?;
        let mut legs = Vec::with_capacity(plan.legs.len());
        for leg in &plan.legs {
            let params = CreateTransfer {
                from: leg.from,
                to: TillCode::PettyCash,
                amount_minor: leg.profit.minor(),
                employee_id: employee.id,
                description: leg.tag.clone(),
            };
            let outcome = match self.commit("the profit transfer", &params).await {
                Ok(created) => {
                    tracing::info!(tag = %leg.tag, amount = %leg.profit, "profit transferred");
                    LegOutcome::Transferred(created)
                }
                Err(err) => {
                    tracing::warn!(tag = %leg.tag, "profit transfer failed: {err}");
                    LegOutcome::Failed(err)
                }
            };
            legs.push((leg.clone(), outcome));
        }
        Ok(ProfitTransferReport {
            month: plan.month,
            legs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month() -> ProfitMonth {
        ProfitMonth::previous(NaiveDate::from_ymd_opt(2026, 10, 5).unwrap())
    }

    #[test]
    fn service_tag_settles_one_leg() {
        let settled = settled_services(&month(), ["GANANCIA CELULAR 2026-09"].into_iter());
        assert_eq!(settled, vec![ServiceKind::Cellphone]);
    }

    #[test]
    fn month_only_tag_settles_both() {
        let settled = settled_services(&month(), ["Ganancias 2026-09"].into_iter());
        assert_eq!(settled.len(), 2);
    }

    #[test]
    fn other_months_are_ignored() {
        let settled = settled_services(&month(), ["GANANCIA BUS 2026-08"].into_iter());
        assert!(settled.is_empty());
    }
}
