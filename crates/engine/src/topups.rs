//! Provider top-ups of the virtual balances.

use api_types::{service::ServiceKind, topup::TopUpRow};

use crate::{EngineError, Money, ResultEngine, profit::commission_rate};

/// Amounts of a provider credit before it is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopUpPlan {
    pub service: ServiceKind,
    pub virtual_amount: Money,
    /// What the store keeps: `virtual_amount * commission`.
    pub profit: Money,
    /// What the provider is paid: `virtual_amount - profit`.
    pub owed: Money,
    /// BUS credit is paid on the spot; CELULAR credit becomes a payable.
    pub settle_now: bool,
}

impl TopUpPlan {
    pub fn new(service: ServiceKind, virtual_amount: Money) -> ResultEngine<Self> {
        if !virtual_amount.is_positive() {
            return Err(EngineError::Validation(
                "the top-up amount must be greater than zero".to_string(),
            ));
        }
        let profit = virtual_amount.apply_rate(commission_rate(service));
        Ok(Self {
            service,
            virtual_amount,
            profit,
            owed: virtual_amount - profit,
            settle_now: service == ServiceKind::Bus,
        })
    }
}

/// Unpaid provider credit.
#[derive(Clone, Debug, PartialEq)]
pub struct DebtSummary {
    pub items: Vec<TopUpRow>,
    pub total: Money,
}

impl DebtSummary {
    pub fn from_rows(rows: Vec<TopUpRow>) -> Self {
        let items: Vec<TopUpRow> = rows.into_iter().filter(|row| !row.paid).collect();
        let total = items.iter().map(|row| Money::new(row.owed_minor)).sum();
        Self { items, total }
    }
}
