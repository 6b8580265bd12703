use api_types::{service::ServiceKind, settings::ConfigRow, till::TillCode};
use chrono::NaiveDate;

use crate::{
    Backend, Money, ResultEngine, ShiftState, TillBalances, VirtualBalances,
    error::read_failed,
};

use super::Engine;

/// Store-wide constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub fixed_fund: Money,
    pub daily_transfer: Money,
    pub low_balance_threshold: Money,
    pub days_before_billing: i32,
}

impl From<ConfigRow> for StoreConfig {
    fn from(row: ConfigRow) -> Self {
        Self {
            fixed_fund: Money::new(row.fixed_fund_minor),
            daily_transfer: Money::new(row.daily_transfer_minor),
            low_balance_threshold: Money::new(row.low_balance_threshold_minor),
            days_before_billing: row.days_before_billing,
        }
    }
}

/// What the status screen shows. `None` means the value could not be read.
#[derive(Clone, Debug, PartialEq)]
pub struct Overview {
    pub shift: Option<ShiftState>,
    pub balances: Option<TillBalances>,
    pub last_closing: Option<Option<NaiveDate>>,
    pub low_balance: Option<Vec<TillCode>>,
}

impl<B: Backend> Engine<B> {
    /// Current balance of every till. Re-fetched on every call.
    pub async fn till_balances(&self) -> ResultEngine<TillBalances> {
        let rows = self
            .backend
            .tills()
            .await
            .map_err(|err| read_failed("the till balances", err))?;
        Ok(TillBalances::from_rows(&rows))
    }

    /// Business date of the most recent daily closing, `None` if there is none.
    pub async fn last_closing_date(&self) -> ResultEngine<Option<NaiveDate>> {
        let closing = self
            .backend
            .latest_closing()
            .await
            .map_err(|err| read_failed("the last closing", err))?;
        Ok(closing.map(|closing| closing.business_date))
    }

    pub async fn settings(&self) -> ResultEngine<StoreConfig> {
        self.backend
            .config()
            .await
            .map(StoreConfig::from)
            .map_err(|err| read_failed("the store configuration", err))
    }

    /// Virtual balances recorded by the most recent snapshot of each service.
    /// A service with no snapshot yet starts from zero.
    pub async fn previous_virtual_balances(&self) -> ResultEngine<VirtualBalances> {
        let mut balances = VirtualBalances::default();
        for service in ServiceKind::ALL {
            let snapshot = self
                .backend
                .latest_snapshot(service)
                .await
                .map_err(|err| read_failed("the previous virtual balances", err))?;
            let current = snapshot.map_or(Money::ZERO, |row| Money::new(row.current_balance_minor));
            match service {
                ServiceKind::Cellphone => balances.cellphone = current,
                ServiceKind::Bus => balances.bus = current,
            }
        }
        Ok(balances)
    }

    /// Gathers the status screen. Each part is read independently, so one
    /// failing read leaves only that part unknown.
    pub async fn overview(&self, today: NaiveDate) -> Overview {
        let shift = self.shift_state(today).await.ok();
        let balances = self.till_balances().await.ok();
        let last_closing = self.last_closing_date().await.ok();
        let low_balance = match (balances, self.settings().await) {
            (Some(balances), Ok(config)) => {
                Some(balances.below_threshold(config.low_balance_threshold))
            }
            _ => None,
        };
        Overview {
            shift,
            balances,
            last_closing,
            low_balance,
        }
    }
}
