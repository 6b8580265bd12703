//! Till balances as the core sees them.

use api_types::till::{TillCode, TillRow};

use crate::Money;

/// Snapshot of the four till balances. It may be stale the moment it is read:
/// remote procedures always recompute from their own authoritative state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TillBalances {
    pub main: Money,
    pub petty_cash: Money,
    pub cellphone: Money,
    pub bus: Money,
}

impl TillBalances {
    /// Builds the snapshot from till rows. Inactive tills count as zero.
    pub fn from_rows(rows: &[TillRow]) -> Self {
        let mut balances = Self::default();
        for row in rows.iter().filter(|row| row.active) {
            *balances.get_mut(row.code) = Money::new(row.balance_minor);
        }
        balances
    }

    pub fn get(&self, code: TillCode) -> Money {
        match code {
            TillCode::Main => self.main,
            TillCode::PettyCash => self.petty_cash,
            TillCode::Cellphone => self.cellphone,
            TillCode::Bus => self.bus,
        }
    }

    fn get_mut(&mut self, code: TillCode) -> &mut Money {
        match code {
            TillCode::Main => &mut self.main,
            TillCode::PettyCash => &mut self.petty_cash,
            TillCode::Cellphone => &mut self.cellphone,
            TillCode::Bus => &mut self.bus,
        }
    }

    pub fn total(&self) -> Money {
        TillCode::ALL.iter().map(|code| self.get(*code)).sum()
    }

    /// Tills whose balance is strictly under `threshold`.
    pub fn below_threshold(&self, threshold: Money) -> Vec<TillCode> {
        TillCode::ALL
            .into_iter()
            .filter(|code| self.get(*code) < threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: TillCode, balance_minor: i64, active: bool) -> TillRow {
        TillRow {
            id: 1,
            code,
            name: code.as_str().to_string(),
            balance_minor,
            active,
        }
    }

    #[test]
    fn from_rows_skips_inactive() {
        let balances = TillBalances::from_rows(&[
            row(TillCode::Main, 10_000, true),
            row(TillCode::PettyCash, 2_000, true),
            row(TillCode::Cellphone, 500, false),
            row(TillCode::Bus, 700, true),
        ]);
        assert_eq!(balances.main, Money::new(10_000));
        assert_eq!(balances.cellphone, Money::ZERO);
        assert_eq!(balances.total(), Money::new(12_700));
    }

    #[test]
    fn below_threshold_lists_low_tills() {
        let balances = TillBalances {
            main: Money::new(50_000),
            petty_cash: Money::new(900),
            cellphone: Money::new(1_000),
            bus: Money::new(0),
        };
        assert_eq!(
            balances.below_threshold(Money::new(1_000)),
            vec![TillCode::PettyCash, TillCode::Bus]
        );
    }
}
