//! Monthly profit transfer from the service tills to petty cash.

use api_types::{service::ServiceKind, till::TillCode};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::Money;

/// Commission earned on the sales of a service.
pub fn commission_rate(service: ServiceKind) -> Decimal {
    match service {
        ServiceKind::Cellphone => Decimal::new(5, 2),
        ServiceKind::Bus => Decimal::new(1, 2),
    }
}

/// Till that holds the cash of a service.
pub fn service_till(service: ServiceKind) -> TillCode {
    match service {
        ServiceKind::Cellphone => TillCode::Cellphone,
        ServiceKind::Bus => TillCode::Bus,
    }
}

/// A calendar month as the half-open range `[first, next_first)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfitMonth {
    pub first: NaiveDate,
    pub next_first: NaiveDate,
}

impl ProfitMonth {
    /// The calendar month before the one `today` falls in.
    pub fn previous(today: NaiveDate) -> Self {
        let this_first = today.with_day(1).unwrap_or(today);
        let first = this_first
            .pred_opt()
            .and_then(|last_day| last_day.with_day(1))
            .unwrap_or(this_first);
        Self {
            first,
            next_first: this_first,
        }
    }

    /// `YYYY-MM`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.first.year(), self.first.month())
    }

    /// The range as instants, with day boundaries taken in `tz`.
    pub fn bounds<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let at = |date: NaiveDate| {
            let midnight = date.and_time(NaiveTime::MIN);
            tz.from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
        };
        (at(self.first), at(self.next_first))
    }

    /// Description tag written on the transfer of `service` for this month.
    pub fn transfer_tag(&self, service: ServiceKind) -> String {
        format!("GANANCIA {} {}", service.as_str(), self.label())
    }
}

/// One pending transfer leg.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfitLeg {
    pub service: ServiceKind,
    pub from: TillCode,
    pub month_sales: Money,
    pub profit: Money,
    pub tag: String,
}

impl ProfitLeg {
    pub fn new(month: &ProfitMonth, service: ServiceKind, month_sales: Money) -> Self {
        Self {
            service,
            from: service_till(service),
            month_sales,
            profit: month_sales.apply_rate(commission_rate(service)),
            tag: month.transfer_tag(service),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfitPlan {
    pub month: ProfitMonth,
    /// Legs still to be transferred; a leg already tagged is left out.
    pub legs: Vec<ProfitLeg>,
}

impl ProfitPlan {
    pub fn total(&self) -> Money {
        self.legs.iter().map(|leg| leg.profit).sum()
    }
}

/// Outcome of the monthly check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfitStatus {
    /// Transfers for the month were already issued.
    AlreadySettled(ProfitMonth),
    /// One of the services sold nothing; nothing to move.
    NoSales(ProfitMonth),
    Pending(ProfitPlan),
}

/// Decides what is left to transfer for `month`.
///
/// `settled` lists the services whose transfer tag already exists.
pub fn evaluate(
    month: ProfitMonth,
    sales_cellphone: Money,
    sales_bus: Money,
    settled: &[ServiceKind],
) -> ProfitStatus {
    if ServiceKind::ALL.iter().all(|service| settled.contains(service)) {
        return ProfitStatus::AlreadySettled(month);
    }
    if !sales_cellphone.is_positive() || !sales_bus.is_positive() {
        return ProfitStatus::NoSales(month);
    }
    let legs: Vec<ProfitLeg> = [
        (ServiceKind::Cellphone, sales_cellphone),
        (ServiceKind::Bus, sales_bus),
    ]
    .into_iter()
    .filter(|(service, _)| !settled.contains(service))
    .map(|(service, sales)| ProfitLeg::new(&month, service, sales))
    .filter(|leg| leg.profit.is_positive())
    .collect();
    if legs.is_empty() {
        return ProfitStatus::NoSales(month);
    }
    ProfitStatus::Pending(ProfitPlan { month, legs })
}
