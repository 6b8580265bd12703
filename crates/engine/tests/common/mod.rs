#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use engine::{
    Backend, BackendError, BackendResult, Engine,
    api_types::{
        closing::DailyClosingRow,
        employee::Employee,
        operation::{OperationFilter, OperationKind, OperationRow},
        rpc::{
            ExecuteDailyClosing, MarkTopUpsPaid, Procedure, RegisterTopUp, RepairShiftDeficit,
            CreateTransfer, RpcErrorCode, RpcResponse,
        },
        service::ServiceKind,
        settings::ConfigRow,
        shift::{ShiftNew, ShiftRow},
        snapshot::VirtualSnapshotRow,
        till::{TillCode, TillRow},
        topup::{TopUpFilter, TopUpRow},
    },
};
use serde_json::{Value, json};
use uuid::Uuid;

/// In-memory store with just enough procedure logic to drive the engine.
#[derive(Debug, Default)]
pub struct State {
    pub employee: Option<Employee>,
    pub tills: Vec<TillRow>,
    pub config: Option<ConfigRow>,
    pub snapshots: Vec<VirtualSnapshotRow>,
    pub closings: Vec<DailyClosingRow>,
    pub shifts: Vec<ShiftRow>,
    pub operations: Vec<OperationRow>,
    pub topups: Vec<TopUpRow>,
    /// Procedures called, in order, with their parameters.
    pub calls: Vec<(String, Value)>,
    /// Backend methods (by name) that fail as if the network were down.
    pub offline: HashSet<&'static str>,
    /// Procedures that answer `success: false`.
    pub rejections: HashMap<&'static str, (Option<RpcErrorCode>, String)>,
    /// Shifts inserted by another session between our read and our insert.
    pub concurrent_shift: Option<ShiftRow>,
    /// Transfers out of this till fail for lack of funds.
    pub till_insufficient: Option<TillCode>,
    pub deficit_on_closing: i64,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn calls_to(&self, name: &str) -> Vec<Value> {
        self.with(|state| {
            state
                .calls
                .iter()
                .filter(|(called, _)| called == name)
                .map(|(_, params)| params.clone())
                .collect()
        })
    }

    fn read<T>(&self, method: &'static str, f: impl FnOnce(&State) -> T) -> BackendResult<T> {
        let state = self.state.lock().unwrap();
        if state.offline.contains(method) {
            return Err(BackendError::Unavailable(format!("{method}: timed out")));
        }
        Ok(f(&state))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn till(code: TillCode, balance_minor: i64) -> TillRow {
    TillRow {
        id: TillCode::ALL.iter().position(|c| *c == code).unwrap() as i64 + 1,
        code,
        name: code.as_str().to_string(),
        balance_minor,
        active: true,
    }
}

pub fn config() -> ConfigRow {
    ConfigRow {
        fixed_fund_minor: 4_000,
        daily_transfer_minor: 2_000,
        low_balance_threshold_minor: 5_000,
        days_before_billing: 3,
    }
}

/// A store with an identified employee, four tills and a configuration.
pub fn seeded() -> FakeBackend {
    let backend = FakeBackend::default();
    backend.with(|state| {
        state.employee = Some(Employee {
            id: 7,
            name: "Rosa".to_string(),
        });
        state.tills = vec![
            till(TillCode::Main, 50_000),
            till(TillCode::PettyCash, 10_000),
            till(TillCode::Cellphone, 20_000),
            till(TillCode::Bus, 3_000),
        ];
        state.config = Some(config());
    });
    backend
}

pub fn engine(backend: FakeBackend) -> Engine<FakeBackend> {
    Engine::builder().backend(backend).build().unwrap()
}

pub fn open_shift_row(business_date: NaiveDate, shift_number: i32) -> ShiftRow {
    ShiftRow {
        id: Uuid::new_v4(),
        business_date,
        shift_number,
        employee_id: 7,
        opened_at: at(2026, 10, 19, 8),
        closed_at: None,
    }
}

pub fn closing_row(shift_id: Uuid, deficit_minor: i64, collected_cash_minor: i64) -> DailyClosingRow {
    DailyClosingRow {
        id: Uuid::new_v4(),
        shift_id,
        business_date: date(2026, 10, 18),
        collected_cash_minor,
        deficit_minor,
        created_at: at(2026, 10, 18, 20),
    }
}

pub fn operation(
    till: TillCode,
    kind: OperationKind,
    amount_minor: i64,
    description: Option<&str>,
    occurred_at: DateTime<Utc>,
) -> OperationRow {
    OperationRow {
        id: Uuid::new_v4(),
        till,
        kind,
        amount_minor,
        description: description.map(str::to_string),
        occurred_at,
    }
}

fn adjust(state: &mut State, code: TillCode, delta: i64) {
    if let Some(row) = state.tills.iter_mut().find(|row| row.code == code) {
        row.balance_minor += delta;
    }
}

fn matches(filter: &OperationFilter, row: &OperationRow) -> bool {
    filter.till.is_none_or(|till| row.till == till)
        && filter.kind.is_none_or(|kind| row.kind == kind)
        && filter.from.is_none_or(|from| row.occurred_at >= from)
        && filter.until.is_none_or(|until| row.occurred_at < until)
        && filter.description_contains.as_deref().is_none_or(|needle| {
            row.description
                .as_deref()
                .is_some_and(|text| text.contains(needle))
        })
}

fn dispatch(state: &mut State, name: &str, params: Value) -> Result<Value, RpcResponse<Value>> {
    let decode = |err: serde_json::Error| RpcResponse::failed(None, err.to_string());
    let now = Utc::now();
    match name {
        ExecuteDailyClosing::NAME => {
            let params: ExecuteDailyClosing = serde_json::from_value(params).map_err(decode)?;
            if state.closings.iter().any(|c| c.shift_id == params.shift_id) {
                return Err(RpcResponse::failed(
                    Some(RpcErrorCode::ClosingExists),
                    "closing already registered",
                ));
            }
            let closing = DailyClosingRow {
                id: Uuid::new_v4(),
                shift_id: params.shift_id,
                business_date: params.business_date,
                collected_cash_minor: params.collected_cash_minor,
                deficit_minor: state.deficit_on_closing,
                created_at: now,
            };
            for (service, previous, current) in [
                (
                    ServiceKind::Cellphone,
                    params.previous_cellphone_minor,
                    params.final_cellphone_minor,
                ),
                (ServiceKind::Bus, params.previous_bus_minor, params.final_bus_minor),
            ] {
                state.snapshots.push(VirtualSnapshotRow {
                    id: Uuid::new_v4(),
                    service,
                    closing_id: Some(closing.id),
                    previous_balance_minor: previous,
                    current_balance_minor: current,
                    sales_minor: (previous - current).max(0),
                    created_at: now,
                });
            }
            let out = json!({ "closing_id": closing.id, "deficit_minor": closing.deficit_minor });
            state.closings.push(closing);
            Ok(out)
        }
        RepairShiftDeficit::NAME => {
            let params: RepairShiftDeficit = serde_json::from_value(params).map_err(decode)?;
            let expense = operation(
                TillCode::Main,
                OperationKind::Expense,
                params.deficit_minor,
                Some(&params.description),
                now,
            );
            let income = operation(
                TillCode::PettyCash,
                OperationKind::Income,
                params.deficit_minor,
                Some(&params.description),
                now,
            );
            adjust(state, TillCode::Main, -params.deficit_minor);
            adjust(state, TillCode::PettyCash, params.deficit_minor);
            let out = json!({ "expense_id": expense.id, "income_id": income.id });
            state.operations.push(expense);
            state.operations.push(income);
            Ok(out)
        }
        CreateTransfer::NAME => {
            let params: CreateTransfer = serde_json::from_value(params).map_err(decode)?;
            if state.till_insufficient == Some(params.from) {
                return Err(RpcResponse::failed(
                    Some(RpcErrorCode::InsufficientBalance),
                    "saldo insuficiente",
                ));
            }
            let out_row = operation(
                params.from,
                OperationKind::TransferOut,
                params.amount_minor,
                Some(&params.description),
                now,
            );
            let in_row = operation(
                params.to,
                OperationKind::TransferIn,
                params.amount_minor,
                Some(&params.description),
                now,
            );
            adjust(state, params.from, -params.amount_minor);
            adjust(state, params.to, params.amount_minor);
            let out = json!({ "out_operation_id": out_row.id, "in_operation_id": in_row.id });
            state.operations.push(out_row);
            state.operations.push(in_row);
            Ok(out)
        }
        RegisterTopUp::NAME => {
            let params: RegisterTopUp = serde_json::from_value(params).map_err(decode)?;
            let row = TopUpRow {
                id: Uuid::new_v4(),
                service: params.service,
                business_date: params.business_date,
                virtual_amount_minor: params.virtual_amount_minor,
                owed_minor: params.owed_minor,
                profit_minor: params.profit_minor,
                paid: params.settle_now,
                paid_on: params.settle_now.then_some(params.business_date),
                created_at: now,
            };
            let out = json!({ "topup_id": row.id });
            state.topups.push(row);
            Ok(out)
        }
        MarkTopUpsPaid::NAME => {
            let params: MarkTopUpsPaid = serde_json::from_value(params).map_err(decode)?;
            let mut updated = 0u32;
            for row in state
                .topups
                .iter_mut()
                .filter(|row| !row.paid && params.ids.contains(&row.id))
            {
                row.paid = true;
                row.paid_on = Some(params.paid_on);
                updated += 1;
            }
            Ok(json!({ "updated": updated }))
        }
        other => Err(RpcResponse::failed(None, format!("unknown procedure {other}"))),
    }
}

impl Backend for FakeBackend {
    async fn current_employee(&self) -> BackendResult<Option<Employee>> {
        self.read("current_employee", |state| state.employee.clone())
    }

    async fn tills(&self) -> BackendResult<Vec<TillRow>> {
        self.read("tills", |state| state.tills.clone())
    }

    async fn config(&self) -> BackendResult<ConfigRow> {
        self.read("config", |state| state.config.clone())?
            .ok_or_else(|| BackendError::Decode("no configuration row".to_string()))
    }

    async fn latest_snapshot(&self, service: ServiceKind) -> BackendResult<Option<VirtualSnapshotRow>> {
        self.read("latest_snapshot", |state| {
            state
                .snapshots
                .iter()
                .filter(|row| row.service == service)
                .max_by_key(|row| row.created_at)
                .cloned()
        })
    }

    async fn latest_closing(&self) -> BackendResult<Option<DailyClosingRow>> {
        self.read("latest_closing", |state| {
            state.closings.iter().max_by_key(|row| row.created_at).cloned()
        })
    }

    async fn closing_for_shift(&self, shift_id: Uuid) -> BackendResult<Option<DailyClosingRow>> {
        self.read("closing_for_shift", |state| {
            state
                .closings
                .iter()
                .find(|row| row.shift_id == shift_id)
                .cloned()
        })
    }

    async fn shifts_on(&self, date: NaiveDate) -> BackendResult<Vec<ShiftRow>> {
        self.read("shifts_on", |state| {
            state
                .shifts
                .iter()
                .filter(|row| row.business_date == date)
                .cloned()
                .collect()
        })
    }

    async fn insert_shift(&self, shift: ShiftNew) -> BackendResult<ShiftRow> {
        let mut state = self.state.lock().unwrap();
        if let Some(concurrent) = state.concurrent_shift.take() {
            state.shifts.push(concurrent);
        }
        if state
            .shifts
            .iter()
            .any(|row| row.business_date == shift.business_date && row.is_open())
        {
            return Err(BackendError::Server {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        let row = ShiftRow {
            id: Uuid::new_v4(),
            business_date: shift.business_date,
            shift_number: shift.shift_number,
            employee_id: shift.employee_id,
            opened_at: shift.opened_at,
            closed_at: None,
        };
        state.shifts.push(row.clone());
        Ok(row)
    }

    async fn close_shift(&self, shift_id: Uuid, closed_at: DateTime<Utc>) -> BackendResult<Option<ShiftRow>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .shifts
            .iter_mut()
            .find(|row| row.id == shift_id && row.is_open())
            .map(|row| {
                row.closed_at = Some(closed_at);
                row.clone()
            }))
    }

    async fn operations(&self, filter: &OperationFilter) -> BackendResult<Vec<OperationRow>> {
        self.read("operations", |state| {
            state
                .operations
                .iter()
                .filter(|row| matches(filter, row))
                .cloned()
                .collect()
        })
    }

    async fn topups(&self, filter: &TopUpFilter) -> BackendResult<Vec<TopUpRow>> {
        self.read("topups", |state| {
            state
                .topups
                .iter()
                .filter(|row| filter.service.is_none_or(|service| row.service == service))
                .filter(|row| filter.paid.is_none_or(|paid| row.paid == paid))
                .cloned()
                .collect()
        })
    }

    async fn call<P: Procedure>(&self, params: &P) -> BackendResult<RpcResponse<P::Output>> {
        let params = serde_json::to_value(params).map_err(|err| BackendError::Decode(err.to_string()))?;
        let mut state = self.state.lock().unwrap();
        state.calls.push((P::NAME.to_string(), params.clone()));
        if state.offline.contains(P::NAME) {
            return Err(BackendError::Unavailable(format!("{}: timed out", P::NAME)));
        }
        if let Some((code, message)) = state.rejections.get(P::NAME).cloned() {
            return Ok(RpcResponse::failed(code, message));
        }
        match dispatch(&mut state, P::NAME, params) {
            Ok(data) => serde_json::from_value(data)
                .map(RpcResponse::ok)
                .map_err(|err| BackendError::Decode(err.to_string())),
            Err(failed) => Ok(RpcResponse::failed(
                failed.code,
                failed.error.unwrap_or_default(),
            )),
        }
    }
}
