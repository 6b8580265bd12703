//! The remote store the engine reads from and delegates every mutation to.
//!
//! Implementations only move data: they do not validate, compute or retry.
//! Uniqueness ("one open shift per date", "one closing per shift") and
//! atomicity of the named procedures are the store's job.

use std::future::Future;

use api_types::{
    closing::DailyClosingRow,
    employee::Employee,
    operation::{OperationFilter, OperationRow},
    rpc::{Procedure, RpcResponse},
    service::ServiceKind,
    settings::ConfigRow,
    shift::{ShiftNew, ShiftRow},
    snapshot::VirtualSnapshotRow,
    till::TillRow,
    topup::{TopUpFilter, TopUpRow},
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::BackendError;

pub type BackendResult<T> = Result<T, BackendError>;

pub trait Backend: Send + Sync {
    /// Employee behind the current session, `None` when it cannot be resolved.
    fn current_employee(&self) -> impl Future<Output = BackendResult<Option<Employee>>> + Send;

    fn tills(&self) -> impl Future<Output = BackendResult<Vec<TillRow>>> + Send;

    fn config(&self) -> impl Future<Output = BackendResult<ConfigRow>> + Send;

    /// Most recent virtual balance snapshot of `service`, by creation time.
    fn latest_snapshot(
        &self,
        service: ServiceKind,
    ) -> impl Future<Output = BackendResult<Option<VirtualSnapshotRow>>> + Send;

    /// Most recent daily closing, by creation time.
    fn latest_closing(&self) -> impl Future<Output = BackendResult<Option<DailyClosingRow>>> + Send;

    fn closing_for_shift(
        &self,
        shift_id: Uuid,
    ) -> impl Future<Output = BackendResult<Option<DailyClosingRow>>> + Send;

    fn shifts_on(&self, date: NaiveDate) -> impl Future<Output = BackendResult<Vec<ShiftRow>>> + Send;

    fn insert_shift(&self, shift: ShiftNew) -> impl Future<Output = BackendResult<ShiftRow>> + Send;

    /// Sets `closed_at` on `shift_id` if it is still open. Returns the updated
    /// row, `None` when no open shift matched.
    fn close_shift(
        &self,
        shift_id: Uuid,
        closed_at: DateTime<Utc>,
    ) -> impl Future<Output = BackendResult<Option<ShiftRow>>> + Send;

    fn operations(
        &self,
        filter: &OperationFilter,
    ) -> impl Future<Output = BackendResult<Vec<OperationRow>>> + Send;

    fn topups(&self, filter: &TopUpFilter) -> impl Future<Output = BackendResult<Vec<TopUpRow>>> + Send;

    /// Calls a named procedure.
    fn call<P: Procedure>(
        &self,
        params: &P,
    ) -> impl Future<Output = BackendResult<RpcResponse<P::Output>>> + Send;
}
