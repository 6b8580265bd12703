//! Wire contract with the remote store of record.
//!
//! Every amount travels as signed integer minor units (`*_minor`). Row types
//! mirror what the store returns for a table query; the `rpc` module holds the
//! parameter shapes of the named procedures the core relies on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod till {
    use super::*;

    /// Stable code of a till (`caja`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub enum TillCode {
        #[serde(rename = "CAJA")]
        Main,
        #[serde(rename = "CAJA_CHICA")]
        PettyCash,
        #[serde(rename = "CAJA_CELULAR")]
        Cellphone,
        #[serde(rename = "CAJA_BUS")]
        Bus,
    }

    impl TillCode {
        pub const ALL: [TillCode; 4] = [Self::Main, Self::PettyCash, Self::Cellphone, Self::Bus];

        /// Returns the canonical code stored remotely.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Main => "CAJA",
                Self::PettyCash => "CAJA_CHICA",
                Self::Cellphone => "CAJA_CELULAR",
                Self::Bus => "CAJA_BUS",
            }
        }
    }

    impl core::fmt::Display for TillCode {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TillRow {
        pub id: i64,
        pub code: TillCode,
        pub name: String,
        pub balance_minor: i64,
        pub active: bool,
    }
}

pub mod service {
    use super::*;

    /// A resold service backed by a prepaid virtual balance.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum ServiceKind {
        #[serde(rename = "CELULAR")]
        Cellphone,
        Bus,
    }

    impl ServiceKind {
        pub const ALL: [ServiceKind; 2] = [Self::Cellphone, Self::Bus];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Cellphone => "CELULAR",
                Self::Bus => "BUS",
            }
        }
    }

    impl core::fmt::Display for ServiceKind {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str(self.as_str())
        }
    }
}

pub mod employee {
    use super::*;

    /// The employee behind the current session.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Employee {
        pub id: i64,
        pub name: String,
    }
}

pub mod shift {
    use super::*;

    /// A shift (`turno`). `closed_at` stays `None` while the shift is open.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ShiftRow {
        pub id: Uuid,
        pub business_date: NaiveDate,
        pub shift_number: i32,
        pub employee_id: i64,
        pub opened_at: DateTime<Utc>,
        pub closed_at: Option<DateTime<Utc>>,
    }

    impl ShiftRow {
        pub fn is_open(&self) -> bool {
            self.closed_at.is_none()
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ShiftNew {
        pub business_date: NaiveDate,
        pub shift_number: i32,
        pub employee_id: i64,
        pub opened_at: DateTime<Utc>,
    }
}

pub mod closing {
    use super::*;

    /// A daily cash closing (`caja_fisica_diaria`). At most one per shift.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct DailyClosingRow {
        pub id: Uuid,
        pub shift_id: Uuid,
        pub business_date: NaiveDate,
        pub collected_cash_minor: i64,
        /// Amount that should have reached petty cash but did not.
        pub deficit_minor: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod snapshot {
    use super::*;
    use crate::service::ServiceKind;

    /// Virtual balance ledger row (`recarga`), appended once per closing and service.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct VirtualSnapshotRow {
        pub id: Uuid,
        pub service: ServiceKind,
        pub closing_id: Option<Uuid>,
        pub previous_balance_minor: i64,
        pub current_balance_minor: i64,
        pub sales_minor: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod topup {
    use super::*;
    use crate::service::ServiceKind;

    /// A provider credit event (`recarga_virtual`).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TopUpRow {
        pub id: Uuid,
        pub service: ServiceKind,
        pub business_date: NaiveDate,
        pub virtual_amount_minor: i64,
        pub owed_minor: i64,
        pub profit_minor: i64,
        pub paid: bool,
        pub paid_on: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TopUpFilter {
        pub service: Option<ServiceKind>,
        pub paid: Option<bool>,
    }
}

pub mod operation {
    use super::*;
    use crate::till::TillCode;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum OperationKind {
        #[serde(rename = "INGRESO")]
        Income,
        #[serde(rename = "EGRESO")]
        Expense,
        #[serde(rename = "TRANSFERENCIA_ENTRADA")]
        TransferIn,
        #[serde(rename = "TRANSFERENCIA_SALIDA")]
        TransferOut,
    }

    impl OperationKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Income => "INGRESO",
                Self::Expense => "EGRESO",
                Self::TransferIn => "TRANSFERENCIA_ENTRADA",
                Self::TransferOut => "TRANSFERENCIA_SALIDA",
            }
        }
    }

    /// A ledger movement on one till (`operaciones_cajas`).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct OperationRow {
        pub id: Uuid,
        pub till: TillCode,
        pub kind: OperationKind,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub occurred_at: DateTime<Utc>,
    }

    /// Filter for operation queries.
    ///
    /// `from` is inclusive and `until` exclusive; `description_contains` is a
    /// case-sensitive substring match.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct OperationFilter {
        pub till: Option<TillCode>,
        pub kind: Option<OperationKind>,
        pub from: Option<DateTime<Utc>>,
        pub until: Option<DateTime<Utc>>,
        pub description_contains: Option<String>,
    }
}

pub mod settings {
    use super::*;

    /// The single global configuration row.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ConfigRow {
        pub fixed_fund_minor: i64,
        pub daily_transfer_minor: i64,
        pub low_balance_threshold_minor: i64,
        pub days_before_billing: i32,
    }
}

pub mod rpc {
    use serde::de::DeserializeOwned;

    use super::*;
    use crate::{service::ServiceKind, till::TillCode};

    /// A named remote procedure and the shape of what it returns.
    pub trait Procedure: Serialize + Send + Sync {
        const NAME: &'static str;
        type Output: DeserializeOwned + Send;
    }

    /// Response envelope of every remote procedure.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RpcResponse<T> {
        pub success: bool,
        pub data: Option<T>,
        pub error: Option<String>,
        /// Machine readable failure reason, see [`RpcErrorCode`].
        #[serde(default)]
        pub code: Option<RpcErrorCode>,
    }

    impl<T> RpcResponse<T> {
        pub fn ok(data: T) -> Self {
            Self {
                success: true,
                data: Some(data),
                error: None,
                code: None,
            }
        }

        pub fn failed(code: Option<RpcErrorCode>, error: impl Into<String>) -> Self {
            Self {
                success: false,
                data: None,
                error: Some(error.into()),
                code,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RpcErrorCode {
        ShiftAlreadyOpen,
        ShiftNotOpen,
        ClosingExists,
        CategoriesMissing,
        InsufficientBalance,
    }

    /// Commits a daily closing. The server recomputes every derived amount
    /// from these inputs; nothing the client derived is trusted.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExecuteDailyClosing {
        pub shift_id: Uuid,
        pub business_date: NaiveDate,
        pub employee_id: i64,
        pub collected_cash_minor: i64,
        pub final_cellphone_minor: i64,
        pub final_bus_minor: i64,
        pub previous_cellphone_minor: i64,
        pub previous_bus_minor: i64,
        pub main_till_minor: i64,
        pub petty_cash_minor: i64,
        pub cellphone_till_minor: i64,
        pub bus_till_minor: i64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ClosingCommitted {
        pub closing_id: Uuid,
        pub deficit_minor: i64,
    }

    impl Procedure for ExecuteDailyClosing {
        const NAME: &'static str = "ejecutar_cierre_diario";
        type Output = ClosingCommitted;
    }

    /// Books the deficit repair: an expense on the main till and an income on
    /// petty cash, both carrying `description`. Skips the minimum balance
    /// check on the main till.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RepairShiftDeficit {
        pub closing_id: Uuid,
        pub employee_id: i64,
        pub deficit_minor: i64,
        pub business_date: NaiveDate,
        pub description: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct DeficitRepaired {
        pub expense_id: Uuid,
        pub income_id: Uuid,
    }

    impl Procedure for RepairShiftDeficit {
        const NAME: &'static str = "reparar_deficit_turno";
        type Output = DeficitRepaired;
    }

    /// Moves money between two tills identified by code.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CreateTransfer {
        pub from: TillCode,
        pub to: TillCode,
        pub amount_minor: i64,
        pub employee_id: i64,
        pub description: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransferCreated {
        pub out_operation_id: Uuid,
        pub in_operation_id: Uuid,
    }

    impl Procedure for CreateTransfer {
        const NAME: &'static str = "crear_transferencia";
        type Output = TransferCreated;
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RegisterTopUp {
        pub service: ServiceKind,
        pub business_date: NaiveDate,
        pub employee_id: i64,
        pub virtual_amount_minor: i64,
        pub owed_minor: i64,
        pub profit_minor: i64,
        /// BUS top-ups are paid (booked as an expense) at registration time.
        pub settle_now: bool,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TopUpRegistered {
        pub topup_id: Uuid,
    }

    impl Procedure for RegisterTopUp {
        const NAME: &'static str = "registrar_recarga_virtual";
        type Output = TopUpRegistered;
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MarkTopUpsPaid {
        pub ids: Vec<Uuid>,
        pub employee_id: i64,
        pub paid_on: NaiveDate,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TopUpsPaid {
        pub updated: u32,
    }

    impl Procedure for MarkTopUpsPaid {
        const NAME: &'static str = "pagar_recargas_virtuales";
        type Output = TopUpsPaid;
    }
}

#[cfg(test)]
mod tests {
    use super::{
        operation::OperationKind,
        rpc::{RpcErrorCode, RpcResponse},
        service::ServiceKind,
        till::TillCode,
    };

    #[test]
    fn codes_serialize_to_store_names() {
        assert_eq!(
            serde_json::to_string(&TillCode::PettyCash).unwrap(),
            "\"CAJA_CHICA\""
        );
        assert_eq!(
            serde_json::to_string(&ServiceKind::Cellphone).unwrap(),
            "\"CELULAR\""
        );
        assert_eq!(
            serde_json::to_string(&OperationKind::TransferOut).unwrap(),
            "\"TRANSFERENCIA_SALIDA\""
        );
        for code in TillCode::ALL {
            assert_eq!(
                serde_json::to_string(&code).unwrap(),
                format!("\"{}\"", code.as_str())
            );
        }
    }

    #[test]
    fn rpc_response_without_code_deserializes() {
        let resp: RpcResponse<u32> =
            serde_json::from_str(r#"{"success":false,"data":null,"error":"boom"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.code, None);
        assert_eq!(resp.error.as_deref(), Some("boom"));

        let resp: RpcResponse<u32> = serde_json::from_str(
            r#"{"success":false,"data":null,"error":"x","code":"CLOSING_EXISTS"}"#,
        )
        .unwrap();
        assert_eq!(resp.code, Some(RpcErrorCode::ClosingExists));
    }
}
