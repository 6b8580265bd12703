//! Table rows as the store returns them, and their conversion into the wire
//! contract. Amount columns are `numeric` in major units.

use api_types::{
    closing::DailyClosingRow,
    employee::Employee,
    operation::{OperationKind, OperationRow},
    service::ServiceKind,
    settings::ConfigRow,
    shift::{ShiftNew, ShiftRow},
    snapshot::VirtualSnapshotRow,
    till::{TillCode, TillRow},
    topup::TopUpRow,
};
use chrono::{DateTime, NaiveDate, Utc};
use engine::{BackendError, BackendResult, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) const TILLS: &str = "cajas";
pub(crate) const CONFIG: &str = "configuraciones";
pub(crate) const SNAPSHOTS: &str = "recargas";
pub(crate) const CLOSINGS: &str = "caja_fisica_diaria";
pub(crate) const SHIFTS: &str = "turnos";
pub(crate) const OPERATIONS: &str = "operaciones_cajas";
pub(crate) const TOPUPS: &str = "recargas_virtuales";
pub(crate) const EMPLOYEES: &str = "empleados";

fn minor(column: &str, value: Decimal) -> BackendResult<i64> {
    Money::from_decimal(value)
        .map(Money::minor)
        .ok_or_else(|| BackendError::Decode(format!("{column} out of range: {value}")))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TillRecord {
    id: i64,
    codigo: TillCode,
    nombre: String,
    saldo_actual: Decimal,
    activo: bool,
}

impl TryFrom<TillRecord> for TillRow {
    type Error = BackendError;

    fn try_from(record: TillRecord) -> BackendResult<Self> {
        Ok(Self {
            id: record.id,
            code: record.codigo,
            name: record.nombre,
            balance_minor: minor("saldo_actual", record.saldo_actual)?,
            active: record.activo,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigRecord {
    fondo_fijo_diario: Decimal,
    transferencia_diaria: Decimal,
    umbral_saldo_bajo: Decimal,
    dias_antes_facturacion: i32,
}

impl TryFrom<ConfigRecord> for ConfigRow {
    type Error = BackendError;

    fn try_from(record: ConfigRecord) -> BackendResult<Self> {
        Ok(Self {
            fixed_fund_minor: minor("fondo_fijo_diario", record.fondo_fijo_diario)?,
            daily_transfer_minor: minor("transferencia_diaria", record.transferencia_diaria)?,
            low_balance_threshold_minor: minor("umbral_saldo_bajo", record.umbral_saldo_bajo)?,
            days_before_billing: record.dias_antes_facturacion,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotRecord {
    id: Uuid,
    tipo_servicio: ServiceKind,
    caja_fisica_diaria_id: Option<Uuid>,
    saldo_anterior: Decimal,
    saldo_virtual_actual: Decimal,
    venta_dia: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<SnapshotRecord> for VirtualSnapshotRow {
    type Error = BackendError;

    fn try_from(record: SnapshotRecord) -> BackendResult<Self> {
        Ok(Self {
            id: record.id,
            service: record.tipo_servicio,
            closing_id: record.caja_fisica_diaria_id,
            previous_balance_minor: minor("saldo_anterior", record.saldo_anterior)?,
            current_balance_minor: minor("saldo_virtual_actual", record.saldo_virtual_actual)?,
            sales_minor: minor("venta_dia", record.venta_dia)?,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClosingRecord {
    id: Uuid,
    turno_id: Uuid,
    fecha: NaiveDate,
    efectivo_recaudado: Decimal,
    deficit_caja_chica: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ClosingRecord> for DailyClosingRow {
    type Error = BackendError;

    fn try_from(record: ClosingRecord) -> BackendResult<Self> {
        Ok(Self {
            id: record.id,
            shift_id: record.turno_id,
            business_date: record.fecha,
            collected_cash_minor: minor("efectivo_recaudado", record.efectivo_recaudado)?,
            deficit_minor: minor(
                "deficit_caja_chica",
                record.deficit_caja_chica.unwrap_or_default(),
            )?,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShiftRecord {
    id: Uuid,
    fecha: NaiveDate,
    numero_turno: i32,
    empleado_id: i64,
    hora_fecha_apertura: DateTime<Utc>,
    hora_fecha_cierre: Option<DateTime<Utc>>,
}

impl From<ShiftRecord> for ShiftRow {
    fn from(record: ShiftRecord) -> Self {
        Self {
            id: record.id,
            business_date: record.fecha,
            shift_number: record.numero_turno,
            employee_id: record.empleado_id,
            opened_at: record.hora_fecha_apertura,
            closed_at: record.hora_fecha_cierre,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ShiftInsert {
    fecha: NaiveDate,
    numero_turno: i32,
    empleado_id: i64,
    hora_fecha_apertura: DateTime<Utc>,
}

impl From<ShiftNew> for ShiftInsert {
    fn from(shift: ShiftNew) -> Self {
        Self {
            fecha: shift.business_date,
            numero_turno: shift.shift_number,
            empleado_id: shift.employee_id,
            hora_fecha_apertura: shift.opened_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ShiftClose {
    pub(crate) hora_fecha_cierre: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperationRecord {
    id: Uuid,
    codigo_caja: TillCode,
    tipo_operacion: OperationKind,
    monto: Decimal,
    descripcion: Option<String>,
    fecha: DateTime<Utc>,
}

impl TryFrom<OperationRecord> for OperationRow {
    type Error = BackendError;

    fn try_from(record: OperationRecord) -> BackendResult<Self> {
        Ok(Self {
            id: record.id,
            till: record.codigo_caja,
            kind: record.tipo_operacion,
            amount_minor: minor("monto", record.monto)?,
            description: record.descripcion,
            occurred_at: record.fecha,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopUpRecord {
    id: Uuid,
    tipo_servicio: ServiceKind,
    fecha: NaiveDate,
    monto_virtual: Decimal,
    monto_a_pagar: Decimal,
    ganancia: Decimal,
    pagado: bool,
    fecha_pago: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TopUpRecord> for TopUpRow {
    type Error = BackendError;

    fn try_from(record: TopUpRecord) -> BackendResult<Self> {
        Ok(Self {
            id: record.id,
            service: record.tipo_servicio,
            business_date: record.fecha,
            virtual_amount_minor: minor("monto_virtual", record.monto_virtual)?,
            owed_minor: minor("monto_a_pagar", record.monto_a_pagar)?,
            profit_minor: minor("ganancia", record.ganancia)?,
            paid: record.pagado,
            paid_on: record.fecha_pago,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmployeeRecord {
    id: i64,
    nombre: String,
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            id: record.id,
            name: record.nombre,
        }
    }
}

/// Session user as returned by the identity endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionUser {
    pub(crate) id: Uuid,
}
