use api_types::shift::{ShiftNew, ShiftRow};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    Backend, BackendError, ClosingPresence, EngineError, FundVerified, ResultEngine, ShiftState,
    error::{call_failed, read_failed},
    shifts::next_shift_number,
};

use super::Engine;

impl<B: Backend> Engine<B> {
    /// State of today's shift cycle. `today` is the device's local date.
    pub async fn shift_state(&self, today: NaiveDate) -> ResultEngine<ShiftState> {
        let shifts = self
            .backend
            .shifts_on(today)
            .await
            .map_err(|err| read_failed("today's shifts", err))?;
        Ok(ShiftState::from_day(&shifts))
    }

    /// Whether `shift_id` already has a daily closing. Never fails: a failed
    /// read is [`ClosingPresence::Unknown`].
    pub async fn closing_presence(&self, shift_id: Uuid) -> ClosingPresence {
        match self.backend.closing_for_shift(shift_id).await {
            Ok(Some(_)) => ClosingPresence::Present,
            Ok(None) => ClosingPresence::Absent,
            Err(err) => {
                tracing::warn!(%shift_id, "closing check failed: {err}");
                ClosingPresence::Unknown
            }
        }
    }

    /// Opens the next shift of `today`.
    ///
    /// Requires the fund verification token from the pre-opening wizard. The
    /// "already open" check is re-read right before inserting; the store's
    /// uniqueness constraint remains the final word.
    pub async fn open_shift(
        &self,
        _verified: FundVerified,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> ResultEngine<ShiftRow> {
        let employee = self.employee().await?;
        let shifts = self
            .backend
            .shifts_on(today)
            .await
            .map_err(|err| read_failed("today's shifts", err))?;
        if let ShiftState::Open(open) = ShiftState::from_day(&shifts) {
            return Err(EngineError::StalePrecondition(format!(
                "Shift #{} is already open for {today}",
                open.shift_number
            )));
        }

        let shift = ShiftNew {
            business_date: today,
            shift_number: next_shift_number(&shifts),
            employee_id: employee.id,
            opened_at: now,
        };
        let row = self
            .backend
            .insert_shift(shift)
            .await
            .map_err(|err| match err {
                BackendError::Server { status: 409, .. } => EngineError::StalePrecondition(
                    "A shift was opened for today from another session".to_string(),
                ),
                err => call_failed("opening the shift", err),
            })?;
        tracing::info!(
            shift_id = %row.id,
            shift_number = row.shift_number,
            employee = %employee.name,
            "shift opened"
        );
        Ok(row)
    }

    /// Sets the closing timestamp on the open shift `shift_id`.
    pub async fn close_shift(&self, shift_id: Uuid, now: DateTime<Utc>) -> ResultEngine<ShiftRow> {
        self.employee().await?;
        let row = self
            .backend
            .close_shift(shift_id, now)
            .await
            .map_err(|err| call_failed("closing the shift", err))?
            .ok_or_else(|| {
                EngineError::StalePrecondition(
                    "The shift is no longer open (closed from another session)".to_string(),
                )
            })?;
        tracing::info!(%shift_id, "shift closed");
        Ok(row)
    }
}
