//! Daily closing: derivations and the two-step wizard.
//!
//! Every derived amount is a pure function of the operator input and the
//! baseline fetched when the wizard was created. Nothing is cached; the
//! preview is recomputed on each call. The numbers are advisory: the remote
//! procedure recomputes and commits its own.

use api_types::rpc::ExecuteDailyClosing;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, TillBalances, parser};

/// Virtual (provider-side) balance of each resold service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtualBalances {
    pub cellphone: Money,
    pub bus: Money,
}

/// Remote state the closing is computed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosingBaseline {
    pub previous_virtual: VirtualBalances,
    pub tills: TillBalances,
    /// Fixed amount moved from the main till to petty cash every day.
    pub daily_transfer: Money,
}

/// Validated operator input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosingInput {
    pub final_cellphone: Money,
    pub final_bus: Money,
    pub collected_cash: Money,
}

/// Everything the operator reviews before committing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosingPreview {
    pub sales_cellphone: Money,
    pub sales_bus: Money,
    pub total_sales: Money,
    pub main_till_ending: Money,
    pub petty_cash_ending: Money,
    pub cash_for_cellphone: Money,
    pub cash_for_bus: Money,
    pub cellphone_till_ending: Money,
    pub bus_till_ending: Money,
}

impl ClosingPreview {
    pub fn compute(baseline: &ClosingBaseline, input: &ClosingInput) -> Self {
        let sales_cellphone = baseline
            .previous_virtual
            .cellphone
            .saturating_sub(input.final_cellphone)
            .at_least_zero();
        let sales_bus = baseline
            .previous_virtual
            .bus
            .saturating_sub(input.final_bus)
            .at_least_zero();
        let (cash_for_cellphone, cash_for_bus) =
            split_collected_cash(input.collected_cash, sales_cellphone, sales_bus);
        let tills = &baseline.tills;

        Self {
            sales_cellphone,
            sales_bus,
            total_sales: sales_cellphone.saturating_add(sales_bus),
            main_till_ending: tills.main.saturating_sub(baseline.daily_transfer),
            petty_cash_ending: tills.petty_cash.saturating_add(baseline.daily_transfer),
            cash_for_cellphone,
            cash_for_bus,
            cellphone_till_ending: tills.cellphone.saturating_add(cash_for_cellphone),
            bus_till_ending: tills.bus.saturating_add(cash_for_bus),
        }
    }
}

/// Splits collected cash between the services in proportion to their sales.
///
/// The bus share is the remainder of the rounded cellphone share, so the two
/// always add up to `collected`. With no sales at all neither service gets
/// anything, whatever was collected.
pub fn split_collected_cash(
    collected: Money,
    sales_cellphone: Money,
    sales_bus: Money,
) -> (Money, Money) {
    let total = sales_cellphone.saturating_add(sales_bus);
    if !total.is_positive() {
        return (Money::ZERO, Money::ZERO);
    }
    let cellphone = collected.scale(sales_cellphone, total);
    (cellphone, collected.saturating_sub(cellphone))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClosingField {
    FinalCellphone,
    FinalBus,
    CollectedCash,
}

impl ClosingField {
    pub const ALL: [ClosingField; 3] = [Self::FinalCellphone, Self::FinalBus, Self::CollectedCash];

    pub fn label(self) -> &'static str {
        match self {
            Self::FinalCellphone => "final cellphone virtual balance",
            Self::FinalBus => "final bus virtual balance",
            Self::CollectedCash => "total cash collected",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::FinalCellphone => 0,
            Self::FinalBus => 1,
            Self::CollectedCash => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("required")]
    Required,
    #[error("not an amount")]
    NotAnAmount,
    #[error("must not be negative")]
    Negative,
    #[error("too large")]
    TooLarge,
}

#[derive(Clone, Debug, Default)]
struct FieldState {
    raw: String,
    touched: bool,
}

impl FieldState {
    fn parsed(&self) -> Result<Money, FieldError> {
        if self.raw.trim().is_empty() {
            return Err(FieldError::Required);
        }
        let amount = parser::try_parse_text(&self.raw).ok_or(FieldError::NotAnAmount)?;
        if amount.is_negative() {
            return Err(FieldError::Negative);
        }
        if amount > Money::MAX_INPUT {
            return Err(FieldError::TooLarge);
        }
        Ok(amount)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosingStep {
    Input,
    Review,
    Submitting,
    Done,
}

/// Answer of the unsaved-changes guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveDecision {
    Allow,
    /// The form has changes: ask "discard changes?" first.
    ConfirmDiscard,
    /// A submission is in flight and must be awaited.
    Blocked,
}

/// The daily closing form.
///
/// `Input -> Review -> Submitting -> Done`, with `Review -> Input` through
/// [`back`](Self::back). After a successful submission the wizard is clean
/// and in `Done`; callers leave the page first and only then call
/// [`reset`](Self::reset).
#[derive(Clone, Debug)]
pub struct ClosingWizard {
    shift_id: Uuid,
    business_date: NaiveDate,
    baseline: ClosingBaseline,
    step: ClosingStep,
    fields: [FieldState; 3],
    dirty: bool,
    error: Option<String>,
}

impl ClosingWizard {
    pub fn new(shift_id: Uuid, business_date: NaiveDate, baseline: ClosingBaseline) -> Self {
        Self {
            shift_id,
            business_date,
            baseline,
            step: ClosingStep::Input,
            fields: Default::default(),
            dirty: false,
            error: None,
        }
    }

    pub fn shift_id(&self) -> Uuid {
        self.shift_id
    }

    pub fn business_date(&self) -> NaiveDate {
        self.business_date
    }

    pub fn baseline(&self) -> &ClosingBaseline {
        &self.baseline
    }

    pub fn step(&self) -> ClosingStep {
        self.step
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Inline error left by the last failed submission.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn raw(&self, field: ClosingField) -> &str {
        &self.fields[field.index()].raw
    }

    pub fn set_field(&mut self, field: ClosingField, raw: impl Into<String>) -> ResultEngine<()> {
        if self.step != ClosingStep::Input {
            return Err(EngineError::InvalidState(
                "fields can only be edited on the input step".to_string(),
            ));
        }
        let state = &mut self.fields[field.index()];
        state.raw = raw.into();
        state.touched = true;
        self.dirty = true;
        Ok(())
    }

    pub fn touch(&mut self, field: ClosingField) {
        self.fields[field.index()].touched = true;
    }

    /// Error of a field regardless of whether it was touched.
    pub fn field_error(&self, field: ClosingField) -> Option<FieldError> {
        self.fields[field.index()].parsed().err()
    }

    /// Error to display inline: only once the field was touched.
    pub fn visible_error(&self, field: ClosingField) -> Option<FieldError> {
        let state = &self.fields[field.index()];
        if state.touched {
            state.parsed().err()
        } else {
            None
        }
    }

    /// The input, if every field is valid.
    pub fn input(&self) -> Option<ClosingInput> {
        Some(ClosingInput {
            final_cellphone: self.fields[0].parsed().ok()?,
            final_bus: self.fields[1].parsed().ok()?,
            collected_cash: self.fields[2].parsed().ok()?,
        })
    }

    /// Live preview. Fields that do not parse count as zero.
    pub fn preview(&self) -> ClosingPreview {
        let input = ClosingInput {
            final_cellphone: parser::parse_amount(self.raw(ClosingField::FinalCellphone)),
            final_bus: parser::parse_amount(self.raw(ClosingField::FinalBus)),
            collected_cash: parser::parse_amount(self.raw(ClosingField::CollectedCash)),
        };
        ClosingPreview::compute(&self.baseline, &input)
    }

    /// Moves to review. Blocked while any field is invalid, in which case
    /// every field is marked touched so all errors show.
    pub fn next(&mut self) -> ResultEngine<()> {
        if self.step != ClosingStep::Input {
            return Err(EngineError::InvalidState(
                "review can only be reached from the input step".to_string(),
            ));
        }
        let invalid: Vec<String> = ClosingField::ALL
            .into_iter()
            .filter_map(|field| {
                self.field_error(field)
                    .map(|err| format!("{}: {err}", field.label()))
            })
            .collect();
        if !invalid.is_empty() {
            for state in &mut self.fields {
                state.touched = true;
            }
            return Err(EngineError::Validation(invalid.join(", ")));
        }
        self.step = ClosingStep::Review;
        Ok(())
    }

    pub fn back(&mut self) -> ResultEngine<()> {
        if self.step != ClosingStep::Review {
            return Err(EngineError::InvalidState(
                "back is only available on the review step".to_string(),
            ));
        }
        self.error = None;
        self.step = ClosingStep::Input;
        Ok(())
    }

    /// Unsaved-changes guard for leaving the wizard.
    pub fn request_leave(&self) -> LeaveDecision {
        match self.step {
            ClosingStep::Submitting => LeaveDecision::Blocked,
            _ if self.dirty => LeaveDecision::ConfirmDiscard,
            _ => LeaveDecision::Allow,
        }
    }

    /// The operator confirmed "discard changes?".
    pub fn discard(&mut self) -> ResultEngine<()> {
        if self.step == ClosingStep::Submitting {
            return Err(EngineError::InvalidState(
                "a submission is in progress".to_string(),
            ));
        }
        self.reset();
        Ok(())
    }

    /// Back to an empty input step.
    pub fn reset(&mut self) {
        self.step = ClosingStep::Input;
        self.fields = Default::default();
        self.dirty = false;
        self.error = None;
    }

    pub(crate) fn begin_submit(&mut self, employee_id: i64) -> ResultEngine<ExecuteDailyClosing> {
        if self.step != ClosingStep::Review {
            return Err(EngineError::InvalidState(
                "the closing can only be submitted from the review step".to_string(),
            ));
        }
        let input = self.input().ok_or_else(|| {
            EngineError::Validation("the closing form has invalid fields".to_string())
        })?;
        let baseline = &self.baseline;
        self.error = None;
        self.step = ClosingStep::Submitting;
        Ok(ExecuteDailyClosing {
            shift_id: self.shift_id,
            business_date: self.business_date,
            employee_id,
            collected_cash_minor: input.collected_cash.minor(),
            final_cellphone_minor: input.final_cellphone.minor(),
            final_bus_minor: input.final_bus.minor(),
            previous_cellphone_minor: baseline.previous_virtual.cellphone.minor(),
            previous_bus_minor: baseline.previous_virtual.bus.minor(),
            main_till_minor: baseline.tills.main.minor(),
            petty_cash_minor: baseline.tills.petty_cash.minor(),
            cellphone_till_minor: baseline.tills.cellphone.minor(),
            bus_till_minor: baseline.tills.bus.minor(),
        })
    }

    pub(crate) fn submit_failed(&mut self, err: &EngineError) {
        self.error = Some(err.to_string());
        self.step = ClosingStep::Review;
    }

    pub(crate) fn submit_succeeded(&mut self) {
        self.dirty = false;
        self.error = None;
        self.step = ClosingStep::Done;
    }
}
