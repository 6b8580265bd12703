//! Core rules of the cash register: amount parsing, till balances, the shift
//! cycle, the pre-opening deficit flow, the daily closing wizard and the
//! monthly profit transfer.
//!
//! Pure computations live in their own modules and need nothing but values.
//! Everything that reads or writes the store goes through [`Engine`].

pub use api_types;
pub use backend::{Backend, BackendResult};
pub use closing::{
    ClosingBaseline, ClosingField, ClosingInput, ClosingPreview, ClosingStep, ClosingWizard,
    FieldError, LeaveDecision, VirtualBalances, split_collected_cash,
};
pub use deficit::{DeficitPlan, DeficitStep, DeficitWizard, FundVerified, repair_tag};
pub use error::{BackendError, EngineError};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, LegOutcome, Overview, ProfitTransferReport, StoreConfig};
pub use parser::{AmountInput, format_amount, parse_amount, try_parse_text};
pub use profit::{
    ProfitLeg, ProfitMonth, ProfitPlan, ProfitStatus, commission_rate, evaluate, service_till,
};
pub use shifts::{ClosingPresence, ShiftState, next_shift_number};
pub use tills::TillBalances;
pub use topups::{DebtSummary, TopUpPlan};

mod backend;
mod closing;
mod deficit;
mod error;
mod money;
mod ops;
pub mod parser;
mod profit;
mod shifts;
mod tills;
mod topups;

type ResultEngine<T> = Result<T, EngineError>;
