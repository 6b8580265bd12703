use api_types::{employee::Employee, rpc::Procedure};

use crate::{
    Backend, EngineError, ResultEngine,
    error::{call_failed, read_failed, rejected},
};

mod balances;
mod closing;
mod deficit;
mod profit;
mod shifts;
mod topups;

pub use balances::{Overview, StoreConfig};
pub use profit::{LegOutcome, ProfitTransferReport};

/// Entry point of the core: every operation runs against a remote
/// [`Backend`] and never keeps state of its own between calls.
#[derive(Debug)]
pub struct Engine<B> {
    backend: B,
}

impl<B: Backend> Engine<B> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<B> {
        EngineBuilder::default()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolves the session employee. No operation that books anything runs
    /// without one.
    async fn employee(&self) -> ResultEngine<Employee> {
        self.backend
            .current_employee()
            .await
            .map_err(|err| read_failed("the current employee", err))?
            .ok_or(EngineError::MissingIdentity)
    }

    /// Calls a mutating procedure and unwraps its envelope.
    async fn commit<P: Procedure>(&self, what: &str, params: &P) -> ResultEngine<P::Output> {
        tracing::debug!(procedure = P::NAME, "calling {what}");
        let response = self
            .backend
            .call(params)
            .await
            .map_err(|err| call_failed(what, err))?;
        if !response.success {
            return Err(rejected(what, response.code, response.error));
        }
        response
            .data
            .ok_or_else(|| EngineError::Remote(format!("{what}: the server returned no data")))
    }
}

/// The builder for `Engine`
pub struct EngineBuilder<B> {
    backend: Option<B>,
}

impl<B> Default for EngineBuilder<B> {
    fn default() -> Self {
        Self { backend: None }
    }
}

impl<B: Backend> EngineBuilder<B> {
    /// Pass the required backend
    pub fn backend(mut self, backend: B) -> EngineBuilder<B> {
        self.backend = Some(backend);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine<B>> {
        let backend = self
            .backend
            .ok_or_else(|| EngineError::InvalidState("missing backend".to_string()))?;
        Ok(Engine { backend })
    }
}
