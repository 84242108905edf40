//! Compiled expressions and their compile state.

use crate::context::Context;
use crate::error::BridgeError;
use crate::validate::{parse, validate};
use cel_interpreter::{Context as EngineContext, Program as CompiledForm, Value};
use tracing::debug;

/// Compile state of a [`Program`].
#[derive(Debug, Default)]
pub enum ProgramState {
    /// No successful compilation yet.
    #[default]
    New,
    /// Holds a usable compiled form.
    Compiled {
        source: String,
        compiled: CompiledForm,
    },
}

/// A compiled expression.
///
/// `New --compile ok--> Compiled`, and compiling again replaces the held
/// expression. A failed compile leaves the state untouched: a compiled
/// program keeps executing its last good expression, a new one stays new.
#[derive(Debug, Default)]
pub struct Program {
    state: ProgramState,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.state, ProgramState::Compiled { .. })
    }

    /// Source of the currently compiled expression.
    pub fn source(&self) -> Option<&str> {
        match &self.state {
            ProgramState::New => None,
            ProgramState::Compiled { source, .. } => Some(source),
        }
    }

    /// Compile `expression`, replacing any previously compiled form.
    pub fn compile(&mut self, expression: &str) -> Result<(), BridgeError> {
        let compiled = parse(expression)?;
        debug!(expression, "compiled expression");
        self.state = ProgramState::Compiled {
            source: expression.to_owned(),
            compiled,
        };
        Ok(())
    }

    /// Evaluate the compiled expression against `context`.
    ///
    /// Fails with [`BridgeError::NotCompiled`] before looking at `context` if
    /// nothing was compiled. The context is only read.
    pub fn execute(&self, context: &Context) -> Result<Value, BridgeError> {
        let ProgramState::Compiled { compiled, .. } = &self.state else {
            return Err(BridgeError::NotCompiled);
        };

        let mut engine_context = EngineContext::default();
        for (name, value) in context.bindings() {
            engine_context.add_variable_from_value(name, value.clone());
        }

        compiled
            .execute(&engine_context)
            .map_err(|e| BridgeError::RuntimeEvaluation(e.to_string()))
    }

    /// Free variables of the compiled expression, sorted.
    ///
    /// Computed from the source on demand; compiling does not pay for it.
    pub fn variables(&self) -> Vec<String> {
        self.source()
            .and_then(|source| validate(source).ok())
            .map(|validation| validation.variables)
            .unwrap_or_default()
    }
}
