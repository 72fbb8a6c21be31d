use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::args::AdapterArgs;
use crate::flag_value::FlagValue;
use crate::flags::Flags;

/// Readiness as reported by an adapter through [AdapterEventHandlers::on_status_state_change].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterStatus {
    pub is_ready: bool,
    pub is_configured: bool,
}

/// Errors an adapter may report back from its configure/reconfigure futures or its flag
/// mutation methods.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The adapter was used in a way its contract forbids, e.g. flags were updated before
    /// `configure` completed.
    #[error("adapter contract violation: {0}")]
    ContractViolation(String),
    /// The provider refused or failed to apply the requested arguments.
    #[error("adapter rejected configuration: {0}")]
    Rejected(String),
}

/// Signals a contract violation loudly without bringing the host down: the violation is logged at
/// error level and handed back as an [AdapterError::ContractViolation].
pub fn contract_violation(message: impl Into<String>) -> AdapterError {
    let message = message.into();
    error!("{}", message);
    AdapterError::ContractViolation(message)
}

/// Checks a contract precondition, see [contract_violation].
pub fn ensure_contract(
    condition: bool,
    message: impl FnOnce() -> String,
) -> Result<(), AdapterError> {
    if condition {
        Ok(())
    } else {
        Err(contract_violation(message()))
    }
}

pub type FlagsStateChangeHandler = Rc<dyn Fn(&Flags)>;
pub type StatusStateChangeHandler = Rc<dyn Fn(AdapterStatus)>;

/// Callbacks through which an adapter publishes flag and status changes.
#[derive(Clone)]
pub struct AdapterEventHandlers {
    pub on_flags_state_change: FlagsStateChangeHandler,
    pub on_status_state_change: StatusStateChangeHandler,
}

impl AdapterEventHandlers {
    pub fn new(
        on_flags_state_change: impl Fn(&Flags) + 'static,
        on_status_state_change: impl Fn(AdapterStatus) + 'static,
    ) -> Self {
        AdapterEventHandlers {
            on_flags_state_change: Rc::new(on_flags_state_change),
            on_status_state_change: Rc::new(on_status_state_change),
        }
    }

    /// Handlers that drop every notification.
    pub fn noop() -> Self {
        Self::new(|_| (), |_| ())
    }

    pub fn flags_state_change(&self, flags: &Flags) {
        (self.on_flags_state_change)(flags)
    }

    pub fn status_state_change(&self, status: AdapterStatus) {
        (self.on_status_state_change)(status)
    }
}

impl fmt::Debug for AdapterEventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterEventHandlers").finish_non_exhaustive()
    }
}

/// Future returned from [Adapter::configure] and [Adapter::reconfigure].
pub type ConfigurationFuture = LocalBoxFuture<'static, Result<(), AdapterError>>;

/// Adapter is the interface an integration with a flag provider implements.
///
/// The adapter owns the flag state; it publishes changes through the handlers passed to
/// [Adapter::configure] and [Adapter::reconfigure]. Both futures resolve once the arguments are
/// applied and the handlers have been invoked at least once for the resulting state.
///
/// Calling [Adapter::reconfigure] before [Adapter::configure] has resolved is a contract violation
/// and must be reported as [AdapterError::ContractViolation] rather than ignored.
pub trait Adapter {
    fn configure(&self, args: AdapterArgs, handlers: AdapterEventHandlers) -> ConfigurationFuture;

    fn reconfigure(&self, args: AdapterArgs, handlers: AdapterEventHandlers)
        -> ConfigurationFuture;

    fn is_ready(&self) -> bool;

    /// Forget all flag state without notifying the handlers.
    fn reset(&self);

    /// Retrieve the current value of the flag named `flag_name`.
    fn flag(&self, flag_name: &str) -> Option<FlagValue>;
}
