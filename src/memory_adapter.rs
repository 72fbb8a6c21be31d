use std::cell::RefCell;

use futures::future::{self, FutureExt};
use log::debug;

use crate::adapter::{
    contract_violation, ensure_contract, Adapter, AdapterError, AdapterEventHandlers,
    AdapterStatus, ConfigurationFuture,
};
use crate::args::AdapterArgs;
use crate::flag_value::FlagValue;
use crate::flags::{normalize_flags, Flags};

#[derive(Default)]
struct MemoryAdapterState {
    flags: Flags,
    args: Option<AdapterArgs>,
    handlers: Option<AdapterEventHandlers>,
    is_ready: bool,
    is_configured: bool,
}

/// An adapter holding its flags in memory, updated explicitly through
/// [MemoryAdapter::update_flags]. Useful for tests and for applications that compute flags
/// themselves.
///
/// Reconfiguring clears all flags and announces the empty set, mirroring providers that
/// re-evaluate everything for a new identity.
#[derive(Default)]
pub struct MemoryAdapter {
    state: RefCell<MemoryAdapterState>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `flags` into the current flag set and notifies the flags handler with the result.
    ///
    /// Fails with a contract violation if the adapter has not been configured yet.
    pub fn update_flags<I, K, V>(&self, flags: I) -> Result<(), AdapterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FlagValue>,
    {
        let (handlers, flags) = {
            let mut state = self.state.borrow_mut();
            ensure_contract(state.is_configured, || {
                "memory adapter: flags cannot be updated before the adapter is configured"
                    .to_string()
            })?;
            state.flags.extend(normalize_flags(flags));
            (state.handlers.clone(), state.flags.clone())
        };
        if let Some(handlers) = handlers {
            handlers.flags_state_change(&flags);
        }
        Ok(())
    }

    /// The arguments most recently applied through configure or reconfigure.
    pub fn args(&self) -> Option<AdapterArgs> {
        self.state.borrow().args.clone()
    }

    pub fn is_configured(&self) -> bool {
        self.state.borrow().is_configured
    }

    pub fn flags(&self) -> Flags {
        self.state.borrow().flags.clone()
    }

    fn status(state: &MemoryAdapterState) -> AdapterStatus {
        AdapterStatus {
            is_ready: state.is_ready,
            is_configured: state.is_configured,
        }
    }
}

impl Adapter for MemoryAdapter {
    fn configure(&self, args: AdapterArgs, handlers: AdapterEventHandlers) -> ConfigurationFuture {
        let (status, flags) = {
            let mut state = self.state.borrow_mut();
            debug!("memory adapter configured with {:?}", args);
            state.args = Some(args);
            state.handlers = Some(handlers.clone());
            state.is_configured = true;
            state.is_ready = true;
            (Self::status(&state), state.flags.clone())
        };
        handlers.status_state_change(status);
        handlers.flags_state_change(&flags);
        future::ready(Ok(())).boxed_local()
    }

    fn reconfigure(
        &self,
        args: AdapterArgs,
        handlers: AdapterEventHandlers,
    ) -> ConfigurationFuture {
        let flags = {
            let mut state = self.state.borrow_mut();
            if !state.is_configured {
                let err = contract_violation(
                    "memory adapter: reconfigure called before configure completed",
                );
                return future::ready(Err(err)).boxed_local();
            }
            debug!("memory adapter reconfigured with {:?}", args);
            state.args = Some(args);
            state.handlers = Some(handlers.clone());
            state.flags.clear();
            state.flags.clone()
        };
        handlers.flags_state_change(&flags);
        future::ready(Ok(())).boxed_local()
    }

    fn is_ready(&self) -> bool {
        self.state.borrow().is_ready
    }

    fn reset(&self) {
        self.state.borrow_mut().flags.clear();
    }

    fn flag(&self, flag_name: &str) -> Option<FlagValue> {
        self.state.borrow().flags.get(flag_name).cloned()
    }
}
