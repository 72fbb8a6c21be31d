use crate::adapter::AdapterStatus;
use crate::args::{AdapterArgs, ReconfigurationOptions};
use crate::broadcast::{Broadcast, Subscription};
use crate::controller::Reconfigure;
use crate::error::ControllerError;
use crate::flag_value::FlagValue;
use crate::flags::{normalize_flag_name, Flags};

/// What a controller broadcasts to its descendants: the adapter's status and the entry point for
/// requesting reconfiguration.
#[derive(Clone, Debug)]
pub struct AdapterContext {
    pub status: AdapterStatus,
    pub reconfigure: Reconfigure,
}

/// A descendant's read-only view of the adapter context and the flags published under it.
#[derive(Clone, Debug)]
pub struct Scope {
    adapter: Broadcast<AdapterContext>,
    flags: Broadcast<Flags>,
}

impl Scope {
    pub fn new(adapter: Broadcast<AdapterContext>, flags: Broadcast<Flags>) -> Self {
        Scope { adapter, flags }
    }

    pub fn status(&self) -> AdapterStatus {
        self.adapter.with(|context| context.status)
    }

    pub fn flags(&self) -> Flags {
        self.flags.get()
    }

    /// Looks up a flag by name, accepting non-canonical spellings.
    pub fn flag(&self, flag_name: &str) -> Option<FlagValue> {
        let flag_name = normalize_flag_name(flag_name);
        self.flags.with(|flags| flags.get(&flag_name).cloned())
    }

    pub fn reconfigure_handle(&self) -> Reconfigure {
        self.adapter.with(|context| context.reconfigure.clone())
    }

    /// Routes a reconfiguration request back to the owning controller.
    pub fn reconfigure(
        &self,
        adapter_args: AdapterArgs,
        options: ReconfigurationOptions,
    ) -> Result<(), ControllerError> {
        self.reconfigure_handle().call(adapter_args, options)
    }

    pub fn subscribe_flags(&self, callback: impl Fn(&Flags) + 'static) -> Subscription {
        self.flags.subscribe(callback)
    }

    pub fn subscribe_status(&self, callback: impl Fn(AdapterStatus) + 'static) -> Subscription {
        self.adapter
            .subscribe(move |context: &AdapterContext| callback(context.status))
    }
}
