use std::collections::BTreeMap;
use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::adapter::{
    Adapter, AdapterEventHandlers, AdapterStatus, FlagsStateChangeHandler,
    StatusStateChangeHandler,
};
use crate::args::AdapterArgs;
use crate::broadcast::Broadcast;
use crate::context::Scope;
use crate::controller::{AdapterController, ControllerConfig};
use crate::error::ControllerError;
use crate::flag_value::FlagValue;
use crate::flags::Flags;
use crate::render::Children;

/// Top of a flag-consuming tree: mounts an [AdapterController] and keeps the flags it reports in a
/// broadcast that descendants read through [Scope].
///
/// Every flags notification from the adapter replaces the propagated flag set; adapters publish
/// their full state.
pub struct FlagsProvider {
    controller: AdapterController,
    flags: Broadcast<Flags>,
}

impl FlagsProvider {
    pub fn builder(adapter: Rc<dyn Adapter>) -> FlagsProviderBuilder {
        FlagsProviderBuilder {
            adapter,
            config: ControllerConfig::default(),
            on_flags_state_change: None,
            on_status_state_change: None,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.controller.context(), self.flags.clone())
    }

    pub fn controller(&self) -> &AdapterController {
        &self.controller
    }

    pub fn flags(&self) -> Flags {
        self.flags.get()
    }

    pub fn set_adapter_args(&self, adapter_args: AdapterArgs) -> Result<(), ControllerError> {
        self.controller.set_adapter_args(adapter_args)
    }

    pub fn set_defer_configuration(&self, defer: bool) -> Result<(), ControllerError> {
        self.controller.set_defer_configuration(defer)
    }

    pub fn render<T: Clone>(
        &self,
        render: Option<&dyn Fn() -> T>,
        children: Option<&Children<T>>,
    ) -> Option<T> {
        self.controller.render(render, children)
    }
}

pub struct FlagsProviderBuilder {
    adapter: Rc<dyn Adapter>,
    config: ControllerConfig,
    on_flags_state_change: Option<FlagsStateChangeHandler>,
    on_status_state_change: Option<StatusStateChangeHandler>,
}

impl FlagsProviderBuilder {
    /// Replaces all settings with `config`.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn adapter_args(mut self, adapter_args: AdapterArgs) -> Self {
        self.config.adapter_args = adapter_args;
        self
    }

    pub fn default_flags<I, K, V>(mut self, default_flags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FlagValue>,
    {
        self.config.default_flags = default_flags
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect::<BTreeMap<_, _>>();
        self
    }

    pub fn defer_configuration(mut self, defer: bool) -> Self {
        self.config.defer_configuration = defer;
        self
    }

    /// Observe flag changes in addition to the propagated flags.
    pub fn on_flags_state_change(mut self, handler: impl Fn(&Flags) + 'static) -> Self {
        self.on_flags_state_change = Some(Rc::new(handler));
        self
    }

    pub fn on_status_state_change(mut self, handler: impl Fn(AdapterStatus) + 'static) -> Self {
        self.on_status_state_change = Some(Rc::new(handler));
        self
    }

    pub fn mount(self, spawner: Rc<dyn LocalSpawn>) -> Result<FlagsProvider, ControllerError> {
        let flags = Broadcast::new(Flags::new());

        let publish = flags.clone();
        let observe_flags = self.on_flags_state_change;
        let observe_status = self.on_status_state_change;
        let handlers = AdapterEventHandlers::new(
            move |changed: &Flags| {
                publish.publish(changed.clone());
                if let Some(observe) = &observe_flags {
                    observe(changed);
                }
            },
            move |status| {
                if let Some(observe) = &observe_status {
                    observe(status);
                }
            },
        );

        let controller = AdapterController::mount(self.adapter, self.config, handlers, spawner)?;
        Ok(FlagsProvider { controller, flags })
    }
}
