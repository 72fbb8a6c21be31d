use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::adapter::{Adapter, AdapterError, AdapterEventHandlers, AdapterStatus};
use crate::args::{merge_adapter_args, AdapterArgs, ReconfigurationOptions, ReconfigurationRequest};
use crate::broadcast::Broadcast;
use crate::context::AdapterContext;
use crate::error::ControllerError;
use crate::flag_value::FlagValue;
use crate::flags::{normalize_flags, Flags};
use crate::render::{render_when_ready, Children};

/// Where the controller is in configuring its adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdapterState {
    Unconfigured,
    Configuring,
    Configured,
}

/// Mount-time settings of an [AdapterController].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Arguments for the initial `configure` call.
    pub adapter_args: AdapterArgs,
    /// Raw flag values published before the adapter has reported anything.
    pub default_flags: BTreeMap<String, FlagValue>,
    /// Hold off contacting the adapter until [AdapterController::set_defer_configuration] is
    /// called with `false`.
    pub defer_configuration: bool,
}

#[derive(Clone, Copy, Debug)]
enum Call {
    Configure,
    Reconfigure,
}

#[derive(Debug)]
struct Lifecycle {
    state: AdapterState,
    applied_args: AdapterArgs,
    // At most one unapplied request; later requests are merged into it.
    pending_args: Option<AdapterArgs>,
    defer_configuration: bool,
    status: AdapterStatus,
    last_error: Option<AdapterError>,
}

struct Shared {
    adapter: Rc<dyn Adapter>,
    spawner: Rc<dyn LocalSpawn>,
    handlers: AdapterEventHandlers,
    lifecycle: RefCell<Lifecycle>,
    context: Broadcast<AdapterContext>,
}

/// Owns the configuration lifecycle of one adapter.
///
/// The controller serializes every `configure`/`reconfigure` call: a new call is only issued once
/// the previous one has completed. Reconfiguration requests arriving in between are folded into a
/// single pending argument set with [merge_adapter_args] and applied with exactly one further
/// `reconfigure` when the outstanding call completes.
///
/// Completion of an adapter call is observed by a task spawned on the supplied [LocalSpawn]; that
/// task is the only thing mutating lifecycle state after the call was issued.
///
/// A rejected adapter call is not retried. The controller stays in
/// [AdapterState::Configuring], keeps folding new requests into the pending arguments, and
/// exposes the failure through [AdapterController::last_error].
pub struct AdapterController {
    shared: Rc<Shared>,
}

impl AdapterController {
    /// Creates the controller, publishes `config.default_flags` through
    /// [AdapterEventHandlers::on_flags_state_change] and, unless configuration is deferred, issues
    /// the initial `configure`.
    pub fn mount(
        adapter: Rc<dyn Adapter>,
        config: ControllerConfig,
        handlers: AdapterEventHandlers,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Result<Self, ControllerError> {
        let ControllerConfig {
            adapter_args,
            default_flags,
            defer_configuration,
        } = config;

        let shared = Rc::new_cyclic(|controller: &Weak<Shared>| Shared {
            adapter,
            spawner,
            handlers,
            lifecycle: RefCell::new(Lifecycle {
                state: AdapterState::Unconfigured,
                applied_args: adapter_args,
                pending_args: None,
                defer_configuration,
                status: AdapterStatus::default(),
                last_error: None,
            }),
            context: Broadcast::new(AdapterContext {
                status: AdapterStatus::default(),
                reconfigure: Reconfigure {
                    controller: controller.clone(),
                },
            }),
        });

        if !default_flags.is_empty() {
            let flags = normalize_flags(default_flags);
            shared.handlers.flags_state_change(&flags);
        }

        shared.configure_unless_deferred()?;
        Ok(AdapterController { shared })
    }

    /// Requests that the adapter be reconfigured with `adapter_args`.
    ///
    /// A configured adapter is reconfigured right away with the arguments merged over the applied
    /// ones. Otherwise the request is merged into the pending arguments and applied once the
    /// outstanding call completes.
    pub fn request_reconfiguration(
        &self,
        adapter_args: AdapterArgs,
        options: ReconfigurationOptions,
    ) -> Result<(), ControllerError> {
        self.shared.request_reconfiguration(adapter_args, options)
    }

    /// Hands new arguments to the controller, e.g. after the application's identity changed.
    /// Once configured, the new arguments replace the applied ones field by field; before that they
    /// accumulate.
    pub fn set_adapter_args(&self, adapter_args: AdapterArgs) -> Result<(), ControllerError> {
        let options = ReconfigurationOptions {
            should_overwrite: self.state() == AdapterState::Configured,
        };
        self.shared.request_reconfiguration(adapter_args, options)
    }

    /// Lifting the deferral issues the initial `configure` if it has not happened yet.
    pub fn set_defer_configuration(&self, defer: bool) -> Result<(), ControllerError> {
        self.shared.lifecycle.borrow_mut().defer_configuration = defer;
        if defer {
            return Ok(());
        }
        self.shared.configure_unless_deferred()
    }

    pub fn state(&self) -> AdapterState {
        self.shared.lifecycle.borrow().state
    }

    pub fn applied_args(&self) -> AdapterArgs {
        self.shared.lifecycle.borrow().applied_args.clone()
    }

    pub fn pending_args(&self) -> Option<AdapterArgs> {
        self.shared.lifecycle.borrow().pending_args.clone()
    }

    pub fn status(&self) -> AdapterStatus {
        self.shared.lifecycle.borrow().status
    }

    pub fn is_adapter_ready(&self) -> bool {
        self.status().is_ready
    }

    /// The error of the most recent adapter call, if it was rejected.
    pub fn last_error(&self) -> Option<AdapterError> {
        self.shared.lifecycle.borrow().last_error.clone()
    }

    pub fn adapter(&self) -> Rc<dyn Adapter> {
        self.shared.adapter.clone()
    }

    /// The broadcast descendants read adapter status and the reconfiguration entry point from.
    pub fn context(&self) -> Broadcast<AdapterContext> {
        self.shared.context.clone()
    }

    pub fn reconfigure_handle(&self) -> Reconfigure {
        Reconfigure {
            controller: Rc::downgrade(&self.shared),
        }
    }

    /// Renders the controller's content, gated on adapter readiness. See [render_when_ready].
    pub fn render<T: Clone>(
        &self,
        render: Option<&dyn Fn() -> T>,
        children: Option<&Children<T>>,
    ) -> Option<T> {
        render_when_ready(self.is_adapter_ready(), render, children)
    }
}

impl fmt::Debug for AdapterController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterController")
            .field("lifecycle", &self.shared.lifecycle.borrow())
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn configure_unless_deferred(self: &Rc<Self>) -> Result<(), ControllerError> {
        let args = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            if lifecycle.defer_configuration || lifecycle.state != AdapterState::Unconfigured {
                return Ok(());
            }
            if let Some(pending) = lifecycle.pending_args.take() {
                lifecycle.applied_args = pending;
            }
            lifecycle.state = AdapterState::Configuring;
            lifecycle.applied_args.clone()
        };
        self.dispatch(Call::Configure, args)
    }

    fn request_reconfiguration(
        self: &Rc<Self>,
        adapter_args: AdapterArgs,
        options: ReconfigurationOptions,
    ) -> Result<(), ControllerError> {
        let request = ReconfigurationRequest::new(adapter_args, options);
        let args = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            if lifecycle.state == AdapterState::Configured {
                let merged = merge_adapter_args(&lifecycle.applied_args, &request);
                lifecycle.applied_args = merged.clone();
                lifecycle.state = AdapterState::Configuring;
                merged
            } else {
                let base = lifecycle
                    .pending_args
                    .take()
                    .unwrap_or_else(|| lifecycle.applied_args.clone());
                debug!("adapter is {:?}, holding reconfiguration", lifecycle.state);
                lifecycle.pending_args = Some(merge_adapter_args(&base, &request));
                return Ok(());
            }
        };
        self.dispatch(Call::Reconfigure, args)
    }

    /// Issues `call` and spawns the task that settles it. If the spawner can no longer run tasks,
    /// the adapter is left alone and the state rolls back, so the next request starts over.
    fn dispatch(self: &Rc<Self>, call: Call, args: AdapterArgs) -> Result<(), ControllerError> {
        if let Err(err) = self.spawner.status_local() {
            warn!("cannot track adapter calls, not issuing {:?}: {}", call, err);
            self.lifecycle.borrow_mut().state = match call {
                Call::Configure => AdapterState::Unconfigured,
                Call::Reconfigure => AdapterState::Configured,
            };
            return Err(err.into());
        }
        debug!("{:?} adapter with {:?}", call, args);
        let handlers = self.adapter_handlers();
        let pending = match call {
            Call::Configure => self.adapter.configure(args, handlers),
            Call::Reconfigure => self.adapter.reconfigure(args, handlers),
        };
        let controller = Rc::downgrade(self);
        self.spawner.spawn_local(async move {
            let result = pending.await;
            if let Some(controller) = controller.upgrade() {
                controller.settle(result);
            }
        })?;
        Ok(())
    }

    /// Marks the outstanding call complete and, if requests were held meanwhile, promotes them and
    /// issues the follow-up `reconfigure` in the same step.
    fn settle(self: &Rc<Self>, result: Result<(), AdapterError>) {
        let next = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            if let Err(err) = result {
                error!(
                    "adapter did not apply {:?}, leaving it unsettled: {}",
                    lifecycle.applied_args, err
                );
                lifecycle.last_error = Some(err);
                return;
            }
            lifecycle.last_error = None;
            lifecycle.state = AdapterState::Configured;
            let pending = lifecycle.pending_args.take();
            if let Some(pending) = &pending {
                lifecycle.applied_args = pending.clone();
                lifecycle.state = AdapterState::Configuring;
            }
            pending
        };
        if let Some(args) = next {
            if let Err(err) = self.dispatch(Call::Reconfigure, args) {
                error!("could not apply held reconfiguration: {}", err);
            }
        }
    }

    fn adapter_handlers(self: &Rc<Self>) -> AdapterEventHandlers {
        let on_flags = Rc::downgrade(self);
        let on_status = Rc::downgrade(self);
        AdapterEventHandlers::new(
            move |flags: &Flags| {
                if let Some(controller) = on_flags.upgrade() {
                    controller.handlers.flags_state_change(flags);
                }
            },
            move |status| {
                if let Some(controller) = on_status.upgrade() {
                    controller.update_status(status);
                }
            },
        )
    }

    fn update_status(&self, status: AdapterStatus) {
        self.lifecycle.borrow_mut().status = status;
        let reconfigure = self.context.with(|context| context.reconfigure.clone());
        self.context.publish(AdapterContext {
            status,
            reconfigure,
        });
        self.handlers.status_state_change(status);
    }
}

/// Entry point for requesting reconfiguration of a mounted [AdapterController]. Handles are cheap
/// to clone and do not keep the controller alive.
#[derive(Clone)]
pub struct Reconfigure {
    controller: Weak<Shared>,
}

impl Reconfigure {
    pub fn call(
        &self,
        adapter_args: AdapterArgs,
        options: ReconfigurationOptions,
    ) -> Result<(), ControllerError> {
        match self.controller.upgrade() {
            Some(controller) => controller.request_reconfiguration(adapter_args, options),
            None => {
                warn!("reconfiguration requested after the adapter controller was dropped");
                Err(ControllerError::Unmounted)
            }
        }
    }
}

impl fmt::Debug for Reconfigure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconfigure")
            .field("mounted", &(self.controller.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderState;
    use crate::test_common::{user, AdapterCall, ManualAdapter, RecordedEvents};
    use futures::executor::LocalPool;
    use maplit::btreemap;
    use serde_json::json;
    use spectral::prelude::*;

    struct Harness {
        pool: LocalPool,
        adapter: Rc<ManualAdapter>,
        events: RecordedEvents,
        controller: AdapterController,
    }

    impl Harness {
        fn mount(config: ControllerConfig) -> Self {
            let pool = LocalPool::new();
            let adapter = Rc::new(ManualAdapter::new());
            let events = RecordedEvents::new();
            let controller = AdapterController::mount(
                adapter.clone(),
                config,
                events.handlers(),
                Rc::new(pool.spawner()),
            )
            .unwrap();
            Harness {
                pool,
                adapter,
                events,
                controller,
            }
        }

        fn mount_with(args: AdapterArgs) -> Self {
            Self::mount(ControllerConfig {
                adapter_args: args,
                ..ControllerConfig::default()
            })
        }

        fn resolve(&mut self) {
            self.pool.run_until_stalled();
            self.adapter.resolve();
            self.pool.run_until_stalled();
        }
    }

    fn args(value: serde_json::Value) -> AdapterArgs {
        AdapterArgs::from_value(value)
    }

    #[test]
    fn configures_on_mount() {
        let mut harness = Harness::mount_with(user("foo"));

        assert_that!(harness.adapter.calls())
            .is_equal_to(vec![AdapterCall::Configure(user("foo"))]);
        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configuring);
        assert_that!(harness.controller.is_adapter_ready()).is_false();

        harness.resolve();

        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configured);
        assert_that!(harness.controller.is_adapter_ready()).is_true();
        assert_that!(harness.controller.applied_args()).is_equal_to(user("foo"));
    }

    #[test]
    fn requests_while_configuring_are_held_and_applied_once() {
        let mut harness = Harness::mount_with(user("foo"));

        harness
            .controller
            .request_reconfiguration(
                args(json!({ "user": { "plan": "pro" } })),
                ReconfigurationOptions::merge(),
            )
            .unwrap();
        harness
            .controller
            .request_reconfiguration(
                args(json!({ "locale": "de" })),
                ReconfigurationOptions::merge(),
            )
            .unwrap();
        harness.pool.run_until_stalled();

        let folded = args(json!({ "user": { "id": "foo", "plan": "pro" }, "locale": "de" }));
        assert_that!(harness.adapter.calls().len()).is_equal_to(1);
        assert_that!(harness.adapter.outstanding()).is_equal_to(1);
        assert_that!(harness.controller.pending_args()).is_equal_to(Some(folded.clone()));

        harness.resolve();

        assert_that!(harness.adapter.calls()).is_equal_to(vec![
            AdapterCall::Configure(user("foo")),
            AdapterCall::Reconfigure(folded.clone()),
        ]);
        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configuring);
        assert_that!(harness.controller.pending_args()).is_none();
        assert_that!(harness.controller.applied_args()).is_equal_to(folded);
        assert_that!(harness.adapter.outstanding()).is_equal_to(1);

        harness.resolve();

        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configured);
        assert_that!(harness.adapter.calls().len()).is_equal_to(2);
        assert_that!(harness.adapter.outstanding()).is_equal_to(0);
    }

    #[test]
    fn held_requests_never_replace_each_other() {
        let harness = Harness::mount_with(user("foo"));

        harness
            .controller
            .request_reconfiguration(args(json!({ "a": 1 })), ReconfigurationOptions::merge())
            .unwrap();
        harness
            .controller
            .request_reconfiguration(args(json!({ "b": 2 })), ReconfigurationOptions::overwrite())
            .unwrap();

        assert_that!(harness.controller.pending_args()).is_equal_to(Some(args(json!({
            "user": { "id": "foo" },
            "a": 1,
            "b": 2
        }))));
    }

    #[test]
    fn configured_controller_reconfigures_immediately() {
        let mut harness = Harness::mount_with(args(json!({
            "user": { "id": "foo", "plan": "pro" },
            "locale": "en"
        })));
        harness.resolve();

        harness
            .controller
            .request_reconfiguration(user("bar"), ReconfigurationOptions::overwrite())
            .unwrap();

        let expected = args(json!({ "user": { "id": "bar" }, "locale": "en" }));
        assert_that!(harness.adapter.calls().last().cloned())
            .is_equal_to(Some(AdapterCall::Reconfigure(expected.clone())));
        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configuring);
        assert_that!(harness.controller.applied_args()).is_equal_to(expected);

        harness
            .controller
            .request_reconfiguration(user("baz"), ReconfigurationOptions::overwrite())
            .unwrap();
        harness.pool.run_until_stalled();
        assert_that!(harness.adapter.calls().len()).is_equal_to(2);
        assert_that!(harness.adapter.outstanding()).is_equal_to(1);
    }

    #[test]
    fn never_more_than_one_call_in_flight() {
        let mut harness = Harness::mount_with(user("user-0"));

        for round in 1..6 {
            for burst in 0..3 {
                harness
                    .controller
                    .request_reconfiguration(
                        args(json!({ "round": round, "burst": burst })),
                        ReconfigurationOptions::merge(),
                    )
                    .unwrap();
                harness.pool.run_until_stalled();
                assert_that!(harness.adapter.outstanding()).is_less_than_or_equal_to(1);
            }
            harness.resolve();
            assert_that!(harness.adapter.outstanding()).is_less_than_or_equal_to(1);
        }
        while harness.adapter.outstanding() > 0 {
            harness.resolve();
        }

        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configured);
        assert_that!(harness.controller.applied_args().get("round")).is_equal_to(Some(&json!(5)));
        assert_that!(harness.controller.applied_args().get("burst")).is_equal_to(Some(&json!(2)));
    }

    #[test]
    fn set_adapter_args_overwrites_once_configured() {
        let mut harness =
            Harness::mount_with(args(json!({ "user": { "id": "foo", "plan": "pro" } })));
        harness.resolve();

        harness.controller.set_adapter_args(user("bar")).unwrap();

        assert_that!(harness.adapter.calls().last().cloned())
            .is_equal_to(Some(AdapterCall::Reconfigure(user("bar"))));
    }

    #[test]
    fn deferred_configuration_waits_for_hand_off() {
        let harness = Harness::mount(ControllerConfig {
            adapter_args: user("foo"),
            defer_configuration: true,
            ..ControllerConfig::default()
        });

        harness.controller.set_adapter_args(user("bar")).unwrap();
        harness
            .controller
            .set_adapter_args(args(json!({ "locale": "de" })))
            .unwrap();

        assert_that!(harness.adapter.calls()).is_empty();
        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Unconfigured);

        harness.controller.set_defer_configuration(false).unwrap();

        let expected = args(json!({ "user": { "id": "bar" }, "locale": "de" }));
        assert_that!(harness.adapter.calls())
            .is_equal_to(vec![AdapterCall::Configure(expected.clone())]);
        assert_that!(harness.controller.pending_args()).is_none();
        assert_that!(harness.controller.applied_args()).is_equal_to(expected);

        harness.controller.set_defer_configuration(false).unwrap();
        assert_that!(harness.adapter.calls().len()).is_equal_to(1);
    }

    #[test]
    fn default_flags_are_published_at_mount() {
        let harness = Harness::mount(ControllerConfig {
            adapter_args: user("foo"),
            default_flags: btreemap! {
                "foo-flag".to_string() => FlagValue::Bool(true),
                "bar_flag".to_string() => FlagValue::Json(json!(null)),
            },
            defer_configuration: true,
        });

        assert_that!(harness.events.flags()).is_equal_to(vec![btreemap! {
            "fooFlag".to_string() => FlagValue::Bool(true),
            "barFlag".to_string() => FlagValue::Bool(false),
        }]);
        assert_that!(harness.adapter.calls()).is_empty();
    }

    #[test]
    fn rejected_configuration_is_not_retried() {
        let mut harness = Harness::mount_with(user("foo"));
        harness.pool.run_until_stalled();

        harness.adapter.reject("provider unavailable");
        harness.pool.run_until_stalled();

        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configuring);
        assert_that!(harness.controller.last_error()).is_equal_to(Some(AdapterError::Rejected(
            "provider unavailable".to_string(),
        )));

        harness.controller.set_adapter_args(user("bar")).unwrap();
        harness.pool.run_until_stalled();

        assert_that!(harness.adapter.calls().len()).is_equal_to(1);
        assert_that!(harness.controller.pending_args()).is_equal_to(Some(user("bar")));
    }

    #[test]
    fn adapter_flags_reach_the_handlers() {
        let mut harness = Harness::mount_with(user("foo"));
        harness.pool.run_until_stalled();

        let flags = btreemap! { "fooFlag".to_string() => FlagValue::Bool(true) };
        harness.adapter.publish_flags(flags.clone());

        assert_that!(harness.controller.state()).is_equal_to(AdapterState::Configuring);
        assert_that!(harness.events.flags()).is_equal_to(vec![flags.clone()]);

        harness.resolve();
        harness.adapter.publish_flags(Flags::new());

        assert_that!(harness.events.flags()).is_equal_to(vec![flags, Flags::new()]);
    }

    #[test]
    fn configure_is_not_issued_without_a_running_spawner() {
        let Harness {
            pool,
            adapter,
            controller,
            ..
        } = Harness::mount(ControllerConfig {
            adapter_args: user("foo"),
            defer_configuration: true,
            ..ControllerConfig::default()
        });
        drop(pool);

        let result = controller.set_defer_configuration(false);

        assert!(matches!(result, Err(ControllerError::Spawn(_))));
        assert_that!(adapter.calls()).is_empty();
        assert_that!(controller.state()).is_equal_to(AdapterState::Unconfigured);
    }

    #[test]
    fn reconfigure_is_not_issued_without_a_running_spawner() {
        let mut harness = Harness::mount_with(user("foo"));
        harness.resolve();
        let Harness {
            pool,
            adapter,
            controller,
            ..
        } = harness;
        drop(pool);

        let result = controller.set_adapter_args(user("bar"));

        assert!(matches!(result, Err(ControllerError::Spawn(_))));
        assert_that!(adapter.calls().len()).is_equal_to(1);
        assert_that!(controller.state()).is_equal_to(AdapterState::Configured);
        assert_that!(adapter.outstanding()).is_equal_to(0);
    }

    #[test]
    fn status_changes_are_broadcast() {
        let mut harness = Harness::mount_with(user("foo"));
        let context = harness.controller.context();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let seen = seen.clone();
            context.subscribe(move |context: &AdapterContext| {
                seen.borrow_mut().push(context.status)
            })
        };

        harness.resolve();

        let ready = AdapterStatus {
            is_ready: true,
            is_configured: true,
        };
        assert_that!(*seen.borrow()).is_equal_to(vec![ready]);
        assert_that!(context.get().status).is_equal_to(ready);
        assert_that!(harness.events.statuses()).is_equal_to(vec![ready]);
    }

    #[test]
    fn reconfigure_handle_routes_to_controller() {
        let mut harness = Harness::mount_with(user("foo"));
        harness.resolve();
        let reconfigure = harness.controller.context().get().reconfigure;

        reconfigure
            .call(user("bar"), ReconfigurationOptions::overwrite())
            .unwrap();

        assert_that!(harness.adapter.calls().last().cloned())
            .is_equal_to(Some(AdapterCall::Reconfigure(user("bar"))));
    }

    #[test]
    fn dropped_controller_ignores_late_completions() {
        let Harness {
            mut pool,
            adapter,
            controller,
            ..
        } = Harness::mount_with(user("foo"));
        let reconfigure = controller.reconfigure_handle();
        pool.run_until_stalled();

        drop(controller);
        adapter.resolve();
        pool.run_until_stalled();

        let result = reconfigure.call(user("bar"), ReconfigurationOptions::overwrite());
        assert!(matches!(result, Err(ControllerError::Unmounted)));
        assert_that!(adapter.calls().len()).is_equal_to(1);
    }

    #[test]
    fn renders_only_when_ready() {
        let mut harness = Harness::mount_with(user("foo"));
        let children = Children::element("app");
        let fallback = Children::function(|state: RenderState| state.is_adapter_ready);

        assert_that!(harness.controller.render(None, Some(&children))).is_none();
        assert_that!(harness.controller.render(None, Some(&fallback))).is_equal_to(Some(false));

        harness.resolve();

        assert_that!(harness.controller.render(None, Some(&children))).is_equal_to(Some("app"));
        assert_that!(harness.controller.render(None, Some(&fallback))).is_equal_to(Some(true));
    }

    #[test]
    fn config_deserializes_from_camel_case() {
        let config: ControllerConfig = serde_json::from_value(json!({
            "adapterArgs": { "user": { "id": "foo" } },
            "defaultFlags": { "fooFlag": true },
            "deferConfiguration": true
        }))
        .unwrap();

        assert_that!(config.adapter_args).is_equal_to(user("foo"));
        assert_that!(config.default_flags.get("fooFlag")).is_equal_to(Some(&FlagValue::Bool(true)));
        assert_that!(config.defer_configuration).is_true();

        let config: ControllerConfig = serde_json::from_value(json!({})).unwrap();
        assert_that!(config).is_equal_to(ControllerConfig::default());
    }
}
