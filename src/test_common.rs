#![cfg(test)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::FutureExt;
use serde_json::json;

use crate::adapter::{
    Adapter, AdapterError, AdapterEventHandlers, AdapterStatus, ConfigurationFuture,
};
use crate::args::AdapterArgs;
use crate::flag_value::FlagValue;
use crate::flags::Flags;

pub fn user(id: &str) -> AdapterArgs {
    AdapterArgs::from_value(json!({ "user": { "id": id } }))
}

#[derive(Clone, Debug, PartialEq)]
pub enum AdapterCall {
    Configure(AdapterArgs),
    Reconfigure(AdapterArgs),
}

/// An adapter whose configure/reconfigure futures only complete when the test says so.
#[derive(Default)]
pub struct ManualAdapter {
    calls: RefCell<Vec<AdapterCall>>,
    outstanding: RefCell<VecDeque<oneshot::Sender<Result<(), AdapterError>>>>,
    handlers: RefCell<Option<AdapterEventHandlers>>,
    flags: RefCell<Flags>,
    ready: RefCell<bool>,
}

impl ManualAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AdapterCall> {
        self.calls.borrow().clone()
    }

    /// Number of calls issued but not yet resolved or rejected.
    pub fn outstanding(&self) -> usize {
        self.outstanding.borrow().len()
    }

    /// Completes the oldest outstanding call after reporting a ready status.
    pub fn resolve(&self) {
        *self.ready.borrow_mut() = true;
        let handlers = self.handlers.borrow().clone();
        if let Some(handlers) = handlers {
            handlers.status_state_change(AdapterStatus {
                is_ready: true,
                is_configured: true,
            });
        }
        self.complete(Ok(()));
    }

    pub fn reject(&self, message: &str) {
        self.complete(Err(AdapterError::Rejected(message.to_string())));
    }

    pub fn publish_flags(&self, flags: Flags) {
        *self.flags.borrow_mut() = flags.clone();
        let handlers = self.handlers.borrow().clone();
        if let Some(handlers) = handlers {
            handlers.flags_state_change(&flags);
        }
    }

    fn complete(&self, result: Result<(), AdapterError>) {
        let sender = self.outstanding.borrow_mut().pop_front();
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }

    fn issue(&self, call: AdapterCall, handlers: AdapterEventHandlers) -> ConfigurationFuture {
        let (sender, receiver) = oneshot::channel();
        self.calls.borrow_mut().push(call);
        *self.handlers.borrow_mut() = Some(handlers);
        self.outstanding.borrow_mut().push_back(sender);
        async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(AdapterError::Rejected("call abandoned".to_string())))
        }
        .boxed_local()
    }
}

impl Adapter for ManualAdapter {
    fn configure(&self, args: AdapterArgs, handlers: AdapterEventHandlers) -> ConfigurationFuture {
        self.issue(AdapterCall::Configure(args), handlers)
    }

    fn reconfigure(
        &self,
        args: AdapterArgs,
        handlers: AdapterEventHandlers,
    ) -> ConfigurationFuture {
        self.issue(AdapterCall::Reconfigure(args), handlers)
    }

    fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    fn reset(&self) {
        self.flags.borrow_mut().clear();
    }

    fn flag(&self, flag_name: &str) -> Option<FlagValue> {
        self.flags.borrow().get(flag_name).cloned()
    }
}

/// Collects every notification delivered through its handlers.
#[derive(Clone, Default)]
pub struct RecordedEvents {
    flags: Rc<RefCell<Vec<Flags>>>,
    statuses: Rc<RefCell<Vec<AdapterStatus>>>,
}

impl RecordedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handlers(&self) -> AdapterEventHandlers {
        let flags = self.flags.clone();
        let statuses = self.statuses.clone();
        AdapterEventHandlers::new(
            move |changed: &Flags| flags.borrow_mut().push(changed.clone()),
            move |status| statuses.borrow_mut().push(status),
        )
    }

    pub fn flags(&self) -> Vec<Flags> {
        self.flags.borrow().clone()
    }

    pub fn statuses(&self) -> Vec<AdapterStatus> {
        self.statuses.borrow().clone()
    }
}
