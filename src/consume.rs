use std::collections::BTreeMap;

use crate::adapter::AdapterStatus;
use crate::args::{AdapterArgs, ReconfigurationOptions};
use crate::context::Scope;
use crate::controller::Reconfigure;
use crate::error::ControllerError;
use crate::flag_value::FlagValue;
use crate::flags::normalize_flag_name;

/// Reads a flag from the propagated flag state. Every accessor here has an `inject_` counterpart
/// that hands the value to a component, modelled as a function from its properties to output.
pub fn flag_variation(scope: &Scope, flag_name: &str) -> Option<FlagValue> {
    scope.flag(flag_name)
}

/// Reads a flag, falling back to `default` while the flag is unknown.
pub fn flag_or(scope: &Scope, flag_name: &str, default: impl Into<FlagValue>) -> FlagValue {
    scope.flag(flag_name).unwrap_or_else(|| default.into())
}

pub fn flag_variations<'a>(
    scope: &Scope,
    flag_names: impl IntoIterator<Item = &'a str>,
) -> Vec<Option<FlagValue>> {
    flag_names
        .into_iter()
        .map(|flag_name| scope.flag(flag_name))
        .collect()
}

/// Whether `flag_name` is currently on, i.e. selects `variation` (or `true` if none is given).
/// Unknown flags are off.
pub fn feature_toggle(scope: &Scope, flag_name: &str, variation: Option<&FlagValue>) -> bool {
    scope
        .flag(flag_name)
        .map(|value| value.matches_variation(variation))
        .unwrap_or(false)
}

/// Toggle state of several flags, keyed by canonical flag name.
pub fn feature_toggles<'a>(
    scope: &Scope,
    flag_names: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, bool> {
    flag_names
        .into_iter()
        .map(|flag_name| {
            (
                normalize_flag_name(flag_name),
                feature_toggle(scope, flag_name, None),
            )
        })
        .collect()
}

pub fn adapter_status(scope: &Scope) -> AdapterStatus {
    scope.status()
}

pub fn adapter_reconfiguration(scope: &Scope) -> Reconfigure {
    scope.reconfigure_handle()
}

pub fn inject_flag_variation<P, T>(
    flag_name: impl Into<String>,
    component: impl Fn(&P, Option<FlagValue>) -> T,
) -> impl Fn(&Scope, &P) -> T {
    let flag_name = flag_name.into();
    move |scope: &Scope, props: &P| component(props, flag_variation(scope, &flag_name))
}

pub fn inject_flag_or<P, T>(
    flag_name: impl Into<String>,
    default: impl Into<FlagValue>,
    component: impl Fn(&P, FlagValue) -> T,
) -> impl Fn(&Scope, &P) -> T {
    let flag_name = flag_name.into();
    let default = default.into();
    move |scope: &Scope, props: &P| component(props, flag_or(scope, &flag_name, default.clone()))
}

pub fn inject_flag_variations<P, T>(
    flag_names: Vec<String>,
    component: impl Fn(&P, &[Option<FlagValue>]) -> T,
) -> impl Fn(&Scope, &P) -> T {
    move |scope: &Scope, props: &P| {
        let values = flag_variations(scope, flag_names.iter().map(String::as_str));
        component(props, &values)
    }
}

pub fn inject_feature_toggle<P, T>(
    flag_name: impl Into<String>,
    component: impl Fn(&P, bool) -> T,
) -> impl Fn(&Scope, &P) -> T {
    let flag_name = flag_name.into();
    move |scope: &Scope, props: &P| component(props, feature_toggle(scope, &flag_name, None))
}

pub fn inject_feature_toggles<P, T>(
    flag_names: Vec<String>,
    component: impl Fn(&P, &BTreeMap<String, bool>) -> T,
) -> impl Fn(&Scope, &P) -> T {
    move |scope: &Scope, props: &P| {
        let toggles = feature_toggles(scope, flag_names.iter().map(String::as_str));
        component(props, &toggles)
    }
}

pub fn inject_adapter_status<P, T>(
    component: impl Fn(&P, AdapterStatus) -> T,
) -> impl Fn(&Scope, &P) -> T {
    move |scope: &Scope, props: &P| component(props, adapter_status(scope))
}

/// Renders `toggled` while the flag is on and nothing otherwise.
pub fn branch_on_feature_toggle<P, T>(
    flag_name: impl Into<String>,
    toggled: impl Fn(&P) -> T,
) -> impl Fn(&Scope, &P) -> Option<T> {
    let flag_name = flag_name.into();
    move |scope: &Scope, props: &P| feature_toggle(scope, &flag_name, None).then(|| toggled(props))
}

/// Renders `toggled` while the flag is on and `untoggled` otherwise.
pub fn branch_on_feature_toggle_or<P, T>(
    flag_name: impl Into<String>,
    toggled: impl Fn(&P) -> T,
    untoggled: impl Fn(&P) -> T,
) -> impl Fn(&Scope, &P) -> T {
    let flag_name = flag_name.into();
    move |scope: &Scope, props: &P| {
        if feature_toggle(scope, &flag_name, None) {
            toggled(props)
        } else {
            untoggled(props)
        }
    }
}

/// Reconfigures the adapter from outside the controller, e.g. from a sibling that tracks the
/// signed-in user. Requests are only sent when the arguments differ from the last ones sent.
#[derive(Clone, Debug, Default)]
pub struct ReconfigureAdapter {
    should_overwrite: bool,
    last_args: Option<AdapterArgs>,
}

impl ReconfigureAdapter {
    pub fn new(should_overwrite: bool) -> Self {
        ReconfigureAdapter {
            should_overwrite,
            last_args: None,
        }
    }

    pub fn update(
        &mut self,
        scope: &Scope,
        adapter_args: AdapterArgs,
    ) -> Result<(), ControllerError> {
        if self.last_args.as_ref() == Some(&adapter_args) {
            return Ok(());
        }
        let options = ReconfigurationOptions {
            should_overwrite: self.should_overwrite,
        };
        scope.reconfigure(adapter_args.clone(), options)?;
        self.last_args = Some(adapter_args);
        Ok(())
    }
}
