use std::fmt;

use crate::consume::feature_toggle;
use crate::context::Scope;
use crate::flag_value::FlagValue;
use crate::render::Children;

/// What a children-as-function receives from [ToggleFeature].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToggleState {
    pub is_feature_enabled: bool,
}

/// Renders one of two contents depending on a flag.
///
/// The feature is enabled when the flag selects the requested variation (`true` unless set with
/// [ToggleFeature::variation]), flipped when [ToggleFeature::inverted] is set. When enabled, the
/// toggled component wins over the render callback, which wins over children. Function children
/// are always rendered with the toggle state; otherwise a disabled feature renders the untoggled
/// component, if any.
pub struct ToggleFeature<T> {
    flag: String,
    variation: Option<FlagValue>,
    inverted: bool,
    toggled_component: Option<T>,
    untoggled_component: Option<T>,
    render: Option<Box<dyn Fn() -> T>>,
    children: Option<Children<T, ToggleState>>,
}

impl<T: Clone> ToggleFeature<T> {
    pub fn new(flag: impl Into<String>) -> Self {
        ToggleFeature {
            flag: flag.into(),
            variation: None,
            inverted: false,
            toggled_component: None,
            untoggled_component: None,
            render: None,
            children: None,
        }
    }

    pub fn variation(mut self, variation: impl Into<FlagValue>) -> Self {
        self.variation = Some(variation.into());
        self
    }

    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn toggled_component(mut self, component: T) -> Self {
        self.toggled_component = Some(component);
        self
    }

    pub fn untoggled_component(mut self, component: T) -> Self {
        self.untoggled_component = Some(component);
        self
    }

    pub fn render_with(mut self, render: impl Fn() -> T + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    pub fn children(mut self, children: Children<T, ToggleState>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn is_feature_enabled(&self, scope: &Scope) -> bool {
        feature_toggle(scope, &self.flag, self.variation.as_ref()) != self.inverted
    }

    pub fn render(&self, scope: &Scope) -> Option<T> {
        let is_feature_enabled = self.is_feature_enabled(scope);
        let state = ToggleState { is_feature_enabled };

        if is_feature_enabled {
            if let Some(component) = &self.toggled_component {
                return Some(component.clone());
            }
            if let Some(render) = &self.render {
                return Some(render());
            }
            if let Some(children) = &self.children {
                return Some(children.resolve(state));
            }
        }
        match &self.children {
            Some(children) if children.is_function() => Some(children.resolve(state)),
            _ => self.untoggled_component.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ToggleFeature<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleFeature")
            .field("flag", &self.flag)
            .field("variation", &self.variation)
            .field("inverted", &self.inverted)
            .field("toggled_component", &self.toggled_component)
            .field("untoggled_component", &self.untoggled_component)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
