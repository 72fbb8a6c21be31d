use std::fmt;

/// What a children-as-function receives from a readiness-gated parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderState {
    pub is_adapter_ready: bool,
}

/// Content handed to a component: either an opaque element or a function of render state.
pub enum Children<T, S = RenderState> {
    Element(T),
    Function(Box<dyn Fn(S) -> T>),
}

impl<T, S> Children<T, S> {
    pub fn element(element: T) -> Self {
        Children::Element(element)
    }

    pub fn function(f: impl Fn(S) -> T + 'static) -> Self {
        Children::Function(Box::new(f))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Children::Function(_))
    }
}

impl<T: Clone, S> Children<T, S> {
    pub fn resolve(&self, state: S) -> T {
        match self {
            Children::Element(element) => element.clone(),
            Children::Function(f) => f(state),
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for Children<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Children::Function(_) => f.write_str("Function"),
        }
    }
}

/// Renders content gated on adapter readiness.
///
/// Once ready, `render` wins over `children`. Before that, only a children-as-function renders,
/// receiving `is_adapter_ready: false`; everything else renders nothing.
pub fn render_when_ready<T: Clone>(
    is_adapter_ready: bool,
    render: Option<&dyn Fn() -> T>,
    children: Option<&Children<T>>,
) -> Option<T> {
    let state = RenderState { is_adapter_ready };
    if is_adapter_ready {
        if let Some(render) = render {
            return Some(render());
        }
        return children.map(|children| children.resolve(state));
    }
    match children {
        Some(children) if children.is_function() => Some(children.resolve(state)),
        _ => None,
    }
}
