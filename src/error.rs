use crate::{component::ComponentId, model::Model};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The type was never stored anywhere in this table.
    #[error("Component {0} is not registered in this table")]
    UnknownComponent(&'static str),
    /// The type has a column but this model holds no value in it.
    #[error("{model} has no {component} assigned")]
    NotAssigned {
        model: Model,
        component: &'static str,
    },
    /// The view could not serve the component from its cache or its table.
    #[error("{component} is not loaded for {model}")]
    NotLoaded {
        model: Model,
        component: &'static str,
    },
    #[error("{0} is not alive in this pool")]
    NotAlive(Model),
    #[error("view of {0} outlived its pool")]
    Detached(Model),
    /// A filter named a raw component id this table never assigned.
    #[error("component id {0} was never assigned by this table")]
    UnknownComponentId(ComponentId),
}

pub type EcsResult<T> = Result<T, EcsError>;

#[inline(always)]
pub fn unknown_component_err<C, U>() -> EcsResult<U> {
    Err(EcsError::UnknownComponent(std::any::type_name::<C>()))
}

#[inline(always)]
pub fn not_assigned_err<C, U>(model: Model) -> EcsResult<U> {
    Err(EcsError::NotAssigned {
        model,
        component: std::any::type_name::<C>(),
    })
}

/// Registry and column bookkeeping disagree. Never returned, only raised as a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("table became corrupted: registry assigned {assigned} but the next column slot is {slot}")]
pub struct CorruptedTable {
    pub assigned: ComponentId,
    pub slot: usize,
}
