use crate::{
    component::Component,
    error::{EcsError, EcsResult, not_assigned_err},
    model::Model,
    pool::Population,
    utils::TypeMap,
};
use std::{any::Any, cell::RefCell, fmt::Debug, rc::Weak};

/// Handle to one [Model] of a [Pool](crate::pool::Pool).
///
/// A view owns no component data. It may carry copies of some components
/// taken when it was built (see [Pool::fetch_loaded](crate::pool::Pool::fetch_loaded));
/// everything else is read from the pool on request. Views keep only a weak
/// reference to their pool, so a view that outlives it can still serve its
/// cached components but can no longer write.
pub struct View {
    model: Model,
    population: Weak<RefCell<Population>>,
    loaded: TypeMap<Box<dyn Any>>,
}

impl Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("model", &self.model)
            .field("loaded", &self.loaded.len())
            .finish()
    }
}

impl View {
    pub(crate) fn new(model: Model, population: Weak<RefCell<Population>>) -> Self {
        Self::with_loaded(model, population, TypeMap::new())
    }

    pub(crate) fn with_loaded(
        model: Model,
        population: Weak<RefCell<Population>>,
        loaded: TypeMap<Box<dyn Any>>,
    ) -> Self {
        Self {
            model,
            population,
            loaded,
        }
    }

    #[inline]
    pub fn model(&self) -> Model {
        self.model
    }

    /// Copy of this model's `C`.
    ///
    /// Fails with [EcsError::NotAssigned] when the model has no `C` or was
    /// deleted, [EcsError::UnknownComponent] when no model ever had one, and
    /// [EcsError::NotLoaded] when `C` is not cached and the pool is gone.
    #[inline]
    pub fn get<C: Component + Clone>(&self) -> EcsResult<C> {
        self.with(|value: &C| value.clone())
    }

    /// Runs `f` against this model's `C` without copying it.
    ///
    /// The pool's storage stays borrowed while `f` runs; writing through any
    /// view from inside `f` panics.
    pub fn with<C: Component, R>(&self, f: impl FnOnce(&C) -> R) -> EcsResult<R> {
        let Some(population) = self.population.upgrade() else {
            return match self.cached::<C>() {
                Some(value) => Ok(f(value)),
                None => Err(EcsError::NotLoaded {
                    model: self.model,
                    component: std::any::type_name::<C>(),
                }),
            };
        };

        let population = population.borrow();
        if !population.is_alive(self.model) {
            return not_assigned_err::<C, _>(self.model);
        }

        match self.cached::<C>() {
            Some(value) => Ok(f(value)),
            None => population.table.get::<C>(self.model).map(f),
        }
    }

    pub fn has<C: Component>(&self) -> bool {
        match self.population.upgrade() {
            Some(population) => {
                let population = population.borrow();
                population.is_alive(self.model)
                    && (self.is_loaded::<C>() || population.table.has::<C>(self.model))
            }
            None => self.is_loaded::<C>(),
        }
    }

    fn cached<C: Component>(&self) -> Option<&C> {
        self.loaded.get::<C>().and_then(|value| value.downcast_ref::<C>())
    }

    /// Whether `C` is served from this view's own cache.
    #[inline]
    pub fn is_loaded<C: Component>(&self) -> bool {
        self.loaded.contains::<C>()
    }

    /// Attaches `value`, replacing any `C` the model already had.
    ///
    /// The first `C` stored anywhere in the pool creates its column.
    pub fn add<C: Component>(&mut self, value: C) -> EcsResult<()> {
        let population = self.population.upgrade().ok_or(EcsError::Detached(self.model))?;
        let mut population = population.borrow_mut();

        if !population.is_alive(self.model) {
            return Err(EcsError::NotAlive(self.model));
        }

        self.loaded.remove::<C>();
        population.table.set(self.model, value);
        Ok(())
    }

    /// Detaches this model's `C`. Removing an absent component is not an error.
    pub fn remove<C: Component>(&mut self) -> EcsResult<()> {
        let population = self.population.upgrade().ok_or(EcsError::Detached(self.model))?;

        self.loaded.remove::<C>();
        population.borrow_mut().table.unset::<C>(self.model);
        Ok(())
    }
}
