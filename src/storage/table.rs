use crate::{
    component::{Component, ComponentId, TypeKey},
    error::{CorruptedTable, EcsResult, not_assigned_err, unknown_component_err},
    model::Model,
    registry::TypeRegistry,
    storage::column::{AnyColumn, Column},
};
use std::any::TypeId;
use tracing::debug;

/// Owns every [Column] and the [TypeRegistry] that indexes them.
///
/// The position of a column in `columns` is always its [ComponentId];
/// slot 0 is reserved and stays empty. Columns are created on first store
/// and live as long as the table.
pub struct Table {
    registry: TypeRegistry,
    columns: Vec<Option<Box<dyn AnyColumn>>>,
    column_capacity: usize,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// New columns start with room for `models` model ids.
    pub fn with_capacity(models: usize) -> Self {
        let mut columns: Vec<Option<Box<dyn AnyColumn>>> = Vec::with_capacity(32);
        columns.push(None);

        Self {
            registry: TypeRegistry::new(),
            columns,
            column_capacity: models,
        }
    }

    /// Stores `value` for `model`, creating the column for `C` if needed.
    ///
    /// # Panics
    /// Panics if `C` is a bare string type; wrap text in a named newtype instead.
    /// Also panics for [Model::INVALID].
    pub fn set<C: Component>(&mut self, model: Model, value: C) -> ComponentId {
        assert!(
            !model.is_invalid(),
            "component {} stored on the invalid model",
            std::any::type_name::<C>()
        );

        if self.registry.is_rejected(TypeId::of::<C>()) {
            panic!(
                "string component added to {model}: {} must be wrapped in a named type",
                std::any::type_name::<C>()
            );
        }

        let column = self.row_of::<C>();
        column.set(model, value);
        column.id()
    }

    /// Clears `model`'s `C`. Returns [ComponentId::INVALID] if `C` has no column,
    /// in which case nothing is created.
    pub fn unset<C: Component>(&mut self, model: Model) -> ComponentId {
        match self.column_mut::<C>() {
            Some(column) => {
                column.unset(model);
                column.id()
            }
            None => ComponentId::INVALID,
        }
    }

    /// Clears `model`'s slot in the column `id`, returning whether a value was dropped.
    pub fn unset_id(&mut self, model: Model, id: ComponentId) -> bool {
        match self.columns.get_mut(id.index()).and_then(Option::as_mut) {
            Some(column) => column.clear_model(model),
            None => false,
        }
    }

    pub fn get<C: Component>(&self, model: Model) -> EcsResult<&C> {
        let Some(column) = self.column::<C>() else {
            return unknown_component_err::<C, _>();
        };

        match column.get(model) {
            Some(value) => Ok(value),
            None => not_assigned_err::<C, _>(model),
        }
    }

    pub fn get_mut<C: Component>(&mut self, model: Model) -> EcsResult<&mut C> {
        let Some(column) = self.column_mut::<C>() else {
            return unknown_component_err::<C, _>();
        };

        match column.get_mut(model) {
            Some(value) => Ok(value),
            None => not_assigned_err::<C, _>(model),
        }
    }

    /// Checks if `model` holds a `C`.
    ///
    /// Returns `false` if `C` was never registered.
    pub fn has<C: Component>(&self, model: Model) -> bool {
        self.column::<C>().is_some_and(|column| column.contains(model))
    }

    pub fn id_of<C: Component>(&self) -> EcsResult<ComponentId> {
        match self.registry.id_of_t::<C>() {
            Some(id) => Ok(id),
            None => unknown_component_err::<C, _>(),
        }
    }

    #[inline]
    pub fn id_of_type(&self, type_id: TypeId) -> Option<ComponentId> {
        self.registry.id_of(type_id)
    }

    /// Column for `C`, created and registered if this is the first store of `C`.
    ///
    /// # Panics
    /// Panics if the registry and the column list disagree about `C`'s slot.
    pub fn row_of<C: Component>(&mut self) -> &mut Column<C> {
        let id = match self.registry.id_of_t::<C>() {
            Some(id) => id,
            None => self.new_column::<C>(),
        };

        let slot = self.columns.len();
        let Some(column) = self.columns.get_mut(id.index()).and_then(Option::as_mut) else {
            panic!("INTERNAL ERROR: {}", CorruptedTable { assigned: id, slot });
        };

        match column.as_any_mut().downcast_mut::<Column<C>>() {
            Some(column) => column,
            None => panic!(
                "INTERNAL ERROR: column {id} holds {} but {} was requested",
                self.registry.name_of(id).unwrap_or("an unregistered type"),
                std::any::type_name::<C>()
            ),
        }
    }

    fn new_column<C: Component>(&mut self) -> ComponentId {
        let key = TypeKey::of::<C>();
        let id = self.registry.add(key);
        let slot = self.columns.len();

        if id.index() != slot {
            panic!("INTERNAL ERROR: {}", CorruptedTable { assigned: id, slot });
        }

        self.columns
            .push(Some(Box::new(Column::<C>::with_capacity(id, self.column_capacity))));

        debug!(component = key.type_name(), id = id.to_raw(), "registered component column");
        id
    }

    /// Column for `C` if one was ever created. Never creates.
    pub fn column<C: Component>(&self) -> Option<&Column<C>> {
        let id = self.registry.id_of_t::<C>()?;
        self.columns
            .get(id.index())
            .and_then(Option::as_ref)
            .and_then(|column| column.as_any().downcast_ref::<Column<C>>())
    }

    fn column_mut<C: Component>(&mut self) -> Option<&mut Column<C>> {
        let id = self.registry.id_of_t::<C>()?;
        self.columns
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .and_then(|column| column.as_any_mut().downcast_mut::<Column<C>>())
    }

    #[inline]
    pub fn column_by_id(&self, id: ComponentId) -> Option<&dyn AnyColumn> {
        self.columns.get(id.index()).and_then(|c| c.as_deref())
    }

    /// Every created column in id order.
    pub fn columns(&self) -> impl Iterator<Item = &(dyn AnyColumn + 'static)> + '_ {
        self.columns.iter().filter_map(|c| c.as_deref())
    }

    /// Clears `model` from every column, returning how many values were dropped.
    pub fn clear_model(&mut self, model: Model) -> usize {
        self.columns
            .iter_mut()
            .filter_map(Option::as_mut)
            .map(|column| column.clear_model(model))
            .filter(|&cleared| cleared)
            .count()
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Number of column slots, including the reserved slot 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True while no component type has been stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.len() == 1
    }
}
