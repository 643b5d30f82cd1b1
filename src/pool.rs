use crate::{
    component::{ComponentId, ComponentSet, LoadSet, Name},
    error::{EcsError, EcsResult},
    filter::{Filter, Term},
    model::Model,
    storage::Table,
    utils::TypeMap,
    view::View,
};
use fixedbitset::FixedBitSet;
use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};
use tracing::{debug, trace};

/// Sizing hints for a [Pool].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Model ids every new column can hold before it has to grow.
    pub model_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { model_capacity: 64 }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_capacity(mut self, model_capacity: usize) -> Self {
        self.model_capacity = model_capacity;
        self
    }
}

/// State shared between a [Pool] and its [View]s.
pub(crate) struct Population {
    pub(crate) table: Table,
    alive: FixedBitSet,
    max_id: u32,
    alive_count: usize,
}

impl Population {
    fn new(config: PoolConfig) -> Self {
        Self {
            table: Table::with_capacity(config.model_capacity),
            alive: FixedBitSet::with_capacity(config.model_capacity),
            max_id: 0,
            alive_count: 0,
        }
    }

    #[inline]
    pub(crate) fn is_alive(&self, model: Model) -> bool {
        !model.is_invalid() && self.alive.contains(model.index())
    }

    /// Issues a model id that was never handed out before.
    fn allocate(&mut self) -> Model {
        assert!(self.max_id < u32::MAX, "model ids exhausted at {}", self.max_id);

        self.max_id += 1;
        let model = Model::from_raw(self.max_id);
        let index = model.index();

        if index >= self.alive.len() {
            self.alive.grow((index + 1).max(self.alive.len() * 2));
        }

        self.alive.insert(index);
        self.alive_count += 1;
        model
    }

    fn release(&mut self, model: Model) -> EcsResult<usize> {
        if !self.is_alive(model) {
            return Err(EcsError::NotAlive(model));
        }

        self.alive.set(model.index(), false);
        self.alive_count -= 1;
        Ok(self.table.clear_model(model))
    }

    fn resolve(&self, term: &Term) -> EcsResult<Option<ComponentId>> {
        match term {
            Term::Type(key) => Ok(self.table.id_of_type(key.type_id())),
            Term::Id(id) if self.table.registry().is_assigned(*id) => Ok(Some(*id)),
            Term::Id(id) => Err(EcsError::UnknownComponentId(*id)),
        }
    }

    /// Models matching `filter`, as a bitset over model ids.
    ///
    /// Required types nobody ever stored empty the result; excluded ones are ignored.
    fn matching(&self, filter: &Filter) -> EcsResult<FixedBitSet> {
        let required = filter
            .required()
            .map(|term| self.resolve(term))
            .collect::<EcsResult<Vec<_>>>()?;
        let excluded = filter
            .excluded()
            .map(|term| self.resolve(term))
            .collect::<EcsResult<Vec<_>>>()?;

        let mut result = self.alive.clone();

        for id in required {
            match id.and_then(|id| self.table.column_by_id(id)) {
                Some(column) => result.intersect_with(column.members()),
                None => return Ok(FixedBitSet::new()),
            }
        }

        let mut exclusions = FixedBitSet::with_capacity(result.len());
        for column in excluded.into_iter().flatten().filter_map(|id| self.table.column_by_id(id)) {
            exclusions.union_with(column.members());
        }

        result.difference_with(&exclusions);
        Ok(result)
    }
}

/// Owns a population of models, their components and query execution.
///
/// ```ignore
/// let mut pool = Pool::new();
/// let mut sword = pool.create_named("Kokiri Sword");
/// sword.add(Token)?;
///
/// for view in pool.query(&Filter::new().with::<Token>())? {
///     println!("{}", view.get::<Name>()?);
/// }
/// ```
///
/// Views returned by the pool share its storage through a [RefCell]; holding
/// the [Ref] from [Pool::table] while writing through a view panics.
pub struct Pool {
    population: Rc<RefCell<Population>>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            population: Rc::new(RefCell::new(Population::new(config))),
        }
    }

    /// Creates a model with no components.
    pub fn create(&mut self) -> View {
        let model = self.population.borrow_mut().allocate();
        trace!(%model, "created model");
        View::new(model, Rc::downgrade(&self.population))
    }

    /// Creates a model carrying every component in `components`.
    pub fn create_with<S: ComponentSet>(&mut self, components: S) -> View {
        let model = {
            let mut population = self.population.borrow_mut();
            let model = population.allocate();
            components.insert_into(&mut population.table, model);
            model
        };

        trace!(%model, "created model with components");
        View::new(model, Rc::downgrade(&self.population))
    }

    /// Creates a model carrying a [Name].
    pub fn create_named(&mut self, name: impl Into<Name>) -> View {
        let name: Name = name.into();
        self.create_with((name,))
    }

    /// Releases the view's model and clears all of its components.
    ///
    /// Columns keep their size; the model id is never issued again.
    pub fn delete(&mut self, view: View) -> EcsResult<()> {
        self.delete_model(view.model())
    }

    pub fn delete_model(&mut self, model: Model) -> EcsResult<()> {
        let cleared = self.population.borrow_mut().release(model)?;
        trace!(%model, cleared, "deleted model");
        Ok(())
    }

    /// View of an existing model.
    pub fn fetch(&self, model: Model) -> EcsResult<View> {
        if !self.is_alive(model) {
            return Err(EcsError::NotAlive(model));
        }

        Ok(View::new(model, Rc::downgrade(&self.population)))
    }

    /// View of an existing model with copies of the components in `S` cached.
    ///
    /// Components in `S` the model lacks are left out of the cache.
    pub fn fetch_loaded<S: LoadSet>(&self, model: Model) -> EcsResult<View> {
        let population = self.population.borrow();

        if !population.is_alive(model) {
            return Err(EcsError::NotAlive(model));
        }

        let mut loaded = TypeMap::new();
        S::load_into(&population.table, model, &mut loaded);
        Ok(View::with_loaded(model, Rc::downgrade(&self.population), loaded))
    }

    /// Views over every live model matching `filter`, in ascending model order.
    ///
    /// The result is a snapshot; later writes do not change it.
    pub fn query(&self, filter: &Filter) -> EcsResult<Vec<View>> {
        Ok(self
            .query_models(filter)?
            .into_iter()
            .map(|model| View::new(model, Rc::downgrade(&self.population)))
            .collect())
    }

    /// Like [Self::query] but returns bare model ids.
    pub fn query_models(&self, filter: &Filter) -> EcsResult<Vec<Model>> {
        let matched = self.population.borrow().matching(filter)?;
        let models: Vec<Model> = matched
            .ones()
            .map(|index| Model::from_raw(index as u32))
            .collect();

        debug!(%filter, matched = models.len(), "ran query");
        Ok(models)
    }

    #[inline]
    pub fn is_alive(&self, model: Model) -> bool {
        self.population.borrow().is_alive(model)
    }

    /// Number of live models.
    #[inline]
    pub fn len(&self) -> usize {
        self.population.borrow().alive_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read access to the underlying storage.
    pub fn table(&self) -> Ref<'_, Table> {
        Ref::map(self.population.borrow(), |population| &population.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Song(u8);
    #[derive(Debug, Clone, PartialEq)]
    struct Token;

    #[test]
    fn models_are_dense_and_never_reused() {
        let mut pool = Pool::new();
        let first = pool.create();
        let second = pool.create();

        assert_eq!(first.model(), Model::from_raw(1));
        assert_eq!(second.model(), Model::from_raw(2));

        pool.delete(first).unwrap();
        let third = pool.create();
        assert_eq!(third.model(), Model::from_raw(3));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn invalid_model_is_never_alive() {
        let pool = Pool::new();
        assert!(!pool.is_alive(Model::INVALID));
        assert_eq!(pool.fetch(Model::INVALID).unwrap_err(), EcsError::NotAlive(Model::INVALID));
    }

    #[test]
    fn delete_twice_fails() {
        let mut pool = Pool::new();
        let model = pool.create().model();

        assert!(pool.delete_model(model).is_ok());
        assert_eq!(pool.delete_model(model), Err(EcsError::NotAlive(model)));
    }

    #[test]
    fn alive_set_grows_past_capacity() {
        let mut pool = Pool::with_config(PoolConfig::new().with_model_capacity(2));
        let models: Vec<_> = (0..100).map(|_| pool.create().model()).collect();

        assert_eq!(pool.len(), 100);
        assert!(models.iter().all(|&m| pool.is_alive(m)));
    }

    #[test]
    fn create_with_tuple() {
        let mut pool = Pool::new();
        let view = pool.create_with((Name::from("Epona's Song"), Song(3), Token));

        assert_eq!(view.get::<Song>(), Ok(Song(3)));
        assert_eq!(view.get::<Name>().unwrap().as_str(), "Epona's Song");
        assert!(view.has::<Token>());
    }

    #[test]
    fn unknown_raw_id_is_a_query_error() {
        let pool = Pool::new();
        let filter = Filter::new().with_id(ComponentId::from_raw(9));

        assert_eq!(
            pool.query_models(&filter),
            Err(EcsError::UnknownComponentId(ComponentId::from_raw(9)))
        );

        let invalid = Filter::new().without_id(ComponentId::INVALID);
        assert!(pool.query_models(&invalid).is_err());
    }

    #[test]
    fn empty_filter_matches_every_live_model() {
        let mut pool = Pool::new();
        let a = pool.create().model();
        let b = pool.create().model();
        let c = pool.create().model();
        pool.delete_model(b).unwrap();

        assert_eq!(pool.query_models(&Filter::new()), Ok(vec![a, c]));
    }

    #[test]
    fn table_borrow_reads_storage() {
        let mut pool = Pool::new();
        let view = pool.create_with((Song(1),));

        let table = pool.table();
        assert_eq!(table.get::<Song>(view.model()), Ok(&Song(1)));
        assert_eq!(table.id_of::<Song>(), Ok(ComponentId::from_raw(1)));
    }
}
