use crate::component::{Component, ComponentId, TypeKey};
use std::{collections::BTreeSet, fmt::Display};

/// One side of a [Filter] condition: a component type or a raw column id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Type(TypeKey),
    Id(ComponentId),
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Type(key) => write!(f, "{key}"),
            Term::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Set-membership predicate over component types.
///
/// A model matches when it holds every `with` component and none of the
/// `without` components. Clones are fully independent.
///
/// ```ignore
/// let unplaced = Filter::new().with::<Token>().without::<Inhabits>();
/// let songs = unplaced.combine(&Filter::new().with::<Song>());
/// let views = pool.query(&songs)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    with_all: BTreeSet<Term>,
    without_any: BTreeSet<Term>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with<C: Component>(mut self) -> Self {
        self.require::<C>();
        self
    }

    #[inline]
    pub fn without<C: Component>(mut self) -> Self {
        self.exclude::<C>();
        self
    }

    #[inline]
    pub fn with_id(mut self, id: ComponentId) -> Self {
        self.with_all.insert(Term::Id(id));
        self
    }

    #[inline]
    pub fn without_id(mut self, id: ComponentId) -> Self {
        self.without_any.insert(Term::Id(id));
        self
    }

    pub fn require<C: Component>(&mut self) -> &mut Self {
        self.with_all.insert(Term::Type(TypeKey::of::<C>()));
        self
    }

    pub fn exclude<C: Component>(&mut self) -> &mut Self {
        self.without_any.insert(Term::Type(TypeKey::of::<C>()));
        self
    }

    /// Conjunction of both filters. The result never matches more than either input.
    pub fn combine(&self, other: &Filter) -> Filter {
        Filter {
            with_all: self.with_all.union(&other.with_all).copied().collect(),
            without_any: self.without_any.union(&other.without_any).copied().collect(),
        }
    }

    #[inline]
    pub fn required(&self) -> impl Iterator<Item = &Term> {
        self.with_all.iter()
    }

    #[inline]
    pub fn excluded(&self) -> impl Iterator<Item = &Term> {
        self.without_any.iter()
    }

    /// True when the filter matches every live model.
    pub fn is_empty(&self) -> bool {
        self.with_all.is_empty() && self.without_any.is_empty()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn list(f: &mut std::fmt::Formatter<'_>, terms: &BTreeSet<Term>) -> std::fmt::Result {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{term}")?;
            }
            Ok(())
        }

        f.write_str("with(")?;
        list(f, &self.with_all)?;
        f.write_str(") without(")?;
        list(f, &self.without_any)?;
        f.write_str(")")
    }
}
