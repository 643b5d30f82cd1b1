use crate::{model::Model, storage::Table, utils::TypeMap};
use modelpool_macros::all_tuples;
use std::{
    any::{Any, TypeId},
    fmt::Display,
    ops::Deref,
};

/// Anything attached to a [Model].
///
/// Every `'static` type qualifies except bare strings (`String`, `&'static str`),
/// which the table refuses outright. Wrap text in [Name] or a similar newtype.
pub trait Component: 'static {}
impl<T: 'static> Component for T {}

/// Dense index of a component type's column inside a [Table].
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl ComponentId {
    /// Slot 0 of every table, never bound to a type.
    pub const INVALID: ComponentId = ComponentId(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(&self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub const fn is_invalid(&self) -> bool {
        self.0 == Self::INVALID.0
    }
}

/// Runtime descriptor of a component type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

impl TypeKey {
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Human readable label for a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A tuple of components stored together, e.g. when creating a model.
pub trait ComponentSet: 'static {
    #[doc(hidden)]
    fn insert_into(self, table: &mut Table, model: Model);
}

/// A tuple of component types a [View](crate::view::View) can preload.
pub trait LoadSet: 'static {
    #[doc(hidden)]
    fn load_into(table: &Table, model: Model, loaded: &mut TypeMap<Box<dyn Any>>);
}

macro_rules! impl_component_set {
    ($($c:ident),*) => {
        impl<$($c: Component),*> ComponentSet for ($($c,)*) {
            #[allow(non_snake_case)]
            fn insert_into(self, table: &mut Table, model: Model) {
                let ($($c,)*) = self;
                $(table.set(model, $c);)*
            }
        }

        impl<$($c: Component + Clone),*> LoadSet for ($($c,)*) {
            fn load_into(table: &Table, model: Model, loaded: &mut TypeMap<Box<dyn Any>>) {
                $(
                    if let Ok(value) = table.get::<$c>(model) {
                        loaded.insert::<$c>(Box::new(value.clone()));
                    }
                )*
            }
        }
    };
}

all_tuples!(impl_component_set, 1, 8);
