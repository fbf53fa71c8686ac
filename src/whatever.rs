use std::{
    any::Any,
    fmt::{Debug, Display},
    ops::Deref,
};

/// An owned, type-erased [`Whatever`].
///
/// Used wherever callers hand values across the shared group boundary
/// without the engine knowing their type: positional arguments, tag values,
/// metadata values and helper return values.
pub type BoxedWhatever = Box<dyn Whatever>;

pub trait Whatever: Any + Debug + Display + Send + Sync + 'static {
    fn clone_whatever(&self) -> BoxedWhatever;
    fn eq_whatever(&self, other: &dyn Whatever) -> bool;
}

impl<T> Whatever for T
where
    T: Any + Debug + Display + Clone + Eq + Send + Sync,
{
    fn clone_whatever(&self) -> BoxedWhatever {
        Box::new(self.clone())
    }

    fn eq_whatever(&self, other: &dyn Whatever) -> bool {
        (other as &dyn Any)
            .downcast_ref::<T>()
            .map(|other| other == self)
            .unwrap_or(false)
    }
}

impl dyn Whatever {
    pub fn is<T: Whatever>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    pub fn downcast_ref<T: Whatever>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }
}

/// Box a value as a [`BoxedWhatever`].
///
/// Passing something that already is a [`BoxedWhatever`] returns it as is
/// instead of boxing it a second time.
pub fn boxed<T: Whatever>(value: T) -> BoxedWhatever {
    match (&value as &dyn Any).downcast_ref::<BoxedWhatever>() {
        Some(already) => already.clone(),
        None => Box::new(value),
    }
}

impl Clone for BoxedWhatever {
    fn clone(&self) -> Self {
        (**self).clone_whatever()
    }
}

impl PartialEq for BoxedWhatever {
    fn eq(&self, other: &Self) -> bool {
        (**self).eq_whatever(other.deref())
    }
}

impl Eq for BoxedWhatever {}
