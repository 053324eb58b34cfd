use std::{
    any::{type_name, Any},
    fmt, mem,
};

use crate::DowncastError;

/// The working value of a pipeline with its concrete type erased.
///
/// Steps downcast it back to the type they were built for, so a single pipeline can hold
/// middleware of different input and output types.
#[doc(hidden)]
pub struct DynContext {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl DynContext {
    pub(crate) fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn downcast_mut<T: 'static>(&mut self) -> Result<&mut T, DowncastError> {
        let from = self.type_name;
        self.value.downcast_mut::<T>().ok_or(DowncastError {
            from,
            to: type_name::<T>(),
        })
    }

    pub(crate) fn downcast<T: 'static>(self) -> Result<T, DowncastError> {
        let from = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| DowncastError {
                from,
                to: type_name::<T>(),
            })
    }

    /// Moves the value out, leaving a unit placeholder behind.
    ///
    /// Only used by steps that always produce a replacement, so the placeholder is never observed.
    pub(crate) fn take<T: 'static>(&mut self) -> Result<T, DowncastError> {
        if !self.value.is::<T>() {
            return Err(DowncastError {
                from: self.type_name,
                to: type_name::<T>(),
            });
        }

        mem::replace(self, DynContext::new(())).downcast()
    }
}

impl fmt::Debug for DynContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynContext").field(&self.type_name()).finish()
    }
}
