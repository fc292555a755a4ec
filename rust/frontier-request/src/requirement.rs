use std::any::{Any, TypeId, type_name};
use std::fmt;

/// A single precondition, tagged with the type of its payload.
///
/// Any `'static + Send + Sync` value can serve as a requirement. The type is
/// the tag: a party discharging a requirement asks for it by type, and only
/// code that can name the type can take it out.
pub struct Requirement {
    type_id: TypeId,
    type_name: &'static str,
    payload: Box<dyn Any + Send + Sync>,
}

impl Requirement {
    /// Wrap `payload` as a requirement tagged with its own type.
    pub fn new<T>(payload: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            payload: Box::new(payload),
        }
    }

    /// The payload type's name, for diagnostics only.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the payload has type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrow the payload if it has type `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Take the payload out if it has type `T`, otherwise hand the
    /// requirement back.
    pub fn into_payload<T: Any>(self) -> Result<T, Self> {
        if !self.is::<T>() {
            return Err(self);
        }

        let Requirement {
            type_id,
            type_name,
            payload,
        } = self;

        payload.downcast::<T>().map(|boxed| *boxed).map_err(|payload| Requirement {
            type_id,
            type_name,
            payload,
        })
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Requirement").field(&self.type_name).finish()
    }
}
