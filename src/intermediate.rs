use std::mem;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DynContext;

/// Name of the payload field, both on [`Intermediate`] and in its JSON form.
pub const INTERMEDIATE_KEY: &str = "intermediate";

/// Carries a payload through an [`IntermediatePipeline`](crate::IntermediatePipeline) alongside
/// companion data that should not be mixed into the payload itself.
///
/// Middleware receive the whole wrapper. The value they return replaces [`Intermediate::intermediate`]
/// and nothing else, so anything placed in `companion` (handles to collaborating resources,
/// request metadata, ...) is available to every step.
///
/// ```
/// use middleware_pipeline::Intermediate;
///
/// #[derive(Default)]
/// struct Http {
///     request_id: u32,
/// }
///
/// let ctx = Intermediate::new("body", Http { request_id: 7 });
/// assert_eq!(ctx.intermediate, "body");
/// assert_eq!(ctx.companion.request_id, 7);
/// ```
///
/// The companion is flattened when serialized, so the serialized form of a wrapper is always
/// recognized by [`is_intermediate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intermediate<T, C = ()> {
    pub intermediate: T,
    #[serde(flatten)]
    pub companion: C,
}

impl<T, C: Default> Intermediate<T, C> {
    /// Wraps `value` with a default companion.
    pub fn of(value: T) -> Self {
        Self {
            intermediate: value,
            companion: C::default(),
        }
    }
}

impl<T, C> Intermediate<T, C> {
    pub fn new(value: T, companion: C) -> Self {
        Self {
            intermediate: value,
            companion,
        }
    }

    pub fn into_inner(self) -> T {
        self.intermediate
    }

    pub fn into_parts(self) -> (T, C) {
        (self.intermediate, self.companion)
    }

    /// Replaces the payload, keeping the companion.
    pub fn map<U>(self, func: impl FnOnce(T) -> U) -> Intermediate<U, C> {
        Intermediate {
            intermediate: func(self.intermediate),
            companion: self.companion,
        }
    }

    /// See [`is_intermediate`].
    pub fn is_intermediate(value: &Value) -> bool {
        is_intermediate(value)
    }
}

impl Intermediate<Value, Map<String, Value>> {
    /// Recognizes an ad-hoc JSON context structurally.
    ///
    /// An object exposing the `intermediate` key is split into its payload and the remaining fields,
    /// which become the companion. Any other value becomes the payload of a new wrapper.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut fields) if fields.contains_key(INTERMEDIATE_KEY) => {
                let payload = fields.remove(INTERMEDIATE_KEY).unwrap_or_default();
                Self::new(payload, fields)
            }
            value => Self::of(value),
        }
    }

    /// Inverse of [`Intermediate::from_json`].
    pub fn into_json(self) -> Value {
        let mut fields = self.companion;
        fields.insert(INTERMEDIATE_KEY.into(), self.intermediate);
        Value::Object(fields)
    }
}

impl<T, C: Default> From<T> for Intermediate<T, C> {
    fn from(value: T) -> Self {
        Self::of(value)
    }
}

/// Structural test for an intermediate: a JSON object exposing the `intermediate` key.
///
/// How the value was produced does not matter, `{"intermediate": 1, "user": "..."}` built by hand
/// counts the same as a serialized [`Intermediate`].
pub fn is_intermediate(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|fields| fields.contains_key(INTERMEDIATE_KEY))
}

/// Splits a freshly wrapped JSON context that already exposes the `intermediate` key, so it is
/// not wrapped a second time. Other working values are left alone.
pub(crate) fn recognize(ctx: &mut DynContext) {
    if let Ok(wrapper) = ctx.downcast_mut::<Intermediate<Value, Map<String, Value>>>() {
        if wrapper.companion.is_empty() && is_intermediate(&wrapper.intermediate) {
            let value = mem::take(&mut wrapper.intermediate);
            *wrapper = Intermediate::from_json(value);
        }
    }
}
