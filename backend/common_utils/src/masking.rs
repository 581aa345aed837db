//! Secret wrappers and masked serialization.
//!
//! Credentials and gateway tokens travel through the workspace as
//! [`Secret`] values: their `Debug`/`Display` output is always redacted,
//! while plain serde serialization still produces the real value so wire
//! payloads can be built from them. [`masked_serialize`] flips secrets to
//! their redaction marker instead, which is what the outgoing-request log
//! lines use.

use std::{cell::Cell, fmt, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Controls how a redacted value is rendered.
pub trait Strategy<T> {
    fn fmt(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Default redaction strategy: print the inner type name, never the value.
#[derive(Debug)]
pub enum WithType {}

impl<T> Strategy<T> for WithType {
    fn fmt(_value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*** {} ***", std::any::type_name::<T>())
    }
}

/// A value that must not leak through logs.
pub struct Secret<T, S = WithType>
where
    S: Strategy<T>,
{
    inner: T,
    strategy: PhantomData<S>,
}

impl<T, S: Strategy<T>> Secret<T, S> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            strategy: PhantomData,
        }
    }
}

impl<T, S: Strategy<T>> From<T> for Secret<T, S> {
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}

impl<T: Clone, S: Strategy<T>> Clone for Secret<T, S> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<T: PartialEq, S: Strategy<T>> PartialEq for Secret<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Eq, S: Strategy<T>> Eq for Secret<T, S> {}

impl<T: std::hash::Hash, S: Strategy<T>> std::hash::Hash for Secret<T, S> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl<T: Default, S: Strategy<T>> Default for Secret<T, S> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, S: Strategy<T>> fmt::Debug for Secret<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        S::fmt(&self.inner, f)
    }
}

impl<T, S: Strategy<T>> fmt::Display for Secret<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        S::fmt(&self.inner, f)
    }
}

/// Borrow the inner value without consuming the secret.
pub trait PeekInterface<T> {
    fn peek(&self) -> &T;
}

/// Consume the secret and hand back the inner value.
pub trait ExposeInterface<T> {
    fn expose(self) -> T;
}

impl<T, S: Strategy<T>> PeekInterface<T> for Secret<T, S> {
    fn peek(&self) -> &T {
        &self.inner
    }
}

impl<T, S: Strategy<T>> ExposeInterface<T> for Secret<T, S> {
    fn expose(self) -> T {
        self.inner
    }
}

impl<T, S: Strategy<T>> ExposeInterface<Option<T>> for Option<Secret<T, S>> {
    fn expose(self) -> Option<T> {
        self.map(ExposeInterface::expose)
    }
}

thread_local! {
    static REDACT_SECRETS: Cell<bool> = const { Cell::new(false) };
}

struct RedactionGuard(bool);

impl RedactionGuard {
    fn activate() -> Self {
        let previous = REDACT_SECRETS.with(|flag| flag.replace(true));
        Self(previous)
    }
}

impl Drop for RedactionGuard {
    fn drop(&mut self) {
        let previous = self.0;
        REDACT_SECRETS.with(|flag| flag.set(previous));
    }
}

impl<T: Serialize, S: Strategy<T>> Serialize for Secret<T, S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        if REDACT_SECRETS.with(Cell::get) {
            serializer.serialize_str(&format!("*** {} ***", std::any::type_name::<T>()))
        } else {
            self.inner.serialize(serializer)
        }
    }
}

impl<'de, T: Deserialize<'de>, S: Strategy<T>> Deserialize<'de> for Secret<T, S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::new)
    }
}

/// Serialize `value` with every [`Secret`] replaced by its redaction marker.
pub fn masked_serialize<T: Serialize>(value: &T) -> Result<serde_json::Value, serde_json::Error> {
    let _guard = RedactionGuard::activate();
    serde_json::to_value(value)
}

/// A JSON value holding sensitive material, such as stored gateway tokens.
pub type SecretSerdeValue = Secret<serde_json::Value>;

/// A header or field value that is either sensitive or plain.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Maskable<T> {
    Masked(Secret<T>),
    Normal(T),
}

impl<T> Maskable<T> {
    pub fn new_masked(item: Secret<T>) -> Self {
        Self::Masked(item)
    }

    pub fn new_normal(item: T) -> Self {
        Self::Normal(item)
    }

    pub fn is_masked(&self) -> bool {
        matches!(self, Self::Masked(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Masked(secret) => secret.expose(),
            Self::Normal(value) => value,
        }
    }
}

impl<T: Serialize> Serialize for Maskable<T> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        match self {
            Self::Masked(secret) => secret.serialize(serializer),
            Self::Normal(value) => value.serialize(serializer),
        }
    }
}

impl<T> From<T> for Maskable<T> {
    fn from(value: T) -> Self {
        Self::Normal(value)
    }
}

impl<T> From<Secret<T>> for Maskable<T> {
    fn from(value: Secret<T>) -> Self {
        Self::Masked(value)
    }
}

/// Conversion into a masked [`Maskable`] value.
pub trait Mask {
    type Output;

    fn into_masked(self) -> Self::Output;
}

impl Mask for String {
    type Output = Maskable<String>;

    fn into_masked(self) -> Self::Output {
        Maskable::Masked(Secret::new(self))
    }
}

impl Mask for Secret<String> {
    type Output = Maskable<String>;

    fn into_masked(self) -> Self::Output {
        Maskable::Masked(self)
    }
}

/// Object-safe serialization used for request bodies, so the HTTP layer can
/// produce both the wire payload and a redacted copy for diagnostics.
pub trait ErasedMaskSerialize: Send {
    fn masked_serialize(&self) -> Result<serde_json::Value, serde_json::Error>;
    fn full_serialize(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T: Serialize + Send> ErasedMaskSerialize for T {
    fn masked_serialize(&self) -> Result<serde_json::Value, serde_json::Error> {
        masked_serialize(self)
    }

    fn full_serialize(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl<'a> Serialize for (dyn ErasedMaskSerialize + Send + 'a) {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        use serde::ser::Error;

        self.full_serialize()
            .map_err(Se::Error::custom)?
            .serialize(serializer)
    }
}
