use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use showcase_core::{BackendLabel, CacheValue, Raw, ShowcaseKey, ShowcaseRecord};

use crate::{BackendError, format::JsonFormat};

pub type BackendResult<T> = Result<T, BackendError>;

/// Raw storage contract of a cache tier.
///
/// Implementations store opaque bytes together with their absolute
/// expiration. A value whose expiration has passed must read back as `None`.
#[async_trait]
pub trait Backend: Sync + Send {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>>;

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()>;

    /// Returns the label of this backend for logs and metrics.
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }

    fn value_format(&self) -> &JsonFormat {
        &JsonFormat
    }
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Box<B> {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &JsonFormat {
        (**self).value_format()
    }
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &JsonFormat {
        (**self).value_format()
    }
}

/// A tier that may be switched off by configuration.
///
/// `None` behaves as an always-empty store: reads miss and writes are
/// accepted and dropped.
#[async_trait]
impl<B: Backend> Backend for Option<B> {
    async fn read(&self, key: &ShowcaseKey) -> BackendResult<Option<CacheValue<Raw>>> {
        match self {
            Some(backend) => backend.read(key).await,
            None => Ok(None),
        }
    }

    async fn write(&self, key: &ShowcaseKey, value: CacheValue<Raw>) -> BackendResult<()> {
        match self {
            Some(backend) => backend.write(key, value).await,
            None => Ok(()),
        }
    }

    fn label(&self) -> BackendLabel {
        match self {
            Some(backend) => backend.label(),
            None => BackendLabel::new_static("disabled"),
        }
    }
}

/// Structural check a decoded value must pass before it is trusted.
///
/// Values that decode but are not admissible are treated as absent.
pub trait Admissible {
    fn admissible(&self, key: &ShowcaseKey) -> bool;
}

impl<M> Admissible for ShowcaseRecord<M> {
    fn admissible(&self, key: &ShowcaseKey) -> bool {
        !self.is_empty() && &self.date == key.date()
    }
}

/// Typed operations over a [`Backend`].
///
/// `get` decodes with the backend's value format and drops values that fail
/// [`Admissible`]; `set` encodes and writes.
pub trait CacheBackend: Backend {
    fn get<T>(
        &self,
        key: &ShowcaseKey,
    ) -> impl Future<Output = BackendResult<Option<CacheValue<T>>>> + Send
    where
        T: DeserializeOwned + Admissible + Send,
    {
        async move {
            match self.read(key).await? {
                Some(value) => decode(self.value_format(), key, value),
                None => Ok(None),
            }
        }
    }

    fn set<T>(
        &self,
        key: &ShowcaseKey,
        value: &CacheValue<T>,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let raw = self.value_format().serialize(value.data())?;
            self.write(key, CacheValue::new(raw, value.expire())).await
        }
    }
}

impl<B: Backend + ?Sized> CacheBackend for B {}

pub(crate) fn decode<T>(
    format: &JsonFormat,
    key: &ShowcaseKey,
    value: CacheValue<Raw>,
) -> BackendResult<Option<CacheValue<T>>>
where
    T: DeserializeOwned + Admissible,
{
    let (expire, raw) = value.into_parts();
    let data: T = format.deserialize(&raw)?;
    if data.admissible(key) {
        Ok(Some(CacheValue::new(data, expire)))
    } else {
        tracing::debug!(key = %key, "discarding inadmissible cached value");
        Ok(None)
    }
}
