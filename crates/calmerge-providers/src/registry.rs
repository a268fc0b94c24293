//! Provider type to adapter resolution.

use std::sync::Arc;

use calmerge_core::SourceKind;

use crate::adapter::SourceAdapter;
use crate::canvas::CanvasAdapter;
use crate::config::ProviderSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::google::GoogleAdapter;
use crate::ical::IcalAdapter;

/// Holds one adapter per implemented provider type.
#[derive(Clone)]
pub struct AdapterRegistry {
    google: Arc<dyn SourceAdapter>,
    canvas: Arc<dyn SourceAdapter>,
    ical: Arc<dyn SourceAdapter>,
}

impl AdapterRegistry {
    /// Builds the HTTP-backed adapters from `settings`.
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self {
            google: Arc::new(GoogleAdapter::new(settings)?),
            canvas: Arc::new(CanvasAdapter::new(settings)?),
            ical: Arc::new(IcalAdapter::new(settings)?),
        })
    }

    /// Builds a registry from explicit adapters.
    pub fn with_adapters(
        google: Arc<dyn SourceAdapter>,
        canvas: Arc<dyn SourceAdapter>,
        ical: Arc<dyn SourceAdapter>,
    ) -> Self {
        Self {
            google,
            canvas,
            ical,
        }
    }

    /// Returns the adapter for `kind`.
    ///
    /// # Errors
    ///
    /// Returns an `UnsupportedProvider` error for types without an adapter.
    pub fn resolve(&self, kind: SourceKind) -> ProviderResult<Arc<dyn SourceAdapter>> {
        match kind {
            SourceKind::Google => Ok(Arc::clone(&self.google)),
            SourceKind::Canvas => Ok(Arc::clone(&self.canvas)),
            SourceKind::Ical => Ok(Arc::clone(&self.ical)),
            SourceKind::Blackboard
            | SourceKind::Gclassroom
            | SourceKind::Supabase
            | SourceKind::Todowork => Err(ProviderError::unsupported(kind)),
        }
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("google", &self.google.name())
            .field("canvas", &self.canvas.name())
            .field("ical", &self.ical.name())
            .finish()
    }
}
