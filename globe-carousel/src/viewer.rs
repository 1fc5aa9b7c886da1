//! Viewer bootstrap: load the SDK, create the viewport, start cycling.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::catalog::{Catalog, NoRepeatSelector};
use crate::config::ViewerConfig;
use crate::cycling::CyclingController;
use crate::loader::{load_with_retry, MapError, MapLoader};
use crate::viewport::{DriverError, ViewportBinding, ViewportDriver};

/// Creates the viewport once the SDK is available.
pub trait ViewportFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn ViewportDriver>, DriverError>;
}

/// Errors that prevent a viewer from starting.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("map SDK unavailable: {0}")]
    Load(#[from] MapError),

    #[error("viewport creation failed: {0}")]
    Viewport(#[from] DriverError),
}

impl ViewerError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ViewerError::Load(e) => e.kind.user_message(),
            ViewerError::Viewport(_) => "The map could not be displayed.",
        }
    }
}

/// A running viewer: a live viewport with a cycling controller attached.
#[derive(Debug)]
pub struct MapViewer {
    loader: MapLoader,
    controller: Arc<CyclingController>,
}

impl MapViewer {
    /// Start a viewer over the built-in catalog.
    pub async fn start(
        config: &ViewerConfig,
        loader: MapLoader,
        factory: &dyn ViewportFactory,
    ) -> Result<Self, ViewerError> {
        let catalog = Arc::new(Catalog::builtin().clone());
        Self::start_with_catalog(config, catalog, loader, factory).await
    }

    /// Start a viewer over `catalog`.
    ///
    /// The viewport is only created after the loader succeeds. Cycling
    /// starts immediately when `auto_start` is configured.
    pub async fn start_with_catalog(
        config: &ViewerConfig,
        catalog: Arc<Catalog>,
        loader: MapLoader,
        factory: &dyn ViewportFactory,
    ) -> Result<Self, ViewerError> {
        let report = catalog.validate_dataset();
        if !report.is_valid {
            error!(errors = ?report.errors, "Catalog failed validation");
        } else if !report.errors.is_empty() {
            warn!(issues = ?report.errors, "Catalog has issues");
        }

        if let Err(e) = load_with_retry(&loader, &loader.config().retry).await {
            error!(kind = %e.kind, "Viewer cannot start without the map SDK");
            return Err(e.into());
        }

        let driver = factory.create()?;
        let element = driver.element();
        if element.is_none() {
            warn!("Viewport has no interaction element, user input will not pause cycling");
        }

        let selector = NoRepeatSelector::new(catalog, config.cycling.recent_bound);
        let controller =
            CyclingController::new(config.cycling.clone(), selector, ViewportBinding::new(driver));
        controller.bind(element);

        info!(
            locations = report.total_count,
            phase = %controller.phase(),
            "Viewer started"
        );
        Ok(Self { loader, controller })
    }

    pub fn controller(&self) -> &Arc<CyclingController> {
        &self.controller
    }

    pub fn loader(&self) -> &MapLoader {
        &self.loader
    }

    /// Stop cycling and detach from the viewport.
    pub fn shutdown(&self) {
        self.controller.shutdown();
        info!("Viewer shut down");
    }
}
