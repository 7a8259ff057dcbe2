//! Framework assembly.
//!
//! [`Framework`] ties a controller loader to the compiler. Build one with
//! [`Framework::builder`]:
//!
//! ```rust,ignore
//! let metadata = Arc::new(MetadataStore::new());
//! metadata.register::<OrdersController>();
//!
//! let framework = Framework::builder().with_metadata(metadata).build();
//! let documents = framework.create_pipeline_definitions().await?;
//! ```

use crate::{
    compiler::PipelineCompiler, document::PipelineDocument, error::FrameworkError,
    factory::RecipeFactory, loaders::RegisteredControllerLoader, options::CompilerOptions,
};
use kiln_core::{Container, ControllerLoader, MetadataStore};
use std::sync::Arc;

/// Loads controllers and compiles them into pipeline documents.
pub struct Framework {
    loader: Arc<dyn ControllerLoader>,
    compiler: PipelineCompiler,
    factory: Arc<RecipeFactory>,
}

impl Framework {
    /// Start building a framework.
    pub fn builder() -> FrameworkBuilder {
        FrameworkBuilder::default()
    }

    /// The factory shared by every activation unit this framework compiles.
    pub fn factory(&self) -> &Arc<RecipeFactory> {
        &self.factory
    }

    /// The compiler in use.
    pub fn compiler(&self) -> &PipelineCompiler {
        &self.compiler
    }

    /// Load the candidates and compile them.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Load`] when the loader fails; nothing is compiled.
    pub async fn create_pipeline_definitions(&self) -> Result<Vec<PipelineDocument>, FrameworkError> {
        let candidates = self
            .loader
            .load_controllers()
            .await
            .map_err(FrameworkError::Load)?;
        tracing::debug!(candidates = candidates.len(), "loaded controller candidates");
        Ok(self.compiler.compile(&candidates))
    }
}

/// Builder for [`Framework`].
///
/// Defaults: a fresh container, a fresh metadata store, default compiler
/// options and a [`RegisteredControllerLoader`] over the metadata store.
#[derive(Default)]
pub struct FrameworkBuilder {
    loader: Option<Arc<dyn ControllerLoader>>,
    container: Option<Arc<Container>>,
    metadata: Option<Arc<MetadataStore>>,
    options: CompilerOptions,
}

impl FrameworkBuilder {
    /// Use a specific controller loader.
    pub fn with_controller_loader(mut self, loader: impl ControllerLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Use an existing container.
    pub fn with_container(mut self, container: Arc<Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// Use an existing metadata store.
    pub fn with_metadata(mut self, metadata: Arc<MetadataStore>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the compiler options.
    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the framework.
    pub fn build(self) -> Framework {
        let metadata = self.metadata.unwrap_or_default();
        let factory = Arc::new(RecipeFactory::new(self.container.unwrap_or_default()));
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(RegisteredControllerLoader::new(Arc::clone(&metadata))));

        Framework {
            loader,
            compiler: PipelineCompiler::with_options(metadata, Arc::clone(&factory), self.options),
            factory,
        }
    }
}
