//! Tool id to widget mapping.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::{
    Base64Codec, ColumnarDecoder, ColumnarViewer, CommandRenderer, CsvConverter, DiagramRenderer, DiagramViewer,
    DiffChecker, GuidGenerator, JsonBeautifier, ListenerSettings, MessageListener, MessageSender, MessagingForm,
    MockColumnarDecoder, PageSize, Placeholder, Sha256Hasher, Widget,
};
use crate::catalog::ToolDescriptor;
use crate::environment::EnvironmentRegistry;
use crate::storage::{SharedStore, ToolConfigStore};

/// The widget kinds devhub knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Json,
    Base64,
    Sha256,
    Guid,
    Diff,
    Sender,
    Listener,
    Csv,
    Diagram,
    Columnar,
}

impl ToolKind {
    pub fn all() -> &'static [ToolKind] {
        &[
            Self::Json,
            Self::Guid,
            Self::Sha256,
            Self::Base64,
            Self::Diff,
            Self::Sender,
            Self::Listener,
            Self::Csv,
            Self::Diagram,
            Self::Columnar,
        ]
    }

    /// Catalog id a kind is registered under by default.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Json => "json-beautifier",
            Self::Guid => "guid-generator",
            Self::Sha256 => "sha256-hash",
            Self::Base64 => "base64-encoder",
            Self::Diff => "diff-checker",
            Self::Sender => "servicebus-sender",
            Self::Listener => "servicebus-listener",
            Self::Csv => "csv-to-excel",
            Self::Diagram => "mermaid-viewer",
            Self::Columnar => "parquet-viewer",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.id() == id)
    }
}

/// Shared services widgets are built with.
#[derive(Clone)]
pub struct WidgetContext {
    pub environments: EnvironmentRegistry,
    pub configs: ToolConfigStore,
    pub renderer: Arc<dyn DiagramRenderer>,
    pub decoder: Arc<dyn ColumnarDecoder>,
    pub listener: ListenerSettings,
    pub page_size: PageSize,
}

impl WidgetContext {
    /// Context over `store` with the default renderer and decoder.
    pub fn new(store: SharedStore) -> Self {
        Self {
            environments: EnvironmentRegistry::new(store.clone()),
            configs: ToolConfigStore::new(store),
            renderer: Arc::new(CommandRenderer::new("mmdc")),
            decoder: Arc::new(MockColumnarDecoder),
            listener: ListenerSettings::default(),
            page_size: PageSize::Fifty,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn DiagramRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn ColumnarDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_listener(mut self, settings: ListenerSettings) -> Self {
        self.listener = settings;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.configs = self.configs.with_capacity(capacity);
        self
    }

    fn form(&self, tool_id: &str) -> MessagingForm {
        MessagingForm::new(tool_id, self.configs.clone(), self.environments.clone())
    }
}

/// Builds widgets for catalog entries.
pub struct ToolFactory {
    registry: HashMap<String, ToolKind>,
    context: WidgetContext,
}

impl ToolFactory {
    /// Factory with every built-in kind registered under its default id.
    pub fn new(context: WidgetContext) -> Self {
        let registry = ToolKind::all().iter().map(|k| (k.id().to_string(), *k)).collect();
        Self { registry, context }
    }

    pub fn context(&self) -> &WidgetContext {
        &self.context
    }

    /// Map another id onto a known kind. A later registration wins.
    pub fn register(&mut self, id: impl Into<String>, kind: ToolKind) {
        let id = id.into();
        debug!("Registering tool id {} as {:?}", id, kind);
        self.registry.insert(id, kind);
    }

    pub fn kind_for(&self, id: &str) -> Option<ToolKind> {
        self.registry.get(id).copied()
    }

    /// Build the widget for `descriptor`; unknown ids get a placeholder.
    pub fn create(&self, descriptor: &ToolDescriptor) -> Widget {
        let descriptor = descriptor.clone();
        let Some(kind) = self.kind_for(&descriptor.id) else {
            debug!("No widget for {}, using placeholder", descriptor.id);
            return Widget::Placeholder(Placeholder::new(descriptor));
        };

        let ctx = &self.context;
        match kind {
            ToolKind::Json => Widget::Json(JsonBeautifier::new(descriptor)),
            ToolKind::Base64 => Widget::Base64(Base64Codec::new(descriptor)),
            ToolKind::Sha256 => Widget::Hash(Sha256Hasher::new(descriptor)),
            ToolKind::Guid => Widget::Guid(GuidGenerator::new(descriptor)),
            ToolKind::Diff => Widget::Diff(DiffChecker::new(descriptor)),
            ToolKind::Csv => Widget::Csv(CsvConverter::new(descriptor)),
            ToolKind::Diagram => Widget::Diagram(DiagramViewer::new(descriptor, ctx.renderer.clone())),
            ToolKind::Columnar => {
                Widget::Columnar(ColumnarViewer::new(descriptor, ctx.decoder.clone(), ctx.page_size))
            }
            ToolKind::Sender => {
                let form = ctx.form(&descriptor.id);
                Widget::Sender(MessageSender::new(descriptor, form))
            }
            ToolKind::Listener => {
                let form = ctx.form(&descriptor.id);
                Widget::Listener(MessageListener::new(descriptor, form, ctx.listener))
            }
        }
    }
}
