//! # VLCBKit
//!
//! Message dispatch, service discovery and event consumption for VLCB bus
//! nodes.
//!
//! ## Architecture
//!
//! VLCBKit is organized as a workspace with multiple crates:
//!
//! 1. **vlcbkit-core** - Frame type, protocol constants, event keys, errors
//! 2. **vlcbkit-storage** - Persisted storage and the hashed event table
//! 3. **vlcbkit-settings** - Node configuration files
//! 4. **vlcbkit-communication** - Transports, controller and services
//! 5. **vlcbkit** - Host binary that runs a node over GridConnect on stdio

pub use vlcbkit_communication::{
    gridconnect, Controller, ControllerBuilder, ControllerError, Dispatch, EventConsumerService,
    EventHandler, GridConnectFrame, LoopbackTransport, MinimumNodeService, Mode,
    ModuleParameters, NodeIdentity, ProcessResult, Service, ServiceContext, Transport,
};
pub use vlcbkit_core::{
    modes, opcodes, params, responses, Error, EventKey, EventKind, FrameError, Result,
    ServiceDescriptor, ServiceId, TransportError, VlcbFrame,
};
pub use vlcbkit_settings::{NodeConfig, SettingsError};
pub use vlcbkit_storage::{
    EventLayout, EventSlot, EventStore, EventStoreError, FileStorage, MemoryStorage, Storage,
    StorageError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatted output on stderr, leaving stdout for bus traffic
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Node identity from configuration
pub fn node_identity(config: &NodeConfig) -> NodeIdentity {
    let mut identity = NodeIdentity::new(config.node.node_number, config.node.can_id);
    identity.heartbeat = config.node.heartbeat;
    identity
}

/// Module parameters from configuration
pub fn module_parameters(config: &NodeConfig) -> ModuleParameters {
    ModuleParameters {
        manufacturer_id: config.node.manufacturer_id,
        minor_version: config.node.minor_version as u8,
        module_id: config.node.module_id,
        max_events: config.events.max_events,
        num_evs: config.events.num_evs,
        major_version: config.node.major_version,
        name: config.module_name_bytes(),
        ..ModuleParameters::default()
    }
}

/// Open the event table described by `config`.
///
/// Uses the configured image file when there is one, otherwise a volatile
/// in-memory image.
pub fn open_event_store(config: &NodeConfig) -> anyhow::Result<EventStore> {
    let layout = EventLayout::new(config.events.max_events, config.events.num_evs)
        .with_base_address(config.storage.base_address);
    let size = layout.required_size();

    let storage: Box<dyn Storage> = match &config.storage.image_path {
        Some(path) => Box::new(FileStorage::open(path, size)?),
        None => {
            tracing::warn!("No storage image configured; learned events will not persist");
            Box::new(MemoryStorage::new(size))
        }
    };

    let store = EventStore::open(storage, layout)?;
    tracing::info!(
        "Event table: {} of {} slots in use",
        store.event_count(),
        store.max_events()
    );
    Ok(store)
}

/// Assemble a node: minimum node service first, then the event consumer.
pub fn build_controller(
    config: &NodeConfig,
    transport: impl Transport + 'static,
    consumer: EventConsumerService,
) -> anyhow::Result<Controller> {
    config.validate()?;

    let controller = Controller::builder(transport)
        .identity(node_identity(config))
        .parameters(module_parameters(config))
        .event_store(open_event_store(config)?)
        .service(MinimumNodeService::new())
        .service(consumer)
        .build()?;

    Ok(controller)
}
