// ============================================================================
// SERVICES - SOLO comunicación con el exterior (store remoto, red, archivos)
// ============================================================================

pub mod firebase_store;
pub mod network_monitor;
pub mod remote_store;
pub mod sync_service;
pub mod transfer_service;

#[cfg(test)]
pub mod memory_store;

pub use firebase_store::FirebaseStore;
pub use network_monitor::{NetworkMonitor, NetworkStatus};
pub use remote_store::{RemoteStore, Subscription};
pub use sync_service::{ConnectOutcome, SyncController};
