//! Device metadata and link state read from the Linux sysfs tree.
//!
//! Every path is resolved under a configurable root so tests can point the
//! readers at a fixture directory.

mod device;
mod network;

pub use device::SysfsDeviceInfo;
pub use network::SysfsNetworkMonitor;
