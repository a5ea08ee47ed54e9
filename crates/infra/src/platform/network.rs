use std::fs;
use std::path::{Path, PathBuf};

use hauth_core::NetworkMonitor;

const NET_CLASS: &str = "sys/class/net";

/// [`NetworkMonitor`] that reports connected while any non-loopback
/// interface has its link up.
///
/// Without a readable `sys/class/net` (non-Linux hosts) the link state is
/// unknown and the monitor reports connected.
#[derive(Debug, Clone)]
pub struct SysfsNetworkMonitor {
    root: PathBuf,
}

impl SysfsNetworkMonitor {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn interface_up(dir: &Path) -> bool {
        let read = |name: &str| fs::read_to_string(dir.join(name)).map(|s| s.trim().to_string());
        match read("operstate").as_deref() {
            Ok("up") => true,
            // Point-to-point links and some drivers never report a state.
            Ok("unknown") => read("carrier").is_ok_and(|carrier| carrier == "1"),
            _ => false,
        }
    }
}

impl NetworkMonitor for SysfsNetworkMonitor {
    fn is_connected(&self) -> bool {
        let entries = match fs::read_dir(self.root.join(NET_CLASS)) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::trace!(error = %err, "platform.link_state_unavailable");
                return true;
            }
        };

        let connected = entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_name() != "lo")
            .any(|entry| Self::interface_up(&entry.path()));

        if !connected {
            tracing::debug!("platform.no_link");
        }
        connected
    }
}
