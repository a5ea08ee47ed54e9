//! Port interfaces for device identity sources
//!
//! These traits define the boundaries between identity resolution and the
//! OS facilities that report device identifiers.

/// Runs the external identity-probe command once.
pub trait IdentityProbe: Send + Sync {
    /// First line of the probe's standard output, or `None` on non-zero
    /// exit, I/O failure, or no output. Never retries.
    fn probe(&self) -> Option<String>;
}

/// Device metadata and OS-assigned identifiers
pub trait DeviceInfoProvider: Send + Sync {
    /// Hardware manufacturer as reported by the OS
    fn manufacturer(&self) -> Option<String>;

    /// Hardware model as reported by the OS
    fn model(&self) -> Option<String>;

    /// OS-reported hardware serial; may be the `unknown` sentinel
    fn os_serial(&self) -> Option<String>;

    /// Secure per-installation identifier
    fn secure_id(&self) -> Option<String>;
}
