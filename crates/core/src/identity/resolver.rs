//! Tiered device serial resolution
//!
//! Order of precedence once the cache misses:
//! 1. Built-in probe, only on known manufacturer/model pairs, retried up to
//!    the configured bound and gated by [`validate_builtin_serial`]
//! 2. OS-reported serial, unless it is the `unknown` sentinel
//! 3. OS secure installation identifier
//!
//! Whatever wins (even an empty string) is written back to the `serial` slot
//! so the probe runs at most once per device lifetime.

use std::sync::Arc;

use hauth_domain::constants::{PROBE_RETRY_LIMIT, SLOT_SERIAL, UNKNOWN_SERIAL};
use hauth_domain::{IdentityConfig, KnownModel};
use tracing::{debug, info, warn};

use super::ports::{DeviceInfoProvider, IdentityProbe};
use super::validation::validate_builtin_serial;
use crate::storage::KeyValueStore;

/// Produces the stable per-device serial
pub struct DeviceIdentityResolver {
    device: Arc<dyn DeviceInfoProvider>,
    probe: Arc<dyn IdentityProbe>,
    known_models: Vec<KnownModel>,
    retry_limit: u32,
}

impl DeviceIdentityResolver {
    /// Create a resolver with the default known models and retry bound
    pub fn new(device: Arc<dyn DeviceInfoProvider>, probe: Arc<dyn IdentityProbe>) -> Self {
        let defaults = IdentityConfig::default();
        Self { device, probe, known_models: defaults.known_models, retry_limit: PROBE_RETRY_LIMIT }
    }

    /// Create a resolver from the identity section of the configuration
    pub fn from_config(
        device: Arc<dyn DeviceInfoProvider>,
        probe: Arc<dyn IdentityProbe>,
        config: &IdentityConfig,
    ) -> Self {
        Self::new(device, probe)
            .with_known_models(config.known_models.clone())
            .with_retry_limit(config.retry_limit)
    }

    pub fn with_known_models(mut self, models: Vec<KnownModel>) -> Self {
        self.known_models = models;
        self
    }

    /// Total probe attempts on known hardware; clamped to at least one.
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit.max(1);
        self
    }

    /// Resolve the serial, returning `cached` untouched when it is non-empty.
    pub fn resolve(&self, cached: Option<&str>) -> String {
        if let Some(serial) = cached.filter(|s| !s.is_empty()) {
            return serial.to_string();
        }

        let serial = self
            .builtin_serial()
            .or_else(|| self.os_serial())
            .or_else(|| self.device.secure_id())
            .unwrap_or_default();

        info!(
            manufacturer = %self.device.manufacturer().unwrap_or_default(),
            model = %self.device.model().unwrap_or_default(),
            serial = %serial,
            "identity.serial_resolved"
        );
        serial
    }

    /// Resolve against the `serial` slot and write back a freshly computed value.
    ///
    /// Storage failures are logged; the resolved value is still returned.
    pub fn resolve_persisted(&self, store: &dyn KeyValueStore) -> String {
        let cached = match store.get(SLOT_SERIAL) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "identity.cache_read_failed");
                None
            }
        };

        if let Some(serial) = cached.as_deref().filter(|s| !s.is_empty()) {
            debug!(serial, "identity.cache_hit");
            return serial.to_string();
        }

        let serial = self.resolve(None);
        if let Err(err) = store.set(SLOT_SERIAL, &serial) {
            warn!(error = %err, "identity.cache_write_failed");
        }
        serial
    }

    fn is_known_model(&self) -> bool {
        let (Some(manufacturer), Some(model)) = (self.device.manufacturer(), self.device.model())
        else {
            return false;
        };
        self.known_models
            .iter()
            .any(|known| known.manufacturer == manufacturer && known.model == model)
    }

    /// Built-in probe with bounded retries; `None` off known hardware.
    fn builtin_serial(&self) -> Option<String> {
        if !self.is_known_model() {
            return None;
        }

        for attempt in 1..=self.retry_limit {
            if let Some(serial) = self.probe.probe().as_deref().and_then(validate_builtin_serial) {
                debug!(attempt, "identity.builtin_probe_accepted");
                return Some(serial);
            }
            debug!(attempt, limit = self.retry_limit, "identity.builtin_probe_rejected");
        }

        warn!(attempts = self.retry_limit, "identity.builtin_probe_exhausted");
        None
    }

    fn os_serial(&self) -> Option<String> {
        self.device
            .os_serial()
            .filter(|serial| !serial.is_empty() && serial.as_str() != UNKNOWN_SERIAL)
    }
}
