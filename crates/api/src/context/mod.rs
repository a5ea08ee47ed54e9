//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use hauth_core::{
    default_user_agent, CredentialStore, DeviceIdentityResolver, DeviceInfoProvider,
    IdentityProbe, KeyValueStore, NetworkMonitor, RequestExecutor, RetryOrchestrator, Transport,
};
use hauth_domain::{ApiRequest, CallOutcome, HauthConfig, HauthError, Result, ServerEndpoint};
use hauth_infra::{
    open_store, CommandProber, ReqwestTransport, SysfsDeviceInfo, SysfsNetworkMonitor,
};
use serde::Serialize;
use tracing::info;

/// Infrastructure adapters the context is assembled from
pub struct Adapters {
    pub storage: Arc<dyn KeyValueStore>,
    pub device: Arc<dyn DeviceInfoProvider>,
    pub probe: Arc<dyn IdentityProbe>,
    pub transport: Arc<dyn Transport>,
    pub network: Arc<dyn NetworkMonitor>,
}

impl Adapters {
    /// The production adapters selected by `config`.
    pub fn from_config(config: &HauthConfig) -> Self {
        Self {
            storage: open_store(&config.storage),
            device: Arc::new(SysfsDeviceInfo::new(&config.identity.sysfs_root)),
            probe: Arc::new(CommandProber::from_config(&config.identity)),
            transport: Arc::new(ReqwestTransport::new()),
            network: Arc::new(SysfsNetworkMonitor::new(&config.identity.sysfs_root)),
        }
    }
}

/// Snapshot of the device's credential state; never includes the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub serial: String,
    pub login: String,
    pub server: String,
    pub password_set: bool,
}

/// What one CLI-level request produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestReport {
    pub outcome: CallOutcome,
    pub legacy_code: i32,
    pub status: Option<u16>,
    pub body: Option<String>,
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: HauthConfig,
    pub storage: Arc<dyn KeyValueStore>,
    pub credentials: Arc<CredentialStore>,
    pub orchestrator: RetryOrchestrator,
}

impl AppContext {
    /// Build the context over the production adapters.
    pub fn new(config: HauthConfig) -> Self {
        let adapters = Adapters::from_config(&config);
        Self::with_adapters(config, adapters)
    }

    /// Build the context over caller-supplied adapters.
    pub fn with_adapters(config: HauthConfig, adapters: Adapters) -> Self {
        let resolver =
            DeviceIdentityResolver::from_config(adapters.device, adapters.probe, &config.identity);
        let serial = resolver.resolve_persisted(adapters.storage.as_ref());

        let credentials = Arc::new(CredentialStore::load(adapters.storage.clone(), serial));
        if let Some(seed) = config.server.base_url.as_deref() {
            if !credentials.server().is_configured() {
                credentials.update_server(seed);
            }
        }

        let executor = RequestExecutor::new(credentials.clone(), adapters.transport, adapters.network)
            .with_connect_timeout(Duration::from_millis(config.server.connect_timeout_ms))
            .with_user_agent(default_user_agent(&config.server.user_agent_suffix));

        info!(serial = %credentials.serial(), login = %credentials.login(), "context.ready");

        Self {
            config,
            storage: adapters.storage,
            credentials,
            orchestrator: RetryOrchestrator::new(Arc::new(executor)),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            serial: self.credentials.serial().to_string(),
            login: self.credentials.login(),
            server: self.credentials.server().base_url,
            password_set: !self.credentials.is_password_empty(),
        }
    }

    /// Recompute the login; missing arguments fall back to the `login`
    /// config section.
    ///
    /// # Errors
    /// Returns `HauthError::InvalidInput` when no length limit is given or
    /// configured.
    pub fn init_login(&self, max_length: Option<usize>, suffix: Option<&str>) -> Result<String> {
        let max_length = max_length.or(self.config.login.max_length).ok_or_else(|| {
            HauthError::InvalidInput("login length limit not given or configured".into())
        })?;
        let suffix = suffix.unwrap_or(&self.config.login.suffix);
        Ok(self.credentials.init_login(max_length, suffix))
    }

    /// # Errors
    /// Returns `HauthError::InvalidInput` for an empty password.
    pub fn set_password(&self, password: &str) -> Result<()> {
        if self.credentials.set_password(password) {
            Ok(())
        } else {
            Err(HauthError::InvalidInput("password must not be empty".into()))
        }
    }

    /// # Errors
    /// Returns `HauthError::InvalidInput` for a blank URL.
    pub fn set_server(&self, url: &str) -> Result<()> {
        if !ServerEndpoint::new(url).is_configured() {
            return Err(HauthError::InvalidInput("server URL must not be empty".into()));
        }
        self.credentials.update_server(url);
        Ok(())
    }

    /// Perform one logical call and drain its response.
    pub fn request(&self, request: &ApiRequest) -> RequestReport {
        let mut response = self.orchestrator.call(request);
        let outcome = response.outcome();

        let body = match response.status() {
            Some(_) => match response.read_body() {
                Ok(body) => Some(body),
                Err(err) => {
                    tracing::warn!(error = %err, "context.body_unreadable");
                    None
                }
            },
            None => None,
        };
        response.disconnect();

        RequestReport { outcome, legacy_code: outcome.legacy_code(), status: outcome.status(), body }
    }
}

#[cfg(test)]
mod tests {
    use hauth_core::testing::{FakeDevice, FakeNetwork, ScriptedProbe, ScriptedResponse, ScriptedTransport};
    use hauth_core::InMemoryKeyValueStore;
    use hauth_domain::constants::{SLOT_SERIAL, SLOT_SERVER_URL};
    use hauth_domain::RequestOutcome;

    use super::*;

    fn context(config: HauthConfig, transport: ScriptedTransport) -> AppContext {
        let adapters = Adapters {
            storage: Arc::new(InMemoryKeyValueStore::new()),
            device: Arc::new(FakeDevice { serial: Some("SN-7".into()), ..FakeDevice::default() }),
            probe: Arc::new(ScriptedProbe::default()),
            transport: Arc::new(transport),
            network: Arc::new(FakeNetwork::default()),
        };
        AppContext::with_adapters(config, adapters)
    }

    #[test]
    fn seeds_server_and_serial_on_first_start() {
        let mut config = HauthConfig::default();
        config.server.base_url = Some("https://auth.example.com".into());

        let ctx = context(config, ScriptedTransport::new());

        let identity = ctx.identity();
        assert_eq!(identity.serial, "SN-7");
        assert_eq!(identity.login, "SN-7");
        assert_eq!(identity.server, "https://auth.example.com");
        assert!(!identity.password_set);
        assert_eq!(ctx.storage.get(SLOT_SERIAL).unwrap().as_deref(), Some("SN-7"));
    }

    #[test]
    fn blank_stored_server_takes_config_seed() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        storage.set(SLOT_SERVER_URL, "   ").unwrap();
        let mut config = HauthConfig::default();
        config.server.base_url = Some("https://auth.example.com".into());
        let adapters = Adapters {
            storage: storage.clone(),
            device: Arc::new(FakeDevice::default()),
            probe: Arc::new(ScriptedProbe::default()),
            transport: Arc::new(ScriptedTransport::new()),
            network: Arc::new(FakeNetwork::default()),
        };

        let ctx = AppContext::with_adapters(config, adapters);

        assert_eq!(ctx.identity().server, "https://auth.example.com");
        assert_eq!(storage.get(SLOT_SERVER_URL).unwrap().as_deref(), Some("https://auth.example.com"));
    }

    #[test]
    fn init_login_falls_back_to_config() {
        let mut config = HauthConfig::default();
        config.login.max_length = Some(6);
        config.login.suffix = "-LAB".into();
        let ctx = context(config, ScriptedTransport::new());

        assert_eq!(ctx.init_login(None, None).unwrap(), "SN-7-L");
        assert_eq!(ctx.init_login(Some(10), Some("")).unwrap(), "SN-7");
    }

    #[test]
    fn init_login_without_limit_is_rejected() {
        let ctx = context(HauthConfig::default(), ScriptedTransport::new());
        assert!(matches!(ctx.init_login(None, None), Err(HauthError::InvalidInput(_))));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let ctx = context(HauthConfig::default(), ScriptedTransport::new());
        assert!(ctx.set_password("").is_err());
        assert!(ctx.set_server("  ").is_err());
        assert!(ctx.set_password("pw").is_ok());
        assert!(ctx.identity().password_set);
    }

    #[test]
    fn request_drains_body_and_reports_legacy_code() {
        let mut config = HauthConfig::default();
        config.server.base_url = Some("https://auth.example.com".into());
        let transport = ScriptedTransport::new()
            .reply(ScriptedResponse::status(401))
            .reply(ScriptedResponse::status(200).with_body("welcome"));
        let ctx = context(config, transport);

        let report = ctx.request(&ApiRequest::get("/hello"));

        assert_eq!(
            report.outcome,
            CallOutcome::Retried { initial: RequestOutcome::MissingCredential, status: Some(200) }
        );
        assert_eq!(report.legacy_code, 200);
        assert_eq!(report.body.as_deref(), Some("welcome"));
    }

    #[test]
    fn request_without_server_is_transport_error() {
        let ctx = context(HauthConfig::default(), ScriptedTransport::new());
        let report = ctx.request(&ApiRequest::get("/hello"));

        assert_eq!(report.legacy_code, 3);
        assert_eq!(report.body, None);
    }
}
