//! Device identity: the stable serial every login is derived from

pub mod ports;
pub mod resolver;
pub mod validation;

pub use ports::{DeviceInfoProvider, IdentityProbe};
pub use resolver::DeviceIdentityResolver;
pub use validation::validate_builtin_serial;
