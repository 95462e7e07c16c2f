//! Bootstrap constants.
//!
//! Centralized location for default paths, identity defaults and file modes.

/// Default client file locations
pub mod paths {
    /// Validation credential used for first registration
    pub const VALIDATION_KEY: &str = "/etc/chef/validation.pem";

    /// Client credential; present once the node has registered
    pub const CLIENT_KEY: &str = "/etc/chef/client.pem";

    /// JSON attributes file handed to the client
    pub const CLIENT_CONFIG_FILE: &str = "/etc/chef/client-config.json";

    pub const FILE_CACHE_PATH: &str = "/srv/chef/cache";

    pub const PID_FILE: &str = "/var/run/chef/chef-client.pid";
}

/// Identity defaults used when user-data does not say otherwise
pub mod defaults {
    pub const SERVER_URL: &str = "http://chef.infinitemonkeys.info:4000";

    pub const VALIDATION_CLIENT_NAME: &str = "chef-validator";

    pub const LOG_LEVEL: &str = "info";
}

/// Permission bits for files written at first boot
pub mod modes {
    /// Owner read/write only
    pub const CREDENTIAL: u32 = 0o600;

    pub const ATTRIBUTES: u32 = 0o644;
}
