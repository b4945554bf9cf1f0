/// Configuration constants for the TFE API
pub mod api {
    /// Base path for TFE API v2
    pub const BASE_PATH: &str = "/api/v2";

    /// Organizations endpoint
    pub const ORGANIZATIONS: &str = "organizations";

    /// Registry modules endpoint (organization scoped)
    pub const REGISTRY_MODULES: &str = "registry-modules";

    /// Account details endpoint, used as a connection check
    pub const ACCOUNT_DETAILS: &str = "account/details";

    /// Default page size for API requests
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Maximum number of pages fetched concurrently
    pub const MAX_CONCURRENT_PAGE_REQUESTS: usize = 10;
}

/// Configuration constants for credentials
pub mod credentials {
    /// Credentials file name
    pub const FILE_NAME: &str = "terraform.d/credentials.tfrc.json";

    /// Path to Terraform credentials file on Unix (relative to HOME)
    pub const FILE_PATH_UNIX: &str = ".terraform.d/credentials.tfrc.json";

    /// Environment variable names for token (checked in order)
    pub const TOKEN_ENV_VARS: &[&str] = &["TFC_TOKEN", "TFE_TOKEN", "HCP_TOKEN"];

    /// Environment variable holding the API base URL
    pub const URL_ENV_VAR: &str = "TFC_URL";

    /// Environment variable holding the organization name
    pub const ORGANIZATION_ENV_VAR: &str = "TFC_ORGANIZATION";
}

/// VCS connection identifier prefixes
pub mod vcs {
    /// Prefix of OAuth token IDs
    pub const OAUTH_TOKEN_PREFIX: &str = "ot-";

    /// Prefix of GitHub App installation IDs
    pub const GITHUB_INSTALL_PREFIX: &str = "ghain-";
}

/// Default values for CLI
pub mod defaults {
    /// Default HCP Terraform URL
    pub const URL: &str = "https://app.terraform.io";

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// The only answer accepted at confirmation prompts
    pub const CONFIRM_ANSWER: &str = "yes";
}
