//! Connection configuration.
//!
//! A configuration can be built in code, read from the environment or loaded
//! from a TOML file:
//!
//! ```toml
//! [database]
//! uri = "mongodb://${MONGO_HOST}:27017/app"
//! app_name = "billing"
//! max_pool_size = 20
//! read_preference = "primary_preferred"
//! write_concern = "majority"
//! ```

use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use mongodb::options::ClientOptions;
use serde::Deserialize;

use crate::error::{MogoError, MogoResult};

/// Environment variable holding the connection URI.
pub const URI_ENV: &str = "MOGO_URI";
/// Environment variable holding the application name.
pub const APP_NAME_ENV: &str = "MOGO_APP_NAME";

const DEFAULT_URI: &str = "mongodb://localhost:27017";

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct MogoConfig {
    /// Driver connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Application name (shown in server logs).
    pub app_name: Option<String>,
    /// Minimum connection pool size.
    pub min_pool_size: Option<u32>,
    /// Maximum connection pool size.
    pub max_pool_size: Option<u32>,
    /// Maximum idle time for pooled connections.
    pub max_idle_time: Option<Duration>,
    /// Connection timeout.
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout.
    pub server_selection_timeout: Option<Duration>,
    /// Read preference.
    pub read_preference: Option<ReadPreference>,
    /// Write concern.
    pub write_concern: Option<WriteConcern>,
    /// Retry writes.
    pub retry_writes: Option<bool>,
    /// Retry reads.
    pub retry_reads: Option<bool>,
    /// Direct connection (bypass replica set discovery).
    pub direct_connection: Option<bool>,
}

/// Read preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPreference {
    /// Read from primary only.
    Primary,
    /// Read from the primary while it is reachable, which keeps reads
    /// monotonic for a session.
    #[default]
    PrimaryPreferred,
    /// Read from secondary only.
    Secondary,
    /// Read from secondary preferred, fallback to primary.
    SecondaryPreferred,
    /// Read from nearest member.
    Nearest,
}

/// Write concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteConcern {
    /// Acknowledge writes from the specified number of nodes.
    W(u32),
    /// Acknowledge writes from majority of nodes.
    Majority,
    /// Custom tag set.
    Custom(String),
}

impl Default for WriteConcern {
    fn default() -> Self {
        Self::W(1)
    }
}

impl FromStr for WriteConcern {
    type Err = MogoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MogoError::config("write concern must not be empty"));
        }
        if s.eq_ignore_ascii_case("majority") {
            return Ok(Self::Majority);
        }
        match s.parse::<u32>() {
            Ok(n) => Ok(Self::W(n)),
            Err(_) => Ok(Self::Custom(s.to_string())),
        }
    }
}

impl Default for MogoConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: String::new(),
            app_name: Some("mogo".to_string()),
            min_pool_size: None,
            max_pool_size: Some(10),
            max_idle_time: Some(Duration::from_secs(300)),
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            read_preference: Some(ReadPreference::default()),
            write_concern: Some(WriteConcern::default()),
            retry_writes: Some(true),
            retry_reads: Some(true),
            direct_connection: None,
        }
    }
}

/// Split a URI into a driver connection string and the database it names.
///
/// Accepts the short `host:port/db` form as well as full `mongodb://` and
/// `mongodb+srv://` URIs. A URI that names no database is rejected.
///
/// ```rust
/// use mogo_core::config::parse_uri;
///
/// let (uri, db) = parse_uri("127.0.0.1:27017/test").unwrap();
/// assert_eq!(uri, "mongodb://127.0.0.1:27017/test");
/// assert_eq!(db, "test");
/// ```
pub fn parse_uri(uri: &str) -> MogoResult<(String, String)> {
    let (connection, database) = split_uri(uri)?;
    let database = database
        .ok_or_else(|| MogoError::invalid_uri(format!("no database in '{}'", uri)))?;
    Ok((connection, database))
}

fn split_uri(uri: &str) -> MogoResult<(String, Option<String>)> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(MogoError::invalid_uri("empty URI"));
    }

    let (scheme, rest) = match uri.split_once("://") {
        Some((scheme @ ("mongodb" | "mongodb+srv"), rest)) => (scheme, rest),
        Some((scheme, _)) => {
            return Err(MogoError::invalid_uri(format!(
                "unsupported scheme '{}'",
                scheme
            )));
        }
        None => ("mongodb", uri),
    };

    let (hosts, tail) = match rest.split_once('/') {
        Some((hosts, tail)) => (hosts, tail),
        None => (rest, ""),
    };
    if hosts.is_empty() {
        return Err(MogoError::invalid_uri(format!("no host in '{}'", uri)));
    }

    let (database, query) = match tail.split_once('?') {
        Some((database, query)) => (database, query),
        None => (tail, ""),
    };

    let connection = match (database.is_empty(), query.is_empty()) {
        (true, true) => format!("{}://{}", scheme, hosts),
        (_, true) => format!("{}://{}/{}", scheme, hosts, database),
        (_, false) => format!("{}://{}/{}?{}", scheme, hosts, database, query),
    };

    Ok((connection, (!database.is_empty()).then(|| database.to_string())))
}

impl MogoConfig {
    /// Create a configuration from a URI naming the database.
    pub fn from_uri(uri: &str) -> MogoResult<Self> {
        let (uri, database) = parse_uri(uri)?;
        Ok(Self {
            uri,
            database,
            ..Self::default()
        })
    }

    /// Create a builder for configuration.
    pub fn builder() -> MogoConfigBuilder {
        MogoConfigBuilder::new()
    }

    /// Read the configuration from `MOGO_URI` and `MOGO_APP_NAME`.
    pub fn from_env() -> MogoResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MogoResult<Self> {
        let uri = lookup(URI_ENV)
            .ok_or_else(|| MogoError::config(format!("{} is not set", URI_ENV)))?;
        let mut config = Self::from_uri(&uri)?;
        if let Some(app_name) = lookup(APP_NAME_ENV) {
            config.app_name = Some(app_name);
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> MogoResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MogoError::config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML, expanding `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> MogoResult<Self> {
        let expanded = expand_vars(content, |key| std::env::var(key).ok());
        let file: ConfigFile = toml::from_str(&expanded)
            .map_err(|e| MogoError::config(format!("invalid configuration: {}", e)))?;
        file.database.into_config()
    }

    /// Convert to driver client options.
    pub async fn to_client_options(&self) -> MogoResult<ClientOptions> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| MogoError::config(format!("failed to parse URI: {}", e)))?;

        if let Some(ref app_name) = self.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(min_pool) = self.min_pool_size {
            options.min_pool_size = Some(min_pool);
        }
        if let Some(max_pool) = self.max_pool_size {
            options.max_pool_size = Some(max_pool);
        }
        if let Some(max_idle) = self.max_idle_time {
            options.max_idle_time = Some(max_idle);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            options.connect_timeout = Some(connect_timeout);
        }
        if let Some(selection_timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(selection_timeout);
        }
        if let Some(read_pref) = self.read_preference {
            options.selection_criteria = Some(read_pref.to_selection_criteria());
        }
        if let Some(ref wc) = self.write_concern {
            options.write_concern = Some(wc.to_driver());
        }
        if let Some(retry_writes) = self.retry_writes {
            options.retry_writes = Some(retry_writes);
        }
        if let Some(retry_reads) = self.retry_reads {
            options.retry_reads = Some(retry_reads);
        }
        if let Some(direct) = self.direct_connection {
            options.direct_connection = Some(direct);
        }

        Ok(options)
    }
}

impl ReadPreference {
    fn to_selection_criteria(self) -> mongodb::options::SelectionCriteria {
        use mongodb::options::ReadPreference as Driver;

        let pref = match self {
            Self::Primary => Driver::Primary,
            Self::PrimaryPreferred => Driver::PrimaryPreferred {
                options: Default::default(),
            },
            Self::Secondary => Driver::Secondary {
                options: Default::default(),
            },
            Self::SecondaryPreferred => Driver::SecondaryPreferred {
                options: Default::default(),
            },
            Self::Nearest => Driver::Nearest {
                options: Default::default(),
            },
        };
        mongodb::options::SelectionCriteria::ReadPreference(pref)
    }
}

impl WriteConcern {
    fn to_driver(&self) -> mongodb::options::WriteConcern {
        use mongodb::options::Acknowledgment;

        let w = match self {
            Self::W(n) => Acknowledgment::Nodes(*n),
            Self::Majority => Acknowledgment::Majority,
            Self::Custom(tag) => Acknowledgment::Custom(tag.clone()),
        };
        mongodb::options::WriteConcern::builder().w(w).build()
    }
}

/// Builder for [`MogoConfig`].
#[derive(Debug, Default)]
pub struct MogoConfigBuilder {
    uri: Option<String>,
    database: Option<String>,
    app_name: Option<String>,
    min_pool_size: Option<u32>,
    max_pool_size: Option<u32>,
    max_idle_time: Option<Duration>,
    connect_timeout: Option<Duration>,
    server_selection_timeout: Option<Duration>,
    read_preference: Option<ReadPreference>,
    write_concern: Option<WriteConcern>,
    retry_writes: Option<bool>,
    retry_reads: Option<bool>,
    direct_connection: Option<bool>,
}

impl MogoConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URI, in short (`host:port/db`) or full form.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the database name, overriding one named by the URI.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Set the minimum pool size.
    pub fn min_pool_size(mut self, size: u32) -> Self {
        self.min_pool_size = Some(size);
        self
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    /// Set the maximum idle time for connections.
    pub fn max_idle_time(mut self, duration: Duration) -> Self {
        self.max_idle_time = Some(duration);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Set the server selection timeout.
    pub fn server_selection_timeout(mut self, duration: Duration) -> Self {
        self.server_selection_timeout = Some(duration);
        self
    }

    /// Set the read preference.
    pub fn read_preference(mut self, pref: ReadPreference) -> Self {
        self.read_preference = Some(pref);
        self
    }

    /// Set the write concern.
    pub fn write_concern(mut self, wc: WriteConcern) -> Self {
        self.write_concern = Some(wc);
        self
    }

    /// Enable or disable retry writes.
    pub fn retry_writes(mut self, enabled: bool) -> Self {
        self.retry_writes = Some(enabled);
        self
    }

    /// Enable or disable retry reads.
    pub fn retry_reads(mut self, enabled: bool) -> Self {
        self.retry_reads = Some(enabled);
        self
    }

    /// Enable direct connection (bypass replica set discovery).
    pub fn direct_connection(mut self, enabled: bool) -> Self {
        self.direct_connection = Some(enabled);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MogoResult<MogoConfig> {
        let (uri, uri_database) = match self.uri {
            Some(ref uri) => split_uri(uri)?,
            None => (DEFAULT_URI.to_string(), None),
        };
        let database = self
            .database
            .or(uri_database)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| MogoError::config("database name is required"))?;

        if let (Some(min), Some(max)) = (self.min_pool_size, self.max_pool_size) {
            if min > max {
                return Err(MogoError::config(format!(
                    "min_pool_size ({}) exceeds max_pool_size ({})",
                    min, max
                )));
            }
        }

        let defaults = MogoConfig::default();
        Ok(MogoConfig {
            uri,
            database,
            app_name: self.app_name.or(defaults.app_name),
            min_pool_size: self.min_pool_size,
            max_pool_size: self.max_pool_size.or(defaults.max_pool_size),
            max_idle_time: self.max_idle_time.or(defaults.max_idle_time),
            connect_timeout: self.connect_timeout.or(defaults.connect_timeout),
            server_selection_timeout: self
                .server_selection_timeout
                .or(defaults.server_selection_timeout),
            read_preference: self.read_preference.or(defaults.read_preference),
            write_concern: self.write_concern.or(defaults.write_concern),
            retry_writes: self.retry_writes.or(defaults.retry_writes),
            retry_reads: self.retry_reads.or(defaults.retry_reads),
            direct_connection: self.direct_connection,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseSection {
    uri: String,
    name: Option<String>,
    app_name: Option<String>,
    min_pool_size: Option<u32>,
    max_pool_size: Option<u32>,
    connect_timeout_ms: Option<u64>,
    server_selection_timeout_ms: Option<u64>,
    read_preference: Option<ReadPreference>,
    write_concern: Option<String>,
}

impl DatabaseSection {
    fn into_config(self) -> MogoResult<MogoConfig> {
        let mut builder = MogoConfig::builder().uri(self.uri);

        if let Some(name) = self.name {
            builder = builder.database(name);
        }
        if let Some(app_name) = self.app_name {
            builder = builder.app_name(app_name);
        }
        if let Some(min) = self.min_pool_size {
            builder = builder.min_pool_size(min);
        }
        if let Some(max) = self.max_pool_size {
            builder = builder.max_pool_size(max);
        }
        if let Some(ms) = self.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.server_selection_timeout_ms {
            builder = builder.server_selection_timeout(Duration::from_millis(ms));
        }
        if let Some(pref) = self.read_preference {
            builder = builder.read_preference(pref);
        }
        if let Some(ref wc) = self.write_concern {
            builder = builder.write_concern(wc.parse()?);
        }

        builder.build()
    }
}

static ENV_VAR: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Expand `${VAR_NAME}` references. Unknown variables are left as written.
fn expand_vars(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex_lite::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
