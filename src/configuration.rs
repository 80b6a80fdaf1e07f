use std::str::FromStr;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    #[serde(default)]
    pub development: bool,
    #[serde(default)]
    pub https: bool,
    pub amqp: AmqpSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct AmqpSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct StorageSettings {
    pub bucket_name: String,
    pub root_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Clone, serde::Deserialize)]
pub struct AuthSettings {
    pub secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

// keeps the signing secret out of logs
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &"***")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Settings {
    pub fn protocol(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol(), self.app_host, self.app_port)
    }

    /// Values from the process environment win over `configuration.yaml`.
    /// Variable names are the ones the deployment already exports.
    pub fn apply_env_overrides(&mut self) -> Result<(), config::ConfigError> {
        override_from_env("DB_HOST", &mut self.database.host)?;
        override_from_env("DB_PORT", &mut self.database.port)?;
        override_from_env("DB_NAME", &mut self.database.database_name)?;
        override_from_env("DB_USER", &mut self.database.username)?;
        override_from_env("DB_PASSWORD", &mut self.database.password)?;
        override_from_env("RABBIT_MQ_HOST", &mut self.amqp.host)?;
        override_from_env("RABBIT_MQ_PORT", &mut self.amqp.port)?;
        override_from_env("RABBIT_MQ_USERNAME", &mut self.amqp.username)?;
        override_from_env("RABBIT_MQ_PASSWORD", &mut self.amqp.password)?;
        override_from_env("BUCKET_NAME", &mut self.storage.bucket_name)?;
        override_from_env("STORAGE_ROOT", &mut self.storage.root_dir)?;
        override_from_env("SECRET", &mut self.auth.secret)?;
        override_from_env("HTTPS", &mut self.https)?;
        override_from_env("DEVELOPMENT", &mut self.development)?;
        override_from_env("APP_PORT", &mut self.app_port)?;

        Ok(())
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.secret (SECRET) must not be empty".to_string(),
            ));
        }
        if self.storage.bucket_name.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "storage.bucket_name (BUCKET_NAME) must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn override_from_env<T: FromStr>(name: &str, target: &mut T) -> Result<(), config::ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => {
            *target = value
                .parse::<T>()
                .map_err(|_| config::ConfigError::Message(format!("{name} has wrong type")))?;
            Ok(())
        }
        _ => Ok(()),
    }
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }
}

impl AmqpSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/%2f",
            self.username, self.password, self.host, self.port,
        )
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration"))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;
    config.apply_env_overrides()?;
    config.validate()?;

    Ok(config)
}
