use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, fmt};

const BUCKET_NAME_MIN_LEN: usize = 3;
const BUCKET_NAME_MAX_LEN: usize = 63;

/// Which object store receives uploads.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// AWS S3 or an S3-compatible endpoint.
    S3,
    /// Sharded directory tree on local disk.
    Local,
    /// Process-local map; contents vanish on exit.
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageBackend::S3 => "s3",
            StorageBackend::Local => "local",
            StorageBackend::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub backend: StorageBackend,
    pub storage_dir: String,
    pub s3_endpoint: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Upload function: stores request bodies in an object store")]
pub struct Args {
    /// Host to bind to in server mode (overrides UPLOAD_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to in server mode (overrides UPLOAD_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Target bucket for every upload (overrides UPLOAD_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Storage backend (overrides UPLOAD_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<StorageBackend>,

    /// Root directory of the local backend (overrides UPLOAD_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Custom S3 endpoint URL (overrides UPLOAD_S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Serve invocations from the Lambda runtime API instead of HTTP
    #[arg(long)]
    pub lambda: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the lambda flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let lambda = args.lambda;
        let cfg = Self::resolve(args, |name| env::var(name).ok())?;
        Ok((cfg, lambda))
    }

    /// Merge parsed CLI args over values returned by `lookup`.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_host = lookup("UPLOAD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match lookup("UPLOAD_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing UPLOAD_PORT value `{}`", value))?,
            None => 3000,
        };
        let env_backend = match lookup("UPLOAD_BACKEND") {
            Some(value) => StorageBackend::from_str(&value, true)
                .map_err(|err| anyhow::anyhow!("parsing UPLOAD_BACKEND value `{}`: {}", value, err))?,
            None => StorageBackend::S3,
        };
        let env_storage =
            lookup("UPLOAD_STORAGE_DIR").unwrap_or_else(|| "./data/objects".into());

        let bucket = args
            .bucket
            .or_else(|| lookup("UPLOAD_BUCKET"))
            .context("no bucket configured; set UPLOAD_BUCKET or pass --bucket")?;
        ensure_bucket_name_valid(&bucket)?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            bucket,
            backend: args.backend.unwrap_or(env_backend),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            s3_endpoint: args.s3_endpoint.or_else(|| lookup("UPLOAD_S3_ENDPOINT")),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Validate bucket name format.
///
/// Enforces S3 naming rules:
/// - 3–63 characters
/// - lowercase letters, digits, dots, hyphens only
/// - cannot start/end with dot or hyphen
/// - cannot contain consecutive dots or dot-hyphen patterns
/// - cannot look like an IPv4 address
pub fn ensure_bucket_name_valid(name: &str) -> Result<()> {
    let len = name.len();
    if !(BUCKET_NAME_MIN_LEN..=BUCKET_NAME_MAX_LEN).contains(&len) {
        bail!("bucket `{}` invalid: must be between 3 and 63 characters", name);
    }

    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
    {
        bail!(
            "bucket `{}` invalid: allowed characters are lowercase letters, digits, dots, and hyphens",
            name
        );
    }

    if name.starts_with('.') || name.ends_with('.') || name.starts_with('-') || name.ends_with('-')
    {
        bail!(
            "bucket `{}` invalid: must start and end with a lowercase letter or digit",
            name
        );
    }

    if name.contains("..") || name.contains("-.") || name.contains(".-") {
        bail!(
            "bucket `{}` invalid: cannot contain consecutive dots or dot-hyphen combinations",
            name
        );
    }

    if is_ipv4_like(name) {
        bail!("bucket `{}` invalid: must not be formatted like an IP address", name);
    }

    Ok(())
}

/// Check if a string matches IPv4-like dotted decimal form.
fn is_ipv4_like(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|segment| {
            !segment.is_empty()
                && segment.len() <= 3
                && segment.chars().all(|c| c.is_ascii_digit())
                && segment.parse::<u8>().is_ok()
        })
}
