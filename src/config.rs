use std::{env, fs, path::PathBuf, str::FromStr};
use ed25519_dalek::SigningKey;
use log::{info, debug};

use crate::models::KeyPair;

const SESSION_KEY_ENV: &str = "SESSION_SIGNING_KEY";
const SESSION_KEY_FILE: &str = "session_keypair.json";

#[derive(Debug, Clone)]
pub struct ApifyConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub google_actor: String,
    pub facebook_actor: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Deployment domain written into embed code.
    pub public_app_url: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub apify: ApifyConfig,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| Box::<dyn std::error::Error>::from(format!("Invalid value for {}: {} ({})", name, raw, e))),
        Err(_) => Ok(default),
    }
}

/// Ten years. Longer lifetimes overflow token expiry arithmetic.
pub const MAX_SESSION_TTL_HOURS: i64 = 87_600;

fn check_session_ttl(hours: i64) -> Result<i64, String> {
    if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(format!(
            "SESSION_TTL_HOURS must be between 1 and {} (got {})",
            MAX_SESSION_TTL_HOURS, hours
        ))
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mongodb_uri = env::var("MONGODB_URI").map_err(|_| "MONGODB_URI must be set")?;

        let session_ttl_hours = check_session_ttl(parse_var("SESSION_TTL_HOURS", 720i64)?)?;

        Ok(ServerConfig {
            host: var_or("SERVER_HOST", "0.0.0.0"),
            port: parse_var("SERVER_PORT", 8080u16)?,
            mongodb_uri,
            mongodb_database: var_or("MONGODB_DATABASE", "reviewhub"),
            public_app_url: var_or("PUBLIC_APP_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            session_ttl_hours,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
            apify: ApifyConfig {
                token: env::var("APIFY_TOKEN").ok().filter(|t| !t.trim().is_empty()),
                base_url: var_or("APIFY_BASE_URL", "https://api.apify.com"),
                google_actor: var_or("APIFY_GOOGLE_ACTOR", "compass~google-maps-reviews-scraper"),
                facebook_actor: var_or("APIFY_FACEBOOK_ACTOR", "apify~facebook-reviews-scraper"),
            },
        })
    }
}

pub struct KeyConfig {
    pub session_signing_key: SigningKey,
}

impl KeyConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let session_signing_key = load_signing_key(SESSION_KEY_ENV, SESSION_KEY_FILE)?;
        Ok(KeyConfig { session_signing_key })
    }
}

fn load_signing_key(env_var_name: &str, json_file_path: &str) -> Result<SigningKey, Box<dyn std::error::Error>> {
    if let Ok(private_key_str) = env::var(env_var_name) {
        info!("Loading {} from environment variable", env_var_name);
        let key = signing_key_from_hex(&private_key_str)
            .map_err(|e| format!("Invalid private key in {}: {}", env_var_name, e))?;
        info!("Loaded session key with pubkey: {}", hex::encode(key.verifying_key().to_bytes()));
        return Ok(key);
    }

    info!("Environment variable {} not found, falling back to JSON file: {}", env_var_name, json_file_path);
    load_signing_key_from_json(json_file_path)
}

fn signing_key_from_hex(input: &str) -> Result<SigningKey, String> {
    let bytes = hex::decode(input.trim()).map_err(|e| format!("Invalid hex format: {}", e))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("Private key must be 32 bytes, got {}", b.len()))?;
    Ok(SigningKey::from_bytes(&bytes))
}

fn load_signing_key_from_json(json_file_path: &str) -> Result<SigningKey, Box<dyn std::error::Error>> {
    let path = PathBuf::from(json_file_path);

    if !path.exists() {
        return Err(format!("Keypair file not found: {}", json_file_path).into());
    }

    debug!("Reading keypair from JSON file: {}", json_file_path);
    let keypair: KeyPair = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let key = signing_key_from_hex(&keypair.private_key)?;

    let public_key = hex::encode(key.verifying_key().to_bytes());
    if !keypair.public_key.eq_ignore_ascii_case(&public_key) {
        return Err(format!("Public key in {} does not match its private key", json_file_path).into());
    }

    info!("Loaded keypair from {} with pubkey: {}", json_file_path, public_key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ttl_bounds() {
        assert_eq!(check_session_ttl(720), Ok(720));
        assert_eq!(check_session_ttl(MAX_SESSION_TTL_HOURS), Ok(MAX_SESSION_TTL_HOURS));
        assert!(check_session_ttl(0).is_err());
        assert!(check_session_ttl(-5).is_err());
        let err = check_session_ttl(1_000_000_000_000).unwrap_err();
        assert!(err.contains("between 1 and 87600"));
    }

    #[test]
    fn test_signing_key_from_hex() {
        let hex_key = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        let key = signing_key_from_hex(hex_key).unwrap();
        assert_eq!(hex::encode(key.to_bytes()), hex_key);
    }

    #[test]
    fn test_signing_key_from_hex_invalid_length() {
        let err = signing_key_from_hex("1234567890abcdef").unwrap_err();
        assert!(err.contains("must be 32 bytes"));
    }

    #[test]
    fn test_signing_key_from_hex_invalid_format() {
        let err = signing_key_from_hex("not_hex_at_all_this_is_invalid_string_zzz").unwrap_err();
        assert!(err.contains("Invalid hex format"));
    }

    #[test]
    fn test_keypair_file_must_match() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let dir = env::temp_dir().join(format!("reviewhub-keys-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.json");
        let pair = KeyPair {
            public_key: hex::encode(key.verifying_key().to_bytes()),
            private_key: hex::encode(key.to_bytes()),
        };
        fs::write(&good, serde_json::to_string(&pair).unwrap()).unwrap();
        let loaded = load_signing_key_from_json(good.to_str().unwrap()).unwrap();
        assert_eq!(loaded.to_bytes(), key.to_bytes());

        let bad = dir.join("bad.json");
        let mismatched = KeyPair {
            public_key: "00".repeat(32),
            private_key: hex::encode(key.to_bytes()),
        };
        fs::write(&bad, serde_json::to_string(&mismatched).unwrap()).unwrap();
        assert!(load_signing_key_from_json(bad.to_str().unwrap()).is_err());

        assert!(load_signing_key_from_json(dir.join("missing.json").to_str().unwrap()).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
