//! Runtime Configuration
//! Mission: Env-driven settings with working defaults for local development

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        let db_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "campus_support.db".to_string());
        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        Self {
            host,
            port,
            db_path,
            jwt_secret,
            upload_dir,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only assert on fields no test environment overrides.
        let config = Config::from_env();
        assert!(!config.host.is_empty());
        assert!(config.port > 0);
        assert!(!config.jwt_secret.is_empty());
    }

    #[test]
    fn test_bind_addr_format() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 5000,
            db_path: "test.db".to_string(),
            jwt_secret: "secret".to_string(),
            upload_dir: PathBuf::from("uploads"),
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }
}
