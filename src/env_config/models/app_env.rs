use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Prod,
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Env::Local => write!(f, "local"),
            Env::Prod => write!(f, "prod"),
        }
    }
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "dev" => Ok(Env::Local),
            "prod" | "production" => Ok(Env::Prod),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Values read from the process environment.
#[derive(Debug, Clone)]
pub struct AppEnv {
    pub env: Env,
    pub server_address: String,
    pub server_port: u16,
    pub config_dir: String,
}

impl AppEnv {
    pub fn is_local(&self) -> bool {
        self.env == Env::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_from_str() {
        assert_eq!(Env::from_str("local").unwrap(), Env::Local);
        assert_eq!(Env::from_str("PROD").unwrap(), Env::Prod);
        assert_eq!(Env::from_str(" production ").unwrap(), Env::Prod);
        assert!(Env::from_str("staging").is_err());
    }

    #[test]
    fn test_env_display_matches_config_file_name() {
        assert_eq!(Env::Local.to_string(), "local");
        assert_eq!(Env::Prod.to_string(), "prod");
    }
}
