use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            // 15 min access, 7 day refresh by default
            access_token_ttl: env_or("ACCESS_TOKEN_TTL", "900").parse().unwrap(),
            refresh_token_ttl: env_or("REFRESH_TOKEN_TTL", "604800").parse().unwrap(),

            rate_login_per_min: env_or("RATE_LOGIN_PER_MIN", "60").parse().unwrap(),
            rate_register_per_min: env_or("RATE_REGISTER_PER_MIN", "30").parse().unwrap(),
            rate_refresh_per_min: env_or("RATE_REFRESH_PER_MIN", "30").parse().unwrap(),
            rate_protected_per_min: env_or("RATE_PROTECTED_PER_MIN", "1000").parse().unwrap(),

            api_prefix: env_or("API_PREFIX", "/api/v1"),
        }
    }
}
