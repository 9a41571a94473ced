use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;

use crate::engine::clock::{Clock, parse_utc_offset};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    /// Deployment timezone; the service day boundary is local midnight here.
    pub utc_offset: FixedOffset,
    /// Check-in later than this many minutes after the scheduled start is Late.
    pub late_threshold_min: i64,
    /// Forgotten checkouts are auto-closed this many minutes past the
    /// scheduled end.
    pub checkout_grace_min: i64,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_scan_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),

            utc_offset: parse_utc_offset(
                &env::var("UTC_OFFSET").unwrap_or_else(|_| "+06:00".to_string()),
            )
            .expect("UTC_OFFSET must be a valid offset like +06:00"),
            late_threshold_min: env::var("LATE_THRESHOLD_MIN")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap(),
            checkout_grace_min: env::var("CHECKOUT_GRACE_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_scan_per_min: env::var("RATE_SCAN_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }

    pub fn clock(&self) -> Clock {
        Clock::new(self.utc_offset)
    }
}
