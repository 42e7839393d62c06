use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::orders::pricing::{DEFAULT_DELIVERY_FEE, DEFAULT_TAX};

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub tracking_interval: Duration,
    pub delivery_fee: f64,
    pub tax_amount: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            event_buffer_size: 1024,
            tracking_interval: Duration::from_millis(5000),
            delivery_fee: DEFAULT_DELIVERY_FEE,
            tax_amount: DEFAULT_TAX,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            tracking_interval: tracking_interval(parse_or_default(
                "TRACKING_INTERVAL_MS",
                defaults.tracking_interval.as_millis() as u64,
            )?)?,
            delivery_fee: parse_or_default("DELIVERY_FEE", defaults.delivery_fee)?,
            tax_amount: parse_or_default("TAX_AMOUNT", defaults.tax_amount)?,
        })
    }
}

fn tracking_interval(millis: u64) -> Result<Duration, AppError> {
    if millis == 0 {
        return Err(AppError::Internal(
            "invalid TRACKING_INTERVAL_MS: must be at least 1".to_string(),
        ));
    }
    Ok(Duration::from_millis(millis))
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{parse_or_default, tracking_interval};
    use crate::error::AppError;

    #[test]
    fn unset_variable_falls_back() {
        let port: u16 = parse_or_default("FOOD_ORDER_TRACKER_UNSET_PORT", 3000).unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn zero_tracking_interval_is_rejected() {
        let err = tracking_interval(0).unwrap_err();
        assert!(matches!(err, AppError::Internal(ref msg) if msg.contains("TRACKING_INTERVAL_MS")));
        assert_eq!(tracking_interval(250).unwrap(), Duration::from_millis(250));
    }
}
