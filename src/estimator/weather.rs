//! Weather snapshot provider
//!
//! The stub synthesizes plausible values within fixed bands; a real
//! implementation would call an external weather feed behind the same
//! trait. Tests pin deterministic values with `FixedWeather`.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Weather snapshot embedded in each prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Rainfall in millimeters
    pub rainfall: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Location the snapshot is tagged with (free text from the request)
    pub location: String,
}

/// Source of weather snapshots
pub trait WeatherProvider: Send + Sync {
    fn snapshot(&self, location: &str) -> WeatherSummary;
}

/// Mock weather source: pseudo-random values within fixed bands.
/// Stands in for a real weather feed.
#[derive(Debug, Default)]
pub struct RandomWeather;

impl WeatherProvider for RandomWeather {
    fn snapshot(&self, location: &str) -> WeatherSummary {
        let mut rng = rand::thread_rng();
        WeatherSummary {
            temperature: rng.gen_range(22.0..30.0),
            rainfall: rng.gen_range(10.0..50.0),
            humidity: rng.gen_range(60.0..90.0),
            location: location.to_string(),
        }
    }
}

/// Deterministic weather source for tests
#[derive(Debug, Clone)]
pub struct FixedWeather {
    pub temperature: f64,
    pub rainfall: f64,
    pub humidity: f64,
}

impl Default for FixedWeather {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            rainfall: 30.0,
            humidity: 75.0,
        }
    }
}

impl WeatherProvider for FixedWeather {
    fn snapshot(&self, location: &str) -> WeatherSummary {
        WeatherSummary {
            temperature: self.temperature,
            rainfall: self.rainfall,
            humidity: self.humidity,
            location: location.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_weather_stays_within_bands() {
        let provider = RandomWeather;
        for _ in 0..100 {
            let w = provider.snapshot("Nakuru");
            assert!((22.0..30.0).contains(&w.temperature));
            assert!((10.0..50.0).contains(&w.rainfall));
            assert!((60.0..90.0).contains(&w.humidity));
            assert_eq!(w.location, "Nakuru");
        }
    }

    #[test]
    fn test_fixed_weather_is_deterministic() {
        let provider = FixedWeather::default();
        assert_eq!(provider.snapshot("a"), provider.snapshot("a"));
    }
}
