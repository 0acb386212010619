//! External collaborators behind trait seams: geocoding and solar production.
//!
//! The dispatch and financial core never touches the network; anything that
//! would (a real geocoder, a production-data API) lives behind these traits.
//! The built-in implementations are offline and deterministic so the CLI and
//! tests run without credentials. A keyed remote implementation receives its
//! API key through its own constructor, never through process-wide state.

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::rates::HOURS_PER_YEAR;

/// Upper bound on nameplate system capacity accepted by production sources.
pub const MAX_SYSTEM_CAPACITY_KW: f32 = 500_000.0;

/// Error from an external collaborator, tagged with the failing service.
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// Which collaborator failed (`"geocoder"` or `"production"`).
    pub service: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ServiceError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.service, self.message)
    }
}

/// Resolves a free-text address to coordinates.
pub trait Geocoder {
    /// Returns `(latitude, longitude)` for the address.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the address is empty or cannot be
    /// resolved. Geocoding failures are fatal to a proposal run.
    fn geocode(&self, address: &str) -> Result<(f64, f64), ServiceError>;
}

/// Supplies an hourly AC production series for a system at a location.
pub trait ProductionSource {
    /// Returns an 8760-entry kWh series for the given nameplate capacity.
    ///
    /// A capacity of exactly zero yields the zero series without an error
    /// (a 0 kW system legitimately produces nothing); negative, non-finite,
    /// or above-limit capacities are rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] for invalid capacities or upstream
    /// failures.
    fn hourly_production(
        &self,
        lat: f64,
        lon: f64,
        system_capacity_kw: f32,
    ) -> Result<Vec<f32>, ServiceError>;
}

/// Offline geocoder backed by a small ZIP-code table.
///
/// Scans the address for a five-digit ZIP token and looks it up. Meant for
/// demos and tests; swap in a real implementation for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableGeocoder;

/// Known ZIP codes and their coordinates.
const ZIP_TABLE: [(&str, f64, f64); 6] = [
    ("55714", 46.83, -92.21),
    ("59718", 45.66, -111.06),
    ("68845", 40.66, -98.33),
    ("90210", 34.09, -118.41),
    ("93210", 36.14, -120.36),
    ("98327", 47.10, -122.66),
];

impl Geocoder for TableGeocoder {
    fn geocode(&self, address: &str) -> Result<(f64, f64), ServiceError> {
        if address.trim().is_empty() {
            return Err(ServiceError::new("geocoder", "address not provided"));
        }

        let zip = address
            .split(|c: char| !c.is_ascii_digit())
            .filter(|token| token.len() == 5)
            .next_back();

        match zip.and_then(|z| ZIP_TABLE.iter().find(|(known, _, _)| *known == z)) {
            Some(&(_, lat, lon)) => Ok((lat, lon)),
            None => Err(ServiceError::new(
                "geocoder",
                format!("address \"{address}\" not found"),
            )),
        }
    }
}

/// Deterministic offline production source.
///
/// Generates a half-cosine daylight profile with a latitude-scaled seasonal
/// swing, a fixed system derate, and seeded Gaussian weather noise. Two
/// sources with the same seed produce identical series.
#[derive(Debug, Clone)]
pub struct SyntheticProduction {
    /// Standard deviation of the multiplicative weather noise.
    pub noise_std: f32,
    /// Seed for the weather-noise RNG.
    pub seed: u64,
}

/// First daylight hour (inclusive).
const SUNRISE_HOUR: usize = 6;
/// Last daylight hour (exclusive).
const SUNSET_HOUR: usize = 18;
/// Nameplate-to-AC derate covering soiling, wiring, and inverter losses.
const SYSTEM_DERATE: f32 = 0.75;
/// Day-of-year of the summer solstice.
const SOLSTICE_DOY: f32 = 172.0;

impl SyntheticProduction {
    pub fn new(noise_std: f32, seed: u64) -> Self {
        Self {
            noise_std: noise_std.max(0.0),
            seed,
        }
    }

    /// Half-cosine daylight fraction for an hour of day.
    fn daylight_frac(hour_of_day: usize) -> f32 {
        if !(SUNRISE_HOUR..SUNSET_HOUR).contains(&hour_of_day) {
            return 0.0;
        }
        let span = (SUNSET_HOUR - SUNRISE_HOUR) as f32;
        let x = (hour_of_day as f32 + 0.5 - SUNRISE_HOUR as f32) / span;
        (std::f32::consts::PI * x).sin()
    }

    /// Seasonal output multiplier, peaking at the summer solstice with an
    /// amplitude that grows with distance from the equator.
    fn seasonal_factor(lat: f64, day_of_year: usize) -> f32 {
        let amplitude = 0.35 * (lat.abs() as f32 / 90.0).min(1.0);
        let angle =
            2.0 * std::f32::consts::PI * (day_of_year as f32 - SOLSTICE_DOY) / 365.0;
        1.0 + amplitude * angle.cos()
    }
}

impl ProductionSource for SyntheticProduction {
    fn hourly_production(
        &self,
        lat: f64,
        _lon: f64,
        system_capacity_kw: f32,
    ) -> Result<Vec<f32>, ServiceError> {
        if !system_capacity_kw.is_finite() || system_capacity_kw < 0.0 {
            return Err(ServiceError::new(
                "production",
                format!("invalid system capacity: {system_capacity_kw} kW"),
            ));
        }
        if system_capacity_kw == 0.0 {
            return Ok(vec![0.0; HOURS_PER_YEAR]);
        }
        if system_capacity_kw > MAX_SYSTEM_CAPACITY_KW {
            return Err(ServiceError::new(
                "production",
                format!(
                    "invalid system capacity: {system_capacity_kw} kW, must be <= {MAX_SYSTEM_CAPACITY_KW} kW"
                ),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut series = Vec::with_capacity(HOURS_PER_YEAR);
        for hour in 0..HOURS_PER_YEAR {
            let day = hour / 24;
            let frac = Self::daylight_frac(hour % 24);
            if frac <= 0.0 {
                series.push(0.0);
                continue;
            }
            let weather = 1.0 + gaussian_noise(&mut rng, self.noise_std);
            let kwh = system_capacity_kw
                * SYSTEM_DERATE
                * frac
                * Self::seasonal_factor(lat, day)
                * weather.max(0.0);
            series.push(kwh.max(0.0));
        }
        Ok(series)
    }
}

/// Gaussian noise via the Box-Muller transform (mean 0).
fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}
