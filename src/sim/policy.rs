//! Dispatch policy: battery, inverter, and discharge-timing configuration.

/// Round-trip charge efficiency applied on energy entering the battery.
pub const BATTERY_CHARGE_EFF: f32 = 0.90;

/// Inverter conversion efficiency applied on every AC/DC crossing.
pub const INVERTER_EFF: f32 = 0.96;

/// Immutable rules for one dispatch simulation run.
///
/// Constructed once per run from user inputs plus the peak-hour mask of the
/// selected rate schedule; the engine never mutates it.
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    /// Battery capacity in kWh (>= 0; 0 disables all battery flows).
    pub battery_kwh: f32,
    /// Inverter AC capacity in kW (>= 0); DC production above it is clipped.
    pub inverter_size_kw: f32,
    /// Minimum reserve floor as a percentage of capacity (0-100).
    pub min_reserve_pct: f32,
    /// Prefer on-site consumption over export when true.
    pub self_consumption_priority: bool,
    /// Time-of-use aware discharge timing when true.
    pub tou_enabled: bool,
    /// Hour-of-day mask of peak pricing hours.
    pub peak_hours: [bool; 24],
}

impl DispatchPolicy {
    /// Creates a policy, clamping out-of-range numeric inputs.
    ///
    /// Negative capacities clamp to zero and the reserve percentage clamps
    /// into `[0, 100]`, mirroring how device constructors sanitize inputs
    /// elsewhere in the crate.
    pub fn new(
        battery_kwh: f32,
        inverter_size_kw: f32,
        min_reserve_pct: f32,
        self_consumption_priority: bool,
        tou_enabled: bool,
        peak_hours: [bool; 24],
    ) -> Self {
        Self {
            battery_kwh: battery_kwh.max(0.0),
            inverter_size_kw: inverter_size_kw.max(0.0),
            min_reserve_pct: min_reserve_pct.clamp(0.0, 100.0),
            self_consumption_priority,
            tou_enabled,
            peak_hours,
        }
    }

    /// Reserve floor in kWh below which the battery never discharges.
    pub fn min_soc_kwh(&self) -> f32 {
        self.battery_kwh * (self.min_reserve_pct / 100.0)
    }

    /// True when the given hour-of-day is in the peak window.
    pub fn is_peak(&self, hour_of_day: usize) -> bool {
        self.peak_hours[hour_of_day % 24]
    }

    /// Whether the battery may discharge this hour.
    ///
    /// Decision table:
    /// - TOU on, peak hour: discharge.
    /// - TOU on, off-peak, self-consumption priority: discharge.
    /// - TOU on, off-peak, no priority: hold for the next peak window.
    /// - TOU off, self-consumption priority: discharge.
    /// - TOU off, no priority: never discharge.
    pub fn may_discharge(&self, hour_of_day: usize) -> bool {
        match (self.tou_enabled, self.is_peak(hour_of_day)) {
            (true, true) => true,
            (true, false) => self.self_consumption_priority,
            (false, _) => self.self_consumption_priority,
        }
    }

    /// Builds an hour-of-day mask from explicit peak hours.
    pub fn peak_mask(hours: &[usize]) -> [bool; 24] {
        let mut mask = [false; 24];
        for &h in hours {
            mask[h % 24] = true;
        }
        mask
    }
}
