//! Vehicle counters and the anomaly outcome.

use std::fmt;

/// The four vehicle classes a scanner distinguishes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum VehicleClass {
    Car,
    Truck,
    Bike,
    Bus,
}

impl VehicleClass {
    /// All classes in draw order.
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Truck,
        VehicleClass::Bike,
        VehicleClass::Bus,
    ];
}

/// Per-class vehicle counts for one collection.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct VehicleCounts {
    pub cars:   u32,
    pub trucks: u32,
    pub bikes:  u32,
    pub buses:  u32,
}

impl VehicleCounts {
    pub const ZERO: VehicleCounts = VehicleCounts { cars: 0, trucks: 0, bikes: 0, buses: 0 };

    #[inline]
    pub fn get(&self, class: VehicleClass) -> u32 {
        match class {
            VehicleClass::Car   => self.cars,
            VehicleClass::Truck => self.trucks,
            VehicleClass::Bike  => self.bikes,
            VehicleClass::Bus   => self.buses,
        }
    }

    #[inline]
    pub fn add(&mut self, class: VehicleClass, n: u32) {
        let slot = match class {
            VehicleClass::Car   => &mut self.cars,
            VehicleClass::Truck => &mut self.trucks,
            VehicleClass::Bike  => &mut self.bikes,
            VehicleClass::Bus   => &mut self.buses,
        };
        *slot = slot.saturating_add(n);
    }

    /// Sum of the four class counters.
    #[inline]
    pub fn total(&self) -> u64 {
        VehicleClass::ALL.iter().map(|&c| self.get(c) as u64).sum()
    }
}

impl fmt::Display for VehicleCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cars {} trucks {} bikes {} buses {}",
            self.cars, self.trucks, self.bikes, self.buses
        )
    }
}

// ── Anomaly ───────────────────────────────────────────────────────────────────

/// Advisory anomaly outcome drawn once per collection.
///
/// Never feeds the decision step; it is only reported.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Anomaly {
    /// The scan task was cancelled before the outcome was drawn.
    #[default]
    Unassessed,
    Clear,
    Detected,
}

impl Anomaly {
    /// The ternary outcome table: two clear outcomes, one anomaly.
    pub const OUTCOMES: [Anomaly; 3] = [Anomaly::Clear, Anomaly::Clear, Anomaly::Detected];

    pub fn label(self) -> &'static str {
        match self {
            Anomaly::Unassessed => "unassessed",
            Anomaly::Clear      => "clear",
            Anomaly::Detected   => "detected",
        }
    }

    #[inline]
    pub fn is_detected(self) -> bool {
        self == Anomaly::Detected
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
