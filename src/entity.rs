//! User-facing sensor entities built from coordinator state.

use serde::Serialize;

use crate::coordinator::CoordinatorState;
use crate::poll::PollResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    CarbonDioxide,
    Temperature,
}

#[derive(Debug, Clone, Copy)]
pub struct SensorDescription {
    pub kind: SensorKind,
    pub name: &'static str,
    pub unit: &'static str,
    pub device_class: &'static str,
    pub icon: &'static str,
}

pub const CARBON_DIOXIDE: SensorDescription = SensorDescription {
    kind: SensorKind::CarbonDioxide,
    name: "AirCO2ntrol Carbon Dioxide",
    unit: "ppm",
    device_class: "co2",
    icon: "mdi:molecule-co2",
};

pub const TEMPERATURE: SensorDescription = SensorDescription {
    kind: SensorKind::Temperature,
    name: "AirCO2ntrol Temperature",
    unit: "°C",
    device_class: "temperature",
    icon: "mdi:thermometer",
};

pub const ENTITIES: [SensorDescription; 2] = [CARBON_DIOXIDE, TEMPERATURE];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub name: &'static str,
    pub state: Option<String>,
    pub unit: &'static str,
    pub device_class: &'static str,
    pub icon: &'static str,
    pub available: bool,
}

impl SensorDescription {
    /// Presentation value; temperature is rounded to two decimals.
    pub fn value(&self, data: &PollResult) -> Option<String> {
        match self.kind {
            SensorKind::CarbonDioxide => data.carbon_dioxide.map(|ppm| ppm.to_string()),
            SensorKind::Temperature => data.temperature.map(|c| format!("{c:.2}")),
        }
    }

    pub fn state(&self, coordinator: &CoordinatorState) -> EntityState {
        let state = coordinator.data.as_ref().and_then(|d| self.value(d));
        EntityState {
            name: self.name,
            available: coordinator.last_update_success && state.is_some(),
            state,
            unit: self.unit,
            device_class: self.device_class,
            icon: self.icon,
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.state, self.available) {
            (Some(v), true) => write!(f, "{}: {} {}", self.name, v, self.unit),
            _ => write!(f, "{}: unavailable", self.name),
        }
    }
}

/// States of every entity, in a stable order.
pub fn entity_states(coordinator: &CoordinatorState) -> Vec<EntityState> {
    ENTITIES.iter().map(|d| d.state(coordinator)).collect()
}
