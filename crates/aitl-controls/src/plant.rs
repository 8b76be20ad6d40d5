//! Plant models driven by the control loop.
//!
//! The reference plant is a first-order lag, `dx/dt = (-x + u) / tau`,
//! advanced with explicit Euler. A pure integrator is also provided for the
//! command-driven scenarios, which drive `x += gain * u * dt`.

use crate::error::{ControlError, ControlResult, ensure_positive_dt};
use serde::{Deserialize, Serialize};

/// Capability shared by the simulated plants.
pub trait Plant {
    /// Advance the plant by `dt` under input `u` and return the new output.
    fn step(&mut self, u: f64, dt: f64) -> ControlResult<f64>;

    /// Current plant output.
    fn state(&self) -> f64;

    /// Return the plant to its zero state.
    fn reset(&mut self);
}

/// First-order lag plant.
///
/// # Example
///
/// ```
/// use aitl_controls::{FirstOrderPlant, Plant};
///
/// let mut plant = FirstOrderPlant::new(0.2).unwrap();
/// for _ in 0..200 {
///     plant.step(1.0, 0.01).unwrap();
/// }
/// assert!(plant.state() > 0.99);
/// ```
///
/// Deserialization goes through [`FirstOrderPlant::new`], so a stored plant
/// with a non-positive `tau` is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FirstOrderPlantRepr", into = "FirstOrderPlantRepr")]
pub struct FirstOrderPlant {
    tau: f64,
    x: f64,
}

impl FirstOrderPlant {
    /// Create a plant with time constant `tau` (seconds) at rest.
    ///
    /// # Errors
    ///
    /// Returns error if `tau` is not positive.
    pub fn new(tau: f64) -> ControlResult<Self> {
        if !(tau > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "tau must be positive",
            });
        }
        Ok(Self { tau, x: 0.0 })
    }

    /// Time constant in seconds.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// State derivative for output `x` under input `u`.
    pub fn dxdt(&self, x: f64, u: f64) -> f64 {
        (-x + u) / self.tau
    }
}

impl Default for FirstOrderPlant {
    fn default() -> Self {
        Self { tau: 1.0, x: 0.0 }
    }
}

impl Plant for FirstOrderPlant {
    fn step(&mut self, u: f64, dt: f64) -> ControlResult<f64> {
        let dt = ensure_positive_dt(dt)?;
        self.x += self.dxdt(self.x, u) * dt;
        Ok(self.x)
    }

    fn state(&self) -> f64 {
        self.x
    }

    fn reset(&mut self) {
        self.x = 0.0;
    }
}

/// Pure integrator plant: `dx/dt = gain * u`.
///
/// Deserialization goes through [`IntegratorPlant::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IntegratorPlantRepr", into = "IntegratorPlantRepr")]
pub struct IntegratorPlant {
    gain: f64,
    x: f64,
}

impl IntegratorPlant {
    /// Create an integrator with positive input gain.
    pub fn new(gain: f64) -> ControlResult<Self> {
        if !(gain > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "integrator gain must be positive",
            });
        }
        Ok(Self { gain, x: 0.0 })
    }

    /// Input gain.
    pub fn gain(&self) -> f64 {
        self.gain
    }
}

impl Plant for IntegratorPlant {
    fn step(&mut self, u: f64, dt: f64) -> ControlResult<f64> {
        let dt = ensure_positive_dt(dt)?;
        self.x += self.gain * u * dt;
        Ok(self.x)
    }

    fn state(&self) -> f64 {
        self.x
    }

    fn reset(&mut self) {
        self.x = 0.0;
    }
}

/// Stored form of [`FirstOrderPlant`].
#[derive(Serialize, Deserialize)]
struct FirstOrderPlantRepr {
    tau: f64,
    #[serde(default)]
    x: f64,
}

impl TryFrom<FirstOrderPlantRepr> for FirstOrderPlant {
    type Error = ControlError;

    fn try_from(repr: FirstOrderPlantRepr) -> ControlResult<Self> {
        let mut plant = Self::new(repr.tau)?;
        plant.x = ensure_finite_state(repr.x)?;
        Ok(plant)
    }
}

impl From<FirstOrderPlant> for FirstOrderPlantRepr {
    fn from(plant: FirstOrderPlant) -> Self {
        Self {
            tau: plant.tau,
            x: plant.x,
        }
    }
}

/// Stored form of [`IntegratorPlant`].
#[derive(Serialize, Deserialize)]
struct IntegratorPlantRepr {
    gain: f64,
    #[serde(default)]
    x: f64,
}

impl TryFrom<IntegratorPlantRepr> for IntegratorPlant {
    type Error = ControlError;

    fn try_from(repr: IntegratorPlantRepr) -> ControlResult<Self> {
        let mut plant = Self::new(repr.gain)?;
        plant.x = ensure_finite_state(repr.x)?;
        Ok(plant)
    }
}

impl From<IntegratorPlant> for IntegratorPlantRepr {
    fn from(plant: IntegratorPlant) -> Self {
        Self {
            gain: plant.gain,
            x: plant.x,
        }
    }
}

fn ensure_finite_state(x: f64) -> ControlResult<f64> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(ControlError::InvalidArg {
            what: "plant state must be finite",
        })
    }
}
