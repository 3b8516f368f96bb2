//! PyO3 module exposing tetra-core to Python.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use tetra_core::{SimConfig, World};

#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Seeded tetra world driven one tick at a time from Python.
#[pyclass(name = "Simulation")]
struct PySimulation {
    world: World,
}

#[pymethods]
impl PySimulation {
    #[new]
    #[pyo3(signature = (surface_width, surface_height, population=10, seed=42))]
    fn new(surface_width: f64, surface_height: f64, population: usize, seed: u64) -> PyResult<Self> {
        let config = SimConfig {
            surface_width,
            surface_height,
            population,
            seed,
            ..SimConfig::default()
        };
        let world = World::try_new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { world })
    }

    fn tick(&mut self) {
        self.world.tick();
    }

    fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.world.tick();
        }
    }

    /// JSON array of agent snapshots, one per agent in creation order.
    fn snapshot_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.world.snapshots())
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// `(from_x, from_y, to_x, to_y)` per line; empty while the overlay is off.
    fn connections(&self) -> Vec<(f64, f64, f64, f64)> {
        self.world
            .connections()
            .iter()
            .map(|c| (c.from[0], c.from[1], c.to[0], c.to[1]))
            .collect()
    }

    fn toggle_connections(&mut self) -> bool {
        self.world.toggle_connections()
    }

    #[getter]
    fn tick_index(&self) -> u64 {
        self.world.tick_index()
    }

    /// Frame rate a presenter should tick at; speeds are per tick.
    #[getter]
    fn fps(&self) -> u32 {
        self.world.config().fps
    }

    #[getter]
    fn alive_count(&self) -> usize {
        self.world.alive_count()
    }
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_class::<PySimulation>()?;
    Ok(())
}
