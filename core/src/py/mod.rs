use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::json_api;

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-funksjoner: JSON inn, JSON ut (dashboardet kaller disse i rekkefølge
// profil → simulering → plasseringer/pall)
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
fn build_profile_json(json_str: &str) -> PyResult<String> {
    json_api::build_profile_json(json_str).map_err(PyValueError::new_err)
}

#[pyfunction]
fn simulate_race_json(json_str: &str) -> PyResult<String> {
    json_api::simulate_race_json(json_str).map_err(PyValueError::new_err)
}

#[pyfunction]
fn rank_positions_json(json_str: &str) -> PyResult<String> {
    json_api::rank_positions_json(json_str).map_err(PyValueError::new_err)
}

#[pyfunction]
fn compute_podium_json(json_str: &str) -> PyResult<String> {
    json_api::compute_podium_json(json_str).map_err(PyValueError::new_err)
}

/// Hele kjeden i ett kall. Tar str eller dict; returnerer dict.
#[pyfunction]
fn predict_race(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;

    let json_in: String = if let Ok(s) = payload.extract::<&str>() {
        s.to_owned()
    } else {
        json_mod
            .call_method1("dumps", (payload,))
            .and_then(|o| o.extract::<String>())
            .map_err(|e| PyValueError::new_err(format!("failed to serialize payload with json.dumps: {e}")))?
    };

    let out = json_api::predict_race_json(&json_in).map_err(PyValueError::new_err)?;

    let obj = json_mod
        .call_method1("loads", (out.as_str(),))
        .map_err(|e| PyValueError::new_err(format!("internal JSON parse error via json.loads: {e}")))?;
    Ok(obj.into_py(py))
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn racesim_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_profile_json, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_race_json, m)?)?;
    m.add_function(wrap_pyfunction!(rank_positions_json, m)?)?;
    m.add_function(wrap_pyfunction!(compute_podium_json, m)?)?;
    m.add_function(wrap_pyfunction!(predict_race, m)?)?;
    Ok(())
}
