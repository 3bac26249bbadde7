//! Python bindings for xnacos. Exposes NacosClient (one client per object) and Registry (caller-chosen keys).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use pyo3::exceptions::{PyLookupError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use xnacos_rs::{DiscoveryError, HostError, HostModule, ScriptClient};

/// Process-wide module shared by every Python thread (one per simulated user).
static MODULE: OnceLock<Arc<HostModule>> = OnceLock::new();

fn module() -> PyResult<Arc<HostModule>> {
    if let Some(m) = MODULE.get() {
        return Ok(Arc::clone(m));
    }
    let created = Arc::new(HostModule::new().map_err(to_py_err)?);
    Ok(Arc::clone(MODULE.get_or_init(|| created)))
}

/// Re-raise with the original message: ValueError for bad arguments, LookupError for unknown keys.
/// (Not KeyError: its `str()` is the repr of the message.)
fn to_py_err(e: HostError) -> PyErr {
    let message = e.to_string();
    match e {
        HostError::InvalidArgument(_) | HostError::Discovery(DiscoveryError::Configuration(_)) => {
            PyValueError::new_err(message)
        }
        HostError::Discovery(DiscoveryError::UnknownClientKey(_)) => PyLookupError::new_err(message),
        _ => PyRuntimeError::new_err(message),
    }
}

/// Construction arguments arrive as a dict; round-trip through JSON into the typed params.
fn args_to_value(py: Python<'_>, args: &Bound<'_, PyAny>) -> PyResult<serde_json::Value> {
    let json = py.import_bound("json")?;
    let text: String = json.call_method1("dumps", (args,))?.extract()?;
    serde_json::from_str(&text).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyclass(frozen, get_all)]
#[derive(Clone)]
struct Instance {
    instance_id: String,
    ip: String,
    port: u64,
    weight: f64,
    healthy: bool,
    enabled: bool,
    ephemeral: bool,
    cluster_name: String,
    service_name: String,
    metadata: HashMap<String, String>,
}

#[pymethods]
impl Instance {
    fn __repr__(&self) -> String {
        format!(
            "Instance(ip={:?}, port={}, healthy={}, weight={})",
            self.ip, self.port, self.healthy, self.weight
        )
    }
}

impl From<xnacos_rs::Instance> for Instance {
    fn from(i: xnacos_rs::Instance) -> Self {
        Self {
            instance_id: i.instance_id,
            ip: i.ip,
            port: i.port,
            weight: i.weight,
            healthy: i.healthy,
            enabled: i.enabled,
            ephemeral: i.ephemeral,
            cluster_name: i.cluster_name,
            service_name: i.service_name,
            metadata: i.metadata,
        }
    }
}

/// `NacosClient({"ipAddr": ..., "port": ..., ...})`: one discovery client per object.
#[pyclass(frozen)]
struct NacosClient {
    inner: ScriptClient,
}

#[pymethods]
impl NacosClient {
    #[new]
    fn new(py: Python<'_>, params: &Bound<'_, PyAny>) -> PyResult<Self> {
        let value = args_to_value(py, params)?;
        let module = module()?;
        let inner = py.allow_threads(|| module.construct(&value)).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[pyo3(signature = (service_name, group_name=None))]
    fn select_one_healthy_instance(
        &self,
        py: Python<'_>,
        service_name: &str,
        group_name: Option<&str>,
    ) -> PyResult<Instance> {
        py.allow_threads(|| self.inner.select_one_healthy_instance(service_name, group_name))
            .map(Instance::from)
            .map_err(to_py_err)
    }

    #[pyo3(signature = (service_name, group_name=None))]
    fn select_all_instances(
        &self,
        py: Python<'_>,
        service_name: &str,
        group_name: Option<&str>,
    ) -> PyResult<Vec<Instance>> {
        py.allow_threads(|| self.inner.select_all_instances(service_name, group_name))
            .map(|all| all.into_iter().map(Instance::from).collect())
            .map_err(to_py_err)
    }
}

/// Keyed access to the shared registry: `Registry().init("svc1", {...})`, then query by key.
#[pyclass(frozen)]
struct Registry {
    module: Arc<HostModule>,
}

#[pymethods]
impl Registry {
    #[new]
    fn new() -> PyResult<Self> {
        Ok(Self { module: module()? })
    }

    fn init(&self, py: Python<'_>, key: &str, params: &Bound<'_, PyAny>) -> PyResult<()> {
        let value = args_to_value(py, params)?;
        py.allow_threads(|| self.module.init(key, &value)).map_err(to_py_err)
    }

    fn contains(&self, key: &str) -> bool {
        self.module.registry().contains(key)
    }

    fn keys(&self) -> Vec<String> {
        self.module.registry().keys()
    }

    #[pyo3(signature = (key, service_name, group_name=None))]
    fn select_one_healthy_instance(
        &self,
        py: Python<'_>,
        key: &str,
        service_name: &str,
        group_name: Option<&str>,
    ) -> PyResult<Instance> {
        py.allow_threads(|| self.module.select_one_healthy_instance(key, service_name, group_name))
            .map(Instance::from)
            .map_err(to_py_err)
    }

    #[pyo3(signature = (key, service_name, group_name=None))]
    fn select_all_instances(
        &self,
        py: Python<'_>,
        key: &str,
        service_name: &str,
        group_name: Option<&str>,
    ) -> PyResult<Vec<Instance>> {
        py.allow_threads(|| self.module.select_all_instances(key, service_name, group_name))
            .map(|all| all.into_iter().map(Instance::from).collect())
            .map_err(to_py_err)
    }
}

#[pymodule]
fn xnacos_native(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Instance>()?;
    m.add_class::<NacosClient>()?;
    m.add_class::<Registry>()?;
    Ok(())
}
