use crate::error::{LiberatorError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct ComposeFile {
    services: BTreeMap<String, ComposeService>,
}

#[derive(Debug, Serialize)]
struct ComposeService {
    build: String,
    ports: Vec<String>,
    /// Values are taken from the host environment, never from the source tree
    #[serde(skip_serializing_if = "Vec::is_empty")]
    environment: Vec<String>,
}

pub fn render_compose(service: &str, port: u16, env_keys: &[String]) -> Result<String> {
    let mut services = BTreeMap::new();
    services.insert(
        service.to_string(),
        ComposeService {
            build: ".".to_string(),
            ports: vec![format!("{}:{}", port, port)],
            environment: env_keys.iter().map(|k| format!("{}=${{{}}}", k, k)).collect(),
        },
    );

    serde_yaml::to_string(&ComposeFile { services }).map_err(|e| LiberatorError::Serialization {
        what: "docker-compose.yml".to_string(),
        reason: e.to_string(),
    })
}
