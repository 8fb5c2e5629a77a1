// ABOUTME: Inspector answering from a fixed table of containers.
// ABOUTME: Lets orchestrator tests control names, states and published ports.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use stevedore::runtime::{ContainerInfo, ContainerState, InspectError, Inspector, PortBinding};
use stevedore::types::ContainerId;

/// A running container named `name` (with the runtime's leading '/').
pub fn container(id: &str, name: &str) -> ContainerInfo {
    ContainerInfo {
        id: ContainerId::new(id),
        name: name.to_string(),
        image: "busybox:latest".to_string(),
        state: ContainerState {
            running: true,
            status: "running".to_string(),
        },
        ports: HashMap::new(),
    }
}

/// Same as [`container`], publishing `port/tcp` on `host_port`.
pub fn container_with_port(id: &str, name: &str, port: u16, host_port: u16) -> ContainerInfo {
    let mut info = container(id, name);
    info.ports.insert(
        format!("{port}/tcp"),
        vec![PortBinding {
            host_ip: "0.0.0.0".to_string(),
            host_port: host_port.to_string(),
        }],
    );
    info
}

#[derive(Default)]
pub struct FakeInspector {
    containers: Mutex<HashMap<String, ContainerInfo>>,
    inspected: Mutex<Vec<String>>,
}

impl FakeInspector {
    pub fn new(containers: impl IntoIterator<Item = ContainerInfo>) -> Self {
        let inspector = Self::default();
        for info in containers {
            inspector.insert(info);
        }
        inspector
    }

    pub fn insert(&self, info: ContainerInfo) {
        self.containers
            .lock()
            .insert(info.id.as_str().to_string(), info);
    }

    pub fn remove(&self, id: &str) {
        self.containers.lock().remove(id);
    }

    /// Ids inspected so far, in order.
    pub fn inspected(&self) -> Vec<String> {
        self.inspected.lock().clone()
    }
}

#[async_trait]
impl Inspector for FakeInspector {
    async fn inspect(&self, id: &ContainerId) -> Result<ContainerInfo, InspectError> {
        self.inspected.lock().push(id.as_str().to_string());
        self.containers
            .lock()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| InspectError::NotFound { id: id.clone() })
    }
}
