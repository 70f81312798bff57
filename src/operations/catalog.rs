//! Built-in console operations
//!
//! The console drives a fixed set of backend tasks. Each entry maps a stable
//! operation id to the task file the backend runs.

use super::Operation;

const BUILTIN: [(&str, &str, &str); 10] = [
    (
        "validate-capa-environment",
        "Validate CAPA environment",
        "tasks/validate-capa-environment.yml",
    ),
    ("validate-mce", "Validate MCE", "tasks/validate-mce.yml"),
    (
        "check-components",
        "Check components",
        "tasks/get_mce_component_status.yml",
    ),
    (
        "enable-capi-capa",
        "Enable CAPI/CAPA",
        "tasks/enable_capi_capa.yml",
    ),
    (
        "capi-capa-status",
        "Get CAPI/CAPA status",
        "tasks/get_capi_capa_status.yml",
    ),
    (
        "create-ocm-secret",
        "Create OCM secret",
        "tasks/create_ocm_secret.yml",
    ),
    (
        "provision-rosa-network",
        "Provision ROSA network",
        "tasks/create_rosa_network.yml",
    ),
    (
        "create-rosa-cluster",
        "Create ROSA HCP cluster",
        "tasks/create_rosa_hcp_cluster.yml",
    ),
    (
        "delete-rosa-cluster",
        "Delete ROSA HCP cluster",
        "tasks/delete_rosa_hcp_cluster.yml",
    ),
    (
        "remove-rosa-network",
        "Remove ROSA network",
        "tasks/delete_rosa_network.yml",
    ),
];

/// Registry of operations the console can dispatch
pub struct OperationCatalog {
    operations: Vec<Operation>,
}

impl OperationCatalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            operations: Vec::new(),
        };

        for (id, title, task_file) in BUILTIN {
            catalog.register(Operation::for_task(id, title, task_file));
        }

        catalog
    }

    /// Add an operation, replacing any existing one with the same id
    pub fn register(&mut self, operation: Operation) {
        self.operations.retain(|op| op.id != operation.id);
        self.operations.push(operation);
    }

    pub fn get(&self, id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn all(&self) -> &[Operation] {
        &self.operations
    }
}

impl Default for OperationCatalog {
    fn default() -> Self {
        Self::new()
    }
}
