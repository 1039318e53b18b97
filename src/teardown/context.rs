use crate::stack::StackIdentity;

/// Switches for the optional teardown steps. Destroy always runs.
#[derive(Debug, Clone, Default)]
pub struct TeardownOptions {
    pub remove_lock: bool,
    pub remove_pending_operations: bool,
    pub ignore_pending_create_operations: bool,
    pub refresh_before_destroy: bool,
    pub remove_stack: bool,
    /// Resource URNs scoping refresh and destroy, in the order given.
    pub targets: Vec<String>,
}

pub struct TeardownContext {
    pub identity: StackIdentity,
    pub options: TeardownOptions,
}

impl TeardownContext {
    pub fn new(identity: StackIdentity, options: TeardownOptions) -> Self {
        Self { identity, options }
    }

    pub fn stack(&self) -> &str {
        &self.identity.stack
    }
}
