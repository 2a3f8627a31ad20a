//! Host inclusion filter applied before any rule runs.

use crate::host::HostRef;
use tracing::debug;

/// Narrows the caller's host set to the hosts that can be audited.
///
/// Only connected hosts and hosts in maintenance mode pass. Virtual witness
/// appliances are dropped unless explicitly included.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFilter {
    include_witness: bool,
}

impl HostFilter {
    pub fn new(include_witness: bool) -> Self {
        Self { include_witness }
    }

    pub fn accepts(&self, host: &HostRef) -> bool {
        host.connection_state.is_reachable()
            && (self.include_witness || !host.is_virtual_appliance())
    }

    /// Keep accepted hosts in their original order.
    pub fn apply<'a>(&self, hosts: &'a [HostRef]) -> Vec<&'a HostRef> {
        hosts
            .iter()
            .filter(|host| {
                let accepted = self.accepts(host);
                if !accepted {
                    debug!(
                        host = %host.name,
                        state = %host.connection_state,
                        model = %host.model,
                        "Host excluded by filter"
                    );
                }
                accepted
            })
            .collect()
    }
}
