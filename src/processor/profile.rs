//! Machine profile lookup for a machine group.

use tracing::debug;

use crate::error::Result;
use crate::model::{MachineProfile, machine_number};
use crate::store::ProfileStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(MachineProfile),
    NotFound,
}

/// Look up the profile for a two-digit machine code.
///
/// A missing profile is `Ok(NotFound)`; only a failing store is an error.
pub fn resolve(store: &dyn ProfileStore, machine_code: &str) -> Result<Resolution> {
    let number = machine_number(machine_code);
    match store.get(number)? {
        Some(profile) => Ok(Resolution::Found(profile)),
        None => {
            debug!(machine = number, "no machine profile");
            Ok(Resolution::NotFound)
        }
    }
}
