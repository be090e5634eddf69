//! Collects valid entries per machine.

use crate::model::{MachineGroups, ProgramEntry};

#[derive(Debug, Default)]
pub struct MachineGrouper {
    groups: MachineGroups,
}

impl MachineGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the entry's program id to its machine, keeping input order.
    pub fn add(&mut self, entry: ProgramEntry) {
        self.groups
            .entry(entry.machine_code)
            .or_default()
            .push(entry.program_id);
    }

    pub fn result(&self) -> &MachineGroups {
        &self.groups
    }

    pub fn into_groups(self) -> MachineGroups {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(machine: &str, program: &str) -> ProgramEntry {
        ProgramEntry {
            machine_code: machine.into(),
            program_id: program.into(),
        }
    }

    #[test]
    fn keeps_appearance_order_and_duplicates() {
        let mut grouper = MachineGrouper::new();
        grouper.add(entry("12", "0002"));
        grouper.add(entry("34", "0100"));
        grouper.add(entry("12", "0001"));
        grouper.add(entry("12", "0002"));

        let groups = grouper.into_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["12"], vec!["0002", "0001", "0002"]);
        assert_eq!(groups["34"], vec!["0100"]);
    }

    #[test]
    fn empty_grouper_has_no_machines() {
        assert!(MachineGrouper::new().result().is_empty());
    }
}
