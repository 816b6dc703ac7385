use crate::time_entry::TimeEntry;

/// Accumulated durations for one project, in milliseconds.
///
/// Billable and discounted are mutually exclusive buckets; together they sum
/// to the total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectTally {
    pub total: i64,
    pub billable: i64,
    pub discounted: i64,
}

impl ProjectTally {
    fn add(&mut self, entry: &TimeEntry) {
        self.total += entry.dur;
        if entry.is_billable() {
            self.billable += entry.dur;
        } else {
            self.discounted += entry.dur;
        }
    }
}

/// Per-project tallies, in first-seen order of projects within the filtered
/// entry list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProjectTallies(Vec<(String, ProjectTally)>);

impl ProjectTallies {
    pub fn iter(&self) -> impl Iterator<Item = &(String, ProjectTally)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, project: &str) -> Option<&ProjectTally> {
        self.0
            .iter()
            .find(|(name, _)| name == project)
            .map(|(_, tally)| tally)
    }

    /// First occurrence of a project inserts a zero tally.
    fn entry_mut(&mut self, project: &str) -> &mut ProjectTally {
        let pos = match self.0.iter().position(|(name, _)| name == project) {
            Some(pos) => pos,
            None => {
                self.0.push((project.to_string(), ProjectTally::default()));
                self.0.len() - 1
            }
        };
        &mut self.0[pos].1
    }
}

/// Folds the flat entry list into per-project tallies for the given users.
///
/// Entries owned by other users are skipped. Called once with every
/// reportee's id for the combined section and once per individual reportee.
pub fn billable_by_project(entries: &[TimeEntry], user_ids: &[u64]) -> ProjectTallies {
    entries
        .iter()
        .filter(|entry| user_ids.contains(&entry.uid))
        .fold(ProjectTallies::default(), |mut tallies, entry| {
            tallies.entry_mut(&entry.project).add(entry);
            tallies
        })
}
