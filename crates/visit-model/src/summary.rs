use serde::{Deserialize, Serialize};

/// Participant counts for one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    pub group: String,
    pub all: usize,
    pub male: usize,
    pub female: usize,
}

/// Group x sex cross-tabulation of a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    /// Sorted by group name.
    pub groups: Vec<GroupCounts>,
}

impl ParticipantSummary {
    pub fn group(&self, name: &str) -> Option<&GroupCounts> {
        self.groups.iter().find(|counts| counts.group == name)
    }

    pub fn total(&self) -> GroupCounts {
        self.groups.iter().fold(
            GroupCounts {
                group: "Total".to_string(),
                ..GroupCounts::default()
            },
            |mut total, counts| {
                total.all += counts.all;
                total.male += counts.male;
                total.female += counts.female;
                total
            },
        )
    }
}
