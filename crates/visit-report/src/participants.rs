use std::collections::BTreeMap;

use visit_model::{GroupCounts, ParticipantSummary, Roster, Sex};

/// Group x sex participant counts over the whole roster.
///
/// Withdrawn participants are counted under their own group. Participants
/// whose sex is neither male nor female only count towards `all`.
pub fn assemble_summary(roster: &Roster) -> ParticipantSummary {
    let mut groups: BTreeMap<&str, GroupCounts> = BTreeMap::new();
    for record in &roster.records {
        let counts = groups
            .entry(record.group.as_str())
            .or_insert_with(|| GroupCounts {
                group: record.group.clone(),
                ..GroupCounts::default()
            });
        counts.all += 1;
        match record.sex_category() {
            Sex::Male => counts.male += 1,
            Sex::Female => counts.female += 1,
            Sex::Other => {}
        }
    }
    ParticipantSummary {
        groups: groups.into_values().collect(),
    }
}
