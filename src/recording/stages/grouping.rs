// src/recording/stages/grouping.rs
//! Form grouping
//!
//! Form interactions (`input`, `change`, `focus`, `blur`, `submit`) inside the
//! same form become one [`EventGroup`]. Form membership comes from the
//! [`FormResolver`]; events it cannot place are left ungrouped.

use crate::recording::event::{EventGroup, RecordedEvent};
use crate::recording::host::FormResolver;
use crate::recording::stages::BatchStats;
use std::collections::HashMap;
use tracing::trace;

/// Group form events by enclosing form and tag each member with its group id
///
/// Groups are named `Auto Group N` starting at `first_group_number`, in the
/// order their form first appears in the batch. Forms with a single event
/// produce no group.
pub fn group_form_events(
    events: &mut [RecordedEvent],
    resolver: &dyn FormResolver,
    first_group_number: usize,
    stats: &mut BatchStats,
) -> Vec<EventGroup> {
    let mut forms: Vec<(String, Vec<usize>)> = Vec::new();
    let mut form_index: HashMap<String, usize> = HashMap::new();

    for (i, event) in events.iter().enumerate() {
        if !event.event_type.is_form_interaction()
            || event.metadata.group.is_some()
            || event.is_synthetic()
        {
            continue;
        }

        let Some(form) = resolver.resolve_enclosing_form(&event.target.selector) else {
            trace!(event_id = %event.id, selector = %event.target.selector, "No enclosing form");
            continue;
        };

        match form_index.get(&form) {
            Some(&slot) => forms[slot].1.push(i),
            None => {
                form_index.insert(form.clone(), forms.len());
                forms.push((form, vec![i]));
            }
        }
    }

    let mut groups = Vec::new();
    for (form, members) in forms.into_iter().filter(|(_, members)| members.len() > 1) {
        let mut group = EventGroup::new(
            format!("Auto Group {}", first_group_number + groups.len()),
            Some(format!("Form interactions: {}", form)),
        );

        for i in members {
            events[i].metadata.group = Some(group.id.clone());
            group.events.push(events[i].id.clone());
        }

        stats.events_grouped += group.events.len();
        groups.push(group);
    }

    groups
}
