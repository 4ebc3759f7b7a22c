//! Team schedule: staff-maintained daily plan of meals, sessions and meetings

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, SquadError, ValidationError};
use crate::models::{Profile, ScheduleItem};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    items: Vec<ScheduleItem>,
}

fn require_staff(actor: &Profile, action: &str) -> Result<()> {
    if actor.is_staff() {
        Ok(())
    } else {
        Err(SquadError::Authorization(format!(
            "{} ({}) cannot {}",
            actor.display_name, actor.role, action
        )))
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item; staff and admins only
    pub fn add_item(&mut self, actor: &Profile, item: ScheduleItem) -> Result<Uuid> {
        require_staff(actor, "edit the schedule")?;

        if item.title.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "title".to_string(),
            }
            .into());
        }

        if let (Some(start), Some(end)) = (item.start_time, item.end_time) {
            if end < start {
                return Err(ValidationError::InvalidTimeRange {
                    start: start.format("%H:%M").to_string(),
                    end: end.format("%H:%M").to_string(),
                }
                .into());
            }
        }

        let id = item.id;
        info!(item = %id, date = %item.date, activity = %item.activity, "schedule item added");
        self.items.push(item);
        Ok(id)
    }

    /// Remove an item by id; staff and admins only
    pub fn remove_item(&mut self, actor: &Profile, id: Uuid) -> Result<ScheduleItem> {
        require_staff(actor, "edit the schedule")?;

        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| SquadError::NotFound {
                kind: "schedule item".to_string(),
                id: id.to_string(),
            })?;

        info!(item = %id, "schedule item removed");
        Ok(self.items.remove(position))
    }

    /// Items for one day, by sort order then start time, untimed items last
    pub fn day(&self, date: NaiveDate) -> Vec<&ScheduleItem> {
        let mut items: Vec<&ScheduleItem> = self.items.iter().filter(|i| i.date == date).collect();
        items.sort_by_key(|item| (item.sort_order, item.start_time.is_none(), item.start_time));
        items
    }
}
