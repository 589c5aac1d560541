//! Board rendering: turns a snapshot of active scrims into one complete
//! board body.
//!
//! Layout (one embed field per line item):
//!
//! ```text
//! 📅 **TUESDAY 23/12**        ━━━━━━━━━━━━━━━━
//! **ALPHA**                   🕒 <t:…:t> → <t:…:t>
//!                             👤 **Contact:** …
//! (zero-width separator between days)
//! 📅 **WEDNESDAY 24/12**      ━━━━━━━━━━━━━━━━
//! ```
//!
//! Times are Discord timestamp tokens so every viewer sees their own local
//! time; only the day grouping uses the configured timezone.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use scrimboard_channels::{BoardField, RenderedBoard};
use scrimboard_core::Scrim;

use crate::error::BoardError;

pub const BOARD_TITLE: &str = "⚔️  SCRIM SCHEDULE  ⚔️";
pub const EMPTY_DESCRIPTION: &str = "No scrims scheduled";
/// Discord rejects embeds with more fields than this.
pub const MAX_FIELDS: usize = 25;

const PLACEHOLDER_TITLE: &str = "Upcoming Scrims";
const PLACEHOLDER_DESCRIPTION: &str = "No scrims yet";
const ZERO_WIDTH: &str = "\u{200b}";
const DAY_RULE: &str = "━━━━━━━━━━━━━━━━";

/// Body posted when a board message has to be created from scratch.
pub fn placeholder_board() -> RenderedBoard {
    RenderedBoard {
        title: PLACEHOLDER_TITLE.to_string(),
        description: PLACEHOLDER_DESCRIPTION.to_string(),
        fields: Vec::new(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoardRenderer {
    tz: Tz,
}

impl BoardRenderer {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Render the full board. Deterministic for a given input; scrims that
    /// have already ended at `now` are left out.
    pub fn render(
        &self,
        scrims: &[Scrim],
        now: DateTime<Utc>,
    ) -> Result<RenderedBoard, BoardError> {
        let mut by_day: BTreeMap<NaiveDate, Vec<&Scrim>> = BTreeMap::new();
        for scrim in scrims.iter().filter(|s| s.end > now) {
            let day = scrim.start.with_timezone(&self.tz).date_naive();
            by_day.entry(day).or_default().push(scrim);
        }

        if by_day.is_empty() {
            return Ok(RenderedBoard {
                title: BOARD_TITLE.to_string(),
                description: EMPTY_DESCRIPTION.to_string(),
                fields: Vec::new(),
            });
        }

        let mut fields = Vec::new();
        for (i, (day, mut day_scrims)) in by_day.into_iter().enumerate() {
            if i > 0 {
                fields.push(BoardField::new(ZERO_WIDTH, ZERO_WIDTH));
            }
            fields.push(day_header(day));

            day_scrims.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)));
            fields.extend(day_scrims.into_iter().map(scrim_field));
        }

        if fields.len() > MAX_FIELDS {
            return Err(BoardError::TooManyFields {
                count: fields.len(),
                max: MAX_FIELDS,
            });
        }

        Ok(RenderedBoard {
            title: BOARD_TITLE.to_string(),
            description: ZERO_WIDTH.to_string(),
            fields,
        })
    }
}

fn day_header(day: NaiveDate) -> BoardField {
    let weekday = day.format("%A").to_string().to_uppercase();
    BoardField::new(
        format!("📅 **{} {}**", weekday, day.format("%d/%m")),
        DAY_RULE,
    )
}

fn scrim_field(scrim: &Scrim) -> BoardField {
    let mut lines = vec![format!(
        "🕒 <t:{}:t> → <t:{}:t>",
        scrim.start.timestamp(),
        scrim.end.timestamp()
    )];
    if let Some(contact) = scrim.contact() {
        lines.push(format!("👤 **Contact:** {contact}"));
    }
    if let Some(note) = scrim.note() {
        lines.push(format!("📝 **Note:** {note}"));
    }
    BoardField::new(format!("**{}**", scrim.name.to_uppercase()), lines.join("\n"))
}
