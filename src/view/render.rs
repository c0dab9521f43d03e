use chrono::{DateTime, SubsecRound, Utc};
use poise::serenity_prelude as serenity;
use serenity::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedAuthor};

use super::Control;
use crate::pool::MessageRecord;

const JOB_LABEL: &str = "工作";
const SEA_LABEL: &str = "海港";
/// Content of the ephemeral reply carrying the Sea button.
pub const JOB_PROMPT: &str = "> 去跳海吧";

const CARD_AUTHOR: &str = "海港事件";
const CARD_OUTCOME_LABEL: &str = "事件結果";
const CARD_COLOUR: u32 = 0x007bff;

/// Top-level view attached to the presented message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootView {
    pub generation: u64,
}

impl RootView {
    pub fn new(generation: u64) -> Self {
        Self { generation }
    }

    pub fn job_control(&self) -> Control {
        Control::Job {
            generation: self.generation,
        }
    }

    pub fn components(&self) -> Vec<CreateActionRow> {
        let button = CreateButton::new(self.job_control().custom_id())
            .label(JOB_LABEL)
            .style(ButtonStyle::Primary);
        vec![CreateActionRow::Buttons(vec![button])]
    }
}

/// Ephemeral child view with the Sea button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeaView {
    pub issued_at: DateTime<Utc>,
}

impl SeaView {
    /// Custom ids carry milliseconds, so sub-millisecond precision is dropped here.
    pub fn new(issued_at: DateTime<Utc>) -> Self {
        Self {
            issued_at: issued_at.trunc_subsecs(3),
        }
    }

    pub fn sea_control(&self) -> Control {
        Control::Sea {
            issued_at: self.issued_at,
        }
    }

    pub fn components(&self) -> Vec<CreateActionRow> {
        let button = CreateButton::new(self.sea_control().custom_id())
            .label(SEA_LABEL)
            .style(ButtonStyle::Success);
        vec![CreateActionRow::Buttons(vec![button])]
    }
}

/// Display form of a revealed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCard {
    pub author: &'static str,
    pub title: String,
    pub description: String,
    pub outcome_label: &'static str,
    pub outcome: String,
}

impl From<&MessageRecord> for RecordCard {
    fn from(record: &MessageRecord) -> Self {
        Self {
            author: CARD_AUTHOR,
            title: record.title.clone(),
            description: format!("➤ {}", record.message),
            outcome_label: CARD_OUTCOME_LABEL,
            outcome: format!("• {}", record.outcome),
        }
    }
}

impl RecordCard {
    pub fn into_embed(self) -> CreateEmbed {
        CreateEmbed::new()
            .author(CreateEmbedAuthor::new(self.author))
            .title(self.title)
            .description(self.description)
            .colour(CARD_COLOUR)
            .field(self.outcome_label, self.outcome, true)
    }
}
