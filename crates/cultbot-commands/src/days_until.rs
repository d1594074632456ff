//! `/daysuntiljuly17th`: countdown to the next July 17th.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use cultbot_core::{BotError, CommandHandler, CommandSpec, InboundRequest, ReplyController, Result};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days, rounded up, from `now` to the next July 17th (UTC midnight).
///
/// On July 17th itself the next occurrence is a year away.
pub fn days_until_july_17(now: DateTime<Utc>) -> Option<i64> {
    let this_year = Utc.with_ymd_and_hms(now.year(), 7, 17, 0, 0, 0).single()?;
    let target = if now >= this_year {
        Utc.with_ymd_and_hms(now.year() + 1, 7, 17, 0, 0, 0).single()?
    } else {
        this_year
    };

    let millis = (target - now).num_milliseconds();
    Some((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY)
}

pub struct DaysUntilCommand {
    spec: CommandSpec,
}

impl DaysUntilCommand {
    pub fn new() -> Self {
        Self {
            spec: CommandSpec::new(
                "daysuntiljuly17th",
                "Replies with how many days until the next July 17th.",
            ),
        }
    }
}

impl Default for DaysUntilCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for DaysUntilCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn execute(&self, request: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
        let days = days_until_july_17(request.created_at)
            .ok_or_else(|| BotError::Config("date out of range".to_string()))?;
        reply
            .acknowledge(format!("There are {} days until the next July 17th.", days))
            .await
    }
}
