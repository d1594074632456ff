//! Plain-message and member-join reactions outside the slash command flow.

/// Text channel that receives join greetings.
pub const WELCOME_CHANNEL: &str = "没问题";

const AUTO_REPLY_TRIGGER: &str = "july 17th";
const AUTO_REPLY: &str = "Nothing ever happens";

/// Canned reply for a channel message, if it matches the trigger exactly.
pub fn auto_reply(content: &str, author_is_bot: bool) -> Option<&'static str> {
    if author_is_bot {
        return None;
    }
    (content.to_lowercase() == AUTO_REPLY_TRIGGER).then_some(AUTO_REPLY)
}

/// Greeting for a member who just joined.
pub fn welcome_message(user_tag: &str) -> String {
    format!(
        "Welcome {} to The cult!\nPlease read the rules in #rules.",
        user_tag
    )
}
