//! End-to-end dispatch of the built-in commands against in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cultbot_commands::{
    builtin_commands, ChatModel, GeneratedImage, ImageModel, Providers,
};
use cultbot_core::mocks::{RecordingResponder, Sent, StaticSource, StaticSummarizer};
use cultbot_core::{
    BotConfig, BotError, ChannelMessage, ChannelRef, CommandRegistry, CooldownTracker,
    DispatchOutcome, Dispatcher, InboundEvent, InboundRequest, OptionValue, Result, SummaryConfig,
    GENERIC_FAILURE,
};

const CHANNEL: u64 = 4242;

struct FixedChat(Option<String>);

#[async_trait]
impl ChatModel for FixedChat {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.0
            .clone()
            .ok_or_else(|| BotError::Transport("connection refused".to_string()))
    }
}

struct FixedImage(GeneratedImage);

#[async_trait]
impl ImageModel for FixedImage {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedImage> {
        Ok(self.0.clone())
    }
}

struct Harness {
    dispatcher: Dispatcher,
    summarizer: Arc<StaticSummarizer>,
}

fn harness(
    source: StaticSource,
    summarizer: StaticSummarizer,
    chat: Option<Arc<dyn ChatModel>>,
    image: Option<Arc<dyn ImageModel>>,
) -> Harness {
    let config = BotConfig::new().with_summary(SummaryConfig {
        summarize_timeout: Duration::from_millis(50),
        ..SummaryConfig::default()
    });
    let summarizer = Arc::new(summarizer);
    let providers = Providers {
        source: Arc::new(source),
        summarizer: summarizer.clone(),
        chat,
        image,
    };

    let registry = CommandRegistry::from_handlers(builtin_commands(&config, providers)).unwrap();
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::new(CooldownTracker::new(config.cooldown)),
    );
    Harness {
        dispatcher,
        summarizer,
    }
}

fn summarize_request(now: DateTime<Utc>, timeframe: Option<&str>) -> InboundEvent {
    let mut request = InboundRequest::new(1, 100, "summarize")
        .with_created_at(now)
        .with_option("channel", OptionValue::Channel(ChannelRef::new(CHANNEL)));
    if let Some(tf) = timeframe {
        request = request.with_option("timeframe", OptionValue::String(tf.to_string()));
    }
    InboundEvent::Command(request)
}

fn message(bot: bool, content: &str, now: DateTime<Utc>, days_ago: i64) -> ChannelMessage {
    ChannelMessage::new(bot, content, now - chrono::Duration::days(days_ago))
}

#[tokio::test]
async fn test_summarize_week_end_to_end() {
    let now = Utc::now();
    let source = StaticSource::new(vec![
        message(false, "planning the summer meetup", now, 0),
        message(true, "bot reminder: meetup soon", now, 1),
        message(false, "booked the venue downtown", now, 2),
        message(true, "bot: new member joined", now, 3),
        message(false, "tickets go on sale friday", now, 5),
    ]);
    let h = harness(source, StaticSummarizer::answering("Meetup planned."), None, None);
    let responder = Arc::new(RecordingResponder::new());

    let outcome = h
        .dispatcher
        .dispatch(summarize_request(now, Some("week")), responder.clone())
        .await;

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(
        h.summarizer.inputs(),
        vec!["planning the summer meetup booked the venue downtown tickets go on sale friday"
            .to_string()]
    );
    let sent = responder.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], Sent::Placeholder);
    assert_eq!(
        responder.last_content().as_deref(),
        Some("Summary of <#4242> (week):\nMeetup planned.")
    );
}

#[tokio::test]
async fn test_summarize_timeout_uses_fallback_text() {
    let now = Utc::now();
    let source = StaticSource::new(vec![message(false, "something to summarize", now, 0)]);
    let slow = StaticSummarizer::answering("too late").with_delay(Duration::from_millis(500));
    let h = harness(source, slow, None, None);
    let responder = Arc::new(RecordingResponder::new());

    let outcome = h
        .dispatcher
        .dispatch(summarize_request(now, Some("week")), responder.clone())
        .await;

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(
        responder.last_content().as_deref(),
        Some("Summary of <#4242> (week):\nUnable to generate summary.")
    );
}

#[tokio::test]
async fn test_summarize_nothing_relevant() {
    let now = Utc::now();
    let source = StaticSource::new(vec![
        message(true, "only bots here", now, 0),
        message(false, "old news from last month", now, 3),
    ]);
    let h = harness(source, StaticSummarizer::answering("unused"), None, None);
    let responder = Arc::new(RecordingResponder::new());

    h.dispatcher
        .dispatch(summarize_request(now, None), responder.clone())
        .await;

    assert!(h.summarizer.inputs().is_empty());
    assert_eq!(
        responder.last_content().as_deref(),
        Some("No relevant messages found in <#4242> for the specified timeframe (day).")
    );
}

#[tokio::test]
async fn test_summarize_fetch_failure() {
    let h = harness(
        StaticSource::failing(),
        StaticSummarizer::answering("unused"),
        None,
        None,
    );
    let responder = Arc::new(RecordingResponder::new());

    h.dispatcher
        .dispatch(summarize_request(Utc::now(), Some("day")), responder.clone())
        .await;

    assert_eq!(
        responder.last_content().as_deref(),
        Some("Error summarizing channel. Check my permissions or API status!")
    );
    assert_eq!(responder.edit_count(), 1);
}

#[tokio::test]
async fn test_summarize_without_channel_is_recovered() {
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        None,
        None,
    );
    let responder = Arc::new(RecordingResponder::new());
    let event = InboundEvent::Command(InboundRequest::new(1, 100, "summarize"));

    let outcome = h.dispatcher.dispatch(event, responder.clone()).await;

    assert_eq!(outcome, DispatchOutcome::Recovered);
    match responder.sent().as_slice() {
        [Sent::Ack(reply)] => {
            assert!(reply.ephemeral);
            assert_eq!(reply.content, GENERIC_FAILURE);
        }
        other => panic!("unexpected sends: {:?}", other),
    }
}

#[tokio::test]
async fn test_ask_formats_answer() {
    let chat: Arc<dyn ChatModel> = Arc::new(FixedChat(Some("Blue.".to_string())));
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        Some(chat),
        None,
    );
    let responder = Arc::new(RecordingResponder::new());
    let event = InboundEvent::Command(
        InboundRequest::new(1, 100, "4-1_mini")
            .with_option("prompt", OptionValue::String("Sky color?".to_string())),
    );

    h.dispatcher.dispatch(event, responder.clone()).await;

    assert_eq!(
        responder.last_content().as_deref(),
        Some("**Sky color?**:\n\nBlue.")
    );
}

#[tokio::test]
async fn test_ask_provider_failure_is_reported() {
    let chat: Arc<dyn ChatModel> = Arc::new(FixedChat(None));
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        Some(chat),
        None,
    );
    let responder = Arc::new(RecordingResponder::new());
    let event = InboundEvent::Command(
        InboundRequest::new(1, 100, "4-1_mini")
            .with_option("prompt", OptionValue::String("hello".to_string())),
    );

    let outcome = h.dispatcher.dispatch(event, responder.clone()).await;

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(
        responder.last_content().as_deref(),
        Some("⚠️ Something went wrong while contacting GPT-4.1 mini.")
    );
}

#[tokio::test]
async fn test_image_attaches_file() {
    let image: Arc<dyn ImageModel> = Arc::new(FixedImage(GeneratedImage::Image(vec![1, 2, 3])));
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        None,
        Some(image),
    );
    let responder = Arc::new(RecordingResponder::new());
    let event = InboundEvent::Command(
        InboundRequest::new(1, 100, "image")
            .with_option("prompt", OptionValue::String("a red fox".to_string())),
    );

    h.dispatcher.dispatch(event, responder.clone()).await;

    match responder.sent().last() {
        Some(Sent::Edit(reply)) => {
            assert_eq!(reply.content, "Here’s your AI image for: **a red fox**");
            assert_eq!(reply.attachments.len(), 1);
            assert_eq!(reply.attachments[0].filename, "generated.png");
            assert_eq!(reply.attachments[0].data, vec![1, 2, 3]);
        }
        other => panic!("unexpected send: {:?}", other),
    }
}

#[tokio::test]
async fn test_image_without_predictions() {
    let image: Arc<dyn ImageModel> = Arc::new(FixedImage(GeneratedImage::NoPredictions));
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        None,
        Some(image),
    );
    let responder = Arc::new(RecordingResponder::new());
    let event = InboundEvent::Command(
        InboundRequest::new(1, 100, "image")
            .with_option("prompt", OptionValue::String("???".to_string())),
    );

    h.dispatcher.dispatch(event, responder.clone()).await;

    assert_eq!(
        responder.last_content().as_deref(),
        Some("⚠️ No image generated. Try a different prompt.")
    );
}

#[tokio::test]
async fn test_image_unconfigured_sends_generic_failure() {
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        None,
        None,
    );
    let responder = Arc::new(RecordingResponder::new());
    let event = InboundEvent::Command(
        InboundRequest::new(1, 100, "image")
            .with_option("prompt", OptionValue::String("a red fox".to_string())),
    );

    let outcome = h.dispatcher.dispatch(event, responder.clone()).await;

    assert_eq!(outcome, DispatchOutcome::Recovered);
    assert_eq!(responder.last_content().as_deref(), Some(GENERIC_FAILURE));
}

#[tokio::test]
async fn test_simple_commands_and_cooldown() {
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        None,
        None,
    );

    let first = Arc::new(RecordingResponder::new());
    let outcome = h
        .dispatcher
        .dispatch(
            InboundEvent::Command(InboundRequest::new(1, 100, "commands")),
            first.clone(),
        )
        .await;
    assert_eq!(outcome, DispatchOutcome::Completed);
    let listing = first.last_content().unwrap();
    assert!(listing.starts_with("Commands:\n/4-1_mini - "));
    assert!(listing.contains("\n/summarize - "));

    let second = Arc::new(RecordingResponder::new());
    let outcome = h
        .dispatcher
        .dispatch(
            InboundEvent::Command(InboundRequest::new(2, 100, "ping")),
            second.clone(),
        )
        .await;
    assert!(matches!(outcome, DispatchOutcome::RateLimited { .. }));

    let other_user = Arc::new(RecordingResponder::new());
    h.dispatcher
        .dispatch(
            InboundEvent::Command(
                InboundRequest::new(3, 101, "ping")
                    .with_gateway_latency(Some(Duration::from_millis(42))),
            ),
            other_user.clone(),
        )
        .await;
    let report = other_user.last_content().unwrap();
    assert!(report.starts_with("Connection:\n--> Bot Latency: "));
    assert!(report.ends_with("\n--> API Latency: 42ms"));
}

#[test]
fn test_builtin_registry_names() {
    let h = harness(
        StaticSource::default(),
        StaticSummarizer::answering("unused"),
        None,
        None,
    );
    assert_eq!(
        h.dispatcher.registry().list(),
        vec![
            "4-1_mini",
            "commands",
            "daysuntiljuly17th",
            "image",
            "ping",
            "summarize"
        ]
    );
}
