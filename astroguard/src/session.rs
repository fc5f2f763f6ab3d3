//! Multi-turn query session.
//!
//! Holds the dataset, the intent of the previous turn (used for follow-up
//! filters), the audit trail and the conversation transcript.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::generator::Dataset;
use crate::query::{QueryAction, QueryIntent, QueryProcessor, QueryResult};

pub const WELCOME_MESSAGE: &str = "Welcome to AstroGuard! I'm your AI copilot for ISRO \
cybersecurity. Ask me about failed logins, mission-critical events, telemetry access, or any \
security concerns.";

/// Turns kept in the audit log and transcript before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One processed query, flattened the way the audit log is exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub intent: QueryAction,
    pub confidence: f64,
    pub dsl_query: String,
    pub kql_query: String,
    pub results_count: usize,
    pub summary: String,
}

impl AuditLogEntry {
    fn from_result(id: String, timestamp: DateTime<Utc>, query: &str, result: &QueryResult) -> Self {
        Self {
            id,
            timestamp,
            query: query.to_string(),
            intent: result.intent.action,
            confidence: result.intent.confidence,
            dsl_query: result.dsl_query.clone(),
            kql_query: result.kql_query.clone(),
            results_count: result.events.len(),
            summary: result.summary.clone(),
        }
    }
}

/// Queries are serialized: `submit` borrows the session mutably, so a second
/// query cannot start before the first has been recorded.
#[derive(Debug)]
pub struct QuerySession {
    dataset: Dataset,
    processor: QueryProcessor,
    processing_delay: Duration,
    previous: Option<QueryIntent>,
    last_result: Option<QueryResult>,
    audit_log: VecDeque<AuditLogEntry>,
    conversation: Vec<ConversationMessage>,
    history_limit: usize,
    turns: usize,
}

impl QuerySession {
    pub fn new(dataset: Dataset, config: &Configuration) -> Self {
        Self::with_processor(
            dataset,
            QueryProcessor::from_config(config),
            config.processing_delay(),
        )
    }

    pub fn with_processor(
        dataset: Dataset,
        processor: QueryProcessor,
        processing_delay: Duration,
    ) -> Self {
        info!("Query session started over {} events", dataset.len());

        let welcome = ConversationMessage {
            id: "welcome".to_string(),
            role: MessageRole::Assistant,
            content: WELCOME_MESSAGE.to_string(),
            timestamp: Utc::now(),
        };

        Self {
            dataset,
            processor,
            processing_delay,
            previous: None,
            last_result: None,
            audit_log: VecDeque::new(),
            conversation: vec![welcome],
            history_limit: DEFAULT_HISTORY_LIMIT,
            turns: 0,
        }
    }

    /// Caps how many turns the audit log and transcript retain. The welcome
    /// message is always kept.
    pub fn with_history_limit(mut self, turns: usize) -> Self {
        self.history_limit = turns.max(1);
        self.trim_history();
        self
    }

    /// Waits the configured processing delay, then processes `text` against
    /// the local clock.
    pub async fn submit(&mut self, text: &str) -> &QueryResult {
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }
        self.submit_at(text, Local::now())
    }

    /// Processes `text` immediately with an injected "now".
    pub fn submit_at<Tz: TimeZone>(&mut self, text: &str, now: DateTime<Tz>) -> &QueryResult {
        self.turns += 1;
        let recorded_at = now.with_timezone(&Utc);

        self.conversation.push(ConversationMessage {
            id: format!("user-{}", self.turns),
            role: MessageRole::User,
            content: text.to_string(),
            timestamp: recorded_at,
        });

        let result =
            self.processor
                .process_at(text, self.dataset.events(), self.previous.as_ref(), now);

        info!(
            "Query '{}' matched {} events (confidence {:.1})",
            text,
            result.events.len(),
            result.intent.confidence
        );

        self.audit_log.push_front(AuditLogEntry::from_result(
            format!("audit-{}", self.turns),
            recorded_at,
            text,
            &result,
        ));

        self.conversation.push(ConversationMessage {
            id: format!("assistant-{}", self.turns),
            role: MessageRole::Assistant,
            content: result.summary.clone(),
            timestamp: recorded_at,
        });

        self.trim_history();

        self.previous = Some(result.intent.clone());
        self.last_result.insert(result)
    }

    fn trim_history(&mut self) {
        self.audit_log.truncate(self.history_limit);

        let max_messages = 1 + 2 * self.history_limit;
        if self.conversation.len() > max_messages {
            let excess = self.conversation.len() - max_messages;
            self.conversation.drain(1..1 + excess);
        }
    }

    /// Forget the previous intent so the next "filter" starts fresh.
    pub fn reset_context(&mut self) {
        info!("Query context reset");
        self.previous = None;
    }

    pub fn previous_intent(&self) -> Option<&QueryIntent> {
        self.previous.as_ref()
    }

    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    /// Audit entries, newest first.
    pub fn audit_log(&self) -> impl Iterator<Item = &AuditLogEntry> {
        self.audit_log.iter()
    }

    pub fn audit_log_len(&self) -> usize {
        self.audit_log.len()
    }

    pub fn audit_log_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.audit_log)
    }

    pub fn conversation(&self) -> &[ConversationMessage] {
        &self.conversation
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astroguard_common::{EventType, SecurityEvent, Severity};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn session() -> QuerySession {
        let events = vec![
            SecurityEvent::new("EVT-000001", EventType::FailedLogin)
                .with_timestamp(now() - chrono::Duration::hours(2))
                .with_severity(Severity::High),
            SecurityEvent::new("EVT-000002", EventType::VpnConnection)
                .with_timestamp(now() - chrono::Duration::days(3))
                .with_severity(Severity::Low),
        ];
        QuerySession::with_processor(
            Dataset::from_events(events),
            QueryProcessor::new(),
            Duration::ZERO,
        )
    }

    mod conversation_behavior {
        use super::*;

        #[test]
        fn should_open_with_welcome_message() {
            let session = session();

            assert_eq!(session.conversation().len(), 1);
            assert_eq!(session.conversation()[0].id, "welcome");
            assert_eq!(session.conversation()[0].role, MessageRole::Assistant);
        }

        #[test]
        fn should_append_user_and_assistant_messages() {
            let mut session = session();

            let summary = session.submit_at("show failed logins", now()).summary.clone();

            let messages = session.conversation();
            assert_eq!(messages.len(), 3);
            assert_eq!(messages[1].role, MessageRole::User);
            assert_eq!(messages[1].content, "show failed logins");
            assert_eq!(messages[2].role, MessageRole::Assistant);
            assert_eq!(messages[2].content, summary);
        }
    }

    mod audit_behavior {
        use super::*;

        #[test]
        fn should_record_newest_entry_first() {
            let mut session = session();

            session.submit_at("show vpn", now());
            session.submit_at("count failed logins", now());

            let ids: Vec<_> = session.audit_log().map(|e| e.id.as_str()).collect();
            assert_eq!(ids, vec!["audit-2", "audit-1"]);
        }

        #[test]
        fn should_capture_result_details() {
            let mut session = session();

            session.submit_at("count failed logins", now());

            let entry = session.audit_log().next().unwrap();
            assert_eq!(entry.intent, QueryAction::Count);
            assert_eq!(entry.results_count, 1);
            assert_eq!(entry.kql_query, "eventType:(failed_login)");
            assert_eq!(entry.confidence, 0.7);
        }

        #[test]
        fn should_export_audit_log_as_json() {
            let mut session = session();
            session.submit_at("show vpn", now());

            let json = session.audit_log_json().unwrap();

            assert!(json.contains("\"resultsCount\": 1"));
            assert!(json.contains("\"dslQuery\""));
        }
    }

    mod context_behavior {
        use super::*;

        #[test]
        fn should_carry_previous_intent_into_follow_up_filter() {
            let mut session = session();
            session.submit_at("show failed logins last 7 days", now());

            let result = session.submit_at("filter high risk", now());

            assert_eq!(
                result.intent.entities.event_type,
                Some(vec![EventType::FailedLogin])
            );
            assert_eq!(result.events.len(), 1);
        }

        #[test]
        fn should_forget_previous_intent_after_reset() {
            let mut session = session();
            session.submit_at("show failed logins", now());

            session.reset_context();
            let result = session.submit_at("filter", now());

            assert!(result.intent.entities.is_empty());
            assert_eq!(result.events.len(), 2);
        }
    }

    mod history_limit {
        use super::*;

        #[test]
        fn should_drop_oldest_turns_beyond_limit() {
            let mut session = session().with_history_limit(2);

            session.submit_at("show vpn", now());
            session.submit_at("show malware", now());
            session.submit_at("count failed logins", now());

            let ids: Vec<_> = session.audit_log().map(|e| e.id.as_str()).collect();
            assert_eq!(ids, vec!["audit-3", "audit-2"]);

            let messages: Vec<_> = session.conversation().iter().map(|m| m.id.as_str()).collect();
            assert_eq!(
                messages,
                vec!["welcome", "user-2", "assistant-2", "user-3", "assistant-3"]
            );
        }

        #[test]
        fn should_keep_everything_under_default_limit() {
            let mut session = session();

            for _ in 0..10 {
                session.submit_at("show vpn", now());
            }

            assert_eq!(session.audit_log_len(), 10);
            assert_eq!(session.conversation().len(), 21);
        }
    }

    #[tokio::test]
    async fn should_process_after_delay() {
        let mut session = QuerySession::with_processor(
            Dataset::from_events(Vec::new()),
            QueryProcessor::new(),
            Duration::from_millis(5),
        );

        let result = session.submit("show malware").await;

        assert_eq!(result.summary, "Found 0 security events matching type: malware detection.");
        assert!(session.last_result().is_some());
    }
}
