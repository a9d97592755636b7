//! Session state and the controller that owns it.
//!
//! One `SessionController` exists per user session and is the single writer
//! of the transcript, the morph state, and the visual tuning. The remote
//! call is the only suspension point; the exchange is split into a `begin`
//! and a `resolve` half so the UI can observe the pending flag while the
//! request is in flight. [`SessionController::submit`] composes the two
//! halves for callers that can await in place.

use crate::core::concierge::{Concierge, ConciergeError};
use crate::core::constants::FALLBACK_REPLY;
use crate::core::message::Message;
use crate::core::morph::{morph_intent, MorphState};
use crate::core::tuning::{TuningSource, VisualTuning};

/// An exchange that has been opened but not yet answered. Carries the
/// trimmed input and a snapshot of the transcript as it existed before the
/// user turn was appended, which is exactly what the concierge receives.
pub struct PendingExchange {
    pub input: String,
    pub history: Vec<Message>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only input; nothing changed.
    Ignored,
    Completed { fallback_used: bool },
}

pub struct SessionController {
    transcript: Vec<Message>,
    morph: MorphState,
    tuning: VisualTuning,
    tuning_source: Box<dyn TuningSource + Send>,
    in_flight: usize,
}

impl SessionController {
    pub fn new(tuning: VisualTuning, tuning_source: Box<dyn TuningSource + Send>) -> Self {
        Self {
            transcript: Vec::new(),
            morph: MorphState::Assembled,
            tuning,
            tuning_source,
            in_flight: 0,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn morph(&self) -> MorphState {
        self.morph
    }

    pub fn tuning(&self) -> &VisualTuning {
        &self.tuning
    }

    /// True while at least one exchange awaits its reply.
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Flip the morph state unconditionally, independent of conversation
    /// state. Returns the new value.
    pub fn toggle_morph(&mut self) -> MorphState {
        self.morph = self.morph.toggled();
        self.morph
    }

    /// Open an exchange: trim the input, append the user turn, and raise the
    /// pending flag. Returns `None` for empty input, in which case nothing
    /// was changed.
    pub fn begin_exchange(&mut self, raw: &str) -> Option<PendingExchange> {
        let input = raw.trim();
        if input.is_empty() {
            return None;
        }

        let history = self.transcript.clone();
        self.transcript.push(Message::user(input));
        self.in_flight += 1;

        Some(PendingExchange {
            input: input.to_string(),
            history,
        })
    }

    /// Close an exchange: lower the pending flag, append the assistant turn
    /// (the fallback apology if the concierge failed), reroll the visual
    /// tuning, and apply morph intent from the user input. Returns whether
    /// the fallback was used.
    pub fn resolve_exchange(
        &mut self,
        exchange: &PendingExchange,
        result: Result<String, ConciergeError>,
    ) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        let fallback_used = result.is_err();
        let reply = match result {
            Ok(text) => text,
            Err(_) => FALLBACK_REPLY.to_string(),
        };
        self.transcript.push(Message::assistant(reply));

        self.tuning.reroll(self.tuning_source.as_mut());

        if let Some(target) = morph_intent(&exchange.input) {
            self.morph = target;
        }

        fallback_used
    }

    /// Run one full exchange against `concierge`. Appends exactly one user
    /// turn and one assistant turn by the time it settles, regardless of
    /// remote success or failure.
    pub async fn submit(&mut self, raw: &str, concierge: &dyn Concierge) -> SubmitOutcome {
        let Some(exchange) = self.begin_exchange(raw) else {
            return SubmitOutcome::Ignored;
        };

        let result = concierge.reply(&exchange.input, &exchange.history).await;
        let fallback_used = self.resolve_exchange(&exchange, result);

        SubmitOutcome::Completed { fallback_used }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tuning::test_support::ScriptedTuningSource;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedConcierge {
        replies: Mutex<Vec<Result<String, ConciergeError>>>,
        calls: Mutex<Vec<(String, Vec<Message>)>>,
    }

    impl ScriptedConcierge {
        fn new(replies: Vec<Result<String, ConciergeError>>) -> Self {
            let mut replies = replies;
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn always(reply: &str) -> Self {
            Self::new(vec![Ok(reply.to_string())])
        }

        fn failing() -> Self {
            Self::new(vec![Err(ConciergeError::EmptyReply)])
        }

        fn calls(&self) -> Vec<(String, Vec<Message>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Concierge for ScriptedConcierge {
        async fn reply(
            &self,
            input: &str,
            history: &[Message],
        ) -> Result<String, ConciergeError> {
            self.calls
                .lock()
                .unwrap()
                .push((input.to_string(), history.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("as you wish".to_string()))
        }
    }

    fn controller() -> SessionController {
        SessionController::new(
            VisualTuning::default(),
            Box::new(ScriptedTuningSource::new(vec![0.5, 0.25])),
        )
    }

    #[tokio::test]
    async fn submit_appends_one_user_and_one_assistant_turn() {
        let mut session = controller();
        let concierge = ScriptedConcierge::always("A most splendid wish.");

        let outcome = session.submit("Hello there", &concierge).await;

        assert_eq!(outcome, SubmitOutcome::Completed { fallback_used: false });
        assert_eq!(session.transcript().len(), 2);
        assert!(session.transcript()[0].is_user());
        assert_eq!(session.transcript()[0].content, "Hello there");
        assert!(session.transcript()[1].is_assistant());
        assert_eq!(session.transcript()[1].content, "A most splendid wish.");
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn blank_input_is_silently_ignored() {
        let mut session = controller();
        let concierge = ScriptedConcierge::always("unreachable");

        let morph_before = session.morph();
        let tuning_before = session.tuning().clone();

        assert_eq!(session.submit("", &concierge).await, SubmitOutcome::Ignored);
        assert_eq!(session.submit("   \t\n", &concierge).await, SubmitOutcome::Ignored);

        assert!(session.transcript().is_empty());
        assert_eq!(session.morph(), morph_before);
        assert_eq!(session.tuning(), &tuning_before);
        assert!(concierge.calls().is_empty());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_recording_and_sending() {
        let mut session = controller();
        let concierge = ScriptedConcierge::always("noted");

        session.submit("  scatter please  ", &concierge).await;

        assert_eq!(session.transcript()[0].content, "scatter please");
        assert_eq!(concierge.calls()[0].0, "scatter please");
    }

    #[tokio::test]
    async fn concierge_failure_yields_fallback_turn() {
        let mut session = controller();
        let concierge = ScriptedConcierge::failing();

        let outcome = session.submit("Hello", &concierge).await;

        assert_eq!(outcome, SubmitOutcome::Completed { fallback_used: true });
        assert_eq!(session.transcript().len(), 2);
        let reply = &session.transcript()[1];
        assert!(reply.is_assistant());
        assert!(!reply.content.is_empty());
        assert_eq!(reply.content, FALLBACK_REPLY);
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn failure_still_rerolls_tuning_and_applies_intent() {
        let mut session = controller();
        let concierge = ScriptedConcierge::failing();
        let tuning_before = session.tuning().clone();

        session.submit("scatter everything", &concierge).await;

        assert_eq!(session.morph(), MorphState::Scattered);
        assert_ne!(session.tuning(), &tuning_before);
    }

    #[tokio::test]
    async fn history_sent_is_the_transcript_before_the_current_turn() {
        let mut session = controller();
        let concierge = ScriptedConcierge::new(vec![
            Ok("first reply".to_string()),
            Ok("second reply".to_string()),
            Ok("third reply".to_string()),
        ]);

        session.submit("one", &concierge).await;
        session.submit("two", &concierge).await;
        session.submit("three", &concierge).await;

        let calls = concierge.calls();
        assert!(calls[0].1.is_empty());
        assert_eq!(
            calls[1].1,
            vec![Message::user("one"), Message::assistant("first reply")]
        );
        assert_eq!(
            calls[2].1,
            vec![
                Message::user("one"),
                Message::assistant("first reply"),
                Message::user("two"),
                Message::assistant("second reply"),
            ]
        );
    }

    #[tokio::test]
    async fn morph_transitions_follow_keyword_rules() {
        let mut session = controller();
        let concierge = ScriptedConcierge::always("indeed");

        session.submit("scatter the lights", &concierge).await;
        assert_eq!(session.morph(), MorphState::Scattered);

        session.submit("Please form the tree now", &concierge).await;
        assert_eq!(session.morph(), MorphState::Assembled);

        session.submit("Merry Christmas!", &concierge).await;
        assert_eq!(session.morph(), MorphState::Assembled);

        session.submit("scatter this tree", &concierge).await;
        assert_eq!(session.morph(), MorphState::Scattered);
    }

    #[tokio::test]
    async fn tuning_rerolls_within_ranges_after_each_exchange() {
        use crate::core::tuning::{BRIGHTNESS_MAX, BRIGHTNESS_MIN, SPIN_RATE_MAX, SPIN_RATE_MIN};

        let mut session = SessionController::new(
            VisualTuning::default(),
            Box::new(ScriptedTuningSource::new(vec![0.0, 0.999, 0.5])),
        );
        let concierge = ScriptedConcierge::always("certainly");

        for input in ["a wish", "another wish", "a third wish"] {
            session.submit(input, &concierge).await;
            let tuning = session.tuning();
            assert!((BRIGHTNESS_MIN..=BRIGHTNESS_MAX).contains(&tuning.brightness));
            assert!((SPIN_RATE_MIN..=SPIN_RATE_MAX).contains(&tuning.spin_rate));
        }
    }

    #[test]
    fn toggle_morph_twice_restores_the_original_state() {
        let mut session = controller();
        let original = session.morph();

        assert_eq!(session.toggle_morph(), original.toggled());
        assert_eq!(session.toggle_morph(), original);
    }

    #[test]
    fn toggle_morph_is_independent_of_conversation_state() {
        let mut session = controller();
        assert!(session.transcript().is_empty());
        assert_eq!(session.toggle_morph(), MorphState::Scattered);
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn pending_flag_tracks_open_exchanges() {
        let mut session = controller();

        let exchange = session.begin_exchange("hello").expect("non-empty input");
        assert!(session.is_pending());

        session.resolve_exchange(&exchange, Ok("greetings".to_string()));
        assert!(!session.is_pending());
    }

    #[test]
    fn interleaved_exchanges_keep_one_user_one_assistant_each() {
        let mut session = controller();

        let first = session.begin_exchange("first").expect("non-empty input");
        let second = session.begin_exchange("second").expect("non-empty input");
        assert!(session.is_pending());

        session.resolve_exchange(&first, Ok("reply one".to_string()));
        assert!(session.is_pending());
        session.resolve_exchange(&second, Ok("reply two".to_string()));
        assert!(!session.is_pending());

        let users = session.transcript().iter().filter(|m| m.is_user()).count();
        let assistants = session
            .transcript()
            .iter()
            .filter(|m| m.is_assistant())
            .count();
        assert_eq!(users, 2);
        assert_eq!(assistants, 2);
    }

    #[test]
    fn second_exchange_history_excludes_only_its_own_turn() {
        let mut session = controller();

        let first = session.begin_exchange("first").expect("non-empty input");
        assert!(first.history.is_empty());

        session.resolve_exchange(&first, Ok("reply".to_string()));

        let second = session.begin_exchange("second").expect("non-empty input");
        assert_eq!(
            second.history,
            vec![Message::user("first"), Message::assistant("reply")]
        );
    }
}
