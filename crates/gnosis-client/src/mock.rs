//! Mock generation client for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use gnosis_core::error::GenerationError;
use gnosis_core::model::{GenerationRequest, GenerationResult};
use gnosis_core::traits::GenerationClient;

type Reply = Result<GenerationResult, GenerationError>;

/// A generation client that replays queued replies without network calls.
///
/// Queued replies are returned in order; once the queue is empty every call
/// returns the fallback reply.
pub struct MockGenerationClient {
    queue: Mutex<VecDeque<Reply>>,
    fallback: GenerationResult,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockGenerationClient {
    /// Create a mock that always returns `result`.
    pub fn with_fixed_result(result: GenerationResult) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: result,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Queue a reply to be returned before the fallback.
    pub fn push_reply(&self, reply: Reply) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(reply);
        }
    }

    /// Number of calls made to this client.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> Reply {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }
        request.validate()?;

        let queued = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        queued.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnosis_core::evaluator::Evaluator;
    use gnosis_core::model::{McqItem, Mode, NotesResult, Quiz, QuizResult};
    use gnosis_core::session::QuizSession;

    fn one_question_quiz() -> GenerationResult {
        GenerationResult::Quiz(QuizResult {
            quiz: Quiz {
                mcq: vec![McqItem {
                    question: "Which structure links nodes?".into(),
                    options: vec![
                        "Array".into(),
                        "Linked List".into(),
                        "Tree".into(),
                        "Graph".into(),
                    ],
                    correct_answer: "B".into(),
                }],
                short_answer: vec![],
            },
            warning: None,
        })
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            mode: Mode::Quiz,
            user_request: "Quiz me on linked lists".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fixed_result() {
        let client = MockGenerationClient::with_fixed_result(one_question_quiz());
        let result = client.generate(&request()).await.unwrap();
        assert_eq!(result.quiz().unwrap().total(), 1);
        assert_eq!(client.name(), "mock");
        assert_eq!(client.call_count(), 1);
        assert_eq!(
            client.last_request().unwrap().user_request,
            "Quiz me on linked lists"
        );
    }

    #[tokio::test]
    async fn queued_replies_come_first() {
        let client = MockGenerationClient::with_fixed_result(one_question_quiz());
        client.push_reply(Ok(GenerationResult::Notes(NotesResult {
            notes: "notes".into(),
        })));
        client.push_reply(Err(GenerationError::Timeout(1)));

        assert_eq!(client.generate(&request()).await.unwrap().mode(), Mode::Notes);
        assert!(client.generate(&request()).await.is_err());
        assert_eq!(client.generate(&request()).await.unwrap().mode(), Mode::Quiz);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn failed_submission_leaves_session_untouched() {
        let client = MockGenerationClient::with_fixed_result(one_question_quiz());
        let mut session = QuizSession::new(Evaluator::default());

        let result = client.generate(&request()).await.unwrap();
        session.reset_on_new_result(result);
        assert_eq!(session.apply_mcq_answer(0, 1), Ok(true));
        assert_eq!(session.score(), 1);

        client.push_reply(Err(GenerationError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        }));
        match client.generate(&request()).await {
            Ok(result) => session.reset_on_new_result(result),
            Err(e) => assert_eq!(e.user_message(), "Bad Gateway"),
        }
        assert_eq!(session.score(), 1);
        assert_eq!(session.selection(0), Some(1));

        let result = client.generate(&request()).await.unwrap();
        session.reset_on_new_result(result);
        assert_eq!(session.score(), 0);
        assert_eq!(session.selection(0), None);
    }

    #[tokio::test]
    async fn invalid_request_is_rejected() {
        let client = MockGenerationClient::with_fixed_result(one_question_quiz());
        let err = client
            .generate(&GenerationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
    }
}
