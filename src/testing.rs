use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::{GatewayError, GradingError};
use crate::r#struct::book::Book;
use crate::r#struct::participant::ParticipantSummary;
use crate::r#struct::question::Question;
use crate::r#struct::submit::SubmitResult;
use crate::traits::gateway::DataGateway;
use crate::traits::grader::{EssayGrader, Evaluation};
use crate::traits::Backends;

pub fn questions(book: Book, count: usize, points: f64) -> Vec<Question> {
    (0..count)
        .map(|i| Question {
            id: i as u32 + 1,
            book,
            text: format!("سؤال {}", i + 1),
            options: vec!["أ".to_string(), "ب".to_string(), "ج".to_string(), "د".to_string()],
            correct_answer: "ب".to_string(),
            points,
        })
        .collect()
}

#[derive(Default)]
pub struct FakeGateway {
    pub questions: Mutex<HashMap<Book, Vec<Question>>>,
    pub offline: Mutex<bool>,
    pub submit_accepts: Mutex<bool>,
    pub submitted: Mutex<Vec<SubmitResult>>,
    pub submit_delay: Mutex<Option<Duration>>,
    pub participants: Mutex<Vec<ParticipantSummary>>,
    pub question_calls: AtomicUsize,
    pub participant_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn with_questions(sets: Vec<(Book, Vec<Question>)>) -> Arc<FakeGateway> {
        let gateway = FakeGateway::default();
        *gateway.questions.lock().unwrap() = sets.into_iter().collect();
        *gateway.submit_accepts.lock().unwrap() = true;
        Arc::new(gateway)
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if *self.offline.lock().unwrap() {
            Err(GatewayError::Malformed("offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DataGateway for FakeGateway {
    fn get_questions(&self, book: Book) -> BoxFuture<'_, Result<Vec<Question>, GatewayError>> {
        Box::pin(async move {
            self.question_calls.fetch_add(1, Ordering::SeqCst);
            self.check_online()?;
            Ok(self.questions.lock().unwrap().get(&book).cloned().unwrap_or_default())
        })
    }

    fn submit_result<'a>(&'a self, result: &'a SubmitResult) -> BoxFuture<'a, Result<bool, GatewayError>> {
        Box::pin(async move {
            let delay = *self.submit_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.submitted.lock().unwrap().push(result.clone());
            self.check_online()?;
            Ok(*self.submit_accepts.lock().unwrap())
        })
    }

    fn admin_login<'a>(&'a self, user: &'a str, pass: &'a str) -> BoxFuture<'a, Result<bool, GatewayError>> {
        Box::pin(async move {
            self.check_online()?;
            Ok(user == "admin" && pass == "s3cret")
        })
    }

    fn get_participants(&self) -> BoxFuture<'_, Result<Vec<ParticipantSummary>, GatewayError>> {
        Box::pin(async move {
            self.participant_calls.fetch_add(1, Ordering::SeqCst);
            self.check_online()?;
            Ok(self.participants.lock().unwrap().clone())
        })
    }
}

pub struct FakeGrader {
    pub evaluation: Mutex<Option<Evaluation>>,
    pub calls: AtomicUsize,
}

impl FakeGrader {
    pub fn returning(score: f64, feedback: &str) -> Arc<FakeGrader> {
        Arc::new(FakeGrader {
            evaluation: Mutex::new(Some(Evaluation {
                score,
                feedback: feedback.to_string(),
            })),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<FakeGrader> {
        Arc::new(FakeGrader {
            evaluation: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EssayGrader for FakeGrader {
    fn grade<'a>(&'a self, _book: Book, _essay: &'a str) -> BoxFuture<'a, Result<Evaluation, GradingError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.evaluation
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| GradingError::Malformed("fake failure".to_string()))
        })
    }
}

pub fn backends(gateway: &Arc<FakeGateway>, grader: &Arc<FakeGrader>) -> Backends {
    Backends {
        gateway: gateway.clone(),
        grader: grader.clone(),
    }
}
