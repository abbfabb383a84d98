use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::engine::state::{EngineState, Tuning};
use crate::engine::token::Token;
use crate::error::DrillError;
use crate::generator::question::{Question, QuestionBuilder};
use crate::session::input::{RawKeyEvent, normalize};
use crate::session::matcher::Matcher;
use crate::session::queue::{CancelToken, InputQueue, InputSender, Polled, input_channel};

/// Pause before the session restarts after a failure.
const RESTART_BACKOFF: Duration = Duration::from_millis(500);

/// How long the worker sleeps between cancellation checks with nothing to do.
const IDLE_SLICE: Duration = Duration::from_secs(1);

/// What the worker tells the display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrillUpdate {
    Question {
        text: String,
    },
    Progress {
        answer: String,
        aim: usize,
        miss: Option<String>,
        penalties: usize,
    },
    NothingToPractice,
    Error(String),
}

/// Fire-and-forget channel back to the display.
pub trait FeedbackSink: Send {
    fn send(&self, update: DrillUpdate) -> Result<(), DrillError>;
}

impl FeedbackSink for mpsc::Sender<DrillUpdate> {
    fn send(&self, update: DrillUpdate) -> Result<(), DrillError> {
        mpsc::Sender::send(self, update).map_err(|_| DrillError::FeedbackClosed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Every question of the pass was answered.
    Completed { questions: usize },
    Cancelled,
}

/// The question/answer loop over one token list.
pub struct Session<F: FeedbackSink> {
    lines: Vec<Token>,
    state: EngineState,
    queue: InputQueue,
    feedback: F,
    poll_timeout: Duration,
}

impl<F: FeedbackSink> Session<F> {
    pub fn new(
        lines: Vec<Token>,
        state: EngineState,
        queue: InputQueue,
        feedback: F,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            lines,
            state,
            queue,
            feedback,
            poll_timeout,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Drops penalties gathered so far.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Runs shuffled passes until cancelled.
    pub fn run(&mut self) -> Result<(), DrillError> {
        while !self.queue.is_cancelled() {
            match self.run_pass()? {
                Pass::Cancelled => break,
                Pass::Completed { questions: 0 } => {
                    info!(target: "keychenga::session", lines = self.lines.len(), "nothing to practice");
                    self.feedback.send(DrillUpdate::NothingToPractice)?;
                    while self.queue.idle(IDLE_SLICE) {}
                    break;
                }
                Pass::Completed { questions } => {
                    debug!(target: "keychenga::session", questions, penalties = self.state.penalties.len(), "pass finished");
                }
            }
        }
        Ok(())
    }

    /// Builds and answers the questions of one shuffled pass over the lines.
    pub fn run_pass(&mut self) -> Result<Pass, DrillError> {
        let mut pool = self.lines.clone();
        pool.shuffle(self.state.rng());
        let mut builder = QuestionBuilder::new(pool, self.state.tuning.question_length_limit);

        let mut questions = 0;
        while let Some(question) = builder.next_question(&mut self.state) {
            questions += 1;
            if !self.answer(question)? {
                return Ok(Pass::Cancelled);
            }
        }
        Ok(Pass::Completed { questions })
    }

    /// Blocks until `question` is answered. Returns `false` if cancelled first.
    pub fn answer(&mut self, question: Question) -> Result<bool, DrillError> {
        self.feedback.send(DrillUpdate::Question {
            text: question.text.clone(),
        })?;
        let mut matcher = Matcher::new(question);
        self.report(&matcher)?;

        while !matcher.is_complete() {
            match self.queue.poll(self.poll_timeout) {
                Polled::Event(raw) => {
                    if self.feed(&mut matcher, &raw) {
                        self.report(&matcher)?;
                    }
                }
                Polled::TimedOut => {
                    if matcher.timeout(&mut self.state) {
                        debug!(target: "keychenga::session", token = ?matcher.current_token(), "timed out, penalized");
                        self.report(&matcher)?;
                    }
                }
                Polled::Cancelled => return Ok(false),
            }
        }
        Ok(true)
    }

    fn feed(&mut self, matcher: &mut Matcher, raw: &RawKeyEvent) -> bool {
        let Some(answer) = normalize(raw) else {
            return false;
        };
        matcher.feed(&answer, raw.is_attempt(), &mut self.state);
        true
    }

    fn report(&self, matcher: &Matcher) -> Result<(), DrillError> {
        self.feedback.send(DrillUpdate::Progress {
            answer: matcher.answer().to_string(),
            aim: matcher.aim_column(),
            miss: matcher.miss().map(str::to_string),
            penalties: self.state.penalties.len(),
        })
    }
}

/// The session loop on its own thread.
///
/// Dropping the worker cancels it and waits for the thread to finish.
pub struct Worker {
    cancel: CancelToken,
    input: InputSender,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn<F>(lines: Vec<Token>, config: &Config, feedback: F) -> io::Result<Self>
    where
        F: FeedbackSink + 'static,
    {
        let cancel = CancelToken::new();
        let (input, queue) = input_channel(cancel.clone());
        let state = EngineState::new(Tuning::from(config));
        let session = Session::new(lines, state, queue, feedback, config.poll_timeout());

        let handle = thread::Builder::new()
            .name("drill-worker".to_string())
            .spawn(move || run_worker(session))?;

        Ok(Self {
            cancel,
            input,
            handle: Some(handle),
        })
    }

    /// Hands a key event to the worker without blocking.
    pub fn offer(&self, event: RawKeyEvent) -> bool {
        self.input.offer(event)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(target: "keychenga::session", "drill worker panicked during shutdown");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<F: FeedbackSink>(mut session: Session<F>) {
    info!(target: "keychenga::session", lines = session.lines.len(), "drill worker started");
    loop {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| session.run()));
        let message = match outcome {
            Ok(Ok(())) => break,
            Ok(Err(DrillError::FeedbackClosed)) => {
                debug!(target: "keychenga::session", "display closed");
                break;
            }
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        error!(target: "keychenga::session", error = %message, "drill session failed, restarting");
        if session.feedback.send(DrillUpdate::Error(message)).is_err() {
            break;
        }
        session.reset();
        if !session.queue.idle(RESTART_BACKOFF) {
            break;
        }
    }
    info!(target: "keychenga::session", "drill worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "drill session panicked".to_string()
    }
}
