//! Background search worker
//!
//! Deep searches run on a dedicated thread so input handling and rendering
//! keep going. Requests and replies travel over channels; one request may be
//! outstanding at a time. Each request carries the `SessionToken` it was made
//! under plus a request id, and anything that no longer matches is discarded.
//!
//! The timeout is measured in simulation seconds handed to `poll`, so it works
//! the same in tests, natively and in the browser.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use super::minimax::{Role, Searchable, best_move};
use crate::error::WorkerError;
use crate::sim::SessionToken;

struct Request<S> {
    id: u64,
    token: SessionToken,
    root: S,
    depth: u32,
    role: Role,
}

struct Reply<M> {
    id: u64,
    token: SessionToken,
    best: Option<M>,
}

#[derive(Debug, Clone, Copy)]
struct Outstanding {
    id: u64,
    token: SessionToken,
    waited: f32,
}

/// Result of polling the worker
#[derive(Debug)]
pub enum SearchPoll<M> {
    /// Nothing outstanding
    Idle,
    /// Still searching
    Pending,
    Ready(M),
    /// The request is abandoned; the caller should fall back
    Failed(WorkerError),
}

/// Handle to one search thread
pub struct SearchWorker<S: Searchable> {
    requests: Option<Sender<Request<S>>>,
    replies: Receiver<Reply<S::Move>>,
    handle: Option<JoinHandle<()>>,
    outstanding: Option<Outstanding>,
    next_id: u64,
    timeout: f32,
}

impl<S> SearchWorker<S>
where
    S: Searchable + Send + 'static,
    S::Move: Send + 'static,
{
    /// Start the search thread; fails where threads are unavailable
    pub fn spawn(name: &str, timeout: f32) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = mpsc::channel::<Request<S>>();
        let (reply_tx, reply_rx) = mpsc::channel::<Reply<S::Move>>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || search_loop(request_rx, reply_tx))?;

        log::info!("Search worker '{}' started (timeout {:.1}s)", name, timeout);
        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            handle: Some(handle),
            outstanding: None,
            next_id: 0,
            timeout,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Queue a search; returns the request id
    pub fn submit(
        &mut self,
        token: SessionToken,
        root: S,
        depth: u32,
        role: Role,
    ) -> Result<u64, WorkerError> {
        if let Some(current) = self.outstanding {
            return Err(WorkerError::Busy(current.id));
        }
        let sender = self.requests.as_ref().ok_or(WorkerError::Disconnected)?;

        self.next_id += 1;
        let id = self.next_id;
        sender
            .send(Request {
                id,
                token,
                root,
                depth,
                role,
            })
            .map_err(|_| WorkerError::Disconnected)?;

        self.outstanding = Some(Outstanding {
            id,
            token,
            waited: 0.0,
        });
        log::debug!("Search #{} submitted at depth {}", id, depth);
        Ok(id)
    }

    /// Check for the outstanding reply after `waited` more seconds
    pub fn poll(&mut self, token: SessionToken, waited: f32) -> SearchPoll<S::Move> {
        let Some(mut current) = self.outstanding else {
            return SearchPoll::Idle;
        };
        if current.token != token {
            log::debug!("Search #{} belongs to an old round, dropping", current.id);
            self.outstanding = None;
            return SearchPoll::Idle;
        }

        current.waited += waited;
        self.outstanding = Some(current);

        // A reply already in the channel counts even if the deadline has passed
        loop {
            match self.replies.try_recv() {
                Ok(reply) if reply.id == current.id && reply.token == current.token => {
                    self.outstanding = None;
                    return match reply.best {
                        Some(mv) => SearchPoll::Ready(mv),
                        None => SearchPoll::Failed(WorkerError::NoMove),
                    };
                }
                Ok(stale) => {
                    log::debug!("Discarding stale search reply #{}", stale.id);
                }
                Err(TryRecvError::Empty) if current.waited > self.timeout => {
                    log::warn!("Search #{} timed out after {:.2}s", current.id, current.waited);
                    self.outstanding = None;
                    return SearchPoll::Failed(WorkerError::TimedOut(current.waited));
                }
                Err(TryRecvError::Empty) => return SearchPoll::Pending,
                Err(TryRecvError::Disconnected) => {
                    self.outstanding = None;
                    return SearchPoll::Failed(WorkerError::Disconnected);
                }
            }
        }
    }

    /// Abandon the outstanding request; its reply will be ignored
    pub fn cancel(&mut self) {
        if let Some(current) = self.outstanding.take() {
            log::debug!("Search #{} cancelled", current.id);
        }
    }
}

impl<S: Searchable> Drop for SearchWorker<S> {
    fn drop(&mut self) {
        // Closing the request channel ends the loop after the current search
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Search worker panicked");
            }
        }
    }
}

fn search_loop<S: Searchable>(requests: Receiver<Request<S>>, replies: Sender<Reply<S::Move>>) {
    for request in requests {
        let best = best_move(&request.root, request.depth, request.role).map(|(mv, _)| mv);
        let reply = Reply {
            id: request.id,
            token: request.token,
            best,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Count down by one or two; reaching zero on your move wins
    #[derive(Debug, Clone, Copy)]
    struct Countdown {
        n: u32,
        max_to_move: bool,
    }

    impl Searchable for Countdown {
        type Move = u32;

        fn moves(&self) -> Vec<u32> {
            (1..=self.n.min(2)).collect()
        }

        fn child(&self, mv: &u32) -> Self {
            Countdown {
                n: self.n - mv,
                max_to_move: !self.max_to_move,
            }
        }

        fn terminal_score(&self, _ply: u32) -> Option<i32> {
            (self.n == 0).then_some(if self.max_to_move { -1 } else { 1 })
        }

        fn evaluate(&self) -> i32 {
            0
        }
    }

    const ROOT: Countdown = Countdown {
        n: 4,
        max_to_move: true,
    };

    fn wait_for(
        worker: &mut SearchWorker<Countdown>,
        token: SessionToken,
    ) -> SearchPoll<u32> {
        for _ in 0..2000 {
            match worker.poll(token, 0.0) {
                SearchPoll::Pending => thread::sleep(Duration::from_millis(1)),
                other => return other,
            }
        }
        panic!("worker never answered");
    }

    #[test]
    fn test_search_reply_arrives() {
        let mut worker = SearchWorker::spawn("test-search", 5.0).unwrap();
        let token = SessionToken::new(1);
        worker.submit(token, ROOT, 6, Role::Maximizer).unwrap();
        // From 4, taking one leaves the opponent on a multiple of three
        assert!(matches!(wait_for(&mut worker, token), SearchPoll::Ready(1)));
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_single_outstanding_request() {
        let mut worker = SearchWorker::spawn("test-busy", 5.0).unwrap();
        let token = SessionToken::new(1);
        let id = worker.submit(token, ROOT, 6, Role::Maximizer).unwrap();
        assert!(matches!(
            worker.submit(token, ROOT, 6, Role::Maximizer),
            Err(WorkerError::Busy(busy)) if busy == id
        ));
    }

    /// One move whose generation takes `millis`; the move is `millis`
    #[derive(Debug, Clone, Copy)]
    struct Slow {
        millis: u64,
    }

    impl Searchable for Slow {
        type Move = u64;

        fn moves(&self) -> Vec<u64> {
            thread::sleep(Duration::from_millis(self.millis));
            vec![self.millis]
        }

        fn child(&self, _mv: &u64) -> Self {
            Slow { millis: 0 }
        }

        fn terminal_score(&self, _ply: u32) -> Option<i32> {
            (self.millis == 0).then_some(0)
        }

        fn evaluate(&self) -> i32 {
            0
        }
    }

    #[test]
    fn test_timeout_abandons_request() {
        let mut worker = SearchWorker::spawn("test-timeout", 0.5).unwrap();
        let token = SessionToken::new(1);
        worker.submit(token, Slow { millis: 300 }, 1, Role::Maximizer).unwrap();
        assert!(matches!(
            worker.poll(token, 1.0),
            SearchPoll::Failed(WorkerError::TimedOut(_))
        ));

        // The late reply of the abandoned request must not answer the next one
        worker.submit(token, Slow { millis: 1 }, 1, Role::Maximizer).unwrap();
        let mut answer = None;
        for _ in 0..2000 {
            match worker.poll(token, 0.0) {
                SearchPoll::Pending => thread::sleep(Duration::from_millis(1)),
                other => {
                    answer = Some(other);
                    break;
                }
            }
        }
        assert!(matches!(answer, Some(SearchPoll::Ready(1))));
    }

    #[test]
    fn test_delivered_reply_beats_the_deadline() {
        let mut worker = SearchWorker::spawn("test-deadline", 0.5).unwrap();
        let token = SessionToken::new(1);
        worker.submit(token, ROOT, 6, Role::Maximizer).unwrap();
        // Plenty of wall time for the reply to land before the first poll
        thread::sleep(Duration::from_millis(200));
        assert!(matches!(worker.poll(token, 1.0), SearchPoll::Ready(1)));
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_stale_token_is_dropped() {
        let mut worker = SearchWorker::spawn("test-stale", 5.0).unwrap();
        let old = SessionToken::new(1);
        worker.submit(old, ROOT, 6, Role::Maximizer).unwrap();
        assert!(matches!(worker.poll(old.next(), 0.0), SearchPoll::Idle));
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_cancel_then_resubmit() {
        let mut worker = SearchWorker::spawn("test-cancel", 5.0).unwrap();
        let token = SessionToken::new(2);
        worker.submit(token, ROOT, 6, Role::Maximizer).unwrap();
        worker.cancel();
        assert!(matches!(worker.poll(token, 0.0), SearchPoll::Idle));
        worker.submit(token, ROOT, 6, Role::Maximizer).unwrap();
        assert!(matches!(wait_for(&mut worker, token), SearchPoll::Ready(1)));
    }
}
