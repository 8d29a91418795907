//! Asynchronous pathfinding
//!
//! Path searches run on a background worker thread so a search never
//! blocks a frame. Requests carry monotonically increasing ids and
//! completions are polled once per frame, so a stale result that arrives
//! after a newer request can be detected by id and dropped instead of
//! overwriting the route that superseded it.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use glam::Vec2;

use crate::ai::pathfinding::{NavError, NavGrid, NavPath};

/// Identifier of a path request, unique within one navigator
pub type PathRequestId = u64;

/// A queued search
struct PathRequest {
    id: PathRequestId,
    origin: Vec2,
    goal: Vec2,
}

/// A completed search
#[derive(Debug)]
pub struct PathReply {
    /// Id of the request this answers
    pub id: PathRequestId,
    /// The route, or why there is none
    pub result: Result<NavPath, NavError>,
}

/// Owns the worker thread and the request/reply channels
pub struct Navigator {
    requests: Option<Sender<PathRequest>>,
    replies: Receiver<PathReply>,
    worker: Option<JoinHandle<()>>,
    next_id: PathRequestId,
}

impl Navigator {
    /// Spawn a worker over a shared navigation grid
    pub fn new(grid: Arc<NavGrid>) -> Self {
        let (request_send, request_recv) = channel::<PathRequest>();
        let (reply_send, reply_recv) = channel::<PathReply>();

        let worker = thread::spawn(move || {
            while let Ok(request) = request_recv.recv() {
                let result = grid.find_path(request.origin, request.goal);
                let reply = PathReply {
                    id: request.id,
                    result,
                };
                if reply_send.send(reply).is_err() {
                    // Session side hung up
                    break;
                }
            }
        });

        Self {
            requests: Some(request_send),
            replies: reply_recv,
            worker: Some(worker),
            next_id: 0,
        }
    }

    /// Queue a search from `origin` to `goal`.
    ///
    /// Returns the id the completion will carry. Superseded requests are
    /// never cancelled; their replies arrive anyway and the caller drops
    /// them by comparing ids.
    pub fn request(&mut self, origin: Vec2, goal: Vec2) -> PathRequestId {
        self.next_id += 1;
        let id = self.next_id;
        if let Some(requests) = &self.requests {
            if requests.send(PathRequest { id, origin, goal }).is_err() {
                log::error!("navigator worker is gone, request {id} dropped");
            }
        }
        id
    }

    /// Drain every completion that has arrived since the last poll
    pub fn poll(&mut self) -> Vec<PathReply> {
        let mut replies = Vec::new();
        loop {
            match self.replies.try_recv() {
                Ok(reply) => replies.push(reply),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        replies
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        // Closing the request channel ends the worker's recv loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for_replies(navigator: &mut Navigator, count: usize) -> Vec<PathReply> {
        let mut got = Vec::new();
        for _ in 0..500 {
            got.extend(navigator.poll());
            if got.len() >= count {
                return got;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("timed out waiting for {count} path replies");
    }

    #[test]
    fn replies_carry_the_request_id() {
        let grid = Arc::new(NavGrid::new(10, 10, 1.0));
        let mut navigator = Navigator::new(grid);

        let id = navigator.request(Vec2::new(0.5, 0.5), Vec2::new(5.5, 5.5));
        let replies = wait_for_replies(&mut navigator, 1);

        assert_eq!(replies[0].id, id);
        assert!(replies[0].result.is_ok());
    }

    #[test]
    fn ids_increase_per_request() {
        let grid = Arc::new(NavGrid::new(10, 10, 1.0));
        let mut navigator = Navigator::new(grid);

        let first = navigator.request(Vec2::new(0.5, 0.5), Vec2::new(3.5, 0.5));
        let second = navigator.request(Vec2::new(0.5, 0.5), Vec2::new(0.5, 3.5));
        assert!(second > first);

        let replies = wait_for_replies(&mut navigator, 2);
        let mut ids: Vec<_> = replies.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn failed_searches_come_back_as_errors() {
        let mut grid = NavGrid::new(5, 5, 1.0);
        grid.set_walkable(3, 3, false);
        let mut navigator = Navigator::new(Arc::new(grid));

        navigator.request(Vec2::new(0.5, 0.5), Vec2::new(3.5, 3.5));
        let replies = wait_for_replies(&mut navigator, 1);

        assert_eq!(
            replies[0].result.as_ref().unwrap_err(),
            &NavError::Blocked { x: 3, y: 3 }
        );
    }

    #[test]
    fn drop_joins_the_worker() {
        let grid = Arc::new(NavGrid::new(4, 4, 1.0));
        let navigator = Navigator::new(grid);
        drop(navigator);
    }
}
