//! Per-frame loop: clock, camera damping, node animation, render.

use crate::scene::context::SceneContext;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("frame scheduler is not running")]
    NotRunning,
    #[error("frame scheduler is already running")]
    AlreadyRunning,
    #[error("frame ticket {got} is stale, expected {expected}")]
    StaleTicket { got: u64, expected: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Permission to run exactly one tick. Each tick consumes its ticket and
/// hands out the next, so two ticks can never overlap.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct FrameTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub elapsed: Duration,
    pub delta: Duration,
    pub fps: f64,
    pub camera_moved: bool,
}

/// Monotonic time since the first tick. Never reset.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    origin: Option<Instant>,
    last: Option<Instant>,
    elapsed: Duration,
    frames: u64,
    fps: f64,
}

impl FrameClock {
    /// Moves the clock to `now`. Times earlier than the previous tick count as no progress.
    pub fn advance(&mut self, now: Instant) -> Duration {
        let origin = *self.origin.get_or_insert(now);
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last = Some(now.max(self.last.unwrap_or(now)));
        self.elapsed = self.elapsed.max(now.saturating_duration_since(origin));
        self.frames += 1;
        if delta > Duration::ZERO {
            self.fps = 1.0 / delta.as_secs_f64();
        }
        delta
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    clock: FrameClock,
    generation: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            clock: FrameClock::default(),
            generation: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Idle to Running. Only allowed once.
    pub fn start(&mut self) -> Result<FrameTicket, SchedulerError> {
        if self.state == SchedulerState::Running {
            return Err(SchedulerError::AlreadyRunning);
        }
        self.state = SchedulerState::Running;
        log::debug!("Frame scheduler running");
        Ok(self.issue())
    }

    fn issue(&mut self) -> FrameTicket {
        self.generation += 1;
        FrameTicket {
            generation: self.generation,
        }
    }

    /// Runs one frame: advance the clock, update the orbit camera, animate,
    /// then `render`. Returns the ticket for the next frame.
    pub fn tick<F>(
        &mut self,
        ticket: FrameTicket,
        now: Instant,
        ctx: &mut SceneContext,
        render: F,
    ) -> Result<(FrameTicket, TickReport), SchedulerError>
    where
        F: FnOnce(&SceneContext),
    {
        if self.state != SchedulerState::Running {
            return Err(SchedulerError::NotRunning);
        }
        if ticket.generation != self.generation {
            return Err(SchedulerError::StaleTicket {
                got: ticket.generation,
                expected: self.generation,
            });
        }

        let delta = self.clock.advance(now);
        let camera_moved = ctx.orbit.update(&mut ctx.camera);
        ctx.animate(self.clock.elapsed());
        render(ctx);

        let report = TickReport {
            frame: self.clock.frames(),
            elapsed: self.clock.elapsed(),
            delta,
            fps: self.clock.fps(),
            camera_moved,
        };
        Ok((self.issue(), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::objects::material::{Color, Material};
    use crate::objects::primitives::ShapeKind;
    use crate::scene::context::Spin;
    use crate::scene::{Node, NodeId};
    use std::cell::RefCell;
    use std::sync::Arc;

    fn context_with_shape() -> (SceneContext, NodeId) {
        let mut ctx = SceneContext::empty(&SceneConfig::default());
        let node = Node::mesh(
            "box",
            Arc::new(ShapeKind::Box.build()),
            Material::phong(Color::WHITE),
        );
        let id = ctx.add_shape(node, Spin::Tumble { speed: 2.0 });
        (ctx, id)
    }

    #[test]
    fn tick_requires_start() {
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        let (mut ctx, _) = context_with_shape();
        let err = scheduler
            .tick(FrameTicket { generation: 0 }, Instant::now(), &mut ctx, |_| {})
            .unwrap_err();
        assert_eq!(err, SchedulerError::NotRunning);
    }

    #[test]
    fn start_is_one_shot() {
        let mut scheduler = FrameScheduler::new();
        let _ticket = scheduler.start().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.start().unwrap_err(), SchedulerError::AlreadyRunning);
    }

    #[test]
    fn stale_ticket_is_rejected() {
        let mut scheduler = FrameScheduler::new();
        let first = scheduler.start().unwrap();
        let (mut ctx, _) = context_with_shape();
        let now = Instant::now();
        let (_next, _) = scheduler.tick(first, now, &mut ctx, |_| {}).unwrap();

        let replay = FrameTicket { generation: 1 };
        let err = scheduler.tick(replay, now, &mut ctx, |_| {}).unwrap_err();
        assert_eq!(
            err,
            SchedulerError::StaleTicket {
                got: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn animation_runs_before_render() {
        let mut scheduler = FrameScheduler::new();
        let mut ticket = scheduler.start().unwrap();
        let (mut ctx, id) = context_with_shape();
        let origin = Instant::now();

        let seen = RefCell::new(Vec::new());
        for ms in [0u64, 500, 1000] {
            let now = origin + Duration::from_millis(ms);
            let (next, report) = scheduler
                .tick(ticket, now, &mut ctx, |ctx| {
                    let rotation = ctx.scene.node(id).unwrap().transform.rotation;
                    seen.borrow_mut().push(rotation.x);
                })
                .unwrap();
            ticket = next;
            assert_eq!(report.elapsed, Duration::from_millis(ms));
        }

        // tumble speed 2 rad/s, observed by the render of the same tick
        let seen = seen.into_inner();
        assert!((seen[0] - 0.0).abs() < 1e-12);
        assert!((seen[1] - 1.0).abs() < 1e-12);
        assert!((seen[2] - 2.0).abs() < 1e-12);
        assert_eq!(scheduler.clock().frames(), 3);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = FrameClock::default();
        let origin = Instant::now();
        clock.advance(origin);
        clock.advance(origin + Duration::from_secs(2));
        assert_eq!(clock.elapsed(), Duration::from_secs(2));

        let delta = clock.advance(origin + Duration::from_secs(1));
        assert_eq!(delta, Duration::ZERO);
        assert_eq!(clock.elapsed(), Duration::from_secs(2));

        clock.advance(origin + Duration::from_secs(3));
        assert_eq!(clock.elapsed(), Duration::from_secs(3));
        assert_eq!(clock.frames(), 4);
    }
}
