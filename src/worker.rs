// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The chaos game.
//!
//! A worker owns a private copy of the genome, its own random stream,
//! and a single point that it walks around the plane: pick a
//! transform from the weighted table, apply it, blend the variations,
//! apply the final transform, and plot.  The first `WARMUP` steps
//! after any (re)start are not plotted, since the walk has not yet
//! settled onto the attractor.  A point that turns into NaN or
//! infinity is simply thrown away and the walk starts again from a
//! fresh random position.
//!
//! Workers run until told to stop through a shared flag, checked once
//! per step.  `render_batch` instead runs a fixed number of steps on
//! each of several scoped threads, which is what the command line
//! tool and the tests use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::thread::ScopedJoinHandle;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::genome::Genome;
use crate::geometry::{Color, Point};
use crate::histogram::Histogram;
use crate::variations::Variation;

/// Steps discarded after every start and reseed.
pub const WARMUP: u64 = 50;

/// What a worker did, counted over its lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Steps taken.
    pub iterations: u64,
    /// Steps that reached the histogram (whether or not they landed
    /// on the grid).
    pub plotted: u64,
    /// Times the walk diverged and was restarted.
    pub reseeds: u64,
}

impl std::ops::AddAssign for WorkerStats {
    fn add_assign(&mut self, other: WorkerStats) {
        self.iterations += other.iterations;
        self.plotted += other.plotted;
        self.reseeds += other.reseeds;
    }
}

/// The outcome of a single step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The point diverged; the walk was restarted.
    Reseeded,
    /// Still inside the warm-up window; nothing was plotted.
    WarmingUp,
    /// The point was handed to the histogram.
    Plotted,
}

/// One chaos-game walker.
pub struct Worker<R: Rng> {
    genome: Genome,
    variations: Vec<(Variation, f64)>,
    pick: Uniform<usize>,
    start: Uniform<f64>,
    rng: R,
    point: Point,
    color: Color,
    iteration_count: u64,
    stats: WorkerStats,
}

impl<R: Rng> Worker<R> {
    /// Take a private copy of `genome` and start from a random point
    /// in `[-1, 1]^2`.
    pub fn new(genome: &Genome, mut rng: R) -> Worker<R> {
        let start = Uniform::new_inclusive(-1.0, 1.0);
        let point = Point::new(start.sample(&mut rng), start.sample(&mut rng));
        Worker::starting_at(genome, rng, point)
    }

    /// As `new`, but from a chosen starting point.
    pub fn starting_at(genome: &Genome, rng: R, point: Point) -> Worker<R> {
        let genome = genome.clone();
        Worker {
            variations: genome.active_variations(),
            pick: Uniform::new(0, genome.selection().len()),
            start: Uniform::new_inclusive(-1.0, 1.0),
            genome,
            rng,
            point,
            color: Color::black(),
            iteration_count: 0,
            stats: WorkerStats::default(),
        }
    }

    /// Where the walk is now.
    pub fn point(&self) -> Point {
        self.point
    }

    /// The walk's running color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Steps since the last start or reseed.
    pub fn iteration_count(&self) -> u64 {
        self.iteration_count
    }

    /// Lifetime counters.
    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// This worker's copy of the genome.
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    fn reseed(&mut self) {
        self.point = Point::new(
            self.start.sample(&mut self.rng),
            self.start.sample(&mut self.rng),
        );
        self.color = Color::black();
        self.iteration_count = 0;
        self.stats.reseeds += 1;
    }

    /// Take one step of the walk, plotting into `histogram` once the
    /// warm-up is over.
    pub fn step(&mut self, histogram: &Histogram) -> Step {
        let j = self.genome.selection()[self.pick.sample(&mut self.rng)];
        let affine = self.genome.transforms()[j];

        let mut next = affine.apply(self.point);
        self.color.blend(self.genome.color(j));

        if self.genome.variation_enabled() {
            let mut sum = Point::zero();
            for (variation, weight) in &self.variations {
                sum = sum + variation.apply(next, &affine, &mut self.rng) * *weight;
            }
            next = sum;
        }

        if self.genome.final_transform_enabled() {
            if let (Some(last), Some(color)) =
                (self.genome.final_transform(j), self.genome.final_color(j))
            {
                next = last.apply(next);
                self.color.blend(color);
            }
        }

        self.point = next;
        self.stats.iterations += 1;

        if self.point.is_divergent() {
            self.reseed();
            return Step::Reseeded;
        }

        self.iteration_count += 1;
        if self.iteration_count < WARMUP {
            return Step::WarmingUp;
        }

        histogram.hit(self.point, &self.color, self.genome.camera());
        self.stats.plotted += 1;
        Step::Plotted
    }

    /// Take exactly `iterations` steps.
    pub fn run_for(&mut self, histogram: &Histogram, iterations: u64) -> WorkerStats {
        for _ in 0..iterations {
            self.step(histogram);
        }
        self.stats
    }

    /// Step until `cancel` is raised.  The flag is checked before
    /// every step.
    pub fn run(&mut self, histogram: &Histogram, cancel: &AtomicBool) -> WorkerStats {
        while !cancel.load(Ordering::Relaxed) {
            self.step(histogram);
        }
        debug!(
            iterations = self.stats.iterations,
            plotted = self.stats.plotted,
            reseeds = self.stats.reseeds,
            "worker stopped"
        );
        self.stats
    }
}

/// A distinct random stream for worker `index`.  With a seed the
/// streams are reproducible; without one they come from the OS.
pub fn worker_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    }
}

/// A running worker thread.
pub struct WorkerHandle {
    handle: JoinHandle<WorkerStats>,
}

impl WorkerHandle {
    /// Wait for the worker to notice its cancellation flag and
    /// return its counters.
    pub fn join(self) -> thread::Result<WorkerStats> {
        self.handle.join()
    }
}

/// Start a worker on its own thread with an OS-seeded random stream.
/// It runs until `cancel` is raised.
pub fn spawn_worker(
    genome: &Genome,
    histogram: Arc<Histogram>,
    cancel: Arc<AtomicBool>,
) -> WorkerHandle {
    spawn_worker_seeded(genome, histogram, cancel, StdRng::from_entropy())
}

/// As `spawn_worker`, with the caller's random stream.
pub fn spawn_worker_seeded(
    genome: &Genome,
    histogram: Arc<Histogram>,
    cancel: Arc<AtomicBool>,
    rng: StdRng,
) -> WorkerHandle {
    let mut worker = Worker::new(genome, rng);
    let handle = thread::spawn(move || worker.run(&histogram, &cancel));
    WorkerHandle { handle }
}

/// A set of workers sharing one histogram and one cancellation flag.
/// Changing the worker count means stopping the pool and spawning a
/// new one.
pub struct WorkerPool {
    cancel: Arc<AtomicBool>,
    handles: Vec<WorkerHandle>,
}

impl WorkerPool {
    /// Start `threads` workers.  With a seed, worker `i` uses stream
    /// `seed + i`.
    pub fn spawn(
        genome: &Genome,
        histogram: Arc<Histogram>,
        threads: usize,
        seed: Option<u64>,
    ) -> WorkerPool {
        let cancel = Arc::new(AtomicBool::new(false));
        let handles = (0..threads)
            .map(|i| {
                spawn_worker_seeded(
                    genome,
                    histogram.clone(),
                    cancel.clone(),
                    worker_rng(seed, i),
                )
            })
            .collect();
        debug!(threads, "worker pool started");
        WorkerPool { cancel, handles }
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if the pool has no workers.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Raise the flag, wait for every worker, and sum their counters.
    pub fn stop(mut self) -> WorkerStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> WorkerStats {
        self.cancel.store(true, Ordering::Relaxed);
        sum_joined(self.handles.drain(..).map(WorkerHandle::join))
    }
}

/// Add up the counters of joined workers, skipping any that panicked.
fn sum_joined<I>(results: I) -> WorkerStats
where
    I: IntoIterator<Item = thread::Result<WorkerStats>>,
{
    let mut total = WorkerStats::default();
    for result in results {
        match result {
            Ok(stats) => total += stats,
            Err(_) => warn!("a worker panicked"),
        }
    }
    total
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.shutdown();
        }
    }
}

/// Run `threads` workers for `iterations` steps each, all plotting
/// into `histogram`, and return their combined counters.
pub fn render_batch(
    genome: &Genome,
    histogram: &Histogram,
    threads: usize,
    iterations: u64,
    seed: Option<u64>,
) -> WorkerStats {
    let mut total = WorkerStats::default();
    let result = crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<WorkerStats>> = (0..threads)
            .map(|i| {
                spawner.spawn(move |_| {
                    let mut worker = Worker::new(genome, worker_rng(seed, i));
                    worker.run_for(histogram, iterations)
                })
            })
            .collect();

        sum_joined(handles.into_iter().map(|handle| handle.join()))
    });
    match result {
        Ok(stats) => total += stats,
        Err(_) => warn!("a batch worker panicked"),
    }
    debug!(
        threads,
        iterations = total.iterations,
        plotted = total.plotted,
        reseeds = total.reseeds,
        "batch finished"
    );
    total
}
