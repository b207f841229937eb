//! Execution context: worker count, pseudo-random stream, option map, and
//! the `split_launch` context-splitting primitive (spec §4.1).
//!
//! The original library hand-rolls a pthread pool with an explicit wait
//! loop and status flags (`Ready`/`Running`/`Down`). This workspace follows
//! the rest of the corpus (every parallel algorithm in `scotch_graph` and
//! its sibling crates) in using [rayon] as the thread-pool engine: a
//! `launch` is a `rayon::scope` fan-out over `thrdnbr` tasks, and
//! `split_launch` is a `rayon::join` of the two sub-context bodies — which
//! is the same "leader thread per sub-context, rendezvous at the end"
//! shape as `contextThreadLaunchSplit`, minus the manual condition-variable
//! bookkeeping rayon already does for us.

use crate::options::OptionMap;
use crate::random::RandomStream;

/// An execution context: a worker count, a pseudo-random stream and an
/// option map. Context objects are created explicitly and are not owned by
/// the engines that borrow them (spec §3 "Lifecycles").
#[derive(Clone, Debug)]
pub struct Context {
    thrdnbr: usize,
    random: RandomStream,
    options: OptionMap,
}

impl Context {
    /// `context_init`: `thrdnbr == 0` means "use as many as the OS reports
    /// available to this process"; `thrdnbr == 1` means single-threaded.
    pub fn init(thrdnbr: usize, options: OptionMap) -> Self {
        let thrdnbr = if thrdnbr == 0 { num_cpus::get() } else { thrdnbr };
        Self {
            thrdnbr,
            random: RandomStream::clone_default(options.random_fixed_seed),
            options,
        }
    }

    pub fn thrdnbr(&self) -> usize {
        self.thrdnbr
    }

    pub fn options(&self) -> OptionMap {
        self.options
    }

    pub fn is_deterministic(&self) -> bool {
        self.options.deterministic
    }

    /// `context_random_seed`.
    pub fn random_seed(&mut self, seed: u64) {
        self.random.reset(seed);
    }

    /// `context_random_clone`.
    pub fn random_clone_default(&mut self) {
        self.random = RandomStream::clone_default(self.options.random_fixed_seed);
    }

    pub fn random_mut(&mut self) -> &mut RandomStream {
        &mut self.random
    }

    /// `context_launch`: calls `f(worker_index)` on every worker and blocks
    /// until all have returned.
    pub fn launch<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        let thrdnbr = self.thrdnbr;
        let mut results: Vec<Option<T>> = (0..thrdnbr).map(|_| None).collect();
        rayon::scope(|s| {
            let slots: Vec<&mut Option<T>> = results.iter_mut().collect();
            for (i, slot) in slots.into_iter().enumerate() {
                let f = &f;
                s.spawn(move |_| *slot = Some(f(i)));
            }
        });
        results.into_iter().map(|r| r.unwrap()).collect()
    }

    /// `context_reduce`: collective reduction over per-worker values.
    /// Ordering of `op` calls follows worker index, matching the spec's
    /// "fixed traversal over the workers" and the `Deterministic`
    /// canonicalization note in §9.
    pub fn reduce<T, F, Op>(&self, f: F, op: Op) -> T
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
        Op: Fn(T, T) -> T,
    {
        let mut values = self.launch(f).into_iter();
        let first = values.next().expect("context has at least one worker");
        values.fold(first, op)
    }

    /// `context_scan`: prefix-scan over per-worker values, same ordering
    /// conventions as `reduce`.
    pub fn scan<T, F, Op>(&self, f: F, op: Op) -> Vec<T>
    where
        T: Send + Clone,
        F: Fn(usize) -> T + Sync,
        Op: Fn(&T, &T) -> T,
    {
        let values = self.launch(f);
        let mut out = Vec::with_capacity(values.len());
        let mut acc: Option<T> = None;
        for v in values {
            let next = match &acc {
                Some(prev) => op(prev, &v),
                None => v,
            };
            out.push(next.clone());
            acc = Some(next);
        }
        out
    }

    /// `context_split_launch`: divides the context into two sub-contexts
    /// with `ceil(N/2)` and `floor(N/2)` workers. Sub-context 0 reuses the
    /// parent's random stream; sub-context 1 receives a fresh stream
    /// derived deterministically from the parent's. Returns `None` ("too
    /// small") when `thrdnbr < 2`, leaving the caller to run sequentially.
    pub fn split_launch<T, F>(&mut self, f: F) -> Option<(T, T)>
    where
        T: Send,
        F: Fn(&Context, usize) -> T + Sync,
    {
        if self.thrdnbr < 2 {
            return None;
        }
        let thrdmed = (self.thrdnbr + 1) / 2;

        let sub0 = Context {
            thrdnbr: thrdmed,
            random: self.random,
            options: self.options,
        };
        let sub1 = Context {
            thrdnbr: self.thrdnbr - thrdmed,
            random: self.random.derive_fresh(),
            options: self.options,
        };

        let (r0, r1) = rayon::join(|| f(&sub0, 0), || f(&sub1, 1));
        Some((r0, r1))
    }

    /// Two-phase adoption of a foreign pool (spec §4.1 `context_import1` /
    /// `context_import2`). `import1` provisions a context for `n` workers;
    /// every worker then calls `import2` with its rank. Since rayon already
    /// owns and schedules the underlying OS threads, this workspace's
    /// `import2` is a no-op hook kept for interface parity with engines
    /// that expect to announce a rank before doing per-worker setup.
    pub fn import1(n: usize, options: OptionMap) -> Self {
        Self::init(n, options)
    }

    pub fn import2(&self, _rank: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_runs_every_worker() {
        let ctx = Context::init(4, OptionMap::new());
        let mut results = ctx.launch(|i| i * 2);
        results.sort_unstable();
        assert_eq!(results, vec![0, 2, 4, 6]);
    }

    #[test]
    fn reduce_sums_in_worker_order() {
        let ctx = Context::init(4, OptionMap::new());
        let sum = ctx.reduce(|i| i as u64, |a, b| a + b);
        assert_eq!(sum, 0 + 1 + 2 + 3);
    }

    #[test]
    fn split_launch_divides_ceil_floor() {
        let mut ctx = Context::init(5, OptionMap::new());
        let (a, b) = ctx
            .split_launch(|sub, _idx| sub.thrdnbr())
            .expect("5 workers can be split");
        assert_eq!(a, 3);
        assert_eq!(b, 2);
    }

    #[test]
    fn split_launch_too_small_returns_none() {
        let mut ctx = Context::init(1, OptionMap::new());
        assert!(ctx.split_launch(|sub, _idx| sub.thrdnbr()).is_none());
    }

    #[test]
    fn split_launch_sub1_stream_differs_from_parent() {
        let mut ctx = Context::init(2, OptionMap::new());
        let before = {
            let mut probe = ctx.clone();
            probe.random_mut().next_u64()
        };
        let (s0, s1) = ctx
            .split_launch(|sub, idx| {
                let mut sub = sub.clone();
                (idx, sub.random_mut().next_u64())
            })
            .unwrap();
        assert_eq!(s0.0, 0);
        assert_eq!(s1.0, 1);
        // sub-context 0 reuses the parent stream verbatim.
        assert_eq!(s0.1, before);
    }
}
