use crate::*;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }
}

/// A host that records every widget call so tests can compare it with the pool.
#[derive(Debug, Default)]
struct RecordingHost {
    next_handle: u32,
    live: BTreeMap<u32, (u32, usize)>,
    offsets: BTreeMap<u32, f32>,
    acquired: usize,
    released: usize,
    extent: f32,
    empty_results: usize,
    errors: Vec<String>,
}

impl WidgetHost<u32> for RecordingHost {
    type Handle = u32;

    fn acquire_widget(&mut self, item: &u32, index: usize) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.acquired += 1;
        self.live.insert(handle, (*item, index));
        handle
    }

    fn release_widget(&mut self, handle: u32) {
        assert!(
            self.live.remove(&handle).is_some(),
            "released a widget twice"
        );
        self.offsets.remove(&handle);
        self.released += 1;
    }

    fn set_widget_offset(&mut self, handle: &u32, index: usize, offset: f32) {
        let slot = self.live.get_mut(handle).expect("offset for a dead widget");
        slot.1 = index;
        self.offsets.insert(*handle, offset);
    }

    fn set_content_extent(&mut self, total_height: f32) {
        self.extent = total_height;
    }

    fn on_empty_result(&mut self) {
        self.empty_results += 1;
    }

    fn on_error(&mut self, reason: &str) {
        self.errors.push(reason.to_string());
    }
}

type Container = ScrollContainer<u32, RecordingHost>;

fn container(count: u32, item_height: f32, max_displayed: usize, capacity: usize) -> Container {
    ScrollContainer::new(
        ContainerOptions::new(item_height, max_displayed)
            .with_pool_capacity(capacity)
            .with_initial_items(0..count),
        RecordingHost::default(),
    )
}

fn pooled_indexes(c: &Container) -> Vec<usize> {
    c.pool().iter().map(|e| e.index()).collect()
}

fn pooled_items(c: &Container) -> Vec<u32> {
    c.pool().iter().map(|e| *e.item()).collect()
}

fn assert_invariants(c: &Container) {
    let pool = c.pool();
    assert!(pool.len() <= pool.capacity(), "pool over capacity");
    assert!(pool.is_contiguous(), "pool indexes have gaps");
    for entry in pool.iter() {
        assert!(!entry.is_released());
        assert_eq!(c.items().get(entry.index()), Some(entry.item()));
        let handle = entry.handle().unwrap();
        assert_eq!(c.host().live.get(handle), Some(&(*entry.item(), entry.index())));
        let offset = c.host().offsets[handle];
        assert_eq!(offset, entry.index() as f32 * c.config().item_height);
    }
    assert_eq!(c.host().live.len(), pool.len(), "host leaked widgets");
    assert_eq!(c.host().acquired - c.host().released, pool.len());
}

#[test]
fn windower_matches_closed_form() {
    let r = visible_window(3000.0, 60.0, 15, 100);
    assert_eq!(r, WindowRange::new(50, 65));

    // Only the magnitude of the offset matters.
    assert_eq!(visible_window(-3000.0, 60.0, 15, 100), r);

    // Rounds half away from zero.
    assert_eq!(visible_window(89.0, 60.0, 5, 100).start_index, 1);
    assert_eq!(visible_window(90.0, 60.0, 5, 100).start_index, 2);
    assert_eq!(visible_window(2.5, 1.0, 5, 100).start_index, 3);

    // The largest f32 below one half still rounds down.
    let just_below_half = 0.5f32 - f32::EPSILON / 4.0;
    assert_eq!(visible_window(just_below_half, 1.0, 5, 100).start_index, 0);
    assert_eq!(visible_window(0.5, 1.0, 5, 100).start_index, 1);

    // Start clamps to the last item; end clamps to the count.
    assert_eq!(visible_window(1e9, 60.0, 15, 100), WindowRange::new(99, 100));
    assert_eq!(visible_window(0.0, 60.0, 15, 4), WindowRange::new(0, 4));
}

#[test]
fn windower_edge_cases_yield_empty_or_origin() {
    assert!(visible_window(500.0, 60.0, 15, 0).is_empty());
    assert!(visible_window(0.0, 0.0, 15, 10).is_empty());
    assert!(visible_window(0.0, f32::NAN, 15, 10).is_empty());
    assert_eq!(visible_window(f32::NAN, 60.0, 3, 10), WindowRange::new(0, 3));
    assert_eq!(
        visible_window(f32::NEG_INFINITY, 60.0, 3, 10),
        WindowRange::new(0, 3)
    );
}

#[test]
fn far_scroll_rebinds_the_whole_window() {
    let mut c = container(100, 60.0, 15, 15);
    assert_eq!(pooled_indexes(&c), (0..15).collect::<Vec<_>>());
    assert_eq!(c.host().extent, 6000.0);

    c.scroll_to(-3000.0);
    assert!(c.tick());
    assert_eq!(c.window(), WindowRange::new(50, 65));
    assert_eq!(c.pool().range(), WindowRange::new(50, 65));
    assert_eq!(pooled_items(&c), (50..65).collect::<Vec<_>>());
    assert_invariants(&c);

    // Nothing moves when the offset is unchanged.
    assert!(!c.tick());
}

#[test]
fn small_scroll_recycles_only_the_edges() {
    let mut c = container(100, 10.0, 10, 10);
    let acquired_before = c.host().acquired;

    c.scroll_to(20.0);
    c.tick();
    assert_eq!(c.pool().range(), WindowRange::new(2, 12));
    assert_eq!(c.host().acquired - acquired_before, 2);
    assert_eq!(c.host().released, 2);

    c.scroll_to(0.0);
    c.tick();
    assert_eq!(c.pool().range(), WindowRange::new(0, 10));
    assert_invariants(&c);
}

#[test]
fn removing_a_pooled_item_closes_the_gap() {
    let mut c = container(10, 30.0, 10, 10);
    assert_eq!(pooled_indexes(&c), (0..10).collect::<Vec<_>>());
    let moved_handle = *c.pool().get(4).unwrap().handle().unwrap();

    assert_eq!(c.item_removed(&3), EditOutcome::Applied);
    assert_eq!(c.pool().len(), 9);
    assert_eq!(pooled_indexes(&c), (0..9).collect::<Vec<_>>());

    let entry = c.entry_for_item(&4).unwrap();
    assert_eq!(entry.index(), 3);
    assert_eq!(entry.handle(), Some(&moved_handle));
    assert_eq!(c.host().offsets[&moved_handle], 90.0);
    assert_eq!(c.host().extent, 270.0);
    assert_invariants(&c);
}

#[test]
fn remove_before_the_window_shifts_the_pool() {
    let mut c = container(100, 10.0, 10, 10);
    c.scroll_to(500.0);
    c.tick();
    assert_eq!(c.pool().range(), WindowRange::new(50, 60));

    c.item_removed(&10);
    assert_eq!(c.pool().range(), WindowRange::new(49, 59));
    assert_eq!(pooled_items(&c), (50..60).collect::<Vec<_>>());
    assert_invariants(&c);

    // The next tick re-centres on the (unchanged) scroll offset.
    c.tick();
    assert_eq!(c.pool().range(), WindowRange::new(50, 60));
    assert_invariants(&c);
}

#[test]
fn remove_after_the_window_leaves_the_pool_alone() {
    let mut c = container(100, 10.0, 10, 10);
    let before = pooled_items(&c);
    let released = c.host().released;

    c.item_removed(&80);
    assert_eq!(pooled_items(&c), before);
    assert_eq!(c.host().released, released);
    assert_eq!(c.len(), 99);
    assert_invariants(&c);
}

#[test]
fn removing_twice_is_the_same_as_once() {
    let mut c = container(20, 10.0, 10, 10);
    assert!(c.item_removed(&5).is_applied());
    let items = c.items().to_vec();
    let pooled = pooled_items(&c);
    let released = c.host().released;

    assert_eq!(c.item_removed(&5), EditOutcome::NoOp);
    assert_eq!(c.items(), &items[..]);
    assert_eq!(pooled_items(&c), pooled);
    assert_eq!(c.host().released, released);
}

#[test]
fn duplicate_insert_is_a_no_op() {
    let mut c = container(3, 10.0, 5, 5);
    let acquired = c.host().acquired;
    assert_eq!(c.item_added(1), EditOutcome::NoOp);
    assert_eq!(c.items(), &[0, 1, 2]);
    assert_eq!(c.host().acquired, acquired);
}

#[test]
fn insert_binds_a_widget_when_the_pool_has_room() {
    let mut c = container(3, 10.0, 5, 5);
    assert_eq!(c.item_added(42), EditOutcome::Applied);
    assert_eq!(pooled_items(&c), vec![0, 1, 2, 42]);
    let last = c.pool().last().unwrap();
    assert_eq!(last.index(), 3);
    assert_eq!(c.host().offsets[last.handle().unwrap()], 30.0);
    assert_eq!(c.host().extent, 40.0);
    assert_invariants(&c);
}

#[test]
fn insert_into_an_empty_container_binds_index_zero() {
    let mut c = container(0, 10.0, 5, 5);
    assert!(c.pool().is_empty());
    c.item_added(7);
    assert_eq!(pooled_items(&c), vec![7]);
    assert_invariants(&c);
}

#[test]
fn insert_past_a_full_pool_waits_for_the_window() {
    let mut c = container(5, 10.0, 5, 5);
    c.item_added(99);
    assert_eq!(pooled_items(&c), vec![0, 1, 2, 3, 4]);

    c.scroll_to(10.0);
    c.tick();
    assert_eq!(pooled_items(&c), vec![1, 2, 3, 4, 99]);
    assert_invariants(&c);
}

#[test]
fn full_replace_resets_scroll_and_rebuilds() {
    let mut c = container(100, 10.0, 10, 12);
    c.scroll_to(400.0);
    c.set_target_offset(800.0);
    c.tick();
    assert_eq!(c.pool().range(), WindowRange::new(40, 50));
    let released = c.host().released;

    let unfiltered: Vec<u32> = (1000..1030).collect();
    c.items_replaced(unfiltered.clone());

    assert_eq!(c.host().released, released + 10);
    assert_eq!(c.scroll_state(), ScrollState::default());
    assert_eq!(c.pool().starting_index(), 0);
    assert_eq!(pooled_items(&c), unfiltered[..12].to_vec());
    assert_invariants(&c);

    c.tick();
    assert_eq!(c.pool().range(), WindowRange::new(0, 10));
    assert_invariants(&c);
}

#[test]
fn merge_appends_only_new_items() {
    let mut c = container(3, 10.0, 5, 5);
    c.scroll_to(10.0);
    c.tick();

    c.commit_merge(vec![2, 3, 4, 3]);
    assert_eq!(c.items(), &[0, 1, 2, 3, 4]);
    assert_eq!(c.scroll_offset(), 10.0);
    assert_eq!(c.apply(Edit::Merged(vec![0, 1])), EditOutcome::NoOp);
    assert_invariants(&c);
}

#[test]
fn commit_outcomes_update_status_and_notify_host() {
    let mut c = container(10, 10.0, 5, 5);

    c.commit_replace(Vec::new());
    assert_eq!(c.status(), &ListStatus::Empty);
    assert_eq!(c.host().empty_results, 1);
    assert!(c.pool().is_empty());

    c.commit_replace(vec![1, 2]);
    assert_eq!(c.status(), &ListStatus::Ready);

    c.commit_failure("connection reset");
    assert_eq!(
        c.status(),
        &ListStatus::Unavailable("connection reset".to_string())
    );
    assert_eq!(c.host().errors, vec!["connection reset".to_string()]);
    assert!(c.is_empty());
    assert_eq!(c.host().extent, 0.0);
    assert_invariants(&c);
}

#[test]
fn surface_error_keeps_the_current_items() {
    let mut c = container(10, 10.0, 5, 5);
    c.scroll_to(30.0);
    c.tick();

    c.surface_error("page 2 timed out");
    assert_eq!(
        c.status(),
        &ListStatus::Unavailable("page 2 timed out".to_string())
    );
    assert_eq!(c.host().errors, vec!["page 2 timed out".to_string()]);
    assert_eq!(c.len(), 10);
    assert_eq!(c.scroll_offset(), 30.0);
    assert_eq!(pooled_indexes(&c), vec![3, 4, 5, 6, 7]);
    assert_invariants(&c);

    c.items_replaced(vec![7, 8]);
    assert_eq!(c.status(), &ListStatus::Ready);
}

#[test]
fn pool_release_is_idempotent() {
    let mut host = RecordingHost::default();
    let mut pool = ItemPool::<u32, u32>::new(4, 10.0);
    pool.acquire(&mut host, 1, 5).unwrap();
    pool.acquire(&mut host, 2, 6).unwrap();

    assert!(pool.release(&mut host, 0));
    assert!(!pool.release(&mut host, 0));
    assert!(!pool.release(&mut host, 9));
    assert_eq!(host.released, 1);
    assert!(pool.get(0).unwrap().is_released());

    // Evicting a released entry does not release it again.
    assert_eq!(pool.evict_front(&mut host), Some(1));
    assert_eq!(host.released, 1);
    assert_eq!(pool.starting_index(), 6);
}

#[test]
fn pool_acquire_enforces_capacity_and_contiguity() {
    let mut host = RecordingHost::default();
    let mut pool = ItemPool::<u32, u32>::new(2, 10.0);

    assert_eq!(pool.acquire(&mut host, 10, 10), Ok(0));
    assert_eq!(
        pool.acquire(&mut host, 12, 12),
        Err(PoolError::NotContiguous {
            index: 12,
            start: 10,
            end: 11
        })
    );
    assert_eq!(pool.acquire(&mut host, 9, 9), Ok(0));
    assert_eq!(pool.starting_index(), 9);
    assert_eq!(
        pool.acquire(&mut host, 11, 11),
        Err(PoolError::CapacityExceeded { capacity: 2 })
    );
    assert_eq!(host.acquired, 2);
    assert_eq!(pool.find_by_identity(&10), Some(1));
    assert_eq!(pool.find_by_identity(&11), None);

    pool.clear(&mut host);
    assert!(pool.is_empty());
    assert!(host.live.is_empty());
}

#[test]
fn pool_capacity_is_raised_to_the_window() {
    let c = container(50, 10.0, 8, 3);
    assert_eq!(c.config().pool_capacity, 8);
    assert_eq!(c.pool().len(), 8);
}

#[test]
fn window_change_callback_fires_once_per_change() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut c = ScrollContainer::new(
        ContainerOptions::new(10.0, 5)
            .with_initial_items(0u32..50)
            .with_on_window_change(Some(move |range: WindowRange, count: usize| {
                assert!(range.len() <= 5);
                assert_eq!(count, 50);
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        RecordingHost::default(),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    c.scroll_by(30.0);
    c.tick();
    c.tick();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn visible_items_follow_the_scroll_offset() {
    let mut c = container(30, 10.0, 4, 6);
    c.scroll_to(-100.0);
    assert_eq!(c.visible_items(), &[10, 11, 12, 13]);
    c.item_removed(&11);
    assert_eq!(c.visible_items(), &[10, 12, 13, 14]);
}

#[test]
fn randomized_edits_keep_the_pool_consistent() {
    let mut rng = Lcg::new(0x5eed);
    for round in 0..20u64 {
        let max_displayed = rng.gen_range_usize(1, 12);
        let capacity = max_displayed + rng.gen_range_usize(0, 4);
        let mut c = container(
            rng.gen_range_usize(0, 60) as u32,
            12.0,
            max_displayed,
            capacity,
        );
        let mut next_id = 10_000u32 + round as u32 * 1_000;

        for _ in 0..200 {
            match rng.gen_range_usize(0, 10) {
                0..=2 => {
                    let offset = rng.gen_range_usize(0, 1_000) as f32;
                    c.scroll_to(if rng.next_u64() & 1 == 1 { -offset } else { offset });
                }
                3 | 4 => {
                    c.item_added(next_id);
                    next_id += 1;
                }
                5 | 6 if !c.is_empty() => {
                    let victim = c.items()[rng.gen_range_usize(0, c.len())];
                    c.item_removed(&victim);
                }
                7 => {
                    let n = rng.gen_range_usize(0, 40) as u32;
                    c.items_replaced((next_id..next_id + n).collect());
                    next_id += n;
                }
                _ => {}
            }
            assert_invariants(&c);

            c.tick();
            assert_invariants(&c);
            let window = c.window();
            assert!(window.len() <= max_displayed);
            if window.is_empty() {
                assert!(c.pool().is_empty());
            } else {
                assert_eq!(c.pool().range(), window);
            }
        }
    }
}
