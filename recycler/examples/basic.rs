// Example: a 100k-row list that only ever keeps a screenful of widgets alive.
use recycler::{ContainerOptions, ScrollContainer, WidgetHost};

#[derive(Default)]
struct CountingHost {
    live: usize,
    created: usize,
    extent: f32,
}

impl WidgetHost<u32> for CountingHost {
    type Handle = u32;

    fn acquire_widget(&mut self, item: &u32, _index: usize) -> u32 {
        self.live += 1;
        self.created += 1;
        *item
    }

    fn release_widget(&mut self, _handle: u32) {
        self.live -= 1;
    }

    fn set_widget_offset(&mut self, _handle: &u32, _index: usize, _offset: f32) {}

    fn set_content_extent(&mut self, total_height: f32) {
        self.extent = total_height;
    }
}

fn main() {
    let options = ContainerOptions::new(24.0, 20)
        .with_pool_capacity(24)
        .with_initial_items(0..100_000u32);
    let mut list = ScrollContainer::new(options, CountingHost::default());
    println!("content_extent={}", list.host().extent);

    // Fling through the list one frame at a time.
    for frame in 0..600 {
        list.scroll_by(-37.5);
        list.tick();
        if frame % 100 == 0 {
            println!(
                "frame={frame} window={:?} live={} created={}",
                list.window(),
                list.host().live,
                list.host().created
            );
        }
    }
}
