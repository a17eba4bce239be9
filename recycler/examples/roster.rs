// Example: an online-user roster driven by connect/disconnect events.
use recycler::{ContainerOptions, Edit, ScrollContainer, WidgetHost};

struct PrintHost;

impl WidgetHost<String> for PrintHost {
    type Handle = String;

    fn acquire_widget(&mut self, item: &String, index: usize) -> String {
        println!("  + {item} at #{index}");
        item.clone()
    }

    fn release_widget(&mut self, handle: String) {
        println!("  - {handle}");
    }

    fn set_widget_offset(&mut self, handle: &String, index: usize, offset: f32) {
        println!("  ~ {handle} -> #{index} (y={offset})");
    }

    fn set_content_extent(&mut self, total_height: f32) {
        println!("  extent={total_height}");
    }
}

fn main() {
    let users = ["alice", "bob", "carol", "dave"].map(String::from);
    let options = ContainerOptions::new(40.0, 3)
        .with_pool_capacity(4)
        .with_initial_items(users);
    let mut roster = ScrollContainer::new(options, PrintHost);

    let events = [
        Edit::Added("erin".to_string()),
        Edit::Added("alice".to_string()),
        Edit::Removed("bob".to_string()),
        Edit::Removed("mallory".to_string()),
        Edit::Replaced(Vec::new()),
    ];
    for event in events {
        println!("{event:?}");
        let outcome = roster.apply(event);
        roster.tick();
        println!("  => {outcome:?}, window={:?}", roster.window());
    }
}
