// Example: a search box that refreshes a pooled result list on every keystroke.
//
// Each keystroke supersedes the previous query. Slow queries keep running in the background but
// never overwrite the results of a newer one.
use std::time::{Duration, Instant};

use recycler::{ContainerOptions, WidgetHost};
use recycler_fetch::{BoundList, CancellationToken, FetchError, PollOptions, cancellable_sleep};

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

    fn set_widget_offset(&mut self, _handle: &String, _index: usize, _offset: f32) {}

    fn set_content_extent(&mut self, total_height: f32) {
        println!("  extent={total_height}");
    }

    fn on_empty_result(&mut self) {
        println!("  (no matches)");
    }

    fn on_error(&mut self, reason: &str) {
        println!("  error: {reason}");
    }
}

const CATALOG: &[&str] = &[
    "apple", "apricot", "avocado", "banana", "blackberry", "blueberry", "cherry", "coconut",
    "cranberry", "grape", "grapefruit", "kiwi", "lemon", "lime", "mango", "melon",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let search = |query: String, cancel: CancellationToken| async move {
        // Shorter queries match more and take longer.
        let latency = Duration::from_millis(200 / (query.len() as u64).max(1));
        if cancellable_sleep(latency, &cancel).await {
            return Err(FetchError::Cancelled);
        }
        Ok(CATALOG
            .iter()
            .filter(|name| name.starts_with(&query))
            .map(|name| name.to_string())
            .collect::<Vec<_>>())
    };

    let mut list = BoundList::new(
        runtime.handle().clone(),
        ContainerOptions::new(24.0, 4).with_pool_capacity(5),
        PrintHost,
        search,
    )
    .with_detail_poller(
        PollOptions::new(100),
        |names: Vec<String>, _cancel| async move {
            Ok::<_, FetchError>(
                names
                    .into_iter()
                    .map(|name| {
                        let stock = name.len() as u32 * 3;
                        (name, stock)
                    })
                    .collect::<Vec<_>>(),
            )
        },
        |_host: &mut PrintHost, stock: Vec<(String, u32)>| {
            for (name, count) in stock {
                println!("  {name}: {count} in stock");
            }
        },
    );

    let started = Instant::now();
    for query in ["a", "ap", "b", "bl"] {
        println!("query {query:?}");
        list.request_refresh(query.to_string());
        std::thread::sleep(Duration::from_millis(20));
    }

    let deadline = Duration::from_millis(600);
    while started.elapsed() < deadline {
        let now_ms = started.elapsed().as_millis() as u64;
        list.tick(now_ms);
        std::thread::sleep(Duration::from_millis(16));
    }

    println!("final: {:?}", list.container().items());
    Ok(())
}
