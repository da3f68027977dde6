/*!
 * leakstress - Misuse-Scenario Stress Driver
 *
 * Hammers the resource lifecycle from many threads, running one misuse
 * scenario per invocation:
 * - leak:  create and execute, never close; the backup finalizer reclaims
 * - close: create, execute, close exactly once
 * - dbl:   close repeatedly on top of scoped cleanup
 *
 * Prints the tracker snapshot as JSON when the storm is over.
 */

use ffi_cleaner::{EchoContext, EchoLib, HandleResult, LeakTracker, TrackerConfig};
use log::{error, info, warn};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    Leak,
    Close,
    DoubleClose,
}

impl Scenario {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "leak" => Some(Self::Leak),
            "close" => Some(Self::Close),
            "dbl" => Some(Self::DoubleClose),
            _ => None,
        }
    }

    fn run_once(self, lib: &Arc<EchoLib>, tracker: &Arc<LeakTracker>) {
        let context = match EchoContext::create(lib.clone(), Some(tracker.clone())) {
            Ok(context) => context,
            Err(e) => {
                error!("Creation failed: {}", e);
                return;
            }
        };

        check(context.execute());

        match self {
            // Dropped unclosed: the backup finalizer reclaims and the
            // tracker counts the loss.
            Scenario::Leak => {}
            Scenario::Close => context.close(),
            Scenario::DoubleClose => {
                context.close();
                context.close();
            }
        }
    }
}

fn check(result: HandleResult<String>) {
    match result {
        Ok(message) if message == EchoLib::MESSAGE => {}
        Ok(message) => error!("Unexpected native response: {}", message),
        Err(e) => error!("Native call failed: {}", e),
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let scenario = args.next().unwrap_or_else(|| "leak".to_string());
    let threads: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(100);
    let loops: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(10_000);

    let Some(scenario) = Scenario::parse(&scenario) else {
        eprintln!("usage: leakstress [leak|close|dbl] [threads] [loops]");
        std::process::exit(2);
    };

    // Honor the LEAKSTRESS_LEAK_* environment, but the harness exists to
    // watch the counters, so detection itself is always on.
    let mut config = TrackerConfig::from_env("LEAKSTRESS");
    config.enabled = true;
    let log_sites = config.log_sites;

    let tracker = Arc::new(LeakTracker::new("EchoContext", config));
    let lib = Arc::new(EchoLib::new());

    info!(
        "Running {:?}: {} threads x {} loops (site tracking: {})",
        scenario, threads, loops, log_sites
    );

    let workers: Vec<_> = (0..threads)
        .map(|index| {
            let lib = lib.clone();
            let tracker = tracker.clone();
            thread::Builder::new()
                .name(format!("stress-{}", index))
                .spawn(move || {
                    for _ in 0..loops {
                        scenario.run_once(&lib, &tracker);
                    }
                })
                .expect("Failed to spawn worker thread")
        })
        .collect();

    for worker in workers {
        if worker.join().is_err() {
            error!("Worker thread panicked");
        }
    }

    info!(
        "Storm complete: {} native cells live, {} released",
        lib.live(),
        lib.released()
    );

    let snapshot = tracker.snapshot();
    if snapshot.has_lost() {
        warn!(
            "{} lost references across {} sites - owners dropped these without closing",
            snapshot.lost,
            snapshot.lost_sites().count()
        );
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).expect("Snapshot serialization cannot fail")
    );
}
