use log::LevelFilter;
use std::sync::Mutex;
use std::time::Instant;
use env_logger::{Builder, Target};

/// Global timestamp for delta calculation
static LAST_LOG: Mutex<Option<Instant>> = Mutex::new(None);

/// Initialize the logger with delta timestamps. `RUST_LOG` overrides the Debug default.
pub fn init() {
    let _ = Builder::new()
        .target(Target::Stdout)
        .format(|buf, record| {
            use std::io::Write;

            let delta = {
                let mut last = LAST_LOG.lock().unwrap_or_else(|e| e.into_inner());
                delta_ms(&mut last, Instant::now())
            };

            writeln!(
                buf,
                "{} [+{} ms] [{}] - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                delta,
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .try_init();
}

/// Milliseconds since the previous log line (0 for the first)
fn delta_ms(last: &mut Option<Instant>, now: Instant) -> u128 {
    let delta = last.map(|t| now.duration_since(t).as_millis()).unwrap_or(0);
    *last = Some(now);
    delta
}
