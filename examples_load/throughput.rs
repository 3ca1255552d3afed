use std::sync::Arc;
use std::time::Instant;

use partition_log::noop_sink::NoopSink;
use partition_log::{Logger, LoggerConfig, Value};
use serde_json::json;

fn main() {
    let sink = Arc::new(NoopSink);
    let logger = Logger::new(LoggerConfig::default(), sink);

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let context = Value::from(json!({
            "iteration": i,
            "detail": {"codes": [500, 502], "retry": true},
        }));
        let _ = logger.error("load test iteration {<iteration>}", context);
    }

    let elapsed = start.elapsed();
    println!(
        "formatted {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
