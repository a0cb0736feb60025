use snowflake::SnowflakeIdBucket;
use std::sync::{Mutex, OnceLock};

static BUCKET: OnceLock<Mutex<SnowflakeIdBucket>> = OnceLock::new();

/// Install the process-wide snowflake generator.
///
/// Only the first call takes effect; `next_id` falls back to
/// machine/node `1/1` when nothing was installed (tests, tools).
pub fn install(machine_id: i32, node_id: i32) {
    let _ = BUCKET.set(Mutex::new(SnowflakeIdBucket::new(machine_id, node_id)));
}

/// Generate one snowflake ID in string form.
pub fn next_id() -> String {
    let bucket = BUCKET.get_or_init(|| Mutex::new(SnowflakeIdBucket::new(1, 1)));
    bucket.lock().unwrap().get_id().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let id = next_id();
            assert!(!id.is_empty());
            assert!(seen.insert(id), "duplicate snowflake id");
        }
    }

    #[test]
    fn ids_parse_as_i64() {
        let id = next_id();
        assert!(id.parse::<i64>().is_ok(), "not a valid i64: {id}");
    }
}
