//! Per-request context carried through a processing request.

use std::time::Instant;

use river_core::ProjectionParams;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProcessContext {
    pub request_id: Uuid,
    pub params: ProjectionParams,
    started: Instant,
}

impl ProcessContext {
    pub fn new(params: ProjectionParams) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            params,
            started: Instant::now(),
        }
    }

    /// Milliseconds since the request was accepted.
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_get_distinct_ids() {
        let params = ProjectionParams::new(100.0, 50.0).unwrap();
        let a = ProcessContext::new(params);
        let b = ProcessContext::new(params);
        assert_ne!(a.request_id, b.request_id);
        assert!(a.elapsed_ms() >= 0.0);
    }
}
