// src/utils/logging.rs - Logging helpers shared by cleaning and clustering methods
use log::{debug, info, warn};
use std::time::Instant;

/// Tags every line with the method it belongs to and the time since the
/// method started.
#[derive(Clone)]
pub struct StageLogger {
    method_name: &'static str,
    method_tag: &'static str,
    start_time: Instant,
}

impl StageLogger {
    pub fn new(method_name: &'static str) -> Self {
        Self {
            method_name,
            method_tag: tag_for(method_name),
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, details: &str) {
        info!(
            "[{}] 🚀 Starting {} ({})",
            self.method_tag, self.method_name, details
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => debug!(
                "[{}] 🔄 Phase: {} - {} [+{:.3}s]",
                self.method_tag,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => debug!(
                "[{}] 🔄 Phase: {} [+{:.3}s]",
                self.method_tag,
                phase,
                elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_blocks_in(&self, blocks: usize, comparisons: f64, clean_clean: bool) {
        info!(
            "[{}] 📊 Input: {} {} blocks, {:.0} comparisons",
            self.method_tag,
            blocks,
            if clean_clean { "bilateral" } else { "unilateral" },
            comparisons
        );
    }

    /// Summary of a cleaning pass: comparisons before and after.
    pub fn log_completion(&self, blocks_out: usize, comparisons_in: f64, comparisons_out: f64) {
        let reduction = if comparisons_in > 0.0 {
            (1.0 - comparisons_out / comparisons_in) * 100.0
        } else {
            0.0
        };
        info!(
            "[{}] ✅ {} produced {} blocks: {:.0} → {:.0} comparisons ({:.1}% fewer) in {:.2?}",
            self.method_tag,
            self.method_name,
            blocks_out,
            comparisons_in,
            comparisons_out,
            reduction,
            self.start_time.elapsed()
        );
    }

    /// Summary of a clustering pass.
    pub fn log_clusters(&self, items: usize, clusters: usize, singletons: usize) {
        info!(
            "[{}] ✅ {} grouped {} items into {} clusters ({} singletons) in {:.2?}",
            self.method_tag,
            self.method_name,
            items,
            clusters,
            singletons,
            self.start_time.elapsed()
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!("[{}] ⚠️  {}", self.method_tag, message);
    }
}

fn tag_for(method_name: &str) -> &'static str {
    match method_name {
        "Comparison Propagation" => "CP",
        "Cardinality Node Pruning" => "CNP",
        "Reciprocal Cardinality Node Pruning" => "RCNP",
        "Weighted Node Pruning" => "WNP",
        "Reciprocal Weighted Node Pruning" => "RWNP",
        "Attribute Name Clustering" => "ANC",
        "Attribute Value Clustering" => "AVC",
        "Holistic Attribute Clustering" => "HAC",
        "Connected Components Clustering" => "CCC",
        _ => "METHOD",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_methods_get_short_tags() {
        assert_eq!(StageLogger::new("Comparison Propagation").method_tag, "CP");
        assert_eq!(StageLogger::new("Weighted Node Pruning").method_tag, "WNP");
        assert_eq!(StageLogger::new("Something Else").method_tag, "METHOD");
    }
}
