//! Recoverable conditions raised while processing a mesh
//!
//! None of these stop the pipeline. They are collected on the processed mesh so
//! the caller can decide whether to reject the mesh or the whole run.

/// A recoverable problem found while processing one mesh
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    /// More distinct bones than fit in a u8 bone index
    #[error("bone '{name}' exceeds the {limit}-bone limit, its influences were dropped")]
    BoneOverflow { name: String, limit: usize },

    /// Skin cluster without a link node
    #[error("skin cluster {cluster} has no link node, registered as '{name}' with identity bind pose")]
    UnresolvedLink { cluster: usize, name: String },

    /// Influences pointing past the end of the control point array
    #[error("bone '{bone}' has {count} influence(s) on control points outside the mesh ({control_points} control points)")]
    InfluenceOutOfRange {
        bone: String,
        count: usize,
        control_points: usize,
    },

    /// Blend target whose control point count differs from the base mesh
    #[error("blend target {target} of channel '{channel}' has {found} control points, base mesh has {expected}; target skipped")]
    TopologyMismatch {
        channel: String,
        target: usize,
        expected: usize,
        found: usize,
    },

    /// Output file name differs from the mesh or blend-shape name
    #[error("{kind} '{name}' written as '{file}' to keep output files distinct")]
    RenamedOutput {
        kind: String,
        name: String,
        file: String,
    },
}

/// Record a diagnostic and log it
pub(crate) fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!("{}", diagnostic);
    diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_mismatch_message() {
        let diagnostic = Diagnostic::TopologyMismatch {
            channel: "Smile".to_string(),
            target: 0,
            expected: 99,
            found: 100,
        };
        let message = diagnostic.to_string();
        assert!(message.contains("'Smile'"));
        assert!(message.contains("100 control points"));
        assert!(message.contains("has 99"));
    }

    #[test]
    fn test_report_collects() {
        let mut diagnostics = Vec::new();
        report(
            &mut diagnostics,
            Diagnostic::BoneOverflow {
                name: "extra".to_string(),
                limit: 256,
            },
        );
        assert_eq!(diagnostics.len(), 1);
    }
}
