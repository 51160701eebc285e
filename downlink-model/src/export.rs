use chrono::{DateTime, Utc};

use crate::error::ModelError;
use crate::ids::{NodeId, RequestId};

/// Filter over the artifact store recognized by the export surface.
///
/// All predicates are optional and conjunctive; both range kinds are
/// inclusive on both ends when present.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ExportFilter {
    pub request_timestamp_start: Option<DateTime<Utc>>,
    pub request_timestamp_end: Option<DateTime<Utc>>,
    pub request_id_start: Option<RequestId>,
    pub request_id_end: Option<RequestId>,
    pub target_id: Option<NodeId>,
}

impl ExportFilter {
    pub fn is_empty(&self) -> bool {
        self == &ExportFilter::default()
    }

    /// Reject ranges that can never match so callers get a 400 instead of a
    /// confusing empty bundle.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let (Some(start), Some(end)) = (self.request_id_start, self.request_id_end)
            && start > end
        {
            return Err(ModelError::InvalidFilter(format!(
                "requestIdStart {start} exceeds requestIdEnd {end}"
            )));
        }
        if let (Some(start), Some(end)) = (self.request_timestamp_start, self.request_timestamp_end)
            && start > end
        {
            return Err(ModelError::InvalidFilter(
                "requestTimestampStart exceeds requestTimestampEnd".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_empty_and_valid() {
        let filter = ExportFilter::default();
        assert!(filter.is_empty());
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn inverted_id_range_is_rejected() {
        let filter = ExportFilter {
            request_id_start: Some(RequestId(4)),
            request_id_end: Some(RequestId(2)),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn single_sided_ranges_are_valid() {
        let filter = ExportFilter {
            request_id_start: Some(RequestId(2)),
            ..Default::default()
        };
        assert!(filter.validate().is_ok());
        assert!(!filter.is_empty());
    }
}
