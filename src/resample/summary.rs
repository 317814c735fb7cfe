use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::ResampleError;
use super::resampler::Resampler;
use crate::geo;

/// Overview of a segment and of the table it resamples to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub name: Option<String>,
    pub points: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_s: i64,
    pub distance_m: f64,
    pub samples: u64,
}

impl TrackSummary {
    pub fn from_resampler(resampler: &Resampler) -> Result<Self, ResampleError> {
        let segment = resampler.segment();
        let fixes = &segment.fixes;
        let (Some(first), Some(last)) = (fixes.first(), fixes.last()) else {
            return Err(ResampleError::EmptySegment);
        };

        let start = first.timestamp(0)?;
        let end = last.timestamp(fixes.len() - 1)?;
        let distance_m: f64 = fixes
            .windows(2)
            .map(|w| geo::distance(w[0].latitude, w[0].longitude, w[1].latitude, w[1].longitude))
            .sum();

        Ok(Self {
            name: segment.name.clone(),
            points: fixes.len(),
            start,
            end,
            duration_s: (end - start).num_seconds(),
            distance_m: (distance_m * 100.0).round() / 100.0,
            samples: resampler.expected_len()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::ResampleOptions;
    use crate::track::{Fix, TrackSegment};

    #[test]
    fn summarises_segment() {
        let segment = TrackSegment::new(
            Some("Morning ride".into()),
            vec![
                Fix::new(0.0, 0.0, 0.0, "2023-01-01T00:00:00Z"),
                Fix::new(0.001, 0.0, 0.0, "2023-01-01T00:00:03Z"),
                Fix::new(0.002, 0.0, 0.0, "2023-01-01T00:00:10Z"),
            ],
        );
        let summary =
            TrackSummary::from_resampler(&Resampler::new(segment, ResampleOptions::default()))
                .unwrap();

        assert_eq!(summary.name.as_deref(), Some("Morning ride"));
        assert_eq!(summary.points, 3);
        assert_eq!(summary.duration_s, 10);
        assert_eq!(summary.samples, 10);
        assert!((summary.distance_m - 222.64).abs() < 0.01);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["start"], "2023-01-01T00:00:00Z");
        assert_eq!(json["samples"], 10);
    }

    #[test]
    fn empty_segment_has_no_summary() {
        let resampler = Resampler::new(TrackSegment::new(None, vec![]), ResampleOptions::default());
        assert!(matches!(
            TrackSummary::from_resampler(&resampler),
            Err(ResampleError::EmptySegment)
        ));
    }
}
