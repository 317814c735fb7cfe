use chrono::{DateTime, Utc};
use serde::Deserialize;
use strum_macros::Display;

use super::error::ResampleError;
use super::sample::Sample;
use super::units::SpeedUnit;
use crate::geo;
use crate::track::{Fix, TrackSegment};

/// How positions are interpolated between two fixes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InterpolationMode {
    /// `last + (i / elapsed) * (next - last)`, stamped from the earlier fix.
    #[default]
    Normalized,
    /// `last + i * (next - last)`, stamped from the later fix. Kept for
    /// tables produced by earlier versions of the converter.
    Legacy,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ResampleOptions {
    pub interpolation: InterpolationMode,
    pub speed_unit: SpeedUnit,
}

/// Interpolation state for one consecutive fix pair.
#[derive(Debug, Clone)]
struct PairPlan {
    last: Fix,
    next: Fix,
    last_time: i64,
    next_time: i64,
    elapsed_s: f64,
    count: u64,
    speed: f64,
}

/// Lazily walks a segment pairwise and yields one sample per whole elapsed
/// second. The end fix of each pair is never emitted. After the first error
/// the iterator is exhausted.
pub struct Resampler {
    segment: TrackSegment,
    options: ResampleOptions,
    /// Index of the `next` fix of the pair being walked.
    cursor: usize,
    last_time: Option<DateTime<Utc>>,
    pair: Option<PairPlan>,
    step: u64,
    failed: bool,
}

impl Resampler {
    pub fn new(segment: TrackSegment, options: ResampleOptions) -> Self {
        Self {
            segment,
            options,
            cursor: 0,
            last_time: None,
            pair: None,
            step: 0,
            failed: false,
        }
    }

    pub fn options(&self) -> ResampleOptions {
        self.options
    }

    pub fn segment(&self) -> &TrackSegment {
        &self.segment
    }

    /// Number of samples the whole segment produces, without interpolating.
    pub fn expected_len(&self) -> Result<u64, ResampleError> {
        let fixes = &self.segment.fixes;
        if fixes.len() < 2 {
            return Ok(0);
        }

        let mut total = 0;
        let mut last = fixes[0].timestamp(0)?;
        for (index, fix) in fixes.iter().enumerate().skip(1) {
            let next = fix.timestamp(index)?;
            total += sample_count(elapsed_seconds(last, next));
            last = next;
        }
        Ok(total)
    }

    fn advance_pair(&mut self) -> Result<Option<PairPlan>, ResampleError> {
        let fixes = &self.segment.fixes;
        if fixes.len() < 2 {
            return Ok(None);
        }

        let mut last_time = match self.last_time {
            Some(t) => t,
            None => fixes[0].timestamp(0)?,
        };

        while self.cursor + 1 < fixes.len() {
            self.cursor += 1;
            let index = self.cursor;
            let last = &fixes[index - 1];
            let next = &fixes[index];
            let next_time = next.timestamp(index)?;
            self.last_time = Some(next_time);

            let elapsed_s = elapsed_seconds(last_time, next_time);
            let count = sample_count(elapsed_s);
            if elapsed_s < 0.0 {
                log::warn!(
                    "trkpt {} is {:.3}s earlier than its predecessor, skipping pair",
                    index,
                    -elapsed_s
                );
            }
            if count == 0 {
                last_time = next_time;
                continue;
            }

            let d = geo::distance(next.latitude, next.longitude, last.latitude, last.longitude);
            let speed = self.options.speed_unit.convert_mps(d / elapsed_s);
            log::debug!(
                "pair {}: d = {:.3}m, v = {:.3} {}, dt = {:.3}s",
                index,
                d,
                speed,
                self.options.speed_unit,
                elapsed_s
            );

            return Ok(Some(PairPlan {
                last: last.clone(),
                next: next.clone(),
                last_time: last_time.timestamp(),
                next_time: next_time.timestamp(),
                elapsed_s,
                count,
                speed,
            }));
        }

        Ok(None)
    }

    fn interpolate(&self, pair: &PairPlan, step: u64) -> Sample {
        let (factor, base_time) = match self.options.interpolation {
            InterpolationMode::Normalized => (step as f64 / pair.elapsed_s, pair.last_time),
            InterpolationMode::Legacy => (step as f64, pair.next_time),
        };
        let lerp = |a: f64, b: f64| a + factor * (b - a);

        Sample::new(
            base_time + step as i64,
            lerp(pair.last.latitude, pair.next.latitude),
            lerp(pair.last.longitude, pair.next.longitude),
            lerp(pair.last.elevation, pair.next.elevation),
            pair.speed,
        )
    }
}

impl Iterator for Resampler {
    type Item = Result<Sample, ResampleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(pair) = self.pair.take() {
                if self.step < pair.count {
                    let sample = self.interpolate(&pair, self.step);
                    self.step += 1;
                    self.pair = Some(pair);
                    return Some(Ok(sample));
                }
            }

            match self.advance_pair() {
                Ok(Some(pair)) => {
                    self.pair = Some(pair);
                    self.step = 0;
                }
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn elapsed_seconds(last: DateTime<Utc>, next: DateTime<Utc>) -> f64 {
    (next - last).num_milliseconds() as f64 / 1000.0
}

fn sample_count(elapsed_s: f64) -> u64 {
    if elapsed_s < 1.0 {
        0
    } else {
        elapsed_s.floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::metres_per_second_to_kmh;
    use crate::track::TrackError;

    fn segment(fixes: Vec<Fix>) -> TrackSegment {
        TrackSegment::new(None, fixes)
    }

    fn scenario() -> TrackSegment {
        segment(vec![
            Fix::new(0.0, 0.0, 0.0, "2023-01-01T00:00:00Z"),
            Fix::new(0.001, 0.0, 10.0, "2023-01-01T00:00:03Z"),
        ])
    }

    fn collect(resampler: Resampler) -> Vec<Sample> {
        resampler.collect::<Result<Vec<_>, _>>().unwrap()
    }

    const T0: i64 = 1_672_531_200;

    #[test]
    fn two_fix_scenario_normalized() {
        let samples = collect(Resampler::new(scenario(), ResampleOptions::default()));

        assert_eq!(samples.len(), 3);
        let times: Vec<_> = samples.iter().map(|s| s.unix_time).collect();
        assert_eq!(times, vec![T0, T0 + 1, T0 + 2]);

        let d = geo::distance(0.001, 0.0, 0.0, 0.0);
        assert!((d - 111.2).abs() < 0.2);
        let expected_speed = metres_per_second_to_kmh(d / 3.0);
        for s in &samples {
            assert!((s.speed - expected_speed).abs() < 1e-9);
            assert_eq!(s.rider_cadence, 0.0);
            assert_eq!(s.remaining_energy, 0.0);
            assert_eq!(s.power, 0.0);
        }

        let altitudes: Vec<_> = samples.iter().map(|s| s.altitude).collect();
        for (got, want) in altitudes.iter().zip([0.0, 10.0 / 3.0, 20.0 / 3.0]) {
            assert!((got - want).abs() < 1e-9, "{altitudes:?}");
        }
        assert!((samples[1].latitude - 0.001 / 3.0).abs() < 1e-12);
        assert_eq!(samples[2].longitude, 0.0);
    }

    #[test]
    fn two_fix_scenario_legacy() {
        let options = ResampleOptions {
            interpolation: InterpolationMode::Legacy,
            speed_unit: SpeedUnit::DecametresPerHour,
        };
        let samples = collect(Resampler::new(scenario(), options));

        let times: Vec<_> = samples.iter().map(|s| s.unix_time).collect();
        assert_eq!(times, vec![T0 + 3, T0 + 4, T0 + 5]);

        let altitudes: Vec<_> = samples.iter().map(|s| s.altitude).collect();
        assert_eq!(altitudes, vec![0.0, 10.0, 20.0]);
        assert!((samples[2].latitude - 0.002).abs() < 1e-12);

        let d = geo::distance(0.001, 0.0, 0.0, 0.0);
        let hours = 3.0 / 3600.0;
        assert!((samples[0].speed - d / hours / 10.0).abs() < 1e-6);
    }

    #[test]
    fn emits_floor_of_elapsed_per_pair() {
        let fixes = vec![
            Fix::new(10.0, 10.0, 0.0, "2023-01-01T00:00:00Z"),
            Fix::new(10.001, 10.0, 0.0, "2023-01-01T00:00:05.900Z"),
            Fix::new(10.002, 10.0, 0.0, "2023-01-01T00:00:06.400Z"),
            Fix::new(10.003, 10.0, 0.0, "2023-01-01T00:00:08Z"),
        ];
        let resampler = Resampler::new(segment(fixes), ResampleOptions::default());
        assert_eq!(resampler.expected_len().unwrap(), 5 + 0 + 1);

        let samples = collect(resampler);
        assert_eq!(samples.len(), 6);
        // End fix of every pair is never emitted.
        assert!(samples.iter().all(|s| s.latitude < 10.003));
        assert!(samples[..5].iter().all(|s| s.latitude < 10.001));
    }

    #[test]
    fn output_time_is_monotonic() {
        let fixes = vec![
            Fix::new(0.0, 0.0, 0.0, "2023-01-01T00:00:00Z"),
            Fix::new(0.0, 0.001, 0.0, "2023-01-01T00:00:04Z"),
            Fix::new(0.0, 0.002, 0.0, "2023-01-01T00:00:05Z"),
            Fix::new(0.0, 0.003, 0.0, "2023-01-01T00:00:05Z"),
            Fix::new(0.0, 0.004, 0.0, "2023-01-01T00:00:09Z"),
        ];
        let samples = collect(Resampler::new(segment(fixes), ResampleOptions::default()));
        let times: Vec<_> = samples.iter().map(|s| s.unix_time).collect();
        assert_eq!(
            times,
            (0..9).map(|i| T0 + i).collect::<Vec<_>>(),
            "duplicate timestamp pair emits nothing"
        );
    }

    #[test]
    fn speed_is_constant_within_pair() {
        let fixes = vec![
            Fix::new(0.0, 0.0, 0.0, "2023-01-01T00:00:00Z"),
            Fix::new(0.0, 0.001, 0.0, "2023-01-01T00:00:10Z"),
            Fix::new(0.0, 0.003, 0.0, "2023-01-01T00:00:20Z"),
        ];
        let samples = collect(Resampler::new(segment(fixes), ResampleOptions::default()));
        assert_eq!(samples.len(), 20);
        assert!(samples[..10].iter().all(|s| s.speed == samples[0].speed));
        assert!(samples[10..].iter().all(|s| s.speed == samples[10].speed));
        assert!((samples[10].speed - 2.0 * samples[0].speed).abs() < 1e-6);
    }

    #[test]
    fn single_fix_yields_nothing() {
        let fixes = vec![Fix::new(1.0, 1.0, 1.0, "2023-01-01T00:00:00Z")];
        let resampler = Resampler::new(segment(fixes), ResampleOptions::default());
        assert_eq!(resampler.expected_len().unwrap(), 0);
        assert_eq!(collect(resampler).len(), 0);
    }

    #[test]
    fn bad_timestamp_is_fatal_where_reached() {
        let fixes = vec![
            Fix::new(0.0, 0.0, 0.0, "2023-01-01T00:00:00Z"),
            Fix::new(0.0, 0.001, 0.0, "2023-01-01T00:00:02Z"),
            Fix::new(0.0, 0.002, 0.0, "garbage"),
            Fix::new(0.0, 0.003, 0.0, "2023-01-01T00:00:09Z"),
        ];
        let mut resampler = Resampler::new(segment(fixes), ResampleOptions::default());
        assert!(resampler.expected_len().is_err());

        assert!(resampler.next().unwrap().is_ok());
        assert!(resampler.next().unwrap().is_ok());
        match resampler.next() {
            Some(Err(ResampleError::Timestamp(TrackError::InvalidTimestamp { index, .. }))) => {
                assert_eq!(index, 2)
            }
            other => panic!("expected timestamp error, got {other:?}"),
        }
        assert!(resampler.next().is_none());
    }

    #[test]
    fn bad_first_timestamp_is_fatal() {
        let fixes = vec![
            Fix {
                time: None,
                ..Fix::new(0.0, 0.0, 0.0, "")
            },
            Fix::new(0.0, 0.001, 0.0, "2023-01-01T00:00:02Z"),
        ];
        let mut resampler = Resampler::new(segment(fixes), ResampleOptions::default());
        assert!(matches!(
            resampler.next(),
            Some(Err(ResampleError::Timestamp(TrackError::MissingTimestamp { index: 0 })))
        ));
        assert!(resampler.next().is_none());
    }
}
