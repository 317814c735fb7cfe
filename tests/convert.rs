use std::fs;
use std::path::Path;

use gpx_resample::abort::AbortSignal;
use gpx_resample::pipeline::{CsvSink, Pipeline, PipelineOptions};
use gpx_resample::resample::{InterpolationMode, ResampleOptions, Resampler, SpeedUnit};
use gpx_resample::track;

const DEMO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/ride.gpx");

async fn convert(output: &Path, options: ResampleOptions) -> Vec<csv::StringRecord> {
    let segment = track::parse_gpx_file(DEMO).unwrap();
    let report = Pipeline::new(PipelineOptions::default())
        .run(
            Resampler::new(segment, options),
            CsvSink::new(output),
            AbortSignal::never(),
        )
        .await
        .unwrap();

    let mut reader = csv::Reader::from_path(output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["time", "lat", "lon", "speed", "altitude", "riderCadence", "remainingEnergy", "power"]
    );
    let rows: Vec<_> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), report.samples);
    rows
}

#[tokio::test]
async fn demo_ride_resamples_to_one_row_per_second() {
    let dir = tempfile::tempdir().unwrap();
    let rows = convert(&dir.path().join("ride.csv"), ResampleOptions::default()).await;

    // 3 + 4 + 4 + 4 + 3 seconds; the final fix is not emitted.
    assert_eq!(rows.len(), 18);

    let start = 1_556_442_720_i64;
    let times: Vec<i64> = rows.iter().map(|r| r[0].parse().unwrap()).collect();
    assert_eq!(times, (0..18).map(|i| start + i).collect::<Vec<_>>());

    assert_eq!(&rows[0][1], "48.137154");
    assert_eq!(&rows[0][4], "519.0");
    for row in &rows {
        let lat: f64 = row[1].parse().unwrap();
        assert!((48.137154..48.138064).contains(&lat));
        let speed: f64 = row[3].parse().unwrap();
        assert!(speed > 5.0 && speed < 60.0, "implausible bike speed {speed}");
        assert_eq!(&row[5], "0.0");
        assert_eq!(&row[6], "0.0");
        assert_eq!(&row[7], "0.0");
    }
}

#[tokio::test]
async fn legacy_mode_matches_legacy_tables() {
    let dir = tempfile::tempdir().unwrap();
    let options = ResampleOptions {
        interpolation: InterpolationMode::Legacy,
        speed_unit: SpeedUnit::DecametresPerHour,
    };
    let rows = convert(&dir.path().join("legacy.csv"), options).await;
    assert_eq!(rows.len(), 18);

    // Stamped from the end of each pair.
    let first: i64 = rows[0][0].parse().unwrap();
    assert_eq!(first, 1_556_442_723);

    // Second row of the first pair sits one full delta past the start fix.
    let alt: f64 = rows[1][4].parse().unwrap();
    assert!((alt - 519.4).abs() < 1e-9);
    let alt: f64 = rows[2][4].parse().unwrap();
    assert!((alt - 519.8).abs() < 1e-9);
}

#[tokio::test]
async fn bad_timestamp_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.gpx");
    let output = dir.path().join("broken.csv");
    let doc = fs::read_to_string(DEMO)
        .unwrap()
        .replace("2019-04-28T09:12:11Z", "28/04/2019 09:12:11");
    fs::write(&input, doc).unwrap();

    let segment = track::parse_gpx_file(&input).unwrap();
    let result = Pipeline::new(PipelineOptions::default())
        .run(
            Resampler::new(segment, ResampleOptions::default()),
            CsvSink::new(&output),
            AbortSignal::never(),
        )
        .await;

    assert!(result.is_err());
    assert!(!output.exists());
}
