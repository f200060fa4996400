use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime, SubsecRound, TimeZone};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

use crate::logging::McstatLogger;

/// Local-time layout of the first column of a history line.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Online count recorded for an interval whose poll failed.
pub const NO_DATA: i64 = -1;

/// Upper bound on the points a ranged read returns.
pub const MAX_POINTS: u64 = 720;

const SECONDS_PER_DAY: u64 = 86_400;

/// One poll result: `YYYY-MM-DD HH:MM:SS,<online>` on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub time: NaiveDateTime,
    pub online: i64,
}

impl Sample {
    pub fn now(online: i64) -> Self {
        Self {
            time: Local::now().naive_local().trunc_subsecs(0),
            online,
        }
    }

    pub fn to_line(&self) -> String {
        format!("{},{}\n", self.time.format(TIME_FORMAT), self.online)
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let (time, online) = line.split_once(',')?;
        Some(Self {
            time: NaiveDateTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?,
            online: online.trim().parse().ok()?,
        })
    }

    /// Unix seconds, reading the stored wall-clock time as local time.
    pub fn timestamp(&self) -> i64 {
        Local
            .from_local_datetime(&self.time)
            .earliest()
            .map(|time| time.timestamp())
            .unwrap_or_else(|| self.time.and_utc().timestamp())
    }
}

/// A ranged, thinned-out slice of the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub length: u64,
    pub samples: Vec<Sample>,
}

/// Thins the last `days` worth of samples down to about [`MAX_POINTS`].
///
/// `samples` must be oldest-first; so is the result.
pub fn downsample(samples: &[Sample], days: u64, interval_secs: u64) -> Window {
    let length = SECONDS_PER_DAY.saturating_mul(days) / interval_secs.max(1);
    let step = (length / MAX_POINTS).max(1);

    let mut picked: Vec<Sample> = samples
        .iter()
        .rev()
        .take(usize::try_from(length).unwrap_or(usize::MAX))
        .step_by(step as usize)
        .copied()
        .collect();
    picked.reverse();

    Window {
        length: length / step,
        samples: picked,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history file i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Append-only flat file of samples.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, sample: Sample) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(sample.to_line().as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// File contents as written; empty when nothing was recorded yet.
    pub async fn read_raw(&self) -> Result<String, HistoryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn read_all(&self) -> Result<Vec<Sample>, HistoryError> {
        let raw = self.read_raw().await?;
        Ok(raw
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| {
                let sample = Sample::parse_line(line);
                if sample.is_none() {
                    McstatLogger::history_line_skipped(idx + 1, line);
                }
                sample
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    fn series(count: usize) -> Vec<Sample> {
        (0..count)
            .map(|i| Sample {
                time: at(0, 0, 0) + Duration::seconds(10 * i as i64),
                online: i as i64,
            })
            .collect()
    }

    #[test]
    fn line_format() {
        let sample = Sample {
            time: at(13, 5, 9),
            online: 42,
        };
        assert_eq!(sample.to_line(), "2024-03-09 13:05:09,42\n");
        assert_eq!(Sample::parse_line("2024-03-09 13:05:09,42"), Some(sample));
        assert_eq!(
            Sample::parse_line("2024-03-09 13:05:09,-1").map(|s| s.online),
            Some(NO_DATA)
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert_eq!(Sample::parse_line(""), None);
        assert_eq!(Sample::parse_line("2024-03-09 13:05:09"), None);
        assert_eq!(Sample::parse_line("yesterday,3"), None);
        assert_eq!(Sample::parse_line("2024-03-09 13:05:09,many"), None);
    }

    #[test]
    fn downsample_thins_long_ranges() {
        // One day at a 10s interval covers 8640 samples, so every 12th is kept.
        let samples = series(100);
        let window = downsample(&samples, 1, 10);
        assert_eq!(window.length, 720);
        assert_eq!(window.samples.len(), 9);
        assert_eq!(window.samples.last(), samples.last());
        assert!(window.samples.windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(window.samples[0].online, 3);
    }

    #[test]
    fn downsample_limits_to_range() {
        // One day at an hourly interval is 24 samples, step 1.
        let samples = series(100);
        let window = downsample(&samples, 1, 3600);
        assert_eq!(window.length, 24);
        assert_eq!(window.samples, samples[76..].to_vec());

        let empty = downsample(&samples, 0, 10);
        assert_eq!(empty.length, 0);
        assert!(empty.samples.is_empty());
    }

    #[tokio::test]
    async fn store_appends_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("player_stats.txt"));

        assert!(store.read_all().await.unwrap().is_empty());
        assert_eq!(store.read_raw().await.unwrap(), "");

        let first = Sample {
            time: at(1, 0, 0),
            online: 7,
        };
        let second = Sample {
            time: at(1, 0, 10),
            online: NO_DATA,
        };
        store.append(first).await.unwrap();
        store.append(second).await.unwrap();

        assert_eq!(
            store.read_raw().await.unwrap(),
            "2024-03-09 01:00:00,7\n2024-03-09 01:00:10,-1\n"
        );
        assert_eq!(store.read_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn store_skips_garbage_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player_stats.txt");
        std::fs::write(&path, "2024-03-09 01:00:00,7\nnonsense\n\n2024-03-09 01:00:10,8\n").unwrap();

        let samples = HistoryStore::new(&path).read_all().await.unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].online, 8);
    }
}
