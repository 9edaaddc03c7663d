// Shared galaxy datasets for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use faction_map::config::{AnalysisConfig, Config};
use faction_map::pipeline::Pipeline;
use faction_map::upstream::InMemoryGalaxy;

/// Two factions with one shared system and one rival system close to a
/// primary-controlled system.
pub fn contested_galaxy() -> InMemoryGalaxy {
    InMemoryGalaxy::new(50)
        .with_system("Mother Gaia", "Sol", (0.0, 0.0, 0.0), Some("Mother Gaia"))
        .with_system("Mother Gaia", "Alpha Centauri", (3.03, -0.09, 3.16), Some("Mother Gaia"))
        .with_system("Mother Gaia", "Barnard's Star", (-3.03, 1.38, 4.94), None)
        .with_system("Sirius Corporation", "Sirius", (6.25, -1.28, -5.75), Some("Sirius Corporation"))
        .with_system("Sirius Corporation", "Lave", (75.75, 48.75, 70.75), Some("Sirius Corporation"))
        .with_system("Sirius Corporation", "Sol", (0.0, 0.0, 0.0), Some("Mother Gaia"))
}

/// Primary at the origin, rival ten light years away on the x axis.
pub fn simple_pair() -> InMemoryGalaxy {
    InMemoryGalaxy::new(50)
        .with_system("Blue", "P", (0.0, 0.0, 0.0), Some("Blue"))
        .with_system("Red", "R", (10.0, 0.0, 0.0), Some("Red"))
}

pub fn config_with_threshold(threshold_ly: f64) -> Config {
    Config {
        analysis: AnalysisConfig {
            threshold_ly,
            ..AnalysisConfig::default()
        },
        ..Config::default()
    }
}

pub fn pipeline(galaxy: InMemoryGalaxy, config: Config) -> Pipeline<InMemoryGalaxy> {
    Pipeline::new(galaxy, Arc::new(config))
}

/// In-memory log sink for asserting on emitted tracing events.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's tracing events into the sink until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
