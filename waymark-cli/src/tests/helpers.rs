//! Test helpers for writing request files and stub planners.

use super::*;
use camino::Utf8PathBuf;
use tempfile::TempDir;
use waymark_core::test_support::MeridianBoundary;
use waymark_core::{RoutePlanner, RouteProvider, TerritoryConfig};
use waymark_planner::BorderAwarePlanner;

use crate::plan::{PlanConfig, PlannerBuilder};

#[expect(clippy::expect_used, reason = "test setup should fail loudly")]
pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

#[expect(clippy::expect_used, reason = "test setup should fail loudly")]
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Builds a planner over a test provider and a meridian boundary.
pub(super) struct StubPlannerBuilder<F> {
    pub(super) provider: F,
    pub(super) west_limit: f64,
}

impl<F, P> PlannerBuilder for StubPlannerBuilder<F>
where
    F: Fn() -> P,
    P: RouteProvider + 'static,
{
    fn build(&self, _config: &PlanConfig) -> Result<Box<dyn RoutePlanner>, CliError> {
        Ok(Box::new(BorderAwarePlanner::new(
            (self.provider)(),
            MeridianBoundary {
                west_limit: self.west_limit,
            },
            TerritoryConfig::vietnam(),
        )))
    }
}
