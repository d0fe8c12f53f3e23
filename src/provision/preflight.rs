// ABOUTME: Preflight check run before anything else.
// ABOUTME: The volume directory must already exist; it is never created here.

use snafu::ensure;

use super::error::VolumeDirMissingSnafu;
use super::ProvisionError;
use crate::config::Layout;

pub fn preflight(layout: &Layout) -> Result<(), ProvisionError> {
    ensure!(
        layout.volume_dir.is_dir(),
        VolumeDirMissingSnafu {
            path: layout.volume_dir.clone()
        }
    );
    tracing::debug!("volume directory: {}", layout.volume_dir.display());
    Ok(())
}
