// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Version of the network OS installed on the switch, read from the filesystem.
//! It is discovered once per process: the first caller detects it under a lock and publishes
//! the result, later callers read it without locking.

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, const_mutex};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::CompatError;

pub const HOST_DIR: &str = "/host";
pub const ONIE_BOOT_DIR: &str = "/mnt/onie-boot";
const IMAGE_PREFIX: &str = "image-";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct NosVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl NosVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for NosVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parses the leading dotted numbers of a version, e.g. `4.4.0-Enterprise_Base`.
/// Missing minor or patch numbers are zero.
impl FromStr for NosVersion {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CompatError::BadVersion(s.to_owned());
        let end = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let mut numbers = s[..end]
            .split('.')
            .filter(|n| !n.is_empty())
            .map(|n| n.parse::<u32>().map_err(|_| bad()));
        let major = numbers.next().ok_or_else(bad)??;
        let minor = numbers.next().transpose()?.unwrap_or(0);
        let patch = numbers.next().transpose()?.unwrap_or(0);
        Ok(Self::new(major, minor, patch))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compat {
    pub version: NosVersion,
    /// the ONIE boot partition is mounted
    pub onie_boot: bool,
}

impl Compat {
    /// Look in `host` for installed images and `onie_boot` for the ONIE partition. At most
    /// one `image-<version>` entry is expected in `host`; none reads as version `0.0.0`.
    pub fn detect(host: &Path, onie_boot: &Path) -> Result<Self, CompatError> {
        let io = |e: std::io::Error| CompatError::Io(host.display().to_string(), e.to_string());
        let mut images = vec![];
        match std::fs::read_dir(host) {
            Ok(entries) => {
                for entry in entries {
                    let name = entry.map_err(io)?.file_name().to_string_lossy().into_owned();
                    if let Some(version) = name.strip_prefix(IMAGE_PREFIX) {
                        images.push(version.to_owned());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No {}, assuming no image is installed", host.display());
            }
            Err(e) => return Err(io(e)),
        }
        images.sort();

        let version = match images.as_slice() {
            [] => NosVersion::default(),
            [image] => image.parse()?,
            _ => return Err(CompatError::MultipleImages(images)),
        };
        Ok(Self {
            version,
            onie_boot: onie_boot.is_dir(),
        })
    }
}

static COMPAT: ArcSwapOption<Compat> = ArcSwapOption::const_empty();
static COMPAT_INIT: Mutex<()> = const_mutex(());

fn get_or_detect(host: &Path, onie_boot: &Path) -> Result<Arc<Compat>, CompatError> {
    if let Some(compat) = COMPAT.load_full() {
        return Ok(compat);
    }
    let _guard = COMPAT_INIT.lock();
    if let Some(compat) = COMPAT.load_full() {
        return Ok(compat);
    }
    let compat = Arc::new(Compat::detect(host, onie_boot)?);
    info!(
        "Network OS version is {} (ONIE boot partition: {})",
        compat.version, compat.onie_boot
    );
    COMPAT.store(Some(compat.clone()));
    Ok(compat)
}

/// The process-wide [`Compat`], detected on first use
pub fn get() -> Result<Arc<Compat>, CompatError> {
    get_or_detect(Path::new(HOST_DIR), Path::new(ONIE_BOOT_DIR))
}

#[cfg(test)]
pub(crate) fn reset() {
    let _guard = COMPAT_INIT.lock();
    COMPAT.store(None);
}

/// Publish `compat` as if it had been detected
#[cfg(test)]
pub(crate) fn preset(compat: Compat) {
    let _guard = COMPAT_INIT.lock();
    COMPAT.store(Some(Arc::new(compat)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn test_parse_version() {
        assert_eq!("4.4.0".parse::<NosVersion>(), Ok(NosVersion::new(4, 4, 0)));
        assert_eq!(
            "4.2.1-Enterprise_Base".parse::<NosVersion>(),
            Ok(NosVersion::new(4, 2, 1))
        );
        assert_eq!("202311".parse::<NosVersion>(), Ok(NosVersion::new(202_311, 0, 0)));
        assert_eq!(
            "Enterprise".parse::<NosVersion>(),
            Err(CompatError::BadVersion("Enterprise".to_owned()))
        );
        assert!(NosVersion::new(4, 4, 0) > NosVersion::new(4, 2, 1));
    }

    #[test]
    fn test_detect() {
        let host = tempfile::tempdir().unwrap();
        let onie = tempfile::tempdir().unwrap();

        let compat = Compat::detect(host.path(), onie.path()).unwrap();
        assert_eq!(compat.version, NosVersion::default());
        assert_eq!(compat.version.to_string(), "0.0.0");
        assert!(compat.onie_boot);

        std::fs::create_dir(host.path().join("image-4.4.0-Enterprise_Base")).unwrap();
        std::fs::create_dir(host.path().join("grub")).unwrap();
        let compat = Compat::detect(host.path(), &host.path().join("none")).unwrap();
        assert_eq!(compat.version, NosVersion::new(4, 4, 0));
        assert!(!compat.onie_boot);

        std::fs::create_dir(host.path().join("image-4.2.1")).unwrap();
        assert_eq!(
            Compat::detect(host.path(), onie.path()),
            Err(CompatError::MultipleImages(vec![
                "4.2.1".to_owned(),
                "4.4.0-Enterprise_Base".to_owned()
            ]))
        );
    }

    #[test]
    fn test_missing_host_dir() {
        let dir = tempfile::tempdir().unwrap();
        let compat = Compat::detect(&dir.path().join("host"), &dir.path().join("onie")).unwrap();
        assert_eq!(compat, Compat::default());
    }

    #[test]
    #[serial]
    fn test_detected_once() {
        reset();
        let first = tempfile::tempdir().unwrap();
        std::fs::create_dir(first.path().join("image-4.4.0")).unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::create_dir(second.path().join("image-4.2.1")).unwrap();

        let compat = get_or_detect(first.path(), first.path()).unwrap();
        assert_eq!(compat.version, NosVersion::new(4, 4, 0));
        let again = get_or_detect(second.path(), second.path()).unwrap();
        assert!(Arc::ptr_eq(&compat, &again));
        reset();
    }

    #[test]
    #[serial]
    fn test_failed_detection_is_retried() {
        reset();
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("image-4.4.0")).unwrap();
        std::fs::create_dir(dir.path().join("image-4.2.1")).unwrap();
        assert!(get_or_detect(dir.path(), dir.path()).is_err());

        std::fs::remove_dir(dir.path().join("image-4.2.1")).unwrap();
        let compat = get_or_detect(dir.path(), dir.path()).unwrap();
        assert_eq!(compat.version, NosVersion::new(4, 4, 0));
        reset();
    }
}
