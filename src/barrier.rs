//! Page-cache barriers between phases.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::SweepConfig;
use crate::error::{Error, Result};

/// Something that leaves the filesystem page cache cold.
pub trait CacheBarrier {
    fn flush(&mut self) -> Result<()>;
}

impl<B: CacheBarrier + ?Sized> CacheBarrier for Box<B> {
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<B: CacheBarrier + ?Sized> CacheBarrier for &mut B {
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Unmounts and remounts the filesystem holding the database.
pub struct SystemBarrier {
    device: String,
    mount_point: PathBuf,
}

impl SystemBarrier {
    pub fn new(device: impl Into<String>, mount_point: impl AsRef<Path>) -> Self {
        Self {
            device: device.into(),
            mount_point: mount_point.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(config.device.clone(), &config.mount_point)
    }

    /// `umount <mount point>` and `mount /dev/<device> <mount point>`, in the
    /// order they run.
    pub fn commands(&self) -> [Command; 2] {
        let mut unmount = Command::new("umount");
        unmount.arg(&self.mount_point);

        let mut mount = Command::new("mount");
        mount
            .arg(format!("/dev/{}", self.device))
            .arg(&self.mount_point);

        [unmount, mount]
    }

    /// Runs both commands through `run`. The mount is attempted even when the
    /// unmount fails, so the device is never left detached; the first
    /// failure is returned.
    fn cycle(&self, mut run: impl FnMut(Command) -> Result<()>) -> Result<()> {
        let [unmount, mount] = self.commands();
        let unmounted = run(unmount);
        let mounted = run(mount);

        match (unmounted, mounted) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), Err(mount_err)) => {
                log::error!("remount failed as well: {}", mount_err);
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        }
    }
}

impl CacheBarrier for SystemBarrier {
    fn flush(&mut self) -> Result<()> {
        self.cycle(run)
    }
}

/// Barrier that does nothing, for runs without mount privileges.
pub struct NoBarrier;

impl CacheBarrier for NoBarrier {
    fn flush(&mut self) -> Result<()> {
        log::debug!("remount disabled, page cache left warm");
        Ok(())
    }
}

fn run(mut cmd: Command) -> Result<()> {
    let command = format!("{:?}", cmd);
    log::debug!("running {}", command);

    let output = cmd.output()?;
    if output.status.success() {
        return Ok(());
    }
    Err(Error::Command {
        command,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(cmd: &Command) -> Vec<String> {
        std::iter::once(cmd.get_program())
            .chain(cmd.get_args())
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    fn failure(cmd: &Command) -> Error {
        Error::Command {
            command: format!("{:?}", cmd),
            status: "exit status: 32".into(),
            stderr: "not mounted".into(),
        }
    }

    #[test]
    fn unmounts_then_mounts_the_device() {
        let barrier = SystemBarrier::new("sdb1", "/mnt/g");
        let [unmount, mount] = barrier.commands();
        assert_eq!(argv(&unmount), ["umount", "/mnt/g"]);
        assert_eq!(argv(&mount), ["mount", "/dev/sdb1", "/mnt/g"]);
    }

    #[test]
    fn from_config_uses_device_and_mount_point() {
        let config = SweepConfig {
            device: "nvme0n1p2".into(),
            mount_point: PathBuf::from("/srv/bench"),
            ..SweepConfig::default()
        };
        let [unmount, mount] = SystemBarrier::from_config(&config).commands();
        assert_eq!(argv(&unmount), ["umount", "/srv/bench"]);
        assert_eq!(argv(&mount), ["mount", "/dev/nvme0n1p2", "/srv/bench"]);
    }

    #[test]
    fn mount_runs_after_failed_unmount() {
        let barrier = SystemBarrier::new("sdb1", "/mnt/g");
        let mut issued = Vec::new();

        let err = barrier
            .cycle(|cmd| {
                issued.push(argv(&cmd));
                if cmd.get_program() == "umount" {
                    Err(failure(&cmd))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();

        assert_eq!(issued.len(), 2);
        assert_eq!(issued[1][0], "mount");
        match err {
            Error::Command { command, .. } => assert!(command.contains("umount")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_mount_is_reported() {
        let barrier = SystemBarrier::new("sdb1", "/mnt/g");
        let err = barrier
            .cycle(|cmd| {
                if cmd.get_program() == "mount" {
                    Err(failure(&cmd))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        match err {
            Error::Command { command, .. } => assert!(command.contains("/dev/sdb1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_failure_wins_when_both_fail() {
        let barrier = SystemBarrier::new("sdb1", "/mnt/g");
        let mut calls = 0;
        let err = barrier
            .cycle(|cmd| {
                calls += 1;
                Err(failure(&cmd))
            })
            .unwrap_err();
        assert_eq!(calls, 2);
        match err {
            Error::Command { command, .. } => assert!(command.starts_with("\"umount\"")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
