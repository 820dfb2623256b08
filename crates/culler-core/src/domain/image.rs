//! ImageDescriptor - 一覧取得で得たイメージの情報
//!
//! 一覧取得時点のプロバイダの状態のコピーです。取得後に書き換えることはありません。

use super::ids::{ImageId, SnapshotId};
use super::timestamp::CreationDate;

/// One block-device mapping of an image.
///
/// `snapshot` is `None` for devices with no backing snapshot
/// (ephemeral / instance-local storage). Those are skipped during cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub device_name: Option<String>,
    pub snapshot: Option<SnapshotId>,
}

impl BlockDevice {
    pub fn backed_by(device_name: impl Into<String>, snapshot: impl Into<SnapshotId>) -> Self {
        Self {
            device_name: Some(device_name.into()),
            snapshot: Some(snapshot.into()),
        }
    }

    pub fn ephemeral(device_name: impl Into<String>) -> Self {
        Self {
            device_name: Some(device_name.into()),
            snapshot: None,
        }
    }
}

/// A versioned image instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub id: ImageId,
    pub created_at: CreationDate,
    pub devices: Vec<BlockDevice>,
}

impl ImageDescriptor {
    pub fn new(id: impl Into<ImageId>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: CreationDate::parse(created_at),
            devices: Vec::new(),
        }
    }

    pub fn with_device(mut self, device: BlockDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// Shorthand for a snapshot-backed device named after its position (`/dev/sdX`).
    pub fn with_snapshot(self, snapshot: impl Into<SnapshotId>) -> Self {
        let name = device_name_for(self.devices.len());
        self.with_device(BlockDevice::backed_by(name, snapshot))
    }

    /// Snapshots that must be deleted alongside this image, in mapping order.
    pub fn dependent_snapshots(&self) -> impl Iterator<Item = &SnapshotId> {
        self.devices.iter().filter_map(|d| d.snapshot.as_ref())
    }
}

fn device_name_for(index: usize) -> String {
    let letter = (b'a' + (index % 26) as u8) as char;
    format!("/dev/sd{letter}")
}
