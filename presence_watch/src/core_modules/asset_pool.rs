// THEORY:
// Each displayable category owns a pool of interchangeable visual assets. The
// pools are opaque to the core (any handle type works), but they are checked for
// emptiness up front so the dispatcher can always pick something at render time.

use crate::core_modules::observation::ResultCategory;
use crate::core_modules::selector::AssetSelector;
use crate::error::PresenceError;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Sub-directory holding the pictures shown while the subject is present.
pub const TARGET_DIR: &str = "target";
/// Sub-directory holding the pictures shown once presence has been sustained.
pub const SUSTAINED_TARGET_DIR: &str = "tired_target";
/// Sub-directory holding the neutral pictures.
pub const NO_TARGET_DIR: &str = "no_target";

/// A non-empty set of asset handles for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPool<A> {
    assets: Vec<A>,
    len: NonZeroUsize,
}

impl<A> AssetPool<A> {
    pub fn new(category: ResultCategory, assets: Vec<A>) -> Result<Self, PresenceError> {
        let len = NonZeroUsize::new(assets.len()).ok_or(PresenceError::EmptyAssetPool { category })?;
        Ok(Self { assets, len })
    }

    pub fn len(&self) -> NonZeroUsize {
        self.len
    }

    pub fn assets(&self) -> &[A] {
        &self.assets
    }

    /// Lets the selector choose an asset. Out-of-range picks are clamped to the last asset.
    pub fn pick(&self, selector: &mut dyn AssetSelector) -> &A {
        let index = selector.select(self.len).min(self.len.get() - 1);
        &self.assets[index]
    }
}

/// The asset pools backing every displayable category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPools<A> {
    pub target: AssetPool<A>,
    pub sustained_target: AssetPool<A>,
    /// Shared by `NoTarget` and `LittleLost`.
    pub no_target: AssetPool<A>,
}

impl<A> AssetPools<A> {
    pub fn new(target: Vec<A>, sustained_target: Vec<A>, no_target: Vec<A>) -> Result<Self, PresenceError> {
        Ok(Self {
            target: AssetPool::new(ResultCategory::Target, target)?,
            sustained_target: AssetPool::new(ResultCategory::SustainedTarget, sustained_target)?,
            no_target: AssetPool::new(ResultCategory::NoTarget, no_target)?,
        })
    }

    /// The pool a category renders from. `Unknown` and `Nothing` have none.
    pub fn pool_for(&self, category: ResultCategory) -> Option<&AssetPool<A>> {
        match category {
            ResultCategory::SustainedTarget => Some(&self.sustained_target),
            ResultCategory::Target => Some(&self.target),
            ResultCategory::LittleLost | ResultCategory::NoTarget => Some(&self.no_target),
            ResultCategory::Unknown | ResultCategory::Nothing => None,
        }
    }
}

impl AssetPools<PathBuf> {
    /// Enumerates `target/`, `tired_target/` and `no_target/` under `root`.
    pub fn from_directory(root: &Path) -> Result<Self, PresenceError> {
        let pools = Self::new(
            list_files(&root.join(TARGET_DIR))?,
            list_files(&root.join(SUSTAINED_TARGET_DIR))?,
            list_files(&root.join(NO_TARGET_DIR))?,
        )?;
        tracing::debug!(
            target_assets = pools.target.len().get(),
            sustained_assets = pools.sustained_target.len().get(),
            no_target_assets = pools.no_target.len().get(),
            "Loaded asset pools"
        );
        Ok(pools)
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, PresenceError> {
    let to_error = |source| PresenceError::AssetDirectory {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs_err::read_dir(dir).map_err(to_error)? {
        let entry = entry.map_err(to_error)?;
        if entry.file_type().map_err(to_error)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::selector::{CyclingSelector, FirstSelector};

    fn write_assets(root: &Path, dir: &str, names: &[&str]) {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        for name in names {
            std::fs::write(dir.join(name), b"asset").unwrap();
        }
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = AssetPools::<u8>::new(vec![1], vec![], vec![3]).unwrap_err();
        assert!(matches!(
            err,
            PresenceError::EmptyAssetPool {
                category: ResultCategory::SustainedTarget
            }
        ));
    }

    #[test]
    fn little_lost_shares_the_no_target_pool() {
        let pools = AssetPools::new(vec!["t"], vec!["s"], vec!["n"]).unwrap();
        assert_eq!(pools.pool_for(ResultCategory::LittleLost), Some(&pools.no_target));
        assert_eq!(pools.pool_for(ResultCategory::NoTarget), Some(&pools.no_target));
        assert_eq!(pools.pool_for(ResultCategory::SustainedTarget), Some(&pools.sustained_target));
        assert!(pools.pool_for(ResultCategory::Unknown).is_none());
        assert!(pools.pool_for(ResultCategory::Nothing).is_none());
    }

    #[test]
    fn pick_follows_the_selector() {
        let pool = AssetPool::new(ResultCategory::Target, vec!["a", "b", "c"]).unwrap();
        assert_eq!(*pool.pick(&mut FirstSelector), "a");

        let mut cycling = CyclingSelector::default();
        let picks: Vec<&str> = (0..4).map(|_| *pool.pick(&mut cycling)).collect();
        assert_eq!(picks, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn loads_sorted_pools_from_directory() {
        let root = tempfile::tempdir().unwrap();
        write_assets(root.path(), TARGET_DIR, &["b.png", "a.png"]);
        write_assets(root.path(), SUSTAINED_TARGET_DIR, &["tired.png"]);
        write_assets(root.path(), NO_TARGET_DIR, &["idle.png"]);
        std::fs::create_dir_all(root.path().join(TARGET_DIR).join("nested")).unwrap();

        let pools = AssetPools::from_directory(root.path()).unwrap();
        let names: Vec<_> = pools
            .target
            .assets()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(pools.sustained_target.len().get(), 1);
    }

    #[test]
    fn missing_or_empty_directories_are_configuration_errors() {
        let root = tempfile::tempdir().unwrap();
        write_assets(root.path(), TARGET_DIR, &["a.png"]);
        write_assets(root.path(), SUSTAINED_TARGET_DIR, &["b.png"]);

        let err = AssetPools::from_directory(root.path()).unwrap_err();
        assert!(matches!(err, PresenceError::AssetDirectory { .. }));
        assert!(err.is_configuration());

        std::fs::create_dir_all(root.path().join(NO_TARGET_DIR)).unwrap();
        let err = AssetPools::from_directory(root.path()).unwrap_err();
        assert!(matches!(
            err,
            PresenceError::EmptyAssetPool {
                category: ResultCategory::NoTarget
            }
        ));
    }
}
