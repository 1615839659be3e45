//! Launch geometry for the grid-style CPU executor
//!
//! Work is described as a two-level hierarchy: a `grid` of groups, each
//! holding `group.x * group.y` execution units. The x axis walks output
//! feature positions and the y axis walks edges. Kernels use grid-strided
//! loops, so a bounded grid covers a problem of any size.

use crate::error::{Error, Result};

/// Upper bound on execution units per group
pub const MAX_THREADS_PER_GROUP: usize = 256;

/// Hardware-style limits a launch must respect
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaunchLimits {
    /// Maximum `group.x * group.y`
    pub max_threads_per_group: usize,
    /// Maximum number of groups along x
    pub max_grid_x: usize,
    /// Maximum number of groups along y
    pub max_grid_y: usize,
}

impl Default for LaunchLimits {
    fn default() -> Self {
        Self {
            max_threads_per_group: MAX_THREADS_PER_GROUP,
            max_grid_x: (1 << 31) - 1,
            max_grid_y: 65535,
        }
    }
}

/// Two-dimensional extent or coordinate
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dim2 {
    /// Position axis
    pub x: usize,
    /// Edge axis
    pub y: usize,
}

impl Dim2 {
    /// Create a new extent
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Number of cells covered by this extent
    #[inline]
    pub const fn count(self) -> usize {
        self.x * self.y
    }
}

/// Grid and group extents of one launch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Number of groups along each axis
    pub grid: Dim2,
    /// Number of execution units per group along each axis
    pub group: Dim2,
}

impl LaunchConfig {
    /// Create a launch configuration
    pub const fn new(grid: Dim2, group: Dim2) -> Self {
        Self { grid, group }
    }

    /// Total number of groups
    #[inline]
    pub fn num_groups(&self) -> usize {
        self.grid.count()
    }

    /// Total number of execution units across the grid
    #[inline]
    pub fn total_units(&self) -> usize {
        self.grid.count() * self.group.count()
    }

    /// Grid-wide stride along each axis
    #[inline]
    pub fn strides(&self) -> Dim2 {
        Dim2::new(self.grid.x * self.group.x, self.grid.y * self.group.y)
    }

    /// Check the geometry against `limits`.
    ///
    /// Zero extents and extents above the limits are rejected.
    pub fn validate(&self, limits: &LaunchLimits) -> Result<()> {
        let Self { grid, group } = *self;
        if grid.x == 0 || grid.y == 0 || group.x == 0 || group.y == 0 {
            return Err(Error::launch(format!(
                "empty launch geometry: grid {}x{}, group {}x{}",
                grid.x, grid.y, group.x, group.y
            )));
        }
        if group.count() > limits.max_threads_per_group {
            return Err(Error::launch(format!(
                "group of {} units exceeds limit {}",
                group.count(),
                limits.max_threads_per_group
            )));
        }
        if grid.x > limits.max_grid_x || grid.y > limits.max_grid_y {
            return Err(Error::launch(format!(
                "grid {}x{} exceeds limit {}x{}",
                grid.x, grid.y, limits.max_grid_x, limits.max_grid_y
            )));
        }
        Ok(())
    }
}

/// Coordinates of one execution unit inside a launch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExecUnit {
    /// Index of the enclosing group in the grid
    pub group: Dim2,
    /// Index of the unit inside its group
    pub thread: Dim2,
    /// Group extents
    pub group_dim: Dim2,
    /// Grid extents
    pub grid_dim: Dim2,
}

impl ExecUnit {
    /// First output position this unit handles
    #[inline(always)]
    pub fn global_x(&self) -> usize {
        self.group.x * self.group_dim.x + self.thread.x
    }

    /// First edge this unit handles
    #[inline(always)]
    pub fn global_y(&self) -> usize {
        self.group.y * self.group_dim.y + self.thread.y
    }

    /// Step between positions handled by this unit
    #[inline(always)]
    pub fn stride_x(&self) -> usize {
        self.group_dim.x * self.grid_dim.x
    }

    /// Step between edges handled by this unit
    #[inline(always)]
    pub fn stride_y(&self) -> usize {
        self.group_dim.y * self.grid_dim.y
    }
}

/// Largest power of two not above `dim`, capped at `max`.
///
/// Returns 1 for `dim == 0`.
#[inline]
pub fn find_num_threads(dim: usize, max: usize) -> usize {
    let cap = dim.min(max);
    if cap == 0 {
        return 1;
    }
    1 << (usize::BITS - 1 - cap.leading_zeros())
}

/// `n` clamped into `[1, max]`
#[inline]
pub fn find_num_groups(n: usize, max: usize) -> usize {
    n.min(max).max(1)
}

/// Geometry for an SDDMM over `nnz` edges with `out_len` positions per edge.
///
/// The x axis gets as many units as fit the per-edge output, the y axis
/// gets the rest of the group. Both grid extents are clamped to the limits;
/// positions beyond `grid.x * group.x` and edges beyond `grid.y * group.y`
/// are picked up by the strided loops.
pub fn sddmm_launch_config(out_len: usize, nnz: usize, limits: &LaunchLimits) -> LaunchConfig {
    let ntx = find_num_threads(out_len, limits.max_threads_per_group);
    let nty = (limits.max_threads_per_group / ntx).max(1);
    let nbx = find_num_groups(out_len.div_ceil(ntx), limits.max_grid_x);
    let nby = find_num_groups(nnz.div_ceil(nty), limits.max_grid_y);
    LaunchConfig::new(Dim2::new(nbx, nby), Dim2::new(ntx, nty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_find_num_threads() {
        assert_eq!(find_num_threads(0, 256), 1);
        assert_eq!(find_num_threads(1, 256), 1);
        assert_eq!(find_num_threads(3, 256), 2);
        assert_eq!(find_num_threads(64, 256), 64);
        assert_eq!(find_num_threads(100, 256), 64);
        assert_eq!(find_num_threads(1000, 256), 256);
    }

    #[test]
    fn test_find_num_groups() {
        assert_eq!(find_num_groups(0, 65535), 1);
        assert_eq!(find_num_groups(10, 65535), 10);
        assert_eq!(find_num_groups(100_000, 65535), 65535);
    }

    #[test]
    fn test_sddmm_geometry_small_feature() {
        let cfg = sddmm_launch_config(2, 3, &LaunchLimits::default());
        assert_eq!(cfg.group, Dim2::new(2, 128));
        assert_eq!(cfg.grid, Dim2::new(1, 1));
        cfg.validate(&LaunchLimits::default()).unwrap();
    }

    #[test]
    fn test_sddmm_geometry_wide_feature() {
        let cfg = sddmm_launch_config(1000, 10, &LaunchLimits::default());
        assert_eq!(cfg.group, Dim2::new(256, 1));
        assert_eq!(cfg.grid, Dim2::new(4, 10));
    }

    #[test]
    fn test_sddmm_geometry_clamps_edge_groups() {
        let limits = LaunchLimits {
            max_grid_y: 4,
            ..LaunchLimits::default()
        };
        let cfg = sddmm_launch_config(1, 10_000, &limits);
        assert_eq!(cfg.grid.y, 4);
        assert_eq!(cfg.strides().y, 4 * 256);
    }

    #[test]
    fn test_sddmm_geometry_clamps_position_groups() {
        let limits = LaunchLimits {
            max_grid_x: 2,
            ..LaunchLimits::default()
        };
        let cfg = sddmm_launch_config(1024, 3, &limits);
        assert_eq!(cfg.grid.x, 2);
        assert_eq!(cfg.strides().x, 2 * 256);
        cfg.validate(&limits).unwrap();
        assert!(coverage(&cfg, 1024, 3).iter().all(|&hits| hits == 1));
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let limits = LaunchLimits::default();
        let empty = LaunchConfig::new(Dim2::new(0, 1), Dim2::new(1, 1));
        assert!(matches!(empty.validate(&limits), Err(Error::Launch { .. })));

        let fat = LaunchConfig::new(Dim2::new(1, 1), Dim2::new(64, 8));
        assert!(matches!(fat.validate(&limits), Err(Error::Launch { .. })));

        let tall = LaunchConfig::new(Dim2::new(1, 70_000), Dim2::new(1, 1));
        assert!(matches!(tall.validate(&limits), Err(Error::Launch { .. })));
    }

    /// Enumerate every unit and count how often each (edge, position) is visited
    fn coverage(cfg: &LaunchConfig, out_len: usize, nnz: usize) -> Vec<u32> {
        let mut hits = vec![0u32; out_len * nnz];
        for gy in 0..cfg.grid.y {
            for gx in 0..cfg.grid.x {
                for ty in 0..cfg.group.y {
                    for tx in 0..cfg.group.x {
                        let unit = ExecUnit {
                            group: Dim2::new(gx, gy),
                            thread: Dim2::new(tx, ty),
                            group_dim: cfg.group,
                            grid_dim: cfg.grid,
                        };
                        let mut e = unit.global_y();
                        while e < nnz {
                            let mut p = unit.global_x();
                            while p < out_len {
                                hits[e * out_len + p] += 1;
                                p += unit.stride_x();
                            }
                            e += unit.stride_y();
                        }
                    }
                }
            }
        }
        hits
    }

    proptest! {
        #[test]
        fn prop_strided_loops_cover_each_pair_once(
            out_len in 1usize..40,
            nnz in 1usize..300,
            max_grid_y in 1usize..5,
            max_threads in prop::sample::select(vec![4usize, 16, 32]),
        ) {
            let limits = LaunchLimits {
                max_threads_per_group: max_threads,
                max_grid_x: 1 << 20,
                max_grid_y,
            };
            let cfg = sddmm_launch_config(out_len, nnz, &limits);
            prop_assert!(cfg.validate(&limits).is_ok());
            let hits = coverage(&cfg, out_len, nnz);
            prop_assert!(hits.iter().all(|&h| h == 1));
        }
    }
}
