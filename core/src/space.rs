//! Cluster-rounded space accounting

/// Round `size` up to the next multiple of `cluster`.
///
/// A zero cluster size is treated as 1 (no rounding).
pub fn normalize(size: u64, cluster: u32) -> u64 {
    let cluster = cluster.max(1) as u64;
    size.div_ceil(cluster) * cluster
}

/// Human-readable size using the largest base-1024 unit whose count is at
/// least 1. Counts are truncated, not rounded.
pub fn space_text(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size;
    let mut unit = 0;
    while value >= 1024 && unit < UNITS.len() - 1 {
        value /= 1024;
        unit += 1;
    }
    format!("{} {}", value, UNITS[unit])
}

/// Space used by one bundle, each file rounded to the cluster separately.
///
/// The manifest always counts as one cluster. Assets of size 0 occupy no
/// space.
pub fn bundle_usage(data_size: u64, asset_sizes: &[u64], cluster: u32) -> u64 {
    let manifest = normalize(1, cluster);
    let data = normalize(data_size, cluster);
    let assets: u64 = asset_sizes.iter().map(|&s| normalize(s, cluster)).sum();
    manifest + data + assets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rounds_up_to_cluster() {
        assert_eq!(normalize(1, 0x400), 0x400);
        assert_eq!(normalize(0x400, 0x400), 0x400);
        assert_eq!(normalize(0x401, 0x400), 0x800);
        assert_eq!(normalize(0, 0x400), 0);
    }

    #[test]
    fn normalize_respects_medium_cluster() {
        assert_eq!(normalize(0x401, 0x8000), 0x8000);
        assert_eq!(normalize(7, 0), 7);
    }

    #[test]
    fn space_text_units() {
        assert_eq!(space_text(500), "500 B");
        assert_eq!(space_text(1023), "1023 B");
        assert_eq!(space_text(2048), "2 KB");
        assert_eq!(space_text(1536), "1 KB");
        assert_eq!(space_text(1048576), "1 MB");
        assert_eq!(space_text(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(space_text(5000 * 1024 * 1024 * 1024), "5000 GB");
    }

    #[test]
    fn usage_rounds_each_file_separately() {
        // 1 + 0x401 + 1 summed then rounded would be 0x800; per file it is 4 clusters.
        assert_eq!(bundle_usage(0x401, &[1, 0, 0, 0], 0x400), 0x400 + 0x800 + 0x400);
    }
}
