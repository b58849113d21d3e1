//! Nearest-site lookup and grid neighbourhoods.

use crate::config::Adjacency;
use crate::env::MobilityModel;
use crate::task::DeviceId;
use crate::topology::{Location, SiteId, Topology};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteLocator {
    pub adjacency: Adjacency,
}

impl SiteLocator {
    pub fn new(adjacency: Adjacency) -> Self {
        Self { adjacency }
    }

    /// Site closest to `location`. Ties go to the last site scanned.
    pub fn nearest_to(&self, location: Location, topology: &Topology) -> Option<SiteId> {
        let mut best = f64::INFINITY;
        let mut nearest = None;

        for site in topology.sites() {
            let dist = location.distance(&site.location);
            if dist <= best {
                best = dist;
                nearest = Some(site.id);
            }
        }

        nearest
    }

    pub fn nearest(
        &self,
        device: DeviceId,
        time: f64,
        topology: &Topology,
        mobility: &dyn MobilityModel,
    ) -> Option<SiteId> {
        self.nearest_to(mobility.location(device, time), topology)
    }

    /// Sites adjacent to `site`, in topology order.
    pub fn neighbors(&self, site: SiteId, topology: &Topology) -> Vec<SiteId> {
        let Some(origin) = topology.site(site) else {
            return Vec::new();
        };

        topology
            .sites()
            .iter()
            .filter(|other| {
                let dx = origin.location.x - other.location.x;
                let dy = origin.location.y - other.location.y;
                self.adjacency.is_adjacent(dx, dy)
            })
            .map(|other| other.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::fixed::StaticMobility;
    use crate::topology::{Site, Worker, WorkerCategory};

    fn topology(points: &[(i32, i32)]) -> Topology {
        let sites = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                Site::new(i, Location::new(x, y), vec![Worker::new(0, WorkerCategory::Generic)])
            })
            .collect();
        Topology::new(sites).unwrap()
    }

    #[test]
    fn test_nearest_site() {
        let topo = topology(&[(0, 0), (4, 4), (9, 9)]);
        let mobility = StaticMobility::new().with_device(DeviceId(1), Location::new(5, 5));
        let locator = SiteLocator::default();

        assert_eq!(locator.nearest(DeviceId(1), 0.0, &topo, &mobility), Some(SiteId(1)));
    }

    #[test]
    fn test_nearest_tie_goes_to_last_scanned() {
        // Both sites are exactly 1 away from the device.
        let topo = topology(&[(1, 0), (-1, 0)]);
        let locator = SiteLocator::default();

        assert_eq!(locator.nearest_to(Location::new(0, 0), &topo), Some(SiteId(1)));

        let reversed = topology(&[(-1, 0), (1, 0)]);
        assert_eq!(locator.nearest_to(Location::new(0, 0), &reversed), Some(SiteId(1)));
    }

    #[test]
    fn test_nearest_without_sites() {
        let topo = Topology::default();
        assert_eq!(SiteLocator::default().nearest_to(Location::new(0, 0), &topo), None);
    }

    #[test]
    fn test_axis_neighbors() {
        let topo = topology(&[(1, 1), (2, 1), (1, 2), (2, 2), (3, 3), (1, 4)]);
        let locator = SiteLocator::new(Adjacency::Axis);

        assert_eq!(
            locator.neighbors(SiteId(0), &topo),
            vec![SiteId(1), SiteId(2), SiteId(3)]
        );
    }

    #[test]
    fn test_moore_neighbors() {
        let topo = topology(&[(1, 1), (2, 1), (1, 2), (2, 2), (3, 3), (2, 4)]);
        let locator = SiteLocator::new(Adjacency::Moore);

        assert_eq!(
            locator.neighbors(SiteId(0), &topo),
            vec![SiteId(1), SiteId(2), SiteId(3)]
        );
        // (2,4) is one column over but three rows away: axis rule accepts it.
        assert!(SiteLocator::new(Adjacency::Axis)
            .neighbors(SiteId(0), &topo)
            .contains(&SiteId(5)));
    }

    #[test]
    fn test_neighbors_of_unknown_site() {
        let topo = topology(&[(0, 0)]);
        assert!(SiteLocator::default().neighbors(SiteId(4), &topo).is_empty());
    }
}
