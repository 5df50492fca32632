use glam::Vec3;
use slotmap::SlotMap;

slotmap::new_key_type! {
    pub struct GeometryId;
}

/// Collision geometry registered by an effect. The globes effect registers
/// none, but everything an effect does register must be released again on
/// teardown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsGeometry {
    pub center: Vec3,
    pub half_extents: Vec3,
}

#[derive(Debug, Default)]
pub struct Physics {
    geometries: SlotMap<GeometryId, PhysicsGeometry>,
}

impl Physics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: PhysicsGeometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    /// Returns false if the id was not (or no longer) registered.
    pub fn remove_geometry(&mut self, id: GeometryId) -> bool {
        let removed = self.geometries.remove(id).is_some();
        if !removed {
            log::warn!("remove_geometry: {id:?} was not registered");
        }
        removed
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_geometry() {
        let mut physics = Physics::new();
        let id = physics.add_geometry(PhysicsGeometry {
            center: Vec3::ZERO,
            half_extents: Vec3::ONE,
        });
        assert_eq!(physics.geometry_count(), 1);
        assert!(physics.remove_geometry(id));
        assert_eq!(physics.geometry_count(), 0);
        // double release is reported, not fatal
        assert!(!physics.remove_geometry(id));
    }
}
