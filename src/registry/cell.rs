use std::collections::BTreeMap;

use slotmap::SecondaryMap;

use crate::component::ComponentId;
use crate::error::RegistryError;
use crate::region::Region;

use super::index::{IndexAllocator, IndexBlock};

/// Unique identifier of a simulation cell.
///
/// Cell ids live in their own id space, disjoint from surface handle
/// magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(i64);

impl CellId {
    /// Returns the raw id value.
    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One simulation cell: a material at a temperature filling a region.
#[derive(Debug, Clone)]
pub struct Cell {
    material: i32,
    temperature: f64,
    region: Region,
    excluded: Vec<ComponentId>,
}

impl Cell {
    /// Returns the material id.
    #[must_use]
    pub fn material(&self) -> i32 {
        self.material
    }

    /// Returns the temperature.
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Returns the cell's region.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }
}

/// A component's outer boundary: the union region plus the cells that
/// constitute it.
#[derive(Debug, Clone)]
pub struct Exterior {
    region: Region,
    cells: Vec<CellId>,
}

impl Exterior {
    /// Returns the boundary region.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Returns the cell ids making up the exterior.
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }
}

/// Global store of simulation cells and per-component exteriors.
///
/// Owns the cell id space: blocks are reserved here, disjoint from the
/// surface registry's magnitudes, so no two `add_cell` calls across the
/// whole run can return the same id.
#[derive(Debug)]
pub struct CellRegistry {
    allocator: IndexAllocator,
    cells: BTreeMap<i64, Cell>,
    exteriors: SecondaryMap<ComponentId, Exterior>,
}

impl CellRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: IndexAllocator::new(1),
            cells: BTreeMap::new(),
            exteriors: SecondaryMap::new(),
        }
    }

    /// Reserves a contiguous block of cell ids for one component.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is non-positive or the id space is
    /// exhausted.
    pub fn reserve_cells(&mut self, size: i64) -> Result<IndexBlock, RegistryError> {
        self.allocator.reserve(size)
    }

    /// Registers a cell, drawing the next id from `block`.
    ///
    /// # Errors
    ///
    /// Returns an error if `block` is exhausted.
    pub fn add_cell(
        &mut self,
        block: &mut IndexBlock,
        material: i32,
        temperature: f64,
        region: Region,
    ) -> Result<CellId, RegistryError> {
        let id = block.take()?;
        self.cells.insert(
            id,
            Cell {
                material,
                temperature,
                region,
                excluded: Vec::new(),
            },
        );
        Ok(CellId(id))
    }

    /// Looks up a cell.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownCell`] if the id was never
    /// registered.
    pub fn cell(&self, id: CellId) -> Result<&Cell, RegistryError> {
        self.cells.get(&id.0).ok_or(RegistryError::UnknownCell(id.0))
    }

    /// ANDs an additional exclusion region into one cell after the fact,
    /// the one documented post-registration mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell id is unknown.
    pub fn exclude(&mut self, id: CellId, region: &Region) -> Result<(), RegistryError> {
        let cell = self
            .cells
            .get_mut(&id.0)
            .ok_or(RegistryError::UnknownCell(id.0))?;
        let current = std::mem::replace(&mut cell.region, Region::all());
        cell.region = current.intersect(region.clone());
        Ok(())
    }

    /// Records a component's outer boundary. The first call sets it;
    /// later calls union into the prior state, growing the exterior as
    /// pieces are added. Use [`Self::reset_exterior`] to replace.
    ///
    /// # Errors
    ///
    /// Returns an error if `region` has no literal (an empty exterior
    /// would make the component's complement empty and its containment
    /// meaningless).
    pub fn set_exterior(
        &mut self,
        component: ComponentId,
        region: Region,
        cells: &[CellId],
    ) -> Result<(), RegistryError> {
        if region.is_empty() {
            return Err(RegistryError::EmptyExterior);
        }
        if let Some(existing) = self.exteriors.get_mut(component) {
            let prior = std::mem::replace(&mut existing.region, Region::all());
            // Both sides are non-empty, so the union cannot fail.
            existing.region = prior.union(region).map_err(|_| RegistryError::EmptyExterior)?;
            for &id in cells {
                if !existing.cells.contains(&id) {
                    existing.cells.push(id);
                }
            }
        } else {
            self.exteriors.insert(
                component,
                Exterior {
                    region,
                    cells: cells.to_vec(),
                },
            );
        }
        Ok(())
    }

    /// Clears a component's recorded exterior.
    pub fn reset_exterior(&mut self, component: ComponentId) {
        self.exteriors.remove(component);
    }

    /// Returns a component's recorded exterior.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingExterior`] if none was set.
    pub fn exterior(&self, component: ComponentId) -> Result<&Exterior, RegistryError> {
        self.exteriors
            .get(component)
            .ok_or(RegistryError::MissingExterior)
    }

    /// Excludes `child`'s exterior from every listed parent cell, so
    /// nested or adjacent components never double-count material.
    ///
    /// Idempotent: a cell records which children it already excludes and
    /// skips repeats, so calling this twice with the same pair leaves the
    /// region unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the child has no exterior or a parent cell id
    /// is unknown.
    pub fn insert(
        &mut self,
        child: ComponentId,
        parent_cells: &[CellId],
    ) -> Result<(), RegistryError> {
        let exclusion = self.exterior(child)?.region.complement();
        for &id in parent_cells {
            let cell = self
                .cells
                .get_mut(&id.0)
                .ok_or(RegistryError::UnknownCell(id.0))?;
            if cell.excluded.contains(&child) {
                continue;
            }
            let current = std::mem::replace(&mut cell.region, Region::all());
            cell.region = current.intersect(exclusion.clone());
            cell.excluded.push(child);
        }
        Ok(())
    }

    /// Iterates over all registered cell ids in ascending order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.keys().map(|&id| CellId(id))
    }

    /// Produces the `(id, material, temperature, region-text)` tuples the
    /// downstream serializer consumes.
    #[must_use]
    pub fn records(&self) -> Vec<(CellId, i32, f64, String)> {
        self.cells
            .iter()
            .map(|(&id, cell)| {
                (
                    CellId(id),
                    cell.material,
                    cell.temperature,
                    cell.region.to_string(),
                )
            })
            .collect()
    }

    /// Returns the number of registered cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for CellRegistry {
    fn default() -> Self {
        Self::new()
    }
}
